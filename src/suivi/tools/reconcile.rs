//! Consistency rules between the planned and the actual series of a person.
//!
//! The actual series anchors the plan: a planned month before the first
//! recorded actual is dropped, and the first remaining planned month is
//! seeded from that actual. A realisation row whose measurements are all
//! missing is a placeholder and does not count as recorded.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::suivi::tools::model::{Record, SeriesType};

/// Index of the earliest record per person among those accepted by `keep`.
fn earliest_by_person(
    records: &[Record],
    keep: impl Fn(&Record) -> bool,
) -> BTreeMap<String, usize> {
    let mut firsts: BTreeMap<String, usize> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        if !keep(record) {
            continue;
        }
        match firsts.get(&record.personne) {
            Some(current) if records[*current].date <= record.date => {}
            _ => {
                firsts.insert(record.personne.clone(), index);
            }
        }
    }
    firsts
}

fn is_recorded_realisation(record: &Record) -> bool {
    record.series == SeriesType::Realisation && record.has_measurements()
}

fn is_previsionnel(record: &Record) -> bool {
    record.series == SeriesType::Previsionnel
}

/// Removes previsionnel records dated before the person's first recorded
/// realisation. People without any recorded realisation keep their plan.
/// Returns the number of removed records.
pub fn drop_previsionnel_before_first_realisation(records: &mut Vec<Record>) -> usize {
    let cutoffs: BTreeMap<String, NaiveDate> = earliest_by_person(records, is_recorded_realisation)
        .into_iter()
        .map(|(person, index)| (person, records[index].date))
        .collect();

    let before = records.len();
    records.retain(|record| {
        record.series != SeriesType::Previsionnel
            || cutoffs
                .get(&record.personne)
                .is_none_or(|cutoff| record.date >= *cutoff)
    });
    before - records.len()
}

/// Copies the measurements of each person's first recorded realisation onto
/// their first previsionnel record. Returns the number of aligned people.
pub fn align_first_previsionnel_with_first_realisation(records: &mut [Record]) -> usize {
    let actuals = earliest_by_person(records, is_recorded_realisation);
    let plans = earliest_by_person(records, is_previsionnel);

    let mut aligned = 0;
    for (person, plan_index) in plans {
        let Some(actual_index) = actuals.get(&person) else {
            continue;
        };
        let source = records[*actual_index].clone();
        debug!(
            person = %person,
            plan = %records[plan_index].date,
            actual = %source.date,
            "seeding first previsionnel from realisation"
        );
        records[plan_index].copy_measurements_from(&source);
        aligned += 1;
    }
    aligned
}

/// Applies both rules in order.
pub fn reconcile(records: &mut Vec<Record>) {
    let dropped = drop_previsionnel_before_first_realisation(records);
    let aligned = align_first_previsionnel_with_first_realisation(records);
    info!(dropped, aligned, "reconciled series");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suivi::tools::model::Measure;

    fn date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn record(person: &str, month: u32, series: SeriesType, dips: Option<f64>) -> Record {
        Record::new(person, date(2025, month), series).with(Measure::Dips, dips)
    }

    fn dates(records: &[Record], person: &str, series: SeriesType) -> Vec<NaiveDate> {
        let mut dates: Vec<_> = records
            .iter()
            .filter(|record| record.personne == person && record.series == series)
            .map(|record| record.date)
            .collect();
        dates.sort();
        dates
    }

    #[test]
    fn earliest_index_follows_date_not_position() {
        let records = vec![
            record("Rayan", 10, SeriesType::Realisation, Some(12.0)),
            record("Rayan", 6, SeriesType::Realisation, None),
            record("Rayan", 8, SeriesType::Realisation, Some(11.0)),
            record("Rayan", 8, SeriesType::Previsionnel, Some(7.0)),
            record("Rayan", 6, SeriesType::Previsionnel, Some(5.0)),
        ];
        let actuals = earliest_by_person(&records, is_recorded_realisation);
        assert_eq!(actuals.get("Rayan"), Some(&2));
        let plans = earliest_by_person(&records, is_previsionnel);
        assert_eq!(plans.get("Rayan"), Some(&4));
    }

    #[test]
    fn drops_plan_before_first_recorded_actual() {
        let mut records = vec![
            record("Rayan", 6, SeriesType::Previsionnel, Some(0.0)),
            record("Rayan", 8, SeriesType::Previsionnel, Some(7.0)),
            record("Rayan", 6, SeriesType::Realisation, None),
            record("Rayan", 8, SeriesType::Realisation, Some(11.0)),
        ];

        let dropped = drop_previsionnel_before_first_realisation(&mut records);
        assert_eq!(dropped, 1);
        assert_eq!(
            dates(&records, "Rayan", SeriesType::Previsionnel),
            vec![date(2025, 8)]
        );
        assert_eq!(dates(&records, "Rayan", SeriesType::Realisation).len(), 2);
    }

    #[test]
    fn plan_is_kept_without_any_actual() {
        let mut records = vec![
            record("Lina", 6, SeriesType::Previsionnel, Some(4.0)),
            record("Lina", 8, SeriesType::Previsionnel, Some(5.0)),
            record("Lina", 6, SeriesType::Realisation, None),
        ];
        assert_eq!(drop_previsionnel_before_first_realisation(&mut records), 0);
        assert_eq!(align_first_previsionnel_with_first_realisation(&mut records), 0);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].dips, Some(4.0));
    }

    #[test]
    fn first_plan_is_seeded_from_first_actual() {
        let mut records = vec![
            record("Rayan", 8, SeriesType::Previsionnel, Some(7.0)),
            record("Rayan", 10, SeriesType::Previsionnel, Some(10.0)),
            record("Rayan", 8, SeriesType::Realisation, Some(11.0))
                .with(Measure::Poids, Some(70.0)),
            record("Rayan", 10, SeriesType::Realisation, Some(12.0)),
        ];

        let aligned = align_first_previsionnel_with_first_realisation(&mut records);
        assert_eq!(aligned, 1);
        assert_eq!(records[0].dips, Some(11.0));
        assert_eq!(records[0].poids, Some(70.0));
        assert_eq!(records[0].date, date(2025, 8));
        assert_eq!(records[0].series, SeriesType::Previsionnel);
        assert_eq!(records[1].dips, Some(10.0));
    }

    #[test]
    fn rules_apply_per_person() {
        let mut records = vec![
            record("A", 6, SeriesType::Previsionnel, Some(1.0)),
            record("A", 8, SeriesType::Realisation, Some(2.0)),
            record("B", 6, SeriesType::Previsionnel, Some(3.0)),
            record("B", 6, SeriesType::Realisation, Some(4.0)),
        ];
        reconcile(&mut records);
        assert!(dates(&records, "A", SeriesType::Previsionnel).is_empty());
        let b_plan = records
            .iter()
            .find(|r| r.personne == "B" && r.series == SeriesType::Previsionnel)
            .unwrap();
        assert_eq!(b_plan.dips, Some(4.0));
    }

    #[test]
    fn reconciling_twice_changes_nothing() {
        let mut records = vec![
            record("Rayan", 6, SeriesType::Previsionnel, Some(0.0)),
            record("Rayan", 8, SeriesType::Previsionnel, Some(7.0)),
            record("Rayan", 10, SeriesType::Previsionnel, Some(10.0)),
            record("Rayan", 6, SeriesType::Realisation, None),
            record("Rayan", 8, SeriesType::Realisation, Some(11.0)),
            record("Rayan", 10, SeriesType::Realisation, Some(12.0)),
            record("Zoé", 8, SeriesType::Previsionnel, Some(3.0)),
        ];
        reconcile(&mut records);
        let once = records.clone();
        reconcile(&mut records);
        assert_eq!(records, once);
    }
}

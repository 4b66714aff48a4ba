//! Month-to-month variations of the recorded actuals, and the best value
//! reached on each metric. Planned values are ignored.

use chrono::NaiveDate;
use serde::Serialize;

use super::{METRICS, Metric, Unit, group_by_person};
use crate::suivi::tools::model::{Measure, Record, SeriesType};

/// Change of one metric between two consecutive recorded months of a person.
///
/// `delta` is positive when the person improved, whichever direction the
/// metric counts as better.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepVariation {
    pub personne: String,
    pub metric: Measure,
    pub label: &'static str,
    pub unit: Unit,
    pub lower_is_better: bool,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub from_value: f64,
    pub to_value: f64,
    pub delta: f64,
}

/// Best recorded value of a metric across everyone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalRecord {
    pub personne: String,
    pub metric: Measure,
    pub label: &'static str,
    pub unit: Unit,
    pub value: f64,
    pub date: NaiveDate,
}

/// Largest and smallest step of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricExtremes {
    pub metric: Measure,
    pub label: &'static str,
    pub unit: Unit,
    pub best: Option<StepVariation>,
    pub worst: Option<StepVariation>,
}

type Point = (NaiveDate, f64);

fn variation(metric: &Metric, person: &str, from: Point, to: Point) -> StepVariation {
    let delta = if metric.lower_is_better {
        from.1 - to.1
    } else {
        to.1 - from.1
    };
    StepVariation {
        personne: person.to_string(),
        metric: metric.measure,
        label: metric.label,
        unit: metric.unit,
        lower_is_better: metric.lower_is_better,
        from_date: from.0,
        to_date: to.0,
        from_value: from.1,
        to_value: to.1,
        delta,
    }
}

/// Recorded values of one metric per person, in date order.
fn recorded_points<'a>(records: &'a [Record], measure: Measure) -> Vec<(&'a str, Vec<Point>)> {
    group_by_person(records, SeriesType::Realisation)
        .into_iter()
        .map(|(person, rows)| {
            let points: Vec<Point> = rows
                .iter()
                .filter_map(|record| record.get(measure).map(|value| (record.date, value)))
                .collect();
            (person, points)
        })
        .collect()
}

/// Every consecutive step, metric by metric.
pub fn all_step_variations(records: &[Record]) -> Vec<StepVariation> {
    let mut steps = Vec::new();
    for metric in &METRICS {
        for (person, points) in recorded_points(records, metric.measure) {
            steps.extend(
                points
                    .windows(2)
                    .map(|pair| variation(metric, person, pair[0], pair[1])),
            );
        }
    }
    steps
}

/// The latest step of each person on each metric.
pub fn last_step_variations(records: &[Record]) -> Vec<StepVariation> {
    let mut steps = Vec::new();
    for metric in &METRICS {
        for (person, points) in recorded_points(records, metric.measure) {
            if let [.., from, to] = points.as_slice() {
                steps.push(variation(metric, person, *from, *to));
            }
        }
    }
    steps
}

/// Keeps the first step for which `better` holds against every later one.
fn pick(
    steps: impl IntoIterator<Item = StepVariation>,
    better: fn(f64, f64) -> bool,
) -> Option<StepVariation> {
    steps
        .into_iter()
        .reduce(|kept, step| if better(step.delta, kept.delta) { step } else { kept })
}

fn larger(candidate: f64, kept: f64) -> bool {
    candidate > kept
}

fn smaller(candidate: f64, kept: f64) -> bool {
    candidate < kept
}

pub fn best_global_progression(records: &[Record]) -> Option<StepVariation> {
    pick(all_step_variations(records), larger)
}

pub fn best_recent_progression(records: &[Record]) -> Option<StepVariation> {
    pick(last_step_variations(records), larger)
}

pub fn worst_regression(records: &[Record]) -> Option<StepVariation> {
    pick(all_step_variations(records), smaller)
}

/// Best recorded value of each metric. Metrics nobody recorded are left out;
/// on a tie the earliest record in `records` wins.
pub fn global_records(records: &[Record]) -> Vec<GlobalRecord> {
    METRICS
        .iter()
        .filter_map(|metric| {
            let (holder, value) = records
                .iter()
                .filter(|record| record.series == SeriesType::Realisation)
                .filter_map(|record| record.get(metric.measure).map(|value| (record, value)))
                .reduce(|kept, candidate| {
                    let beats = if metric.lower_is_better {
                        candidate.1 < kept.1
                    } else {
                        candidate.1 > kept.1
                    };
                    if beats { candidate } else { kept }
                })?;
            Some(GlobalRecord {
                personne: holder.personne.clone(),
                metric: metric.measure,
                label: metric.label,
                unit: metric.unit,
                value,
                date: holder.date,
            })
        })
        .collect()
}

/// Best and worst step of every metric, including metrics without any step.
pub fn best_and_worst_by_metric(records: &[Record]) -> Vec<MetricExtremes> {
    let steps = all_step_variations(records);
    METRICS
        .iter()
        .map(|metric| {
            let scoped = || steps.iter().filter(|step| step.metric == metric.measure).cloned();
            MetricExtremes {
                metric: metric.measure,
                label: metric.label,
                unit: metric.unit,
                best: pick(scoped(), larger),
                worst: pick(scoped(), smaller),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, 1).unwrap()
    }

    fn actual(person: &str, month: u32) -> Record {
        Record::new(person, date(month), SeriesType::Realisation)
    }

    fn sample() -> Vec<Record> {
        vec![
            actual("Rayan", 6)
                .with(Measure::Dips, Some(10.0))
                .with(Measure::Sprint100mSec, Some(15.0)),
            actual("Rayan", 10)
                .with(Measure::Dips, Some(11.0))
                .with(Measure::Sprint100mSec, Some(14.5)),
            actual("Rayan", 8)
                .with(Measure::Dips, Some(12.0))
                .with(Measure::Sprint100mSec, Some(14.0)),
            actual("Zoé", 6).with(Measure::Dips, Some(5.0)),
            actual("Zoé", 8).with(Measure::Dips, Some(9.0)),
            actual("Zoé", 10).with(Measure::Dips, Some(9.0)),
            Record::new("Rayan", date(10), SeriesType::Previsionnel).with(Measure::Dips, Some(30.0)),
        ]
    }

    fn summary(step: &StepVariation) -> (&str, Measure, NaiveDate, f64) {
        (step.personne.as_str(), step.metric, step.to_date, step.delta)
    }

    #[test]
    fn steps_follow_dates_and_better_direction() {
        let records = sample();
        let steps = all_step_variations(&records);
        let found: Vec<_> = steps.iter().map(summary).collect();
        assert_eq!(
            found,
            vec![
                ("Rayan", Measure::Dips, date(8), 2.0),
                ("Rayan", Measure::Dips, date(10), -1.0),
                ("Zoé", Measure::Dips, date(8), 4.0),
                ("Zoé", Measure::Dips, date(10), 0.0),
                ("Rayan", Measure::Sprint100mSec, date(8), 1.0),
                ("Rayan", Measure::Sprint100mSec, date(10), -0.5),
            ]
        );
    }

    #[test]
    fn last_steps_keep_one_per_person_and_metric() {
        let records = sample();
        let last = last_step_variations(&records);
        assert_eq!(last.len(), 3);
        assert!(last.iter().all(|step| step.to_date == date(10)));
        assert_eq!(last[0].from_date, date(8));
    }

    #[test]
    fn best_and_worst_steps() {
        let records = sample();

        let best = best_global_progression(&records).unwrap();
        assert_eq!(summary(&best), ("Zoé", Measure::Dips, date(8), 4.0));
        assert_eq!((best.from_value, best.to_value), (5.0, 9.0));

        let recent = best_recent_progression(&records).unwrap();
        assert_eq!(summary(&recent), ("Zoé", Measure::Dips, date(10), 0.0));

        let worst = worst_regression(&records).unwrap();
        assert_eq!(summary(&worst), ("Rayan", Measure::Dips, date(10), -1.0));

        assert_eq!(best_global_progression(&[]), None);
        assert_eq!(worst_regression(&[actual("Solo", 6).with(Measure::Dips, Some(1.0))]), None);
    }

    #[test]
    fn ties_keep_the_first_step() {
        let records = vec![
            actual("A", 6).with(Measure::Pompes, Some(10.0)),
            actual("A", 8).with(Measure::Pompes, Some(13.0)),
            actual("B", 6).with(Measure::Pompes, Some(20.0)),
            actual("B", 8).with(Measure::Pompes, Some(23.0)),
        ];
        assert_eq!(best_global_progression(&records).unwrap().personne, "A");
        assert_eq!(worst_regression(&records).unwrap().personne, "A");
    }

    #[test]
    fn records_use_actuals_only() {
        let records = sample();
        let best = global_records(&records);
        let found: Vec<(Measure, &str, f64, NaiveDate)> = best
            .iter()
            .map(|record| (record.metric, record.personne.as_str(), record.value, record.date))
            .collect();
        assert_eq!(
            found,
            vec![
                (Measure::Dips, "Rayan", 12.0, date(8)),
                (Measure::Sprint100mSec, "Rayan", 14.0, date(8)),
            ]
        );
    }

    #[test]
    fn extremes_cover_every_metric() {
        let records = sample();
        let extremes = best_and_worst_by_metric(&records);
        assert_eq!(extremes.len(), METRICS.len());

        let dips = &extremes[0];
        assert_eq!(dips.label, "Dips");
        assert_eq!(dips.best.as_ref().map(|step| step.delta), Some(4.0));
        assert_eq!(dips.worst.as_ref().map(|step| step.delta), Some(-1.0));

        let pompes = &extremes[1];
        assert_eq!(pompes.metric, Measure::Pompes);
        assert!(pompes.best.is_none() && pompes.worst.is_none());

        let sprint = &extremes[6];
        assert_eq!(sprint.unit, Unit::Seconds);
        assert_eq!(sprint.best.as_ref().map(|step| step.delta), Some(1.0));
    }
}

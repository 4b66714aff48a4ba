//! Per-person evolution scores and group indicators.
//!
//! A person's score is the mean first-to-last progression over every metric
//! they recorded at least twice, clamped to ±100 and rounded to a tenth.
//! Momentum is the same mean taken over the latest step only.

use chrono::NaiveDate;
use serde::Serialize;

use super::{METRICS, Metric, group_by_person, mean, relative_change, round_tenth};
use crate::suivi::tools::model::{Measure, Record, SeriesType};

/// Momentum above which a person is accelerating, and below whose negative
/// they are adjusting.
pub const MOMENTUM_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MomentumBadge {
    Acceleration,
    Stable,
    #[serde(rename = "Phase d'ajustement")]
    Adjustment,
}

impl MomentumBadge {
    pub fn label(self) -> &'static str {
        match self {
            MomentumBadge::Acceleration => "Acceleration",
            MomentumBadge::Stable => "Stable",
            MomentumBadge::Adjustment => "Phase d'ajustement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonSummary {
    pub personne: String,
    pub score: f64,
    pub recent_momentum: f64,
    pub badge: MomentumBadge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupKpis {
    /// Metric series, across people, whose latest step was an improvement.
    pub positive_recent_count: usize,
    pub average_progression_pct: f64,
    /// Metrics where the latest actual meets the latest planned value.
    pub goals_reached: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorePoint {
    pub date: NaiveDate,
    pub score: f64,
}

struct MetricStat {
    metric: &'static Metric,
    progress_pct: f64,
    recent_pct: f64,
}

/// Change used for scoring: a zero starting value counts as no change.
fn change_pct(first: f64, last: f64, lower_is_better: bool) -> f64 {
    if first == 0.0 {
        0.0
    } else {
        relative_change(first, last, lower_is_better)
    }
}

fn latest_value(rows: &[&Record], measure: Measure) -> Option<f64> {
    rows.iter().rev().find_map(|record| record.get(measure))
}

fn metric_stats(rows: &[&Record]) -> Vec<MetricStat> {
    METRICS
        .iter()
        .filter_map(|metric| {
            let values: Vec<f64> = rows.iter().filter_map(|record| record.get(metric.measure)).collect();
            let [.., previous, last] = values.as_slice() else {
                return None;
            };
            Some(MetricStat {
                metric,
                progress_pct: change_pct(values[0], *last, metric.lower_is_better),
                recent_pct: change_pct(*previous, *last, metric.lower_is_better),
            })
        })
        .collect()
}

fn score_of(rows: &[&Record]) -> Option<f64> {
    let progressions: Vec<f64> = metric_stats(rows).iter().map(|stat| stat.progress_pct).collect();
    mean(&progressions).map(|average| round_tenth(average.clamp(-100.0, 100.0)))
}

fn momentum_of(rows: &[&Record]) -> f64 {
    let Some((latest, earlier)) = rows.split_last() else {
        return 0.0;
    };
    let changes: Vec<f64> = METRICS
        .iter()
        .filter_map(|metric| {
            let last = latest.get(metric.measure)?;
            let previous = latest_value(earlier, metric.measure)?;
            Some(change_pct(previous, last, metric.lower_is_better))
        })
        .collect();
    mean(&changes).map(round_tenth).unwrap_or(0.0)
}

fn score_series(rows: &[&Record]) -> Vec<ScorePoint> {
    let mut dates: Vec<NaiveDate> = rows.iter().map(|record| record.date).collect();
    dates.dedup();
    dates
        .into_iter()
        .filter_map(|date| {
            let seen = rows.partition_point(|record| record.date <= date);
            score_of(&rows[..seen]).map(|score| ScorePoint { date, score })
        })
        .collect()
}

fn actuals_of<'a>(records: &'a [Record], person: &str) -> Vec<&'a Record> {
    let mut rows: Vec<&Record> = records
        .iter()
        .filter(|record| record.series == SeriesType::Realisation && record.personne == person)
        .collect();
    rows.sort_by_key(|record| record.date);
    rows
}

/// Evolution score of `person`, 0 when nothing was recorded twice.
pub fn evolution_score(records: &[Record], person: &str) -> f64 {
    score_of(&actuals_of(records, person)).unwrap_or(0.0)
}

/// Mean progression between each metric's latest recorded value and the
/// one before it. Only metrics recorded in the person's latest month count.
pub fn recent_momentum(records: &[Record], person: &str) -> f64 {
    momentum_of(&actuals_of(records, person))
}

pub fn momentum_badge(momentum: f64) -> MomentumBadge {
    if momentum > MOMENTUM_THRESHOLD {
        MomentumBadge::Acceleration
    } else if momentum < -MOMENTUM_THRESHOLD {
        MomentumBadge::Adjustment
    } else {
        MomentumBadge::Stable
    }
}

/// Labels of up to three metrics that regressed the most since the first
/// recorded value, worst first.
pub fn improvement_zones(records: &[Record], person: &str) -> Vec<&'static str> {
    let mut regressions: Vec<MetricStat> = metric_stats(&actuals_of(records, person))
        .into_iter()
        .filter(|stat| stat.progress_pct < 0.0)
        .collect();
    regressions.sort_by(|lhs, rhs| lhs.progress_pct.total_cmp(&rhs.progress_pct));
    regressions
        .iter()
        .take(3)
        .map(|stat| stat.metric.label)
        .collect()
}

pub fn group_kpis(records: &[Record]) -> GroupKpis {
    let plans = group_by_person(records, SeriesType::Previsionnel);
    let mut positive_recent_count = 0;
    let mut goals_reached = 0;
    let mut progressions = Vec::new();

    for (person, actuals) in group_by_person(records, SeriesType::Realisation) {
        for stat in metric_stats(&actuals) {
            progressions.push(stat.progress_pct);
            if stat.recent_pct > 0.0 {
                positive_recent_count += 1;
            }
        }

        let targets = plans
            .iter()
            .find(|(planned, _)| *planned == person)
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or_default();
        for metric in &METRICS {
            let (Some(actual), Some(target)) = (
                latest_value(&actuals, metric.measure),
                latest_value(targets, metric.measure),
            ) else {
                continue;
            };
            let reached = if metric.lower_is_better {
                actual <= target
            } else {
                actual >= target
            };
            if reached {
                goals_reached += 1;
            }
        }
    }

    GroupKpis {
        positive_recent_count,
        average_progression_pct: mean(&progressions).map(round_tenth).unwrap_or(0.0),
        goals_reached,
    }
}

/// Score of `person` as it stood at each of their recorded months. Months
/// before any metric was recorded twice are left out.
pub fn person_score_series(records: &[Record], person: &str) -> Vec<ScorePoint> {
    score_series(&actuals_of(records, person))
}

/// Mean of everyone's latest known score at each recorded month. People
/// without a score yet are left out of the mean; a month where nobody has
/// one scores 0.
pub fn group_average_series(records: &[Record]) -> Vec<ScorePoint> {
    let people = group_by_person(records, SeriesType::Realisation);
    let series: Vec<Vec<ScorePoint>> = people.iter().map(|(_, rows)| score_series(rows)).collect();

    let mut dates: Vec<NaiveDate> = people
        .iter()
        .flat_map(|(_, rows)| rows.iter().map(|record| record.date))
        .collect();
    dates.sort();
    dates.dedup();

    dates
        .into_iter()
        .map(|date| {
            let scores: Vec<f64> = series
                .iter()
                .filter_map(|points| {
                    let seen = points.partition_point(|point| point.date <= date);
                    seen.checked_sub(1).map(|last| points[last].score)
                })
                .collect();
            ScorePoint {
                date,
                score: mean(&scores).map(round_tenth).unwrap_or(0.0),
            }
        })
        .collect()
}

/// Difference between the last and first points of the person's score series.
pub fn total_variation(records: &[Record], person: &str) -> f64 {
    match person_score_series(records, person).as_slice() {
        [first, .., last] => round_tenth(last.score - first.score),
        _ => 0.0,
    }
}

/// One summary per person with recorded actuals, sorted by name.
pub fn person_summaries(records: &[Record]) -> Vec<PersonSummary> {
    let mut people = group_by_person(records, SeriesType::Realisation);
    people.sort_by(|(lhs, _), (rhs, _)| lhs.to_lowercase().cmp(&rhs.to_lowercase()).then(lhs.cmp(rhs)));

    people
        .into_iter()
        .map(|(person, rows)| {
            let recent_momentum = momentum_of(&rows);
            PersonSummary {
                personne: person.to_string(),
                score: score_of(&rows).unwrap_or(0.0),
                recent_momentum,
                badge: momentum_badge(recent_momentum),
            }
        })
        .collect()
}

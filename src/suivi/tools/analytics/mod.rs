//! Statistics over an extracted [`Dataset`]: progression rates, linear
//! trends, month-to-month variations, records and evolution scores.
//!
//! Only the eight exercise measurements are analysed. Body weight is carried
//! through the exports but never scored.

pub mod challenge;
pub mod evolution;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::suivi::tools::model::{Dataset, Measure, Record, SeriesType};

use self::challenge::{GlobalRecord, StepVariation};
use self::evolution::{GroupKpis, PersonSummary};

/// Display unit of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "reps")]
    Reps,
    #[serde(rename = "min")]
    Minutes,
    #[serde(rename = "sec")]
    Seconds,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Reps => "reps",
            Unit::Minutes => "min",
            Unit::Seconds => "sec",
        }
    }
}

/// How a measurement is labelled and which direction counts as progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    pub measure: Measure,
    pub label: &'static str,
    pub unit: Unit,
    pub lower_is_better: bool,
}

impl Metric {
    const fn new(measure: Measure, label: &'static str, unit: Unit, lower_is_better: bool) -> Self {
        Self {
            measure,
            label,
            unit,
            lower_is_better,
        }
    }

    pub fn of(measure: Measure) -> Option<&'static Metric> {
        METRICS.iter().find(|metric| metric.measure == measure)
    }
}

/// The analysed measurements, in export order.
pub static METRICS: [Metric; 8] = [
    Metric::new(Measure::Dips, "Dips", Unit::Reps, false),
    Metric::new(Measure::Pompes, "Pompes", Unit::Reps, false),
    Metric::new(Measure::TractionPro, "Tractions pronation", Unit::Reps, false),
    Metric::new(Measure::TractionSup, "Tractions supination", Unit::Reps, false),
    Metric::new(Measure::PlancheSec, "Planche", Unit::Minutes, false),
    Metric::new(Measure::SupermanSec, "Superman", Unit::Minutes, false),
    Metric::new(Measure::Sprint100mSec, "100m", Unit::Seconds, true),
    Metric::new(Measure::Run5kmSec, "5km", Unit::Minutes, true),
];

/// Signed percentage change from `first` to `last`, positive when the
/// value moved in the better direction. `first` must not be zero.
fn relative_change(first: f64, last: f64, lower_is_better: bool) -> f64 {
    let raw = (last - first) / first.abs() * 100.0;
    if lower_is_better { -raw } else { raw }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Records of one series grouped by person, in order of first appearance,
/// each group sorted by date.
fn group_by_person(records: &[Record], series: SeriesType) -> Vec<(&str, Vec<&Record>)> {
    let mut groups: Vec<(&str, Vec<&Record>)> = Vec::new();
    for record in records.iter().filter(|record| record.series == series) {
        match groups
            .iter_mut()
            .find(|(person, _)| *person == record.personne.as_str())
        {
            Some((_, rows)) => rows.push(record),
            None => groups.push((record.personne.as_str(), vec![record])),
        }
    }
    for (_, rows) in &mut groups {
        rows.sort_by_key(|record| record.date);
    }
    groups
}

/// Percentage change between the first and last recorded values.
///
/// Missing values are skipped. Fewer than two recorded values, or a first
/// value of zero, give `None`.
pub fn progression_pct<I>(values: I, lower_is_better: bool) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut recorded = values.into_iter().flatten();
    let first = recorded.next()?;
    let last = recorded.last()?;
    if first == 0.0 {
        return None;
    }
    Some(relative_change(first, last, lower_is_better))
}

/// A least-squares line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

impl Trend {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a line through `(x, y)` points. Needs two points with distinct `x`.
pub fn linear_trend(points: &[(f64, f64)]) -> Option<Trend> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_xx) = points.iter().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sum_x, sum_y, sum_xy, sum_xx), (x, y)| (sum_x + x, sum_y + y, sum_xy + x * y, sum_xx + x * x),
    );

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some(Trend { slope, intercept })
}

/// Extrapolates the next value of `measure` along its trend.
///
/// Each record sits at its 1-based position in `records`; records missing
/// the measurement are left out of the fit. The projection is taken one
/// step past the number of fitted points.
pub fn project_next_value(records: &[Record], measure: Measure) -> Option<f64> {
    let points: Vec<(f64, f64)> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| record.get(measure).map(|y| ((index + 1) as f64, y)))
        .collect();
    let trend = linear_trend(&points)?;
    Some(trend.at((points.len() + 1) as f64))
}

/// Reward for a progression percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressBadge {
    #[serde(rename = "amelioration rapide")]
    RapidImprovement,
    #[serde(rename = "objectif atteint")]
    GoalReached,
}

impl ProgressBadge {
    pub fn label(self) -> &'static str {
        match self {
            ProgressBadge::RapidImprovement => "amelioration rapide",
            ProgressBadge::GoalReached => "objectif atteint",
        }
    }
}

pub fn badge_from_progress(progress: Option<f64>) -> Option<ProgressBadge> {
    match progress? {
        pct if pct >= 20.0 => Some(ProgressBadge::RapidImprovement),
        pct if pct >= 10.0 => Some(ProgressBadge::GoalReached),
        _ => None,
    }
}

/// Selection applied by [`filter_records`]. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    /// People to keep, by exact name. Empty keeps everyone.
    pub people: Vec<String>,
    /// Series to keep.
    pub series: Vec<SeriesType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            people: Vec::new(),
            series: vec![SeriesType::Realisation, SeriesType::Previsionnel],
            from: None,
            to: None,
        }
    }
}

impl RecordFilter {
    pub fn matches(&self, record: &Record) -> bool {
        (self.people.is_empty() || self.people.contains(&record.personne))
            && self.series.contains(&record.series)
            && self.from.is_none_or(|from| record.date >= from)
            && self.to.is_none_or(|to| record.date <= to)
    }
}

pub fn filter_records<'a>(records: &'a [Record], filter: &RecordFilter) -> Vec<&'a Record> {
    records.iter().filter(|record| filter.matches(record)).collect()
}

/// Headline statistics for a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub group: GroupKpis,
    pub people: Vec<PersonSummary>,
    pub records: Vec<GlobalRecord>,
    pub best_progression: Option<StepVariation>,
    pub best_recent_progression: Option<StepVariation>,
    pub worst_regression: Option<StepVariation>,
}

#[instrument(level = "debug", skip_all, fields(records = dataset.records.len()))]
pub fn overview(dataset: &Dataset) -> Overview {
    let records = &dataset.records;
    let overview = Overview {
        group: evolution::group_kpis(records),
        people: evolution::person_summaries(records),
        records: challenge::global_records(records),
        best_progression: challenge::best_global_progression(records),
        best_recent_progression: challenge::best_recent_progression(records),
        worst_regression: challenge::worst_regression(records),
    };
    debug!(
        people = overview.people.len(),
        records = overview.records.len(),
        "computed overview"
    );
    overview
}

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column order shared by the tabular and structured exports.
pub const OUTPUT_COLUMNS: [&str; 12] = [
    "personne",
    "date",
    "type",
    "dips",
    "pompes",
    "traction_pro",
    "traction_sup",
    "planche_sec",
    "superman_sec",
    "sprint_100m_sec",
    "run_5km_sec",
    "poids",
];

/// The two parallel measurement series tracked for every person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    /// Recorded actuals.
    Realisation,
    /// Planned values.
    Previsionnel,
}

impl SeriesType {
    /// Wire name used in every export.
    pub fn as_str(self) -> &'static str {
        match self {
            SeriesType::Realisation => "realisation",
            SeriesType::Previsionnel => "previsionnel",
        }
    }

    /// Section marker that introduces this series inside a sheet.
    pub fn section_label(self) -> &'static str {
        match self {
            SeriesType::Realisation => "RÉALISATION",
            SeriesType::Previsionnel => "PRÉVISIONNEL",
        }
    }
}

impl fmt::Display for SeriesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the nine canonical measurement slots. Serialises as its export
/// field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Measure {
    #[serde(rename = "dips")]
    Dips,
    #[serde(rename = "pompes")]
    Pompes,
    #[serde(rename = "traction_pro")]
    TractionPro,
    #[serde(rename = "traction_sup")]
    TractionSup,
    #[serde(rename = "planche_sec")]
    PlancheSec,
    #[serde(rename = "superman_sec")]
    SupermanSec,
    #[serde(rename = "sprint_100m_sec")]
    Sprint100mSec,
    #[serde(rename = "run_5km_sec")]
    Run5kmSec,
    #[serde(rename = "poids")]
    Poids,
}

impl Measure {
    /// Every measurement in export order.
    pub const ALL: [Measure; 9] = [
        Measure::Dips,
        Measure::Pompes,
        Measure::TractionPro,
        Measure::TractionSup,
        Measure::PlancheSec,
        Measure::SupermanSec,
        Measure::Sprint100mSec,
        Measure::Run5kmSec,
        Measure::Poids,
    ];

    /// Canonical field name as written in the exports.
    pub fn field_name(self) -> &'static str {
        match self {
            Measure::Dips => "dips",
            Measure::Pompes => "pompes",
            Measure::TractionPro => "traction_pro",
            Measure::TractionSup => "traction_sup",
            Measure::PlancheSec => "planche_sec",
            Measure::SupermanSec => "superman_sec",
            Measure::Sprint100mSec => "sprint_100m_sec",
            Measure::Run5kmSec => "run_5km_sec",
            Measure::Poids => "poids",
        }
    }

    /// Whether cells for this measurement hold a duration rather than a
    /// plain number. The 100 m sprint is entered directly in seconds.
    pub fn is_duration(self) -> bool {
        matches!(
            self,
            Measure::PlancheSec | Measure::SupermanSec | Measure::Run5kmSec
        )
    }
}

/// A normalized row of the clean dataset.
///
/// The field layout doubles as the export schema, which is why the nine
/// measurements are kept flat instead of nested in a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub personne: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub series: SeriesType,
    pub dips: Option<f64>,
    pub pompes: Option<f64>,
    pub traction_pro: Option<f64>,
    pub traction_sup: Option<f64>,
    pub planche_sec: Option<f64>,
    pub superman_sec: Option<f64>,
    pub sprint_100m_sec: Option<f64>,
    pub run_5km_sec: Option<f64>,
    pub poids: Option<f64>,
}

impl Record {
    /// Creates a record with every measurement missing.
    pub fn new(personne: impl Into<String>, date: NaiveDate, series: SeriesType) -> Self {
        Self {
            personne: personne.into(),
            date,
            series,
            dips: None,
            pompes: None,
            traction_pro: None,
            traction_sup: None,
            planche_sec: None,
            superman_sec: None,
            sprint_100m_sec: None,
            run_5km_sec: None,
            poids: None,
        }
    }

    /// Builder-style setter, mostly convenient in tests.
    pub fn with(mut self, measure: Measure, value: Option<f64>) -> Self {
        self.set(measure, value);
        self
    }

    pub fn get(&self, measure: Measure) -> Option<f64> {
        *self.slot(measure)
    }

    pub fn set(&mut self, measure: Measure, value: Option<f64>) {
        *self.slot_mut(measure) = value;
    }

    /// True when at least one measurement was recorded.
    pub fn has_measurements(&self) -> bool {
        Measure::ALL.iter().any(|measure| self.get(*measure).is_some())
    }

    /// Overwrites every measurement with the values held by `source`.
    pub fn copy_measurements_from(&mut self, source: &Record) {
        for measure in Measure::ALL {
            self.set(measure, source.get(measure));
        }
    }

    fn slot(&self, measure: Measure) -> &Option<f64> {
        match measure {
            Measure::Dips => &self.dips,
            Measure::Pompes => &self.pompes,
            Measure::TractionPro => &self.traction_pro,
            Measure::TractionSup => &self.traction_sup,
            Measure::PlancheSec => &self.planche_sec,
            Measure::SupermanSec => &self.superman_sec,
            Measure::Sprint100mSec => &self.sprint_100m_sec,
            Measure::Run5kmSec => &self.run_5km_sec,
            Measure::Poids => &self.poids,
        }
    }

    fn slot_mut(&mut self, measure: Measure) -> &mut Option<f64> {
        match measure {
            Measure::Dips => &mut self.dips,
            Measure::Pompes => &mut self.pompes,
            Measure::TractionPro => &mut self.traction_pro,
            Measure::TractionSup => &mut self.traction_sup,
            Measure::PlancheSec => &mut self.planche_sec,
            Measure::SupermanSec => &mut self.superman_sec,
            Measure::Sprint100mSec => &mut self.sprint_100m_sec,
            Measure::Run5kmSec => &mut self.run_5km_sec,
            Measure::Poids => &mut self.poids,
        }
    }

    /// Export ordering: person (case-insensitive), then series name, then date.
    pub fn export_order(&self, other: &Record) -> Ordering {
        self.personne
            .to_lowercase()
            .cmp(&other.personne.to_lowercase())
            .then_with(|| self.series.as_str().cmp(other.series.as_str()))
            .then_with(|| self.date.cmp(&other.date))
    }
}

/// Per-sheet metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonMeta {
    pub personne: String,
    pub gage: Option<String>,
}

impl PersonMeta {
    pub fn new(personne: impl Into<String>, gage: Option<String>) -> Self {
        Self {
            personne: personne.into(),
            gage,
        }
    }
}

/// Everything one run produces, owned in one place until it is exported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub people: Vec<PersonMeta>,
}

impl Dataset {
    /// Applies the deterministic export ordering to both collections.
    pub fn sort(&mut self) {
        self.records.sort_by(Record::export_order);
        self.people
            .sort_by(|lhs, rhs| lhs.personne.to_lowercase().cmp(&rhs.personne.to_lowercase()));
    }

    /// Gage of the named person. Names match after trimming and
    /// lower-casing.
    pub fn person_gage(&self, name: &str) -> Option<&str> {
        let target = name.trim().to_lowercase();
        self.people
            .iter()
            .find(|meta| meta.personne.trim().to_lowercase() == target)
            .and_then(|meta| meta.gage.as_deref())
    }

    /// Distinct person names found in the records, in export order.
    pub fn person_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in &self.records {
            if !names.contains(&record.personne.as_str()) {
                names.push(&record.personne);
            }
        }
        names.sort_by(|lhs, rhs| lhs.to_lowercase().cmp(&rhs.to_lowercase()).then(lhs.cmp(rhs)));
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, 1).unwrap()
    }

    #[test]
    fn measures_serialise_as_field_names() {
        for measure in Measure::ALL {
            assert_eq!(
                serde_json::to_value(measure).unwrap(),
                serde_json::Value::from(measure.field_name())
            );
        }
    }

    #[test]
    fn gage_lookup_ignores_case_and_padding() {
        let dataset = Dataset {
            records: Vec::new(),
            people: vec![
                PersonMeta::new("Rayan", Some("Courir".to_string())),
                PersonMeta::new("Zoé", None),
            ],
        };
        assert_eq!(dataset.person_gage(" rayan "), Some("Courir"));
        assert_eq!(dataset.person_gage("ZOÉ"), None);
        assert_eq!(dataset.person_gage("Bob"), None);
    }

    #[test]
    fn person_names_are_distinct_and_sorted() {
        let dataset = Dataset {
            records: vec![
                Record::new("zoé", date(6), SeriesType::Realisation),
                Record::new("Adam", date(6), SeriesType::Previsionnel),
                Record::new("zoé", date(8), SeriesType::Realisation),
            ],
            people: Vec::new(),
        };
        assert_eq!(dataset.person_names(), vec!["Adam", "zoé"]);
    }
}

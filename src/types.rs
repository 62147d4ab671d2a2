use crate::source::EnergySource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tabled::Tabled;

/// Raw column names for the descriptive fields.
pub const REGION_COLUMN: &str = "nom_region";
pub const DEPARTMENT_COLUMN: &str = "nom_departement";
pub const YEAR_COLUMN: &str = "annee";

/// One CSV row as read from the Enedis export; everything is text until
/// the loader cleans it.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "nom_region")]
    pub region: Option<String>,
    #[serde(rename = "nom_departement")]
    pub department: Option<String>,
    #[serde(rename = "annee")]
    pub year: Option<String>,
    #[serde(rename = "energie_produite_annuelle_photovoltaique_enedis_mwh")]
    pub photovoltaic: Option<String>,
    #[serde(rename = "energie_produite_annuelle_eolien_enedis_mwh")]
    pub wind: Option<String>,
    #[serde(rename = "energie_produite_annuelle_hydraulique_enedis_mwh")]
    pub hydraulic: Option<String>,
    #[serde(rename = "energie_produite_annuelle_bio_energie_enedis_mwh")]
    pub bio: Option<String>,
    #[serde(rename = "energie_produite_annuelle_autres_filieres_enedis_mwh")]
    pub other: Option<String>,
}

impl RawRow {
    /// Production cell for `source`, in canonical order.
    pub fn cell(&self, source: EnergySource) -> Option<&str> {
        match source {
            EnergySource::Photovoltaic => self.photovoltaic.as_deref(),
            EnergySource::Wind => self.wind.as_deref(),
            EnergySource::Hydraulic => self.hydraulic.as_deref(),
            EnergySource::Bio => self.bio.as_deref(),
            EnergySource::Other => self.other.as_deref(),
        }
    }
}

/// Per-source production of one record. `None` marks an absent or NaN cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SourceValues([Option<f64>; 5]);

impl SourceValues {
    pub fn new(values: [Option<f64>; 5]) -> Self {
        Self(values)
    }

    /// Build from plain numbers, one per source in canonical order.
    pub fn from_totals(values: [f64; 5]) -> Self {
        Self(values.map(Some))
    }

    /// Value used for aggregation: absent counts as zero.
    pub fn get(&self, source: EnergySource) -> f64 {
        self.0[source.index()].unwrap_or(0.0)
    }

    pub fn raw(&self, source: EnergySource) -> Option<f64> {
        self.0[source.index()]
    }

    pub fn set(&mut self, source: EnergySource, value: Option<f64>) {
        self.0[source.index()] = value;
    }

    pub fn total(&self) -> f64 {
        EnergySource::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyRecord {
    pub region: String,
    pub department: String,
    pub year: i32,
    pub production: SourceValues,
}

impl EnergyRecord {
    pub fn new(region: &str, department: &str, year: i32, production: SourceValues) -> Self {
        Self {
            region: region.to_string(),
            department: department.to_string(),
            year,
            production,
        }
    }

    pub fn value(&self, source: EnergySource) -> f64 {
        self.production.get(source)
    }
}

/// Records in file order. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    origin: PathBuf,
    records: Vec<EnergyRecord>,
}

impl Dataset {
    pub fn new(origin: impl Into<PathBuf>, records: Vec<EnergyRecord>) -> Self {
        Self { origin: origin.into(), records }
    }

    /// In-memory dataset, mostly for tests and demos.
    pub fn from_records(records: Vec<EnergyRecord>) -> Self {
        Self::new("<memory>", records)
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn records(&self) -> &[EnergyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn regions(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.region.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn departments(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.department.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn years(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.records.iter().map(|r| r.year).collect();
        set.into_iter().collect()
    }
}

// Console preview rows. Numbers are pre-formatted with thousands separators.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TimeSeriesRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "TotalMWh")]
    #[tabled(rename = "TotalMWh")]
    pub total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StackedRow {
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "Photovoltaic")]
    #[tabled(rename = "Photovoltaic")]
    pub photovoltaic: String,
    #[serde(rename = "Wind")]
    #[tabled(rename = "Wind")]
    pub wind: String,
    #[serde(rename = "Hydraulic")]
    #[tabled(rename = "Hydraulic")]
    pub hydraulic: String,
    #[serde(rename = "Bio")]
    #[tabled(rename = "Bio")]
    pub bio: String,
    #[serde(rename = "Other")]
    #[tabled(rename = "Other")]
    pub other: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BoxRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Min")]
    #[tabled(rename = "Min")]
    pub min: String,
    #[serde(rename = "Q1")]
    #[tabled(rename = "Q1")]
    pub q1: String,
    #[serde(rename = "Median")]
    #[tabled(rename = "Median")]
    pub median: String,
    #[serde(rename = "Q3")]
    #[tabled(rename = "Q3")]
    pub q3: String,
    #[serde(rename = "Max")]
    #[tabled(rename = "Max")]
    pub max: String,
    #[serde(rename = "Outliers")]
    #[tabled(rename = "Outliers")]
    pub outliers: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ShareRow {
    #[serde(rename = "Source")]
    #[tabled(rename = "Source")]
    pub source: String,
    #[serde(rename = "TotalMWh")]
    #[tabled(rename = "TotalMWh")]
    pub total: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FlowRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Source")]
    #[tabled(rename = "Source")]
    pub source: String,
    #[serde(rename = "FlowMWh")]
    #[tabled(rename = "FlowMWh")]
    pub weight: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HierarchyRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "ValueMWh")]
    #[tabled(rename = "ValueMWh")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RadialRow {
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "AngleRad")]
    #[tabled(rename = "AngleRad")]
    pub angle: String,
    #[serde(rename = "ValueMWh")]
    #[tabled(rename = "ValueMWh")]
    pub value: String,
}

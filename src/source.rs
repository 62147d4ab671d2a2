// The five energy-production categories and the table that maps the raw
// Enedis column names onto them.
use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergySource {
    Photovoltaic,
    Wind,
    Hydraulic,
    Bio,
    Other,
}

/// Raw column name → source. Order matches `EnergySource::ALL`.
pub const RENAME_TABLE: [(&str, EnergySource); 5] = [
    ("energie_produite_annuelle_photovoltaique_enedis_mwh", EnergySource::Photovoltaic),
    ("energie_produite_annuelle_eolien_enedis_mwh", EnergySource::Wind),
    ("energie_produite_annuelle_hydraulique_enedis_mwh", EnergySource::Hydraulic),
    ("energie_produite_annuelle_bio_energie_enedis_mwh", EnergySource::Bio),
    ("energie_produite_annuelle_autres_filieres_enedis_mwh", EnergySource::Other),
];

impl EnergySource {
    /// Canonical order used by every multi-source chart.
    pub const ALL: [EnergySource; 5] = [
        EnergySource::Photovoltaic,
        EnergySource::Wind,
        EnergySource::Hydraulic,
        EnergySource::Bio,
        EnergySource::Other,
    ];

    /// Position in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        match self {
            EnergySource::Photovoltaic => "photovoltaic",
            EnergySource::Wind => "wind",
            EnergySource::Hydraulic => "hydraulic",
            EnergySource::Bio => "bio",
            EnergySource::Other => "other",
        }
    }

    /// Display label used by the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            EnergySource::Photovoltaic => "Energie Photovoltaique",
            EnergySource::Wind => "Energie Eolienne",
            EnergySource::Hydraulic => "Energie Hydraulique",
            EnergySource::Bio => "Bio Energie",
            EnergySource::Other => "Autres Filières",
        }
    }

    pub fn raw_column(self) -> &'static str {
        RENAME_TABLE[self.index()].0
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            EnergySource::Photovoltaic => &["pv", "solar", "photovoltaique"],
            EnergySource::Wind => &["eolien", "eolienne"],
            EnergySource::Hydraulic => &["hydro", "hydraulique"],
            EnergySource::Bio => &["biomass", "bio_energie", "bioenergy"],
            EnergySource::Other => &["autres", "autres_filieres"],
        }
    }
}

impl fmt::Display for EnergySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EnergySource {
    type Err = DashboardError;

    /// Accepts the short id, an alias, the display label or the raw column
    /// name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        EnergySource::ALL
            .into_iter()
            .find(|src| {
                needle == src.id()
                    || needle == src.label().to_lowercase()
                    || needle == src.raw_column()
                    || src.aliases().contains(&needle.as_str())
            })
            .ok_or_else(|| DashboardError::ColumnNotFound(s.trim().to_string()))
    }
}

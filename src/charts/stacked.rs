use crate::aggregate::{aggregate, GroupBy};
use crate::source::EnergySource;
use crate::types::{Dataset, StackedRow};
use crate::util::format_number;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-department totals of all five sources, in `EnergySource::ALL` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedTotals {
    pub sources: [EnergySource; 5],
    pub departments: BTreeMap<String, [f64; 5]>,
}

impl StackedTotals {
    /// Sum of one stack segment across every department.
    pub fn column_total(&self, source: EnergySource) -> f64 {
        self.departments.values().map(|v| v[source.index()]).sum()
    }

    pub fn preview_rows(&self) -> Vec<StackedRow> {
        self.departments
            .iter()
            .map(|(department, v)| StackedRow {
                department: department.clone(),
                photovoltaic: format_number(v[0], 2),
                wind: format_number(v[1], 2),
                hydraulic: format_number(v[2], 2),
                bio: format_number(v[3], 2),
                other: format_number(v[4], 2),
            })
            .collect()
    }
}

pub fn stacked_totals(dataset: &Dataset) -> StackedTotals {
    let agg = aggregate(dataset.records(), &[GroupBy::Department], &EnergySource::ALL);
    let departments = agg
        .into_iter()
        .filter_map(|(key, totals)| {
            let department = key.first()?.as_text()?.to_string();
            let values = EnergySource::ALL.map(|s| totals.get(&s).copied().unwrap_or(0.0));
            Some((department, values))
        })
        .collect();
    StackedTotals { sources: EnergySource::ALL, departments }
}

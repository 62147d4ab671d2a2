use crate::source::EnergySource;
use crate::types::{BoxRow, Dataset};
use crate::util::{format_number, quantile_sorted, sort_floats};
use serde::Serialize;
use std::collections::BTreeMap;

/// Raw per-record values of one source, grouped by year.
///
/// Values keep record order; summary statistics are left to the consumer
/// (see [`Distribution::summaries`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub source: EnergySource,
    pub years: BTreeMap<i32, Vec<f64>>,
}

/// Box-plot statistics with Tukey whiskers (1.5 × IQR).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub year: i32,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_values(year: i32, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sort_floats(&mut sorted);
        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= lo_fence && *v <= hi_fence)
            .collect();
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();
        Some(Self {
            year,
            count: sorted.len(),
            min: sorted[0],
            q1,
            median: quantile_sorted(&sorted, 0.5),
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker: inside.first().copied().unwrap_or(q1),
            upper_whisker: inside.last().copied().unwrap_or(q3),
            outliers,
        })
    }
}

impl Distribution {
    pub fn summaries(&self) -> Vec<BoxSummary> {
        self.years
            .iter()
            .filter_map(|(year, values)| BoxSummary::from_values(*year, values))
            .collect()
    }

    pub fn preview_rows(&self) -> Vec<BoxRow> {
        self.summaries()
            .into_iter()
            .map(|s| BoxRow {
                year: s.year,
                count: s.count,
                min: format_number(s.min, 2),
                q1: format_number(s.q1, 2),
                median: format_number(s.median, 2),
                q3: format_number(s.q3, 2),
                max: format_number(s.max, 2),
                outliers: s.outliers.len(),
            })
            .collect()
    }
}

/// Absent cells are not observations and are left out of the multiset.
pub fn distribution(dataset: &Dataset, source: EnergySource) -> Distribution {
    let mut years: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for r in dataset.records() {
        let values = years.entry(r.year).or_default();
        if let Some(v) = r.production.raw(source) {
            values.push(v);
        }
    }
    Distribution { source, years }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::tests::{record, scenario};
    use crate::types::{EnergyRecord, SourceValues};

    #[test]
    fn raw_values_are_kept_per_year() {
        let d = distribution(&scenario(), EnergySource::Photovoltaic);
        assert_eq!(d.years[&2020], vec![10.0, 5.0]);
        assert_eq!(d.years[&2021], vec![20.0]);
    }

    #[test]
    fn absent_cells_are_not_values() {
        let ds = Dataset::from_records(vec![
            record("A", "A1", 2020, [1.0, 0.0, 0.0, 0.0, 0.0]),
            EnergyRecord::new("A", "A2", 2020, SourceValues::default()),
            EnergyRecord::new("A", "A3", 2022, SourceValues::default()),
        ]);
        let d = distribution(&ds, EnergySource::Photovoltaic);
        assert_eq!(d.years[&2020], vec![1.0]);
        assert!(d.years[&2022].is_empty());
        assert_eq!(d.summaries().len(), 1);
    }

    #[test]
    fn box_summary_flags_outliers() {
        let s = BoxSummary::from_values(2020, &[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(s.q1, 2.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.q3, 4.0);
        assert_eq!(s.outliers, vec![100.0]);
        assert_eq!(s.upper_whisker, 4.0);
        assert_eq!(s.lower_whisker, 1.0);
        assert_eq!(s.max, 100.0);
        assert!(BoxSummary::from_values(2020, &[]).is_none());
    }
}

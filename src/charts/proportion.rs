use crate::aggregate::aggregate;
use crate::error::{ChartKind, EmptyReason, EmptyResultWarning, Outcome};
use crate::source::EnergySource;
use crate::types::{Dataset, ShareRow};
use crate::util::format_number;
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

/// Total production of each source for a single year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proportion {
    pub year: i32,
    pub totals: BTreeMap<EnergySource, f64>,
}

impl Proportion {
    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    pub fn get(&self, source: EnergySource) -> f64 {
        self.totals.get(&source).copied().unwrap_or(0.0)
    }

    /// Percentage of each source, or `None` when nothing was produced.
    pub fn shares(&self) -> Option<BTreeMap<EnergySource, f64>> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        Some(self.totals.iter().map(|(s, v)| (*s, v / total * 100.0)).collect())
    }

    pub fn preview_rows(&self) -> Vec<ShareRow> {
        let shares = self.shares();
        EnergySource::ALL
            .iter()
            .map(|s| ShareRow {
                source: s.label().to_string(),
                total: format_number(self.get(*s), 2),
                share: shares
                    .as_ref()
                    .and_then(|m| m.get(s))
                    .map(|p| format!("{:.1}%", p))
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect()
    }
}

/// Sums every record of `year` into one global group. An empty year or a
/// zero total yields the all-zero structure plus a warning.
pub fn proportion(dataset: &Dataset, year: i32) -> Outcome<Proportion> {
    let filtered: Vec<_> = dataset.records().iter().filter(|r| r.year == year).collect();
    let agg = aggregate(filtered.iter().copied(), &[], &EnergySource::ALL);
    let totals: BTreeMap<EnergySource, f64> = EnergySource::ALL
        .iter()
        .map(|s| (*s, agg.value(&[], *s)))
        .collect();
    let data = Proportion { year, totals };

    let reason = if filtered.is_empty() {
        Some(EmptyReason::NoRecords)
    } else if data.total() == 0.0 {
        Some(EmptyReason::ZeroTotal)
    } else {
        None
    };
    match reason {
        Some(reason) => {
            let warning = EmptyResultWarning {
                chart: ChartKind::Proportion,
                reason,
                context: format!("year {}", year),
            };
            warn!("{}", warning);
            Outcome::warn(data, warning)
        }
        None => Outcome::ok(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::tests::{record, scenario};

    #[test]
    fn scenario_2020() {
        let out = proportion(&scenario(), 2020);
        assert!(out.warning.is_none());
        assert_eq!(out.data.get(EnergySource::Photovoltaic), 15.0);
    }

    #[test]
    fn values_sum_to_the_year_total() {
        let ds = Dataset::from_records(vec![
            record("A", "A1", 2020, [1.0, 2.0, 3.0, 0.0, 2.0]),
            record("B", "B1", 2020, [3.0, 0.0, 1.0, 4.0, 0.0]),
            record("B", "B1", 2019, [50.0, 0.0, 0.0, 0.0, 0.0]),
        ]);
        let out = proportion(&ds, 2020);
        let year_total: f64 = ds
            .records()
            .iter()
            .filter(|r| r.year == 2020)
            .map(|r| r.production.total())
            .sum();
        assert_eq!(out.data.total(), year_total);
        let shares = out.data.shares().unwrap();
        let pct: f64 = shares.values().sum();
        assert!((pct - 100.0).abs() < 1e-9);
        assert_eq!(shares[&EnergySource::Photovoltaic], 25.0);
    }

    #[test]
    fn missing_year_warns_instead_of_dividing() {
        let out = proportion(&scenario(), 1999);
        let w = out.warning.clone().unwrap();
        assert_eq!(w.reason, EmptyReason::NoRecords);
        assert_eq!(out.data.totals.len(), 5);
        assert_eq!(out.data.total(), 0.0);
        assert!(out.data.shares().is_none());
    }

    #[test]
    fn zero_total_warns() {
        let ds = Dataset::from_records(vec![record("A", "A1", 2020, [0.0; 5])]);
        let out = proportion(&ds, 2020);
        assert_eq!(out.warning.unwrap().reason, EmptyReason::ZeroTotal);
    }
}

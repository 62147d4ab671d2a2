use crate::aggregate::{aggregate, GroupBy};
use crate::source::EnergySource;
use crate::types::{Dataset, TimeSeriesRow};
use crate::util::format_number;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// One line per region: yearly totals of a single source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub source: EnergySource,
    pub series: BTreeMap<String, Vec<YearValue>>,
}

impl TimeSeries {
    pub fn region(&self, region: &str) -> Option<&[YearValue]> {
        self.series.get(region).map(Vec::as_slice)
    }

    pub fn preview_rows(&self) -> Vec<TimeSeriesRow> {
        self.series
            .iter()
            .flat_map(|(region, points)| {
                points.iter().map(move |p| TimeSeriesRow {
                    region: region.clone(),
                    year: p.year,
                    total: format_number(p.value, 2),
                })
            })
            .collect()
    }
}

/// Years a region has no records for are simply missing from its line.
pub fn time_series(dataset: &Dataset, source: EnergySource) -> TimeSeries {
    let agg = aggregate(dataset.records(), &[GroupBy::Region, GroupBy::Year], &[source]);
    let mut series: BTreeMap<String, Vec<YearValue>> = BTreeMap::new();
    // Keys arrive sorted by (region, year), so each line is already in year order.
    for (key, totals) in agg {
        let (Some(region), Some(year)) = (key[0].as_text(), key[1].as_year()) else {
            continue;
        };
        let value = totals.get(&source).copied().unwrap_or(0.0);
        series.entry(region.to_string()).or_default().push(YearValue { year, value });
    }
    TimeSeries { source, series }
}

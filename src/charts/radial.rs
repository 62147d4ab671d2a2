use crate::aggregate::{aggregate, GroupBy, KeyValue};
use crate::source::EnergySource;
use crate::types::{Dataset, RadialRow};
use crate::util::format_number;
use serde::Serialize;
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadialPoint {
    pub angle: f64,
    pub value: f64,
}

/// Closed polygon over every department (radar input).
///
/// `categories` are the departments in ascending alphabetical order and
/// `points[i]` belongs to `categories[i]`; the last point repeats the
/// first one so the outline closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialSeries {
    pub source: EnergySource,
    pub categories: Vec<String>,
    pub points: Vec<RadialPoint>,
}

impl RadialSeries {
    pub fn preview_rows(&self) -> Vec<RadialRow> {
        self.categories
            .iter()
            .zip(&self.points)
            .map(|(department, p)| RadialRow {
                department: department.clone(),
                angle: format!("{:.4}", p.angle),
                value: format_number(p.value, 2),
            })
            .collect()
    }
}

pub fn radial_series(dataset: &Dataset, source: EnergySource) -> RadialSeries {
    let categories = dataset.departments();
    let agg = aggregate(dataset.records(), &[GroupBy::Department], &[source]);
    let n = categories.len();

    let mut points: Vec<RadialPoint> = categories
        .iter()
        .enumerate()
        .map(|(i, department)| RadialPoint {
            angle: TAU * i as f64 / n as f64,
            // Zero-filled against the full department list.
            value: agg.value(&[KeyValue::Text(department.clone())], source),
        })
        .collect();
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    RadialSeries { source, categories, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::tests::{record, scenario};
    use std::f64::consts::PI;

    #[test]
    fn polygon_is_closed() {
        let r = radial_series(&scenario(), EnergySource::Photovoltaic);
        assert_eq!(r.categories, vec!["A1", "A2", "B1"]);
        assert_eq!(r.points.len(), r.categories.len() + 1);
        assert_eq!(r.points.first(), r.points.last());
        let values: Vec<f64> = r.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 5.0, 20.0, 10.0]);
    }

    #[test]
    fn angles_are_evenly_spaced() {
        let ds = Dataset::from_records(vec![
            record("R", "a", 2020, [1.0; 5]),
            record("R", "b", 2020, [1.0; 5]),
            record("R", "c", 2020, [1.0; 5]),
            record("R", "d", 2020, [1.0; 5]),
        ]);
        let r = radial_series(&ds, EnergySource::Wind);
        let angles: Vec<f64> = r.points.iter().map(|p| p.angle).collect();
        assert_eq!(angles, vec![0.0, PI / 2.0, PI, 3.0 * PI / 2.0, 0.0]);
    }

    #[test]
    fn departments_without_production_are_zero() {
        let ds = Dataset::from_records(vec![
            record("R", "a", 2020, [5.0, 0.0, 0.0, 0.0, 0.0]),
            record("R", "b", 2020, [0.0, 3.0, 0.0, 0.0, 0.0]),
        ]);
        let r = radial_series(&ds, EnergySource::Wind);
        assert_eq!(r.points[0].value, 0.0);
        assert_eq!(r.points[1].value, 3.0);
    }

    #[test]
    fn empty_dataset_gives_empty_series() {
        let r = radial_series(&Dataset::from_records(Vec::new()), EnergySource::Bio);
        assert!(r.categories.is_empty());
        assert!(r.points.is_empty());
    }
}

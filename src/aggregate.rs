//! Grouping and summing, shared by every chart builder.
//!
//! Keys are typed so that the ordering of a result is part of its
//! contract: text keys sort lexicographically (byte order), years sort
//! numerically, and tuples compare position by position.

use crate::source::EnergySource;
use crate::types::EnergyRecord;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Field a record can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Region,
    Department,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum KeyValue {
    Text(String),
    Year(i32),
}

impl KeyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyValue::Text(s) => Some(s),
            KeyValue::Year(_) => None,
        }
    }

    pub fn as_year(&self) -> Option<i32> {
        match self {
            KeyValue::Year(y) => Some(*y),
            KeyValue::Text(_) => None,
        }
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        KeyValue::Text(s.to_string())
    }
}

impl From<i32> for KeyValue {
    fn from(y: i32) -> Self {
        KeyValue::Year(y)
    }
}

/// One value per `GroupBy` selector, in selector order. Empty for the
/// global group.
pub type GroupKey = Vec<KeyValue>;

impl GroupBy {
    fn extract(self, record: &EnergyRecord) -> KeyValue {
        match self {
            GroupBy::Region => KeyValue::Text(record.region.clone()),
            GroupBy::Department => KeyValue::Text(record.department.clone()),
            GroupBy::Year => KeyValue::Year(record.year),
        }
    }
}

/// Summed production per source, iterated in canonical order.
pub type SourceTotals = BTreeMap<EnergySource, f64>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    groups: BTreeMap<GroupKey, SourceTotals>,
}

impl AggregationResult {
    pub fn get(&self, key: &[KeyValue]) -> Option<&SourceTotals> {
        self.groups.get(key)
    }

    /// Shorthand for `get(key)[source]`, zero when either is absent.
    pub fn value(&self, key: &[KeyValue], source: EnergySource) -> f64 {
        self.get(key).and_then(|t| t.get(&source)).copied().unwrap_or(0.0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &SourceTotals)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum of `source` over every group.
    pub fn grand_total(&self, source: EnergySource) -> f64 {
        self.groups.values().filter_map(|t| t.get(&source)).sum()
    }
}

impl IntoIterator for AggregationResult {
    type Item = (GroupKey, SourceTotals);
    type IntoIter = std::collections::btree_map::IntoIter<GroupKey, SourceTotals>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Partition `records` by the full key tuple and sum each of
/// `value_fields` within every partition. Absent values count as zero.
///
/// Groups without records are not present; callers that need a complete
/// category axis must zero-fill themselves.
pub fn aggregate<'a, I>(
    records: I,
    group_keys: &[GroupBy],
    value_fields: &[EnergySource],
) -> AggregationResult
where
    I: IntoIterator<Item = &'a EnergyRecord>,
{
    let mut groups: BTreeMap<GroupKey, SourceTotals> = BTreeMap::new();
    let mut rows = 0usize;
    for r in records {
        rows += 1;
        let key: GroupKey = group_keys.iter().map(|g| g.extract(r)).collect();
        let totals = groups
            .entry(key)
            .or_insert_with(|| value_fields.iter().map(|s| (*s, 0.0)).collect());
        for source in value_fields {
            *totals.entry(*source).or_insert(0.0) += r.value(*source);
        }
    }
    debug!(
        "aggregate by {:?}: {} records into {} groups",
        group_keys,
        rows,
        groups.len()
    );
    AggregationResult { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceValues;

    fn rec(region: &str, dept: &str, year: i32, pv: f64, wind: Option<f64>) -> EnergyRecord {
        let mut v = SourceValues::default();
        v.set(EnergySource::Photovoltaic, Some(pv));
        v.set(EnergySource::Wind, wind);
        EnergyRecord::new(region, dept, year, v)
    }

    #[test]
    fn sums_within_groups_and_treats_absent_as_zero() {
        let data = vec![
            rec("A", "A1", 2020, 10.0, Some(1.0)),
            rec("A", "A2", 2020, 5.0, None),
            rec("B", "B1", 2021, 20.0, Some(2.0)),
        ];
        let res = aggregate(
            &data,
            &[GroupBy::Region],
            &[EnergySource::Photovoltaic, EnergySource::Wind],
        );
        assert_eq!(res.len(), 2);
        assert_eq!(res.value(&["A".into()], EnergySource::Photovoltaic), 15.0);
        assert_eq!(res.value(&["A".into()], EnergySource::Wind), 1.0);
        assert_eq!(res.value(&["B".into()], EnergySource::Wind), 2.0);
        assert_eq!(res.grand_total(EnergySource::Photovoltaic), 35.0);
    }

    #[test]
    fn requested_fields_only() {
        let data = vec![rec("A", "A1", 2020, 10.0, Some(1.0))];
        let res = aggregate(&data, &[GroupBy::Department], &[EnergySource::Wind]);
        let totals = res.get(&["A1".into()]).unwrap();
        assert_eq!(totals.len(), 1);
        assert!(totals.get(&EnergySource::Photovoltaic).is_none());
    }

    #[test]
    fn keys_are_ordered_regardless_of_input_order() {
        let data = vec![
            rec("b", "x", 2021, 1.0, None),
            rec("B", "x", 2019, 1.0, None),
            rec("a", "x", 2021, 1.0, None),
            rec("a", "x", 2009, 1.0, None),
            rec("a", "x", 2010, 1.0, None),
        ];
        let mut reversed = data.clone();
        reversed.reverse();

        let keys = [GroupBy::Region, GroupBy::Year];
        let fwd = aggregate(&data, &keys, &[EnergySource::Photovoltaic]);
        let rev = aggregate(&reversed, &keys, &[EnergySource::Photovoltaic]);
        assert_eq!(fwd, rev);

        let keys: Vec<GroupKey> = fwd.keys().cloned().collect();
        let expected: Vec<GroupKey> = vec![
            vec![KeyValue::from("B"), KeyValue::Year(2019)],
            vec![KeyValue::from("a"), KeyValue::Year(2009)],
            vec![KeyValue::from("a"), KeyValue::Year(2010)],
            vec![KeyValue::from("a"), KeyValue::Year(2021)],
            vec![KeyValue::from("b"), KeyValue::Year(2021)],
        ];
        assert_eq!(keys, expected);
    }

    #[test]
    fn no_keys_gives_one_global_group() {
        let data = vec![rec("A", "A1", 2020, 10.0, None), rec("B", "B1", 2021, 2.0, None)];
        let res = aggregate(&data, &[], &EnergySource::ALL);
        assert_eq!(res.len(), 1);
        let totals = res.get(&[]).unwrap();
        assert_eq!(totals.keys().copied().collect::<Vec<_>>(), EnergySource::ALL.to_vec());
        assert_eq!(totals[&EnergySource::Photovoltaic], 12.0);

        let empty: Vec<EnergyRecord> = Vec::new();
        assert!(aggregate(&empty, &[], &EnergySource::ALL).is_empty());
    }
}

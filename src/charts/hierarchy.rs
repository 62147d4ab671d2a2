use crate::aggregate::{aggregate, GroupBy};
use crate::error::{ChartKind, EmptyReason, EmptyResultWarning, Outcome};
use crate::source::EnergySource;
use crate::types::{Dataset, EnergyRecord, HierarchyRow};
use crate::util::format_number;
use log::warn;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionFilter {
    #[default]
    All,
    Only(String),
}

impl RegionFilter {
    /// `"all"`, `"tous"` or an empty string select every region.
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        if t.is_empty() || t.eq_ignore_ascii_case("all") || t.eq_ignore_ascii_case("tous") {
            RegionFilter::All
        } else {
            RegionFilter::Only(t.to_string())
        }
    }

    fn matches(&self, record: &EnergyRecord) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Only(name) => record.region == *name,
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::All => f.write_str("all regions"),
            RegionFilter::Only(name) => f.write_str(name),
        }
    }
}

/// Which records feed the tree. No year filter means all years summed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyFilter {
    pub region: RegionFilter,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    pub name: String,
    pub value: f64,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    fn leaf(name: String, value: f64) -> Self {
        Self { name, value, children: Vec::new() }
    }

    pub fn child(&self, name: &str) -> Option<&HierarchyNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Root → regions → departments (sunburst input). Parent values are the
/// sum of their children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hierarchy {
    pub source: EnergySource,
    pub filter: HierarchyFilter,
    pub root: HierarchyNode,
}

impl Hierarchy {
    pub fn preview_rows(&self) -> Vec<HierarchyRow> {
        self.root
            .children
            .iter()
            .flat_map(|region| {
                region.children.iter().map(move |dept| HierarchyRow {
                    region: region.name.clone(),
                    department: dept.name.clone(),
                    value: format_number(dept.value, 2),
                })
            })
            .collect()
    }
}

pub fn hierarchy(
    dataset: &Dataset,
    source: EnergySource,
    filter: &HierarchyFilter,
) -> Outcome<Hierarchy> {
    let filtered: Vec<&EnergyRecord> = dataset
        .records()
        .iter()
        .filter(|r| filter.region.matches(r) && filter.year.map_or(true, |y| r.year == y))
        .collect();
    let agg = aggregate(
        filtered.iter().copied(),
        &[GroupBy::Region, GroupBy::Department],
        &[source],
    );

    let mut regions: Vec<HierarchyNode> = Vec::new();
    for (key, totals) in agg {
        let (Some(region), Some(department)) = (key[0].as_text(), key[1].as_text()) else {
            continue;
        };
        let value = totals.get(&source).copied().unwrap_or(0.0);
        // Sorted keys keep each region's departments contiguous.
        match regions.last_mut() {
            Some(node) if node.name == region => {
                node.value += value;
                node.children.push(HierarchyNode::leaf(department.to_string(), value));
            }
            _ => regions.push(HierarchyNode {
                name: region.to_string(),
                value,
                children: vec![HierarchyNode::leaf(department.to_string(), value)],
            }),
        }
    }

    let total: f64 = regions.iter().map(|r| r.value).sum();
    let data = Hierarchy {
        source,
        filter: filter.clone(),
        root: HierarchyNode { name: source.label().to_string(), value: total, children: regions },
    };

    let reason = if filtered.is_empty() {
        Some(EmptyReason::NoRecords)
    } else if total <= 0.0 {
        Some(EmptyReason::ZeroTotal)
    } else {
        None
    };
    match reason {
        Some(reason) => {
            let mut context = format!("{}, {}", source.id(), filter.region);
            if let Some(year) = filter.year {
                context.push_str(&format!(", year {}", year));
            }
            let warning = EmptyResultWarning { chart: ChartKind::Hierarchy, reason, context };
            warn!("{}", warning);
            Outcome::warn(data, warning)
        }
        None => Outcome::ok(data),
    }
}

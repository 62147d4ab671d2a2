use crate::aggregate::{aggregate, GroupBy, KeyValue};
use crate::source::EnergySource;
use crate::types::{Dataset, FlowRow};
use crate::util::format_number;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum FlowNode {
    Region(String),
    Source(EnergySource),
}

impl FlowNode {
    pub fn label(&self) -> String {
        match self {
            FlowNode::Region(name) => name.clone(),
            FlowNode::Source(s) => s.label().to_string(),
        }
    }
}

/// Edge between two entries of `FlowGraph::nodes`, by index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowEdge {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Bipartite region → energy-source graph (Sankey input).
///
/// Nodes are the regions in ascending order followed by the five sources
/// in canonical order. Every edge weight is strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn region_count(&self) -> usize {
        self.nodes.len() - EnergySource::ALL.len()
    }

    pub fn preview_rows(&self) -> Vec<FlowRow> {
        self.edges
            .iter()
            .map(|e| FlowRow {
                region: self.nodes[e.source].label(),
                source: self.nodes[e.target].label(),
                weight: format_number(e.value, 2),
            })
            .collect()
    }
}

pub fn flow_graph(dataset: &Dataset) -> FlowGraph {
    let regions = dataset.regions();
    let agg = aggregate(dataset.records(), &[GroupBy::Region], &EnergySource::ALL);
    let offset = regions.len();

    let mut edges = Vec::new();
    for (i, region) in regions.iter().enumerate() {
        let key = [KeyValue::Text(region.clone())];
        for source in EnergySource::ALL {
            let value = agg.value(&key, source);
            // Also rejects NaN.
            if value > 0.0 {
                edges.push(FlowEdge { source: i, target: offset + source.index(), value });
            }
        }
    }

    let nodes = regions
        .into_iter()
        .map(FlowNode::Region)
        .chain(EnergySource::ALL.into_iter().map(FlowNode::Source))
        .collect();
    FlowGraph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::tests::{record, scenario};

    #[test]
    fn nodes_are_regions_then_sources() {
        let g = flow_graph(&scenario());
        assert_eq!(g.nodes.len(), 7);
        assert_eq!(g.region_count(), 2);
        assert_eq!(g.nodes[0], FlowNode::Region("A".into()));
        assert_eq!(g.nodes[2], FlowNode::Source(EnergySource::Photovoltaic));
        assert_eq!(g.nodes[6], FlowNode::Source(EnergySource::Other));
    }

    #[test]
    fn zero_flows_are_omitted() {
        let ds = Dataset::from_records(vec![
            record("A", "A1", 2020, [10.0, 0.0, 0.0, 1.0, 0.0]),
            record("B", "B1", 2020, [0.0; 5]),
        ]);
        let g = flow_graph(&ds);
        assert!(g.edges.iter().all(|e| e.value > 0.0));
        assert_eq!(
            g.edges,
            vec![
                FlowEdge { source: 0, target: 2, value: 10.0 },
                FlowEdge { source: 0, target: 5, value: 1.0 },
            ]
        );
        // B stays a node even without any outgoing flow.
        assert_eq!(g.nodes[1], FlowNode::Region("B".into()));
    }

    #[test]
    fn empty_dataset_has_only_source_nodes() {
        let g = flow_graph(&Dataset::from_records(Vec::new()));
        assert_eq!(g.nodes.len(), 5);
        assert!(g.edges.is_empty());
    }
}

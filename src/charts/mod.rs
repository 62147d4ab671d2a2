//! Chart-ready structures, one builder per view.
//!
//! Every builder is a pure function of the dataset and its selection;
//! calling it twice with the same inputs gives equal results.

mod distribution;
mod flow;
mod hierarchy;
mod proportion;
mod radial;
mod stacked;
mod timeseries;

pub use distribution::{distribution, BoxSummary, Distribution};
pub use flow::{flow_graph, FlowEdge, FlowGraph, FlowNode};
pub use hierarchy::{hierarchy, Hierarchy, HierarchyFilter, HierarchyNode, RegionFilter};
pub use proportion::{proportion, Proportion};
pub use radial::{radial_series, RadialPoint, RadialSeries};
pub use stacked::{stacked_totals, StackedTotals};
pub use timeseries::{time_series, TimeSeries, YearValue};

use crate::error::{ChartKind, DashboardError, Outcome};
use crate::source::EnergySource;
use crate::types::Dataset;
use log::debug;
use serde::Serialize;

/// Year shown by the proportion view when none is selected.
pub const DEFAULT_PROPORTION_YEAR: i32 = 2020;

/// Widget selections as the presentation layer holds them: plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub energy: Option<String>,
    pub year: Option<i32>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartRequest {
    TimeSeries { source: EnergySource },
    StackedTotals,
    Distribution { source: EnergySource },
    Proportion { year: i32 },
    FlowGraph,
    Hierarchy { source: EnergySource, filter: HierarchyFilter },
    RadialSeries { source: EnergySource },
}

impl ChartRequest {
    /// Resolve free-text selections into a typed request.
    ///
    /// Missing energy defaults to photovoltaic and a missing proportion
    /// year to [`DEFAULT_PROPORTION_YEAR`]. An unrecognized energy name is
    /// `ColumnNotFound`.
    pub fn from_selection(kind: ChartKind, selection: &Selection) -> Result<Self, DashboardError> {
        let source = match selection.energy.as_deref() {
            Some(name) => name.parse::<EnergySource>()?,
            None => EnergySource::Photovoltaic,
        };
        Ok(match kind {
            ChartKind::TimeSeries => ChartRequest::TimeSeries { source },
            ChartKind::StackedTotals => ChartRequest::StackedTotals,
            ChartKind::Distribution => ChartRequest::Distribution { source },
            ChartKind::Proportion => ChartRequest::Proportion {
                year: selection.year.unwrap_or(DEFAULT_PROPORTION_YEAR),
            },
            ChartKind::FlowGraph => ChartRequest::FlowGraph,
            ChartKind::Hierarchy => ChartRequest::Hierarchy {
                source,
                filter: HierarchyFilter {
                    region: selection
                        .region
                        .as_deref()
                        .map(RegionFilter::parse)
                        .unwrap_or_default(),
                    year: selection.year,
                },
            },
            ChartKind::RadialSeries => ChartRequest::RadialSeries { source },
        })
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            ChartRequest::TimeSeries { .. } => ChartKind::TimeSeries,
            ChartRequest::StackedTotals => ChartKind::StackedTotals,
            ChartRequest::Distribution { .. } => ChartKind::Distribution,
            ChartRequest::Proportion { .. } => ChartKind::Proportion,
            ChartRequest::FlowGraph => ChartKind::FlowGraph,
            ChartRequest::Hierarchy { .. } => ChartKind::Hierarchy,
            ChartRequest::RadialSeries { .. } => ChartKind::RadialSeries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart", content = "data", rename_all = "snake_case")]
pub enum ChartData {
    TimeSeries(TimeSeries),
    StackedTotals(StackedTotals),
    Distribution(Distribution),
    Proportion(Proportion),
    FlowGraph(FlowGraph),
    Hierarchy(Hierarchy),
    RadialSeries(RadialSeries),
}

/// Run the builder matching `request`.
pub fn build(dataset: &Dataset, request: &ChartRequest) -> Outcome<ChartData> {
    debug!("Building {} chart from {} records", request.kind(), dataset.len());
    match request {
        ChartRequest::TimeSeries { source } => {
            Outcome::ok(ChartData::TimeSeries(time_series(dataset, *source)))
        }
        ChartRequest::StackedTotals => Outcome::ok(ChartData::StackedTotals(stacked_totals(dataset))),
        ChartRequest::Distribution { source } => {
            Outcome::ok(ChartData::Distribution(distribution(dataset, *source)))
        }
        ChartRequest::Proportion { year } => proportion(dataset, *year).map(ChartData::Proportion),
        ChartRequest::FlowGraph => Outcome::ok(ChartData::FlowGraph(flow_graph(dataset))),
        ChartRequest::Hierarchy { source, filter } => {
            hierarchy(dataset, *source, filter).map(ChartData::Hierarchy)
        }
        ChartRequest::RadialSeries { source } => {
            Outcome::ok(ChartData::RadialSeries(radial_series(dataset, *source)))
        }
    }
}

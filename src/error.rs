use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("{path} is missing required column(s): {}", .missing.join(", "))]
    Schema { path: String, missing: Vec<String> },
    #[error("Unknown energy source: {0}")]
    ColumnNotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source unreadable or not parseable as CSV.
    Load,
    /// A required column is missing after renaming.
    Schema,
    /// Unknown energy-source identifier in a single request.
    ColumnNotFound,
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::Io { .. } | DashboardError::Csv { .. } => ErrorKind::Load,
            DashboardError::Schema { .. } => ErrorKind::Schema,
            DashboardError::ColumnNotFound(_) => ErrorKind::ColumnNotFound,
        }
    }

    /// Load and schema failures leave no dataset to chart from.
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind(), ErrorKind::ColumnNotFound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    TimeSeries,
    StackedTotals,
    Distribution,
    Proportion,
    FlowGraph,
    Hierarchy,
    RadialSeries,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::TimeSeries => "time series",
            ChartKind::StackedTotals => "stacked totals",
            ChartKind::Distribution => "distribution",
            ChartKind::Proportion => "proportion",
            ChartKind::FlowGraph => "flow graph",
            ChartKind::Hierarchy => "hierarchy",
            ChartKind::RadialSeries => "radial series",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    NoRecords,
    ZeroTotal,
}

impl EmptyReason {
    pub fn describe(self) -> &'static str {
        match self {
            EmptyReason::NoRecords => "no matching records",
            EmptyReason::ZeroTotal => "total production is zero",
        }
    }
}

/// Non-fatal: the request was valid but there is nothing to draw.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("No data available for the {chart} chart ({context}): {}", .reason.describe())]
pub struct EmptyResultWarning {
    pub chart: ChartKind,
    pub reason: EmptyReason,
    pub context: String,
}

/// A chart structure plus an optional empty-result warning.
///
/// The structure is always well defined, even when the warning is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub data: T,
    pub warning: Option<EmptyResultWarning>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self { data, warning: None }
    }

    pub fn warn(data: T, warning: EmptyResultWarning) -> Self {
        Self { data, warning: Some(warning) }
    }

    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome { data: f(self.data), warning: self.warning }
    }
}

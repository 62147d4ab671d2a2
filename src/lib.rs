//! Chart-ready data for a renewable-energy production dashboard.
//!
//! The pipeline reads the Enedis department-level CSV once
//! ([`loader::DatasetCache`]), groups and sums it with
//! [`aggregate::aggregate`], and shapes the result for seven views in
//! [`charts`]. Rendering is left to the caller.
pub mod aggregate;
pub mod charts;
pub mod error;
pub mod loader;
pub mod output;
pub mod source;
pub mod types;
pub mod util;

pub use aggregate::{aggregate, AggregationResult, GroupBy, KeyValue};
pub use charts::{build, ChartData, ChartRequest, Selection};
pub use error::{ChartKind, DashboardError, EmptyResultWarning, ErrorKind, Outcome};
pub use loader::{load_dataset, DatasetCache, LoadOptions, LoadReport};
pub use source::EnergySource;
pub use types::{Dataset, EnergyRecord, SourceValues};

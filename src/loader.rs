use crate::error::DashboardError;
use crate::source::{EnergySource, RENAME_TABLE};
use crate::types::{
    Dataset, EnergyRecord, RawRow, SourceValues, DEPARTMENT_COLUMN, REGION_COLUMN, YEAR_COLUMN,
};
use crate::util::{clean_label, parse_numeric_cell, parse_year_safe, NumericCell};
use chrono::{Datelike, Local};
use csv::ReaderBuilder;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Earliest year accepted by default; anything older is a typo.
pub const MIN_PLAUSIBLE_YEAR: i32 = 1990;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rows whose year falls outside this range are skipped.
    pub year_range: RangeInclusive<i32>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { year_range: MIN_PLAUSIBLE_YEAR..=Local::now().year() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    pub imputed_zeros: usize,
}

/// Every raw column the loader needs, in header-check order.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![REGION_COLUMN, DEPARTMENT_COLUMN, YEAR_COLUMN];
    cols.extend(RENAME_TABLE.iter().map(|(raw, _)| *raw));
    cols
}

pub fn load_dataset(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<(Dataset, LoadReport), DashboardError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DashboardError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let (records, report) = read_records(file, &path.display().to_string(), options)?;
    info!(
        "Loaded {} records from {} ({} skipped, {} blank cells)",
        report.loaded_rows,
        path.display(),
        report.skipped_rows,
        report.imputed_zeros
    );
    Ok((Dataset::new(path, records), report))
}

/// Same as [`load_dataset`] for any reader; `origin` names it in errors.
pub fn load_from_reader<R: Read>(
    reader: R,
    origin: &str,
    options: &LoadOptions,
) -> Result<(Dataset, LoadReport), DashboardError> {
    let (records, report) = read_records(reader, origin, options)?;
    Ok((Dataset::new(origin, records), report))
}

fn read_records<R: Read>(
    reader: R,
    origin: &str,
    options: &LoadOptions,
) -> Result<(Vec<EnergyRecord>, LoadReport), DashboardError> {
    let csv_err = |source: csv::Error| DashboardError::Csv { path: origin.to_string(), source };

    let mut rdr = ReaderBuilder::new().delimiter(b';').flexible(true).from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let missing: Vec<String> = required_columns()
        .into_iter()
        .filter(|col| !headers.iter().any(|h| h.trim() == *col))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::Schema { path: origin.to_string(), missing });
    }
    // Header names with stray whitespace would not match the serde renames.
    let trimmed: csv::StringRecord = headers.iter().map(str::trim).collect();

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.records() {
        report.total_rows += 1;
        let record = result.map_err(csv_err)?;
        let line = report.total_rows + 1;

        // The reader is flexible, so a truncated line would otherwise come
        // through with every production cell blank.
        if record.len() < trimmed.len() {
            debug!("{}:{}: {} of {} fields", origin, line, record.len(), trimmed.len());
            report.skipped_rows += 1;
            continue;
        }
        let row: RawRow = record.deserialize(Some(&trimmed)).map_err(csv_err)?;

        let (Some(region), Some(department)) =
            (clean_label(row.region.clone()), clean_label(row.department.clone()))
        else {
            debug!("{}:{}: missing region or department", origin, line);
            report.skipped_rows += 1;
            continue;
        };
        let year = match parse_year_safe(row.year.as_deref()) {
            Some(y) if options.year_range.contains(&y) => y,
            _ => {
                debug!("{}:{}: unusable year {:?}", origin, line, row.year);
                report.skipped_rows += 1;
                continue;
            }
        };

        let mut production = SourceValues::default();
        let mut blanks = 0usize;
        let mut valid = true;
        for source in EnergySource::ALL {
            match parse_numeric_cell(row.cell(source)) {
                NumericCell::Value(v) if v >= 0.0 => production.set(source, Some(v)),
                NumericCell::Missing => blanks += 1,
                _ => {
                    debug!("{}:{}: bad {} value {:?}", origin, line, source.id(), row.cell(source));
                    valid = false;
                    break;
                }
            }
        }
        if !valid {
            report.skipped_rows += 1;
            continue;
        }

        report.imputed_zeros += blanks;
        records.push(EnergyRecord { region, department, year, production });
    }

    if report.skipped_rows > 0 {
        warn!("{}: skipped {} of {} rows", origin, report.skipped_rows, report.total_rows);
    }
    report.loaded_rows = records.len();
    Ok((records, report))
}

/// Length and modification time; a change means the file must be re-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self, DashboardError> {
        let meta = fs::metadata(path).map_err(|source| DashboardError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { len: meta.len(), modified: meta.modified().ok() })
    }
}

struct CacheEntry {
    dataset: Arc<Dataset>,
    report: LoadReport,
    fingerprint: Fingerprint,
}

/// Datasets keyed by source path, loaded at most once per file version.
///
/// Entries are replaced only when the file changes on disk or when the
/// caller invalidates them; a failed load leaves other entries untouched.
///
/// A change is detected from the file length and modification time only.
/// A rewrite that keeps the same length within one mtime tick of the
/// filesystem goes unnoticed; call [`DatasetCache::invalidate`] after
/// such a write.
pub struct DatasetCache {
    options: LoadOptions,
    entries: HashMap<PathBuf, CacheEntry>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}

impl DatasetCache {
    pub fn new(options: LoadOptions) -> Self {
        Self { options, entries: HashMap::new() }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Changing the options drops every entry loaded under the old ones.
    pub fn set_options(&mut self, options: LoadOptions) {
        if options != self.options {
            self.entries.clear();
            self.options = options;
        }
    }

    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Dataset>, DashboardError> {
        let path = path.as_ref();
        let fingerprint = Fingerprint::of(path)?;
        if let Some(entry) = self.entries.get(path) {
            if entry.fingerprint == fingerprint {
                debug!("Cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.dataset));
            }
            info!("{} changed on disk, reloading", path.display());
        }

        let (dataset, report) = load_dataset(path, &self.options)?;
        let dataset = Arc::new(dataset);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry { dataset: Arc::clone(&dataset), report, fingerprint },
        );
        Ok(dataset)
    }

    pub fn report(&self, path: impl AsRef<Path>) -> Option<&LoadReport> {
        self.entries.get(path.as_ref()).map(|e| &e.report)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries.contains_key(path.as_ref())
    }

    /// Returns whether an entry was dropped.
    pub fn invalidate(&mut self, path: impl AsRef<Path>) -> bool {
        self.entries.remove(path.as_ref()).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

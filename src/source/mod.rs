//! Dataset loading: CSV and spreadsheet readers, header cleanup, column-set
//! comparison, and file discovery for consolidating per-brand exports.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::models::{Dataset, Record};

pub mod csv_source;
pub mod discover;
pub mod workbook_source;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Worksheet name; the first sheet when unset. Ignored for CSV.
    #[serde(default)]
    pub sheet: Option<String>,
    /// Rows before the header row.
    #[serde(default)]
    pub skip_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Csv,
    Workbook,
}

fn source_kind(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(SourceKind::Csv),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceKind::Workbook),
        _ => None,
    }
}

pub fn load_dataset(path: &Path, opts: &LoadOptions) -> Result<Dataset, LoadError> {
    let ds = match source_kind(path) {
        Some(SourceKind::Csv) => csv_source::read_csv(path, opts)?,
        Some(SourceKind::Workbook) => workbook_source::read_workbook(path, opts)?,
        None => {
            return Err(LoadError::UnsupportedFormat {
                path: path.display().to_string(),
            });
        }
    };
    info!(
        "Loaded {} rows x {} columns from {}",
        ds.len(),
        ds.columns.len(),
        path.display()
    );
    Ok(ds)
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Header names made unique: blanks become `Unnamed: {i}`, repeats get `.1`, `.2`, ...
pub(crate) fn unique_headers(raw: Vec<Option<String>>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());
    for (i, h) in raw.into_iter().enumerate() {
        let base = match h {
            Some(s) if !s.trim().is_empty() => s,
            _ => format!("Unnamed: {}", i),
        };
        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

fn is_blank_row(row: &[Option<String>]) -> bool {
    row.iter().all(Option::is_none)
}

/// Builds a dataset from the rows left after `skip_rows`. The first non-blank row is
/// the header; fully blank rows are dropped everywhere.
pub(crate) fn assemble<I>(label: String, rows: I) -> Dataset
where
    I: IntoIterator<Item = Vec<Option<String>>>,
{
    let mut rows = rows.into_iter();
    let header = rows.find(|r| !is_blank_row(r)).unwrap_or_default();
    let mut ds = Dataset::new(label, unique_headers(header));
    let width = ds.columns.len();
    for mut values in rows {
        values.truncate(width);
        let record = Record::new(values);
        if record.is_blank() {
            continue;
        }
        ds.push(record);
    }
    ds
}

/// Columns present on only one side of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDiff {
    pub only_in_master: BTreeSet<String>,
    pub only_in_candidate: BTreeSet<String>,
}

impl ColumnDiff {
    pub fn is_empty(&self) -> bool {
        self.only_in_master.is_empty() && self.only_in_candidate.is_empty()
    }
}

pub fn compare_columns(master: &Dataset, candidate: &Dataset) -> ColumnDiff {
    let m = master.column_set();
    let c = candidate.column_set();
    ColumnDiff {
        only_in_master: m.difference(&c).map(|s| s.to_string()).collect(),
        only_in_candidate: c.difference(&m).map(|s| s.to_string()).collect(),
    }
}

/// Logs a column mismatch; never fails.
pub fn report_column_diff(diff: &ColumnDiff, master_label: &str, candidate_label: &str) {
    if diff.is_empty() {
        return;
    }
    warn!("Column mismatch detected between {} and {}", master_label, candidate_label);
    if !diff.only_in_master.is_empty() {
        warn!(
            "  Columns in {} but NOT in {}: {:?}",
            master_label, candidate_label, diff.only_in_master
        );
    }
    if !diff.only_in_candidate.is_empty() {
        warn!(
            "  Columns in {} but NOT in {}: {:?}",
            candidate_label, master_label, diff.only_in_candidate
        );
    }
}

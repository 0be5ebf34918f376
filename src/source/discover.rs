//! File discovery and concatenation for per-brand spec exports
//! (e.g. `NBPC_SPECS_ACER_*.xlsx` in one folder → one combined table).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use walkdir::WalkDir;

use crate::models::{Dataset, Record};

pub const SOURCE_FILE_COLUMN: &str = "source_file";

/// Anchored regex for a file-name pattern where `*` is any run and `?` any one char.
pub fn wildcard_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                re.push_str(&regex::escape(&literal));
                literal.clear();
                re.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    re.push_str(&regex::escape(&literal));
    re.push('$');
    Regex::new(&re).with_context(|| format!("invalid file pattern '{}'", pattern))
}

/// Files directly inside `dir` whose name matches `pattern`, sorted by name.
pub fn discover_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let re = wildcard_regex(pattern)?;
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        // Office lock files share the export's name
        if name.starts_with("~$") {
            continue;
        }
        if re.is_match(&name) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Concatenates datasets over the union of their columns (first-seen order) and
/// appends a `source_file` column carrying each part's label.
pub fn combine_datasets(label: &str, parts: &[Dataset]) -> Dataset {
    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for part in parts {
        for col in &part.columns {
            if col != SOURCE_FILE_COLUMN && seen.insert(col.as_str()) {
                columns.push(col.clone());
            }
        }
    }
    columns.push(SOURCE_FILE_COLUMN.to_string());

    let mut combined = Dataset::new(label, columns);
    let width = combined.columns.len();
    for part in parts {
        let positions: Vec<Option<usize>> = combined.columns[..width - 1]
            .iter()
            .map(|c| part.column_index(c))
            .collect();
        for rec in &part.records {
            let mut values: Vec<Option<String>> = positions
                .iter()
                .map(|p| p.and_then(|i| rec.value(i)).map(str::to_string))
                .collect();
            values.push(Some(part.label.clone()));
            combined.push(Record::new(values));
        }
    }
    combined
}

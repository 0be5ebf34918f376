//! Writers for record partitions and the run summary.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

pub mod csv_export;
pub mod xlsx_export;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    #[default]
    Xlsx,
    Both,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn writes_csv(&self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    pub fn writes_xlsx(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Both)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn ensure_parent_dir(path: &str) -> Result<(), ExportError> {
    let p = Path::new(path);
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

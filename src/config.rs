use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::export::ExportFormat;
use crate::matching::{MatchOptions, MatchStrategy};
use crate::models::{DatasetRole, SchemaMapping};
use crate::source::LoadOptions;

/// Where one dataset comes from and how its columns map onto matching attributes.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct SourceConfig {
    #[serde(default)]
    pub path: String,
    #[serde(flatten)]
    pub load: LoadOptions,
    /// Column mapping override; the role default when unset.
    #[serde(default)]
    pub columns: Option<SchemaMapping>,
}

impl SourceConfig {
    pub fn mapping(&self, role: DatasetRole) -> SchemaMapping {
        self.columns
            .clone()
            .unwrap_or_else(|| SchemaMapping::for_role(role))
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct MatchingConfig {
    #[serde(default)]
    pub strategy: MatchStrategy,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::Indexed,
            parallel: true,
        }
    }
}

impl MatchingConfig {
    pub fn options(&self) -> MatchOptions {
        MatchOptions {
            strategy: self.strategy,
            parallel: self.parallel,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub out_dir: String,
    pub format: String, // csv|xlsx|both
    pub new_name: String,
    pub duplicate_name: String,
    pub summary_name: String,
    pub sheet_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: ".".into(),
            format: "xlsx".into(),
            new_name: "new_rows_to_add".into(),
            duplicate_name: "duplicate_rows_found".into(),
            summary_name: "compare_summary".into(),
            sheet_name: "Sheet1".into(),
        }
    }
}

impl ExportConfig {
    pub fn export_format(&self) -> ExportFormat {
        ExportFormat::parse(&self.format).unwrap_or_default()
    }

    /// `<out_dir>/<stem>.<ext>`
    pub fn path_for(&self, stem: &str, ext: &str) -> String {
        let p: PathBuf = Path::new(&self.out_dir).join(format!("{}.{}", stem, ext));
        p.to_string_lossy().into_owned()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub master: SourceConfig,
    #[serde(default)]
    pub candidate: SourceConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn from_json_file(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::File {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn source(&self, role: DatasetRole) -> &SourceConfig {
        match role {
            DatasetRole::Master => &self.master,
            DatasetRole::Candidate => &self.candidate,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.master.path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "master.path",
            });
        }
        if self.candidate.path.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "candidate.path",
            });
        }
        for (field, src) in [
            ("master.columns", &self.master),
            ("candidate.columns", &self.candidate),
        ] {
            if let Some(m) = &src.columns {
                if let Some((attr, _)) = m.columns().iter().find(|(_, c)| c.trim().is_empty()) {
                    return Err(ConfigError::InvalidValue {
                        field,
                        reason: format!("empty column name for {}", attr.label()),
                    });
                }
            }
        }
        if ExportFormat::parse(&self.export.format).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "export.format",
                reason: format!("unsupported: {}", self.export.format),
            });
        }
        for (field, name) in [
            ("export.new_name", &self.export.new_name),
            ("export.duplicate_name", &self.export.duplicate_name),
            ("export.summary_name", &self.export.summary_name),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::MissingField { field });
            }
        }
        validate_sheet_name("export.sheet_name", &self.export.sheet_name)?;
        Ok(())
    }
}

/// Settings for concatenating per-brand export files into one table.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct CombineConfig {
    pub dir: String,
    pub pattern: String,
    /// Output file; `.csv` writes CSV, anything else XLSX.
    pub out_path: String,
    #[serde(flatten)]
    pub load: LoadOptions,
}

impl CombineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "dir" });
        }
        if self.pattern.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "pattern" });
        }
        if self.out_path.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "out_path" });
        }
        Ok(())
    }
}

// Excel rejects sheet names over 31 chars or containing []:*?/\
fn validate_sheet_name(field: &'static str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.chars().count() > 31 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("'{}' must be 1..=31 characters", name),
        });
    }
    if let Some(bad) = name.chars().find(|c| "[]:*?/\\".contains(*c)) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("'{}' contains '{}'", name, bad),
        });
    }
    Ok(())
}

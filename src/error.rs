use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("cannot read config file {path}: {reason}")]
    File { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("workbook error in {path}: {reason}")]
    Workbook { path: String, reason: String },
    #[error("sheet '{sheet}' not found in {path} (available: {available})")]
    SheetNotFound {
        path: String,
        sheet: String,
        available: String,
    },
    #[error("workbook {path} has no sheets")]
    NoSheets { path: String },
    #[error("unsupported input format for {path}: expected csv, xlsx, xlsm, xlsb, xls or ods")]
    UnsupportedFormat { path: String },
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("internal matching error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export error: {0}")]
    Csv(String),
    #[error("xlsx export error: {0}")]
    Xlsx(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Csv(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Xlsx(e.to_string())
    }
}

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{AppConfig, CombineConfig, SourceConfig};
use crate::error::ConfigError;
use crate::export::ExportFormat;
use crate::matching::MatchStrategy;
use crate::source::LoadOptions;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, ValueEnum, Debug)]
pub enum FormatOpt {
    Csv,
    Xlsx,
    Both,
}

impl FormatOpt {
    pub fn as_str(&self) -> &'static str {
        self.format().as_str()
    }

    pub fn format(&self) -> ExportFormat {
        match self {
            Self::Csv => ExportFormat::Csv,
            Self::Xlsx => ExportFormat::Xlsx,
            Self::Both => ExportFormat::Both,
        }
    }
}

impl std::fmt::Display for FormatOpt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, ValueEnum, Debug)]
pub enum StrategyOpt {
    Indexed,
    Scan,
}

impl From<StrategyOpt> for MatchStrategy {
    fn from(s: StrategyOpt) -> Self {
        match s {
            StrategyOpt::Indexed => MatchStrategy::Indexed,
            StrategyOpt::Scan => MatchStrategy::Scan,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "spec_dedup",
    version,
    about = "Classify new laptop spec rows against a master dataset (NEW vs DUPLICATE)",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare a candidate dataset against the master and split it into new and duplicate rows
    Compare(CompareArgs),
    /// Concatenate per-brand export files matching a pattern into one table
    Combine(CombineArgs),
}

#[derive(Args, Debug, Default)]
pub struct CompareArgs {
    /// Master (prior quarter) file: csv, xlsx, xlsm, xlsb, xls or ods
    #[arg(value_name = "MASTER")]
    pub master: Option<String>,
    /// Candidate (new quarter) file
    #[arg(value_name = "CANDIDATE")]
    pub candidate: Option<String>,
    /// JSON run configuration; command-line values override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,
    /// Worksheet for both inputs
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,
    /// Worksheet for the master input (overrides --sheet)
    #[arg(long = "master-sheet", value_name = "NAME")]
    pub master_sheet: Option<String>,
    /// Worksheet for the candidate input (overrides --sheet)
    #[arg(long = "candidate-sheet", value_name = "NAME")]
    pub candidate_sheet: Option<String>,
    /// Rows above the header row, for both inputs
    #[arg(long = "skip-rows", value_name = "N")]
    pub skip_rows: Option<usize>,
    /// Output directory
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<String>,
    /// Output format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<FormatOpt>,
    /// Stage-1 lookup strategy
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<StrategyOpt>,
    /// Classify candidates on one thread
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Folder holding the export files
    #[arg(value_name = "DIR")]
    pub dir: String,
    /// File-name pattern, `*` and `?` wildcards (e.g. "NBPC_SPECS_ACER_*.xlsx")
    #[arg(value_name = "PATTERN")]
    pub pattern: String,
    /// Output file (.csv or .xlsx)
    #[arg(value_name = "OUT")]
    pub out: String,
    /// Worksheet to read from each file
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,
    /// Rows above the header row
    #[arg(long = "skip-rows", value_name = "N", default_value_t = 0)]
    pub skip_rows: usize,
}

fn apply_source(
    src: &mut SourceConfig,
    path: Option<&String>,
    sheet: Option<&String>,
    skip_rows: Option<usize>,
) {
    if let Some(p) = path {
        src.path = p.clone();
    }
    if let Some(s) = sheet {
        src.load.sheet = Some(s.clone());
    }
    if let Some(n) = skip_rows {
        src.load.skip_rows = n;
    }
}

impl CompareArgs {
    pub fn to_app_config(&self) -> Result<AppConfig, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => AppConfig::from_json_file(path)?,
            None => AppConfig::default(),
        };

        apply_source(
            &mut cfg.master,
            self.master.as_ref(),
            self.master_sheet.as_ref().or(self.sheet.as_ref()),
            self.skip_rows,
        );
        apply_source(
            &mut cfg.candidate,
            self.candidate.as_ref(),
            self.candidate_sheet.as_ref().or(self.sheet.as_ref()),
            self.skip_rows,
        );
        if let Some(dir) = &self.out_dir {
            cfg.export.out_dir = dir.clone();
        }
        if let Some(fmt) = self.format {
            cfg.export.format = fmt.as_str().into();
        }
        if let Some(s) = self.strategy {
            cfg.matching.strategy = s.into();
        }
        if self.sequential {
            cfg.matching.parallel = false;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

impl CombineArgs {
    pub fn to_combine_config(&self) -> Result<CombineConfig, ConfigError> {
        let cfg = CombineConfig {
            dir: self.dir.clone(),
            pattern: self.pattern.clone(),
            out_path: self.out.clone(),
            load: LoadOptions {
                sheet: self.sheet.clone(),
                skip_rows: self.skip_rows,
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

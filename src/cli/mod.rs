//! CLI module: clap-based argument parsing into run configurations.

mod clap_parser;

pub use clap_parser::{Cli, CombineArgs, Command, CompareArgs, FormatOpt, StrategyOpt};

use clap::Parser;
use log::{error, info};

use spec_dedup::cli::{Cli, Command};
use spec_dedup::error::ConfigError;
use spec_dedup::logging::init_logging;
use spec_dedup::orchestrator::{run_combine, run_compare};

const EXIT_RUNTIME: i32 = 1;
const EXIT_CONFIG: i32 = 2;

fn config_failure(e: ConfigError) -> ! {
    error!("Configuration error: {}", e);
    std::process::exit(EXIT_CONFIG);
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Compare(args) => {
            let cfg = args.to_app_config().unwrap_or_else(|e| config_failure(e));
            info!(
                "Comparing {} (MASTER) with {} (NEW), strategy={}, parallel={}",
                cfg.master.path,
                cfg.candidate.path,
                cfg.matching.strategy.as_str(),
                cfg.matching.parallel
            );
            run_compare(&cfg).map(|report| {
                info!("Wrote {} files", report.written.len());
            })
        }
        Command::Combine(args) => {
            let cfg = args.to_combine_config().unwrap_or_else(|e| config_failure(e));
            run_combine(&cfg).map(|report| {
                if let Some(r) = report {
                    info!("Combined {} files into {}", r.files.len(), r.out_path);
                }
            })
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(EXIT_RUNTIME);
    }
}

//! Orchestrator module: high-level workflow coordination.
//!
//! `run_compare` drives one master/candidate comparison end to end:
//! load → column check → normalize → classify → partition → export → summary.
//! `run_combine` consolidates per-brand export files into a single table.

pub mod summary;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::{AppConfig, CombineConfig};
use crate::export::csv_export::{export_records_csv, export_summary_csv};
use crate::export::xlsx_export::{SummaryContext, export_records_xlsx, export_summary_xlsx};
use crate::matching::{MatchStats, classify};
use crate::models::{Dataset, DatasetRole, Record};
use crate::normalize::normalize_dataset;
use crate::partition::partition;
use crate::source::discover::{combine_datasets, discover_files};
use crate::source::{ColumnDiff, compare_columns, load_dataset, report_column_diff};
use summary::SummaryBuilder;

/// Outcome of a compare run.
#[derive(Debug, Clone)]
pub struct CompareReport {
    pub stats: MatchStats,
    pub column_diff: ColumnDiff,
    pub summary: SummaryContext,
    /// Files written, in write order.
    pub written: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CombineReport {
    pub files: Vec<String>,
    pub rows: usize,
    pub columns: usize,
    pub out_path: String,
}

fn load_role(cfg: &AppConfig, role: DatasetRole) -> Result<Dataset> {
    let src = cfg.source(role);
    info!("Loading {} dataset: {}", role, src.path);
    load_dataset(Path::new(&src.path), &src.load)
        .with_context(|| format!("failed to load {} dataset {}", role, src.path))
}

fn warn_missing_columns(cfg: &AppConfig, role: DatasetRole, ds: &Dataset) {
    let mapping = cfg.source(role).mapping(role);
    for (attr, col) in mapping.missing_columns(ds) {
        warn!(
            "{} dataset {} has no '{}' column; {} will compare as empty",
            role,
            ds.label,
            col,
            attr.label()
        );
    }
}

/// Writes one partition in every configured format; returns the paths written.
fn export_partition(
    cfg: &AppConfig,
    stem: &str,
    columns: &[String],
    records: &[&Record],
) -> Result<Vec<String>> {
    let fmt = cfg.export.export_format();
    let mut written = Vec::new();
    if fmt.writes_xlsx() {
        let path = cfg.export.path_for(stem, "xlsx");
        export_records_xlsx(&path, &cfg.export.sheet_name, columns, records)
            .with_context(|| format!("writing {}", path))?;
        info!("Saved {} ({} rows)", path, records.len());
        written.push(path);
    }
    if fmt.writes_csv() {
        let path = cfg.export.path_for(stem, "csv");
        export_records_csv(&path, columns, records)
            .with_context(|| format!("writing {}", path))?;
        info!("Saved {} ({} rows)", path, records.len());
        written.push(path);
    }
    Ok(written)
}

pub fn run_compare(cfg: &AppConfig) -> Result<CompareReport> {
    cfg.validate()?;
    let started_utc = chrono::Utc::now();

    let t_load = Instant::now();
    let master = load_role(cfg, DatasetRole::Master)?;
    let candidate = load_role(cfg, DatasetRole::Candidate)?;
    let load_time = t_load.elapsed();
    info!("  {} rows from {} (MASTER)", master.len(), master.label);
    info!("  {} rows from {} (NEW)", candidate.len(), candidate.label);

    let column_diff = compare_columns(&master, &candidate);
    report_column_diff(&column_diff, &master.label, &candidate.label);
    warn_missing_columns(cfg, DatasetRole::Master, &master);
    warn_missing_columns(cfg, DatasetRole::Candidate, &candidate);

    info!("Processing matches...");
    let opts = cfg.matching.options();
    let t_match = Instant::now();
    let master_keys = normalize_dataset(&master, &cfg.master.mapping(DatasetRole::Master));
    let candidate_keys =
        normalize_dataset(&candidate, &cfg.candidate.mapping(DatasetRole::Candidate));
    let outcomes = classify(&master_keys, &candidate_keys, opts);
    let parts = partition(&candidate, &outcomes)?;
    let match_time = t_match.elapsed();

    let stats = MatchStats::from_outcomes(&outcomes);
    info!("  Found {} NEW rows to add", parts.new.len());
    info!("  Found {} DUPLICATE rows to skip", parts.duplicate.len());
    info!(
        "  New breakdown: {} without region/country/brand match, {} without model match, {} spec variants",
        stats.new_no_group, stats.new_no_model, stats.new_variant
    );
    if stats.blank_spec_duplicates > 0 {
        warn!(
            "{} duplicates matched with an empty CPU, GPU or resolution value; review them for false positives",
            stats.blank_spec_duplicates
        );
    }

    let t_export = Instant::now();
    let mut written = export_partition(cfg, &cfg.export.new_name, &candidate.columns, &parts.new)?;
    written.extend(export_partition(
        cfg,
        &cfg.export.duplicate_name,
        &candidate.columns,
        &parts.duplicate,
    )?);
    let export_time = t_export.elapsed();

    let summary = SummaryBuilder::new(&master.label, &candidate.label)
        .with_counts(master.len(), candidate.len())
        .with_stats(&stats)
        .with_column_diff(&column_diff)
        .with_strategy(opts.strategy, opts.parallel)
        .with_timings(load_time, match_time, export_time)
        .with_timestamps(started_utc, chrono::Utc::now())
        .build();

    let sum_csv = cfg.export.path_for(&cfg.export.summary_name, "csv");
    info!("Writing CSV summary to {}", sum_csv);
    export_summary_csv(&sum_csv, &summary).with_context(|| format!("writing {}", sum_csv))?;
    written.push(sum_csv);
    if cfg.export.export_format().writes_xlsx() {
        let sum_xlsx = cfg.export.path_for(&cfg.export.summary_name, "xlsx");
        export_summary_xlsx(&sum_xlsx, &summary)
            .with_context(|| format!("writing {}", sum_xlsx))?;
        written.push(sum_xlsx);
    }

    info!("SUMMARY:");
    info!("  {} (MASTER) rows: {}", summary.master_label, summary.total_master);
    info!("  {} (NEW) rows processed: {}", summary.candidate_label, summary.total_candidate);
    info!("  New rows: {}", summary.new_rows);
    info!("  Duplicates: {}", summary.duplicate_rows);
    info!("  Duration: {:.2}s", summary.duration_secs);

    Ok(CompareReport {
        stats,
        column_diff,
        summary,
        written,
    })
}

/// Returns `None` when no files match the pattern; nothing is written then.
pub fn run_combine(cfg: &CombineConfig) -> Result<Option<CombineReport>> {
    cfg.validate()?;
    let files = discover_files(Path::new(&cfg.dir), &cfg.pattern)?;
    if files.is_empty() {
        warn!("No files found matching {} in {}", cfg.pattern, cfg.dir);
        return Ok(None);
    }

    let mut parts = Vec::with_capacity(files.len());
    for f in &files {
        let ds = load_dataset(f, &cfg.load)
            .with_context(|| format!("failed to load {}", f.display()))?;
        parts.push(ds);
    }

    let out_label = crate::source::file_label(Path::new(&cfg.out_path));
    let combined = combine_datasets(&out_label, &parts);
    let rows: Vec<&Record> = combined.records.iter().collect();

    let is_csv = Path::new(&cfg.out_path)
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    let written = if is_csv {
        export_records_csv(&cfg.out_path, &combined.columns, &rows)
    } else {
        export_records_xlsx(&cfg.out_path, "Sheet1", &combined.columns, &rows)
    };
    written.with_context(|| format!("writing {}", cfg.out_path))?;
    info!("Created {} with {} rows", cfg.out_path, combined.len());

    Ok(Some(CombineReport {
        files: files.iter().map(|f| f.display().to_string()).collect(),
        rows: combined.len(),
        columns: combined.columns.len(),
        out_path: cfg.out_path.clone(),
    }))
}

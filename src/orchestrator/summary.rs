//! Summary report generation utilities.

use std::time::Duration;

use crate::export::xlsx_export::SummaryContext;
use crate::matching::{MatchStats, MatchStrategy};
use crate::source::ColumnDiff;

/// Builder for SummaryContext to simplify summary creation.
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    pub master_label: String,
    pub candidate_label: String,
    pub total_master: usize,
    pub total_candidate: usize,
    pub new_rows: usize,
    pub duplicate_rows: usize,
    pub new_no_group: usize,
    pub new_no_model: usize,
    pub new_variant: usize,
    pub blank_spec_duplicates: usize,
    pub columns_only_in_master: usize,
    pub columns_only_in_candidate: usize,
    pub strategy: String,
    pub parallel: bool,
    pub load_time: Duration,
    pub match_time: Duration,
    pub export_time: Duration,
    pub started_utc: chrono::DateTime<chrono::Utc>,
    pub ended_utc: chrono::DateTime<chrono::Utc>,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        let now = chrono::Utc::now();
        Self {
            master_label: String::new(),
            candidate_label: String::new(),
            total_master: 0,
            total_candidate: 0,
            new_rows: 0,
            duplicate_rows: 0,
            new_no_group: 0,
            new_no_model: 0,
            new_variant: 0,
            blank_spec_duplicates: 0,
            columns_only_in_master: 0,
            columns_only_in_candidate: 0,
            strategy: MatchStrategy::default().as_str().to_string(),
            parallel: true,
            load_time: Duration::ZERO,
            match_time: Duration::ZERO,
            export_time: Duration::ZERO,
            started_utc: now,
            ended_utc: now,
        }
    }
}

impl SummaryBuilder {
    pub fn new(master_label: &str, candidate_label: &str) -> Self {
        Self {
            master_label: master_label.to_string(),
            candidate_label: candidate_label.to_string(),
            ..Default::default()
        }
    }

    /// Set dataset row counts.
    pub fn with_counts(mut self, total_master: usize, total_candidate: usize) -> Self {
        self.total_master = total_master;
        self.total_candidate = total_candidate;
        self
    }

    /// Set output row counts.
    pub fn with_results(mut self, new_rows: usize, duplicate_rows: usize) -> Self {
        self.new_rows = new_rows;
        self.duplicate_rows = duplicate_rows;
        self
    }

    /// Set per-stage counts (also sets output counts).
    pub fn with_stats(mut self, stats: &MatchStats) -> Self {
        self.new_rows = stats.new_rows();
        self.duplicate_rows = stats.duplicates;
        self.new_no_group = stats.new_no_group;
        self.new_no_model = stats.new_no_model;
        self.new_variant = stats.new_variant;
        self.blank_spec_duplicates = stats.blank_spec_duplicates;
        self
    }

    pub fn with_column_diff(mut self, diff: &ColumnDiff) -> Self {
        self.columns_only_in_master = diff.only_in_master.len();
        self.columns_only_in_candidate = diff.only_in_candidate.len();
        self
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy, parallel: bool) -> Self {
        self.strategy = strategy.as_str().to_string();
        self.parallel = parallel;
        self
    }

    pub fn with_timings(mut self, load: Duration, matching: Duration, export: Duration) -> Self {
        self.load_time = load;
        self.match_time = matching;
        self.export_time = export;
        self
    }

    /// Set run timestamps.
    pub fn with_timestamps(
        mut self,
        started: chrono::DateTime<chrono::Utc>,
        ended: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        self.started_utc = started;
        self.ended_utc = ended;
        self
    }

    /// Build the final SummaryContext.
    pub fn build(self) -> SummaryContext {
        let duration_secs = (self.ended_utc - self.started_utc).num_milliseconds() as f64 / 1000.0;
        SummaryContext {
            master_label: self.master_label,
            candidate_label: self.candidate_label,
            total_master: self.total_master,
            total_candidate: self.total_candidate,
            new_rows: self.new_rows,
            duplicate_rows: self.duplicate_rows,
            new_no_group: self.new_no_group,
            new_no_model: self.new_no_model,
            new_variant: self.new_variant,
            blank_spec_duplicates: self.blank_spec_duplicates,
            columns_only_in_master: self.columns_only_in_master,
            columns_only_in_candidate: self.columns_only_in_candidate,
            strategy: self.strategy,
            parallel: self.parallel,
            load_time: self.load_time,
            match_time: self.match_time,
            export_time: self.export_time,
            started_utc: self.started_utc,
            ended_utc: self.ended_utc,
            duration_secs,
        }
    }
}

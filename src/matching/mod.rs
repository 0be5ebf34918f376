//! Progressive three-stage duplicate detection.
//!
//! Each candidate is checked against the master set:
//! 1. region, country and brand keys must all agree,
//! 2. then the cleaned model name,
//! 3. then CPU, GPU and resolution keys.
//!
//! Reaching stage 3 with at least one surviving master record makes the candidate a
//! duplicate. An empty set at any stage makes it new. Candidates are independent, so
//! they are classified in parallel against a shared, read-only master slice.

use crate::models::NormalizedRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub mod index;

use index::MasterIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    New,
    Duplicate,
}

/// The stage that decided a candidate's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStage {
    /// No master record shares region, country and brand.
    NoGroup,
    /// Group found, but no record with the same cleaned model name.
    NoModel,
    /// Same model, but CPU, GPU or resolution differ.
    Variant,
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchOutcome {
    pub stage: MatchStage,
    /// Duplicate whose stage-3 agreement included an empty CPU, GPU or resolution key.
    pub blank_spec: bool,
}

impl MatchOutcome {
    fn new_at(stage: MatchStage) -> Self {
        Self {
            stage,
            blank_spec: false,
        }
    }

    fn duplicate(blank_spec: bool) -> Self {
        Self {
            stage: MatchStage::Duplicate,
            blank_spec,
        }
    }

    pub fn classification(&self) -> Classification {
        match self.stage {
            MatchStage::Duplicate => Classification::Duplicate,
            MatchStage::NoGroup | MatchStage::NoModel | MatchStage::Variant => {
                Classification::New
            }
        }
    }

    pub fn is_duplicate(&self) -> bool {
        self.classification() == Classification::Duplicate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Bucket the master set by (region, country, brand) once; stage 1 is a lookup.
    #[default]
    Indexed,
    /// Scan the whole master set for every candidate.
    Scan,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::Scan => "scan",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub strategy: MatchStrategy,
    pub parallel: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::Indexed,
            parallel: true,
        }
    }
}

/// Runs stages 2 and 3 over the stage-1 survivors of one candidate.
pub fn decide<'a, I>(candidate: &NormalizedRecord, group: I) -> MatchOutcome
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut any_group = false;
    let mut any_model = false;
    for master in group {
        any_group = true;
        if !master.same_model(candidate) {
            continue;
        }
        any_model = true;
        if master.same_specs(candidate) {
            return MatchOutcome::duplicate(candidate.has_blank_spec());
        }
    }
    if !any_group {
        MatchOutcome::new_at(MatchStage::NoGroup)
    } else if !any_model {
        MatchOutcome::new_at(MatchStage::NoModel)
    } else {
        MatchOutcome::new_at(MatchStage::Variant)
    }
}

/// Classifies every candidate; the result is in candidate order.
pub fn classify(
    master: &[NormalizedRecord],
    candidates: &[NormalizedRecord],
    opts: MatchOptions,
) -> Vec<MatchOutcome> {
    match opts.strategy {
        MatchStrategy::Indexed => {
            let index = MasterIndex::build(master);
            log::debug!(
                "master index: {} records in {} groups",
                master.len(),
                index.group_count()
            );
            run(candidates, opts.parallel, |c| {
                decide(c, index.group(c).iter().map(|&i| &master[i]))
            })
        }
        MatchStrategy::Scan => run(candidates, opts.parallel, |c| {
            decide(c, master.iter().filter(|m| m.same_group(c)))
        }),
    }
}

fn run<F>(candidates: &[NormalizedRecord], parallel: bool, f: F) -> Vec<MatchOutcome>
where
    F: Fn(&NormalizedRecord) -> MatchOutcome + Sync + Send,
{
    if parallel {
        candidates.par_iter().map(&f).collect()
    } else {
        candidates.iter().map(&f).collect()
    }
}

/// Per-stage tallies over one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub total: usize,
    pub new_no_group: usize,
    pub new_no_model: usize,
    pub new_variant: usize,
    pub duplicates: usize,
    pub blank_spec_duplicates: usize,
}

impl MatchStats {
    pub fn from_outcomes(outcomes: &[MatchOutcome]) -> Self {
        let mut s = MatchStats {
            total: outcomes.len(),
            ..Default::default()
        };
        for o in outcomes {
            match o.stage {
                MatchStage::NoGroup => s.new_no_group += 1,
                MatchStage::NoModel => s.new_no_model += 1,
                MatchStage::Variant => s.new_variant += 1,
                MatchStage::Duplicate => {
                    s.duplicates += 1;
                    if o.blank_spec {
                        s.blank_spec_duplicates += 1;
                    }
                }
            }
        }
        s
    }

    pub fn new_rows(&self) -> usize {
        self.new_no_group + self.new_no_model + self.new_variant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(
        region: &str,
        country: &str,
        brand: &str,
        model: &str,
        cpu: &str,
        gpu: &str,
        res: &str,
    ) -> NormalizedRecord {
        NormalizedRecord {
            region_key: region.into(),
            country_key: country.into(),
            brand_key: brand.into(),
            model_key: model.into(),
            cpu_key: cpu.into(),
            gpu_key: gpu.into(),
            resolution_key: res.into(),
        }
    }

    fn master() -> Vec<NormalizedRecord> {
        vec![
            rec("emea", "spain", "acer", "aspire 5", "i7 12700h", "rtx 3050", "1920x1080"),
            rec("emea", "spain", "acer", "nitro 5", "i5 12500h", "rtx 3060", "1920x1080"),
            rec("emea", "france", "dell", "xps 13", "i7 1360p", "iris xe", "2560x1600"),
            rec("apac", "japan", "hp", "envy 14", "", "", ""),
        ]
    }

    fn all_strategies() -> Vec<MatchOptions> {
        let mut v = Vec::new();
        for strategy in [MatchStrategy::Indexed, MatchStrategy::Scan] {
            for parallel in [true, false] {
                v.push(MatchOptions { strategy, parallel });
            }
        }
        v
    }

    #[test]
    fn exact_match_is_duplicate() {
        let c = rec("emea", "spain", "acer", "aspire 5", "i7 12700h", "rtx 3050", "1920x1080");
        let out = decide(&c, master().iter().filter(|m| m.same_group(&c)));
        assert_eq!(out.stage, MatchStage::Duplicate);
        assert!(!out.blank_spec);
        assert_eq!(out.classification(), Classification::Duplicate);
    }

    #[test]
    fn unknown_group_short_circuits() {
        // identical model and specs, but a different country
        let c = rec("emea", "italy", "acer", "aspire 5", "i7 12700h", "rtx 3050", "1920x1080");
        for opts in all_strategies() {
            let out = classify(&master(), std::slice::from_ref(&c), opts);
            assert_eq!(out[0].stage, MatchStage::NoGroup);
        }
    }

    #[test]
    fn unknown_model_is_new() {
        let c = rec("emea", "spain", "acer", "swift 3", "i7 12700h", "rtx 3050", "1920x1080");
        let out = classify(&master(), &[c], MatchOptions::default());
        assert_eq!(out[0].stage, MatchStage::NoModel);
        assert_eq!(out[0].classification(), Classification::New);
    }

    #[test]
    fn cpu_variant_is_new() {
        let c = rec("emea", "spain", "acer", "aspire 5", "i5 1235u", "rtx 3050", "1920x1080");
        let out = classify(&master(), &[c], MatchOptions::default());
        assert_eq!(out[0].stage, MatchStage::Variant);
        assert!(!out[0].is_duplicate());
    }

    #[test]
    fn one_matching_master_row_is_enough() {
        let mut m = master();
        m.push(rec("emea", "spain", "acer", "aspire 5", "i5 1235u", "mx550", "1920x1080"));
        let c = rec("emea", "spain", "acer", "aspire 5", "i5 1235u", "mx550", "1920x1080");
        let out = classify(&m, &[c], MatchOptions::default());
        assert!(out[0].is_duplicate());
    }

    #[test]
    fn blank_specs_match_each_other_and_are_flagged() {
        let c = rec("apac", "japan", "hp", "envy 14", "", "", "");
        let out = classify(&master(), &[c], MatchOptions::default());
        assert_eq!(out[0].stage, MatchStage::Duplicate);
        assert!(out[0].blank_spec);
    }

    #[test]
    fn strategies_agree_and_preserve_order() {
        let m = master();
        let cands = vec![
            rec("emea", "spain", "acer", "nitro 5", "i5 12500h", "rtx 3060", "1920x1080"),
            rec("emea", "spain", "acer", "nitro 5", "i5 12500h", "rtx 4050", "1920x1080"),
            rec("na", "usa", "acer", "nitro 5", "i5 12500h", "rtx 3060", "1920x1080"),
            rec("emea", "france", "dell", "xps 15", "i7 1360p", "iris xe", "2560x1600"),
            rec("emea", "france", "dell", "xps 13", "i7 1360p", "iris xe", "2560x1600"),
            rec("apac", "japan", "hp", "envy 14", "", "", ""),
        ];
        let expected = vec![
            MatchStage::Duplicate,
            MatchStage::Variant,
            MatchStage::NoGroup,
            MatchStage::NoModel,
            MatchStage::Duplicate,
            MatchStage::Duplicate,
        ];
        for opts in all_strategies() {
            let stages: Vec<MatchStage> = classify(&m, &cands, opts)
                .into_iter()
                .map(|o| o.stage)
                .collect();
            assert_eq!(stages, expected, "{:?}", opts);
        }
    }

    #[test]
    fn empty_master_makes_everything_new() {
        let cands = master();
        let out = classify(&[], &cands, MatchOptions::default());
        assert!(out.iter().all(|o| o.stage == MatchStage::NoGroup));
    }

    #[test]
    fn stats_partition_the_total() {
        let m = master();
        let cands = vec![
            rec("emea", "spain", "acer", "aspire 5", "i7 12700h", "rtx 3050", "1920x1080"),
            rec("emea", "spain", "acer", "aspire 7", "i7 12700h", "rtx 3050", "1920x1080"),
            rec("apac", "japan", "hp", "envy 14", "", "", ""),
            rec("x", "y", "z", "w", "", "", ""),
        ];
        let stats = MatchStats::from_outcomes(&classify(&m, &cands, MatchOptions::default()));
        assert_eq!(stats.total, 4);
        assert_eq!(stats.duplicates, 2);
        assert_eq!(stats.blank_spec_duplicates, 1);
        assert_eq!(stats.new_no_model, 1);
        assert_eq!(stats.new_no_group, 1);
        assert_eq!(stats.new_rows() + stats.duplicates, stats.total);
    }
}

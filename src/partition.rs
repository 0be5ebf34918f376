use crate::error::MatchError;
use crate::matching::{Classification, MatchOutcome};
use crate::models::{Dataset, Record};

/// Candidate records split by classification, original values and order kept.
#[derive(Debug, Default)]
pub struct Partitioned<'a> {
    pub new: Vec<&'a Record>,
    pub duplicate: Vec<&'a Record>,
}

impl Partitioned<'_> {
    pub fn total(&self) -> usize {
        self.new.len() + self.duplicate.len()
    }
}

pub fn partition<'a>(
    candidates: &'a Dataset,
    outcomes: &[MatchOutcome],
) -> Result<Partitioned<'a>, MatchError> {
    if candidates.len() != outcomes.len() {
        return Err(MatchError::Internal(format!(
            "{} candidate records but {} classifications",
            candidates.len(),
            outcomes.len()
        )));
    }
    let mut out = Partitioned::default();
    for (record, outcome) in candidates.records.iter().zip(outcomes) {
        match outcome.classification() {
            Classification::New => out.new.push(record),
            Classification::Duplicate => out.duplicate.push(record),
        }
    }
    Ok(out)
}

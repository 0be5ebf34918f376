use crate::models::NormalizedRecord;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub region: String,
    pub country: String,
    pub brand: String,
}

impl GroupKey {
    pub fn of(r: &NormalizedRecord) -> Self {
        Self {
            region: r.region_key.clone(),
            country: r.country_key.clone(),
            brand: r.brand_key.clone(),
        }
    }
}

/// Master record positions bucketed by (region, country, brand).
#[derive(Debug, Default)]
pub struct MasterIndex {
    groups: HashMap<GroupKey, Vec<usize>>,
}

impl MasterIndex {
    pub fn build(master: &[NormalizedRecord]) -> Self {
        let mut groups: HashMap<GroupKey, Vec<usize>> = HashMap::new();
        for (i, r) in master.iter().enumerate() {
            groups.entry(GroupKey::of(r)).or_default().push(i);
        }
        Self { groups }
    }

    /// Positions of master records in the candidate's group, ascending; empty if none.
    pub fn group(&self, candidate: &NormalizedRecord) -> &[usize] {
        self.groups
            .get(&GroupKey::of(candidate))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

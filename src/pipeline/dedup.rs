use super::record::{FeedRecord, Identity};
use crate::config::IdentityPolicy;
use std::collections::HashSet;

/// Records in first-seen order, unique by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCollection {
    policy: IdentityPolicy,
    records: Vec<FeedRecord>,
    seen: HashSet<Identity>,
}

impl FeedCollection {
    pub fn new(policy: IdentityPolicy) -> Self {
        Self {
            policy,
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Fold `batch` in, appending every record not yet known under any of its
    /// identities, in batch order. Returns the number of records appended.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = FeedRecord>) -> usize {
        let before = self.records.len();
        for record in batch {
            let keys = record.identities(self.policy);
            if keys.iter().any(|key| self.seen.contains(key)) {
                // Remember keys only this sighting carries, e.g. a status id
                // that had not rendered the first time.
                self.seen.extend(keys);
                continue;
            }
            self.seen.extend(keys);
            self.records.push(record);
        }
        self.records.len() - before
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//! Duplicate resolution against the store and within the batch.
//!
//! Every valid record's natural key is checked against two sources in a
//! fixed order: the set of keys already accepted earlier in the same
//! batch first, then the persisted store. The batch set must come first
//! because accepted rows are applied to the store immediately, so by the
//! time a repeated key arrives the store already contains the earlier
//! row; only the set can tell an intra-file repeat apart from a record
//! that predates the batch.
//!
//! The caller's policy decides what a collision means: with
//! `skip_duplicates` the record lands in the duplicate bucket (counted,
//! not applied, not a failure); without it the collision is a failure
//! whose reason names the existing key.

use std::collections::HashSet;

use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Key unseen anywhere; the record may proceed to the applier.
    Fresh,
    Duplicate { reason: String },
    Failed { reason: String },
}

#[derive(Debug)]
pub struct DuplicateResolver {
    skip_duplicates: bool,
    accepted: HashSet<String>,
}

impl DuplicateResolver {
    pub fn new(skip_duplicates: bool) -> Self {
        Self {
            skip_duplicates,
            accepted: HashSet::new(),
        }
    }

    pub fn resolve(&mut self, store: &dyn RecordStore, key: &str) -> Resolution {
        let reason = if self.accepted.contains(key) {
            Some(format!(
                "student number '{key}' appears earlier in this batch"
            ))
        } else {
            match store.find_by_key(key) {
                Ok(Some(_)) => Some(format!("student number '{key}' already exists")),
                Ok(None) => None,
                Err(err) => {
                    return Resolution::Failed {
                        reason: format!("duplicate check failed: {err}"),
                    };
                }
            }
        };

        match reason {
            Some(reason) if self.skip_duplicates => Resolution::Duplicate { reason },
            Some(reason) => Resolution::Failed { reason },
            None => {
                self.accepted.insert(key.to_string());
                Resolution::Fresh
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::StudentRecord, store::MemoryStore};

    #[test]
    fn fresh_keys_pass_and_are_remembered() {
        let store = MemoryStore::new();
        let mut resolver = DuplicateResolver::new(true);
        assert_eq!(resolver.resolve(&store, "a"), Resolution::Fresh);
        assert!(matches!(
            resolver.resolve(&store, "a"),
            Resolution::Duplicate { .. }
        ));
    }

    #[test]
    fn pre_existing_key_reports_already_exists() {
        let mut store = MemoryStore::new();
        store
            .insert(StudentRecord::new("a", "x"))
            .expect("seed store");
        let mut resolver = DuplicateResolver::new(true);
        match resolver.resolve(&store, "a") {
            Resolution::Duplicate { reason } => {
                assert!(reason.contains("already exists"), "reason: {reason}");
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[test]
    fn batch_reason_wins_when_the_earlier_row_was_already_applied() {
        let mut store = MemoryStore::new();
        let mut resolver = DuplicateResolver::new(true);
        assert_eq!(resolver.resolve(&store, "a"), Resolution::Fresh);
        // The applier writes each fresh record straight away, so the store
        // sees the key before the repeat arrives.
        store
            .insert(StudentRecord::new("a", "x"))
            .expect("apply first row");
        match resolver.resolve(&store, "a") {
            Resolution::Duplicate { reason } => {
                assert!(reason.contains("earlier in this batch"), "reason: {reason}");
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[test]
    fn intra_batch_collision_names_the_batch() {
        let store = MemoryStore::new();
        let mut resolver = DuplicateResolver::new(true);
        assert_eq!(resolver.resolve(&store, "a"), Resolution::Fresh);
        match resolver.resolve(&store, "a") {
            Resolution::Duplicate { reason } => {
                assert!(reason.contains("earlier in this batch"), "reason: {reason}");
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[test]
    fn fail_policy_turns_collisions_into_failures() {
        let mut store = MemoryStore::new();
        store
            .insert(StudentRecord::new("a", "x"))
            .expect("seed store");
        let mut resolver = DuplicateResolver::new(false);
        match resolver.resolve(&store, "a") {
            Resolution::Failed { reason } => assert!(reason.contains("'a'")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

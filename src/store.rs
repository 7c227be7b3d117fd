//! The record-store collaborator seam.
//!
//! The pipeline owns none of the persisted records; it only borrows them
//! transiently for duplicate comparison and hands new records over through
//! [`RecordStore::insert`]. The store's unique-key constraint is the final
//! authority on duplicates: a [`StorageError::DuplicateKey`] surfaced late
//! (a race with a concurrent writer) is handled by the applier as an
//! ordinary per-row failure.
//!
//! [`MemoryStore`] is the bundled implementation used by the CLI and the
//! test suite, with JSON load/save so a store file can live between runs.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::StudentRecord;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("student number '{key}' already exists")]
    DuplicateKey { key: String },

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub trait RecordStore {
    /// Look up a record by its natural key.
    fn find_by_key(&self, student_number: &str) -> Result<Option<StudentRecord>, StorageError>;

    /// Insert a new record, enforcing the unique-key constraint.
    fn insert(&mut self, record: StudentRecord) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    records: BTreeMap<String, StudentRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &StudentRecord> {
        self.records.values()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening store file {path:?}"))?;
        let store = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing store file {path:?}"))?;
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating store file {path:?}"))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("Writing store file {path:?}"))?;
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn find_by_key(&self, student_number: &str) -> Result<Option<StudentRecord>, StorageError> {
        Ok(self.records.get(student_number).cloned())
    }

    fn insert(&mut self, record: StudentRecord) -> Result<(), StorageError> {
        if self.records.contains_key(&record.student_number) {
            return Err(StorageError::DuplicateKey {
                key: record.student_number.clone(),
            });
        }
        self.records.insert(record.student_number.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_lookup_round_trips() {
        let mut store = MemoryStore::new();
        store
            .insert(StudentRecord::new("2024001", "张三"))
            .expect("first insert");
        let found = store.find_by_key("2024001").expect("lookup");
        assert_eq!(found.map(|r| r.full_name), Some("张三".to_string()));
        assert!(store.find_by_key("2024002").expect("lookup").is_none());
    }

    #[test]
    fn duplicate_insert_is_rejected_with_the_key() {
        let mut store = MemoryStore::new();
        store
            .insert(StudentRecord::new("2024001", "张三"))
            .expect("first insert");
        let err = store
            .insert(StudentRecord::new("2024001", "李四"))
            .expect_err("duplicate insert");
        assert!(err.to_string().contains("2024001"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_file_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("store.json");
        let mut store = MemoryStore::new();
        store
            .insert(StudentRecord::new("2024001", "张三"))
            .expect("insert");
        store.save(&path).expect("save");
        let loaded = MemoryStore::load(&path).expect("load");
        assert_eq!(loaded.len(), 1);
    }
}

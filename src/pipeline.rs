//! The ingestion pipeline: one synchronous pass over a batch.
//!
//! Rows flow Mapper -> Normalizer -> Validator -> Duplicate Resolver ->
//! Applier, strictly in input order; row N's intra-batch duplicate check
//! depends on the keys accepted by rows before it. Per-row problems never
//! abort the batch; the only return value is the complete
//! [`OutcomeReport`] covering every submitted row exactly once.
//!
//! Retrying a cancelled or crashed call is safe: re-submit the same batch
//! with `skip_duplicates` set and already-applied rows come back as
//! duplicates rather than failures.

use chrono::{Local, NaiveDate};
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;

use crate::{
    apply,
    dedup::{DuplicateResolver, Resolution},
    normalize,
    record::StudentRecord,
    report::{OutcomeReport, ReportBuilder},
    row::RawRow,
    store::RecordStore,
    validate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportPolicy {
    /// Skip key collisions (count them as duplicates) instead of treating
    /// them as failures.
    pub skip_duplicates: bool,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            skip_duplicates: true,
        }
    }
}

/// A row rejected by the validator in a dry run.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidRow {
    pub row_index: usize,
    pub raw: RawRow,
    pub reasons: Vec<String>,
}

/// Result of [`validate_only`]: mapping + normalization + validation with
/// no duplicate resolution and no store mutation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub valid: Vec<StudentRecord>,
    pub invalid: Vec<InvalidRow>,
}

/// Run the full pipeline over one batch, applying surviving records to the
/// store, and return the row-addressable outcome report.
pub fn ingest(
    rows: Vec<RawRow>,
    policy: &ImportPolicy,
    store: &mut dyn RecordStore,
) -> OutcomeReport {
    ingest_as_of(rows, policy, store, Local::now().date_naive())
}

/// [`ingest`] with a pinned date for age derivation; test seam.
pub fn ingest_as_of(
    rows: Vec<RawRow>,
    policy: &ImportPolicy,
    store: &mut dyn RecordStore,
    today: NaiveDate,
) -> OutcomeReport {
    let mut builder = ReportBuilder::new(rows.len());
    let mut resolver = DuplicateResolver::new(policy.skip_duplicates);

    for (offset, raw) in rows.into_iter().enumerate() {
        let row_index = offset + 1;
        let normalized = normalize::normalize_row_as_of(row_index, raw, today);
        let outcome = validate::validate_row(&normalized);
        let raw = normalized.raw;
        match outcome {
            Err(reasons) => {
                let reason = reasons.iter().join("; ");
                debug!("row {row_index} rejected: {reason}");
                builder.failure(row_index, raw, reason);
            }
            Ok(record) => match resolver.resolve(store, &record.student_number) {
                Resolution::Fresh => match apply::apply_record(store, record) {
                    Ok(()) => builder.success(),
                    Err(reason) => builder.failure(row_index, raw, reason),
                },
                Resolution::Duplicate { reason } => {
                    debug!("row {row_index} duplicate: {reason}");
                    builder.duplicate(row_index, raw, reason);
                }
                Resolution::Failed { reason } => {
                    debug!("row {row_index} failed: {reason}");
                    builder.failure(row_index, raw, reason);
                }
            },
        }
    }

    let report = builder.finish();
    info!("import finished: {}", report.summary());
    report
}

/// Dry-run variant: map, normalize, and validate every row without
/// touching the store.
pub fn validate_only(rows: Vec<RawRow>) -> ValidationOutcome {
    validate_only_as_of(rows, Local::now().date_naive())
}

pub fn validate_only_as_of(rows: Vec<RawRow>, today: NaiveDate) -> ValidationOutcome {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for (offset, raw) in rows.into_iter().enumerate() {
        let row_index = offset + 1;
        let normalized = normalize::normalize_row_as_of(row_index, raw, today);
        let outcome = validate::validate_row(&normalized);
        match outcome {
            Ok(record) => valid.push(record),
            Err(reasons) => invalid.push(InvalidRow {
                row_index,
                raw: normalized.raw,
                reasons,
            }),
        }
    }
    info!(
        "dry run finished: {} valid row(s), {} invalid",
        valid.len(),
        invalid.len()
    );
    ValidationOutcome { valid, invalid }
}

//! Outcome aggregation: the pipeline's single return value.
//!
//! Every submitted row lands in exactly one of three buckets (success,
//! failed, duplicate), so the counters always satisfy
//! `total == success + failed + duplicate`. Failed and duplicate entries
//! keep the original row index and raw input so a caller can point a human
//! back at the offending spreadsheet row.

use serde::Serialize;

use crate::row::RawRow;

/// One failed or duplicate row with enough context to trace it back to the
/// original input.
#[derive(Debug, Clone, Serialize)]
pub struct RowDiagnostic {
    /// 1-based position in the original input ordering.
    pub row_index: usize,
    pub raw: RawRow,
    pub reason: String,
}

/// Immutable once returned; built through [`ReportBuilder`].
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeReport {
    pub success_count: usize,
    pub failed_count: usize,
    pub duplicate_count: usize,
    pub total_count: usize,
    pub failed_items: Vec<RowDiagnostic>,
    pub duplicate_items: Vec<RowDiagnostic>,
}

impl OutcomeReport {
    pub fn summary(&self) -> String {
        format!(
            "{} row(s): {} succeeded, {} failed, {} duplicate",
            self.total_count, self.success_count, self.failed_count, self.duplicate_count
        )
    }

    /// The conservation identity every report upholds.
    pub fn is_consistent(&self) -> bool {
        self.success_count + self.failed_count + self.duplicate_count == self.total_count
            && self.failed_items.len() == self.failed_count
            && self.duplicate_items.len() == self.duplicate_count
    }
}

#[derive(Debug)]
pub struct ReportBuilder {
    total: usize,
    succeeded: usize,
    failed: Vec<RowDiagnostic>,
    duplicates: Vec<RowDiagnostic>,
}

impl ReportBuilder {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    pub fn success(&mut self) {
        self.succeeded += 1;
    }

    pub fn failure(&mut self, row_index: usize, raw: RawRow, reason: String) {
        self.failed.push(RowDiagnostic {
            row_index,
            raw,
            reason,
        });
    }

    pub fn duplicate(&mut self, row_index: usize, raw: RawRow, reason: String) {
        self.duplicates.push(RowDiagnostic {
            row_index,
            raw,
            reason,
        });
    }

    pub fn finish(self) -> OutcomeReport {
        let report = OutcomeReport {
            success_count: self.succeeded,
            failed_count: self.failed.len(),
            duplicate_count: self.duplicates.len(),
            total_count: self.total,
            failed_items: self.failed,
            duplicate_items: self.duplicates,
        };
        debug_assert!(report.is_consistent(), "report buckets must cover every row exactly once");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_buckets() {
        let mut builder = ReportBuilder::new(3);
        builder.success();
        builder.failure(2, RawRow::new(), "bad".to_string());
        builder.duplicate(3, RawRow::new(), "dup".to_string());
        let report = builder.finish();
        assert!(report.is_consistent());
        assert_eq!(report.success_count, 1);
        assert_eq!(report.failed_items[0].row_index, 2);
        assert_eq!(report.duplicate_items[0].reason, "dup");
    }

    #[test]
    fn summary_reads_like_a_sentence() {
        let report = ReportBuilder::new(0).finish();
        assert_eq!(report.summary(), "0 row(s): 0 succeeded, 0 failed, 0 duplicate");
    }

    #[test]
    fn report_serializes_for_transport() {
        let mut builder = ReportBuilder::new(1);
        builder.failure(1, RawRow::from([("学号", "")]), "student_number is required".to_string());
        let json = serde_json::to_value(builder.finish()).expect("serialize report");
        assert_eq!(json["failed_count"], 1);
        assert_eq!(json["failed_items"][0]["row_index"], 1);
    }
}

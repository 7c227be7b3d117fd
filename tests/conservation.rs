//! Property: every submitted row lands in exactly one report bucket.

use proptest::prelude::*;
use roster_import::{
    pipeline::{self, ImportPolicy},
    row::RawRow,
    store::MemoryStore,
};

fn arb_row() -> impl Strategy<Value = RawRow> {
    (
        proptest::option::of(prop_oneof![Just("1"), Just("2"), Just("42"), Just("2024001")]),
        proptest::option::of("[a-z]{1,8}"),
        proptest::option::of(prop_oneof![
            Just("16".to_string()),
            Just("200".to_string()),
            Just("not-a-number".to_string()),
        ]),
    )
        .prop_map(|(number, name, age)| {
            let mut raw = RawRow::new();
            if let Some(number) = number {
                raw.insert("student_number", number);
            }
            if let Some(name) = name {
                raw.insert("full_name", name);
            }
            if let Some(age) = age {
                raw.insert("age", age);
            }
            raw
        })
}

proptest! {
    #[test]
    fn report_buckets_conserve_rows(
        rows in proptest::collection::vec(arb_row(), 0..40),
        skip_duplicates in any::<bool>(),
    ) {
        let total = rows.len();
        let mut store = MemoryStore::new();
        let policy = ImportPolicy { skip_duplicates };
        let report = pipeline::ingest(rows, &policy, &mut store);

        prop_assert!(report.is_consistent());
        prop_assert_eq!(report.total_count, total);
        prop_assert_eq!(
            report.success_count + report.failed_count + report.duplicate_count,
            total
        );
        // Successes are exactly the records the store accepted.
        prop_assert_eq!(report.success_count, store.len());
    }
}

//! Batch application: isolated per-record store inserts.
//!
//! Each insert stands alone: a storage failure for one record becomes that
//! row's failure reason and the batch continues. There is no retry and no
//! whole-batch transaction; partial application is an expected outcome. A
//! `DuplicateKey` raised here rather than at the resolver means a
//! concurrent writer won the race, and it is treated like any other
//! per-row storage failure.

use log::{debug, warn};

use crate::{record::StudentRecord, store::RecordStore};

pub fn apply_record(store: &mut dyn RecordStore, record: StudentRecord) -> Result<(), String> {
    let key = record.student_number.clone();
    match store.insert(record) {
        Ok(()) => {
            debug!("inserted student '{key}'");
            Ok(())
        }
        Err(err) => {
            warn!("insert failed for student '{key}': {err}");
            Err(err.to_string())
        }
    }
}

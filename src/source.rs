//! Raw-row sources: spreadsheet, JSON batch, and CSV readers.
//!
//! Everything here is upstream of the pipeline proper: each reader turns
//! one input document into `Vec<RawRow>` (label -> cell text), discarding
//! blank rows, and enforces the caller-facing batch limits. Failures here
//! are structural — the whole call is rejected and no report is produced.

use std::{fs, path::Path};

use calamine::{open_workbook_auto, Data, Reader};
use log::debug;

use crate::{
    error::{ImportError, ImportResult},
    io_utils,
    row::RawRow,
};

/// Maximum rows accepted per JSON batch call.
pub const JSON_BATCH_LIMIT: usize = 500;
/// Maximum rows accepted by the validation-only dry run.
pub const DRY_RUN_ROW_LIMIT: usize = 1000;
/// Spreadsheet imports are bounded by file size rather than row count.
pub const SPREADSHEET_BYTE_LIMIT: u64 = 10 * 1024 * 1024;

/// Read rows from a file, dispatching on its extension: `.xlsx`/`.xls`/
/// `.ods` via the spreadsheet reader, `.json` as a batch array, anything
/// else as delimited text.
pub fn read_rows(
    path: &Path,
    delimiter: Option<u8>,
    encoding_label: Option<&str>,
) -> ImportResult<Vec<RawRow>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xlsx") | Some("xls") | Some("ods") => read_excel(path),
        Some("json") => {
            let bytes = fs::read(path)?;
            read_json_batch(&bytes)
        }
        _ => read_csv(path, delimiter, encoding_label),
    }
}

/// Read the first sheet of a workbook. The first non-empty row is the
/// label header; later blank rows are discarded before they reach the
/// pipeline.
pub fn read_excel(path: &Path) -> ImportResult<Vec<RawRow>> {
    let size = fs::metadata(path)?.len();
    if size > SPREADSHEET_BYTE_LIMIT {
        return Err(ImportError::FileTooLarge {
            actual: size,
            limit: SPREADSHEET_BYTE_LIMIT,
        });
    }

    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::EmptyDocument("workbook has no sheets".to_string()))?;
    let range = workbook.worksheet_range(&sheet)?;
    let rows = rows_from_cells(range.rows().map(|row| {
        row.iter().map(cell_to_string).collect::<Vec<_>>()
    }))?;
    debug!("read {} row(s) from sheet '{}'", rows.len(), sheet);
    Ok(rows)
}

/// Parse a JSON array of flat objects into raw rows. Scalar values are
/// stringified, nulls are treated as absent, and nested values are a
/// structural failure.
pub fn read_json_batch(bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
    let document: serde_json::Value = serde_json::from_slice(bytes)?;
    let array = document.as_array().ok_or_else(|| {
        ImportError::Malformed("JSON batch must be an array of flat objects".to_string())
    })?;
    if array.is_empty() {
        return Err(ImportError::EmptyDocument(
            "JSON batch contains no rows".to_string(),
        ));
    }
    if array.len() > JSON_BATCH_LIMIT {
        return Err(ImportError::BatchTooLarge {
            actual: array.len(),
            limit: JSON_BATCH_LIMIT,
        });
    }

    let mut rows = Vec::with_capacity(array.len());
    for (idx, element) in array.iter().enumerate() {
        let object = element.as_object().ok_or_else(|| {
            ImportError::Malformed(format!("element {} is not an object", idx + 1))
        })?;
        let mut raw = RawRow::new();
        for (label, value) in object {
            let text = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(ImportError::Malformed(format!(
                        "field '{}' in element {} is not a scalar",
                        label,
                        idx + 1
                    )));
                }
            };
            raw.insert(label.clone(), text);
        }
        if !raw.is_blank() {
            rows.push(raw);
        }
    }
    Ok(rows)
}

/// Read delimited text with the first record as the label header.
pub fn read_csv(
    path: &Path,
    delimiter: Option<u8>,
    encoding_label: Option<&str>,
) -> ImportResult<Vec<RawRow>> {
    let encoding = io_utils::resolve_encoding(encoding_label)?;
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;

    let mut records = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        records.push(io_utils::decode_record(&record, encoding)?);
    }
    rows_from_cells(std::iter::once(headers).chain(records))
}

/// Check the dry-run row ceiling for validation-only calls.
pub fn enforce_dry_run_limit(row_count: usize) -> ImportResult<()> {
    if row_count > DRY_RUN_ROW_LIMIT {
        Err(ImportError::BatchTooLarge {
            actual: row_count,
            limit: DRY_RUN_ROW_LIMIT,
        })
    } else {
        Ok(())
    }
}

/// Shared header/row shaping for tabular sources: the first non-blank row
/// becomes the header, every later row is paired label-to-cell, and rows
/// whose cells are all blank are dropped.
fn rows_from_cells<I>(rows: I) -> ImportResult<Vec<RawRow>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut iter = rows.into_iter();
    let headers = loop {
        match iter.next() {
            Some(cells) if cells.iter().any(|c| !c.trim().is_empty()) => break cells,
            Some(_) => continue,
            None => {
                return Err(ImportError::EmptyDocument(
                    "input has no header row".to_string(),
                ));
            }
        }
    };

    let mut out = Vec::new();
    for cells in iter {
        let mut raw = RawRow::new();
        for (label, cell) in headers.iter().zip(cells.iter()) {
            let label = label.trim();
            let cell = cell.trim();
            if !label.is_empty() && !cell.is_empty() {
                raw.insert(label, cell);
            }
        }
        if !raw.is_empty() {
            out.push(raw);
        }
    }
    if out.is_empty() {
        return Err(ImportError::EmptyDocument(
            "input has a header but no data rows".to_string(),
        ));
    }
    Ok(out)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        // Formula errors carry no usable value; treat the cell as empty.
        Data::Error(_) | Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_batch_stringifies_scalars_and_skips_nulls() {
        let rows = read_json_batch(
            br#"[{"student_number": "2024001", "age": 16, "notes": null}]"#,
        )
        .expect("valid batch");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("student_number"), Some("2024001"));
        assert_eq!(rows[0].get("age"), Some("16"));
        assert_eq!(rows[0].get("notes"), None);
    }

    #[test]
    fn json_batch_rejects_non_array_and_nested_values() {
        assert!(matches!(
            read_json_batch(br#"{"student_number": "1"}"#),
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(
            read_json_batch(br#"[{"scores": [1, 2]}]"#),
            Err(ImportError::Malformed(_))
        ));
    }

    #[test]
    fn json_batch_enforces_the_row_limit() {
        let oversized: Vec<serde_json::Value> = (0..JSON_BATCH_LIMIT + 1)
            .map(|i| serde_json::json!({"student_number": i.to_string()}))
            .collect();
        let bytes = serde_json::to_vec(&oversized).unwrap();
        assert!(matches!(
            read_json_batch(&bytes),
            Err(ImportError::BatchTooLarge { limit: JSON_BATCH_LIMIT, .. })
        ));
    }

    #[test]
    fn empty_json_batch_is_structural() {
        assert!(matches!(
            read_json_batch(b"[]"),
            Err(ImportError::EmptyDocument(_))
        ));
    }

    #[test]
    fn tabular_shaping_skips_leading_blank_and_blank_rows() {
        let rows = rows_from_cells(vec![
            vec!["".to_string(), "".to_string()],
            vec!["学号".to_string(), "姓名".to_string()],
            vec!["2024001".to_string(), "张三".to_string()],
            vec!["  ".to_string(), "".to_string()],
            vec!["2024002".to_string(), "李四".to_string()],
        ])
        .expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("姓名"), Some("李四"));
    }

    #[test]
    fn headerless_input_is_structural() {
        let err = rows_from_cells(Vec::<Vec<String>>::new()).unwrap_err();
        assert!(matches!(err, ImportError::EmptyDocument(_)));
    }
}

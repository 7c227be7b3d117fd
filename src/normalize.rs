//! Per-row normalization: type coercion and national-id derivation.
//!
//! Normalization never rejects a row. Each mapped value is trimmed and
//! coerced to its field's declared kind; a value that cannot be coerced is
//! carried forward as [`FieldValue::Unparseable`] so the validator can name
//! the field in a violation instead of the problem being silently dropped.
//!
//! Derivation runs as an explicit second phase over the coerced fields:
//! when a well-formed national id is present, the computed age always
//! overwrites whatever age was supplied (a stored age goes stale), while
//! the computed gender only fills in an absent gender.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};

use crate::{
    id_card,
    mapping::{self, Field},
    record::Gender,
    row::RawRow,
};

/// A coerced cell value, tagged with the coercion outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Gender(Gender),
    /// The raw text for a numeric field that did not parse. Forwarded to
    /// the validator, which turns it into a violation naming the field.
    Unparseable { raw: String },
}

/// The declared coercion target for each canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Integer,
    Number,
    Gender,
}

impl Field {
    fn kind(&self) -> FieldKind {
        match self {
            Field::Age => FieldKind::Integer,
            Field::Gender => FieldKind::Gender,
            Field::Height
            | Field::ChineseScore
            | Field::MathScore
            | Field::EnglishScore
            | Field::ScienceScore
            | Field::TotalScore => FieldKind::Number,
            _ => FieldKind::Text,
        }
    }
}

/// One input row after mapping and coercion, still carrying the raw input
/// for row-addressable reporting.
#[derive(Debug, Clone)]
pub struct NormalizedRow {
    /// 1-based position of the row in the original input ordering.
    pub index: usize,
    pub raw: RawRow,
    pub fields: BTreeMap<Field, FieldValue>,
}

impl NormalizedRow {
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }
}

/// Normalize one row against today's date.
pub fn normalize_row(index: usize, raw: RawRow) -> NormalizedRow {
    normalize_row_as_of(index, raw, Local::now().date_naive())
}

/// Normalize one row, deriving age as of `today`. Split out so tests can
/// pin the clock.
pub fn normalize_row_as_of(index: usize, raw: RawRow, today: NaiveDate) -> NormalizedRow {
    let mapped = mapping::map_row(&raw);
    let mut fields = BTreeMap::new();
    for (field, value) in mapped {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        fields.insert(field, coerce(field, trimmed));
    }
    apply_id_card_derivation(&mut fields, today);
    NormalizedRow { index, raw, fields }
}

fn coerce(field: Field, raw: &str) -> FieldValue {
    match field.kind() {
        FieldKind::Text => FieldValue::Text(raw.to_string()),
        FieldKind::Integer => match parse_integer(raw) {
            Some(parsed) => FieldValue::Integer(parsed),
            None => FieldValue::Unparseable {
                raw: raw.to_string(),
            },
        },
        FieldKind::Number => match raw.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => FieldValue::Number(parsed),
            _ => FieldValue::Unparseable {
                raw: raw.to_string(),
            },
        },
        FieldKind::Gender => match Gender::from_alias(raw) {
            Some(gender) => FieldValue::Gender(gender),
            // Unrecognized non-empty values pass through unchanged so the
            // validator rejects them explicitly.
            None => FieldValue::Text(raw.to_string()),
        },
    }
}

/// Spreadsheet cells often render integers as "16.0"; accept an integral
/// float for integer fields.
fn parse_integer(raw: &str) -> Option<i64> {
    if let Ok(parsed) = raw.parse::<i64>() {
        return Some(parsed);
    }
    let as_float: f64 = raw.parse().ok()?;
    if as_float.is_finite() && as_float.fract() == 0.0 {
        Some(as_float as i64)
    } else {
        None
    }
}

fn apply_id_card_derivation(fields: &mut BTreeMap<Field, FieldValue>, today: NaiveDate) {
    let info = match fields.get(&Field::NationalId) {
        Some(FieldValue::Text(id)) => id_card::parse_id_card(id),
        _ => None,
    };
    let Some(info) = info else {
        return;
    };
    fields.insert(Field::Age, FieldValue::Integer(info.age_on(today)));
    if !fields.contains_key(&Field::Gender) {
        fields.insert(Field::Gender, FieldValue::Gender(info.gender));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    fn normalize(pairs: &[(&str, &str)]) -> NormalizedRow {
        let raw: RawRow = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        normalize_row_as_of(1, raw, today())
    }

    #[test]
    fn trims_and_drops_empty_cells() {
        let row = normalize(&[("姓名", "  张三  "), ("班级", "   ")]);
        assert_eq!(
            row.get(Field::FullName),
            Some(&FieldValue::Text("张三".to_string()))
        );
        assert_eq!(row.get(Field::ClassLabel), None);
    }

    #[test]
    fn flags_unparseable_numerics_instead_of_dropping_them() {
        let row = normalize(&[("年龄", "abc"), ("数学", "ninety")]);
        assert_eq!(
            row.get(Field::Age),
            Some(&FieldValue::Unparseable {
                raw: "abc".to_string()
            })
        );
        assert!(matches!(
            row.get(Field::MathScore),
            Some(FieldValue::Unparseable { .. })
        ));
    }

    #[test]
    fn accepts_integral_float_for_age() {
        let row = normalize(&[("年龄", "16.0")]);
        assert_eq!(row.get(Field::Age), Some(&FieldValue::Integer(16)));
    }

    #[test]
    fn canonicalizes_gender_aliases_and_passes_junk_through() {
        let row = normalize(&[("性别", "男")]);
        assert_eq!(row.get(Field::Gender), Some(&FieldValue::Gender(Gender::Male)));

        let row = normalize(&[("性别", "yes")]);
        assert_eq!(
            row.get(Field::Gender),
            Some(&FieldValue::Text("yes".to_string()))
        );
    }

    #[test]
    fn derived_age_overwrites_explicit_age() {
        let row = normalize(&[("身份证号", "110101200001011237"), ("年龄", "99")]);
        assert_eq!(row.get(Field::Age), Some(&FieldValue::Integer(26)));
    }

    #[test]
    fn derived_gender_only_fills_absent_gender() {
        let row = normalize(&[("身份证号", "110101200001011237")]);
        assert_eq!(row.get(Field::Gender), Some(&FieldValue::Gender(Gender::Male)));

        let row = normalize(&[("身份证号", "110101200001011237"), ("性别", "女")]);
        assert_eq!(
            row.get(Field::Gender),
            Some(&FieldValue::Gender(Gender::Female))
        );
    }

    #[test]
    fn malformed_id_derives_nothing() {
        let row = normalize(&[("身份证号", "110101200013011234"), ("年龄", "17")]);
        assert_eq!(row.get(Field::Age), Some(&FieldValue::Integer(17)));
        assert_eq!(row.get(Field::Gender), None);
    }
}

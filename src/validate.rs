//! Per-row schema validation.
//!
//! Given one normalized row, produce either a canonical [`StudentRecord`]
//! or the complete list of field-level violations. Validation is total and
//! independent per row: every rule runs, a row with N problems reports all
//! N, and no row's outcome ever affects another's. Absence of an optional
//! field is never a violation; presence with a bad value or format is.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    mapping::Field,
    normalize::{FieldValue, NormalizedRow},
    record::{Gender, StudentRecord},
};

pub const AGE_MIN: i64 = 10;
pub const AGE_MAX: i64 = 100;
pub const SUBJECT_SCORE_MAX: f64 = 150.0;
pub const TOTAL_SCORE_MAX: f64 = 600.0;
pub const HEIGHT_MIN_CM: f64 = 50.0;
pub const HEIGHT_MAX_CM: f64 = 250.0;

const STUDENT_NUMBER_MAX_LEN: usize = 50;
const FULL_NAME_MAX_LEN: usize = 100;
const CLASS_LABEL_MAX_LEN: usize = 100;
const CONTACT_INFO_MAX_LEN: usize = 200;
const ADDRESS_MAX_LEN: usize = 200;
const NOTES_MAX_LEN: usize = 500;
const SHORT_TEXT_MAX_LEN: usize = 100;

static PHONE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{11}$").expect("phone pattern"));
static QQ_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5,}$").expect("qq pattern"));

/// Validate one normalized row against the canonical schema.
///
/// Returns the record only when no rule was violated; otherwise the full
/// violation list, each entry naming the offending field.
pub fn validate_row(row: &NormalizedRow) -> Result<StudentRecord, Vec<String>> {
    let mut violations = Vec::new();

    let student_number =
        required_text(row, Field::StudentNumber, STUDENT_NUMBER_MAX_LEN, &mut violations);
    let full_name = required_text(row, Field::FullName, FULL_NAME_MAX_LEN, &mut violations);
    let gender = gender_value(row, &mut violations);
    let age = integer_in_range(row, Field::Age, AGE_MIN, AGE_MAX, &mut violations);
    let class_label = optional_text(row, Field::ClassLabel, CLASS_LABEL_MAX_LEN, &mut violations);
    let phone = format_text(
        row,
        Field::Phone,
        &PHONE_FORMAT,
        "must be exactly 11 digits",
        &mut violations,
    );
    let email = email_value(row, &mut violations);
    let qq_id = format_text(
        row,
        Field::QqId,
        &QQ_FORMAT,
        "must be all digits and at least 5 long",
        &mut violations,
    );
    let wechat_id = optional_text(row, Field::WechatId, SHORT_TEXT_MAX_LEN, &mut violations);
    let national_id = national_id_value(row, &mut violations);
    let address = optional_text(row, Field::Address, ADDRESS_MAX_LEN, &mut violations);
    let father_occupation =
        optional_text(row, Field::FatherOccupation, SHORT_TEXT_MAX_LEN, &mut violations);
    let mother_occupation =
        optional_text(row, Field::MotherOccupation, SHORT_TEXT_MAX_LEN, &mut violations);
    let contact_info = optional_text(row, Field::ContactInfo, CONTACT_INFO_MAX_LEN, &mut violations);
    let notes = optional_text(row, Field::Notes, NOTES_MAX_LEN, &mut violations);
    let primary_school =
        optional_text(row, Field::PrimarySchool, SHORT_TEXT_MAX_LEN, &mut violations);
    let height =
        number_in_range(row, Field::Height, HEIGHT_MIN_CM, HEIGHT_MAX_CM, &mut violations);
    let vision = optional_text(row, Field::Vision, SHORT_TEXT_MAX_LEN, &mut violations);
    let class_position_intention =
        optional_text(row, Field::ClassPositionIntention, SHORT_TEXT_MAX_LEN, &mut violations);
    let visit_time = optional_text(row, Field::VisitTime, SHORT_TEXT_MAX_LEN, &mut violations);
    let good_subjects = optional_text(row, Field::GoodSubjects, SHORT_TEXT_MAX_LEN, &mut violations);
    let chinese_score =
        number_in_range(row, Field::ChineseScore, 0.0, SUBJECT_SCORE_MAX, &mut violations);
    let math_score =
        number_in_range(row, Field::MathScore, 0.0, SUBJECT_SCORE_MAX, &mut violations);
    let english_score =
        number_in_range(row, Field::EnglishScore, 0.0, SUBJECT_SCORE_MAX, &mut violations);
    let science_score =
        number_in_range(row, Field::ScienceScore, 0.0, SUBJECT_SCORE_MAX, &mut violations);
    let total_score =
        number_in_range(row, Field::TotalScore, 0.0, TOTAL_SCORE_MAX, &mut violations);

    match (student_number, full_name) {
        (Some(student_number), Some(full_name)) if violations.is_empty() => Ok(StudentRecord {
            student_number,
            full_name,
            gender,
            age,
            class_label,
            phone,
            email,
            qq_id,
            wechat_id,
            national_id,
            address,
            father_occupation,
            mother_occupation,
            contact_info,
            notes,
            primary_school,
            height,
            vision,
            class_position_intention,
            visit_time,
            good_subjects,
            chinese_score,
            math_score,
            english_score,
            science_score,
            total_score,
        }),
        _ => Err(violations),
    }
}

fn text_value<'a>(
    row: &'a NormalizedRow,
    field: Field,
    violations: &mut Vec<String>,
) -> Option<&'a str> {
    match row.get(field) {
        Some(FieldValue::Text(value)) => Some(value),
        Some(other) => {
            violations.push(format!("{field} has an unexpected value ({other:?})"));
            None
        }
        None => None,
    }
}

fn required_text(
    row: &NormalizedRow,
    field: Field,
    max_len: usize,
    violations: &mut Vec<String>,
) -> Option<String> {
    if row.get(field).is_none() {
        violations.push(format!("{field} is required"));
        return None;
    }
    let value = text_value(row, field, violations)?;
    bounded(field, value, max_len, violations)
}

fn optional_text(
    row: &NormalizedRow,
    field: Field,
    max_len: usize,
    violations: &mut Vec<String>,
) -> Option<String> {
    let value = text_value(row, field, violations)?;
    bounded(field, value, max_len, violations)
}

fn bounded(
    field: Field,
    value: &str,
    max_len: usize,
    violations: &mut Vec<String>,
) -> Option<String> {
    if value.chars().count() > max_len {
        violations.push(format!("{field} exceeds {max_len} characters"));
        None
    } else {
        Some(value.to_string())
    }
}

fn format_text(
    row: &NormalizedRow,
    field: Field,
    pattern: &Regex,
    requirement: &str,
    violations: &mut Vec<String>,
) -> Option<String> {
    let value = text_value(row, field, violations)?;
    if pattern.is_match(value) {
        Some(value.to_string())
    } else {
        violations.push(format!("{field} {requirement} (got '{value}')"));
        None
    }
}

fn email_value(row: &NormalizedRow, violations: &mut Vec<String>) -> Option<String> {
    let value = text_value(row, Field::Email, violations)?;
    if value.contains('@') {
        Some(value.to_string())
    } else {
        violations.push(format!("email must contain '@' (got '{value}')"));
        None
    }
}

fn national_id_value(row: &NormalizedRow, violations: &mut Vec<String>) -> Option<String> {
    let value = text_value(row, Field::NationalId, violations)?;
    if matches!(value.chars().count(), 15 | 18) {
        Some(value.to_string())
    } else {
        violations.push(format!(
            "national_id must be 15 or 18 characters long (got {})",
            value.chars().count()
        ));
        None
    }
}

fn gender_value(row: &NormalizedRow, violations: &mut Vec<String>) -> Option<Gender> {
    match row.get(Field::Gender) {
        None => None,
        Some(FieldValue::Gender(gender)) => Some(*gender),
        Some(FieldValue::Text(raw)) => {
            violations.push(format!(
                "gender must be one of male, female, or other (got '{raw}')"
            ));
            None
        }
        Some(other) => {
            violations.push(format!("gender has an unexpected value ({other:?})"));
            None
        }
    }
}

fn integer_in_range(
    row: &NormalizedRow,
    field: Field,
    min: i64,
    max: i64,
    violations: &mut Vec<String>,
) -> Option<i64> {
    match row.get(field) {
        None => None,
        Some(FieldValue::Integer(value)) => {
            if (min..=max).contains(value) {
                Some(*value)
            } else {
                violations.push(format!("{field} must be between {min} and {max} (got {value})"));
                None
            }
        }
        Some(FieldValue::Unparseable { raw }) => {
            violations.push(format!("{field} is not a number (got '{raw}')"));
            None
        }
        Some(other) => {
            violations.push(format!("{field} has an unexpected value ({other:?})"));
            None
        }
    }
}

fn number_in_range(
    row: &NormalizedRow,
    field: Field,
    min: f64,
    max: f64,
    violations: &mut Vec<String>,
) -> Option<f64> {
    match row.get(field) {
        None => None,
        Some(FieldValue::Number(value)) => {
            if (min..=max).contains(value) {
                Some(*value)
            } else {
                violations.push(format!("{field} must be between {min} and {max} (got {value})"));
                None
            }
        }
        Some(FieldValue::Unparseable { raw }) => {
            violations.push(format!("{field} is not a number (got '{raw}')"));
            None
        }
        Some(other) => {
            violations.push(format!("{field} has an unexpected value ({other:?})"));
            None
        }
    }
}

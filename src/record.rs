//! Canonical student record and the gender enumeration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Resolve a localized or abbreviated gender word to its canonical value.
    ///
    /// Returns `None` for unrecognized input so callers can surface the raw
    /// value in a violation message instead of discarding it.
    pub fn from_alias(value: &str) -> Option<Gender> {
        match value.trim().to_lowercase().as_str() {
            "男" | "male" | "m" => Some(Gender::Male),
            "女" | "female" | "f" => Some(Gender::Female),
            "其他" | "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The normalized, validated representation of one student.
///
/// `student_number` is the natural key: immutable once the record exists and
/// the only attribute used for identity and duplicate detection. Every other
/// field is optional; a field that survived normalization but failed
/// validation never reaches this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_number: String,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub age: Option<i64>,
    pub class_label: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub qq_id: Option<String>,
    pub wechat_id: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub father_occupation: Option<String>,
    pub mother_occupation: Option<String>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
    pub primary_school: Option<String>,
    pub height: Option<f64>,
    pub vision: Option<String>,
    pub class_position_intention: Option<String>,
    pub visit_time: Option<String>,
    pub good_subjects: Option<String>,
    pub chinese_score: Option<f64>,
    pub math_score: Option<f64>,
    pub english_score: Option<f64>,
    pub science_score: Option<f64>,
    pub total_score: Option<f64>,
}

impl StudentRecord {
    /// Minimal record carrying only the required fields; test and caller
    /// convenience.
    pub fn new(student_number: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            student_number: student_number.into(),
            full_name: full_name.into(),
            gender: None,
            age: None,
            class_label: None,
            phone: None,
            email: None,
            qq_id: None,
            wechat_id: None,
            national_id: None,
            address: None,
            father_occupation: None,
            mother_occupation: None,
            contact_info: None,
            notes: None,
            primary_school: None,
            height: None,
            vision: None,
            class_position_intention: None,
            visit_time: None,
            good_subjects: None,
            chinese_score: None,
            math_score: None,
            english_score: None,
            science_score: None,
            total_score: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_aliases_resolve_across_languages_and_case() {
        assert_eq!(Gender::from_alias("男"), Some(Gender::Male));
        assert_eq!(Gender::from_alias("FEMALE"), Some(Gender::Female));
        assert_eq!(Gender::from_alias(" f "), Some(Gender::Female));
        assert_eq!(Gender::from_alias("其他"), Some(Gender::Other));
        assert_eq!(Gender::from_alias("unknown"), None);
    }

    #[test]
    fn gender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"male\"");
    }
}

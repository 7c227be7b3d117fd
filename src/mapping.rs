//! Field mapping: arbitrary input column labels to canonical fields.
//!
//! This is the single place where untyped external labels are translated
//! into the closed, statically known field set of [`Field`]. Each canonical
//! field accepts its upstream spreadsheet label (Chinese), one or more
//! English aliases, and its own snake_case name (the form JSON batches
//! use). Unrecognized labels are dropped silently; a missing required field
//! is caught later by the validator, never here.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::row::RawRow;

/// Canonical record fields, one variant per attribute of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    StudentNumber,
    FullName,
    Gender,
    Age,
    ClassLabel,
    Phone,
    Email,
    QqId,
    WechatId,
    NationalId,
    Address,
    FatherOccupation,
    MotherOccupation,
    ContactInfo,
    Notes,
    PrimarySchool,
    Height,
    Vision,
    ClassPositionIntention,
    VisitTime,
    GoodSubjects,
    ChineseScore,
    MathScore,
    EnglishScore,
    ScienceScore,
    TotalScore,
}

/// A raw row after label translation: canonical field name to raw value.
pub type MappedRow = BTreeMap<Field, String>;

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::StudentNumber,
        Field::FullName,
        Field::Gender,
        Field::Age,
        Field::ClassLabel,
        Field::Phone,
        Field::Email,
        Field::QqId,
        Field::WechatId,
        Field::NationalId,
        Field::Address,
        Field::FatherOccupation,
        Field::MotherOccupation,
        Field::ContactInfo,
        Field::Notes,
        Field::PrimarySchool,
        Field::Height,
        Field::Vision,
        Field::ClassPositionIntention,
        Field::VisitTime,
        Field::GoodSubjects,
        Field::ChineseScore,
        Field::MathScore,
        Field::EnglishScore,
        Field::ScienceScore,
        Field::TotalScore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::StudentNumber => "student_number",
            Field::FullName => "full_name",
            Field::Gender => "gender",
            Field::Age => "age",
            Field::ClassLabel => "class_label",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::QqId => "qq_id",
            Field::WechatId => "wechat_id",
            Field::NationalId => "national_id",
            Field::Address => "address",
            Field::FatherOccupation => "father_occupation",
            Field::MotherOccupation => "mother_occupation",
            Field::ContactInfo => "contact_info",
            Field::Notes => "notes",
            Field::PrimarySchool => "primary_school",
            Field::Height => "height",
            Field::Vision => "vision",
            Field::ClassPositionIntention => "class_position_intention",
            Field::VisitTime => "visit_time",
            Field::GoodSubjects => "good_subjects",
            Field::ChineseScore => "chinese_score",
            Field::MathScore => "math_score",
            Field::EnglishScore => "english_score",
            Field::ScienceScore => "science_score",
            Field::TotalScore => "total_score",
        }
    }

    /// Input labels accepted for this field, in addition to [`Field::as_str`].
    pub fn accepted_labels(&self) -> &'static [&'static str] {
        match self {
            Field::StudentNumber => &["学号", "student id", "student no"],
            Field::FullName => &["姓名", "name"],
            Field::Gender => &["性别", "sex"],
            Field::Age => &["年龄"],
            Field::ClassLabel => &["班级", "class", "class name"],
            Field::Phone => &["电话", "联系方式", "phone number", "mobile"],
            Field::Email => &["邮箱", "e-mail", "mail"],
            Field::QqId => &["QQ", "qq"],
            Field::WechatId => &["微信", "wechat"],
            Field::NationalId => &["身份证号", "id card", "national id"],
            Field::Address => &["地址", "家庭住址", "home address"],
            Field::FatherOccupation => &["父亲职业", "father job"],
            Field::MotherOccupation => &["母亲职业", "mother job"],
            Field::ContactInfo => &["联系信息", "contact"],
            Field::Notes => &["备注", "remarks"],
            Field::PrimarySchool => &["小学", "毕业小学"],
            Field::Height => &["身高", "身高(cm)", "height (cm)"],
            Field::Vision => &["视力", "eyesight"],
            Field::ClassPositionIntention => &["班级职位意向", "position intention"],
            Field::VisitTime => &["家访时间", "家访可行时间", "home visit time"],
            Field::GoodSubjects => &["擅长科目", "strong subjects"],
            Field::ChineseScore => &["语文", "语文成绩", "chinese"],
            Field::MathScore => &["数学", "数学成绩", "math"],
            Field::EnglishScore => &["外语", "英语成绩", "english"],
            Field::ScienceScore => &["自然", "科学成绩", "science"],
            Field::TotalScore => &["总分", "total"],
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolve an input label to its canonical field, if any.
///
/// Matching trims surrounding whitespace and is case-insensitive for ASCII
/// labels; the upstream Chinese labels are matched exactly.
pub fn canonical_field(label: &str) -> Option<Field> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    Field::ALL.iter().copied().find(|field| {
        field.as_str() == lowered
            || field
                .accepted_labels()
                .iter()
                .any(|accepted| *accepted == trimmed || accepted.to_lowercase() == lowered)
    })
}

/// Translate one raw row into canonical keys.
///
/// Pure per-row function: unmapped labels are dropped, no canonical key is
/// invented for a label that was absent, and no errors are raised. When two
/// input labels collide on the same canonical field, the first one in the
/// row's label order wins.
pub fn map_row(raw: &RawRow) -> MappedRow {
    let mut mapped = MappedRow::new();
    for (label, value) in raw.iter() {
        if let Some(field) = canonical_field(label) {
            mapped.entry(field).or_insert_with(|| value.to_string());
        }
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_chinese_and_english_labels_to_the_same_field() {
        assert_eq!(canonical_field("学号"), Some(Field::StudentNumber));
        assert_eq!(canonical_field("Student ID"), Some(Field::StudentNumber));
        assert_eq!(canonical_field("student_number"), Some(Field::StudentNumber));
        assert_eq!(canonical_field(" 姓名 "), Some(Field::FullName));
    }

    #[test]
    fn maps_the_wellbeing_and_preference_columns() {
        assert_eq!(canonical_field("视力"), Some(Field::Vision));
        assert_eq!(
            canonical_field("班级职位意向"),
            Some(Field::ClassPositionIntention)
        );
        assert_eq!(canonical_field("家访时间"), Some(Field::VisitTime));
        assert_eq!(canonical_field("家访可行时间"), Some(Field::VisitTime));
        assert_eq!(canonical_field("擅长科目"), Some(Field::GoodSubjects));
    }

    #[test]
    fn unknown_labels_resolve_to_none() {
        assert_eq!(canonical_field("favourite colour"), None);
        assert_eq!(canonical_field(""), None);
    }

    #[test]
    fn map_row_drops_unrecognized_labels() {
        let raw = RawRow::from([("学号", "2024001"), ("血型", "O"), ("name", "张三")]);
        let mapped = map_row(&raw);
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped.get(&Field::StudentNumber).map(String::as_str), Some("2024001"));
        assert_eq!(mapped.get(&Field::FullName).map(String::as_str), Some("张三"));
    }

    #[test]
    fn map_row_never_invents_keys() {
        let raw = RawRow::from([("姓名", "李四")]);
        let mapped = map_row(&raw);
        assert!(!mapped.contains_key(&Field::StudentNumber));
    }
}

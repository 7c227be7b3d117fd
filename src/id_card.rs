//! National-ID parsing: birth date, gender, and completed-years age.
//!
//! Two numbering schemes are accepted. The 18-character scheme carries the
//! birth date at 1-indexed positions 7-14 and encodes gender in the parity
//! of the 17th character (odd = male, even = female). The legacy
//! 15-character scheme uses the same layout with an implicit "19" century
//! prefix and takes gender from the 15th character. Anything failing the
//! length, character-class, or calendar checks derives nothing.
//!
//! Age is always computed from the birth date at call time; it is never
//! stored, since a stored age goes stale with every birthday.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

use crate::record::Gender;

static ID_18: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{17}[\dXx]$").expect("18-digit id pattern")
});
static ID_15: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{15}$").expect("15-digit id pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdCardInfo {
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

impl IdCardInfo {
    /// Completed years lived as of `today`: the raw year difference,
    /// decremented by one when the birthday has not yet occurred this year.
    pub fn age_on(&self, today: NaiveDate) -> i64 {
        let mut age = i64::from(today.year() - self.birth_date.year());
        if (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age
    }
}

/// Parse a 15- or 18-character national id into birth date and gender.
///
/// Returns `None` for malformed input rather than an error: the caller
/// decides whether a bad id is a violation (validator) or simply yields no
/// derived fields (normalizer).
pub fn parse_id_card(raw: &str) -> Option<IdCardInfo> {
    let id = raw.trim();
    let (year, month, day, parity_digit) = if ID_18.is_match(id) {
        (
            digits(&id[6..10])?,
            digits(&id[10..12])?,
            digits(&id[12..14])?,
            id.as_bytes()[16] - b'0',
        )
    } else if ID_15.is_match(id) {
        (
            1900 + digits(&id[6..8])?,
            digits(&id[8..10])?,
            digits(&id[10..12])?,
            id.as_bytes()[14] - b'0',
        )
    } else {
        return None;
    };

    let birth_date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    let gender = if parity_digit % 2 == 1 {
        Gender::Male
    } else {
        Gender::Female
    };
    Some(IdCardInfo { birth_date, gender })
}

/// Current age derived from a national id, evaluated against today's date.
pub fn age_from_id_card(raw: &str) -> Option<i64> {
    parse_id_card(raw).map(|info| info.age_on(Local::now().date_naive()))
}

fn digits(slice: &str) -> Option<u32> {
    slice.parse().ok()
}

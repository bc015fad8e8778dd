use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Written in place of a date the applicant typed but that does not parse.
pub const INVALID_DATE_PLACEHOLDER: &str = "NaNNaNNaN";

const INVALID_SLASHED_DATE_PLACEHOLDER: &str = "NaN/NaN/NaN";

pub fn upper_name(value: &str) -> String {
    value.to_uppercase()
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Strips punctuation and prefixes bare ten digit US numbers with the `1` country code.
pub fn normalize_phone(value: &str) -> String {
    let digits = digits_only(value);
    if digits.len() == 10 {
        format!("1{digits}")
    } else {
        digits
    }
}

pub fn normalize_ssn(value: &str) -> String {
    digits_only(value)
}

pub fn parse_form_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }

    None
}

pub fn mmddyyyy(date: NaiveDate) -> String {
    date.format("%m%d%Y").to_string()
}

/// Lenient `MMDDYYYY` rendering: unparseable input degrades to a placeholder instead of failing.
pub fn format_mmddyyyy(raw: &str) -> String {
    match parse_form_date(raw) {
        Some(date) => mmddyyyy(date),
        None => INVALID_DATE_PLACEHOLDER.to_string(),
    }
}

pub fn format_slashed(raw: &str) -> String {
    match parse_form_date(raw) {
        Some(date) => date.format("%m/%d/%Y").to_string(),
        None => INVALID_SLASHED_DATE_PLACEHOLDER.to_string(),
    }
}

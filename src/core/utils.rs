use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Trim and lowercase, the canonical form for case-insensitive comparison.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Sort key for names: lowercase, NFKC, then decompose and drop combining
/// marks, so "Émile" files next to "emile".
pub fn collation_key(value: &str) -> String {
    let lower = value.to_lowercase();
    let nfkc: String = lower.nfkc().collect();
    nfkc.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Parse the leading integer of a string, ignoring anything after the digits.
/// "12", " 12 ", "12.7" and "12abc" all give 12; "", "abc" give None.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut result: i64 = 0;
    let mut seen = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        result = result.saturating_mul(10).saturating_add((b - b'0') as i64);
        seen += 1;
    }

    if seen == 0 {
        return None;
    }
    Some(if negative { -result } else { result })
}

/// Lenient float parse: "" and garbage give None.
pub fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date or date-time. Values without an offset are read as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

use chrono::{DateTime, NaiveDate};

/// Checkoff dates arrive as RFC 3339 timestamps or bare `YYYY-MM-DD`.
/// Unparseable values are shown as-is.
#[must_use]
pub fn format_checkoff_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return at.format("%b %-d, %Y").to_string();
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.format("%b %-d, %Y").to_string();
    }
    raw.to_owned()
}

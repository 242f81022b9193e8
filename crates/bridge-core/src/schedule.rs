use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::OnceLock;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

fn compact_offset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([+-]\d{2})(\d{2})$").expect("static pattern"))
}

/// Insert the colon separator into a trailing compact timezone offset, so
/// `2024-01-01T10:00-0500` becomes `2024-01-01T10:00-05:00`. Inputs without a
/// compact offset pass through unchanged.
pub fn insert_offset_colon(raw: &str) -> String {
    compact_offset().replace(raw, "$1:$2").into_owned()
}

/// Normalize a scheduled-time string into an RFC 3339 UTC instant suitable
/// for the change-execution API's `earliestAllowedTime`.
///
/// Returns `None` when the input does not parse as a date; the workflow then
/// proceeds without a schedule instead of failing.
pub fn normalize_scheduled_time(raw: &str) -> Option<String> {
    let normalized = insert_offset_colon(raw.trim());
    if normalized.is_empty() {
        return None;
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&normalized, format) {
            return Some(render(parsed.with_timezone(&Utc)));
        }
    }

    // No offset on the wire: treat as UTC.
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(render(parsed.and_utc()));
        }
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Some(render(parsed.and_hms_opt(0, 0, 0)?.and_utc()));
    }

    None
}

fn render(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_offset_gains_a_colon() {
        assert_eq!(
            insert_offset_colon("2024-01-01T10:00-0500"),
            "2024-01-01T10:00-05:00"
        );
        assert_eq!(
            insert_offset_colon("2024-01-01T10:00+0130"),
            "2024-01-01T10:00+01:30"
        );
    }

    #[test]
    fn already_separated_offset_is_untouched() {
        assert_eq!(
            insert_offset_colon("2024-01-01T10:00-05:00"),
            "2024-01-01T10:00-05:00"
        );
    }

    #[test]
    fn compact_offset_parses_to_utc_instant() {
        assert_eq!(
            normalize_scheduled_time("2024-01-01T10:00-0500").as_deref(),
            Some("2024-01-01T15:00:00.000Z")
        );
    }

    #[test]
    fn full_rfc3339_input_parses() {
        assert_eq!(
            normalize_scheduled_time("2024-06-15T08:30:00+02:00").as_deref(),
            Some("2024-06-15T06:30:00.000Z")
        );
    }

    #[test]
    fn naive_input_is_treated_as_utc() {
        assert_eq!(
            normalize_scheduled_time("2024-01-01T10:00").as_deref(),
            Some("2024-01-01T10:00:00.000Z")
        );
        assert_eq!(
            normalize_scheduled_time("2024-01-01").as_deref(),
            Some("2024-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn garbage_yields_none_not_an_error() {
        assert_eq!(normalize_scheduled_time("not-a-date"), None);
        assert_eq!(normalize_scheduled_time(""), None);
    }
}

use std::fmt::Display;

use chrono::{TimeZone, Utc};

use crate::models::MISSING;

/// Format an epoch-milliseconds timestamp the way an en-US locale prints a
/// date and time: `11/14/2023, 10:13:20 PM`.
/// Returns None if the timestamp is out of range.
pub fn format_locale_time<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: Display,
{
    let utc = Utc.timestamp_millis_opt(millis).single()?;
    Some(
        utc.with_timezone(tz)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
    )
}

/// Format a magnitude for display.
/// Whole numbers print without a trailing `.0`, matching how the feed writes them.
pub fn format_magnitude(mag: Option<f64>) -> String {
    match mag {
        Some(m) => m.to_string(),
        None => MISSING.to_string(),
    }
}

/// Wrap a URL in a markdown link labelled `Link`
pub fn markdown_link(url: &str) -> String {
    format!("[Link]({})", url)
}

/// Escape text for placement inside HTML element content or attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_format_locale_time() {
        assert_eq!(
            format_locale_time(1_700_000_000_000, &Utc).as_deref(),
            Some("11/14/2023, 10:13:20 PM")
        );
        assert_eq!(
            format_locale_time(0, &Utc).as_deref(),
            Some("1/1/1970, 12:00:00 AM")
        );
    }

    #[test]
    fn test_format_locale_time_respects_zone() {
        let pacific = FixedOffset::west_opt(8 * 3600).expect("valid offset");
        assert_eq!(
            format_locale_time(1_700_000_000_000, &pacific).as_deref(),
            Some("11/14/2023, 2:13:20 PM")
        );
    }

    #[test]
    fn test_format_locale_time_out_of_range() {
        assert_eq!(format_locale_time(i64::MAX, &Utc), None);
    }

    #[test]
    fn test_format_magnitude() {
        assert_eq!(format_magnitude(Some(2.0)), "2");
        assert_eq!(format_magnitude(Some(1.53)), "1.53");
        assert_eq!(format_magnitude(Some(-0.4)), "-0.4");
        assert_eq!(format_magnitude(None), "-");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("M 1.2 - 5 km <N> of \"A&B\""), "M 1.2 - 5 km &lt;N&gt; of &quot;A&amp;B&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }
}

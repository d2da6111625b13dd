//! Display metadata for transactions: status classes, durations and
//! capture timestamps.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

/// Visual class of a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClass {
    /// 2xx
    Info,
    /// 3xx
    Neutral,
    /// 4xx
    Warning,
    /// 5xx
    Error,
}

impl StatusClass {
    /// Classifies a status line by its first character.
    ///
    /// # Examples
    ///
    /// ```
    /// use txn_inspector::formatter::metadata::StatusClass;
    ///
    /// assert_eq!(StatusClass::for_status("404 Not Found"), Some(StatusClass::Warning));
    /// assert_eq!(StatusClass::for_status("101 Switching Protocols"), None);
    /// assert_eq!(StatusClass::for_status(""), None);
    /// ```
    pub fn for_status(status: &str) -> Option<Self> {
        match status.chars().next()? {
            '2' => Some(StatusClass::Info),
            '3' => Some(StatusClass::Neutral),
            '4' => Some(StatusClass::Warning),
            '5' => Some(StatusClass::Error),
            _ => None,
        }
    }

    /// Returns the CSS class the presentation layer styles the status with.
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusClass::Info => "text-info",
            StatusClass::Neutral => "muted",
            StatusClass::Warning => "text-warning",
            StatusClass::Error => "text-error",
        }
    }
}

const NANOS_PER_MS: i64 = 1_000_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Renders `nanos` in units of `unit` nanoseconds with two decimals,
/// rounding half away from zero.
fn fixed2(nanos: i64, unit: i64) -> String {
    let step = unit / 100;
    let hundredths = (nanos.unsigned_abs() + (step / 2) as u64) / step as u64;
    let sign = if nanos < 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, hundredths / 100, hundredths % 100)
}

/// Formats a nanosecond duration for display.
///
/// Durations above one second are shown in seconds, everything else in
/// milliseconds, always with two decimals.
///
/// # Arguments
///
/// * `nanos` - Elapsed time in nanoseconds
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::metadata::format_duration;
///
/// assert_eq!(format_duration(1_500_000), "1.50ms");
/// assert_eq!(format_duration(2_345_678_901), "2.35s");
/// ```
pub fn format_duration(nanos: i64) -> String {
    if nanos > NANOS_PER_SEC {
        format!("{}s", fixed2(nanos, NANOS_PER_SEC))
    } else {
        format!("{}ms", fixed2(nanos, NANOS_PER_MS))
    }
}

fn start_time(start: i64) -> Option<DateTime<Utc>> {
    if start <= 0 {
        return None;
    }
    Utc.timestamp_opt(start, 0).single()
}

/// Formats a capture time (unix seconds) as ISO-8601 with milliseconds.
///
/// Returns `None` for an unknown (zero or negative) start time.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::metadata::format_timestamp;
///
/// assert_eq!(format_timestamp(1_704_164_645).as_deref(), Some("2024-01-02T03:04:05.000Z"));
/// assert_eq!(format_timestamp(0), None);
/// ```
pub fn format_timestamp(start: i64) -> Option<String> {
    start_time(start).map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Describes a capture time relative to `now` ("5 minutes ago").
///
/// Returns `None` for an unknown start time. Times in the future read as
/// "just now".
pub fn format_relative_time(start: i64, now: DateTime<Utc>) -> Option<String> {
    let elapsed = now.signed_duration_since(start_time(start)?);
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    let text = if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        let minutes = elapsed.num_minutes();
        format!("{} minute{} ago", minutes, plural(minutes))
    } else if elapsed.num_hours() < 24 {
        let hours = elapsed.num_hours();
        format!("{} hour{} ago", hours, plural(hours))
    } else if elapsed.num_days() == 1 {
        "yesterday".to_string()
    } else if elapsed.num_days() < 7 {
        format!("{} days ago", elapsed.num_days())
    } else if elapsed.num_weeks() < 4 {
        let weeks = elapsed.num_weeks();
        format!("{} week{} ago", weeks, plural(weeks))
    } else if elapsed.num_days() < 365 {
        let months = (elapsed.num_days() / 30).max(1);
        format!("{} month{} ago", months, plural(months))
    } else {
        let years = elapsed.num_days() / 365;
        format!("{} year{} ago", years, plural(years))
    };
    Some(text)
}

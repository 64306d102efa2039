//! Relative time phrases for upload timestamps

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Describe how long ago `then` was, relative to `now`
///
/// Timestamps in the future (clock skew between CI and viewer) read as
/// "less than a minute ago".
#[must_use]
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);

    if secs < 45 {
        return "less than a minute ago".to_string();
    }
    if secs < 45 * MINUTE {
        return plural(rounded(secs, MINUTE).max(1), "minute", "");
    }
    if secs < DAY {
        return plural(rounded(secs, HOUR).max(1), "hour", "about ");
    }
    if secs < MONTH {
        return plural(rounded(secs, DAY).max(1), "day", "");
    }
    if secs < YEAR {
        return plural(rounded(secs, MONTH).max(1), "month", "");
    }
    plural(secs / YEAR, "year", "over ")
}

fn rounded(secs: i64, unit: i64) -> i64 {
    (secs + unit / 2) / unit
}

fn plural(n: i64, unit: &str, prefix: &str) -> String {
    if n == 1 {
        format!("{prefix}1 {unit} ago")
    } else {
        format!("{prefix}{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn seconds() {
        assert_eq!(time_ago(now() - Duration::seconds(10), now()), "less than a minute ago");
    }

    #[test]
    fn future_is_clamped() {
        assert_eq!(time_ago(now() + Duration::hours(2), now()), "less than a minute ago");
    }

    #[test]
    fn minutes() {
        assert_eq!(time_ago(now() - Duration::minutes(1), now()), "1 minute ago");
        assert_eq!(time_ago(now() - Duration::minutes(12), now()), "12 minutes ago");
    }

    #[test]
    fn hours() {
        assert_eq!(time_ago(now() - Duration::hours(3), now()), "about 3 hours ago");
        assert_eq!(time_ago(now() - Duration::minutes(50), now()), "about 1 hour ago");
    }

    #[test]
    fn days_months_years() {
        assert_eq!(time_ago(now() - Duration::days(4), now()), "4 days ago");
        assert_eq!(time_ago(now() - Duration::days(65), now()), "2 months ago");
        assert_eq!(time_ago(now() - Duration::days(800), now()), "over 2 years ago");
    }
}

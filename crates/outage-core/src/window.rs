use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::CoreError;

pub const DEFAULT_WINDOW_HOURS: i64 = 24;
/// Ninety days.
pub const MAX_WINDOW_HOURS: i64 = 2160;

/// Lower (and optional upper) bound on call start time.
///
/// Trailing windows (`hours=N`) have no upper bound. Explicit date ranges are
/// half-open: `since <= started_at < until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
    pub hours: i64,
}

impl TimeWindow {
    /// Window covering the `hours` preceding `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidWindow`] unless `1 <= hours <= MAX_WINDOW_HOURS`.
    pub fn trailing(hours: i64, now: DateTime<Utc>) -> Result<Self, CoreError> {
        if !(1..=MAX_WINDOW_HOURS).contains(&hours) {
            return Err(CoreError::InvalidWindow(format!(
                "hours must be between 1 and {MAX_WINDOW_HOURS}, got {hours}"
            )));
        }
        Ok(Self {
            since: now - Duration::hours(hours),
            until: None,
            hours,
        })
    }

    /// Explicit `[start, end)` range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidWindow`] if `start >= end` or the range
    /// exceeds `MAX_WINDOW_HOURS`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::InvalidWindow(
                "start_date must be before end_date".to_string(),
            ));
        }
        let span = end - start;
        // Round partial hours up so the reported range covers the whole window.
        let hours = (span.num_seconds() + 3599) / 3600;
        if hours > MAX_WINDOW_HOURS {
            return Err(CoreError::InvalidWindow(format!(
                "date range must not exceed {MAX_WINDOW_HOURS} hours"
            )));
        }
        Ok(Self {
            since: start,
            until: Some(end),
            hours,
        })
    }

    /// Resolve the query-string forms accepted by the dashboard endpoints.
    ///
    /// A `start_date`/`end_date` pair takes precedence over `hours`; supplying
    /// only one of the two dates is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidWindow`] for unparseable dates, a lone
    /// date bound, or out-of-range hours.
    pub fn from_params(
        hours: Option<i64>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        default_hours: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let start_date = start_date.map(str::trim).filter(|s| !s.is_empty());
        let end_date = end_date.map(str::trim).filter(|s| !s.is_empty());
        match (start_date, end_date) {
            (Some(start), Some(end)) => Self::between(parse_date(start)?, parse_date(end)?),
            (None, None) => Self::trailing(hours.unwrap_or(default_hours), now),
            _ => Err(CoreError::InvalidWindow(
                "start_date and end_date must be supplied together".to_string(),
            )),
        }
    }

    /// Stable identity for the window, used to detect duplicate in-flight work.
    ///
    /// Trailing windows are keyed by their length, not their absolute bounds,
    /// since two requests a second apart describe the same operator intent.
    #[must_use]
    pub fn key(&self) -> String {
        match self.until {
            None => format!("last-{}h", self.hours),
            Some(until) => format!("{}..{}", self.since.to_rfc3339(), until.to_rfc3339()),
        }
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
///
/// # Errors
///
/// Returns [`CoreError::InvalidWindow`] if neither form matches.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CoreError::InvalidWindow(format!("unrecognized date '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn trailing_window_subtracts_hours() {
        let window = TimeWindow::trailing(24, now()).expect("valid");
        assert_eq!(window.since, Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap());
        assert!(window.until.is_none());
        assert_eq!(window.key(), "last-24h");
    }

    #[test]
    fn trailing_window_rejects_out_of_range_hours() {
        assert!(TimeWindow::trailing(0, now()).is_err());
        assert!(TimeWindow::trailing(-5, now()).is_err());
        assert!(TimeWindow::trailing(MAX_WINDOW_HOURS + 1, now()).is_err());
        assert!(TimeWindow::trailing(MAX_WINDOW_HOURS, now()).is_ok());
    }

    #[test]
    fn between_requires_ordered_bounds() {
        let a = now();
        let b = a + Duration::hours(2);
        assert!(TimeWindow::between(b, a).is_err());
        assert!(TimeWindow::between(a, a).is_err());
        let window = TimeWindow::between(a, b).expect("valid");
        assert_eq!(window.hours, 2);
        assert_eq!(window.until, Some(b));
    }

    #[test]
    fn between_rounds_partial_hours_up() {
        let a = now();
        let window = TimeWindow::between(a, a + Duration::minutes(90)).expect("valid");
        assert_eq!(window.hours, 2);
    }

    #[test]
    fn from_params_prefers_date_range() {
        let window = TimeWindow::from_params(
            Some(6),
            Some("2025-03-01"),
            Some("2025-03-02T00:00:00Z"),
            DEFAULT_WINDOW_HOURS,
            now(),
        )
        .expect("valid");
        assert_eq!(window.hours, 24);
        assert_eq!(
            window.since,
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn from_params_defaults_hours() {
        let window =
            TimeWindow::from_params(None, None, None, DEFAULT_WINDOW_HOURS, now()).expect("valid");
        assert_eq!(window.hours, DEFAULT_WINDOW_HOURS);
    }

    #[test]
    fn from_params_rejects_lone_bound_and_bad_dates() {
        assert!(
            TimeWindow::from_params(None, Some("2025-03-01"), None, 24, now()).is_err()
        );
        assert!(
            TimeWindow::from_params(None, Some("yesterday"), Some("today"), 24, now()).is_err()
        );
    }

    #[test]
    fn blank_dates_fall_back_to_hours() {
        let window =
            TimeWindow::from_params(Some(48), Some(""), Some(" "), 24, now()).expect("valid");
        assert_eq!(window.hours, 48);
    }
}

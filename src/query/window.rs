use chrono::{NaiveDateTime, TimeDelta};

/// InfluxQL time literal format, e.g. `2024-03-01 00:00:00`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Simulator slot length used when no interval is given.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 15;

/// Time span a query covers, bucketed into fixed-length slots.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use meter_profile::query::QueryWindow;
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .unwrap();
/// let window = QueryWindow::one_day(start, 15);
///
/// assert_eq!(window.end_string(), "2024-03-02 00:00:00");
/// assert_eq!(window.slot_count(), 96);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: NaiveDateTime,
    pub duration: TimeDelta,
    pub interval_minutes: u32,
}

impl QueryWindow {
    pub fn new(start: NaiveDateTime, duration: TimeDelta, interval_minutes: u32) -> Self {
        Self {
            start,
            duration,
            interval_minutes,
        }
    }

    /// A window spanning one day from `start`.
    pub fn one_day(start: NaiveDateTime, interval_minutes: u32) -> Self {
        Self::new(start, TimeDelta::days(1), interval_minutes)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + self.duration
    }

    pub fn start_string(&self) -> String {
        self.start.format(DATETIME_FORMAT).to_string()
    }

    pub fn end_string(&self) -> String {
        self.end().format(DATETIME_FORMAT).to_string()
    }

    /// Number of whole slots in the window; zero if the interval is zero.
    pub fn slot_count(&self) -> usize {
        if self.interval_minutes == 0 {
            return 0;
        }
        let slots = self.duration.num_minutes() / i64::from(self.interval_minutes);
        usize::try_from(slots).unwrap_or(0)
    }

    pub fn with_start(self, start: NaiveDateTime) -> Self {
        Self { start, ..self }
    }

    pub fn with_duration(self, duration: TimeDelta) -> Self {
        Self { duration, ..self }
    }

    pub fn with_interval(self, interval_minutes: u32) -> Self {
        Self {
            interval_minutes,
            ..self
        }
    }
}

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Day keys are exchanged with the API as `DD-MM-YYYY`.
pub const DATE_KEY_FORMAT: &str = "%d-%m-%Y";

/// Wall-clock times are exchanged as `HH:mm`.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Source of "now". Injected so calendar-day logic can be pinned in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Clock pinned to midday of `date` in `tz`.
    pub fn at_midday(tz: Tz, date: NaiveDate) -> Self {
        let local = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        let instant = tz
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local));
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Current calendar day as seen in `tz`.
pub fn today_in(clock: &dyn Clock, tz: Tz) -> NaiveDate {
    clock.now().with_timezone(&tz).date_naive()
}

/// Format any instant as an `HH:mm` wall-clock time in `tz`.
pub fn time_of_day_in<Z: TimeZone>(instant: &DateTime<Z>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(TIME_OF_DAY_FORMAT).to_string()
}

pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

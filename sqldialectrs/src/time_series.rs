//! Calendar bucket generation for gap-filling time series.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};
use crate::models::TimeGranularity;

/// Bucket cap for a single generated series.
pub const DEFAULT_MAX_BUCKETS: usize = 50_000;

const BUCKET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Anything that can hand the adapter an ordered `(from, to)` bucket sequence.
pub trait TimeSeriesSource {
    fn time_series(&self) -> Result<Vec<(String, String)>>;
}

impl TimeSeriesSource for [(String, String)] {
    fn time_series(&self) -> Result<Vec<(String, String)>> {
        Ok(self.to_vec())
    }
}

impl TimeSeriesSource for Vec<(String, String)> {
    fn time_series(&self) -> Result<Vec<(String, String)>> {
        self.as_slice().time_series()
    }
}

/// A time dimension requested at a granularity over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDimension {
    /// SQL expression of the underlying column.
    pub dimension: String,
    pub granularity: TimeGranularity,
    pub date_range: (String, String),
    #[serde(default = "default_max_buckets")]
    pub max_buckets: usize,
}

fn default_max_buckets() -> usize {
    DEFAULT_MAX_BUCKETS
}

impl TimeDimension {
    pub fn new(
        dimension: impl Into<String>,
        granularity: TimeGranularity,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            dimension: dimension.into(),
            granularity,
            date_range: (from.into(), to.into()),
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }

    pub fn with_max_buckets(mut self, max_buckets: usize) -> Self {
        self.max_buckets = max_buckets;
        self
    }
}

impl TimeSeriesSource for TimeDimension {
    /// Buckets run from the start of the bucket containing `from` through the
    /// bucket containing `to`. Each `to` is one millisecond before the next
    /// bucket's `from`.
    fn time_series(&self) -> Result<Vec<(String, String)>> {
        let (raw_from, raw_to) = &self.date_range;
        let from = parse_bound(raw_from, false)?;
        let to = parse_bound(raw_to, true)?;
        if from > to {
            return Err(DialectError::DateRange(format!(
                "range start {raw_from} is after range end {raw_to}"
            )));
        }

        let mut series = Vec::new();
        let mut current = bucket_start(from, self.granularity)?;
        while current <= to {
            if series.len() >= self.max_buckets {
                return Err(DialectError::Config(format!(
                    "time series for {} by {} exceeds {} buckets",
                    self.dimension, self.granularity, self.max_buckets
                )));
            }
            let next = next_bucket(current, self.granularity)?;
            let last = next - Duration::milliseconds(1);
            series.push((
                current.format(BUCKET_FORMAT).to_string(),
                last.format(BUCKET_FORMAT).to_string(),
            ));
            current = next;
        }

        tracing::debug!(
            dimension = %self.dimension,
            granularity = %self.granularity,
            buckets = series.len(),
            "generated time series"
        );
        Ok(series)
    }
}

/// Date-only bounds cover the whole day when they end a range.
fn parse_bound(raw: &str, end_of_range: bool) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DialectError::DateRange(format!("cannot parse {raw}: {e}")))?;
    let time = if end_of_range {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.ok_or_else(|| DialectError::DateRange(format!("cannot parse {raw}")))
}

fn bucket_start(dt: NaiveDateTime, granularity: TimeGranularity) -> Result<NaiveDateTime> {
    let date = dt.date();
    let start = match granularity {
        TimeGranularity::Second => date.and_hms_opt(dt.hour(), dt.minute(), dt.second()),
        TimeGranularity::Minute => date.and_hms_opt(dt.hour(), dt.minute(), 0),
        TimeGranularity::Hour => date.and_hms_opt(dt.hour(), 0, 0),
        TimeGranularity::Day => date.and_hms_opt(0, 0, 0),
        TimeGranularity::Week => {
            let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            monday.and_hms_opt(0, 0, 0)
        }
        TimeGranularity::Month => first_of_month(date.year(), date.month()),
        TimeGranularity::Quarter => first_of_month(date.year(), (date.month() - 1) / 3 * 3 + 1),
        TimeGranularity::Year => first_of_month(date.year(), 1),
    };
    start.ok_or_else(|| DialectError::DateRange(format!("cannot truncate {dt} to {granularity}")))
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn next_bucket(start: NaiveDateTime, granularity: TimeGranularity) -> Result<NaiveDateTime> {
    let next = match granularity {
        TimeGranularity::Second => start.checked_add_signed(Duration::seconds(1)),
        TimeGranularity::Minute => start.checked_add_signed(Duration::minutes(1)),
        TimeGranularity::Hour => start.checked_add_signed(Duration::hours(1)),
        TimeGranularity::Day => start.checked_add_signed(Duration::days(1)),
        TimeGranularity::Week => start.checked_add_signed(Duration::weeks(1)),
        TimeGranularity::Month => start.checked_add_months(Months::new(1)),
        TimeGranularity::Quarter => start.checked_add_months(Months::new(3)),
        TimeGranularity::Year => start.checked_add_months(Months::new(12)),
    };
    next.ok_or_else(|| DialectError::DateRange(format!("{start} overflows the calendar")))
}

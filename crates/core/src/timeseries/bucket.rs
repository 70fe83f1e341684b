//! Bucket units and calendar arithmetic.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Granularity of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketUnit {
    /// One bucket per UTC calendar day.
    Day,
    /// One bucket per UTC calendar month.
    Month,
}

impl BucketUnit {
    /// Truncates an instant to the start of its bucket: UTC midnight for
    /// days, UTC first-of-month for months.
    #[must_use]
    pub fn truncate(self, instant: DateTime<Utc>) -> NaiveDate {
        let date = instant.date_naive();
        match self {
            Self::Day => date,
            Self::Month => month_start(date),
        }
    }

    /// Formats a bucket start as its label: `YYYY-MM-DD` or `YYYY-MM`.
    #[must_use]
    pub fn label(self, bucket_start: NaiveDate) -> String {
        match self {
            Self::Day => bucket_start.format("%Y-%m-%d").to_string(),
            Self::Month => bucket_start.format("%Y-%m").to_string(),
        }
    }

    /// Returns the start of the following bucket, `None` at the calendar
    /// boundary of the `chrono` range.
    #[must_use]
    pub fn next_start(self, bucket_start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day => bucket_start.succ_opt(),
            Self::Month => bucket_start.checked_add_months(Months::new(1)),
        }
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    // from_ymd_opt on an existing date's year/month with day 1 always
    // resolves; fall back to the input to keep the path panic-free.
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

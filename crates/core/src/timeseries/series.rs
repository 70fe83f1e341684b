//! Dense, gap-filled series construction.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tillbook_shared::types::Cents;

use super::bucket::BucketUnit;

/// One committed row as the aggregator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesPoint {
    /// When the underlying row was committed.
    pub occurred_at: DateTime<Utc>,
    /// Its contribution in cents.
    pub amount_cents: Cents,
}

/// One bucket of the produced series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesBucket {
    /// `YYYY-MM-DD` for days, `YYYY-MM` for months.
    pub label: String,
    /// Sum of contributions in this bucket; zero when none.
    pub value_cents: Cents,
}

/// A dense, chronological series over a requested range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// The granularity the series was built at.
    pub unit: BucketUnit,
    /// Every bucket between the range ends, in order, exactly once.
    pub buckets: Vec<SeriesBucket>,
    /// Sum of all bucket values.
    pub total_cents: Cents,
}

/// Errors from series construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    /// The range end precedes the range start.
    #[error("series range is inverted: {from} > {to}")]
    InvalidRange {
        /// Requested range start.
        from: DateTime<Utc>,
        /// Requested range end.
        to: DateTime<Utc>,
    },

    /// A bucket sum or the series total left the `i64` range.
    #[error("series totals overflowed")]
    AmountOverflow,
}

/// Builds a dense series from committed rows.
///
/// Points outside `[from, to]` are ignored; every bucket between the
/// truncated range ends appears exactly once, zero-filled where no point
/// lands.
///
/// # Errors
///
/// Returns [`SeriesError::InvalidRange`] for an inverted range and
/// [`SeriesError::AmountOverflow`] if any sum leaves the `i64` range.
pub fn build_series(
    points: &[SeriesPoint],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    unit: BucketUnit,
) -> Result<TimeSeries, SeriesError> {
    if from > to {
        return Err(SeriesError::InvalidRange { from, to });
    }

    let start = unit.truncate(from);
    let end = unit.truncate(to);

    let mut sums: BTreeMap<NaiveDate, Cents> = BTreeMap::new();
    for point in points {
        if point.occurred_at < from || point.occurred_at > to {
            continue;
        }
        let bucket = unit.truncate(point.occurred_at);
        let slot = sums.entry(bucket).or_insert(0);
        *slot = slot
            .checked_add(point.amount_cents)
            .ok_or(SeriesError::AmountOverflow)?;
    }

    let mut buckets = Vec::new();
    let mut total_cents: Cents = 0;
    let mut current = start;
    loop {
        let value_cents = sums.get(&current).copied().unwrap_or(0);
        total_cents = total_cents
            .checked_add(value_cents)
            .ok_or(SeriesError::AmountOverflow)?;
        buckets.push(SeriesBucket {
            label: unit.label(current),
            value_cents,
        });

        if current >= end {
            break;
        }
        let Some(next) = unit.next_start(current) else {
            break;
        };
        current = next;
    }

    Ok(TimeSeries {
        unit,
        buckets,
        total_cents,
    })
}

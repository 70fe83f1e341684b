//! Calendar bucketing for reporting reads.
//!
//! Dashboards ask for "revenue per day" or "expenses per month" over a
//! range. This module turns committed rows (already filtered by the
//! storage layer) into a dense, chronological series: every bucket in the
//! range appears exactly once, zero-valued where nothing happened. All
//! bucketing is in UTC.

pub mod bucket;
pub mod series;

#[cfg(test)]
mod series_props;

pub use bucket::BucketUnit;
pub use series::{SeriesBucket, SeriesError, SeriesPoint, TimeSeries, build_series};

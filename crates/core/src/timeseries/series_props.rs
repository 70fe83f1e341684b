//! Property-based tests for series construction.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use tillbook_shared::types::Cents;

use super::bucket::BucketUnit;
use super::series::{SeriesPoint, build_series};

/// Instants within a two-year window, at one-second resolution.
fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0i64..63_072_000i64).prop_map(move |secs| base + chrono::Duration::seconds(secs))
}

fn points_strategy() -> impl Strategy<Value = Vec<SeriesPoint>> {
    prop::collection::vec(
        (instant_strategy(), 0i64..100_000i64).prop_map(|(occurred_at, amount_cents)| {
            SeriesPoint {
                occurred_at,
                amount_cents,
            }
        }),
        0..64,
    )
}

fn unit_strategy() -> impl Strategy<Value = BucketUnit> {
    prop_oneof![Just(BucketUnit::Day), Just(BucketUnit::Month)]
}

proptest! {
    #[test]
    fn prop_series_is_dense_and_ordered(
        (a, b) in (instant_strategy(), instant_strategy()),
        points in points_strategy(),
        unit in unit_strategy(),
    ) {
        let (from, to) = if a <= b { (a, b) } else { (b, a) };
        let series = build_series(&points, from, to, unit).unwrap();

        // Labels strictly increase; lexicographic order matches
        // chronological order for zero-padded calendar labels.
        for pair in series.buckets.windows(2) {
            prop_assert!(pair[0].label < pair[1].label);
        }

        // First and last buckets are the truncated range ends.
        prop_assert_eq!(&series.buckets[0].label, &unit.label(unit.truncate(from)));
        let last = &series.buckets[series.buckets.len() - 1];
        prop_assert_eq!(&last.label, &unit.label(unit.truncate(to)));
    }

    #[test]
    fn prop_total_equals_sum_of_in_range_points(
        (a, b) in (instant_strategy(), instant_strategy()),
        points in points_strategy(),
        unit in unit_strategy(),
    ) {
        let (from, to) = if a <= b { (a, b) } else { (b, a) };
        let series = build_series(&points, from, to, unit).unwrap();

        let expected: Cents = points
            .iter()
            .filter(|p| p.occurred_at >= from && p.occurred_at <= to)
            .map(|p| p.amount_cents)
            .sum();
        prop_assert_eq!(series.total_cents, expected);

        let bucket_sum: Cents = series.buckets.iter().map(|b| b.value_cents).sum();
        prop_assert_eq!(bucket_sum, series.total_cents);
    }

    #[test]
    fn prop_day_bucket_count_matches_calendar_days(
        (a, b) in (instant_strategy(), instant_strategy()),
    ) {
        let (from, to) = if a <= b { (a, b) } else { (b, a) };
        let series = build_series(&[], from, to, BucketUnit::Day).unwrap();
        let days = (to.date_naive() - from.date_naive()).num_days() + 1;
        prop_assert_eq!(series.buckets.len() as i64, days);
    }
}

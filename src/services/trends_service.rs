//! Shapes daily rows into chart-ready series: weekly/monthly buckets,
//! centered moving averages and yearly revenue rollups.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{Aggregation, DailyRevenue, SeriesPoint, YearlyRevenue};

/// First day of the bucket `date` falls in; weeks start on Monday
pub fn bucket_start(date: NaiveDate, aggregation: Aggregation) -> NaiveDate {
    match aggregation {
        Aggregation::Daily => date,
        Aggregation::Weekly => date - Duration::days(date.weekday().num_days_from_monday() as i64),
        Aggregation::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Sum values per bucket, ordered by bucket start
pub fn aggregate(points: &[SeriesPoint], aggregation: Aggregation) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for point in points {
        *buckets.entry(bucket_start(point.date, aggregation)).or_insert(0.0) += point.value;
    }

    buckets
        .into_iter()
        .map(|(date, value)| SeriesPoint { date, value })
        .collect()
}

/// Window used for trend smoothing: a third of the series, clamped to 3..=7
pub fn moving_average_window(len: usize) -> usize {
    (len / 3).clamp(3, 7)
}

/// Centered rolling mean; edge positions average whatever part of the window exists.
///
/// For an even window `w`, position `i` covers `i - w/2 ..= i + (w-1)/2`.
pub fn moving_average(values: &[f64]) -> Vec<f64> {
    if values.len() <= 1 {
        return values.to_vec();
    }

    let window = moving_average_window(values.len());
    let before = window / 2;
    let after = (window - 1) / 2;

    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after).min(values.len() - 1);
            let slice = &values[lo..=hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Revenue summed per calendar year, oldest first
pub fn yearly_revenue(rows: &[DailyRevenue]) -> Vec<YearlyRevenue> {
    let mut years: BTreeMap<i32, YearlyRevenue> = BTreeMap::new();

    for row in rows {
        let year = row.date.year();
        let entry = years.entry(year).or_insert_with(|| YearlyRevenue {
            year,
            total_revenue: 0.0,
            ad_revenue: 0.0,
            purchase_revenue: 0.0,
        });
        entry.total_revenue += row.total_revenue;
        entry.ad_revenue += row.ad_revenue;
        entry.purchase_revenue += row.purchase_revenue;
    }

    years.into_values().collect()
}

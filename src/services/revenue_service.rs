use tracing::{debug, warn};

use crate::api::ga4::ReportSource;
use crate::models::{names, DailyRevenue, RevenueTotals};
use crate::services::pipeline::{parse_response, Ga4Pipeline};
use crate::utils::dates::parse_report_date;
use crate::utils::{DateRange, PipelineError, MAX_DAYS_PER_CALL};

/// Daily total and purchase revenue with the derived ad revenue, oldest first.
///
/// Ranges over the per-call limit are queried chunk by chunk.
pub async fn fetch_daily_revenue<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    range: &DateRange,
) -> Result<Vec<DailyRevenue>, PipelineError> {
    let mut rows = Vec::new();
    for chunk in range.chunks(MAX_DAYS_PER_CALL) {
        let response = pipeline
            .run_report(&[names::TOTAL_REVENUE, names::PURCHASE_REVENUE], &[names::DATE], &chunk)
            .await?;
        rows.extend(parse_response(&response, true));
    }

    let mut days: Vec<DailyRevenue> = rows
        .into_iter()
        .filter_map(|row| {
            let raw_date = row.dimension(names::DATE).unwrap_or_default();
            let Some(date) = parse_report_date(raw_date) else {
                warn!("Skipping revenue row with unparseable date '{}'", raw_date);
                return None;
            };
            Some(DailyRevenue::new(
                date,
                row.metric(names::TOTAL_REVENUE),
                row.metric(names::PURCHASE_REVENUE),
            ))
        })
        .collect();

    days.sort_by_key(|d| d.date);
    Ok(days)
}

/// Revenue totals for a range GA4 can answer in one call
async fn fetch_revenue_chunk<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    range: &DateRange,
) -> Result<RevenueTotals, PipelineError> {
    let response = pipeline
        .run_report(&[names::TOTAL_REVENUE, names::PURCHASE_REVENUE], &[], range)
        .await?;

    Ok(parse_response(&response, false)
        .first()
        .map(|row| RevenueTotals::split(row.metric(names::TOTAL_REVENUE), row.metric(names::PURCHASE_REVENUE)))
        .unwrap_or_default())
}

/// Revenue totals for any range; ranges over the per-call limit are summed chunk by chunk.
///
/// Any failing chunk fails the whole call.
pub async fn fetch_revenue_totals<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    range: &DateRange,
) -> Result<RevenueTotals, PipelineError> {
    let mut totals = RevenueTotals::default();
    for chunk in range.chunks(MAX_DAYS_PER_CALL) {
        totals.add(&fetch_revenue_chunk(pipeline, &chunk).await?);
    }
    Ok(totals)
}

/// Like [`fetch_revenue_totals`], but a failure yields zeros instead of an error
pub async fn fetch_revenue_metrics<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    range: &DateRange,
) -> RevenueTotals {
    match fetch_revenue_totals(pipeline, range).await {
        Ok(totals) => totals,
        Err(e) => {
            warn!("Revenue totals for {} unavailable, reporting zeros: {}", range, e);
            RevenueTotals::default()
        }
    }
}

/// Revenue for the last `days` days, fetched in chunks; failed chunks are skipped
pub async fn fetch_revenue_metrics_long_period<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    days: u32,
) -> Result<RevenueTotals, PipelineError> {
    let range = DateRange::last_n_days(pipeline.today(), days)?;
    let chunks = range.chunks(MAX_DAYS_PER_CALL);
    debug!("Fetching revenue for {} in {} chunk(s)", range, chunks.len());

    let mut totals = RevenueTotals::default();
    for chunk in &chunks {
        match fetch_revenue_chunk(pipeline, chunk).await {
            Ok(part) => totals.add(&part),
            Err(e) => warn!("Skipping revenue chunk {}: {}", chunk, e),
        }
    }
    Ok(totals)
}

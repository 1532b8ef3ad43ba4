use tracing::{info, warn};

use crate::api::ga4::ReportSource;
use crate::models::{PeriodComparison, PeriodDeltas, PeriodMetrics};
use crate::services::pipeline::Ga4Pipeline;
use crate::services::revenue_service::fetch_revenue_totals;
use crate::services::users_service::fetch_user_totals;
use crate::utils::{DateRange, PipelineError};

/// Look-back presets for the revenue comparison, in days
pub const COMPARISON_PERIODS: [(&str, u32); 7] = [
    ("Last Month", 30),
    ("Last 3 Months", 90),
    ("Last 6 Months", 180),
    ("Last 12 Months", 365),
    ("Last 2 Years", 730),
    ("Last 5 Years", 1825),
    ("Last 10 Years", 3650),
];

/// Percentage change from `previous` to `current`; undefined when `previous` is zero
pub fn calculate_delta(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

impl PeriodDeltas {
    pub fn between(current: &PeriodMetrics, previous: &PeriodMetrics) -> Self {
        Self {
            total_users: calculate_delta(current.total_users as f64, previous.total_users as f64),
            active_users: calculate_delta(current.active_users as f64, previous.active_users as f64),
            total_revenue: calculate_delta(current.revenue.total_revenue, previous.revenue.total_revenue),
            ad_revenue: calculate_delta(current.revenue.ad_revenue, previous.revenue.ad_revenue),
            in_app_purchase_revenue: calculate_delta(
                current.revenue.in_app_purchase_revenue,
                previous.revenue.in_app_purchase_revenue,
            ),
        }
    }
}

async fn fetch_period_metrics<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    range: &DateRange,
) -> Result<PeriodMetrics, PipelineError> {
    let users = fetch_user_totals(pipeline, range).await?;
    let revenue = fetch_revenue_totals(pipeline, range).await?;

    Ok(PeriodMetrics {
        total_users: users.total_users.max(0.0).round() as u64,
        active_users: users.active_users.max(0.0).round() as u64,
        revenue,
    })
}

/// Totals for the same-length period immediately before `current`.
///
/// Comparison data is optional for the report, so any failure yields zeros.
pub async fn fetch_previous_period_metrics<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    current: &DateRange,
) -> PeriodMetrics {
    let previous = match current.previous() {
        Ok(previous) => previous,
        Err(e) => {
            warn!("No previous period for {}, reporting zeros: {}", current, e);
            return PeriodMetrics::default();
        }
    };
    match fetch_period_metrics(pipeline, &previous).await {
        Ok(metrics) => metrics,
        Err(e) => {
            warn!("Previous period {} unavailable, reporting zeros: {}", previous, e);
            PeriodMetrics::default()
        }
    }
}

/// Revenue for every preset in [`COMPARISON_PERIODS`], each ending today.
///
/// A failing preset is recorded with its error and does not stop the others.
pub async fn fetch_period_comparisons<S: ReportSource>(pipeline: &Ga4Pipeline<S>) -> Vec<PeriodComparison> {
    let today = pipeline.today();
    let mut comparisons = Vec::with_capacity(COMPARISON_PERIODS.len());

    for (label, days) in COMPARISON_PERIODS {
        let result = match DateRange::last_n_days(today, days) {
            Ok(range) => fetch_revenue_totals(pipeline, &range).await,
            Err(e) => Err(e),
        };

        let comparison = match result {
            Ok(revenue) => PeriodComparison {
                label: label.to_string(),
                days,
                revenue: Some(revenue),
                error: None,
            },
            Err(e) => {
                warn!("Comparison '{}' failed: {}", label, e);
                PeriodComparison {
                    label: label.to_string(),
                    days,
                    revenue: None,
                    error: Some(e.to_string()),
                }
            }
        };
        comparisons.push(comparison);
    }

    info!("Fetched {} revenue comparison period(s)", comparisons.len());
    comparisons
}

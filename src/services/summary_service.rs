use chrono::Utc;
use tracing::info;

use crate::api::ga4::ReportSource;
use crate::models::{
    AnalyticsReport, DailyRevenue, DailyUsers, PeriodDeltas, PeriodMetrics, ReportMetadata, RevenueTotals, Summary,
};
use crate::services::comparison_service::fetch_previous_period_metrics;
use crate::services::pipeline::Ga4Pipeline;
use crate::services::revenue_service::{fetch_daily_revenue, fetch_revenue_metrics};
use crate::services::users_service::fetch_daily_users;
use crate::utils::PipelineError;

/// Mean of the days that recorded any session, in minutes
pub fn average_session_minutes(daily_users: &[DailyUsers]) -> f64 {
    let durations: Vec<f64> = daily_users
        .iter()
        .map(|d| d.average_session_duration)
        .filter(|&secs| secs > 0.0)
        .collect();

    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<f64>() / durations.len() as f64 / 60.0
}

/// Average revenue per user, 0 when there were no users
pub fn arpu(total_revenue: f64, total_users: f64) -> f64 {
    if total_users > 0.0 {
        total_revenue / total_users
    } else {
        0.0
    }
}

/// Combine the current period's rows and totals with the previous period.
///
/// User totals are sums of the daily figures, so a user active on several
/// days is counted once per day.
pub fn build_summary(daily_users: &[DailyUsers], revenue: RevenueTotals, previous: PeriodMetrics) -> Summary {
    let total_users: f64 = daily_users.iter().map(|d| d.total_users).sum();
    let active_users: f64 = daily_users.iter().map(|d| d.active_users).sum();

    let current = PeriodMetrics {
        total_users: total_users.max(0.0).round() as u64,
        active_users: active_users.max(0.0).round() as u64,
        revenue,
    };

    Summary {
        total_users: current.total_users,
        active_users: current.active_users,
        revenue,
        session_duration_minutes: average_session_minutes(daily_users),
        arpu: arpu(revenue.total_revenue, total_users),
        previous_period: previous,
        deltas: PeriodDeltas::between(&current, &previous),
    }
}

/// Fetch every metric the dashboard needs for one period
pub async fn fetch_all_metrics<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    days: Option<u32>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<AnalyticsReport, PipelineError> {
    let range = pipeline.date_range(days, start_date, end_date)?;
    info!("Fetching GA4 metrics for property {} ({})", pipeline.property_id(), range);

    let daily_users: Vec<DailyUsers> = fetch_daily_users(pipeline, &range).await?;
    let daily_revenue: Vec<DailyRevenue> = fetch_daily_revenue(pipeline, &range).await?;
    let revenue = fetch_revenue_metrics(pipeline, &range).await;
    let previous = fetch_previous_period_metrics(pipeline, &range).await;

    let summary = build_summary(&daily_users, revenue, previous);
    info!(
        "Fetched {} day(s) of users and {} day(s) of revenue",
        daily_users.len(),
        daily_revenue.len()
    );

    Ok(AnalyticsReport {
        metadata: ReportMetadata {
            property_id: pipeline.property_id().to_string(),
            date_range: range,
            generated_at: Utc::now(),
        },
        daily_users,
        daily_revenue,
        summary,
        revenue_comparisons: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ga4::ApiError;
    use crate::services::testing::{report, totals, ScriptedSource};
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(d: u32, total: f64, active: f64, secs: f64) -> DailyUsers {
        DailyUsers {
            date: ymd(2024, 3, d),
            total_users: total,
            active_users: active,
            average_session_duration: secs,
        }
    }

    #[test]
    fn test_session_minutes_ignores_empty_days() {
        let days = vec![day(1, 1.0, 1.0, 120.0), day(2, 0.0, 0.0, 0.0), day(3, 1.0, 1.0, 240.0)];
        assert_eq!(average_session_minutes(&days), 3.0);
        assert_eq!(average_session_minutes(&[]), 0.0);
    }

    #[test]
    fn test_arpu_with_no_users_is_zero() {
        assert_eq!(arpu(100.0, 0.0), 0.0);
        assert_eq!(arpu(100.0, 40.0), 2.5);
    }

    #[test]
    fn test_build_summary() {
        let days = vec![day(1, 100.0, 60.0, 90.0), day(2, 300.0, 140.0, 150.0)];
        let previous = PeriodMetrics {
            total_users: 200,
            active_users: 0,
            revenue: RevenueTotals::split(50.0, 25.0),
        };

        let summary = build_summary(&days, RevenueTotals::split(100.0, 40.0), previous);
        assert_eq!(summary.total_users, 400);
        assert_eq!(summary.active_users, 200);
        assert_eq!(summary.arpu, 0.25);
        assert_eq!(summary.session_duration_minutes, 2.0);
        assert_eq!(summary.deltas.total_users, Some(100.0));
        assert_eq!(summary.deltas.active_users, None);
        assert_eq!(summary.deltas.total_revenue, Some(100.0));
        assert_eq!(summary.deltas.ad_revenue, Some(140.0));
    }

    #[tokio::test]
    async fn test_fetch_all_metrics_document_shape() {
        let source = ScriptedSource::new(vec![
            Ok(report(
                &["date"],
                &["totalUsers", "activeUsers", "averageSessionDuration"],
                vec![
                    (vec!["20240301"], vec!["10", "5", "60"]),
                    (vec!["20240302"], vec!["30", "15", "180"]),
                ],
            )),
            Ok(report(
                &["date"],
                &["totalRevenue", "purchaseRevenue"],
                vec![
                    (vec!["20240301"], vec!["4", "1"]),
                    (vec!["20240302"], vec!["6", "3"]),
                ],
            )),
            Ok(totals(&["totalRevenue", "purchaseRevenue"], &["10", "4"])),
            Ok(totals(&["totalUsers", "activeUsers"], &["20", "10"])),
            Err(ApiError::ServerError(500, "previous revenue failed".to_string())),
        ]);
        let p = Ga4Pipeline::new(source, "123456789", 30)
            .unwrap()
            .with_today(ymd(2024, 3, 2));

        let result = fetch_all_metrics(&p, Some(2), None, None).await.unwrap();
        assert_eq!(result.summary.total_users, 40);
        assert_eq!(result.summary.revenue.ad_revenue, 6.0);
        assert_eq!(result.summary.arpu, 0.25);
        assert_eq!(result.summary.previous_period, PeriodMetrics::default());
        assert_eq!(result.summary.deltas.total_users, None);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["metadata"]["property_id"], "123456789");
        assert_eq!(json["metadata"]["date_range"]["start_date"], "2024-03-01");
        assert_eq!(json["metadata"]["date_range"]["end_date"], "2024-03-02");
        assert_eq!(json["daily_users"][1]["totalUsers"], 30.0);
        assert_eq!(json["daily_revenue"][0]["adRevenue"], 3.0);
        assert_eq!(json["summary"]["in_app_purchase_revenue"], 4.0);
        assert_eq!(json["summary"]["session_duration_minutes"], 2.0);
        assert_eq!(json["summary"]["previous_period"]["total_revenue"], 0.0);
        assert!(json["summary"]["deltas"]["total_revenue"].is_null());
        assert!(json.get("revenue_comparisons").is_none());
    }

    #[tokio::test]
    async fn test_fetch_all_metrics_surfaces_daily_failures() {
        let source = ScriptedSource::new(vec![Err(ApiError::PermissionDenied("nope".to_string()))]);
        let p = Ga4Pipeline::new(source, "123456789", 30)
            .unwrap()
            .with_today(ymd(2024, 3, 2));

        let err = fetch_all_metrics(&p, None, None, None).await.unwrap_err();
        assert!(matches!(err, PipelineError::PermissionDenied(_)));
    }
}

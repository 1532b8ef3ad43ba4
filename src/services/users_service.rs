use tracing::warn;

use crate::api::ga4::ReportSource;
use crate::models::{names, DailyUsers, UserTotals};
use crate::services::pipeline::{parse_response, Ga4Pipeline};
use crate::utils::dates::parse_report_date;
use crate::utils::{DateRange, PipelineError, MAX_DAYS_PER_CALL};

/// Daily total users, active users and average session duration, oldest first.
///
/// Ranges over the per-call limit are queried chunk by chunk.
pub async fn fetch_daily_users<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    range: &DateRange,
) -> Result<Vec<DailyUsers>, PipelineError> {
    let mut rows = Vec::new();
    for chunk in range.chunks(MAX_DAYS_PER_CALL) {
        let response = pipeline
            .run_report(
                &[names::TOTAL_USERS, names::ACTIVE_USERS, names::AVERAGE_SESSION_DURATION],
                &[names::DATE],
                &chunk,
            )
            .await?;
        rows.extend(parse_response(&response, true));
    }

    let mut days: Vec<DailyUsers> = rows
        .into_iter()
        .filter_map(|row| {
            let raw_date = row.dimension(names::DATE).unwrap_or_default();
            let Some(date) = parse_report_date(raw_date) else {
                warn!("Skipping user row with unparseable date '{}'", raw_date);
                return None;
            };
            Some(DailyUsers {
                date,
                total_users: row.metric(names::TOTAL_USERS),
                active_users: row.metric(names::ACTIVE_USERS),
                average_session_duration: row.metric(names::AVERAGE_SESSION_DURATION),
            })
        })
        .collect();

    days.sort_by_key(|d| d.date);
    Ok(days)
}

/// Period-level user totals (no date breakdown)
pub async fn fetch_user_totals<S: ReportSource>(
    pipeline: &Ga4Pipeline<S>,
    range: &DateRange,
) -> Result<UserTotals, PipelineError> {
    let response = pipeline
        .run_report(&[names::TOTAL_USERS, names::ACTIVE_USERS], &[], range)
        .await?;

    Ok(parse_response(&response, false)
        .first()
        .map(|row| UserTotals {
            total_users: row.metric(names::TOTAL_USERS),
            active_users: row.metric(names::ACTIVE_USERS),
        })
        .unwrap_or_default())
}

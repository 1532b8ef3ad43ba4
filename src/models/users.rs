//! User metric models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::report::names;
use super::trends::SeriesPoint;

/// One day of user activity, serialized with GA4 metric names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsers {
    pub date: NaiveDate,
    #[serde(rename = "totalUsers")]
    pub total_users: f64,
    #[serde(rename = "activeUsers")]
    pub active_users: f64,
    /// Seconds
    #[serde(rename = "averageSessionDuration")]
    pub average_session_duration: f64,
}

impl DailyUsers {
    /// Project one metric by its GA4 name; unknown names yield zeros
    pub fn series(rows: &[DailyUsers], metric: &str) -> Vec<SeriesPoint> {
        rows.iter()
            .map(|row| SeriesPoint {
                date: row.date,
                value: match metric {
                    names::TOTAL_USERS => row.total_users,
                    names::ACTIVE_USERS => row.active_users,
                    names::AVERAGE_SESSION_DURATION => row.average_session_duration,
                    _ => 0.0,
                },
            })
            .collect()
    }
}

/// Period totals without a date breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserTotals {
    pub total_users: f64,
    pub active_users: f64,
}

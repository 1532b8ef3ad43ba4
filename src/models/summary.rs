//! Dashboard-ready report document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::revenue::{DailyRevenue, RevenueTotals};
use super::users::DailyUsers;
use crate::utils::DateRange;

/// User and revenue totals for one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub total_users: u64,
    pub active_users: u64,
    #[serde(flatten)]
    pub revenue: RevenueTotals,
}

/// Percentage change per metric; `None` where the previous value was zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodDeltas {
    pub total_users: Option<f64>,
    pub active_users: Option<f64>,
    pub total_revenue: Option<f64>,
    pub ad_revenue: Option<f64>,
    pub in_app_purchase_revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_users: u64,
    pub active_users: u64,
    #[serde(flatten)]
    pub revenue: RevenueTotals,
    pub session_duration_minutes: f64,
    /// Average revenue per user
    pub arpu: f64,
    pub previous_period: PeriodMetrics,
    pub deltas: PeriodDeltas,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub property_id: String,
    pub date_range: DateRange,
    pub generated_at: DateTime<Utc>,
}

/// Revenue for one named look-back preset, or why it could not be fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub label: String,
    pub days: u32,
    pub revenue: Option<RevenueTotals>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub metadata: ReportMetadata,
    pub daily_users: Vec<DailyUsers>,
    pub daily_revenue: Vec<DailyRevenue>,
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_comparisons: Option<Vec<PeriodComparison>>,
}

//! Time-series shaping models

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated value of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Bucket size for trend series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Daily,
    Weekly,
    Monthly,
}

impl Aggregation {
    /// Daily up to three months; monthly beyond that, since GA4 has no yearly grain
    pub fn optimal_for(period_days: i64) -> Self {
        if period_days <= 90 {
            Aggregation::Daily
        } else {
            Aggregation::Monthly
        }
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Aggregation::Daily),
            "weekly" | "week" | "w" => Ok(Aggregation::Weekly),
            "monthly" | "month" | "m" => Ok(Aggregation::Monthly),
            _ => Err(format!("Unknown aggregation '{}'. Supported: daily, weekly, monthly", s)),
        }
    }
}

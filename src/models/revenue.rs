//! Revenue models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::report::names;
use super::trends::SeriesPoint;

/// Revenue for a period, with ad revenue derived as the non-purchase residual
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueTotals {
    pub total_revenue: f64,
    pub ad_revenue: f64,
    pub in_app_purchase_revenue: f64,
}

impl RevenueTotals {
    /// Ad revenue is `total - purchase`, floored at zero.
    ///
    /// This is an approximation: any other non-purchase revenue lands in ads too.
    pub fn split(total_revenue: f64, purchase_revenue: f64) -> Self {
        Self {
            total_revenue,
            ad_revenue: (total_revenue - purchase_revenue).max(0.0),
            in_app_purchase_revenue: purchase_revenue,
        }
    }

    pub fn add(&mut self, other: &RevenueTotals) {
        self.total_revenue += other.total_revenue;
        self.ad_revenue += other.ad_revenue;
        self.in_app_purchase_revenue += other.in_app_purchase_revenue;
    }
}

/// One day of revenue, serialized with GA4 metric names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: f64,
    #[serde(rename = "purchaseRevenue")]
    pub purchase_revenue: f64,
    #[serde(rename = "adRevenue")]
    pub ad_revenue: f64,
}

impl DailyRevenue {
    pub fn new(date: NaiveDate, total_revenue: f64, purchase_revenue: f64) -> Self {
        let split = RevenueTotals::split(total_revenue, purchase_revenue);
        Self {
            date,
            total_revenue,
            purchase_revenue,
            ad_revenue: split.ad_revenue,
        }
    }

    /// Project one metric by its GA4 name (or `adRevenue`); unknown names yield zeros
    pub fn series(rows: &[DailyRevenue], metric: &str) -> Vec<SeriesPoint> {
        rows.iter()
            .map(|row| SeriesPoint {
                date: row.date,
                value: match metric {
                    names::TOTAL_REVENUE => row.total_revenue,
                    names::PURCHASE_REVENUE => row.purchase_revenue,
                    names::AD_REVENUE => row.ad_revenue,
                    _ => 0.0,
                },
            })
            .collect()
    }
}

/// Revenue summed over one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRevenue {
    pub year: i32,
    pub total_revenue: f64,
    pub ad_revenue: f64,
    pub purchase_revenue: f64,
}

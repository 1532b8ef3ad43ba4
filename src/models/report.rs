//! Parsed report rows

use std::collections::BTreeMap;

/// One runReport row keyed by header name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRow {
    pub dimensions: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, f64>,
}

impl ReportRow {
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions.get(name).map(String::as_str)
    }

    /// Metric value, 0.0 when the report did not include it
    pub fn metric(&self, name: &str) -> f64 {
        self.metrics.get(name).copied().unwrap_or(0.0)
    }
}

/// GA4 metric and dimension names used by the pipeline
pub mod names {
    pub const DATE: &str = "date";
    pub const TOTAL_USERS: &str = "totalUsers";
    pub const ACTIVE_USERS: &str = "activeUsers";
    pub const AVERAGE_SESSION_DURATION: &str = "averageSessionDuration";
    pub const TOTAL_REVENUE: &str = "totalRevenue";
    pub const PURCHASE_REVENUE: &str = "purchaseRevenue";
    /// Derived; GA4 does not expose ad revenue directly
    pub const AD_REVENUE: &str = "adRevenue";
}

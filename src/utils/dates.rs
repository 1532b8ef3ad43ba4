use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::errors::PipelineError;

/// GA4 caps a single report at roughly 14 months
pub const MAX_DAYS_PER_CALL: i64 = 427;

/// Inclusive calendar date range, serialized as `{"start_date", "end_date"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, PipelineError> {
        if start_date > end_date {
            return Err(PipelineError::InvalidRange(format!(
                "start date {} is after end date {}",
                start_date, end_date
            )));
        }
        Ok(Self { start_date, end_date })
    }

    /// The last `days` days ending on (and including) `today`
    pub fn last_n_days(today: NaiveDate, days: u32) -> Result<Self, PipelineError> {
        if days == 0 {
            return Err(PipelineError::InvalidRange("number of days must be at least 1".to_string()));
        }
        let start_date = today
            .checked_sub_signed(Duration::days(days as i64 - 1))
            .ok_or_else(|| PipelineError::InvalidRange(format!("{} days before {} is out of range", days, today)))?;
        Ok(Self { start_date, end_date: today })
    }

    /// Number of calendar days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Same-length range ending the day before this one starts
    pub fn previous(&self) -> Result<Self, PipelineError> {
        let out_of_range = || PipelineError::InvalidRange(format!("no calendar period precedes {}", self));
        let end_date = self.start_date.pred_opt().ok_or_else(out_of_range)?;
        let start_date = end_date
            .checked_sub_signed(Duration::days(self.days() - 1))
            .ok_or_else(out_of_range)?;
        Ok(Self { start_date, end_date })
    }

    /// Split into consecutive sub-ranges of at most `max_days` days each
    pub fn chunks(&self, max_days: i64) -> Vec<DateRange> {
        let max_days = max_days.max(1);
        let mut chunks = Vec::new();
        let mut current_start = self.start_date;

        while current_start <= self.end_date {
            let current_end = current_start
                .checked_add_signed(Duration::days(max_days - 1))
                .map_or(self.end_date, |end| end.min(self.end_date));
            chunks.push(DateRange {
                start_date: current_start,
                end_date: current_end,
            });
            match current_end.succ_opt() {
                Some(next) => current_start = next,
                None => break,
            }
        }

        chunks
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start_date, self.end_date)
    }
}

/// Parse a user-supplied `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, PipelineError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| PipelineError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date", value)))
}

/// Parse a `date` dimension value; GA4 sends `YYYYMMDD`
pub fn parse_report_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

/// Resolve the effective range of a query.
///
/// Explicit dates win over `days`. A start date alone runs through `today`.
/// An end date without a start date is ignored.
pub fn resolve_range(
    today: NaiveDate,
    default_days: u32,
    days: Option<u32>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<DateRange, PipelineError> {
    match (start_date, end_date) {
        (Some(start), Some(end)) => DateRange::new(parse_date(start)?, parse_date(end)?),
        (Some(start), None) => DateRange::new(parse_date(start)?, today),
        _ => DateRange::last_n_days(today, days.unwrap_or(default_days)),
    }
}

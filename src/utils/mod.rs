pub mod dates;
pub mod errors;
pub mod format;
pub mod ratelimit;
pub mod table;

pub use dates::{DateRange, MAX_DAYS_PER_CALL};
pub use errors::PipelineError;
pub use format::{format_currency, format_delta};
pub use table::Table;

pub mod comparison_service;
pub mod pipeline;
pub mod revenue_service;
pub mod summary_service;
pub mod trends_service;
pub mod users_service;

#[cfg(test)]
pub(crate) mod testing;

pub use pipeline::{parse_response, Ga4Pipeline, RetryPolicy};

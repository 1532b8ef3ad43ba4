pub mod ga4;

//! Retry logic with exponential backoff

pub mod backoff;

pub use backoff::*;

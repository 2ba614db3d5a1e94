//! Error handling for notification delivery

pub mod notify_error;

pub use notify_error::*;

//! Utility functions and helpers

pub mod instrument;
pub mod logging;

pub use instrument::*;
pub use logging::*;

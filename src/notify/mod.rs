//! Trade notification rendering and delivery

pub mod dispatcher;
pub mod format;
pub mod transport;

pub use dispatcher::*;
pub use format::*;
pub use transport::*;

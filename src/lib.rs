//! Grid Trading Bot Support Library
//!
//! Formats trade notifications, delivers them to Telegram with bounded
//! retries and exponential backoff, and manages the rotating log stream plus
//! lightweight resource-usage instrumentation of async operations. Delivery
//! is best-effort by design: a failed notification is logged, never allowed
//! to abort the trading loop.

pub mod config;
pub mod errors;
pub mod notify;
pub mod retry;
pub mod utils;

// Re-export commonly used items
pub use config::{CONFIG, Config};
pub use errors::{NotifyError, NotifyResult};
pub use notify::{
    DeliveryOutcome, MessageTransport, NotificationDispatcher, NotificationRequest, ParseMode,
    TelegramTransport, TradeSide, format_trade_message,
};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use utils::{LoggingGuard, clean_old_logs, instrumented, run_log_cleanup, setup_logging};

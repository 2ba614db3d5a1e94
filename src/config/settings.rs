//! Bot configuration settings and environment variable handling

use std::env;
use std::path::PathBuf;

// Notification constants
pub const MESSAGE_MAX_CHARS: usize = 4000; // margin under Telegram's hard cap
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;
pub const TRUNCATION_MARKER: &str = "...";
pub const DEFAULT_NOTIFICATION_TITLE: &str = "交易通知";

// Retry constants
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_SECS: u64 = 2;
pub const DEFAULT_RETRY_MAX_DELAY_SECS: u64 = 10;
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 1.0;
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

// Logging constants
pub const DEFAULT_LOG_FILE_NAME: &str = "trading_system.log";
pub const DEFAULT_LOG_RETENTION_DAYS: u64 = 2;
pub const LOG_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    // Telegram credentials; either missing turns dispatch into a logged no-op
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    // Retry configuration
    pub retry_max_attempts: u32,
    pub retry_base_delay_secs: u64,
    // Logging configuration
    pub log_dir: PathBuf,
    pub log_file_name: String,
    pub log_retention_days: u64,
    pub log_level: String,
}

impl Config {
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        Self {
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            telegram_chat_id: env::var("TELEGRAM_CHAT_ID")
                .ok()
                .filter(|s| !s.is_empty()),
            retry_max_attempts: env::var("NOTIFY_RETRY_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS)
                .max(1)
                .min(MAX_RETRY_ATTEMPTS),
            retry_base_delay_secs: env::var("NOTIFY_RETRY_BASE_DELAY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_BASE_DELAY_SECS),
            log_dir: env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output/logs")),
            log_file_name: env::var("LOG_FILE_NAME")
                .unwrap_or_else(|_| DEFAULT_LOG_FILE_NAME.to_string()),
            log_retention_days: env::var("LOG_RETENTION_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_LOG_RETENTION_DAYS),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn has_telegram_credentials(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

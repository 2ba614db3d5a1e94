//! Best-effort notification dispatch with size policy and retry

use chrono::{DateTime, Local};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::transport::{MessageTransport, ParseMode, TelegramTransport};
use crate::config::{Config, DEFAULT_NOTIFICATION_TITLE, MESSAGE_MAX_CHARS, TRUNCATION_MARKER};
use crate::errors::NotifyError;
use crate::retry::{RetryPolicy, retry_with_backoff};

/// One notification to deliver. Built per send call, dropped afterwards.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub rendered_at: DateTime<Local>,
}

impl NotificationRequest {
    pub fn new(title: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            title: title.unwrap_or(DEFAULT_NOTIFICATION_TITLE).to_string(),
            body: body.into(),
            rendered_at: Local::now(),
        }
    }
}

#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(NotifyError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Delivers titled notifications through a chat transport.
///
/// Delivery is best-effort: every failure path is logged and folded into the
/// returned [`DeliveryOutcome`], never raised, so the caller's trading loop
/// cannot be aborted by a notification problem.
pub struct NotificationDispatcher<T> {
    transport: Option<T>,
    chat_id: Option<String>,
    policy: RetryPolicy,
}

impl NotificationDispatcher<TelegramTransport> {
    pub fn from_config(config: &Config) -> Self {
        if !config.has_telegram_credentials() {
            warn!("Telegram credentials incomplete; notifications will be skipped");
        }

        Self {
            transport: config
                .telegram_bot_token
                .as_deref()
                .map(TelegramTransport::new),
            chat_id: config.telegram_chat_id.clone(),
            policy: RetryPolicy::from_config(config),
        }
    }
}

impl<T: MessageTransport> NotificationDispatcher<T> {
    pub fn new(transport: T, chat_id: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            transport: Some(transport),
            chat_id: Some(chat_id.into()),
            policy,
        }
    }

    pub async fn send(&self, title: Option<&str>, body: &str) -> DeliveryOutcome {
        self.dispatch(NotificationRequest::new(title, body)).await
    }

    pub async fn dispatch(&self, request: NotificationRequest) -> DeliveryOutcome {
        // Correlates the attempt logs of interleaved concurrent dispatches
        let delivery_id = Uuid::new_v4();

        let (transport, chat_id) = match (&self.transport, &self.chat_id) {
            (Some(transport), Some(chat_id)) => (transport, chat_id),
            (None, _) => {
                let err = NotifyError::ConfigurationMissing {
                    missing: "TELEGRAM_BOT_TOKEN",
                };
                error!("Cannot send Telegram notification: {}", err);
                return DeliveryOutcome::Failed(err);
            }
            (_, None) => {
                let err = NotifyError::ConfigurationMissing {
                    missing: "TELEGRAM_CHAT_ID",
                };
                error!("Cannot send Telegram notification: {}", err);
                return DeliveryOutcome::Failed(err);
            }
        };

        // Truncation happens before the retry wrap, so every attempt sends
        // the identical payload.
        let text = enforce_size_limit(format!("*{}*\n\n{}", request.title, request.body));

        info!(
            "Sending Telegram notification: {} (delivery {})",
            request.title, delivery_id
        );

        let result = retry_with_backoff(&self.policy, "telegram notification", || {
            transport.send_message(chat_id, &text, ParseMode::Markdown)
        })
        .await;

        match result {
            Ok(()) => {
                info!(
                    "Telegram message delivered: {} (delivery {})",
                    request.title, delivery_id
                );
                DeliveryOutcome::Delivered
            }
            Err(e) if e.is_transport() => {
                error!(
                    "Telegram delivery failed for {} (delivery {}): {}",
                    request.title, delivery_id, e
                );
                DeliveryOutcome::Failed(e)
            }
            Err(e) => {
                error!(
                    "Unexpected error delivering {} (delivery {}): {:?}",
                    request.title, delivery_id, e
                );
                DeliveryOutcome::Failed(e)
            }
        }
    }
}

/// Caps the rendered text at [`MESSAGE_MAX_CHARS`] characters, appending the
/// continuation marker when anything was cut.
fn enforce_size_limit(text: String) -> String {
    let char_count = text.chars().count();
    if char_count <= MESSAGE_MAX_CHARS {
        return text;
    }

    warn!(
        "Notification message too long ({} chars), truncating to {}",
        char_count, MESSAGE_MAX_CHARS
    );
    let mut truncated: String = text.chars().take(MESSAGE_MAX_CHARS).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NotifyResult;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Default)]
    struct MockTransport {
        fail_times: u32,
        fail_unexpectedly: bool,
        calls: AtomicU32,
        sent: Mutex<Vec<String>>,
    }

    impl MockTransport {
        fn failing(fail_times: u32) -> Arc<Self> {
            Arc::new(Self {
                fail_times,
                ..Self::default()
            })
        }

        fn failing_unexpectedly(fail_times: u32) -> Arc<Self> {
            Arc::new(Self {
                fail_times,
                fail_unexpectedly: true,
                ..Self::default()
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_sent(&self) -> String {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl MessageTransport for Arc<MockTransport> {
        async fn send_message(
            &self,
            _chat_id: &str,
            text: &str,
            _parse_mode: ParseMode,
        ) -> NotifyResult<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.sent.lock().unwrap().push(text.to_string());
            if n > self.fail_times {
                Ok(())
            } else if self.fail_unexpectedly {
                Err(NotifyError::Unexpected {
                    context: format!("payload serialization died on call {n}"),
                    source: anyhow::anyhow!("corrupt buffer"),
                })
            } else {
                Err(NotifyError::transport(format!("flood control on call {n}")))
            }
        }
    }

    fn dispatcher(transport: Arc<MockTransport>) -> NotificationDispatcher<Arc<MockTransport>> {
        NotificationDispatcher::new(transport, "-100200300", RetryPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn short_message_goes_out_unchanged_on_first_attempt() {
        let transport = MockTransport::failing(0);
        let started = Instant::now();

        let outcome = dispatcher(transport.clone())
            .send(None, "网格已挂单，等待成交")
            .await;

        assert!(outcome.is_delivered());
        assert_eq!(transport.calls(), 1);
        assert_eq!(transport.last_sent(), "*交易通知*\n\n网格已挂单，等待成交");
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_body_is_truncated_before_sending() {
        let transport = MockTransport::failing(0);
        let body = "x".repeat(4500);

        let outcome = dispatcher(transport.clone()).send(None, &body).await;

        assert!(outcome.is_delivered());
        let sent = transport.last_sent();
        assert_eq!(sent.chars().count(), MESSAGE_MAX_CHARS + TRUNCATION_MARKER.len());
        assert!(sent.ends_with("..."));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_chat_id_skips_transport_entirely() {
        let transport = MockTransport::failing(0);
        let dispatcher = NotificationDispatcher {
            transport: Some(transport.clone()),
            chat_id: None,
            policy: RetryPolicy::default(),
        };

        let outcome = dispatcher.send(Some("成交"), "should not go out").await;

        assert_eq!(transport.calls(), 0);
        match outcome {
            DeliveryOutcome::Failed(NotifyError::ConfigurationMissing { missing }) => {
                assert_eq!(missing, "TELEGRAM_CHAT_ID");
            }
            other => panic!("expected configuration guard, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_token_skips_transport_entirely() {
        let dispatcher: NotificationDispatcher<Arc<MockTransport>> = NotificationDispatcher {
            transport: None,
            chat_id: Some("-100200300".to_string()),
            policy: RetryPolicy::default(),
        };

        let outcome = dispatcher.send(None, "should not go out").await;

        match outcome {
            DeliveryOutcome::Failed(NotifyError::ConfigurationMissing { missing }) => {
                assert_eq!(missing, "TELEGRAM_BOT_TOKEN");
            }
            other => panic!("expected configuration guard, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn from_config_without_credentials_hits_the_guard() {
        let config = Config {
            telegram_bot_token: None,
            telegram_chat_id: None,
            retry_max_attempts: 3,
            retry_base_delay_secs: 2,
            log_dir: std::path::PathBuf::from("output/logs"),
            log_file_name: "trading_system.log".to_string(),
            log_retention_days: 2,
            log_level: "info".to_string(),
        };

        let outcome = NotificationDispatcher::from_config(&config)
            .send(None, "should not go out")
            .await;

        match outcome {
            DeliveryOutcome::Failed(NotifyError::ConfigurationMissing { missing }) => {
                assert_eq!(missing, "TELEGRAM_BOT_TOKEN");
            }
            other => panic!("expected configuration guard, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_two_transport_failures() {
        let transport = MockTransport::failing(2);
        let started = Instant::now();

        let outcome = dispatcher(transport.clone())
            .send(Some("成交"), "买入 BNB/USDT @ 612.50")
            .await;

        assert!(outcome.is_delivered());
        assert_eq!(transport.calls(), 3);
        // two flat 2s backoffs under the default x1 policy
        assert_eq!(started.elapsed(), Duration::from_secs(4));
        // every retry attempt carried the identical payload
        let sent = transport.sent.lock().unwrap();
        assert!(sent.iter().all(|t| t == &sent[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fold_last_error_into_outcome() {
        let transport = MockTransport::failing(3);

        let outcome = dispatcher(transport.clone()).send(None, "down").await;

        assert_eq!(transport.calls(), 3);
        match outcome {
            DeliveryOutcome::Failed(NotifyError::Transport { description, .. }) => {
                assert_eq!(description, "flood control on call 3");
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_errors_are_retried_and_folded_into_outcome() {
        let transport = MockTransport::failing_unexpectedly(3);

        let outcome = dispatcher(transport.clone()).send(None, "down").await;

        // retried uniformly, same as a transport failure
        assert_eq!(transport.calls(), 3);
        match outcome {
            DeliveryOutcome::Failed(err @ NotifyError::Unexpected { .. }) => {
                assert!(!err.is_transport());
                assert!(err.to_string().contains("call 3"));
            }
            other => panic!("expected unexpected-kind failure, got {other:?}"),
        }
    }

    #[test]
    fn size_limit_is_a_noop_at_exactly_the_threshold() {
        let text = "y".repeat(MESSAGE_MAX_CHARS);
        assert_eq!(enforce_size_limit(text.clone()), text);
    }

    proptest! {
        #[test]
        fn enforced_text_never_exceeds_threshold_plus_marker(body in ".{0,6000}") {
            let out = enforce_size_limit(body);
            prop_assert!(out.chars().count() <= MESSAGE_MAX_CHARS + TRUNCATION_MARKER.len());
        }
    }
}

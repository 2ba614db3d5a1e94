//! Custom error types for notification delivery

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("missing notification configuration: {missing}")]
    ConfigurationMissing { missing: &'static str },

    #[error("telegram transport error: {description}")]
    Transport {
        description: String,
        status: Option<u16>,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("unexpected notification failure: {context}")]
    Unexpected {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl NotifyError {
    pub fn transport(description: impl Into<String>) -> Self {
        Self::Transport {
            description: description.into(),
            status: None,
            source: None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

pub type NotifyResult<T> = Result<T, NotifyError>;

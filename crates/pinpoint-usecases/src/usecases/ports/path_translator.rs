//! Path translation port.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TranslateError {
    pub message: String,
}

impl TranslateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Converts a host-native path into the form the agent's shell sees.
#[async_trait]
pub trait PathTranslator: Send + Sync {
    async fn translate(&self, path: &str) -> Result<String, TranslateError>;
}

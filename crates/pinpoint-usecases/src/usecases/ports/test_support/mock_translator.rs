use std::sync::Mutex;

use async_trait::async_trait;
use pinpoint_common::mutex_lock_or_recover;

use crate::usecases::ports::PathTranslator;
use crate::usecases::ports::TranslateError;

enum TranslatorBehavior {
    Prefix(String),
    Fail(String),
}

/// Records every input and either prefixes it or fails.
pub struct MockPathTranslator {
    behavior: TranslatorBehavior,
    calls: Mutex<Vec<String>>,
}

impl MockPathTranslator {
    /// `C:/app/a.tsx` with prefix `/mnt/c` becomes `/mnt/c/app/a.tsx`.
    pub fn mounting(prefix: impl Into<String>) -> Self {
        Self {
            behavior: TranslatorBehavior::Prefix(prefix.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: TranslatorBehavior::Fail(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        mutex_lock_or_recover(&self.calls).clone()
    }
}

#[async_trait]
impl PathTranslator for MockPathTranslator {
    async fn translate(&self, path: &str) -> Result<String, TranslateError> {
        mutex_lock_or_recover(&self.calls).push(path.to_string());
        match &self.behavior {
            TranslatorBehavior::Prefix(prefix) => {
                let rest = match path.split_once(':') {
                    Some((drive, rest)) if drive.len() == 1 => rest,
                    _ => path,
                };
                Ok(format!("{}{}", prefix, rest))
            }
            TranslatorBehavior::Fail(message) => Err(TranslateError::new(message.clone())),
        }
    }
}

//! Wire shapes of the bridge endpoint.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::domain::errors::BridgeError;

/// An edit instruction for one source location.
///
/// Wire form: `{ "prompt", "file", "line", "elementType" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub prompt: String,
    pub file: String,
    #[serde(deserialize_with = "line_from_string_or_number")]
    pub line: String,
    #[serde(rename = "elementType")]
    pub element_kind: String,
}

impl EditRequest {
    /// Decodes and validates a request body.
    pub fn from_json(body: &[u8]) -> Result<Self, BridgeError> {
        let request: EditRequest =
            serde_json::from_slice(body).map_err(|e| BridgeError::MalformedBody {
                reason: e.to_string(),
            })?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.prompt.trim().is_empty() {
            return Err(BridgeError::InvalidRequest {
                reason: "Prompt must not be empty".to_string(),
            });
        }
        if self.file.trim().is_empty() {
            return Err(BridgeError::InvalidRequest {
                reason: "File must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `file:line`, used in logs and busy messages.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

fn line_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Line {
        Text(String),
        Number(u64),
    }

    Ok(match Line::deserialize(deserializer)? {
        Line::Text(text) => text,
        Line::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    Success,
    Error,
}

/// The only response shape the bridge ever writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeResult {
    pub status: BridgeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BridgeResult {
    pub fn success() -> Self {
        Self {
            status: BridgeStatus::Success,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: BridgeStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BridgeStatus::Success
    }
}

impl From<&BridgeError> for BridgeResult {
    fn from(err: &BridgeError) -> Self {
        BridgeResult::error(err.to_string())
    }
}

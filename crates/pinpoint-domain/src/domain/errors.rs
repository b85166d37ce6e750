//! Bridge failure taxonomy.
//!
//! Every variant is terminal for its request. `Display` is the message
//! placed in the `BridgeResult` returned to the caller; `context()` carries
//! the structured fields logged host-side.

use pinpoint_common::ErrorCategory;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

/// Pipeline stage at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStage {
    Parse,
    Admission,
    PathTranslation,
    Spawn,
    Agent,
}

impl BridgeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeStage::Parse => "parse",
            BridgeStage::Admission => "admission",
            BridgeStage::PathTranslation => "path_translation",
            BridgeStage::Spawn => "spawn",
            BridgeStage::Agent => "agent",
        }
    }
}

impl std::fmt::Display for BridgeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnFailureKind {
    NotFound,
    PermissionDenied,
    Other,
}

impl SpawnFailureKind {
    pub fn from_io(kind: std::io::ErrorKind) -> Self {
        match kind {
            std::io::ErrorKind::NotFound => SpawnFailureKind::NotFound,
            std::io::ErrorKind::PermissionDenied => SpawnFailureKind::PermissionDenied,
            _ => SpawnFailureKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnFailureKind::NotFound => "not_found",
            SpawnFailureKind::PermissionDenied => "permission_denied",
            SpawnFailureKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Body was not an `EditRequest`-shaped JSON document.
    #[error("Invalid JSON body")]
    MalformedBody { reason: String },

    /// Well-formed JSON with unusable field values.
    #[error("{reason}")]
    InvalidRequest { reason: String },

    /// Another request holds the in-flight slot.
    #[error("Another edit request is already running ({location})")]
    Busy { location: String },

    /// The path-conversion helper failed or printed nothing usable.
    #[error("{reason}")]
    PathTranslation { path: String, reason: String },

    /// The agent process could not be launched.
    #[error("{reason}")]
    Spawn {
        program: String,
        kind: SpawnFailureKind,
        reason: String,
    },

    /// The agent ran and exited unsuccessfully.
    #[error("{}", describe_exit(.code))]
    AgentFailure { code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("Exit code {}", code),
        None => "Agent terminated by signal".to_string(),
    }
}

impl BridgeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::MalformedBody { .. } | BridgeError::InvalidRequest { .. } => {
                ErrorCategory::InvalidInput
            }
            BridgeError::Busy { .. } => ErrorCategory::Busy,
            BridgeError::PathTranslation { .. }
            | BridgeError::Spawn { .. }
            | BridgeError::AgentFailure { .. } => ErrorCategory::External,
        }
    }

    pub fn stage(&self) -> BridgeStage {
        match self {
            BridgeError::MalformedBody { .. } | BridgeError::InvalidRequest { .. } => {
                BridgeStage::Parse
            }
            BridgeError::Busy { .. } => BridgeStage::Admission,
            BridgeError::PathTranslation { .. } => BridgeStage::PathTranslation,
            BridgeError::Spawn { .. } => BridgeStage::Spawn,
            BridgeError::AgentFailure { .. } => BridgeStage::Agent,
        }
    }

    /// Structured diagnostic fields for host-side logs.
    pub fn context(&self) -> Value {
        match self {
            BridgeError::MalformedBody { reason } | BridgeError::InvalidRequest { reason } => {
                json!({ "reason": reason })
            }
            BridgeError::Busy { location } => json!({ "in_flight": location }),
            BridgeError::PathTranslation { path, reason } => {
                json!({ "path": path, "reason": reason })
            }
            BridgeError::Spawn {
                program,
                kind,
                reason,
            } => json!({ "program": program, "kind": kind.as_str(), "reason": reason }),
            BridgeError::AgentFailure { code } => json!({ "exit_code": code }),
        }
    }

    /// A hint for the operator reading the host log.
    pub fn suggestion(&self) -> String {
        match self {
            BridgeError::MalformedBody { .. } => {
                "Send a JSON body with prompt, file, line and elementType string fields."
                    .to_string()
            }
            BridgeError::InvalidRequest { .. } => {
                "Fill in the prompt before submitting the selection.".to_string()
            }
            BridgeError::Busy { .. } => {
                "Wait for the running agent to finish, or start the bridge with --allow-concurrent."
                    .to_string()
            }
            BridgeError::PathTranslation { .. } => {
                "Check that WSL is installed and 'wsl wslpath -u <path>' works in a terminal."
                    .to_string()
            }
            BridgeError::Spawn {
                program,
                kind: SpawnFailureKind::NotFound,
                ..
            } => format!("'{}' not found. Check that it is installed and in PATH.", program),
            BridgeError::Spawn {
                program,
                kind: SpawnFailureKind::PermissionDenied,
                ..
            } => format!("Cannot execute '{}'. Check file permissions.", program),
            BridgeError::Spawn { .. } => "The agent shell could not be started.".to_string(),
            BridgeError::AgentFailure { .. } => {
                "The agent reported a failure; its output is in the bridge terminal.".to_string()
            }
        }
    }

    /// Only admission conflicts are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::Busy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_failure_message() {
        let err = BridgeError::AgentFailure { code: Some(2) };
        assert_eq!(err.to_string(), "Exit code 2");
        assert_eq!(err.category(), ErrorCategory::External);
        assert_eq!(err.stage(), BridgeStage::Agent);
    }

    #[test]
    fn test_signal_termination_message() {
        let err = BridgeError::AgentFailure { code: None };
        assert_eq!(err.to_string(), "Agent terminated by signal");
        assert_eq!(err.context()["exit_code"], Value::Null);
    }

    #[test]
    fn test_spawn_failure_keeps_raw_message() {
        let err = BridgeError::Spawn {
            program: "bash".into(),
            kind: SpawnFailureKind::from_io(std::io::ErrorKind::NotFound),
            reason: "No such file or directory (os error 2)".into(),
        };
        assert_eq!(err.to_string(), "No such file or directory (os error 2)");
        assert_eq!(err.context()["kind"], "not_found");
        assert!(err.suggestion().contains("bash"));
    }

    #[test]
    fn test_input_errors_are_client_faults() {
        let malformed = BridgeError::MalformedBody {
            reason: "expected value".into(),
        };
        let busy = BridgeError::Busy {
            location: "a.tsx:1".into(),
        };
        assert!(malformed.category().is_client_fault());
        assert!(busy.category().is_client_fault());
        assert!(busy.is_retryable());
        assert!(!malformed.is_retryable());
    }

    #[test]
    fn test_translation_context() {
        let err = BridgeError::PathTranslation {
            path: "C:/app/a.tsx".into(),
            reason: "wslpath: not found".into(),
        };
        let ctx = err.context();
        assert_eq!(ctx["path"], "C:/app/a.tsx");
        assert_eq!(ctx["reason"], "wslpath: not found");
        assert_eq!(err.stage().as_str(), "path_translation");
    }
}

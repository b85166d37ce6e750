//! Error categories shared by every layer.
//!
//! Categories are transport-agnostic; the HTTP layer maps them to status
//! codes and the CLI maps them to process exit codes.

/// Error category for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller sent something unusable (client fault)
    InvalidInput,
    /// Another request currently owns the resource
    Busy,
    /// A helper or agent process failed (server fault)
    External,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Busy => "busy",
            ErrorCategory::External => "external",
        }
    }

    /// True when the fault lies with the caller rather than the host.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, ErrorCategory::InvalidInput | ErrorCategory::Busy)
    }
}

impl std::str::FromStr for ErrorCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invalid_input" => Ok(ErrorCategory::InvalidInput),
            "busy" => Ok(ErrorCategory::Busy),
            "external" => Ok(ErrorCategory::External),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! A concrete process invocation derived from one edit request.

use serde::Serialize;

/// Program plus argv; never persisted, lives for one spawned process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl AgentInvocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// POSIX-quoted rendering for logs and dry runs.
    pub fn display_line(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

impl std::fmt::Display for AgentInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_line())
    }
}

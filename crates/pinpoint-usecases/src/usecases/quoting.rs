//! Shell quoting for the agent command line.
//!
//! The instruction travels to a POSIX shell as one single-quoted word, so
//! nothing inside it (`$`, backticks, `;`, newlines) is ever interpreted.

use pinpoint_domain::EditRequest;

/// Flags passed to the agent ahead of the instruction.
pub const AGENT_MODE_FLAGS: [&str; 2] = ["-p", "--force"];

/// Wraps `text` in single quotes, rewriting each embedded `'` as `'\''`.
pub fn quote_single(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            quoted.push_str(r"'\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Agent binary and model, fixed for the lifetime of the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    binary: String,
    model: String,
}

impl AgentCommand {
    pub fn new(binary: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `<prompt> for <kind> @<path> on line <line>`.
    pub fn instruction(request: &EditRequest, resolved_path: &str) -> String {
        format!(
            "{} for {} @{} on line {}",
            request.prompt, request.element_kind, resolved_path, request.line
        )
    }

    /// The full line handed to the shell's `-c`.
    pub fn command_line(&self, instruction: &str) -> String {
        format!(
            "{} {} {} --model {}",
            shell_words::quote(&self.binary),
            AGENT_MODE_FLAGS.join(" "),
            quote_single(instruction),
            shell_words::quote(&self.model)
        )
    }
}

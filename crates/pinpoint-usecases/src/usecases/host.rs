//! Host environment profile.
//!
//! Chosen once at startup: whether file paths need translating and how the
//! agent's login shell is reached.

use std::str::FromStr;

use pinpoint_domain::AgentInvocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// The bridge already runs where the agent runs.
    Native,
    /// Windows host; the agent lives in WSL and sees POSIX paths.
    Wsl,
}

impl HostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostKind::Native => "native",
            HostKind::Wsl => "wsl",
        }
    }
}

impl std::fmt::Display for HostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured host choice; `Auto` resolves from the build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostSelection {
    #[default]
    Auto,
    Native,
    Wsl,
}

impl HostSelection {
    pub fn resolve(self) -> HostKind {
        match self {
            HostSelection::Auto if cfg!(windows) => HostKind::Wsl,
            HostSelection::Auto | HostSelection::Native => HostKind::Native,
            HostSelection::Wsl => HostKind::Wsl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHostSelectionError(String);

impl std::fmt::Display for ParseHostSelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown host '{}' (expected auto, native or wsl)", self.0)
    }
}

impl std::error::Error for ParseHostSelectionError {}

impl FromStr for HostSelection {
    type Err = ParseHostSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(HostSelection::Auto),
            "native" | "posix" => Ok(HostSelection::Native),
            "wsl" => Ok(HostSelection::Wsl),
            _ => Err(ParseHostSelectionError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProfile {
    kind: HostKind,
    shell: String,
    wsl_program: String,
}

impl HostProfile {
    pub fn new(kind: HostKind, shell: impl Into<String>) -> Self {
        Self {
            kind,
            shell: shell.into(),
            wsl_program: "wsl".to_string(),
        }
    }

    pub fn with_wsl_program(mut self, program: impl Into<String>) -> Self {
        self.wsl_program = program.into();
        self
    }

    pub fn kind(&self) -> HostKind {
        self.kind
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn needs_path_translation(&self) -> bool {
        self.kind == HostKind::Wsl
    }

    /// Rewrites `\` separators to `/` ahead of translation.
    pub fn normalize_path(&self, path: &str) -> String {
        match self.kind {
            HostKind::Native => path.to_string(),
            HostKind::Wsl => path.replace('\\', "/"),
        }
    }

    /// Wraps an already-quoted command line in a login shell invocation.
    pub fn invocation(&self, command_line: String) -> AgentInvocation {
        match self.kind {
            HostKind::Native => AgentInvocation::new(
                self.shell.clone(),
                vec!["-lc".to_string(), command_line],
            ),
            HostKind::Wsl => AgentInvocation::new(
                self.wsl_program.clone(),
                vec![self.shell.clone(), "-lc".to_string(), command_line],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_parse() {
        assert_eq!("WSL".parse::<HostSelection>().unwrap(), HostSelection::Wsl);
        assert_eq!("posix".parse::<HostSelection>().unwrap(), HostSelection::Native);
        assert_eq!("".parse::<HostSelection>().unwrap(), HostSelection::Auto);
        assert!("mac".parse::<HostSelection>().is_err());
    }

    #[test]
    fn test_explicit_selection_ignores_target() {
        assert_eq!(HostSelection::Wsl.resolve(), HostKind::Wsl);
        assert_eq!(HostSelection::Native.resolve(), HostKind::Native);
    }

    #[test]
    fn test_wsl_invocation() {
        let profile = HostProfile::new(HostKind::Wsl, "bash");
        let invocation = profile.invocation("agent -p 'x'".to_string());
        assert_eq!(invocation.program, "wsl");
        assert_eq!(invocation.args, vec!["bash", "-lc", "agent -p 'x'"]);
        assert!(profile.needs_path_translation());
    }

    #[test]
    fn test_native_invocation() {
        let profile = HostProfile::new(HostKind::Native, "sh");
        let invocation = profile.invocation("agent".to_string());
        assert_eq!(invocation.program, "sh");
        assert_eq!(invocation.args, vec!["-lc", "agent"]);
        assert!(!profile.needs_path_translation());
    }

    #[test]
    fn test_normalize_only_on_wsl() {
        let wsl = HostProfile::new(HostKind::Wsl, "bash");
        let native = HostProfile::new(HostKind::Native, "bash");
        assert_eq!(wsl.normalize_path(r"C:\app\src\A.tsx"), "C:/app/src/A.tsx");
        assert_eq!(native.normalize_path(r"odd\name.tsx"), r"odd\name.tsx");
    }
}

//! Bridge configuration.

use std::env;
use std::net::SocketAddr;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::usecases::AgentCommand;
use crate::usecases::HostKind;
use crate::usecases::HostProfile;
use crate::usecases::HostSelection;

pub const DEFAULT_PORT: u16 = 5757;
const DEFAULT_AGENT: &str = "agent";
const DEFAULT_MODEL: &str = "auto";
const DEFAULT_SHELL: &str = "bash";
const DEFAULT_PATH_HELPER: &str = "wsl";
const DEFAULT_MAX_REQUEST_BYTES: usize = 1_048_576;

/// Environment keys, in the order `pinpoint env` lists them.
pub const ENV_KEYS: [&str; 10] = [
    "PINPOINT_LISTEN",
    "PINPOINT_ALLOW_REMOTE",
    "PINPOINT_HOST",
    "PINPOINT_AGENT",
    "PINPOINT_AGENT_MODEL",
    "PINPOINT_SHELL",
    "PINPOINT_PATH_HELPER",
    "PINPOINT_SINGLE_FLIGHT",
    "PINPOINT_MAX_REQUEST",
    "PORT",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("refusing to bind non-loopback address {addr}; set PINPOINT_ALLOW_REMOTE=1 to allow")]
    RemoteBindRefused { addr: SocketAddr },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("max request size must be greater than zero")]
    ZeroRequestLimit,
}

#[derive(Debug, Clone, Serialize)]
pub struct BridgeConfig {
    listen: SocketAddr,
    allow_remote: bool,
    #[serde(serialize_with = "serialize_host")]
    host: HostSelection,
    agent: String,
    model: String,
    shell: String,
    path_helper: String,
    single_flight: bool,
    max_request_bytes: usize,
}

fn serialize_host<S: serde::Serializer>(host: &HostSelection, s: S) -> Result<S::Ok, S::Error> {
    let name = match host {
        HostSelection::Auto => "auto",
        HostSelection::Native => "native",
        HostSelection::Wsl => "wsl",
    };
    s.serialize_str(name)
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        let allow_remote = env_bool("PINPOINT_ALLOW_REMOTE").unwrap_or(false);
        let listen = parse_env_listen("PINPOINT_LISTEN")
            .or_else(listen_from_port)
            .unwrap_or_else(default_listen);
        let host = match env_string("PINPOINT_HOST") {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!(key = "PINPOINT_HOST", error = %e, "Invalid host; using auto");
                HostSelection::Auto
            }),
            None => HostSelection::Auto,
        };
        Self {
            listen,
            allow_remote,
            host,
            agent: env_string("PINPOINT_AGENT").unwrap_or_else(|| DEFAULT_AGENT.to_string()),
            model: env_string("PINPOINT_AGENT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            shell: env_string("PINPOINT_SHELL").unwrap_or_else(|| DEFAULT_SHELL.to_string()),
            path_helper: env_string("PINPOINT_PATH_HELPER")
                .unwrap_or_else(|| DEFAULT_PATH_HELPER.to_string()),
            single_flight: env_bool("PINPOINT_SINGLE_FLIGHT").unwrap_or(true),
            max_request_bytes: parse_env_usize("PINPOINT_MAX_REQUEST", DEFAULT_MAX_REQUEST_BYTES),
        }
    }

    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    pub fn with_allow_remote(mut self, allow: bool) -> Self {
        self.allow_remote = allow;
        self
    }

    pub fn with_host(mut self, host: HostSelection) -> Self {
        self.host = host;
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_path_helper(mut self, helper: impl Into<String>) -> Self {
        self.path_helper = helper.into();
        self
    }

    pub fn with_single_flight(mut self, single_flight: bool) -> Self {
        self.single_flight = single_flight;
        self
    }

    pub fn with_max_request_bytes(mut self, bytes: usize) -> Self {
        self.max_request_bytes = bytes;
        self
    }

    pub fn listen(&self) -> SocketAddr {
        self.listen
    }

    pub fn allow_remote(&self) -> bool {
        self.allow_remote
    }

    pub fn host(&self) -> HostSelection {
        self.host
    }

    pub fn path_helper(&self) -> &str {
        &self.path_helper
    }

    pub fn single_flight(&self) -> bool {
        self.single_flight
    }

    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    pub fn host_kind(&self) -> HostKind {
        self.host.resolve()
    }

    pub fn host_profile(&self) -> HostProfile {
        HostProfile::new(self.host_kind(), self.shell.clone()).with_wsl_program(&self.path_helper)
    }

    pub fn agent_command(&self) -> AgentCommand {
        AgentCommand::new(self.agent.clone(), self.model.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.allow_remote && !self.listen.ip().is_loopback() {
            return Err(ConfigError::RemoteBindRefused { addr: self.listen });
        }
        for (field, value) in [
            ("agent", &self.agent),
            ("model", &self.model),
            ("shell", &self.shell),
            ("path helper", &self.path_helper),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty { field });
            }
        }
        if self.max_request_bytes == 0 {
            return Err(ConfigError::ZeroRequestLimit);
        }
        Ok(())
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
}

fn env_string(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn env_bool(key: &str) -> Option<bool> {
    let value = env_string(key)?;
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(value = %value, key, "Invalid boolean config; using default");
            None
        }
    }
}

fn parse_env_listen(key: &str) -> Option<SocketAddr> {
    let value = env_string(key)?;
    match value.parse::<SocketAddr>() {
        Ok(addr) => Some(addr),
        Err(_) => {
            warn!(value = %value, key, "Invalid listen address; using default");
            None
        }
    }
}

fn listen_from_port() -> Option<SocketAddr> {
    let value = env_string("PORT")?;
    match value.parse::<u16>() {
        Ok(port) => Some(SocketAddr::from(([127, 0, 0, 1], port))),
        Err(_) => {
            warn!(value = %value, "Invalid PORT; using default listen address");
            None
        }
    }
}

fn parse_env_usize(key: &str, default: usize) -> usize {
    let Some(value) = env_string(key) else {
        return default;
    };
    match value.parse::<usize>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(value = %value, key, "Invalid numeric config; using default");
            default
        }
    }
}

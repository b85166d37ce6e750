//! Configuration and process-backed port implementations.

pub mod config;
pub mod process;

pub use config::BridgeConfig;
pub use config::ConfigError;
pub use process::CommandPathTranslator;
pub use process::ProcessAgentLauncher;

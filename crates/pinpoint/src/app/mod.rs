#![expect(clippy::print_stdout, reason = "CLI output is emitted here")]
#![expect(clippy::print_stderr, reason = "CLI output is emitted here")]

//! CLI application layer and composition root wiring.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::io::Read;

use anyhow::Context;
use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;
use serde_json::json;
use tracing::debug;

pub mod bridge;
pub mod commands;

use crate::app::bridge::ServerError;
use crate::app::bridge::build_dispatcher;
use crate::app::bridge::run_server;
use crate::app::commands::AgentOptions;
use crate::app::commands::Cli;
use crate::app::commands::Commands;
use crate::app::commands::InvocationArgs;
use crate::app::commands::ServeArgs;
use crate::app::commands::TagArgs;
use crate::common::Colors;
use crate::common::ErrorCategory;
use crate::common::color_init;
use crate::common::telemetry;
use crate::domain::BridgeError;
use crate::domain::EditRequest;
use crate::infra::BridgeConfig;
use crate::infra::ConfigError;
use crate::infra::config::ENV_KEYS;
use crate::usecases::SourceTagger;
use crate::usecases::TaggerError;

const PROGRAM_NAME: &str = "pinpoint";

/// Exit codes following sysexits.h conventions.
mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const USAGE: i32 = 64;
    pub const DATAERR: i32 = 65;
    pub const UNAVAILABLE: i32 = 69;
    pub const IOERR: i32 = 74;
}

pub struct Application;

impl Application {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self) -> Result<i32> {
        let exit_code = match self.execute() {
            Ok(()) => exit_codes::SUCCESS,
            Err(e) => self.handle_error(e),
        };
        Ok(exit_code)
    }

    fn execute(&self) -> Result<()> {
        let cli = Cli::parse();
        let default_level = match (&cli.command, cli.verbose) {
            (_, true) => "debug",
            (Commands::Serve(_), false) => "info",
            _ => "warn",
        };
        let _telemetry = telemetry::init_tracing(default_level);
        color_init(cli.no_color);
        debug!(command = ?cli.command, "CLI command parsed");

        match &cli.command {
            Commands::Serve(args) => self.serve(args),
            Commands::Invocation(args) => self.invocation(args),
            Commands::Tag(args) => self.tag(args),
            Commands::Env { json } => self.env(*json),
            Commands::Completions { shell } => {
                let mut cmd = Cli::command();
                generate(*shell, &mut cmd, PROGRAM_NAME, &mut io::stdout());
                Ok(())
            }
        }
    }

    fn serve(&self, args: &ServeArgs) -> Result<()> {
        let mut config = apply_agent_options(BridgeConfig::from_env(), &args.agent);
        if let Some(listen) = args.listen {
            config = config.with_listen(listen);
        }
        if args.allow_remote {
            config = config.with_allow_remote(true);
        }
        if args.allow_concurrent {
            config = config.with_single_flight(false);
        }
        run_server(&config).context("edit bridge stopped")?;
        Ok(())
    }

    fn invocation(&self, args: &InvocationArgs) -> Result<()> {
        let config = apply_agent_options(BridgeConfig::from_env(), &args.agent);
        let request = EditRequest {
            prompt: args.prompt.clone(),
            file: args.file.clone(),
            line: args.line.clone(),
            element_kind: args.element_type.clone(),
        };
        request.validate()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build runtime")?;
        let dispatcher = build_dispatcher(&config);
        let invocation = runtime.block_on(dispatcher.plan(&request))?;

        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "host": config.host_kind().as_str(),
                    "program": invocation.program,
                    "args": invocation.args,
                }))?
            );
        } else {
            println!("{}", invocation.display_line());
        }
        Ok(())
    }

    fn tag(&self, args: &TagArgs) -> Result<()> {
        let input = if args.input.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read syntax tree from stdin")?;
            buf
        } else {
            fs::read_to_string(&args.input)
                .with_context(|| format!("failed to read {}", args.input.display()))?
        };

        let tagger = SourceTagger::new(args.file.clone());
        let (output, stats) = tagger.tag_json(&input)?;
        println!("{}", output);
        eprintln!(
            "{} tagged {} of {} elements ({} already tagged, {} without position)",
            Colors::dim("Note:"),
            stats.tagged,
            stats.elements(),
            stats.already_tagged,
            stats.no_position
        );
        Ok(())
    }

    fn env(&self, json: bool) -> Result<()> {
        let config = BridgeConfig::from_env();
        let vars: BTreeMap<&str, Option<String>> = ENV_KEYS
            .iter()
            .map(|key| (*key, std::env::var(key).ok()))
            .collect();

        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "environment": vars,
                    "effective": config,
                    "host_kind": config.host_kind().as_str(),
                }))?
            );
            return Ok(());
        }

        println!("{}", Colors::bold("Environment:"));
        for key in ENV_KEYS {
            match std::env::var(key) {
                Ok(value) => println!("  {} = {}", key, value),
                Err(_) => println!("  {} {}", key, Colors::dim("(not set)")),
            }
        }
        println!();
        println!("{}", Colors::bold("Effective configuration:"));
        let effective = serde_json::to_value(&config)?;
        if let Some(fields) = effective.as_object() {
            for (name, value) in fields {
                println!("  {}: {}", name, value);
            }
        }
        println!("  host_kind: {}", Colors::info(config.host_kind().as_str()));
        Ok(())
    }

    fn handle_error(&self, error: anyhow::Error) -> i32 {
        eprintln!(
            "{}: {} {:#}",
            PROGRAM_NAME,
            Colors::error("Error:"),
            error
        );
        if let Some(bridge_error) = find_error::<BridgeError>(&error) {
            eprintln!("{} {}", Colors::dim("Hint:"), bridge_error.suggestion());
        }
        exit_code_for(&error)
    }
}

fn apply_agent_options(mut config: BridgeConfig, options: &AgentOptions) -> BridgeConfig {
    if let Some(host) = options.host {
        config = config.with_host(host.into());
    }
    if let Some(agent) = &options.agent {
        config = config.with_agent(agent.clone());
    }
    if let Some(model) = &options.model {
        config = config.with_model(model.clone());
    }
    if let Some(shell) = &options.shell {
        config = config.with_shell(shell.clone());
    }
    if let Some(helper) = &options.path_helper {
        config = config.with_path_helper(helper.clone());
    }
    config
}

fn find_error<T: std::error::Error + 'static>(error: &anyhow::Error) -> Option<&T> {
    error.chain().find_map(|source| source.downcast_ref::<T>())
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    if find_error::<ConfigError>(error).is_some() {
        return exit_codes::USAGE;
    }
    if let Some(server_error) = find_error::<ServerError>(error) {
        return match server_error {
            ServerError::Config(_) => exit_codes::USAGE,
            ServerError::Io { .. } => exit_codes::UNAVAILABLE,
        };
    }
    if let Some(bridge_error) = find_error::<BridgeError>(error) {
        return match bridge_error.category() {
            ErrorCategory::InvalidInput | ErrorCategory::Busy => exit_codes::USAGE,
            ErrorCategory::External => exit_codes::UNAVAILABLE,
        };
    }
    if find_error::<TaggerError>(error).is_some() {
        return exit_codes::DATAERR;
    }
    if find_error::<io::Error>(error).is_some() {
        return exit_codes::IOERR;
    }
    exit_codes::GENERAL_ERROR
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_for_config_error() {
        let err = anyhow::Error::new(ServerError::Config(ConfigError::ZeroRequestLimit));
        assert_eq!(exit_code_for(&err), exit_codes::USAGE);
    }

    #[test]
    fn test_exit_code_for_bind_failure() {
        let err = anyhow::Error::new(ServerError::Io {
            operation: "bind",
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        })
        .context("edit bridge stopped");
        assert_eq!(exit_code_for(&err), exit_codes::UNAVAILABLE);
    }

    #[test]
    fn test_exit_code_for_invalid_request() {
        let err = anyhow::Error::new(BridgeError::InvalidRequest {
            reason: "Prompt must not be empty".into(),
        });
        assert_eq!(exit_code_for(&err), exit_codes::USAGE);
    }

    #[test]
    fn test_exit_code_for_translation_failure() {
        let err = anyhow::Error::new(BridgeError::PathTranslation {
            path: "C:/a.tsx".into(),
            reason: "wslpath failed".into(),
        });
        assert_eq!(exit_code_for(&err), exit_codes::UNAVAILABLE);
    }

    #[test]
    fn test_exit_code_for_read_failure() {
        let err = anyhow::Error::new(io::Error::new(io::ErrorKind::NotFound, "missing"))
            .context("failed to read tree.json");
        assert_eq!(exit_code_for(&err), exit_codes::IOERR);
    }

    #[test]
    fn test_agent_options_override_config() {
        let options = AgentOptions {
            agent: Some("cursor-agent".into()),
            shell: Some("zsh".into()),
            ..Default::default()
        };
        let config = apply_agent_options(BridgeConfig::from_env(), &options);
        assert_eq!(config.agent_command().binary(), "cursor-agent");
        assert_eq!(config.host_profile().shell(), "zsh");
    }
}

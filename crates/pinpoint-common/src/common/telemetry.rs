#![expect(clippy::print_stderr, reason = "Tracing not initialized yet")]

//! Tracing setup for the pinpoint binary.
//!
//! Logs go to stderr, or to the file named by `PINPOINT_LOG`. Stdout is
//! reserved for command output (argv dumps, tagged trees, `env --json`).

use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const LOG_FILE_ENV: &str = "PINPOINT_LOG";
const LOG_FORMAT_ENV: &str = "PINPOINT_LOG_FORMAT";

/// Keeps the non-blocking file writer alive; drop it last in `main`.
#[derive(Debug)]
pub struct TelemetryGuard {
    _file_writer: Option<WorkerGuard>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelemetrySettings {
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl TelemetrySettings {
    pub fn from_env() -> Self {
        let format = std::env::var(LOG_FORMAT_ENV)
            .map(|value| value.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        Self {
            format: if format { LogFormat::Json } else { LogFormat::Text },
            file: std::env::var_os(LOG_FILE_ENV)
                .map(PathBuf::from)
                .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty()),
        }
    }
}

/// Where log lines end up, and whether they may carry ANSI colors.
struct LogSink {
    writer: BoxMakeWriter,
    file_writer: Option<WorkerGuard>,
    ansi: bool,
}

impl LogSink {
    fn stderr() -> Self {
        Self {
            writer: BoxMakeWriter::new(std::io::stderr),
            file_writer: None,
            ansi: std::io::stderr().is_terminal(),
        }
    }

    /// Appends to `path`; an unopenable file falls back to stderr.
    fn file_or_stderr(path: &Path) -> Self {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                Self {
                    writer: BoxMakeWriter::new(non_blocking),
                    file_writer: Some(guard),
                    ansi: false,
                }
            }
            Err(err) => {
                eprintln!(
                    "Warning: cannot write log file {} ({}); logging to stderr",
                    path.display(),
                    err
                );
                Self::stderr()
            }
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides `default_level`.
pub fn init_tracing(default_level: &str) -> TelemetryGuard {
    let settings = TelemetrySettings::from_env();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let sink = match settings.file.as_deref() {
        Some(path) => LogSink::file_or_stderr(path),
        None => LogSink::stderr(),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(sink.writer);
    let installed = match settings.format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())
        }
        LogFormat::Text => {
            tracing::subscriber::set_global_default(builder.with_ansi(sink.ansi).finish())
        }
    };

    TelemetryGuard {
        _file_writer: installed.ok().and(sink.file_writer),
    }
}

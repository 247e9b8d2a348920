//! Logging setup for the `contactbook` binary.
//!
//! Events are written to stderr so they never interleave with command output
//! on stdout. `RUST_LOG` wins over the configured level:
//!
//! ```ignore
//! use contactbook_core::tracing::{init_tracing, TracingConfig, TracingOutputFormat};
//!
//! init_tracing(TracingConfig::cli().with_format(TracingOutputFormat::Json))?;
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// How log events are rendered. Chosen with `log_format` in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingOutputFormat {
    /// One short line per event, no timestamp.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for the contactbook crates when `RUST_LOG` is unset.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Adds the target, file and line to every event.
    pub verbose: bool,
    /// Explicit filter directive, replaces both `RUST_LOG` and `level`.
    pub env_filter: Option<String>,
}

impl TracingConfig {
    /// Warnings and errors only.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            verbose: false,
            env_filter: None,
        }
    }

    /// What `-v` turns on.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            verbose: true,
            ..Self::cli()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Directive used when neither `env_filter` nor `RUST_LOG` is set.
    ///
    /// Targets match by prefix, so `contactbook` covers every crate of the
    /// workspace as well as the binary.
    pub fn default_directive(&self) -> String {
        format!("contactbook={}", self.level)
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.env_filter {
            return Ok(EnvFilter::try_new(directive)?);
        }
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive())))
    }
}

/// Installs the global subscriber. Call once, before the first event.
///
/// # Errors
///
/// Fails on an invalid `env_filter` directive or when a subscriber is
/// already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;

    let layer = match config.format {
        TracingOutputFormat::Compact => fmt::layer()
            .compact()
            .without_time()
            .with_writer(io::stderr)
            .with_target(config.verbose)
            .with_file(config.verbose)
            .with_line_number(config.verbose)
            .boxed(),
        TracingOutputFormat::Json => fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_file(config.verbose)
            .with_line_number(config.verbose)
            .boxed(),
    };

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(filter).with(layer))?;
    Ok(())
}

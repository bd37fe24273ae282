//! Tracing subscriber installation.
//!
//! [`TracingSetup`] installs a `tracing-subscriber` registry with an
//! [`EnvFilter`] and a `fmt` layer. Installing twice is harmless: the second
//! call leaves the first subscriber in place.
//!
//! # Example
//!
//! ```
//! use compound_core::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! // Development: pretty output with span enter/exit events.
//! TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .with_span_events(true)
//!     .init();
//!
//! // Production: JSON output, quieter for the binder.
//! let production = TracingSetup::new()
//!     .with_format(TracingFormat::Json)
//!     .with_env_filter("compound_system=info,compound_config=warn");
//! # let _ = production;
//! ```

use core::fmt;
use core::str::FromStr;
use serde::Deserialize;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

/// An unrecognized [`TracingFormat`] name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log format '{0}', expected pretty, compact or json")]
pub struct ParseFormatError(pub String);

impl FromStr for TracingFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ParseFormatError(s.to_owned())),
        }
    }
}

impl fmt::Display for TracingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the process-wide tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingSetup {
    /// Default maximum level, used when no filter directives are given.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Filter directives (e.g., "compound_system=debug,compound_config=warn").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// Creates a setup logging at `INFO` in the pretty format.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default maximum level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives, `target=level,target=level,...`.
    ///
    /// Invalid directives fall back to the default level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the default maximum level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the output format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Returns the filter directives, if any.
    #[must_use]
    pub fn env_filter(&self) -> Option<&str> {
        self.env_filter.as_deref()
    }

    fn filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.level.as_str());
        match &self.env_filter {
            Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|err| {
                tracing::warn!(directives = %directives, error = %err, "ignoring invalid log filter");
                fallback()
            }),
            None => fallback(),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        }
    }

    /// Installs the subscriber as the global default.
    ///
    /// Returns false if a global subscriber was already installed, in which
    /// case that one stays in place.
    pub fn init(&self) -> bool {
        let registry = tracing_subscriber::registry().with(self.filter());
        let layer = tracing_subscriber::fmt::layer().with_span_events(self.span_events());

        let installed = match self.format {
            TracingFormat::Pretty => registry.with(layer.pretty()).try_init().is_ok(),
            TracingFormat::Compact => registry.with(layer.compact()).try_init().is_ok(),
            TracingFormat::Json => registry.with(layer.json()).try_init().is_ok(),
        };

        if installed {
            tracing::debug!(
                level = %self.level,
                format = %self.format,
                "tracing initialized"
            );
        }
        installed
    }
}

//! Logging setup for service-injector
//!
//! The crate emits `tracing` events on the `service_injector` target.
//! This module installs a subscriber for them when one of the subscriber
//! features is enabled.
//!
//! # Features
//!
//! - `logging` - Emit events (default)
//! - `logging-json` - JSON structured output
//! - `logging-pretty` - Human-readable output
//!
//! # Example
//!
//! ```rust,ignore
//! use service_injector::logging;
//!
//! // JSON if logging-json is enabled, pretty otherwise
//! logging::init();
//!
//! // Or configure explicitly
//! logging::builder()
//!     .with_level(tracing::Level::TRACE)
//!     .injector_only()
//!     .compact()
//!     .init();
//! ```

use tracing::Level;

/// Target used by every event this crate emits
pub const TARGET: &str = "service_injector";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON structured logging
    #[default]
    Json,
    /// Multi-line human-readable output
    Pretty,
    /// Single-line output
    Compact,
}

/// Builder for the logging subscriber
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_thread_names: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
            target: None,
            with_thread_names: false,
        }
    }
}

impl LoggingBuilder {
    /// Create a new logging builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Only show events from the injector
    pub fn injector_only(mut self) -> Self {
        self.target = Some(TARGET);
        self
    }

    /// Include thread names, useful when tracing concurrent first builds
    pub fn with_thread_names(mut self) -> Self {
        self.with_thread_names = true;
        self
    }

    /// Use JSON structured logging format
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Use pretty logging format
    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Use compact single-line logging format
    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Install the subscriber as the global default.
    ///
    /// Falls back to pretty output when `Json` is requested without the
    /// `logging-json` feature.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = match self.target {
            Some(target) => EnvFilter::new(format!("{}={}", target, self.level)),
            None => EnvFilter::new(self.level.to_string()),
        };

        let layer = fmt::layer()
            .with_thread_names(self.with_thread_names)
            .with_target(true);

        match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init(),
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(layer.pretty())
                .init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(layer.pretty())
                .init(),
            LogFormat::Compact => tracing_subscriber::registry()
                .with(filter)
                .with(layer.compact())
                .init(),
        }
    }

    /// Initialize (no-op when subscriber features not available)
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Create a new logging builder
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Initialize logging with default settings
///
/// JSON when `logging-json` is enabled, pretty otherwise. No-op without a
/// subscriber feature.
pub fn init() {
    #[cfg(feature = "logging-json")]
    builder().json().init();

    #[cfg(not(feature = "logging-json"))]
    builder().pretty().init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = LoggingBuilder::default();
        assert_eq!(builder.level, Level::DEBUG);
        assert_eq!(builder.format, LogFormat::Json);
        assert!(builder.target.is_none());
        assert!(!builder.with_thread_names);
    }

    #[test]
    fn test_builder_chain() {
        let builder = LoggingBuilder::new()
            .with_level(Level::TRACE)
            .compact()
            .with_thread_names()
            .injector_only();

        assert_eq!(builder.level, Level::TRACE);
        assert_eq!(builder.format, LogFormat::Compact);
        assert!(builder.with_thread_names);
        assert_eq!(builder.target, Some("service_injector"));
    }
}

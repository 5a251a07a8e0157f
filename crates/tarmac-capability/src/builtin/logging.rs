//! Host logger client and a `tracing` layer that forwards to it.

use std::fmt::{self, Write as _};

use tarmac_core::{ClientConfig, HostBinding, HostCallError};
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::capability::{Capability, CapabilityId, standard_ids};
use crate::error::HostErrorExt;

/// Log levels, in increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Debugging detail.
    Debug,
    /// Informational.
    #[default]
    Info,
    /// Something unexpected that the function recovered from.
    Warn,
    /// A failure.
    Error,
}

impl LogLevel {
    /// The host function name for this level.
    pub fn function(&self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warn",
            LogLevel::Error => "Error",
        }
    }
}

impl From<&Level> for LogLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::TRACE => LogLevel::Trace,
            Level::DEBUG => LogLevel::Debug,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warn,
            Level::ERROR => LogLevel::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function())
    }
}

/// Errors returned by the logging client.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The host call failed.
    #[error(transparent)]
    Host(#[from] HostCallError),
}

impl HostErrorExt for LoggingError {
    fn host_error(&self) -> Option<&HostCallError> {
        match self {
            Self::Host(error) => Some(error),
        }
    }
}

/// Result type for logging operations.
pub type LoggingResult = Result<(), LoggingError>;

/// Client for the host `logging` capability.
#[derive(Debug, Clone)]
pub struct Logger {
    binding: HostBinding,
}

impl Logger {
    /// Create a client from the given configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            binding: config.bind(),
        }
    }

    /// Send `message` to the host at `level`.
    pub fn log(&self, level: LogLevel, message: &str) -> LoggingResult {
        self.binding
            .invoke_raw(self.id().as_str(), level.function(), message.as_bytes())?;
        Ok(())
    }

    /// Log at info level.
    pub fn info(&self, message: &str) -> LoggingResult {
        self.log(LogLevel::Info, message)
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) -> LoggingResult {
        self.log(LogLevel::Warn, message)
    }

    /// Log at error level.
    pub fn error(&self, message: &str) -> LoggingResult {
        self.log(LogLevel::Error, message)
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) -> LoggingResult {
        self.log(LogLevel::Debug, message)
    }

    /// Log at trace level.
    pub fn trace(&self, message: &str) -> LoggingResult {
        self.log(LogLevel::Trace, message)
    }
}

impl Capability for Logger {
    fn id(&self) -> CapabilityId {
        standard_ids::LOGGING
    }

    fn namespace(&self) -> &str {
        self.binding.namespace()
    }
}

/// Forwards `tracing` events to the host logger.
///
/// Events from the SDK's own crates (`tarmac`, `tarmac_core`,
/// `tarmac_capability` and their modules) are skipped, since they would
/// otherwise be sent back through the host call they describe.
///
/// ```ignore
/// use tracing_subscriber::prelude::*;
///
/// tracing_subscriber::registry()
///     .with(HostLogLayer::new(Logger::new(&ClientConfig::new())))
///     .init();
/// ```
#[derive(Debug, Clone)]
pub struct HostLogLayer {
    logger: Logger,
    min_level: LogLevel,
}

impl HostLogLayer {
    /// Forward events at info level and above.
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            min_level: LogLevel::Info,
        }
    }

    /// Set the minimum level forwarded to the host.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }
}

const SDK_CRATES: &[&str] = &["tarmac", "tarmac_core", "tarmac_capability"];

fn is_sdk_target(target: &str) -> bool {
    let krate = target.split_once("::").map_or(target, |(krate, _)| krate);
    SDK_CRATES.contains(&krate)
}

impl<S: Subscriber> Layer<S> for HostLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_sdk_target(metadata.target()) {
            return;
        }
        let level = LogLevel::from(metadata.level());
        if level < self.min_level {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        // Nowhere left to report a failure to.
        let _ = self.logger.log(level, &visitor.finish());
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
            return;
        }
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={:?}", field.name(), value);
    }
}

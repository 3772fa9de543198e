//! Logging backends
//!
//! The sink talks to a backend through [`BackendLogger`]. The stock backend
//! forwards into the `log` facade, so events end up wherever the process's
//! installed logger (env_logger in the CLI) writes.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::BackendError;

/// A leveled logging backend
pub trait BackendLogger: Send + Sync {
    /// Write one entry. `level` is `None` when the event type has no configured level.
    fn log(&self, level: Option<&str>, message: &str, metadata: &Value) -> Result<(), BackendError>;

    /// Error-level entry point, target of a redirected error channel
    fn error(&self, message: &str, args: &[Value]) -> Result<(), BackendError>;

    /// Whether the backend can accept entries at all
    fn is_usable(&self) -> bool {
        true
    }
}

/// Map a level name onto the `log` facade's levels
pub fn parse_level(name: &str) -> Option<log::Level> {
    match name.to_lowercase().as_str() {
        "error" => Some(log::Level::Error),
        "warn" | "warning" => Some(log::Level::Warn),
        "info" => Some(log::Level::Info),
        "debug" | "verbose" => Some(log::Level::Debug),
        "trace" | "silly" => Some(log::Level::Trace),
        _ => None,
    }
}

/// Append metadata to a message unless it is empty
pub fn render(message: &str, metadata: &Value) -> String {
    let empty = match metadata {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };

    if empty { message.to_string() } else { format!("{} {}", message, metadata) }
}

/// Join an error message and its arguments: strings verbatim, other values as JSON
pub fn render_args(message: &str, args: &[Value]) -> String {
    let mut line = message.to_string();
    for arg in args {
        line.push(' ');
        match arg {
            Value::String(s) => line.push_str(s),
            other => line.push_str(&other.to_string()),
        }
    }
    line
}

/// Backend that forwards into the `log` facade
#[derive(Debug, Clone)]
pub struct LogFacadeLogger {
    target: String,
}

impl LogFacadeLogger {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for LogFacadeLogger {
    fn default() -> Self {
        Self::new("monlog")
    }
}

impl BackendLogger for LogFacadeLogger {
    fn log(&self, level: Option<&str>, message: &str, metadata: &Value) -> Result<(), BackendError> {
        let lvl = level
            .and_then(parse_level)
            .ok_or_else(|| BackendError::UnknownLevel(level.map(str::to_string)))?;

        log::log!(target: self.target.as_str(), lvl, "{}", render(message, metadata));
        Ok(())
    }

    fn error(&self, message: &str, args: &[Value]) -> Result<(), BackendError> {
        log::error!(target: self.target.as_str(), "{}", render_args(message, args));
        Ok(())
    }
}

/// Named backends, resolved before a sink is built
#[derive(Default)]
pub struct LoggerRegistry {
    loggers: HashMap<String, Arc<dyn BackendLogger>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `log` facade backend under the name `log`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("log", Arc::new(LogFacadeLogger::default()));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, logger: Arc<dyn BackendLogger>) {
        let name = name.into();
        log::debug!("Registered logger backend: {}", name);
        self.loggers.insert(name, logger);
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn BackendLogger>> {
        self.loggers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.loggers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry").field("names", &self.names()).finish()
    }
}

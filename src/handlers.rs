//! Per-type event formatting
//!
//! A handler turns a raw event into a displayable message and optional
//! metadata. The table is keyed by event type name; types without an entry are
//! ignored by the sink.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::event::{Event, EventKind};

/// Output of a handler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub message: Option<String>,
    pub metadata: Option<Value>,
}

impl Payload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Message, or empty string when the handler left it out
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    /// Metadata, or an empty value when the handler left it out
    pub fn metadata_or_default(&self) -> &Value {
        self.metadata.as_ref().unwrap_or(&Value::Null)
    }
}

pub type Handler = Box<dyn Fn(&Event) -> Payload + Send + Sync>;

/// Mapping from event type name to handler
pub struct HandlerTable {
    handlers: HashMap<String, Handler>,
}

impl HandlerTable {
    /// A table with no handlers; every event is ignored
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Handlers for ops, response, log, error and request events
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        table.register(EventKind::Ops.as_str(), format_ops);
        table.register(EventKind::Response.as_str(), format_response);
        table.register(EventKind::Log.as_str(), format_log);
        table.register(EventKind::Error.as_str(), format_error);
        table.register(EventKind::Request.as_str(), format_request);
        table
    }

    /// Register (or replace) the handler for an event type
    pub fn register<F>(&mut self, event_type: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Event) -> Payload + Send + Sync + 'static,
    {
        self.handlers.insert(event_type.into(), Box::new(handler));
        self
    }

    pub fn with<F>(mut self, event_type: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Event) -> Payload + Send + Sync + 'static,
    {
        self.register(event_type, handler);
        self
    }

    pub fn remove(&mut self, event_type: &str) -> bool {
        self.handlers.remove(event_type).is_some()
    }

    pub fn get(&self, event_type: &str) -> Option<&Handler> {
        self.handlers.get(event_type)
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Registered type names, sorted
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("event_types", &self.event_types())
            .finish()
    }
}

/// Render a JSON value for a message: strings verbatim, everything else as JSON
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Copy the listed fields into a metadata object, skipping absent ones
fn pick(event: &Event, keys: &[&str]) -> Map<String, Value> {
    let mut meta = Map::new();
    for key in keys {
        if let Some(value) = event.get(key) {
            meta.insert((*key).to_string(), value.clone());
        }
    }
    meta
}

/// Finish metadata: stamp the event time and collapse an empty object
fn finish(event: &Event, mut meta: Map<String, Value>) -> Option<Value> {
    if let Some(stamp) = event
        .get("timestamp")
        .and_then(Value::as_i64)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
    {
        meta.insert("timestamp".to_string(), Value::String(stamp.to_rfc3339()));
    }

    if meta.is_empty() { None } else { Some(Value::Object(meta)) }
}

pub fn format_ops(event: &Event) -> Payload {
    const MB: f64 = 1024.0 * 1024.0;

    let rss_mb = event
        .lookup("proc.mem.rss")
        .and_then(Value::as_f64)
        .map(|rss| (rss / MB).round().to_string())
        .unwrap_or_else(|| "?".to_string());

    let uptime = event.lookup("proc.uptime").map(display).unwrap_or_else(|| "?".to_string());

    let load = match event.lookup("os.load") {
        Some(Value::Array(values)) => values.iter().map(display).collect::<Vec<_>>().join(","),
        Some(other) => display(other),
        None => String::new(),
    };

    let message = format!("memory: {}Mb, uptime (seconds): {}, load: [{}]", rss_mb, uptime, load);

    Payload {
        message: Some(message),
        metadata: finish(event, pick(event, &["proc", "os", "load"])),
    }
}

pub fn format_response(event: &Event) -> Payload {
    let mut parts = Vec::new();

    if let Some(method) = event.get_str("method") {
        parts.push(method.to_uppercase());
    }
    if let Some(path) = event.get_str("path") {
        parts.push(path.to_string());
    }
    if let Some(query) = event.get("query")
        && query.as_object().is_some_and(|q| !q.is_empty())
    {
        parts.push(query.to_string());
    }
    if let Some(status) = event.get("statusCode") {
        parts.push(display(status));
    }
    if let Some(elapsed) = event.get("responseTime") {
        parts.push(format!("({}ms)", display(elapsed)));
    }

    let line = parts.join(" ");
    let message = match event.get_str("instance") {
        Some(instance) => format!("{}: {}", instance, line),
        None => line,
    };

    Payload {
        message: Some(message),
        metadata: finish(event, pick(event, &["id", "statusCode", "responseTime", "source"])),
    }
}

pub fn format_log(event: &Event) -> Payload {
    Payload {
        message: event.get("data").map(display),
        metadata: finish(event, pick(event, &["tags"])),
    }
}

pub fn format_error(event: &Event) -> Payload {
    let message = event.get_str("error.message").unwrap_or("");
    let stack = event.get_str("error.stack").unwrap_or("");

    Payload {
        message: Some(format!("message: {} stack: {}", message, stack)),
        metadata: finish(event, pick(event, &["id", "url", "method"])),
    }
}

pub fn format_request(event: &Event) -> Payload {
    let mut parts = Vec::new();

    if let Some(method) = event.get_str("method") {
        parts.push(method.to_uppercase());
    }
    if let Some(path) = event.get_str("path") {
        parts.push(path.to_string());
    }
    if let Some(data) = event.get("data") {
        parts.push(display(data));
    }

    Payload {
        message: Some(parts.join(" ")),
        metadata: finish(event, pick(event, &["id", "tags"])),
    }
}

//! Monitoring events
//!
//! An event is a JSON object with an `event` field naming its type and any
//! number of type-specific fields next to it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event types emitted by the monitoring facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Ops,
    Response,
    Log,
    Error,
    Request,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Ops,
        EventKind::Response,
        EventKind::Log,
        EventKind::Error,
        EventKind::Request,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ops" => Some(Self::Ops),
            "response" => Some(Self::Response),
            "log" => Some(Self::Log),
            "error" => Some(Self::Error),
            "request" => Some(Self::Request),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ops => "ops",
            Self::Response => "response",
            Self::Log => "log",
            Self::Error => "error",
            Self::Request => "request",
        }
    }
}

/// A single monitoring event
///
/// Read-only once built; fields are reached through the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Type name, e.g. `response`
    #[serde(rename = "event")]
    event_type: String,
    /// Everything else the source attached
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            fields: Map::new(),
        }
    }

    /// Build an event from a JSON object carrying an `event` field
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_str(&self.event_type)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Follow a dotted path such as `proc.mem.rss`
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.fields.get(first)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(|v| v.as_str())
    }
}

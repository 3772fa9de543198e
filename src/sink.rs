//! Event sink
//!
//! Takes one monitoring event at a time, formats it with the handler for its
//! type and forwards it to the backend at the level configured for that type.

use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{BackendError, SinkError};
use crate::error_channel::ErrorChannel;
use crate::event::Event;
use crate::handlers::HandlerTable;
use crate::levels::LevelConfig;
use crate::logger::BackendLogger;

/// Single-item push consumer of monitoring events
pub trait EventConsumer {
    fn accept(&self, event: &Event) -> Result<(), BackendError>;
}

/// Construction options for [`create_sink`]
#[derive(Default)]
pub struct SinkOptions {
    /// Partial level table merged over the defaults
    pub levels: Option<IndexMap<String, String>>,
    /// Handler table; the default table when absent
    pub handlers: Option<Arc<HandlerTable>>,
    /// Channel to redirect to the backend's error entry point
    pub error_channel: Option<ErrorChannel>,
}

impl SinkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_levels<I, K, V>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let overrides = self.levels.get_or_insert_with(IndexMap::new);
        for (event_type, level) in levels {
            overrides.insert(event_type.into(), level.into());
        }
        self
    }

    pub fn with_handlers(mut self, handlers: HandlerTable) -> Self {
        self.handlers = Some(Arc::new(handlers));
        self
    }

    pub fn with_shared_handlers(mut self, handlers: Arc<HandlerTable>) -> Self {
        self.handlers = Some(handlers);
        self
    }

    pub fn with_error_channel(mut self, channel: ErrorChannel) -> Self {
        self.error_channel = Some(channel);
        self
    }

    /// Redirect the process-wide error channel
    pub fn with_global_error_channel(self) -> Self {
        self.with_error_channel(ErrorChannel::global())
    }
}

/// Formats events and forwards them to a backend
pub struct Sink {
    logger: Arc<dyn BackendLogger>,
    handlers: Arc<HandlerTable>,
    levels: LevelConfig,
}

/// Build a sink around a resolved backend
///
/// Fails with [`SinkError::InvalidLogger`] when no backend was resolved or the
/// backend reports itself unusable. When `options.error_channel` is set, that
/// channel is redirected to the backend before returning.
pub fn create_sink(logger: Option<Arc<dyn BackendLogger>>, options: SinkOptions) -> Result<Sink, SinkError> {
    let logger = logger.ok_or_else(|| SinkError::InvalidLogger("no logger supplied".to_string()))?;
    if !logger.is_usable() {
        return Err(SinkError::InvalidLogger("logger cannot accept entries".to_string()));
    }

    let levels = match options.levels {
        Some(overrides) => LevelConfig::with_overrides(overrides),
        None => LevelConfig::default(),
    };

    let handlers = options.handlers.unwrap_or_else(|| Arc::new(HandlerTable::with_defaults()));

    if let Some(channel) = options.error_channel {
        channel.redirect(Arc::clone(&logger));
        log::debug!("Error channel redirected to sink backend");
    }

    log::debug!(
        "Sink created: {} handlers, {} level entries",
        handlers.len(),
        levels.len()
    );

    Ok(Sink {
        logger,
        handlers,
        levels,
    })
}

impl Sink {
    /// Process one event
    ///
    /// Unknown types are dropped without a backend call. Backend failures are
    /// returned as-is.
    pub fn write(&self, event: &Event) -> Result<(), BackendError> {
        let Some(handler) = self.handlers.get(event.event_type()) else {
            return Ok(());
        };

        let payload = handler(event);
        let level = self.levels.get(event.event_type());

        self.logger
            .log(level, payload.message_or_default(), payload.metadata_or_default())
    }

    pub fn levels(&self) -> &LevelConfig {
        &self.levels
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    /// Whether `write` would forward an event of this type
    pub fn handles(&self, event_type: &str) -> bool {
        self.handlers.contains(event_type)
    }
}

impl EventConsumer for Sink {
    fn accept(&self, event: &Event) -> Result<(), BackendError> {
        self.write(event)
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("handlers", &self.handlers)
            .field("levels", &self.levels)
            .finish()
    }
}

/// Sink whose writes reach the backend one at a time
///
/// For upstreams feeding events from several threads into a backend that is
/// not safe to call concurrently. Writes are delivered in lock order.
#[derive(Debug)]
pub struct SerialSink {
    inner: Mutex<Sink>,
}

impl SerialSink {
    pub fn new(sink: Sink) -> Self {
        Self { inner: Mutex::new(sink) }
    }

    pub fn write(&self, event: &Event) -> Result<(), BackendError> {
        let sink = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write(event)
    }

    pub fn into_inner(self) -> Sink {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventConsumer for SerialSink {
    fn accept(&self, event: &Event) -> Result<(), BackendError> {
        self.write(event)
    }
}

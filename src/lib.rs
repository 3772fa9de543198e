//! monlog: route web-server monitoring events into a leveled logger
//!
//! Events (`ops`, `response`, `log`, `error`, `request`) are pushed into a
//! [`Sink`] one at a time. The sink formats each with the handler registered
//! for its type and forwards it to a [`BackendLogger`] at the level configured
//! for that type. Types without a handler are ignored.

pub mod error;
pub mod error_channel;
pub mod event;
pub mod handlers;
pub mod levels;
pub mod logger;
pub mod sink;

pub use error::{BackendError, SinkError};
pub use error_channel::{ErrorChannel, report_error};
pub use event::{Event, EventKind};
pub use handlers::{HandlerTable, Payload};
pub use levels::LevelConfig;
pub use logger::{BackendLogger, LogFacadeLogger, LoggerRegistry};
pub use sink::{EventConsumer, SerialSink, Sink, SinkOptions, create_sink};

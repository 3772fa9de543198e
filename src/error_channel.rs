//! Generic error output channel
//!
//! Components that have no logger of their own report errors here. Until a
//! backend is attached the channel writes to stderr; once a sink redirects it,
//! every report goes to that backend's `error` entry point instead.
//!
//! [`ErrorChannel::global`] is the process-wide channel. Redirecting it is a
//! process-wide side effect; tests should use their own [`ErrorChannel::new`].

use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::BackendError;
use crate::logger::{BackendLogger, render_args};

static GLOBAL: Lazy<ErrorChannel> = Lazy::new(ErrorChannel::new);

/// Shared handle to an error channel; clones point at the same channel
#[derive(Clone, Default)]
pub struct ErrorChannel {
    target: Arc<RwLock<Option<Arc<dyn BackendLogger>>>>,
}

impl ErrorChannel {
    /// A fresh channel writing to stderr
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide channel
    pub fn global() -> ErrorChannel {
        GLOBAL.clone()
    }

    /// Route all further reports to `logger`
    pub fn redirect(&self, logger: Arc<dyn BackendLogger>) {
        let mut target = self.target.write().unwrap_or_else(PoisonError::into_inner);
        *target = Some(logger);
    }

    /// Go back to stderr, returning the backend that was attached
    pub fn restore(&self) -> Option<Arc<dyn BackendLogger>> {
        let mut target = self.target.write().unwrap_or_else(PoisonError::into_inner);
        target.take()
    }

    pub fn is_redirected(&self) -> bool {
        self.target.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Report an error through the channel
    pub fn error(&self, message: &str, args: &[Value]) -> Result<(), BackendError> {
        let target = self.target.read().unwrap_or_else(PoisonError::into_inner).clone();

        match target {
            Some(logger) => logger.error(message, args),
            None => {
                eprintln!("{}", render_args(message, args));
                Ok(())
            }
        }
    }
}

impl fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("redirected", &self.is_redirected())
            .finish()
    }
}

/// Report an error through the process-wide channel
pub fn report_error(message: &str, args: &[Value]) -> Result<(), BackendError> {
    GLOBAL.error(message, args)
}

//! Error reporting sink
//!
//! Errors raised by caller-supplied code (event callbacks, filters, style
//! functions) never propagate out of a dispatch pass. They are wrapped and
//! handed to an [`ErrorReporter`] that the owning component received at
//! construction time.

use crate::MapError;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

/// Receives errors that were caught at a dispatch boundary
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &MapError);
}

/// Error callback type
pub type ErrorCallback = Arc<dyn Fn(&MapError) -> crate::Result<()> + Send + Sync>;

/// Discards every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _error: &MapError) {}
}

/// Logs each reported error and fans it out to registered callbacks
pub struct ErrorHandler {
    level: Mutex<log::Level>,
    callbacks: Mutex<Vec<(u64, ErrorCallback)>>,
    next_callback_id: AtomicU64,
}

impl std::fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("level", &self.level())
            .field("callbacks", &lock(&self.callbacks).len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self {
            level: Mutex::new(log::Level::Error),
            callbacks: Mutex::new(Vec::new()),
            next_callback_id: AtomicU64::new(1),
        }
    }

    /// Sets the log level reported errors are written at
    pub fn set_log_level(&self, level: log::Level) {
        *lock(&self.level) = level;
    }

    pub fn level(&self) -> log::Level {
        *lock(&self.level)
    }

    /// Registers an error callback, returning an id for later removal
    pub fn add_error_callback<F>(&self, callback: F) -> u64
    where
        F: Fn(&MapError) -> crate::Result<()> + Send + Sync + 'static,
    {
        let id = self.next_callback_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.callbacks).push((id, Arc::new(callback)));
        id
    }

    pub fn remove_error_callback(&self, id: u64) -> bool {
        let mut callbacks = lock(&self.callbacks);
        let before = callbacks.len();
        callbacks.retain(|(callback_id, _)| *callback_id != id);
        callbacks.len() != before
    }

    pub fn callback_count(&self) -> usize {
        lock(&self.callbacks).len()
    }

    fn log_error(&self, error: &MapError) {
        let context = error
            .context()
            .map(|c| c.to_string())
            .unwrap_or_default();
        log::log!(self.level(), "[{}] {} {}", error.kind(), error.message(), context);
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for ErrorHandler {
    fn report(&self, error: &MapError) {
        self.log_error(error);

        // Snapshot so a callback may register or remove callbacks
        let callbacks: Vec<ErrorCallback> =
            lock(&self.callbacks).iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            if let Err(callback_error) = callback(error) {
                log::error!("Error in error callback: {}", callback_error);
            }
        }
    }
}

/// The sink components fall back to when none is supplied
pub fn default_reporter() -> Arc<dyn ErrorReporter> {
    Arc::new(ErrorHandler::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_callbacks_receive_reports() {
        let handler = ErrorHandler::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let id = handler.add_error_callback(move |error| {
            sink.lock().unwrap().push(error.kind());
            Ok(())
        });

        handler.report(&MapError::component("boom"));
        assert_eq!(*seen.lock().unwrap(), vec![ErrorKind::Component]);

        assert!(handler.remove_error_callback(id));
        assert!(!handler.remove_error_callback(id));

        handler.report(&MapError::validation("ignored"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failing_callback_does_not_stop_others() {
        let handler = ErrorHandler::new();
        let calls = Arc::new(Mutex::new(0));

        let failing = handler.add_error_callback(|_| Err(MapError::component("callback broke")));
        let counter = calls.clone();
        let counting = handler.add_error_callback(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });
        assert_ne!(failing, counting);

        handler.report(&MapError::map("missing target"));
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(handler.callback_count(), 2);
    }

    #[test]
    fn test_log_level() {
        let handler = ErrorHandler::new();
        assert_eq!(handler.level(), log::Level::Error);
        handler.set_log_level(log::Level::Warn);
        assert_eq!(handler.level(), log::Level::Warn);
    }
}

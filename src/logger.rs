//! The logging collaborator.
//!
//! A container reports missing dependencies and failed asynchronous factories
//! to whatever [`Logger`] is registered under its logger name (`"logger"` by
//! default). Nothing is reported when no logger is registered.

/// Sink for container warnings and errors. Both calls are fire-and-forget.
pub trait Logger: Send + Sync {
    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Forwards container reports to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "injecta", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "injecta", "{}", message);
    }
}

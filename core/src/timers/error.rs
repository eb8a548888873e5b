//! Error types for timer operations

use thiserror::Error;

/// Error type handlers return from a firing
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced to callers scheduling timers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("invalid repeat time {period} for interval timer {handler}")]
    InvalidRepeatTime { handler: String, period: i64 },
}

/// A handler that failed while firing
///
/// Only used for diagnostics: the dispatcher logs it and moves on to the next
/// due timer.
#[derive(Debug, Error)]
pub enum HandlerFailure {
    #[error("{0}")]
    Returned(HandlerError),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerFailure {
    /// Build from a payload caught by `catch_unwind`
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }

    /// Cause chain of the failure, one indented line per cause
    pub fn trace(&self) -> String {
        let mut lines = Vec::new();
        if let Self::Returned(err) = self {
            let mut cause = err.source();
            while let Some(c) = cause {
                lines.push(format!("  caused by: {c}"));
                cause = c.source();
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn trace_lists_causes() {
        let failure = HandlerFailure::Returned(Box::new(Outer(Inner)));
        assert_eq!(failure.to_string(), "outer");
        assert_eq!(failure.trace(), "  caused by: inner");
    }

    #[test]
    fn panic_payloads_become_messages() {
        let failure = HandlerFailure::from_panic(Box::new("boom"));
        assert_eq!(failure.to_string(), "handler panicked: boom");
        let failure = HandlerFailure::from_panic(Box::new(String::from("bang")));
        assert_eq!(failure.to_string(), "handler panicked: bang");
        assert!(failure.trace().is_empty());
    }
}

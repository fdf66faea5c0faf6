//! Error types shared across the application.

use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure, fatal at startup.
    Config(String),
    /// Unknown or invalid toolset selection.
    Toolset(String),
    /// Transport bind, accept, or session failure.
    Transport(String),
    /// GitHub API call failure scoped to a single request.
    Api(String),
    /// Graceful shutdown exceeded its grace period.
    Shutdown(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Toolset(msg) => write!(f, "toolset: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Api(msg) => write!(f, "github api: {msg}"),
            Self::Shutdown(msg) => write!(f, "shutdown: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Api(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// A single accumulated GitHub API failure observed while serving one
/// tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Human-readable failure description.
    pub message: String,
    /// HTTP status code when the failure came from a response.
    pub status: Option<u16>,
}

/// Per-invocation accumulation slot for GitHub API errors.
///
/// A fresh sink is created before every tool dispatch so error
/// collection never leaks between invocations that share a context
/// lineage. Cloning shares the underlying slot, which lets a handler
/// hand the sink to the clients it drives and drain it afterwards.
#[derive(Debug, Clone, Default)]
pub struct ApiErrorSink {
    inner: Arc<Mutex<Vec<ApiError>>>,
}

impl ApiErrorSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one API failure.
    pub fn record(&self, message: impl Into<String>, status: Option<u16>) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ApiError {
                message: message.into(),
                status,
            });
    }

    /// Take every accumulated failure, leaving the sink empty.
    #[must_use]
    pub fn drain(&self) -> Vec<ApiError> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Whether any failure has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_starts_empty() {
        let sink = ApiErrorSink::new();
        assert!(sink.is_empty());
        assert!(sink.drain().is_empty());
    }

    #[test]
    fn sink_records_and_drains() {
        let sink = ApiErrorSink::new();
        sink.record("boom", Some(502));
        sink.record("denied", None);
        assert!(!sink.is_empty());

        let errors = sink.drain();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "boom");
        assert_eq!(errors[0].status, Some(502));
        assert!(sink.is_empty());
    }

    #[test]
    fn clones_share_the_slot() {
        let sink = ApiErrorSink::new();
        let clone = sink.clone();
        clone.record("shared", None);
        assert_eq!(sink.drain().len(), 1);
    }

    #[test]
    fn separate_sinks_are_isolated() {
        let first = ApiErrorSink::new();
        let second = ApiErrorSink::new();
        first.record("only mine", Some(404));
        assert!(second.is_empty());
    }

    #[test]
    fn error_display_prefixes() {
        assert_eq!(format!("{}", AppError::Config("bad".into())), "config: bad");
        assert_eq!(
            format!("{}", AppError::Toolset("nope".into())),
            "toolset: nope"
        );
        assert_eq!(
            format!("{}", AppError::Shutdown("late".into())),
            "shutdown: late"
        );
    }
}

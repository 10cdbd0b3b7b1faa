//! Failure taxonomy for retried requests.
//!
//! `RequestError` is what a wrapped operation fails with; `RetryError` is
//! what the executor surfaces to the caller. Callers should not distinguish
//! exhaustion from a single fatal failure structurally, only by kind.

use thiserror::Error;

/// HTTP status codes eligible for retry.
pub const RETRYABLE_STATUS: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Lowercase substrings marking a transport failure as transient.
const TRANSIENT_SIGNATURES: [&str; 9] = [
    "connection reset",
    "connection refused",
    "broken pipe",
    "timed out",
    "timeout",
    "dns error",
    "failed to lookup",
    "unreachable",
    "fetch failed",
];

/// An error produced by one attempt of a wrapped operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The per-attempt deadline fired. Always retryable.
    #[error("request timed out")]
    Timeout,

    /// A transport-level failure (socket, DNS, TLS). Retryable when the
    /// message carries a known transient signature.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status. Retryable for the
    /// statuses in `RETRYABLE_STATUS`, fatal otherwise (4xx client errors,
    /// auth failures, validation rejections).
    #[error("http status {status}: {message}")]
    Http { status: u16, message: String },

    /// A request that can never succeed as issued (bad input, serialization
    /// failure, programmer error). Never retried.
    #[error("invalid request: {0}")]
    Invalid(String),
}

impl RequestError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// The HTTP status, when this failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RequestError::Timeout => true,
            RequestError::Transport(message) => is_transient_signature(message),
            RequestError::Http { status, .. } => RETRYABLE_STATUS.contains(status),
            RequestError::Invalid(_) => false,
        }
    }
}

fn is_transient_signature(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    TRANSIENT_SIGNATURES.iter().any(|sig| lowered.contains(sig))
}

/// Terminal outcome of a retry sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    /// Every attempt failed with a retryable error; carries the last one.
    #[error("request failed after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: RequestError },

    /// A non-retryable failure; attempted exactly once.
    #[error("request failed: {source}")]
    Fatal { source: RequestError },

    /// The sequence was cancelled through its `CancelToken`.
    #[error("retry sequence cancelled")]
    Cancelled,
}

impl RetryError {
    /// The underlying request error, if the sequence was not cancelled.
    pub fn request_error(&self) -> Option<&RequestError> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::Fatal { source } => Some(source),
            RetryError::Cancelled => None,
        }
    }

    /// The HTTP status of the underlying failure, when one exists.
    pub fn status(&self) -> Option<u16> {
        self.request_error().and_then(RequestError::status)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_retryable() {
        assert!(RequestError::Timeout.is_retryable());
    }

    #[test]
    fn transient_transport_signatures_are_retryable() {
        for msg in [
            "Connection reset by peer",
            "operation timed out",
            "dns error: failed to lookup address",
            "network unreachable",
            "fetch failed",
        ] {
            assert!(RequestError::transport(msg).is_retryable(), "{msg}");
        }
    }

    #[test]
    fn unknown_transport_failures_are_fatal() {
        assert!(!RequestError::transport("certificate verify failed").is_retryable());
    }

    #[test]
    fn retryable_status_set_is_exact() {
        for status in RETRYABLE_STATUS {
            assert!(RequestError::http(status, "").is_retryable());
        }
        for status in [400, 401, 403, 404, 409, 422] {
            assert!(!RequestError::http(status, "").is_retryable(), "{status}");
        }
    }

    #[test]
    fn invalid_requests_are_never_retried() {
        assert!(!RequestError::invalid("missing field `code`").is_retryable());
    }

    #[test]
    fn retry_error_exposes_http_status() {
        let err = RetryError::Fatal {
            source: RequestError::http(404, "not found"),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(RetryError::Cancelled.status(), None);
    }
}

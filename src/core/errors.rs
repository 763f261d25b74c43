//! Error taxonomy and failure classification
//!
//! Backends report raw [`BackendFailure`] values; the classifier collapses
//! them into the closed [`GatewayError`] taxonomy the boundary exposes.
//! `UpstreamChanged` is deliberately kept apart from `Unavailable`: a payload
//! shape mismatch means the normalizer's field mapping is stale, not that
//! the network is down, and the two drive different operator responses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed error taxonomy crossing the gateway boundary
///
/// Messages are human-readable and safe to display verbatim; they never
/// embed raw backend payloads or credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Unparseable input. Local, never retried.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Cookie missing or rejected for a gated capability.
    #[error("authentication required: {0}")]
    AuthRequired(String),

    /// Upstream has no matching content.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transient network/timeout condition. Safe to retry.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// Payload shape mismatch. Requires a normalizer update, not a retry.
    #[error("upstream payload changed: {0}")]
    UpstreamChanged(String),

    /// Catch-all, logged with maximal context at the call site.
    #[error("unexpected failure: {0}")]
    Unknown(String),
}

/// Machine-readable error discriminator carried on the boundary

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidReference,

    AuthRequired,

    NotFound,

    Unavailable,

    UpstreamChanged,

    Unknown,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidReference(_) => ErrorKind::InvalidReference,
            Self::AuthRequired(_) => ErrorKind::AuthRequired,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::UpstreamChanged(_) => ErrorKind::UpstreamChanged,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Only transient transport conditions are safe to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Raw failure reported by a backend before classification

#[derive(Debug, Error)]
pub enum BackendFailure {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream answered HTTP {status}")]
    Status { status: u16 },

    #[error("malformed payload: {0}")]
    Decode(String),

    #[error("empty result set")]
    Empty,
}

impl From<reqwest::Error> for BackendFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Map a raw backend failure into the public taxonomy.
///
/// `gated` marks capabilities that require a caller cookie: upstreams answer
/// unauthenticated gated calls with assorted 4xx shapes (403, 404, 401), so
/// the gated rule takes precedence over the plain 404 rule.
pub fn classify(failure: &BackendFailure, gated: bool) -> GatewayError {
    match failure {
        BackendFailure::Status { status } if gated && (400..500).contains(status) => {
            GatewayError::AuthRequired(
                "the upstream rejected the supplied cookie".to_string(),
            )
        }
        BackendFailure::Status { status: 404 } => {
            GatewayError::NotFound("upstream has no matching content".to_string())
        }
        BackendFailure::Empty => {
            GatewayError::NotFound("upstream returned an empty result set".to_string())
        }
        BackendFailure::Timeout => {
            GatewayError::Unavailable("the upstream request timed out".to_string())
        }
        BackendFailure::Transport(detail) => {
            GatewayError::Unavailable(format!("the upstream could not be reached: {}", detail))
        }
        BackendFailure::Decode(detail) => {
            GatewayError::UpstreamChanged(format!("unexpected payload shape: {}", detail))
        }
        BackendFailure::Status { status } => {
            GatewayError::Unknown(format!("upstream answered HTTP {}", status))
        }
    }
}

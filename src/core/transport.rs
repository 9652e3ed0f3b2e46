//! The backend seam the orchestrator talks through.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;

use crate::core::classification::ClassificationResult;
use crate::core::subject::Subject;
use crate::core::video::VideoAsset;

/// Any failure at the network boundary.
#[derive(Debug)]
pub enum TransportError {
    /// The request never produced a response (connect, TLS, timeout, body read).
    Request {
        operation: &'static str,
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    /// The response body did not have the expected shape.
    Decode {
        operation: &'static str,
        message: String,
    },
    /// The video payload could not be stored locally.
    Io {
        operation: &'static str,
        source: std::io::Error,
    },
}

impl TransportError {
    pub fn operation(&self) -> &'static str {
        match self {
            TransportError::Request { operation, .. }
            | TransportError::Status { operation, .. }
            | TransportError::Decode { operation, .. }
            | TransportError::Io { operation, .. } => operation,
        }
    }

    /// Build a decode error without an underlying source. Mostly useful for
    /// scripted backends.
    pub fn decode(operation: &'static str, message: impl Into<String>) -> Self {
        TransportError::Decode {
            operation,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request { operation, source } => {
                write!(f, "{operation} request failed: {source}")
            }
            TransportError::Status {
                operation,
                status,
                body,
            } => {
                if body.is_empty() {
                    write!(f, "{operation} returned HTTP {status}")
                } else {
                    write!(f, "{operation} returned HTTP {status}: {body}")
                }
            }
            TransportError::Decode { operation, message } => {
                write!(f, "{operation} response could not be decoded: {message}")
            }
            TransportError::Io { operation, source } => {
                write!(f, "{operation} payload could not be stored: {source}")
            }
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Request { source, .. } => Some(source),
            TransportError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The four remote capabilities the tutor depends on. Implementations must
/// not retry; callers decide what a failure means.
#[async_trait]
pub trait TutorBackend: Send + Sync {
    /// Clear server-side session state such as animation history.
    async fn reset_session(&self) -> Result<(), TransportError>;

    async fn set_subject(&self, subject: Subject) -> Result<(), TransportError>;

    async fn classify(&self, question: &str) -> Result<ClassificationResult, TransportError>;

    async fn explain(&self, question: &str) -> Result<String, TransportError>;

    /// Render an animation. Expect this to take much longer than `explain`.
    async fn animate(&self, animation_spec: &str) -> Result<VideoAsset, TransportError>;
}

//! Error types.

use thiserror::Error;

use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Why a command did not produce an output.
///
/// Nothing is retried. Mutations made by behaviors that already ran are not
/// rolled back.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No pipeline is registered for the command type. A wiring bug.
    #[error("no handler registered for `{command}`")]
    NoHandlerRegistered { command: &'static str },

    /// A behavior refused to continue the chain.
    #[error("behavior `{behavior}` failed: {reason}")]
    Behavior { behavior: &'static str, reason: String },

    /// The terminal handler failed.
    #[error("handler failed: {reason}")]
    Handler { reason: String },

    /// The dispatch was cancelled before the next stage was entered.
    #[error("dispatch cancelled")]
    Cancelled,
}

/// Infrastructure failures: binding a port, reading configuration.
///
/// Application-level failures are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// `Behavior` → 422, `Cancelled` → 503, anything else → 500. The body is
/// `{"error": message}`.
impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Behavior { .. } => Status::UnprocessableContent,
            Self::Cancelled => Status::ServiceUnavailable,
            Self::NoHandlerRegistered { .. } | Self::Handler { .. } => {
                tracing::error!("dispatch failed: {self}");
                Status::InternalServerError
            }
        };
        Response::error(status, self.to_string())
    }
}

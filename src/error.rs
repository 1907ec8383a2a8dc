//! Error types.

use thiserror::Error;

/// The error type returned by [`Server::serve`](crate::Server::serve).
///
/// Application-level failures (404, 422, etc.) are expressed as rendered
/// responses, not as `Error`s. This type surfaces infrastructure failures:
/// binding to a port or accepting a connection.
#[derive(Debug, Error)]
#[error("io: {0}")]
pub struct Error(#[from] std::io::Error);

/// Failure of a [`Renderer`](crate::Renderer) method.
///
/// Rendering is not transactional. Apart from [`RenderError::Io`] raised while
/// reading a binary source, the headers and status may already have been
/// written when one of these is returned, so the caller can no longer turn
/// the failure into a different response.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xml: {0}")]
    Xml(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

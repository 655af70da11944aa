//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for groups, peers and the peer HTTP endpoint.
///
/// Errors are `Clone` so that a single failed load can be handed to every
/// caller waiting on the same in-flight key.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Lookup attempted with an empty key
    #[error("key is required")]
    EmptyKey,

    /// The group's loader failed; the message is the loader's own
    #[error("{0}")]
    Loader(Arc<anyhow::Error>),

    /// No group registered under this name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// Peer request path could not be parsed
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request reached the peer handler outside the configured base path
    #[error("serving unexpected path: {0}")]
    UnexpectedPath(String),

    /// Remote peer could not be reached or answered with a non-200 status
    #[error("peer error: {0}")]
    Peer(String),

    /// Group created without a loader
    #[error("group {0} has no loader")]
    MissingLoader(String),

    /// A peer picker was registered twice on the same group
    #[error("peer picker already registered for group {0}")]
    PeersAlreadyRegistered(String),

    /// A group with this name already exists in the registry
    #[error("group {0} already exists")]
    DuplicateGroup(String),
}

impl CacheError {
    /// Wraps a loader failure.
    pub fn loader(err: anyhow::Error) -> Self {
        CacheError::Loader(Arc::new(err))
    }

    /// HTTP status used when this error crosses the peer endpoint.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::EmptyKey | CacheError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Peer(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

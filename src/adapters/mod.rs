//! Adapter interfaces for external systems.
//!
//! The only external system is the document store that holds canonical
//! content records. Verification code depends on the `ContentResolver`
//! trait so the store can be swapped for an in-memory map in tests.

pub mod document_store;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ContentRecord, FailureCause};

// Re-export the document store adapter
pub use document_store::{request_id, DocumentStoreClient, REQUEST_ID_PREFIX};

/// Errors from a single resolve call. Never retried.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("content not found")]
    NotFound,

    #[error("error {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode content document: {0}")]
    Decode(String),
}

impl From<ResolveError> for FailureCause {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotFound => FailureCause::NotFound,
            ResolveError::Status(code) => FailureCause::Status(code),
            ResolveError::Transport(msg) => FailureCause::Transport(msg),
            ResolveError::Decode(msg) => FailureCause::Decode(msg),
        }
    }
}

/// Fetches content records by identifier
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Human-readable resolver name
    fn name(&self) -> &str;

    /// Resolve one identifier into a freshly built record
    async fn resolve(&self, id: &str) -> Result<ContentRecord, ResolveError>;
}

//! HTTP adapter for the document store API.
//!
//! Each call is a single GET to `<base_url><id>` carrying the caller's
//! basic-auth credential and a per-content request id.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use super::{ContentResolver, ResolveError};
use crate::domain::{ContentDocument, ContentRecord};

/// Prefix of the `X-Request-Id` header value
pub const REQUEST_ID_PREFIX: &str = "tid_ftimageinspector_";

/// Request-tracing id for a content id
pub fn request_id(id: &str) -> String {
    format!("{}{}", REQUEST_ID_PREFIX, id)
}

/// Document store client
pub struct DocumentStoreClient {
    /// Base URL; the content id is appended directly
    base_url: String,
    /// Base64 basic-auth credential
    auth: String,
    /// HTTP client
    client: reqwest::Client,
}

impl DocumentStoreClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: auth.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build the content URL
    fn content_url(&self, id: &str) -> String {
        format!("{}{}", self.base_url, id)
    }
}

#[async_trait]
impl ContentResolver for DocumentStoreClient {
    fn name(&self) -> &str {
        "document-store"
    }

    #[instrument(skip(self), fields(resolver = "document-store"))]
    async fn resolve(&self, id: &str) -> Result<ContentRecord, ResolveError> {
        let url = self.content_url(id);
        debug!(%url, "Fetching content");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Basic {}", self.auth))
            .header("X-Request-Id", request_id(id))
            .send()
            .await
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(ResolveError::NotFound),
            status => return Err(ResolveError::Status(status.as_u16())),
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        let doc: ContentDocument =
            serde_json::from_slice(&body).map_err(|e| ResolveError::Decode(e.to_string()))?;

        Ok(ContentRecord::from_document(id, doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id() {
        assert_eq!(request_id("abc-123"), "tid_ftimageinspector_abc-123");
    }

    #[test]
    fn test_content_url_is_plain_concatenation() {
        let client = DocumentStoreClient::new("https://store.example/content/", "secret");
        assert_eq!(
            client.content_url("abc"),
            "https://store.example/content/abc"
        );
        assert_eq!(client.name(), "document-store");
    }
}

pub mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::BackendError;

/// Body returned by `POST /upload_text/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body returned by `POST /ask/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

/// The remote question-answering service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Liveness probe. `Ok` means the backend answered with a success status.
    async fn health(&self) -> Result<(), BackendError>;

    /// Submit knowledge text for ingestion.
    async fn upload_text(&self, text: &str) -> Result<UploadResponse, BackendError>;

    /// Ask a question against the ingested knowledge.
    async fn ask(&self, question: &str) -> Result<AskResponse, BackendError>;
}

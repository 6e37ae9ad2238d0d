use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{AskResponse, Backend, UploadResponse};
use crate::config::Config;
use crate::error::BackendError;

pub const KNOWLEDGE_FILE_NAME: &str = "knowledge.txt";

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    health_timeout: Duration,
    request_timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&Config::new().with_backend_override(Some(base_url.to_string())))
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url().to_string(),
            health_timeout: config.health_timeout(),
            request_timeout: config.request_timeout(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        if !response.status().is_success() {
            return Err(BackendError::from_status(response.status()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn health(&self) -> Result<(), BackendError> {
        let url = self.url("/health");
        debug!(%url, "checking backend health");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .timeout(self.health_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::from_status(response.status()));
        }

        Ok(())
    }

    async fn upload_text(&self, text: &str) -> Result<UploadResponse, BackendError> {
        let url = self.url("/upload_text/");
        debug!(%url, bytes = text.len(), "uploading knowledge");

        let file = Part::text(text.to_string())
            .file_name(KNOWLEDGE_FILE_NAME)
            .mime_str("text/plain")?;
        let form = Form::new().part("file", file);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.request_timeout)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn ask(&self, question: &str) -> Result<AskResponse, BackendError> {
        let url = self.url("/ask/");
        debug!(%url, "asking question");

        let form = Form::new().text("question", question.to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.request_timeout)
            .send()
            .await?;

        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_dropped() {
        let backend = HttpBackend::new("http://localhost:7860/");
        assert_eq!(backend.base_url(), "http://localhost:7860");
        assert_eq!(backend.url("/ask/"), "http://localhost:7860/ask/");
    }

    #[test]
    fn test_timeouts_follow_config() {
        let mut config = Config::new();
        config.health_timeout_secs = 2;
        config.request_timeout_secs = 30;
        let backend = HttpBackend::from_config(&config);
        assert_eq!(backend.health_timeout, Duration::from_secs(2));
        assert_eq!(backend.request_timeout, Duration::from_secs(30));
    }
}

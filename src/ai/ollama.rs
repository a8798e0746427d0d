//! Ollama local LLM integration.
//!
//! Implements the GenerateProvider trait for Ollama (local LLM).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AiError, AiResult, GenerateProvider, GenerateRequest};

/// Ollama API provider for local LLM.
///
/// Text-only: requests carrying an attachment are rejected so the
/// fallback chain can route them to a capable provider.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider with default settings.
    ///
    /// Uses localhost:11434 by default.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: std::env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
        }
    }

    /// Create with a specific base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Create with a specific model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Make a request to the Ollama API.
    async fn request(&self, prompt: &str) -> AiResult<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api { status, message });
        }

        let response: OllamaResponse = response.json().await?;
        if response.response.is_empty() {
            return Err(AiError::EmptyResponse("ollama".to_string()));
        }
        Ok(response.response)
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerateProvider for OllamaProvider {
    async fn generate(&self, request: &GenerateRequest) -> AiResult<String> {
        if request.attachment.is_some() {
            return Err(AiError::AttachmentUnsupported("ollama".to_string()));
        }
        self.request(&request.prompt).await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn supports_attachments(&self) -> bool {
        false
    }

    async fn is_available(&self) -> bool {
        // Try to reach the Ollama API
        let result = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(std::time::Duration::from_secs(2))
            .send()
            .await;

        result.is_ok()
    }
}

/// Ollama API request structure.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Ollama API response structure.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Attachment;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new();
        assert_eq!(provider.name(), "ollama");
        assert!(!provider.supports_attachments());
    }

    #[test]
    fn test_ollama_with_custom_url() {
        let provider = OllamaProvider::new().with_base_url("http://custom:8080");
        assert_eq!(provider.base_url, "http://custom:8080");
    }

    #[test]
    fn test_ollama_with_custom_model() {
        let provider = OllamaProvider::new().with_model("codellama");
        assert_eq!(provider.model, "codellama");
    }

    #[tokio::test]
    async fn test_ollama_rejects_attachments() {
        let provider = OllamaProvider::new();
        let request = GenerateRequest::new("analyze")
            .with_attachment(Attachment::from_bytes("text/plain", b"report"));

        let result = provider.generate(&request).await;
        assert!(matches!(result, Err(AiError::AttachmentUnsupported(_))));
    }
}

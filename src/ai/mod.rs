//! Generation gateway.
//!
//! Turns a synthesized prompt (plus at most one binary attachment) into
//! generated document text using Gemini or a local LLM.
//!
//! ## Providers
//!
//! - `GeminiProvider` - Google Generative Language API (requires API key)
//! - `OllamaProvider` - local LLM fallback, no attachment support
//! - `GenerationClient` - ordered fallback chain over both

mod gemini;
mod ollama;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Result type for gateway operations.
pub type AiResult<T> = Result<T, AiError>;

/// Generation gateway error types.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("{0} not set")]
    MissingApiKey(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Empty response from {0}")]
    EmptyResponse(String),

    #[error("Provider '{0}' does not accept attachments")]
    AttachmentUnsupported(String),

    #[error("No generation provider available")]
    NoProvider,
}

/// A single binary attachment, carried base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// MIME type, e.g. `text/plain` or `application/pdf`.
    pub mime_type: String,

    /// Base64-encoded file content.
    pub data: String,
}

impl Attachment {
    /// Encode raw bytes into an attachment.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self { mime_type: mime_type.into(), data: BASE64.encode(bytes) }
    }
}

/// A request to generate text.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// The full prompt text.
    pub prompt: String,

    /// At most one attachment.
    pub attachment: Option<Attachment>,
}

impl GenerateRequest {
    /// Create a text-only request.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), attachment: None }
    }

    /// Attach a file to the request.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Trait for generation providers.
#[async_trait]
pub trait GenerateProvider: Send + Sync {
    /// Generate text for a request.
    async fn generate(&self, request: &GenerateRequest) -> AiResult<String>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Whether the provider accepts binary attachments.
    fn supports_attachments(&self) -> bool;

    /// Check if the provider is available.
    async fn is_available(&self) -> bool;
}

/// Generation client with fallback support.
///
/// Tries providers in order: Gemini (if API key available) -> Ollama (if
/// running) -> none. Each request is sent to one provider at a time; a
/// failing provider is logged and the next one tried. There is no retry
/// on the same provider.
pub struct GenerationClient {
    providers: Vec<Box<dyn GenerateProvider>>,
}

impl GenerationClient {
    /// Create a client over an explicit provider chain, tried in order.
    pub fn with_providers(providers: Vec<Box<dyn GenerateProvider>>) -> Self {
        Self { providers }
    }

    /// Check if any provider is available.
    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Get the active provider name.
    pub fn active_provider(&self) -> Option<&str> {
        self.providers.first().map(|p| p.name())
    }
}

#[async_trait]
impl GenerateProvider for GenerationClient {
    async fn generate(&self, request: &GenerateRequest) -> AiResult<String> {
        for provider in &self.providers {
            if request.attachment.is_some() && !provider.supports_attachments() {
                tracing::warn!(provider = provider.name(), "Provider cannot take attachments, trying next");
                continue;
            }

            match provider.generate(request).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                }
            }
        }

        Err(AiError::NoProvider)
    }

    fn name(&self) -> &str {
        "auto"
    }

    fn supports_attachments(&self) -> bool {
        self.providers.iter().any(|p| p.supports_attachments())
    }

    async fn is_available(&self) -> bool {
        !self.providers.is_empty()
    }
}

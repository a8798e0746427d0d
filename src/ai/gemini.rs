//! Gemini API integration.
//!
//! Implements the GenerateProvider trait for Google's Generative Language
//! API, including inline file attachments.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AiError, AiResult, GenerateProvider, GenerateRequest};

const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API provider.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    ///
    /// Reads the API key from the GEMINI_API_KEY environment variable.
    pub fn new() -> AiResult<Self> {
        let api_key =
            std::env::var("GEMINI_API_KEY").map_err(|_| AiError::MissingApiKey("GEMINI_API_KEY"))?;
        Ok(Self::with_api_key(api_key))
    }

    /// Create with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Create with a specific model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create with a specific API base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Make a generateContent request to the Gemini API.
    async fn request(&self, body: &GeminiRequest) -> AiResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api { status, message });
        }

        let response: GeminiResponse = response.json().await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().find_map(|part| part.text))
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AiError::EmptyResponse("gemini".to_string()))
    }
}

#[async_trait]
impl GenerateProvider for GeminiProvider {
    async fn generate(&self, request: &GenerateRequest) -> AiResult<String> {
        let mut parts = vec![Part::text(&request.prompt)];
        if let Some(attachment) = &request.attachment {
            parts.push(Part::inline_data(&attachment.mime_type, &attachment.data));
        }

        let body = GeminiRequest { contents: vec![Content { parts }] };
        self.request(&body).await
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn supports_attachments(&self) -> bool {
        true
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Gemini API request structure.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

/// A single content turn in a Gemini request.
#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

/// One part of a content turn: text or inline binary data.
#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self { text: Some(text.to_string()), inline_data: None }
    }

    fn inline_data(mime_type: &str, data: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
        }
    }
}

/// Inline attachment payload.
#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// Gemini API response structure.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// A response candidate.
#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

/// Content of a response candidate.
#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

/// One part of a response candidate.
#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

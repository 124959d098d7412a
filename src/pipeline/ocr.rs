//! OCR client adapter: one remote recognition call per page.
//!
//! Everything above this module talks to the narrow [`Recognizer`] trait, so
//! tests can swap the network for a stub and the interpreter never depends
//! on a live service.
//!
//! Two Mistral backends implement it:
//!
//! * [`MistralOcrClient`] — the dedicated `/v1/ocr` endpoint. The request is
//!   `{ model, document: { type: "image_url", image_url: <data URI> } }` and
//!   only the first returned page's `markdown` is used.
//! * [`MistralVisionClient`] — `/v1/chat/completions` with the prompt and the
//!   image in one user message; returns the first choice's content.
//!
//! Neither retries or backs off. Whatever goes wrong comes back as one
//! [`RemoteServiceError`] and the caller turns it into that page's error.

use crate::config::{Backend, ProcessingConfig};
use crate::error::{DocVisionError, RemoteServiceError};
use crate::pipeline::encode::encode_data_uri;
use crate::pipeline::load::RasterImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Turns one page image into raw recognised text.
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Which kind of endpoint answers. Decides how the answer is read.
    fn backend(&self) -> Backend {
        Backend::Ocr
    }

    /// Recognise one page. `prompt` is the mode's instruction text; backends
    /// without an instruction channel may ignore it.
    async fn recognize(&self, image: &RasterImage, prompt: &str) -> Result<String, RemoteServiceError>;
}

/// Build the recognizer selected by `config.backend`.
pub fn build_recognizer(config: &ProcessingConfig) -> Result<Arc<dyn Recognizer>, DocVisionError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| DocVisionError::Internal(format!("HTTP client: {e}")))?;

    let recognizer: Arc<dyn Recognizer> = match config.backend {
        Backend::Ocr => Arc::new(MistralOcrClient::with_client(
            http,
            &config.base_url,
            &config.api_key,
            config.effective_model(),
        )),
        Backend::Vision => Arc::new(MistralVisionClient::with_client(
            http,
            &config.base_url,
            &config.api_key,
            config.effective_model(),
        )),
    };
    Ok(recognizer)
}

// ── /v1/ocr ──────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub(crate) struct OcrRequest<'a> {
    pub model: &'a str,
    pub document: OcrDocument<'a>,
}

#[derive(Serialize, Debug)]
pub(crate) struct OcrDocument<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub image_url: &'a str,
}

#[derive(Deserialize, Debug)]
pub(crate) struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<OcrResponsePage>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct OcrResponsePage {
    #[serde(default)]
    pub markdown: String,
}

impl OcrResponse {
    /// The first page's markdown; empty when the service returned no pages.
    pub fn into_first_markdown(self) -> String {
        self.pages
            .into_iter()
            .next()
            .map(|p| p.markdown)
            .unwrap_or_default()
    }
}

/// Client for Mistral's dedicated OCR endpoint.
pub struct MistralOcrClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl MistralOcrClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key, model)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/ocr", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Recognizer for MistralOcrClient {
    fn name(&self) -> &str {
        "mistral-ocr"
    }

    async fn recognize(&self, image: &RasterImage, prompt: &str) -> Result<String, RemoteServiceError> {
        let data_uri = encode_data_uri(image)?;
        // The OCR endpoint has no instruction field.
        debug!("OCR request ({} chars of prompt not sent)", prompt.len());

        let body = OcrRequest {
            model: &self.model,
            document: OcrDocument {
                kind: "image_url",
                image_url: &data_uri,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let response: OcrResponse = decode_response(response).await?;
        Ok(response.into_first_markdown())
    }
}

// ── /v1/chat/completions ─────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

#[derive(Serialize, Debug)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: Vec<ChatContent<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ChatContent<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: &'a str },
}

#[derive(Deserialize, Debug)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    pub fn into_first_content(self) -> Result<String, RemoteServiceError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| RemoteServiceError::MalformedResponse("response has no choices".into()))
    }
}

/// Client for a vision-capable chat model; sends the mode prompt.
pub struct MistralVisionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl MistralVisionClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key, model)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Recognizer for MistralVisionClient {
    fn name(&self) -> &str {
        "mistral-vision"
    }

    fn backend(&self) -> Backend {
        Backend::Vision
    }

    async fn recognize(&self, image: &RasterImage, prompt: &str) -> Result<String, RemoteServiceError> {
        let data_uri = encode_data_uri(image)?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ChatContent::Text { text: prompt },
                    ChatContent::ImageUrl {
                        image_url: &data_uri,
                    },
                ],
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let response: ChatResponse = decode_response(response).await?;
        response.into_first_content()
    }
}

/// Check the status, then decode the JSON body.
async fn decode_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RemoteServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteServiceError::Status { status, body });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| RemoteServiceError::MalformedResponse(e.to_string()))
}

//! Anthropic Messages API client implementing [`TextGenerator`].
//!
//! Single-shot only: retries belong to [`super::Retrying`], so one `complete`
//! here is exactly one HTTP request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::stream::sse_text_deltas;
use crate::llm_client::{AdapterError, GenerationOptions, TextGenerator, TokenStream};

const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Fixed in code so proposal metadata always names the model that wrote it.
pub const MODEL: &str = "claude-sonnet-4-5";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    /// Concatenated text of every text block.
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, AdapterError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AdapterError::Unavailable("API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AdapterError::Unavailable(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}{MESSAGES_PATH}", base_url.trim_end_matches('/')),
        })
    }

    async fn send(
        &self,
        system: &str,
        user: &str,
        options: GenerationOptions,
        stream: bool,
    ) -> Result<reqwest::Response, AdapterError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
            stream,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&raw)
            .map(|e| e.error.message)
            .unwrap_or(raw);
        Err(AdapterError::Request {
            status: Some(status.as_u16()),
            message,
        })
    }
}

fn transport_error(e: reqwest::Error) -> AdapterError {
    if e.is_timeout() {
        AdapterError::Timeout(e.to_string())
    } else {
        AdapterError::Request {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    fn model(&self) -> &str {
        MODEL
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: GenerationOptions,
    ) -> Result<String, AdapterError> {
        let response: MessagesResponse = self
            .send(system, user, options, false)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        if let Some(usage) = &response.usage {
            debug!(
                "Completion succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        let text = response.text();
        if text.trim().is_empty() {
            return Err(AdapterError::EmptyContent);
        }
        Ok(text)
    }

    async fn stream(
        &self,
        system: &str,
        user: &str,
        options: GenerationOptions,
    ) -> Result<TokenStream, AdapterError> {
        let response = self.send(system, user, options, true).await?;
        Ok(sse_text_deltas(response.bytes_stream()))
    }
}

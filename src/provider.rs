use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionRequest};

// Why a provider call failed. Deliberately carries no provider text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderError {
    #[error("no credential configured")]
    MissingCredential,

    #[error("request timed out")]
    Timeout,

    #[error("could not connect")]
    Connect,

    #[error("provider answered with status {0}")]
    Status(u16),

    #[error("could not decode provider response")]
    Decode,

    #[error("transport failure")]
    Transport,
}

impl ProviderError {
    // coarse class for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::MissingCredential => "credential",
            ProviderError::Timeout => "timeout",
            ProviderError::Connect => "connect",
            ProviderError::Status(_) => "status",
            ProviderError::Decode => "decode",
            ProviderError::Transport => "transport",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_connect() {
            ProviderError::Connect
        } else if let Some(status) = e.status() {
            ProviderError::Status(status.as_u16())
        } else if e.is_decode() {
            ProviderError::Decode
        } else {
            ProviderError::Transport
        }
    }
}

// External text-completion service
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn has_credential(&self) -> bool;

    // Ok(None) - provider answered but produced no text
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderError>;
}

// OpenAI-compatible chat completions backend
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            // an empty key counts as no key
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential)?;

        // system + user, never any history
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.message,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ProviderError::Status(res.status().as_u16()));
        }

        let parsed = res.json::<ChatCompletionResponse>().await?;
        Ok(parsed.into_first_content())
    }
}

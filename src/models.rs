use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Body returned to the page, success or not
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ReplyBody {
    pub reply: String,
}

// What the gateway hands to a provider
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_instruction: Arc<str>,
    pub message: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

// OpenAI-compatible chat completion request format
#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

// OpenAI-compatible response format - only the bits we read
#[derive(Deserialize, Default)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    // first choice's text, if the provider produced any
    pub fn into_first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

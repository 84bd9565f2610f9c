//! Wire types for the OpenAI-compatible chat completions endpoint
use serde::{Deserialize, Serialize};

use crate::domain::models::ChatMessage;

/// Request body for `POST /v1/chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    /// Model identifier (e.g., "google/gemini-2.5-flash")
    pub model: &'a str,

    /// System message first, then the conversation
    pub messages: &'a [ChatMessage],

    /// Ask for server-sent events instead of a single JSON body
    pub stream: bool,
}

/// Non-streaming response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,

    pub choices: Vec<Choice>,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message inside a choice
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
    }
}

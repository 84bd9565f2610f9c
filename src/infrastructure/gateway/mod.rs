//! OpenAI-compatible chat-completion gateway adapter
//!
//! Implements the [`CompletionGateway`](crate::domain::ports::CompletionGateway)
//! port over reqwest. One HTTP call per invocation; no retries, no timeout.

pub mod client;
pub mod types;

pub use client::{GatewayClient, GatewayClientConfig};
pub use types::{ChatCompletionRequest, ChatCompletionResponse};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use super::errors::GatewayError;
use crate::domain::models::{CallerCredential, ChatMessage};

/// Raw upstream body chunks, in arrival order.
pub type ChunkStream = BoxStream<'static, Result<Bytes, GatewayError>>;

/// One outbound chat-completion call.
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    pub model: String,
    /// System message first, then the conversation.
    pub messages: Vec<ChatMessage>,
    /// Passed through untouched; forwarding is the adapter's decision.
    pub caller_credential: Option<CallerCredential>,
}

/// Upstream chat-completion service.
///
/// Implementations make exactly one network call per method invocation and
/// never retry.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Open a streaming completion and hand back the body as it arrives.
    ///
    /// Resolves once upstream response headers are in; status failures are
    /// reported here, not inside the stream. Dropping the stream releases
    /// the upstream connection.
    async fn open_stream(&self, call: UpstreamCall) -> Result<ChunkStream, GatewayError>;

    /// Await the full completion and return the assistant text.
    async fn complete(&self, call: UpstreamCall) -> Result<String, GatewayError>;
}

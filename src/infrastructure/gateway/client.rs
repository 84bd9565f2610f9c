use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use tracing::{debug, instrument, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::domain::models::GatewayConfig;
use crate::domain::ports::{ChunkStream, CompletionGateway, GatewayError, UpstreamCall};
use crate::infrastructure::logging::scrub;

/// Longest upstream error body kept for logs.
const MAX_LOGGED_BODY: usize = 512;

/// Configuration for the gateway client
#[derive(Clone)]
pub struct GatewayClientConfig {
    /// Gateway API key, sent as a bearer token
    pub api_key: String,

    /// Base URL without the `/v1/...` path
    pub base_url: String,

    /// Forward the caller's credential on `caller_credential_header`
    pub forward_caller_credential: bool,

    /// Header carrying the forwarded caller credential
    pub caller_credential_header: String,
}

impl GatewayClientConfig {
    /// Build from loaded configuration, resolving the API key.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            GatewayError::Configuration(format!(
                "no gateway API key: set gateway.api_key or {}",
                crate::domain::models::API_KEY_ENV
            ))
        })?;
        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            forward_caller_credential: config.forward_caller_credential,
            caller_credential_header: config.caller_credential_header.clone(),
        })
    }
}

impl std::fmt::Debug for GatewayClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("forward_caller_credential", &self.forward_caller_credential)
            .field("caller_credential_header", &self.caller_credential_header)
            .finish()
    }
}

/// HTTP client for the upstream chat-completion gateway
///
/// Features:
/// - Connection pooling and reuse (via `reqwest::Client`)
/// - Bearer authentication with the gateway key
/// - Optional forwarding of the caller credential
/// - Status classification into [`GatewayError`]
pub struct GatewayClient {
    http_client: ReqwestClient,
    endpoint: String,
    config: GatewayClientConfig,
}

impl GatewayClient {
    /// Create a client. No request timeout is set: a stream lasts as long
    /// as the upstream keeps sending.
    pub fn new(config: GatewayClientConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        let endpoint = format!(
            "{}/v1/chat/completions",
            config.base_url.trim_end_matches('/')
        );

        Ok(Self {
            http_client,
            endpoint,
            config,
        })
    }

    /// Full chat completions URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the request and classify non-success statuses
    async fn send(&self, call: &UpstreamCall, stream: bool) -> Result<Response, GatewayError> {
        let body = ChatCompletionRequest {
            model: &call.model,
            messages: &call.messages,
            stream,
        };

        let mut request = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body);

        if self.config.forward_caller_credential {
            if let Some(credential) = &call.caller_credential {
                let name = HeaderName::from_bytes(self.config.caller_credential_header.as_bytes())
                    .map_err(|e| GatewayError::Configuration(e.to_string()))?;
                let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
                    .map_err(|_| {
                        GatewayError::Configuration(
                            "caller credential is not a valid header value".to_string(),
                        )
                    })?;
                value.set_sensitive(true);
                request = request.header(name, value);
            }
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let body = scrub(&truncate(&raw, MAX_LOGGED_BODY));
            warn!(status = status.as_u16(), body = %body, "upstream returned error status");
            return Err(GatewayError::from_status(status.as_u16(), body));
        }

        debug!(status = status.as_u16(), stream, "upstream accepted request");
        Ok(response)
    }
}

#[async_trait]
impl CompletionGateway for GatewayClient {
    #[instrument(skip_all, fields(model = %call.model, messages = call.messages.len()))]
    async fn open_stream(&self, call: UpstreamCall) -> Result<ChunkStream, GatewayError> {
        let response = self.send(&call, true).await?;
        Ok(response.bytes_stream().map_err(GatewayError::from).boxed())
    }

    #[instrument(skip_all, fields(model = %call.model, messages = call.messages.len()))]
    async fn complete(&self, call: UpstreamCall) -> Result<String, GatewayError> {
        let response = self.send(&call, false).await?;
        let envelope: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        envelope
            .into_text()
            .ok_or_else(|| GatewayError::InvalidResponse("response had no message content".to_string()))
    }
}

/// Cut `text` to at most `max` characters.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

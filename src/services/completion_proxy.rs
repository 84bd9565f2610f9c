//! Streaming completion proxy.
//!
//! Stateless: every call validates, builds the persona-prefixed messages and
//! makes exactly one upstream request. Streamed bytes are relayed as they
//! arrive, never buffered or rewritten.

use futures::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::notation_formatter;
use super::prompt_builder::PromptBuilder;
use crate::domain::errors::{GenerationError, GenerationResult};
use crate::domain::models::{GenerationRequest, PersonaRegistry};
use crate::domain::ports::{ChunkStream, CompletionGateway, UpstreamCall};
use crate::infrastructure::logging::scrub;

/// Characters of an unparseable completion kept in the log line.
const UNPARSEABLE_LOG_PREFIX: usize = 200;

/// Persona-aware front for a [`CompletionGateway`].
#[derive(Clone)]
pub struct CompletionProxy {
    gateway: Arc<dyn CompletionGateway>,
    prompts: PromptBuilder,
    model: String,
}

impl CompletionProxy {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        personas: Arc<PersonaRegistry>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            prompts: PromptBuilder::new(personas),
            model: model.into(),
        }
    }

    /// Registry used to build system prompts.
    pub fn personas(&self) -> &PersonaRegistry {
        self.prompts.personas()
    }

    fn prepare(&self, request: &GenerationRequest) -> GenerationResult<UpstreamCall> {
        let messages = self.prompts.build(request)?;
        Ok(UpstreamCall {
            model: self.model.clone(),
            messages,
            caller_credential: request.caller_credential.clone(),
        })
    }

    /// Open a streamed completion.
    ///
    /// Resolves once the upstream has accepted the request. A failure after
    /// that point ends the stream with an error item; nothing already sent
    /// is retracted.
    #[instrument(skip_all, fields(variant = %request.variant))]
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult<ChunkStream> {
        let call = self.prepare(request)?;
        let stream = self
            .gateway
            .open_stream(call)
            .await
            .map_err(GenerationError::from)
            .inspect_err(log_failure)?;

        info!("upstream stream opened");
        Ok(stream
            .inspect_err(|err| warn!(error = %err, "upstream stream interrupted"))
            .boxed())
    }

    /// Await the whole completion as text.
    ///
    /// Notation formatting is applied when the request asks for it.
    #[instrument(skip_all, fields(variant = %request.variant))]
    pub async fn complete_text(&self, request: &GenerationRequest) -> GenerationResult<String> {
        let call = self.prepare(request)?;
        let text = self
            .gateway
            .complete(call)
            .await
            .map_err(GenerationError::from)
            .inspect_err(log_failure)?;

        if request.format_notation {
            Ok(notation_formatter::format(&text))
        } else {
            Ok(text)
        }
    }

    /// Await the completion and decode it as JSON.
    ///
    /// Fails with [`GenerationError::ResponseUnparseable`] rather than
    /// returning partially decoded data.
    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        request: &GenerationRequest,
    ) -> GenerationResult<T> {
        let call = self.prepare(request)?;
        let text = self
            .gateway
            .complete(call)
            .await
            .map_err(GenerationError::from)
            .inspect_err(log_failure)?;
        decode_structured(&text)
    }
}

fn log_failure(err: &GenerationError) {
    match err {
        GenerationError::MalformedRequest(_) => {}
        GenerationError::RateLimited | GenerationError::QuotaExhausted => {
            warn!(status = err.http_status(), "upstream refused request");
        }
        GenerationError::UpstreamUnavailable(detail) | GenerationError::ResponseUnparseable(detail) => {
            warn!(status = err.http_status(), detail = %scrub(detail), "upstream call failed");
        }
    }
}

/// Strip a surrounding Markdown code fence (` ```json ... ``` `), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Decode model output as JSON, tolerating a code fence around it.
pub fn decode_structured<T: DeserializeOwned>(raw: &str) -> GenerationResult<T> {
    serde_json::from_str(strip_code_fences(raw)).map_err(|err| {
        let prefix: String = raw.chars().take(UNPARSEABLE_LOG_PREFIX).collect();
        warn!(error = %err, raw_prefix = %scrub(&prefix), "structured completion did not decode");
        GenerationError::ResponseUnparseable(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{PersonaVariant, PracticeQuestion};
    use crate::domain::ports::GatewayError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedGateway {
        chunks: Vec<&'static str>,
        text: Option<String>,
        status: Option<u16>,
        /// Keep the stream open after the chunks; flips when it is dropped.
        hang: Option<Arc<AtomicBool>>,
        calls: AtomicUsize,
        last_call: Mutex<Option<UpstreamCall>>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    impl ScriptedGateway {
        fn record(&self, call: UpstreamCall) -> Result<(), GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_call.lock().unwrap() = Some(call);
            match self.status {
                Some(status) => Err(GatewayError::from_status(status, "boom".to_string())),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CompletionGateway for ScriptedGateway {
        async fn open_stream(&self, call: UpstreamCall) -> Result<ChunkStream, GatewayError> {
            self.record(call)?;
            let items: Vec<Result<Bytes, GatewayError>> = self
                .chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect();
            match &self.hang {
                Some(dropped) => {
                    let flag = DropFlag(dropped.clone());
                    Ok(futures::stream::iter(items)
                        .chain(futures::stream::pending())
                        .map(move |item| {
                            let _flag = &flag;
                            item
                        })
                        .boxed())
                }
                None => Ok(futures::stream::iter(items).boxed()),
            }
        }

        async fn complete(&self, call: UpstreamCall) -> Result<String, GatewayError> {
            self.record(call)?;
            Ok(self.text.clone().unwrap_or_default())
        }
    }

    fn proxy(gateway: Arc<ScriptedGateway>) -> CompletionProxy {
        CompletionProxy::new(gateway, Arc::new(PersonaRegistry::builtin()), "test-model")
    }

    fn mentor_request() -> GenerationRequest {
        GenerationRequest::new(PersonaVariant::Mentor).with_prompt("What is v0?")
    }

    #[tokio::test]
    async fn test_stream_preserves_chunk_order_and_bytes() {
        let gateway = Arc::new(ScriptedGateway {
            chunks: vec!["data: {\"a\":1}\n\n", "data: v₀\n\n", "data: [DONE]\n\n"],
            ..Default::default()
        });
        let stream = proxy(gateway.clone()).generate(&mentor_request()).await.unwrap();
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], Bytes::from_static("data: v₀\n\n".as_bytes()));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);

        let call = gateway.last_call.lock().unwrap().clone().unwrap();
        assert_eq!(call.model, "test-model");
        assert!(call.messages[0].content.contains("NOTATION"));
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_upstream() {
        let dropped = Arc::new(AtomicBool::new(false));
        let gateway = Arc::new(ScriptedGateway {
            chunks: vec!["data: first\n\n"],
            hang: Some(dropped.clone()),
            ..Default::default()
        });
        let mut stream = proxy(gateway).generate(&mentor_request()).await.unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, Bytes::from_static(b"data: first\n\n"));
        assert!(!dropped.load(Ordering::SeqCst));

        drop(stream);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_malformed_request_makes_no_upstream_call() {
        let gateway = Arc::new(ScriptedGateway::default());
        let request = GenerationRequest::new(PersonaVariant::Notes);
        let err = proxy(gateway.clone()).generate(&request).await.err().unwrap();

        assert!(matches!(err, GenerationError::MalformedRequest(_)));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_status_classification() {
        for (status, expected) in [(429, 429), (402, 402), (503, 500), (400, 500)] {
            let gateway = Arc::new(ScriptedGateway {
                status: Some(status),
                ..Default::default()
            });
            let err = proxy(gateway.clone()).generate(&mentor_request()).await.err().unwrap();
            assert_eq!(err.http_status(), expected, "upstream {status}");
            assert_eq!(gateway.calls.load(Ordering::SeqCst), 1, "no retries");
        }
    }

    #[tokio::test]
    async fn test_complete_text_formats_when_requested() {
        let gateway = Arc::new(ScriptedGateway {
            text: Some("alpha times v0".to_string()),
            ..Default::default()
        });
        let mut request = mentor_request();
        assert_eq!(
            proxy(gateway.clone()).complete_text(&request).await.unwrap(),
            "alpha times v0"
        );

        request.format_notation = true;
        assert_eq!(proxy(gateway).complete_text(&request).await.unwrap(), "α × v₀");
    }

    #[tokio::test]
    async fn test_complete_structured_decodes_fenced_json() {
        let gateway = Arc::new(ScriptedGateway {
            text: Some(
                "```json\n[{\"question\":\"q\",\"options\":[\"a\",\"b\",\"c\",\"d\"],\"correct_answer\":2}]\n```"
                    .to_string(),
            ),
            ..Default::default()
        });
        let request = GenerationRequest::new(PersonaVariant::Questions).with_topic("Physics", "Optics");
        let questions: Vec<PracticeQuestion> =
            proxy(gateway).complete_structured(&request).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, 2);
    }

    #[tokio::test]
    async fn test_complete_structured_rejects_prose() {
        let gateway = Arc::new(ScriptedGateway {
            text: Some("Sure! Here are your questions: 1. ...".to_string()),
            ..Default::default()
        });
        let request = GenerationRequest::new(PersonaVariant::Questions).with_topic("Physics", "Optics");
        let err = proxy(gateway)
            .complete_structured::<Vec<PracticeQuestion>>(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::ResponseUnparseable(_)));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fences("  [3]  "), "[3]");
    }
}

//! Common test utilities for integration tests
//!
//! Provides a scripted in-memory gateway and request helpers shared across
//! integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use mentor_gateway::domain::models::{ChatRole, GenerationRequest, PersonaVariant};
use mentor_gateway::domain::ports::{ChunkStream, CompletionGateway, GatewayError, UpstreamCall};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the scripted gateway answers with.
pub enum Script {
    Chunks(Vec<&'static str>),
    Text(String),
    Status(u16),
    /// Sends one chunk, then never finishes. `dropped` flips once the
    /// stream is released.
    Hanging {
        first: &'static str,
        dropped: Arc<AtomicBool>,
    },
}

/// Sets its flag when dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// In-memory [`CompletionGateway`] that records every call.
pub struct ScriptedGateway {
    script: Script,
    calls: AtomicUsize,
    last_call: Mutex<Option<UpstreamCall>>,
}

impl ScriptedGateway {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<UpstreamCall> {
        self.last_call.lock().unwrap().clone()
    }

    /// Content of the last user message sent upstream.
    pub fn last_user_message(&self) -> Option<String> {
        self.last_call().and_then(|call| {
            call.messages
                .iter()
                .rev()
                .find(|m| m.role == ChatRole::User)
                .map(|m| m.content.clone())
        })
    }

    fn record(&self, call: UpstreamCall) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some(call);
        match self.script {
            Script::Status(status) => Err(GatewayError::from_status(status, "upstream body".to_string())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn open_stream(&self, call: UpstreamCall) -> Result<ChunkStream, GatewayError> {
        self.record(call)?;
        let chunks: Vec<Result<Bytes, GatewayError>> = match &self.script {
            Script::Chunks(chunks) => chunks.iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))).collect(),
            Script::Text(text) => vec![Ok(Bytes::from(text.clone()))],
            Script::Status(_) => Vec::new(),
            Script::Hanging { first, dropped } => {
                let flag = DropFlag(dropped.clone());
                return Ok(futures::stream::iter([Ok(Bytes::from_static(first.as_bytes()))])
                    .chain(futures::stream::pending())
                    .map(move |item| {
                        let _flag = &flag;
                        item
                    })
                    .boxed());
            }
        };
        Ok(futures::stream::iter(chunks).boxed())
    }

    async fn complete(&self, call: UpstreamCall) -> Result<String, GatewayError> {
        self.record(call)?;
        match &self.script {
            Script::Chunks(chunks) => Ok(chunks.concat()),
            Script::Text(text) => Ok(text.clone()),
            Script::Hanging { first, .. } => Ok(first.to_string()),
            Script::Status(_) => unreachable!("status scripts fail in record"),
        }
    }
}

/// Mentor request with a single prompt.
pub fn mentor_request(prompt: &str) -> GenerationRequest {
    GenerationRequest::new(PersonaVariant::Mentor).with_prompt(prompt)
}

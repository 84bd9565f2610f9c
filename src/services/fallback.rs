//! Two-tier generation: upstream first, deterministic local template second.
//!
//! The fallback tier only covers failures that are not the caller's fault
//! (rate limit, quota, upstream outage). Practice questions never fall back.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::completion_proxy::CompletionProxy;
use super::notation_formatter;
use crate::domain::errors::GenerationResult;
use crate::domain::models::{GenerationRequest, LanguageMode, PersonaVariant};

/// Which tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    Upstream,
    Fallback,
}

/// Text result with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TieredOutput {
    pub content: String,
    pub source: GenerationSource,
}

/// Local, offline content for a request.
pub trait LocalFallback: Send + Sync {
    /// `None` when this variant has no local template.
    fn render(&self, request: &GenerationRequest) -> Option<String>;
}

/// Fixed study-guidance templates filled with the request's topic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateFallback;

impl LocalFallback for TemplateFallback {
    fn render(&self, request: &GenerationRequest) -> Option<String> {
        let topic = request
            .topic_text()
            .or_else(|| request.chapter_text())
            .or_else(|| request.subject_text())
            .unwrap_or("this topic");
        let colloquial = request.language == LanguageMode::Colloquial;

        match request.variant {
            PersonaVariant::Mentor => Some(mentor_fallback(topic, colloquial)),
            PersonaVariant::Notes => Some(notes_fallback(topic)),
            PersonaVariant::Explanation => Some(explanation_fallback(colloquial)),
            PersonaVariant::Questions => None,
        }
    }
}

fn mentor_fallback(topic: &str, colloquial: bool) -> String {
    if colloquial {
        format!(
            "Abhi AI mentor se connect nahi ho pa raha, par padhai rukni nahi chahiye.\n\
             1. {topic} ke NCERT concepts ek baar dhyan se padho.\n\
             2. Saare important formulas ek page par likho aur yaad karo.\n\
             3. Kam se kam 20 previous-year questions solve karo.\n\
             4. Galtiyan ek notebook mein note karo.\n\
             Thodi der baad phir se poochna."
        )
    } else {
        format!(
            "The AI mentor is unavailable right now. Do not stop studying.\n\
             1. Re-read the NCERT concepts for {topic} carefully.\n\
             2. Write every important formula on a single page and revise it.\n\
             3. Solve at least 20 previous-year questions.\n\
             4. Record every mistake in your error notebook.\n\
             Ask again in a few minutes."
        )
    }
}

fn notes_fallback(topic: &str) -> String {
    format!(
        "# {topic}\n\n\
         ## Overview\n\
         Detailed notes could not be generated right now. Use this outline to build your own.\n\n\
         ## Key concepts\n\
         - Definitions and the physical or chemical meaning of each term\n\
         - Standard results and the conditions under which they hold\n\n\
         ## Important formulas\n\
         - List each formula on its own line and define every symbol with units\n\n\
         ## Common mistakes\n\
         - Sign conventions, unit conversions and missed special cases\n\n\
         ## Quick revision\n\
         - Solve 10 previous-year questions on {topic} and review every wrong answer"
    )
}

fn explanation_fallback(colloquial: bool) -> String {
    if colloquial {
        "Detailed explanation abhi available nahi hai. Yeh approach follow karo:\n\
         1. Concept pehchano jo question test kar raha hai.\n\
         2. Given data aur asked quantity alag likho, units ke saath.\n\
         3. Relevant formula likho aur step by step values daalo.\n\
         4. Answer ki units aur options se match check karo."
            .to_string()
    } else {
        "A detailed explanation is unavailable right now. Work through it this way:\n\
         1. Identify the concept the question is testing.\n\
         2. Write down the given data and the asked quantity, with units.\n\
         3. Write the relevant formula and substitute values step by step.\n\
         4. Check the units of your answer and compare with the options."
            .to_string()
    }
}

/// Upstream generation with a local safety net.
#[derive(Clone)]
pub struct TieredGenerator {
    primary: CompletionProxy,
    fallback: Arc<dyn LocalFallback>,
}

impl TieredGenerator {
    pub fn new(primary: CompletionProxy, fallback: Arc<dyn LocalFallback>) -> Self {
        Self { primary, fallback }
    }

    /// Upstream completion, or the local template when the upstream failure
    /// class permits it and the variant has one.
    #[instrument(skip_all, fields(variant = %request.variant))]
    pub async fn generate_text(&self, request: &GenerationRequest) -> GenerationResult<TieredOutput> {
        match self.primary.complete_text(request).await {
            Ok(content) => Ok(TieredOutput {
                content,
                source: GenerationSource::Upstream,
            }),
            Err(err) if err.allows_fallback() => match self.fallback.render(request) {
                Some(content) => {
                    info!(reason = %err, "serving local fallback");
                    let content = if request.format_notation {
                        notation_formatter::format(&content)
                    } else {
                        content
                    };
                    Ok(TieredOutput {
                        content,
                        source: GenerationSource::Fallback,
                    })
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }
}

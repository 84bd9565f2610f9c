//! Builds the outbound chat messages for a generation request.
//!
//! Validation happens here, before any upstream call, so a request without
//! enough context never spends upstream quota.

use std::sync::Arc;

use crate::domain::errors::{GenerationError, GenerationResult};
use crate::domain::models::{
    ChatMessage, ChatRole, GenerationRequest, PersonaRegistry, PersonaVariant,
};

/// Longest accepted free-text prompt, in characters.
pub const MAX_PROMPT_CHARS: usize = 8_000;

/// Most recent conversation turns kept for the mentor.
pub const MAX_HISTORY_MESSAGES: usize = 40;

/// Question count bounds for the questions persona.
pub const QUESTION_COUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=30;

const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Persona-aware message builder.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    personas: Arc<PersonaRegistry>,
}

impl PromptBuilder {
    pub const fn new(personas: Arc<PersonaRegistry>) -> Self {
        Self { personas }
    }

    /// Registry this builder draws templates from.
    pub fn personas(&self) -> &PersonaRegistry {
        &self.personas
    }

    /// System message followed by the variant-specific conversation.
    pub fn build(&self, request: &GenerationRequest) -> GenerationResult<Vec<ChatMessage>> {
        if let Some(prompt) = request.prompt_text() {
            let length = prompt.chars().count();
            if length > MAX_PROMPT_CHARS {
                return Err(GenerationError::MalformedRequest(format!(
                    "prompt is too long ({length} characters, maximum {MAX_PROMPT_CHARS})"
                )));
            }
        }

        let template = self.personas.get(request.variant);
        let mut messages = vec![ChatMessage::system(template.system_prompt(request.language))];

        match request.variant {
            PersonaVariant::Mentor => messages.extend(mentor_turns(request)?),
            PersonaVariant::Notes => messages.push(ChatMessage::user(notes_instruction(request)?)),
            PersonaVariant::Questions => {
                messages.push(ChatMessage::user(questions_instruction(request)?));
            }
            PersonaVariant::Explanation => {
                messages.push(ChatMessage::user(explanation_instruction(request)?));
            }
        }

        Ok(messages)
    }
}

fn mentor_turns(request: &GenerationRequest) -> GenerationResult<Vec<ChatMessage>> {
    let history: Vec<ChatMessage> = request.conversation().cloned().collect();
    let skip = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    let mut turns: Vec<ChatMessage> = history.into_iter().skip(skip).collect();

    if let Some(prompt) = request.prompt_text() {
        turns.push(ChatMessage::user(prompt));
    }

    if !turns.iter().any(|m| m.role == ChatRole::User) {
        return Err(GenerationError::MalformedRequest(
            "mentor requests need a prompt or at least one user message".to_string(),
        ));
    }
    Ok(turns)
}

/// "Physics > Kinematics > Projectile motion", skipping missing parts.
fn topic_path(request: &GenerationRequest) -> String {
    [request.subject_text(), request.chapter_text(), request.topic_text()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" > ")
}

fn exam_label(request: &GenerationRequest) -> &'static str {
    request.exam.map_or("JEE/NEET", |e| e.label())
}

fn with_extra_instructions(mut instruction: String, request: &GenerationRequest) -> String {
    if let Some(prompt) = request.prompt_text() {
        instruction.push_str("\n\nAdditional instructions from the student:\n");
        instruction.push_str(prompt);
    }
    instruction
}

fn notes_instruction(request: &GenerationRequest) -> GenerationResult<String> {
    if request.topic_text().is_none() && request.prompt_text().is_none() {
        return Err(GenerationError::MalformedRequest(
            "notes requests need a topic or a prompt".to_string(),
        ));
    }
    let path = topic_path(request);
    let instruction = if path.is_empty() {
        format!("Create {} revision notes.", exam_label(request))
    } else {
        format!("Create {} revision notes for: {path}.", exam_label(request))
    };
    Ok(with_extra_instructions(instruction, request))
}

fn questions_instruction(request: &GenerationRequest) -> GenerationResult<String> {
    if request.topic_text().is_none() && request.prompt_text().is_none() {
        return Err(GenerationError::MalformedRequest(
            "question requests need a topic or a prompt".to_string(),
        ));
    }
    let count = request.count.unwrap_or(DEFAULT_QUESTION_COUNT);
    if !QUESTION_COUNT_RANGE.contains(&count) {
        return Err(GenerationError::MalformedRequest(format!(
            "count must be between {} and {}",
            QUESTION_COUNT_RANGE.start(),
            QUESTION_COUNT_RANGE.end()
        )));
    }

    let path = topic_path(request);
    let scope = if path.is_empty() {
        String::new()
    } else {
        format!(" on {path}")
    };
    let instruction = format!(
        "Generate exactly {count} {} {} multiple-choice questions{scope}. \
         Respond with the JSON array only.",
        request.difficulty.as_str(),
        exam_label(request),
    );
    Ok(with_extra_instructions(instruction, request))
}

fn explanation_instruction(request: &GenerationRequest) -> GenerationResult<String> {
    let question = request.prompt_text().ok_or_else(|| {
        GenerationError::MalformedRequest("explanation requests need the question in prompt".to_string())
    })?;
    let path = topic_path(request);
    let context = if path.is_empty() {
        String::new()
    } else {
        format!(" ({path})")
    };
    Ok(format!(
        "Explain the solution to this {} question{context}:\n\n{question}",
        exam_label(request)
    ))
}

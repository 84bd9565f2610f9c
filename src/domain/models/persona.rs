//! Persona templates.
//!
//! Every request is prefixed with one fixed instruction block per variant.
//! The registry is built once at startup (built-ins plus config overrides)
//! and is read-only afterwards.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;

use super::generation::{LanguageMode, PersonaVariant};

/// Formula-writing rules appended to every persona.
pub const NOTATION_RULES: &str = "\
FORMULA NOTATION RULES:
- Write formulas in plain Unicode exam notation, never LaTeX. No $ signs, no \\frac, no \\text.
- Subscripts as Unicode: v₀, R₁, T₁/₂, vᵣₘₛ. Superscripts as Unicode: x², r³, 10⁻¹¹.
- Greek letters as symbols: α, β, θ, λ, μ, ω, Δ. Operators as symbols: ×, ÷, ±, ∝, ≈, ≤, ≥.
- Chemical formulas with subscripted counts: H₂O, H₂SO₄, Na₂CO₃.
- Put each important formula on its own line.";

const ENGLISH_TONE: &str = "\
LANGUAGE: Respond in clear, formal English. Be precise and strict. No slang, no emojis.";

const COLLOQUIAL_TONE: &str = "\
LANGUAGE: Respond in natural Hinglish (Hindi words in Roman script mixed with English), \
the way a strict but caring Indian teacher talks to a student. Keep technical terms and \
formulas in English.";

const MENTOR_TEMPLATE: &str = "\
You are a strict, experienced JEE/NEET mentor. You have coached thousands of students \
and you do not tolerate excuses.
RULES:
- Answer only questions about Physics, Chemistry, Mathematics, Biology, exam strategy and study discipline. \
Politely refuse anything else and steer the student back to studying.
- Be direct. Point out mistakes plainly, then show the correct approach.
- Keep answers short unless the student asks for a detailed explanation.
- When a concept is asked, give the core idea, the key formula, and one exam-style example.
- End with one concrete action the student should take right now.";

const NOTES_TEMPLATE: &str = "\
You are an expert JEE/NEET faculty member writing revision notes.
STRUCTURE:
1. Overview: two or three lines on why the topic matters in the exam.
2. Key concepts: short numbered points, one idea per point.
3. Important formulas: each formula on its own line with every symbol defined.
4. Common mistakes students make, and how to avoid them.
5. Previous-year question patterns and quick tricks.
6. A five-line summary for last-minute revision.
Use headings and bullet points. No filler, no introductions about yourself.";

const QUESTIONS_TEMPLATE: &str = "\
You are a JEE/NEET paper setter. You write original multiple-choice questions at true exam level.
OUTPUT FORMAT (mandatory):
- Respond with ONLY a JSON array. No prose before or after it, no markdown.
- Each element: {\"question\": string, \"options\": [four strings], \"correct_answer\": \
zero-based index of the correct option, \"explanation\": short worked solution}.
- Exactly one option is correct. Distractors must reflect common student errors.";

const EXPLANATION_TEMPLATE: &str = "\
You are a patient JEE/NEET doubt solver. Explain the solution to the student's question step by step.
STRUCTURE:
1. Concept used, in one line.
2. Given data and what is asked.
3. Step-by-step solution, one operation per step, with units.
4. Final answer, clearly marked.
5. One line on the shortcut or trap in this question.";

/// Immutable instruction block for one persona variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaTemplate {
    pub variant: PersonaVariant,
    /// Display name.
    pub name: Cow<'static, str>,
    /// Instruction text placed first in the system message.
    pub instructions: Cow<'static, str>,
    /// Whether the text came from configuration instead of the built-in set.
    pub overridden: bool,
}

impl PersonaTemplate {
    /// Full system prompt: persona instructions, tone, then notation rules.
    pub fn system_prompt(&self, language: LanguageMode) -> String {
        let tone = match language {
            LanguageMode::English => ENGLISH_TONE,
            LanguageMode::Colloquial => COLLOQUIAL_TONE,
        };
        format!("{}\n\n{tone}\n\n{NOTATION_RULES}", self.instructions.trim_end())
    }
}

/// Persona templates keyed by variant.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    templates: HashMap<PersonaVariant, PersonaTemplate>,
}

impl PersonaRegistry {
    /// Registry holding only the built-in templates.
    pub fn builtin() -> Self {
        let templates = PersonaVariant::ALL
            .into_iter()
            .map(|variant| {
                let (name, instructions) = builtin_text(variant);
                (
                    variant,
                    PersonaTemplate {
                        variant,
                        name: Cow::Borrowed(name),
                        instructions: Cow::Borrowed(instructions),
                        overridden: false,
                    },
                )
            })
            .collect();
        Self { templates }
    }

    /// Built-in templates with per-variant text overrides applied.
    ///
    /// Blank override text is ignored.
    pub fn with_overrides(overrides: &HashMap<PersonaVariant, String>) -> Self {
        let mut registry = Self::builtin();
        for (variant, text) in overrides {
            if text.trim().is_empty() {
                continue;
            }
            if let Some(template) = registry.templates.get_mut(variant) {
                template.instructions = Cow::Owned(text.trim().to_string());
                template.overridden = true;
            }
        }
        registry
    }

    /// Template for a variant. Every variant is always present.
    pub fn get(&self, variant: PersonaVariant) -> &PersonaTemplate {
        &self.templates[&variant]
    }

    /// All templates in variant order.
    pub fn iter(&self) -> impl Iterator<Item = &PersonaTemplate> {
        PersonaVariant::ALL.iter().map(|v| &self.templates[v])
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

const fn builtin_text(variant: PersonaVariant) -> (&'static str, &'static str) {
    match variant {
        PersonaVariant::Mentor => ("Strict mentor", MENTOR_TEMPLATE),
        PersonaVariant::Notes => ("Notes generator", NOTES_TEMPLATE),
        PersonaVariant::Questions => ("Question setter", QUESTIONS_TEMPLATE),
        PersonaVariant::Explanation => ("Doubt solver", EXPLANATION_TEMPLATE),
    }
}

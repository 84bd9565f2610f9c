//! Scientific notation formatter.
//!
//! Rewrites loose shorthand (`v0`, `x squared`, `power(-11)`, `alpha`) into
//! exam-style Unicode notation. The rewrite is a fixed sequence of passes;
//! every pass scans the whole string before the next one starts, so later
//! passes see earlier output:
//!
//! 1. structural phrases (`squared`, `cubed`, `power`)
//! 2. explicit `_` / `^` markers
//! 3. implicit identifiers (`v0`, `H2O`)
//! 4. Greek letter names and operator words, longest first
//! 5. domain idioms (`v rms`, `T half`)
//! 6. whitespace normalization
//!
//! `format` is total. Anything not recognized passes through unchanged, and a
//! character with no small glyph is kept as is rather than dropped.

use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

use crate::domain::models::notation::{DOMAIN_IDIOMS, GREEK_LETTERS, OPERATOR_WORDS};
use crate::domain::models::{Script, TokenCategory};

static STANDARD: LazyLock<NotationFormatter> = LazyLock::new(NotationFormatter::standard);

static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("valid space-run pattern"));

/// Format `input` with the standard rule set.
pub fn format(input: &str) -> String {
    STANDARD.format(input)
}

/// Format with the standard rule set and report every rewrite.
pub fn format_with_tokens(input: &str) -> (String, Vec<RawToken>) {
    STANDARD.format_with_tokens(input)
}

/// A candidate token matched by one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawToken {
    /// Matched text as it appeared when the rule ran.
    pub text: String,
    pub category: TokenCategory,
    /// What it was rewritten to.
    pub replacement: String,
}

enum Replacement {
    /// Keep the `base` capture, append a fixed suffix.
    Suffix(&'static str),
    /// Keep the optional `base` capture, script-encode the `body` capture.
    Encode(Script),
    /// Script-encode every ASCII digit of the match.
    EncodeDigits(Script),
    /// Replace the `key` capture with its table entry. An optional `tail`
    /// capture follows the glyph, digits subscripted, `_` markers verbatim.
    Lookup(HashMap<&'static str, &'static str>),
}

/// Ordered pair of match pattern and replacement policy.
pub struct SubstitutionRule {
    name: &'static str,
    category: TokenCategory,
    pattern: Regex,
    replacement: Replacement,
}

impl SubstitutionRule {
    fn new(
        name: &'static str,
        category: TokenCategory,
        pattern: &str,
        replacement: Replacement,
    ) -> Self {
        Self {
            name,
            category,
            pattern: Regex::new(pattern).expect("valid notation rule pattern"),
            replacement,
        }
    }

    /// Lookup over a table, longest key first, anchored at a word start.
    ///
    /// Words inside a key may be separated by any run of spaces or tabs.
    /// `trailing` closes the key: `\b` for whole words, or a pattern that may
    /// capture a `tail` kept after the glyph.
    fn lookup(
        name: &'static str,
        category: TokenCategory,
        tables: &[&[(&'static str, &'static str)]],
        trailing: &str,
    ) -> Self {
        let mut entries: Vec<(&'static str, &'static str)> =
            tables.iter().flat_map(|t| t.iter().copied()).collect();
        entries.sort_by(|(a, _), (b, _)| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));

        let alternatives: Vec<String> = entries
            .iter()
            .map(|(key, _)| {
                key.split(' ')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"[ \t]+")
            })
            .collect();
        let pattern = format!(r"\b(?P<key>{}){trailing}", alternatives.join("|"));

        Self::new(
            name,
            category,
            &pattern,
            Replacement::Lookup(entries.into_iter().collect()),
        )
    }

    /// Rule name, for logs.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Category of tokens this rule recognizes.
    pub const fn category(&self) -> TokenCategory {
        self.category
    }

    fn apply(&self, text: &str, tokens: &mut Option<&mut Vec<RawToken>>) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let replacement = self.rewrite(caps);
                if let Some(tokens) = tokens.as_deref_mut() {
                    tokens.push(RawToken {
                        text: caps[0].to_string(),
                        category: self.category,
                        replacement: replacement.clone(),
                    });
                }
                replacement
            })
            .into_owned()
    }

    fn rewrite(&self, caps: &Captures<'_>) -> String {
        let whole = &caps[0];
        let base = caps.name("base").map_or("", |m| m.as_str());
        match &self.replacement {
            Replacement::Suffix(suffix) => format!("{base}{suffix}"),
            Replacement::Encode(script) => {
                let body: String = caps
                    .name("body")
                    .map_or("", |m| m.as_str())
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                format!("{base}{}", script.encode(&body))
            }
            Replacement::EncodeDigits(script) => whole
                .chars()
                .map(|c| {
                    if c.is_ascii_digit() {
                        script.map_char(c).unwrap_or(c)
                    } else {
                        c
                    }
                })
                .collect(),
            Replacement::Lookup(table) => {
                let matched = caps.name("key").map_or(whole, |m| m.as_str());
                let key = matched.split_whitespace().collect::<Vec<_>>().join(" ");
                let glyph = table.get(key.as_str()).copied().unwrap_or(matched);
                match caps.name("tail").map(|m| m.as_str()) {
                    Some(marker) if marker.starts_with('_') => format!("{glyph}{marker}"),
                    Some(tail) => format!("{glyph}{}", Script::Subscript.encode(tail)),
                    None => glyph.to_string(),
                }
            }
        }
    }
}

/// Ordered passes of substitution rules.
pub struct NotationFormatter {
    passes: Vec<Vec<SubstitutionRule>>,
}

impl NotationFormatter {
    /// The standard exam-notation rule set.
    pub fn standard() -> Self {
        // A symbol-like base: one letter with optional digits, a number, or a closing bracket.
        // Prose words never qualify, so "sum of squared errors" is left alone.
        const SYMBOL: &str = r"\b[A-Za-z][0-9]*|\b[0-9]+(?:\.[0-9]+)?|[)\]}]";
        const POWER_PHRASE: &str = r"\b(?:raised[ \t]+)?(?:to[ \t]+the[ \t]+)?power";
        // Subscript glyphs that may already follow a Greek name after the marker pass.
        const SUBSCRIPT_TAIL: &str = r"[0-9\x{2080}-\x{209C}\x{1D62}-\x{1D65}\x{2C7C}]+";

        let greek_names = GREEK_LETTERS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join("|");
        let squared_base = format!(r"(?P<base>\b(?:{greek_names})|{SYMBOL})");

        let structural = vec![
            SubstitutionRule::new(
                "squared",
                TokenCategory::StructuralPhrase,
                &format!(r"{squared_base}[ \t]+squared\b"),
                Replacement::Suffix("²"),
            ),
            SubstitutionRule::new(
                "cubed",
                TokenCategory::StructuralPhrase,
                &format!(r"{squared_base}[ \t]+cubed\b"),
                Replacement::Suffix("³"),
            ),
            SubstitutionRule::new(
                "power_call",
                TokenCategory::StructuralPhrase,
                // The call form stands alone too: "power(-11)" -> "⁻¹¹"
                &format!(r"(?:(?P<base>{SYMBOL})[ \t]*)?{POWER_PHRASE}[ \t]*\((?P<body>[^()\n]*)\)"),
                Replacement::Encode(Script::Superscript),
            ),
            SubstitutionRule::new(
                "power_word",
                TokenCategory::StructuralPhrase,
                // The bare word form needs a base: "the power 100 W" is prose
                &format!(r"(?P<base>{SYMBOL})[ \t]*{POWER_PHRASE}[ \t]+(?P<body>[+\-−]?[0-9]+)\b"),
                Replacement::Encode(Script::Superscript),
            ),
        ];

        let markers = vec![
            SubstitutionRule::new(
                "subscript_group",
                TokenCategory::ScriptMarker,
                r"_\{(?P<body>[^{}\n]*)\}",
                Replacement::Encode(Script::Subscript),
            ),
            SubstitutionRule::new(
                "subscript_char",
                TokenCategory::ScriptMarker,
                // Letters only when every one has a subscript glyph; "x_H" keeps its marker
                r"_(?P<body>[0-9]+|[aehijklmnoprstuvx]{1,4}\b)",
                Replacement::Encode(Script::Subscript),
            ),
            SubstitutionRule::new(
                "superscript_group",
                TokenCategory::ScriptMarker,
                r"\^\{(?P<body>[^{}\n]*)\}",
                Replacement::Encode(Script::Superscript),
            ),
            SubstitutionRule::new(
                "superscript_paren",
                TokenCategory::ScriptMarker,
                r"\^\((?P<body>[^()\n]*)\)",
                Replacement::Encode(Script::Superscript),
            ),
            SubstitutionRule::new(
                "superscript_char",
                TokenCategory::ScriptMarker,
                r"\^(?P<body>[+\-−]?[0-9]+|[a-pr-zABDEG-PRTUVW]\b)",
                Replacement::Encode(Script::Superscript),
            ),
        ];

        let identifiers = vec![
            // H2O, Na2CO3: element symbols with at most two-digit counts.
            // A lone two-letter element needs a count: Cl2, Br2
            SubstitutionRule::new(
                "chemical_formula",
                TokenCategory::SubscriptIdentifier,
                r"\b(?:(?:[A-Z][a-z]?[0-9]{0,2}){2,}|[A-Z][a-z][0-9]{1,2})\b",
                Replacement::EncodeDigits(Script::Subscript),
            ),
            SubstitutionRule::new(
                "letter_digits",
                TokenCategory::SubscriptIdentifier,
                r"\b(?P<base>[A-Za-z])(?P<body>[0-9]+)",
                Replacement::Encode(Script::Subscript),
            ),
        ];

        let entities = vec![
            // theta0 -> θ₀, sigmaₓ -> σₓ, delta_H -> δ_H
            SubstitutionRule::lookup(
                "greek_letters",
                TokenCategory::GreekLetter,
                &[GREEK_LETTERS],
                &format!(r"(?:(?P<tail>{SUBSCRIPT_TAIL}|_[A-Za-z]+\b)|\b)"),
            ),
            SubstitutionRule::lookup(
                "operator_words",
                TokenCategory::OperatorWord,
                &[OPERATOR_WORDS],
                r"\b",
            ),
        ];

        let idioms = vec![SubstitutionRule::lookup(
            "domain_idioms",
            TokenCategory::Idiom,
            &[DOMAIN_IDIOMS],
            r"\b",
        )];

        Self {
            passes: vec![structural, markers, identifiers, entities, idioms],
        }
    }

    /// Rewrite `input`. Total: never fails, never drops characters it cannot map.
    pub fn format(&self, input: &str) -> String {
        self.run(input, None)
    }

    /// Rewrite `input` and report every token that was substituted, in
    /// application order.
    pub fn format_with_tokens(&self, input: &str) -> (String, Vec<RawToken>) {
        let mut tokens = Vec::new();
        let formatted = self.run(input, Some(&mut tokens));
        (formatted, tokens)
    }

    /// Rules in application order.
    pub fn rules(&self) -> impl Iterator<Item = &SubstitutionRule> {
        self.passes.iter().flatten()
    }

    fn run(&self, input: &str, mut tokens: Option<&mut Vec<RawToken>>) -> String {
        let mut text = input.to_string();
        for rule in self.rules() {
            let next = rule.apply(&text, &mut tokens);
            if next != text {
                trace!(rule = rule.name(), category = ?rule.category(), "notation rule applied");
                text = next;
            }
        }
        normalize_whitespace(&text)
    }
}

impl Default for NotationFormatter {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize_whitespace(text: &str) -> String {
    SPACE_RUNS.replace_all(text, " ").trim().to_string()
}

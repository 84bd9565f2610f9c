use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

static DEFAULT_SCRUBBER: LazyLock<SecretScrubber> = LazyLock::new(SecretScrubber::new);

/// Scrub `message` with the shared scrubber.
pub fn scrub(message: &str) -> String {
    DEFAULT_SCRUBBER.scrub_message(message)
}

/// Redacts credentials from text before it reaches a log line.
///
/// Applied to anything that originates upstream (error bodies, unparseable
/// completions) since those may echo request headers back.
#[derive(Clone)]
pub struct SecretScrubber {
    api_key_pattern: Regex,
    token_pattern: Regex,
    bearer_pattern: Regex,
    password_pattern: Regex,
}

impl SecretScrubber {
    /// Create a new secret scrubber
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            // Provider-style keys: sk-..., sk-proj-..., sk-ant-...
            api_key_pattern: Regex::new(r"\bsk-[A-Za-z0-9_-]{16,}")
                .expect("api key pattern is valid"),
            token_pattern: Regex::new(
                r#"["']?(?:api_key|apikey|access_token|token|secret)["']?\s*[:=]\s*["']?[A-Za-z0-9_.\-]{16,}["']?"#,
            )
            .expect("token pattern is valid"),
            bearer_pattern: Regex::new(r"(?i)bearer\s+[A-Za-z0-9_.\-~+/=]+")
                .expect("bearer pattern is valid"),
            password_pattern: Regex::new(r#"["']?password["']?\s*[:=]\s*["']?[^"'\s,}]+["']?"#)
                .expect("password pattern is valid"),
        }
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = self
            .bearer_pattern
            .replace_all(message, "Bearer [TOKEN_REDACTED]");
        let scrubbed = self
            .api_key_pattern
            .replace_all(&scrubbed, "[API_KEY_REDACTED]");
        let scrubbed = self.token_pattern.replace_all(&scrubbed, |caps: &Captures| {
            let field = &caps[0];
            field
                .find([':', '='])
                .map_or_else(|| "[REDACTED]".to_string(), |pos| {
                    format!("{}{}[REDACTED]", &field[..pos], &field[pos..=pos])
                })
        });
        self.password_pattern
            .replace_all(&scrubbed, "password=[REDACTED]")
            .into_owned()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}

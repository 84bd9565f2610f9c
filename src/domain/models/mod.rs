pub mod calendar;
pub mod config;
pub mod generation;
pub mod notation;
pub mod persona;

pub use calendar::{AnchorSource, Countdown, CycleAnchors, StudyCycle, CYCLE_LENGTH_DAYS};
pub use config::{Config, GatewayConfig, LoggingConfig, ServerConfig, API_KEY_ENV};
pub use generation::{
    CallerCredential, ChatMessage, ChatRole, Difficulty, Exam, GenerationRequest, LanguageMode,
    PersonaVariant, PracticeQuestion,
};
pub use notation::{Script, TokenCategory};
pub use persona::{PersonaRegistry, PersonaTemplate, NOTATION_RULES};

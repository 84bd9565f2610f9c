//! Mentor Gateway - exam-prep AI backend
//!
//! Two core pieces serve a JEE/NEET preparation app:
//! a scientific notation formatter that turns loose shorthand (`v0`,
//! `power(-11)`, `alpha`) into exam-style Unicode, and a stateless streaming
//! proxy that wraps every request in a persona prompt and relays an upstream
//! chat-completion stream byte for byte.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, error taxonomy and the gateway port
//! - **Service Layer** (`services`): Formatter, prompt building, proxy, fallback, calendar
//! - **Infrastructure Layer** (`infrastructure`): Upstream client, configuration, logging
//! - **Adapters** (`adapters`): HTTP surface
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```
//! assert_eq!(mentor_gateway::format("v0 = 10 power(-11)"), "v₀ = 10⁻¹¹");
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{GenerationError, GenerationResult};
pub use domain::models::{
    Config, GenerationRequest, LanguageMode, PersonaRegistry, PersonaVariant, PracticeQuestion,
};
pub use domain::ports::{CompletionGateway, GatewayError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{format, CompletionProxy, TieredGenerator};

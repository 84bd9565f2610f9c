//! Application services.
//!
//! Pure text transformation ([`notation_formatter`]) and the request-scoped
//! generation pipeline built on the [`CompletionGateway`] port.
//!
//! [`CompletionGateway`]: crate::domain::ports::CompletionGateway

pub mod completion_proxy;
pub mod fallback;
pub mod notation_formatter;
pub mod prompt_builder;
pub mod study_calendar;

pub use completion_proxy::{decode_structured, strip_code_fences, CompletionProxy};
pub use fallback::{GenerationSource, LocalFallback, TemplateFallback, TieredGenerator, TieredOutput};
pub use notation_formatter::{format, format_with_tokens, NotationFormatter, RawToken, SubstitutionRule};
pub use prompt_builder::PromptBuilder;
pub use study_calendar::{CalendarError, CalendarSnapshot, StudyCalendar};

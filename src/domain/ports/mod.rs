//! Port trait definitions (Hexagonal Architecture)
//!
//! - CompletionGateway: upstream chat-completion operations (streaming and
//!   materialized)
//!
//! Infrastructure adapters implement these so services can be tested against
//! in-memory doubles.

pub mod completion_gateway;
pub mod errors;

pub use completion_gateway::{ChunkStream, CompletionGateway, UpstreamCall};
pub use errors::GatewayError;

//! HTTP surface.
//!
//! axum router exposing the streaming proxy, the two-tier text generator,
//! structured question generation, the notation formatter and the study
//! calendar.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use server::{build_router, AppState, GatewayHttpServer, HttpServerConfig};

//! Domain layer for the exam-prep gateway
//!
//! Core request types, persona templates, notation tables and the error
//! taxonomy. Nothing here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{GenerationError, GenerationResult};

//! CLI command implementations.

pub mod countdown;
pub mod format;
pub mod personas;
pub mod serve;

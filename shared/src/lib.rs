//! Shared types for the Bluelight offer engine
//!
//! Model rows and the unified error system used by the engine crate and by
//! applications embedding it.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};

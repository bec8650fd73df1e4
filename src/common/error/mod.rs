//! Unified error types for the stoff library.
//!
//! This module provides a unified error type that encompasses errors from
//! the formula converter and the StarOffice record decoders.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};

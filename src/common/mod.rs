//! Common types and utilities shared by the formula converter and the
//! StarOffice record decoders.

// Submodule declarations
pub mod binary;
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};

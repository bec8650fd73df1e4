//! Markup helpers.

mod escape;

pub use escape::escape_xml;
pub(crate) use escape::push_escaped;

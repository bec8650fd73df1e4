//! MathML output for StarMath formulas.
//!
//! The emitter walks a parsed [`Node`](crate::formula::starmath::Node)
//! tree and produces presentation MathML wrapped in `<semantics>`.
pub mod emitter;
pub mod style;
pub mod symbols;

pub use emitter::{DisplayStyle, MathMlEmitter};
pub use style::Style;

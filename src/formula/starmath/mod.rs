//! StarMath linear notation front end.
//!
//! StarMath is the formula language of StarOffice and OpenOffice Math
//! (`{a over b} + sqrt x`). The [`lexer`] turns formula text into tokens and
//! the [`parser`] builds a [`Node`] tree that the MathML emitter renders.
pub mod error;
pub mod keywords;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod token;

pub use error::{ParseError, ParseResult};
pub use lexer::tokenize;
pub use node::{Node, NodeKind};
pub use parser::{Parser, parse, parse_formula};
pub use token::{Token, TokenKind};

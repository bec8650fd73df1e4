//! Stoff - best-effort import of legacy StarOffice objects
//!
//! This library covers two pieces of the StarOffice 5.x binary world:
//!
//! # Features
//!
//! - **StarMath conversion**: tokenize and parse the StarMath formula
//!   language and render it as MathML ([`formula`])
//! - **Record reader**: read the length-prefixed, versioned records of
//!   StarOffice binary streams with strict framing ([`star::StarZone`])
//! - **Object decoders**: drawing models, chart attribute lists, chart data
//!   tables and Writer bookmarks, decoded partially when damaged ([`star`])
//!
//! # Example - Converting a formula
//!
//! ```
//! use stoff::formula::{ConvertOptions, StarMathConverter};
//!
//! let converter = StarMathConverter::with_options(ConvertOptions::new().with_annotation(false));
//! let mut mathml = String::new();
//! assert!(converter.convert("{a + b} over 2", &mut mathml));
//! assert!(mathml.contains("<mfrac>"));
//! ```
//!
//! # Example - Decoding a drawing model
//!
//! ```no_run
//! use stoff::star::{StarZone, read_model};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut file = std::fs::File::open("Drawing.sdr")?;
//! let mut zone = StarZone::from_reader(&mut file, "DrawingLayer")?;
//! let decoded = read_model(&mut zone)?;
//! println!("{} pages", decoded.value.pages.len());
//! for note in &decoded.notes {
//!     println!("warning: {note}");
//! }
//! # Ok(())
//! # }
//! ```

/// Shared binary primitives, escaping and the unified error type
pub mod common;

/// StarMath parsing and MathML conversion
#[cfg(feature = "formula")]
pub mod formula;

/// StarOffice binary record reader and object-model decoders
#[cfg(feature = "star")]
pub mod star;

pub use common::{Error, Result};

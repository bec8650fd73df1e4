// Formula Module - StarMath parsing and MathML conversion
//
// StarOffice and OpenOffice Math store formulas in the StarMath linear
// notation (`{a over b} + sqrt x`). This module tokenizes and parses that
// notation into a tree and renders the tree as MathML:
//
// - **starmath**: tokenizer, keyword tables and recursive-descent parser
// - **mathml**: MathML emitter with style and alignment handling
//
// # Example
//
// ```
// use stoff::formula::starmath_to_mathml;
//
// let mathml = starmath_to_mathml("a_1 + b^2").unwrap();
// assert!(mathml.contains("<msub><mi>a</mi><mn>1</mn></msub>"));
// ```

/// StarMath tokenizer and parser
pub mod starmath;
/// MathML emitter
pub mod mathml;

pub use mathml::{DisplayStyle, MathMlEmitter};
pub use starmath::{Node, NodeKind, ParseError, parse_formula, tokenize};

use starmath::Parser;

/// Options for StarMath to MathML conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// `display` attribute of the `<math>` element
    pub display: DisplayStyle,
    /// Attach the source formula as a `StarMath 5.0` annotation
    pub annotate: bool,
    /// Maximum nesting depth accepted by the parser
    pub max_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            display: DisplayStyle::Block,
            annotate: true,
            max_depth: starmath::parser::DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display(mut self, display: DisplayStyle) -> Self {
        self.display = display;
        self
    }

    pub fn with_annotation(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Converts StarMath formulas to MathML documents.
#[derive(Debug, Clone, Default)]
pub struct StarMathConverter {
    options: ConvertOptions,
}

impl StarMathConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `formula`, reporting why it could not be parsed.
    pub fn try_convert(&self, formula: &str) -> crate::Result<String> {
        let tokens = tokenize(formula);
        let tree = Parser::new(&tokens)
            .with_max_depth(self.options.max_depth)
            .parse()?;
        let emitter = MathMlEmitter::new().with_display(self.options.display);
        Ok(if self.options.annotate {
            emitter.emit_annotated(&tree, formula)
        } else {
            emitter.emit(&tree)
        })
    }

    /// Convert `formula` and append the MathML document to `output`.
    ///
    /// Returns `false` and leaves `output` untouched when the formula does
    /// not parse.
    pub fn convert(&self, formula: &str, output: &mut String) -> bool {
        match self.try_convert(formula) {
            Ok(mathml) => {
                output.push_str(&mathml);
                true
            },
            Err(e) => {
                log::debug!("cannot convert StarMath formula {formula:?}: {e}");
                false
            },
        }
    }
}

/// Convert a StarMath formula to MathML with default options.
pub fn starmath_to_mathml(formula: &str) -> Option<String> {
    convert_with_options(formula, &ConvertOptions::default())
}

/// Convert a StarMath formula to MathML.
///
/// Returns `None` when the formula does not parse.
pub fn convert_with_options(formula: &str, options: &ConvertOptions) -> Option<String> {
    let mut output = String::new();
    StarMathConverter::with_options(options.clone())
        .convert(formula, &mut output)
        .then_some(output)
}

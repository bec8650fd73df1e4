use thiserror::Error;

/// Grammar dead-ends raised by the StarMath parser.
///
/// Sub-parsers return these to their caller, which may rewind and try a
/// different production; only an error escaping the top level abandons the
/// formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Token stream ended where a term was required
    #[error("unexpected end of formula at token {0}")]
    UnexpectedEnd(usize),

    /// A token that cannot start or continue the current construct
    #[error("unexpected token '{text}' at token {pos}")]
    UnexpectedToken { text: String, pos: usize },

    /// A bracket, brace or `right` was missing
    #[error("expected '{expected}' at token {pos}")]
    Unbalanced { expected: String, pos: usize },

    /// A keyword was not followed by its argument
    #[error("missing argument for '{0}'")]
    MissingArgument(String),

    /// Nesting deeper than the configured limit
    #[error("formula nesting exceeds {0} levels")]
    TooDeep(usize),
}

pub type ParseResult<T> = Result<T, ParseError>;

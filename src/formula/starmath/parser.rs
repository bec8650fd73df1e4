//! Recursive-descent parser for the StarMath notation.
//!
//! Precedence, lowest first:
//!
//! ```text
//! root           := sequence ("newline" sequence)*
//! sequence       := relation*                  (stops at brackets, `right`, `#`)
//! relation       := addition (REL relation)?   (right fold)
//! addition       := multiplication (ADD multiplication)*
//! multiplication := position (MUL position | "boper" SYM position)*
//! position       := unary (SCRIPT unary)*
//! unary          := UNARY unary | "uoper" SYM unary | function
//! function       := FUNC args | ACCENT args | INTEGRAL bounds position
//!                 | ("stack" | "matrix") "{" grid "}" | parenthesis
//! parenthesis    := OPEN sequence CLOSE | "left" BR sequence "right" BR | element
//! ```
//!
//! Every production returns a `Result`. Optional constructs remember the
//! cursor and rewind when the attempt fails.

use super::error::{ParseError, ParseResult};
use super::keywords::{
    ACCENTS, ADDITIONS, AccentKind, BRACKETS, FUNCTIONS, FunctionKind, INTEGRALS, MULTIPLICATIONS,
    OPENING_BRACKETS, POSITIONS, RELATIONS, SLOT_CSUB, SLOT_LSUB, SLOT_RSUB, SYMBOLS,
    UNARY_OPERATORS, is_closing, is_keyword,
};
use super::lexer::tokenize;
use super::node::{Node, NodeKind};
use super::token::{Token, TokenKind};

/// Default recursion limit of the parser.
///
/// Depth counts grammar levels, so one pair of brackets costs four of them.
pub const DEFAULT_MAX_DEPTH: usize = 256;

type OperatorTable = phf::Map<&'static str, &'static str>;

/// Parse a token sequence into a formula tree rooted at a `Root` node.
pub fn parse(tokens: &[Token]) -> ParseResult<Node> {
    Parser::new(tokens).parse()
}

/// Tokenize and parse a formula.
///
/// # Examples
///
/// ```
/// use stoff::formula::starmath::{parse_formula, NodeKind};
///
/// let tree = parse_formula("left ( a right )").unwrap();
/// let paren = tree.content();
/// assert_eq!(paren.kind, NodeKind::Parenthesis);
/// assert_eq!(paren.child(0).unwrap().data, "(");
/// assert_eq!(paren.child(2).unwrap().data, ")");
/// ```
pub fn parse_formula(formula: &str) -> ParseResult<Node> {
    parse(&tokenize(formula))
}

/// StarMath parser over a borrowed token slice.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
    /// `#` and `##` end a sequence while reading a stack or matrix
    in_grid: bool,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            in_grid: false,
        }
    }

    /// Limit the nesting depth; deeper formulas fail with [`ParseError::TooDeep`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the whole token sequence.
    pub fn parse(mut self) -> ParseResult<Node> {
        let mut lines = Vec::new();
        loop {
            lines.push(self.sequence()?);
            self.skip_spaces();
            match self.peek() {
                None => break,
                Some(token) if token.is("newline") => self.pos += 1,
                Some(token) => {
                    return Err(ParseError::UnexpectedToken {
                        text: token.text.clone(),
                        pos: self.pos,
                    });
                },
            }
        }
        Ok(Node::with_children(NodeKind::Root, "", lines))
    }

    // ---------------------------------------------------------------------
    // cursor helpers

    #[inline]
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn expect_some(&self) -> ParseResult<&'t Token> {
        self.peek().ok_or(ParseError::UnexpectedEnd(self.pos))
    }

    /// Skip space tokens, returning the explicit spacing (`~`, `` ` ``) seen.
    fn skip_spaces(&mut self) -> String {
        let mut explicit = String::new();
        while let Some(token) = self.peek().filter(|t| t.is_space()) {
            if token.text == "~" || token.text == "`" {
                explicit.push_str(&token.text);
            }
            self.pos += 1;
        }
        explicit
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            text: token.text.clone(),
            pos: self.pos,
        }
    }

    /// Operator of `table` at the cursor, if any.
    fn operator_at(&self, table: &OperatorTable) -> Option<&'t str> {
        self.peek()
            .filter(|t| matches!(t.kind, TokenKind::Special | TokenKind::Unknown))
            .map(|t| t.text.as_str())
            .filter(|text| table.contains_key(*text))
    }

    fn at_sequence_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(token) => match token.kind {
                TokenKind::Special | TokenKind::Unknown => {
                    token.text == "newline"
                        || is_closing(&token.text)
                        || (self.in_grid && (token.text == "#" || token.text == "##"))
                },
                _ => false,
            },
        }
    }

    fn descend<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.max_depth {
            return Err(ParseError::TooDeep(self.max_depth));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Next non-space token taken verbatim, as used after `boper`, `func`, `size`...
    fn symbol_operand(&mut self, keyword: &str) -> ParseResult<String> {
        self.skip_spaces();
        match self.peek() {
            Some(token) if !self.at_sequence_end() || token.kind == TokenKind::Special => {
                self.pos += 1;
                Ok(token.text.clone())
            },
            _ => Err(ParseError::MissingArgument(keyword.to_string())),
        }
    }

    /// Argument of a function or accent keyword.
    fn argument(&mut self, keyword: &str) -> ParseResult<Node> {
        self.skip_spaces();
        if self.at_sequence_end() {
            return Err(ParseError::MissingArgument(keyword.to_string()));
        }
        self.descend(Self::unary)
    }

    // ---------------------------------------------------------------------
    // grammar

    fn sequence(&mut self) -> ParseResult<Node> {
        self.descend(|p| {
            let mut items = Vec::new();
            loop {
                let save = p.pos;
                let spaces = p.skip_spaces();
                if p.at_sequence_end() {
                    if !spaces.is_empty() {
                        let mut trailing = Node::new(NodeKind::Empty);
                        trailing.spaces = spaces;
                        items.push(trailing);
                    }
                    break;
                }
                p.pos = save;
                items.push(p.relation()?);
            }
            Ok(match items.len() {
                0 => Node::new(NodeKind::Empty),
                1 => items.remove(0),
                _ => Node::with_children(NodeKind::Sequence, "", items),
            })
        })
    }

    /// Parse an operand; if it fails right before an operator of `table`,
    /// rewind and use an empty operand instead.
    fn operand_or_empty(
        &mut self,
        operand: fn(&mut Self) -> ParseResult<Node>,
        table: &OperatorTable,
    ) -> ParseResult<Node> {
        let start = self.pos;
        match operand(self) {
            Ok(node) => Ok(node),
            Err(err) => {
                self.pos = start;
                self.skip_spaces();
                if self.operator_at(table).is_some() {
                    Ok(Node::new(NodeKind::Empty))
                } else {
                    self.pos = start;
                    Err(err)
                }
            },
        }
    }

    fn relation(&mut self) -> ParseResult<Node> {
        let left = self.operand_or_empty(Self::addition, &RELATIONS)?;
        let save = self.pos;
        let spaces = self.skip_spaces();
        let Some(op) = self.operator_at(&RELATIONS) else {
            self.pos = save;
            return Ok(left);
        };
        self.pos += 1;
        let mut right = self.descend(Self::relation)?;
        right.add_leading_spaces(&spaces);
        Ok(Node::with_children(NodeKind::Relation, op, vec![left, right]))
    }

    fn addition(&mut self) -> ParseResult<Node> {
        let mut left = self.operand_or_empty(Self::multiplication, &ADDITIONS)?;
        loop {
            let save = self.pos;
            let spaces = self.skip_spaces();
            let Some(op) = self.operator_at(&ADDITIONS) else {
                self.pos = save;
                break;
            };
            self.pos += 1;
            let mut right = self.multiplication()?;
            right.add_leading_spaces(&spaces);
            left = Node::with_children(NodeKind::Addition, op, vec![left, right]);
        }
        Ok(left)
    }

    fn multiplication(&mut self) -> ParseResult<Node> {
        let mut left = self.operand_or_empty(Self::position, &MULTIPLICATIONS)?;
        loop {
            let save = self.pos;
            let spaces = self.skip_spaces();
            let (op, symbol) = match self.peek() {
                Some(token) if token.is("boper") => {
                    self.pos += 1;
                    ("boper", self.symbol_operand("boper")?)
                },
                _ => match self.operator_at(&MULTIPLICATIONS) {
                    Some(op) => {
                        self.pos += 1;
                        (op, String::new())
                    },
                    None => {
                        self.pos = save;
                        break;
                    },
                },
            };
            let mut right = self.position()?;
            right.add_leading_spaces(&spaces);
            let mut node = Node::with_children(NodeKind::Multiplication, op, vec![left, right]);
            node.data = symbol;
            left = node;
        }
        Ok(left)
    }

    fn position(&mut self) -> ParseResult<Node> {
        let mut node = self.descend(Self::unary)?;
        let mut scripted = false;
        loop {
            let save = self.pos;
            self.skip_spaces();
            let found = self
                .peek()
                .filter(|t| matches!(t.kind, TokenKind::Special | TokenKind::Unknown))
                .and_then(|t| POSITIONS.get(t.text.as_str()).map(|slot| (t.text.as_str(), *slot)));
            let Some((keyword, slot)) = found else {
                self.pos = save;
                break;
            };
            self.pos += 1;
            let argument = self.script_argument(keyword, slot)?;

            if !scripted || node.children[slot].is_some() {
                node = Node::position(node);
                scripted = true;
            }
            node.children[slot] = Some(argument);
        }
        Ok(node)
    }

    fn script_argument(&mut self, keyword: &str, slot: usize) -> ParseResult<Node> {
        let mut argument = self.argument(keyword)?;
        if !matches!(slot, SLOT_LSUB | SLOT_CSUB | SLOT_RSUB)
            || !matches!(argument.kind, NodeKind::Number | NodeKind::Unknown)
        {
            return Ok(argument);
        }
        // Legacy encoders wrote multi-character indices without braces:
        // `a_1n2` means the subscript `1n2`.
        while let Some(token) = self.peek() {
            let glue = match token.kind {
                TokenKind::Number => true,
                TokenKind::Unknown => !is_keyword(&token.text),
                _ => false,
            };
            if !glue {
                break;
            }
            if token.kind == TokenKind::Unknown {
                argument.kind = NodeKind::Unknown;
            }
            argument.data.push_str(&token.text);
            self.pos += 1;
        }
        Ok(argument)
    }

    fn unary(&mut self) -> ParseResult<Node> {
        self.descend(|p| {
            let spaces = p.skip_spaces();
            let mut node = p.unary_operator()?;
            node.add_leading_spaces(&spaces);
            Ok(node)
        })
    }

    fn unary_operator(&mut self) -> ParseResult<Node> {
        let token = self.expect_some()?;
        if token.is("nospace") {
            self.pos += 1;
            return self.descend(Self::unary);
        }
        if token.is("uoper") {
            self.pos += 1;
            let symbol = self.symbol_operand("uoper")?;
            let argument = self.argument("uoper")?;
            let mut node = Node::with_children(NodeKind::UnaryOperator, "uoper", vec![argument]);
            node.data = symbol;
            return Ok(node);
        }
        let Some(op) = self.operator_at(&UNARY_OPERATORS) else {
            return self.function();
        };
        self.pos += 1;
        if op == "-" {
            if let Some(number) = self.peek().filter(|t| t.kind == TokenKind::Number) {
                self.pos += 1;
                return Ok(Node::leaf(NodeKind::Number, format!("-{}", number.text)));
            }
        }
        let argument = self.argument(op)?;
        Ok(Node::with_children(NodeKind::UnaryOperator, op, vec![argument]))
    }

    fn function(&mut self) -> ParseResult<Node> {
        let token = self.expect_some()?;
        if token.kind == TokenKind::Unknown {
            let name = token.text.as_str();
            if let Some(kind) = FUNCTIONS.get(name) {
                self.pos += 1;
                return self.function_call(name, *kind);
            }
            if let Some(kind) = ACCENTS.get(name) {
                self.pos += 1;
                return self.accent(name, *kind);
            }
            if INTEGRALS.contains_key(name) {
                self.pos += 1;
                return self.integral(name);
            }
        }
        self.descend(Self::parenthesis)
    }

    fn function_call(&mut self, name: &str, kind: FunctionKind) -> ParseResult<Node> {
        let mut data = String::new();
        let children = match kind {
            FunctionKind::Stack => return self.grid(name, false),
            FunctionKind::Matrix => return self.grid(name, true),
            FunctionKind::NRoot | FunctionKind::Binom => {
                let first = self.argument(name)?;
                vec![first, self.argument(name)?]
            },
            FunctionKind::Func => {
                data = self.symbol_operand(name)?;
                vec![self.argument(name)?]
            },
            FunctionKind::Named | FunctionKind::Sqrt | FunctionKind::Abs | FunctionKind::Fact => {
                vec![self.argument(name)?]
            },
        };
        let mut node = Node::with_children(NodeKind::Function, name, children);
        node.data = data;
        Ok(node)
    }

    fn accent(&mut self, name: &str, kind: AccentKind) -> ParseResult<Node> {
        let mut data = String::new();
        if kind == AccentKind::Parameter {
            data = self.symbol_operand(name)?;
            // relative sizes: `size +2`, `size *1.5`
            if matches!(data.as_str(), "+" | "-" | "*" | "/") {
                if let Some(number) = self.peek().filter(|t| t.kind == TokenKind::Number) {
                    data.push_str(&number.text);
                    self.pos += 1;
                }
            }
        }
        let argument = self.argument(name)?;
        let mut node = Node::with_children(NodeKind::Accent, name, vec![argument]);
        node.data = data;
        Ok(node)
    }

    fn integral(&mut self, name: &str) -> ParseResult<Node> {
        let mut node = Node::new(NodeKind::Integral);
        node.name = name.to_string();
        if name == "oper" {
            node.data = self.symbol_operand(name)?;
        }

        let mut from = None;
        let mut to = None;
        loop {
            let save = self.pos;
            self.skip_spaces();
            match self.peek() {
                Some(token) if token.is("from") && from.is_none() => {
                    self.pos += 1;
                    from = Some(self.bound("from")?);
                },
                Some(token) if token.is("to") && to.is_none() => {
                    self.pos += 1;
                    to = Some(self.bound("to")?);
                },
                _ => {
                    self.pos = save;
                    break;
                },
            }
        }

        let save = self.pos;
        self.skip_spaces();
        let body = if self.at_sequence_end() {
            Node::new(NodeKind::Empty)
        } else {
            self.pos = save;
            self.position()?
        };
        node.children = vec![from, to, Some(body)];
        Ok(node)
    }

    fn bound(&mut self, keyword: &str) -> ParseResult<Node> {
        self.skip_spaces();
        if self.at_sequence_end() {
            return Err(ParseError::MissingArgument(keyword.to_string()));
        }
        self.position()
    }

    /// `stack { a # b }` and `matrix { a # b ## c # d }`.
    fn grid(&mut self, name: &str, matrix: bool) -> ParseResult<Node> {
        self.skip_spaces();
        match self.peek() {
            Some(token) if token.is("{") => self.pos += 1,
            _ => {
                return Err(ParseError::Unbalanced {
                    expected: "{".to_string(),
                    pos: self.pos,
                });
            },
        }
        let outer = std::mem::replace(&mut self.in_grid, true);
        let result = self.descend(|p| p.grid_cells(matrix));
        self.in_grid = outer;

        let (mut rows, cells) = result?;
        if matrix {
            rows.push(Node::with_children(NodeKind::SequenceRow, "", cells));
            Ok(Node::with_children(NodeKind::Function, name, rows))
        } else {
            Ok(Node::with_children(NodeKind::Function, name, cells))
        }
    }

    fn grid_cells(&mut self, matrix: bool) -> ParseResult<(Vec<Node>, Vec<Node>)> {
        let mut rows = Vec::new();
        let mut cells = Vec::new();
        loop {
            cells.push(self.sequence()?);
            self.skip_spaces();
            match self.peek() {
                Some(token) if token.is("#") => self.pos += 1,
                Some(token) if token.is("##") => {
                    self.pos += 1;
                    if matrix {
                        let row = std::mem::take(&mut cells);
                        rows.push(Node::with_children(NodeKind::SequenceRow, "", row));
                    }
                },
                Some(token) if token.is("}") => {
                    self.pos += 1;
                    return Ok((rows, cells));
                },
                _ => {
                    return Err(ParseError::Unbalanced {
                        expected: "}".to_string(),
                        pos: self.pos,
                    });
                },
            }
        }
    }

    fn parenthesis(&mut self) -> ParseResult<Node> {
        let token = self.expect_some()?;
        if token.is("left") {
            self.pos += 1;
            return self.left_right();
        }
        if matches!(token.kind, TokenKind::Special | TokenKind::Unknown) {
            if let Some(close) = OPENING_BRACKETS.get(token.text.as_str()) {
                self.pos += 1;
                let content = self.grouped()?;
                self.skip_spaces();
                match self.peek() {
                    Some(next) if next.is(close) => self.pos += 1,
                    _ => {
                        return Err(ParseError::Unbalanced {
                            expected: close.to_string(),
                            pos: self.pos,
                        });
                    },
                }
                return Ok(bracket_node(&token.text, &token.text, content, close));
            }
        }
        self.element()
    }

    fn left_right(&mut self) -> ParseResult<Node> {
        let open = self.bracket_operand("left")?;
        let content = self.grouped()?;
        self.skip_spaces();
        match self.peek() {
            Some(token) if token.is("right") => self.pos += 1,
            _ => {
                return Err(ParseError::Unbalanced {
                    expected: "right".to_string(),
                    pos: self.pos,
                });
            },
        }
        let close = self.bracket_operand("right")?;
        Ok(bracket_node("left", &open, content, &close))
    }

    /// Bracket token after `left` or `right`; escaped forms are accepted too.
    fn bracket_operand(&mut self, keyword: &str) -> ParseResult<String> {
        self.skip_spaces();
        let token = self
            .peek()
            .ok_or_else(|| ParseError::MissingArgument(keyword.to_string()))?;
        let text = token.text.strip_prefix('\\').unwrap_or(&token.text);
        if token.kind == TokenKind::Space || !BRACKETS.contains_key(text) {
            return Err(self.unexpected(token));
        }
        self.pos += 1;
        Ok(token.text.clone())
    }

    /// Sequence inside brackets, where grid separators do not apply.
    fn grouped(&mut self) -> ParseResult<Node> {
        let outer = std::mem::replace(&mut self.in_grid, false);
        let content = self.sequence();
        self.in_grid = outer;
        content
    }

    fn element(&mut self) -> ParseResult<Node> {
        let token = self.expect_some()?;
        let node = match token.kind {
            TokenKind::Number => Node::leaf(NodeKind::Number, token.text.as_str()),
            TokenKind::String | TokenKind::Placeholder => {
                let mut node = Node::leaf(special_or_string(token), token.text.as_str());
                node.name = token.text.clone();
                node
            },
            TokenKind::Special => {
                let text = token.text.as_str();
                if text.len() > 1 && (text.starts_with('%') || text.starts_with('\\')) {
                    let mut node = Node::leaf(NodeKind::Special, text);
                    node.name = token.text.clone();
                    node
                } else if self.is_operator_only(text) {
                    return Err(self.unexpected(token));
                } else {
                    Node::leaf(NodeKind::Special, text)
                }
            },
            TokenKind::Unknown => {
                let text = token.text.as_str();
                if SYMBOLS.contains_key(text) {
                    let mut node = Node::leaf(NodeKind::Special, text);
                    node.name = token.text.clone();
                    node
                } else if is_keyword(text) {
                    return Err(self.unexpected(token));
                } else {
                    Node::leaf(NodeKind::Unknown, text)
                }
            },
            TokenKind::Space => return Err(self.unexpected(token)),
        };
        self.pos += 1;
        Ok(node)
    }

    /// Punctuation that can only appear between operands.
    fn is_operator_only(&self, text: &str) -> bool {
        RELATIONS.contains_key(text)
            || MULTIPLICATIONS.contains_key(text)
            || POSITIONS.contains_key(text)
            || is_closing(text)
            || text == "#"
            || text == "##"
    }
}

fn special_or_string(token: &Token) -> NodeKind {
    match token.kind {
        // `\langle` and friends are literal brackets, not text
        TokenKind::String if token.text.starts_with('\\') => NodeKind::Special,
        TokenKind::String => NodeKind::String,
        _ => NodeKind::Special,
    }
}

fn bracket_node(name: &str, open: &str, content: Node, close: &str) -> Node {
    Node::with_children(
        NodeKind::Parenthesis,
        name,
        vec![
            Node::leaf(NodeKind::ParenthesisLeft, open),
            content,
            Node::leaf(NodeKind::ParenthesisRight, close),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::starmath::keywords::{
        POSITION_SLOTS, SLOT_BASE, SLOT_CSUP, SLOT_LSUP, SLOT_OVERBRACE, SLOT_RSUP,
    };

    fn content(formula: &str) -> Node {
        parse_formula(formula)
            .unwrap_or_else(|e| panic!("failed to parse {formula:?}: {e}"))
            .content()
            .clone()
    }

    #[test]
    fn test_addition_of_scripts() {
        let node = content("a_1 + b^2");
        assert_eq!(node.kind, NodeKind::Addition);
        assert_eq!(node.name, "+");
        assert_eq!(node.filled(), 2);

        let left = node.child(0).unwrap();
        assert_eq!(left.kind, NodeKind::Position);
        assert_eq!(left.children.len(), POSITION_SLOTS);
        assert_eq!(left.child(SLOT_BASE).unwrap().data, "a");
        assert_eq!(left.child(SLOT_RSUB).unwrap().data, "1");

        let right = node.child(1).unwrap();
        assert_eq!(right.kind, NodeKind::Position);
        assert_eq!(right.child(SLOT_BASE).unwrap().data, "b");
        assert_eq!(right.child(SLOT_RSUP).unwrap().data, "2");
    }

    #[test]
    fn test_subscript_glue() {
        let node = content("a_1n2");
        assert_eq!(node.child(SLOT_RSUB).unwrap().data, "1n2");
        // keywords are never glued
        let node = content("a_1over 2");
        assert_eq!(node.kind, NodeKind::Multiplication);
    }

    #[test]
    fn test_all_script_slots() {
        let node = content("x lsup a csup b rsup c overbrace d");
        assert_eq!(node.kind, NodeKind::Position);
        assert_eq!(node.child(SLOT_LSUP).unwrap().data, "a");
        assert_eq!(node.child(SLOT_CSUP).unwrap().data, "b");
        assert_eq!(node.child(SLOT_RSUP).unwrap().data, "c");
        assert_eq!(node.child(SLOT_OVERBRACE).unwrap().data, "d");
    }

    #[test]
    fn test_repeated_script_nests() {
        let node = content("x^2^3");
        assert_eq!(node.kind, NodeKind::Position);
        let inner = node.child(SLOT_BASE).unwrap();
        assert_eq!(inner.kind, NodeKind::Position);
        assert_eq!(inner.child(SLOT_RSUP).unwrap().data, "2");
        assert_eq!(node.child(SLOT_RSUP).unwrap().data, "3");
    }

    #[test]
    fn test_left_associative_addition() {
        let node = content("a + b - c");
        assert_eq!(node.name, "-");
        assert_eq!(node.child(0).unwrap().kind, NodeKind::Addition);
        assert_eq!(node.child(1).unwrap().data, "c");
    }

    #[test]
    fn test_right_folded_relations() {
        let node = content("a = b < c");
        assert_eq!(node.kind, NodeKind::Relation);
        assert_eq!(node.name, "=");
        assert_eq!(node.child(0).unwrap().data, "a");
        let right = node.child(1).unwrap();
        assert_eq!(right.kind, NodeKind::Relation);
        assert_eq!(right.name, "<");
    }

    #[test]
    fn test_missing_left_operand_becomes_empty() {
        let node = content("= b");
        assert_eq!(node.kind, NodeKind::Relation);
        assert_eq!(node.child(0).unwrap().kind, NodeKind::Empty);
    }

    #[test]
    fn test_precedence() {
        let node = content("a + b over c = d");
        assert_eq!(node.kind, NodeKind::Relation);
        let sum = node.child(0).unwrap();
        assert_eq!(sum.kind, NodeKind::Addition);
        assert_eq!(sum.child(1).unwrap().kind, NodeKind::Multiplication);
        assert_eq!(sum.child(1).unwrap().name, "over");
    }

    #[test]
    fn test_negative_number_folding() {
        let node = content("-2");
        assert_eq!(node.kind, NodeKind::Number);
        assert_eq!(node.data, "-2");

        let node = content("- x");
        assert_eq!(node.kind, NodeKind::UnaryOperator);
        assert_eq!(node.name, "-");
    }

    #[test]
    fn test_boper() {
        let node = content("a boper %alpha b");
        assert_eq!(node.kind, NodeKind::Multiplication);
        assert_eq!(node.name, "boper");
        assert_eq!(node.data, "%alpha");
    }

    #[test]
    fn test_braces_must_balance() {
        let node = content("{ a over b }");
        assert_eq!(node.kind, NodeKind::Parenthesis);
        assert_eq!(node.name, "{");
        assert_eq!(node.child(1).unwrap().name, "over");

        assert!(matches!(
            parse_formula("{ a over b"),
            Err(ParseError::Unbalanced { .. })
        ));
        assert!(parse_formula("a over b }").is_err());
    }

    #[test]
    fn test_left_right_tags_brackets() {
        let node = content("left ( a right )");
        assert_eq!(node.kind, NodeKind::Parenthesis);
        assert_eq!(node.name, "left");
        assert_eq!(node.child(0).unwrap().kind, NodeKind::ParenthesisLeft);
        assert_eq!(node.child(0).unwrap().data, "(");
        assert_eq!(node.child(2).unwrap().kind, NodeKind::ParenthesisRight);
        assert_eq!(node.child(2).unwrap().data, ")");

        let node = content("left langle x right none");
        assert_eq!(node.child(0).unwrap().data, "langle");
        assert_eq!(node.child(2).unwrap().data, "none");
        assert!(parse_formula("left ( a").is_err());
    }

    #[test]
    fn test_functions() {
        let node = content("sqrt x");
        assert_eq!(node.kind, NodeKind::Function);
        assert_eq!(node.name, "sqrt");

        let node = content("nroot 3 x");
        assert_eq!(node.filled(), 2);

        let node = content("func f x");
        assert_eq!(node.data, "f");

        assert!(matches!(
            parse_formula("sqrt"),
            Err(ParseError::MissingArgument(name)) if name == "sqrt"
        ));
    }

    #[test]
    fn test_accents_and_styles() {
        let node = content("hat x");
        assert_eq!(node.kind, NodeKind::Accent);
        assert_eq!(node.name, "hat");

        let node = content("size +2 x");
        assert_eq!(node.name, "size");
        assert_eq!(node.data, "+2");

        let node = content("color red bold x");
        assert_eq!(node.data, "red");
        assert_eq!(node.child(0).unwrap().name, "bold");
    }

    #[test]
    fn test_integral_bounds() {
        let node = content("sum from{i=1} to n i^2");
        assert_eq!(node.kind, NodeKind::Integral);
        assert_eq!(node.children.len(), 3);
        assert_eq!(node.child(0).unwrap().kind, NodeKind::Parenthesis);
        assert_eq!(node.child(1).unwrap().data, "n");
        assert_eq!(node.child(2).unwrap().kind, NodeKind::Position);

        let node = content("int x");
        assert!(node.child(0).is_none());
        assert!(node.child(1).is_none());
    }

    #[test]
    fn test_stack_and_matrix() {
        let node = content("stack{a # b # c}");
        assert_eq!(node.name, "stack");
        assert_eq!(node.filled(), 3);

        let node = content("matrix{a # b ## c # d}");
        assert_eq!(node.name, "matrix");
        assert_eq!(node.filled(), 2);
        let row = node.child(1).unwrap();
        assert_eq!(row.kind, NodeKind::SequenceRow);
        assert_eq!(row.child(1).unwrap().data, "d");

        assert!(parse_formula("matrix{a # b").is_err());
    }

    #[test]
    fn test_newline_splits_lines() {
        let root = parse_formula("a newline b").unwrap();
        assert_eq!(root.kind, NodeKind::Root);
        assert_eq!(root.filled(), 2);
    }

    #[test]
    fn test_explicit_spacing_is_kept() {
        let node = content("a~b");
        assert_eq!(node.kind, NodeKind::Sequence);
        assert_eq!(node.child(1).unwrap().spaces, "~");
    }

    #[test]
    fn test_symbols() {
        let node = content("%alpha");
        assert_eq!(node.kind, NodeKind::Special);
        assert_eq!(node.name, "%alpha");

        let node = content("infinity");
        assert_eq!(node.kind, NodeKind::Special);

        let node = content("<?>");
        assert_eq!(node.kind, NodeKind::Special);
        assert_eq!(node.data, "<?>");
    }

    #[test]
    fn test_depth_limit() {
        let formula = "{".repeat(50) + &"}".repeat(50);
        let tokens = tokenize(&formula);
        assert!(matches!(
            Parser::new(&tokens).with_max_depth(10).parse(),
            Err(ParseError::TooDeep(10))
        ));
        assert!(Parser::new(&tokens).parse().is_ok());
    }

    #[test]
    fn test_deep_brackets_fail_before_the_stack_runs_out() {
        let deep = |open: &str, close: &str| {
            open.repeat(DEFAULT_MAX_DEPTH) + "x" + &close.repeat(DEFAULT_MAX_DEPTH)
        };
        let formulas = [
            deep("left ( ", " right )"),
            deep("{", "}"),
            deep("x^{", "}"),
            deep("stack { ", " }"),
            "- ".repeat(DEFAULT_MAX_DEPTH * 2) + "x",
            "sqrt ".repeat(DEFAULT_MAX_DEPTH * 2) + "x",
            "int ".repeat(DEFAULT_MAX_DEPTH * 2) + "x",
        ];
        let worker = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(move || {
                formulas
                    .iter()
                    .map(|formula| parse_formula(formula))
                    .collect::<Vec<_>>()
            })
            .unwrap();
        for result in worker.join().unwrap() {
            assert_eq!(result, Err(ParseError::TooDeep(DEFAULT_MAX_DEPTH)));
        }
    }
}

//! Formula syntax tree.

use super::keywords::{POSITION_SLOTS, SLOT_BASE};

/// Kind tag of a formula [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Whole formula; one child per line
    Root,
    /// Juxtaposed terms
    Sequence,
    /// One row of a matrix; one child per cell
    SequenceRow,
    Relation,
    Addition,
    Multiplication,
    /// Base term with up to eight scripts, always nine slots
    Position,
    Function,
    Accent,
    Integral,
    UnaryOperator,
    Parenthesis,
    ParenthesisLeft,
    ParenthesisRight,
    Special,
    String,
    Number,
    Empty,
    Unknown,
}

/// A node of the formula tree.
///
/// Children are exclusively owned. Slots may be empty: a Position node keeps
/// all nine slots, an Integral keeps `from`, `to` and body slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// Explicit spacing (`~` and `` ` ``) written before this node
    pub spaces: String,
    /// Operator or function keyword
    pub name: String,
    /// Literal text, bracket token or keyword parameter
    pub data: String,
    pub children: Vec<Option<Node>>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            spaces: String::new(),
            name: String::new(),
            data: String::new(),
            children: Vec::new(),
        }
    }

    /// Leaf node carrying literal text.
    pub fn leaf(kind: NodeKind, data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::new(kind)
        }
    }

    /// Node with a keyword and a list of filled children.
    pub fn with_children(kind: NodeKind, name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            children: children.into_iter().map(Some).collect(),
            ..Self::new(kind)
        }
    }

    /// A Position node around `base` with every script slot empty.
    pub fn position(base: Node) -> Self {
        let mut children = vec![None; POSITION_SLOTS];
        children[SLOT_BASE] = Some(base);
        Self {
            children,
            ..Self::new(NodeKind::Position)
        }
    }

    #[inline]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index).and_then(Option::as_ref)
    }

    /// Number of filled child slots.
    pub fn filled(&self) -> usize {
        self.children.iter().flatten().count()
    }

    /// Iterate over the filled child slots.
    pub fn iter_children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().flatten()
    }

    /// The formula content below `Root` and single-element wrappers.
    ///
    /// ```
    /// use stoff::formula::starmath::{parse_formula, NodeKind};
    ///
    /// let tree = parse_formula("a + b").unwrap();
    /// assert_eq!(tree.kind, NodeKind::Root);
    /// assert_eq!(tree.content().kind, NodeKind::Addition);
    /// ```
    pub fn content(&self) -> &Node {
        let mut node = self;
        while matches!(node.kind, NodeKind::Root | NodeKind::Sequence) && node.filled() == 1 {
            match node.iter_children().next() {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    /// Prepend explicit spacing collected before this node.
    pub(crate) fn add_leading_spaces(&mut self, spaces: &str) {
        if !spaces.is_empty() {
            self.spaces.insert_str(0, spaces);
        }
    }
}

//! MathML rendering of StarMath formula trees.

use std::borrow::Cow;

use super::style::{Style, size_value};
use super::symbols::{
    ACCENT_GLYPHS, COLORS, FONT_FAMILIES, Placement, column_alignment, free_symbol,
    is_operator_symbol, operator_glyph, row_alignment,
};
use crate::common::xml::push_escaped;
use crate::formula::starmath::keywords::{
    ACCENTS, AccentKind, BRACKETS, FUNCTIONS, FunctionKind, INTEGRALS, SLOT_BASE, SLOT_CSUB,
    SLOT_CSUP, SLOT_LSUB, SLOT_LSUP, SLOT_OVERBRACE, SLOT_RSUB, SLOT_RSUP, SLOT_UNDERBRACE,
    SYMBOLS, percent_symbol,
};
use crate::formula::starmath::{Node, NodeKind};

pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
/// Encoding name of the source annotation.
pub const ANNOTATION_ENCODING: &str = "StarMath 5.0";

/// `display` attribute of the generated `<math>` element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayStyle {
    #[default]
    Block,
    Inline,
}

impl DisplayStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayStyle::Block => "block",
            DisplayStyle::Inline => "inline",
        }
    }
}

/// Renders a parsed formula as a MathML document.
///
/// Emission is stateless between calls: the same tree always renders to
/// the same markup.
#[derive(Debug, Clone, Default)]
pub struct MathMlEmitter {
    display: DisplayStyle,
}

impl MathMlEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display(mut self, display: DisplayStyle) -> Self {
        self.display = display;
        self
    }

    /// Render `root` as a `<math>` document.
    pub fn emit(&self, root: &Node) -> String {
        self.render(root, None)
    }

    /// Render `root` and attach `source` as a StarMath annotation.
    pub fn emit_annotated(&self, root: &Node, source: &str) -> String {
        self.render(root, Some(source))
    }

    fn render(&self, root: &Node, source: Option<&str>) -> String {
        let mut emission = Emission::default();
        let out = &mut emission.out;
        out.push_str("<math xmlns=\"");
        out.push_str(MATHML_NAMESPACE);
        out.push_str("\" display=\"");
        out.push_str(self.display.as_str());
        out.push_str("\"><semantics>");

        emission.root(root);

        let out = &mut emission.out;
        if let Some(source) = source {
            out.push_str("<annotation encoding=\"");
            out.push_str(ANNOTATION_ENCODING);
            out.push_str("\">");
            push_escaped(out, source);
            out.push_str("</annotation>");
        }
        out.push_str("</semantics></math>");
        emission.out
    }
}

/// Cell alignment hoisted out of a table cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Alignment {
    column: Option<&'static str>,
    row: Option<&'static str>,
}

/// A table cell with its alignment keywords lifted out of the tree.
struct Cell<'n> {
    node: Cow<'n, Node>,
    column: Option<&'static str>,
}

/// Child indices leading from a cell to one of its descendants.
type NodePath = Vec<usize>;

/// Lift the first column alignment keyword of `cell`, and its first row
/// alignment unless `row` is already set, out of the cell.
///
/// The tree is only copied when a keyword is found.
fn hoist<'n>(cell: &'n Node, row: &mut Option<&'static str>) -> Cell<'n> {
    let mut found = Alignment {
        column: None,
        row: *row,
    };
    let mut hits = Vec::new();
    scan_alignment(cell, &mut found, &mut NodePath::new(), &mut hits);
    *row = found.row;
    if hits.is_empty() {
        return Cell {
            node: Cow::Borrowed(cell),
            column: found.column,
        };
    }
    let mut lifted = cell.clone();
    // inner keywords first, so the paths of outer ones stay valid
    for path in hits.iter().rev() {
        lift(&mut lifted, path);
    }
    Cell {
        node: Cow::Owned(lifted),
        column: found.column,
    }
}

fn scan_alignment(
    node: &Node,
    found: &mut Alignment,
    path: &mut NodePath,
    hits: &mut Vec<NodePath>,
) {
    if node.kind == NodeKind::Accent {
        if let Some(column) = column_alignment(&node.name) {
            if found.column.is_none() {
                found.column = Some(column);
                hits.push(path.clone());
            }
        } else if let Some(row) = row_alignment(&node.name) {
            if found.row.is_none() {
                found.row = Some(row);
                hits.push(path.clone());
            }
        }
    }
    // nested tables hoist for their own cells
    if node.kind == NodeKind::Function
        && matches!(
            FUNCTIONS.get(node.name.as_str()),
            Some(FunctionKind::Stack | FunctionKind::Matrix | FunctionKind::Binom)
        )
    {
        return;
    }
    for (index, child) in node.children.iter().enumerate() {
        if let Some(child) = child {
            path.push(index);
            scan_alignment(child, found, path, hits);
            path.pop();
        }
    }
}

/// Replace the alignment keyword at `path` with its argument.
fn lift(cell: &mut Node, path: &[usize]) {
    let mut node = cell;
    for &index in path {
        match node.children.get_mut(index).and_then(Option::as_mut) {
            Some(child) => node = child,
            None => return,
        }
    }
    if let Some(mut argument) = node.children.first_mut().and_then(Option::take) {
        argument.add_leading_spaces(&node.spaces);
        *node = argument;
    }
}

/// State of a single `emit` call.
#[derive(Default)]
struct Emission {
    out: String,
}

impl Emission {
    fn root(&mut self, root: &Node) {
        let style = Style::default();
        let lines: Vec<&Node> = if root.kind == NodeKind::Root {
            root.iter_children().collect()
        } else {
            vec![root]
        };
        match lines.as_slice() {
            [] => self.out.push_str("<mrow/>"),
            [line] => {
                let mut row = None;
                let cell = hoist(line, &mut row);
                if row.is_none() && cell.column.is_none() {
                    self.node(line, &style);
                } else {
                    self.out.push_str("<mtable>");
                    self.table_row(std::slice::from_ref(&cell), row, &style);
                    self.out.push_str("</mtable>");
                }
            },
            _ => {
                self.out.push_str("<mtable>");
                for line in lines {
                    self.row(std::iter::once(line), &style);
                }
                self.out.push_str("</mtable>");
            },
        }
    }

    // ---------------------------------------------------------------------
    // tables and alignment

    fn row<'n>(&mut self, cells: impl Iterator<Item = &'n Node>, style: &Style) {
        let mut row = None;
        let cells: Vec<Cell> = cells.map(|cell| hoist(cell, &mut row)).collect();
        self.table_row(&cells, row, style);
    }

    fn table_row(&mut self, cells: &[Cell], row: Option<&str>, style: &Style) {
        self.out.push_str("<mtr");
        if let Some(row) = row {
            self.attribute("rowalign", row);
        }
        self.out.push('>');
        for cell in cells {
            self.out.push_str("<mtd");
            if let Some(column) = cell.column {
                self.attribute("columnalign", column);
            }
            self.out.push('>');
            self.node(&cell.node, style);
            self.out.push_str("</mtd>");
        }
        self.out.push_str("</mtr>");
    }

    // ---------------------------------------------------------------------
    // markup helpers

    fn attribute(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        push_escaped(&mut self.out, value);
        self.out.push('"');
    }

    fn token(&mut self, tag: &str, text: &str, style: &Style, natural_italic: bool) {
        self.out.push('<');
        self.out.push_str(tag);
        if let Some(variant) = style.mathvariant(natural_italic) {
            self.attribute("mathvariant", variant);
        }
        self.out.push('>');
        push_escaped(&mut self.out, text);
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn operator(&mut self, glyph: &str) {
        self.out.push_str("<mo>");
        push_escaped(&mut self.out, glyph);
        self.out.push_str("</mo>");
    }

    /// Bracket token of a parenthesis; `none` renders nothing.
    fn fence(&mut self, token: &str, stretchy: bool) {
        let name = token.strip_prefix('\\');
        let glyph = BRACKETS
            .get(name.unwrap_or(token))
            .copied()
            .unwrap_or(token);
        if glyph.is_empty() {
            return;
        }
        if name.is_some() {
            self.out.push_str("<mo fence=\"false\" stretchy=\"false\">");
        } else if stretchy {
            self.out.push_str("<mo fence=\"true\" stretchy=\"true\">");
        } else {
            self.out.push_str("<mo fence=\"true\" stretchy=\"false\">");
        }
        push_escaped(&mut self.out, glyph);
        self.out.push_str("</mo>");
    }

    fn spacing(&mut self, spaces: &str) {
        let width: f64 = spaces
            .chars()
            .map(|c| if c == '~' { 0.5 } else { 0.25 })
            .sum();
        self.out.push_str(&format!("<mspace width=\"{width}em\"/>"));
    }

    fn child(&mut self, node: &Node, index: usize, style: &Style) {
        match node.child(index) {
            Some(child) => self.node(child, style),
            None => {
                log::warn!(
                    "{:?} node '{}' has no child in slot {}",
                    node.kind,
                    node.name,
                    index
                );
                self.out.push_str("<mrow/>");
            },
        }
    }

    fn children(&mut self, node: &Node, style: &Style) {
        self.out.push_str("<mrow>");
        for child in node.iter_children() {
            self.node(child, style);
        }
        self.out.push_str("</mrow>");
    }

    // ---------------------------------------------------------------------
    // nodes

    fn node(&mut self, node: &Node, style: &Style) {
        if node.spaces.is_empty() {
            self.node_body(node, style);
        } else {
            self.out.push_str("<mrow>");
            self.spacing(&node.spaces);
            self.node_body(node, style);
            self.out.push_str("</mrow>");
        }
    }

    fn node_body(&mut self, node: &Node, style: &Style) {
        match node.kind {
            NodeKind::Root | NodeKind::Sequence | NodeKind::SequenceRow => {
                self.children(node, style)
            },
            NodeKind::Relation | NodeKind::Addition => {
                self.binary(node, style, operator_glyph(&node.name))
            },
            NodeKind::Multiplication => match node.name.as_str() {
                "over" => self.fraction(node, style, false),
                "wideslash" => self.fraction(node, style, true),
                "boper" => self.binary(node, style, free_symbol(&node.data)),
                name => self.binary(node, style, operator_glyph(name)),
            },
            NodeKind::Position => self.position(node, style),
            NodeKind::Function => self.function(node, style),
            NodeKind::Accent => self.accent(node, style),
            NodeKind::Integral => self.integral(node, style),
            NodeKind::UnaryOperator => {
                let glyph = if node.name == "uoper" {
                    free_symbol(&node.data)
                } else {
                    operator_glyph(&node.name)
                };
                self.out.push_str("<mrow>");
                self.operator(glyph);
                self.child(node, 0, style);
                self.out.push_str("</mrow>");
            },
            NodeKind::Parenthesis => self.parenthesis(node, style),
            NodeKind::ParenthesisLeft | NodeKind::ParenthesisRight => self.fence(&node.data, false),
            NodeKind::Special => self.special(node, style),
            NodeKind::String => self.token("mtext", &node.data, style, false),
            NodeKind::Number => self.token("mn", &node.data, style, false),
            NodeKind::Unknown => {
                let single = node.data.chars().count() == 1;
                self.token("mi", &node.data, style, single)
            },
            NodeKind::Empty => self.out.push_str("<mrow/>"),
        }
    }

    fn binary(&mut self, node: &Node, style: &Style, glyph: &str) {
        self.out.push_str("<mrow>");
        self.child(node, 0, style);
        self.operator(glyph);
        self.child(node, 1, style);
        self.out.push_str("</mrow>");
    }

    fn fraction(&mut self, node: &Node, style: &Style, bevelled: bool) {
        self.out.push_str(if bevelled {
            "<mfrac bevelled=\"true\">"
        } else {
            "<mfrac>"
        });
        self.child(node, 0, style);
        self.child(node, 1, style);
        self.out.push_str("</mfrac>");
    }

    fn position(&mut self, node: &Node, style: &Style) {
        let has = |slot: usize| node.child(slot).is_some();
        let prescripted = has(SLOT_LSUB) || has(SLOT_LSUP);
        let script = if prescripted {
            Some("mmultiscripts")
        } else {
            match (has(SLOT_RSUB), has(SLOT_RSUP)) {
                (true, true) => Some("msubsup"),
                (true, false) => Some("msub"),
                (false, true) => Some("msup"),
                (false, false) => None,
            }
        };
        let limits = match (has(SLOT_CSUB), has(SLOT_CSUP)) {
            (true, true) => Some("munderover"),
            (true, false) => Some("munder"),
            (false, true) => Some("mover"),
            (false, false) => None,
        };

        if has(SLOT_OVERBRACE) {
            self.out.push_str("<mover><mover accent=\"true\">");
        }
        if has(SLOT_UNDERBRACE) {
            self.out.push_str("<munder><munder accentunder=\"true\">");
        }
        for tag in [script, limits].into_iter().flatten() {
            self.out.push('<');
            self.out.push_str(tag);
            self.out.push('>');
        }

        self.child(node, SLOT_BASE, style);

        if let Some(tag) = limits {
            for slot in [SLOT_CSUB, SLOT_CSUP] {
                if has(slot) {
                    self.child(node, slot, style);
                }
            }
            self.close(tag);
        }
        if let Some(tag) = script {
            if prescripted {
                for slot in [SLOT_RSUB, SLOT_RSUP] {
                    self.script_or_none(node, slot, style);
                }
                self.out.push_str("<mprescripts/>");
                for slot in [SLOT_LSUB, SLOT_LSUP] {
                    self.script_or_none(node, slot, style);
                }
            } else {
                for slot in [SLOT_RSUB, SLOT_RSUP] {
                    if has(slot) {
                        self.child(node, slot, style);
                    }
                }
            }
            self.close(tag);
        }
        if has(SLOT_UNDERBRACE) {
            self.out.push_str("<mo stretchy=\"true\">\u{23DF}</mo></munder>");
            self.child(node, SLOT_UNDERBRACE, style);
            self.out.push_str("</munder>");
        }
        if has(SLOT_OVERBRACE) {
            self.out.push_str("<mo stretchy=\"true\">\u{23DE}</mo></mover>");
            self.child(node, SLOT_OVERBRACE, style);
            self.out.push_str("</mover>");
        }
    }

    fn script_or_none(&mut self, node: &Node, slot: usize, style: &Style) {
        match node.child(slot) {
            Some(script) => self.node(script, style),
            None => self.out.push_str("<none/>"),
        }
    }

    fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn function(&mut self, node: &Node, style: &Style) {
        let Some(kind) = FUNCTIONS.get(node.name.as_str()) else {
            log::warn!("unknown function '{}'", node.name);
            self.children(node, style);
            return;
        };
        match kind {
            FunctionKind::Named | FunctionKind::Func => {
                let name = if *kind == FunctionKind::Func {
                    &node.data
                } else {
                    &node.name
                };
                self.out.push_str("<mrow>");
                self.token("mi", name, style, false);
                // invisible function application
                self.out.push_str("<mo>&#x2061;</mo>");
                self.child(node, 0, style);
                self.out.push_str("</mrow>");
            },
            FunctionKind::Sqrt => {
                self.out.push_str("<msqrt>");
                self.child(node, 0, style);
                self.out.push_str("</msqrt>");
            },
            FunctionKind::NRoot => {
                self.out.push_str("<mroot>");
                self.child(node, 1, style);
                self.child(node, 0, style);
                self.out.push_str("</mroot>");
            },
            FunctionKind::Abs => {
                self.out.push_str("<mrow><mo stretchy=\"true\">|</mo>");
                self.child(node, 0, style);
                self.out.push_str("<mo stretchy=\"true\">|</mo></mrow>");
            },
            FunctionKind::Fact => {
                self.out.push_str("<mrow>");
                self.child(node, 0, style);
                self.out.push_str("<mo>!</mo></mrow>");
            },
            FunctionKind::Binom | FunctionKind::Stack => {
                self.out.push_str("<mtable>");
                for cell in node.iter_children() {
                    self.row(std::iter::once(cell), style);
                }
                self.out.push_str("</mtable>");
            },
            FunctionKind::Matrix => {
                self.out.push_str("<mtable>");
                for row in node.iter_children() {
                    if row.kind == NodeKind::SequenceRow {
                        self.row(row.iter_children(), style);
                    } else {
                        self.row(std::iter::once(row), style);
                    }
                }
                self.out.push_str("</mtable>");
            },
        }
    }

    fn accent(&mut self, node: &Node, style: &Style) {
        let name = node.name.as_str();
        let Some(kind) = ACCENTS.get(name) else {
            log::warn!("unknown accent '{name}'");
            self.children(node, style);
            return;
        };
        match kind {
            AccentKind::Accent => {
                let Some(accent) = ACCENT_GLYPHS.get(name) else {
                    self.child(node, 0, style);
                    return;
                };
                let stretchy = if accent.stretchy { "true" } else { "false" };
                match accent.placement {
                    Placement::Over => {
                        self.out.push_str("<mover accent=\"true\">");
                        self.child(node, 0, style);
                        self.out.push_str("<mo stretchy=\"");
                        self.out.push_str(stretchy);
                        self.out.push_str("\">");
                        push_escaped(&mut self.out, accent.glyph);
                        self.out.push_str("</mo></mover>");
                    },
                    Placement::Under => {
                        self.out.push_str("<munder accentunder=\"true\">");
                        self.child(node, 0, style);
                        self.out.push_str("<mo stretchy=\"");
                        self.out.push_str(stretchy);
                        self.out.push_str("\">");
                        push_escaped(&mut self.out, accent.glyph);
                        self.out.push_str("</mo></munder>");
                    },
                    Placement::Through => {
                        self.out.push_str("<menclose notation=\"horizontalstrike\">");
                        self.child(node, 0, style);
                        self.out.push_str("</menclose>");
                    },
                }
            },
            AccentKind::Style if name == "phantom" => {
                self.out.push_str("<mphantom>");
                self.child(node, 0, style);
                self.out.push_str("</mphantom>");
            },
            AccentKind::Style => {
                let mut inner = style.clone();
                match name {
                    "bold" => inner.bold = true,
                    "nbold" => inner.bold = false,
                    "nitalic" => inner.italic = Some(false),
                    _ => inner.italic = Some(true),
                }
                self.child(node, 0, &inner);
            },
            // hoisted keywords are gone from the tree by now
            AccentKind::ColumnAlign | AccentKind::RowAlign => {
                self.out.push_str("<mstyle>");
                self.child(node, 0, style);
                self.out.push_str("</mstyle>");
            },
            AccentKind::Parameter => self.parameter(node, style),
        }
    }

    /// `size`, `color` and `font`.
    fn parameter(&mut self, node: &Node, style: &Style) {
        let mut inner = style.clone();
        let param = node.data.as_str();
        let wrapper = match node.name.as_str() {
            "size" => match size_value(param) {
                Some(size) if style.size.as_deref() != Some(size.as_str()) => {
                    inner.size = Some(size.clone());
                    Some(("mathsize", size))
                },
                Some(_) => None,
                None => {
                    log::debug!("ignoring unsupported size '{param}'");
                    None
                },
            },
            "color" => {
                let color = COLORS.get(param).copied().unwrap_or(param).to_string();
                if style.color.as_deref() == Some(color.as_str()) {
                    None
                } else {
                    inner.color = Some(color.clone());
                    Some(("mathcolor", color))
                }
            },
            _ => {
                match FONT_FAMILIES.get(param) {
                    Some(family) => inner.family = Some(*family),
                    None => log::debug!("ignoring unsupported font '{param}'"),
                }
                None
            },
        };

        match wrapper {
            Some((attribute, value)) => {
                self.out.push_str("<mstyle");
                self.attribute(attribute, &value);
                self.out.push('>');
                self.child(node, 0, &inner);
                self.out.push_str("</mstyle>");
            },
            None => self.child(node, 0, &inner),
        }
    }

    fn integral(&mut self, node: &Node, style: &Style) {
        let name = node.name.as_str();
        let glyph = if name == "oper" {
            free_symbol(&node.data)
        } else {
            INTEGRALS.get(name).copied().unwrap_or(name)
        };
        // integral signs take their bounds as scripts, the others as limits
        let integral = matches!(name, "int" | "iint" | "iiint" | "lint" | "llint" | "lllint");
        let from = node.child(0);
        let to = node.child(1);
        let tag = match (from.is_some(), to.is_some(), integral) {
            (true, true, true) => Some("msubsup"),
            (true, false, true) => Some("msub"),
            (false, true, true) => Some("msup"),
            (true, true, false) => Some("munderover"),
            (true, false, false) => Some("munder"),
            (false, true, false) => Some("mover"),
            (false, false, _) => None,
        };

        self.out.push_str("<mrow>");
        if let Some(tag) = tag {
            self.out.push('<');
            self.out.push_str(tag);
            self.out.push('>');
        }
        self.operator(glyph);
        for bound in [from, to].into_iter().flatten() {
            self.node(bound, style);
        }
        if let Some(tag) = tag {
            self.close(tag);
        }
        self.child(node, 2, style);
        self.out.push_str("</mrow>");
    }

    fn parenthesis(&mut self, node: &Node, style: &Style) {
        // braces only group
        if node.name == "{" {
            self.out.push_str("<mrow>");
            self.child(node, 1, style);
            self.out.push_str("</mrow>");
            return;
        }
        let stretchy = node.name == "left";
        self.out.push_str("<mrow>");
        if let Some(open) = node.child(0) {
            self.fence(&open.data, stretchy);
        }
        self.child(node, 1, style);
        if let Some(close) = node.child(2) {
            self.fence(&close.data, stretchy);
        }
        self.out.push_str("</mrow>");
    }

    fn special(&mut self, node: &Node, style: &Style) {
        let text = node.data.as_str();
        if let Some((glyph, italic)) = text.strip_prefix('%').and_then(percent_symbol) {
            let mut inner = style.clone();
            inner.italic.get_or_insert(italic);
            self.token("mi", glyph, &inner, true);
        } else if text == "<?>" {
            self.token("mtext", text, style, false);
        } else if text.starts_with('\\') {
            self.fence(text, false);
        } else if let Some(glyph) = SYMBOLS.get(text) {
            if is_operator_symbol(glyph) {
                self.operator(glyph);
            } else {
                self.token("mi", glyph, style, true);
            }
        } else {
            self.operator(text);
        }
    }
}

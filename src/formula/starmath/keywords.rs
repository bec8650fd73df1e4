//! Static keyword tables of the StarMath notation.
//!
//! The parser dispatches on these tables; the emitter reuses the glyph
//! columns. All of them are compile-time perfect-hash maps.

use phf::{phf_map, phf_set};

/// Position node slot of the base term.
pub const SLOT_BASE: usize = 0;
/// Left subscript.
pub const SLOT_LSUB: usize = 1;
/// Centered subscript (under).
pub const SLOT_CSUB: usize = 2;
/// Right subscript.
pub const SLOT_RSUB: usize = 3;
/// Under-brace annotation.
pub const SLOT_UNDERBRACE: usize = 4;
/// Left superscript.
pub const SLOT_LSUP: usize = 5;
/// Centered superscript (over).
pub const SLOT_CSUP: usize = 6;
/// Right superscript.
pub const SLOT_RSUP: usize = 7;
/// Over-brace annotation.
pub const SLOT_OVERBRACE: usize = 8;
/// Number of child slots of a Position node.
pub const POSITION_SLOTS: usize = 9;

/// Postfix attachment keywords and the Position slot they fill.
pub static POSITIONS: phf::Map<&'static str, usize> = phf_map! {
    "_" => SLOT_RSUB,
    "rsub" => SLOT_RSUB,
    "^" => SLOT_RSUP,
    "rsup" => SLOT_RSUP,
    "lsub" => SLOT_LSUB,
    "lsup" => SLOT_LSUP,
    "csub" => SLOT_CSUB,
    "csup" => SLOT_CSUP,
    "underbrace" => SLOT_UNDERBRACE,
    "overbrace" => SLOT_OVERBRACE,
};

/// Relation operators, mapped to their glyph.
pub static RELATIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "=" => "=",
    "<>" => "\u{2260}",
    "neq" => "\u{2260}",
    "<" => "<",
    "lt" => "<",
    ">" => ">",
    "gt" => ">",
    "<=" => "\u{2264}",
    "le" => "\u{2264}",
    ">=" => "\u{2265}",
    "ge" => "\u{2265}",
    "leslant" => "\u{2A7D}",
    "geslant" => "\u{2A7E}",
    "<<" => "\u{226A}",
    "ll" => "\u{226A}",
    ">>" => "\u{226B}",
    "gg" => "\u{226B}",
    "approx" => "\u{2248}",
    "sim" => "\u{223C}",
    "simeq" => "\u{2243}",
    "equiv" => "\u{2261}",
    "prop" => "\u{221D}",
    "parallel" => "\u{2225}",
    "ortho" => "\u{22A5}",
    "divides" => "\u{2223}",
    "ndivides" => "\u{2224}",
    "toward" => "\u{2192}",
    "dlarrow" => "\u{21D0}",
    "dlrarrow" => "\u{21D4}",
    "drarrow" => "\u{21D2}",
    "in" => "\u{2208}",
    "notin" => "\u{2209}",
    "owns" => "\u{220B}",
    "subset" => "\u{2282}",
    "subseteq" => "\u{2286}",
    "supset" => "\u{2283}",
    "supseteq" => "\u{2287}",
    "nsubset" => "\u{2284}",
    "nsubseteq" => "\u{2288}",
    "nsupset" => "\u{2285}",
    "nsupseteq" => "\u{2289}",
    "def" => "\u{225D}",
    "transl" => "\u{22B7}",
    "transr" => "\u{22B6}",
    "prec" => "\u{227A}",
    "succ" => "\u{227B}",
    "preccurlyeq" => "\u{227C}",
    "succcurlyeq" => "\u{227D}",
    "precsim" => "\u{227E}",
    "succsim" => "\u{227F}",
    "nprec" => "\u{2280}",
    "nsucc" => "\u{2281}",
};

/// Addition-level binary operators.
pub static ADDITIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "+" => "+",
    "-" => "\u{2212}",
    "+-" => "\u{00B1}",
    "plusminus" => "\u{00B1}",
    "-+" => "\u{2213}",
    "minusplus" => "\u{2213}",
    "or" => "\u{2228}",
    "union" => "\u{222A}",
    "setminus" => "\u{2216}",
    "oplus" => "\u{2295}",
    "ominus" => "\u{2296}",
};

/// Multiplication-level binary operators. `over` and `wideslash` are
/// rendered as fractions and carry no glyph of their own.
pub static MULTIPLICATIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "*" => "\u{2217}",
    "/" => "/",
    "&" => "\u{2227}",
    "and" => "\u{2227}",
    "over" => "",
    "wideslash" => "",
    "widebslash" => "\u{2216}",
    "bslash" => "\\",
    "cdot" => "\u{22C5}",
    "times" => "\u{00D7}",
    "div" => "\u{00F7}",
    "intersection" => "\u{2229}",
    "circ" => "\u{2218}",
    "odot" => "\u{2299}",
    "otimes" => "\u{2297}",
    "odivide" => "\u{2298}",
    "setquotient" => "/",
};

/// Prefix operators.
pub static UNARY_OPERATORS: phf::Map<&'static str, &'static str> = phf_map! {
    "+" => "+",
    "-" => "\u{2212}",
    "+-" => "\u{00B1}",
    "plusminus" => "\u{00B1}",
    "-+" => "\u{2213}",
    "minusplus" => "\u{2213}",
    "neg" => "\u{00AC}",
};

/// Shape of a keyword handled at the function level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// `sin`, `log`, ...: one argument, rendered upright with function application
    Named,
    /// `func <name>`: user function
    Func,
    Sqrt,
    NRoot,
    Abs,
    Fact,
    Binom,
    Stack,
    Matrix,
}

pub static FUNCTIONS: phf::Map<&'static str, FunctionKind> = phf_map! {
    "sin" => FunctionKind::Named,
    "cos" => FunctionKind::Named,
    "tan" => FunctionKind::Named,
    "cot" => FunctionKind::Named,
    "sinh" => FunctionKind::Named,
    "cosh" => FunctionKind::Named,
    "tanh" => FunctionKind::Named,
    "coth" => FunctionKind::Named,
    "arcsin" => FunctionKind::Named,
    "arccos" => FunctionKind::Named,
    "arctan" => FunctionKind::Named,
    "arccot" => FunctionKind::Named,
    "arsinh" => FunctionKind::Named,
    "arcosh" => FunctionKind::Named,
    "artanh" => FunctionKind::Named,
    "arcoth" => FunctionKind::Named,
    "ln" => FunctionKind::Named,
    "log" => FunctionKind::Named,
    "exp" => FunctionKind::Named,
    "func" => FunctionKind::Func,
    "sqrt" => FunctionKind::Sqrt,
    "nroot" => FunctionKind::NRoot,
    "abs" => FunctionKind::Abs,
    "fact" => FunctionKind::Fact,
    "binom" => FunctionKind::Binom,
    "stack" => FunctionKind::Stack,
    "matrix" => FunctionKind::Matrix,
};

/// Category of a one- or two-argument decoration keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentKind {
    /// Glyph placed over (or under) the argument
    Accent,
    /// Font attribute change
    Style,
    /// Horizontal alignment hint
    ColumnAlign,
    /// Vertical alignment hint
    RowAlign,
    /// `size`, `font`, `color`: takes a parameter before the argument
    Parameter,
}

pub static ACCENTS: phf::Map<&'static str, AccentKind> = phf_map! {
    "acute" => AccentKind::Accent,
    "bar" => AccentKind::Accent,
    "breve" => AccentKind::Accent,
    "check" => AccentKind::Accent,
    "circle" => AccentKind::Accent,
    "dot" => AccentKind::Accent,
    "ddot" => AccentKind::Accent,
    "dddot" => AccentKind::Accent,
    "grave" => AccentKind::Accent,
    "hat" => AccentKind::Accent,
    "tilde" => AccentKind::Accent,
    "vec" => AccentKind::Accent,
    "overline" => AccentKind::Accent,
    "underline" => AccentKind::Accent,
    "overstrike" => AccentKind::Accent,
    "widehat" => AccentKind::Accent,
    "widetilde" => AccentKind::Accent,
    "widevec" => AccentKind::Accent,
    "bold" => AccentKind::Style,
    "nbold" => AccentKind::Style,
    "ital" => AccentKind::Style,
    "italic" => AccentKind::Style,
    "nitalic" => AccentKind::Style,
    "phantom" => AccentKind::Style,
    "alignl" => AccentKind::ColumnAlign,
    "alignc" => AccentKind::ColumnAlign,
    "alignr" => AccentKind::ColumnAlign,
    "alignt" => AccentKind::RowAlign,
    "alignm" => AccentKind::RowAlign,
    "alignb" => AccentKind::RowAlign,
    "size" => AccentKind::Parameter,
    "font" => AccentKind::Parameter,
    "color" => AccentKind::Parameter,
};

/// Large operators accepting `from`/`to` bounds, mapped to their glyph.
pub static INTEGRALS: phf::Map<&'static str, &'static str> = phf_map! {
    "sum" => "\u{2211}",
    "prod" => "\u{220F}",
    "coprod" => "\u{2210}",
    "int" => "\u{222B}",
    "iint" => "\u{222C}",
    "iiint" => "\u{222D}",
    "lint" => "\u{222E}",
    "llint" => "\u{222F}",
    "lllint" => "\u{2230}",
    "lim" => "lim",
    "liminf" => "lim inf",
    "limsup" => "lim sup",
    "oper" => "",
};

/// Opening brackets and their matching closing token.
pub static OPENING_BRACKETS: phf::Map<&'static str, &'static str> = phf_map! {
    "(" => ")",
    "[" => "]",
    "{" => "}",
    "lbrace" => "rbrace",
    "langle" => "rangle",
    "lceil" => "rceil",
    "lfloor" => "rfloor",
    "lline" => "rline",
    "ldline" => "rdline",
    "ldbracket" => "rdbracket",
};

/// Every bracket token, mapped to the glyph it renders as.
pub static BRACKETS: phf::Map<&'static str, &'static str> = phf_map! {
    "(" => "(",
    ")" => ")",
    "[" => "[",
    "]" => "]",
    "{" => "{",
    "}" => "}",
    "|" => "|",
    "lbrace" => "{",
    "rbrace" => "}",
    "langle" => "\u{27E8}",
    "rangle" => "\u{27E9}",
    "lceil" => "\u{2308}",
    "rceil" => "\u{2309}",
    "lfloor" => "\u{230A}",
    "rfloor" => "\u{230B}",
    "lline" => "|",
    "rline" => "|",
    "ldline" => "\u{2016}",
    "rdline" => "\u{2016}",
    "ldbracket" => "\u{27E6}",
    "rdbracket" => "\u{27E7}",
    "none" => "",
};

/// Greek letters usable after `%` (and `%i` for the italic form).
pub static GREEK: phf::Map<&'static str, &'static str> = phf_map! {
    "alpha" => "\u{03B1}",
    "beta" => "\u{03B2}",
    "gamma" => "\u{03B3}",
    "delta" => "\u{03B4}",
    "epsilon" => "\u{03B5}",
    "varepsilon" => "\u{03F5}",
    "zeta" => "\u{03B6}",
    "eta" => "\u{03B7}",
    "theta" => "\u{03B8}",
    "vartheta" => "\u{03D1}",
    "iota" => "\u{03B9}",
    "kappa" => "\u{03BA}",
    "lambda" => "\u{03BB}",
    "mu" => "\u{03BC}",
    "nu" => "\u{03BD}",
    "xi" => "\u{03BE}",
    "omicron" => "\u{03BF}",
    "pi" => "\u{03C0}",
    "varpi" => "\u{03D6}",
    "rho" => "\u{03C1}",
    "varrho" => "\u{03F1}",
    "sigma" => "\u{03C3}",
    "varsigma" => "\u{03C2}",
    "tau" => "\u{03C4}",
    "upsilon" => "\u{03C5}",
    "phi" => "\u{03C6}",
    "varphi" => "\u{03D5}",
    "chi" => "\u{03C7}",
    "psi" => "\u{03C8}",
    "omega" => "\u{03C9}",
    "ALPHA" => "\u{0391}",
    "BETA" => "\u{0392}",
    "GAMMA" => "\u{0393}",
    "DELTA" => "\u{0394}",
    "EPSILON" => "\u{0395}",
    "ZETA" => "\u{0396}",
    "ETA" => "\u{0397}",
    "THETA" => "\u{0398}",
    "IOTA" => "\u{0399}",
    "KAPPA" => "\u{039A}",
    "LAMBDA" => "\u{039B}",
    "MU" => "\u{039C}",
    "NU" => "\u{039D}",
    "XI" => "\u{039E}",
    "OMICRON" => "\u{039F}",
    "PI" => "\u{03A0}",
    "RHO" => "\u{03A1}",
    "SIGMA" => "\u{03A3}",
    "TAU" => "\u{03A4}",
    "UPSILON" => "\u{03A5}",
    "PHI" => "\u{03A6}",
    "CHI" => "\u{03A7}",
    "PSI" => "\u{03A8}",
    "OMEGA" => "\u{03A9}",
};

/// Non-greek names usable after `%`.
pub static PERCENT_SYMBOLS: phf::Map<&'static str, &'static str> = phf_map! {
    "and" => "\u{2227}",
    "or" => "\u{2228}",
    "angle" => "\u{2220}",
    "element" => "\u{2208}",
    "noelement" => "\u{2209}",
    "notequal" => "\u{2260}",
    "identical" => "\u{2261}",
    "infinite" => "\u{221E}",
    "perthousand" => "\u{2030}",
    "tendto" => "\u{2192}",
    "strictlylessthan" => "\u{226A}",
    "strictlygreaterthan" => "\u{226B}",
};

/// Bare keywords that stand for a single symbol.
pub static SYMBOLS: phf::Map<&'static str, &'static str> = phf_map! {
    "infinity" => "\u{221E}",
    "infty" => "\u{221E}",
    "partial" => "\u{2202}",
    "nabla" => "\u{2207}",
    "exists" => "\u{2203}",
    "notexists" => "\u{2204}",
    "forall" => "\u{2200}",
    "hbar" => "\u{210F}",
    "lambdabar" => "\u{019B}",
    "aleph" => "\u{2135}",
    "Re" => "\u{211C}",
    "Im" => "\u{2111}",
    "wp" => "\u{2118}",
    "emptyset" => "\u{2205}",
    "backepsilon" => "\u{220D}",
    "leftarrow" => "\u{2190}",
    "rightarrow" => "\u{2192}",
    "uparrow" => "\u{2191}",
    "downarrow" => "\u{2193}",
    "dotslow" => "\u{2026}",
    "dotsaxis" => "\u{22EF}",
    "dotsvert" => "\u{22EE}",
    "dotsup" => "\u{22F0}",
    "dotsdiag" => "\u{22F0}",
    "dotsdown" => "\u{22F1}",
    "setN" => "\u{2115}",
    "setZ" => "\u{2124}",
    "setQ" => "\u{211A}",
    "setR" => "\u{211D}",
    "setC" => "\u{2102}",
};

/// Keywords that only make sense as part of a larger construct.
pub static STRUCTURAL: phf::Set<&'static str> = phf_set! {
    "from", "to", "left", "right", "newline", "boper", "uoper", "nospace",
};

/// Look up the glyph of a `%name` (or `%iname`) symbol.
///
/// Returns the glyph and whether the italic form was requested.
pub fn percent_symbol(name: &str) -> Option<(&'static str, bool)> {
    if let Some(glyph) = GREEK.get(name).or_else(|| PERCENT_SYMBOLS.get(name)) {
        return Some((*glyph, false));
    }
    let plain = name.strip_prefix('i')?;
    GREEK.get(plain).map(|glyph| (*glyph, true))
}

/// Whether an identifier is reserved by the notation.
pub fn is_keyword(word: &str) -> bool {
    POSITIONS.contains_key(word)
        || RELATIONS.contains_key(word)
        || ADDITIONS.contains_key(word)
        || MULTIPLICATIONS.contains_key(word)
        || UNARY_OPERATORS.contains_key(word)
        || FUNCTIONS.contains_key(word)
        || ACCENTS.contains_key(word)
        || INTEGRALS.contains_key(word)
        || BRACKETS.contains_key(word)
        || SYMBOLS.contains_key(word)
        || STRUCTURAL.contains(word)
}

/// Whether a token closes a bracket pair (including `right`).
pub fn is_closing(word: &str) -> bool {
    word == "right" || OPENING_BRACKETS.values().any(|close| *close == word)
}

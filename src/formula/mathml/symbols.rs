//! Glyph tables used when rendering StarMath nodes as MathML.

use phf::phf_map;

use crate::formula::starmath::keywords::{
    ADDITIONS, MULTIPLICATIONS, RELATIONS, SYMBOLS, UNARY_OPERATORS, percent_symbol,
};

/// Where an accent glyph is drawn relative to its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Over,
    Under,
    /// Struck through the argument (`overstrike`)
    Through,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccentGlyph {
    pub glyph: &'static str,
    pub placement: Placement,
    /// Whether the glyph stretches over the whole argument
    pub stretchy: bool,
}

const fn over(glyph: &'static str, stretchy: bool) -> AccentGlyph {
    AccentGlyph {
        glyph,
        placement: Placement::Over,
        stretchy,
    }
}

pub static ACCENT_GLYPHS: phf::Map<&'static str, AccentGlyph> = phf_map! {
    "acute" => over("\u{00B4}", false),
    "bar" => over("\u{00AF}", false),
    "breve" => over("\u{02D8}", false),
    "check" => over("\u{02C7}", false),
    "circle" => over("\u{02DA}", false),
    "dot" => over("\u{02D9}", false),
    "ddot" => over("\u{00A8}", false),
    "dddot" => over("\u{20DB}", false),
    "grave" => over("`", false),
    "hat" => over("^", false),
    "tilde" => over("~", false),
    "vec" => over("\u{2192}", false),
    "overline" => over("\u{00AF}", true),
    "widehat" => over("^", true),
    "widetilde" => over("~", true),
    "widevec" => over("\u{2192}", true),
    "underline" => AccentGlyph { glyph: "\u{00AF}", placement: Placement::Under, stretchy: true },
    "overstrike" => AccentGlyph { glyph: "", placement: Placement::Through, stretchy: true },
};

/// Font family selected with `font <name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Serif,
    Sans,
    Fixed,
}

pub static FONT_FAMILIES: phf::Map<&'static str, Family> = phf_map! {
    "serif" => Family::Serif,
    "sans" => Family::Sans,
    "fixed" => Family::Fixed,
};

/// Named colours accepted by `color <name>`.
pub static COLORS: phf::Map<&'static str, &'static str> = phf_map! {
    "black" => "#000000",
    "blue" => "#0000ff",
    "green" => "#008000",
    "red" => "#ff0000",
    "cyan" => "#00ffff",
    "magenta" => "#ff00ff",
    "yellow" => "#ffff00",
    "white" => "#ffffff",
    "gray" => "#808080",
    "lime" => "#00ff00",
    "maroon" => "#800000",
    "navy" => "#000080",
    "olive" => "#808000",
    "purple" => "#800080",
    "silver" => "#c0c0c0",
    "teal" => "#008080",
    "aqua" => "#00ffff",
    "fuchsia" => "#ff00ff",
};

/// Column alignment attribute for `alignl`, `alignc`, `alignr`.
pub fn column_alignment(keyword: &str) -> Option<&'static str> {
    match keyword {
        "alignl" => Some("left"),
        "alignc" => Some("center"),
        "alignr" => Some("right"),
        _ => None,
    }
}

/// Row alignment attribute for `alignt`, `alignm`, `alignb`.
pub fn row_alignment(keyword: &str) -> Option<&'static str> {
    match keyword {
        "alignt" => Some("top"),
        "alignm" => Some("center"),
        "alignb" => Some("bottom"),
        _ => None,
    }
}

/// Glyph of a binary, relational or prefix operator keyword.
pub fn operator_glyph(name: &str) -> &str {
    RELATIONS
        .get(name)
        .or_else(|| ADDITIONS.get(name))
        .or_else(|| MULTIPLICATIONS.get(name).filter(|glyph| !glyph.is_empty()))
        .or_else(|| UNARY_OPERATORS.get(name))
        .copied()
        .unwrap_or(name)
}

/// Glyph of the free symbol given to `boper`, `uoper` or `oper`.
pub fn free_symbol(text: &str) -> &str {
    if let Some((glyph, _)) = text.strip_prefix('%').and_then(percent_symbol) {
        return glyph;
    }
    if let Some(glyph) = SYMBOLS.get(text) {
        return *glyph;
    }
    operator_glyph(text)
}

/// Symbols that render as operators rather than identifiers.
pub fn is_operator_symbol(glyph: &str) -> bool {
    matches!(
        glyph,
        "\u{2190}" | "\u{2192}" | "\u{2191}" | "\u{2193}" | "\u{2026}" | "\u{22EF}" | "\u{22EE}"
            | "\u{22F0}" | "\u{22F1}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_glyphs() {
        assert_eq!(operator_glyph("<="), "\u{2264}");
        assert_eq!(operator_glyph("times"), "\u{00D7}");
        assert_eq!(operator_glyph("neg"), "\u{00AC}");
        // fraction keywords have no glyph of their own
        assert_eq!(operator_glyph("over"), "over");
        assert_eq!(operator_glyph("foo"), "foo");
    }

    #[test]
    fn test_free_symbols() {
        assert_eq!(free_symbol("%alpha"), "\u{03B1}");
        assert_eq!(free_symbol("infinity"), "\u{221E}");
        assert_eq!(free_symbol("oplus"), "\u{2295}");
        assert_eq!(free_symbol("#"), "#");
    }

    #[test]
    fn test_alignments() {
        assert_eq!(column_alignment("alignl"), Some("left"));
        assert_eq!(row_alignment("alignb"), Some("bottom"));
        assert_eq!(column_alignment("alignt"), None);
    }
}

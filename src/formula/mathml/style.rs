//! Inherited text style while walking a formula.

use super::symbols::Family;

/// Point size the relative `size +n` / `size -n` forms are applied to.
const BASE_SIZE_PT: f64 = 12.0;

/// Style state threaded by value through the emitter.
///
/// Each nested construct receives a modified copy, so leaving a subtree
/// restores the outer style without any explicit bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    /// `mathsize` value in effect
    pub size: Option<String>,
    pub bold: bool,
    /// Explicit italic choice; `None` keeps the element's natural slant
    pub italic: Option<bool>,
    pub family: Option<Family>,
    /// `mathcolor` value in effect
    pub color: Option<String>,
}

impl Style {
    /// `mathvariant` for a token element, or `None` when the element's
    /// natural rendering already matches.
    ///
    /// `natural_italic` is how MathML draws the element unstyled: single
    /// letter identifiers are italic, everything else upright.
    pub fn mathvariant(&self, natural_italic: bool) -> Option<&'static str> {
        if !self.bold && self.italic.is_none() && self.family.is_none() {
            return None;
        }
        let italic = self.italic.unwrap_or(natural_italic);
        let variant = match (self.family, self.bold, italic) {
            (Some(Family::Fixed), _, _) => "monospace",
            (Some(Family::Sans), false, false) => "sans-serif",
            (Some(Family::Sans), true, false) => "bold-sans-serif",
            (Some(Family::Sans), false, true) => "sans-serif-italic",
            (Some(Family::Sans), true, true) => "sans-serif-bold-italic",
            (_, false, false) => "normal",
            (_, true, false) => "bold",
            (_, false, true) => "italic",
            (_, true, true) => "bold-italic",
        };
        let natural = if natural_italic { "italic" } else { "normal" };
        (variant != natural).then_some(variant)
    }
}

/// Translate the parameter of `size` into a `mathsize` value.
///
/// Plain numbers are points, `+n`/`-n` are relative to the base size and
/// `*f`/`/f` scale the current size.
pub fn size_value(param: &str) -> Option<String> {
    let (op, number) = match param.chars().next()? {
        c @ ('+' | '-' | '*' | '/') => (Some(c), &param[1..]),
        _ => (None, param),
    };
    let value: f64 = number.parse().ok().filter(|v: &f64| v.is_finite())?;
    let round = |v: f64| (v * 100.0).round() / 100.0;
    match op {
        None => Some(format!("{}pt", round(value))),
        Some('+') => Some(format!("{}pt", round(BASE_SIZE_PT + value))),
        Some('-') => Some(format!("{}pt", round((BASE_SIZE_PT - value).max(1.0)))),
        Some('*') => Some(format!("{}%", round(value * 100.0))),
        Some(_) if value != 0.0 => Some(format!("{}%", round(100.0 / value))),
        Some(_) => None,
    }
}

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

const SPECIALS: [&str; 5] = ["&", "<", ">", "\"", "'"];
const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(SPECIALS)
        .expect("Failed to build XML escaper")
});

/// Escape XML special characters.
///
/// # Examples
///
/// ```
/// use stoff::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<?>"), "&lt;?&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    if !needs_escape(s) {
        return s.to_string();
    }
    XML_ESCAPER.replace_all(s, &ENTITIES)
}

/// Append `s` to `out`, escaping XML special characters.
#[inline]
pub(crate) fn push_escaped(out: &mut String, s: &str) {
    if !needs_escape(s) {
        out.push_str(s);
        return;
    }
    XML_ESCAPER.replace_all_with(s, out, |mat, _, dst| {
        dst.push_str(ENTITIES[mat.pattern().as_usize()]);
        true
    });
}

#[inline]
fn needs_escape(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''))
}

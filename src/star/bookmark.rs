//! Writer bookmark tables.
//!
//! Bookmarks live in an SW record tagged `a`, one nested `B` record each.

use super::{Decoded, StarError, StarResult, StarZone};

const BOOKMARKS_TAG: u8 = b'a';
const BOOKMARK_TAG: u8 = b'B';

/// Basic macro bound to a bookmark event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Macro {
    pub library: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bookmark {
    pub name: String,
    pub short_name: String,
    /// Key code of the keyboard shortcut, 0 when none
    pub key: u16,
    pub modifier: u16,
    /// Macro run when the bookmark is entered
    pub start_macro: Option<Macro>,
    /// Macro run when the bookmark is left
    pub end_macro: Option<Macro>,
}

fn read_macro(zone: &mut StarZone) -> StarResult<Option<Macro>> {
    let library = zone.read_string()?;
    let name = zone.read_string()?;
    if library.is_empty() && name.is_empty() {
        return Ok(None);
    }
    Ok(Some(Macro { library, name }))
}

fn read_bookmark(zone: &mut StarZone) -> StarResult<Bookmark> {
    let mut bookmark = Bookmark {
        name: zone.read_string()?,
        short_name: zone.read_string()?,
        key: zone.read_u16()?,
        modifier: zone.read_u16()?,
        ..Bookmark::default()
    };
    if !zone.at_end() {
        bookmark.start_macro = read_macro(zone)?;
        bookmark.end_macro = read_macro(zone)?;
    }
    Ok(bookmark)
}

/// Decode a bookmark table at the current position.
///
/// Fails without consuming anything when no `a` record starts here.
pub fn read_bookmarks(zone: &mut StarZone) -> StarResult<Decoded<Vec<Bookmark>>> {
    let mark = zone.notes().len();
    let found = zone.peek_u8();
    if found != Some(BOOKMARKS_TAG) {
        return Err(StarError::BadMagic {
            expected: char::from(BOOKMARKS_TAG).to_string(),
            found: found.map(|b| char::from(b).to_string()).unwrap_or_default(),
            offset: zone.position(),
        });
    }
    let bookmarks = zone.with_sw_record(|zone, _| {
        let mut bookmarks = Vec::new();
        while !zone.at_end() {
            let start = zone.position();
            let result = zone.with_sw_record(|zone, tag| match tag {
                BOOKMARK_TAG => read_bookmark(zone).map(Some),
                other => {
                    zone.note(format!("skipped SW record {:?}", char::from(other)));
                    Ok(None)
                },
            });
            match result {
                Ok(Some(bookmark)) => bookmarks.push(bookmark),
                Ok(None) => {},
                Err(err) => zone.note(format!("bookmark: {err}")),
            }
            if zone.position() == start {
                break;
            }
        }
        Ok(bookmarks)
    })?;
    Ok(Decoded::new(bookmarks, zone.notes_since(mark)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::star::testing::Builder;

    fn bookmark(name: &str, macros: Option<(&str, &str)>) -> Builder {
        let mut body = Builder::new().string(name).string("").u16(0x42).u16(0x1000);
        if let Some((library, entry)) = macros {
            body = body.string(library).string(entry).string("").string("");
        }
        Builder::new().sw(b'B', body)
    }

    #[test]
    fn test_bookmarks() {
        let table = Builder::new()
            .raw(&bookmark("intro", None).build())
            .sw(b'X', Builder::new().u32(0))
            .raw(&bookmark("jump", Some(("Standard", "Module1.Go"))).build());
        let data = Builder::new().sw(b'a', table).build();
        let mut zone = StarZone::new(data, "bookmarks");
        let decoded = read_bookmarks(&mut zone).unwrap();
        let bookmarks = &decoded.value;
        assert_eq!(bookmarks.len(), 2);
        assert_eq!(bookmarks[0].name, "intro");
        assert_eq!(bookmarks[0].start_macro, None);
        assert_eq!(bookmarks[1].key, 0x42);
        assert_eq!(
            bookmarks[1].start_macro,
            Some(Macro {
                library: "Standard".into(),
                name: "Module1.Go".into(),
            })
        );
        assert_eq!(bookmarks[1].end_macro, None);
        assert_eq!(decoded.notes.len(), 1);
        assert!(zone.at_end());
    }

    #[test]
    fn test_wrong_table_tag() {
        let data = Builder::new().sw(b'B', Builder::new()).build();
        let mut zone = StarZone::new(data, "bookmarks");
        assert!(matches!(read_bookmarks(&mut zone), Err(StarError::BadMagic { .. })));
        assert_eq!(zone.position(), 0);
    }

    #[test]
    fn test_truncated_bookmark_is_noted() {
        let table = Builder::new()
            .sw(b'B', Builder::new().string("cut"))
            .raw(&bookmark("whole", None).build());
        let data = Builder::new().sw(b'a', table).build();
        let mut zone = StarZone::new(data, "bookmarks");
        let decoded = read_bookmarks(&mut zone).unwrap();
        assert_eq!(decoded.value.len(), 1);
        assert_eq!(decoded.value[0].name, "whole");
        assert_eq!(decoded.notes.len(), 1);
    }
}

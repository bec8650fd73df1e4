//! Record framing of StarOffice binary streams.

/// Size of a header record prefix: magic, version and block size.
pub const HEADER_PREFIX_LEN: usize = 10;
/// Size of a version-compat record prefix: version and payload length.
pub const VERSION_COMPAT_PREFIX_LEN: usize = 6;
/// Size of an SW record prefix: tag and 24-bit length.
pub const SW_PREFIX_LEN: usize = 4;

/// Wire layout of an open record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `u32` payload length
    Generic,
    /// 4-byte magic, `u16` version, `u32` block size counted from the magic
    Header,
    /// `u16` version, `u32` payload length
    VersionCompat,
    /// 1-byte tag, 24-bit length of the whole record
    Sw,
    /// Region with a caller-supplied length and no prefix
    Bounded,
}

/// One entry of the open-record stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFrame {
    pub kind: RecordKind,
    /// Offset of the first byte of the record, prefix included
    pub start: usize,
    /// Declared end offset; closing the record always seeks here
    pub end: usize,
    /// Nesting level, 0 for an outermost record
    pub level: usize,
}

impl RecordFrame {
    /// Declared length of the record, prefix included.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_bounds() {
        let frame = RecordFrame {
            kind: RecordKind::Generic,
            start: 4,
            end: 12,
            level: 0,
        };
        assert_eq!(frame.len(), 8);
        assert!(frame.contains(4));
        assert!(!frame.contains(12));
        assert!(!frame.is_empty());
    }
}

//! Cursor over a StarOffice record stream.
//!
//! A [`StarZone`] owns the stream bytes, a read position and the stack of
//! open records. Every read is bounded by the innermost open record, and
//! closing a record seeks to its declared end whatever the decoder consumed.

use std::io::{Read, Seek, SeekFrom};

use bytes::Bytes;
use smallvec::SmallVec;

use super::record::{
    HEADER_PREFIX_LEN, RecordFrame, RecordKind, SW_PREFIX_LEN, VERSION_COMPAT_PREFIX_LEN,
};
use super::{Note, ReadOptions, StarError, StarResult};
use crate::common::binary::{self, BinaryResult, ByteOrder};

/// Printable form of a record tag for messages.
pub(crate) fn tag_name(tag: &[u8]) -> String {
    tag.iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
        .collect()
}

pub struct StarZone {
    data: Bytes,
    pos: usize,
    name: String,
    order: ByteOrder,
    frames: SmallVec<[RecordFrame; 8]>,
    options: ReadOptions,
    notes: Vec<Note>,
}

macro_rules! zone_reader {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $size:expr) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self) -> StarResult<$ty> {
            let at = self.require($size)?;
            let value = binary::$name(&self.data, at, self.order)?;
            self.pos += $size;
            Ok(value)
        }
    };
}

impl StarZone {
    /// Create a zone over an in-memory stream.
    pub fn new(data: impl Into<Bytes>, name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            name: name.into(),
            order: ByteOrder::Little,
            frames: SmallVec::new(),
            options: ReadOptions::default(),
            notes: Vec::new(),
        }
    }

    /// Read a whole seekable stream, starting from its first byte.
    pub fn from_reader<R: Read + Seek>(reader: &mut R, name: impl Into<String>) -> StarResult<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::new(data, name))
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Stream name used in notes and log messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor inside the innermost open record.
    pub fn seek(&mut self, pos: usize) -> StarResult<()> {
        let lower = self.frames.last().map_or(0, |frame| frame.start);
        if pos < lower || pos > self.limit() {
            return Err(StarError::Framing {
                offset: pos,
                message: format!("seek outside of [{lower}, {}]", self.limit()),
            });
        }
        self.pos = pos;
        Ok(())
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.order == ByteOrder::Big
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.order = if inverted {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        };
    }

    /// Number of open records.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current_record(&self) -> Option<&RecordFrame> {
        self.frames.last()
    }

    /// End of the readable region: the innermost record end or the stream end.
    #[inline]
    pub fn limit(&self) -> usize {
        self.frames
            .last()
            .map_or(self.data.len(), |frame| frame.end.min(self.data.len()))
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit().saturating_sub(self.pos)
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.remaining() == 0
    }

    // ---------------------------------------------------------------------
    // notes

    /// Record a soft failure at the current position.
    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}: {} at offset {}", self.name, message, self.pos);
        self.notes.push(Note {
            offset: self.pos,
            message,
        });
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Notes recorded after the first `mark` ones.
    pub fn notes_since(&self, mark: usize) -> Vec<Note> {
        self.notes.get(mark..).map(<[Note]>::to_vec).unwrap_or_default()
    }

    pub fn take_notes(&mut self) -> Vec<Note> {
        std::mem::take(&mut self.notes)
    }

    // ---------------------------------------------------------------------
    // primitives

    /// Offset of the next `needed` bytes, if they lie inside the readable region.
    #[inline]
    fn require(&self, needed: usize) -> StarResult<usize> {
        if self.remaining() < needed {
            return Err(StarError::Truncated {
                offset: self.pos,
                needed,
            });
        }
        Ok(self.pos)
    }

    pub fn read_u8(&mut self) -> StarResult<u8> {
        let at = self.require(1)?;
        self.pos += 1;
        Ok(self.data[at])
    }

    pub fn read_i8(&mut self) -> StarResult<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// One-byte boolean; any non-zero value is true.
    pub fn read_bool(&mut self) -> StarResult<bool> {
        self.read_u8().map(|b| b != 0)
    }

    zone_reader!(read_u16, u16, 2);
    zone_reader!(read_i16, i16, 2);
    zone_reader!(read_u32, u32, 4);
    zone_reader!(read_i32, i32, 4);
    zone_reader!(
        /// IEEE double in the stream byte order.
        read_f64, f64, 8
    );

    /// 24-bit length of SW records.
    pub fn read_u24(&mut self) -> StarResult<u32> {
        let at = self.require(3)?;
        let value = match self.order {
            ByteOrder::Little => binary::read_u24_le(&self.data, at)?,
            ByteOrder::Big => {
                let b = &self.data[at..at + 3];
                (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2])
            },
        };
        self.pos += 3;
        Ok(value)
    }

    pub fn read_bytes(&mut self, len: usize) -> StarResult<Bytes> {
        let at = self.require(len)?;
        self.pos += len;
        Ok(self.data.slice(at..at + len))
    }

    pub fn skip(&mut self, len: usize) -> StarResult<()> {
        self.require(len)?;
        self.pos += len;
        Ok(())
    }

    /// Next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.require(1).ok().map(|at| self.data[at])
    }

    /// Next four bytes without consuming them.
    pub fn peek_tag(&self) -> Option<[u8; 4]> {
        let at = self.require(4).ok()?;
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&self.data[at..at + 4]);
        Some(tag)
    }

    /// `u16` length followed by 8-bit characters in the configured code page.
    pub fn read_string(&mut self) -> StarResult<String> {
        let len = usize::from(self.read_u16()?);
        let bytes = self.read_bytes(len)?;
        let encoding = self.options.encoding;
        let (text, malformed) = encoding.decode_without_bom_handling(&bytes);
        let text = text.into_owned();
        if malformed {
            self.note(format!("malformed {} string", encoding.name()));
        }
        Ok(text)
    }

    /// `u32` count followed by that many UTF-16 code units.
    pub fn read_unicode_string(&mut self) -> StarResult<String> {
        let offset = self.pos;
        let units = self.read_u32()? as usize;
        let len = match units.checked_mul(2) {
            Some(len) if len <= self.remaining() => len,
            _ => {
                self.pos = offset;
                return Err(StarError::Framing {
                    offset,
                    message: format!("{units} UTF-16 units exceed the record"),
                });
            },
        };
        let bytes = self.read_bytes(len)?;
        Ok(binary::parse_utf16_string(&bytes, self.order))
    }

    // ---------------------------------------------------------------------
    // byte order detection

    fn probe<T: PartialOrd + std::fmt::Debug>(
        &mut self,
        read: fn(&[u8], usize, ByteOrder) -> BinaryResult<T>,
        offset: usize,
        max: T,
    ) -> bool {
        let current = read(&self.data, offset, self.order);
        let flipped = read(&self.data, offset, self.order.inverted());
        if let (Ok(current), Ok(flipped)) = (current, flipped) {
            if current > max && flipped <= max {
                log::debug!(
                    "{}: switching byte order at offset {offset}: {current:?} > {max:?}",
                    self.name
                );
                self.order = self.order.inverted();
            }
        }
        self.is_inverted()
    }

    /// Detect byte order from a `u16` at `offset` known not to exceed `max`.
    ///
    /// Switches the zone's order when only the inverted reading is plausible
    /// and returns whether the zone now reads inverted.
    pub fn probe_inverted_u16(&mut self, offset: usize, max: u16) -> bool {
        self.probe(binary::read_u16, offset, max)
    }

    /// Same as [`probe_inverted_u16`](Self::probe_inverted_u16) for a `u32`.
    pub fn probe_inverted_u32(&mut self, offset: usize, max: u32) -> bool {
        self.probe(binary::read_u32, offset, max)
    }

    // ---------------------------------------------------------------------
    // records

    /// Run an opening sequence, rewinding to its start when it fails.
    fn open_with<T>(&mut self, open: impl FnOnce(&mut Self, usize) -> StarResult<T>) -> StarResult<T> {
        let start = self.pos;
        if self.frames.len() >= self.options.max_depth {
            return Err(StarError::TooDeep(self.options.max_depth));
        }
        let result = open(self, start);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn push_frame(&mut self, kind: RecordKind, start: usize, end: usize) -> StarResult<()> {
        if end < self.pos || end > self.limit() {
            return Err(StarError::Framing {
                offset: start,
                message: format!(
                    "{kind:?} record ends at {end}, outside of [{}, {}]",
                    self.pos,
                    self.limit()
                ),
            });
        }
        let level = self.frames.len();
        self.frames.push(RecordFrame {
            kind,
            start,
            end,
            level,
        });
        Ok(())
    }

    /// Open a generic record: `u32` payload length.
    pub fn open_record(&mut self) -> StarResult<()> {
        self.open_with(|zone, start| {
            let len = zone.read_u32()? as usize;
            let end = zone.pos.saturating_add(len);
            zone.push_frame(RecordKind::Generic, start, end)
        })
    }

    /// Open a header record tagged `magic` and return its version.
    ///
    /// On a tag mismatch nothing is consumed.
    pub fn open_header_record(&mut self, magic: &[u8; 4]) -> StarResult<u16> {
        self.open_with(|zone, start| {
            let found = zone.read_bytes(4)?;
            if found[..] != magic[..] {
                return Err(StarError::BadMagic {
                    expected: tag_name(magic),
                    found: tag_name(&found),
                    offset: start,
                });
            }
            let version = zone.read_u16()?;
            let size = zone.read_u32()? as usize;
            if size < HEADER_PREFIX_LEN {
                return Err(StarError::Framing {
                    offset: start,
                    message: format!("block size {size} is smaller than the record header"),
                });
            }
            zone.push_frame(RecordKind::Header, start, start.saturating_add(size))?;
            Ok(version)
        })
    }

    /// Open a version-compat record and return its version.
    pub fn open_version_compat_record(&mut self) -> StarResult<u16> {
        self.open_with(|zone, start| {
            let version = zone.read_u16()?;
            let len = zone.read_u32()? as usize;
            debug_assert_eq!(zone.pos - start, VERSION_COMPAT_PREFIX_LEN);
            zone.push_frame(RecordKind::VersionCompat, start, zone.pos.saturating_add(len))?;
            Ok(version)
        })
    }

    /// Open an SW record and return its one-byte tag.
    pub fn open_sw_record(&mut self) -> StarResult<u8> {
        self.open_with(|zone, start| {
            let tag = zone.read_u8()?;
            let len = zone.read_u24()? as usize;
            if len < SW_PREFIX_LEN {
                return Err(StarError::Framing {
                    offset: start,
                    message: format!("SW record length {len} is smaller than its header"),
                });
            }
            zone.push_frame(RecordKind::Sw, start, start + len)?;
            Ok(tag)
        })
    }

    /// Treat the next `len` bytes as a record without prefix.
    pub fn open_bounded_region(&mut self, len: usize) -> StarResult<()> {
        self.open_with(|zone, start| {
            zone.push_frame(RecordKind::Bounded, start, start.saturating_add(len))
        })
    }

    /// Close the innermost record and seek to its declared end.
    pub fn close_record(&mut self, kind: RecordKind) -> StarResult<()> {
        let Some(frame) = self.frames.last().copied() else {
            return Err(StarError::RecordStack(format!(
                "closing a {kind:?} record with no record open"
            )));
        };
        if frame.kind != kind {
            return Err(StarError::RecordStack(format!(
                "closing a {kind:?} record but the innermost record is {:?}",
                frame.kind
            )));
        }
        self.frames.pop();
        // reads never pass the innermost frame
        debug_assert!(self.pos <= frame.end);
        self.pos = frame.end;
        Ok(())
    }

    /// Run `body` inside the record just opened, closing it on every path.
    fn scoped<T>(
        &mut self,
        kind: RecordKind,
        body: impl FnOnce(&mut Self) -> StarResult<T>,
    ) -> StarResult<T> {
        let depth = self.frames.len();
        let result = body(self);
        while self.frames.len() > depth {
            if let Some(frame) = self.frames.pop() {
                self.note(format!("{:?} record left open", frame.kind));
            }
        }
        let closed = self.close_record(kind);
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Read a generic record with `body`.
    ///
    /// The zone ends up at the record's declared end whether `body` read
    /// less, hit the end, or failed.
    pub fn with_record<T>(&mut self, body: impl FnOnce(&mut Self) -> StarResult<T>) -> StarResult<T> {
        self.open_record()?;
        self.scoped(RecordKind::Generic, body)
    }

    /// Read a header record tagged `magic`; `body` receives its version.
    pub fn with_header_record<T>(
        &mut self,
        magic: &[u8; 4],
        body: impl FnOnce(&mut Self, u16) -> StarResult<T>,
    ) -> StarResult<T> {
        let version = self.open_header_record(magic)?;
        self.scoped(RecordKind::Header, |zone| body(zone, version))
    }

    pub fn with_version_compat_record<T>(
        &mut self,
        body: impl FnOnce(&mut Self, u16) -> StarResult<T>,
    ) -> StarResult<T> {
        let version = self.open_version_compat_record()?;
        self.scoped(RecordKind::VersionCompat, |zone| body(zone, version))
    }

    /// Read an SW record; `body` receives its tag.
    pub fn with_sw_record<T>(
        &mut self,
        body: impl FnOnce(&mut Self, u8) -> StarResult<T>,
    ) -> StarResult<T> {
        let tag = self.open_sw_record()?;
        self.scoped(RecordKind::Sw, |zone| body(zone, tag))
    }

    /// Run `body` over the next `len` bytes and continue right after them.
    pub fn with_bounded_region<T>(
        &mut self,
        len: usize,
        body: impl FnOnce(&mut Self) -> StarResult<T>,
    ) -> StarResult<T> {
        self.open_bounded_region(len)?;
        self.scoped(RecordKind::Bounded, body)
    }
}

impl std::fmt::Debug for StarZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarZone")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .field("pos", &self.pos)
            .field("order", &self.order)
            .field("frames", &self.frames)
            .field("notes", &self.notes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::star::testing::Builder;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn zone(bytes: Vec<u8>) -> StarZone {
        StarZone::new(bytes, "test")
    }

    #[test]
    fn test_close_seeks_to_declared_end() {
        let data = Builder::new()
            .record(Builder::new().u16(1).u16(2).u32(3))
            .u16(0xBEEF)
            .build();
        let mut zone = zone(data);
        let first = zone.with_record(|zone| zone.read_u16()).unwrap();
        assert_eq!(first, 1);
        assert_eq!(zone.position(), 12);
        assert_eq!(zone.read_u16().unwrap(), 0xBEEF);
        assert!(zone.notes().is_empty());
    }

    #[test]
    fn test_reads_are_bounded_by_record() {
        let data = Builder::new()
            .record(Builder::new().u16(7))
            .header(b"DrLy", 0, Builder::new())
            .build();
        let mut zone = zone(data);
        let result = zone.with_record(|zone| {
            zone.read_u16()?;
            zone.read_u32()
        });
        assert!(matches!(result, Err(StarError::Truncated { offset: 6, needed: 4 })));
        // sibling record is still readable at the declared end
        assert_eq!(zone.position(), 6);
        assert_eq!(zone.open_header_record(b"DrLy").unwrap(), 0);
    }

    #[test]
    fn test_header_magic_mismatch_rewinds() {
        let data = Builder::new().header(b"DrPg", 3, Builder::new().u16(1)).build();
        let mut zone = zone(data);
        let err = zone.open_header_record(b"DrLy").unwrap_err();
        assert!(matches!(err, StarError::BadMagic { ref found, .. } if found == "DrPg"));
        assert_eq!(zone.position(), 0);
        assert_eq!(zone.depth(), 0);
        assert_eq!(zone.open_header_record(b"DrPg").unwrap(), 3);
        assert_eq!(zone.limit(), 12);
    }

    #[test]
    fn test_header_block_size_must_cover_header() {
        let data = Builder::new().raw(b"DrLy").u16(0).u32(4).build();
        let mut zone = zone(data);
        assert!(matches!(
            zone.open_header_record(b"DrLy"),
            Err(StarError::Framing { offset: 0, .. })
        ));
        assert_eq!(zone.position(), 0);
    }

    #[test]
    fn test_length_past_stream_is_framing_error() {
        let data = Builder::new().u32(100).u16(1).build();
        let mut zone = zone(data);
        assert!(matches!(zone.open_record(), Err(StarError::Framing { .. })));
        assert_eq!(zone.position(), 0);
    }

    #[test]
    fn test_nested_record_cannot_outgrow_parent() {
        let inner = Builder::new().u32(50).u16(1);
        let data = Builder::new().record(inner).raw(&[0; 60]).build();
        let mut zone = zone(data);
        let result = zone.with_record(|zone| zone.with_record(|zone| zone.read_u16()));
        assert!(matches!(result, Err(StarError::Framing { .. })));
        assert_eq!(zone.position(), 10);
        assert_eq!(zone.depth(), 0);
    }

    #[test]
    fn test_close_record_checks_kind() {
        let data = Builder::new().record(Builder::new()).build();
        let mut zone = zone(data);
        assert!(matches!(
            zone.close_record(RecordKind::Generic),
            Err(StarError::RecordStack(_))
        ));
        zone.open_record().unwrap();
        assert!(matches!(
            zone.close_record(RecordKind::Header),
            Err(StarError::RecordStack(_))
        ));
        zone.close_record(RecordKind::Generic).unwrap();
    }

    #[test]
    fn test_scoped_record_closes_inner_records_left_open() {
        let data = Builder::new()
            .record(Builder::new().record(Builder::new().u16(1)).u16(2))
            .build();
        let mut zone = zone(data);
        zone.with_record(|zone| {
            zone.open_record()?;
            Ok(())
        })
        .unwrap();
        assert_eq!(zone.depth(), 0);
        assert_eq!(zone.position(), 12);
        assert_eq!(zone.notes().len(), 1);
    }

    #[test]
    fn test_depth_limit() {
        let data = Builder::new()
            .record(Builder::new().record(Builder::new().record(Builder::new())))
            .build();
        let mut zone = zone(data).with_options(ReadOptions::new().with_max_depth(2));
        let result = zone.with_record(|zone| zone.with_record(|zone| zone.with_record(|_| Ok(()))));
        assert!(matches!(result, Err(StarError::TooDeep(2))));
        assert_eq!(zone.position(), 12);
    }

    #[test]
    fn test_sw_record() {
        let data = Builder::new().sw(b'B', Builder::new().u16(5)).u8(0xFF).build();
        let mut zone = zone(data);
        let (tag, value) = zone
            .with_sw_record(|zone, tag| Ok((tag, zone.read_u16()?)))
            .unwrap();
        assert_eq!((tag, value), (b'B', 5));
        assert_eq!(zone.read_u8().unwrap(), 0xFF);
    }

    #[test]
    fn test_version_compat_and_bounded_region() {
        let data = Builder::new()
            .compat(4, Builder::new().u32(9).u32(10))
            .u16(1)
            .u16(2)
            .build();
        let mut zone = zone(data);
        let version = zone.with_version_compat_record(|_, version| Ok(version)).unwrap();
        assert_eq!(version, 4);
        assert_eq!(zone.position(), 14);
        zone.with_bounded_region(2, |zone| zone.skip(0)).unwrap();
        assert_eq!(zone.read_u16().unwrap(), 2);
    }

    #[test]
    fn test_inverted_byte_order() {
        let mut zone = zone(vec![0x12, 0x34, 0x00, 0x00, 0x00, 0x08]);
        zone.set_inverted(true);
        assert_eq!(zone.read_u16().unwrap(), 0x1234);
        assert_eq!(zone.read_u32().unwrap(), 8);
    }

    #[test]
    fn test_probe_inverted() {
        let mut inverted = zone(vec![0x00, 0x05]);
        assert!(inverted.probe_inverted_u16(0, 100));
        assert_eq!(inverted.read_u16().unwrap(), 5);

        let mut plain = zone(vec![0x05, 0x00]);
        assert!(!plain.probe_inverted_u16(0, 100));
    }

    #[test]
    fn test_strings() {
        let data = Builder::new().u16(4).raw(b"caf\xE9").build();
        assert_eq!(zone(data).read_string().unwrap(), "caf\u{00E9}");

        let data = Builder::new().u16(1).raw(&[0xC1]).build();
        let mut koi8 = zone(data)
            .with_options(ReadOptions::new().with_encoding(encoding_rs::KOI8_R));
        assert_eq!(koi8.read_string().unwrap(), "\u{0430}");

        let data = Builder::new().u32(2).raw(&[b'h', 0, b'i', 0]).build();
        assert_eq!(zone(data).read_unicode_string().unwrap(), "hi");

        let data = Builder::new().u32(0x4000_0000).build();
        let mut huge = zone(data);
        assert!(matches!(huge.read_unicode_string(), Err(StarError::Framing { .. })));
        assert_eq!(huge.position(), 0);
    }

    #[test]
    fn test_from_reader_rewinds() {
        let mut cursor = Cursor::new(vec![1u8, 0, 2, 0]);
        cursor.set_position(3);
        let mut zone = StarZone::from_reader(&mut cursor, "cursor").unwrap();
        assert_eq!(zone.read_u16().unwrap(), 1);
        assert_eq!(zone.name(), "cursor");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut zone = zone(b"DrMdxx".to_vec());
        assert_eq!(zone.peek_tag(), Some(*b"DrMd"));
        assert_eq!(zone.peek_u8(), Some(b'D'));
        assert_eq!(zone.position(), 0);
        zone.skip(4).unwrap();
        assert_eq!(zone.peek_tag(), None);
    }

    proptest! {
        #[test]
        fn prop_records_never_escape_the_stream(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let len = data.len();
            let mut zone = zone(data);
            while !zone.at_end() {
                let before = zone.position();
                let result = zone.with_record(|zone| {
                    while zone.read_u16().is_ok() {}
                    Ok(())
                });
                prop_assert!(zone.position() <= len);
                prop_assert_eq!(zone.depth(), 0);
                if result.is_err() {
                    prop_assert_eq!(zone.position(), before);
                    break;
                }
                prop_assert!(zone.position() > before);
            }
        }
    }
}

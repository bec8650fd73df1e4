//! StarOffice binary object model.
//!
//! StarOffice documents store their objects as nested, length-prefixed
//! records. [`StarZone`] reads such a stream with strict record framing:
//! closing a record always lands on its declared end, so decoders can skip
//! fields written by newer versions and survive truncated ones.
//!
//! On top of the reader sit decoders for the drawing model ([`sdr`]),
//! StarChart attribute lists and data tables ([`chart`]) and Writer
//! bookmarks ([`bookmark`]). Decoders return a [`Decoded`] value together
//! with the notes recorded while reading it; only a missing or mislabelled
//! outer record is a hard error.
//!
//! # Example
//!
//! ```
//! use stoff::star::StarZone;
//!
//! // generic record holding a single u16
//! let mut zone = StarZone::new(vec![2, 0, 0, 0, 0x34, 0x12], "demo");
//! let value = zone.with_record(|zone| zone.read_u16()).unwrap();
//! assert_eq!(value, 0x1234);
//! assert_eq!(zone.position(), 6);
//! ```
pub mod bookmark;
pub mod chart;
pub mod color;
pub mod record;
pub mod sdr;
pub mod zone;

use std::fmt;

use encoding_rs::{Encoding, WINDOWS_1252};
use thiserror::Error;

use crate::common::binary::BinaryError;

pub use bookmark::{Bookmark, Macro, read_bookmarks};
pub use chart::{ChartAttributes, MemChart, read_chart_attributes, read_mem_chart};
pub use color::Color;
pub use record::{RecordFrame, RecordKind};
pub use sdr::{SdrModel, read_model};
pub use zone::StarZone;

/// Errors raised while reading StarOffice records.
#[derive(Error, Debug)]
pub enum StarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read would pass the end of the innermost record or of the stream
    #[error("truncated data: {needed} bytes needed at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// A record did not start with the expected tag
    #[error("bad magic at offset {offset}: expected {expected:?}, found {found:?}")]
    BadMagic {
        expected: String,
        found: String,
        offset: usize,
    },

    /// A declared length is inconsistent with the enclosing data
    #[error("framing mismatch at offset {offset}: {message}")]
    Framing { offset: usize, message: String },

    /// `close_record` did not match the innermost open record
    #[error("record stack misuse: {0}")]
    RecordStack(String),

    #[error("record nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error(transparent)]
    Binary(#[from] BinaryError),
}

pub type StarResult<T> = Result<T, StarError>;

/// Default limit of nested open records.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Options for reading StarOffice streams
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Code page of 8-bit strings, windows-1252 unless configured
    pub encoding: &'static Encoding,
    /// Maximum number of simultaneously open records
    pub max_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            encoding: WINDOWS_1252,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A soft failure recorded while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Stream offset the problem was noticed at
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (offset {})", self.message, self.offset)
    }
}

/// A decoded object and the notes recorded while decoding it.
///
/// A value with notes is still usable; fields that could not be read keep
/// their defaults and missing children are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub notes: Vec<Note>,
}

impl<T> Decoded<T> {
    pub fn new(value: T, notes: Vec<Note>) -> Self {
        Self { value, notes }
    }

    /// Whether the object decoded without any note.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            notes: self.notes,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Byte builders for record fixtures.

    /// Little-endian byte sink with record helpers.
    #[derive(Default)]
    pub struct Builder {
        pub bytes: Vec<u8>,
    }

    impl Builder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn u8(mut self, value: u8) -> Self {
            self.bytes.push(value);
            self
        }

        pub fn u16(mut self, value: u16) -> Self {
            self.bytes.extend_from_slice(&value.to_le_bytes());
            self
        }

        pub fn i16(self, value: i16) -> Self {
            self.u16(value as u16)
        }

        pub fn u32(mut self, value: u32) -> Self {
            self.bytes.extend_from_slice(&value.to_le_bytes());
            self
        }

        pub fn i32(self, value: i32) -> Self {
            self.u32(value as u32)
        }

        pub fn f64(mut self, value: f64) -> Self {
            self.bytes.extend_from_slice(&value.to_le_bytes());
            self
        }

        pub fn raw(mut self, data: &[u8]) -> Self {
            self.bytes.extend_from_slice(data);
            self
        }

        /// `u16` length-prefixed 8-bit string.
        pub fn string(self, text: &str) -> Self {
            self.u16(text.len() as u16).raw(text.as_bytes())
        }

        /// Generic record: `u32` payload length, payload.
        pub fn record(self, payload: Builder) -> Self {
            self.u32(payload.bytes.len() as u32).raw(&payload.bytes)
        }

        /// Header record: magic, version, block size from the magic on.
        pub fn header(self, magic: &[u8; 4], version: u16, payload: Builder) -> Self {
            let size = (payload.bytes.len() + 10) as u32;
            self.raw(magic).u16(version).u32(size).raw(&payload.bytes)
        }

        /// Version-compat record: version, payload length.
        pub fn compat(self, version: u16, payload: Builder) -> Self {
            self.u16(version)
                .u32(payload.bytes.len() as u32)
                .raw(&payload.bytes)
        }

        /// SW record: tag and 24-bit length of the whole record.
        pub fn sw(self, tag: u8, payload: Builder) -> Self {
            let len = (payload.bytes.len() + 4) as u32;
            self.u8(tag)
                .raw(&len.to_le_bytes()[..3])
                .raw(&payload.bytes)
        }

        pub fn build(self) -> Vec<u8> {
            self.bytes
        }
    }
}

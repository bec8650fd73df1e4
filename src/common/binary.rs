//! Binary data parsing utilities.
//!
//! StarOffice streams are normally little-endian, but documents written on
//! big-endian hosts store multi-byte integers inverted. Every reader here
//! takes the [`ByteOrder`] of the stream explicitly.

use zerocopy::{BE, F64, FromBytes, I16, I32, LE, U16, U32};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    InsufficientData { expected: usize, available: usize },
    /// Failed to parse the data
    ParseError(String),
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData {
                expected,
                available,
            } => {
                write!(
                    f,
                    "Insufficient data: expected {}, got {}",
                    expected, available
                )
            },
            BinaryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Byte order of multi-byte integers in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Intel order, the normal case
    #[default]
    Little,
    /// Inverted order written by big-endian hosts
    Big,
}

impl ByteOrder {
    /// The opposite byte order.
    #[inline]
    pub fn inverted(self) -> Self {
        match self {
            ByteOrder::Little => ByteOrder::Big,
            ByteOrder::Big => ByteOrder::Little,
        }
    }
}

#[inline]
fn slice(data: &[u8], offset: usize, len: usize) -> BinaryResult<&[u8]> {
    match offset.checked_add(len) {
        Some(end) if end <= data.len() => Ok(&data[offset..end]),
        _ => Err(BinaryError::InsufficientData {
            expected: offset.saturating_add(len),
            available: data.len(),
        }),
    }
}

macro_rules! endian_reader {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $wrap:ident, $size:expr) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(data: &[u8], offset: usize, order: ByteOrder) -> BinaryResult<$ty> {
            let bytes = slice(data, offset, $size)?;
            let parse_error =
                || BinaryError::ParseError(format!("Failed to read {}", stringify!($ty)));
            match order {
                ByteOrder::Little => $wrap::<LE>::read_from_bytes(bytes)
                    .map(|v| v.get())
                    .map_err(|_| parse_error()),
                ByteOrder::Big => $wrap::<BE>::read_from_bytes(bytes)
                    .map(|v| v.get())
                    .map_err(|_| parse_error()),
            }
        }
    };
}

endian_reader!(
    /// Read a u16 at the given offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use stoff::common::binary::{read_u16, ByteOrder};
    /// let data = [0x34, 0x12];
    /// assert_eq!(read_u16(&data, 0, ByteOrder::Little).unwrap(), 0x1234);
    /// assert_eq!(read_u16(&data, 0, ByteOrder::Big).unwrap(), 0x3412);
    /// ```
    read_u16, u16, U16, 2
);
endian_reader!(
    /// Read an i16 at the given offset.
    read_i16, i16, I16, 2
);
endian_reader!(
    /// Read a u32 at the given offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use stoff::common::binary::{read_u32, ByteOrder};
    /// let data = [0x78, 0x56, 0x34, 0x12];
    /// assert_eq!(read_u32(&data, 0, ByteOrder::Little).unwrap(), 0x12345678);
    /// ```
    read_u32, u32, U32, 4
);
endian_reader!(
    /// Read an i32 at the given offset.
    read_i32, i32, I32, 4
);
endian_reader!(
    /// Read an f64 at the given offset.
    read_f64, f64, F64, 8
);

/// Read a 24-bit little-endian length, as used by SW record headers.
#[inline]
pub fn read_u24_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    let bytes = slice(data, offset, 3)?;
    Ok(u32::from(bytes[0]) | (u32::from(bytes[1]) << 8) | (u32::from(bytes[2]) << 16))
}

/// Parse UTF-16 code units with the given byte order, stopping at a null.
///
/// Unpaired surrogates are replaced with U+FFFD.
pub fn parse_utf16_string(data: &[u8], order: ByteOrder) -> String {
    let units = data
        .chunks_exact(2)
        .map(|pair| match order {
            ByteOrder::Little => u16::from_le_bytes([pair[0], pair[1]]),
            ByteOrder::Big => u16::from_be_bytes([pair[0], pair[1]]),
        })
        .take_while(|&unit| unit != 0);
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

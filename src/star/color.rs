//! StarView colours.

use std::fmt;

use super::{StarResult, StarZone};

/// Bit of a colour id announcing explicit RGB channels.
const RGB_FLAG: u16 = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form used by markup attributes.
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Predefined colours addressed by index.
pub const STARVIEW_COLORS: [Color; 16] = [
    Color::new(0x00, 0x00, 0x00), // black
    Color::new(0x00, 0x00, 0x80), // blue
    Color::new(0x00, 0x80, 0x00), // green
    Color::new(0x00, 0x80, 0x80), // cyan
    Color::new(0x80, 0x00, 0x00), // red
    Color::new(0x80, 0x00, 0x80), // magenta
    Color::new(0x80, 0x80, 0x00), // brown
    Color::new(0x80, 0x80, 0x80), // gray
    Color::new(0xC0, 0xC0, 0xC0), // light gray
    Color::new(0x00, 0x00, 0xFF), // light blue
    Color::new(0x00, 0xFF, 0x00), // light green
    Color::new(0x00, 0xFF, 0xFF), // light cyan
    Color::new(0xFF, 0x00, 0x00), // light red
    Color::new(0xFF, 0x00, 0xFF), // light magenta
    Color::new(0xFF, 0xFF, 0x00), // yellow
    Color::new(0xFF, 0xFF, 0xFF), // white
];

impl StarZone {
    /// Read a colour: a `u16` id, followed by three `u16` channels when the
    /// id has the RGB bit set.
    ///
    /// Only the high byte of each channel is significant. Unknown palette
    /// indices are noted and read as black.
    pub fn read_color(&mut self) -> StarResult<Color> {
        let id = self.read_u16()?;
        if id & RGB_FLAG != 0 {
            let r = self.read_u16()?;
            let g = self.read_u16()?;
            let b = self.read_u16()?;
            return Ok(Color::new((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8));
        }
        match STARVIEW_COLORS.get(usize::from(id)) {
            Some(color) => Ok(*color),
            None => {
                self.note(format!("unknown colour index {id}"));
                Ok(Color::BLACK)
            },
        }
    }
}

//! Text attributes and the console color table
//!
//! The console packs a cell's colors and display flags into one 16-bit
//! word: the low nibble is the foreground color, the next nibble the
//! background, and the high byte carries DBCS/grid/reverse/underscore flags.

use std::fmt;

use bitflags::bitflags;

use super::error::{ConsoleError, Result};

bitflags! {
    /// Raw console character attribute word.
    ///
    /// Passed through opaquely for save/restore; only the color bits are
    /// ever interpreted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextAttribute: u16 {
        const FOREGROUND_BLUE      = 0x0001;
        const FOREGROUND_GREEN     = 0x0002;
        const FOREGROUND_RED       = 0x0004;
        const FOREGROUND_INTENSITY = 0x0008;
        const BACKGROUND_BLUE      = 0x0010;
        const BACKGROUND_GREEN     = 0x0020;
        const BACKGROUND_RED       = 0x0040;
        const BACKGROUND_INTENSITY = 0x0080;
        const LEADING_BYTE         = 0x0100;
        const TRAILING_BYTE        = 0x0200;
        const GRID_HORIZONTAL      = 0x0400;
        const GRID_LVERTICAL       = 0x0800;
        const GRID_RVERTICAL       = 0x1000;
        const REVERSE_VIDEO        = 0x4000;
        const UNDERSCORE           = 0x8000;

        const FOREGROUND_MASK = 0x000F;
        const BACKGROUND_MASK = 0x00F0;
    }
}

impl TextAttribute {
    /// Wrap a raw word, keeping bits this type has no name for.
    pub const fn from_raw(raw: u16) -> Self {
        Self::from_bits_retain(raw)
    }

    pub const fn raw(self) -> u16 {
        self.bits()
    }

    pub fn foreground(self) -> Color {
        Color::from_code((self.bits() & 0x0F) as u8)
    }

    pub fn background(self) -> Color {
        Color::from_code(((self.bits() >> 4) & 0x0F) as u8)
    }
}

impl Default for TextAttribute {
    /// Light gray on black, what a fresh console starts with
    fn default() -> Self {
        ColorAttribute::new(Color::White, Color::Black).into()
    }
}

/// Which half of a color pair a name was given for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Foreground,
    Background,
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorRole::Foreground => write!(f, "foreground"),
            ColorRole::Background => write!(f, "background"),
        }
    }
}

/// The sixteen console colors, in attribute code order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Blue,
    Green,
    Aqua,
    Red,
    Purple,
    Yellow,
    White,
    Gray,
    LightBlue,
    LightGreen,
    LightAqua,
    LightRed,
    LightPurple,
    LightYellow,
    BrightWhite,
}

impl Color {
    pub const ALL: [Color; 16] = [
        Color::Black,
        Color::Blue,
        Color::Green,
        Color::Aqua,
        Color::Red,
        Color::Purple,
        Color::Yellow,
        Color::White,
        Color::Gray,
        Color::LightBlue,
        Color::LightGreen,
        Color::LightAqua,
        Color::LightRed,
        Color::LightPurple,
        Color::LightYellow,
        Color::BrightWhite,
    ];

    /// 4-bit attribute code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Color for a 4-bit code; higher bits are ignored.
    pub const fn from_code(code: u8) -> Self {
        Self::ALL[(code & 0x0F) as usize]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Aqua => "aqua",
            Color::Red => "red",
            Color::Purple => "purple",
            Color::Yellow => "yellow",
            Color::White => "white",
            Color::Gray => "gray",
            Color::LightBlue => "light blue",
            Color::LightGreen => "light green",
            Color::LightAqua => "light aqua",
            Color::LightRed => "light red",
            Color::LightPurple => "light purple",
            Color::LightYellow => "light yellow",
            Color::BrightWhite => "bright white",
        }
    }

    /// Case-insensitive lookup by name
    pub fn lookup(name: &str) -> Option<Color> {
        Self::ALL
            .iter()
            .copied()
            .find(|color| color.name().eq_ignore_ascii_case(name))
    }

    /// Look up a name given for `role`, reporting `UnknownColor` on a miss.
    pub fn parse(name: &str, role: ColorRole) -> Result<Color> {
        Self::lookup(name).ok_or_else(|| ConsoleError::UnknownColor {
            role,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A foreground/background pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorAttribute {
    pub foreground: Color,
    pub background: Color,
}

impl ColorAttribute {
    pub const fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
        }
    }

    pub fn from_names(foreground: &str, background: &str) -> Result<Self> {
        Ok(Self::new(
            Color::parse(foreground, ColorRole::Foreground)?,
            Color::parse(background, ColorRole::Background)?,
        ))
    }

    /// Packed form: background code in the high nibble, foreground in the low.
    pub const fn packed(self) -> u16 {
        ((self.background.code() as u16) << 4) | self.foreground.code() as u16
    }
}

impl From<ColorAttribute> for TextAttribute {
    fn from(colors: ColorAttribute) -> Self {
        TextAttribute::from_raw(colors.packed())
    }
}

impl From<TextAttribute> for ColorAttribute {
    fn from(attr: TextAttribute) -> Self {
        ColorAttribute::new(attr.foreground(), attr.background())
    }
}

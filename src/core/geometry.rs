//! Console geometry types
//!
//! Grid coordinates, window rectangles and point-in-time buffer snapshots.
//! These are the in-process shapes; platform records are converted into
//! them at the port boundary.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use super::attr::TextAttribute;
use super::error::{ConsoleError, Result};

/// A cell address in the console grid (column, row)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

impl Position {
    /// Top-left cell
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl From<(u16, u16)> for Position {
    fn from((x, y): (u16, u16)) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }
}

/// Component-wise difference, clamped at zero.
impl Sub for Position {
    type Output = Position;

    fn sub(self, other: Position) -> Position {
        Position {
            x: self.x.saturating_sub(other.x),
            y: self.y.saturating_sub(other.y),
        }
    }
}

/// A region of the console in grid coordinates.
///
/// Edges are inclusive. `left <= right` and `top <= bottom` hold for
/// rectangles reported by the console but are not checked here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
}

impl Rectangle {
    pub const fn new(left: u16, top: u16, right: u16, bottom: u16) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Number of columns covered
    pub fn width(&self) -> u16 {
        self.right.saturating_sub(self.left).saturating_add(1)
    }

    /// Number of rows covered
    pub fn height(&self) -> u16 {
        self.bottom.saturating_sub(self.top).saturating_add(1)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.left && pos.x <= self.right && pos.y >= self.top && pos.y <= self.bottom
    }
}

/// Snapshot of the screen buffer geometry and current text attribute.
///
/// This is a query result, not a live view of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    /// Total buffer size in cells (columns, rows)
    pub size: Position,
    pub cursor_position: Position,
    /// Visible window within the buffer
    pub window: Rectangle,
    /// Largest window the console could show given font and display
    pub maximum_window_size: Position,
    /// Attribute applied to newly written characters
    pub attributes: TextAttribute,
}

impl ScreenInfo {
    /// Number of cells in the whole buffer
    pub fn cell_count(&self) -> u32 {
        u32::from(self.size.x) * u32::from(self.size.y)
    }
}

/// Cursor size (percentage of the cell it fills) and visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub size: u32,
    pub visible: bool,
}

impl CursorState {
    pub const MIN_SIZE: u32 = 1;
    pub const MAX_SIZE: u32 = 100;

    pub const fn new(size: u32, visible: bool) -> Self {
        Self { size, visible }
    }

    /// Check the size range before the state is handed to a console.
    pub fn validate(&self) -> Result<()> {
        if (Self::MIN_SIZE..=Self::MAX_SIZE).contains(&self.size) {
            Ok(())
        } else {
            Err(ConsoleError::InvalidArgument(format!(
                "cursor size must be between {} and {}, got {}",
                Self::MIN_SIZE,
                Self::MAX_SIZE,
                self.size
            )))
        }
    }
}

impl Default for CursorState {
    fn default() -> Self {
        // Win32 console default: a visible underline cursor
        Self::new(25, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_arithmetic() {
        let a = Position::new(3, 7);
        let b = Position::new(1, 2);
        assert_eq!(a + b, Position::new(4, 9));
        assert_eq!(a - b, Position::new(2, 5));

        // Relative moves past the origin stop at the edge
        assert_eq!(b - a, Position::ORIGIN);
        assert_eq!(Position::new(u16::MAX, 0) + Position::new(1, 1), Position::new(u16::MAX, 1));
    }

    #[test]
    fn test_rectangle_dimensions() {
        let window = Rectangle::new(0, 0, 79, 24);
        assert_eq!(window.width(), 80);
        assert_eq!(window.height(), 25);
        assert!(window.contains(Position::new(79, 24)));
        assert!(!window.contains(Position::new(80, 0)));

        let scrolled = Rectangle::new(0, 100, 119, 129);
        assert!(!scrolled.contains(Position::new(5, 10)));
        assert!(scrolled.contains(Position::new(5, 110)));
    }

    #[test]
    fn test_cell_count() {
        let info = ScreenInfo {
            size: Position::new(120, 9001),
            cursor_position: Position::ORIGIN,
            window: Rectangle::new(0, 0, 119, 29),
            maximum_window_size: Position::new(120, 60),
            attributes: TextAttribute::default(),
        };
        assert_eq!(info.cell_count(), 1_080_120);
    }

    #[test]
    fn test_cursor_size_range() {
        assert!(CursorState::new(1, true).validate().is_ok());
        assert!(CursorState::new(100, false).validate().is_ok());
        assert!(matches!(
            CursorState::new(0, true).validate(),
            Err(ConsoleError::InvalidArgument(_))
        ));
        assert!(matches!(
            CursorState::new(101, true).validate(),
            Err(ConsoleError::InvalidArgument(_))
        ));
    }
}

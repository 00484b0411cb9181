//! wtconsole - scoped Windows console control
//!
//! Query and change the state of a character-grid console (cursor
//! position, size and visibility, buffer geometry, colors, title, bulk
//! fills) through a `Session` that puts the cursor state and text
//! attribute back the way it found them, however the session ends.
//!
//! # Quick Start
//!
//! ```text
//! let mut console = Session::open(Win32Console::new(), StreamKind::Output)?;
//! console.set_text_color("light green", "black")?;
//! console.set_cursor_state(100, false)?;
//! println!("building...");
//! console.close()?;   // or just let it drop
//! ```
//!
//! `MemoryConsole` implements the same port in process and is what the
//! tests and the non-Windows demo run against.

pub mod config;
pub mod core;

pub use crate::core::attr::{Color, ColorAttribute, ColorRole, TextAttribute};
pub use crate::core::error::{ConsoleError, Result};
pub use crate::core::geometry::{CursorState, Position, Rectangle, ScreenInfo};
pub use crate::core::memory::{MemoryConsole, PortOp};
pub use crate::core::port::{ConsolePort, StreamKind};
pub use crate::core::session::Session;
#[cfg(windows)]
pub use crate::core::win32::{Win32Console, Win32Handle};

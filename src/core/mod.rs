//! Core console control components.
//!
//! - **geometry**: cell positions, window rectangles, buffer snapshots
//! - **attr**: packed text attributes and the sixteen-color table
//! - **port**: the console calls a session needs, as a trait
//! - **win32**: the real Windows console behind that trait
//! - **memory**: a simulated console device behind the same trait
//! - **session**: scoped access that restores cursor and color on exit
//!
//! # Architecture
//!
//! ```text
//! Session<P: ConsolePort>
//! ├── Handle (acquired from P, released on close)
//! ├── default CursorState  ─┐
//! └── default ScreenInfo   ─┴─ restored on close / drop
//! ```

pub mod attr;
pub mod error;
pub mod geometry;
pub mod memory;
pub mod port;
pub mod session;
#[cfg(windows)]
pub mod win32;

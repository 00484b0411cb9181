//! Platform console port
//!
//! The set of console calls a session depends on. Each implementation
//! converts its own wire records into the types from `geometry` before
//! returning, so nothing platform shaped leaks past this trait.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::attr::TextAttribute;
use super::error::Result;
use super::geometry::{CursorState, Position, ScreenInfo};

/// Which standard stream to attach to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Input,
    #[default]
    Output,
    Error,
}

impl StreamKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "in" | "input" | "stdin" => Some(StreamKind::Input),
            "out" | "output" | "stdout" => Some(StreamKind::Output),
            "err" | "error" | "stderr" => Some(StreamKind::Error),
            _ => None,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Input => write!(f, "input"),
            StreamKind::Output => write!(f, "output"),
            StreamKind::Error => write!(f, "error"),
        }
    }
}

/// Console operations provided by the host.
///
/// Calls are synchronous and all-or-nothing from the caller's point of
/// view. Range checks on arguments are the caller's job; a port may still
/// reject them with a platform error.
pub trait ConsolePort {
    /// Acquired console stream
    type Handle;

    /// Attach to a standard stream.
    ///
    /// Fails with `HandleUnavailable` when the process has no such stream.
    fn acquire_handle(&self, stream: StreamKind) -> Result<Self::Handle>;

    /// Give a handle back. Must tolerate handles the host already dropped.
    fn release_handle(&self, handle: Self::Handle) {
        drop(handle);
    }

    fn screen_info(&self, handle: &Self::Handle) -> Result<ScreenInfo>;

    fn set_cursor_position(&self, handle: &Self::Handle, pos: Position) -> Result<()>;

    fn cursor_state(&self, handle: &Self::Handle) -> Result<CursorState>;

    fn set_cursor_state(&self, handle: &Self::Handle, state: CursorState) -> Result<()>;

    fn set_text_attribute(&self, handle: &Self::Handle, attr: TextAttribute) -> Result<()>;

    /// Write `ch` into `count` consecutive cells from `start`, wrapping rows.
    /// Returns the number of cells written.
    fn fill_chars(&self, handle: &Self::Handle, ch: char, count: u32, start: Position)
        -> Result<u32>;

    /// Like `fill_chars`, for the attribute of each cell.
    fn fill_attribute(
        &self,
        handle: &Self::Handle,
        attr: TextAttribute,
        count: u32,
        start: Position,
    ) -> Result<u32>;

    fn set_title(&self, handle: &Self::Handle, title: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_names() {
        assert_eq!(StreamKind::parse("stdout"), Some(StreamKind::Output));
        assert_eq!(StreamKind::parse("ERR"), Some(StreamKind::Error));
        assert_eq!(StreamKind::parse("input"), Some(StreamKind::Input));
        assert_eq!(StreamKind::parse("tty"), None);
        assert_eq!(StreamKind::default(), StreamKind::Output);
        assert_eq!(StreamKind::Input.to_string(), "input");
    }
}

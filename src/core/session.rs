//! Scoped console session
//!
//! A `Session` owns one console handle together with the cursor state and
//! text attribute that were in effect when it was opened. Whatever the
//! session changes, closing it (explicitly, by drop, or while unwinding)
//! puts the cursor state back first and the text attribute second. Each
//! step is attempted even when the other one fails.
//!
//! ```
//! use wtconsole::{MemoryConsole, Session, StreamKind};
//!
//! # fn main() -> wtconsole::Result<()> {
//! let device = MemoryConsole::new(80, 25);
//! Session::scoped(device.clone(), StreamKind::Output, |console| {
//!     console.set_text_color("light yellow", "blue")?;
//!     console.set_cursor_state(100, false)?;
//!     console.clear_screen(' ')
//! })?;
//! assert_eq!(device.text_attribute().raw(), 0x07);
//! # Ok(())
//! # }
//! ```
//!
//! Sessions are single threaded: the handle and the two-step teardown are
//! not synchronized, and neither shipped port is `Send`.

use tracing::{debug, warn};

use super::attr::{ColorAttribute, TextAttribute};
use super::error::{ConsoleError, Result};
use super::geometry::{CursorState, Position, ScreenInfo};
use super::port::{ConsolePort, StreamKind};

pub struct Session<P: ConsolePort> {
    port: P,
    /// `None` once the session has been closed
    handle: Option<P::Handle>,
    stream: StreamKind,
    default_cursor: CursorState,
    default_info: ScreenInfo,
}

impl<P: ConsolePort> Session<P> {
    /// Acquire `stream` and snapshot the state to restore on close.
    ///
    /// If either snapshot query fails the handle is released and no
    /// session is created.
    pub fn open(port: P, stream: StreamKind) -> Result<Self> {
        let handle = port.acquire_handle(stream)?;

        let snapshot = port
            .cursor_state(&handle)
            .and_then(|cursor| port.screen_info(&handle).map(|info| (cursor, info)));

        match snapshot {
            Ok((default_cursor, default_info)) => {
                debug!(
                    %stream,
                    cursor_size = default_cursor.size,
                    cursor_visible = default_cursor.visible,
                    attributes = default_info.attributes.raw(),
                    "console session opened"
                );
                Ok(Self {
                    port,
                    handle: Some(handle),
                    stream,
                    default_cursor,
                    default_info,
                })
            }
            Err(e) => {
                port.release_handle(handle);
                Err(e)
            }
        }
    }

    /// Open a session, run `body` against it, then close it.
    ///
    /// An error from `body` takes precedence over a teardown error.
    pub fn scoped<T>(
        port: P,
        stream: StreamKind,
        body: impl FnOnce(&mut Session<P>) -> Result<T>,
    ) -> Result<T> {
        let mut session = Self::open(port, stream)?;
        let outcome = body(&mut session);
        let closed = session.close();

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(teardown)) => {
                warn!(error = %teardown, "console restore failed after session error");
                Err(e)
            }
        }
    }

    fn handle(&self) -> Result<&P::Handle> {
        self.handle.as_ref().ok_or(ConsoleError::SessionClosed)
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// The port this session talks to
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Cursor state captured when the session opened
    pub fn default_cursor_state(&self) -> CursorState {
        self.default_cursor
    }

    /// Buffer info captured when the session opened
    pub fn default_screen_info(&self) -> ScreenInfo {
        self.default_info
    }

    /// Blank the whole buffer with `fill`, reapply the current attribute to
    /// every cell and home the cursor.
    pub fn clear_screen(&mut self, fill: char) -> Result<()> {
        let handle = self.handle()?;

        let info = self.port.screen_info(handle)?;
        let cells = info.cell_count();
        self.port.fill_chars(handle, fill, cells, Position::ORIGIN)?;

        let info = self.port.screen_info(handle)?;
        self.port.fill_attribute(handle, info.attributes, cells, Position::ORIGIN)?;

        self.port.set_cursor_position(handle, Position::ORIGIN)
    }

    /// Blank `row` from column 0 through the window's right edge.
    pub fn clear_line(&mut self, row: u16) -> Result<()> {
        let handle = self.handle()?;
        let info = self.port.screen_info(handle)?;
        let count = u32::from(info.window.right) + 1;
        self.port.fill_chars(handle, ' ', count, Position::new(0, row))?;
        Ok(())
    }

    pub fn set_cursor_position(&mut self, x: u16, y: u16) -> Result<()> {
        self.move_cursor(Position::new(x, y))
    }

    pub fn move_cursor(&mut self, pos: Position) -> Result<()> {
        let handle = self.handle()?;
        self.port.set_cursor_position(handle, pos)
    }

    pub fn get_screen_info(&self) -> Result<ScreenInfo> {
        let handle = self.handle()?;
        self.port.screen_info(handle)
    }

    pub fn get_cursor_state(&self) -> Result<CursorState> {
        let handle = self.handle()?;
        self.port.cursor_state(handle)
    }

    /// Set cursor size (1 to 100 percent of the cell) and visibility.
    pub fn set_cursor_state(&mut self, size: u32, visible: bool) -> Result<()> {
        let handle = self.handle()?;
        let state = CursorState::new(size, visible);
        state.validate()?;
        self.port.set_cursor_state(handle, state)
    }

    /// Apply a color pair given by name, e.g. `("Light Red", "black")`.
    pub fn set_text_color(&mut self, foreground: &str, background: &str) -> Result<()> {
        let colors = ColorAttribute::from_names(foreground, background)?;
        self.set_colors(colors)
    }

    pub fn set_colors(&mut self, colors: ColorAttribute) -> Result<()> {
        let handle = self.handle()?;
        self.port.set_text_attribute(handle, TextAttribute::from(colors))
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let handle = self.handle()?;
        self.port.set_title(handle, title)
    }

    /// Put back the cursor state captured at open, leaving the session open.
    pub fn restore_cursor_state(&mut self) -> Result<()> {
        let handle = self.handle()?;
        self.port.set_cursor_state(handle, self.default_cursor)
    }

    /// Put back the text attribute captured at open, leaving the session open.
    pub fn restore_text_attribute(&mut self) -> Result<()> {
        let handle = self.handle()?;
        self.port.set_text_attribute(handle, self.default_info.attributes)
    }

    /// Restore the captured state and release the handle.
    ///
    /// Only the first call does anything; later calls return `Ok(())`.
    /// Both restore steps run even if the first fails, and every failure
    /// is reported in `ConsoleError::Restore`.
    pub fn close(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let mut failures = Vec::new();

        debug!(stream = %self.stream, "restoring cursor state");
        if let Err(e) = self.port.set_cursor_state(&handle, self.default_cursor) {
            failures.push(e);
        }

        debug!(stream = %self.stream, "restoring text attribute");
        if let Err(e) = self.port.set_text_attribute(&handle, self.default_info.attributes) {
            failures.push(e);
        }

        self.port.release_handle(handle);

        if failures.is_empty() {
            debug!(stream = %self.stream, "console session closed");
            Ok(())
        } else {
            Err(ConsoleError::Restore(failures))
        }
    }
}

impl<P: ConsolePort> Drop for Session<P> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(stream = %self.stream, error = %e, "console state not fully restored");
        }
    }
}

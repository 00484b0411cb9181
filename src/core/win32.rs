//! Win32 console port
//!
//! Binds `ConsolePort` to the kernel32 console API through the `windows`
//! crate. COORD, SMALL_RECT and the buffer/cursor info records stay in this
//! file; callers only ever see `Position`, `Rectangle` and friends.

use windows::Win32::Foundation::{BOOL, HANDLE};
use windows::Win32::System::Console::{
    FillConsoleOutputAttribute, FillConsoleOutputCharacterW, GetConsoleCursorInfo,
    GetConsoleScreenBufferInfo, GetStdHandle, SetConsoleCursorInfo, SetConsoleCursorPosition,
    SetConsoleTextAttribute, SetConsoleTitleW, CONSOLE_CHARACTER_ATTRIBUTES, CONSOLE_CURSOR_INFO,
    CONSOLE_SCREEN_BUFFER_INFO, COORD, SMALL_RECT, STD_ERROR_HANDLE, STD_HANDLE, STD_INPUT_HANDLE,
    STD_OUTPUT_HANDLE,
};
use windows::core::PCWSTR;

use super::attr::TextAttribute;
use super::error::{ConsoleError, Result};
use super::geometry::{CursorState, Position, Rectangle, ScreenInfo};
use super::port::{ConsolePort, StreamKind};

/// The process's real console
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Console;

/// Standard handle returned by `GetStdHandle`.
///
/// Standard handles belong to the process and are never closed here.
#[derive(Debug)]
pub struct Win32Handle {
    raw: HANDLE,
    stream: StreamKind,
}

impl Win32Handle {
    pub fn stream(&self) -> StreamKind {
        self.stream
    }
}

impl Win32Console {
    pub fn new() -> Self {
        Self
    }
}

fn std_handle_id(stream: StreamKind) -> STD_HANDLE {
    match stream {
        StreamKind::Input => STD_INPUT_HANDLE,
        StreamKind::Output => STD_OUTPUT_HANDLE,
        StreamKind::Error => STD_ERROR_HANDLE,
    }
}

/// Win32 error code behind a `windows` error.
///
/// Failures from `GetLastError` arrive wrapped as `HRESULT_FROM_WIN32`.
fn win32_code(err: &windows::core::Error) -> i32 {
    let hr = err.code().0 as u32;
    if hr & 0xFFFF_0000 == 0x8007_0000 {
        (hr & 0xFFFF) as i32
    } else {
        hr as i32
    }
}

fn platform(operation: &'static str) -> impl FnOnce(windows::core::Error) -> ConsoleError {
    move |err| ConsoleError::platform(operation, win32_code(&err))
}

/// Classify a failed `GetStdHandle`.
///
/// A process started without the stream gets a null handle with no last
/// error set, which surfaces as code 0; anything else is a real failure.
fn acquire_error(stream: StreamKind, err: &windows::core::Error) -> ConsoleError {
    match win32_code(err) {
        0 => ConsoleError::HandleUnavailable(stream),
        code => ConsoleError::platform("GetStdHandle", code),
    }
}

fn to_coord(pos: Position) -> Result<COORD> {
    let x = i16::try_from(pos.x);
    let y = i16::try_from(pos.y);
    match (x, y) {
        (Ok(x), Ok(y)) => Ok(COORD { X: x, Y: y }),
        _ => Err(ConsoleError::InvalidArgument(format!(
            "position ({}, {}) is outside the console coordinate range",
            pos.x, pos.y
        ))),
    }
}

// The console never reports negative coordinates for these fields.
fn from_coord(coord: COORD) -> Position {
    Position::new(coord.X.max(0) as u16, coord.Y.max(0) as u16)
}

fn from_small_rect(rect: SMALL_RECT) -> Rectangle {
    Rectangle::new(
        rect.Left.max(0) as u16,
        rect.Top.max(0) as u16,
        rect.Right.max(0) as u16,
        rect.Bottom.max(0) as u16,
    )
}

fn from_buffer_info(info: &CONSOLE_SCREEN_BUFFER_INFO) -> ScreenInfo {
    ScreenInfo {
        size: from_coord(info.dwSize),
        cursor_position: from_coord(info.dwCursorPosition),
        window: from_small_rect(info.srWindow),
        maximum_window_size: from_coord(info.dwMaximumWindowSize),
        attributes: TextAttribute::from_raw(info.wAttributes.0),
    }
}

fn to_cursor_info(state: CursorState) -> CONSOLE_CURSOR_INFO {
    CONSOLE_CURSOR_INFO {
        dwSize: state.size,
        bVisible: BOOL::from(state.visible),
    }
}

fn from_cursor_info(info: &CONSOLE_CURSOR_INFO) -> CursorState {
    CursorState::new(info.dwSize, info.bVisible.as_bool())
}

impl ConsolePort for Win32Console {
    type Handle = Win32Handle;

    fn acquire_handle(&self, stream: StreamKind) -> Result<Win32Handle> {
        let raw = unsafe { GetStdHandle(std_handle_id(stream)) }
            .map_err(|err| acquire_error(stream, &err))?;
        Ok(Win32Handle { raw, stream })
    }

    fn screen_info(&self, handle: &Win32Handle) -> Result<ScreenInfo> {
        let mut info = CONSOLE_SCREEN_BUFFER_INFO::default();
        unsafe { GetConsoleScreenBufferInfo(handle.raw, &mut info) }
            .map_err(platform("GetConsoleScreenBufferInfo"))?;
        Ok(from_buffer_info(&info))
    }

    fn set_cursor_position(&self, handle: &Win32Handle, pos: Position) -> Result<()> {
        let coord = to_coord(pos)?;
        unsafe { SetConsoleCursorPosition(handle.raw, coord) }
            .map_err(platform("SetConsoleCursorPosition"))
    }

    fn cursor_state(&self, handle: &Win32Handle) -> Result<CursorState> {
        let mut info = CONSOLE_CURSOR_INFO::default();
        unsafe { GetConsoleCursorInfo(handle.raw, &mut info) }
            .map_err(platform("GetConsoleCursorInfo"))?;
        Ok(from_cursor_info(&info))
    }

    fn set_cursor_state(&self, handle: &Win32Handle, state: CursorState) -> Result<()> {
        let info = to_cursor_info(state);
        unsafe { SetConsoleCursorInfo(handle.raw, &info) }.map_err(platform("SetConsoleCursorInfo"))
    }

    fn set_text_attribute(&self, handle: &Win32Handle, attr: TextAttribute) -> Result<()> {
        unsafe { SetConsoleTextAttribute(handle.raw, CONSOLE_CHARACTER_ATTRIBUTES(attr.raw())) }
            .map_err(platform("SetConsoleTextAttribute"))
    }

    fn fill_chars(&self, handle: &Win32Handle, ch: char, count: u32, start: Position) -> Result<u32> {
        let mut units = [0u16; 2];
        let encoded = ch.encode_utf16(&mut units);
        if encoded.len() != 1 {
            return Err(ConsoleError::InvalidArgument(format!(
                "fill character {ch:?} does not fit in a single console cell"
            )));
        }
        let coord = to_coord(start)?;
        let mut written: u32 = 0;
        unsafe { FillConsoleOutputCharacterW(handle.raw, units[0], count, coord, &mut written) }
            .map_err(platform("FillConsoleOutputCharacterW"))?;
        Ok(written)
    }

    fn fill_attribute(
        &self,
        handle: &Win32Handle,
        attr: TextAttribute,
        count: u32,
        start: Position,
    ) -> Result<u32> {
        let coord = to_coord(start)?;
        let mut written: u32 = 0;
        unsafe { FillConsoleOutputAttribute(handle.raw, attr.raw(), count, coord, &mut written) }
            .map_err(platform("FillConsoleOutputAttribute"))?;
        Ok(written)
    }

    fn set_title(&self, _handle: &Win32Handle, title: &str) -> Result<()> {
        let wide: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe { SetConsoleTitleW(PCWSTR(wide.as_ptr())) }.map_err(platform("SetConsoleTitleW"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_conversion() {
        assert_eq!(from_coord(COORD { X: 12, Y: -1 }), Position::new(12, 0));
        let coord = to_coord(Position::new(3, 4)).unwrap();
        assert_eq!((coord.X, coord.Y), (3, 4));
        assert!(matches!(
            to_coord(Position::new(40_000, 0)),
            Err(ConsoleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_cursor_info_layout() {
        let info = to_cursor_info(CursorState::new(42, false));
        assert_eq!(info.dwSize, 42);
        assert!(!info.bVisible.as_bool());
        assert_eq!(from_cursor_info(&info), CursorState::new(42, false));
    }

    #[test]
    fn test_win32_error_code() {
        let err = windows::core::Error::from(windows::core::HRESULT(0x8007_0057_u32 as i32));
        assert_eq!(win32_code(&err), 87);
    }

    #[test]
    fn test_missing_std_handle_is_unavailable() {
        let no_last_error = windows::core::Error::from(windows::core::HRESULT(0));
        assert!(matches!(
            acquire_error(StreamKind::Input, &no_last_error),
            ConsoleError::HandleUnavailable(StreamKind::Input)
        ));

        let invalid_handle = windows::core::Error::from(windows::core::HRESULT(0x8007_0006_u32 as i32));
        match acquire_error(StreamKind::Output, &invalid_handle) {
            ConsoleError::Platform { operation, code } => {
                assert_eq!(operation, "GetStdHandle");
                assert_eq!(code, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_real_console_snapshot() {
        // Test runners are often started without a console attached
        let console = Win32Console::new();
        let Ok(handle) = console.acquire_handle(StreamKind::Output) else {
            return;
        };
        let Ok(info) = console.screen_info(&handle) else {
            return;
        };
        assert!(info.window.right >= info.window.left);
        assert!(info.size.x > 0 && info.size.y > 0);
    }
}

//! In-memory console device
//!
//! A simulated console that behaves like the Win32 one for every call in
//! `ConsolePort`: linear fills that wrap rows and stop at the end of the
//! buffer, invalid-parameter failures for out-of-buffer coordinates and
//! cursor sizes. Clones share the same device, so a second session opened
//! after the first one closed sees what the first one left behind.
//!
//! Tests drive it through fault injection (`fail`/`heal`) and the call
//! journal (`calls`/`count`).

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use super::attr::TextAttribute;
use super::error::{ConsoleError, Result};
use super::geometry::{CursorState, Position, Rectangle, ScreenInfo};
use super::port::{ConsolePort, StreamKind};

/// ERROR_INVALID_PARAMETER
pub const INVALID_PARAMETER: i32 = 87;
/// ERROR_GEN_FAILURE, reported by injected faults
pub const GEN_FAILURE: i32 = 31;

/// Port calls, for fault injection and the call journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortOp {
    Acquire,
    ScreenInfo,
    SetCursorPosition,
    CursorState,
    SetCursorState,
    SetTextAttribute,
    FillChars,
    FillAttribute,
    SetTitle,
}

impl PortOp {
    fn name(self) -> &'static str {
        match self {
            PortOp::Acquire => "GetStdHandle",
            PortOp::ScreenInfo => "GetConsoleScreenBufferInfo",
            PortOp::SetCursorPosition => "SetConsoleCursorPosition",
            PortOp::CursorState => "GetConsoleCursorInfo",
            PortOp::SetCursorState => "SetConsoleCursorInfo",
            PortOp::SetTextAttribute => "SetConsoleTextAttribute",
            PortOp::FillChars => "FillConsoleOutputCharacterW",
            PortOp::FillAttribute => "FillConsoleOutputAttribute",
            PortOp::SetTitle => "SetConsoleTitleW",
        }
    }
}

/// A single character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attr: TextAttribute,
}

impl Cell {
    fn blank(attr: TextAttribute) -> Self {
        Self { ch: ' ', attr }
    }
}

#[derive(Debug)]
struct Device {
    size: Position,
    window: Rectangle,
    maximum_window_size: Position,
    cells: Vec<Cell>,
    cursor_position: Position,
    cursor: CursorState,
    attribute: TextAttribute,
    title: String,
    detached: HashSet<StreamKind>,
    faults: HashSet<PortOp>,
    journal: Vec<PortOp>,
    open_handles: usize,
}

impl Device {
    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < self.size.x && pos.y < self.size.y {
            Some(pos.y as usize * self.size.x as usize + pos.x as usize)
        } else {
            None
        }
    }

    fn call(&mut self, op: PortOp) -> Result<()> {
        self.journal.push(op);
        if self.faults.contains(&op) {
            Err(ConsoleError::platform(op.name(), GEN_FAILURE))
        } else {
            Ok(())
        }
    }

    /// Apply `write` to `count` cells from `start`, clipped at the buffer end.
    fn fill(&mut self, op: PortOp, count: u32, start: Position, write: impl Fn(&mut Cell)) -> Result<u32> {
        let first = self
            .index(start)
            .ok_or_else(|| ConsoleError::platform(op.name(), INVALID_PARAMETER))?;
        let last = first.saturating_add(count as usize).min(self.cells.len());
        for cell in &mut self.cells[first..last] {
            write(cell);
        }
        Ok((last - first) as u32)
    }
}

/// Shared handle to a simulated console
#[derive(Debug, Clone)]
pub struct MemoryConsole {
    device: Rc<RefCell<Device>>,
}

/// Handle into a `MemoryConsole`
#[derive(Debug)]
pub struct MemoryHandle {
    stream: StreamKind,
}

impl MemoryHandle {
    pub fn stream(&self) -> StreamKind {
        self.stream
    }
}

impl Default for MemoryConsole {
    fn default() -> Self {
        Self::new(80, 25)
    }
}

impl MemoryConsole {
    /// A console whose window shows the whole `cols` x `rows` buffer
    pub fn new(cols: u16, rows: u16) -> Self {
        let window = Rectangle::new(0, 0, cols.saturating_sub(1), rows.saturating_sub(1));
        Self::with_buffer(Position::new(cols, rows), window)
    }

    /// A console with a scrollback buffer larger than its window
    pub fn with_buffer(size: Position, window: Rectangle) -> Self {
        let attribute = TextAttribute::default();
        let device = Device {
            size,
            window,
            maximum_window_size: Position::new(size.x, window.height()),
            cells: vec![Cell::blank(attribute); size.x as usize * size.y as usize],
            cursor_position: Position::ORIGIN,
            cursor: CursorState::default(),
            attribute,
            title: String::new(),
            detached: HashSet::new(),
            faults: HashSet::new(),
            journal: Vec::new(),
            open_handles: 0,
        };
        Self {
            device: Rc::new(RefCell::new(device)),
        }
    }

    /// Simulate a process started without `stream`
    pub fn detach(&self, stream: StreamKind) {
        self.device.borrow_mut().detached.insert(stream);
    }

    /// Make every later `op` call fail until `heal` is called
    pub fn fail(&self, op: PortOp) {
        self.device.borrow_mut().faults.insert(op);
    }

    pub fn heal(&self, op: PortOp) {
        self.device.borrow_mut().faults.remove(&op);
    }

    /// Every port call made so far, in order
    pub fn calls(&self) -> Vec<PortOp> {
        self.device.borrow().journal.clone()
    }

    pub fn count(&self, op: PortOp) -> usize {
        self.device.borrow().journal.iter().filter(|&&call| call == op).count()
    }

    pub fn clear_journal(&self) {
        self.device.borrow_mut().journal.clear();
    }

    pub fn open_handles(&self) -> usize {
        self.device.borrow().open_handles
    }

    pub fn cell(&self, pos: Position) -> Option<Cell> {
        let device = self.device.borrow();
        device.index(pos).map(|i| device.cells[i])
    }

    /// Characters of one buffer row
    pub fn row_text(&self, row: u16) -> String {
        let device = self.device.borrow();
        let width = device.size.x as usize;
        let start = row as usize * width;
        device
            .cells
            .get(start..start + width)
            .map(|cells| cells.iter().map(|cell| cell.ch).collect::<String>())
            .unwrap_or_default()
    }

    pub fn cursor_position(&self) -> Position {
        self.device.borrow().cursor_position
    }

    pub fn cursor(&self) -> CursorState {
        self.device.borrow().cursor
    }

    pub fn text_attribute(&self) -> TextAttribute {
        self.device.borrow().attribute
    }

    pub fn title(&self) -> String {
        self.device.borrow().title.clone()
    }

    /// Write text at the cursor using the current attribute, as a program
    /// printing to the console would. Stops at the end of the buffer.
    pub fn write_str(&self, text: &str) {
        let mut device = self.device.borrow_mut();
        for ch in text.chars() {
            let Some(i) = device.index(device.cursor_position) else {
                break;
            };
            let attr = device.attribute;
            device.cells[i] = Cell { ch, attr };
            let mut next = device.cursor_position;
            next.x += 1;
            if next.x >= device.size.x {
                next = Position::new(0, next.y.saturating_add(1));
            }
            device.cursor_position = next;
        }
    }
}

impl ConsolePort for MemoryConsole {
    type Handle = MemoryHandle;

    fn acquire_handle(&self, stream: StreamKind) -> Result<MemoryHandle> {
        let mut device = self.device.borrow_mut();
        device.call(PortOp::Acquire)?;
        if device.detached.contains(&stream) {
            return Err(ConsoleError::HandleUnavailable(stream));
        }
        device.open_handles += 1;
        Ok(MemoryHandle { stream })
    }

    fn release_handle(&self, _handle: MemoryHandle) {
        let mut device = self.device.borrow_mut();
        device.open_handles = device.open_handles.saturating_sub(1);
    }

    fn screen_info(&self, _handle: &MemoryHandle) -> Result<ScreenInfo> {
        let mut device = self.device.borrow_mut();
        device.call(PortOp::ScreenInfo)?;
        Ok(ScreenInfo {
            size: device.size,
            cursor_position: device.cursor_position,
            window: device.window,
            maximum_window_size: device.maximum_window_size,
            attributes: device.attribute,
        })
    }

    fn set_cursor_position(&self, _handle: &MemoryHandle, pos: Position) -> Result<()> {
        let mut device = self.device.borrow_mut();
        device.call(PortOp::SetCursorPosition)?;
        if device.index(pos).is_none() {
            return Err(ConsoleError::platform(PortOp::SetCursorPosition.name(), INVALID_PARAMETER));
        }
        device.cursor_position = pos;
        Ok(())
    }

    fn cursor_state(&self, _handle: &MemoryHandle) -> Result<CursorState> {
        let mut device = self.device.borrow_mut();
        device.call(PortOp::CursorState)?;
        Ok(device.cursor)
    }

    fn set_cursor_state(&self, _handle: &MemoryHandle, state: CursorState) -> Result<()> {
        let mut device = self.device.borrow_mut();
        device.call(PortOp::SetCursorState)?;
        if state.validate().is_err() {
            return Err(ConsoleError::platform(PortOp::SetCursorState.name(), INVALID_PARAMETER));
        }
        device.cursor = state;
        Ok(())
    }

    fn set_text_attribute(&self, _handle: &MemoryHandle, attr: TextAttribute) -> Result<()> {
        let mut device = self.device.borrow_mut();
        device.call(PortOp::SetTextAttribute)?;
        device.attribute = attr;
        Ok(())
    }

    fn fill_chars(&self, _handle: &MemoryHandle, ch: char, count: u32, start: Position) -> Result<u32> {
        let mut device = self.device.borrow_mut();
        device.call(PortOp::FillChars)?;
        device.fill(PortOp::FillChars, count, start, |cell| cell.ch = ch)
    }

    fn fill_attribute(
        &self,
        _handle: &MemoryHandle,
        attr: TextAttribute,
        count: u32,
        start: Position,
    ) -> Result<u32> {
        let mut device = self.device.borrow_mut();
        device.call(PortOp::FillAttribute)?;
        device.fill(PortOp::FillAttribute, count, start, |cell| cell.attr = attr)
    }

    fn set_title(&self, _handle: &MemoryHandle, title: &str) -> Result<()> {
        let mut device = self.device.borrow_mut();
        device.call(PortOp::SetTitle)?;
        device.title = title.to_string();
        Ok(())
    }
}

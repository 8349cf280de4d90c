use anyhow::Result;

use crate::{Color, Key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub width: usize,
    pub height: usize,
}

impl TerminalSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Console capabilities the palette consumes.
///
/// Rows and columns are zero-based. Rows address the scroll buffer, which is
/// at least as tall as the visible window.
pub trait Terminal {
    fn cursor_row(&mut self) -> Result<usize>;
    fn set_cursor_row(&mut self, row: usize) -> Result<()>;
    fn cursor_col(&mut self) -> Result<usize>;
    fn set_cursor_col(&mut self, col: usize) -> Result<()>;

    fn buffer_size(&self) -> Result<TerminalSize>;
    fn set_buffer_width(&mut self, width: usize) -> Result<()>;
    /// May be refused by the platform; callers treat an error as a degraded
    /// environment rather than a failure.
    fn set_buffer_height(&mut self, height: usize) -> Result<()>;
    fn window_size(&self) -> Result<TerminalSize>;
    /// Scrolls the buffer contents up by `lines`, freeing rows at the bottom.
    fn scroll_up(&mut self, lines: usize) -> Result<()>;

    fn set_foreground(&mut self, color: Color) -> Result<()>;
    fn set_background(&mut self, color: Color) -> Result<()>;
    fn write(&mut self, text: &str) -> Result<()>;
    fn write_line(&mut self, text: &str) -> Result<()>;

    /// Non-blocking check for a pending key press.
    fn key_available(&mut self) -> Result<bool>;
    /// Blocks until the next key press.
    fn read_key(&mut self) -> Result<Key>;
}

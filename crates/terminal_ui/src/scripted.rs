use anyhow::{Result, anyhow, bail};
use flume::{Receiver, Sender, unbounded};
use std::time::Duration;

use crate::{Color, Key, Terminal, TerminalSize};

const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub foreground: Color,
    pub background: Color,
    pub newline: bool,
}

/// Sending half of a [`ScriptedTerminal`]'s key queue. Cloneable, so keys can
/// be injected from other threads while the terminal is in use.
#[derive(Clone)]
pub struct KeyFeed {
    sender: Sender<Key>,
}

impl KeyFeed {
    pub fn press(&self, key: Key) {
        let _ = self.sender.send(key);
    }

    pub fn press_all(&self, keys: impl IntoIterator<Item = Key>) {
        for key in keys {
            self.press(key);
        }
    }

    pub fn type_text(&self, text: &str) {
        self.press_all(text.chars().map(Key::Char));
    }
}

/// In-memory terminal driven by a key queue, recording everything written.
pub struct ScriptedTerminal {
    cursor_row: usize,
    cursor_col: usize,
    buffer: TerminalSize,
    window: TerminalSize,
    foreground: Color,
    background: Color,
    keys: Receiver<Key>,
    refuse_buffer_resize: bool,
    writes: Vec<WriteRecord>,
    row_moves: Vec<usize>,
    scrolled: usize,
    key_polls: usize,
}

impl ScriptedTerminal {
    pub fn new(window: TerminalSize) -> (Self, KeyFeed) {
        let (sender, keys) = unbounded();
        let terminal = Self {
            cursor_row: 0,
            cursor_col: 0,
            buffer: window,
            window,
            foreground: Color::Gray,
            background: Color::Black,
            keys,
            refuse_buffer_resize: false,
            writes: Vec::new(),
            row_moves: Vec::new(),
            scrolled: 0,
            key_polls: 0,
        };
        (terminal, KeyFeed { sender })
    }

    pub fn with_buffer_height(mut self, height: usize) -> Self {
        self.buffer.height = height.max(self.window.height);
        self
    }

    pub fn with_cursor_row(mut self, row: usize) -> Self {
        self.cursor_row = row.min(self.buffer.height.saturating_sub(1));
        self
    }

    /// Makes every buffer-height change fail, like a platform that does not
    /// allow resizing its scrollback.
    pub fn refusing_buffer_resize(mut self) -> Self {
        self.refuse_buffer_resize = true;
        self
    }

    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }

    /// Every row passed to `set_cursor_row`, after clamping.
    pub fn row_moves(&self) -> &[usize] {
        &self.row_moves
    }

    /// Total lines passed to `scroll_up`.
    pub fn scrolled_lines(&self) -> usize {
        self.scrolled
    }

    /// Number of `key_available` calls so far.
    pub fn key_polls(&self) -> usize {
        self.key_polls
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for record in &self.writes {
            out.push_str(&record.text);
            if record.newline {
                out.push('\n');
            }
        }
        out
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.writes.iter().any(|record| record.text.contains(needle))
    }

    pub fn pending_keys(&self) -> usize {
        self.keys.len()
    }

    fn record(&mut self, text: &str, newline: bool) {
        self.writes.push(WriteRecord {
            row: self.cursor_row,
            col: self.cursor_col,
            text: text.to_string(),
            foreground: self.foreground,
            background: self.background,
            newline,
        });
    }

    fn last_row(&self) -> usize {
        self.buffer.height.saturating_sub(1)
    }
}

impl Terminal for ScriptedTerminal {
    fn cursor_row(&mut self) -> Result<usize> {
        Ok(self.cursor_row)
    }

    fn set_cursor_row(&mut self, row: usize) -> Result<()> {
        self.cursor_row = row.min(self.last_row());
        self.row_moves.push(self.cursor_row);
        Ok(())
    }

    fn cursor_col(&mut self) -> Result<usize> {
        Ok(self.cursor_col)
    }

    fn set_cursor_col(&mut self, col: usize) -> Result<()> {
        self.cursor_col = col.min(self.buffer.width.saturating_sub(1));
        Ok(())
    }

    fn buffer_size(&self) -> Result<TerminalSize> {
        Ok(self.buffer)
    }

    fn set_buffer_width(&mut self, width: usize) -> Result<()> {
        if width < self.window.width {
            bail!(
                "buffer width {width} is narrower than the window ({})",
                self.window.width
            );
        }
        self.buffer.width = width;
        Ok(())
    }

    fn set_buffer_height(&mut self, height: usize) -> Result<()> {
        if self.refuse_buffer_resize {
            bail!("buffer height change to {height} refused");
        }
        if height < self.window.height {
            bail!(
                "buffer height {height} is shorter than the window ({})",
                self.window.height
            );
        }
        self.buffer.height = height;
        self.cursor_row = self.cursor_row.min(self.last_row());
        Ok(())
    }

    fn window_size(&self) -> Result<TerminalSize> {
        Ok(self.window)
    }

    fn scroll_up(&mut self, lines: usize) -> Result<()> {
        self.scrolled += lines;
        Ok(())
    }

    fn set_foreground(&mut self, color: Color) -> Result<()> {
        self.foreground = color;
        Ok(())
    }

    fn set_background(&mut self, color: Color) -> Result<()> {
        self.background = color;
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.record(text, false);
        self.cursor_col += text.chars().count();
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        self.record(text, true);
        self.cursor_row = (self.cursor_row + 1).min(self.last_row());
        self.cursor_col = 0;
        Ok(())
    }

    fn key_available(&mut self) -> Result<bool> {
        self.key_polls += 1;
        Ok(!self.keys.is_empty())
    }

    fn read_key(&mut self) -> Result<Key> {
        self.keys
            .recv_timeout(READ_TIMEOUT)
            .map_err(|error| anyhow!("no scripted key available: {error}"))
    }
}

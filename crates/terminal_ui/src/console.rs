use anyhow::{Result, bail};
use crossterm::{
    cursor, event,
    event::Event,
    execute,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, disable_raw_mode, enable_raw_mode},
};
use std::{
    io::{Stdout, stdout},
    time::Duration,
};

use crate::{Color, Key, Terminal, TerminalSize, key::key_from_event};

/// [`Terminal`] over the process's controlling terminal.
///
/// The scroll buffer of a VT terminal is not addressable, so the buffer is
/// the visible screen: growing it is refused and callers fall back to
/// best-effort rendering.
pub struct CrosstermTerminal {
    out: Stdout,
    pending: Option<Key>,
}

impl CrosstermTerminal {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self {
            out: stdout(),
            pending: None,
        })
    }

    fn screen(&self) -> Result<TerminalSize> {
        let (cols, rows) = terminal::size()?;
        Ok(TerminalSize::new(cols as usize, rows as usize))
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, ResetColor);
        if let Err(error) = disable_raw_mode() {
            log::warn!("failed to leave raw mode: {error}");
        }
    }
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

impl Terminal for CrosstermTerminal {
    fn cursor_row(&mut self) -> Result<usize> {
        let (_, row) = cursor::position()?;
        Ok(row as usize)
    }

    fn set_cursor_row(&mut self, row: usize) -> Result<()> {
        let max_row = self.screen()?.height.saturating_sub(1);
        execute!(self.out, cursor::MoveToRow(to_u16(row.min(max_row))))?;
        Ok(())
    }

    fn cursor_col(&mut self) -> Result<usize> {
        let (col, _) = cursor::position()?;
        Ok(col as usize)
    }

    fn set_cursor_col(&mut self, col: usize) -> Result<()> {
        execute!(self.out, cursor::MoveToColumn(to_u16(col)))?;
        Ok(())
    }

    fn buffer_size(&self) -> Result<TerminalSize> {
        self.screen()
    }

    fn set_buffer_width(&mut self, width: usize) -> Result<()> {
        let screen = self.screen()?;
        if width != screen.width {
            bail!(
                "buffer width {width} differs from window width {}",
                screen.width
            );
        }
        Ok(())
    }

    fn set_buffer_height(&mut self, height: usize) -> Result<()> {
        let screen = self.screen()?;
        if height > screen.height {
            bail!(
                "terminal refuses a {height}-row buffer (window has {} rows)",
                screen.height
            );
        }
        Ok(())
    }

    fn window_size(&self) -> Result<TerminalSize> {
        self.screen()
    }

    fn scroll_up(&mut self, lines: usize) -> Result<()> {
        execute!(self.out, terminal::ScrollUp(to_u16(lines)))?;
        Ok(())
    }

    fn set_foreground(&mut self, color: Color) -> Result<()> {
        execute!(self.out, SetForegroundColor(color.into()))?;
        Ok(())
    }

    fn set_background(&mut self, color: Color) -> Result<()> {
        execute!(self.out, SetBackgroundColor(color.into()))?;
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        execute!(self.out, Print(text))?;
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        // Raw mode does not translate '\n'.
        execute!(self.out, Print(text), Print("\r\n"))?;
        Ok(())
    }

    fn key_available(&mut self) -> Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key_event) = event::read()?
                && let Some(key) = key_from_event(&key_event)
            {
                self.pending = Some(key);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read_key(&mut self) -> Result<Key> {
        if let Some(key) = self.pending.take() {
            return Ok(key);
        }

        loop {
            if let Event::Key(key_event) = event::read()?
                && let Some(key) = key_from_event(&key_event)
            {
                return Ok(key);
            }
        }
    }
}

use anyhow::Result;
use cmdpal_terminal::{Color, Terminal};
use parking_lot::Mutex;
use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crate::config::PaletteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// How long the message should stay readable before it may scroll away.
    pub delay: Duration,
    pub newline: bool,
    pub foreground: Color,
    pub background: Color,
}

impl WriteOptions {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            newline: true,
            foreground: Color::Gray,
            background: Color::Black,
        }
    }

    pub fn inline(mut self) -> Self {
        self.newline = false;
        self
    }

    pub fn colors(mut self, foreground: Color, background: Color) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitOutcome {
    Elapsed,
    KeyPressed,
}

/// Serialized console writer that limits how much unread transient output
/// can be in flight.
///
/// Each write schedules an expiry of `now + delay`. Once as many expiries are
/// pending as the window has rows (minus a margin), the next write waits for
/// the oldest one, or for any key press, before printing.
pub struct RateLimitedWriter<T> {
    terminal: Arc<Mutex<T>>,
    pending: Mutex<VecDeque<Instant>>,
    margin: usize,
    poll_interval: Duration,
    default_delay: Duration,
    writes: AtomicU64,
}

impl<T: Terminal> RateLimitedWriter<T> {
    pub fn new(terminal: Arc<Mutex<T>>, config: &PaletteConfig) -> Self {
        Self {
            terminal,
            pending: Mutex::new(VecDeque::new()),
            margin: config.throttle_margin,
            poll_interval: config.throttle_poll,
            default_delay: config.screen_time,
            writes: AtomicU64::new(0),
        }
    }

    /// Writes a line with the default screen time.
    pub fn write(&self, message: &str) -> Result<()> {
        self.write_with(message, WriteOptions::new(self.default_delay))
    }

    pub fn write_with(&self, message: &str, options: WriteOptions) -> Result<()> {
        let mut terminal = self.terminal.lock();
        self.write_locked(&mut terminal, message, options)
    }

    /// Same as [`write_with`](Self::write_with) for a caller that already
    /// holds the terminal lock.
    pub fn write_locked(&self, terminal: &mut T, message: &str, options: WriteOptions) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let budget = self.budget(terminal)?;

        let mut pending = self.pending.lock();
        while pending.len() >= budget {
            let Some(expiry) = pending.pop_front() else {
                break;
            };
            if self.wait_until(terminal, expiry)? == WaitOutcome::KeyPressed {
                log::debug!("throttle wait cut short by a key press");
            }
        }
        pending.push_back(Instant::now() + options.delay);

        terminal.set_foreground(options.foreground)?;
        terminal.set_background(options.background)?;
        if options.newline {
            terminal.write_line(message)
        } else {
            terminal.write(message)
        }
    }

    /// Number of writes accepted so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn default_delay(&self) -> Duration {
        self.default_delay
    }

    fn budget(&self, terminal: &T) -> Result<usize> {
        let rows = terminal.window_size()?.height;
        Ok(rows.saturating_sub(self.margin).max(1))
    }

    fn wait_until(&self, terminal: &mut T, deadline: Instant) -> Result<WaitOutcome> {
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(WaitOutcome::Elapsed);
            }
            if terminal.key_available()? {
                return Ok(WaitOutcome::KeyPressed);
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}

use anyhow::Result;
use cmdpal_terminal::{Key, Terminal};
use std::{thread, time::Duration};

use crate::config::PaletteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollExit {
    /// No key arrived for the configured number of idle cycles.
    Idle,
    /// A key other than the four scroll keys was read; it is consumed.
    OtherKey(Key),
}

struct ScrollSession {
    saved_row: usize,
    idle_cycles: u32,
}

/// Free scrolling through the console buffer with the arrow and page keys.
/// The cursor row in effect on entry is restored on exit.
pub struct ScrollNavigator {
    max_idle_cycles: u32,
    poll_interval: Duration,
}

impl ScrollNavigator {
    pub fn new(config: &PaletteConfig) -> Self {
        Self {
            max_idle_cycles: config.max_idle_cycles,
            poll_interval: config.scroll_poll,
        }
    }

    pub fn navigate<T: Terminal>(&self, terminal: &mut T, first: Key) -> Result<ScrollExit> {
        let mut session = ScrollSession {
            saved_row: terminal.cursor_row()?,
            idle_cycles: 0,
        };
        log::debug!("scroll session started at row {}", session.saved_row);

        let half_window = terminal.window_size()?.height / 2;
        let mut key = first;
        let exit = loop {
            if !key.is_scroll_key() {
                break ScrollExit::OtherKey(key);
            }

            let row = terminal.cursor_row()?;
            let last_row = terminal.buffer_size()?.height.saturating_sub(1);
            let target = match key {
                Key::Up => row.checked_sub(1),
                Key::Down => (row < last_row).then_some(row + 1),
                Key::PageUp => (row > half_window).then(|| row - half_window),
                Key::PageDown => {
                    (row + half_window < last_row).then_some(row + half_window)
                }
                _ => None,
            };
            if let Some(target) = target {
                terminal.set_cursor_row(target)?;
            }

            match self.poll_key(terminal, &mut session)? {
                Some(next) => key = next,
                None => break ScrollExit::Idle,
            }
        };

        terminal.set_cursor_row(session.saved_row)?;
        terminal.set_cursor_col(0)?;
        log::debug!("scroll session ended: {exit:?}");
        Ok(exit)
    }

    /// Waits up to `max_idle_cycles` poll intervals for a key.
    fn poll_key<T: Terminal>(
        &self,
        terminal: &mut T,
        session: &mut ScrollSession,
    ) -> Result<Option<Key>> {
        session.idle_cycles = 0;
        while session.idle_cycles < self.max_idle_cycles {
            if terminal.key_available()? {
                return terminal.read_key().map(Some);
            }
            thread::sleep(self.poll_interval);
            session.idle_cycles += 1;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdpal_terminal::{KeyFeed, ScriptedTerminal, TerminalSize};
    use std::time::Instant;

    fn navigator(max_idle_cycles: u32) -> ScrollNavigator {
        ScrollNavigator::new(&PaletteConfig {
            max_idle_cycles,
            scroll_poll: Duration::from_millis(1),
            ..PaletteConfig::default()
        })
    }

    /// 10-row window over a 100-row buffer.
    fn terminal(row: usize) -> (ScriptedTerminal, KeyFeed) {
        let (terminal, feed) = ScriptedTerminal::new(TerminalSize::new(40, 10));
        (terminal.with_buffer_height(100).with_cursor_row(row), feed)
    }

    #[test]
    fn arrows_and_pages_move_then_row_is_restored() {
        let (mut term, feed) = terminal(50);
        feed.press_all([Key::Up, Key::PageUp, Key::PageDown, Key::Down]);
        feed.press(Key::Char('q'));

        let exit = navigator(50).navigate(&mut term, Key::Up).unwrap();

        assert_eq!(exit, ScrollExit::OtherKey(Key::Char('q')));
        assert_eq!(term.row_moves(), &[49, 48, 43, 48, 49, 50]);
        assert_eq!(term.cursor_row().unwrap(), 50);
        assert_eq!(term.pending_keys(), 0);
    }

    #[test]
    fn non_scroll_first_key_exits_immediately() {
        let (mut term, _feed) = terminal(20);
        let exit = navigator(3).navigate(&mut term, Key::Enter).unwrap();
        assert_eq!(exit, ScrollExit::OtherKey(Key::Enter));
        assert_eq!(term.row_moves(), &[20]);
    }

    #[test]
    fn idle_timeout_ends_session() {
        let (mut term, _feed) = terminal(30);
        let started = Instant::now();
        let exit = navigator(5).navigate(&mut term, Key::Up).unwrap();

        assert_eq!(exit, ScrollExit::Idle);
        assert!(started.elapsed() >= Duration::from_millis(5));
        assert_eq!(term.row_moves(), &[29, 30]);
        assert_eq!(term.key_polls(), 5);
        assert_eq!(term.cursor_col().unwrap(), 0);
    }

    #[test]
    fn idle_count_restarts_after_each_key() {
        let (mut term, feed) = terminal(30);
        feed.press(Key::Down);

        let exit = navigator(3).navigate(&mut term, Key::Down).unwrap();

        assert_eq!(exit, ScrollExit::Idle);
        // One poll finds the queued key, then three empty polls end the session.
        assert_eq!(term.key_polls(), 4);
        assert_eq!(term.row_moves(), &[31, 32, 30]);
    }

    #[test]
    fn keys_within_idle_window_keep_session_alive() {
        let (mut term, feed) = terminal(30);
        let injector = std::thread::spawn(move || {
            for _ in 0..3 {
                std::thread::sleep(Duration::from_millis(20));
                feed.press(Key::Down);
            }
            std::thread::sleep(Duration::from_millis(20));
            feed.press(Key::Escape);
        });

        let exit = navigator(500).navigate(&mut term, Key::Down).unwrap();
        injector.join().expect("injector panicked");

        assert_eq!(exit, ScrollExit::OtherKey(Key::Escape));
        assert_eq!(term.row_moves(), &[31, 32, 33, 34, 30]);
    }

    #[test]
    fn movement_stops_at_buffer_top() {
        let (mut term, feed) = terminal(3);
        feed.press_all([Key::Up, Key::Up, Key::Up, Key::PageUp]);

        assert_eq!(navigator(1).navigate(&mut term, Key::PageUp).unwrap(), ScrollExit::Idle);
        assert_eq!(term.row_moves(), &[2, 1, 0, 3]);
    }

    #[test]
    fn movement_stops_at_buffer_bottom() {
        let (mut term, feed) = terminal(93);
        feed.press_all([Key::PageDown, Key::Down, Key::Down, Key::Down]);

        assert_eq!(navigator(1).navigate(&mut term, Key::PageDown).unwrap(), ScrollExit::Idle);
        assert_eq!(term.row_moves(), &[98, 99, 93]);
    }
}

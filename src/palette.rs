use anyhow::Result;
use cmdpal_search::{FilterOutcome, SearchState};
use cmdpal_terminal::{Color, Key, Terminal};
use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use crate::{
    config::PaletteConfig,
    registry::{Action, CommandRegistry, PreferenceMode},
    screen,
    scroll::ScrollNavigator,
    viewport,
    writer::{RateLimitedWriter, WriteOptions},
};

const LIST_INDICATOR: &str = "commands";

/// Stops a running [`Palette`] at its next poll. Cloneable and `Send`, so
/// hosts can keep one on another thread or inside a registered action.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

enum EpisodeOutcome {
    Aborted,
    Execute { name: String, action: Action },
}

/// Interactive command palette over a [`Terminal`].
///
/// [`run`](Self::run) owns the foreground loop. While idle it polls for a
/// key; scroll keys hand control to the [`ScrollNavigator`], search keys
/// start an episode that filters the registered commands as the user types.
/// Enter runs the selected command synchronously once the terminal lock has
/// been released, so actions may write through [`writer`](Self::writer) or
/// change the registry.
pub struct Palette<T> {
    terminal: Arc<Mutex<T>>,
    registry: Arc<CommandRegistry>,
    writer: Arc<RateLimitedWriter<T>>,
    scroll: ScrollNavigator,
    config: PaletteConfig,
    running: Arc<AtomicBool>,
}

impl<T: Terminal> Palette<T> {
    pub fn new(terminal: T, config: PaletteConfig) -> Self {
        let terminal = Arc::new(Mutex::new(terminal));
        Self {
            writer: Arc::new(RateLimitedWriter::new(Arc::clone(&terminal), &config)),
            scroll: ScrollNavigator::new(&config),
            registry: Arc::new(CommandRegistry::new()),
            running: Arc::new(AtomicBool::new(false)),
            terminal,
            config,
        }
    }

    /// Registers `name`. See [`CommandRegistry::add`].
    pub fn add<F>(&self, name: &str, action: F, mode: impl Into<PreferenceMode>) -> i64
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.registry.add(name, action, mode)
    }

    pub fn remove(&self, name: &str) -> bool {
        self.registry.remove(name)
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn writer(&self) -> &Arc<RateLimitedWriter<T>> {
        &self.writer
    }

    pub fn terminal(&self) -> &Arc<Mutex<T>> {
        &self.terminal
    }

    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Runs the palette until the exit command is invoked or a
    /// [`ShutdownHandle`] fires. A shutdown requested before the call is
    /// ignored. Only terminal failures are returned as errors.
    pub fn run(&self) -> Result<()> {
        self.running.store(true, Ordering::Release);
        self.start()?;

        let handle = self.shutdown_handle();
        self.registry.add(
            &self.config.exit_command,
            move || handle.shutdown(),
            PreferenceMode::Current,
        );

        while self.running.load(Ordering::Acquire) {
            if !self.terminal.lock().key_available()? {
                thread::sleep(self.config.input_poll);
                continue;
            }

            let outcome = {
                let mut terminal = self.terminal.lock();
                // Another holder of the terminal may have taken the key.
                if !terminal.key_available()? {
                    continue;
                }
                let key = terminal.read_key()?;
                self.dispatch(&mut terminal, key)?
            };

            if let EpisodeOutcome::Execute { name, action } = outcome {
                action();
                log::debug!("command {name:?} finished");
            }
        }

        log::debug!("palette stopped");
        Ok(())
    }

    fn start(&self) -> Result<()> {
        let mut terminal = self.terminal.lock();
        terminal.set_foreground(self.config.prompt_color)?;
        terminal.write_line(&self.config.prompt)?;

        let wanted = self.config.max_buffer_height;
        if terminal.buffer_size()?.height < wanted
            && let Err(error) = terminal.set_buffer_height(wanted)
        {
            log::warn!("keeping current buffer height, {wanted} rows refused: {error:#}");
        }
        Ok(())
    }

    fn dispatch(&self, terminal: &mut T, key: Key) -> Result<EpisodeOutcome> {
        if self.starts_episode(key) {
            return self.run_episode(terminal, key);
        }
        let exit = self.scroll.navigate(terminal, key)?;
        log::debug!("left free scrolling: {exit:?}");
        Ok(EpisodeOutcome::Aborted)
    }

    fn starts_episode(&self, key: Key) -> bool {
        match key {
            Key::Down | Key::Home | Key::Backspace | Key::Enter => true,
            Key::Char(c) => self.config.is_search_char(c),
            _ => false,
        }
    }

    fn run_episode(&self, terminal: &mut T, first: Key) -> Result<EpisodeOutcome> {
        let mut origin = terminal.cursor_row()?;
        log::debug!("episode started at row {origin} by {first:?}");

        let mut state = SearchState::new();
        let mut drawn = false;
        let mut key = first;
        loop {
            match key {
                Key::Enter => return self.confirm(terminal, &state, origin, drawn),
                Key::Escape => return self.abort(terminal, origin, drawn),
                _ => {}
            }

            if !drawn {
                origin = screen::make_room(terminal)?;
                drawn = true;
            }
            self.fill(terminal, origin, LIST_INDICATOR, self.config.list_background)?;
            state.ensure_candidates(|| self.registry.sorted_names());
            self.apply_key(&mut state, key);
            state.ensure_candidates(|| self.registry.sorted_names());

            match state.refilter() {
                FilterOutcome::NoMatch { query } => {
                    let notice = format!("no matching command for {query}");
                    log::debug!("{notice}");
                    let options = WriteOptions::new(self.writer.default_delay())
                        .colors(Color::Gray, self.config.list_background);
                    self.writer.write_locked(terminal, &notice, options)?;
                }
                FilterOutcome::Filtered { .. } | FilterOutcome::Unchanged => {
                    self.render(terminal, &state, origin)?;
                }
            }

            key = terminal.read_key()?;
        }
    }

    fn apply_key(&self, state: &mut SearchState, key: Key) {
        match key {
            Key::Down => state.select_next(),
            Key::Up => state.select_previous(),
            Key::Home => state.select_first(),
            Key::Backspace => state.backspace(),
            Key::Char(c) if self.config.is_search_char(c) => state.push_char(c),
            _ => {}
        }
    }

    fn confirm(
        &self,
        terminal: &mut T,
        state: &SearchState,
        origin: usize,
        drawn: bool,
    ) -> Result<EpisodeOutcome> {
        terminal.set_cursor_row(origin)?;
        terminal.set_cursor_col(0)?;
        if state.keystrokes().trim().is_empty() {
            return self.abort(terminal, origin, drawn);
        }

        let Some(name) = state.selected() else {
            log::error!(
                "mismatch between pos={} and list length={}",
                state.selection(),
                state.filtered().len()
            );
            return self.abort(terminal, origin, drawn);
        };
        let Some(action) = self.registry.promote(name) else {
            log::warn!("command {name:?} was removed before it could run");
            return self.abort(terminal, origin, drawn);
        };

        self.fill(terminal, origin, &format!("executing: {name}"), Color::Black)?;
        log::info!("executing command {name:?}");
        Ok(EpisodeOutcome::Execute {
            name: name.to_string(),
            action,
        })
    }

    /// Blanks the block if the episode drew one; otherwise only the cursor is
    /// put back.
    fn abort(&self, terminal: &mut T, origin: usize, drawn: bool) -> Result<EpisodeOutcome> {
        if drawn {
            self.fill(terminal, origin, "", Color::Black)?;
        } else {
            terminal.set_cursor_row(origin)?;
            terminal.set_cursor_col(0)?;
        }
        log::debug!("episode aborted");
        Ok(EpisodeOutcome::Aborted)
    }

    fn fill(&self, terminal: &mut T, origin: usize, indicator: &str, background: Color) -> Result<()> {
        terminal.set_cursor_row(origin)?;
        screen::clear(
            terminal,
            indicator,
            background,
            Color::Gray,
            self.config.max_buffer_height,
        )
    }

    /// Draws the visible slice of the filtered list below `origin`, then the
    /// selection glyph in column 0. Stops drawing rows as soon as a key is
    /// waiting. Rows past the end of the buffer are never used.
    fn render(&self, terminal: &mut T, state: &SearchState, origin: usize) -> Result<()> {
        let below = terminal.buffer_size()?.height.saturating_sub(origin);
        let rows = terminal
            .window_size()?
            .height
            .saturating_sub(1)
            .min(below)
            .max(1);
        let filtered = state.filtered();
        let skip = viewport::compute_window(state.selection(), filtered.len(), rows);

        let visible = &filtered[viewport::visible_range(skip, filtered.len(), rows)];
        for (row, name) in visible.iter().enumerate() {
            if terminal.key_available()? {
                break;
            }
            terminal.set_cursor_row(origin + row)?;
            terminal.set_cursor_col(1)?;
            for segment in viewport::highlight_segments(name, state.positions(name)) {
                let color = if segment.highlighted {
                    self.config.highlight_color
                } else {
                    self.config.base_color
                };
                terminal.set_foreground(color)?;
                terminal.write(&segment.text)?;
            }
        }

        terminal.set_cursor_row(origin + viewport::indicator_row(state.selection(), skip))?;
        terminal.set_cursor_col(0)?;
        terminal.set_foreground(self.config.indicator_color)?;
        let mut glyph = [0; 4];
        terminal.write(self.config.selection_glyph.encode_utf8(&mut glyph))
    }
}

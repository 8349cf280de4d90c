use anyhow::Result;
use cmdpal::{
    Color, CommandRegistry, CrosstermTerminal, Palette, PreferenceMode, RateLimitedWriter, screen,
};
use parking_lot::Mutex;
use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crate::config::load_config;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const PRINTED_LINES: usize = 20;

type Writer = Arc<RateLimitedWriter<CrosstermTerminal>>;

pub fn run() -> Result<()> {
    let palette = Palette::new(CrosstermTerminal::new()?, load_config());
    let max_height = palette.config().max_buffer_height;

    for (name, indicator, background) in [
        ("clear red", "red", Color::DarkRed),
        ("clear blue", "blue", Color::DarkBlue),
        ("clear green", "green", Color::DarkGreen),
        ("clear screen", "", Color::Black),
    ] {
        let terminal = Arc::clone(palette.terminal());
        palette.add(
            name,
            move || {
                let mut terminal = terminal.lock();
                if let Err(error) =
                    screen::clear(&mut *terminal, indicator, background, Color::Gray, max_height)
                {
                    log::warn!("{name} failed: {error:#}");
                }
            },
            PreferenceMode::Top,
        );
    }

    let writer = Arc::clone(palette.writer());
    palette.add(
        "print lines",
        move || {
            for i in 0..PRINTED_LINES {
                if let Err(error) = writer.write(&format!("line {i}")) {
                    log::warn!("print lines failed: {error:#}");
                    break;
                }
            }
        },
        PreferenceMode::Top,
    );

    let registry = Arc::downgrade(palette.registry());
    let writer = Arc::clone(palette.writer());
    palette.add(
        "start ticker",
        move || {
            if let Some(registry) = registry.upgrade() {
                start_ticker(&registry, &writer);
            }
        },
        PreferenceMode::Top,
    );

    palette.run()
}

/// Spawns a background thread printing throttled ticks and registers a
/// "stop ticker" command that ends it and removes itself.
fn start_ticker(registry: &Arc<CommandRegistry>, writer: &Writer) {
    if registry.contains("stop ticker") {
        log::debug!("ticker already running");
        return;
    }

    let running = Arc::new(AtomicBool::new(true));
    let ticker = {
        let running = Arc::clone(&running);
        let writer = Arc::clone(writer);
        thread::spawn(move || {
            let mut tick = 0u64;
            while running.load(Ordering::Acquire) {
                tick += 1;
                if let Err(error) = writer.write(&format!("tick {tick}")) {
                    log::warn!("ticker stopped: {error:#}");
                    return;
                }
                thread::sleep(TICK_INTERVAL);
            }
        })
    };

    let handle = Mutex::new(Some(ticker));
    let stop_registry: Weak<CommandRegistry> = Arc::downgrade(registry);
    registry.add(
        "stop ticker",
        move || {
            running.store(false, Ordering::Release);
            if let Some(ticker) = handle.lock().take()
                && ticker.join().is_err()
            {
                log::warn!("ticker thread panicked");
            }
            if let Some(registry) = stop_registry.upgrade() {
                registry.remove("stop ticker");
            }
        },
        PreferenceMode::Current,
    );
}

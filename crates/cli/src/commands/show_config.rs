use cmdpal::{DEFAULT_CONFIG, PaletteConfig};

use crate::config::config_path;

pub fn run() {
    let path = match config_path() {
        Some(p) => p,
        None => {
            eprintln!("Could not determine config directory");
            return;
        }
    };

    if !path.exists() {
        println!("# Config file: {} (not created yet)", path.display());
        println!("# Using default configuration");
        println!();
        print!("{DEFAULT_CONFIG}");
        return;
    }

    println!("# Config file: {}", path.display());
    println!();

    match std::fs::read_to_string(&path) {
        Ok(contents) => print_effective(&PaletteConfig::from_contents(&contents)),
        Err(e) => {
            eprintln!("Failed to read config file: {}", e);
        }
    }
}

fn print_effective(config: &PaletteConfig) {
    let extra: String = config.search_extra_chars.iter().collect();
    println!("# Effective values:");
    println!("prompt = {}", config.prompt);
    println!("exit_command = {}", config.exit_command);
    println!("max_buffer_height = {}", config.max_buffer_height);
    println!("max_idle_cycles = {}", config.max_idle_cycles);
    println!("input_poll_ms = {}", config.input_poll.as_millis());
    println!("scroll_poll_ms = {}", config.scroll_poll.as_millis());
    println!("throttle_poll_ms = {}", config.throttle_poll.as_millis());
    println!("throttle_margin = {}", config.throttle_margin);
    println!("screen_time_ms = {}", config.screen_time.as_millis());
    println!("search_extra_chars = \"{extra}\"");
    println!("selection_glyph = {}", config.selection_glyph);
    println!("highlight_color = {}", config.highlight_color.name());
    println!("base_color = {}", config.base_color.name());
    println!("indicator_color = {}", config.indicator_color.name());
    println!("list_background = {}", config.list_background.name());
    println!("prompt_color = {}", config.prompt_color.name());
}

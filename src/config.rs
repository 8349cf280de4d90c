use std::{fmt, fs, path::Path, time::Duration};

use cmdpal_terminal::Color;

const DEFAULT_PROMPT: &str = "Please enter command to execute";
const DEFAULT_EXIT_COMMAND: &str = "exit application";
const DEFAULT_MAX_BUFFER_HEIGHT: usize = 8000;
const MIN_BUFFER_HEIGHT: usize = 100;
const MAX_BUFFER_HEIGHT: usize = 32_000;
const DEFAULT_MAX_IDLE_CYCLES: u32 = 50;
const MAX_IDLE_CYCLES_LIMIT: u32 = 10_000;
const DEFAULT_INPUT_POLL_MS: u64 = 250;
const DEFAULT_SCROLL_POLL_MS: u64 = 100;
const DEFAULT_THROTTLE_POLL_MS: u64 = 100;
const MAX_POLL_MS: u64 = 10_000;
const DEFAULT_THROTTLE_MARGIN: usize = 3;
const DEFAULT_SCREEN_TIME_MS: u64 = 2000;
const MAX_SCREEN_TIME_MS: u64 = 600_000;
const DEFAULT_SEARCH_EXTRA_CHARS: &str = " ._";
const DEFAULT_SELECTION_GLYPH: char = '\u{bb}';

pub const DEFAULT_CONFIG: &str = "# cmdpal settings\n\
# Line printed when the palette starts\n\
# prompt = Please enter command to execute\n\
# Name of the built-in command that leaves the palette\n\
# exit_command = exit application\n\
\n\
# Scroll buffer rows requested at startup (100..32000)\n\
# max_buffer_height = 8000\n\
# Idle polls before free scrolling gives the cursor back\n\
# max_idle_cycles = 50\n\
# Poll intervals in milliseconds\n\
# input_poll_ms = 250\n\
# scroll_poll_ms = 100\n\
# throttle_poll_ms = 100\n\
\n\
# Rows kept free when throttling transient output\n\
# throttle_margin = 3\n\
# Default time a throttled message stays readable\n\
# screen_time_ms = 2000\n\
\n\
# Characters accepted in a search besides letters and digits (quote to keep spaces)\n\
# search_extra_chars = \" ._\"\n\
# selection_glyph = \u{bb}\n\
# highlight_color = white\n\
# base_color = blue\n\
# indicator_color = red\n\
# list_background = dark_blue\n\
# prompt_color = yellow\n";

/// Why a config line left the defaults untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    Syntax,
    UnknownKey(String),
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl ConfigIssue {
    /// Unknown keys are tolerated; everything else is a mistake.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::UnknownKey(_))
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "Invalid syntax. Expected 'key = value'"),
            Self::UnknownKey(key) => write!(f, "Unknown key '{key}'"),
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "Invalid value '{value}': {key} must be {expected}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaletteConfig {
    pub prompt: String,
    pub exit_command: String,
    pub max_buffer_height: usize,
    pub max_idle_cycles: u32,
    pub input_poll: Duration,
    pub scroll_poll: Duration,
    pub throttle_poll: Duration,
    pub throttle_margin: usize,
    pub screen_time: Duration,
    pub search_extra_chars: Vec<char>,
    pub selection_glyph: char,
    pub highlight_color: Color,
    pub base_color: Color,
    pub indicator_color: Color,
    pub list_background: Color,
    pub prompt_color: Color,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            exit_command: DEFAULT_EXIT_COMMAND.to_string(),
            max_buffer_height: DEFAULT_MAX_BUFFER_HEIGHT,
            max_idle_cycles: DEFAULT_MAX_IDLE_CYCLES,
            input_poll: Duration::from_millis(DEFAULT_INPUT_POLL_MS),
            scroll_poll: Duration::from_millis(DEFAULT_SCROLL_POLL_MS),
            throttle_poll: Duration::from_millis(DEFAULT_THROTTLE_POLL_MS),
            throttle_margin: DEFAULT_THROTTLE_MARGIN,
            screen_time: Duration::from_millis(DEFAULT_SCREEN_TIME_MS),
            search_extra_chars: DEFAULT_SEARCH_EXTRA_CHARS.chars().collect(),
            selection_glyph: DEFAULT_SELECTION_GLYPH,
            highlight_color: Color::White,
            base_color: Color::Blue,
            indicator_color: Color::Red,
            list_background: Color::DarkBlue,
            prompt_color: Color::Yellow,
        }
    }
}

impl PaletteConfig {
    /// Reads `path`, falling back to defaults when it is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_contents(&contents),
            Err(error) => {
                log::debug!("using default config, {} unreadable: {error}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_contents(contents: &str) -> Self {
        let (config, issues) = Self::parse(contents);
        for (line, issue) in issues {
            log::debug!("ignoring config line {line}: {issue}");
        }
        config
    }

    /// Parses `contents` and reports every non-comment line that left the
    /// defaults untouched, with its 1-based line number.
    pub fn parse(contents: &str) -> (Self, Vec<(usize, ConfigIssue)>) {
        let mut config = Self::default();
        let mut issues = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let applied = match line.split_once('=') {
                Some((key, value)) => config.apply(&key.trim().to_ascii_lowercase(), value.trim()),
                None => Err(ConfigIssue::Syntax),
            };
            if let Err(issue) = applied {
                issues.push((index + 1, issue));
            }
        }
        (config, issues)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigIssue> {
        let invalid = |expected: &'static str| ConfigIssue::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        };

        match key {
            "prompt" => {
                self.prompt = parse_string_value(value).ok_or_else(|| invalid("a non-empty string"))?;
            }
            "exit_command" => {
                self.exit_command =
                    parse_string_value(value).ok_or_else(|| invalid("a non-empty string"))?;
            }
            "max_buffer_height" => {
                let height = value
                    .parse::<usize>()
                    .map_err(|_| invalid("a positive integer"))?;
                self.max_buffer_height = height.clamp(MIN_BUFFER_HEIGHT, MAX_BUFFER_HEIGHT);
            }
            "max_idle_cycles" => {
                let cycles = value
                    .parse::<u32>()
                    .map_err(|_| invalid("an integer between 0 and 4294967295"))?;
                self.max_idle_cycles = cycles.clamp(1, MAX_IDLE_CYCLES_LIMIT);
            }
            "input_poll_ms" => {
                self.input_poll = parse_millis(value, 1, MAX_POLL_MS)
                    .ok_or_else(|| invalid("a number of milliseconds"))?;
            }
            "scroll_poll_ms" => {
                self.scroll_poll = parse_millis(value, 1, MAX_POLL_MS)
                    .ok_or_else(|| invalid("a number of milliseconds"))?;
            }
            "throttle_poll_ms" => {
                self.throttle_poll = parse_millis(value, 1, MAX_POLL_MS)
                    .ok_or_else(|| invalid("a number of milliseconds"))?;
            }
            "throttle_margin" => {
                self.throttle_margin = value
                    .parse::<usize>()
                    .map_err(|_| invalid("a positive integer"))?;
            }
            "screen_time_ms" => {
                self.screen_time = parse_millis(value, 0, MAX_SCREEN_TIME_MS)
                    .ok_or_else(|| invalid("a number of milliseconds"))?;
            }
            "search_extra_chars" => {
                self.search_extra_chars = unquote(value).chars().collect();
            }
            "selection_glyph" => {
                let mut chars = unquote(value).chars();
                match (chars.next(), chars.next()) {
                    (Some(glyph), None) => self.selection_glyph = glyph,
                    _ => return Err(invalid("a single character")),
                }
            }
            "highlight_color" => {
                self.highlight_color = parse_color(value).ok_or_else(|| invalid("a color name"))?;
            }
            "base_color" => {
                self.base_color = parse_color(value).ok_or_else(|| invalid("a color name"))?;
            }
            "indicator_color" => {
                self.indicator_color = parse_color(value).ok_or_else(|| invalid("a color name"))?;
            }
            "list_background" => {
                self.list_background = parse_color(value).ok_or_else(|| invalid("a color name"))?;
            }
            "prompt_color" => {
                self.prompt_color = parse_color(value).ok_or_else(|| invalid("a color name"))?;
            }
            _ => return Err(ConfigIssue::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Letters, digits, and the configured extra characters extend a search.
    pub fn is_search_char(&self, c: char) -> bool {
        c.is_alphanumeric() || self.search_extra_chars.contains(&c)
    }
}

fn parse_millis(value: &str, min: u64, max: u64) -> Option<Duration> {
    let millis = value.parse::<u64>().ok()?;
    Some(Duration::from_millis(millis.clamp(min, max)))
}

fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

fn parse_color(value: &str) -> Option<Color> {
    Color::from_name(unquote(value))
}

fn parse_string_value(value: &str) -> Option<String> {
    let unquoted = unquote(value).trim();
    if unquoted.is_empty() {
        return None;
    }
    Some(unquoted.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_contents_yield_defaults() {
        let config = PaletteConfig::from_contents("");
        assert_eq!(config.prompt, "Please enter command to execute");
        assert_eq!(config.exit_command, "exit application");
        assert_eq!(config.max_buffer_height, 8000);
        assert_eq!(config.max_idle_cycles, 50);
        assert_eq!(config.input_poll, Duration::from_millis(250));
        assert_eq!(config.throttle_margin, 3);
        assert_eq!(config.selection_glyph, '\u{bb}');
        assert_eq!(config.search_extra_chars, vec![' ', '.', '_']);
    }

    #[test]
    fn default_template_parses_to_defaults() {
        let config = PaletteConfig::from_contents(DEFAULT_CONFIG);
        let defaults = PaletteConfig::default();
        assert_eq!(config.prompt, defaults.prompt);
        assert_eq!(config.screen_time, defaults.screen_time);
        assert_eq!(config.base_color, defaults.base_color);
    }

    #[test]
    fn values_override_and_clamp() {
        let config = PaletteConfig::from_contents(
            "# comment\n\
             prompt = \"Pick one\"\n\
             max_buffer_height = 10\n\
             max_idle_cycles = 0\n\
             scroll_poll_ms = 5\n\
             screen_time_ms = 900000\n\
             throttle_margin = 1\n\
             highlight_color = dark_red\n\
             base_color = not-a-color\n",
        );

        assert_eq!(config.prompt, "Pick one");
        assert_eq!(config.max_buffer_height, 100);
        assert_eq!(config.max_idle_cycles, 1);
        assert_eq!(config.scroll_poll, Duration::from_millis(5));
        assert_eq!(config.screen_time, Duration::from_millis(600_000));
        assert_eq!(config.throttle_margin, 1);
        assert_eq!(config.highlight_color, Color::DarkRed);
        assert_eq!(config.base_color, Color::Blue);
    }

    #[test]
    fn quoted_extra_chars_keep_spaces() {
        let config = PaletteConfig::from_contents("search_extra_chars = \" -\"\n");
        assert_eq!(config.search_extra_chars, vec![' ', '-']);
        assert!(config.is_search_char('-'));
        assert!(config.is_search_char('7'));
        assert!(!config.is_search_char('.'));
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let config = PaletteConfig::from_contents("max_idle_cycles\nmax_idle_cycles = many\n");
        assert_eq!(config.max_idle_cycles, 50);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = PaletteConfig::load(Path::new("/nonexistent/cmdpal/config.txt"));
        assert_eq!(config.exit_command, "exit application");
    }

    #[test]
    fn parse_reports_ignored_lines() {
        let (config, issues) = PaletteConfig::parse(
            "max_idle_cycles = 5000000000\n\
             theme = dark\n\
             not a pair\n\
             selection_glyph = >>\n",
        );

        assert_eq!(config.max_idle_cycles, 50);
        assert_eq!(config.selection_glyph, '\u{bb}');
        let lines: Vec<usize> = issues.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);
        assert!(issues[0].1.is_error());
        assert_eq!(issues[1].1, ConfigIssue::UnknownKey("theme".to_string()));
        assert!(!issues[1].1.is_error());
        assert_eq!(issues[2].1, ConfigIssue::Syntax);
    }

    #[test]
    fn keys_are_case_insensitive_and_values_may_be_quoted() {
        let (config, issues) = PaletteConfig::parse(
            "Prompt = Hi\n\
             selection_glyph = '>'\n\
             BASE_COLOR = \"dark_cyan\"\n",
        );

        assert!(issues.is_empty(), "{issues:?}");
        assert_eq!(config.prompt, "Hi");
        assert_eq!(config.selection_glyph, '>');
        assert_eq!(config.base_color, Color::DarkCyan);
    }
}

//! Embeddable command palette for terminal applications.
//!
//! A host registers named actions on a [`Palette`] and calls
//! [`Palette::run`]; the user types to fuzzy-filter the commands, moves the
//! selection with the arrow keys and runs one with Enter.

mod config;
mod palette;
mod registry;
pub mod screen;
mod scroll;
pub mod viewport;
mod writer;

pub use cmdpal_search::{MatchResult, match_positions};
pub use cmdpal_terminal::{
    Color, CrosstermTerminal, Key, KeyFeed, ScriptedTerminal, Terminal, TerminalSize, WriteRecord,
};
pub use config::{ConfigIssue, DEFAULT_CONFIG, PaletteConfig};
pub use palette::{Palette, ShutdownHandle};
pub use registry::{Action, Command, CommandRegistry, PreferenceMode, ordering};
pub use scroll::{ScrollExit, ScrollNavigator};
pub use writer::{RateLimitedWriter, WriteOptions};

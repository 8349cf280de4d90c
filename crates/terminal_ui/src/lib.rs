//! Terminal capability layer for cmdpal.

mod capability;
mod color;
mod console;
mod key;
mod scripted;

pub use capability::{Terminal, TerminalSize};
pub use color::Color;
pub use console::CrosstermTerminal;
pub use key::{Key, key_from_event};
pub use scripted::{KeyFeed, ScriptedTerminal, WriteRecord};

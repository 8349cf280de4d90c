//! Fuzzy matching and search state for the cmdpal command palette.

mod matcher;
mod state;

pub use matcher::{MatchResult, match_positions};
pub use state::{FilterOutcome, SearchState};

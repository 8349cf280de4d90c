use std::collections::HashMap;

use crate::matcher::MatchResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Nothing changed since the last filter pass.
    Unchanged,
    Filtered { remaining: usize },
    /// The query matched nothing; keystrokes and candidates have been reset.
    NoMatch { query: String },
}

/// Query, candidate list and selection of one palette episode.
///
/// `filtered` is ordered as it was seeded and only ever narrows until the
/// next reseed. Whenever it is non-empty the selection indexes into it.
#[derive(Debug, Default)]
pub struct SearchState {
    keystrokes: String,
    filtered: Vec<String>,
    selection: usize,
    positions: HashMap<String, Vec<usize>>,
    refilter: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keystrokes(&self) -> &str {
        &self.keystrokes
    }

    pub fn filtered(&self) -> &[String] {
        &self.filtered
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    /// Candidate under the selection, `None` if the index is out of range.
    pub fn selected(&self) -> Option<&str> {
        self.filtered.get(self.selection).map(String::as_str)
    }

    /// Highlight positions recorded for `name` by the last filter pass.
    pub fn positions(&self, name: &str) -> &[usize] {
        self.positions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn needs_candidates(&self) -> bool {
        self.filtered.is_empty()
    }

    /// Seeds the candidate universe if the list is empty. `load` must return
    /// names already in display order.
    pub fn ensure_candidates(&mut self, load: impl FnOnce() -> Vec<String>) {
        if !self.needs_candidates() {
            return;
        }
        self.filtered = load();
        self.positions.clear();
        self.refilter = true;
    }

    pub fn push_char(&mut self, c: char) {
        self.keystrokes.push(c);
        self.refilter = true;
    }

    /// Drops the last keystroke unless it is the only one, and always resets
    /// the selection and the candidate list.
    pub fn backspace(&mut self) {
        self.selection = 0;
        self.filtered.clear();
        if self.keystrokes.chars().count() > 1 {
            self.keystrokes.pop();
        }
    }

    pub fn select_next(&mut self) {
        if self.selection + 1 < self.filtered.len() {
            self.selection += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn refilter(&mut self) -> FilterOutcome {
        if !self.refilter {
            return FilterOutcome::Unchanged;
        }
        self.refilter = false;

        let needle = self.keystrokes.as_str();
        let positions = &mut self.positions;
        self.filtered.retain(|name| {
            let result = MatchResult::new(name.as_str(), needle);
            if result.is_match() {
                positions.insert(result.candidate, result.positions);
                true
            } else {
                false
            }
        });

        if self.filtered.is_empty() {
            self.selection = 0;
            self.positions.clear();
            return FilterOutcome::NoMatch {
                query: std::mem::take(&mut self.keystrokes),
            };
        }

        if self.selection >= self.filtered.len() {
            self.selection = self.filtered.len() - 1;
        }
        FilterOutcome::Filtered {
            remaining: self.filtered.len(),
        }
    }
}

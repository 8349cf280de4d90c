/// Greedy leftmost subsequence match of `needle` inside `haystack`.
///
/// Returns the character index in `haystack` of each needle character, in
/// order. Matching stops at the first needle character that cannot be found
/// after the previous hit, so a list shorter than the needle means "no match".
/// Comparison is case-sensitive.
pub fn match_positions(haystack: &str, needle: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut remaining = haystack.chars().enumerate();

    'needle: for wanted in needle.chars() {
        for (index, c) in remaining.by_ref() {
            if c == wanted {
                positions.push(index);
                continue 'needle;
            }
        }
        break;
    }

    positions
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub candidate: String,
    pub positions: Vec<usize>,
    pub matched: bool,
}

impl MatchResult {
    pub fn new(candidate: impl Into<String>, needle: &str) -> Self {
        let candidate = candidate.into();
        let positions = match_positions(&candidate, needle);
        let matched = positions.len() == needle.chars().count();
        Self {
            candidate,
            positions,
            matched,
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched
    }
}

use std::ops::Range;

/// Number of leading candidates hidden above the rendered window.
///
/// Centers the selection when possible and never scrolls past the last full
/// window: `clamp(selection - height / 2, 0, max(0, count - height))`.
pub fn compute_window(selection: usize, count: usize, height: usize) -> usize {
    selection
        .saturating_sub(height / 2)
        .min(count.saturating_sub(height))
}

/// Candidate indices rendered for `skip`.
pub fn visible_range(skip: usize, count: usize, height: usize) -> Range<usize> {
    let start = skip.min(count);
    start..skip.saturating_add(height).min(count)
}

/// Row of the selection indicator relative to the first rendered row.
pub fn indicator_row(selection: usize, skip: usize) -> usize {
    selection.saturating_sub(skip)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// Splits `name` into alternating base and highlighted runs, one highlighted
/// character per match position. Positions are character indices in
/// ascending order; out-of-range positions are ignored.
pub fn highlight_segments(name: &str, positions: &[usize]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut pending = positions.iter().copied().peekable();

    for (index, c) in name.chars().enumerate() {
        let highlighted = pending.peek() == Some(&index);
        if highlighted {
            pending.next();
        }

        match segments.last_mut() {
            Some(last) if !last.highlighted && !highlighted => last.text.push(c),
            _ => segments.push(Segment {
                text: c.to_string(),
                highlighted,
            }),
        }
    }

    segments
}

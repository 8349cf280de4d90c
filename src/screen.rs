use anyhow::Result;
use cmdpal_terminal::{Color, Terminal};

/// Blanks one window height of rows starting at the cursor row and leaves the
/// cursor at column 0 of that row, with `background`/`foreground` in effect.
///
/// The buffer is first narrowed to the window width, capped at
/// `max_buffer_height` and grown when the blanked block would run past its
/// end. A refused resize is logged and the fill continues best-effort. A
/// non-blank `indicator` is right-aligned on the last blanked row.
pub fn clear<T: Terminal>(
    terminal: &mut T,
    indicator: &str,
    background: Color,
    foreground: Color,
    max_buffer_height: usize,
) -> Result<()> {
    let window = terminal.window_size()?;
    terminal.set_buffer_width(window.width)?;
    terminal.set_cursor_col(0)?;

    if terminal.buffer_size()?.height > max_buffer_height
        && let Err(error) = terminal.set_buffer_height(max_buffer_height)
    {
        log::warn!("could not cap buffer height at {max_buffer_height}: {error:#}");
    }

    let origin = terminal.cursor_row()?;
    let needed = origin + window.height + 2;
    if terminal.buffer_size()?.height < needed
        && let Err(error) = terminal.set_buffer_height(needed)
    {
        log::warn!("no new buffer height ({needed}): {error:#}");
    }

    terminal.set_background(background)?;
    terminal.set_foreground(foreground)?;
    let blank = " ".repeat(window.width);
    for row in 0..window.height {
        terminal.set_cursor_row(origin + row)?;
        terminal.set_cursor_col(0)?;
        terminal.write(&blank)?;
    }

    let indicator_len = indicator.chars().count();
    if !indicator.trim().is_empty() {
        terminal.set_cursor_row(origin + window.height.saturating_sub(1))?;
        terminal.set_cursor_col(window.width.saturating_sub(indicator_len))?;
        terminal.write(indicator)?;
    }

    terminal.set_cursor_col(0)?;
    terminal.set_cursor_row(origin)
}

/// Makes sure one window height of rows fits below the cursor and returns
/// the row the block should start on.
///
/// The buffer is grown first. When that is refused, the contents scroll up
/// by the shortfall and the cursor follows them, so the returned row plus the
/// window height never runs past the end of the buffer.
pub fn make_room<T: Terminal>(terminal: &mut T) -> Result<usize> {
    let origin = terminal.cursor_row()?;
    let window = terminal.window_size()?;
    let needed = origin + window.height;
    let height = terminal.buffer_size()?.height;
    if height >= needed {
        return Ok(origin);
    }

    match terminal.set_buffer_height(needed) {
        Ok(()) => Ok(origin),
        Err(error) => {
            let shortfall = (needed - height).min(origin);
            log::debug!("scrolling {shortfall} rows, buffer not grown: {error:#}");
            terminal.scroll_up(shortfall)?;
            let origin = origin - shortfall;
            terminal.set_cursor_row(origin)?;
            Ok(origin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdpal_terminal::{KeyFeed, ScriptedTerminal, TerminalSize};

    fn terminal() -> (ScriptedTerminal, KeyFeed) {
        let (terminal, feed) = ScriptedTerminal::new(TerminalSize::new(20, 4));
        (terminal.with_buffer_height(50).with_cursor_row(10), feed)
    }

    #[test]
    fn blanks_window_rows_and_restores_cursor() {
        let (mut term, _feed) = terminal();
        clear(&mut term, "", Color::DarkBlue, Color::Gray, 8000).unwrap();

        let blanks: Vec<_> = term.writes().iter().map(|record| record.row).collect();
        assert_eq!(blanks, vec![10, 11, 12, 13]);
        assert!(term.writes().iter().all(|record| {
            record.text == " ".repeat(20) && record.col == 0 && record.background == Color::DarkBlue
        }));
        assert_eq!(term.cursor_row().unwrap(), 10);
        assert_eq!(term.cursor_col().unwrap(), 0);
        assert_eq!(term.background(), Color::DarkBlue);
    }

    #[test]
    fn indicator_is_right_aligned_on_last_row() {
        let (mut term, _feed) = terminal();
        clear(&mut term, "commands", Color::DarkBlue, Color::Gray, 8000).unwrap();

        let last = term.writes().last().unwrap();
        assert_eq!(last.text, "commands");
        assert_eq!((last.row, last.col), (13, 12));
    }

    #[test]
    fn blank_indicator_is_not_written() {
        let (mut term, _feed) = terminal();
        clear(&mut term, "   ", Color::Black, Color::Gray, 8000).unwrap();
        assert_eq!(term.writes().len(), 4);
    }

    #[test]
    fn buffer_grows_to_fit_block() {
        let (term, _feed) = terminal();
        let mut term = term.with_cursor_row(48);
        clear(&mut term, "", Color::Black, Color::Gray, 8000).unwrap();
        assert_eq!(term.buffer_size().unwrap().height, 54);
        assert_eq!(term.cursor_row().unwrap(), 48);
    }

    #[test]
    fn buffer_is_capped_at_maximum() {
        let (term, _feed) = terminal();
        let mut term = term.with_buffer_height(9000);
        clear(&mut term, "", Color::Black, Color::Gray, 8000).unwrap();
        assert_eq!(term.buffer_size().unwrap().height, 8000);
    }

    #[test]
    fn refused_resize_still_fills() {
        let (term, _feed) = terminal();
        let mut term = term.with_cursor_row(48).refusing_buffer_resize();
        clear(&mut term, "executing: deploy", Color::Black, Color::Gray, 8000).unwrap();

        assert_eq!(term.buffer_size().unwrap().height, 50);
        assert!(term.contains("executing: deploy"));
    }

    #[test]
    fn make_room_keeps_origin_when_block_fits() {
        let (mut term, _feed) = terminal();
        assert_eq!(make_room(&mut term).unwrap(), 10);
        assert_eq!(term.scrolled_lines(), 0);
    }

    #[test]
    fn make_room_grows_buffer_near_the_end() {
        let (term, _feed) = terminal();
        let mut term = term.with_cursor_row(48);
        assert_eq!(make_room(&mut term).unwrap(), 48);
        assert_eq!(term.buffer_size().unwrap().height, 52);
        assert_eq!(term.scrolled_lines(), 0);
    }

    #[test]
    fn make_room_scrolls_when_resize_is_refused() {
        let (term, _feed) = terminal();
        let mut term = term.with_cursor_row(48).refusing_buffer_resize();

        assert_eq!(make_room(&mut term).unwrap(), 46);
        assert_eq!(term.scrolled_lines(), 2);
        assert_eq!(term.cursor_row().unwrap(), 46);
    }
}

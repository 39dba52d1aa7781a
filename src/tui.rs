use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::DefaultTerminal;

use crate::error::Result;
use crate::fmt::won;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_STYLE: Style = Style::new().fg(Color::Rgb(255, 140, 90));

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const WARNING_STYLE: Style = Style::new().fg(Color::Yellow);

pub fn won_span(amount: f64) -> Span<'static> {
    Span::styled(won(amount), AMOUNT_STYLE)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

/// Run `body` on the alternate screen, restoring the terminal afterwards even
/// if `body` panics.
pub fn with_terminal<F>(body: F) -> Result<()>
where
    F: FnOnce(&mut DefaultTerminal) -> Result<()>,
{
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();
    let result = body(&mut terminal);
    drop(terminal);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_counts_lines() {
        let (wrapped, lines) = wrap_text("one two three four five", 9);
        assert_eq!(lines, wrapped.lines().count() as u16);
        assert!(lines >= 3);
        assert_eq!(wrap_text("anything", 0).1, 1);
    }

    #[test]
    fn test_won_span_text() {
        assert_eq!(won_span(1234.0).content, "1,234원");
    }
}

use ansi_to_tui::IntoText;

/// Character appended to truncated text
pub const ELLIPSIS: char = '…';

/// Cut `text` to at most `max_width` characters
///
/// Longer text keeps `max_width - 1` characters followed by an ellipsis.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(max_width - 1).collect();
    truncated.push(ELLIPSIS);
    truncated
}

/// Visible text of the first line of `raw`, ANSI escape sequences removed
pub fn headline(raw: &str) -> String {
    let first = raw.split('\n').next().unwrap_or_default();
    match first.into_text() {
        Ok(text) => text
            .lines
            .first()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .unwrap_or_default(),
        Err(_) => first.to_string(),
    }
}

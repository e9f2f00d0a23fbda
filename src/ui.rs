use ratatui::{prelude::*, widgets::*};

use crate::app::state::NotificationKind;

/// Renders tabs
#[allow(dead_code)] // Prepared for future compact tab rendering
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Color for a notification severity
pub fn notification_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
        NotificationKind::Info => Color::Cyan,
    }
}

/// A labeled editor field line, highlighted when focused
pub fn field_line<'a>(
    label: &'a str,
    value: String,
    is_focused: bool,
    is_editing: bool,
) -> Line<'a> {
    let label_style = if is_focused {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::Gray)
    };
    let value_style = if is_focused && is_editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(format!("{:<14}", label), label_style),
        Span::styled(value, value_style),
    ])
}

/// Terminal column for a cursor byte offset into `text`.
/// Byte offsets land on char boundaries, but columns count chars, so
/// the two diverge on multi-byte input.
pub fn cursor_column(text: &str, byte_offset: usize) -> usize {
    let end = byte_offset.min(text.len());
    text[..end].chars().count()
}

/// Masked rendering for secrets
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        String::from("<empty>")
    } else {
        "*".repeat(value.chars().count())
    }
}

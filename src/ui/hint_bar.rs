use crate::theme::Theme;
use ratatui::{prelude::*, widgets::Paragraph};

const HINTS: &[(&str, &str)] = &[
    ("^O", "Open"),
    ("^S", "Save"),
    ("F12", "Save As"),
    ("^W", "Close tab"),
    ("^D", "Close file"),
    ("^R", "Refresh"),
    ("^L", "Files"),
    ("F5", "Messages/Signals"),
    ("^Q", "Quit"),
];

/// Draw the key hint bar at the top of the screen
pub fn draw(frame: &mut Frame, theme: &Theme, area: Rect) {
    let key_style = Style::default()
        .fg(theme.tab_active_fg)
        .bg(theme.hintbar_bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(theme.fg).bg(theme.hintbar_bg);

    let mut spans: Vec<Span> = Vec::new();
    for (key, label) in HINTS {
        spans.push(Span::styled(format!(" {}", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), text_style));
    }

    // Right-align the app name
    let title = "dbcview ";
    let used: usize = spans.iter().map(|s| s.width()).sum();
    let padding = (area.width as usize).saturating_sub(used + title.len());
    spans.push(Span::styled(" ".repeat(padding), text_style));
    spans.push(Span::styled(title, text_style));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(text_style), area);
}

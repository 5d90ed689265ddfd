use crate::app::App;
use crate::engine::Engine;
use ratatui::{prelude::*, widgets::Paragraph};
use unicode_width::UnicodeWidthStr;

/// Draw the status bar at the bottom of the screen
pub fn draw<E: Engine>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let style = Style::default()
        .fg(app.theme.statusbar_fg)
        .bg(app.theme.statusbar_bg);
    let snapshot = &app.snapshot;

    let mut left_status = match (snapshot.active_view(), &snapshot.active_document) {
        (Some(view), Some(doc)) => format!(
            " {} | nodes: {} | messages: {} | signals: {} | {} view",
            doc.filename,
            doc.nodes.len(),
            doc.message_count(),
            doc.signal_count(),
            view.kind.display_name()
        ),
        _ => " no tab".to_string(),
    };
    if let Some(status) = &app.status {
        left_status.push_str(" | ");
        left_status.push_str(status);
    }

    let right_status = format!(
        " {} file(s) | {} tab(s) ",
        snapshot.files.len(),
        snapshot.tabs.len()
    );

    let total_len = left_status.width() + right_status.width();
    let padding = (area.width as usize).saturating_sub(total_len);

    let full_text = format!("{}{}{}", left_status, " ".repeat(padding), right_status);
    frame.render_widget(Paragraph::new(full_text).style(style), area);
}

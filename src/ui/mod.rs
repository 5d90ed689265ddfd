pub mod dialog;
mod hint_bar;
mod messages;
mod signals;
mod status_bar;
mod tab_bar;

use crate::app::App;
use crate::dbc::FileDocument;
use crate::engine::Engine;
use crate::session::ViewKind;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Number of table rows a document shows in the given view
pub fn row_count(doc: &FileDocument, kind: ViewKind) -> usize {
    match kind {
        ViewKind::Messages => doc.message_count(),
        ViewKind::Signals => doc.signal_count(),
    }
}

/// Draw the entire UI
pub fn draw<E: Engine>(frame: &mut Frame, app: &mut App<E>) {
    let area = frame.area();

    // Check minimum size
    if area.width < 60 || area.height < 12 {
        draw_size_warning(frame, area);
        return;
    }

    let status_height = if app.config.ui.show_status_bar { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Key hints
            Constraint::Length(1),             // Tabs
            Constraint::Min(5),                // Table
            Constraint::Length(status_height), // Status bar
        ])
        .split(area);

    hint_bar::draw(frame, &app.theme, chunks[0]);
    tab_bar::draw(frame, app, chunks[1]);
    draw_body(frame, app, chunks[2]);
    if app.config.ui.show_status_bar {
        status_bar::draw(frame, app, chunks[3]);
    }

    // Dialog goes last so it sits on top
    if let Some(dialog) = &app.dialog {
        dialog::draw_dialog(frame, &app.theme, dialog);
    }
}

fn draw_body<E: Engine>(frame: &mut Frame, app: &mut App<E>, area: Rect) {
    // Borders and the header row
    app.body_height = area.height.saturating_sub(3);

    let snapshot = app.snapshot.clone();
    let (Some(view), Some(doc)) = (snapshot.active_view(), snapshot.active_document.as_ref())
    else {
        draw_welcome(frame, app, area);
        return;
    };

    let selected = app.selected_row();
    match view.kind {
        ViewKind::Messages => messages::draw(frame, &app.theme, area, doc, selected),
        ViewKind::Signals => signals::draw(frame, &app.theme, area, doc, selected),
    }
}

fn draw_welcome<E: Engine>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let text = if app.snapshot.files.is_empty() {
        "No files loaded.\n\nCtrl+O opens a file.".to_string()
    } else {
        format!(
            "{} file(s) loaded, no tab open.\n\nCtrl+L lists them to reopen a view, Ctrl+O opens another.",
            app.snapshot.files.len()
        )
    };
    let welcome = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.muted).bg(app.theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    frame.render_widget(welcome, area);
}

/// Draw a warning when terminal is too small
fn draw_size_warning(frame: &mut Frame, area: Rect) {
    let warning = Paragraph::new("Terminal too small!\nMinimum: 60x12")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("dbcview"));

    frame.render_widget(warning, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dbc::{Message, Signal};
    use crate::engine::memory::MemoryEngine;
    use crate::engine::notification_channel;
    use crate::session::SessionCoordinator;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn screen(app: &mut App<MemoryEngine>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn sample() -> FileDocument {
        let mut doc = FileDocument::new("/can/powertrain.json");
        doc.messages.push(Message {
            id: 0x100,
            name: "EngineData".to_string(),
            dlc: 8,
            signals: vec![Signal {
                name: "EngineSpeed".to_string(),
                length: 16,
                factor: 0.25,
                unit: "rpm".to_string(),
                ..Signal::default()
            }],
            ..Message::default()
        });
        doc
    }

    #[tokio::test]
    async fn test_draws_tabs_and_active_table() {
        let (tx, rx) = notification_channel();
        let engine = Arc::new(MemoryEngine::new(tx));
        let session = SessionCoordinator::new(engine.clone(), rx);
        let mut app = App::new(session, Config::default());

        let empty = screen(&mut app);
        assert!(empty.contains("No files loaded"));

        engine.load(sample());
        app.session.process_pending().await.unwrap().unwrap();
        app.sync_snapshot();
        let text = screen(&mut app);
        assert!(text.contains("powertrain.json"));
        assert!(text.contains("EngineData"));
        assert!(text.contains("0x100"));
        assert_eq!(app.tab_positions.len(), 1);

        app.session.toggle_active_view().unwrap();
        app.sync_snapshot();
        let text = screen(&mut app);
        assert!(text.contains("EngineSpeed"));
        assert!(text.contains("rpm"));
    }

    #[test]
    fn test_row_count() {
        let doc = sample();
        assert_eq!(row_count(&doc, ViewKind::Messages), 1);
        assert_eq!(row_count(&doc, ViewKind::Signals), 1);
    }
}

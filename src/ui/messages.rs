use crate::dbc::{FileDocument, Message};
use crate::theme::Theme;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

/// Identifier in hex; extended (29-bit) identifiers get eight digits
pub fn format_id(id: u32) -> String {
    if id > 0x7FF {
        format!("0x{:08X}", id)
    } else {
        format!("0x{:03X}", id)
    }
}

fn message_row(message: &Message) -> Row<'static> {
    Row::new(vec![
        Cell::from(format_id(message.id)),
        Cell::from(message.name.clone()),
        Cell::from(message.dlc.to_string()),
        Cell::from(message.transmitters.join(", ")),
        Cell::from(message.signals.len().to_string()),
        Cell::from(message.comment.clone()),
    ])
}

/// Draw the messages table of `doc`
pub fn draw(frame: &mut Frame, theme: &Theme, area: Rect, doc: &FileDocument, selected: usize) {
    let header = Row::new(["ID", "Name", "DLC", "Transmitters", "Signals", "Comment"])
        .style(
            Style::default()
                .fg(theme.header_fg)
                .add_modifier(Modifier::BOLD),
        );
    let rows: Vec<Row> = doc.messages.iter().map(message_row).collect();
    let widths = [
        Constraint::Length(10),
        Constraint::Min(16),
        Constraint::Length(3),
        Constraint::Length(18),
        Constraint::Length(7),
        Constraint::Percentage(30),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .style(Style::default().fg(theme.fg).bg(theme.bg))
        .highlight_style(Style::default().bg(theme.row_selected_bg))
        .block(
            Block::default()
                .title(format!(" {} messages ", doc.message_count()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );

    let mut state = TableState::default().with_selected(if doc.messages.is_empty() {
        None
    } else {
        Some(selected)
    });
    frame.render_stateful_widget(table, area, &mut state);
}

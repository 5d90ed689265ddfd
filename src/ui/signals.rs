use super::messages::format_id;
use crate::dbc::{FileDocument, Message, Signal};
use crate::theme::Theme;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

/// Trim float noise: 1.0 -> "1", 0.25 -> "0.25"
fn number(value: f64) -> String {
    let text = format!("{}", value);
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}

fn signal_row(theme: &Theme, message: &Message, signal: &Signal) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!("{} {}", format_id(message.id), message.name))
            .style(Style::default().fg(theme.identifier)),
        Cell::from(signal.name.clone()),
        Cell::from(signal.mux_marker()),
        Cell::from(format!("{}|{}", signal.start_bit, signal.length)),
        Cell::from(signal.endianness.display_name()),
        Cell::from(if signal.is_signed { "-" } else { "+" }),
        Cell::from(format!("({},{})", number(signal.factor), number(signal.offset))),
        Cell::from(format!(
            "[{}|{}]",
            number(signal.minimum),
            number(signal.maximum)
        )),
        Cell::from(signal.unit.clone()),
        Cell::from(signal.receivers.join(", ")),
    ])
}

/// Draw every signal of `doc`, grouped by message
pub fn draw(frame: &mut Frame, theme: &Theme, area: Rect, doc: &FileDocument, selected: usize) {
    let header = Row::new([
        "Message", "Signal", "Mux", "Bits", "Order", "Sign", "Scale", "Range", "Unit",
        "Receivers",
    ])
    .style(
        Style::default()
            .fg(theme.header_fg)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = doc
        .messages
        .iter()
        .flat_map(|m| m.signals.iter().map(move |s| (m, s)))
        .map(|(m, s)| signal_row(theme, m, s))
        .collect();
    let widths = [
        Constraint::Min(16),
        Constraint::Min(14),
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(4),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Min(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .style(Style::default().fg(theme.fg).bg(theme.bg))
        .highlight_style(Style::default().bg(theme.row_selected_bg))
        .block(
            Block::default()
                .title(format!(" {} signals ", doc.signal_count()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );

    let count = doc.signal_count();
    let mut state =
        TableState::default().with_selected(if count == 0 { None } else { Some(selected) });
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number() {
        assert_eq!(number(1.0), "1");
        assert_eq!(number(0.25), "0.25");
        assert_eq!(number(-40.0), "-40");
    }
}

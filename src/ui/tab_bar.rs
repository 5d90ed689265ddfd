use crate::app::App;
use crate::config::TabTitle;
use crate::engine::Engine;
use crate::session::{TabView, ViewKind};
use ratatui::{prelude::*, widgets::Paragraph};
use unicode_width::UnicodeWidthStr;

/// Label shown for one tab
pub fn tab_label(position: usize, view: &TabView, title: TabTitle) -> String {
    let name = match title {
        TabTitle::Name => view.title.as_str(),
        TabTitle::Path => view.filename.as_str(),
    };
    let kind = match view.kind {
        ViewKind::Messages => "M",
        ViewKind::Signals => "S",
    };
    format!(" {}:{} [{}] ", position + 1, name, kind)
}

/// Index of the first tab to draw so the active one fits in `width`
fn first_visible(widths: &[u16], active: Option<usize>, width: u16) -> usize {
    let Some(active) = active else {
        return 0;
    };
    let mut start = 0;
    while start < active && widths[start..=active].iter().sum::<u16>() > width {
        start += 1;
    }
    start
}

/// Draw the tab bar showing open tabs
pub fn draw<E: Engine>(frame: &mut Frame, app: &mut App<E>, area: Rect) {
    let bg_style = Style::default()
        .fg(app.theme.tab_inactive_fg)
        .bg(app.theme.tabbar_bg);
    let active_style = Style::default()
        .fg(app.theme.tab_active_fg)
        .bg(app.theme.tab_active_bg)
        .add_modifier(Modifier::BOLD);
    let inactive_style = Style::default()
        .fg(app.theme.tab_inactive_fg)
        .bg(app.theme.tab_inactive_bg);

    let snapshot = app.snapshot.clone();
    let labels: Vec<String> = snapshot
        .tabs
        .iter()
        .enumerate()
        .map(|(i, view)| tab_label(i, view, app.config.ui.tab_title))
        .collect();
    // +1 for the separator
    let widths: Vec<u16> = labels.iter().map(|l| l.width() as u16 + 1).collect();
    let start = first_visible(&widths, snapshot.active_position(), area.width);

    app.tab_positions.clear();
    app.tab_bar_y = Some(area.y);

    let mut spans: Vec<Span> = Vec::new();
    let mut total_width = 0u16;
    for ((view, label), width) in snapshot
        .tabs
        .iter()
        .zip(labels)
        .zip(widths.iter().copied())
        .skip(start)
    {
        if total_width + width > area.width {
            break;
        }
        let style = if Some(view.id) == snapshot.active_tab {
            active_style
        } else {
            inactive_style
        };
        app.tab_positions.push((
            area.x + total_width,
            area.x + total_width + width - 1,
            view.id,
        ));
        spans.push(Span::styled(label, style));
        spans.push(Span::styled("│", bg_style));
        total_width += width;
    }

    let remaining = area.width.saturating_sub(total_width);
    if remaining > 0 {
        spans.push(Span::styled(" ".repeat(remaining as usize), bg_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TabId;

    fn view(filename: &str, title: &str) -> TabView {
        TabView {
            id: TabId::from_raw(1),
            filename: filename.to_string(),
            title: title.to_string(),
            kind: ViewKind::Messages,
            message_count: 0,
        }
    }

    #[test]
    fn test_tab_label() {
        let v = view("/can/bus1.json", "bus1.json");
        assert_eq!(tab_label(0, &v, TabTitle::Name), " 1:bus1.json [M] ");
        assert_eq!(tab_label(2, &v, TabTitle::Path), " 3:/can/bus1.json [M] ");
    }

    #[test]
    fn test_active_tab_scrolls_into_view() {
        let widths = [10, 10, 10, 10];
        assert_eq!(first_visible(&widths, None, 25), 0);
        assert_eq!(first_visible(&widths, Some(1), 25), 0);
        assert_eq!(first_visible(&widths, Some(3), 25), 2);
        assert_eq!(first_visible(&widths, Some(3), 5), 3);
    }
}

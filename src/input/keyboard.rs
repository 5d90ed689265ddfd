use super::AppEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Maps keyboard events to application events
pub fn map_key_event(key: KeyEvent) -> Option<AppEvent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        // Quit: Ctrl+Q
        KeyCode::Char('q') if ctrl && !shift => Some(AppEvent::Quit),

        // File operations
        KeyCode::Char('o') if ctrl && !shift => Some(AppEvent::OpenFile),
        KeyCode::Char('s') if ctrl && !shift => Some(AppEvent::Save),
        KeyCode::Char('s') | KeyCode::Char('S') if ctrl && shift => Some(AppEvent::SaveAs),
        KeyCode::F(12) => Some(AppEvent::SaveAs),
        KeyCode::Char('w') if ctrl && !shift => Some(AppEvent::CloseTab),
        KeyCode::Char('d') if ctrl && !shift => Some(AppEvent::RemoveFile),
        KeyCode::Char('r') if ctrl && !shift => Some(AppEvent::Refresh),
        KeyCode::Char('l') if ctrl && !shift => Some(AppEvent::ShowFiles),

        // Tabs
        KeyCode::PageDown if ctrl => Some(AppEvent::NextTab),
        KeyCode::PageUp if ctrl => Some(AppEvent::PreviousTab),
        KeyCode::Char(c @ '1'..='9') if alt => c.to_digit(10).map(|d| AppEvent::GoToTab(d as u8)),
        KeyCode::F(5) => Some(AppEvent::ToggleView),

        // Rows
        KeyCode::Up if !ctrl && !alt => Some(AppEvent::SelectUp),
        KeyCode::Down if !ctrl && !alt => Some(AppEvent::SelectDown),
        KeyCode::PageUp => Some(AppEvent::PageUp),
        KeyCode::PageDown => Some(AppEvent::PageDown),
        KeyCode::Home => Some(AppEvent::SelectFirst),
        KeyCode::End => Some(AppEvent::SelectLast),

        _ => None,
    }
}

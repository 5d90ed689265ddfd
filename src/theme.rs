use ratatui::style::Color;

/// Color theme for the application
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color for the main UI
    pub bg: Color,
    /// Foreground (text) color
    pub fg: Color,
    /// Dimmed text (hints, help lines, empty cells)
    pub muted: Color,
    /// Background for dialogs
    pub panel_bg: Color,
    /// Background for the key hint bar
    pub hintbar_bg: Color,
    /// Background for the status bar
    pub statusbar_bg: Color,
    /// Foreground for the status bar
    pub statusbar_fg: Color,
    /// Background for the tab bar
    pub tabbar_bg: Color,
    /// Active tab background
    pub tab_active_bg: Color,
    /// Active tab foreground
    pub tab_active_fg: Color,
    /// Inactive tab background
    pub tab_inactive_bg: Color,
    /// Inactive tab foreground
    pub tab_inactive_fg: Color,
    /// Border color
    pub border: Color,
    /// Border color for focused widgets
    pub border_focused: Color,
    /// Table header text
    pub header_fg: Color,
    /// Selected table row
    pub row_selected_bg: Color,
    /// Message identifiers in tables
    pub identifier: Color,
    /// Directory color in file browsers
    pub dir: Color,
    /// File color in file browsers
    pub file: Color,
    /// Error dialog accent
    pub error: Color,
}

impl Theme {
    /// Dark theme
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(30, 30, 30),
            fg: Color::Rgb(212, 212, 212),
            muted: Color::Rgb(133, 133, 133),
            panel_bg: Color::Rgb(37, 37, 38),
            hintbar_bg: Color::Rgb(60, 60, 60),
            statusbar_bg: Color::Rgb(0, 122, 204),
            statusbar_fg: Color::Rgb(255, 255, 255),
            tabbar_bg: Color::Rgb(45, 45, 45),
            tab_active_bg: Color::Rgb(30, 30, 30),
            tab_active_fg: Color::Rgb(255, 255, 255),
            tab_inactive_bg: Color::Rgb(45, 45, 45),
            tab_inactive_fg: Color::Rgb(150, 150, 150),
            border: Color::Rgb(60, 60, 60),
            border_focused: Color::Rgb(0, 122, 204),
            header_fg: Color::Rgb(220, 220, 170),
            row_selected_bg: Color::Rgb(38, 79, 120),
            identifier: Color::Rgb(181, 206, 168),
            dir: Color::Rgb(220, 220, 170),
            file: Color::Rgb(212, 212, 212),
            error: Color::Rgb(244, 71, 71),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

use crate::config::BrowserConfig;
use crate::dbc::FileSummary;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

/// Represents an active dialog
#[derive(Debug, Clone)]
pub enum Dialog {
    /// File open dialog
    FileOpen(FileOpenDialog),
    /// Save-as dialog for the active document
    FileSaveAs(FileSaveAsDialog),
    /// Files the session has loaded
    LoadedFiles(LoadedFilesDialog),
    /// Message/alert dialog
    Message(MessageDialog),
}

/// What a key press inside a dialog asks the app to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResult {
    /// Keep the dialog open
    Pending,
    Cancel,
    Open(PathBuf),
    SaveAs(PathBuf),
    /// Open a new tab onto a loaded file
    OpenView(String),
    /// Close a loaded file and its tabs
    RemoveFile(String),
}

/// A directory entry for the file browser
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Directory browser shared by the open and save-as dialogs.
///
/// Lists subdirectories first, then files whose extension the browser
/// config accepts, both sorted case-insensitively.
#[derive(Debug, Clone)]
pub struct DirListing {
    pub current_dir: PathBuf,
    pub entries: Vec<DirEntry>,
    pub selected: usize,
    filter: BrowserConfig,
}

impl DirListing {
    pub fn new(start_dir: PathBuf, filter: &BrowserConfig) -> Self {
        let mut listing = Self {
            current_dir: start_dir,
            entries: Vec::new(),
            selected: 0,
            filter: filter.clone(),
        };
        listing.refresh_entries();
        listing
    }

    /// Re-read the current directory
    pub fn refresh_entries(&mut self) {
        self.entries.clear();

        if let Some(parent) = self.current_dir.parent() {
            self.entries.push(DirEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
            });
        }

        match std::fs::read_dir(&self.current_dir) {
            Ok(read_dir) => {
                let mut dirs: Vec<DirEntry> = Vec::new();
                let mut files: Vec<DirEntry> = Vec::new();

                for entry in read_dir.filter_map(|e| e.ok()) {
                    let path = entry.path();
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if name.starts_with('.') && !self.filter.show_hidden {
                        continue;
                    }

                    let is_dir = path.is_dir();
                    if is_dir {
                        dirs.push(DirEntry { name, path, is_dir });
                    } else if self.filter.accepts(&path) {
                        files.push(DirEntry { name, path, is_dir });
                    }
                }

                dirs.sort_by_key(|e| e.name.to_lowercase());
                files.sort_by_key(|e| e.name.to_lowercase());
                self.entries.extend(dirs);
                self.entries.extend(files);
            }
            Err(e) => log::warn!("Cannot list {}: {}", self.current_dir.display(), e),
        }

        self.selected = 0;
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn page_up(&mut self, amount: usize) {
        self.selected = self.selected.saturating_sub(amount);
    }

    pub fn page_down(&mut self, amount: usize) {
        self.selected = (self.selected + amount).min(self.entries.len().saturating_sub(1));
    }

    /// Enter the selected directory, or return the selected file
    pub fn enter_selected(&mut self) -> Option<PathBuf> {
        let entry = self.entries.get(self.selected)?;
        if entry.is_dir {
            self.current_dir = entry.path.clone();
            self.refresh_entries();
            None
        } else {
            Some(entry.path.clone())
        }
    }

    pub fn go_up(&mut self) {
        if let Some(parent) = self.current_dir.parent() {
            self.current_dir = parent.to_path_buf();
            self.refresh_entries();
        }
    }

    fn handle_nav_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::PageUp => self.page_up(10),
            KeyCode::PageDown => self.page_down(10),
            KeyCode::Backspace => self.go_up(),
            _ => {}
        }
    }
}

/// File open dialog state
#[derive(Debug, Clone)]
pub struct FileOpenDialog {
    pub listing: DirListing,
    /// Text input for a typed path
    pub input: String,
    /// Whether input field is focused (vs file list)
    pub input_focused: bool,
}

impl FileOpenDialog {
    pub fn new(start_dir: PathBuf, browser: &BrowserConfig) -> Self {
        Self {
            listing: DirListing::new(start_dir, browser),
            input: String::new(),
            input_focused: false,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.input_focused = !self.input_focused;
        if self.input_focused && self.input.is_empty() {
            self.input = self.listing.current_dir.to_string_lossy().into_owned();
        }
    }

    /// Navigate to the typed path, or return it if it names a file
    pub fn navigate_to_input(&mut self) -> Option<PathBuf> {
        let path = PathBuf::from(self.input.trim());
        if path.is_dir() {
            self.listing.current_dir = path;
            self.listing.refresh_entries();
            self.input_focused = false;
            None
        } else if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogResult {
        match key.code {
            KeyCode::Esc => return DialogResult::Cancel,
            KeyCode::Tab => self.toggle_focus(),
            KeyCode::Enter => {
                let picked = if self.input_focused {
                    self.navigate_to_input()
                } else {
                    self.listing.enter_selected()
                };
                if let Some(path) = picked {
                    return DialogResult::Open(path);
                }
            }
            KeyCode::Backspace if self.input_focused => {
                self.input.pop();
            }
            KeyCode::Char(c) if self.input_focused => self.input.push(c),
            code if !self.input_focused => self.listing.handle_nav_key(code),
            _ => {}
        }
        DialogResult::Pending
    }
}

/// Save-as dialog state
#[derive(Debug, Clone)]
pub struct FileSaveAsDialog {
    pub listing: DirListing,
    /// Filename input
    pub filename: String,
    /// Whether the file list has focus (vs the filename field)
    pub list_focused: bool,
}

impl FileSaveAsDialog {
    pub fn new(start_dir: PathBuf, initial_filename: String, browser: &BrowserConfig) -> Self {
        Self {
            listing: DirListing::new(start_dir, browser),
            filename: initial_filename,
            list_focused: false,
        }
    }

    /// Start in the directory of `filename`, suggesting its final component
    pub fn for_document(filename: &str, fallback_dir: &Path, browser: &BrowserConfig) -> Self {
        let path = Path::new(filename);
        let dir = path
            .parent()
            .filter(|p| p.is_dir())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| fallback_dir.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(dir, name, browser)
    }

    pub fn save_path(&self) -> PathBuf {
        self.listing.current_dir.join(self.filename.trim())
    }

    pub fn is_valid(&self) -> bool {
        !self.filename.trim().is_empty()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogResult {
        match key.code {
            KeyCode::Esc => return DialogResult::Cancel,
            KeyCode::Tab => self.list_focused = !self.list_focused,
            KeyCode::Enter if self.list_focused => {
                if let Some(file) = self.listing.enter_selected() {
                    if let Some(name) = file.file_name() {
                        self.filename = name.to_string_lossy().into_owned();
                    }
                    self.list_focused = false;
                }
            }
            KeyCode::Enter => {
                if self.is_valid() {
                    return DialogResult::SaveAs(self.save_path());
                }
            }
            KeyCode::Backspace if !self.list_focused => {
                self.filename.pop();
            }
            KeyCode::Char(c) if !self.list_focused => self.filename.push(c),
            code if self.list_focused => self.listing.handle_nav_key(code),
            _ => {}
        }
        DialogResult::Pending
    }
}

/// Picker over the files the session has loaded, in registry order
#[derive(Debug, Clone)]
pub struct LoadedFilesDialog {
    pub files: Vec<FileSummary>,
    pub selected: usize,
}

impl LoadedFilesDialog {
    pub fn new(files: &[FileSummary]) -> Self {
        Self {
            files: files.to_vec(),
            selected: 0,
        }
    }

    fn selected_filename(&self) -> Option<String> {
        self.files.get(self.selected).map(|f| f.filename.clone())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogResult {
        match key.code {
            KeyCode::Esc => return DialogResult::Cancel,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.files.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.files.len().saturating_sub(1),
            KeyCode::Enter => {
                if let Some(filename) = self.selected_filename() {
                    return DialogResult::OpenView(filename);
                }
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                if let Some(filename) = self.selected_filename() {
                    return DialogResult::RemoveFile(filename);
                }
            }
            _ => {}
        }
        DialogResult::Pending
    }
}

/// Simple message dialog
#[derive(Debug, Clone)]
pub struct MessageDialog {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl MessageDialog {
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: true,
        }
    }
}

/// Rect of `percent_x` by `percent_y` centered in `area`
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn focus_border(theme: &Theme, focused: bool) -> Style {
    if focused {
        Style::default().fg(theme.border_focused)
    } else {
        Style::default().fg(theme.border)
    }
}

/// Frame a browser dialog and split it into input, list and help rows
fn browser_frame(frame: &mut Frame, theme: &Theme, title: &str) -> [Rect; 3] {
    let dialog_area = centered(frame.area(), 60, 70);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.panel_bg));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);
    [chunks[0], chunks[1], chunks[2]]
}

fn draw_input(frame: &mut Frame, theme: &Theme, area: Rect, title: &str, text: &str, focused: bool) {
    let text = if focused {
        format!("{}▏", text)
    } else {
        text.to_string()
    };
    let fg = if focused { theme.fg } else { theme.muted };
    let input = Paragraph::new(text)
        .style(Style::default().fg(fg).bg(theme.bg))
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(focus_border(theme, focused)),
        );
    frame.render_widget(input, area);
}

fn draw_listing(frame: &mut Frame, theme: &Theme, area: Rect, listing: &DirListing, focused: bool) {
    let items: Vec<ListItem> = listing
        .entries
        .iter()
        .map(|entry| {
            if entry.is_dir {
                ListItem::new(format!("{}/", entry.name)).style(Style::default().fg(theme.dir))
            } else {
                ListItem::new(entry.name.clone()).style(Style::default().fg(theme.file))
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" {} ", listing.current_dir.display()))
                .borders(Borders::ALL)
                .border_style(focus_border(theme, focused)),
        )
        .highlight_style(if focused {
            Style::default().fg(theme.tab_active_fg).bg(theme.row_selected_bg)
        } else {
            Style::default()
        });

    let mut state = ListState::default().with_selected(Some(listing.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_help(frame: &mut Frame, theme: &Theme, area: Rect, text: &str) {
    let help = Paragraph::new(text)
        .style(Style::default().fg(theme.muted))
        .alignment(Alignment::Center);
    frame.render_widget(help, area);
}

pub fn draw_file_open_dialog(frame: &mut Frame, theme: &Theme, dialog: &FileOpenDialog) {
    let [input, list, help] = browser_frame(frame, theme, "Open File");
    let path_text = if dialog.input_focused {
        dialog.input.clone()
    } else {
        dialog.listing.current_dir.to_string_lossy().into_owned()
    };
    draw_input(frame, theme, input, "Path", &path_text, dialog.input_focused);
    draw_listing(frame, theme, list, &dialog.listing, !dialog.input_focused);
    draw_help(
        frame,
        theme,
        help,
        "↑↓:Navigate  Enter:Open  Tab:Switch focus  Backspace:Go up  Esc:Cancel",
    );
}

pub fn draw_file_save_as_dialog(frame: &mut Frame, theme: &Theme, dialog: &FileSaveAsDialog) {
    let [input, list, help] = browser_frame(frame, theme, "Save As");
    draw_input(frame, theme, input, "Filename", &dialog.filename, !dialog.list_focused);
    draw_listing(frame, theme, list, &dialog.listing, dialog.list_focused);
    draw_help(
        frame,
        theme,
        help,
        "Tab:Switch focus  Enter:Save/Select  ↑↓:Navigate  Backspace:Go up  Esc:Cancel",
    );
}

pub fn draw_loaded_files_dialog(frame: &mut Frame, theme: &Theme, dialog: &LoadedFilesDialog) {
    let area = centered(frame.area(), 60, 60);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Loaded Files ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.panel_bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = dialog
        .files
        .iter()
        .map(|f| {
            ListItem::new(Line::from(vec![
                Span::styled(f.title.clone(), Style::default().fg(theme.file)),
                Span::styled(
                    format!("  {} messages  {}", f.message_count, f.filename),
                    Style::default().fg(theme.muted),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().fg(theme.tab_active_fg).bg(theme.row_selected_bg));
    let mut state = ListState::default().with_selected(Some(dialog.selected));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    draw_help(
        frame,
        theme,
        chunks[1],
        "↑↓:Navigate  Enter:Open view  Del:Close file  Esc:Cancel",
    );
}

pub fn draw_message_dialog(frame: &mut Frame, theme: &Theme, dialog: &MessageDialog) {
    let area = frame.area();

    let max_width = area.width.saturating_sub(4).max(1);
    let width = (dialog.message.width() as u16 + 6).clamp(30.min(max_width), max_width);
    let text_width = width.saturating_sub(2).max(1);
    let lines = (dialog.message.width() as u16).div_ceil(text_width).max(1);
    let height = (lines + 4).min(area.height);
    let dialog_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, dialog_area);

    let accent = if dialog.is_error {
        theme.error
    } else {
        theme.border_focused
    };
    let block = Block::default()
        .title(format!(" {} ", dialog.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .style(Style::default().bg(theme.panel_bg));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let message = Paragraph::new(dialog.message.as_str())
        .style(Style::default().fg(theme.fg))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(message, inner);
}

/// Draw the active dialog (if any)
pub fn draw_dialog(frame: &mut Frame, theme: &Theme, dialog: &Dialog) {
    match dialog {
        Dialog::FileOpen(d) => draw_file_open_dialog(frame, theme, d),
        Dialog::FileSaveAs(d) => draw_file_save_as_dialog(frame, theme, d),
        Dialog::LoadedFiles(d) => draw_loaded_files_dialog(frame, theme, d),
        Dialog::Message(d) => draw_message_dialog(frame, theme, d),
    }
}

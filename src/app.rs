use crate::config::Config;
use crate::engine::Engine;
use crate::input::{map_key_event, map_mouse_event, AppEvent, MouseAction};
use crate::session::{SessionCoordinator, SessionError, SessionSnapshot, TabId};
use crate::theme::Theme;
use crate::ui::dialog::{
    Dialog, DialogResult, FileOpenDialog, FileSaveAsDialog, LoadedFilesDialog, MessageDialog,
};
use crate::ui::{self, row_count};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Rows moved by PgUp/PgDn when the body height is not known yet
const DEFAULT_PAGE: usize = 10;

/// What woke the run loop
enum Wake {
    Notified(Option<usize>),
    Tick,
}

/// The main application state
pub struct App<E: Engine> {
    /// Whether the application should quit
    pub should_quit: bool,
    pub session: SessionCoordinator<E>,
    /// Latest snapshot; the UI draws from this only
    pub snapshot: Arc<SessionSnapshot>,
    snapshots: watch::Receiver<Arc<SessionSnapshot>>,
    notifications_open: bool,
    pub config: Config,
    /// The color theme
    pub theme: Theme,
    /// Directory dialogs start in when nothing better is known
    pub cwd: PathBuf,
    /// Active dialog (if any)
    pub dialog: Option<Dialog>,
    /// Selected table row per tab
    pub rows: HashMap<TabId, usize>,
    /// One-line feedback shown in the status bar
    pub status: Option<String>,
    /// Tab label positions for click detection (start_x, end_x, tab)
    pub tab_positions: Vec<(u16, u16, TabId)>,
    /// Row of the tab bar on screen
    pub tab_bar_y: Option<u16>,
    /// Visible table rows in the last drawn frame
    pub body_height: u16,
}

impl<E: Engine> App<E> {
    pub fn new(session: SessionCoordinator<E>, config: Config) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let snapshots = session.subscribe();
        let snapshot = session.snapshot();
        Self {
            should_quit: false,
            session,
            snapshot,
            snapshots,
            notifications_open: true,
            config,
            theme: Theme::dark(),
            cwd,
            dialog: None,
            rows: HashMap::new(),
            status: None,
            tab_positions: Vec::new(),
            tab_bar_y: None,
            body_height: 0,
        }
    }

    /// Run the main application loop
    pub async fn run(&mut self, terminal: &mut ratatui::Terminal<impl Backend>) -> Result<()> {
        let tick = Duration::from_millis(self.config.ui.tick_ms.max(1));

        while !self.should_quit {
            self.sync_snapshot();
            terminal.draw(|frame| ui::draw(frame, self))?;

            let wake = tokio::select! {
                batch = self.session.wait_for_notifications(), if self.notifications_open => {
                    Wake::Notified(batch)
                }
                _ = tokio::time::sleep(tick) => Wake::Tick,
            };
            match wake {
                Wake::Notified(Some(batch)) => {
                    let result = self.session.on_files_loaded(batch).await;
                    self.report(result.map(|_| ()));
                }
                Wake::Notified(None) => {
                    log::warn!("Engine notification channel closed");
                    self.notifications_open = false;
                }
                Wake::Tick => {}
            }

            while event::poll(Duration::ZERO)? {
                let event = event::read()?;
                self.handle_event(event).await;
            }
        }

        Ok(())
    }

    /// Pick up the latest published snapshot
    pub fn sync_snapshot(&mut self) {
        self.snapshot = self.snapshots.borrow_and_update().clone();
        let live: Vec<TabId> = self.snapshot.tabs.iter().map(|t| t.id).collect();
        self.rows.retain(|id, _| live.contains(id));
    }

    /// Ask the engine to load each path; failures are collected into one dialog
    pub async fn open_paths(&mut self, paths: Vec<PathBuf>) {
        let mut failures = Vec::new();
        for path in paths {
            if let Err(e) = self.session.request_open(path.clone()).await {
                failures.push(format!("{}: {}", path.display(), e));
            }
        }
        if !failures.is_empty() {
            self.show_error("Open failed", failures.join("; "));
        }
    }

    pub fn show_error(&mut self, title: &str, message: impl Into<String>) {
        self.dialog = Some(Dialog::Message(MessageDialog::error(title, message)));
    }

    fn report(&mut self, result: std::result::Result<(), SessionError>) {
        if let Err(e) = result {
            self.show_error("Error", e.to_string());
        }
    }

    /// Selected row of the active table, clamped to its length
    pub fn selected_row(&self) -> usize {
        let Some(view) = self.snapshot.active_view() else {
            return 0;
        };
        let count = self
            .snapshot
            .active_document
            .as_ref()
            .map(|doc| row_count(doc, view.kind))
            .unwrap_or(0);
        let row = self.rows.get(&view.id).copied().unwrap_or(0);
        row.min(count.saturating_sub(1))
    }

    fn move_selection(&mut self, delta: isize) {
        let Some(id) = self.snapshot.active_tab else {
            return;
        };
        let current = self.selected_row() as isize;
        let row = (current + delta).max(0) as usize;
        self.rows.insert(id, row);
        // Clamp against the table length
        let clamped = self.selected_row();
        self.rows.insert(id, clamped);
    }

    fn page(&self) -> isize {
        if self.body_height > 0 {
            self.body_height as isize
        } else {
            DEFAULT_PAGE as isize
        }
    }

    fn show_open_dialog(&mut self) {
        let start_dir = self
            .config
            .browser
            .start_dir
            .clone()
            .unwrap_or_else(|| self.cwd.clone());
        self.dialog = Some(Dialog::FileOpen(FileOpenDialog::new(
            start_dir,
            &self.config.browser,
        )));
    }

    fn show_save_as_dialog(&mut self) {
        match self.snapshot.active_view() {
            Some(view) => {
                let dialog =
                    FileSaveAsDialog::for_document(&view.filename, &self.cwd, &self.config.browser);
                self.dialog = Some(Dialog::FileSaveAs(dialog));
            }
            None => self.show_error("Save As", SessionError::NoActiveTab.to_string()),
        }
    }

    /// Handle an input event
    pub async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                self.handle_key_event(key).await
            }
            Event::Mouse(mouse) => {
                if let Some(action) = map_mouse_event(mouse) {
                    self.handle_mouse_action(action);
                }
            }
            _ => {}
        }
        self.sync_snapshot();
    }

    async fn handle_key_event(&mut self, key: KeyEvent) {
        if self.dialog.is_some() {
            return self.handle_dialog_key(key).await;
        }
        if let Some(event) = map_key_event(key) {
            self.handle_app_event(event).await;
        }
    }

    async fn handle_dialog_key(&mut self, key: KeyEvent) {
        let result = match &mut self.dialog {
            Some(Dialog::FileOpen(d)) => d.handle_key(key),
            Some(Dialog::FileSaveAs(d)) => d.handle_key(key),
            Some(Dialog::LoadedFiles(d)) => d.handle_key(key),
            // Any key closes a message
            Some(Dialog::Message(_)) => DialogResult::Cancel,
            None => return,
        };

        match result {
            DialogResult::Pending => {}
            DialogResult::Cancel => self.dialog = None,
            DialogResult::Open(path) => {
                self.dialog = None;
                self.open_paths(vec![path]).await;
            }
            DialogResult::SaveAs(path) => {
                self.dialog = None;
                match self.session.save_active_as(&path).await {
                    Ok(_) => self.status = Some(format!("Saved copy to {}", path.display())),
                    Err(e) => self.show_error("Save As failed", e.to_string()),
                }
            }
            DialogResult::OpenView(filename) => {
                self.dialog = None;
                let result = self.session.open_view(&filename);
                self.report(result.map(|_| ()));
            }
            DialogResult::RemoveFile(filename) => {
                self.dialog = None;
                self.remove_file(&filename).await;
            }
        }
    }

    async fn remove_file(&mut self, filename: &str) {
        match self.session.remove_file(filename).await {
            Ok(_) => self.status = Some(format!("Closed {}", filename)),
            Err(e) => self.show_error("Close failed", e.to_string()),
        }
    }

    /// Execute one command
    pub async fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => self.should_quit = true,
            AppEvent::OpenFile => self.show_open_dialog(),
            AppEvent::Save => match self.session.save_active().await {
                Ok(filename) => self.status = Some(format!("Saved {}", filename)),
                Err(e) => self.show_error("Save failed", e.to_string()),
            },
            AppEvent::SaveAs => self.show_save_as_dialog(),
            AppEvent::CloseTab => {
                if let Some(id) = self.snapshot.active_tab {
                    self.session.close_tab(id);
                }
            }
            AppEvent::RemoveFile => match self.snapshot.active_view().map(|v| v.filename.clone()) {
                Some(filename) => self.remove_file(&filename).await,
                None => self.show_error("Close file", SessionError::NoActiveTab.to_string()),
            },
            AppEvent::Refresh => {
                let result = self.session.refresh().await;
                self.report(result.map(|_| ()));
            }
            AppEvent::ShowFiles => {
                if self.snapshot.files.is_empty() {
                    self.status = Some("No files loaded".to_string());
                } else {
                    let dialog = LoadedFilesDialog::new(&self.snapshot.files);
                    self.dialog = Some(Dialog::LoadedFiles(dialog));
                }
            }
            AppEvent::NextTab => {
                self.session.next_tab();
            }
            AppEvent::PreviousTab => {
                self.session.prev_tab();
            }
            AppEvent::GoToTab(n) => match self.session.select_tab_at(n as usize) {
                // Positions past the last tab are ignored
                Ok(_) | Err(SessionError::NoTabAt(_)) => {}
                Err(e) => self.show_error("Error", e.to_string()),
            },
            AppEvent::ToggleView => {
                if let Ok(kind) = self.session.toggle_active_view() {
                    if let Some(id) = self.snapshot.active_tab {
                        self.rows.remove(&id);
                    }
                    self.status = Some(format!("Showing {}", kind.display_name()));
                }
            }
            AppEvent::SelectUp => self.move_selection(-1),
            AppEvent::SelectDown => self.move_selection(1),
            AppEvent::PageUp => self.move_selection(-self.page()),
            AppEvent::PageDown => self.move_selection(self.page()),
            AppEvent::SelectFirst => self.move_selection(isize::MIN / 2),
            AppEvent::SelectLast => self.move_selection(isize::MAX / 2),
        }
        self.sync_snapshot();
    }

    fn tab_at(&self, x: u16, y: u16) -> Option<TabId> {
        if self.tab_bar_y != Some(y) {
            return None;
        }
        self.tab_positions
            .iter()
            .find(|(start, end, _)| x >= *start && x < *end)
            .map(|(_, _, id)| *id)
    }

    fn handle_mouse_action(&mut self, action: MouseAction) {
        if self.dialog.is_some() {
            return;
        }
        match action {
            MouseAction::Click { x, y } => {
                if let Some(id) = self.tab_at(x, y) {
                    let result = self.session.select_tab(id);
                    self.report(result);
                }
            }
            MouseAction::MiddleClick { x, y } => {
                if let Some(id) = self.tab_at(x, y) {
                    self.session.close_tab(id);
                }
            }
            MouseAction::ScrollUp { amount } => self.move_selection(-(amount as isize)),
            MouseAction::ScrollDown { amount } => self.move_selection(amount as isize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::{FileDocument, Message};
    use crate::engine::memory::{MemoryEngine, Op};
    use crate::engine::notification_channel;
    use crate::session::ViewKind;

    fn app() -> (Arc<MemoryEngine>, App<MemoryEngine>) {
        let (tx, rx) = notification_channel();
        let engine = Arc::new(MemoryEngine::new(tx));
        let session = SessionCoordinator::new(engine.clone(), rx);
        (engine, App::new(session, Config::default()))
    }

    fn doc(name: &str, messages: usize) -> FileDocument {
        let mut doc = FileDocument::new(name);
        doc.messages = (0..messages)
            .map(|i| Message {
                id: i as u32,
                name: format!("MSG_{i}"),
                ..Message::default()
            })
            .collect();
        doc
    }

    async fn load(engine: &MemoryEngine, app: &mut App<MemoryEngine>, doc: FileDocument) {
        engine.load(doc);
        app.session.process_pending().await.unwrap().unwrap();
        app.sync_snapshot();
    }

    fn error_message(app: &App<MemoryEngine>) -> Option<&str> {
        match &app.dialog {
            Some(Dialog::Message(m)) => Some(m.message.as_str()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_save_without_tab_shows_error() {
        let (engine, mut app) = app();

        app.handle_app_event(AppEvent::Save).await;

        assert_eq!(error_message(&app), Some("no active tab"));
        assert!(engine.saved().is_empty());
    }

    #[tokio::test]
    async fn test_open_failure_shows_error() {
        let (engine, mut app) = app();
        engine.fail(Op::Parse);

        app.open_paths(vec![PathBuf::from("missing.json")]).await;

        assert!(error_message(&app).unwrap().contains("missing.json"));
    }

    #[tokio::test]
    async fn test_commands_flow_through_session() {
        let (engine, mut app) = app();
        load(&engine, &mut app, doc("a.json", 3)).await;
        load(&engine, &mut app, doc("b.json", 1)).await;

        app.handle_app_event(AppEvent::GoToTab(1)).await;
        assert_eq!(app.snapshot.active_view().unwrap().filename, "a.json");

        app.handle_app_event(AppEvent::Save).await;
        assert_eq!(engine.saved(), vec!["a.json"]);
        assert_eq!(app.status.as_deref(), Some("Saved a.json"));

        app.handle_app_event(AppEvent::ToggleView).await;
        assert_eq!(app.snapshot.active_view().unwrap().kind, ViewKind::Signals);

        app.handle_app_event(AppEvent::RemoveFile).await;
        assert_eq!(app.snapshot.tabs.len(), 1);
        assert_eq!(app.snapshot.active_view().unwrap().filename, "b.json");
        assert_eq!(engine.closed(), vec!["a.json"]);

        app.handle_app_event(AppEvent::CloseTab).await;
        assert!(app.snapshot.tabs.is_empty());
        assert_eq!(app.snapshot.files.len(), 1);
    }

    #[tokio::test]
    async fn test_go_to_missing_tab_is_ignored() {
        let (engine, mut app) = app();
        load(&engine, &mut app, doc("a.json", 0)).await;

        app.handle_app_event(AppEvent::GoToTab(9)).await;

        assert!(app.dialog.is_none());
        assert_eq!(app.snapshot.active_view().unwrap().filename, "a.json");
    }

    #[tokio::test]
    async fn test_row_selection_is_clamped_per_tab() {
        let (engine, mut app) = app();
        load(&engine, &mut app, doc("a.json", 3)).await;

        app.handle_app_event(AppEvent::SelectDown).await;
        app.handle_app_event(AppEvent::SelectDown).await;
        app.handle_app_event(AppEvent::SelectDown).await;
        assert_eq!(app.selected_row(), 2);

        app.handle_app_event(AppEvent::SelectFirst).await;
        assert_eq!(app.selected_row(), 0);

        load(&engine, &mut app, doc("b.json", 5)).await;
        assert_eq!(app.selected_row(), 0);
        app.handle_app_event(AppEvent::SelectLast).await;
        assert_eq!(app.selected_row(), 4);
    }

    #[tokio::test]
    async fn test_message_dialog_closes_on_any_key() {
        let (_engine, mut app) = app();
        app.show_error("Error", "boom");

        app.handle_event(Event::Key(KeyEvent::from(crossterm::event::KeyCode::Enter)))
            .await;

        assert!(app.dialog.is_none());
    }

    #[tokio::test]
    async fn test_save_as_dialog_requires_active_tab() {
        let (engine, mut app) = app();
        app.handle_app_event(AppEvent::SaveAs).await;
        assert!(matches!(app.dialog, Some(Dialog::Message(_))));

        app.dialog = None;
        load(&engine, &mut app, doc("a.json", 0)).await;
        app.handle_app_event(AppEvent::SaveAs).await;
        match &app.dialog {
            Some(Dialog::FileSaveAs(d)) => assert_eq!(d.filename, "a.json"),
            other => panic!("expected save-as dialog, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_loaded_files_dialog_reopens_closed_view() {
        let (engine, mut app) = app();
        load(&engine, &mut app, doc("a.json", 2)).await;
        load(&engine, &mut app, doc("b.json", 0)).await;
        app.handle_app_event(AppEvent::CloseTab).await;
        app.handle_app_event(AppEvent::CloseTab).await;
        assert!(app.snapshot.tabs.is_empty());

        app.handle_app_event(AppEvent::ShowFiles).await;
        assert!(matches!(app.dialog, Some(Dialog::LoadedFiles(_))));
        app.handle_event(Event::Key(KeyEvent::from(crossterm::event::KeyCode::Enter)))
            .await;

        assert!(app.dialog.is_none());
        assert_eq!(app.snapshot.tabs.len(), 1);
        assert_eq!(app.snapshot.active_view().unwrap().filename, "a.json");
    }

    #[tokio::test]
    async fn test_loaded_files_dialog_closes_file() {
        let (engine, mut app) = app();
        load(&engine, &mut app, doc("a.json", 0)).await;
        load(&engine, &mut app, doc("b.json", 0)).await;

        app.handle_app_event(AppEvent::ShowFiles).await;
        app.handle_event(Event::Key(KeyEvent::from(crossterm::event::KeyCode::Delete)))
            .await;

        assert_eq!(engine.closed(), vec!["a.json"]);
        assert_eq!(app.snapshot.files.len(), 1);
        assert_eq!(app.snapshot.tabs.len(), 1);
        assert_eq!(app.status.as_deref(), Some("Closed a.json"));
    }

    #[tokio::test]
    async fn test_show_files_without_files() {
        let (_engine, mut app) = app();
        app.handle_app_event(AppEvent::ShowFiles).await;
        assert!(app.dialog.is_none());
        assert_eq!(app.status.as_deref(), Some("No files loaded"));
    }
}

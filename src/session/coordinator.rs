use super::bridge::{EventBridge, Reconciled};
use super::error::{Result, SessionError};
use super::registry::FileRegistry;
use super::snapshot::SessionSnapshot;
use super::tabs::{TabId, TabSet, ViewKind};
use crate::dbc::FileDocument;
use crate::engine::{Engine, EngineError, EventReceiver};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

/// Owns the file registry and tab set and is the only thing that mutates them.
///
/// Every command runs to completion before the next one starts (commands that
/// mutate take `&mut self`). Engine calls happen before any local mutation,
/// so a failed call leaves the session as it was. A new [`SessionSnapshot`]
/// is published after each completed transition.
pub struct SessionCoordinator<E: Engine> {
    engine: Arc<E>,
    registry: FileRegistry,
    tabs: TabSet,
    bridge: EventBridge,
    default_view: ViewKind,
    publisher: watch::Sender<Arc<SessionSnapshot>>,
}

impl<E: Engine> SessionCoordinator<E> {
    pub fn new(engine: Arc<E>, notifications: EventReceiver) -> Self {
        let (publisher, _) = watch::channel(Arc::new(SessionSnapshot::default()));
        Self {
            engine,
            registry: FileRegistry::new(),
            tabs: TabSet::new(),
            bridge: EventBridge::new(notifications),
            default_view: ViewKind::default(),
            publisher,
        }
    }

    /// View new tabs open in
    pub fn with_default_view(mut self, kind: ViewKind) -> Self {
        self.default_view = kind;
        self
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.publisher.borrow().clone()
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.publisher.subscribe()
    }

    /// Publish the current state, unless readers could not tell it from the
    /// last published snapshot
    fn publish(&self) {
        let snapshot = SessionSnapshot::capture(&self.registry, &self.tabs);
        debug_assert!(snapshot.is_consistent());
        self.publisher.send_if_modified(|current| {
            if current.same_as(&snapshot) {
                return false;
            }
            *current = Arc::new(snapshot);
            true
        });
    }

    /// Ask the engine to load `path`. The session changes later, when the
    /// resulting notification is handled.
    pub async fn request_open(&self, path: PathBuf) -> Result<()> {
        log::debug!("Requesting load of {}", path.display());
        self.engine.parse(path).await.map_err(|e| {
            log::warn!("Load request failed: {}", e);
            SessionError::from(e)
        })
    }

    /// Adopt a document the backend has already loaded, without waiting for
    /// its notification
    pub fn open_document(&mut self, doc: FileDocument) -> Result<TabId> {
        let filename = doc.filename.clone();
        self.registry.append(Arc::new(doc))?;
        let id = self
            .tabs
            .open_tab(&self.registry, &filename, self.default_view)?;
        self.publish();
        Ok(id)
    }

    /// Open another tab onto a file that is already loaded
    pub fn open_view(&mut self, filename: &str) -> Result<TabId> {
        let id = self
            .tabs
            .open_tab(&self.registry, filename, self.default_view)?;
        log::debug!("Opened tab {} onto {}", id, filename);
        self.publish();
        Ok(id)
    }

    fn active_filename(&self) -> Result<String> {
        self.tabs
            .active_tab()
            .map(|t| t.filename.clone())
            .ok_or(SessionError::NoActiveTab)
    }

    /// Save the active tab's file. Returns the filename that was saved.
    pub async fn save_active(&self) -> Result<String> {
        let filename = self.active_filename()?;
        self.engine.save_file(&filename).await.map_err(|e| {
            log::warn!("Saving {} failed: {}", filename, e);
            SessionError::from(e)
        })?;
        log::debug!("Saved {}", filename);
        Ok(filename)
    }

    /// Write the active tab's file to `target`
    pub async fn save_active_as(&self, target: &Path) -> Result<String> {
        let filename = self.active_filename()?;
        self.engine
            .save_file_as(&filename, target)
            .await
            .map_err(|e| {
                log::warn!("Saving {} as {} failed: {}", filename, target.display(), e);
                SessionError::from(e)
            })?;
        Ok(filename)
    }

    /// Close a tab. The file stays loaded. Returns false if it was not open.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        let closed = self.tabs.close_tab(id);
        if closed {
            log::debug!("Closed tab {}", id);
            self.publish();
        }
        closed
    }

    pub fn select_tab(&mut self, id: TabId) -> Result<()> {
        self.tabs.set_active(id)?;
        self.publish();
        Ok(())
    }

    /// Select the tab at a 1-based position in open order
    pub fn select_tab_at(&mut self, position: usize) -> Result<TabId> {
        let id = position
            .checked_sub(1)
            .and_then(|idx| self.tabs.id_at(idx))
            .ok_or(SessionError::NoTabAt(position))?;
        self.select_tab(id)?;
        Ok(id)
    }

    pub fn next_tab(&mut self) -> Option<TabId> {
        let id = self.tabs.next_id()?;
        self.select_tab(id).ok()?;
        Some(id)
    }

    pub fn prev_tab(&mut self) -> Option<TabId> {
        let id = self.tabs.prev_id()?;
        self.select_tab(id).ok()?;
        Some(id)
    }

    pub fn set_tab_view(&mut self, id: TabId, kind: ViewKind) -> Result<()> {
        self.tabs.set_kind(id, kind)?;
        self.publish();
        Ok(())
    }

    /// Flip a tab between messages and signals
    pub fn toggle_tab_view(&mut self, id: TabId) -> Result<ViewKind> {
        let kind = self
            .tabs
            .get(id)
            .map(|t| t.kind.toggled())
            .ok_or(SessionError::UnknownTab(id))?;
        self.set_tab_view(id, kind)?;
        Ok(kind)
    }

    pub fn toggle_active_view(&mut self) -> Result<ViewKind> {
        let id = self.tabs.active_id().ok_or(SessionError::NoActiveTab)?;
        self.toggle_tab_view(id)
    }

    /// Close a document: evict it from the engine, then drop it from the
    /// registry together with every tab showing it.
    pub async fn remove_file(&mut self, filename: &str) -> Result<Vec<TabId>> {
        if !self.registry.contains(filename) {
            return Err(SessionError::UnknownFile(filename.to_string()));
        }

        match self.engine.close_file(filename).await {
            Ok(()) | Err(EngineError::NotLoaded(_)) => {}
            Err(e) => {
                log::warn!("Closing {} failed: {}", filename, e);
                return Err(e.into());
            }
        }

        self.registry.remove_by_filename(filename);
        let closed = self.tabs.close_tabs_referencing(filename);
        log::debug!("Removed {} and closed tabs {:?}", filename, closed);
        self.publish();
        Ok(closed)
    }

    /// Pull the engine's file list and reconcile tabs with it
    pub async fn refresh(&mut self) -> Result<Reconciled> {
        let reconciled = EventBridge::reconcile(
            &mut self.registry,
            &mut self.tabs,
            self.engine.as_ref(),
            self.default_view,
        )
        .await
        .map_err(|e| {
            log::warn!("Refresh failed: {}", e);
            SessionError::from(e)
        })?;
        if !reconciled.stale {
            self.publish();
        }
        Ok(reconciled)
    }

    /// Wait for the next batch of "file loaded" notifications.
    ///
    /// Cancel safe, so it can sit in a `select!` next to input polling.
    /// Returns `None` once the engine side of the channel is gone.
    pub async fn wait_for_notifications(&mut self) -> Option<usize> {
        self.bridge.next_batch().await
    }

    /// React to a notification batch: one refresh, one tab per new file
    pub async fn on_files_loaded(&mut self, batch: usize) -> Result<Reconciled> {
        log::debug!("Handling {} file-loaded notification(s)", batch);
        self.refresh().await
    }

    /// Handle whatever notifications are already queued, without waiting
    pub async fn process_pending(&mut self) -> Option<Result<Reconciled>> {
        let batch = self.bridge.try_batch()?;
        Some(self.on_files_loaded(batch).await)
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn tabs(&self) -> &TabSet {
        &self.tabs
    }
}

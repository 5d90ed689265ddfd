use super::registry::FileRegistry;
use super::tabs::{TabId, TabSet, ViewKind};
use crate::dbc::{FileDocument, FileSummary};
use std::sync::Arc;

/// One tab as the presentation layer sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub id: TabId,
    pub filename: String,
    pub title: String,
    pub kind: ViewKind,
    pub message_count: usize,
}

/// Immutable point-in-time view of the session.
///
/// Captured from the registry and tab set in one go, so every tab in `tabs`
/// names a file in `files`.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub files: Vec<FileSummary>,
    pub tabs: Vec<TabView>,
    pub active_tab: Option<TabId>,
    pub active_document: Option<Arc<FileDocument>>,
}

impl SessionSnapshot {
    pub fn capture(registry: &FileRegistry, tabs: &TabSet) -> Self {
        let files = registry.list();
        let tab_views = tabs
            .tabs()
            .iter()
            .filter_map(|tab| {
                let doc = files.iter().find(|d| d.filename == tab.filename)?;
                Some(TabView {
                    id: tab.id,
                    filename: tab.filename.clone(),
                    title: doc.title(),
                    kind: tab.kind,
                    message_count: doc.message_count(),
                })
            })
            .collect();
        let active_document = tabs
            .active_tab()
            .and_then(|tab| registry.find(&tab.filename));

        Self {
            files: files.iter().map(|d| d.summary()).collect(),
            tabs: tab_views,
            active_tab: tabs.active_id(),
            active_document,
        }
    }

    pub fn active_view(&self) -> Option<&TabView> {
        let active = self.active_tab?;
        self.tabs.iter().find(|t| t.id == active)
    }

    /// 0-based position of the active tab in open order
    pub fn active_position(&self) -> Option<usize> {
        let active = self.active_tab?;
        self.tabs.iter().position(|t| t.id == active)
    }

    pub fn file(&self, filename: &str) -> Option<&FileSummary> {
        self.files.iter().find(|f| f.filename == filename)
    }

    /// Whether a reader could tell the two snapshots apart
    pub fn same_as(&self, other: &SessionSnapshot) -> bool {
        let same_document = match (&self.active_document, &other.active_document) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_document
            && self.active_tab == other.active_tab
            && self.tabs == other.tabs
            && self.files == other.files
    }

    /// No tab points at a missing file and the active pointer names an open tab
    pub fn is_consistent(&self) -> bool {
        let tabs_resolve = self.tabs.iter().all(|t| self.file(&t.filename).is_some());
        let active_resolves = match self.active_tab {
            Some(id) => self.tabs.iter().any(|t| t.id == id) && self.active_document.is_some(),
            None => self.active_document.is_none(),
        };
        tabs_resolve && active_resolves
    }
}

use super::error::{Result, SessionError};
use super::registry::FileRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tab identity. Assigned monotonically and never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(u64);

impl TabId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which table a tab shows for its file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    Messages,
    Signals,
}

impl ViewKind {
    pub fn toggled(self) -> Self {
        match self {
            ViewKind::Messages => ViewKind::Signals,
            ViewKind::Signals => ViewKind::Messages,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ViewKind::Messages => "messages",
            ViewKind::Signals => "signals",
        }
    }
}

/// A view onto one registered file, referenced by filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub filename: String,
    pub kind: ViewKind,
}

/// Open tabs in open order, plus the active pointer
#[derive(Debug)]
pub struct TabSet {
    tabs: Vec<Tab>,
    active: Option<TabId>,
    next_id: u64,
}

impl Default for TabSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TabSet {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            next_id: 1,
        }
    }

    fn next_tab_id(&mut self) -> TabId {
        let id = TabId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Open a new tab on a registered file and make it active
    pub fn open_tab(
        &mut self,
        registry: &FileRegistry,
        filename: &str,
        kind: ViewKind,
    ) -> Result<TabId> {
        if !registry.contains(filename) {
            return Err(SessionError::UnknownFile(filename.to_string()));
        }
        let id = self.next_tab_id();
        self.tabs.push(Tab {
            id,
            filename: filename.to_string(),
            kind,
        });
        self.active = Some(id);
        Ok(id)
    }

    /// Close a tab. Returns false if it was not open.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|t| t.id != id);
        let closed = self.tabs.len() != before;
        if closed {
            self.repair_active();
        }
        closed
    }

    /// Close every tab showing `filename`, returning their ids in open order
    pub fn close_tabs_referencing(&mut self, filename: &str) -> Vec<TabId> {
        let closed: Vec<TabId> = self
            .tabs
            .iter()
            .filter(|t| t.filename == filename)
            .map(|t| t.id)
            .collect();
        if !closed.is_empty() {
            self.tabs.retain(|t| t.filename != filename);
            self.repair_active();
        }
        closed
    }

    /// A closed active tab hands over to the first remaining tab in open order
    fn repair_active(&mut self) {
        if let Some(active) = self.active {
            if !self.tabs.iter().any(|t| t.id == active) {
                self.active = self.tabs.first().map(|t| t.id);
            }
        }
    }

    pub fn set_active(&mut self, id: TabId) -> Result<()> {
        if !self.contains(id) {
            return Err(SessionError::UnknownTab(id));
        }
        self.active = Some(id);
        Ok(())
    }

    pub fn set_kind(&mut self, id: TabId, kind: ViewKind) -> Result<()> {
        let tab = self
            .tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(SessionError::UnknownTab(id))?;
        tab.kind = kind;
        Ok(())
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        let active = self.active?;
        self.get(active)
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.tabs.iter().any(|t| t.id == id)
    }

    /// Tab ids in open order
    pub fn list(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Tab at a 0-based position in open order
    pub fn id_at(&self, position: usize) -> Option<TabId> {
        self.tabs.get(position).map(|t| t.id)
    }

    /// Tab after the active one, wrapping around
    pub fn next_id(&self) -> Option<TabId> {
        let idx = self.active_position()?;
        Some(self.tabs[(idx + 1) % self.tabs.len()].id)
    }

    /// Tab before the active one, wrapping around
    pub fn prev_id(&self) -> Option<TabId> {
        let idx = self.active_position()?;
        let prev = if idx == 0 { self.tabs.len() - 1 } else { idx - 1 };
        Some(self.tabs[prev].id)
    }

    fn active_position(&self) -> Option<usize> {
        let active = self.active?;
        self.tabs.iter().position(|t| t.id == active)
    }
}

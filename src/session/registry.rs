use super::error::{Result, SessionError};
use crate::dbc::FileDocument;
use crate::engine::{Engine, EngineError};
use std::collections::HashSet;
use std::sync::Arc;

/// Issued by [`FileRegistry::begin_refresh`]; orders refresh responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket {
    seq: u64,
}

impl RefreshTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Filenames that entered or left the registry in one refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryDelta {
    /// New filenames, in the order they appear in the refreshed list
    pub added: Vec<String>,
    /// Filenames no longer present, in their previous order
    pub removed: Vec<String>,
}

impl RegistryDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied(RegistryDelta),
    /// A newer refresh was already applied; the response was discarded
    Stale { ticket: u64, applied: u64 },
}

/// Ordered collection of loaded documents, unique by filename
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: Vec<Arc<FileDocument>>,
    issued_seq: u64,
    applied_seq: u64,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection with the engine's current list
    pub async fn refresh<E: Engine>(
        &mut self,
        engine: &E,
    ) -> std::result::Result<RefreshOutcome, EngineError> {
        let ticket = self.begin_refresh();
        let docs = engine.list_files().await?;
        Ok(self.apply_refresh(ticket, docs))
    }

    /// Reserve a sequence number for a refresh about to be fetched
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_seq += 1;
        RefreshTicket {
            seq: self.issued_seq,
        }
    }

    /// Apply a fetched list, unless a newer ticket has already been applied
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        docs: Vec<Arc<FileDocument>>,
    ) -> RefreshOutcome {
        if ticket.seq <= self.applied_seq {
            log::debug!(
                "Discarding stale refresh #{} (#{} already applied)",
                ticket.seq,
                self.applied_seq
            );
            return RefreshOutcome::Stale {
                ticket: ticket.seq,
                applied: self.applied_seq,
            };
        }

        let mut seen = HashSet::with_capacity(docs.len());
        let mut files = Vec::with_capacity(docs.len());
        for doc in docs {
            if seen.insert(doc.filename.clone()) {
                files.push(doc);
            } else {
                log::warn!("Backend listed {} more than once; keeping the first", doc.filename);
            }
        }

        let before: HashSet<&str> = self.files.iter().map(|d| d.filename.as_str()).collect();
        let added = files
            .iter()
            .filter(|d| !before.contains(d.filename.as_str()))
            .map(|d| d.filename.clone())
            .collect();
        let removed = self
            .files
            .iter()
            .filter(|d| !seen.contains(&d.filename))
            .map(|d| d.filename.clone())
            .collect();

        self.files = files;
        self.applied_seq = ticket.seq;
        RefreshOutcome::Applied(RegistryDelta { added, removed })
    }

    /// Add a document the caller already knows about
    pub fn append(&mut self, doc: Arc<FileDocument>) -> Result<()> {
        if self.contains(&doc.filename) {
            return Err(SessionError::DuplicateFilename(doc.filename.clone()));
        }
        self.files.push(doc);
        Ok(())
    }

    /// Remove the document with this filename. Absent names are ignored.
    pub fn remove_by_filename(&mut self, filename: &str) -> Option<Arc<FileDocument>> {
        let idx = self.files.iter().position(|d| d.filename == filename)?;
        Some(self.files.remove(idx))
    }

    pub fn find(&self, filename: &str) -> Option<Arc<FileDocument>> {
        self.files.iter().find(|d| d.filename == filename).cloned()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.iter().any(|d| d.filename == filename)
    }

    /// Copy of the current ordered collection
    pub fn list(&self) -> Vec<Arc<FileDocument>> {
        self.files.clone()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.files.iter().map(|d| d.filename.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(names: &[&str]) -> Vec<Arc<FileDocument>> {
        names.iter().map(|n| Arc::new(FileDocument::new(*n))).collect()
    }

    #[test]
    fn test_refresh_replaces_and_reports_delta() {
        let mut reg = FileRegistry::new();
        let t = reg.begin_refresh();
        assert_eq!(
            reg.apply_refresh(t, docs(&["a.dbc", "b.dbc"])),
            RefreshOutcome::Applied(RegistryDelta {
                added: vec!["a.dbc".into(), "b.dbc".into()],
                removed: vec![],
            })
        );

        let t = reg.begin_refresh();
        assert_eq!(
            reg.apply_refresh(t, docs(&["b.dbc", "c.dbc"])),
            RefreshOutcome::Applied(RegistryDelta {
                added: vec!["c.dbc".into()],
                removed: vec!["a.dbc".into()],
            })
        );
        assert_eq!(reg.filenames(), vec!["b.dbc", "c.dbc"]);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut reg = FileRegistry::new();
        let list = docs(&["a.dbc", "b.dbc"]);

        let t = reg.begin_refresh();
        reg.apply_refresh(t, list.clone());
        let first = reg.list();

        let t = reg.begin_refresh();
        let outcome = reg.apply_refresh(t, list);
        assert_eq!(outcome, RefreshOutcome::Applied(RegistryDelta::default()));
        assert_eq!(reg.list(), first);
    }

    #[test]
    fn test_stale_refresh_is_discarded() {
        let mut reg = FileRegistry::new();
        let older = reg.begin_refresh();
        let newer = reg.begin_refresh();

        reg.apply_refresh(newer, docs(&["a.dbc", "b.dbc"]));
        let outcome = reg.apply_refresh(older, docs(&["a.dbc"]));

        assert_eq!(
            outcome,
            RefreshOutcome::Stale {
                ticket: older.seq(),
                applied: newer.seq()
            }
        );
        assert_eq!(reg.filenames(), vec!["a.dbc", "b.dbc"]);
    }

    #[test]
    fn test_duplicate_backend_entries_keep_first() {
        let mut reg = FileRegistry::new();
        let mut dup = FileDocument::new("a.dbc");
        dup.version = "second".to_string();
        let mut list = docs(&["a.dbc", "b.dbc"]);
        list.push(Arc::new(dup));

        let t = reg.begin_refresh();
        reg.apply_refresh(t, list);

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.find("a.dbc").unwrap().version, "");
    }

    #[test]
    fn test_append_rejects_duplicate() {
        let mut reg = FileRegistry::new();
        reg.append(Arc::new(FileDocument::new("a.dbc"))).unwrap();
        let err = reg.append(Arc::new(FileDocument::new("a.dbc"))).unwrap_err();
        assert!(matches!(err, SessionError::DuplicateFilename(name) if name == "a.dbc"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_remove_by_filename() {
        let mut reg = FileRegistry::new();
        for name in ["a.dbc", "b.dbc", "c.dbc"] {
            reg.append(Arc::new(FileDocument::new(name))).unwrap();
        }

        assert!(reg.remove_by_filename("b.dbc").is_some());
        assert!(reg.remove_by_filename("b.dbc").is_none());
        assert_eq!(reg.filenames(), vec!["a.dbc", "c.dbc"]);
        assert!(reg.find("c.dbc").is_some());
    }

    #[test]
    fn test_list_is_a_copy() {
        let mut reg = FileRegistry::new();
        reg.append(Arc::new(FileDocument::new("a.dbc"))).unwrap();

        let mut copy = reg.list();
        copy.clear();

        assert_eq!(reg.len(), 1);
    }
}

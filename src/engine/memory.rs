//! Scriptable in-memory engine for session tests

use super::{Engine, EngineError, EngineEvent, EventSender};
use crate::dbc::FileDocument;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Engine operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Parse,
    List,
    Save,
    SaveAs,
    Close,
}

#[derive(Default)]
struct State {
    files: Vec<Arc<FileDocument>>,
    staged: Vec<FileDocument>,
    failing: HashSet<Op>,
    saved: Vec<String>,
    saved_as: Vec<(String, PathBuf)>,
    closed: Vec<String>,
    list_calls: usize,
}

pub struct MemoryEngine {
    state: Mutex<State>,
    events: EventSender,
    save_gate: Option<Arc<Notify>>,
}

impl MemoryEngine {
    pub fn new(events: EventSender) -> Self {
        Self {
            state: Mutex::new(State::default()),
            events,
            save_gate: None,
        }
    }

    /// Saves wait for `gate` to be notified before completing
    pub fn with_save_gate(mut self, gate: Arc<Notify>) -> Self {
        self.save_gate = Some(gate);
        self
    }

    /// Make the next `parse` of `doc.filename` succeed with `doc`
    pub fn stage(&self, doc: FileDocument) {
        self.state.lock().unwrap().staged.push(doc);
    }

    /// Backend finished loading `doc` and fires the notification
    pub fn load(&self, doc: FileDocument) {
        self.load_silently(doc);
        self.events.send(EngineEvent::FileLoaded).unwrap();
    }

    /// Backend gained `doc` without notifying anyone
    pub fn load_silently(&self, doc: FileDocument) {
        self.state.lock().unwrap().files.push(Arc::new(doc));
    }

    /// Backend dropped a file on its own
    pub fn evict(&self, filename: &str) {
        self.state
            .lock()
            .unwrap()
            .files
            .retain(|d| d.filename != filename);
    }

    pub fn fail(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.state.lock().unwrap().failing.remove(&op);
    }

    pub fn saved(&self) -> Vec<String> {
        self.state.lock().unwrap().saved.clone()
    }

    pub fn saved_as(&self) -> Vec<(String, PathBuf)> {
        self.state.lock().unwrap().saved_as.clone()
    }

    pub fn closed(&self) -> Vec<String> {
        self.state.lock().unwrap().closed.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    fn check(&self, op: Op) -> Result<(), EngineError> {
        if self.state.lock().unwrap().failing.contains(&op) {
            return Err(EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("injected {op:?} failure"),
            )));
        }
        Ok(())
    }

    fn contains(&self, filename: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .files
            .iter()
            .any(|d| d.filename == filename)
    }
}

impl Engine for MemoryEngine {
    async fn parse(&self, path: PathBuf) -> Result<(), EngineError> {
        self.check(Op::Parse)?;
        let filename = path.to_string_lossy().into_owned();
        let doc = {
            let mut state = self.state.lock().unwrap();
            if state.files.iter().any(|d| d.filename == filename) {
                return Err(EngineError::AlreadyLoaded(filename));
            }
            let idx = state
                .staged
                .iter()
                .position(|d| d.filename == filename)
                .ok_or_else(|| {
                    EngineError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        filename.clone(),
                    ))
                })?;
            state.staged.remove(idx)
        };
        self.load(doc);
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<Arc<FileDocument>>, EngineError> {
        self.check(Op::List)?;
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Ok(state.files.clone())
    }

    async fn save_file(&self, filename: &str) -> Result<(), EngineError> {
        if let Some(gate) = &self.save_gate {
            gate.notified().await;
        }
        self.check(Op::Save)?;
        if !self.contains(filename) {
            return Err(EngineError::NotLoaded(filename.to_string()));
        }
        self.state.lock().unwrap().saved.push(filename.to_string());
        Ok(())
    }

    async fn save_file_as(&self, filename: &str, target: &Path) -> Result<(), EngineError> {
        self.check(Op::SaveAs)?;
        if !self.contains(filename) {
            return Err(EngineError::NotLoaded(filename.to_string()));
        }
        self.state
            .lock()
            .unwrap()
            .saved_as
            .push((filename.to_string(), target.to_path_buf()));
        Ok(())
    }

    async fn close_file(&self, filename: &str) -> Result<(), EngineError> {
        self.check(Op::Close)?;
        if !self.contains(filename) {
            return Err(EngineError::NotLoaded(filename.to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state.files.retain(|d| d.filename != filename);
        state.closed.push(filename.to_string());
        Ok(())
    }
}

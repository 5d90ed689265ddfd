//! The backend engine that owns parsed documents and their persistence.
//!
//! The session never touches the filesystem itself. It asks an [`Engine`] to
//! load, list, save and close documents, and learns about completed loads
//! only through the payload-free [`EngineEvent::FileLoaded`] notification.

mod json;
#[cfg(test)]
pub mod memory;

use crate::dbc::FileDocument;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

pub use json::JsonEngine;

/// Notifications fired by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// A parse finished and the backend file list changed. Carries no payload.
    FileLoaded,
}

pub type EventSender = mpsc::UnboundedSender<EngineEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<EngineEvent>;

/// Create the channel an engine uses to notify the session
pub fn notification_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is already loaded")]
    AlreadyLoaded(String),

    #[error("{0} is not loaded")]
    NotLoaded(String),

    #[error("notification channel closed")]
    ChannelClosed,
}

/// Capabilities the session consumes from the backend.
///
/// Every call may suspend; none of them is retried by the caller.
pub trait Engine: Send + Sync {
    /// Load the file at `path`. Completion is signalled by a
    /// [`EngineEvent::FileLoaded`] notification, not by the return value.
    fn parse(&self, path: PathBuf) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Full, ordered list of loaded documents
    fn list_files(
        &self,
    ) -> impl Future<Output = Result<Vec<Arc<FileDocument>>, EngineError>> + Send;

    /// Persist the document back to its own filename
    fn save_file(&self, filename: &str) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Write a copy of the document to `target`. The document keeps its identity.
    fn save_file_as(
        &self,
        filename: &str,
        target: &Path,
    ) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Evict the document from the backend
    fn close_file(&self, filename: &str) -> impl Future<Output = Result<(), EngineError>> + Send;
}

use super::{Engine, EngineError, EngineEvent, EventSender};
use crate::dbc::FileDocument;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Engine backed by documents stored in their JSON interchange form.
///
/// Each file on disk holds one serialized [`FileDocument`]. Loaded documents
/// are kept in load order; the path a document was loaded from becomes its
/// filename.
pub struct JsonEngine {
    files: Mutex<Vec<Arc<FileDocument>>>,
    events: EventSender,
}

impl JsonEngine {
    pub fn new(events: EventSender) -> Self {
        Self {
            files: Mutex::new(Vec::new()),
            events,
        }
    }

    async fn lookup(&self, filename: &str) -> Result<Arc<FileDocument>, EngineError> {
        self.files
            .lock()
            .await
            .iter()
            .find(|doc| doc.filename == filename)
            .cloned()
            .ok_or_else(|| EngineError::NotLoaded(filename.to_string()))
    }

    async fn write_document(doc: &FileDocument, target: &Path) -> Result<(), EngineError> {
        let content = serde_json::to_string_pretty(doc)?;
        tokio::fs::write(target, content).await?;
        Ok(())
    }
}

impl Engine for JsonEngine {
    async fn parse(&self, path: PathBuf) -> Result<(), EngineError> {
        let filename = path.to_string_lossy().into_owned();
        if self.lookup(&filename).await.is_ok() {
            return Err(EngineError::AlreadyLoaded(filename));
        }

        let bytes = tokio::fs::read(&path).await?;
        let mut doc: FileDocument = serde_json::from_slice(&bytes)
            .map_err(|source| EngineError::Decode {
                path: path.clone(),
                source,
            })?;
        doc.filename = filename.clone();

        {
            let mut files = self.files.lock().await;
            // Another parse of the same path may have finished while we were reading
            if files.iter().any(|d| d.filename == filename) {
                return Err(EngineError::AlreadyLoaded(filename));
            }
            files.push(Arc::new(doc));
        }
        log::info!("Loaded {}", filename);

        self.events
            .send(EngineEvent::FileLoaded)
            .map_err(|_| EngineError::ChannelClosed)
    }

    async fn list_files(&self) -> Result<Vec<Arc<FileDocument>>, EngineError> {
        Ok(self.files.lock().await.clone())
    }

    async fn save_file(&self, filename: &str) -> Result<(), EngineError> {
        let doc = self.lookup(filename).await?;
        Self::write_document(&doc, Path::new(&doc.filename)).await?;
        log::info!("Saved {}", filename);
        Ok(())
    }

    async fn save_file_as(&self, filename: &str, target: &Path) -> Result<(), EngineError> {
        let doc = self.lookup(filename).await?;
        Self::write_document(&doc, target).await?;
        log::info!("Saved {} as {}", filename, target.display());
        Ok(())
    }

    async fn close_file(&self, filename: &str) -> Result<(), EngineError> {
        let mut files = self.files.lock().await;
        let before = files.len();
        files.retain(|doc| doc.filename != filename);
        if files.len() == before {
            return Err(EngineError::NotLoaded(filename.to_string()));
        }
        Ok(())
    }
}

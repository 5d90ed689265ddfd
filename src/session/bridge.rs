use super::registry::{FileRegistry, RefreshOutcome};
use super::tabs::{TabId, TabSet, ViewKind};
use crate::engine::{Engine, EngineError, EventReceiver};
use tokio::sync::mpsc::error::TryRecvError;

/// Result of one reconcile pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Tabs opened for newly present files, in registry order
    pub opened: Vec<TabId>,
    /// Tabs closed because their file left the backend
    pub closed: Vec<TabId>,
    /// The refresh response was superseded and nothing changed
    pub stale: bool,
}

/// Turns "file loaded" notifications into registry refreshes and new tabs.
///
/// Notifications carry no payload, so the bridge never trusts a position: it
/// diffs the registry across a refresh and opens one tab per filename that
/// was not there before.
pub struct EventBridge {
    receiver: EventReceiver,
}

impl EventBridge {
    pub fn new(receiver: EventReceiver) -> Self {
        Self { receiver }
    }

    /// Wait for a notification, then swallow any already queued behind it.
    ///
    /// Returns the number of notifications in the batch, or `None` once every
    /// sender is gone. Cancel safe.
    pub async fn next_batch(&mut self) -> Option<usize> {
        self.receiver.recv().await?;
        Some(1 + self.drain())
    }

    /// Non-blocking variant of [`EventBridge::next_batch`]
    pub fn try_batch(&mut self) -> Option<usize> {
        match self.receiver.try_recv() {
            Ok(_) => Some(1 + self.drain()),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    fn drain(&mut self) -> usize {
        let mut extra = 0;
        while self.receiver.try_recv().is_ok() {
            extra += 1;
        }
        extra
    }

    /// Refresh the registry, then open a tab for each new file and close the
    /// tabs of files that disappeared.
    ///
    /// All mutation happens after the engine call returns, so callers that
    /// publish snapshots only after this returns never expose a half-applied
    /// state.
    pub async fn reconcile<E: Engine>(
        registry: &mut FileRegistry,
        tabs: &mut TabSet,
        engine: &E,
        kind: ViewKind,
    ) -> Result<Reconciled, EngineError> {
        let delta = match registry.refresh(engine).await? {
            RefreshOutcome::Applied(delta) => delta,
            RefreshOutcome::Stale { .. } => {
                return Ok(Reconciled {
                    stale: true,
                    ..Reconciled::default()
                })
            }
        };

        let mut reconciled = Reconciled::default();
        for filename in &delta.removed {
            reconciled
                .closed
                .extend(tabs.close_tabs_referencing(filename));
        }
        for filename in &delta.added {
            match tabs.open_tab(registry, filename, kind) {
                Ok(id) => reconciled.opened.push(id),
                Err(e) => log::warn!("Could not open a tab for {}: {}", filename, e),
            }
        }

        if !delta.is_empty() {
            log::debug!(
                "Reconciled registry: +{:?} -{:?}, opened {:?}, closed {:?}",
                delta.added,
                delta.removed,
                reconciled.opened,
                reconciled.closed
            );
        }
        Ok(reconciled)
    }
}

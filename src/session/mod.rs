//! Session state: which documents are loaded, which tabs show them, and
//! which tab is active.
//!
//! - [`FileRegistry`] - loaded documents, unique by filename
//! - [`TabSet`] - open tabs referencing documents by filename
//! - [`EventBridge`] - turns engine notifications into refreshes and new tabs
//! - [`SessionCoordinator`] - owns all of the above; the only mutation point
//!
//! The presentation layer reads [`SessionSnapshot`]s and nothing else.

mod bridge;
mod coordinator;
mod error;
mod registry;
mod snapshot;
mod tabs;

pub use bridge::{EventBridge, Reconciled};
pub use coordinator::SessionCoordinator;
pub use error::{Result, SessionError};
pub use registry::{FileRegistry, RefreshOutcome, RefreshTicket, RegistryDelta};
pub use snapshot::{SessionSnapshot, TabView};
pub use tabs::{Tab, TabId, TabSet, ViewKind};

//! dbcview: a terminal viewer for CAN-bus database documents.
//!
//! The [`session`] module owns all state about loaded documents and open
//! tabs; the terminal front end ([`app`], [`ui`]) only reads published
//! snapshots and issues commands through the coordinator.

pub mod app;
pub mod config;
pub mod dbc;
pub mod engine;
pub mod input;
pub mod session;
pub mod theme;
pub mod ui;

//! horilla-core library.
//!
//! Cycle-safe parent/child hierarchies for CRM contacts and campaigns.
//!
//! - [`hierarchy`]: the pure guard, snapshot and forest audit.
//! - [`db`]: the SQLite adapter that runs the guard under a write lock.
//! - [`config`]: `.horilla/config.toml` loading.
//! - [`error`]: stable error codes.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for outcomes callers branch on,
//!   `anyhow::Result` for plumbing.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod config;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod model;

pub use error::ErrorCode;
pub use hierarchy::{HierarchyGuard, HierarchySource, RejectionReason, ValidAssignment};
pub use model::{EntityKind, NodeId};

#![forbid(unsafe_code)]

//! SplitCanvas runtime.
//!
//! Plumbing around the layout tree manager in `splitcanvas-layout`:
//!
//! - [`EditorSession`] - owns the current layout and applies commands to it
//! - [`SnapshotHistory`] - undo/redo over immutable layout snapshots
//! - [`LayoutStore`] - current-layout and template slots over a [`StorageBackend`]
//! - [`EditorConfig`] - every tunable, loadable from TOML/JSON (`policy-config`)
//!
//! # Example
//!
//! ```
//! use splitcanvas_layout::{NodeId, SplitAxis, SplitRequest};
//! use splitcanvas_runtime::{EditorSession, MemoryStorage};
//!
//! let mut session = EditorSession::new(MemoryStorage::new());
//! session.split(SplitRequest::new(NodeId::root(), SplitAxis::Horizontal, "Camera"));
//! session.split(SplitRequest::new(NodeId::root(), SplitAxis::Vertical, "Traces"));
//! assert_eq!(session.used_component_types().len(), 2);
//!
//! session.save_template("Two up").expect("save template");
//! assert!(session.undo());
//! session.load_template("Two up").expect("load template");
//! assert_eq!(session.tree().children().len(), 2);
//! ```

pub mod config;
pub mod history;
pub mod session;
pub mod storage;

pub use config::{ConfigError, EditorConfig};
pub use history::{HistoryConfig, SnapshotHistory};
pub use session::{CommandReport, CommandStatus, EditorSession, SessionError};
#[cfg(feature = "state-persistence")]
pub use storage::FileStorage;
pub use storage::{
    LayoutStore, MemoryStorage, StorageBackend, StorageConfig, StorageError, StorageResult,
};

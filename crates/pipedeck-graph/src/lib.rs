//! Pipeline connector lifecycle and graph-state model.
//!
//! This crate implements the UI-agnostic core of the Pipedeck console: naming
//! rules for uploaded artifacts, connector classification, pipeline status
//! derivation, the per-pipeline graph model with selection, editing and
//! two-phase delete, snapshot application, and the editor session that
//! persists changes through a [`PipelineBackend`].

pub mod backend;
pub mod classify;
pub mod config;
pub mod events;
pub mod graph;
pub mod model;
pub mod naming;
pub mod session;
pub mod snapshot;
pub mod status;

pub use backend::{ArtifactFile, BackendOperation, InMemoryBackend, PipelineBackend};
pub use classify::{classify, status_icon, DisplayIcon};
pub use config::ModelConfig;
pub use events::{EventEmitter, GraphChange, GraphEvent};
pub use graph::{GraphNode, PipelineView};
pub use model::{EntryState, FetchTicket, PipelineGraphModel, RenameRequest, SnapshotOutcome};
pub use naming::{check_candidate, is_duplicate, validate_extension, validate_extension_with, JAR_EXTENSION};
pub use session::{EditorSession, UploadOutcome};
pub use snapshot::{load_snapshot, save_snapshot, Snapshot};
pub use status::{aggregate, aggregate_descriptors, with_status, PipelineListEntry};

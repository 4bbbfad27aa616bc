//! Shared types and errors for the Pipedeck pipeline graph model.
//!
//! This crate provides the foundational types used across all other Pipedeck crates:
//! - `PipedeckError` — unified error taxonomy
//! - `Connector` / `ConnectorDescriptor` — pipeline graph entries and their wire records
//! - `ConnectorKind` / `ConnectorState` — closed enumerations with total wire decoding
//! - `PipelineStatus` / `PipelineSummary` — derived pipeline status and list records

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unified error type for all Pipedeck subsystems.
#[derive(Debug, thiserror::Error)]
pub enum PipedeckError {
    // === Naming Errors ===
    #[error("This file type is not supported: '{name}'. The file type must be '{extension}'")]
    InvalidExtension { name: String, extension: String },

    #[error("The filename '{name}' is already taken, please choose another name")]
    DuplicateName { name: String },

    // === Persistence Errors ===
    #[error("Failed to {operation}: {message}")]
    PersistenceFailure { operation: String, message: String },

    // === Model Errors ===
    #[error("Connector '{id}' does not exist in this pipeline")]
    ConnectorNotFound { id: String },

    #[error("Delete of connector '{id}' was not requested")]
    DeleteNotRequested { id: String },

    #[error("No connector is being edited")]
    NotEditing,

    // === Generic ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl PipedeckError {
    /// Returns `true` for naming rejections the user resolves by resubmitting.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PipedeckError::InvalidExtension { .. } | PipedeckError::DuplicateName { .. }
        )
    }

    /// Returns `true` if the model is untouched and the user may simply try again.
    pub fn is_recoverable(&self) -> bool {
        self.is_validation() || matches!(self, PipedeckError::PersistenceFailure { .. })
    }

    /// Maps the error to an HTTP status code for server mode.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            PipedeckError::InvalidExtension { .. } => Some(400),
            PipedeckError::DuplicateName { .. } => Some(409),
            PipedeckError::ConnectorNotFound { .. } => Some(404),
            PipedeckError::DeleteNotRequested { .. } | PipedeckError::NotEditing => Some(412),
            PipedeckError::PersistenceFailure { .. } => Some(502),
            _ => None,
        }
    }
}

/// A convenience alias for `Result<T, PipedeckError>`.
pub type Result<T> = std::result::Result<T, PipedeckError>;

// ---------------------------------------------------------------------------
// ConnectorKind
// ---------------------------------------------------------------------------

/// What role a connector plays in the pipeline graph.
///
/// Kind strings the backend sends that are not one of the four known roles
/// decode to [`ConnectorKind::Other`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    Source,
    Sink,
    Topic,
    #[serde(alias = "streamApp", alias = "streamapp")]
    Stream,
    #[serde(other)]
    Other,
}

impl ConnectorKind {
    pub fn is_source(self) -> bool {
        self == ConnectorKind::Source
    }

    pub fn is_sink(self) -> bool {
        self == ConnectorKind::Sink
    }

    pub fn is_topic(self) -> bool {
        self == ConnectorKind::Topic
    }

    pub fn is_stream(self) -> bool {
        self == ConnectorKind::Stream
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectorKind::Source => "source",
            ConnectorKind::Sink => "sink",
            ConnectorKind::Topic => "topic",
            ConnectorKind::Stream => "stream",
            ConnectorKind::Other => "other",
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConnectorState
// ---------------------------------------------------------------------------

/// Runtime state reported by the backend for a connector.
///
/// Absent or unrecognized states decode to [`ConnectorState::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectorState {
    Running,
    Stopped,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ConnectorState {
    pub fn is_running(self) -> bool {
        self == ConnectorState::Running
    }
}

impl fmt::Display for ConnectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectorState::Running => "RUNNING",
            ConnectorState::Stopped => "STOPPED",
            ConnectorState::Failed => "FAILED",
            ConnectorState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Connector — an entry in a pipeline graph
// ---------------------------------------------------------------------------

/// Connector record as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    pub id: String,
    pub name: String,
    pub kind: ConnectorKind,
    #[serde(default)]
    pub state: ConnectorState,
}

/// A node in a pipeline graph, carrying the transient selection flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub id: String,
    pub name: String,
    pub kind: ConnectorKind,
    #[serde(default)]
    pub state: ConnectorState,
    #[serde(default)]
    pub is_active: bool,
}

impl Connector {
    /// Create an unselected connector whose state has not been reported yet.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ConnectorKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            state: ConnectorState::Unknown,
            is_active: false,
        }
    }

    /// Builder-style setter for the reported state.
    pub fn with_state(mut self, state: ConnectorState) -> Self {
        self.state = state;
        self
    }

    /// Strip the selection flag, yielding the backend record.
    pub fn descriptor(&self) -> ConnectorDescriptor {
        ConnectorDescriptor {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            state: self.state,
        }
    }
}

impl From<ConnectorDescriptor> for Connector {
    fn from(d: ConnectorDescriptor) -> Self {
        Self {
            id: d.id,
            name: d.name,
            kind: d.kind,
            state: d.state,
            is_active: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineStatus / PipelineSummary
// ---------------------------------------------------------------------------

/// Overall status of a pipeline, derived from its connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStatus {
    Running,
    Stopped,
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStatus::Running => f.write_str("Running"),
            PipelineStatus::Stopped => f.write_str("Stopped"),
        }
    }
}

/// A pipeline as returned by the pipeline list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub objects: Vec<ConnectorDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_extension() {
        let err = PipedeckError::InvalidExtension {
            name: "report.txt".into(),
            extension: ".jar".into(),
        };
        assert_eq!(
            err.to_string(),
            "This file type is not supported: 'report.txt'. The file type must be '.jar'"
        );
    }

    #[test]
    fn error_display_duplicate_name() {
        let err = PipedeckError::DuplicateName {
            name: "dup.jar".into(),
        };
        assert_eq!(
            err.to_string(),
            "The filename 'dup.jar' is already taken, please choose another name"
        );
    }

    #[test]
    fn error_display_persistence_failure() {
        let err = PipedeckError::PersistenceFailure {
            operation: "rename artifact".into(),
            message: "HTTP 500".into(),
        };
        assert_eq!(err.to_string(), "Failed to rename artifact: HTTP 500");
    }

    #[test]
    fn naming_errors_have_distinct_messages() {
        let ext = PipedeckError::InvalidExtension {
            name: "a".into(),
            extension: ".jar".into(),
        };
        let dup = PipedeckError::DuplicateName { name: "a".into() };
        assert_ne!(ext.to_string(), dup.to_string());
    }

    // --- classification helpers ---

    #[test]
    fn validation_errors_are_recoverable() {
        let err = PipedeckError::DuplicateName { name: "x".into() };
        assert!(err.is_validation());
        assert!(err.is_recoverable());
    }

    #[test]
    fn persistence_failure_is_recoverable_but_not_validation() {
        let err = PipedeckError::PersistenceFailure {
            operation: "delete artifact".into(),
            message: "timeout".into(),
        };
        assert!(!err.is_validation());
        assert!(err.is_recoverable());
    }

    #[test]
    fn misuse_errors_are_not_recoverable() {
        let err = PipedeckError::ConnectorNotFound { id: "7".into() };
        assert!(!err.is_recoverable());
        assert!(!PipedeckError::NotEditing.is_validation());
    }

    #[test]
    fn http_status_mapping() {
        let ext = PipedeckError::InvalidExtension {
            name: "a".into(),
            extension: ".jar".into(),
        };
        assert_eq!(ext.http_status(), Some(400));
        assert_eq!(
            PipedeckError::DuplicateName { name: "a".into() }.http_status(),
            Some(409)
        );
        assert_eq!(
            PipedeckError::ConnectorNotFound { id: "a".into() }.http_status(),
            Some(404)
        );
        assert_eq!(PipedeckError::Other("x".into()).http_status(), None);
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: PipedeckError = json_err.into();
        assert!(matches!(err, PipedeckError::Json(_)));
    }

    // --- wire decoding ---

    #[test]
    fn kind_decodes_known_and_unknown_values() {
        let kind: ConnectorKind = serde_json::from_str("\"sink\"").unwrap();
        assert_eq!(kind, ConnectorKind::Sink);
        let kind: ConnectorKind = serde_json::from_str("\"streamApp\"").unwrap();
        assert_eq!(kind, ConnectorKind::Stream);
        let kind: ConnectorKind = serde_json::from_str("\"ftp-bridge\"").unwrap();
        assert_eq!(kind, ConnectorKind::Other);
    }

    #[test]
    fn state_decodes_uppercase_and_falls_back_to_unknown() {
        let state: ConnectorState = serde_json::from_str("\"RUNNING\"").unwrap();
        assert_eq!(state, ConnectorState::Running);
        let state: ConnectorState = serde_json::from_str("\"DESTROYED\"").unwrap();
        assert_eq!(state, ConnectorState::Unknown);
    }

    #[test]
    fn descriptor_without_state_is_unknown() {
        let d: ConnectorDescriptor =
            serde_json::from_str(r#"{"id":"c","name":"c","kind":"source"}"#).unwrap();
        assert_eq!(d.state, ConnectorState::Unknown);
    }

    #[test]
    fn connector_from_descriptor_is_unselected() {
        let d = ConnectorDescriptor {
            id: "1".into(),
            name: "a.jar".into(),
            kind: ConnectorKind::Stream,
            state: ConnectorState::Failed,
        };
        let c = Connector::from(d.clone());
        assert!(!c.is_active);
        assert_eq!(c.state, ConnectorState::Failed);
        assert_eq!(c.descriptor(), d);
    }

    #[test]
    fn pipeline_status_display() {
        assert_eq!(PipelineStatus::Running.to_string(), "Running");
        assert_eq!(
            serde_json::to_string(&PipelineStatus::Stopped).unwrap(),
            "\"Stopped\""
        );
    }
}

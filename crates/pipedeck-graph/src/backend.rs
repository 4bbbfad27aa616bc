//! Persistence boundary: the backend that stores pipelines and artifacts.
//!
//! The real implementation talks HTTP and lives outside this crate. Every
//! method reports failure through `Err`; callers treat any error as a
//! persistence failure and leave their local state untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use pipedeck_types::{ConnectorDescriptor, ConnectorKind, ConnectorState, PipedeckError, Result};

/// A file picked by the user for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ArtifactFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[async_trait]
pub trait PipelineBackend: Send + Sync {
    /// Current connectors of a pipeline. An empty list means "no connectors yet".
    async fn fetch_connectors(&self, pipeline_id: &str) -> Result<Vec<ConnectorDescriptor>>;

    /// Store an artifact. The backend assigns the connector id.
    async fn upload_artifact(&self, pipeline_id: &str, file: &ArtifactFile) -> Result<()>;

    async fn rename_artifact(&self, id: &str, new_name: &str) -> Result<()>;

    async fn delete_artifact(&self, id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// InMemoryBackend
// ---------------------------------------------------------------------------

/// Backend operations, used to inject failures into [`InMemoryBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    Fetch,
    Upload,
    Rename,
    Delete,
}

impl BackendOperation {
    pub fn describe(self) -> &'static str {
        match self {
            BackendOperation::Fetch => "fetch connectors",
            BackendOperation::Upload => "upload artifact",
            BackendOperation::Rename => "rename artifact",
            BackendOperation::Delete => "delete artifact",
        }
    }
}

/// Backend kept entirely in memory, with server-assigned UUID ids and
/// one-shot failure injection.
#[derive(Default)]
pub struct InMemoryBackend {
    pipelines: Mutex<HashMap<String, Vec<ConnectorDescriptor>>>,
    failures: Mutex<HashSet<BackendOperation>>,
    calls: Mutex<Vec<BackendOperation>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pipeline with existing connectors.
    pub fn with_pipeline(self, pipeline_id: &str, connectors: Vec<ConnectorDescriptor>) -> Self {
        if let Ok(mut pipelines) = self.pipelines.lock() {
            pipelines.insert(pipeline_id.to_string(), connectors);
        }
        self
    }

    /// Make the next call of `op` fail.
    pub fn fail_next(&self, op: BackendOperation) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(op);
        }
    }

    /// Simulate a state report from the running cluster.
    pub fn set_state(&self, id: &str, state: ConnectorState) -> Result<()> {
        let mut pipelines = self.lock_pipelines()?;
        let connector = pipelines
            .values_mut()
            .flat_map(|v| v.iter_mut())
            .find(|c| c.id == id)
            .ok_or_else(|| PipedeckError::ConnectorNotFound { id: id.to_string() })?;
        connector.state = state;
        Ok(())
    }

    /// Stored connectors of a pipeline, bypassing failure injection.
    pub fn connectors(&self, pipeline_id: &str) -> Vec<ConnectorDescriptor> {
        self.pipelines
            .lock()
            .ok()
            .and_then(|p| p.get(pipeline_id).cloned())
            .unwrap_or_default()
    }

    /// Operations invoked so far, in order.
    pub fn calls(&self) -> Vec<BackendOperation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn begin(&self, op: BackendOperation) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(op);
        }
        let injected = self
            .failures
            .lock()
            .map(|mut f| f.remove(&op))
            .unwrap_or(false);
        if injected {
            return Err(PipedeckError::PersistenceFailure {
                operation: op.describe().to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn lock_pipelines(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<ConnectorDescriptor>>>> {
        self.pipelines
            .lock()
            .map_err(|_| PipedeckError::Other("in-memory backend lock poisoned".into()))
    }

    fn missing(op: BackendOperation, id: &str) -> PipedeckError {
        PipedeckError::PersistenceFailure {
            operation: op.describe().to_string(),
            message: format!("no artifact with id '{id}'"),
        }
    }
}

#[async_trait]
impl PipelineBackend for InMemoryBackend {
    async fn fetch_connectors(&self, pipeline_id: &str) -> Result<Vec<ConnectorDescriptor>> {
        self.begin(BackendOperation::Fetch)?;
        let pipelines = self.lock_pipelines()?;
        Ok(pipelines.get(pipeline_id).cloned().unwrap_or_default())
    }

    async fn upload_artifact(&self, pipeline_id: &str, file: &ArtifactFile) -> Result<()> {
        self.begin(BackendOperation::Upload)?;
        let mut pipelines = self.lock_pipelines()?;
        pipelines
            .entry(pipeline_id.to_string())
            .or_default()
            .push(ConnectorDescriptor {
                id: uuid::Uuid::new_v4().to_string(),
                name: file.name.clone(),
                kind: ConnectorKind::Stream,
                state: ConnectorState::Stopped,
            });
        Ok(())
    }

    async fn rename_artifact(&self, id: &str, new_name: &str) -> Result<()> {
        self.begin(BackendOperation::Rename)?;
        let mut pipelines = self.lock_pipelines()?;
        let connector = pipelines
            .values_mut()
            .flat_map(|v| v.iter_mut())
            .find(|c| c.id == id)
            .ok_or_else(|| Self::missing(BackendOperation::Rename, id))?;
        connector.name = new_name.to_string();
        Ok(())
    }

    async fn delete_artifact(&self, id: &str) -> Result<()> {
        self.begin(BackendOperation::Delete)?;
        let mut pipelines = self.lock_pipelines()?;
        for connectors in pipelines.values_mut() {
            if let Some(pos) = connectors.iter().position(|c| c.id == id) {
                connectors.remove(pos);
                return Ok(());
            }
        }
        Err(Self::missing(BackendOperation::Delete, id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

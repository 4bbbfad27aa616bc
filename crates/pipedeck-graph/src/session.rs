//! Editor session: a [`PipelineGraphModel`] paired with the backend that
//! persists it.
//!
//! Local validation always runs before a backend call, and the model only
//! changes after the backend confirms. A failed call leaves the model exactly
//! as it was (the last confirmed state) and surfaces `PersistenceFailure`.

use std::sync::Arc;

use pipedeck_types::{Connector, ConnectorKind, PipedeckError, Result};

use crate::backend::{ArtifactFile, BackendOperation, PipelineBackend};
use crate::model::{PipelineGraphModel, SnapshotOutcome};

/// Result of an accepted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The artifact was stored and the follow-up fetch completed.
    Refreshed(SnapshotOutcome),
    /// The artifact was stored but the follow-up fetch failed. The model
    /// does not show the new connector until a later refresh succeeds.
    RefreshFailed,
}

pub struct EditorSession {
    model: PipelineGraphModel,
    backend: Arc<dyn PipelineBackend>,
    /// Names stored by the backend that no applied snapshot has shown yet.
    unsynced_uploads: Vec<String>,
}

impl EditorSession {
    pub fn new(model: PipelineGraphModel, backend: Arc<dyn PipelineBackend>) -> Self {
        Self {
            model,
            backend,
            unsynced_uploads: Vec::new(),
        }
    }

    pub fn model(&self) -> &PipelineGraphModel {
        &self.model
    }

    /// Direct access for purely local interactions (selection, editing).
    pub fn model_mut(&mut self) -> &mut PipelineGraphModel {
        &mut self.model
    }

    pub fn into_model(self) -> PipelineGraphModel {
        self.model
    }

    /// Fetch the pipeline's connectors and apply them, unless a newer fetch
    /// was issued in the meantime.
    pub async fn refresh(&mut self) -> Result<SnapshotOutcome> {
        let ticket = self.model.begin_fetch();
        let pipeline_id = self.model.pipeline_id().to_string();
        let connectors = self
            .backend
            .fetch_connectors(&pipeline_id)
            .await
            .map_err(|e| self.persistence_failure(BackendOperation::Fetch, e))?;
        let outcome = self.model.apply_snapshot(ticket, connectors);
        if outcome == SnapshotOutcome::Applied {
            self.unsynced_uploads.clear();
        }
        Ok(outcome)
    }

    /// Upload a stream-processing jar, then re-fetch to pick up the
    /// server-assigned connector record.
    ///
    /// Once the backend stores the artifact the upload counts as done. A
    /// failed re-fetch is reported as [`UploadOutcome::RefreshFailed`], and
    /// the name stays reserved so a retry cannot store it twice.
    pub async fn upload(&mut self, file: ArtifactFile) -> Result<UploadOutcome> {
        self.model.check_add(&file.name, ConnectorKind::Stream)?;
        if self.unsynced_uploads.contains(&file.name) {
            return Err(PipedeckError::DuplicateName { name: file.name });
        }

        let pipeline_id = self.model.pipeline_id().to_string();
        self.backend
            .upload_artifact(&pipeline_id, &file)
            .await
            .map_err(|e| self.persistence_failure(BackendOperation::Upload, e))?;
        tracing::info!(pipeline_id = %pipeline_id, name = %file.name, "Artifact uploaded");
        self.unsynced_uploads.push(file.name);

        match self.refresh().await {
            Ok(outcome) => Ok(UploadOutcome::Refreshed(outcome)),
            Err(err) => {
                tracing::warn!(
                    pipeline_id = %pipeline_id,
                    error = %err,
                    "Upload stored but refresh failed"
                );
                Ok(UploadOutcome::RefreshFailed)
            }
        }
    }

    /// Validate, persist, then commit a rename locally.
    pub async fn rename(&mut self, id: &str, new_name: &str) -> Result<()> {
        self.model.check_rename(id, new_name)?;
        if self.model.connector(id).is_some_and(|c| c.name == new_name) {
            return Ok(());
        }

        self.backend
            .rename_artifact(id, new_name)
            .await
            .map_err(|e| self.persistence_failure(BackendOperation::Rename, e))?;
        self.model.rename(id, new_name)
    }

    /// Finish the edit in progress and persist its draft name, if any.
    pub async fn commit_edit(&mut self) -> Result<()> {
        match self.model.finish_edit()? {
            Some(request) => self.rename(&request.connector_id, &request.new_name).await,
            None => Ok(()),
        }
    }

    pub fn request_delete(&mut self, id: &str) -> Result<()> {
        self.model.request_delete(id)
    }

    pub fn cancel_delete(&mut self) {
        self.model.cancel_delete();
    }

    /// Persist a requested delete and remove the entry once the backend
    /// confirms. On failure the delete stays pending.
    pub async fn confirm_delete(&mut self, id: &str) -> Result<Connector> {
        self.model.ensure_delete_requested(id)?;
        self.backend
            .delete_artifact(id)
            .await
            .map_err(|e| self.persistence_failure(BackendOperation::Delete, e))?;
        self.model.confirm_delete(id)
    }

    fn persistence_failure(&self, op: BackendOperation, err: PipedeckError) -> PipedeckError {
        tracing::warn!(
            pipeline_id = %self.model.pipeline_id(),
            operation = op.describe(),
            error = %err,
            "Backend call failed"
        );
        match err {
            PipedeckError::PersistenceFailure { .. } => err,
            other => PipedeckError::PersistenceFailure {
                operation: op.describe().to_string(),
                message: other.to_string(),
            },
        }
    }
}

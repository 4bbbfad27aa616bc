//! Snapshot files: a point-in-time copy of a pipeline's connector records.
//!
//! Snapshots are what the backend returns for a pipeline fetch. Persisting
//! them as JSON lets tools inspect a pipeline offline and lets a model be
//! rebuilt without a live backend.

use std::path::Path;

use chrono::{DateTime, Utc};
use pipedeck_types::{ConnectorDescriptor, Result};
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::model::PipelineGraphModel;

/// Connector records of one pipeline as fetched at `fetched_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pipeline_id: String,
    pub pipeline_name: String,
    #[serde(default)]
    pub connectors: Vec<ConnectorDescriptor>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(
        pipeline_id: impl Into<String>,
        pipeline_name: impl Into<String>,
        connectors: Vec<ConnectorDescriptor>,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            pipeline_name: pipeline_name.into(),
            connectors,
            fetched_at: Utc::now(),
        }
    }

    /// Capture the current connectors of `model`, without selection state.
    pub fn capture(model: &PipelineGraphModel) -> Self {
        Self::new(
            model.pipeline_id(),
            model.pipeline_name(),
            model.objects().iter().map(|c| c.descriptor()).collect(),
        )
    }

    /// Build a fresh model holding this snapshot's connectors.
    pub fn into_model(self, config: ModelConfig) -> PipelineGraphModel {
        let mut model = PipelineGraphModel::with_config(self.pipeline_id, self.pipeline_name, config);
        let ticket = model.begin_fetch();
        model.apply_snapshot(ticket, self.connectors);
        model
    }
}

/// Write a snapshot to `path` as pretty JSON, creating parent directories.
pub async fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    tokio::fs::write(path, json).await?;
    tracing::debug!(path = %path.display(), "Snapshot saved");
    Ok(())
}

/// Read a snapshot from `path`.
pub async fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = tokio::fs::read_to_string(path).await?;
    let snapshot: Snapshot = serde_json::from_str(&json)?;
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

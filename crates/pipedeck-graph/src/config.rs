//! Model configuration: naming rules and event channel sizing.

use std::path::Path;

use pipedeck_types::{ConnectorKind, Result};
use serde::{Deserialize, Serialize};

use crate::naming::JAR_EXTENSION;

/// Configuration for a [`PipelineGraphModel`](crate::PipelineGraphModel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Suffix every artifact-bearing connector name must end with.
    pub extension: String,
    /// Kinds whose names are uploaded file names and carry the extension rule.
    pub artifact_kinds: Vec<ConnectorKind>,
    /// Capacity of the graph-changed broadcast channel.
    pub event_capacity: usize,
}

impl ModelConfig {
    /// Read a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn is_artifact_kind(&self, kind: ConnectorKind) -> bool {
        self.artifact_kinds.contains(&kind)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            extension: JAR_EXTENSION.to_string(),
            artifact_kinds: vec![ConnectorKind::Stream],
            event_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_requires_jar_for_streams_only() {
        let config = ModelConfig::default();
        assert_eq!(config.extension, ".jar");
        assert!(config.is_artifact_kind(ConnectorKind::Stream));
        assert!(!config.is_artifact_kind(ConnectorKind::Source));
        assert!(!config.is_artifact_kind(ConnectorKind::Topic));
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipedeck.json");
        std::fs::write(&path, r#"{"extension": ".zip"}"#).unwrap();

        let config = ModelConfig::load(&path).unwrap();
        assert_eq!(config.extension, ".zip");
        assert_eq!(config.artifact_kinds, vec![ConnectorKind::Stream]);
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, pipedeck_types::PipedeckError::Io(_)));
    }
}

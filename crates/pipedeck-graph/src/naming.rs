//! Naming rules for uploadable artifacts.
//!
//! The predicates here are pure and never fail. [`check_candidate`] combines
//! them into the typed rejection the model hands back to its caller.

use pipedeck_types::{Connector, ConnectorKind, PipedeckError, Result};

use crate::config::ModelConfig;

/// Required suffix for stream-processing jars.
pub const JAR_EXTENSION: &str = ".jar";

/// True iff `name` ends with [`JAR_EXTENSION`]. Case-sensitive.
pub fn validate_extension(name: &str) -> bool {
    validate_extension_with(name, JAR_EXTENSION)
}

/// True iff `name` ends with `extension`. Only the suffix is compared; the
/// name is not parsed as a path.
pub fn validate_extension_with(name: &str, extension: &str) -> bool {
    name.ends_with(extension)
}

/// True iff some connector in `existing`, other than `exclude_id`, is named
/// exactly `name`.
pub fn is_duplicate(name: &str, existing: &[Connector], exclude_id: Option<&str>) -> bool {
    existing
        .iter()
        .filter(|c| exclude_id != Some(c.id.as_str()))
        .any(|c| c.name == name)
}

/// Validate a candidate name for a connector of `kind`.
///
/// The extension rule applies to artifact-bearing kinds only. Uniqueness is
/// checked against connectors in the same constraint class as `kind`, so a
/// topic never blocks a jar of the same name. The extension is checked first.
pub fn check_candidate(
    name: &str,
    kind: ConnectorKind,
    existing: &[Connector],
    exclude_id: Option<&str>,
    config: &ModelConfig,
) -> Result<()> {
    let is_artifact = config.is_artifact_kind(kind);

    if is_artifact && !validate_extension_with(name, &config.extension) {
        return Err(PipedeckError::InvalidExtension {
            name: name.to_string(),
            extension: config.extension.clone(),
        });
    }

    let taken = existing
        .iter()
        .filter(|c| config.is_artifact_kind(c.kind) == is_artifact)
        .filter(|c| exclude_id != Some(c.id.as_str()))
        .any(|c| c.name == name);
    if taken {
        return Err(PipedeckError::DuplicateName {
            name: name.to_string(),
        });
    }

    Ok(())
}

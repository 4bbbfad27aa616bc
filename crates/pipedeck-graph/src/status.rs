//! Pipeline status derivation.
//!
//! A pipeline is `Running` as soon as **any** of its connectors reports
//! `Running`. It is not a majority vote and does not require every connector
//! to run. Status is recomputed on every read and never cached.

use pipedeck_types::{Connector, ConnectorDescriptor, PipelineStatus, PipelineSummary};
use serde::Serialize;

/// Derive the pipeline status from its connector objects.
pub fn aggregate(objects: &[Connector]) -> PipelineStatus {
    status_of(objects.iter().map(|c| c.state.is_running()))
}

/// Same as [`aggregate`], for raw backend records.
pub fn aggregate_descriptors(objects: &[ConnectorDescriptor]) -> PipelineStatus {
    status_of(objects.iter().map(|d| d.state.is_running()))
}

fn status_of(mut running: impl Iterator<Item = bool>) -> PipelineStatus {
    if running.any(|r| r) {
        PipelineStatus::Running
    } else {
        PipelineStatus::Stopped
    }
}

/// A pipeline list row with its derived status attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineListEntry {
    #[serde(flatten)]
    pub pipeline: PipelineSummary,
    pub status: PipelineStatus,
}

/// Attach the derived status to each pipeline of a list response.
pub fn with_status(pipelines: Vec<PipelineSummary>) -> Vec<PipelineListEntry> {
    pipelines
        .into_iter()
        .map(|pipeline| {
            let status = aggregate_descriptors(&pipeline.objects);
            PipelineListEntry { pipeline, status }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipedeck_types::{ConnectorKind, ConnectorState};

    fn conn(id: &str, state: ConnectorState) -> Connector {
        Connector::new(id, format!("{id}.jar"), ConnectorKind::Stream).with_state(state)
    }

    #[test]
    fn empty_pipeline_is_stopped() {
        assert_eq!(aggregate(&[]), PipelineStatus::Stopped);
    }

    #[test]
    fn one_running_connector_is_enough() {
        let objects = vec![
            conn("1", ConnectorState::Stopped),
            conn("2", ConnectorState::Failed),
            conn("3", ConnectorState::Running),
        ];
        assert_eq!(aggregate(&objects), PipelineStatus::Running);
    }

    #[test]
    fn uniform_non_running_lists_are_stopped() {
        for state in [
            ConnectorState::Failed,
            ConnectorState::Stopped,
            ConnectorState::Unknown,
        ] {
            let objects = vec![conn("1", state), conn("2", state)];
            assert_eq!(aggregate(&objects), PipelineStatus::Stopped, "all {state}");
        }
    }

    #[test]
    fn with_status_marks_each_pipeline() {
        let pipelines: Vec<PipelineSummary> = serde_json::from_str(
            r#"[
                {"id": "p1", "name": "first", "objects": [
                    {"id": "a", "name": "a", "kind": "source", "state": "RUNNING"},
                    {"id": "b", "name": "b", "kind": "sink", "state": "RUNNING"}
                ]},
                {"id": "p2", "name": "second", "objects": [
                    {"id": "c", "name": "c", "kind": "source"},
                    {"id": "d", "name": "d", "kind": "sink"}
                ]},
                {"id": "p3", "name": "empty"}
            ]"#,
        )
        .unwrap();

        let listed = with_status(pipelines);
        let statuses: Vec<_> = listed.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                PipelineStatus::Running,
                PipelineStatus::Stopped,
                PipelineStatus::Stopped
            ]
        );
    }

    #[test]
    fn list_entry_serializes_flat() {
        let entry = PipelineListEntry {
            pipeline: PipelineSummary {
                id: "p".into(),
                name: "n".into(),
                objects: vec![],
            },
            status: PipelineStatus::Stopped,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "p");
        assert_eq!(json["status"], "Stopped");
    }
}

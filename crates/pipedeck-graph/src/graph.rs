//! Renderable projections of the model: graph nodes and pipeline views.

use pipedeck_types::{Connector, ConnectorKind, ConnectorState, PipelineStatus};
use serde::{Deserialize, Serialize};

use crate::classify::{classify, status_icon, DisplayIcon};
use crate::status::aggregate;

/// A connector as the rendering layer draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub kind: ConnectorKind,
    pub state: ConnectorState,
    pub is_active: bool,
    pub icon: DisplayIcon,
    pub status_icon: DisplayIcon,
}

impl GraphNode {
    pub fn from_connector(connector: &Connector) -> Self {
        Self {
            id: connector.id.clone(),
            name: connector.name.clone(),
            kind: connector.kind,
            state: connector.state,
            is_active: connector.is_active,
            icon: classify(connector.kind),
            status_icon: status_icon(connector.state),
        }
    }
}

/// A pipeline together with its derived status, as carried by change events.
///
/// Deserializing ignores any stored `status` and derives it from `objects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredView")]
pub struct PipelineView {
    pub id: String,
    pub name: String,
    pub objects: Vec<Connector>,
    pub status: PipelineStatus,
}

impl PipelineView {
    pub fn new(id: &str, name: &str, objects: &[Connector]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            objects: objects.to_vec(),
            status: aggregate(objects),
        }
    }

    pub fn graph_nodes(&self) -> Vec<GraphNode> {
        self.objects.iter().map(GraphNode::from_connector).collect()
    }
}

#[derive(Deserialize)]
struct StoredView {
    id: String,
    name: String,
    #[serde(default)]
    objects: Vec<Connector>,
}

impl From<StoredView> for PipelineView {
    fn from(stored: StoredView) -> Self {
        let status = aggregate(&stored.objects);
        Self {
            id: stored.id,
            name: stored.name,
            objects: stored.objects,
            status,
        }
    }
}

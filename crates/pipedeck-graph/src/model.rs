//! The pipeline graph model: connectors of one pipeline and the rules for
//! changing them.
//!
//! The model is a plain in-memory aggregate owned by a single editing
//! session. Every mutating operation is all-or-nothing: on a validation
//! failure the model is left exactly as it was and the caller receives a typed
//! [`PipedeckError`]. Successful mutations broadcast a [`GraphEvent`].

use pipedeck_types::{
    Connector, ConnectorDescriptor, ConnectorKind, PipedeckError, PipelineStatus, Result,
};

use crate::config::ModelConfig;
use crate::events::{EventEmitter, GraphChange, GraphEvent};
use crate::graph::{GraphNode, PipelineView};
use crate::naming::check_candidate;
use crate::status::aggregate;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Interaction state of a single connector entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Unselected,
    Selected,
    Editing,
}

/// Token identifying one fetch request. Only the most recently issued ticket
/// may apply its snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Result of offering a fetched snapshot to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Applied,
    /// A newer fetch was issued; the snapshot was discarded.
    Stale,
}

/// A rename the user confirmed in the editor, waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub connector_id: String,
    pub new_name: String,
}

#[derive(Debug, Clone)]
struct EditState {
    connector_id: String,
    draft: Option<String>,
}

/// Connectors of one pipeline plus selection, editing and delete-confirmation
/// state.
pub struct PipelineGraphModel {
    pipeline_id: String,
    pipeline_name: String,
    objects: Vec<Connector>,
    editing: Option<EditState>,
    pending_delete: Option<String>,
    latest_ticket: u64,
    config: ModelConfig,
    emitter: EventEmitter,
}

// ---------------------------------------------------------------------------
// PipelineGraphModel
// ---------------------------------------------------------------------------

impl PipelineGraphModel {
    /// Create an empty model using the default `.jar` naming rules.
    pub fn new(pipeline_id: impl Into<String>, pipeline_name: impl Into<String>) -> Self {
        Self::with_config(pipeline_id, pipeline_name, ModelConfig::default())
    }

    pub fn with_config(
        pipeline_id: impl Into<String>,
        pipeline_name: impl Into<String>,
        config: ModelConfig,
    ) -> Self {
        let emitter = EventEmitter::new(config.event_capacity);
        Self {
            pipeline_id: pipeline_id.into(),
            pipeline_name: pipeline_name.into(),
            objects: Vec::new(),
            editing: None,
            pending_delete: None,
            latest_ticket: 0,
            config,
            emitter,
        }
    }

    // --- Accessors ---

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn objects(&self) -> &[Connector] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.objects.iter().find(|c| c.id == id)
    }

    /// The currently selected connector, if any.
    pub fn selected(&self) -> Option<&Connector> {
        self.objects.iter().find(|c| c.is_active)
    }

    /// Derived pipeline status; recomputed on every call.
    pub fn status(&self) -> PipelineStatus {
        aggregate(&self.objects)
    }

    pub fn view(&self) -> PipelineView {
        PipelineView::new(&self.pipeline_id, &self.pipeline_name, &self.objects)
    }

    pub fn entry_state(&self, id: &str) -> Option<EntryState> {
        let connector = self.connector(id)?;
        let state = match &self.editing {
            Some(edit) if edit.connector_id == id => EntryState::Editing,
            _ if connector.is_active => EntryState::Selected,
            _ => EntryState::Unselected,
        };
        Some(state)
    }

    /// Subscribe to graph-changed events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<GraphEvent> {
        self.emitter.subscribe()
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    // --- Validation ---

    /// Check whether a new connector named `name` of `kind` would be accepted.
    pub fn check_add(&self, name: &str, kind: ConnectorKind) -> Result<()> {
        check_candidate(name, kind, &self.objects, None, &self.config)
    }

    /// Check whether connector `id` may be renamed to `new_name`. The
    /// connector's own current name never counts as a duplicate.
    pub fn check_rename(&self, id: &str, new_name: &str) -> Result<()> {
        let connector = self.require(id)?;
        if connector.name == new_name {
            return Ok(());
        }
        check_candidate(new_name, connector.kind, &self.objects, Some(id), &self.config)
    }

    // --- Mutations ---

    /// Append a connector and make it the only selected entry.
    pub fn add(&mut self, mut connector: Connector) -> Result<()> {
        if let Err(err) = self.check_add(&connector.name, connector.kind) {
            self.log_rejection(&connector.name, &err);
            return Err(err);
        }
        if self.connector(&connector.id).is_some() {
            return Err(PipedeckError::Other(format!(
                "Connector id '{}' already exists in pipeline '{}'",
                connector.id, self.pipeline_id
            )));
        }

        let id = connector.id.clone();
        self.clear_selection();
        connector.is_active = true;
        tracing::info!(
            pipeline_id = %self.pipeline_id,
            connector_id = %id,
            name = %connector.name,
            kind = %connector.kind,
            "Connector added"
        );
        self.objects.push(connector);
        self.notify(GraphChange::ConnectorAdded { connector_id: id });
        Ok(())
    }

    /// Change only the name of connector `id`.
    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<()> {
        if let Err(err) = self.check_rename(id, new_name) {
            self.log_rejection(new_name, &err);
            return Err(err);
        }
        let connector = self.require_mut(id)?;
        if connector.name == new_name {
            return Ok(());
        }
        let old_name = std::mem::replace(&mut connector.name, new_name.to_string());
        tracing::info!(
            pipeline_id = %self.pipeline_id,
            connector_id = %id,
            old_name = %old_name,
            new_name = %new_name,
            "Connector renamed"
        );
        self.notify(GraphChange::ConnectorRenamed {
            connector_id: id.to_string(),
            old_name,
            new_name: new_name.to_string(),
        });
        Ok(())
    }

    /// Remove connector `id`, dropping any selection, edit or pending delete
    /// that referred to it.
    pub fn remove(&mut self, id: &str) -> Result<Connector> {
        let index = self
            .objects
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| PipedeckError::ConnectorNotFound { id: id.to_string() })?;
        let removed = self.objects.remove(index);

        if self.editing.as_ref().is_some_and(|e| e.connector_id == id) {
            self.editing = None;
        }
        if self.pending_delete.as_deref() == Some(id) {
            self.pending_delete = None;
        }

        tracing::info!(
            pipeline_id = %self.pipeline_id,
            connector_id = %id,
            name = %removed.name,
            "Connector removed"
        );
        self.notify(GraphChange::ConnectorRemoved {
            connector_id: id.to_string(),
        });
        Ok(removed)
    }

    /// Make `id` the only selected entry. Any edit in progress on another
    /// entry is abandoned.
    pub fn select(&mut self, id: &str) -> Result<()> {
        self.require(id)?;
        if self.editing.as_ref().is_some_and(|e| e.connector_id != id) {
            self.editing = None;
        }
        self.clear_selection();
        self.require_mut(id)?.is_active = true;
        tracing::debug!(pipeline_id = %self.pipeline_id, connector_id = %id, "Connector selected");
        self.notify(GraphChange::ConnectorSelected {
            connector_id: id.to_string(),
        });
        Ok(())
    }

    // --- Editing ---

    /// Enter the editing state for `id`, selecting it first if necessary.
    pub fn begin_edit(&mut self, id: &str) -> Result<()> {
        if self.selected().map(|c| c.id.as_str()) != Some(id) {
            self.select(id)?;
        }
        self.editing = Some(EditState {
            connector_id: id.to_string(),
            draft: None,
        });
        Ok(())
    }

    /// Record a draft name for the entry being edited. The draft is validated
    /// immediately; an invalid draft is rejected and the previous one kept.
    pub fn edit_draft(&mut self, name: &str) -> Result<()> {
        let id = self
            .editing
            .as_ref()
            .map(|e| e.connector_id.clone())
            .ok_or(PipedeckError::NotEditing)?;
        if let Err(err) = self.check_rename(&id, name) {
            self.log_rejection(name, &err);
            return Err(err);
        }
        if let Some(edit) = self.editing.as_mut() {
            edit.draft = Some(name.to_string());
        }
        Ok(())
    }

    /// The draft name of the entry being edited, if one was entered.
    pub fn draft(&self) -> Option<&str> {
        self.editing.as_ref().and_then(|e| e.draft.as_deref())
    }

    /// Leave the editing state (confirm or focus-out). Returns the rename to
    /// persist when the draft differs from the current name; the name itself
    /// is not changed here.
    pub fn finish_edit(&mut self) -> Result<Option<RenameRequest>> {
        let edit = self.editing.take().ok_or(PipedeckError::NotEditing)?;
        let Some(draft) = edit.draft else {
            return Ok(None);
        };
        let current = self.require(&edit.connector_id)?;
        if current.name == draft {
            return Ok(None);
        }
        Ok(Some(RenameRequest {
            connector_id: edit.connector_id,
            new_name: draft,
        }))
    }

    /// Leave the editing state and discard the draft.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // --- Two-phase delete ---

    /// First phase of a delete: remember which connector awaits confirmation.
    pub fn request_delete(&mut self, id: &str) -> Result<()> {
        self.require(id)?;
        self.pending_delete = Some(id.to_string());
        Ok(())
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Second phase: remove the connector previously passed to
    /// [`request_delete`](Self::request_delete).
    pub fn confirm_delete(&mut self, id: &str) -> Result<Connector> {
        self.ensure_delete_requested(id)?;
        self.remove(id)
    }

    /// Fails with `DeleteNotRequested` unless `id` is awaiting confirmation.
    pub fn ensure_delete_requested(&self, id: &str) -> Result<()> {
        if self.pending_delete.as_deref() == Some(id) {
            Ok(())
        } else {
            Err(PipedeckError::DeleteNotRequested { id: id.to_string() })
        }
    }

    /// Abandon a pending delete. Connectors and selection are untouched.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    // --- Projection ---

    /// Project connector `id` into a renderable graph node.
    pub fn to_graph_node(&self, id: &str) -> Option<GraphNode> {
        self.connector(id).map(GraphNode::from_connector)
    }

    pub fn graph_nodes(&self) -> Vec<GraphNode> {
        self.objects.iter().map(GraphNode::from_connector).collect()
    }

    // --- Snapshots ---

    /// Issue a ticket for a new fetch. Any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        FetchTicket(self.latest_ticket)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest_ticket
    }

    /// Replace the connectors with a fetched snapshot.
    ///
    /// Snapshots from superseded tickets are discarded. The selected entry
    /// survives if it is still present; otherwise the first entry is
    /// selected. Applying the same snapshot twice yields the same state.
    pub fn apply_snapshot(
        &mut self,
        ticket: FetchTicket,
        descriptors: Vec<ConnectorDescriptor>,
    ) -> SnapshotOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(
                pipeline_id = %self.pipeline_id,
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Ignoring stale snapshot"
            );
            return SnapshotOutcome::Stale;
        }

        let previous = self.selected().map(|c| c.id.clone());
        let mut objects: Vec<Connector> = descriptors.into_iter().map(Connector::from).collect();
        let active = previous
            .filter(|id| objects.iter().any(|c| &c.id == id))
            .or_else(|| objects.first().map(|c| c.id.clone()));
        if let Some(active) = active {
            if let Some(c) = objects.iter_mut().find(|c| c.id == active) {
                c.is_active = true;
            }
        }
        self.objects = objects;

        let editing_gone = self
            .editing
            .as_ref()
            .is_some_and(|e| self.selected().map(|c| c.id.as_str()) != Some(e.connector_id.as_str()));
        if editing_gone {
            self.editing = None;
        }
        if let Some(pending) = self.pending_delete.clone() {
            if self.connector(&pending).is_none() {
                self.pending_delete = None;
            }
        }

        tracing::debug!(
            pipeline_id = %self.pipeline_id,
            ticket = ticket.0,
            connectors = self.objects.len(),
            "Snapshot applied"
        );
        self.notify(GraphChange::SnapshotApplied {
            ticket: ticket.0,
            connector_count: self.objects.len(),
        });
        SnapshotOutcome::Applied
    }

    // --- Internals ---

    fn require(&self, id: &str) -> Result<&Connector> {
        self.connector(id)
            .ok_or_else(|| PipedeckError::ConnectorNotFound { id: id.to_string() })
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Connector> {
        self.objects
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PipedeckError::ConnectorNotFound { id: id.to_string() })
    }

    fn clear_selection(&mut self) {
        for c in &mut self.objects {
            c.is_active = false;
        }
    }

    fn log_rejection(&self, name: &str, err: &PipedeckError) {
        tracing::debug!(
            pipeline_id = %self.pipeline_id,
            name = %name,
            reason = %err,
            "Connector name rejected"
        );
    }

    fn notify(&self, change: GraphChange) {
        self.emitter.emit(GraphEvent {
            change,
            pipeline: self.view(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Graph-changed notifications.
//!
//! Emits [`GraphEvent`]s via a [`tokio::sync::broadcast`] channel so that the
//! rendering layer (or any other observer) can subscribe to model changes
//! without coupling to the model internals.

use serde::{Deserialize, Serialize};

use crate::graph::PipelineView;

/// What kind of mutation produced a [`GraphEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphChange {
    ConnectorAdded {
        connector_id: String,
    },
    ConnectorRenamed {
        connector_id: String,
        old_name: String,
        new_name: String,
    },
    ConnectorRemoved {
        connector_id: String,
    },
    ConnectorSelected {
        connector_id: String,
    },
    SnapshotApplied {
        ticket: u64,
        connector_count: usize,
    },
}

/// Emitted after every successful mutation, carrying the updated pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEvent {
    pub change: GraphChange,
    pub pipeline: PipelineView,
}

/// Event emitter wrapping a broadcast sender.
#[derive(Clone)]
pub struct EventEmitter {
    sender: tokio::sync::broadcast::Sender<GraphEvent>,
}

impl EventEmitter {
    /// Create a new emitter with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Emit an event to all current subscribers.
    ///
    /// If there are no active receivers the event is silently dropped.
    pub fn emit(&self, event: GraphEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<GraphEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipedeck_types::PipelineStatus;

    fn empty_view() -> PipelineView {
        PipelineView::new("p1", "orders", &[])
    }

    #[tokio::test]
    async fn emitter_sends_and_receives() {
        let emitter = EventEmitter::new(16);
        let mut rx = emitter.subscribe();

        emitter.emit(GraphEvent {
            change: GraphChange::ConnectorRemoved {
                connector_id: "c1".into(),
            },
            pipeline: empty_view(),
        });

        let event = rx.recv().await.unwrap();
        match event.change {
            GraphChange::ConnectorRemoved { connector_id } => assert_eq!(connector_id, "c1"),
            other => panic!("unexpected change: {:?}", other),
        }
        assert_eq!(event.pipeline.status, PipelineStatus::Stopped);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let emitter = EventEmitter::new(16);
        let mut rx1 = emitter.subscribe();
        let mut rx2 = emitter.subscribe();
        assert_eq!(emitter.subscriber_count(), 2);

        emitter.emit(GraphEvent {
            change: GraphChange::SnapshotApplied {
                ticket: 3,
                connector_count: 0,
            },
            pipeline: empty_view(),
        });

        assert_eq!(rx1.recv().await.unwrap(), rx2.recv().await.unwrap());
    }

    #[test]
    fn emit_with_no_subscribers_does_not_panic() {
        let emitter = EventEmitter::new(16);
        emitter.emit(GraphEvent {
            change: GraphChange::ConnectorSelected {
                connector_id: "x".into(),
            },
            pipeline: empty_view(),
        });
    }

    #[test]
    fn event_json_names_the_change() {
        let event = GraphEvent {
            change: GraphChange::ConnectorRenamed {
                connector_id: "7".into(),
                old_name: "a.jar".into(),
                new_name: "b.jar".into(),
            },
            pipeline: empty_view(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["change"]["ConnectorRenamed"]["new_name"], "b.jar");
        assert_eq!(json["pipeline"]["status"], "Stopped");
    }
}

//! Display affordances for connector kinds and states.

use pipedeck_types::{ConnectorKind, ConnectorState};
use serde::{Serialize, Serializer};

/// Icon hint attached to a rendered graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayIcon {
    FileImport,
    FileExport,
    ListUl,
    Wind,
    ExclamationCircle,
    None,
}

impl DisplayIcon {
    /// Icon identifier, or `""` for [`DisplayIcon::None`].
    pub fn as_class(self) -> &'static str {
        match self {
            DisplayIcon::FileImport => "fa-file-import",
            DisplayIcon::FileExport => "fa-file-export",
            DisplayIcon::ListUl => "fa-list-ul",
            DisplayIcon::Wind => "fa-wind",
            DisplayIcon::ExclamationCircle => "fa-exclamation-circle",
            DisplayIcon::None => "",
        }
    }

    pub fn is_none(self) -> bool {
        self == DisplayIcon::None
    }
}

impl Serialize for DisplayIcon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_class())
    }
}

/// Icon for a connector kind. Unrecognized kinds get no icon.
pub fn classify(kind: ConnectorKind) -> DisplayIcon {
    match kind {
        ConnectorKind::Source => DisplayIcon::FileImport,
        ConnectorKind::Sink => DisplayIcon::FileExport,
        ConnectorKind::Topic => DisplayIcon::ListUl,
        ConnectorKind::Stream => DisplayIcon::Wind,
        ConnectorKind::Other => DisplayIcon::None,
    }
}

/// Alert icon for failed connectors, nothing otherwise.
pub fn status_icon(state: ConnectorState) -> DisplayIcon {
    match state {
        ConnectorState::Failed => DisplayIcon::ExclamationCircle,
        _ => DisplayIcon::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_kind_has_a_distinct_icon() {
        let icons = [
            classify(ConnectorKind::Source),
            classify(ConnectorKind::Sink),
            classify(ConnectorKind::Topic),
            classify(ConnectorKind::Stream),
        ];
        assert_eq!(icons[0].as_class(), "fa-file-import");
        assert_eq!(icons[1].as_class(), "fa-file-export");
        assert_eq!(icons[2].as_class(), "fa-list-ul");
        assert_eq!(icons[3].as_class(), "fa-wind");
        let unique: std::collections::HashSet<_> = icons.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn unrecognized_kind_maps_to_empty_icon() {
        let icon = classify(ConnectorKind::Other);
        assert!(icon.is_none());
        assert_eq!(icon.as_class(), "");
    }

    #[test]
    fn only_failed_state_gets_an_alert() {
        assert_eq!(
            status_icon(ConnectorState::Failed),
            DisplayIcon::ExclamationCircle
        );
        for state in [
            ConnectorState::Running,
            ConnectorState::Stopped,
            ConnectorState::Unknown,
        ] {
            assert!(status_icon(state).is_none(), "{state} should have no icon");
        }
    }

    #[test]
    fn icon_serializes_as_identifier() {
        assert_eq!(
            serde_json::to_string(&DisplayIcon::Wind).unwrap(),
            "\"fa-wind\""
        );
        assert_eq!(serde_json::to_string(&DisplayIcon::None).unwrap(), "\"\"");
    }
}

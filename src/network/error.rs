//! Network construction and lookup errors.

use std::fmt;

use crate::models::NodeId;
use crate::rate::RateShapeError;

/// No travel duration is known between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoTravelTimeError {
    /// Departure node.
    pub from: NodeId,
    /// Destination node.
    pub to: NodeId,
}

impl fmt::Display for NoTravelTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no travel time from node {} to node {}", self.from, self.to)
    }
}

impl std::error::Error for NoTravelTimeError {}

/// Kind of entity an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Station,
    Depot,
    Route,
    Train,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Station => "station",
            EntityKind::Depot => "depot",
            EntityKind::Route => "route",
            EntityKind::Train => "train",
        };
        f.write_str(name)
    }
}

/// A network could not be built from its definition.
///
/// These indicate a malformed problem definition and are raised before
/// any simulation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// An identifier is registered twice.
    DuplicateId { kind: EntityKind, id: NodeId },
    /// A referenced identifier is not registered.
    UnknownReference { kind: EntityKind, id: NodeId },
    /// A route's depot legs have no travel time.
    MissingTravelTime(NoTravelTimeError),
    /// A route has no stations.
    EmptyRoute { route: NodeId },
    /// A rate function has mismatched boundaries and values.
    Rate { depot: NodeId, source: RateShapeError },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::DuplicateId { kind, id } => write!(f, "duplicate {kind} id {id}"),
            NetworkError::UnknownReference { kind, id } => write!(f, "unknown {kind} id {id}"),
            NetworkError::MissingTravelTime(err) => write!(f, "{err}"),
            NetworkError::EmptyRoute { route } => write!(f, "route {route} has no stations"),
            NetworkError::Rate { depot, source } => {
                write!(f, "headway function of depot {depot}: {source}")
            }
        }
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetworkError::MissingTravelTime(err) => Some(err),
            NetworkError::Rate { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<NoTravelTimeError> for NetworkError {
    fn from(err: NoTravelTimeError) -> Self {
        NetworkError::MissingTravelTime(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = NetworkError::DuplicateId {
            kind: EntityKind::Depot,
            id: 7,
        };
        assert_eq!(err.to_string(), "duplicate depot id 7");

        let err: NetworkError = NoTravelTimeError { from: 1, to: 2 }.into();
        assert_eq!(err.to_string(), "no travel time from node 1 to node 2");
    }
}

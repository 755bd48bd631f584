//! Error type shared by the docking core.
//
//! Structural violations are programming errors and are reported right away;
//! format errors abort a read before anything is applied to the live tree.

use thiserror::Error;

use crate::layout::Version;
use crate::model::NodeId;

#[derive(Debug, Error)]
pub enum DockError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not a station")]
    NotAStation(NodeId),
    #[error("node {0:?} is not a dockable")]
    NotADockable(NodeId),
    #[error("node {0:?} already has a parent; drag it out first")]
    AlreadyParented(NodeId),
    #[error("node {0:?} has no parent")]
    NotParented(NodeId),
    #[error("dropping {child:?} into {station:?} would create a cycle")]
    Cycle { station: NodeId, child: NodeId },
    #[error("station {station:?} rejected {dockable:?}")]
    Rejected { station: NodeId, dockable: NodeId },
    #[error("hierarchy of {0:?} is locked by another operation")]
    HierarchyLocked(NodeId),
    #[error("station {0:?} is already registered as a root")]
    AlreadyRoot(NodeId),
    #[error("duplicate {namespace} id '{id}'")]
    DuplicateId { namespace: &'static str, id: String },
    #[error("unknown {namespace} id '{id}'")]
    UnknownId { namespace: &'static str, id: String },
    #[error("inconsistent tree: {0}")]
    Inconsistent(String),
    #[error("unsupported layout version {found}, newest readable version is {current}")]
    UnsupportedVersion { found: Version, current: Version },
    #[error("malformed layout: {0}")]
    Format(String),
    #[error("xml error: {0}")]
    Xml(String),
    #[error("layout i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type DockResult<T> = Result<T, DockError>;

impl DockError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }
}

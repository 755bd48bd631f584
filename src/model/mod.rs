//! Element model: dockables, stations and the arena that owns them.

pub mod dockable;
pub mod path;
pub mod split;
pub mod station;
pub mod tree;

pub use dockable::{Capabilities, DockAction, DockContent, Dockable, TextContent, TitleId};
pub use path::{DockLocation, DockablePath, PathProperty, SplitStep};
pub use split::{InsertPosition, PathResolution, SplitNode};
pub use station::{FlapSide, Placement, Station, StationKind, flap_popup};
pub use tree::{DockTree, Element, Node};

use std::fmt;
use std::str::FromStr;

slotmap::new_key_type! {
    /// Arena key of a dockable or station.
    pub struct NodeId;
}

/// How a node participates in the tree at the moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Dockable,
    Station,
    /// A station that sits inside another station and therefore acts as a
    /// dockable as well.
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ExtendedMode {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Externalized,
}

impl ExtendedMode {
    pub const ALL: [ExtendedMode; 4] = [
        ExtendedMode::Normal,
        ExtendedMode::Minimized,
        ExtendedMode::Maximized,
        ExtendedMode::Externalized,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExtendedMode::Normal => "normal",
            ExtendedMode::Minimized => "minimized",
            ExtendedMode::Maximized => "maximized",
            ExtendedMode::Externalized => "externalized",
        }
    }
}

impl fmt::Display for ExtendedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtendedMode {
    type Err = crate::DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExtendedMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| crate::DockError::format(format!("unknown extended mode '{s}'")))
    }
}

/// Access to the non-owning back-reference every node carries.
pub trait HasParentSlot {
    fn parent(&self) -> Option<NodeId>;
}

/// Ordered children plus the one child shown in front.
pub trait HasChildren {
    fn children(&self) -> &[NodeId];
    fn front(&self) -> Option<NodeId>;

    fn child_count(&self) -> usize {
        self.children().len()
    }

    fn index_of(&self, child: NodeId) -> Option<usize> {
        self.children().iter().position(|c| *c == child)
    }
}

/// Stable identifier of the factory that knows how to persist a node.
pub trait Persistable {
    fn factory_id(&self) -> &str;
}

pub trait Focusable {
    fn focusable(&self) -> bool {
        true
    }
}

//! Which dockables change their mode together.

use std::fmt;

use crate::config::GroupBehaviorKind;
use crate::model::{DockTree, ExtendedMode, NodeId, StationKind};

/// The node that moves and the dockables whose mode changes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeGroup {
    pub unit: NodeId,
    pub members: Vec<NodeId>,
}

impl ModeGroup {
    pub fn single(dockable: NodeId) -> Self {
        Self {
            unit: dockable,
            members: vec![dockable],
        }
    }
}

pub trait GroupBehavior: fmt::Debug {
    fn group(&self, tree: &DockTree, dockable: NodeId, target: ExtendedMode) -> ModeGroup;
}

/// Every dockable moves on its own. The manager keeps a single maximized
/// unit across all maximize areas, so maximizing one dockable restores the
/// previous one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopmostBehavior;

impl GroupBehavior for TopmostBehavior {
    fn group(&self, _tree: &DockTree, dockable: NodeId, _target: ExtendedMode) -> ModeGroup {
        ModeGroup::single(dockable)
    }
}

/// A tab takes its whole stack along. If any tab of the stack cannot enter
/// the target mode, only the requested dockable moves, no matter how many
/// tabs the stack has.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackedBehavior;

impl GroupBehavior for StackedBehavior {
    fn group(&self, tree: &DockTree, dockable: NodeId, target: ExtendedMode) -> ModeGroup {
        let Some(parent) = tree.parent(dockable) else {
            return ModeGroup::single(dockable);
        };
        if !tree.station_kind(parent).is_some_and(StationKind::is_stack) {
            return ModeGroup::single(dockable);
        }
        let tabs = tree.children(parent);
        let capable = tabs.iter().all(|tab| match tree.dockable(*tab) {
            Some(d) => d.capabilities().supports(target),
            // nested stations cannot be judged tab by tab
            None => false,
        });
        if !capable {
            return ModeGroup::single(dockable);
        }
        ModeGroup {
            unit: parent,
            members: tabs.to_vec(),
        }
    }
}

pub fn behavior_for(kind: GroupBehaviorKind) -> Box<dyn GroupBehavior> {
    match kind {
        GroupBehaviorKind::Topmost => Box::new(TopmostBehavior),
        GroupBehaviorKind::Stacked => Box::new(StackedBehavior),
    }
}

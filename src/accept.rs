//! Global drop policies consulted for every drop, combination and replace.

use std::fmt;

use crate::model::{Capabilities, DockTree, NodeId, StationKind};

pub trait DockAcceptance: fmt::Debug {
    /// Whether `child` may become a child of `station`.
    fn accept(&self, tree: &DockTree, station: NodeId, child: NodeId) -> bool;

    /// Whether `child` may be stacked together with `target`, which already
    /// lives in `station`.
    fn accept_combination(&self, tree: &DockTree, station: NodeId, child: NodeId, target: NodeId) -> bool {
        let _ = target;
        self.accept(tree, station, child)
    }
}

/// Refuses drops that contradict the dockables' capabilities: flaps only
/// take minimizable content, screens only externalizable content and stacks
/// only stackable content.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityAcceptance;

impl CapabilityAcceptance {
    fn all_dockables(tree: &DockTree, node: NodeId, check: impl Fn(&Capabilities) -> bool) -> bool {
        tree.descendants(node)
            .into_iter()
            .filter_map(|id| tree.dockable(id))
            .all(|d| check(&d.capabilities()))
    }
}

impl DockAcceptance for CapabilityAcceptance {
    fn accept(&self, tree: &DockTree, station: NodeId, child: NodeId) -> bool {
        match tree.station_kind(station) {
            Some(StationKind::Flap { .. }) => Self::all_dockables(tree, child, |c| c.minimizable),
            Some(StationKind::Screen { .. }) => Self::all_dockables(tree, child, |c| c.externalizable),
            Some(StationKind::Stack) => Self::all_dockables(tree, child, |c| c.stackable),
            _ => true,
        }
    }

    fn accept_combination(&self, tree: &DockTree, station: NodeId, child: NodeId, target: NodeId) -> bool {
        self.accept(tree, station, child)
            && Self::all_dockables(tree, child, |c| c.stackable)
            && Self::all_dockables(tree, target, |c| c.stackable)
    }
}

/// Ordered list of policies; every one has to agree.
#[derive(Debug, Default)]
pub struct AcceptanceChain {
    entries: Vec<Box<dyn DockAcceptance>>,
}

impl AcceptanceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain preloaded with [`CapabilityAcceptance`].
    pub fn with_defaults() -> Self {
        let mut chain = Self::new();
        chain.add(CapabilityAcceptance);
        chain
    }

    pub fn add(&mut self, acceptance: impl DockAcceptance + 'static) {
        self.entries.push(Box::new(acceptance));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn accept(&self, tree: &DockTree, station: NodeId, child: NodeId) -> bool {
        self.entries.iter().all(|a| a.accept(tree, station, child))
    }

    pub fn accept_combination(&self, tree: &DockTree, station: NodeId, child: NodeId, target: NodeId) -> bool {
        self.entries
            .iter()
            .all(|a| a.accept_combination(tree, station, child, target))
    }
}

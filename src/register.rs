//! Bookkeeping of the roots and of every node reachable from them.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::{DockError, DockResult};
use crate::events::DockEvent;
use crate::model::{DockTree, NodeId};

#[derive(Debug, Default)]
pub struct DockRegister {
    roots: Vec<NodeId>,
    /// Reachable nodes in pre-order, with whether each is a station.
    order: Vec<(NodeId, bool)>,
    members: BTreeMap<NodeId, bool>,
    stalled: usize,
    queue: Vec<DockEvent>,
}

impl DockRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.roots.contains(&id)
    }

    pub fn is_registered(&self, id: NodeId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn registered_dockables(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .filter(|(_, station)| !station)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn registered_stations(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .filter(|(_, station)| *station)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn stall_count(&self) -> usize {
        self.stalled
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled > 0
    }

    pub(crate) fn add_root(&mut self, tree: &DockTree, station: NodeId) -> DockResult<()> {
        tree.require_station(station)?;
        if self.is_root(station) {
            return Err(DockError::AlreadyRoot(station));
        }
        self.roots.push(station);
        Ok(())
    }

    pub(crate) fn remove_root(&mut self, station: NodeId) -> DockResult<()> {
        let idx = self
            .roots
            .iter()
            .position(|r| *r == station)
            .ok_or(DockError::UnknownNode(station))?;
        self.roots.remove(idx);
        Ok(())
    }

    /// Increments or decrements the stall counter. Returns the queued events
    /// when the counter drops back to zero.
    pub(crate) fn set_stalled(&mut self, stalled: bool) -> Vec<DockEvent> {
        if stalled {
            self.stalled += 1;
            return Vec::new();
        }
        if self.stalled == 0 {
            warn!("unbalanced unstall of the dock register ignored");
            return Vec::new();
        }
        self.stalled -= 1;
        if self.stalled > 0 {
            return Vec::new();
        }
        let events = std::mem::take(&mut self.queue);
        debug!(count = events.len(), "dock register released queued events");
        events
    }

    /// Recomputes membership from the roots. Returns the events to fire right
    /// away; while stalled they are queued instead and the result is empty.
    pub(crate) fn update(&mut self, tree: &DockTree) -> Vec<DockEvent> {
        let mut order = Vec::new();
        let mut seen = BTreeSet::new();
        for root in &self.roots {
            for id in tree.descendants(*root) {
                if seen.insert(id) {
                    order.push((id, tree.station(id).is_some()));
                }
            }
        }
        let mut events = Vec::new();
        for (id, station) in &self.order {
            if !seen.contains(id) {
                events.push(if *station {
                    DockEvent::StationUnregistered(*id)
                } else {
                    DockEvent::DockableUnregistered(*id)
                });
            }
        }
        for (id, station) in &order {
            if !self.members.contains_key(id) {
                events.push(if *station {
                    DockEvent::StationRegistered(*id)
                } else {
                    DockEvent::DockableRegistered(*id)
                });
            }
        }
        self.members = order.iter().copied().collect();
        self.order = order;
        if events.is_empty() {
            return events;
        }
        debug!(count = events.len(), stalled = self.stalled, "dock register membership changed");
        if self.stalled == 0 {
            return events;
        }
        for event in events {
            self.enqueue(event);
        }
        Vec::new()
    }

    fn enqueue(&mut self, event: DockEvent) {
        if let Some(inverse) = event.inverse()
            && let Some(idx) = self.queue.iter().position(|queued| *queued == inverse)
        {
            self.queue.remove(idx);
            return;
        }
        if !self.queue.contains(&event) {
            self.queue.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dockable, Placement, Station};

    #[test]
    fn update_reports_new_members_in_preorder() {
        let mut tree = DockTree::new();
        let root = tree.add_station(Station::stack("root"));
        let a = tree.add_dockable(Dockable::text("a"));
        tree.attach(root, a, &Placement::Default).unwrap();
        let mut register = DockRegister::new();
        register.add_root(&tree, root).unwrap();
        let events = register.update(&tree);
        assert_eq!(
            events,
            vec![
                DockEvent::StationRegistered(root),
                DockEvent::DockableRegistered(a)
            ]
        );
        assert!(register.is_registered(a));
        assert_eq!(register.registered_dockables(), vec![a]);
        assert!(matches!(
            register.add_root(&tree, root),
            Err(DockError::AlreadyRoot(_))
        ));
    }

    #[test]
    fn stalled_add_then_remove_cancels() {
        let mut tree = DockTree::new();
        let root = tree.add_station(Station::stack("root"));
        let mut register = DockRegister::new();
        register.add_root(&tree, root).unwrap();
        register.update(&tree);

        register.set_stalled(true);
        let a = tree.add_dockable(Dockable::text("a"));
        tree.attach(root, a, &Placement::Default).unwrap();
        assert!(register.update(&tree).is_empty());
        // membership is tracked even while stalled
        assert!(register.is_registered(a));
        tree.detach(a).unwrap();
        assert!(register.update(&tree).is_empty());
        assert!(register.set_stalled(false).is_empty());
        assert!(!register.is_registered(a));
    }

    #[test]
    fn nested_stalls_release_once() {
        let mut tree = DockTree::new();
        let root = tree.add_station(Station::stack("root"));
        let mut register = DockRegister::new();
        register.add_root(&tree, root).unwrap();
        register.set_stalled(true);
        register.set_stalled(true);
        register.update(&tree);
        assert!(register.set_stalled(false).is_empty());
        assert_eq!(
            register.set_stalled(false),
            vec![DockEvent::StationRegistered(root)]
        );
        // unbalanced call is ignored
        assert!(register.set_stalled(false).is_empty());
        assert_eq!(register.stall_count(), 0);
    }
}

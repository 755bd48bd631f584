//! Logical focus, independent of whichever widget holds terminal input.

use tracing::debug;

use crate::events::DockEvent;
use crate::model::{DockTree, NodeId, StationKind};
use crate::register::DockRegister;

/// A request to move logical focus.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FocusRequest {
    pub dockable: Option<NodeId>,
    /// Native component inside the dockable that should receive input.
    pub component: Option<String>,
    /// Fire an event even if focus does not change.
    pub force: bool,
    /// Bring the dockable to the front of every ancestor.
    pub ensure: bool,
}

impl FocusRequest {
    pub fn new(dockable: NodeId) -> Self {
        Self {
            dockable: Some(dockable),
            ensure: true,
            ..Self::default()
        }
    }

    pub fn clear() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn without_ensure(mut self) -> Self {
        self.ensure = false;
        self
    }
}

/// Ordered cycle over focus candidates.
#[derive(Debug, Clone, Default)]
pub struct FocusRing<T: Copy + Eq> {
    order: Vec<T>,
    current: Option<T>,
}

impl<T: Copy + Eq> FocusRing<T> {
    pub fn set_order(&mut self, order: Vec<T>) {
        self.order = order;
    }

    pub fn current(&self) -> Option<T> {
        self.current
    }

    pub fn set_current(&mut self, current: Option<T>) {
        self.current = current;
    }

    pub fn advance(&mut self, forward: bool) -> Option<T> {
        if self.order.is_empty() {
            return None;
        }
        let idx = self
            .current
            .and_then(|c| self.order.iter().position(|item| *item == c));
        let next = match idx {
            Some(idx) => {
                let step = if forward { 1isize } else { -1isize };
                ((idx as isize + step).rem_euclid(self.order.len() as isize)) as usize
            }
            None if forward => 0,
            None => self.order.len() - 1,
        };
        self.current = Some(self.order[next]);
        self.current
    }
}

#[derive(Debug, Default)]
pub struct FocusController {
    ring: FocusRing<NodeId>,
    component_request: Option<(NodeId, String)>,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.ring.current()
    }

    /// Hands the last native component request to the rendering side.
    pub fn take_component_request(&mut self) -> Option<(NodeId, String)> {
        self.component_request.take()
    }

    pub(crate) fn focus(
        &mut self,
        tree: &mut DockTree,
        register: &DockRegister,
        request: &FocusRequest,
    ) -> Option<DockEvent> {
        if let Some(target) = request.dockable
            && !register.is_registered(target)
        {
            debug!(?target, "ignoring focus request for unregistered dockable");
            return None;
        }
        if request.ensure
            && let Some(target) = request.dockable
        {
            Self::bring_to_front(tree, target);
        }
        let old = self.ring.current();
        if old == request.dockable && !request.force {
            return None;
        }
        if let (Some(target), Some(component)) = (request.dockable, &request.component) {
            self.component_request = Some((target, component.clone()));
        }
        self.ring.set_current(request.dockable);
        debug!(?old, new = ?request.dockable, "focus changed");
        Some(DockEvent::FocusChanged {
            old,
            new: request.dockable,
        })
    }

    fn bring_to_front(tree: &mut DockTree, target: NodeId) {
        let mut child = target;
        while let Some(parent) = tree.parent(child) {
            if let Some(station) = tree.station_mut(parent)
                && matches!(station.kind(), StationKind::Stack | StationKind::Flap { .. })
            {
                station.set_front(Some(child));
            }
            child = parent;
        }
    }

    pub(crate) fn advance(
        &mut self,
        tree: &mut DockTree,
        register: &DockRegister,
        forward: bool,
    ) -> Option<DockEvent> {
        self.ring.set_order(register.registered_dockables());
        let old = self.ring.current();
        let next = self.ring.advance(forward);
        // restore so focus() sees the real previous value
        self.ring.set_current(old);
        let next = next?;
        self.focus(tree, register, &FocusRequest::new(next))
    }

    /// Drops focus if it pointed at a node that just left the tree.
    pub(crate) fn on_unregistered(&mut self, node: NodeId) -> Option<DockEvent> {
        if self.ring.current() != Some(node) {
            return None;
        }
        self.ring.set_current(None);
        if self
            .component_request
            .as_ref()
            .is_some_and(|(owner, _)| *owner == node)
        {
            self.component_request = None;
        }
        Some(DockEvent::FocusChanged {
            old: Some(node),
            new: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_wraps_both_ways() {
        let mut ring = FocusRing::default();
        ring.set_order(vec![1, 2, 3]);
        assert_eq!(ring.advance(true), Some(1));
        assert_eq!(ring.advance(false), Some(3));
        assert_eq!(ring.advance(true), Some(1));
        ring.set_current(Some(2));
        assert_eq!(ring.advance(true), Some(3));
    }

    #[test]
    fn empty_ring_stays_put() {
        let mut ring: FocusRing<u8> = FocusRing::default();
        assert_eq!(ring.advance(true), None);
        assert_eq!(ring.current(), None);
    }
}

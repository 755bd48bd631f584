//! Collapses stations left with one child or none.

use tracing::debug;

use crate::error::DockResult;
use crate::events::DockEvent;
use crate::lock::HierarchyLock;
use crate::model::{DockTree, HasChildren, NodeId};
use crate::register::DockRegister;

#[derive(Debug, Clone, Copy)]
pub struct SingleParentRemover {
    enabled: bool,
}

impl Default for SingleParentRemover {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SingleParentRemover {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn candidates(tree: &DockTree, register: &DockRegister, lock: &HierarchyLock) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = register
            .roots()
            .iter()
            .flat_map(|root| tree.descendants(*root))
            .filter(|id| {
                !register.is_root(*id)
                    && !lock.is_locked(*id)
                    && tree.parent(*id).is_some()
                    && tree
                        .station(*id)
                        .is_some_and(|s| !s.is_protected() && s.child_count() <= 1)
            })
            .collect();
        found.sort_by_key(|id| std::cmp::Reverse(tree.depth(*id)));
        found.dedup();
        found
    }

    /// Collapses deepest stations first and re-checks until nothing is left.
    pub(crate) fn run(
        &self,
        tree: &mut DockTree,
        register: &DockRegister,
        lock: &HierarchyLock,
    ) -> DockResult<Vec<DockEvent>> {
        let mut events = Vec::new();
        if !self.enabled {
            return Ok(events);
        }
        while let Some(station) = Self::candidates(tree, register, lock).first().copied() {
            Self::collapse(tree, lock, station)?;
            events.push(DockEvent::Collapsed { station });
        }
        Ok(events)
    }

    fn collapse(tree: &mut DockTree, lock: &HierarchyLock, station: NodeId) -> DockResult<()> {
        let only = tree.children(station).first().copied();
        match only {
            None => {
                let _guard = lock.acquire(station)?;
                tree.detach(station)?;
                debug!(?station, "removed empty station");
            }
            Some(child) => {
                let _guard = lock.acquire_all(&[station, child])?;
                tree.detach(child)?;
                tree.swap(station, child)?;
                debug!(?station, ?child, "promoted single child");
            }
        }
        tree.dispose(station)?;
        Ok(())
    }
}

//! Reentrancy guard for parent-changing operations.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::error::{DockError, DockResult};
use crate::model::NodeId;

/// Set of nodes currently being moved. Acquiring a held node fails right
/// away instead of blocking the UI thread against itself.
#[derive(Debug, Clone, Default)]
pub struct HierarchyLock {
    held: Rc<RefCell<BTreeSet<NodeId>>>,
}

#[derive(Debug)]
#[must_use = "the lock is released when the guard is dropped"]
pub struct LockGuard {
    held: Rc<RefCell<BTreeSet<NodeId>>>,
    nodes: Vec<NodeId>,
}

impl HierarchyLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, node: NodeId) -> DockResult<LockGuard> {
        self.acquire_all(&[node])
    }

    /// Takes every node or none of them.
    pub fn acquire_all(&self, nodes: &[NodeId]) -> DockResult<LockGuard> {
        let mut held = self.held.borrow_mut();
        if let Some(busy) = nodes.iter().find(|n| held.contains(n)) {
            return Err(DockError::HierarchyLocked(*busy));
        }
        let mut taken = Vec::with_capacity(nodes.len());
        for node in nodes {
            if held.insert(*node) {
                taken.push(*node);
            }
        }
        Ok(LockGuard {
            held: Rc::clone(&self.held),
            nodes: taken,
        })
    }

    pub fn is_locked(&self, node: NodeId) -> bool {
        self.held.borrow().contains(&node)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let mut held = self.held.borrow_mut();
        for node in &self.nodes {
            held.remove(node);
        }
    }
}

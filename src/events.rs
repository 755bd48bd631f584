//! Structural events and the command queue listeners use to request
//! follow-up mutations.

use std::cell::RefCell;
use std::rc::Rc;

use crate::focus::FocusRequest;
use crate::model::{DockTree, ExtendedMode, NodeId, Placement};

#[derive(Debug, Clone, PartialEq)]
pub enum DockEvent {
    DockableRegistered(NodeId),
    DockableUnregistered(NodeId),
    StationRegistered(NodeId),
    StationUnregistered(NodeId),
    ModeChanged {
        dockable: NodeId,
        old: ExtendedMode,
        new: ExtendedMode,
    },
    FocusChanged {
        old: Option<NodeId>,
        new: Option<NodeId>,
    },
    /// A station with one child or none was removed from the tree.
    Collapsed { station: NodeId },
}

impl DockEvent {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            DockEvent::DockableRegistered(id)
            | DockEvent::DockableUnregistered(id)
            | DockEvent::StationRegistered(id)
            | DockEvent::StationUnregistered(id) => Some(*id),
            DockEvent::ModeChanged { dockable, .. } => Some(*dockable),
            DockEvent::FocusChanged { new, .. } => *new,
            DockEvent::Collapsed { station } => Some(*station),
        }
    }

    /// The registration event that cancels this one out, if any.
    pub fn inverse(&self) -> Option<DockEvent> {
        match self {
            DockEvent::DockableRegistered(id) => Some(DockEvent::DockableUnregistered(*id)),
            DockEvent::DockableUnregistered(id) => Some(DockEvent::DockableRegistered(*id)),
            DockEvent::StationRegistered(id) => Some(DockEvent::StationUnregistered(*id)),
            DockEvent::StationUnregistered(id) => Some(DockEvent::StationRegistered(*id)),
            _ => None,
        }
    }

    pub fn is_registration(&self) -> bool {
        self.inverse().is_some()
    }
}

/// Mutation a listener wants performed once the current event pass is over.
#[derive(Debug, Clone, PartialEq)]
pub enum DockCommand {
    Drag(NodeId),
    Drop {
        station: NodeId,
        dockable: NodeId,
        placement: Placement,
    },
    Replace {
        old: NodeId,
        next: NodeId,
    },
    Focus(FocusRequest),
}

#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<DockCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, command: DockCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub(crate) fn take_commands(&mut self) -> Vec<DockCommand> {
        std::mem::take(&mut self.commands)
    }
}

/// Observer of the controlled tree. Listeners see a consistent tree and may
/// only ask for changes through the queue.
pub trait DockListener {
    fn on_event(&mut self, tree: &DockTree, event: &DockEvent, commands: &mut CommandQueue);
}

impl<F> DockListener for F
where
    F: FnMut(&DockTree, &DockEvent, &mut CommandQueue),
{
    fn on_event(&mut self, tree: &DockTree, event: &DockEvent, commands: &mut CommandQueue) {
        self(tree, event, commands)
    }
}

/// Shared recording of every event, for tests and status displays.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<DockEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DockEvent> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<DockEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn count_for(&self, node: NodeId) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.is_registration() && e.node() == Some(node))
            .count()
    }
}

impl DockListener for EventLog {
    fn on_event(&mut self, _tree: &DockTree, event: &DockEvent, _commands: &mut CommandQueue) {
        self.events.borrow_mut().push(event.clone());
    }
}

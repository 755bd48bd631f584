//! The single entry point for structural changes.
//!
//! Every mutation runs under the hierarchy lock, then the single-parent
//! remover tidies up (unless the register is stalled), the register diffs
//! its membership and listeners get the resulting events. Commands queued by
//! listeners run after the event that produced them was delivered to every
//! listener.

use std::collections::VecDeque;

use ratatui::layout::Rect;
use slotmap::SecondaryMap;
use tracing::{debug, warn};

use crate::accept::{AcceptanceChain, DockAcceptance};
use crate::config::DockConfig;
use crate::error::{DockError, DockResult};
use crate::events::{CommandQueue, DockCommand, DockEvent, DockListener};
use crate::focus::{FocusController, FocusRequest};
use crate::geometry::FloatRect;
use crate::lock::HierarchyLock;
use crate::model::{
    DockTree, DockablePath, Dockable, HasChildren, HasParentSlot, NodeId, PathProperty, PathResolution,
    Placement, Station, StationKind,
};
use crate::register::DockRegister;
use crate::remover::SingleParentRemover;

pub struct DockController {
    tree: DockTree,
    register: DockRegister,
    lock: HierarchyLock,
    remover: SingleParentRemover,
    acceptance: AcceptanceChain,
    focus: FocusController,
    bounds: SecondaryMap<NodeId, Rect>,
    listeners: Vec<Box<dyn DockListener>>,
    pending: VecDeque<DockEvent>,
    dispatching: bool,
}

impl std::fmt::Debug for DockController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockController")
            .field("nodes", &self.tree.len())
            .field("roots", &self.register.roots())
            .field("stalled", &self.register.stall_count())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for DockController {
    fn default() -> Self {
        Self::new()
    }
}

impl DockController {
    pub fn new() -> Self {
        Self {
            tree: DockTree::new(),
            register: DockRegister::new(),
            lock: HierarchyLock::new(),
            remover: SingleParentRemover::default(),
            acceptance: AcceptanceChain::with_defaults(),
            focus: FocusController::new(),
            bounds: SecondaryMap::new(),
            listeners: Vec::new(),
            pending: VecDeque::new(),
            dispatching: false,
        }
    }

    pub fn with_config(config: &DockConfig) -> Self {
        let mut controller = Self::new();
        controller
            .remover
            .set_enabled(config.collapse_single_parents);
        controller
    }

    pub fn tree(&self) -> &DockTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut DockTree {
        &mut self.tree
    }

    pub fn register(&self) -> &DockRegister {
        &self.register
    }

    pub fn lock(&self) -> &HierarchyLock {
        &self.lock
    }

    pub fn add_listener(&mut self, listener: impl DockListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn add_acceptance(&mut self, acceptance: impl DockAcceptance + 'static) {
        self.acceptance.add(acceptance);
    }

    pub fn set_collapse_single_parents(&mut self, enabled: bool) {
        self.remover.set_enabled(enabled);
    }

    pub fn add_dockable(&mut self, dockable: Dockable) -> NodeId {
        self.tree.add_dockable(dockable)
    }

    pub fn add_station(&mut self, station: Station) -> NodeId {
        self.tree.add_station(station)
    }

    /// Mutable access for non-structural edits (title, capabilities).
    pub fn dockable_mut(&mut self, id: NodeId) -> Option<&mut Dockable> {
        self.tree.dockable_mut(id)
    }

    /// Deletes an unparented node that is not a root.
    pub fn dispose(&mut self, id: NodeId) -> DockResult<Vec<NodeId>> {
        if self.register.is_root(id) {
            return Err(DockError::AlreadyRoot(id));
        }
        self.tree.dispose(id)
    }

    pub fn add_root(&mut self, station: NodeId) -> DockResult<()> {
        self.register.add_root(&self.tree, station)?;
        debug!(?station, "root added");
        self.sync()
    }

    pub fn remove_root(&mut self, station: NodeId) -> DockResult<()> {
        self.register.remove_root(station)?;
        debug!(?station, "root removed");
        self.sync()
    }

    /// Kind, content and global acceptance for putting `child` into
    /// `station`.
    pub fn accepts(&self, station: NodeId, child: NodeId) -> bool {
        let Some(target) = self.tree.station(station) else {
            return false;
        };
        if self.register.is_root(child) || !target.accepts_kind(self.tree.station_kind(child)) {
            return false;
        }
        let content_ok = self
            .tree
            .dockable(child)
            .is_none_or(|d| d.content().accept_station(target));
        content_ok && self.acceptance.accept(&self.tree, station, child)
    }

    /// Acceptance for stacking `child` onto `target`, a child of `station`.
    pub fn accepts_combination(&self, station: NodeId, child: NodeId, target: NodeId) -> bool {
        let Some(station_ref) = self.tree.station(station) else {
            return false;
        };
        if self.register.is_root(child) {
            return false;
        }
        let content_ok = match (self.tree.dockable(child), self.tree.dockable(target)) {
            (Some(d), Some(neighbour)) => d.content().accept_combination(station_ref, neighbour),
            (Some(d), None) => d.content().accept_station(station_ref),
            _ => true,
        };
        content_ok
            && self
                .acceptance
                .accept_combination(&self.tree, station, child, target)
    }

    fn check_drop(&self, station: NodeId, dockable: NodeId) -> DockResult<()> {
        if self.register.is_root(dockable) {
            return Err(DockError::AlreadyRoot(dockable));
        }
        self.tree.check_attach(station, dockable)
    }

    pub fn drop(&mut self, station: NodeId, dockable: NodeId) -> DockResult<()> {
        self.drop_at(station, dockable, Placement::Default)
    }

    pub fn drop_at(&mut self, station: NodeId, dockable: NodeId, placement: Placement) -> DockResult<()> {
        self.check_drop(station, dockable)?;
        match placement {
            Placement::Combine { target } => return self.combine(target, dockable, None).map(|_| ()),
            Placement::Path(ref path) if path.properties().len() > 1 => {
                return self.drop_path(station, dockable, path);
            }
            _ => {}
        }
        if !self.accepts(station, dockable) {
            return Err(DockError::Rejected { station, dockable });
        }
        {
            let _guard = self.lock.acquire(dockable)?;
            self.tree.attach(station, dockable, &placement)?;
        }
        debug!(?station, ?dockable, ?placement, "dropped");
        self.sync()
    }

    /// Follows a multi-level path: descends into existing stations, stacks
    /// onto an existing dockable, or inserts at the first property.
    fn drop_path(&mut self, station: NodeId, dockable: NodeId, path: &DockablePath) -> DockResult<()> {
        let Some(property) = path.first().cloned() else {
            return self.drop_at(station, dockable, Placement::Default);
        };
        let rest = path.successor();
        if let Some(existing) = self.child_at(station, &property) {
            if self.tree.station(existing).is_some() && self.accepts(existing, dockable) {
                return self.drop_at(existing, dockable, Placement::Path(rest));
            }
            if let Some(PathProperty::Stack { index, .. }) = rest.first()
                && self.tree.dockable(existing).is_some()
                && self.accepts_combination(station, dockable, existing)
            {
                let index = *index;
                return self.combine(existing, dockable, Some(index)).map(|_| ());
            }
        }
        self.drop_at(
            station,
            dockable,
            Placement::Path(DockablePath::new(vec![property])),
        )
    }

    /// The child that currently sits at `property` of `station`.
    pub fn child_at(&self, station: NodeId, property: &PathProperty) -> Option<NodeId> {
        let station = self.tree.station(station)?;
        match property {
            PathProperty::Split { .. } => match station.resolve_split(property)? {
                PathResolution::Existing(id) => Some(id),
                PathResolution::Insert => None,
            },
            PathProperty::Stack { index, .. } | PathProperty::Flap { index } => {
                station.children().get(*index).copied()
            }
            PathProperty::Screen { bounds } => station
                .children()
                .iter()
                .copied()
                .find(|c| station.window_of(*c) == Some(*bounds)),
        }
    }

    /// Removes `dockable` from its parent and returns the parent and the
    /// property the dockable had there.
    pub fn drag(&mut self, dockable: NodeId) -> DockResult<(NodeId, PathProperty)> {
        self.tree.node(dockable)?;
        let result = {
            let _guard = self.lock.acquire(dockable)?;
            self.tree.detach(dockable)?
        };
        debug!(?dockable, from = ?result.0, property = %result.1, "dragged");
        self.sync()?;
        Ok(result)
    }

    /// Drag followed by drop. A rejected drop puts the dockable back.
    pub fn move_to(&mut self, dockable: NodeId, station: NodeId, placement: Placement) -> DockResult<()> {
        self.tree.require_station(station)?;
        if self.tree.parent(dockable).is_none() {
            return self.drop_at(station, dockable, placement);
        }
        if station == dockable || self.tree.is_ancestor(dockable, station) {
            return Err(DockError::Cycle {
                station,
                child: dockable,
            });
        }
        self.batch(|ctrl| {
            let (old_parent, property) = ctrl.drag(dockable)?;
            let Err(err) = ctrl.drop_at(station, dockable, placement) else {
                return Ok(());
            };
            if ctrl.tree.contains(old_parent) && ctrl.tree.parent(dockable).is_none() {
                if let Err(restore) = ctrl.tree.attach_at_property(old_parent, dockable, &property) {
                    warn!(?dockable, %restore, "could not restore dockable after failed move");
                }
                ctrl.sync()?;
            }
            Err(err)
        })
    }

    pub fn can_replace(&self, old: NodeId, next: NodeId) -> bool {
        let Some(parent) = self.tree.parent(old) else {
            return false;
        };
        let unparented = self.tree.get(next).is_some_and(|_| self.tree.parent(next).is_none());
        unparented
            && next != parent
            && !self.tree.is_ancestor(next, parent)
            && self.accepts(parent, next)
    }

    /// Swaps `old` for `next` in the same slot; `old` ends up unparented.
    pub fn replace(&mut self, old: NodeId, next: NodeId) -> DockResult<()> {
        let parent = self.tree.parent(old).ok_or(DockError::NotParented(old))?;
        if self.tree.node(next)?.parent().is_some() {
            return Err(DockError::AlreadyParented(next));
        }
        if !self.can_replace(old, next) {
            return Err(DockError::Rejected {
                station: parent,
                dockable: next,
            });
        }
        {
            let _guard = self.lock.acquire_all(&[old, next])?;
            self.tree.swap(old, next)?;
        }
        debug!(?old, ?next, ?parent, "replaced");
        self.sync()
    }

    /// Stacks `dockable` onto `target`. Existing stacks (the target itself or
    /// its parent) gain a tab; otherwise a new stack takes the target's slot.
    /// A stack being combined is merged tab by tab.
    pub fn combine(&mut self, target: NodeId, dockable: NodeId, index: Option<usize>) -> DockResult<NodeId> {
        let parent = self.tree.parent(target).ok_or(DockError::NotParented(target))?;
        if self.register.is_root(dockable) {
            return Err(DockError::AlreadyRoot(dockable));
        }
        if self.tree.parent(dockable).is_some() {
            return Err(DockError::AlreadyParented(dockable));
        }
        if dockable == target || self.tree.is_ancestor(dockable, target) {
            return Err(DockError::Cycle {
                station: target,
                child: dockable,
            });
        }
        let existing = if self.tree.station_kind(target).is_some_and(StationKind::is_stack) {
            Some(target)
        } else if self.tree.station_kind(parent).is_some_and(StationKind::is_stack) {
            Some(parent)
        } else {
            None
        };
        let judged_in = existing.unwrap_or(parent);
        if !self.accepts_combination(judged_in, dockable, target) {
            return Err(DockError::Rejected {
                station: judged_in,
                dockable,
            });
        }
        self.batch(|ctrl| {
            let stack = match existing {
                Some(stack) => stack,
                None => {
                    let title = ctrl.tree.title(target).unwrap_or_default().to_string();
                    let stack = ctrl.tree.add_station(Station::stack(title));
                    let _guard = ctrl.lock.acquire(target)?;
                    ctrl.tree.swap(target, stack)?;
                    ctrl.tree.attach(stack, target, &Placement::Default)?;
                    stack
                }
            };
            let index = index.or_else(|| {
                (existing == Some(parent))
                    .then(|| ctrl.tree.station(stack)?.index_of(target).map(|i| i + 1))
                    .flatten()
            });
            ctrl.insert_into_stack(stack, dockable, index)?;
            debug!(?target, ?dockable, ?stack, "combined");
            ctrl.sync()?;
            Ok(stack)
        })
    }

    fn insert_into_stack(&mut self, stack: NodeId, dockable: NodeId, index: Option<usize>) -> DockResult<()> {
        let placement = |offset: usize| match index {
            Some(i) => Placement::Index(i + offset),
            None => Placement::Default,
        };
        if self.tree.station_kind(dockable).is_some_and(StationKind::is_stack) {
            let tabs = self.tree.children(dockable).to_vec();
            let front = self.tree.station(dockable).and_then(HasChildren::front);
            for (offset, tab) in tabs.iter().enumerate() {
                let _guard = self.lock.acquire(*tab)?;
                self.tree.detach(*tab)?;
                self.tree.attach(stack, *tab, &placement(offset))?;
            }
            if let Some(station) = self.tree.station_mut(stack) {
                station.set_front(front);
            }
            self.tree.dispose(dockable)?;
            return Ok(());
        }
        let _guard = self.lock.acquire(dockable)?;
        self.tree.attach(stack, dockable, &placement(0))
    }

    /// Freezes (true) or releases (false) register events. Releasing the
    /// last stall runs the remover and fires everything that was queued.
    pub fn set_stalled(&mut self, stalled: bool) {
        let mut events = self.register.set_stalled(stalled);
        if !stalled && !self.register.is_stalled() {
            match self.remover.run(&mut self.tree, &self.register, &self.lock) {
                Ok(collapsed) => events.extend(collapsed),
                Err(err) => warn!(%err, "single parent remover failed"),
            }
            events.extend(self.register.update(&self.tree));
        }
        self.dispatch(events);
    }

    /// Runs `f` with the register stalled.
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Self) -> DockResult<T>) -> DockResult<T> {
        self.set_stalled(true);
        let result = f(self);
        self.set_stalled(false);
        result
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus.focused()
    }

    /// Returns whether an event fired.
    pub fn focus(&mut self, request: FocusRequest) -> bool {
        match self.focus.focus(&mut self.tree, &self.register, &request) {
            Some(event) => {
                self.dispatch(vec![event]);
                true
            }
            None => false,
        }
    }

    pub fn advance_focus(&mut self, forward: bool) -> bool {
        match self.focus.advance(&mut self.tree, &self.register, forward) {
            Some(event) => {
                self.dispatch(vec![event]);
                true
            }
            None => false,
        }
    }

    pub fn take_component_request(&mut self) -> Option<(NodeId, String)> {
        self.focus.take_component_request()
    }

    /// Shows `child` in front of its stack or opens it in its flap.
    pub fn set_front(&mut self, station: NodeId, child: Option<NodeId>) -> DockResult<()> {
        if !self.tree.require_station_mut(station)?.set_front(child) {
            return Err(DockError::Inconsistent(format!(
                "{child:?} is not a child of {station:?}"
            )));
        }
        Ok(())
    }

    pub fn set_fullscreen(&mut self, station: NodeId, child: Option<NodeId>) -> DockResult<()> {
        if !self.tree.require_station_mut(station)?.set_fullscreen(child) {
            return Err(DockError::NotAStation(station));
        }
        Ok(())
    }

    pub fn set_window(&mut self, station: NodeId, child: NodeId, bounds: FloatRect) -> DockResult<()> {
        if !self.tree.require_station_mut(station)?.set_window(child, bounds) {
            return Err(DockError::Inconsistent(format!(
                "{child:?} has no window in {station:?}"
            )));
        }
        Ok(())
    }

    /// Computes bounds for `root` and everything below it.
    pub fn layout(&mut self, root: NodeId, area: Rect) {
        self.bounds.insert(root, area);
        let Some(station) = self.tree.station(root) else {
            return;
        };
        for (child, rect) in station.child_areas(area) {
            self.layout(child, rect);
        }
    }

    pub fn bounds(&self, node: NodeId) -> Option<Rect> {
        self.bounds.get(node).copied()
    }

    /// Delivers an event produced outside the controller (mode changes).
    pub(crate) fn emit(&mut self, event: DockEvent) {
        self.dispatch(vec![event]);
    }

    fn sync(&mut self) -> DockResult<()> {
        let mut events = Vec::new();
        if !self.register.is_stalled() {
            events.extend(self.remover.run(&mut self.tree, &self.register, &self.lock)?);
        }
        events.extend(self.register.update(&self.tree));
        self.dispatch(events);
        Ok(())
    }

    fn dispatch(&mut self, events: Vec<DockEvent>) {
        self.pending.extend(events);
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        while let Some(event) = self.pending.pop_front() {
            if let DockEvent::DockableUnregistered(node) | DockEvent::StationUnregistered(node) = event
                && let Some(change) = self.focus.on_unregistered(node)
            {
                self.pending.push_back(change);
            }
            let mut queue = CommandQueue::default();
            for listener in self.listeners.iter_mut() {
                listener.on_event(&self.tree, &event, &mut queue);
            }
            for command in queue.take_commands() {
                if let Err(err) = self.execute(command.clone()) {
                    warn!(?command, %err, "queued dock command failed");
                }
            }
        }
        self.dispatching = false;
    }

    fn execute(&mut self, command: DockCommand) -> DockResult<()> {
        match command {
            DockCommand::Drag(dockable) => self.drag(dockable).map(|_| ()),
            DockCommand::Drop {
                station,
                dockable,
                placement,
            } => self.drop_at(station, dockable, placement),
            DockCommand::Replace { old, next } => self.replace(old, next),
            DockCommand::Focus(request) => {
                self.focus(request);
                Ok(())
            }
        }
    }
}

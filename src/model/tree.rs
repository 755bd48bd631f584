use slotmap::SlotMap;

use super::dockable::Dockable;
use super::path::{DockablePath, PathProperty};
use super::station::{Placement, Station, StationKind};
use super::{HasChildren, HasParentSlot, NodeId, NodeKind, Persistable};
use crate::error::{DockError, DockResult};

#[derive(Debug)]
pub enum Element {
    Dockable(Dockable),
    Station(Station),
}

#[derive(Debug)]
pub struct Node {
    parent: Option<NodeId>,
    element: Element,
}

impl Node {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn as_dockable(&self) -> Option<&Dockable> {
        match &self.element {
            Element::Dockable(d) => Some(d),
            Element::Station(_) => None,
        }
    }

    pub fn as_station(&self) -> Option<&Station> {
        match &self.element {
            Element::Station(s) => Some(s),
            Element::Dockable(_) => None,
        }
    }

    pub fn title(&self) -> &str {
        match &self.element {
            Element::Dockable(d) => d.title(),
            Element::Station(s) => s.title(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match (&self.element, self.parent) {
            (Element::Dockable(_), _) => NodeKind::Dockable,
            (Element::Station(_), None) => NodeKind::Station,
            (Element::Station(_), Some(_)) => NodeKind::Both,
        }
    }
}

impl HasParentSlot for Node {
    fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

impl Persistable for Node {
    fn factory_id(&self) -> &str {
        match &self.element {
            Element::Dockable(d) => d.factory_id(),
            Element::Station(s) => s.factory_id(),
        }
    }
}

/// Arena owning every dockable and station.
///
/// Structural mutators are crate-private; outside code goes through the
/// controller so the register, lock and remover see every change.
#[derive(Debug, Default)]
pub struct DockTree {
    nodes: SlotMap<NodeId, Node>,
}

impl DockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dockable(&mut self, dockable: Dockable) -> NodeId {
        self.nodes.insert(Node {
            parent: None,
            element: Element::Dockable(dockable),
        })
    }

    pub fn add_station(&mut self, station: Station) -> NodeId {
        self.nodes.insert(Node {
            parent: None,
            element: Element::Station(station),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: NodeId) -> DockResult<&Node> {
        self.nodes.get(id).ok_or(DockError::UnknownNode(id))
    }

    pub fn dockable(&self, id: NodeId) -> Option<&Dockable> {
        self.nodes.get(id)?.as_dockable()
    }

    pub fn dockable_mut(&mut self, id: NodeId) -> Option<&mut Dockable> {
        match &mut self.nodes.get_mut(id)?.element {
            Element::Dockable(d) => Some(d),
            Element::Station(_) => None,
        }
    }

    pub fn station(&self, id: NodeId) -> Option<&Station> {
        self.nodes.get(id)?.as_station()
    }

    pub fn station_mut(&mut self, id: NodeId) -> Option<&mut Station> {
        match &mut self.nodes.get_mut(id)?.element {
            Element::Station(s) => Some(s),
            Element::Dockable(_) => None,
        }
    }

    pub fn require_station(&self, id: NodeId) -> DockResult<&Station> {
        self.node(id)?.as_station().ok_or(DockError::NotAStation(id))
    }

    pub(crate) fn require_station_mut(&mut self, id: NodeId) -> DockResult<&mut Station> {
        if !self.contains(id) {
            return Err(DockError::UnknownNode(id));
        }
        self.station_mut(id).ok_or(DockError::NotAStation(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.station(id).map(HasChildren::children).unwrap_or(&[])
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(Node::kind)
    }

    pub fn title(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(Node::title)
    }

    pub fn station_kind(&self, id: NodeId) -> Option<&StationKind> {
        self.station(id).map(Station::kind)
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// `id` and everything below it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.contains(next) {
                continue;
            }
            out.push(next);
            for child in self.children(next).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    pub fn property_of(&self, child: NodeId) -> Option<PathProperty> {
        let parent = self.station(self.parent(child)?)?;
        let property = parent.property_of(child)?;
        Some(match property {
            PathProperty::Stack { index, .. } => PathProperty::Stack {
                index,
                placeholder: self
                    .dockable(child)
                    .and_then(Dockable::placeholder)
                    .map(str::to_string),
            },
            other => other,
        })
    }

    /// The topmost ancestor of `node` and the path leading to it.
    pub fn path_of(&self, node: NodeId) -> Option<(NodeId, DockablePath)> {
        if !self.contains(node) {
            return None;
        }
        let mut properties = Vec::new();
        let mut current = node;
        while self.parent(current).is_some() {
            properties.push(self.property_of(current)?);
            current = self.parent(current)?;
        }
        properties.reverse();
        Some((current, DockablePath::new(properties)))
    }

    /// Path from `ancestor` down to `node`; empty when they are the same node.
    pub fn path_within(&self, ancestor: NodeId, node: NodeId) -> Option<DockablePath> {
        let mut properties = Vec::new();
        let mut current = node;
        while current != ancestor {
            properties.push(self.property_of(current)?);
            current = self.parent(current)?;
        }
        properties.reverse();
        Some(DockablePath::new(properties))
    }

    /// Shared checks for putting `child` into `station`.
    pub fn check_attach(&self, station: NodeId, child: NodeId) -> DockResult<()> {
        self.require_station(station)?;
        let node = self.node(child)?;
        if node.parent.is_some() {
            return Err(DockError::AlreadyParented(child));
        }
        if child == station || self.is_ancestor(child, station) {
            return Err(DockError::Cycle { station, child });
        }
        Ok(())
    }

    pub(crate) fn attach(&mut self, station: NodeId, child: NodeId, placement: &Placement) -> DockResult<()> {
        self.check_attach(station, child)?;
        self.require_station_mut(station)?.insert(child, placement);
        self.set_parent(child, Some(station));
        Ok(())
    }

    pub(crate) fn attach_at_property(
        &mut self,
        station: NodeId,
        child: NodeId,
        property: &PathProperty,
    ) -> DockResult<()> {
        self.check_attach(station, child)?;
        self.require_station_mut(station)?
            .insert_at_property(child, property);
        self.set_parent(child, Some(station));
        Ok(())
    }

    /// Removes `child` from its parent; returns the former parent and the
    /// property the child had there.
    pub(crate) fn detach(&mut self, child: NodeId) -> DockResult<(NodeId, PathProperty)> {
        let parent = self.node(child)?.parent.ok_or(DockError::NotParented(child))?;
        let placeholder = self
            .dockable(child)
            .and_then(Dockable::placeholder)
            .map(str::to_string);
        let property = self
            .require_station_mut(parent)?
            .remove(child, placeholder.as_deref())
            .ok_or_else(|| {
                DockError::Inconsistent(format!("{parent:?} does not list its child {child:?}"))
            })?;
        self.set_parent(child, None);
        Ok((parent, property))
    }

    /// Puts `next` into the slot of `old`; `old` ends up unparented.
    pub(crate) fn swap(&mut self, old: NodeId, next: NodeId) -> DockResult<NodeId> {
        let parent = self.node(old)?.parent.ok_or(DockError::NotParented(old))?;
        if self.node(next)?.parent.is_some() {
            return Err(DockError::AlreadyParented(next));
        }
        if next == parent || self.is_ancestor(next, parent) {
            return Err(DockError::Cycle {
                station: parent,
                child: next,
            });
        }
        if !self.require_station_mut(parent)?.replace(old, next) {
            return Err(DockError::Inconsistent(format!(
                "{parent:?} does not list its child {old:?}"
            )));
        }
        self.set_parent(old, None);
        self.set_parent(next, Some(parent));
        Ok(parent)
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = parent;
        }
    }

    /// Deletes an unparented node and, for stations, its whole subtree.
    pub(crate) fn dispose(&mut self, id: NodeId) -> DockResult<Vec<NodeId>> {
        if self.node(id)?.parent.is_some() {
            return Err(DockError::AlreadyParented(id));
        }
        let removed = self.descendants(id);
        for node in &removed {
            self.nodes.remove(*node);
        }
        Ok(removed)
    }

    /// Removes a dockable or station from the arena and hands it back; the
    /// node must be unparented and, for stations, empty.
    pub(crate) fn take(&mut self, id: NodeId) -> DockResult<Element> {
        let node = self.node(id)?;
        if node.parent.is_some() {
            return Err(DockError::AlreadyParented(id));
        }
        if !self.children(id).is_empty() {
            return Err(DockError::Inconsistent(format!(
                "{id:?} still has children"
            )));
        }
        self.nodes
            .remove(id)
            .map(|node| node.element)
            .ok_or(DockError::UnknownNode(id))
    }

    /// Verifies that parents and children agree and that there are no cycles.
    pub fn validate(&self) -> DockResult<()> {
        for (id, node) in self.nodes.iter() {
            if let Some(parent) = node.parent {
                let station = self.station(parent).ok_or_else(|| {
                    DockError::Inconsistent(format!("{id:?} points at missing parent {parent:?}"))
                })?;
                if !station.children().contains(&id) {
                    return Err(DockError::Inconsistent(format!(
                        "{id:?} claims parent {parent:?} which does not list it"
                    )));
                }
            }
            if let Element::Station(station) = &node.element {
                for child in station.children() {
                    let child_parent = self.parent(*child);
                    if child_parent != Some(id) {
                        return Err(DockError::Inconsistent(format!(
                            "{id:?} lists {child:?} whose parent is {child_parent:?}"
                        )));
                    }
                }
                if let Some(front) = station.front()
                    && !station.children().contains(&front)
                {
                    return Err(DockError::Inconsistent(format!(
                        "{id:?} shows {front:?} which is not a child"
                    )));
                }
            }
            let mut steps = 0;
            let mut current = node.parent;
            while let Some(parent) = current {
                steps += 1;
                if parent == id || steps > self.nodes.len() {
                    return Err(DockError::Inconsistent(format!("cycle through {id:?}")));
                }
                current = self.parent(parent);
            }
        }
        Ok(())
    }
}

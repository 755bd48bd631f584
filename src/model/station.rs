use std::collections::BTreeMap;
use std::fmt;

use ratatui::layout::{Direction, Rect};

use super::path::{DockablePath, PathProperty};
use super::split::{InsertPosition, PathResolution, SplitNode};
use super::{HasChildren, NodeId, Persistable};
use crate::constants::{DEFAULT_FLOAT_HEIGHT, DEFAULT_FLOAT_WIDTH, FLAP_POPUP_EXTENT, TAB_ROW_HEIGHT};
use crate::geometry::FloatRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlapSide {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl FlapSide {
    pub fn as_str(self) -> &'static str {
        match self {
            FlapSide::Top => "top",
            FlapSide::Bottom => "bottom",
            FlapSide::Left => "left",
            FlapSide::Right => "right",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top" => Some(FlapSide::Top),
            "bottom" => Some(FlapSide::Bottom),
            "left" => Some(FlapSide::Left),
            "right" => Some(FlapSide::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StationKind {
    Split {
        shape: Option<SplitNode<NodeId>>,
        /// Child shown over the whole station; used by the maximize mode.
        fullscreen: Option<NodeId>,
    },
    Stack,
    Flap {
        side: FlapSide,
    },
    Screen {
        /// Window bounds, parallel to the station's children.
        windows: Vec<FloatRect>,
    },
}

impl StationKind {
    pub fn id(&self) -> &'static str {
        match self {
            StationKind::Split { .. } => PathProperty::SPLIT,
            StationKind::Stack => PathProperty::STACK,
            StationKind::Flap { .. } => PathProperty::FLAP,
            StationKind::Screen { .. } => PathProperty::SCREEN,
        }
    }

    pub fn is_stack(&self) -> bool {
        matches!(self, StationKind::Stack)
    }
}

/// Where a child goes when it is dropped onto a station.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// The station picks: splits append on the right, stacks and flaps
    /// append, screens open a new window.
    Default,
    /// Split beside `target`, or around the whole split when `target` is
    /// `None`.
    Split {
        target: Option<NodeId>,
        side: InsertPosition,
    },
    /// Stack onto `target`, creating a stack station when `target` is a
    /// plain dockable.
    Combine { target: NodeId },
    Index(usize),
    Bounds(FloatRect),
    /// A remembered path below this station.
    Path(DockablePath),
}

#[derive(Debug, Clone)]
pub struct Station {
    title: String,
    kind: StationKind,
    children: Vec<NodeId>,
    front: Option<NodeId>,
    placeholders: BTreeMap<String, usize>,
    protected: bool,
}

impl Station {
    pub fn new(title: impl Into<String>, kind: StationKind) -> Self {
        Self {
            title: title.into(),
            kind,
            children: Vec::new(),
            front: None,
            placeholders: BTreeMap::new(),
            protected: false,
        }
    }

    pub fn split(title: impl Into<String>) -> Self {
        Self::new(
            title,
            StationKind::Split {
                shape: None,
                fullscreen: None,
            },
        )
    }

    pub fn stack(title: impl Into<String>) -> Self {
        Self::new(title, StationKind::Stack)
    }

    pub fn flap(title: impl Into<String>, side: FlapSide) -> Self {
        Self::new(title, StationKind::Flap { side })
    }

    pub fn screen(title: impl Into<String>) -> Self {
        Self::new(
            title,
            StationKind::Screen {
                windows: Vec::new(),
            },
        )
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn kind(&self) -> &StationKind {
        &self.kind
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }

    pub fn placeholders(&self) -> &BTreeMap<String, usize> {
        &self.placeholders
    }

    pub(crate) fn set_placeholders(&mut self, placeholders: BTreeMap<String, usize>) {
        if self.kind.is_stack() {
            self.placeholders = placeholders;
        }
    }

    pub fn split_shape(&self) -> Option<&SplitNode<NodeId>> {
        match &self.kind {
            StationKind::Split { shape, .. } => shape.as_ref(),
            _ => None,
        }
    }

    pub fn fullscreen(&self) -> Option<NodeId> {
        match &self.kind {
            StationKind::Split { fullscreen, .. } => *fullscreen,
            _ => None,
        }
    }

    pub fn set_fullscreen(&mut self, child: Option<NodeId>) -> bool {
        let valid = child.is_none_or(|c| self.children.contains(&c));
        match &mut self.kind {
            StationKind::Split { fullscreen, .. } if valid => {
                *fullscreen = child;
                true
            }
            _ => false,
        }
    }

    pub fn window_of(&self, child: NodeId) -> Option<FloatRect> {
        let idx = self.index_of(child)?;
        match &self.kind {
            StationKind::Screen { windows } => windows.get(idx).copied(),
            _ => None,
        }
    }

    pub fn set_window(&mut self, child: NodeId, bounds: FloatRect) -> bool {
        let Some(idx) = self.index_of(child) else {
            return false;
        };
        match &mut self.kind {
            StationKind::Screen { windows } => match windows.get_mut(idx) {
                Some(slot) => {
                    *slot = bounds;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn set_front(&mut self, child: Option<NodeId>) -> bool {
        if let Some(c) = child
            && !self.children.contains(&c)
        {
            return false;
        }
        self.front = child;
        true
    }

    /// Kind-level acceptance of a child with the given station kind (`None`
    /// for plain dockables).
    pub fn accepts_kind(&self, child: Option<&StationKind>) -> bool {
        match (&self.kind, child) {
            (_, None) => true,
            (StationKind::Stack, Some(StationKind::Stack)) => false,
            (
                StationKind::Flap { .. } | StationKind::Screen { .. },
                Some(StationKind::Flap { .. } | StationKind::Screen { .. }),
            ) => false,
            _ => true,
        }
    }

    /// Inserts `child` according to `placement`. `Combine` and multi-level
    /// paths are resolved by the controller before they get here.
    pub(crate) fn insert(&mut self, child: NodeId, placement: &Placement) {
        match placement {
            Placement::Path(path) => match path.first() {
                Some(property) => self.insert_at_property(child, property),
                None => self.insert(child, &Placement::Default),
            },
            Placement::Bounds(bounds) => self.insert_with_bounds(child, self.children.len(), *bounds),
            Placement::Index(index) => self.insert_at_index(child, *index),
            Placement::Split { target, side } => self.insert_split(child, *target, *side),
            Placement::Combine { .. } | Placement::Default => {
                self.insert_at_index(child, self.children.len())
            }
        }
    }

    fn insert_split(&mut self, child: NodeId, target: Option<NodeId>, side: InsertPosition) {
        let StationKind::Split { shape, .. } = &mut self.kind else {
            self.insert_at_index(child, self.children.len());
            return;
        };
        match shape {
            None => *shape = Some(SplitNode::leaf(child)),
            Some(shape) => {
                let inserted = target.is_some_and(|t| shape.insert_beside(t, child, side));
                if !inserted {
                    shape.split_root(child, side);
                }
            }
        }
        self.sync_split_children();
    }

    fn insert_at_index(&mut self, child: NodeId, index: usize) {
        let index = index.min(self.children.len());
        match &mut self.kind {
            StationKind::Split { shape, .. } => {
                match shape {
                    None => *shape = Some(SplitNode::leaf(child)),
                    Some(shape) => match self.children.get(index) {
                        Some(next) => {
                            shape.insert_beside(*next, child, InsertPosition::Left);
                        }
                        None => shape.split_root(child, InsertPosition::Right),
                    },
                }
                self.sync_split_children();
            }
            StationKind::Screen { windows } => {
                let offset = windows.len() as i32;
                let bounds = FloatRect::new(
                    2 + offset * 2,
                    1 + offset,
                    DEFAULT_FLOAT_WIDTH,
                    DEFAULT_FLOAT_HEIGHT,
                );
                windows.insert(index, bounds);
                self.children.insert(index, child);
            }
            StationKind::Stack => {
                self.children.insert(index, child);
                self.front = Some(child);
                for slot in self.placeholders.values_mut() {
                    if *slot > index {
                        *slot += 1;
                    }
                }
            }
            StationKind::Flap { .. } => {
                self.children.insert(index, child);
            }
        }
    }

    fn insert_with_bounds(&mut self, child: NodeId, index: usize, bounds: FloatRect) {
        match &mut self.kind {
            StationKind::Screen { windows } => {
                let index = index.min(self.children.len());
                windows.insert(index, bounds);
                self.children.insert(index, child);
            }
            _ => self.insert_at_index(child, index),
        }
    }

    /// Re-inserts a child at a remembered property of this station.
    pub(crate) fn insert_at_property(&mut self, child: NodeId, property: &PathProperty) {
        let is_split = matches!(self.kind, StationKind::Split { .. });
        let is_screen = matches!(self.kind, StationKind::Screen { .. });
        match property {
            PathProperty::Split { steps } if is_split => {
                if let StationKind::Split { shape, .. } = &mut self.kind {
                    match shape {
                        None => *shape = Some(SplitNode::leaf(child)),
                        Some(shape) => shape.insert_by_path(steps, child),
                    }
                }
                self.sync_split_children();
            }
            PathProperty::Stack { index, placeholder } => {
                let index = placeholder
                    .as_ref()
                    .and_then(|p| self.placeholders.remove(p))
                    .unwrap_or(*index);
                self.insert_at_index(child, index);
            }
            PathProperty::Screen { bounds } if is_screen => {
                self.insert_with_bounds(child, self.children.len(), *bounds);
            }
            PathProperty::Flap { index } => self.insert_at_index(child, *index),
            _ => self.insert(child, &Placement::Default),
        }
    }

    /// Where a split path leads: an existing leaf or a fresh insertion.
    pub fn resolve_split(&self, property: &PathProperty) -> Option<PathResolution<NodeId>> {
        match (property, &self.kind) {
            (PathProperty::Split { steps }, StationKind::Split { shape: Some(shape), .. }) => {
                Some(shape.resolve(steps))
            }
            _ => None,
        }
    }

    /// Removes `child`, returning the property it had. A stack remembers the
    /// slot under `placeholder` so the child can come back to it.
    pub(crate) fn remove(&mut self, child: NodeId, placeholder: Option<&str>) -> Option<PathProperty> {
        let property = self.property_of(child)?;
        let index = self.index_of(child)?;
        self.children.remove(index);
        match &mut self.kind {
            StationKind::Split { shape, fullscreen } => {
                if *fullscreen == Some(child) {
                    *fullscreen = None;
                }
                let only_leaf = shape.as_ref().and_then(SplitNode::unwrap_leaf);
                if only_leaf == Some(child) {
                    *shape = None;
                } else if let Some(shape) = shape {
                    shape.remove_leaf(child);
                }
                self.sync_split_children();
            }
            StationKind::Screen { windows } => {
                if index < windows.len() {
                    windows.remove(index);
                }
            }
            StationKind::Stack => {
                // absent tabs behind the removed one move up with their neighbours
                for slot in self.placeholders.values_mut() {
                    if *slot > index {
                        *slot -= 1;
                    }
                }
                if let Some(token) = placeholder {
                    self.placeholders.insert(token.to_string(), index);
                }
            }
            StationKind::Flap { .. } => {}
        }
        if self.front == Some(child) {
            self.front = match self.kind {
                StationKind::Stack => self
                    .children
                    .get(index.min(self.children.len().saturating_sub(1)))
                    .copied(),
                _ => None,
            };
        }
        Some(property)
    }

    /// Swaps `old` for `new` in the same slot.
    pub(crate) fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        let Some(index) = self.index_of(old) else {
            return false;
        };
        self.children[index] = new;
        if let StationKind::Split { shape, fullscreen } = &mut self.kind {
            if let Some(shape) = shape {
                shape.replace_leaf(old, new);
            }
            if *fullscreen == Some(old) {
                *fullscreen = Some(new);
            }
        }
        if self.front == Some(old) {
            self.front = Some(new);
        }
        true
    }

    pub fn property_of(&self, child: NodeId) -> Option<PathProperty> {
        let index = self.index_of(child)?;
        Some(match &self.kind {
            StationKind::Split { shape, .. } => PathProperty::Split {
                steps: shape.as_ref()?.path_of(child)?,
            },
            StationKind::Stack => PathProperty::Stack {
                index,
                placeholder: None,
            },
            StationKind::Flap { .. } => PathProperty::Flap { index },
            StationKind::Screen { windows } => PathProperty::Screen {
                bounds: windows.get(index).copied().unwrap_or_default(),
            },
        })
    }

    /// Restores a split shape from a saved layout. Leaves not among the
    /// children are dropped; children missing from the shape are appended.
    pub(crate) fn set_split_shape(&mut self, new_shape: SplitNode<NodeId>) {
        let children = self.children.clone();
        if let StationKind::Split { shape, .. } = &mut self.kind {
            let mut kept = new_shape.filter_map(&mut |id| children.contains(&id).then_some(id));
            for child in &children {
                match &mut kept {
                    Some(shape) if shape.contains(*child) => {}
                    Some(shape) => shape.split_root(*child, InsertPosition::Right),
                    None => kept = Some(SplitNode::leaf(*child)),
                }
            }
            *shape = kept;
        }
        self.sync_split_children();
    }

    pub(crate) fn set_windows(&mut self, bounds: Vec<FloatRect>) {
        if let StationKind::Screen { windows } = &mut self.kind {
            for (slot, rect) in windows.iter_mut().zip(bounds) {
                *slot = rect;
            }
        }
    }

    /// Tab row of a stack or button strip of a flap within `area`.
    pub fn tab_strip(&self, area: Rect) -> Rect {
        match self.kind {
            StationKind::Stack => Rect {
                height: TAB_ROW_HEIGHT.min(area.height),
                ..area
            },
            StationKind::Flap { .. } => area,
            _ => Rect::default(),
        }
    }

    /// Direction in which tab or flap buttons are laid out.
    pub fn strip_direction(&self) -> Direction {
        match self.kind {
            StationKind::Flap {
                side: FlapSide::Left | FlapSide::Right,
            } => Direction::Vertical,
            _ => Direction::Horizontal,
        }
    }

    /// Area of every child when the station occupies `area`. Hidden children
    /// (background tabs, closed flap entries) get an empty rect.
    pub fn child_areas(&self, area: Rect) -> Vec<(NodeId, Rect)> {
        let shown = |front: Option<NodeId>, visible: Rect| {
            self.children
                .iter()
                .map(|c| {
                    let rect = if Some(*c) == front { visible } else { Rect::default() };
                    (*c, rect)
                })
                .collect::<Vec<_>>()
        };
        match &self.kind {
            StationKind::Split {
                fullscreen: Some(full),
                ..
            } => shown(Some(*full), area),
            StationKind::Split { shape, .. } => {
                shape.as_ref().map(|s| s.layout(area)).unwrap_or_default()
            }
            StationKind::Stack => {
                let strip = TAB_ROW_HEIGHT.min(area.height);
                let body = Rect {
                    y: area.y + strip,
                    height: area.height - strip,
                    ..area
                };
                shown(self.front, body)
            }
            StationKind::Flap { side } => shown(self.front, flap_popup(*side, area)),
            StationKind::Screen { windows } => self
                .children
                .iter()
                .zip(windows)
                .map(|(c, w)| (*c, w.visible_in(area)))
                .collect(),
        }
    }

    fn sync_split_children(&mut self) {
        if let StationKind::Split { shape, .. } = &self.kind {
            self.children = shape.as_ref().map(SplitNode::leaves).unwrap_or_default();
        }
    }
}

/// Window a flap opens next to its strip, toward the centre of the screen.
pub fn flap_popup(side: FlapSide, strip: Rect) -> Rect {
    match side {
        FlapSide::Bottom => {
            let height = FLAP_POPUP_EXTENT.min(strip.y);
            Rect {
                y: strip.y - height,
                height,
                ..strip
            }
        }
        FlapSide::Top => Rect {
            y: strip.y.saturating_add(strip.height),
            height: FLAP_POPUP_EXTENT,
            ..strip
        },
        FlapSide::Left => Rect {
            x: strip.x.saturating_add(strip.width),
            width: FLAP_POPUP_EXTENT,
            ..strip
        },
        FlapSide::Right => {
            let width = FLAP_POPUP_EXTENT.min(strip.x);
            Rect {
                x: strip.x - width,
                width,
                ..strip
            }
        }
    }
}

impl HasChildren for Station {
    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn front(&self) -> Option<NodeId> {
        self.front
    }
}

impl Persistable for Station {
    fn factory_id(&self) -> &str {
        self.kind.id()
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' ({} children)", self.kind.id(), self.title, self.children.len())
    }
}

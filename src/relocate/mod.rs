//! Drag and drop of dockables with the pointer.
//!
//! `Idle -> Armed -> Dragging -> Idle`. Nothing in the tree changes until the
//! pointer is released over an accepted target; cancelling at any point
//! leaves the layout untouched.

pub mod layer;
pub mod operation;

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;

pub use layer::{DropLayer, LayerKind, LayerPriority, LayerRank, collect_layers, layers_at};
pub use operation::{DropOperation, DropRequest, OperationKind, prepare_drop, preview_half};

use crate::config::{DockConfig, RelocatorConfig};
use crate::constants::{DEFAULT_DRAG_THRESHOLD, DEFAULT_EDGE_SENSITIVITY};
use crate::controller::DockController;
use crate::error::DockResult;
use crate::geometry::{button_rects, rect_contains};
use crate::model::{HasChildren, NodeId, StationKind};

#[derive(Debug, Clone, PartialEq)]
pub enum RelocatorState {
    Idle,
    Armed {
        dockable: NodeId,
        origin: (u16, u16),
    },
    Dragging {
        dockable: NodeId,
        layers: Vec<DropLayer>,
        target: Option<DropOperation>,
        pointer: (u16, u16),
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocateOutcome {
    Ignored,
    Armed,
    Dragging,
    Dropped,
    Canceled,
}

#[derive(Debug, Clone)]
pub struct Relocator {
    state: RelocatorState,
    threshold: u16,
    edge_sensitivity: u16,
    modes: RelocatorConfig,
    /// Modes switched on by held modifier keys for the current gesture.
    held: RelocatorConfig,
}

impl Default for Relocator {
    fn default() -> Self {
        Self {
            state: RelocatorState::Idle,
            threshold: DEFAULT_DRAG_THRESHOLD,
            edge_sensitivity: DEFAULT_EDGE_SENSITIVITY,
            modes: RelocatorConfig::default(),
            held: RelocatorConfig::default(),
        }
    }
}

impl Relocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DockConfig) -> Self {
        Self {
            threshold: config.drag_threshold,
            edge_sensitivity: config.edge_sensitivity,
            modes: config.relocator,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &RelocatorState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, RelocatorState::Dragging { .. })
    }

    pub fn set_screen_only(&mut self, enabled: bool) {
        self.modes.screen_only = enabled;
    }

    pub fn set_no_combination(&mut self, enabled: bool) {
        self.modes.no_combination = enabled;
    }

    pub fn modes(&self) -> RelocatorConfig {
        RelocatorConfig {
            screen_only: self.modes.screen_only || self.held.screen_only,
            no_combination: self.modes.no_combination || self.held.no_combination,
        }
    }

    pub fn target(&self) -> Option<&DropOperation> {
        match &self.state {
            RelocatorState::Dragging { target, .. } => target.as_ref(),
            _ => None,
        }
    }

    pub fn preview(&self) -> Option<Rect> {
        self.target().map(|op| op.preview)
    }

    /// Arms a drag for a parented, registered node.
    pub fn press(&mut self, ctrl: &DockController, dockable: NodeId, column: u16, row: u16) -> RelocateOutcome {
        let movable = ctrl.register().is_registered(dockable)
            && ctrl.tree().parent(dockable).is_some()
            && !ctrl.register().is_root(dockable);
        if !movable {
            self.state = RelocatorState::Idle;
            return RelocateOutcome::Ignored;
        }
        self.state = RelocatorState::Armed {
            dockable,
            origin: (column, row),
        };
        RelocateOutcome::Armed
    }

    pub fn drag_to(&mut self, ctrl: &DockController, column: u16, row: u16) -> RelocateOutcome {
        match &self.state {
            RelocatorState::Idle => RelocateOutcome::Ignored,
            RelocatorState::Armed { dockable, origin } => {
                let travelled = column.abs_diff(origin.0) + row.abs_diff(origin.1);
                if travelled < self.threshold {
                    return RelocateOutcome::Armed;
                }
                let dockable = *dockable;
                let layers = collect_layers(ctrl);
                debug!(?dockable, layers = layers.len(), "drag started");
                self.state = RelocatorState::Dragging {
                    dockable,
                    layers,
                    target: None,
                    pointer: (column, row),
                };
                self.update_target(ctrl, column, row);
                RelocateOutcome::Dragging
            }
            RelocatorState::Dragging { .. } => {
                self.update_target(ctrl, column, row);
                RelocateOutcome::Dragging
            }
        }
    }

    fn update_target(&mut self, ctrl: &DockController, column: u16, row: u16) {
        let modes = self.modes();
        let edge_sensitivity = self.edge_sensitivity;
        let RelocatorState::Dragging {
            dockable,
            layers,
            target,
            pointer,
        } = &mut self.state
        else {
            return;
        };
        *pointer = (column, row);
        let request = DropRequest {
            dockable: *dockable,
            column,
            row,
            edge_sensitivity,
            modes,
        };
        *target = layers_at(layers, column, row).find_map(|layer| prepare_drop(ctrl, layer, &request));
    }

    /// Executes the current target, if any.
    pub fn release(&mut self, ctrl: &mut DockController, column: u16, row: u16) -> DockResult<RelocateOutcome> {
        if self.is_dragging() {
            self.update_target(ctrl, column, row);
        }
        let state = std::mem::replace(&mut self.state, RelocatorState::Idle);
        self.held = RelocatorConfig::default();
        match state {
            RelocatorState::Idle => Ok(RelocateOutcome::Ignored),
            RelocatorState::Armed { .. } => Ok(RelocateOutcome::Canceled),
            RelocatorState::Dragging { target: None, dockable, .. } => {
                debug!(?dockable, "drag canceled, no target");
                Ok(RelocateOutcome::Canceled)
            }
            RelocatorState::Dragging {
                target: Some(op), ..
            } => {
                debug!(dockable = ?op.dockable, station = ?op.station, kind = ?op.kind, "drag dropped");
                ctrl.move_to(op.dockable, op.station, op.placement)?;
                Ok(RelocateOutcome::Dropped)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.state = RelocatorState::Idle;
        self.held = RelocatorConfig::default();
    }

    /// Feeds a crossterm mouse event. SHIFT forces screen-only drops, ALT
    /// disables combining.
    pub fn handle_mouse(&mut self, ctrl: &mut DockController, event: &MouseEvent) -> DockResult<RelocateOutcome> {
        let (column, row) = (event.column, event.row);
        self.held = RelocatorConfig {
            screen_only: event.modifiers.contains(KeyModifiers::SHIFT),
            no_combination: event.modifiers.contains(KeyModifiers::ALT),
        };
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => match hit_test(ctrl, column, row) {
                Some(node) => Ok(self.press(ctrl, node, column, row)),
                None => Ok(RelocateOutcome::Ignored),
            },
            MouseEventKind::Drag(MouseButton::Left) => Ok(self.drag_to(ctrl, column, row)),
            MouseEventKind::Up(MouseButton::Left) => self.release(ctrl, column, row),
            _ => Ok(RelocateOutcome::Ignored),
        }
    }
}

/// The dockable whose tab, flap button or body is under the pointer. Tabs
/// and floating windows win over docked bodies.
pub fn hit_test(ctrl: &DockController, column: u16, row: u16) -> Option<NodeId> {
    let tree = ctrl.tree();
    for station_id in ctrl.register().registered_stations() {
        let (Some(station), Some(bounds)) = (tree.station(station_id), ctrl.bounds(station_id)) else {
            continue;
        };
        let strip = station.tab_strip(bounds);
        if !matches!(station.kind(), StationKind::Stack | StationKind::Flap { .. })
            || !rect_contains(strip, column, row)
        {
            continue;
        }
        let buttons = button_rects(strip, station.strip_direction(), station.child_count());
        if let Some(idx) = buttons.iter().position(|b| rect_contains(*b, column, row)) {
            return station.children().get(idx).copied();
        }
    }
    ctrl.register()
        .registered_dockables()
        .into_iter()
        .filter(|id| ctrl.bounds(*id).is_some_and(|r| rect_contains(r, column, row)))
        .max_by_key(|id| {
            let floating = tree
                .parent(*id)
                .is_some_and(|p| matches!(tree.station_kind(p), Some(StationKind::Screen { .. })));
            (floating, tree.depth(*id))
        })
}

//! Turning a pointer position over a layer into a concrete drop.

use ratatui::layout::{Direction, Rect};

use super::layer::{DropLayer, LayerKind};
use crate::config::RelocatorConfig;
use crate::constants::{
    DEFAULT_FLOAT_HEIGHT, DEFAULT_FLOAT_WIDTH, MAX_EDGE_BAND, MIN_EDGE_BAND, STATION_EDGE_BAND,
};
use crate::controller::DockController;
use crate::geometry::{FloatRect, button_rects, insertion_index, rect_contains};
use crate::model::{HasChildren, InsertPosition, NodeId, Placement, StationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Split,
    Combine,
    /// New tab in an existing stack.
    Tab,
    /// New entry in a flap strip.
    Insert,
    Float,
}

/// A prepared drop: where the dockable goes and what to preview.
#[derive(Debug, Clone, PartialEq)]
pub struct DropOperation {
    pub station: NodeId,
    pub dockable: NodeId,
    pub placement: Placement,
    pub kind: OperationKind,
    pub preview: Rect,
}

/// Pointer context handed to [`prepare_drop`].
#[derive(Debug, Clone, Copy)]
pub struct DropRequest {
    pub dockable: NodeId,
    pub column: u16,
    pub row: u16,
    /// Percent of a leaf's extent that counts as its edge.
    pub edge_sensitivity: u16,
    pub modes: RelocatorConfig,
}

fn edge_band(extent: u16, sensitivity: u16) -> u16 {
    let band = (u32::from(extent) * u32::from(sensitivity) / 100) as u16;
    band.clamp(MIN_EDGE_BAND, MAX_EDGE_BAND)
}

/// Half of `area` on `side`, shown while hovering an edge.
pub fn preview_half(area: Rect, side: InsertPosition) -> Rect {
    let half_w = (area.width / 2).max(1);
    let half_h = (area.height / 2).max(1);
    match side {
        InsertPosition::Left => Rect { width: half_w, ..area },
        InsertPosition::Right => Rect {
            x: area.x + area.width - half_w,
            width: half_w,
            ..area
        },
        InsertPosition::Top => Rect { height: half_h, ..area },
        InsertPosition::Bottom => Rect {
            y: area.y + area.height - half_h,
            height: half_h,
            ..area
        },
    }
}

/// Side whose edge the pointer is closest to.
fn nearest_side(area: Rect, column: u16, row: u16) -> (InsertPosition, u16) {
    let left = column.saturating_sub(area.x);
    let right = (area.x + area.width).saturating_sub(column + 1);
    let top = row.saturating_sub(area.y);
    let bottom = (area.y + area.height).saturating_sub(row + 1);
    [
        (InsertPosition::Left, left),
        (InsertPosition::Right, right),
        (InsertPosition::Top, top),
        (InsertPosition::Bottom, bottom),
    ]
    .into_iter()
    .min_by_key(|(_, distance)| *distance)
    .unwrap_or((InsertPosition::Right, 0))
}

/// Side of `area` whose edge band contains the pointer, if any.
fn edge_side(area: Rect, column: u16, row: u16, sensitivity: u16) -> Option<InsertPosition> {
    let band_x = edge_band(area.width, sensitivity);
    let band_y = edge_band(area.height, sensitivity);
    let (side, distance) = nearest_side(area, column, row);
    let band = match side {
        InsertPosition::Left | InsertPosition::Right => band_x,
        InsertPosition::Top | InsertPosition::Bottom => band_y,
    };
    (distance < band).then_some(side)
}

/// Computes what dropping `request.dockable` on `layer` would do. Returns
/// `None` when the layer offers nothing at this position or acceptance
/// refuses the result.
pub fn prepare_drop(ctrl: &DockController, layer: &DropLayer, request: &DropRequest) -> Option<DropOperation> {
    let tree = ctrl.tree();
    let dockable = request.dockable;
    if layer.station == dockable || tree.is_ancestor(dockable, layer.station) {
        return None;
    }
    let operation = match layer.kind {
        LayerKind::Split => prepare_split(ctrl, layer, request)?,
        LayerKind::Tabs | LayerKind::Strip => {
            let station = tree.station(layer.station)?;
            let direction = match layer.kind {
                LayerKind::Tabs => Direction::Horizontal,
                _ => station.strip_direction(),
            };
            let buttons = button_rects(layer.area, direction, station.child_count());
            let mut index = insertion_index(&buttons, direction, request.column, request.row);
            if let Some(current) = station.index_of(dockable)
                && current < index
            {
                index -= 1;
            }
            let (kind, preview) = match station.kind() {
                StationKind::Stack => (
                    OperationKind::Tab,
                    ctrl.bounds(layer.station).unwrap_or(layer.area),
                ),
                _ => (OperationKind::Insert, layer.area),
            };
            DropOperation {
                station: layer.station,
                dockable,
                placement: Placement::Index(index),
                kind,
                preview,
            }
        }
        LayerKind::Screen => {
            let size = ctrl.bounds(dockable).filter(|r| r.width > 0 && r.height > 0);
            let (width, height) = size
                .map(|r| (r.width, r.height))
                .unwrap_or((DEFAULT_FLOAT_WIDTH, DEFAULT_FLOAT_HEIGHT));
            let bounds = FloatRect::centered_on(request.column, request.row, width, height).keep_grabbable(layer.area);
            DropOperation {
                station: layer.station,
                dockable,
                placement: Placement::Bounds(bounds),
                kind: OperationKind::Float,
                preview: bounds.visible_in(layer.area),
            }
        }
        LayerKind::Window(child) => {
            if child == dockable || tree.is_ancestor(dockable, child) {
                return None;
            }
            DropOperation {
                station: layer.station,
                dockable,
                placement: Placement::Combine { target: child },
                kind: OperationKind::Combine,
                preview: layer.area,
            }
        }
    };
    filter_modes(&operation, request.modes)?;
    accepted(ctrl, &operation).then_some(operation)
}

fn prepare_split(ctrl: &DockController, layer: &DropLayer, request: &DropRequest) -> Option<DropOperation> {
    let tree = ctrl.tree();
    let station = tree.station(layer.station)?;
    let (column, row) = (request.column, request.row);
    let make = |placement, kind, preview| DropOperation {
        station: layer.station,
        dockable: request.dockable,
        placement,
        kind,
        preview,
    };
    if station.child_count() == 0 {
        return Some(make(Placement::Default, OperationKind::Split, layer.area));
    }
    let (outer, distance) = nearest_side(layer.area, column, row);
    if distance < STATION_EDGE_BAND {
        return Some(make(
            Placement::Split { target: None, side: outer },
            OperationKind::Split,
            preview_half(layer.area, outer),
        ));
    }
    let (child, rect) = station
        .children()
        .iter()
        .filter_map(|c| ctrl.bounds(*c).map(|r| (*c, r)))
        .find(|(_, r)| rect_contains(*r, column, row))?;
    if child == request.dockable {
        return None;
    }
    let edge = edge_side(rect, column, row, request.edge_sensitivity);
    let side = match edge {
        Some(side) => side,
        None if request.modes.no_combination => nearest_side(rect, column, row).0,
        None => {
            if tree.is_ancestor(request.dockable, child) {
                return None;
            }
            return Some(make(Placement::Combine { target: child }, OperationKind::Combine, rect));
        }
    };
    Some(make(
        Placement::Split {
            target: Some(child),
            side,
        },
        OperationKind::Split,
        preview_half(rect, side),
    ))
}

fn filter_modes(operation: &DropOperation, modes: RelocatorConfig) -> Option<()> {
    if modes.screen_only && operation.kind != OperationKind::Float {
        return None;
    }
    if modes.no_combination && matches!(operation.kind, OperationKind::Combine | OperationKind::Tab) {
        return None;
    }
    Some(())
}

fn accepted(ctrl: &DockController, operation: &DropOperation) -> bool {
    match operation.placement {
        Placement::Combine { target } => {
            let judged = ctrl
                .tree()
                .parent(target)
                .filter(|p| ctrl.tree().station_kind(*p).is_some_and(StationKind::is_stack))
                .unwrap_or(operation.station);
            ctrl.accepts_combination(judged, operation.dockable, target)
        }
        _ => ctrl.accepts(operation.station, operation.dockable),
    }
}

//! Screen regions that stations claim while a drag is in progress.

use std::cmp::Reverse;

use ratatui::layout::Rect;

use crate::controller::DockController;
use crate::geometry::{rect_contains, rect_is_empty};
use crate::model::{NodeId, StationKind};

/// What part of a station a layer covers; decides how a drop is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Whole split station: edges split, centres combine.
    Split,
    /// Tab row of a stack.
    Tabs,
    /// Button strip of a flap.
    Strip,
    /// Whole root area of a screen station.
    Screen,
    /// One floating window of a screen station.
    Window(NodeId),
}

/// Rank among layers of the same floating level; higher wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerRank {
    Screen,
    Base,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LayerPriority {
    /// Anything inside a floating window outranks the docked layout.
    pub floating: bool,
    pub rank: LayerRank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropLayer {
    pub station: NodeId,
    pub kind: LayerKind,
    pub area: Rect,
    pub priority: LayerPriority,
    pub depth: usize,
}

impl DropLayer {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        rect_contains(self.area, column, row)
    }
}

/// Layers of every registered station that has been laid out, strongest
/// first.
pub fn collect_layers(ctrl: &DockController) -> Vec<DropLayer> {
    let tree = ctrl.tree();
    let mut layers = Vec::new();
    for station_id in ctrl.register().registered_stations() {
        let (Some(station), Some(bounds)) = (tree.station(station_id), ctrl.bounds(station_id)) else {
            continue;
        };
        if rect_is_empty(bounds) {
            continue;
        }
        let depth = tree.depth(station_id);
        let floating = has_screen_ancestor(ctrl, station_id);
        let layer = |kind, area, rank| DropLayer {
            station: station_id,
            kind,
            area,
            priority: LayerPriority { floating, rank },
            depth,
        };
        match station.kind() {
            StationKind::Split { .. } => layers.push(layer(LayerKind::Split, bounds, LayerRank::Base)),
            StationKind::Stack => {
                layers.push(layer(LayerKind::Tabs, station.tab_strip(bounds), LayerRank::Title));
            }
            StationKind::Flap { .. } => layers.push(layer(LayerKind::Strip, bounds, LayerRank::Title)),
            StationKind::Screen { .. } => {
                layers.push(layer(LayerKind::Screen, bounds, LayerRank::Screen));
                for (child, window) in station.child_areas(bounds) {
                    if !rect_is_empty(window) {
                        layers.push(DropLayer {
                            station: station_id,
                            kind: LayerKind::Window(child),
                            area: window,
                            priority: LayerPriority {
                                floating: true,
                                rank: LayerRank::Base,
                            },
                            depth: depth + 1,
                        });
                    }
                }
            }
        }
    }
    sort_layers(&mut layers);
    layers
}

pub fn sort_layers(layers: &mut [DropLayer]) {
    layers.sort_by_key(|layer| Reverse((layer.priority, layer.depth)));
}

fn has_screen_ancestor(ctrl: &DockController, station: NodeId) -> bool {
    let tree = ctrl.tree();
    let mut current = tree.parent(station);
    while let Some(parent) = current {
        if matches!(tree.station_kind(parent), Some(StationKind::Screen { .. })) {
            return true;
        }
        current = tree.parent(parent);
    }
    false
}

/// Layers under the pointer, strongest first.
pub fn layers_at(layers: &[DropLayer], column: u16, row: u16) -> impl Iterator<Item = &DropLayer> {
    layers.iter().filter(move |layer| layer.contains(column, row))
}

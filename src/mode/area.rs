use crate::model::{DockTree, ExtendedMode, NodeId, StationKind};

/// A named station that serves one extended mode.
///
/// Several areas may serve the same mode (two minimize strips) and one split
/// station may be registered twice, once for `Normal` and once for
/// `Maximized`; maximizing then shows the unit fullscreen in that station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeArea {
    pub name: String,
    pub mode: ExtendedMode,
    pub station: NodeId,
}

impl ModeArea {
    pub fn new(name: impl Into<String>, mode: ExtendedMode, station: NodeId) -> Self {
        Self {
            name: name.into(),
            mode,
            station,
        }
    }

    /// Maximize areas need a split station to show their unit fullscreen.
    pub fn is_valid_for(&self, tree: &DockTree) -> bool {
        match (self.mode, tree.station_kind(self.station)) {
            (ExtendedMode::Maximized, Some(StationKind::Split { .. })) => true,
            (ExtendedMode::Maximized, _) => false,
            (_, kind) => kind.is_some(),
        }
    }
}

/// Mode derived from where `node` sits: the nearest ancestor that is an area
/// decides. A fullscreen child of a maximize area counts as maximized.
pub fn derive_mode(tree: &DockTree, areas: &[ModeArea], node: NodeId) -> Option<ExtendedMode> {
    let mut child = node;
    while let Some(parent) = tree.parent(child) {
        let fullscreen = tree.station(parent).and_then(|s| s.fullscreen());
        let serving = areas.iter().filter(|a| a.station == parent);
        let mut found = None;
        for area in serving {
            if area.mode == ExtendedMode::Maximized {
                if fullscreen == Some(child) {
                    return Some(ExtendedMode::Maximized);
                }
                continue;
            }
            found.get_or_insert(area.mode);
        }
        if found.is_some() {
            return found;
        }
        child = parent;
    }
    None
}

/// The nearest ancestor area of `node` that serves `mode`.
pub fn enclosing_area<'a>(
    tree: &DockTree,
    areas: &'a [ModeArea],
    node: NodeId,
    mode: ExtendedMode,
) -> Option<&'a ModeArea> {
    let mut current = tree.parent(node);
    while let Some(station) = current {
        if let Some(area) = areas.iter().find(|a| a.station == station && a.mode == mode) {
            return Some(area);
        }
        current = tree.parent(station);
    }
    None
}

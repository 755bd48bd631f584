//! Extended modes: normal, minimized, maximized and externalized.
//!
//! A dockable's mode follows from where it sits. Changing the mode moves the
//! dockable (or its whole group) into an area serving the new mode, after
//! remembering where it was so that coming back is lossless.

pub mod area;
pub mod group;
pub mod setting;

use std::collections::BTreeMap;

use slotmap::SecondaryMap;
use tracing::{debug, warn};

pub use area::{ModeArea, derive_mode, enclosing_area};
pub use group::{GroupBehavior, ModeGroup, StackedBehavior, TopmostBehavior, behavior_for};
pub use setting::{ModeEntry, ModeSettings};

use crate::config::DockConfig;
use crate::controller::DockController;
use crate::error::{DockError, DockResult};
use crate::events::DockEvent;
use crate::geometry::FloatRect;
use crate::model::{DockLocation, DockTree, ExtendedMode, NodeId, Placement};

/// Modes that were forced back to normal and can be re-applied later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForcedModes {
    entries: Vec<(NodeId, ExtendedMode)>,
}

impl ForcedModes {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(NodeId, ExtendedMode)> {
        self.entries.iter()
    }
}

#[derive(Debug)]
pub struct ModeManager {
    areas: Vec<ModeArea>,
    defaults: BTreeMap<ExtendedMode, String>,
    history: SecondaryMap<NodeId, BTreeMap<ExtendedMode, DockLocation>>,
    /// History of persisted ids that have no live dockable yet.
    stashed: BTreeMap<String, ModeEntry>,
    behavior: Box<dyn GroupBehavior>,
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeManager {
    pub fn new() -> Self {
        Self::with_behavior(Box::new(TopmostBehavior))
    }

    pub fn with_behavior(behavior: Box<dyn GroupBehavior>) -> Self {
        Self {
            areas: Vec::new(),
            defaults: BTreeMap::new(),
            history: SecondaryMap::new(),
            stashed: BTreeMap::new(),
            behavior,
        }
    }

    pub fn from_config(config: &DockConfig) -> Self {
        Self::with_behavior(behavior_for(config.group_behavior))
    }

    pub fn set_behavior(&mut self, behavior: Box<dyn GroupBehavior>) {
        self.behavior = behavior;
    }

    /// Registers an area. The first area of a mode becomes its default.
    pub fn add_area(&mut self, tree: &DockTree, area: ModeArea) -> DockResult<()> {
        if self.area(&area.name).is_some() {
            return Err(DockError::DuplicateId {
                namespace: "area",
                id: area.name,
            });
        }
        tree.require_station(area.station)?;
        if !area.is_valid_for(tree) {
            return Err(DockError::Inconsistent(format!(
                "area '{}' cannot serve {} with this station kind",
                area.name, area.mode
            )));
        }
        debug!(name = %area.name, mode = %area.mode, station = ?area.station, "mode area added");
        self.defaults.entry(area.mode).or_insert_with(|| area.name.clone());
        self.areas.push(area);
        Ok(())
    }

    pub fn remove_area(&mut self, name: &str) -> Option<ModeArea> {
        let idx = self.areas.iter().position(|a| a.name == name)?;
        let area = self.areas.remove(idx);
        if self.defaults.get(&area.mode).map(String::as_str) == Some(name) {
            self.defaults.remove(&area.mode);
            if let Some(next) = self.areas.iter().find(|a| a.mode == area.mode) {
                self.defaults.insert(area.mode, next.name.clone());
            }
        }
        Some(area)
    }

    pub fn areas(&self) -> &[ModeArea] {
        &self.areas
    }

    pub fn area(&self, name: &str) -> Option<&ModeArea> {
        self.areas.iter().find(|a| a.name == name)
    }

    pub fn set_default_area(&mut self, mode: ExtendedMode, name: &str) -> DockResult<()> {
        match self.area(name) {
            Some(area) if area.mode == mode => {
                self.defaults.insert(mode, name.to_string());
                Ok(())
            }
            Some(_) => Err(DockError::Inconsistent(format!(
                "area '{name}' does not serve {mode}"
            ))),
            None => Err(DockError::UnknownId {
                namespace: "area",
                id: name.to_string(),
            }),
        }
    }

    pub fn default_area(&self, mode: ExtendedMode) -> Option<&ModeArea> {
        self.defaults.get(&mode).and_then(|name| self.area(name))
    }

    /// Mode derived from the position, or the last known mode for dockables
    /// outside every area.
    pub fn mode_of(&self, tree: &DockTree, dockable: NodeId) -> ExtendedMode {
        derive_mode(tree, &self.areas, dockable)
            .or_else(|| tree.dockable(dockable).map(|d| d.mode()))
            .unwrap_or_default()
    }

    pub fn history(&self, dockable: NodeId, mode: ExtendedMode) -> Option<&DockLocation> {
        self.history.get(dockable)?.get(&mode)
    }

    pub fn set_history(&mut self, dockable: NodeId, mode: ExtendedMode, location: DockLocation) {
        if let Some(entry) = self.history.entry(dockable) {
            entry.or_default().insert(mode, location);
        }
    }

    pub fn forget(&mut self, dockable: NodeId) {
        self.history.remove(dockable);
    }

    /// Where `node` sits inside the nearest area serving `mode`.
    pub fn location_of(&self, tree: &DockTree, node: NodeId, mode: ExtendedMode) -> Option<DockLocation> {
        let area = enclosing_area(tree, &self.areas, node, mode)?;
        let path = tree.path_within(area.station, node)?;
        Some(DockLocation::new(area.name.clone(), path))
    }

    /// Moves `dockable` (and its group) into `target`. Returns `false` when
    /// the dockable cannot enter that mode or no area serves it.
    pub fn set_mode(
        &mut self,
        ctrl: &mut DockController,
        dockable: NodeId,
        target: ExtendedMode,
        area: Option<&str>,
    ) -> DockResult<bool> {
        let supported = ctrl
            .tree()
            .dockable(dockable)
            .ok_or(DockError::NotADockable(dockable))?
            .capabilities()
            .supports(target);
        if !supported {
            debug!(?dockable, %target, "mode not supported by dockable");
            return Ok(false);
        }
        if !ctrl.register().is_registered(dockable) {
            return Ok(false);
        }
        let explicit = match area {
            Some(name) => {
                let found = self.area(name).cloned().ok_or_else(|| DockError::UnknownId {
                    namespace: "area",
                    id: name.to_string(),
                })?;
                if found.mode != target {
                    return Ok(false);
                }
                Some(found)
            }
            None => None,
        };
        let current = self.mode_of(ctrl.tree(), dockable);
        if current == target && explicit.is_none() {
            return Ok(true);
        }
        let group = self.behavior.group(ctrl.tree(), dockable, target);
        debug!(?dockable, from = %current, to = %target, unit = ?group.unit, "changing mode");
        let result = ctrl.batch(|ctrl| self.apply(ctrl, dockable, &group, current, target, explicit.as_ref()));
        self.refresh(ctrl);
        result
    }

    fn apply(
        &mut self,
        ctrl: &mut DockController,
        requested: NodeId,
        group: &ModeGroup,
        current: ExtendedMode,
        target: ExtendedMode,
        explicit: Option<&ModeArea>,
    ) -> DockResult<bool> {
        let Some((station, placement)) = self.destination(ctrl, requested, group, target, explicit) else {
            warn!(%target, "no area serves the requested mode");
            return Ok(false);
        };
        if target == ExtendedMode::Maximized {
            self.displace_maximized(ctrl, group.unit)?;
        }
        for member in &group.members {
            let mode = self.mode_of(ctrl.tree(), *member);
            if mode != ExtendedMode::Maximized
                && let Some(location) = self.location_of(ctrl.tree(), *member, mode)
            {
                self.set_history(*member, mode, location);
            }
        }
        if current == ExtendedMode::Maximized {
            self.release_fullscreen(ctrl, group.unit)?;
        }
        Self::move_unit(ctrl, group.unit, station, placement)?;
        if target == ExtendedMode::Maximized {
            ctrl.set_fullscreen(station, Some(group.unit))?;
        }
        Ok(true)
    }

    /// Station and placement a unit goes to: explicit area, then the
    /// requested dockable's history, then the default area.
    fn destination(
        &self,
        ctrl: &DockController,
        requested: NodeId,
        group: &ModeGroup,
        target: ExtendedMode,
        explicit: Option<&ModeArea>,
    ) -> Option<(NodeId, Placement)> {
        let tree = ctrl.tree();
        let remembered = (target != ExtendedMode::Maximized)
            .then(|| self.history(requested, target))
            .flatten()
            .filter(|loc| explicit.is_none_or(|a| a.name == loc.root))
            .and_then(|loc| {
                let area = self.area(&loc.root).filter(|a| a.mode == target && tree.contains(a.station))?;
                let path = if group.unit == requested {
                    loc.path.clone()
                } else {
                    loc.path.parent().unwrap_or_default()
                };
                Some((area.station, path))
            });
        if let Some((station, path)) = remembered {
            let placement = if path.is_empty() {
                Placement::Default
            } else {
                Placement::Path(path)
            };
            return Some((station, placement));
        }
        let area = explicit.or_else(|| self.default_area(target))?;
        let placement = match (target, ctrl.bounds(group.unit)) {
            (ExtendedMode::Externalized, Some(rect)) if rect.width > 0 && rect.height > 0 => {
                Placement::Bounds(FloatRect::from_rect(rect))
            }
            _ => Placement::Default,
        };
        Some((area.station, placement))
    }

    /// Returns the fullscreen unit of every maximize area other than `unit`
    /// to normal, so at most one unit stays maximized.
    fn displace_maximized(&mut self, ctrl: &mut DockController, unit: NodeId) -> DockResult<()> {
        let stations: Vec<NodeId> = self
            .areas
            .iter()
            .filter(|a| a.mode == ExtendedMode::Maximized)
            .map(|a| a.station)
            .collect();
        for station in stations {
            let Some(previous) = ctrl.tree().station(station).and_then(|s| s.fullscreen()) else {
                continue;
            };
            if previous != unit {
                self.displace(ctrl, previous)?;
            }
        }
        Ok(())
    }

    fn displace(&mut self, ctrl: &mut DockController, previous: NodeId) -> DockResult<()> {
        let members: Vec<NodeId> = ctrl
            .tree()
            .descendants(previous)
            .into_iter()
            .filter(|id| ctrl.tree().dockable(*id).is_some())
            .collect();
        let Some(first) = members.first().copied() else {
            return Ok(());
        };
        debug!(?previous, "restoring previously maximized unit");
        let group = ModeGroup {
            unit: previous,
            members,
        };
        self.apply(
            ctrl,
            first,
            &group,
            ExtendedMode::Maximized,
            ExtendedMode::Normal,
            None,
        )
        .map(|_| ())
    }

    fn release_fullscreen(&self, ctrl: &mut DockController, unit: NodeId) -> DockResult<()> {
        let stations: Vec<NodeId> = self
            .areas
            .iter()
            .filter(|a| a.mode == ExtendedMode::Maximized)
            .map(|a| a.station)
            .collect();
        for station in stations {
            let Some(full) = ctrl.tree().station(station).and_then(|s| s.fullscreen()) else {
                continue;
            };
            if full == unit || ctrl.tree().is_ancestor(full, unit) {
                ctrl.set_fullscreen(station, None)?;
            }
        }
        Ok(())
    }

    fn move_unit(ctrl: &mut DockController, unit: NodeId, station: NodeId, placement: Placement) -> DockResult<()> {
        let in_place = match &placement {
            Placement::Path(path) => ctrl.tree().path_within(station, unit).as_ref() == Some(path),
            _ => ctrl.tree().parent(unit) == Some(station),
        };
        if in_place {
            return Ok(());
        }
        match ctrl.move_to(unit, station, placement) {
            Err(DockError::Rejected { .. }) => {
                debug!(?unit, ?station, "remembered placement rejected, using default");
                ctrl.move_to(unit, station, Placement::Default)
            }
            other => other,
        }
    }

    /// Re-derives every registered dockable's mode from its position and
    /// fires `ModeChanged` for each one that differs.
    pub fn refresh(&self, ctrl: &mut DockController) -> usize {
        let mut changes = Vec::new();
        for id in ctrl.register().registered_dockables() {
            let Some(mode) = derive_mode(ctrl.tree(), &self.areas, id) else {
                continue;
            };
            let Some(dockable) = ctrl.tree_mut().dockable_mut(id) else {
                continue;
            };
            let old = dockable.mode();
            if old != mode {
                dockable.set_mode(mode);
                changes.push(DockEvent::ModeChanged {
                    dockable: id,
                    old,
                    new: mode,
                });
            }
        }
        let count = changes.len();
        for event in changes {
            debug!(?event, "mode changed");
            ctrl.emit(event);
        }
        count
    }

    /// Forces one dockable back to normal; returns the mode it had.
    pub fn ensure_basic_mode(&mut self, ctrl: &mut DockController, dockable: NodeId) -> DockResult<Option<ExtendedMode>> {
        let mode = self.mode_of(ctrl.tree(), dockable);
        if mode == ExtendedMode::Normal {
            return Ok(None);
        }
        self.set_mode(ctrl, dockable, ExtendedMode::Normal, None)?;
        Ok(Some(mode))
    }

    /// Forces every registered dockable back to normal and records what was
    /// forced.
    pub fn ensure_basic_modes(&mut self, ctrl: &mut DockController) -> DockResult<ForcedModes> {
        let entries: Vec<(NodeId, ExtendedMode)> = ctrl
            .register()
            .registered_dockables()
            .into_iter()
            .map(|id| (id, self.mode_of(ctrl.tree(), id)))
            .filter(|(_, mode)| *mode != ExtendedMode::Normal)
            .collect();
        for (id, _) in &entries {
            self.ensure_basic_mode(ctrl, *id)?;
        }
        if !entries.is_empty() {
            debug!(count = entries.len(), "forced dockables back to normal");
        }
        Ok(ForcedModes { entries })
    }

    pub fn restore_forced(&mut self, ctrl: &mut DockController, forced: &ForcedModes) -> DockResult<()> {
        for (id, mode) in forced.iter() {
            if !ctrl.tree().contains(*id) || self.mode_of(ctrl.tree(), *id) == *mode {
                continue;
            }
            if !self.set_mode(ctrl, *id, *mode, None)? {
                warn!(dockable = ?id, %mode, "could not restore forced mode");
            }
        }
        Ok(())
    }

    /// Snapshot of modes and histories for every dockable `id_of` knows,
    /// plus stashed entries of ids without a live dockable.
    pub fn settings(&self, tree: &DockTree, id_of: impl Fn(NodeId) -> Option<String>) -> ModeSettings {
        let mut settings = ModeSettings {
            entries: self.stashed.clone(),
        };
        for (id, node) in tree.iter() {
            if node.as_dockable().is_none() {
                continue;
            }
            let Some(key) = id_of(id) else {
                continue;
            };
            let history = self.history.get(id).cloned().unwrap_or_default();
            settings.entries.insert(
                key,
                ModeEntry {
                    mode: self.mode_of(tree, id),
                    history,
                },
            );
        }
        settings
    }

    /// Installs histories from `settings`; entries without a live dockable
    /// are stashed until [`ModeManager::claim`] is called for their id.
    pub fn apply_settings(&mut self, settings: &ModeSettings, node_of: impl Fn(&str) -> Option<NodeId>) {
        for (key, entry) in &settings.entries {
            match node_of(key) {
                Some(node) => {
                    if let Some(slot) = self.history.entry(node) {
                        *slot.or_default() = entry.history.clone();
                    }
                }
                None => {
                    self.stashed.insert(key.clone(), entry.clone());
                }
            }
        }
    }

    /// Moves stashed history of `key` to a dockable that just appeared.
    pub fn claim(&mut self, key: &str, node: NodeId) -> Option<ModeEntry> {
        let entry = self.stashed.remove(key)?;
        if let Some(slot) = self.history.entry(node) {
            *slot.or_default() = entry.history.clone();
        }
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::model::{Capabilities, Dockable, FlapSide, InsertPosition, Station};

    struct Fixture {
        ctrl: DockController,
        modes: ModeManager,
        center: NodeId,
        south: NodeId,
        screen: NodeId,
    }

    fn fixture(behavior: Box<dyn GroupBehavior>) -> Fixture {
        let mut ctrl = DockController::new();
        let center = ctrl.add_station(Station::split("center"));
        let south = ctrl.add_station(Station::flap("south", FlapSide::Bottom));
        let screen = ctrl.add_station(Station::screen("screen"));
        for root in [center, south, screen] {
            ctrl.add_root(root).unwrap();
        }
        let mut modes = ModeManager::with_behavior(behavior);
        modes
            .add_area(ctrl.tree(), ModeArea::new("center", ExtendedMode::Normal, center))
            .unwrap();
        modes
            .add_area(ctrl.tree(), ModeArea::new("center-max", ExtendedMode::Maximized, center))
            .unwrap();
        modes
            .add_area(ctrl.tree(), ModeArea::new("south", ExtendedMode::Minimized, south))
            .unwrap();
        modes
            .add_area(ctrl.tree(), ModeArea::new("screen", ExtendedMode::Externalized, screen))
            .unwrap();
        Fixture {
            ctrl,
            modes,
            center,
            south,
            screen,
        }
    }

    #[test]
    fn minimize_and_restore() {
        let mut f = fixture(Box::new(TopmostBehavior));
        let a = f.ctrl.add_dockable(Dockable::text("a"));
        let b = f.ctrl.add_dockable(Dockable::text("b"));
        f.ctrl.drop(f.center, a).unwrap();
        f.ctrl
            .drop_at(
                f.center,
                b,
                Placement::Split {
                    target: Some(a),
                    side: InsertPosition::Bottom,
                },
            )
            .unwrap();
        let before = f.ctrl.tree().path_of(b);
        let log = EventLog::new();
        f.ctrl.add_listener(log.clone());

        assert!(f.modes.set_mode(&mut f.ctrl, b, ExtendedMode::Minimized, None).unwrap());
        assert_eq!(f.ctrl.tree().parent(b), Some(f.south));
        assert_eq!(f.ctrl.tree().dockable(b).unwrap().mode(), ExtendedMode::Minimized);
        assert!(log.events().contains(&DockEvent::ModeChanged {
            dockable: b,
            old: ExtendedMode::Normal,
            new: ExtendedMode::Minimized
        }));

        assert!(f.modes.set_mode(&mut f.ctrl, b, ExtendedMode::Normal, None).unwrap());
        assert_eq!(f.ctrl.tree().path_of(b), before);
        f.ctrl.tree().validate().unwrap();
    }

    #[test]
    fn maximize_round_trip_from_stack() {
        let mut f = fixture(Box::new(TopmostBehavior));
        let a = f.ctrl.add_dockable(Dockable::text("a"));
        let b = f.ctrl.add_dockable(Dockable::text("b"));
        let c = f.ctrl.add_dockable(Dockable::text("c"));
        f.ctrl.drop(f.center, a).unwrap();
        f.ctrl.drop(f.center, b).unwrap();
        f.ctrl.combine(b, c, None).unwrap();
        let before = f.ctrl.tree().path_of(c);

        assert!(f.modes.set_mode(&mut f.ctrl, c, ExtendedMode::Maximized, None).unwrap());
        assert_eq!(f.ctrl.tree().station(f.center).unwrap().fullscreen(), Some(c));
        assert_eq!(f.modes.mode_of(f.ctrl.tree(), c), ExtendedMode::Maximized);
        // the stack it left held a single tab and was collapsed
        assert_eq!(f.ctrl.tree().parent(b), Some(f.center));

        assert!(f.modes.set_mode(&mut f.ctrl, c, ExtendedMode::Normal, None).unwrap());
        assert_eq!(f.ctrl.tree().path_of(c), before);
        assert_eq!(f.ctrl.tree().station(f.center).unwrap().fullscreen(), None);
    }

    #[test]
    fn topmost_keeps_one_maximized() {
        let mut f = fixture(Box::new(TopmostBehavior));
        let b = f.ctrl.add_dockable(Dockable::text("b"));
        let c = f.ctrl.add_dockable(Dockable::text("c"));
        f.ctrl.drop(f.center, b).unwrap();
        f.ctrl.drop(f.center, c).unwrap();
        f.modes.set_mode(&mut f.ctrl, c, ExtendedMode::Maximized, None).unwrap();
        f.modes.set_mode(&mut f.ctrl, b, ExtendedMode::Maximized, None).unwrap();
        assert_eq!(f.modes.mode_of(f.ctrl.tree(), b), ExtendedMode::Maximized);
        assert_eq!(f.modes.mode_of(f.ctrl.tree(), c), ExtendedMode::Normal);
        assert_eq!(f.ctrl.tree().dockable(c).unwrap().mode(), ExtendedMode::Normal);
    }

    #[test]
    fn stacked_group_and_capabilities() {
        let mut f = fixture(Box::new(StackedBehavior));
        let a = f.ctrl.add_dockable(Dockable::text("a"));
        let b = f.ctrl.add_dockable(Dockable::text("b"));
        let c = f.ctrl.add_dockable(Dockable::text("c"));
        f.ctrl.drop(f.center, a).unwrap();
        f.ctrl.drop(f.center, b).unwrap();
        let stack = f.ctrl.combine(b, c, None).unwrap();

        f.modes.set_mode(&mut f.ctrl, c, ExtendedMode::Minimized, None).unwrap();
        assert_eq!(f.ctrl.tree().parent(stack), Some(f.south));
        assert_eq!(f.ctrl.tree().dockable(b).unwrap().mode(), ExtendedMode::Minimized);

        f.modes.set_mode(&mut f.ctrl, c, ExtendedMode::Normal, None).unwrap();
        assert_eq!(f.ctrl.tree().parent(stack), Some(f.center));
        assert_eq!(f.ctrl.tree().children(stack), &[b, c]);

        let pinned = f.ctrl.add_dockable(Dockable::text("pinned").with_capabilities(Capabilities {
            externalizable: false,
            ..Capabilities::default()
        }));
        f.ctrl.drop(f.center, pinned).unwrap();
        assert!(!f.modes.set_mode(&mut f.ctrl, pinned, ExtendedMode::Externalized, None).unwrap());
        assert!(f.modes.set_mode(&mut f.ctrl, a, ExtendedMode::Externalized, None).unwrap());
        assert_eq!(f.ctrl.tree().parent(a), Some(f.screen));
    }

    #[test]
    fn forced_modes_come_back() {
        let mut f = fixture(Box::new(TopmostBehavior));
        let a = f.ctrl.add_dockable(Dockable::text("a"));
        let b = f.ctrl.add_dockable(Dockable::text("b"));
        f.ctrl.drop(f.center, a).unwrap();
        f.ctrl.drop(f.center, b).unwrap();
        f.modes.set_mode(&mut f.ctrl, a, ExtendedMode::Minimized, None).unwrap();
        let forced = f.modes.ensure_basic_modes(&mut f.ctrl).unwrap();
        assert_eq!(forced.len(), 1);
        assert_eq!(f.ctrl.tree().parent(a), Some(f.center));
        f.modes.restore_forced(&mut f.ctrl, &forced).unwrap();
        assert_eq!(f.ctrl.tree().parent(a), Some(f.south));
    }

    #[test]
    fn settings_stash_unknown_ids() {
        let mut f = fixture(Box::new(TopmostBehavior));
        let a = f.ctrl.add_dockable(Dockable::text("a"));
        f.ctrl.drop(f.center, a).unwrap();
        let b = f.ctrl.add_dockable(Dockable::text("b"));
        f.ctrl.drop(f.center, b).unwrap();
        f.modes.set_mode(&mut f.ctrl, a, ExtendedMode::Minimized, None).unwrap();
        let settings = f.modes.settings(f.ctrl.tree(), |id| (id == a).then(|| "a".to_string()));
        let entry = settings.get("a").unwrap();
        assert_eq!(entry.mode, ExtendedMode::Minimized);
        assert_eq!(entry.history[&ExtendedMode::Normal].root, "center");

        let mut fresh = ModeManager::new();
        fresh.apply_settings(&settings, |_| None);
        assert!(fresh.claim("a", b).is_some());
        assert_eq!(fresh.history(b, ExtendedMode::Normal), entry.history.get(&ExtendedMode::Normal));
        assert!(fresh.claim("a", b).is_none());
    }
}

//! Named roots and dockables on top of a controller: hide and show, named
//! layouts and whole-application layout files.
//!
//! Dockables registered here are "singles": layouts refer to them by id and
//! never recreate them. Anything else is rebuilt from its factory. Ids that
//! appear in a layout but have no dockable are handled by the
//! [`MissingStrategy`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::composition::DockLayoutComposition;
use super::factory::{
    BuildContext, ConvertContext, DockFactory, MultipleDockableFactory, SingleResolver,
};
use super::io::{DataReader, DataWriter};
use super::missing::{BackupFactory, BackupRegistry, MissingStrategy};
use super::setting::{InvisibleEntry, LayoutFile, Setting};
use super::situation::DockSituation;
use super::xml::XmlNode;
use crate::config::DockConfig;
use crate::controller::DockController;
use crate::error::{DockError, DockResult};
use crate::mode::{ModeArea, ModeManager};
use crate::model::{DockLocation, DockablePath, ExtendedMode, NodeId, Placement};

/// On-disk encoding of a frontend file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutFormat {
    #[default]
    Binary,
    Xml,
}

impl LayoutFormat {
    /// XML documents start with `<` once leading whitespace is skipped.
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'<') => LayoutFormat::Xml,
            _ => LayoutFormat::Binary,
        }
    }
}

#[derive(Debug, Clone)]
struct DockableEntry {
    node: NodeId,
    hideable: bool,
    /// Store the dockable's own layout when it is hidden.
    entry_layout: bool,
}

impl DockableEntry {
    fn new(node: NodeId) -> Self {
        Self {
            node,
            hideable: true,
            entry_layout: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct HiddenInfo {
    location: Option<DockLocation>,
    layout: Option<DockLayoutComposition>,
    /// The id came from a layout and has no dockable yet.
    missing: bool,
}

/// A layout part whose factory is not registered yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubtree {
    pub location: Option<DockLocation>,
    pub composition: DockLayoutComposition,
}

struct FrontendResolver<'a> {
    dockables: &'a mut BTreeMap<String, DockableEntry>,
    backups: &'a BackupRegistry,
    strategy: MissingStrategy,
    missing_singles: Vec<(String, Option<DockLocation>)>,
    missing_subtrees: Vec<PendingSubtree>,
}

impl<'a> FrontendResolver<'a> {
    fn new(
        dockables: &'a mut BTreeMap<String, DockableEntry>,
        backups: &'a BackupRegistry,
        strategy: MissingStrategy,
    ) -> Self {
        Self {
            dockables,
            backups,
            strategy,
            missing_singles: Vec::new(),
            missing_subtrees: Vec::new(),
        }
    }
}

impl SingleResolver for FrontendResolver<'_> {
    fn resolve(&mut self, ctrl: &mut DockController, id: &str) -> Option<NodeId> {
        if let Some(entry) = self.dockables.get(id) {
            if ctrl.tree().parent(entry.node).is_none() {
                return Some(entry.node);
            }
            warn!(%id, "dockable referenced twice in one layout");
            return None;
        }
        let dockable = self.backups.create(id)?;
        let node = ctrl.add_dockable(dockable);
        debug!(%id, ?node, "backup dockable created");
        self.dockables.insert(id.to_string(), DockableEntry::new(node));
        Some(node)
    }

    fn is_single(&self, node: NodeId) -> bool {
        self.dockables.values().any(|entry| entry.node == node)
    }

    fn missing_single(&mut self, id: &str, location: Option<DockLocation>) {
        if self.dockables.contains_key(id) {
            return;
        }
        if self.strategy.keeps_single() {
            self.missing_singles.push((id.to_string(), location));
        } else {
            debug!(%id, "missing dockable purged from layout");
        }
    }

    fn missing_subtree(&mut self, composition: &DockLayoutComposition, location: Option<DockLocation>) {
        if self.strategy.keeps_multiple() {
            self.missing_subtrees.push(PendingSubtree {
                location,
                composition: composition.clone(),
            });
        } else {
            warn!(factory = composition.factory(), "layout part without factory purged");
        }
    }
}

pub struct DockFrontend {
    controller: DockController,
    modes: ModeManager,
    situation: DockSituation,
    missing_strategy: MissingStrategy,
    revert_to_basic_modes: bool,
    dockables: BTreeMap<String, DockableEntry>,
    roots: BTreeMap<String, NodeId>,
    default_root: Option<String>,
    hidden: BTreeMap<String, HiddenInfo>,
    pending: Vec<PendingSubtree>,
    settings: BTreeMap<String, Setting>,
    current: Option<String>,
    backups: BackupRegistry,
}

impl std::fmt::Debug for DockFrontend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockFrontend")
            .field("roots", &self.roots)
            .field("dockables", &self.dockables.len())
            .field("hidden", &self.hidden.len())
            .field("pending", &self.pending.len())
            .field("settings", &self.settings.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish()
    }
}

impl Default for DockFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl DockFrontend {
    pub fn new() -> Self {
        Self::with_config(&DockConfig::default())
    }

    pub fn with_config(config: &DockConfig) -> Self {
        Self {
            controller: DockController::with_config(config),
            modes: ModeManager::from_config(config),
            situation: DockSituation::new(),
            missing_strategy: config.missing_strategy,
            revert_to_basic_modes: config.revert_to_basic_modes,
            dockables: BTreeMap::new(),
            roots: BTreeMap::new(),
            default_root: None,
            hidden: BTreeMap::new(),
            pending: Vec::new(),
            settings: BTreeMap::new(),
            current: None,
            backups: BackupRegistry::default(),
        }
    }

    pub fn controller(&self) -> &DockController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut DockController {
        &mut self.controller
    }

    pub fn modes(&self) -> &ModeManager {
        &self.modes
    }

    pub fn situation(&self) -> &DockSituation {
        &self.situation
    }

    /// Both halves at once, for callers driving modes themselves.
    pub fn parts_mut(&mut self) -> (&mut DockController, &mut ModeManager) {
        (&mut self.controller, &mut self.modes)
    }

    // ---- roots ----

    pub fn add_root(&mut self, name: impl Into<String>, station: NodeId) -> DockResult<()> {
        let name = name.into();
        if self.roots.contains_key(&name) {
            return Err(DockError::DuplicateId {
                namespace: "root",
                id: name,
            });
        }
        self.controller.add_root(station)?;
        debug!(root = %name, ?station, "root added");
        if self.default_root.is_none() {
            self.default_root = Some(name.clone());
        }
        self.roots.insert(name, station);
        Ok(())
    }

    pub fn remove_root(&mut self, name: &str) -> DockResult<NodeId> {
        let station = self.root(name)?;
        self.controller.remove_root(station)?;
        self.roots.remove(name);
        if self.default_root.as_deref() == Some(name) {
            self.default_root = self.roots.keys().next().cloned();
        }
        Ok(station)
    }

    pub fn root(&self, name: &str) -> DockResult<NodeId> {
        self.roots.get(name).copied().ok_or_else(|| DockError::UnknownId {
            namespace: "root",
            id: name.to_string(),
        })
    }

    pub fn root_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    /// Root used by [`DockFrontend::show`] when no location is known.
    pub fn set_default_root(&mut self, name: &str) -> DockResult<()> {
        self.root(name)?;
        self.default_root = Some(name.to_string());
        Ok(())
    }

    /// Registers a mode area on the station of root `root`.
    pub fn add_area(&mut self, name: impl Into<String>, mode: ExtendedMode, station: NodeId) -> DockResult<()> {
        self.modes
            .add_area(self.controller.tree(), ModeArea::new(name, mode, station))
    }

    // ---- dockables ----

    /// Registers `node` under `id`. A hidden entry left by a layout for this
    /// id puts the dockable where the layout had it.
    pub fn add_dockable(&mut self, id: impl Into<String>, node: NodeId) -> DockResult<()> {
        let id = id.into();
        if self.dockables.contains_key(&id) {
            return Err(DockError::DuplicateId {
                namespace: "dockable",
                id,
            });
        }
        self.controller
            .tree()
            .dockable(node)
            .ok_or(DockError::NotADockable(node))?;
        self.dockables.insert(id.clone(), DockableEntry::new(node));
        self.modes.claim(&id, node);

        let unparented = self.controller.tree().parent(node).is_none();
        if let Some(info) = self.hidden.get_mut(&id)
            && info.missing
        {
            info.missing = false;
            if unparented && let Some(location) = info.location.clone() {
                self.place(node, &location)?;
                self.hidden.remove(&id);
                debug!(%id, %location, "missing dockable placed at its layout location");
            }
        }
        Ok(())
    }

    /// Forgets `id`; a shown dockable is taken out of its station first.
    pub fn remove_dockable(&mut self, id: &str) -> DockResult<NodeId> {
        let node = self.node(id)?;
        if self.controller.tree().parent(node).is_some() {
            self.controller.drag(node)?;
        }
        self.dockables.remove(id);
        self.hidden.remove(id);
        self.modes.forget(node);
        Ok(node)
    }

    pub fn node(&self, id: &str) -> DockResult<NodeId> {
        self.dockables
            .get(id)
            .map(|entry| entry.node)
            .ok_or_else(|| DockError::UnknownId {
                namespace: "dockable",
                id: id.to_string(),
            })
    }

    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.dockables
            .iter()
            .find(|(_, entry)| entry.node == node)
            .map(|(id, _)| id.as_str())
    }

    pub fn dockable_ids(&self) -> impl Iterator<Item = &str> {
        self.dockables.keys().map(String::as_str)
    }

    pub fn set_hideable(&mut self, id: &str, hideable: bool) -> DockResult<()> {
        self.entry_mut(id)?.hideable = hideable;
        Ok(())
    }

    pub fn is_hideable(&self, id: &str) -> bool {
        self.dockables.get(id).is_some_and(|entry| entry.hideable)
    }

    /// Keep the dockable's own layout while it is hidden.
    pub fn set_entry_layout(&mut self, id: &str, enabled: bool) -> DockResult<()> {
        self.entry_mut(id)?.entry_layout = enabled;
        Ok(())
    }

    fn entry_mut(&mut self, id: &str) -> DockResult<&mut DockableEntry> {
        self.dockables.get_mut(id).ok_or_else(|| DockError::UnknownId {
            namespace: "dockable",
            id: id.to_string(),
        })
    }

    pub fn is_shown(&self, id: &str) -> bool {
        self.dockables
            .get(id)
            .is_some_and(|entry| self.controller.register().is_registered(entry.node))
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.contains_key(id) && !self.is_shown(id)
    }

    /// Ids known only from a loaded layout.
    pub fn missing_ids(&self) -> impl Iterator<Item = &str> {
        self.hidden
            .iter()
            .filter(|(_, info)| info.missing)
            .map(|(id, _)| id.as_str())
    }

    pub fn pending(&self) -> &[PendingSubtree] {
        &self.pending
    }

    // ---- hide & show ----

    /// Removes the dockable from view and remembers where it was. Returns
    /// `false` when it was not shown or may not be hidden.
    pub fn hide(&mut self, id: &str) -> DockResult<bool> {
        let entry = self
            .dockables
            .get(id)
            .cloned()
            .ok_or_else(|| DockError::UnknownId {
                namespace: "dockable",
                id: id.to_string(),
            })?;
        let node = entry.node;
        if !entry.hideable || self.controller.tree().parent(node).is_none() {
            return Ok(false);
        }
        self.modes.ensure_basic_mode(&mut self.controller, node)?;
        let location = self.location_of(node);
        let layout = if entry.entry_layout {
            Some(self.convert(node, true)?)
        } else {
            None
        };
        self.controller.drag(node)?;
        debug!(%id, location = ?location.as_ref().map(ToString::to_string), "dockable hidden");
        self.hidden.insert(
            id.to_string(),
            HiddenInfo {
                location,
                layout,
                missing: false,
            },
        );
        Ok(true)
    }

    /// Puts a hidden dockable back at its last location, or into the default
    /// root when that location no longer exists.
    pub fn show(&mut self, id: &str) -> DockResult<bool> {
        let node = self.node(id)?;
        if self.controller.tree().parent(node).is_some() {
            return Ok(false);
        }
        let location = self
            .hidden
            .get(id)
            .and_then(|info| info.location.clone())
            .filter(|location| self.roots.contains_key(&location.root));
        match location {
            Some(location) => self.place(node, &location)?,
            None => {
                let root = self
                    .default_root
                    .as_deref()
                    .and_then(|name| self.roots.get(name))
                    .copied()
                    .ok_or_else(|| DockError::UnknownId {
                        namespace: "root",
                        id: "default".into(),
                    })?;
                self.controller.drop(root, node)?;
            }
        }
        self.hidden.remove(id);
        debug!(%id, "dockable shown");
        Ok(true)
    }

    fn place(&mut self, node: NodeId, location: &DockLocation) -> DockResult<()> {
        let root = self.root(&location.root)?;
        place_in(&mut self.controller, root, node, location.path.clone())
    }

    fn location_of(&self, node: NodeId) -> Option<DockLocation> {
        let (root, path) = self.controller.tree().path_of(node)?;
        let (name, _) = self.roots.iter().find(|(_, station)| **station == root)?;
        Some(DockLocation::new(name.clone(), path))
    }

    pub fn set_mode(&mut self, id: &str, mode: ExtendedMode, area: Option<&str>) -> DockResult<bool> {
        let node = self.node(id)?;
        self.modes.set_mode(&mut self.controller, node, mode, area)
    }

    // ---- factories & missing dockables ----

    pub fn missing_strategy(&self) -> MissingStrategy {
        self.missing_strategy
    }

    pub fn set_missing_strategy(&mut self, strategy: MissingStrategy) {
        self.missing_strategy = strategy;
    }

    /// Creates dockables for ids a layout mentions but nobody registered.
    pub fn add_backup_factory(&mut self, id: impl Into<String>, factory: impl BackupFactory + 'static) {
        self.backups.insert(id, factory);
    }

    /// Like [`DockFrontend::add_backup_factory`] for every id with `prefix`.
    pub fn add_backup_filter(&mut self, prefix: impl Into<String>, factory: impl BackupFactory + 'static) {
        self.backups.insert_prefix(prefix, factory);
    }

    /// Registers `factory` and materialises layout parts that were waiting
    /// for it. Returns the number of parts resolved.
    pub fn register_factory(&mut self, factory: impl DockFactory + 'static) -> DockResult<usize> {
        self.situation.add_factory(factory);
        self.fill_missing()
    }

    pub fn add_multiple_factory(&mut self, factory: impl MultipleDockableFactory + 'static) -> DockResult<usize> {
        self.situation.add_multiple(factory);
        self.fill_missing()
    }

    /// Re-reads raw payloads in stored settings and builds pending subtrees
    /// whose factories are now known.
    pub fn fill_missing(&mut self) -> DockResult<usize> {
        let mut resolved: usize = self
            .settings
            .values_mut()
            .map(|setting| setting.fill_missing(&self.situation))
            .sum();
        if self.pending.is_empty() {
            return Ok(resolved);
        }

        let pending = std::mem::take(&mut self.pending);
        let mut resolver = FrontendResolver::new(&mut self.dockables, &self.backups, self.missing_strategy);
        let situation = &self.situation;
        let roots = &self.roots;
        resolved += self.controller.batch(|ctrl| {
            let mut placed = 0;
            for mut item in pending {
                situation.fill_missing(&mut item.composition);
                let mut ctx = BuildContext::new(ctrl, &mut resolver, situation.multiples());
                ctx.location = item.location.clone();
                let Some(node) = situation.build(&mut ctx, &item.composition)? else {
                    continue;
                };
                let target = item
                    .location
                    .as_ref()
                    .and_then(|location| Some((*roots.get(&location.root)?, location.path.clone())));
                match target {
                    Some((root, path)) => place_in(ctrl, root, node, path)?,
                    None => {
                        warn!(factory = item.composition.factory(), "resolved layout part has no root");
                        if !resolver.is_single(node) {
                            ctrl.dispose(node)?;
                        }
                        continue;
                    }
                }
                placed += 1;
            }
            Ok(placed)
        })?;
        let FrontendResolver {
            missing_singles,
            missing_subtrees,
            ..
        } = resolver;
        self.remember_missing(missing_singles);
        self.pending.extend(missing_subtrees);
        if resolved > 0 {
            debug!(resolved, pending = self.pending.len(), "missing layout parts filled");
        }
        Ok(resolved)
    }

    fn remember_missing(&mut self, singles: Vec<(String, Option<DockLocation>)>) {
        for (id, location) in singles {
            self.hidden.insert(
                id,
                HiddenInfo {
                    location,
                    layout: None,
                    missing: true,
                },
            );
        }
    }

    // ---- settings ----

    fn convert(&self, node: NodeId, entry: bool) -> DockResult<DockLayoutComposition> {
        let single_id = |n: NodeId| self.id_of(n).map(str::to_string);
        let ctx = ConvertContext {
            ctrl: &self.controller,
            single_id: &single_id,
        };
        self.situation.convert(&ctx, node, entry)
    }

    /// Snapshot of every root, every hidden dockable and the mode histories.
    /// `entry` settings leave out adjacent data.
    pub fn get_setting(&self, entry: bool) -> DockResult<Setting> {
        let mut roots = BTreeMap::new();
        for (name, root) in &self.roots {
            roots.insert(name.clone(), self.convert(*root, entry)?);
        }
        let invisible = self
            .hidden
            .iter()
            .filter(|(id, _)| !self.is_shown(id))
            .map(|(id, info)| InvisibleEntry {
                key: id.clone(),
                root: info.location.as_ref().map(|location| location.root.clone()),
                layout: info.layout.clone(),
                location: info.location.as_ref().map(|location| location.path.clone()),
            })
            .collect();
        let modes = self
            .modes
            .settings(self.controller.tree(), |n| self.id_of(n).map(str::to_string));
        Ok(Setting {
            roots,
            invisible,
            modes: Some(modes),
        })
    }

    /// Replaces the content of every known root with `setting`. Roots whose
    /// layout cannot be applied fail the call before the live tree changes.
    pub fn set_setting(&mut self, setting: &Setting, entry: bool) -> DockResult<()> {
        for (name, composition) in &setting.roots {
            if let Some(root) = self.roots.get(name) {
                self.situation
                    .check_root(self.controller.tree(), *root, composition)?;
            }
        }
        if self.revert_to_basic_modes {
            self.modes.ensure_basic_modes(&mut self.controller)?;
        }
        self.pending.clear();

        let mut resolver = FrontendResolver::new(&mut self.dockables, &self.backups, self.missing_strategy);
        let situation = &self.situation;
        let roots = &self.roots;
        let adjacent = self.controller.batch(|ctrl| {
            clear_roots(ctrl, roots.values().copied(), &resolver)?;
            let mut ctx = BuildContext::new(ctrl, &mut resolver, situation.multiples());
            for (name, composition) in &setting.roots {
                match roots.get(name) {
                    Some(root) => situation.apply_root(&mut ctx, *root, name, composition)?,
                    None => warn!(root = %name, "layout for unknown root skipped"),
                }
            }
            Ok(ctx.take_adjacent())
        })?;
        let FrontendResolver {
            missing_singles,
            missing_subtrees,
            ..
        } = resolver;

        self.hidden.clear();
        for item in &setting.invisible {
            let known = self.dockables.contains_key(&item.key);
            if known && self.is_shown(&item.key) {
                continue;
            }
            if !known && !self.missing_strategy.keeps_single() {
                debug!(id = %item.key, "hidden entry without dockable purged");
                continue;
            }
            let location = item.root.as_ref().map(|root| {
                DockLocation::new(root.clone(), item.location.clone().unwrap_or_default())
            });
            self.hidden.insert(
                item.key.clone(),
                HiddenInfo {
                    location,
                    layout: item.layout.clone(),
                    missing: !known,
                },
            );
        }
        self.remember_missing(missing_singles);
        self.pending = missing_subtrees;

        if let Some(modes) = &setting.modes {
            let dockables = &self.dockables;
            self.modes
                .apply_settings(modes, |key| dockables.get(key).map(|entry| entry.node));
        }
        self.modes.refresh(&mut self.controller);
        if !entry {
            self.situation.apply_adjacent(&mut self.controller, &adjacent);
        }
        debug!(
            roots = setting.roots.len(),
            hidden = self.hidden.len(),
            pending = self.pending.len(),
            "layout applied"
        );
        Ok(())
    }

    // ---- named settings ----

    /// Stores the current layout under `name` and makes it current.
    pub fn save(&mut self, name: impl Into<String>) -> DockResult<()> {
        let name = name.into();
        let setting = self.get_setting(true)?;
        self.settings.insert(name.clone(), setting);
        debug!(setting = %name, "layout saved");
        self.current = Some(name);
        Ok(())
    }

    pub fn load(&mut self, name: &str) -> DockResult<()> {
        let setting = self.settings.get(name).cloned().ok_or_else(|| DockError::UnknownId {
            namespace: "setting",
            id: name.to_string(),
        })?;
        self.set_setting(&setting, true)?;
        self.current = Some(name.to_string());
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> bool {
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        self.settings.remove(name).is_some()
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.get(name)
    }

    pub fn setting_names(&self) -> impl Iterator<Item = &str> {
        self.settings.keys().map(String::as_str)
    }

    pub fn current_setting(&self) -> Option<&str> {
        self.current.as_deref()
    }

    // ---- files ----

    /// Every named setting plus the live layout.
    pub fn to_file(&self) -> DockResult<LayoutFile> {
        Ok(LayoutFile {
            current: self.current.clone(),
            settings: self.settings.clone(),
            live: self.get_setting(false)?,
        })
    }

    /// Replaces the named settings and applies the live layout of `file`.
    pub fn apply_file(&mut self, file: LayoutFile) -> DockResult<()> {
        let LayoutFile {
            current,
            settings,
            live,
        } = file;
        self.set_setting(&live, false)?;
        self.settings = settings;
        self.current = current;
        Ok(())
    }

    pub fn write(&self, out: &mut DataWriter) -> DockResult<()> {
        self.to_file()?.write(&self.situation, out)
    }

    /// Reads a whole file before touching the live tree.
    pub fn read(&mut self, input: &mut DataReader<'_>) -> DockResult<()> {
        let file = LayoutFile::read(&self.situation, input)?;
        self.apply_file(file)
    }

    pub fn to_xml(&self) -> DockResult<XmlNode> {
        self.to_file()?.to_xml(&self.situation)
    }

    pub fn read_xml(&mut self, node: &XmlNode) -> DockResult<()> {
        let file = LayoutFile::from_xml(&self.situation, node)?;
        self.apply_file(file)
    }

    pub fn to_bytes(&self) -> DockResult<Vec<u8>> {
        let mut out = DataWriter::new();
        self.write(&mut out)?;
        Ok(out.into_inner())
    }

    pub fn read_bytes(&mut self, bytes: &[u8]) -> DockResult<()> {
        self.read(&mut DataReader::new(bytes))
    }

    pub fn to_xml_string(&self) -> DockResult<String> {
        self.to_xml()?.to_document()
    }

    pub fn read_xml_str(&mut self, text: &str) -> DockResult<()> {
        self.read_xml(&XmlNode::parse(text)?)
    }

    pub fn save_file(&self, path: impl AsRef<Path>, format: LayoutFormat) -> DockResult<()> {
        let bytes = match format {
            LayoutFormat::Binary => self.to_bytes()?,
            LayoutFormat::Xml => self.to_xml_string()?.into_bytes(),
        };
        fs::write(path.as_ref(), bytes)?;
        debug!(path = %path.as_ref().display(), ?format, "layout file written");
        Ok(())
    }

    /// Reads a file written by [`DockFrontend::save_file`] in either format.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> DockResult<LayoutFormat> {
        let bytes = fs::read(path.as_ref())?;
        let format = LayoutFormat::detect(&bytes);
        let file = LayoutFile::parse(&self.situation, &bytes)?;
        self.apply_file(file)?;
        debug!(path = %path.as_ref().display(), ?format, "layout file read");
        Ok(format)
    }
}

/// Drops `node` at `path` below `root`, appending when the path no longer
/// fits.
fn place_in(ctrl: &mut DockController, root: NodeId, node: NodeId, path: DockablePath) -> DockResult<()> {
    match ctrl.drop_at(root, node, Placement::Path(path)) {
        Err(DockError::Rejected { .. }) => {
            debug!(?node, "stored path rejected, appending instead");
            ctrl.drop(root, node)
        }
        other => other,
    }
}

/// Empties every root. Singles survive unparented, everything else is
/// disposed.
fn clear_roots(
    ctrl: &mut DockController,
    roots: impl Iterator<Item = NodeId>,
    resolver: &FrontendResolver<'_>,
) -> DockResult<()> {
    for root in roots {
        for child in ctrl.tree().children(root).to_vec() {
            ctrl.drag(child)?;
            let singles: Vec<NodeId> = ctrl
                .tree()
                .descendants(child)
                .into_iter()
                .filter(|n| *n != child && resolver.is_single(*n))
                .collect();
            for node in singles {
                ctrl.drag(node)?;
            }
            if !resolver.is_single(child) {
                ctrl.dispose(child)?;
            }
        }
    }
    Ok(())
}

//! Factory registry plus the conversions between live trees, compositions
//! and their binary and XML forms.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::composition::{AdjacentLayout, DockLayoutComposition, LayoutInfo};
use super::data::{LayoutData, check_depth, map_from_xml, map_to_xml, read_map, write_map};
use super::factory::{
    AdjacentFactory, BuildContext, ConvertContext, DockFactory, MultipleDockableFactory,
    MultipleRegistry, PropertiesFactory, SingleFactory, StationFactory,
};
use super::io::{DataReader, DataWriter};
use super::xml::XmlNode;
use crate::controller::DockController;
use crate::error::{DockError, DockResult};
use crate::model::{DockLocation, DockTree, NodeId};

const PAYLOAD_BYTES: u8 = 0;
const PAYLOAD_XML: u8 = 1;

#[derive(Debug)]
pub struct DockSituation {
    factories: BTreeMap<String, Box<dyn DockFactory>>,
    multiples: MultipleRegistry,
    adjacent: Vec<Box<dyn AdjacentFactory>>,
}

impl Default for DockSituation {
    fn default() -> Self {
        Self::new()
    }
}

impl DockSituation {
    /// Registry with every built-in factory.
    pub fn new() -> Self {
        let mut situation = Self {
            factories: BTreeMap::new(),
            multiples: MultipleRegistry::with_defaults(),
            adjacent: Vec::new(),
        };
        for factory in StationFactory::ALL {
            situation.add_factory(factory);
        }
        situation.add_factory(SingleFactory);
        situation.add_factory(PropertiesFactory);
        situation
    }

    /// Registers `factory`, replacing any factory with the same id.
    pub fn add_factory(&mut self, factory: impl DockFactory + 'static) {
        let id = factory.id().to_string();
        if self.factories.insert(id.clone(), Box::new(factory)).is_some() {
            debug!(%id, "factory replaced");
        }
    }

    pub fn factory(&self, id: &str) -> Option<&dyn DockFactory> {
        self.factories.get(id).map(|f| f.as_ref())
    }

    pub fn factory_ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn add_multiple(&mut self, factory: impl MultipleDockableFactory + 'static) {
        self.multiples.insert(factory);
    }

    pub fn multiples(&self) -> &MultipleRegistry {
        &self.multiples
    }

    pub fn add_adjacent(&mut self, factory: impl AdjacentFactory + 'static) {
        self.adjacent.push(Box::new(factory));
    }

    /// Fixed-id dockables use `single`, stations their kind, anything else
    /// `properties`.
    pub fn factory_for(&self, ctx: &ConvertContext<'_>, node: NodeId) -> &str {
        let tree = ctx.ctrl.tree();
        if tree.dockable(node).is_some() && (ctx.single_id)(node).is_some() {
            return SingleFactory::ID;
        }
        match tree.station_kind(node) {
            Some(kind) => kind.id(),
            None => PropertiesFactory::ID,
        }
    }

    /// Describes the live subtree below `node`. Entry layouts leave out
    /// adjacent data.
    pub fn convert(&self, ctx: &ConvertContext<'_>, node: NodeId, entry: bool) -> DockResult<DockLayoutComposition> {
        let id = self.factory_for(ctx, node);
        let factory = self.factory(id).ok_or_else(|| DockError::UnknownId {
            namespace: "factory",
            id: id.to_string(),
        })?;
        let data = factory
            .layout(ctx, node)
            .ok_or_else(|| DockError::format(format!("factory '{id}' cannot describe {node:?}")))?;
        let children = ctx
            .ctrl
            .tree()
            .children(node)
            .iter()
            .map(|child| self.convert(ctx, *child, entry))
            .collect::<DockResult<Vec<_>>>()?;
        let mut composition = DockLayoutComposition::new(
            LayoutInfo::Data {
                factory: id.to_string(),
                data,
            },
            children,
        );
        if !entry {
            composition.adjacent = self
                .adjacent
                .iter()
                .filter_map(|adjacent| {
                    adjacent.layout(ctx, node).map(|properties| AdjacentLayout {
                        factory: adjacent.id().to_string(),
                        properties,
                    })
                })
                .collect();
        }
        Ok(composition)
    }

    /// Builds a detached subtree. Parts that cannot be built are reported to
    /// the resolver and left out.
    pub fn build(&self, ctx: &mut BuildContext<'_>, composition: &DockLayoutComposition) -> DockResult<Option<NodeId>> {
        let LayoutInfo::Data { factory: id, data } = &composition.layout else {
            ctx.resolver.missing_subtree(composition, ctx.location.clone());
            return Ok(None);
        };
        let Some(factory) = self.factory(id) else {
            ctx.resolver.missing_subtree(composition, ctx.location.clone());
            return Ok(None);
        };
        let children = self.build_children(ctx, factory, data, composition)?;
        let node = factory.build(ctx, data, &children)?;
        match node {
            Some(node) => self.remember_adjacent(ctx, node, composition),
            None => match data {
                LayoutData::Single { id } => ctx.resolver.missing_single(id, ctx.location.clone()),
                _ => ctx.resolver.missing_subtree(composition, ctx.location.clone()),
            },
        }
        Ok(node)
    }

    /// Fails when `composition` could not be applied to the registered root
    /// `root`. Unresolved root layouts pass; `apply_root` skips them.
    pub fn check_root(&self, tree: &DockTree, root: NodeId, composition: &DockLayoutComposition) -> DockResult<()> {
        let LayoutInfo::Data { factory: id, data } = &composition.layout else {
            return Ok(());
        };
        let factory = self.factory(id).ok_or_else(|| DockError::UnknownId {
            namespace: "factory",
            id: id.clone(),
        })?;
        factory.check_root(tree, root, data)
    }

    /// Fills the registered root `root` from `composition`.
    pub fn apply_root(
        &self,
        ctx: &mut BuildContext<'_>,
        root: NodeId,
        root_name: &str,
        composition: &DockLayoutComposition,
    ) -> DockResult<()> {
        let LayoutInfo::Data { factory: id, data } = &composition.layout else {
            warn!(root = %root_name, factory = composition.factory(), "root layout unresolved, skipped");
            return Ok(());
        };
        let factory = self.factory(id).ok_or_else(|| DockError::UnknownId {
            namespace: "factory",
            id: id.clone(),
        })?;
        ctx.location = Some(DockLocation::new(root_name, Default::default()));
        let children = self.build_children(ctx, factory, data, composition)?;
        factory.apply(ctx, root, data, &children)?;
        ctx.location = None;
        self.remember_adjacent(ctx, root, composition);
        Ok(())
    }

    fn build_children(
        &self,
        ctx: &mut BuildContext<'_>,
        factory: &dyn DockFactory,
        data: &LayoutData,
        composition: &DockLayoutComposition,
    ) -> DockResult<Vec<Option<NodeId>>> {
        let parent_location = ctx.location.clone();
        let mut built = Vec::with_capacity(composition.children.len());
        for (index, child) in composition.children.iter().enumerate() {
            ctx.location = parent_location.as_ref().and_then(|location| {
                let property = factory.estimate_location(data, index)?;
                let mut path = location.path.clone();
                path.0.push(property);
                Some(DockLocation::new(location.root.clone(), path))
            });
            built.push(self.build(ctx, child)?);
        }
        ctx.location = parent_location;
        Ok(built)
    }

    fn remember_adjacent(&self, ctx: &mut BuildContext<'_>, node: NodeId, composition: &DockLayoutComposition) {
        ctx.adjacent
            .extend(composition.adjacent.iter().map(|adjacent| (node, adjacent.clone())));
    }

    /// Hands collected adjacent data to its factories.
    pub fn apply_adjacent(&self, ctrl: &mut DockController, adjacent: &[(NodeId, AdjacentLayout)]) {
        for (node, layout) in adjacent {
            match self.adjacent.iter().find(|f| f.id() == layout.factory) {
                Some(factory) if ctrl.tree().contains(*node) => factory.apply(ctrl, *node, &layout.properties),
                Some(_) => {}
                None => debug!(factory = %layout.factory, "adjacent factory not registered"),
            }
        }
    }

    /// Interprets raw payloads whose factory is now registered. Returns the
    /// number of nodes resolved.
    pub fn fill_missing(&self, composition: &mut DockLayoutComposition) -> usize {
        let mut resolved = 0;
        let converted = match &composition.layout {
            LayoutInfo::Data { .. } => None,
            LayoutInfo::Bytes { factory: id, bytes } => self.factory(id).map(|factory| {
                let mut input = DataReader::new(bytes);
                (id.clone(), factory.read(&mut input))
            }),
            LayoutInfo::Xml { factory: id, node } => self
                .factory(id)
                .map(|factory| (id.clone(), factory.read_xml(node))),
        };
        match converted {
            Some((factory, Ok(data))) => {
                composition.layout = LayoutInfo::Data { factory, data };
                resolved += 1;
            }
            Some((factory, Err(err))) => warn!(%factory, %err, "stored layout still unreadable"),
            None => {}
        }
        for child in &mut composition.children {
            resolved += self.fill_missing(child);
        }
        resolved
    }

    pub fn write(&self, composition: &DockLayoutComposition, out: &mut DataWriter) -> DockResult<()> {
        out.write_utf(composition.factory());
        match &composition.layout {
            LayoutInfo::Data { factory: id, data } => {
                let factory = self.factory(id).ok_or_else(|| DockError::UnknownId {
                    namespace: "factory",
                    id: id.clone(),
                })?;
                let mut payload = DataWriter::new();
                factory.write(data, &mut payload)?;
                out.write_u8(PAYLOAD_BYTES);
                out.write_bytes(&payload.into_inner());
            }
            LayoutInfo::Bytes { bytes, .. } => {
                out.write_u8(PAYLOAD_BYTES);
                out.write_bytes(bytes);
            }
            LayoutInfo::Xml { node, .. } => {
                out.write_u8(PAYLOAD_XML);
                out.write_utf(&node.to_document()?);
            }
        }
        out.write_len(composition.adjacent.len());
        for adjacent in &composition.adjacent {
            out.write_utf(&adjacent.factory);
            write_map(&adjacent.properties, out);
        }
        out.write_len(composition.children.len());
        for child in &composition.children {
            self.write(child, out)?;
        }
        Ok(())
    }

    /// Payloads of unknown factories stay raw; everything else must parse.
    pub fn read(&self, input: &mut DataReader<'_>) -> DockResult<DockLayoutComposition> {
        self.read_at(input, 0)
    }

    fn read_at(&self, input: &mut DataReader<'_>, depth: usize) -> DockResult<DockLayoutComposition> {
        check_depth(depth, "composition")?;
        let id = input.read_utf()?;
        let layout = match input.read_u8()? {
            PAYLOAD_BYTES => {
                let bytes = input.read_bytes()?;
                match self.factory(&id) {
                    Some(factory) => {
                        let mut payload = DataReader::new(&bytes);
                        let data = factory.read(&mut payload)?;
                        LayoutInfo::Data { factory: id, data }
                    }
                    None => LayoutInfo::Bytes { factory: id, bytes },
                }
            }
            PAYLOAD_XML => {
                let node = XmlNode::parse(&input.read_utf()?)?;
                match self.factory(&id) {
                    Some(factory) => LayoutInfo::Data {
                        data: factory.read_xml(&node)?,
                        factory: id,
                    },
                    None => LayoutInfo::Xml { factory: id, node },
                }
            }
            tag => return Err(DockError::format(format!("unknown payload tag {tag}"))),
        };
        let mut adjacent = Vec::new();
        for _ in 0..input.read_len()? {
            adjacent.push(AdjacentLayout {
                factory: input.read_utf()?,
                properties: read_map(input)?,
            });
        }
        let mut children = Vec::new();
        for _ in 0..input.read_len()? {
            children.push(self.read_at(input, depth + 1)?);
        }
        Ok(DockLayoutComposition {
            layout,
            adjacent,
            children,
        })
    }

    pub fn to_xml(&self, composition: &DockLayoutComposition) -> DockResult<XmlNode> {
        let mut node = XmlNode::new("composition").with_attr("factory", composition.factory());
        match &composition.layout {
            LayoutInfo::Data { factory: id, data } => {
                let factory = self.factory(id).ok_or_else(|| DockError::UnknownId {
                    namespace: "factory",
                    id: id.clone(),
                })?;
                node.push(factory.write_xml(data)?);
            }
            LayoutInfo::Xml { node: raw, .. } => node.push(raw.clone()),
            LayoutInfo::Bytes { bytes, .. } => {
                node.push(XmlNode::new("layout").with_attr("raw", to_hex(bytes)));
            }
        }
        if !composition.adjacent.is_empty() {
            let mut adjacent = XmlNode::new("adjacent");
            for layout in &composition.adjacent {
                let mut entry = XmlNode::new("entry").with_attr("factory", &layout.factory);
                map_to_xml(&mut entry, &layout.properties);
                adjacent.push(entry);
            }
            node.push(adjacent);
        }
        if !composition.children.is_empty() {
            let mut children = XmlNode::new("children");
            for child in &composition.children {
                children.push(self.to_xml(child)?);
            }
            node.push(children);
        }
        Ok(node)
    }

    pub fn from_xml(&self, node: &XmlNode) -> DockResult<DockLayoutComposition> {
        self.from_xml_at(node, 0)
    }

    fn from_xml_at(&self, node: &XmlNode, depth: usize) -> DockResult<DockLayoutComposition> {
        check_depth(depth, "composition")?;
        node.expect_name("composition")?;
        let id = node.required("factory")?.to_string();
        let raw = node.required_child("layout")?;
        let layout = match (self.factory(&id), raw.attr("raw")) {
            (Some(factory), Some(hex)) => {
                let bytes = from_hex(hex)?;
                LayoutInfo::Data {
                    data: factory.read(&mut DataReader::new(&bytes))?,
                    factory: id,
                }
            }
            (Some(factory), None) => LayoutInfo::Data {
                data: factory.read_xml(raw)?,
                factory: id,
            },
            (None, Some(hex)) => LayoutInfo::Bytes {
                factory: id,
                bytes: from_hex(hex)?,
            },
            (None, None) => LayoutInfo::Xml {
                factory: id,
                node: raw.clone(),
            },
        };
        let adjacent = match node.child("adjacent") {
            Some(adjacent) => adjacent
                .children_named("entry")
                .map(|entry| {
                    Ok(AdjacentLayout {
                        factory: entry.required("factory")?.to_string(),
                        properties: map_from_xml(entry)?,
                    })
                })
                .collect::<DockResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        let children = match node.child("children") {
            Some(children) => children
                .children_named("composition")
                .map(|child| self.from_xml_at(child, depth + 1))
                .collect::<DockResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        Ok(DockLayoutComposition {
            layout,
            adjacent,
            children,
        })
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(text: &str) -> DockResult<Vec<u8>> {
    if text.len() % 2 != 0 {
        return Err(DockError::format("raw payload has an odd number of hex digits"));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| DockError::format(format!("invalid hex in raw payload at {i}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_LAYOUT_DEPTH;
    use crate::layout::factory::SingleResolver;
    use crate::model::{Dockable, Station};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        singles: BTreeMap<String, NodeId>,
        missing: Vec<(String, Option<DockLocation>)>,
        subtrees: Vec<String>,
    }

    impl SingleResolver for Recorder {
        fn resolve(&mut self, ctrl: &mut DockController, id: &str) -> Option<NodeId> {
            self.singles
                .get(id)
                .copied()
                .filter(|node| ctrl.tree().parent(*node).is_none())
        }

        fn is_single(&self, node: NodeId) -> bool {
            self.singles.values().any(|n| *n == node)
        }

        fn missing_single(&mut self, id: &str, location: Option<DockLocation>) {
            self.missing.push((id.to_string(), location));
        }

        fn missing_subtree(&mut self, composition: &DockLayoutComposition, _location: Option<DockLocation>) {
            self.subtrees.push(composition.factory().to_string());
        }
    }

    #[derive(Debug)]
    struct ChartFactory;

    impl DockFactory for ChartFactory {
        fn id(&self) -> &str {
            "chart"
        }

        fn layout(&self, _ctx: &ConvertContext<'_>, _node: NodeId) -> Option<LayoutData> {
            None
        }

        fn build(
            &self,
            ctx: &mut BuildContext<'_>,
            data: &LayoutData,
            _children: &[Option<NodeId>],
        ) -> DockResult<Option<NodeId>> {
            Ok(Some(ctx.ctrl.add_dockable(Dockable::text(data.title().unwrap_or("chart")))))
        }

        fn write(&self, data: &LayoutData, out: &mut DataWriter) -> DockResult<()> {
            out.write_utf(data.title().unwrap_or_default());
            Ok(())
        }

        fn read(&self, input: &mut DataReader<'_>) -> DockResult<LayoutData> {
            Ok(LayoutData::Properties {
                content: "chart".into(),
                title: input.read_utf()?,
                properties: BTreeMap::new(),
            })
        }

        fn write_xml(&self, data: &LayoutData) -> DockResult<XmlNode> {
            Ok(XmlNode::new("layout").with_attr("title", data.title().unwrap_or_default()))
        }

        fn read_xml(&self, node: &XmlNode) -> DockResult<LayoutData> {
            Ok(LayoutData::Properties {
                content: "chart".into(),
                title: node.required("title")?.to_string(),
                properties: BTreeMap::new(),
            })
        }
    }

    fn live_tree() -> (DockController, NodeId, NodeId, NodeId) {
        let mut ctrl = DockController::new();
        let root = ctrl.add_station(Station::split("main"));
        ctrl.add_root(root).unwrap();
        let editor = ctrl.add_dockable(Dockable::text("editor"));
        let notes = ctrl.add_dockable(Dockable::text("notes"));
        ctrl.drop(root, editor).unwrap();
        ctrl.drop(root, notes).unwrap();
        (ctrl, root, editor, notes)
    }

    #[test]
    fn convert_then_build_reproduces_structure() {
        let (ctrl, root, editor, _notes) = live_tree();
        let situation = DockSituation::new();
        let single_id = move |node: NodeId| (node == editor).then(|| "editor".to_string());
        let composition = {
            let ctx = ConvertContext {
                ctrl: &ctrl,
                single_id: &single_id,
            };
            situation.convert(&ctx, root, true).unwrap()
        };
        assert_eq!(
            composition.factory_outline(),
            vec![(0, "split"), (1, "single"), (1, "properties")]
        );

        let mut other = DockController::new();
        let target = other.add_station(Station::split("main"));
        other.add_root(target).unwrap();
        let editor2 = other.add_dockable(Dockable::text("editor"));
        let mut recorder = Recorder::default();
        recorder.singles.insert("editor".into(), editor2);
        let multiples = MultipleRegistry::with_defaults();
        let mut ctx = BuildContext::new(&mut other, &mut recorder, &multiples);
        situation.apply_root(&mut ctx, target, "main", &composition).unwrap();
        drop(ctx);
        assert_eq!(other.tree().children(target).len(), 2);
        assert_eq!(other.tree().children(target)[0], editor2);
        assert_eq!(other.tree().title(other.tree().children(target)[1]), Some("notes"));
        assert!(other.register().is_registered(editor2));
    }

    #[test]
    fn missing_pieces_are_reported_with_locations() {
        let situation = DockSituation::new();
        let composition = DockLayoutComposition::new(
            LayoutInfo::Data {
                factory: "stack".into(),
                data: LayoutData::Stack {
                    title: "tabs".into(),
                    selected: None,
                    placeholders: BTreeMap::new(),
                },
            },
            vec![
                DockLayoutComposition::leaf("single", LayoutData::Single { id: "gone".into() }),
                DockLayoutComposition::new(
                    LayoutInfo::Bytes {
                        factory: "chart".into(),
                        bytes: vec![0, 0, 0, 0],
                    },
                    Vec::new(),
                ),
            ],
        );
        let mut ctrl = DockController::new();
        let mut recorder = Recorder::default();
        let multiples = MultipleRegistry::with_defaults();
        let mut ctx = BuildContext::new(&mut ctrl, &mut recorder, &multiples);
        ctx.location = Some(DockLocation::new("main", Default::default()));
        let built = situation.build(&mut ctx, &composition).unwrap();
        drop(ctx);
        let stack = built.unwrap();
        assert!(ctrl.tree().children(stack).is_empty());
        assert_eq!(recorder.missing.len(), 1);
        let (id, location) = &recorder.missing[0];
        assert_eq!(id, "gone");
        assert_eq!(location.as_ref().unwrap().to_string(), "main:stack[0]");
        assert_eq!(recorder.subtrees, vec!["chart".to_string()]);
    }

    #[test]
    fn raw_payloads_survive_and_resolve_later() {
        let mut situation = DockSituation::new();
        let mut out = DataWriter::new();
        out.write_utf("cpu");
        let raw = DockLayoutComposition::new(
            LayoutInfo::Bytes {
                factory: "chart".into(),
                bytes: out.into_inner(),
            },
            Vec::new(),
        );

        let mut stream = DataWriter::new();
        situation.write(&raw, &mut stream).unwrap();
        let bytes = stream.into_inner();
        let read = situation.read(&mut DataReader::new(&bytes)).unwrap();
        assert_eq!(read, raw);

        let xml = situation.to_xml(&raw).unwrap();
        let mut from_xml = situation.from_xml(&xml).unwrap();
        assert_eq!(from_xml, raw);

        situation.add_factory(ChartFactory);
        assert_eq!(situation.fill_missing(&mut from_xml), 1);
        assert_eq!(from_xml.layout.data().and_then(LayoutData::title), Some("cpu"));
        assert_eq!(situation.fill_missing(&mut from_xml), 0);
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(from_hex(&to_hex(&[0, 15, 255])).unwrap(), vec![0, 15, 255]);
        assert!(from_hex("abc").is_err());
        assert!(from_hex("zz").is_err());
    }

    #[derive(Debug, Default)]
    struct TitleAdjacent {
        applied: Rc<RefCell<Vec<(NodeId, String)>>>,
    }

    impl AdjacentFactory for TitleAdjacent {
        fn id(&self) -> &str {
            "title"
        }

        fn layout(&self, ctx: &ConvertContext<'_>, node: NodeId) -> Option<BTreeMap<String, String>> {
            let title = ctx.ctrl.tree().dockable(node)?.title().to_string();
            Some(BTreeMap::from([("title".to_string(), title)]))
        }

        fn apply(&self, _ctrl: &mut DockController, node: NodeId, properties: &BTreeMap<String, String>) {
            let title = properties.get("title").cloned().unwrap_or_default();
            self.applied.borrow_mut().push((node, title));
        }
    }

    #[test]
    fn adjacent_data_is_kept_outside_entry_layouts() {
        let (ctrl, root, _, _) = live_tree();
        let applied = Rc::new(RefCell::new(Vec::new()));
        let mut situation = DockSituation::new();
        situation.add_adjacent(TitleAdjacent {
            applied: Rc::clone(&applied),
        });
        let single_id = |_: NodeId| -> Option<String> { None };
        let ctx = ConvertContext {
            ctrl: &ctrl,
            single_id: &single_id,
        };

        let entry = situation.convert(&ctx, root, true).unwrap();
        assert!(entry.children.iter().all(|child| child.adjacent.is_empty()));

        let full = situation.convert(&ctx, root, false).unwrap();
        assert!(full.adjacent.is_empty());
        assert_eq!(
            full.children[1].adjacent,
            vec![AdjacentLayout {
                factory: "title".into(),
                properties: BTreeMap::from([("title".to_string(), "notes".to_string())]),
            }]
        );

        let mut other = DockController::new();
        let target = other.add_station(Station::split("main"));
        other.add_root(target).unwrap();
        let mut recorder = Recorder::default();
        let multiples = MultipleRegistry::with_defaults();
        let mut build = BuildContext::new(&mut other, &mut recorder, &multiples);
        situation.apply_root(&mut build, target, "main", &full).unwrap();
        let adjacent = build.take_adjacent();
        drop(build);
        situation.apply_adjacent(&mut other, &adjacent);

        let children = other.tree().children(target).to_vec();
        assert_eq!(
            *applied.borrow(),
            vec![(children[0], "editor".to_string()), (children[1], "notes".to_string())]
        );
    }

    #[test]
    fn deeply_nested_compositions_are_rejected() {
        let situation = DockSituation::new();
        let mut out = DataWriter::new();
        for _ in 0..10_000 {
            out.write_utf("raw");
            out.write_u8(PAYLOAD_BYTES);
            out.write_bytes(&[]);
            out.write_len(0);
            out.write_len(1);
        }
        let bytes = out.into_inner();
        assert!(matches!(
            situation.read(&mut DataReader::new(&bytes)),
            Err(DockError::Format(_))
        ));

        let mut deep = DockLayoutComposition::new(
            LayoutInfo::Bytes {
                factory: "raw".into(),
                bytes: Vec::new(),
            },
            Vec::new(),
        );
        for _ in 0..MAX_LAYOUT_DEPTH + 1 {
            deep = DockLayoutComposition::new(
                LayoutInfo::Bytes {
                    factory: "raw".into(),
                    bytes: Vec::new(),
                },
                vec![deep],
            );
        }
        let xml = situation.to_xml(&deep).unwrap();
        assert!(matches!(situation.from_xml(&xml), Err(DockError::Format(_))));

        let shallow = deep.children[0].children[0].clone();
        let xml = situation.to_xml(&shallow).unwrap();
        assert_eq!(situation.from_xml(&xml).unwrap(), shallow);
    }
}

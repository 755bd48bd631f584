//! Factories that turn live nodes into layout data and back.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use super::composition::{AdjacentLayout, DockLayoutComposition};
use super::data::{
    LayoutData, flap_side, map_from_xml, map_to_xml, read_map, read_opt_index, read_shape, shape_from_xml,
    shape_to_xml, write_map, write_opt_index, write_shape,
};
use super::io::{DataReader, DataWriter};
use super::xml::XmlNode;
use crate::controller::DockController;
use crate::error::{DockError, DockResult};
use crate::geometry::FloatRect;
use crate::model::{
    DockLocation, DockTree, Dockable, HasChildren, NodeId, PathProperty, Placement, Station, StationKind,
    TextContent,
};

/// Read-only view handed to factories while converting live nodes.
pub struct ConvertContext<'a> {
    pub ctrl: &'a DockController,
    /// Fixed id of a dockable registered with the frontend.
    pub single_id: &'a dyn Fn(NodeId) -> Option<String>,
}

/// Supplies dockables registered under fixed ids and collects what could not
/// be built.
pub trait SingleResolver {
    /// An unparented dockable for `id`, if one exists or can be created.
    fn resolve(&mut self, ctrl: &mut DockController, id: &str) -> Option<NodeId>;

    fn is_single(&self, node: NodeId) -> bool;

    fn missing_single(&mut self, id: &str, location: Option<DockLocation>);

    fn missing_subtree(&mut self, composition: &DockLayoutComposition, location: Option<DockLocation>);
}

/// Mutable state threaded through one build pass.
pub struct BuildContext<'a> {
    pub ctrl: &'a mut DockController,
    pub resolver: &'a mut dyn SingleResolver,
    pub multiples: &'a MultipleRegistry,
    /// Where the node being built is expected to end up.
    pub location: Option<DockLocation>,
    pub(crate) adjacent: Vec<(NodeId, AdjacentLayout)>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        ctrl: &'a mut DockController,
        resolver: &'a mut dyn SingleResolver,
        multiples: &'a MultipleRegistry,
    ) -> Self {
        Self {
            ctrl,
            resolver,
            multiples,
            location: None,
            adjacent: Vec::new(),
        }
    }

    /// Adjacent data of the nodes built so far; applied once the tree is
    /// registered.
    pub fn take_adjacent(&mut self) -> Vec<(NodeId, AdjacentLayout)> {
        std::mem::take(&mut self.adjacent)
    }
}

/// Converts one kind of node. Ids are written into layout files and must stay
/// stable.
pub trait DockFactory: fmt::Debug {
    fn id(&self) -> &str;

    /// `None` when this factory does not describe `node`.
    fn layout(&self, ctx: &ConvertContext<'_>, node: NodeId) -> Option<LayoutData>;

    /// Creates a new node. `children` are the already built children in
    /// composition order; `None` marks one that could not be built.
    fn build(
        &self,
        ctx: &mut BuildContext<'_>,
        data: &LayoutData,
        children: &[Option<NodeId>],
    ) -> DockResult<Option<NodeId>>;

    /// Fails when `apply` could not fill the existing root `root` from
    /// `data`. Runs before a layout touches the live tree.
    fn check_root(&self, _tree: &DockTree, root: NodeId, _data: &LayoutData) -> DockResult<()> {
        Err(DockError::format(format!(
            "factory '{}' cannot fill root {root:?}",
            self.id()
        )))
    }

    /// Fills an existing root station.
    fn apply(
        &self,
        _ctx: &mut BuildContext<'_>,
        root: NodeId,
        _data: &LayoutData,
        _children: &[Option<NodeId>],
    ) -> DockResult<()> {
        Err(DockError::format(format!(
            "factory '{}' cannot fill root {root:?}",
            self.id()
        )))
    }

    /// Property the child at `index` would have below a node built from
    /// `data`.
    fn estimate_location(&self, _data: &LayoutData, _index: usize) -> Option<PathProperty> {
        None
    }

    fn write(&self, data: &LayoutData, out: &mut DataWriter) -> DockResult<()>;

    fn read(&self, input: &mut DataReader<'_>) -> DockResult<LayoutData>;

    /// Element named `layout`.
    fn write_xml(&self, data: &LayoutData) -> DockResult<XmlNode>;

    fn read_xml(&self, node: &XmlNode) -> DockResult<LayoutData>;
}

fn wrong_data(factory: &str, data: &LayoutData) -> DockError {
    DockError::format(format!("factory '{factory}' cannot handle {data:?}"))
}

/// Built-in factory for one station kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationFactory {
    Split,
    Stack,
    Flap,
    Screen,
}

impl StationFactory {
    pub const ALL: [StationFactory; 4] = [
        StationFactory::Split,
        StationFactory::Stack,
        StationFactory::Flap,
        StationFactory::Screen,
    ];

    fn station(&self, data: &LayoutData) -> DockResult<Station> {
        match (self, data) {
            (StationFactory::Split, LayoutData::Split { title, .. }) => Ok(Station::split(title.clone())),
            (StationFactory::Stack, LayoutData::Stack { title, .. }) => Ok(Station::stack(title.clone())),
            (StationFactory::Flap, LayoutData::Flap { title, side }) => Ok(Station::flap(title.clone(), *side)),
            (StationFactory::Screen, LayoutData::Screen { title, .. }) => Ok(Station::screen(title.clone())),
            _ => Err(wrong_data(self.id(), data)),
        }
    }

    fn populate(
        &self,
        ctx: &mut BuildContext<'_>,
        station: NodeId,
        data: &LayoutData,
        children: &[Option<NodeId>],
    ) -> DockResult<()> {
        let mut attached = Vec::with_capacity(children.len());
        for (idx, child) in children.iter().enumerate() {
            let Some(child) = *child else {
                attached.push(None);
                continue;
            };
            let placement = match data {
                LayoutData::Screen { windows, .. } => windows
                    .get(idx)
                    .map(|w| Placement::Bounds(*w))
                    .unwrap_or(Placement::Default),
                _ => Placement::Default,
            };
            attached.push(attach(ctx, station, child, placement)?.then_some(child));
        }
        let at = |idx: usize| attached.get(idx).copied().flatten();
        match data {
            LayoutData::Split {
                shape, fullscreen, ..
            } => {
                if let Some(shape) = shape.as_ref().and_then(|s| s.filter_map(&mut |idx| at(idx))) {
                    ctx.ctrl
                        .tree_mut()
                        .require_station_mut(station)?
                        .set_split_shape(shape);
                }
                if let Some(child) = fullscreen.and_then(at) {
                    ctx.ctrl.set_fullscreen(station, Some(child))?;
                }
            }
            LayoutData::Stack {
                selected,
                placeholders,
                ..
            } => {
                ctx.ctrl
                    .tree_mut()
                    .require_station_mut(station)?
                    .set_placeholders(placeholders.clone());
                if let Some(child) = selected.and_then(at) {
                    ctx.ctrl.set_front(station, Some(child))?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Drops `child` into `station`; a rejected child is skipped and, unless it
/// is a fixed-id dockable, disposed.
fn attach(ctx: &mut BuildContext<'_>, station: NodeId, child: NodeId, placement: Placement) -> DockResult<bool> {
    match ctx.ctrl.drop_at(station, child, placement) {
        Ok(()) => Ok(true),
        Err(DockError::Rejected { .. }) => {
            warn!(?station, ?child, "layout child rejected by its station, skipped");
            if !ctx.resolver.is_single(child) {
                ctx.ctrl.dispose(child)?;
            }
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

impl DockFactory for StationFactory {
    fn id(&self) -> &str {
        match self {
            StationFactory::Split => PathProperty::SPLIT,
            StationFactory::Stack => PathProperty::STACK,
            StationFactory::Flap => PathProperty::FLAP,
            StationFactory::Screen => PathProperty::SCREEN,
        }
    }

    fn layout(&self, ctx: &ConvertContext<'_>, node: NodeId) -> Option<LayoutData> {
        let station = ctx.ctrl.tree().station(node)?;
        if station.kind().id() != self.id() {
            return None;
        }
        let title = station.title().to_string();
        let index = |id: NodeId| station.index_of(id);
        Some(match station.kind() {
            StationKind::Split { shape, fullscreen } => LayoutData::Split {
                title,
                shape: shape.as_ref().and_then(|s| s.filter_map(&mut |id| index(id))),
                fullscreen: fullscreen.and_then(index),
            },
            StationKind::Stack => LayoutData::Stack {
                title,
                selected: station.front().and_then(index),
                placeholders: station.placeholders().clone(),
            },
            StationKind::Flap { side } => LayoutData::Flap { title, side: *side },
            StationKind::Screen { windows } => LayoutData::Screen {
                title,
                windows: windows.clone(),
            },
        })
    }

    fn build(
        &self,
        ctx: &mut BuildContext<'_>,
        data: &LayoutData,
        children: &[Option<NodeId>],
    ) -> DockResult<Option<NodeId>> {
        let station = ctx.ctrl.add_station(self.station(data)?);
        self.populate(ctx, station, data, children)?;
        Ok(Some(station))
    }

    fn check_root(&self, tree: &DockTree, root: NodeId, data: &LayoutData) -> DockResult<()> {
        let kind = tree.require_station(root)?.kind().id();
        if kind != self.id() {
            return Err(DockError::format(format!(
                "layout for a {} root applied to a {kind} root",
                self.id()
            )));
        }
        self.station(data).map(|_| ())
    }

    fn apply(
        &self,
        ctx: &mut BuildContext<'_>,
        root: NodeId,
        data: &LayoutData,
        children: &[Option<NodeId>],
    ) -> DockResult<()> {
        self.check_root(ctx.ctrl.tree(), root, data)?;
        self.populate(ctx, root, data, children)
    }

    fn estimate_location(&self, data: &LayoutData, index: usize) -> Option<PathProperty> {
        Some(match data {
            LayoutData::Split { shape, .. } => PathProperty::Split {
                steps: shape
                    .as_ref()
                    .and_then(|s| s.path_of(index))
                    .unwrap_or_default(),
            },
            LayoutData::Stack { .. } => PathProperty::Stack {
                index,
                placeholder: None,
            },
            LayoutData::Flap { .. } => PathProperty::Flap { index },
            LayoutData::Screen { windows, .. } => PathProperty::Screen {
                bounds: windows.get(index).copied().unwrap_or_default(),
            },
            _ => return None,
        })
    }

    fn write(&self, data: &LayoutData, out: &mut DataWriter) -> DockResult<()> {
        match (self, data) {
            (
                StationFactory::Split,
                LayoutData::Split {
                    title,
                    shape,
                    fullscreen,
                },
            ) => {
                out.write_utf(title);
                out.write_bool(shape.is_some());
                if let Some(shape) = shape {
                    write_shape(shape, out);
                }
                write_opt_index(out, *fullscreen);
            }
            (
                StationFactory::Stack,
                LayoutData::Stack {
                    title,
                    selected,
                    placeholders,
                },
            ) => {
                out.write_utf(title);
                write_opt_index(out, *selected);
                out.write_len(placeholders.len());
                for (token, index) in placeholders {
                    out.write_utf(token);
                    out.write_len(*index);
                }
            }
            (StationFactory::Flap, LayoutData::Flap { title, side }) => {
                out.write_utf(title);
                out.write_utf(side.as_str());
            }
            (StationFactory::Screen, LayoutData::Screen { title, windows }) => {
                out.write_utf(title);
                out.write_len(windows.len());
                for window in windows {
                    out.write_i32(window.x);
                    out.write_i32(window.y);
                    out.write_u16(window.width);
                    out.write_u16(window.height);
                }
            }
            _ => return Err(wrong_data(self.id(), data)),
        }
        Ok(())
    }

    fn read(&self, input: &mut DataReader<'_>) -> DockResult<LayoutData> {
        let title = input.read_utf()?;
        Ok(match self {
            StationFactory::Split => {
                let shape = if input.read_bool()? {
                    Some(read_shape(input)?)
                } else {
                    None
                };
                LayoutData::Split {
                    title,
                    shape,
                    fullscreen: read_opt_index(input)?,
                }
            }
            StationFactory::Stack => {
                let selected = read_opt_index(input)?;
                let mut placeholders = BTreeMap::new();
                for _ in 0..input.read_len()? {
                    let token = input.read_utf()?;
                    placeholders.insert(token, input.read_len()?);
                }
                LayoutData::Stack {
                    title,
                    selected,
                    placeholders,
                }
            }
            StationFactory::Flap => LayoutData::Flap {
                title,
                side: flap_side(&input.read_utf()?)?,
            },
            StationFactory::Screen => {
                let count = input.read_len()?;
                let mut windows = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    windows.push(FloatRect::new(
                        input.read_i32()?,
                        input.read_i32()?,
                        input.read_u16()?,
                        input.read_u16()?,
                    ));
                }
                LayoutData::Screen { title, windows }
            }
        })
    }

    fn write_xml(&self, data: &LayoutData) -> DockResult<XmlNode> {
        let title = data.title().ok_or_else(|| wrong_data(self.id(), data))?;
        let mut node = XmlNode::new("layout").with_attr("title", title);
        match (self, data) {
            (StationFactory::Split, LayoutData::Split { shape, fullscreen, .. }) => {
                if let Some(fullscreen) = fullscreen {
                    node.set_attr("fullscreen", fullscreen);
                }
                if let Some(shape) = shape {
                    node.push(shape_to_xml(shape, 1.0));
                }
            }
            (
                StationFactory::Stack,
                LayoutData::Stack {
                    selected,
                    placeholders,
                    ..
                },
            ) => {
                if let Some(selected) = selected {
                    node.set_attr("selected", selected);
                }
                for (token, index) in placeholders {
                    node.push(
                        XmlNode::new("placeholder")
                            .with_attr("token", token)
                            .with_attr("index", index),
                    );
                }
            }
            (StationFactory::Flap, LayoutData::Flap { side, .. }) => node.set_attr("side", side.as_str()),
            (StationFactory::Screen, LayoutData::Screen { windows, .. }) => {
                for window in windows {
                    node.push(
                        XmlNode::new("window")
                            .with_attr("x", window.x)
                            .with_attr("y", window.y)
                            .with_attr("width", window.width)
                            .with_attr("height", window.height),
                    );
                }
            }
            _ => return Err(wrong_data(self.id(), data)),
        }
        Ok(node)
    }

    fn read_xml(&self, node: &XmlNode) -> DockResult<LayoutData> {
        node.expect_name("layout")?;
        let title = node.required("title")?.to_string();
        let opt_index = |key: &str| -> DockResult<Option<usize>> {
            match node.attr(key) {
                Some(_) => node.parse_attr(key).map(Some),
                None => Ok(None),
            }
        };
        Ok(match self {
            StationFactory::Split => {
                let shape = match node.children.first() {
                    Some(child) => Some(shape_from_xml(child)?.0),
                    None => None,
                };
                LayoutData::Split {
                    title,
                    shape,
                    fullscreen: opt_index("fullscreen")?,
                }
            }
            StationFactory::Stack => {
                let placeholders = node
                    .children_named("placeholder")
                    .map(|p| Ok((p.required("token")?.to_string(), p.parse_attr("index")?)))
                    .collect::<DockResult<BTreeMap<_, _>>>()?;
                LayoutData::Stack {
                    title,
                    selected: opt_index("selected")?,
                    placeholders,
                }
            }
            StationFactory::Flap => LayoutData::Flap {
                title,
                side: flap_side(node.required("side")?)?,
            },
            StationFactory::Screen => {
                let windows = node
                    .children_named("window")
                    .map(|w| {
                        Ok(FloatRect::new(
                            w.parse_attr("x")?,
                            w.parse_attr("y")?,
                            w.parse_attr("width")?,
                            w.parse_attr("height")?,
                        ))
                    })
                    .collect::<DockResult<Vec<_>>>()?;
                LayoutData::Screen { title, windows }
            }
        })
    }
}

/// Dockables the frontend knows under a fixed id. The layout stores only the
/// id; the live dockable (or a backup) is looked up when the layout is
/// applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleFactory;

impl SingleFactory {
    pub const ID: &'static str = "single";
}

impl DockFactory for SingleFactory {
    fn id(&self) -> &str {
        Self::ID
    }

    fn layout(&self, ctx: &ConvertContext<'_>, node: NodeId) -> Option<LayoutData> {
        ctx.ctrl.tree().dockable(node)?;
        (ctx.single_id)(node).map(|id| LayoutData::Single { id })
    }

    fn build(
        &self,
        ctx: &mut BuildContext<'_>,
        data: &LayoutData,
        _children: &[Option<NodeId>],
    ) -> DockResult<Option<NodeId>> {
        let LayoutData::Single { id } = data else {
            return Err(wrong_data(Self::ID, data));
        };
        Ok(ctx.resolver.resolve(ctx.ctrl, id))
    }

    fn write(&self, data: &LayoutData, out: &mut DataWriter) -> DockResult<()> {
        let LayoutData::Single { id } = data else {
            return Err(wrong_data(Self::ID, data));
        };
        out.write_utf(id);
        Ok(())
    }

    fn read(&self, input: &mut DataReader<'_>) -> DockResult<LayoutData> {
        Ok(LayoutData::Single {
            id: input.read_utf()?,
        })
    }

    fn write_xml(&self, data: &LayoutData) -> DockResult<XmlNode> {
        let LayoutData::Single { id } = data else {
            return Err(wrong_data(Self::ID, data));
        };
        Ok(XmlNode::new("layout").with_attr("id", id))
    }

    fn read_xml(&self, node: &XmlNode) -> DockResult<LayoutData> {
        node.expect_name("layout")?;
        Ok(LayoutData::Single {
            id: node.required("id")?.to_string(),
        })
    }
}

/// Recreates dockable content from its layout properties.
pub trait MultipleDockableFactory: fmt::Debug {
    /// Matches [`crate::model::DockContent::factory_id`].
    fn id(&self) -> &str;

    fn create(&self, title: &str, properties: &BTreeMap<String, String>) -> Option<Dockable>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextContentFactory;

impl MultipleDockableFactory for TextContentFactory {
    fn id(&self) -> &str {
        TextContent::FACTORY_ID
    }

    fn create(&self, title: &str, properties: &BTreeMap<String, String>) -> Option<Dockable> {
        let text = properties.get("text").map(String::as_str).unwrap_or_default();
        Some(Dockable::new(title, TextContent::new(text)))
    }
}

#[derive(Debug, Default)]
pub struct MultipleRegistry {
    factories: BTreeMap<String, Box<dyn MultipleDockableFactory>>,
}

impl MultipleRegistry {
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.insert(TextContentFactory);
        registry
    }

    pub fn insert(&mut self, factory: impl MultipleDockableFactory + 'static) {
        self.factories.insert(factory.id().to_string(), Box::new(factory));
    }

    pub fn get(&self, id: &str) -> Option<&dyn MultipleDockableFactory> {
        self.factories.get(id).map(|f| f.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }
}

/// Dockables without a fixed id, rebuilt through the multiple factory named
/// by their content.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesFactory;

impl PropertiesFactory {
    pub const ID: &'static str = "properties";
}

impl DockFactory for PropertiesFactory {
    fn id(&self) -> &str {
        Self::ID
    }

    fn layout(&self, ctx: &ConvertContext<'_>, node: NodeId) -> Option<LayoutData> {
        let dockable = ctx.ctrl.tree().dockable(node)?;
        Some(LayoutData::Properties {
            content: dockable.content().factory_id().to_string(),
            title: dockable.title().to_string(),
            properties: dockable.content().layout_properties(),
        })
    }

    fn build(
        &self,
        ctx: &mut BuildContext<'_>,
        data: &LayoutData,
        _children: &[Option<NodeId>],
    ) -> DockResult<Option<NodeId>> {
        let LayoutData::Properties {
            content,
            title,
            properties,
        } = data
        else {
            return Err(wrong_data(Self::ID, data));
        };
        let Some(factory) = ctx.multiples.get(content) else {
            debug!(%content, "no multiple dockable factory registered");
            return Ok(None);
        };
        Ok(factory
            .create(title, properties)
            .map(|dockable| ctx.ctrl.add_dockable(dockable)))
    }

    fn write(&self, data: &LayoutData, out: &mut DataWriter) -> DockResult<()> {
        let LayoutData::Properties {
            content,
            title,
            properties,
        } = data
        else {
            return Err(wrong_data(Self::ID, data));
        };
        out.write_utf(content);
        out.write_utf(title);
        write_map(properties, out);
        Ok(())
    }

    fn read(&self, input: &mut DataReader<'_>) -> DockResult<LayoutData> {
        Ok(LayoutData::Properties {
            content: input.read_utf()?,
            title: input.read_utf()?,
            properties: read_map(input)?,
        })
    }

    fn write_xml(&self, data: &LayoutData) -> DockResult<XmlNode> {
        let LayoutData::Properties {
            content,
            title,
            properties,
        } = data
        else {
            return Err(wrong_data(Self::ID, data));
        };
        let mut node = XmlNode::new("layout")
            .with_attr("content", content)
            .with_attr("title", title);
        map_to_xml(&mut node, properties);
        Ok(node)
    }

    fn read_xml(&self, node: &XmlNode) -> DockResult<LayoutData> {
        node.expect_name("layout")?;
        Ok(LayoutData::Properties {
            content: node.required("content")?.to_string(),
            title: node.required("title")?.to_string(),
            properties: map_from_xml(node)?,
        })
    }
}

/// Extra data attached to nodes of full snapshots.
pub trait AdjacentFactory: fmt::Debug {
    fn id(&self) -> &str;

    fn layout(&self, ctx: &ConvertContext<'_>, node: NodeId) -> Option<BTreeMap<String, String>>;

    /// Runs after the restored tree has been registered.
    fn apply(&self, ctrl: &mut DockController, node: NodeId, properties: &BTreeMap<String, String>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlapSide, SplitNode};
    use ratatui::layout::Direction;

    fn no_singles(_: NodeId) -> Option<String> {
        None
    }

    #[test]
    fn station_layout_uses_child_indices() {
        let mut ctrl = DockController::new();
        let root = ctrl.add_station(Station::split("root"));
        ctrl.add_root(root).unwrap();
        let a = ctrl.add_dockable(Dockable::text("a"));
        let b = ctrl.add_dockable(Dockable::text("b"));
        ctrl.drop(root, a).unwrap();
        ctrl.drop(root, b).unwrap();
        ctrl.set_fullscreen(root, Some(b)).unwrap();

        let ctx = ConvertContext {
            ctrl: &ctrl,
            single_id: &no_singles,
        };
        let data = StationFactory::Split.layout(&ctx, root).unwrap();
        assert_eq!(
            data,
            LayoutData::Split {
                title: "root".into(),
                shape: Some(SplitNode::split(
                    Direction::Horizontal,
                    vec![SplitNode::Leaf(0), SplitNode::Leaf(1)]
                )),
                fullscreen: Some(1),
            }
        );
        assert!(StationFactory::Stack.layout(&ctx, root).is_none());
        assert_eq!(
            StationFactory::Split.estimate_location(&data, 1),
            Some(PathProperty::Split {
                steps: vec![crate::model::SplitStep::new(Direction::Horizontal, 1)]
            })
        );
    }

    #[test]
    fn every_station_kind_survives_both_codecs() {
        let samples = [
            (
                StationFactory::Stack,
                LayoutData::Stack {
                    title: "tabs".into(),
                    selected: Some(1),
                    placeholders: BTreeMap::from([("editor".to_string(), 0)]),
                },
            ),
            (
                StationFactory::Flap,
                LayoutData::Flap {
                    title: "dock".into(),
                    side: FlapSide::Left,
                },
            ),
            (
                StationFactory::Screen,
                LayoutData::Screen {
                    title: "screen".into(),
                    windows: vec![FloatRect::new(-3, 2, 30, 10)],
                },
            ),
        ];
        for (factory, data) in samples {
            let mut out = DataWriter::new();
            factory.write(&data, &mut out).unwrap();
            let bytes = out.into_inner();
            assert_eq!(factory.read(&mut DataReader::new(&bytes)).unwrap(), data);
            let xml = factory.write_xml(&data).unwrap();
            assert_eq!(factory.read_xml(&xml).unwrap(), data);
        }
    }

    #[test]
    fn factories_refuse_foreign_data() {
        let data = LayoutData::Single { id: "x".into() };
        assert!(StationFactory::Split.write(&data, &mut DataWriter::new()).is_err());
        assert!(PropertiesFactory.write_xml(&data).is_err());
    }

    #[test]
    fn text_content_is_recreated_from_properties() {
        let registry = MultipleRegistry::with_defaults();
        let properties = BTreeMap::from([("text".to_string(), "hello".to_string())]);
        let dockable = registry.get("text").unwrap().create("notes", &properties).unwrap();
        assert_eq!(dockable.title(), "notes");
        assert_eq!(dockable.content().layout_properties(), properties);
        assert!(registry.get("chart").is_none());
    }
}

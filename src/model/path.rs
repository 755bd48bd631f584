use std::fmt;

use ratatui::layout::Direction;

use crate::error::{DockError, DockResult};
use crate::geometry::FloatRect;
use crate::layout::io::{DataReader, DataWriter};
use crate::layout::xml::XmlNode;

/// One hop inside a split station: in a split running along `direction`,
/// take child `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitStep {
    pub direction: Direction,
    pub index: usize,
}

impl SplitStep {
    pub fn new(direction: Direction, index: usize) -> Self {
        Self { direction, index }
    }
}

pub(crate) fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::Horizontal => "horizontal",
        Direction::Vertical => "vertical",
    }
}

pub(crate) fn parse_direction(value: &str) -> DockResult<Direction> {
    match value {
        "horizontal" => Ok(Direction::Horizontal),
        "vertical" => Ok(Direction::Vertical),
        other => Err(DockError::format(format!("unknown split direction '{other}'"))),
    }
}

/// Position of a node relative to its direct parent station.
///
/// The string ids returned by [`PathProperty::id`] end up in saved layouts and
/// must never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathProperty {
    Split { steps: Vec<SplitStep> },
    Stack { index: usize, placeholder: Option<String> },
    Flap { index: usize },
    Screen { bounds: FloatRect },
}

impl PathProperty {
    pub const SPLIT: &'static str = "split";
    pub const STACK: &'static str = "stack";
    pub const FLAP: &'static str = "flap";
    pub const SCREEN: &'static str = "screen";

    pub fn id(&self) -> &'static str {
        match self {
            PathProperty::Split { .. } => Self::SPLIT,
            PathProperty::Stack { .. } => Self::STACK,
            PathProperty::Flap { .. } => Self::FLAP,
            PathProperty::Screen { .. } => Self::SCREEN,
        }
    }

    pub fn write(&self, out: &mut DataWriter) {
        out.write_utf(self.id());
        match self {
            PathProperty::Split { steps } => {
                out.write_len(steps.len());
                for step in steps {
                    out.write_bool(step.direction == Direction::Horizontal);
                    out.write_len(step.index);
                }
            }
            PathProperty::Stack { index, placeholder } => {
                out.write_len(*index);
                out.write_opt_utf(placeholder.as_deref());
            }
            PathProperty::Flap { index } => out.write_len(*index),
            PathProperty::Screen { bounds } => {
                out.write_i32(bounds.x);
                out.write_i32(bounds.y);
                out.write_u16(bounds.width);
                out.write_u16(bounds.height);
            }
        }
    }

    pub fn read(input: &mut DataReader<'_>) -> DockResult<Self> {
        let id = input.read_utf()?;
        match id.as_str() {
            Self::SPLIT => {
                let count = input.read_len()?;
                let mut steps = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    let direction = if input.read_bool()? {
                        Direction::Horizontal
                    } else {
                        Direction::Vertical
                    };
                    steps.push(SplitStep::new(direction, input.read_len()?));
                }
                Ok(PathProperty::Split { steps })
            }
            Self::STACK => Ok(PathProperty::Stack {
                index: input.read_len()?,
                placeholder: input.read_opt_utf()?,
            }),
            Self::FLAP => Ok(PathProperty::Flap {
                index: input.read_len()?,
            }),
            Self::SCREEN => Ok(PathProperty::Screen {
                bounds: FloatRect::new(
                    input.read_i32()?,
                    input.read_i32()?,
                    input.read_u16()?,
                    input.read_u16()?,
                ),
            }),
            other => Err(DockError::UnknownId {
                namespace: "path property",
                id: other.to_string(),
            }),
        }
    }

    pub fn to_xml(&self) -> XmlNode {
        let node = XmlNode::new("property").with_attr("id", self.id());
        match self {
            PathProperty::Split { steps } => steps.iter().fold(node, |node, step| {
                node.with_child(
                    XmlNode::new("step")
                        .with_attr("direction", direction_name(step.direction))
                        .with_attr("index", step.index),
                )
            }),
            PathProperty::Stack { index, placeholder } => {
                let node = node.with_attr("index", index);
                match placeholder {
                    Some(placeholder) => node.with_attr("placeholder", placeholder),
                    None => node,
                }
            }
            PathProperty::Flap { index } => node.with_attr("index", index),
            PathProperty::Screen { bounds } => node
                .with_attr("x", bounds.x)
                .with_attr("y", bounds.y)
                .with_attr("width", bounds.width)
                .with_attr("height", bounds.height),
        }
    }

    pub fn from_xml(node: &XmlNode) -> DockResult<Self> {
        let id = node.required("id")?;
        match id {
            Self::SPLIT => {
                let steps = node
                    .children_named("step")
                    .map(|step| {
                        Ok(SplitStep::new(
                            parse_direction(step.required("direction")?)?,
                            step.parse_attr("index")?,
                        ))
                    })
                    .collect::<DockResult<Vec<_>>>()?;
                Ok(PathProperty::Split { steps })
            }
            Self::STACK => Ok(PathProperty::Stack {
                index: node.parse_attr("index")?,
                placeholder: node.attr("placeholder").map(str::to_string),
            }),
            Self::FLAP => Ok(PathProperty::Flap {
                index: node.parse_attr("index")?,
            }),
            Self::SCREEN => Ok(PathProperty::Screen {
                bounds: FloatRect::new(
                    node.parse_attr("x")?,
                    node.parse_attr("y")?,
                    node.parse_attr("width")?,
                    node.parse_attr("height")?,
                ),
            }),
            other => Err(DockError::UnknownId {
                namespace: "path property",
                id: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PathProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathProperty::Split { steps } => {
                f.write_str("split[")?;
                for (idx, step) in steps.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    let dir = match step.direction {
                        Direction::Horizontal => 'h',
                        Direction::Vertical => 'v',
                    };
                    write!(f, "{dir}{}", step.index)?;
                }
                f.write_str("]")
            }
            PathProperty::Stack { index, .. } => write!(f, "stack[{index}]"),
            PathProperty::Flap { index } => write!(f, "flap[{index}]"),
            PathProperty::Screen { bounds } => write!(
                f,
                "screen[{},{} {}x{}]",
                bounds.x, bounds.y, bounds.width, bounds.height
            ),
        }
    }
}

/// Chain of properties leading from a root station down to a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DockablePath(pub Vec<PathProperty>);

impl DockablePath {
    pub fn new(properties: Vec<PathProperty>) -> Self {
        Self(properties)
    }

    pub fn properties(&self) -> &[PathProperty] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&PathProperty> {
        self.0.first()
    }

    /// The path without its first property, used when descending one level.
    pub fn successor(&self) -> DockablePath {
        DockablePath(self.0.iter().skip(1).cloned().collect())
    }

    pub fn parent(&self) -> Option<DockablePath> {
        if self.0.is_empty() {
            return None;
        }
        Some(DockablePath(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn write(&self, out: &mut DataWriter) {
        out.write_len(self.0.len());
        for property in &self.0 {
            property.write(out);
        }
    }

    pub fn read(input: &mut DataReader<'_>) -> DockResult<Self> {
        let count = input.read_len()?;
        let mut properties = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            properties.push(PathProperty::read(input)?);
        }
        Ok(Self(properties))
    }

    pub fn to_xml(&self) -> XmlNode {
        self.0
            .iter()
            .fold(XmlNode::new("path"), |node, property| {
                node.with_child(property.to_xml())
            })
    }

    pub fn from_xml(node: &XmlNode) -> DockResult<Self> {
        node.children_named("property")
            .map(PathProperty::from_xml)
            .collect::<DockResult<Vec<_>>>()
            .map(Self)
    }
}

impl fmt::Display for DockablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, property) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("/")?;
            }
            write!(f, "{property}")?;
        }
        Ok(())
    }
}

/// Where a node lives: the name of its root and the path below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockLocation {
    pub root: String,
    pub path: DockablePath,
}

impl DockLocation {
    pub fn new(root: impl Into<String>, path: DockablePath) -> Self {
        Self {
            root: root.into(),
            path,
        }
    }

    pub fn write(&self, out: &mut DataWriter) {
        out.write_utf(&self.root);
        self.path.write(out);
    }

    pub fn read(input: &mut DataReader<'_>) -> DockResult<Self> {
        Ok(Self {
            root: input.read_utf()?,
            path: DockablePath::read(input)?,
        })
    }

    pub fn to_xml(&self) -> XmlNode {
        XmlNode::new("location")
            .with_attr("root", &self.root)
            .with_child(self.path.to_xml())
    }

    pub fn from_xml(node: &XmlNode) -> DockResult<Self> {
        let root = node.required("root")?.to_string();
        let path = match node.child("path") {
            Some(path) => DockablePath::from_xml(path)?,
            None => DockablePath::default(),
        };
        Ok(Self { root, path })
    }
}

impl fmt::Display for DockLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.root, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DockablePath {
        DockablePath::new(vec![
            PathProperty::Split {
                steps: vec![
                    SplitStep::new(Direction::Horizontal, 1),
                    SplitStep::new(Direction::Vertical, 0),
                ],
            },
            PathProperty::Stack {
                index: 2,
                placeholder: Some("editor".into()),
            },
        ])
    }

    #[test]
    fn path_binary_and_xml_agree() {
        let path = sample();
        let mut out = DataWriter::new();
        path.write(&mut out);
        let bytes = out.into_inner();
        let mut input = DataReader::new(&bytes);
        assert_eq!(DockablePath::read(&mut input).unwrap(), path);
        assert!(input.is_at_end());

        let xml = path.to_xml();
        assert_eq!(DockablePath::from_xml(&xml).unwrap(), path);
    }

    #[test]
    fn parent_drops_last_property() {
        let path = sample();
        let parent = path.parent().unwrap();
        assert_eq!(parent.properties().len(), 1);
        assert_eq!(parent.properties()[0].id(), PathProperty::SPLIT);
        assert!(DockablePath::default().parent().is_none());
    }

    #[test]
    fn unknown_property_id_is_rejected() {
        let node = XmlNode::new("property").with_attr("id", "grid");
        assert!(matches!(
            PathProperty::from_xml(&node),
            Err(DockError::UnknownId { .. })
        ));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(sample().to_string(), "split[h1,v0]/stack[2]");
    }
}

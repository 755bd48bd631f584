//! Interpreted layout payloads of the built-in factories.
//!
//! Child references are indices into the owning composition's children, so
//! the same data can describe a live tree, a saved file or a tree that is
//! only partly buildable.

use std::collections::BTreeMap;

use ratatui::layout::Direction;

use super::io::{DataReader, DataWriter};
use super::xml::XmlNode;
use crate::constants::MAX_LAYOUT_DEPTH;
use crate::error::{DockError, DockResult};
use crate::geometry::FloatRect;
use crate::model::path::{direction_name, parse_direction};
use crate::model::{FlapSide, SplitNode};

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutData {
    Split {
        title: String,
        shape: Option<SplitNode<usize>>,
        fullscreen: Option<usize>,
    },
    Stack {
        title: String,
        selected: Option<usize>,
        placeholders: BTreeMap<String, usize>,
    },
    Flap {
        title: String,
        side: FlapSide,
    },
    Screen {
        title: String,
        windows: Vec<FloatRect>,
    },
    /// A dockable registered under a fixed id.
    Single { id: String },
    /// A dockable rebuilt by the content factory `content`.
    Properties {
        content: String,
        title: String,
        properties: BTreeMap<String, String>,
    },
}

impl LayoutData {
    pub fn title(&self) -> Option<&str> {
        match self {
            LayoutData::Split { title, .. }
            | LayoutData::Stack { title, .. }
            | LayoutData::Flap { title, .. }
            | LayoutData::Screen { title, .. }
            | LayoutData::Properties { title, .. } => Some(title),
            LayoutData::Single { .. } => None,
        }
    }
}

const LEAF: u8 = 0;
const NODE: u8 = 1;

pub fn write_shape(shape: &SplitNode<usize>, out: &mut DataWriter) {
    match shape {
        SplitNode::Leaf(index) => {
            out.write_u8(LEAF);
            out.write_len(*index);
        }
        SplitNode::Split {
            direction,
            children,
            weights,
        } => {
            out.write_u8(NODE);
            out.write_bool(*direction == Direction::Horizontal);
            out.write_len(children.len());
            for (idx, child) in children.iter().enumerate() {
                out.write_f32(weights.get(idx).copied().unwrap_or(1.0));
                write_shape(child, out);
            }
        }
    }
}

/// Fails once `depth` passes [`MAX_LAYOUT_DEPTH`].
pub fn check_depth(depth: usize, what: &str) -> DockResult<()> {
    if depth > MAX_LAYOUT_DEPTH {
        return Err(DockError::format(format!(
            "{what} nested deeper than {MAX_LAYOUT_DEPTH} levels"
        )));
    }
    Ok(())
}

pub fn read_shape(input: &mut DataReader<'_>) -> DockResult<SplitNode<usize>> {
    read_shape_at(input, 0)
}

fn read_shape_at(input: &mut DataReader<'_>, depth: usize) -> DockResult<SplitNode<usize>> {
    check_depth(depth, "split shape")?;
    match input.read_u8()? {
        LEAF => Ok(SplitNode::Leaf(input.read_len()?)),
        NODE => {
            let direction = if input.read_bool()? {
                Direction::Horizontal
            } else {
                Direction::Vertical
            };
            let count = input.read_len()?;
            let mut children = Vec::with_capacity(count.min(64));
            let mut weights = Vec::with_capacity(count.min(64));
            for _ in 0..count {
                weights.push(input.read_f32()?);
                children.push(read_shape_at(input, depth + 1)?);
            }
            if children.is_empty() {
                return Err(DockError::format("split node without children"));
            }
            Ok(SplitNode::Split {
                direction,
                children,
                weights,
            })
        }
        tag => Err(DockError::format(format!("unknown split node tag {tag}"))),
    }
}

pub fn shape_to_xml(shape: &SplitNode<usize>, weight: f32) -> XmlNode {
    match shape {
        SplitNode::Leaf(index) => XmlNode::new("leaf")
            .with_attr("index", index)
            .with_attr("weight", weight),
        SplitNode::Split {
            direction,
            children,
            weights,
        } => {
            let mut node = XmlNode::new("node")
                .with_attr("direction", direction_name(*direction))
                .with_attr("weight", weight);
            for (idx, child) in children.iter().enumerate() {
                node.push(shape_to_xml(child, weights.get(idx).copied().unwrap_or(1.0)));
            }
            node
        }
    }
}

/// Returns the shape and the weight stored on its element.
pub fn shape_from_xml(node: &XmlNode) -> DockResult<(SplitNode<usize>, f32)> {
    shape_from_xml_at(node, 0)
}

fn shape_from_xml_at(node: &XmlNode, depth: usize) -> DockResult<(SplitNode<usize>, f32)> {
    check_depth(depth, "split shape")?;
    let weight = match node.attr("weight") {
        Some(_) => node.parse_attr("weight")?,
        None => 1.0,
    };
    match node.name.as_str() {
        "leaf" => Ok((SplitNode::Leaf(node.parse_attr("index")?), weight)),
        "node" => {
            let direction = parse_direction(node.required("direction")?)?;
            let mut children = Vec::new();
            let mut weights = Vec::new();
            for child in &node.children {
                let (shape, weight) = shape_from_xml_at(child, depth + 1)?;
                children.push(shape);
                weights.push(weight);
            }
            if children.is_empty() {
                return Err(DockError::format("<node> without children"));
            }
            Ok((
                SplitNode::Split {
                    direction,
                    children,
                    weights,
                },
                weight,
            ))
        }
        other => Err(DockError::format(format!("unexpected <{other}> in split shape"))),
    }
}

pub fn write_map(map: &BTreeMap<String, String>, out: &mut DataWriter) {
    out.write_len(map.len());
    for (key, value) in map {
        out.write_utf(key);
        out.write_utf(value);
    }
}

pub fn read_map(input: &mut DataReader<'_>) -> DockResult<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for _ in 0..input.read_len()? {
        let key = input.read_utf()?;
        map.insert(key, input.read_utf()?);
    }
    Ok(map)
}

/// `<property key value/>` children.
pub fn map_to_xml(node: &mut XmlNode, map: &BTreeMap<String, String>) {
    for (key, value) in map {
        node.push(
            XmlNode::new("property")
                .with_attr("key", key)
                .with_attr("value", value),
        );
    }
}

pub fn map_from_xml(node: &XmlNode) -> DockResult<BTreeMap<String, String>> {
    node.children_named("property")
        .map(|p| Ok((p.required("key")?.to_string(), p.required("value")?.to_string())))
        .collect()
}

pub fn write_opt_index(out: &mut DataWriter, value: Option<usize>) {
    out.write_bool(value.is_some());
    if let Some(value) = value {
        out.write_len(value);
    }
}

pub fn read_opt_index(input: &mut DataReader<'_>) -> DockResult<Option<usize>> {
    if input.read_bool()? {
        Ok(Some(input.read_len()?))
    } else {
        Ok(None)
    }
}

pub fn flap_side(value: &str) -> DockResult<FlapSide> {
    FlapSide::parse(value).ok_or_else(|| DockError::format(format!("unknown flap side '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> SplitNode<usize> {
        SplitNode::Split {
            direction: Direction::Horizontal,
            children: vec![
                SplitNode::Leaf(0),
                SplitNode::Split {
                    direction: Direction::Vertical,
                    children: vec![SplitNode::Leaf(1), SplitNode::Leaf(2)],
                    weights: vec![2.0, 1.0],
                },
            ],
            weights: vec![0.5, 1.5],
        }
    }

    #[test]
    fn shape_keeps_weights_in_both_codecs() {
        let mut out = DataWriter::new();
        write_shape(&shape(), &mut out);
        let bytes = out.into_inner();
        assert_eq!(read_shape(&mut DataReader::new(&bytes)).unwrap(), shape());

        let (parsed, _) = shape_from_xml(&shape_to_xml(&shape(), 1.0)).unwrap();
        assert_eq!(parsed, shape());
    }

    #[test]
    fn empty_split_node_is_malformed() {
        let bytes = [NODE, 1, 0, 0, 0, 0];
        assert!(read_shape(&mut DataReader::new(&bytes)).is_err());
        assert!(shape_from_xml(&XmlNode::new("node").with_attr("direction", "vertical")).is_err());
    }

    fn nested_shape(levels: usize) -> Vec<u8> {
        let mut out = DataWriter::new();
        for _ in 0..levels {
            out.write_u8(NODE);
            out.write_bool(true);
            out.write_len(1);
            out.write_f32(1.0);
        }
        out.write_u8(LEAF);
        out.write_len(0);
        out.into_inner()
    }

    #[test]
    fn shapes_nested_too_deeply_are_malformed() {
        let bytes = nested_shape(10_000);
        assert!(matches!(
            read_shape(&mut DataReader::new(&bytes)),
            Err(DockError::Format(_))
        ));
        let bytes = nested_shape(MAX_LAYOUT_DEPTH);
        assert!(read_shape(&mut DataReader::new(&bytes)).is_ok());

        let mut node = XmlNode::new("leaf").with_attr("index", 0);
        for _ in 0..=MAX_LAYOUT_DEPTH {
            let mut parent = XmlNode::new("node").with_attr("direction", "vertical");
            parent.push(node);
            node = parent;
        }
        assert!(matches!(shape_from_xml(&node), Err(DockError::Format(_))));
        assert!(shape_from_xml(&node.children[0]).is_ok());
    }
}

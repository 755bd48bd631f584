//! Tree-shaped description of a layout, independent of live nodes.

use std::collections::BTreeMap;

use super::data::LayoutData;
use super::xml::XmlNode;

/// Payload of one composition node. Raw variants hold data of a factory that
/// was not registered when the layout was read.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutInfo {
    Data { factory: String, data: LayoutData },
    Bytes { factory: String, bytes: Vec<u8> },
    Xml { factory: String, node: XmlNode },
}

impl LayoutInfo {
    pub fn factory(&self) -> &str {
        match self {
            LayoutInfo::Data { factory, .. }
            | LayoutInfo::Bytes { factory, .. }
            | LayoutInfo::Xml { factory, .. } => factory,
        }
    }

    pub fn data(&self) -> Option<&LayoutData> {
        match self {
            LayoutInfo::Data { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LayoutInfo::Data { .. })
    }
}

/// Extra per-node data kept by an adjacent factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacentLayout {
    pub factory: String,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DockLayoutComposition {
    pub layout: LayoutInfo,
    pub adjacent: Vec<AdjacentLayout>,
    pub children: Vec<DockLayoutComposition>,
}

impl DockLayoutComposition {
    pub fn new(layout: LayoutInfo, children: Vec<DockLayoutComposition>) -> Self {
        Self {
            layout,
            adjacent: Vec::new(),
            children,
        }
    }

    pub fn leaf(factory: impl Into<String>, data: LayoutData) -> Self {
        Self::new(
            LayoutInfo::Data {
                factory: factory.into(),
                data,
            },
            Vec::new(),
        )
    }

    pub fn factory(&self) -> &str {
        self.layout.factory()
    }

    /// Number of nodes in this subtree still holding raw payloads.
    pub fn unresolved(&self) -> usize {
        usize::from(!self.layout.is_resolved())
            + self.children.iter().map(Self::unresolved).sum::<usize>()
    }

    /// Ids of every `single` node in this subtree, pre-order.
    pub fn single_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_singles(&mut out);
        out
    }

    fn collect_singles<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(LayoutData::Single { id }) = self.layout.data() {
            out.push(id);
        }
        for child in &self.children {
            child.collect_singles(out);
        }
    }

    /// Factory ids in pre-order; two layouts with the same structure produce
    /// the same sequence.
    pub fn factory_outline(&self) -> Vec<(usize, &str)> {
        let mut out = Vec::new();
        self.outline(0, &mut out);
        out
    }

    fn outline<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a str)>) {
        out.push((depth, self.factory()));
        for child in &self.children {
            child.outline(depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_and_singles() {
        let composition = DockLayoutComposition::new(
            LayoutInfo::Data {
                factory: "stack".into(),
                data: LayoutData::Stack {
                    title: "tabs".into(),
                    selected: Some(0),
                    placeholders: BTreeMap::new(),
                },
            },
            vec![
                DockLayoutComposition::leaf("single", LayoutData::Single { id: "a".into() }),
                DockLayoutComposition::new(
                    LayoutInfo::Bytes {
                        factory: "chart".into(),
                        bytes: vec![1, 2],
                    },
                    Vec::new(),
                ),
            ],
        );
        assert_eq!(
            composition.factory_outline(),
            vec![(0, "stack"), (1, "single"), (1, "chart")]
        );
        assert_eq!(composition.single_ids(), vec!["a"]);
        assert_eq!(composition.unresolved(), 1);
    }
}

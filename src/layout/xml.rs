//! Minimal element tree on top of quick-xml.
//!
//! Layout documents keep every value in attributes, so text content is
//! ignored on read and never written.

use std::fmt::Display;
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::constants::MAX_XML_DEPTH;
use crate::error::{DockError, DockResult};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

fn xml_error(err: impl Display) -> DockError {
    DockError::Xml(err.to_string())
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn set_attr(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn required(&self, key: &str) -> DockResult<&str> {
        self.attr(key).ok_or_else(|| {
            DockError::format(format!("<{}> is missing attribute '{key}'", self.name))
        })
    }

    pub fn parse_attr<T: FromStr>(&self, key: &str) -> DockResult<T> {
        let raw = self.required(key)?;
        raw.parse().map_err(|_| {
            DockError::format(format!("<{}> has invalid {key}='{raw}'", self.name))
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn required_child(&self, name: &str) -> DockResult<&XmlNode> {
        self.child(name).ok_or_else(|| {
            DockError::format(format!("<{}> is missing child <{name}>", self.name))
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn expect_name(&self, name: &str) -> DockResult<()> {
        if self.name != name {
            return Err(DockError::format(format!(
                "expected <{name}>, found <{}>",
                self.name
            )));
        }
        Ok(())
    }

    /// Parses a whole document and returns its root element.
    pub fn parse(text: &str) -> DockResult<XmlNode> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root = None;
        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) => {
                    if stack.len() >= MAX_XML_DEPTH {
                        return Err(DockError::format(format!(
                            "xml elements nested deeper than {MAX_XML_DEPTH} levels"
                        )));
                    }
                    stack.push(Self::from_start(&reader, &start)?);
                }
                Event::Empty(start) => {
                    let node = Self::from_start(&reader, &start)?;
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| DockError::Xml("unbalanced closing tag".into()))?;
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        if !stack.is_empty() {
            return Err(DockError::Xml("document ended inside an element".into()));
        }
        root.ok_or_else(|| DockError::Xml("document has no root element".into()))
    }

    fn from_start(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> DockResult<XmlNode> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut node = XmlNode::new(name);
        for attr in start.attributes() {
            let attr = attr.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(xml_error)?
                .into_owned();
            node.attributes.push((key, value));
        }
        Ok(node)
    }

    fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> DockResult<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if root.is_none() => *root = Some(node),
            None => return Err(DockError::Xml("multiple root elements".into())),
        }
        Ok(())
    }

    /// Serializes with an XML declaration and two-space indentation.
    pub fn to_document(&self) -> DockResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(xml_error)
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> DockResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(xml_error)?;
            return Ok(());
        }
        writer.write_event(Event::Start(start)).map_err(xml_error)?;
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_error)?;
        Ok(())
    }
}

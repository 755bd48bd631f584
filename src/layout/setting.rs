//! A complete saved layout: every root, every hidden dockable and the modes.

use std::collections::BTreeMap;

use super::composition::DockLayoutComposition;
use super::io::{DataReader, DataWriter};
use super::situation::DockSituation;
use super::version::Version;
use super::xml::XmlNode;
use crate::error::{DockError, DockResult};
use crate::mode::ModeSettings;
use crate::model::DockablePath;

/// A dockable that is not part of any root, with what is known about where
/// it was.
#[derive(Debug, Clone, PartialEq)]
pub struct InvisibleEntry {
    pub key: String,
    pub root: Option<String>,
    pub layout: Option<DockLayoutComposition>,
    pub location: Option<DockablePath>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Setting {
    pub roots: BTreeMap<String, DockLayoutComposition>,
    pub invisible: Vec<InvisibleEntry>,
    pub modes: Option<ModeSettings>,
}

impl Setting {
    pub fn invisible_entry(&self, key: &str) -> Option<&InvisibleEntry> {
        self.invisible.iter().find(|entry| entry.key == key)
    }

    /// Interprets raw payloads that registered factories can now read.
    pub fn fill_missing(&mut self, situation: &DockSituation) -> usize {
        let roots: usize = self
            .roots
            .values_mut()
            .map(|composition| situation.fill_missing(composition))
            .sum();
        let invisible: usize = self
            .invisible
            .iter_mut()
            .filter_map(|entry| entry.layout.as_mut())
            .map(|composition| situation.fill_missing(composition))
            .sum();
        roots + invisible
    }

    pub fn write(&self, situation: &DockSituation, out: &mut DataWriter) -> DockResult<()> {
        out.write_len(self.roots.len());
        for (name, composition) in &self.roots {
            out.write_utf(name);
            situation.write(composition, out)?;
        }
        out.write_len(self.invisible.len());
        for entry in &self.invisible {
            out.write_utf(&entry.key);
            out.write_opt_utf(entry.root.as_deref());
            out.write_bool(entry.layout.is_some());
            if let Some(layout) = &entry.layout {
                situation.write(layout, out)?;
            }
            out.write_bool(entry.location.is_some());
            if let Some(location) = &entry.location {
                location.write(out);
            }
        }
        out.write_bool(self.modes.is_some());
        if let Some(modes) = &self.modes {
            modes.write(out);
        }
        Ok(())
    }

    pub fn read(situation: &DockSituation, input: &mut DataReader<'_>) -> DockResult<Self> {
        let mut roots = BTreeMap::new();
        for _ in 0..input.read_len()? {
            let name = input.read_utf()?;
            roots.insert(name, situation.read(input)?);
        }
        let mut invisible = Vec::new();
        for _ in 0..input.read_len()? {
            let key = input.read_utf()?;
            let root = input.read_opt_utf()?;
            let layout = if input.read_bool()? {
                Some(situation.read(input)?)
            } else {
                None
            };
            let location = if input.read_bool()? {
                Some(DockablePath::read(input)?)
            } else {
                None
            };
            invisible.push(InvisibleEntry {
                key,
                root,
                layout,
                location,
            });
        }
        let modes = if input.read_bool()? {
            Some(ModeSettings::read(input)?)
        } else {
            None
        };
        Ok(Self {
            roots,
            invisible,
            modes,
        })
    }

    /// Appends `<roots>`, `<invisible>` and `<modes>` to `node`.
    pub fn write_xml(&self, situation: &DockSituation, node: &mut XmlNode) -> DockResult<()> {
        let mut roots = XmlNode::new("roots");
        for (name, composition) in &self.roots {
            roots.push(
                XmlNode::new("root")
                    .with_attr("name", name)
                    .with_child(situation.to_xml(composition)?),
            );
        }
        node.push(roots);
        let mut invisible = XmlNode::new("invisible");
        for entry in &self.invisible {
            let mut item = XmlNode::new("entry").with_attr("key", &entry.key);
            if let Some(root) = &entry.root {
                item.set_attr("root", root);
            }
            if let Some(layout) = &entry.layout {
                item.push(situation.to_xml(layout)?);
            }
            if let Some(location) = &entry.location {
                item.push(location.to_xml());
            }
            invisible.push(item);
        }
        node.push(invisible);
        if let Some(modes) = &self.modes {
            node.push(modes.to_xml());
        }
        Ok(())
    }

    pub fn read_xml(situation: &DockSituation, node: &XmlNode) -> DockResult<Self> {
        let mut roots = BTreeMap::new();
        if let Some(list) = node.child("roots") {
            for root in list.children_named("root") {
                let composition = situation.from_xml(root.required_child("composition")?)?;
                roots.insert(root.required("name")?.to_string(), composition);
            }
        }
        let mut invisible = Vec::new();
        if let Some(list) = node.child("invisible") {
            for item in list.children_named("entry") {
                invisible.push(InvisibleEntry {
                    key: item.required("key")?.to_string(),
                    root: item.attr("root").map(str::to_string),
                    layout: item
                        .child("composition")
                        .map(|c| situation.from_xml(c))
                        .transpose()?,
                    location: item.child("path").map(DockablePath::from_xml).transpose()?,
                });
            }
        }
        let modes = node.child("modes").map(ModeSettings::from_xml).transpose()?;
        Ok(Self {
            roots,
            invisible,
            modes,
        })
    }
}

/// Contents of a frontend file: named settings, the name of the current one
/// and the layout that was live when the file was written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutFile {
    pub current: Option<String>,
    pub settings: BTreeMap<String, Setting>,
    pub live: Setting,
}

impl LayoutFile {
    pub fn write(&self, situation: &DockSituation, out: &mut DataWriter) -> DockResult<()> {
        Version::CURRENT.write(out);
        out.write_opt_utf(self.current.as_deref());
        out.write_len(self.settings.len());
        for (name, setting) in &self.settings {
            out.write_utf(name);
            setting.write(situation, out)?;
        }
        self.live.write(situation, out)
    }

    pub fn read(situation: &DockSituation, input: &mut DataReader<'_>) -> DockResult<Self> {
        Version::read(input)?.check_current()?;
        let current = input.read_opt_utf()?;
        let mut settings = BTreeMap::new();
        for _ in 0..input.read_len()? {
            let name = input.read_utf()?;
            settings.insert(name, Setting::read(situation, input)?);
        }
        let live = Setting::read(situation, input)?;
        Ok(Self {
            current,
            settings,
            live,
        })
    }

    /// `<frontend version>` with `<settings>` and `<current>`.
    pub fn to_xml(&self, situation: &DockSituation) -> DockResult<XmlNode> {
        let mut root = XmlNode::new("frontend").with_attr("version", Version::CURRENT);
        let mut settings = XmlNode::new("settings");
        for (name, setting) in &self.settings {
            let mut node = XmlNode::new("setting").with_attr("name", name);
            setting.write_xml(situation, &mut node)?;
            settings.push(node);
        }
        root.push(settings);
        let mut current = XmlNode::new("current");
        if let Some(name) = &self.current {
            current.set_attr("name", name);
        }
        self.live.write_xml(situation, &mut current)?;
        root.push(current);
        Ok(root)
    }

    pub fn from_xml(situation: &DockSituation, node: &XmlNode) -> DockResult<Self> {
        node.expect_name("frontend")?;
        node.parse_attr::<Version>("version")?.check_current()?;
        let mut settings = BTreeMap::new();
        if let Some(list) = node.child("settings") {
            for item in list.children_named("setting") {
                settings.insert(
                    item.required("name")?.to_string(),
                    Setting::read_xml(situation, item)?,
                );
            }
        }
        let current = node.required_child("current")?;
        Ok(Self {
            current: current.attr("name").map(str::to_string),
            settings,
            live: Setting::read_xml(situation, current)?,
        })
    }

    pub fn to_bytes(&self, situation: &DockSituation) -> DockResult<Vec<u8>> {
        let mut out = DataWriter::new();
        self.write(situation, &mut out)?;
        Ok(out.into_inner())
    }

    pub fn from_bytes(situation: &DockSituation, bytes: &[u8]) -> DockResult<Self> {
        Self::read(situation, &mut DataReader::new(bytes))
    }

    pub fn to_xml_string(&self, situation: &DockSituation) -> DockResult<String> {
        self.to_xml(situation)?.to_document()
    }

    pub fn from_xml_str(situation: &DockSituation, text: &str) -> DockResult<Self> {
        Self::from_xml(situation, &XmlNode::parse(text)?)
    }

    /// Parses either encoding; XML is recognised by its leading `<`.
    pub fn parse(situation: &DockSituation, bytes: &[u8]) -> DockResult<Self> {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'<') => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| DockError::format("layout file is not valid UTF-8"))?;
                Self::from_xml_str(situation, text)
            }
            _ => Self::from_bytes(situation, bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::composition::LayoutInfo;
    use crate::layout::data::LayoutData;
    use crate::model::PathProperty;

    fn sample() -> Setting {
        let root = DockLayoutComposition::new(
            LayoutInfo::Data {
                factory: "split".into(),
                data: LayoutData::Split {
                    title: "main".into(),
                    shape: Some(crate::model::SplitNode::Leaf(0)),
                    fullscreen: None,
                },
            },
            vec![DockLayoutComposition::leaf(
                "single",
                LayoutData::Single { id: "editor".into() },
            )],
        );
        Setting {
            roots: BTreeMap::from([("main".to_string(), root)]),
            invisible: vec![InvisibleEntry {
                key: "log".into(),
                root: Some("main".into()),
                layout: None,
                location: Some(DockablePath::new(vec![PathProperty::Flap { index: 2 }])),
            }],
            modes: Some(ModeSettings::default()),
        }
    }

    #[test]
    fn binary_codec() {
        let situation = DockSituation::new();
        let setting = sample();
        let mut out = DataWriter::new();
        setting.write(&situation, &mut out).unwrap();
        let bytes = out.into_inner();
        let mut input = DataReader::new(&bytes);
        assert_eq!(Setting::read(&situation, &mut input).unwrap(), setting);
        assert!(input.is_at_end());
    }

    #[test]
    fn xml_codec() {
        let situation = DockSituation::new();
        let setting = sample();
        let mut node = XmlNode::new("setting");
        setting.write_xml(&situation, &mut node).unwrap();
        let text = node.to_document().unwrap();
        let parsed = XmlNode::parse(&text).unwrap();
        assert_eq!(Setting::read_xml(&situation, &parsed).unwrap(), setting);
        assert_eq!(
            setting.invisible_entry("log").and_then(|e| e.root.as_deref()),
            Some("main")
        );
    }

    #[test]
    fn layout_file_in_both_encodings() {
        let situation = DockSituation::new();
        let file = LayoutFile {
            current: Some("work".into()),
            settings: BTreeMap::from([("work".to_string(), sample())]),
            live: sample(),
        };
        let bytes = file.to_bytes(&situation).unwrap();
        assert_eq!(LayoutFile::parse(&situation, &bytes).unwrap(), file);
        let text = file.to_xml_string(&situation).unwrap();
        assert_eq!(LayoutFile::parse(&situation, text.as_bytes()).unwrap(), file);
    }
}

//! Persisted mode state: the current mode of every dockable and the location
//! it had in each mode it left.

use std::collections::BTreeMap;

use crate::error::DockResult;
use crate::layout::io::{DataReader, DataWriter};
use crate::layout::xml::XmlNode;
use crate::model::{DockLocation, ExtendedMode};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeEntry {
    pub mode: ExtendedMode,
    pub history: BTreeMap<ExtendedMode, DockLocation>,
}

/// Mode entries keyed by persisted dockable id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSettings {
    pub entries: BTreeMap<String, ModeEntry>,
}

fn mode_index(mode: ExtendedMode) -> u8 {
    match mode {
        ExtendedMode::Normal => 0,
        ExtendedMode::Minimized => 1,
        ExtendedMode::Maximized => 2,
        ExtendedMode::Externalized => 3,
    }
}

fn mode_from_index(index: u8) -> DockResult<ExtendedMode> {
    ExtendedMode::ALL
        .get(usize::from(index))
        .copied()
        .ok_or_else(|| crate::DockError::format(format!("unknown mode index {index}")))
}

impl ModeSettings {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ModeEntry> {
        self.entries.get(id)
    }

    pub fn write(&self, out: &mut DataWriter) {
        out.write_len(self.entries.len());
        for (id, entry) in &self.entries {
            out.write_utf(id);
            out.write_u8(mode_index(entry.mode));
            out.write_len(entry.history.len());
            for (mode, location) in &entry.history {
                out.write_u8(mode_index(*mode));
                location.write(out);
            }
        }
    }

    pub fn read(input: &mut DataReader<'_>) -> DockResult<Self> {
        let mut entries = BTreeMap::new();
        for _ in 0..input.read_len()? {
            let id = input.read_utf()?;
            let mode = mode_from_index(input.read_u8()?)?;
            let mut history = BTreeMap::new();
            for _ in 0..input.read_len()? {
                let mode = mode_from_index(input.read_u8()?)?;
                history.insert(mode, DockLocation::read(input)?);
            }
            entries.insert(id, ModeEntry { mode, history });
        }
        Ok(Self { entries })
    }

    pub fn to_xml(&self) -> XmlNode {
        let mut modes = XmlNode::new("modes");
        for (id, entry) in &self.entries {
            let mut node = XmlNode::new("entry")
                .with_attr("id", id)
                .with_attr("mode", entry.mode);
            for (mode, location) in &entry.history {
                node.push(XmlNode::new("history").with_attr("mode", mode).with_child(location.to_xml()));
            }
            modes.push(node);
        }
        modes
    }

    pub fn from_xml(node: &XmlNode) -> DockResult<Self> {
        node.expect_name("modes")?;
        let mut entries = BTreeMap::new();
        for entry in node.children_named("entry") {
            let mut history = BTreeMap::new();
            for item in entry.children_named("history") {
                let location = DockLocation::from_xml(item.required_child("location")?)?;
                history.insert(item.parse_attr("mode")?, location);
            }
            entries.insert(
                entry.required("id")?.to_string(),
                ModeEntry {
                    mode: entry.parse_attr("mode")?,
                    history,
                },
            );
        }
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DockablePath, PathProperty};

    fn sample() -> ModeSettings {
        let mut history = BTreeMap::new();
        history.insert(
            ExtendedMode::Normal,
            DockLocation::new(
                "center",
                DockablePath::new(vec![PathProperty::Stack {
                    index: 1,
                    placeholder: None,
                }]),
            ),
        );
        let mut settings = ModeSettings::default();
        settings.entries.insert(
            "editor".into(),
            ModeEntry {
                mode: ExtendedMode::Minimized,
                history,
            },
        );
        settings
    }

    #[test]
    fn binary_and_xml_agree() {
        let settings = sample();
        let mut out = DataWriter::new();
        settings.write(&mut out);
        let bytes = out.into_inner();
        let mut input = DataReader::new(&bytes);
        assert_eq!(ModeSettings::read(&mut input).unwrap(), settings);
        assert!(input.is_at_end());

        let xml = settings.to_xml();
        assert_eq!(xml.children[0].attr("mode"), Some("minimized"));
        assert_eq!(ModeSettings::from_xml(&xml).unwrap(), settings);
    }

    #[test]
    fn unknown_mode_is_a_format_error() {
        let bytes = [0, 0, 0, 1, 0, 0, 0, 1, b'x', 9];
        assert!(ModeSettings::read(&mut DataReader::new(&bytes)).is_err());
    }
}

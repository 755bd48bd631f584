//! Tunables read from a JSON file.
//!
//! Every field is optional in the file; missing ones fall back to the crate
//! constants.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DRAG_THRESHOLD, DEFAULT_EDGE_SENSITIVITY};
use crate::error::DockResult;
use crate::layout::MissingStrategy;

/// Which group of dockables changes mode together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBehaviorKind {
    /// One maximized dockable at a time.
    #[default]
    Topmost,
    /// A tab takes its whole stack along.
    Stacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocatorConfig {
    /// Only floating (screen) targets are offered.
    pub screen_only: bool,
    /// No stacking; centre drops fall back to the nearest edge.
    pub no_combination: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Cells the pointer travels before a press turns into a drag.
    pub drag_threshold: u16,
    /// Percent of a leaf's extent that counts as its edge.
    pub edge_sensitivity: u16,
    pub group_behavior: GroupBehaviorKind,
    pub missing_strategy: MissingStrategy,
    /// Force every dockable back to normal before loading a layout.
    pub revert_to_basic_modes: bool,
    pub collapse_single_parents: bool,
    pub relocator: RelocatorConfig,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            edge_sensitivity: DEFAULT_EDGE_SENSITIVITY,
            group_behavior: GroupBehaviorKind::default(),
            missing_strategy: MissingStrategy::default(),
            revert_to_basic_modes: true,
            collapse_single_parents: true,
            relocator: RelocatorConfig::default(),
        }
    }
}

impl DockConfig {
    pub fn from_json_str(text: &str) -> DockResult<Self> {
        let mut config: DockConfig = serde_json::from_str(text)?;
        config.edge_sensitivity = config.edge_sensitivity.min(50);
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> DockResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> DockResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

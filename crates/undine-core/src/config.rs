//! The user-selected visibility configuration: which groups, devices and
//! subnets are shown, plus the per-diagram interaction settings that travel
//! with it (float mode, subnet weight, summarization).
//!
//! Serializes to the same camelCase document the UI exports and imports, with
//! id sets stored as sorted arrays.

use crate::model::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FloatMode {
    #[default]
    FloatAll,
    Float,
    Lock,
    LockAll,
}

impl FloatMode {
    /// Locking modes keep dragged elements pinned where they were dropped.
    pub fn is_locking(self) -> bool {
        self >= FloatMode::Lock
    }
}

impl From<FloatMode> for u8 {
    fn from(mode: FloatMode) -> u8 {
        match mode {
            FloatMode::FloatAll => 0,
            FloatMode::Float => 1,
            FloatMode::Lock => 2,
            FloatMode::LockAll => 3,
        }
    }
}

impl TryFrom<u8> for FloatMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FloatMode::FloatAll),
            1 => Ok(FloatMode::Float),
            2 => Ok(FloatMode::Lock),
            3 => Ok(FloatMode::LockAll),
            other => Err(format!("invalid float mode {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibilityConfig {
    /// When false the filter is inert and everything is visible.
    pub is_set: bool,
    pub groups: BTreeSet<String>,
    pub devices: BTreeSet<String>,
    pub subnets: BTreeSet<String>,
    pub subnet_summarization: bool,
    pub float_mode: FloatMode,
    /// 0-100 slider weight of the subnet-pull force; 0 disables it.
    pub subnet_weight: u32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            is_set: false,
            groups: BTreeSet::new(),
            devices: BTreeSet::new(),
            subnets: BTreeSet::new(),
            subnet_summarization: true,
            float_mode: FloatMode::FloatAll,
            subnet_weight: 0,
        }
    }
}

impl VisibilityConfig {
    pub fn is_node_visible(&self, node: &Node) -> bool {
        if node.is_cloud {
            self.subnets.contains(&node.id)
        } else {
            self.devices.contains(&node.id)
        }
    }

    /// True when every known id is selected, i.e. the filter adds nothing.
    pub fn selects_everything(&self, groups: usize, devices: usize, subnets: usize) -> bool {
        self.groups.len() == groups && self.devices.len() == devices && self.subnets.len() == subnets
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

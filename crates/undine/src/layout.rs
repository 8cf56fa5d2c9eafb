//! Layout persistence: pinned positions and group boxes per layer id, stored
//! under `diagrams.<id>.layout` as one document keyed by layer id.
//!
//! Saving is debounced on a logical millisecond clock supplied by the host
//! (`DiagramContext::advance`); restore merges pins into freshly processed
//! records by name, so stale entries for renamed nodes drop out naturally.

use crate::layers::Layer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredNode {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub fx: Option<f64>,
    #[serde(default)]
    pub fy: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGroup {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub fx: Option<f64>,
    #[serde(default)]
    pub fy: Option<f64>,
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredLayout {
    #[serde(default)]
    pub nodes: Vec<StoredNode>,
    #[serde(default)]
    pub groups: Vec<StoredGroup>,
}

/// All layouts for one diagram, keyed by layer id.
pub type LayoutDocument = BTreeMap<String, StoredLayout>;

pub fn snapshot(layer: &Layer) -> StoredLayout {
    StoredLayout {
        nodes: layer
            .nodes
            .iter()
            .map(|n| StoredNode {
                name: n.name.clone(),
                x: n.x,
                y: n.y,
                fx: n.fx,
                fy: n.fy,
            })
            .collect(),
        groups: layer
            .groups
            .iter()
            .map(|g| StoredGroup {
                name: g.id.clone(),
                x: g.x,
                y: g.y,
                width: g.width,
                height: g.height,
                fx: g.fx,
                fy: g.fy,
                nodes: layer
                    .nodes
                    .iter()
                    .filter(|n| n.group.as_deref() == Some(g.id.as_str()))
                    .map(|n| n.name.clone())
                    .collect(),
            })
            .collect(),
    }
}

/// Merges stored pins into the layer's records, matching by name.
pub fn restore(layer: &mut Layer, stored: &StoredLayout) {
    for stored_node in &stored.nodes {
        for node in layer
            .nodes
            .iter_mut()
            .filter(|n| n.name == stored_node.name)
        {
            node.fx = stored_node.fx;
            node.fy = stored_node.fy;
        }
    }
    for stored_group in &stored.groups {
        for group in layer
            .groups
            .iter_mut()
            .filter(|g| g.id == stored_group.name)
        {
            group.fx = stored_group.fx;
            group.fy = stored_group.fy;
        }
    }
}

/// Trailing-edge debounce over the host-supplied logical clock.
#[derive(Debug, Default)]
pub struct Debouncer {
    deadline: Option<u64>,
    wait_ms: u64,
}

impl Debouncer {
    pub fn new(wait_ms: u64) -> Self {
        Self {
            deadline: None,
            wait_ms,
        }
    }

    pub fn request(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms + self.wait_ms);
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once, when the deadline has passed.
    pub fn fire(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

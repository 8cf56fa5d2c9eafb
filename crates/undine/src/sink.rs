//! The rendering collaborator contract.
//!
//! The core pushes positioned records and lifecycle events out through this
//! trait; renderers feed nothing back except drag writes and navigation
//! requests, which arrive through [`crate::DiagramContext`] methods.

use crate::viewport::Transform;
use undine_core::{Edge, Group, Node};

pub trait RenderSink {
    /// Positions for the active layer, once per logical tick.
    fn frame(&mut self, _layer_id: &str, _nodes: &[Node], _edges: &[Edge], _groups: &[Group]) {}
    fn loading_started(&mut self, _layer_id: &str) {}
    fn loading_finished(&mut self, _layer_id: &str) {}
    /// Drill-down layers fade in above their parent after `delay_ms`.
    fn layer_faded(&mut self, _layer_id: &str, _visible: bool, _duration_ms: u64, _delay_ms: u64) {}
    fn focus_changed(&mut self, _transform: &Transform) {}
}

/// Discards everything; the default for headless runs.
#[derive(Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Frame { layer: String, nodes: usize, edges: usize, groups: usize },
    LoadingStarted { layer: String },
    LoadingFinished { layer: String },
    LayerFaded { layer: String, visible: bool },
    FocusChanged { transform: Transform },
}

/// Records every event; used by tests to assert lifecycle ordering.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RenderSink for RecordingSink {
    fn frame(&mut self, layer_id: &str, nodes: &[Node], edges: &[Edge], groups: &[Group]) {
        self.events.push(SinkEvent::Frame {
            layer: layer_id.to_string(),
            nodes: nodes.len(),
            edges: edges.len(),
            groups: groups.len(),
        });
    }

    fn loading_started(&mut self, layer_id: &str) {
        self.events.push(SinkEvent::LoadingStarted {
            layer: layer_id.to_string(),
        });
    }

    fn loading_finished(&mut self, layer_id: &str) {
        self.events.push(SinkEvent::LoadingFinished {
            layer: layer_id.to_string(),
        });
    }

    fn layer_faded(&mut self, layer_id: &str, visible: bool, _duration_ms: u64, _delay_ms: u64) {
        self.events.push(SinkEvent::LayerFaded {
            layer: layer_id.to_string(),
            visible,
        });
    }

    fn focus_changed(&mut self, transform: &Transform) {
        self.events.push(SinkEvent::FocusChanged {
            transform: *transform,
        });
    }
}

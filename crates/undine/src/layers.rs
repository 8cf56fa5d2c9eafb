//! The navigation layer stack.
//!
//! Each layer is an independent view: its own node/edge/group sets, its own
//! simulation pair and its own transform. The top of the stack is the
//! current layer and every diagram-level accessor resolves through
//! [`crate::DiagramContext::current_layer`]. Push and remove are validated
//! state transitions rather than a boolean guard, so racing operations fail
//! loudly instead of silently no-opping.

use crate::context::DiagramContext;
use crate::engine::LayoutEngine;
use crate::error::{Error, Result};
use crate::viewport::{self, Transform};
use futures::future::LocalBoxFuture;
use undine_core::{Edge, Group, GroupId, Node, RawGraph, Status, topology};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Pushed,
    Loading,
    Ready,
    Focused,
    Removing,
    Removed,
}

impl LayerState {
    /// The legal lifecycle: `Pushed → Loading → Ready ⇄ Focused → Removing →
    /// Removed`, plus the loading rollback.
    pub fn can_transition(self, to: LayerState) -> bool {
        use LayerState::*;
        matches!(
            (self, to),
            (Pushed, Loading)
                | (Loading, Ready)
                | (Loading, Removed)
                | (Ready, Focused)
                | (Focused, Ready)
                | (Ready, Removing)
                | (Focused, Removing)
                | (Removing, Removed)
        )
    }
}

pub struct Layer {
    /// Stable identity across the stack; layer ids (node names) can repeat.
    pub seq: u64,
    pub id: String,
    pub state: LayerState,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub groups: Vec<Group>,
    pub engine: Option<LayoutEngine>,
    pub transform: Transform,
    pub focused_group: Option<GroupId>,
    pub autocomplete: Vec<String>,
}

impl Layer {
    pub fn new(seq: u64, id: impl Into<String>) -> Self {
        Self {
            seq,
            id: id.into(),
            state: LayerState::Pushed,
            nodes: Vec::new(),
            edges: Vec::new(),
            groups: Vec::new(),
            engine: None,
            transform: Transform::default(),
            focused_group: None,
            autocomplete: Vec::new(),
        }
    }

    /// Finds a node by name or subnet CIDR (the search box accepts both).
    pub fn find_node(&self, value: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.name == value || n.subnet.as_deref() == Some(value))
    }

    /// Merges a status refresh into the live records: device status by id,
    /// link status by ip, with offline devices dragging their links down.
    pub fn merge_status(&mut self, refresh: &RawGraph) {
        let offline: Vec<&str> = refresh
            .devices
            .iter()
            .filter(|d| d.status == Status::CommFailure)
            .map(|d| d.name.as_str())
            .collect();

        for device in &refresh.devices {
            let id = device
                .dev_num
                .map(|n| n.to_string())
                .unwrap_or_else(|| device.name.clone());
            if let Some(node) = self
                .nodes
                .iter_mut()
                .find(|n| !n.is_cloud && (n.id == id || n.name == device.name))
            {
                node.status = device.status;
            }
        }

        for link in &refresh.links {
            let status = if offline.contains(&link.source.as_str()) {
                Status::CommFailure
            } else {
                link.status
            };
            if link.ip_address.is_none() {
                continue;
            }
            if let Some(edge) = self
                .edges
                .iter_mut()
                .find(|e| e.ip_address == link.ip_address)
            {
                if edge.status != status {
                    edge.status = status;
                }
            }
        }
    }
}

/// Provides the fetched graphs layers are built from. Futures are local:
/// execution is single-threaded and cooperative.
pub trait GraphSource {
    fn diagram(&self, id: &str) -> LocalBoxFuture<'static, std::result::Result<RawGraph, String>>;
    fn device(&self, name: &str)
    -> LocalBoxFuture<'static, std::result::Result<RawGraph, String>>;
    fn subnet(&self, id: &str) -> LocalBoxFuture<'static, std::result::Result<RawGraph, String>>;
}

#[derive(Debug, Clone, Copy)]
pub struct PushOptions {
    pub delay_ms: u64,
    pub fade_ms: u64,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            fade_ms: 1000,
        }
    }
}

impl DiagramContext {
    pub fn current_layer(&self) -> Option<&Layer> {
        self.layers.first()
    }

    pub fn current_layer_mut(&mut self) -> Option<&mut Layer> {
        self.layers.first_mut()
    }

    pub fn layer_by_seq(&self, seq: u64) -> Option<&Layer> {
        self.layers.iter().find(|l| l.seq == seq)
    }

    pub(crate) fn transition(&mut self, seq: u64, to: LayerState) -> Result<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.seq == seq)
            .ok_or_else(|| Error::StaleLayer(seq.to_string()))?;
        if !layer.state.can_transition(to) {
            return Err(Error::InvalidLayerTransition {
                id: layer.id.clone(),
                from: layer.state,
                to,
            });
        }
        layer.state = to;
        Ok(())
    }

    /// Allocates a layer, awaits its data, processes it and brings the
    /// simulations up. On fetch failure the allocation is rolled back and the
    /// loading indicator cleared before the error propagates.
    pub async fn push_layer(
        &mut self,
        id: &str,
        fetch: impl std::future::Future<Output = std::result::Result<RawGraph, String>>,
        opts: PushOptions,
    ) -> Result<u64> {
        let seq = self.next_layer_seq();
        let first = self.layers.is_empty();
        self.layers.insert(0, Layer::new(seq, id));
        self.transition(seq, LayerState::Loading)?;
        self.sink.loading_started(id);
        if !first {
            self.sink.layer_faded(id, true, opts.fade_ms, opts.delay_ms);
        }

        let graph = match fetch.await {
            Ok(graph) => graph,
            Err(err) => {
                self.layers.retain(|l| l.seq != seq);
                self.sink.loading_finished(id);
                tracing::warn!(layer = id, error = %err, "layer fetch failed; rolled back");
                return Err(Error::Fetch(err));
            }
        };

        // The stack may have changed across the await; a removed layer just
        // drops its result.
        if self.layer_by_seq(seq).is_none() {
            self.sink.loading_finished(id);
            tracing::debug!(layer = id, "layer removed while loading; dropping fetch result");
            return Err(Error::StaleLayer(id.to_string()));
        }

        let processed = topology::process(&graph, &self.config)?;
        if first {
            self.base = Some(topology::normalize(&graph)?);
        }

        let grouping = self.settings.grouping;
        let group_weight = self.group_weight;
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.seq == seq)
            .ok_or_else(|| Error::StaleLayer(id.to_string()))?;
        layer.nodes = processed.nodes;
        layer.edges = processed.edges;
        layer.groups = processed.groups;
        layer.autocomplete = processed.autocomplete;
        layer.engine = Some(LayoutEngine::standard(
            &mut layer.nodes,
            &layer.edges,
            &mut layer.groups,
            grouping,
            group_weight,
        ));
        self.transition(seq, LayerState::Ready)?;
        self.sink.loading_finished(id);
        Ok(seq)
    }

    /// Pushes a layer seeded from already-extracted records (summarized and
    /// trunked sub-views) instead of a fetch.
    pub fn push_extracted_layer(
        &mut self,
        id: &str,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        trunked: bool,
    ) -> Result<u64> {
        let seq = self.next_layer_seq();
        self.layers.insert(0, Layer::new(seq, id));
        self.transition(seq, LayerState::Loading)?;
        self.sink.loading_started(id);

        let group_weight = self.group_weight;
        let grouping = self.settings.grouping;
        let layer = self
            .layers
            .first_mut()
            .ok_or_else(|| Error::StaleLayer(id.to_string()))?;
        layer.nodes = nodes;
        layer.edges = edges;
        layer.engine = Some(if trunked {
            LayoutEngine::trunked(
                &mut layer.nodes,
                &layer.edges,
                &mut layer.groups,
                group_weight,
            )
        } else {
            LayoutEngine::standard(
                &mut layer.nodes,
                &layer.edges,
                &mut layer.groups,
                grouping,
                group_weight,
            )
        });
        self.transition(seq, LayerState::Ready)?;
        self.sink.loading_finished(id);
        Ok(seq)
    }

    /// Validated removal; a layer that is still loading cannot be removed.
    pub fn remove_layer(&mut self, seq: u64) -> Result<()> {
        self.transition(seq, LayerState::Removing)?;
        if let Some(layer) = self.layers.iter_mut().find(|l| l.seq == seq) {
            if let Some(engine) = &mut layer.engine {
                engine.stop();
            }
            let id = layer.id.clone();
            self.sink.layer_faded(&id, false, 0, 0);
        }
        self.transition(seq, LayerState::Removed)?;
        self.layers.retain(|l| l.seq != seq);
        Ok(())
    }

    /// Double-click navigation: fetches the node's local neighborhood,
    /// pushes a scoped layer, settles or restores its layout and focuses the
    /// new content. Returns the new layer's seq, or `None` when the layer
    /// was removed before the focus step (fast double-navigation); that case
    /// is dropped, not an error.
    pub async fn drill_down(
        &mut self,
        node_name: &str,
        source: &dyn GraphSource,
    ) -> Result<Option<u64>> {
        let layer = self.current_layer().ok_or(Error::NoLayer)?;
        let node = layer
            .find_node(node_name)
            .ok_or_else(|| Error::UnknownNode(node_name.to_string()))?
            .clone();

        let seq = if node.is_cloud {
            let fetch = source.subnet(&node.id);
            self.push_layer(
                &node.name,
                fetch,
                PushOptions {
                    delay_ms: 0,
                    fade_ms: 0,
                },
            )
            .await?
        } else {
            // The seed device must appear in its own neighborhood even when
            // the backend omits it.
            let fetch = source.device(&node.name);
            let seed = node.clone();
            let fetch = async move {
                let mut graph = fetch.await?;
                if !graph.devices.iter().any(|d| d.name == seed.name) {
                    graph.devices.insert(0, seed_device(&seed));
                }
                Ok(graph)
            };
            self.push_layer(
                &node.name,
                fetch,
                PushOptions {
                    delay_ms: 0,
                    fade_ms: 500,
                },
            )
            .await?
        };

        self.restore_layout_for(seq);
        self.settle_layer(seq);
        Ok(self.complete_drill_down(seq)?.map(|_| seq))
    }

    /// Runs the layer's simulations until they settle (bounded by the
    /// configured tick budget); the restored layout's pins hold positions.
    pub fn settle_layer(&mut self, seq: u64) {
        let ctx = self.tick_context();
        let max_ticks = self.settings.settle_ticks;
        if let Some(layer) = self.layers.iter_mut().find(|l| l.seq == seq) {
            if let Some(engine) = &mut layer.engine {
                engine.settle(&mut layer.nodes, &mut layer.groups, &ctx, max_ticks);
            }
        }
    }

    /// The deferred focus step of a drill-down. The target layer is captured
    /// by seq at schedule time; if it has been removed since, the step is
    /// dropped with a debug log rather than acting on a stale view.
    pub fn complete_drill_down(&mut self, seq: u64) -> Result<Option<Transform>> {
        let (view_width, view_height) =
            (self.settings.view_width, self.settings.view_height);
        let padding = self.settings.group_padding;
        let Some(layer) = self.layers.iter_mut().find(|l| l.seq == seq) else {
            tracing::debug!(seq, "drill-down target removed before focus; dropping");
            return Ok(None);
        };
        let members: Vec<&Node> = layer.nodes.iter().collect();
        let Some(area) = undine_core::grouping::from_nodes(&members, padding) else {
            return Ok(None);
        };
        let transform = viewport::focus_on_area(&area, view_width, view_height);
        layer.transform = transform;
        self.sink.focus_changed(&transform);
        Ok(Some(transform))
    }

    /// Search entry point: centers the viewport on the named node.
    pub fn find_and_focus(&mut self, value: &str) -> Option<Transform> {
        let (view_width, view_height) =
            (self.settings.view_width, self.settings.view_height);
        let layer = self.current_layer_mut()?;
        let node = layer.find_node(value)?;
        let transform = viewport::focus_on_node(node, 1.0, view_width, view_height);
        layer.transform = transform;
        if let Some(engine) = &mut layer.engine {
            engine.stop();
        }
        self.sink.focus_changed(&transform);
        Some(transform)
    }
}

fn seed_device(node: &Node) -> undine_core::model::RawDevice {
    undine_core::model::RawDevice {
        name: node.name.clone(),
        group: node.group.clone().map(undine_core::model::GroupRef::Path),
        status: node.status,
        dev_num: node.id.parse::<i64>().ok(),
    }
}

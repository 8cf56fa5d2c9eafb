//! The diagram controller: one explicit context owning the layer stack, the
//! settings and visibility config, the persistence handles and the
//! interaction state. Every operation takes `&mut DiagramContext`; there is
//! no module-level mutable state anywhere in the engine.

use crate::drill;
use crate::engine::TickContext;
use crate::error::{Error, Result};
use crate::layers::{GraphSource, Layer, LayerState, PushOptions};
use crate::layout::{self, Debouncer, LayoutDocument};
use crate::sink::RenderSink;
use crate::store::{self, Store};
use crate::viewport::{self, Transform};
use undine_core::grouping;
use undine_core::topology::Processed;
use undine_core::{FloatMode, Group, GroupId, Node, VisibilityConfig};

#[derive(Debug, Clone)]
pub struct Settings {
    pub grouping: bool,
    /// Padding between member bounds and the group box, and between groups
    /// that the simulation tries to maintain.
    pub group_padding: f64,
    pub group_border_width: f64,
    pub zoom_in_mult: f64,
    pub zoom_out_mult: f64,
    pub max_zoom_in: f64,
    pub max_zoom_out: f64,
    pub view_width: f64,
    pub view_height: f64,
    /// Tick budget when settling a freshly pushed layer.
    pub settle_ticks: usize,
    /// Diagram ids whose persisted state survives the startup purge.
    pub configs: Option<Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grouping: true,
            group_padding: 95.0,
            group_border_width: 10.0,
            zoom_in_mult: 1.25,
            zoom_out_mult: 0.8,
            max_zoom_in: 8.0,
            max_zoom_out: 0.1,
            view_width: 1920.0,
            view_height: 1080.0,
            settle_ticks: 300,
            configs: None,
        }
    }
}

pub(crate) struct DragState {
    start: (f64, f64),
    /// Interior of the focused group, when dragging inside one.
    bounds: Option<(f64, f64, f64, f64)>,
    /// Groups that were already pinned when the drag started.
    fixed: Vec<GroupId>,
}

pub struct DiagramContext {
    pub id: String,
    pub settings: Settings,
    pub config: VisibilityConfig,
    /// Live slider value; committed into `config` on release.
    pub subnet_weight: u32,
    /// Global weight of the group positioning force.
    pub group_weight: f64,
    pub layers: Vec<Layer>,
    /// Focused-group history, persisted per diagram id.
    pub opened_groups: Vec<GroupId>,
    /// Normalized pre-summarization data of the root layer, for drill-down
    /// extraction.
    pub(crate) base: Option<Processed>,
    pub(crate) sink: Box<dyn RenderSink>,
    store: Box<dyn Store>,
    seq: u64,
    now_ms: u64,
    layout_saver: Debouncer,
    transform_saver: Debouncer,
    pending_transform: Option<Transform>,
    pub(crate) drag: Option<DragState>,
}

impl DiagramContext {
    pub fn new(
        id: impl Into<String>,
        settings: Settings,
        store: Box<dyn Store>,
        sink: Box<dyn RenderSink>,
    ) -> Self {
        let mut ctx = Self {
            id: id.into(),
            settings,
            config: VisibilityConfig::default(),
            subnet_weight: 0,
            group_weight: 1.0,
            layers: Vec::new(),
            opened_groups: Vec::new(),
            base: None,
            sink,
            store,
            seq: 0,
            now_ms: 0,
            layout_saver: Debouncer::new(1000),
            transform_saver: Debouncer::new(1000),
            pending_transform: None,
            drag: None,
        };
        ctx.init_from_store();
        ctx
    }

    fn init_from_store(&mut self) {
        if let Some(keep) = self.settings.configs.clone() {
            store::purge(&mut *self.store, &keep);
        }
        if let Some(config) = store::get_parsed::<VisibilityConfig>(&*self.store, &self.id, "config")
        {
            self.config = config;
        }
        if let Some(raw) = self.store.get(&store::diagram_key(&self.id, "grouping")) {
            self.settings.grouping = raw != "false";
        }
        self.subnet_weight = self.config.subnet_weight;
        self.opened_groups =
            store::get_parsed(&*self.store, &self.id, "opened").unwrap_or_default();
    }

    pub(crate) fn next_layer_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub(crate) fn tick_context(&self) -> TickContext {
        TickContext {
            grouping: self.settings.grouping,
            group_padding: self.settings.group_padding,
            focused_group: self.current_layer().and_then(|l| l.focused_group.clone()),
            subnet_weight: self.subnet_weight,
        }
    }

    /// Boots the diagram: pushes the root layer, then restores the persisted
    /// layout, transform and opened-group focus.
    pub async fn start(&mut self, source: &dyn GraphSource) -> Result<u64> {
        let fetch = source.diagram(&self.id);
        let seq = self.push_layer("main", fetch, PushOptions::default()).await?;
        self.restore_layout_for(seq);
        self.restore_transform();
        if let Some(top) = self.opened_groups.last().cloned() {
            // Best effort: the group may be filtered out of this session.
            if self.focus_group(&top).is_err() {
                self.opened_groups.clear();
                self.persist_opened();
            }
        }
        Ok(seq)
    }

    /// Tears down the current root view and rebuilds it (config changes).
    pub async fn refresh(&mut self, source: &dyn GraphSource) -> Result<u64> {
        if let Some(layer) = self.current_layer() {
            let seq = layer.seq;
            self.remove_layer(seq)?;
        }
        let fetch = source.diagram(&self.id);
        let seq = self.push_layer("main", fetch, PushOptions::default()).await?;
        self.restore_layout_for(seq);
        self.restore_transform();
        Ok(seq)
    }

    /// One logical frame: advance the current layer's simulations and push
    /// positions to the render sink. Saves the layout when the simulations
    /// come to rest.
    pub fn tick(&mut self) {
        let ctx = self.tick_context();
        let mut settled_now = false;
        {
            let Some(layer) = self.layers.first_mut() else {
                return;
            };
            if !matches!(layer.state, LayerState::Ready | LayerState::Focused) {
                return;
            }
            if let Some(engine) = &mut layer.engine {
                engine.tick(&mut layer.nodes, &mut layer.groups, &ctx);
                settled_now = engine.just_settled();
            }
            self.sink
                .frame(&layer.id, &layer.nodes, &layer.edges, &layer.groups);
        }
        if settled_now {
            self.request_layout_save();
        }
    }

    /// Advances the logical clock and flushes debounced persistence.
    pub fn advance(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        if self.layout_saver.fire(now_ms) {
            self.flush_layout_save();
        }
        if self.transform_saver.fire(now_ms) {
            self.flush_transform_save();
        }
    }

    // ----- layout persistence -----

    pub fn request_layout_save(&mut self) {
        let now = self.now_ms;
        self.layout_saver.request(now);
    }

    fn flush_layout_save(&mut self) {
        let Some(layer) = self.current_layer() else {
            return;
        };
        let snapshot = layout::snapshot(layer);
        let layer_id = layer.id.clone();
        let mut doc: LayoutDocument =
            store::get_parsed(&*self.store, &self.id, "layout").unwrap_or_default();
        doc.insert(layer_id, snapshot);
        store::set_serialized(&mut *self.store, &self.id, "layout", &doc);
    }

    pub fn restore_layout(&mut self) {
        if let Some(seq) = self.current_layer().map(|l| l.seq) {
            self.restore_layout_for(seq);
        }
    }

    pub(crate) fn restore_layout_for(&mut self, seq: u64) {
        let Some(doc) = store::get_parsed::<LayoutDocument>(&*self.store, &self.id, "layout")
        else {
            return;
        };
        if let Some(layer) = self.layers.iter_mut().find(|l| l.seq == seq) {
            if let Some(stored) = doc.get(&layer.id) {
                layout::restore(layer, stored);
            }
        }
    }

    // ----- transform persistence -----

    /// Restores the saved transform, or fits the content extent when none is
    /// saved.
    pub fn restore_transform(&mut self) {
        let stored: Option<Transform> = store::get_parsed(&*self.store, &self.id, "transform");
        let (vw, vh) = (self.settings.view_width, self.settings.view_height);
        let (min_k, max_k) = (self.settings.max_zoom_out, self.settings.max_zoom_in);
        let Some(layer) = self.layers.first_mut() else {
            return;
        };
        layer.transform =
            stored.unwrap_or_else(|| viewport::fit_to_content(&layer.nodes, vw, vh, min_k, max_k));
    }

    /// Pan/zoom write-back from the renderer. Only the root layer's
    /// transform is persisted.
    pub fn set_transform(&mut self, transform: Transform) {
        let root = self.layers.len() == 1;
        let now = self.now_ms;
        let Some(layer) = self.layers.first_mut() else {
            return;
        };
        layer.transform = transform;
        if root {
            self.pending_transform = Some(transform);
            self.transform_saver.request(now);
        }
    }

    fn flush_transform_save(&mut self) {
        if let Some(transform) = self.pending_transform.take() {
            store::set_serialized(&mut *self.store, &self.id, "transform", &transform);
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(self.settings.zoom_in_mult);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(self.settings.zoom_out_mult);
    }

    fn zoom_by(&mut self, factor: f64) {
        let (vw, vh) = (self.settings.view_width, self.settings.view_height);
        let (min_k, max_k) = (self.settings.max_zoom_out, self.settings.max_zoom_in);
        let Some(layer) = self.layers.first() else {
            return;
        };
        // Zoom is suspended while a group is focused.
        if layer.focused_group.is_some() {
            return;
        }
        let next = viewport::scale_by(layer.transform, factor, vw, vh, min_k, max_k);
        self.set_transform(next);
    }

    // ----- config persistence -----

    /// Persists the visibility config, or removes the stored entry when the
    /// selection covers everything (a full selection adds no information).
    pub fn save_config(&mut self) {
        let totals = self.base.as_ref().map(|b| {
            (
                b.groups.len(),
                b.nodes.iter().filter(|n| !n.is_cloud).count(),
                b.nodes.iter().filter(|n| n.is_cloud).count(),
            )
        });
        if let Some((groups, devices, subnets)) = totals {
            if self.config.selects_everything(groups, devices, subnets) {
                let key = store::diagram_key(&self.id, "config");
                self.store.remove(&key);
                return;
            }
        }
        store::set_serialized(&mut *self.store, &self.id, "config", &self.config);
    }

    pub fn apply_config(&mut self, config: VisibilityConfig) {
        self.subnet_weight = config.subnet_weight;
        self.config = config;
        self.save_config();
    }

    pub fn reset_config(&mut self) {
        self.config = VisibilityConfig::default();
        self.subnet_weight = 0;
        self.save_config();
    }

    pub fn export_config(&self) -> Result<String> {
        Ok(self.config.to_json()?)
    }

    pub fn import_config(&mut self, json: &str) -> Result<()> {
        let config = VisibilityConfig::from_json(json)?;
        self.apply_config(config);
        Ok(())
    }

    /// Clears all persisted state for this diagram id.
    pub fn reset(&mut self) {
        for path in ["layout", "transform", "opened"] {
            let key = store::diagram_key(&self.id, path);
            self.store.remove(&key);
        }
        self.opened_groups.clear();
    }

    // ----- grouping / float mode / subnet weight -----

    /// Flips grouping on or off: stashes positions and alphas so flipping
    /// back resumes the other mode where it left off, retunes the forces and
    /// restarts the simulations.
    pub fn toggle_grouping(&mut self) {
        let has_groups = self
            .current_layer()
            .map(|l| !l.groups.is_empty())
            .unwrap_or(false);
        if !has_groups {
            return;
        }
        self.settings.grouping = !self.settings.grouping;
        let grouping = self.settings.grouping;

        if let Some(layer) = self.layers.first_mut() {
            for node in &mut layer.nodes {
                let stash = (node.px, node.py);
                node.px = Some(node.x);
                node.py = Some(node.y);
                if let (Some(px), Some(py)) = stash {
                    node.x = px;
                    node.y = py;
                }
            }
            if let Some(engine) = &mut layer.engine {
                engine.swap_alpha_stash();
                engine.retune(&layer.nodes, &layer.edges, grouping && !layer.groups.is_empty());
                if grouping {
                    if let Some(groups_sim) = &mut engine.groups_sim {
                        groups_sim.reheat(0.0);
                    }
                }
                engine.nodes_sim.reheat(0.0);
            }
        }

        let key = store::diagram_key(&self.id, "grouping");
        self.store.set(&key, if grouping { "true" } else { "false" });
    }

    /// Float-mode changes apply immediately to the current layer: `FloatAll`
    /// releases every pin, `LockAll` pins everything in place, and the two
    /// middle modes only change how future drags release.
    pub fn set_float_mode(&mut self, mode: FloatMode) {
        self.config.float_mode = mode;
        if let Some(layer) = self.layers.first_mut() {
            match mode {
                FloatMode::FloatAll => {
                    for node in &mut layer.nodes {
                        node.fx = None;
                        node.fy = None;
                    }
                    for group in &mut layer.groups {
                        group.fx = None;
                        group.fy = None;
                    }
                }
                FloatMode::LockAll => {
                    for node in &mut layer.nodes {
                        node.fx = Some(node.x);
                        node.fy = Some(node.y);
                    }
                    for group in &mut layer.groups {
                        group.fx = Some(group.x);
                        group.fy = Some(group.y);
                    }
                }
                FloatMode::Float | FloatMode::Lock => {}
            }
        }
        self.request_layout_save();
        self.save_config();
    }

    /// Live slider movement keeps the simulations hot so the pull is visible.
    pub fn preview_subnet_weight(&mut self, weight: u32) {
        self.subnet_weight = weight.min(100);
        if let Some(layer) = self.layers.first_mut() {
            if let Some(engine) = &mut layer.engine {
                engine.reheat(0.7);
            }
        }
    }

    /// Slider release: wind the simulations down, save the layout and commit
    /// the weight into the persisted config.
    pub fn commit_subnet_weight(&mut self) {
        if let Some(layer) = self.layers.first_mut() {
            if let Some(engine) = &mut layer.engine {
                engine.cool();
            }
        }
        self.request_layout_save();
        self.config.subnet_weight = self.subnet_weight;
        self.save_config();
    }

    // ----- group focus -----

    pub fn focus_group(&mut self, id: &str) -> Result<Transform> {
        self.unfocus_group(None);
        let (vw, vh) = (self.settings.view_width, self.settings.view_height);
        let layer = self.layers.first_mut().ok_or(Error::NoLayer)?;
        let group = layer
            .groups
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::UnknownGroup(id.to_string()))?;
        let transform = viewport::focus_on_area(group, vw, vh);
        layer.focused_group = Some(id.to_string());
        if layer.state == LayerState::Ready {
            layer.state = LayerState::Focused;
        }
        layer.transform = transform;
        if self.opened_groups.last().map(String::as_str) != Some(id) {
            self.opened_groups.push(id.to_string());
        }
        self.persist_opened();
        self.sink.focus_changed(&transform);
        Ok(transform)
    }

    pub fn unfocus_group(&mut self, target_zoom: Option<f64>) {
        let (vw, vh) = (self.settings.view_width, self.settings.view_height);
        let (min_k, max_k) = (self.settings.max_zoom_out, self.settings.max_zoom_in);
        let Some(layer) = self.layers.first_mut() else {
            return;
        };
        let Some(focused) = layer.focused_group.take() else {
            return;
        };
        if let Some(group) = layer.groups.iter_mut().find(|g| g.id == focused) {
            group.locked = false;
        }
        if layer.state == LayerState::Focused {
            layer.state = LayerState::Ready;
        }
        if let Some(k) = target_zoom {
            let factor = k / layer.transform.k.max(f64::EPSILON);
            layer.transform = viewport::scale_by(layer.transform, factor, vw, vh, min_k, max_k);
        }
        self.opened_groups.pop();
        self.persist_opened();
    }

    fn persist_opened(&mut self) {
        store::set_serialized(&mut *self.store, &self.id, "opened", &self.opened_groups);
    }

    // ----- drags -----

    pub fn node_drag_start(&mut self, name: &str, x: f64, y: f64) -> Result<()> {
        let padding = self.settings.group_padding;
        let focused = self.current_layer().and_then(|l| l.focused_group.clone());
        let layer = self.layers.first_mut().ok_or(Error::NoLayer)?;
        if let Some(engine) = &mut layer.engine {
            engine.reheat(0.7);
        }
        let node = layer
            .nodes
            .iter_mut()
            .find(|n| n.name == name)
            .ok_or_else(|| Error::UnknownNode(name.to_string()))?;
        node.fx = Some(node.x);
        node.fy = Some(node.y);
        let node_group = node.group.clone();

        // Dragging inside a focused group keeps the node within its interior
        // and locks the group box for the duration.
        let bounds = focused.as_ref().and_then(|f| {
            let group = layer.groups.iter_mut().find(|g| g.id == *f)?;
            group.locked = true;
            Some((
                group.x + padding,
                group.x + group.width - padding,
                group.y + padding,
                group.y + group.height - padding,
            ))
        });
        let fixed = grouping::fixed_groups(
            &layer.groups,
            &layer.nodes,
            focused.as_ref(),
            node_group.as_ref(),
        );
        self.drag = Some(DragState {
            start: (x, y),
            bounds,
            fixed,
        });
        Ok(())
    }

    pub fn node_drag_move(&mut self, name: &str, x: f64, y: f64) -> Result<()> {
        let bounds = self.drag.as_ref().and_then(|d| d.bounds);
        let layer = self.layers.first_mut().ok_or(Error::NoLayer)?;
        let node = layer
            .nodes
            .iter_mut()
            .find(|n| n.name == name)
            .ok_or_else(|| Error::UnknownNode(name.to_string()))?;
        if bounds.map(|(x0, x1, _, _)| x > x0 && x < x1).unwrap_or(true) {
            node.fx = Some(x);
        }
        if bounds.map(|(_, _, y0, y1)| y > y0 && y < y1).unwrap_or(true) {
            node.fy = Some(y);
        }
        Ok(())
    }

    /// Drop: in a float mode the node releases back to the simulation unless
    /// releasing its group would overlap another pinned group, in which case
    /// the pin is kept.
    pub fn node_drag_end(&mut self, name: &str) -> Result<()> {
        let padding = self.settings.group_padding;
        let border = self.settings.group_border_width;
        let locking = self.config.float_mode.is_locking();
        let focused = self.current_layer().and_then(|l| l.focused_group.clone());
        let fixed = self.drag.take().map(|d| d.fixed).unwrap_or_default();

        let layer = self.layers.first_mut().ok_or(Error::NoLayer)?;
        if let Some(engine) = &mut layer.engine {
            engine.cool();
        }
        grouping::update(
            &mut layer.groups,
            &mut layer.nodes,
            padding,
            focused.as_ref(),
        );

        let node_group = layer
            .nodes
            .iter()
            .find(|n| n.name == name)
            .ok_or_else(|| Error::UnknownNode(name.to_string()))?
            .group
            .clone();
        let overlap = overlaps_fixed(&layer.groups, &fixed, node_group.as_deref(), border);
        if !locking && !overlap {
            if let Some(node) = layer.nodes.iter_mut().find(|n| n.name == name) {
                node.fx = None;
                node.fy = None;
            }
        }
        self.request_layout_save();
        Ok(())
    }

    pub fn group_drag_start(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        let focused = self.current_layer().and_then(|l| l.focused_group.clone());
        if focused.as_deref() == Some(id) {
            return Ok(());
        }
        let layer = self.layers.first_mut().ok_or(Error::NoLayer)?;
        if let Some(engine) = &mut layer.engine {
            engine.reheat(0.7);
        }
        let members = member_names(&layer.groups, &layer.nodes, id);
        let group = layer
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::UnknownGroup(id.to_string()))?;
        group.sx = group.x;
        group.sy = group.y;
        for node in layer
            .nodes
            .iter_mut()
            .filter(|n| members.contains(&n.name))
        {
            node.sx = node.x;
            node.sy = node.y;
            node.fx = Some(node.x);
            node.fy = Some(node.y);
        }
        let fixed = grouping::fixed_groups(
            &layer.groups,
            &layer.nodes,
            focused.as_ref(),
            Some(&id.to_string()),
        );
        self.drag = Some(DragState {
            start: (x, y),
            bounds: None,
            fixed,
        });
        Ok(())
    }

    pub fn group_drag_move(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        let focused = self.current_layer().and_then(|l| l.focused_group.clone());
        if focused.as_deref() == Some(id) {
            return Ok(());
        }
        let Some((sx, sy)) = self.drag.as_ref().map(|d| d.start) else {
            return Ok(());
        };
        let (dx, dy) = (x - sx, y - sy);
        let layer = self.layers.first_mut().ok_or(Error::NoLayer)?;
        let members = member_names(&layer.groups, &layer.nodes, id);
        for node in layer
            .nodes
            .iter_mut()
            .filter(|n| members.contains(&n.name))
        {
            node.fx = Some(node.sx + dx);
            node.fy = Some(node.sy + dy);
        }
        let group = layer
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::UnknownGroup(id.to_string()))?;
        group.fx = Some(group.sx + dx);
        group.fy = Some(group.sy + dy);
        Ok(())
    }

    /// Drop for groups: the same keep-the-pin-on-overlap rule, applied to the
    /// group, its members and (for parents) its child groups.
    pub fn group_drag_end(&mut self, id: &str) -> Result<()> {
        let padding = self.settings.group_padding;
        let border = self.settings.group_border_width;
        let locking = self.config.float_mode.is_locking();
        let focused = self.current_layer().and_then(|l| l.focused_group.clone());
        let fixed = self.drag.take().map(|d| d.fixed).unwrap_or_default();

        let layer = self.layers.first_mut().ok_or(Error::NoLayer)?;
        if let Some(engine) = &mut layer.engine {
            engine.cool();
        }
        grouping::update(
            &mut layer.groups,
            &mut layer.nodes,
            padding,
            focused.as_ref(),
        );

        let overlap = overlaps_fixed(&layer.groups, &fixed, Some(id), border);
        if !locking && !overlap {
            let children: Vec<GroupId> = layer
                .groups
                .iter()
                .filter(|g| g.parent.as_deref() == Some(id))
                .map(|g| g.id.clone())
                .collect();
            for group in layer
                .groups
                .iter_mut()
                .filter(|g| g.id == id || children.contains(&g.id))
            {
                group.fx = None;
                group.fy = None;
            }
            for node in layer.nodes.iter_mut().filter(|n| {
                n.group.as_deref() == Some(id)
                    || n.group.as_ref().is_some_and(|g| children.contains(g))
            }) {
                node.fx = None;
                node.fy = None;
            }
        }
        self.request_layout_save();
        Ok(())
    }

    // ----- synthetic drill-downs -----

    /// Opens the sub-view behind a summarized cloud: the device and its
    /// folded leaf subnets, re-expanded from the base data.
    pub fn drill_summarized(&mut self, device_name: &str) -> Result<u64> {
        let base = self.base.as_ref().ok_or(Error::NoLayer)?;
        let (nodes, edges) = drill::summarized_neighborhood(base, device_name)
            .ok_or_else(|| Error::UnknownNode(device_name.to_string()))?;
        let id = format!("summarized-{device_name}");
        let seq = self.push_extracted_layer(&id, nodes, edges, false)?;
        self.settle_layer(seq);
        self.complete_drill_down(seq)?;
        Ok(seq)
    }

    /// Opens the sub-view behind a trunk edge: both devices and every subnet
    /// folded into the trunk, laid out in bands.
    pub fn drill_trunk(&mut self, source_name: &str, target_name: &str) -> Result<u64> {
        let base = self.base.as_ref().ok_or(Error::NoLayer)?;
        let (nodes, edges) = drill::trunked_neighborhood(base, source_name, target_name)
            .ok_or_else(|| Error::UnknownNode(source_name.to_string()))?;
        let id = format!("subnets-{source_name}:{target_name}");
        let seq = self.push_extracted_layer(&id, nodes, edges, true)?;
        self.settle_layer(seq);
        self.complete_drill_down(seq)?;
        Ok(seq)
    }
}

/// Names of a group's members including members of its direct children
/// (dragging a parent moves the whole subtree).
fn member_names(groups: &[Group], nodes: &[Node], id: &str) -> Vec<String> {
    let children: Vec<&str> = groups
        .iter()
        .filter(|g| g.parent.as_deref() == Some(id))
        .map(|g| g.id.as_str())
        .collect();
    nodes
        .iter()
        .filter(|n| {
            n.group.as_deref() == Some(id)
                || n.group.as_deref().is_some_and(|g| children.contains(&g))
        })
        .map(|n| n.name.clone())
        .collect()
}

/// Whether releasing `group_id` here would overlap one of the groups that
/// were pinned when the drag began.
fn overlaps_fixed(
    groups: &[Group],
    fixed: &[GroupId],
    group_id: Option<&str>,
    border_width: f64,
) -> bool {
    let Some(group_id) = group_id else {
        return false;
    };
    let Some(group) = groups.iter().find(|g| g.id == group_id) else {
        return false;
    };
    fixed
        .iter()
        .filter_map(|id| groups.iter().find(|g| g.id == *id))
        .any(|fg| grouping::intersects(fg, group, border_width))
}

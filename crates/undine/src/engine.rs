//! The per-layer layout engine: the node-level and group-level simulations,
//! their force wiring, and the coupled tick that keeps group geometry and
//! containment in sync with node motion.

use crate::forces::{Cluster, RectCollide, SubnetPull};
use rustc_hash::FxHashMap;
use selkie::{Collide, Link, LinkForce, ManyBody, PositionX, PositionY, Simulation};
use undine_core::{Edge, Group, GroupId, Node, grouping};

/// Scalar inputs the engine needs each tick; owned copies so the caller can
/// keep mutable borrows of the layer's arrays.
#[derive(Debug, Clone)]
pub struct TickContext {
    pub grouping: bool,
    pub group_padding: f64,
    pub focused_group: Option<GroupId>,
    pub subnet_weight: u32,
}

pub struct LayoutEngine {
    pub nodes_sim: Simulation<Node>,
    pub groups_sim: Option<Simulation<Group>>,
    rect_collide: RectCollide,
    /// Alpha stash swapped by the grouping toggle.
    stashed_alphas: Option<(f64, f64)>,
    was_settled: bool,
}

/// Trunk-sub-layer band targets: subnets center, one device per side.
fn band_x(display_group: u8) -> f64 {
    match display_group {
        1 => -500.0,
        2 => 500.0,
        _ => 0.0,
    }
}

fn link_strength(
    grouped: bool,
    source_group: Option<&GroupId>,
    target_group: Option<&GroupId>,
) -> f64 {
    if !grouped {
        1.0
    } else if source_group == target_group {
        0.1
    } else {
        0.009
    }
}

fn standard_links(edges: &[Edge], nodes: &[Node], grouped: bool) -> Vec<Link> {
    let group_of: FxHashMap<&str, Option<&GroupId>> = nodes
        .iter()
        .map(|n| (n.name.as_str(), n.group.as_ref()))
        .collect();
    edges
        .iter()
        .map(|e| {
            let source_group = group_of.get(e.source.as_str()).copied().flatten();
            let target_group = group_of.get(e.target.as_str()).copied().flatten();
            let link = Link::new(e.source.clone(), e.target.clone())
                .strength(link_strength(grouped, source_group, target_group));
            // Trunk edges keep their folded spokes' span at a fixed distance.
            if e.is_trunked {
                link.distance(450.0)
            } else {
                link
            }
        })
        .collect()
}

/// Per-group member counts drive the group positioning strength (heavier
/// groups move less); parents count their child groups' members too.
fn assign_node_counts(groups: &mut [Group], nodes: &[Node]) {
    let counts: Vec<usize> = groups
        .iter()
        .map(|group| {
            let mut count = nodes
                .iter()
                .filter(|n| n.group.as_deref() == Some(group.id.as_str()))
                .count();
            if group.has_child_group {
                let children: Vec<&str> = groups
                    .iter()
                    .filter(|g| g.parent.as_deref() == Some(group.id.as_str()))
                    .map(|g| g.id.as_str())
                    .collect();
                count += nodes
                    .iter()
                    .filter(|n| n.group.as_deref().is_some_and(|g| children.contains(&g)))
                    .count();
            }
            count
        })
        .collect();
    for (group, count) in groups.iter_mut().zip(counts) {
        group.node_count = count;
    }
}

impl LayoutEngine {
    /// The standard diagram simulation pair.
    pub fn standard(
        nodes: &mut [Node],
        edges: &[Edge],
        groups: &mut [Group],
        grouping: bool,
        group_weight: f64,
    ) -> Self {
        let grouped = grouping && !groups.is_empty();

        let mut sim: Simulation<Node> = Simulation::new();
        sim.set_force("x", PositionX::new().strength(0.1));
        sim.set_force("y", PositionY::new().strength(0.1));
        sim.set_force(
            "link",
            LinkForce::new(standard_links(edges, nodes, grouped), |n: &Node| {
                n.name.clone()
            }),
        );
        sim.set_force("cluster", Cluster::new());
        sim.set_force("subnet_pull", SubnetPull::new());
        sim.set_force("charge", ManyBody::new().strength(-3000.0));
        Simulation::seed_positions(nodes);
        sim.initialize_forces(nodes);

        let groups_sim = (!groups.is_empty()).then(|| Self::group_simulation(groups, nodes, group_weight));

        let mut engine = Self {
            nodes_sim: sim,
            groups_sim,
            rect_collide: RectCollide::new(),
            stashed_alphas: None,
            was_settled: false,
        };
        engine.retune(nodes, edges, grouped);
        engine
    }

    /// The trunk drill-down simulation: banded columns, loose long links,
    /// light repulsion and circle collision so the spread stays readable.
    pub fn trunked(
        nodes: &mut [Node],
        edges: &[Edge],
        groups: &mut [Group],
        group_weight: f64,
    ) -> Self {
        let mut sim: Simulation<Node> = Simulation::new();
        sim.set_velocity_decay(0.5);
        sim.set_alpha_decay(0.02);
        sim.set_alpha_min(0.01);
        sim.set_force(
            "x",
            PositionX::new()
                .x_fn(|n: &Node, _| band_x(n.display_group))
                .strength(0.1),
        );
        sim.set_force(
            "y",
            PositionY::new()
                .y(0.0)
                .strength_fn(|n: &Node, _| if n.display_group == 0 { 0.0 } else { 1.0 }),
        );
        let links: Vec<Link> = edges
            .iter()
            .map(|e| {
                Link::new(e.source.clone(), e.target.clone())
                    .strength(0.01)
                    .distance(450.0)
            })
            .collect();
        sim.set_force("link", LinkForce::new(links, |n: &Node| n.name.clone()));
        sim.set_force("charge", ManyBody::new().strength(-300.0));
        sim.set_force("subnet_pull", SubnetPull::new());
        sim.set_force("collision", Collide::new(25.0));
        Simulation::seed_positions(nodes);
        sim.initialize_forces(nodes);

        let groups_sim = (!groups.is_empty()).then(|| Self::group_simulation(groups, nodes, group_weight));

        Self {
            nodes_sim: sim,
            groups_sim,
            rect_collide: RectCollide::new(),
            stashed_alphas: None,
            was_settled: false,
        }
    }

    fn group_simulation(groups: &mut [Group], nodes: &[Node], group_weight: f64) -> Simulation<Group> {
        assign_node_counts(groups, nodes);
        let mut sim: Simulation<Group> = Simulation::new();
        let strength = move |g: &Group, _: usize| {
            if g.parent.is_some() {
                // Child groups follow their parents; only roots are driven.
                0.0
            } else {
                0.1 * group_weight / g.node_count.max(1) as f64
            }
        };
        sim.set_force("x", PositionX::new().x(1000.0).strength_fn(strength));
        sim.set_force("y", PositionY::new().y(1000.0).strength_fn(strength));
        Simulation::seed_positions(groups);
        sim.initialize_forces(groups);
        sim
    }

    /// Retunes the centering/charge forces and the per-link strengths for the
    /// current grouping mode; when grouping is off the group simulation stops.
    pub fn retune(&mut self, nodes: &[Node], edges: &[Edge], grouped: bool) {
        if grouped {
            if let Some(f) = self.nodes_sim.force_mut::<PositionX<Node>>("x") {
                *f = PositionX::new().strength(0.1);
            }
            if let Some(f) = self.nodes_sim.force_mut::<PositionY<Node>>("y") {
                *f = PositionY::new().strength(0.1);
            }
            if let Some(f) = self.nodes_sim.force_mut::<ManyBody>("charge") {
                *f = ManyBody::new().strength(-3000.0);
            }
        } else {
            if let Some(f) = self.nodes_sim.force_mut::<PositionX<Node>>("x") {
                *f = PositionX::new().strength(0.4);
            }
            if let Some(f) = self.nodes_sim.force_mut::<PositionY<Node>>("y") {
                *f = PositionY::new().strength(0.4);
            }
            if let Some(f) = self.nodes_sim.force_mut::<ManyBody>("charge") {
                *f = ManyBody::new().strength(-5000.0);
            }
            if let Some(groups_sim) = &mut self.groups_sim {
                groups_sim.stop();
            }
        }
        self.nodes_sim.set_force(
            "link",
            LinkForce::new(standard_links(edges, nodes, grouped), |n: &Node| {
                n.name.clone()
            }),
        );
        self.nodes_sim.initialize_forces(nodes);
    }

    /// One coupled step: node tick, then the group tick with its rectangle
    /// collision (which must see the member positions the cluster force just
    /// proposed), then bounds recompute and parent containment.
    pub fn tick(&mut self, nodes: &mut Vec<Node>, groups: &mut Vec<Group>, ctx: &TickContext) -> bool {
        let mut advanced = false;

        if !self.nodes_sim.stopped() && !self.nodes_sim.settled() {
            self.configure_domain_forces(groups, ctx);
            self.nodes_sim.tick(nodes);
            advanced = true;
        }

        if ctx.grouping {
            if let Some(groups_sim) = &mut self.groups_sim {
                if !groups_sim.stopped() && !groups_sim.settled() {
                    groups_sim.tick(groups);
                    self.rect_collide
                        .apply(groups, nodes, ctx.focused_group.as_ref());
                    advanced = true;
                }
            }
        }

        if ctx.grouping && !groups.is_empty() {
            grouping::update(groups, nodes, ctx.group_padding, ctx.focused_group.as_ref());
        }

        advanced
    }

    fn configure_domain_forces(&mut self, groups: &[Group], ctx: &TickContext) {
        let enabled = ctx.grouping && !groups.is_empty();
        if let Some(cluster) = self.nodes_sim.force_mut::<Cluster>("cluster") {
            let centers: FxHashMap<GroupId, (f64, f64)> = groups
                .iter()
                .map(|g| (g.id.clone(), (g.cx, g.cy)))
                .collect();
            cluster.configure(centers, enabled);
        }
        if let Some(pull) = self.nodes_sim.force_mut::<SubnetPull>("subnet_pull") {
            pull.set_weight(ctx.subnet_weight);
        }
    }

    /// Runs until both simulations settle (bounded); returns ticks executed.
    pub fn settle(&mut self, nodes: &mut Vec<Node>, groups: &mut Vec<Group>, ctx: &TickContext, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && !self.settled() {
            if !self.tick(nodes, groups, ctx) {
                break;
            }
            ticks += 1;
        }
        ticks
    }

    pub fn settled(&self) -> bool {
        self.nodes_sim.settled()
            && self
                .groups_sim
                .as_ref()
                .map(|s| s.settled() || s.stopped())
                .unwrap_or(true)
    }

    /// True exactly once, on the tick where the engine crosses into settled.
    pub fn just_settled(&mut self) -> bool {
        let now = self.settled();
        let fresh = now && !self.was_settled;
        self.was_settled = now;
        fresh
    }

    pub fn reheat(&mut self, target: f64) {
        self.nodes_sim.reheat(target);
        if let Some(groups_sim) = &mut self.groups_sim {
            groups_sim.reheat(target);
        }
        self.was_settled = false;
    }

    pub fn cool(&mut self) {
        self.nodes_sim.cool();
        if let Some(groups_sim) = &mut self.groups_sim {
            groups_sim.cool();
        }
    }

    pub fn stop(&mut self) {
        self.nodes_sim.stop();
        if let Some(groups_sim) = &mut self.groups_sim {
            groups_sim.stop();
        }
    }

    /// The grouping toggle stashes the alpha pair so switching back resumes
    /// where the previous mode left off.
    pub fn swap_alpha_stash(&mut self) {
        let current = (
            self.nodes_sim.alpha(),
            self.groups_sim.as_ref().map(|s| s.alpha()).unwrap_or(1.0),
        );
        let restored = self.stashed_alphas.take().unwrap_or((1.0, 1.0));
        self.stashed_alphas = Some(current);
        self.nodes_sim.set_alpha(restored.0);
        if let Some(groups_sim) = &mut self.groups_sim {
            groups_sim.set_alpha(restored.1);
        }
        self.was_settled = false;
    }
}

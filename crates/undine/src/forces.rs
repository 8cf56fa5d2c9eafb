//! Domain forces layered on top of `selkie`: the group-cluster pull, the
//! subnet-weight pull and the group-level rectangle collision.

use rustc_hash::FxHashMap;
use selkie::quadtree::Quadtree;
use selkie::{Force, Particle};
use std::any::Any;
use undine_core::{Group, GroupId, Node, grouping};

/// Box extent assumed for an ungrouped cloud participating in group-level
/// collision (the rendered cloud glyph).
pub const CLOUD_EXTENT: [f64; 2] = [90.0, 90.0];

/// Pulls every grouped node toward its group's cluster target `(cx, cy)`.
/// The engine refreshes the center table each tick, after bounds recompute.
pub struct Cluster {
    strength: f64,
    enabled: bool,
    centers: FxHashMap<GroupId, (f64, f64)>,
}

impl Cluster {
    pub fn new() -> Self {
        Self {
            strength: 0.2,
            enabled: false,
            centers: FxHashMap::default(),
        }
    }

    pub fn configure(&mut self, centers: FxHashMap<GroupId, (f64, f64)>, enabled: bool) {
        self.centers = centers;
        self.enabled = enabled;
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

impl Force<Node> for Cluster {
    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        if !self.enabled {
            return;
        }
        let l = alpha * self.strength;
        for node in nodes.iter_mut() {
            let Some(&(cx, cy)) = node.group.as_ref().and_then(|g| self.centers.get(g)) else {
                continue;
            };
            // Unset centers surface as zeros before the first bounds pass.
            if cx == 0.0 || cy == 0.0 || !cx.is_finite() || !cy.is_finite() {
                continue;
            }
            node.vx -= (node.x - cx) * l;
            node.vy -= (node.y - cy) * l;
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// User-weighted pull (0-100) drawing ungrouped clouds toward a fixed center,
/// stronger when the slider is up and weaker with distance. Weight 0 must be
/// a pure no-op: it may not touch any velocity.
pub struct SubnetPull {
    weight: u32,
    center: (f64, f64),
}

impl SubnetPull {
    pub fn new() -> Self {
        Self {
            weight: 0,
            center: (0.0, 0.0),
        }
    }

    pub fn set_weight(&mut self, weight: u32) {
        self.weight = weight.min(100);
    }
}

impl Default for SubnetPull {
    fn default() -> Self {
        Self::new()
    }
}

impl Force<Node> for SubnetPull {
    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        if self.weight == 0 {
            return;
        }
        let weight = self.weight as f64 / 100.0;
        for node in nodes.iter_mut() {
            if !node.is_cloud || node.group.is_some() {
                continue;
            }
            let dx = node.x - self.center.0;
            let dy = node.y - self.center.1;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance <= f64::EPSILON {
                continue;
            }
            let k = alpha * weight / distance;
            node.vx -= dx * k;
            node.vy -= dy * k;
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

enum Body {
    Group(usize),
    Cloud(usize),
}

/// Group-level rectangle collision.
///
/// Collidables are root groups plus ungrouped cloud nodes, keyed in a
/// quadtree by projected center (position + velocity + half size). For each
/// colliding pair the overlap is resolved along the deeper-penetration axis,
/// split by inverse box-area mass; a group side moves its member nodes, a
/// cloud side takes the correction on its velocity. Fixed sides do not move.
pub struct RectCollide {
    padding: f64,
    iterations: usize,
}

impl RectCollide {
    pub fn new() -> Self {
        Self {
            padding: 100.0,
            iterations: 1,
        }
    }

    pub fn apply(&mut self, groups: &mut [Group], nodes: &mut [Node], focused: Option<&GroupId>) {
        let mut bodies: Vec<Body> = Vec::new();
        for (gi, group) in groups.iter().enumerate() {
            if group.parent.is_none() {
                bodies.push(Body::Group(gi));
            }
        }
        for (ni, node) in nodes.iter().enumerate() {
            if node.is_cloud && node.group.is_none() {
                bodies.push(Body::Cloud(ni));
            }
        }
        if bodies.len() < 2 {
            return;
        }

        for _ in 0..self.iterations {
            let mut sizes = Vec::with_capacity(bodies.len());
            let mut centers = Vec::with_capacity(bodies.len());
            let mut fixed = Vec::with_capacity(bodies.len());
            for body in &bodies {
                match *body {
                    Body::Group(gi) => {
                        let group = &groups[gi];
                        sizes.push([group.width, group.height]);
                        centers.push((
                            group.x + group.vx + group.width / 2.0,
                            group.y + group.vy + group.height / 2.0,
                        ));
                        let members: Vec<&Node> = nodes
                            .iter()
                            .filter(|n| n.group.as_deref() == Some(group.id.as_str()))
                            .collect();
                        fixed.push(grouping::is_group_fixed(group, &members, focused));
                    }
                    Body::Cloud(ni) => {
                        let node = &nodes[ni];
                        sizes.push(CLOUD_EXTENT);
                        centers.push((node.x + node.vx, node.y + node.vy));
                        fixed.push(node.fx.is_some());
                    }
                }
            }

            let mut tree = Quadtree::build(&centers);
            tree.accumulate_extents(&sizes);

            for i in 0..bodies.len() {
                let size_i = sizes[i];
                let mass_i = size_i[0] * size_i[1];
                let (xi, yi) = centers[i];
                let padding = self.padding;

                tree.visit(|tree, ci, x0, y0, x1, y1| {
                    let cell = tree.cell(ci);
                    if !cell.is_leaf() {
                        let xs = (size_i[0] + cell.size[0]) / 2.0 + padding;
                        let ys = (size_i[1] + cell.size[1]) / 2.0 + padding;
                        return x0 > xi + xs || y0 > yi + ys || x1 < xi - xs || y1 < yi - ys;
                    }
                    for &j in &cell.points {
                        if j <= i {
                            continue;
                        }
                        let x_size = (size_i[0] + sizes[j][0]) / 2.0 + padding;
                        let y_size = (size_i[1] + sizes[j][1]) / 2.0 + padding;
                        let mut x = xi - centers[j].0;
                        let mut y = yi - centers[j].1;
                        let xd = x.abs() - x_size;
                        let yd = y.abs() - y_size;
                        if xd >= 0.0 || yd >= 0.0 {
                            continue;
                        }
                        let l = (x * x + y * y).sqrt();
                        if l == 0.0 {
                            continue;
                        }
                        let mass_j = sizes[j][0] * sizes[j][1];
                        let m = mass_j / (mass_i + mass_j);
                        if xd.abs() < yd.abs() {
                            x *= xd / l;
                            if !fixed[i] {
                                shift(&bodies[i], groups, nodes, -x * m, 0.0);
                            }
                            if !fixed[j] {
                                shift(&bodies[j], groups, nodes, x * (1.0 - m), 0.0);
                            }
                        } else {
                            y *= yd / l;
                            if !fixed[i] {
                                shift(&bodies[i], groups, nodes, 0.0, -y * m);
                            }
                            if !fixed[j] {
                                shift(&bodies[j], groups, nodes, 0.0, y * (1.0 - m));
                            }
                        }
                    }
                    true
                });
            }
        }
    }
}

impl Default for RectCollide {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a pair correction: groups move their members, clouds take it on
/// their velocity.
fn shift(body: &Body, groups: &[Group], nodes: &mut [Node], dx: f64, dy: f64) {
    match *body {
        Body::Group(gi) => {
            let id = groups[gi].id.as_str();
            for node in nodes
                .iter_mut()
                .filter(|n| n.group.as_deref() == Some(id))
            {
                node.x += dx;
                node.y += dy;
            }
        }
        Body::Cloud(ni) => {
            nodes[ni].set_vx(nodes[ni].vx() + dx);
            nodes[ni].set_vy(nodes[ni].vy() + dy);
        }
    }
}

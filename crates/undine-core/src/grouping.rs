//! Hierarchical group geometry and constraint state.
//!
//! Groups never own their members; membership is the node's `group` field,
//! and geometry is re-derived from member positions on every tick. Parents
//! are always recomputed before their children so same-pass containment
//! clamping sees fresh parent bounds.

use crate::model::{Bounds, Group, GroupId, Node};

/// Reduces member positions to the group's padded box and cluster target.
///
/// Members define the raw bounds (retained on the record); the padded box
/// grows by `padding` around members and by `2 × padding` around any child
/// group members. Returns the box corner polygon for renderers, or `None`
/// when the group has no members to derive geometry from.
pub fn compute_bounds(
    group: &mut Group,
    members: &[&Node],
    child_members: &[&Node],
    padding: f64,
) -> Option<[(f64, f64); 4]> {
    let first = members.first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;
    for node in members {
        min_x = min_x.min(node.x);
        max_x = max_x.max(node.x);
        min_y = min_y.min(node.y);
        max_y = max_y.max(node.y);
    }
    group.bounds = Some(Bounds {
        min_x,
        min_y,
        max_x,
        max_y,
    });

    let mut x0 = min_x - padding;
    let mut x1 = max_x + padding;
    let mut y0 = min_y - padding;
    let mut y1 = max_y + padding;
    for node in child_members {
        x0 = x0.min(node.x - padding * 2.0);
        x1 = x1.max(node.x + padding * 2.0);
        y0 = y0.min(node.y - padding * 2.0);
        y1 = y1.max(node.y + padding * 2.0);
    }

    group.width = x1 - x0;
    group.height = y1 - y0;
    group.x = x0;
    group.y = y0;
    group.cx = x0 + group.width.max(group.title_width) / 2.0;
    group.cy = y0 + group.height / 2.0;

    Some([(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

/// Recomputes every unlocked group's geometry, parents before children, then
/// clamps children into fixed parents.
pub fn update(groups: &mut [Group], nodes: &mut [Node], padding: f64, focused: Option<&GroupId>) {
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|&a, &b| groups[a].parent.cmp(&groups[b].parent));

    for gi in order {
        if groups[gi].locked {
            continue;
        }
        let id = groups[gi].id.clone();
        let child_ids: Vec<GroupId> = if groups[gi].has_child_group {
            groups
                .iter()
                .filter(|g| g.parent.as_deref() == Some(id.as_str()))
                .map(|g| g.id.clone())
                .collect()
        } else {
            Vec::new()
        };

        let members: Vec<&Node> = nodes
            .iter()
            .filter(|n| n.group.as_deref() == Some(id.as_str()))
            .collect();
        let child_members: Vec<&Node> = nodes
            .iter()
            .filter(|n| n.group.as_ref().is_some_and(|g| child_ids.contains(g)))
            .collect();

        compute_bounds(&mut groups[gi], &members, &child_members, padding);
    }

    clamp_children(groups, nodes, padding, focused);
}

/// Containment: while a parent is fixed and has geometry, its children's
/// boxes (and their members) stay inside the parent interior minus padding.
/// Fixed children are left alone; their pins win.
pub fn clamp_children(
    groups: &mut [Group],
    nodes: &mut [Node],
    padding: f64,
    focused: Option<&GroupId>,
) {
    for ci in 0..groups.len() {
        let Some(parent_id) = groups[ci].parent.clone() else {
            continue;
        };
        let Some(pi) = groups.iter().position(|g| g.id == parent_id) else {
            continue;
        };
        if !parent_is_constraining(groups, nodes, pi, focused) {
            continue;
        }
        let child_members: Vec<&Node> = members_of(nodes, &groups[ci].id).collect();
        if is_group_fixed(&groups[ci], &child_members, focused) {
            continue;
        }

        let (px, py, pw, ph) = (groups[pi].x, groups[pi].y, groups[pi].width, groups[pi].height);
        let child = &groups[ci];
        let min_x = px + padding;
        let max_x = (px + pw - padding - child.width).max(min_x);
        let min_y = py + padding;
        let max_y = (py + ph - padding - child.height).max(min_y);
        let dx = child.x.clamp(min_x, max_x) - child.x;
        let dy = child.y.clamp(min_y, max_y) - child.y;
        if dx == 0.0 && dy == 0.0 {
            continue;
        }

        let id = groups[ci].id.clone();
        groups[ci].x += dx;
        groups[ci].y += dy;
        groups[ci].cx += dx;
        groups[ci].cy += dy;
        for node in nodes
            .iter_mut()
            .filter(|n| n.group.as_deref() == Some(id.as_str()))
        {
            node.x += dx;
            node.y += dy;
        }
    }
}

fn parent_is_constraining(
    groups: &[Group],
    nodes: &[Node],
    pi: usize,
    focused: Option<&GroupId>,
) -> bool {
    let parent = &groups[pi];
    if !(parent.width.is_finite() && parent.width > 0.0 && parent.height > 0.0) {
        return false;
    }
    let members: Vec<&Node> = members_of(nodes, &parent.id).collect();
    is_group_fixed(parent, &members, focused)
}

fn members_of<'a>(nodes: &'a [Node], id: &'a GroupId) -> impl Iterator<Item = &'a Node> {
    nodes
        .iter()
        .filter(move |n| n.group.as_deref() == Some(id.as_str()))
}

pub fn is_fixed(node: &Node) -> bool {
    node.fx.is_some()
}

/// A group counts as fixed when it is pinned itself, any member is pinned,
/// or it is the currently focused group.
pub fn is_group_fixed(group: &Group, members: &[&Node], focused: Option<&GroupId>) -> bool {
    group.fx.is_some()
        || members.iter().any(|n| n.fx.is_some())
        || focused.is_some_and(|f| *f == group.id)
}

/// Fixed groups excluding `exclude`, its direct children and its parent.
/// Drag-end handlers use this set to decide whether releasing a group would
/// drop it onto another pinned group.
pub fn fixed_groups(
    groups: &[Group],
    nodes: &[Node],
    focused: Option<&GroupId>,
    exclude: Option<&GroupId>,
) -> Vec<GroupId> {
    let skip: Vec<&GroupId> = match exclude {
        Some(ex) => {
            let mut skip: Vec<&GroupId> = groups
                .iter()
                .filter(|g| g.parent.as_ref() == Some(ex))
                .map(|g| &g.id)
                .collect();
            skip.push(ex);
            if let Some(parent) = groups
                .iter()
                .find(|g| g.id == *ex)
                .and_then(|g| g.parent.as_ref())
            {
                skip.push(parent);
            }
            skip
        }
        None => Vec::new(),
    };

    groups
        .iter()
        .filter(|g| !skip.contains(&&g.id))
        .filter(|g| {
            let members: Vec<&Node> = members_of(nodes, &g.id).collect();
            is_group_fixed(g, &members, focused)
        })
        .map(|g| g.id.clone())
        .collect()
}

/// Rectangle overlap test with border slack.
pub fn intersects(a: &Group, b: &Group, border_width: f64) -> bool {
    !(b.x - border_width > a.x + a.width
        || b.x + b.width < a.x - border_width
        || b.y - border_width > a.y + a.height
        || b.y + b.height < a.y - border_width)
}

/// Ad-hoc bounding group over an arbitrary node set (drill-down focus areas).
pub fn from_nodes(members: &[&Node], padding: f64) -> Option<Group> {
    let mut group = Group::new("");
    compute_bounds(&mut group, members, &[], padding)?;
    Some(group)
}

//! Pan/zoom transform math. The transform is `screen = world * k + (x, y)`,
//! matching the d3 zoom convention the persisted `{x, y, k}` documents use.

use serde::{Deserialize, Serialize};
use undine_core::{Group, Node};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            k: 1.0,
        }
    }
}

/// Fallback when nothing is persisted and the layer has no content yet.
pub fn default_transform(view_width: f64, view_height: f64) -> Transform {
    Transform {
        x: view_width / 2.0,
        y: view_height / 2.0,
        k: 0.4,
    }
}

/// Scales about the viewport center, clamped to the allowed zoom extent.
pub fn scale_by(
    transform: Transform,
    factor: f64,
    view_width: f64,
    view_height: f64,
    min_k: f64,
    max_k: f64,
) -> Transform {
    let k = (transform.k * factor).clamp(min_k, max_k);
    let ratio = k / transform.k;
    let (cx, cy) = (view_width / 2.0, view_height / 2.0);
    Transform {
        x: cx - (cx - transform.x) * ratio,
        y: cy - (cy - transform.y) * ratio,
        k,
    }
}

/// Centers `(x, y)` in the viewport at the given scale.
pub fn focus_on_point(x: f64, y: f64, scale: f64, view_width: f64, view_height: f64) -> Transform {
    Transform {
        x: view_width / 2.0 - x * scale,
        y: view_height / 2.0 - y * scale,
        k: scale,
    }
}

/// Fills 90% of the viewport with the group box (title width counts toward
/// the horizontal extent) and centers its cluster target.
pub fn focus_on_area(group: &Group, view_width: f64, view_height: f64) -> Transform {
    let width = group.width.max(group.title_width).max(1.0);
    let height = group.height.max(1.0);
    let scale = 0.9 / (width / view_width).max(height / view_height);
    focus_on_point(group.cx, group.cy, scale, view_width, view_height)
}

pub fn focus_on_node(node: &Node, scale: f64, view_width: f64, view_height: f64) -> Transform {
    focus_on_point(node.x, node.y, scale, view_width, view_height)
}

/// Fit-to-content over the bounding extent of all node positions; the
/// default transform when the layer is empty.
pub fn fit_to_content(
    nodes: &[Node],
    view_width: f64,
    view_height: f64,
    min_k: f64,
    max_k: f64,
) -> Transform {
    let finite: Vec<&Node> = nodes
        .iter()
        .filter(|n| n.x.is_finite() && n.y.is_finite())
        .collect();
    let Some(first) = finite.first() else {
        return default_transform(view_width, view_height);
    };
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;
    for node in &finite {
        min_x = min_x.min(node.x);
        max_x = max_x.max(node.x);
        min_y = min_y.min(node.y);
        max_y = max_y.max(node.y);
    }
    let width = (max_x - min_x).max(1.0);
    let height = (max_y - min_y).max(1.0);
    let scale = (0.9 / (width / view_width).max(height / view_height)).clamp(min_k, max_k);
    focus_on_point(
        (min_x + max_x) / 2.0,
        (min_y + max_y) / 2.0,
        scale,
        view_width,
        view_height,
    )
}

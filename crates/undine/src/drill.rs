//! Neighborhood extraction for drill-downs into synthetic nodes.
//!
//! Summarized clouds and trunk edges stand in for records that no longer
//! exist in the simplified layer, so their sub-views are rebuilt from the
//! normalized (pre-summarization) base data the first push retained.

use undine_core::topology::Processed;
use undine_core::{Edge, Node};

/// The device plus every single-homed leaf subnet folded into its
/// summarized cloud.
pub fn summarized_neighborhood(base: &Processed, source_name: &str) -> Option<(Vec<Node>, Vec<Edge>)> {
    let center = base.nodes.iter().find(|n| n.name == source_name)?;

    let connected: Vec<&Edge> = base
        .edges
        .iter()
        .filter(|e| {
            e.source == source_name
                && base.edges.iter().filter(|o| o.target == e.target).count() == 1
        })
        .collect();

    let mut nodes = vec![center.clone()];
    let mut edges = Vec::with_capacity(connected.len());
    for link in connected {
        if let Some(target) = base.nodes.iter().find(|n| n.name == link.target) {
            nodes.push(target.clone());
            edges.push(link.clone());
        }
    }
    Some((nodes, edges))
}

/// The two bridged devices plus every two-connection subnet between them,
/// banded for the trunk sub-layer simulation (devices left/right, subnets
/// center).
pub fn trunked_neighborhood(
    base: &Processed,
    source_name: &str,
    target_name: &str,
) -> Option<(Vec<Node>, Vec<Edge>)> {
    let mut source = base.nodes.iter().find(|n| n.name == source_name)?.clone();
    let mut target = base.nodes.iter().find(|n| n.name == target_name)?.clone();
    source.display_group = 1;
    target.display_group = 2;

    let mut nodes = vec![source, target];
    let mut edges = Vec::new();
    for subnet in base.nodes.iter().filter(|n| n.is_cloud) {
        let connected: Vec<&Edge> = base
            .edges
            .iter()
            .filter(|e| e.target == subnet.name)
            .collect();
        let [a, b] = connected[..] else {
            continue;
        };
        let bridges = (a.source == source_name && b.source == target_name)
            || (a.source == target_name && b.source == source_name);
        if !bridges {
            continue;
        }
        let mut cloud = subnet.clone();
        cloud.display_group = 0;
        nodes.push(cloud);
        edges.push(a.clone());
        edges.push(b.clone());
    }
    Some((nodes, edges))
}

//! The topology simplification pipeline.
//!
//! `process` turns a raw fetched graph plus the visibility configuration into
//! the node/edge/group sets a layer actually lays out. The pass order is
//! load-bearing: dedup, group arena, endpoint resolution, cloud group
//! inference, visibility filter, subnet summarization, trunk summarization.
//! Both summarization passes walk the node list in its current order, so the
//! output is reproducible for identical input order.

use crate::config::VisibilityConfig;
use crate::error::{Error, Result};
use crate::model::{Edge, Group, GroupId, GroupRef, Node, RawGraph};
use crate::util;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone)]
pub struct Processed {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub groups: Vec<Group>,
    /// Search candidates: device names plus subnet CIDRs (names for
    /// unmanaged clouds), in input order.
    pub autocomplete: Vec<String>,
}

/// The pipeline up to (but not including) visibility filtering and
/// summarization: dedup, group arena, endpoint resolution, group inference.
///
/// Drill-down neighborhood extraction works against this form, because the
/// folded subnets it re-expands no longer exist after summarization.
pub fn normalize(raw: &RawGraph) -> Result<Processed> {
    let groups = build_groups(&raw.groups)?;
    let (mut nodes, autocomplete) = normalize_nodes(raw)?;
    let mut edges = dedup_links(raw);

    resolve_endpoints(&nodes, &mut edges)?;
    infer_cloud_groups(&mut nodes, &edges);

    Ok(Processed {
        nodes,
        edges,
        groups,
        autocomplete,
    })
}

pub fn process(raw: &RawGraph, config: &VisibilityConfig) -> Result<Processed> {
    let Processed {
        mut nodes,
        mut edges,
        mut groups,
        autocomplete,
    } = normalize(raw)?;

    if config.is_set {
        nodes.retain(|n| config.is_node_visible(n));
        let names: FxHashSet<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        edges.retain(|e| names.contains(e.source.as_str()) && names.contains(e.target.as_str()));
        groups.retain(|g| config.groups.contains(&g.id));
    }

    if config.subnet_summarization {
        summarize_subnets(&mut nodes, &mut edges);
    }
    summarize_trunks(&mut nodes, &mut edges);

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        groups = groups.len(),
        "topology processed"
    );

    Ok(Processed {
        nodes,
        edges,
        groups,
        autocomplete,
    })
}

/// Builds the group arena from name paths and validates its tree structure.
fn build_groups(paths: &[String]) -> Result<Vec<Group>> {
    let known: FxHashSet<&str> = paths.iter().map(String::as_str).collect();
    let mut groups = Vec::with_capacity(paths.len());

    for path in paths {
        let parent = util::parent_path(path);
        if let Some(parent) = &parent {
            if !known.contains(parent.as_str()) {
                return Err(Error::UnknownGroupParent {
                    id: path.clone(),
                    parent: parent.clone(),
                });
            }
        }
        let mut group = Group::new(path.clone());
        group.parent = parent;
        group.has_child_group = paths.iter().any(|p| p.starts_with(&format!("{path}\\")));
        group.title_width = util::title_width(path);
        groups.push(group);
    }

    // Paths cannot express a cycle, but the arena is also built from explicit
    // parent ids in tests and future ingest paths; walk each chain bounded by
    // the arena size.
    let by_id: FxHashMap<&str, &Group> = groups.iter().map(|g| (g.id.as_str(), g)).collect();
    for group in &groups {
        let mut cursor = group.parent.as_deref();
        let mut steps = 0usize;
        while let Some(parent) = cursor {
            steps += 1;
            if steps > groups.len() {
                return Err(Error::GroupCycle {
                    id: group.id.clone(),
                });
            }
            cursor = by_id.get(parent).and_then(|g| g.parent.as_deref());
        }
    }

    Ok(groups)
}

fn resolve_group_ref(
    group: Option<&GroupRef>,
    paths: &[String],
    owner: &str,
) -> Result<Option<GroupId>> {
    match group {
        None => Ok(None),
        Some(GroupRef::Index(i)) if *i < 0 => Ok(None),
        Some(GroupRef::Index(i)) => paths
            .get(*i as usize)
            .cloned()
            .map(Some)
            .ok_or(Error::GroupIndexOutOfRange {
                name: owner.to_string(),
                index: *i,
            }),
        Some(GroupRef::Path(p)) => Ok(Some(p.clone())),
    }
}

/// Devices first, then subnets, preserving input order; collects the
/// autocomplete candidates along the way.
fn normalize_nodes(raw: &RawGraph) -> Result<(Vec<Node>, Vec<String>)> {
    let mut nodes = Vec::with_capacity(raw.devices.len() + raw.subnets.len());
    let mut autocomplete = Vec::new();

    for subnet in &raw.subnets {
        // Unmanaged (WAN) clouds are searched by name, the rest by CIDR.
        autocomplete.push(if subnet.is_unmanaged {
            subnet.name.clone()
        } else {
            subnet.subnet.clone()
        });
    }
    for device in &raw.devices {
        autocomplete.push(device.name.clone());
    }

    for device in &raw.devices {
        let mut node = Node::device(
            device.name.clone(),
            device
                .dev_num
                .map(|n| n.to_string())
                .unwrap_or_else(|| device.name.clone()),
        );
        node.group = resolve_group_ref(device.group.as_ref(), &raw.groups, &device.name)?;
        node.status = device.status;
        nodes.push(node);
    }
    for subnet in &raw.subnets {
        let mut node = Node::cloud(subnet.name.clone(), subnet.subnet.clone());
        node.mask = subnet.mask.clone();
        node.group = resolve_group_ref(subnet.group.as_ref(), &raw.groups, &subnet.name)?;
        node.status = subnet.status;
        node.is_unmanaged = subnet.is_unmanaged;
        nodes.push(node);
    }

    Ok((nodes, autocomplete))
}

/// Drops links repeating an already-seen unordered endpoint pair and assigns
/// render widths.
fn dedup_links(raw: &RawGraph) -> Vec<Edge> {
    let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
    let mut edges = Vec::with_capacity(raw.links.len());

    for link in &raw.links {
        let key = if link.source <= link.target {
            (link.source.clone(), link.target.clone())
        } else {
            (link.target.clone(), link.source.clone())
        };
        if !seen.insert(key) {
            continue;
        }
        let mut edge = Edge::new(link.source.clone(), link.target.clone());
        edge.bandwidth = link.bandwidth;
        edge.status = link.status;
        edge.ip_address = link.ip_address.clone();
        edge.is_static_wan = link.is_static_wan;
        edge.trunk = link.trunk;
        edge.width = if link.is_static_wan {
            5
        } else {
            util::link_width(link.bandwidth)
        };
        edges.push(edge);
    }

    edges
}

fn resolve_endpoints(nodes: &[Node], edges: &mut [Edge]) -> Result<()> {
    let known: FxHashSet<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    for edge in edges {
        for endpoint in [&edge.source, &edge.target] {
            if !known.contains(endpoint.as_str()) {
                return Err(Error::UnresolvedEndpoint {
                    source_name: edge.source.clone(),
                    target_name: edge.target.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Clouds without an explicit group adopt one from their neighbors: the
/// single adjacent device group if there is only one, otherwise the lowest
/// common ancestor shared by all of them, otherwise none.
fn infer_cloud_groups(nodes: &mut [Node], edges: &[Edge]) {
    let index: FxHashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.name.clone(), i))
        .collect();

    let mut linked: Vec<IndexSet<GroupId>> = vec![IndexSet::new(); nodes.len()];
    for edge in edges {
        let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) else {
            continue;
        };
        if !nodes[s].is_cloud && !nodes[t].is_cloud {
            continue;
        }
        if nodes[s].is_cloud {
            if let Some(group) = nodes[t].group.clone() {
                linked[s].insert(group);
                continue;
            }
        }
        if nodes[t].is_cloud {
            if let Some(group) = nodes[s].group.clone() {
                linked[t].insert(group);
            }
        }
    }

    for (i, node) in nodes.iter_mut().enumerate() {
        if node.group.is_some() || !node.is_cloud || linked[i].is_empty() {
            continue;
        }
        if linked[i].len() == 1 {
            node.group = linked[i].first().cloned();
            continue;
        }
        node.group = lowest_common_ancestor(&linked[i]);
    }
}

fn lowest_common_ancestor(groups: &IndexSet<GroupId>) -> Option<GroupId> {
    let mut candidate = groups.first()?.clone();
    loop {
        candidate = util::parent_path(&candidate)?;
        let prefix = format!("{candidate}\\");
        if groups
            .iter()
            .all(|g| *g == candidate || g.starts_with(&prefix))
        {
            return Some(candidate);
        }
    }
}

/// Folds each device's single-homed leaf subnets (when there is more than
/// one) into a synthetic summarized cloud plus one aggregate edge.
fn summarize_subnets(nodes: &mut Vec<Node>, edges: &mut Vec<Edge>) {
    let device_names: Vec<String> = nodes
        .iter()
        .filter(|n| !n.is_cloud)
        .map(|n| n.name.clone())
        .collect();

    let mut new_nodes = Vec::new();
    let mut new_edges = Vec::new();

    for device_name in device_names {
        let Some(device) = nodes.iter().find(|n| n.name == device_name) else {
            continue;
        };
        let device_group = device.group.clone();

        let mut incoming: FxHashMap<&str, usize> = FxHashMap::default();
        for edge in edges.iter() {
            *incoming.entry(edge.target.as_str()).or_default() += 1;
        }
        let folded: Vec<usize> = edges
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.source == device_name && incoming.get(e.target.as_str()) == Some(&1)
            })
            .map(|(i, _)| i)
            .collect();
        if folded.len() < 2 {
            continue;
        }

        let total = folded.len() as u32;
        let width: u32 = folded.iter().map(|&i| edges[i].width).sum();
        let bandwidth: u64 = folded.iter().map(|&i| edges[i].bandwidth).sum();
        let folded_targets: FxHashSet<String> =
            folded.iter().map(|&i| edges[i].target.clone()).collect();

        let summarized_name = format!("{device_name} - Summarized");
        let mut cloud = Node::cloud(summarized_name.clone(), "0.0.0.0");
        cloud.mask = Some("0.0.0.0".to_string());
        cloud.is_summarized = true;
        cloud.group = device_group;
        cloud.total_subnets = total;
        new_nodes.push(cloud);

        let mut edge = Edge::new(device_name.clone(), summarized_name);
        edge.width = width;
        edge.bandwidth = bandwidth;
        edge.is_summarized = true;
        edge.total_subnets = total;
        new_edges.push(edge);

        let folded_set: FxHashSet<usize> = folded.into_iter().collect();
        let mut keep = (0..edges.len()).map(|i| !folded_set.contains(&i));
        edges.retain(|_| keep.next().unwrap_or(true));
        nodes.retain(|n| !folded_targets.contains(&n.name));
    }

    nodes.extend(new_nodes);
    edges.extend(new_edges);
}

/// Folds clouds bridging exactly two devices from two distinct groups into a
/// trunk edge keyed by the unordered device pair; repeated folds over the
/// same pair accumulate into the existing trunk edge.
fn summarize_trunks(nodes: &mut Vec<Node>, edges: &mut Vec<Edge>) {
    let cloud_names: Vec<String> = nodes
        .iter()
        .filter(|n| n.is_cloud)
        .map(|n| n.name.clone())
        .collect();
    let group_of: FxHashMap<String, Option<GroupId>> = nodes
        .iter()
        .map(|n| (n.name.clone(), n.group.clone()))
        .collect();

    let mut trunks: Vec<Edge> = Vec::new();
    let mut hidden: FxHashSet<String> = FxHashSet::default();

    for cloud in cloud_names {
        let connected: Vec<usize> = edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.target == cloud)
            .map(|(i, _)| i)
            .collect();
        let [first, second] = connected[..] else {
            continue;
        };
        let source_a = edges[first].source.clone();
        let source_b = edges[second].source.clone();
        if group_of.get(&source_a) == group_of.get(&source_b) {
            continue;
        }

        let key = util::edge_key(&source_a, &source_b);
        let width = edges[first].width.min(edges[second].width);
        match trunks.iter_mut().find(|t| t.edge_key.as_deref() == Some(key.as_str())) {
            Some(trunk) => {
                trunk.width += width;
                trunk.total_subnets += 2;
            }
            None => {
                let mut trunk = Edge::new(source_a, source_b);
                trunk.is_trunked = true;
                trunk.edge_key = Some(key);
                trunk.width = width;
                trunk.total_subnets = 2;
                trunks.push(trunk);
            }
        }

        let mut keep = (0..edges.len()).map(|i| i != first && i != second);
        edges.retain(|_| keep.next().unwrap_or(true));
        hidden.insert(cloud);
    }

    edges.extend(trunks);
    nodes.retain(|n| !hidden.contains(&n.name));
}

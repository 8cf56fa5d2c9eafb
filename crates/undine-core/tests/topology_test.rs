use undine_core::model::{GroupRef, RawDevice, RawLink, RawSubnet};
use undine_core::topology::{self, Processed};
use undine_core::{Error, RawGraph, Status, VisibilityConfig, process};

fn dev(name: &str, group: Option<&str>) -> RawDevice {
    RawDevice {
        name: name.to_string(),
        group: group.map(|g| GroupRef::Path(g.to_string())),
        status: Status::default(),
        dev_num: None,
    }
}

fn sub(name: &str, subnet: &str) -> RawSubnet {
    RawSubnet {
        name: name.to_string(),
        subnet: subnet.to_string(),
        mask: Some("255.255.255.0".to_string()),
        group: None,
        status: Status::default(),
        is_unmanaged: false,
    }
}

fn link(source: &str, target: &str, bandwidth: u64) -> RawLink {
    RawLink {
        source: source.to_string(),
        target: target.to_string(),
        bandwidth,
        ip_address: None,
        status: Status::default(),
        is_static_wan: false,
        trunk: false,
    }
}

fn names(p: &Processed) -> Vec<&str> {
    p.nodes.iter().map(|n| n.name.as_str()).collect()
}

#[test]
fn duplicate_links_keep_the_first_unordered_occurrence() {
    let graph = RawGraph {
        devices: vec![dev("a", None), dev("b", None)],
        links: vec![link("a", "b", 10), link("b", "a", 20), link("a", "b", 30)],
        ..Default::default()
    };

    let processed = topology::normalize(&graph).unwrap();

    assert_eq!(processed.edges.len(), 1);
    assert_eq!(processed.edges[0].source, "a");
    assert_eq!(processed.edges[0].bandwidth, 10);
}

#[test]
fn link_widths_come_from_the_bandwidth_tier_or_static_wan() {
    let mut wan = link("a", "b", 100_000_000_000);
    wan.is_static_wan = true;
    let graph = RawGraph {
        devices: vec![dev("a", None), dev("b", None), dev("c", None)],
        links: vec![wan, link("a", "c", 1_000_000)],
        ..Default::default()
    };

    let processed = topology::normalize(&graph).unwrap();

    // Static WAN links pin to width 5 regardless of bandwidth.
    assert_eq!(processed.edges[0].width, 5);
    assert_eq!(processed.edges[1].width, 3);
}

#[test]
fn group_arena_builds_parents_and_child_flags_from_paths() {
    let graph = RawGraph {
        groups: vec![
            "Campus".to_string(),
            "Campus\\Building A".to_string(),
            "Remote".to_string(),
        ],
        ..Default::default()
    };

    let processed = topology::normalize(&graph).unwrap();

    let campus = &processed.groups[0];
    assert_eq!(campus.name, "Campus");
    assert_eq!(campus.parent, None);
    assert!(campus.has_child_group);
    assert!(campus.title_width > 0.0);

    let building = &processed.groups[1];
    assert_eq!(building.name, "Building A");
    assert_eq!(building.parent.as_deref(), Some("Campus"));
    assert!(!building.has_child_group);

    assert!(!processed.groups[2].has_child_group);
}

#[test]
fn unknown_group_parent_is_a_structural_error() {
    let graph = RawGraph {
        groups: vec!["Campus\\Building A".to_string()],
        ..Default::default()
    };

    let err = topology::normalize(&graph).unwrap_err();
    assert!(matches!(err, Error::UnknownGroupParent { .. }));
}

#[test]
fn dangling_link_endpoints_are_rejected_at_ingestion() {
    let graph = RawGraph {
        devices: vec![dev("a", None)],
        links: vec![link("a", "ghost", 0)],
        ..Default::default()
    };

    let err = topology::normalize(&graph).unwrap_err();
    assert!(matches!(err, Error::UnresolvedEndpoint { endpoint, .. } if endpoint == "ghost"));
}

#[test]
fn device_group_indexes_resolve_against_the_group_list() {
    let mut by_index = dev("a", None);
    by_index.group = Some(GroupRef::Index(1));
    let mut ungrouped = dev("b", None);
    ungrouped.group = Some(GroupRef::Index(-1));
    let graph = RawGraph {
        devices: vec![by_index, ungrouped],
        groups: vec!["Campus".to_string(), "Campus\\Building A".to_string()],
        ..Default::default()
    };

    let processed = topology::normalize(&graph).unwrap();

    assert_eq!(processed.nodes[0].group.as_deref(), Some("Campus\\Building A"));
    assert_eq!(processed.nodes[1].group, None);
}

#[test]
fn out_of_range_group_index_is_an_error() {
    let mut device = dev("a", None);
    device.group = Some(GroupRef::Index(5));
    let graph = RawGraph {
        devices: vec![device],
        groups: vec!["Campus".to_string()],
        ..Default::default()
    };

    let err = topology::normalize(&graph).unwrap_err();
    assert!(matches!(err, Error::GroupIndexOutOfRange { index: 5, .. }));
}

#[test]
fn clouds_adopt_the_single_adjacent_device_group() {
    let graph = RawGraph {
        devices: vec![dev("a", Some("Campus"))],
        subnets: vec![sub("Cloud-10.0.1.0", "10.0.1.0")],
        links: vec![link("a", "Cloud-10.0.1.0", 0)],
        groups: vec!["Campus".to_string()],
        ..Default::default()
    };

    let processed = topology::normalize(&graph).unwrap();
    let cloud = processed.nodes.iter().find(|n| n.is_cloud).unwrap();
    assert_eq!(cloud.group.as_deref(), Some("Campus"));
}

#[test]
fn clouds_bridging_sibling_groups_adopt_the_common_ancestor() {
    let graph = RawGraph {
        devices: vec![
            dev("a", Some("Campus\\Building A")),
            dev("b", Some("Campus\\Building B")),
        ],
        subnets: vec![sub("Cloud-10.0.1.0", "10.0.1.0")],
        links: vec![link("a", "Cloud-10.0.1.0", 0), link("b", "Cloud-10.0.1.0", 0)],
        groups: vec![
            "Campus".to_string(),
            "Campus\\Building A".to_string(),
            "Campus\\Building B".to_string(),
        ],
        ..Default::default()
    };

    let processed = topology::normalize(&graph).unwrap();
    let cloud = processed.nodes.iter().find(|n| n.is_cloud).unwrap();
    assert_eq!(cloud.group.as_deref(), Some("Campus"));
}

#[test]
fn clouds_bridging_unrelated_groups_stay_ungrouped() {
    let graph = RawGraph {
        devices: vec![dev("a", Some("Campus")), dev("b", Some("Remote"))],
        subnets: vec![sub("Cloud-10.0.1.0", "10.0.1.0")],
        links: vec![link("a", "Cloud-10.0.1.0", 0), link("b", "Cloud-10.0.1.0", 0)],
        groups: vec!["Campus".to_string(), "Remote".to_string()],
        ..Default::default()
    };

    let processed = topology::normalize(&graph).unwrap();
    let cloud = processed.nodes.iter().find(|n| n.is_cloud).unwrap();
    assert_eq!(cloud.group, None);
}

#[test]
fn visibility_filter_drops_unselected_records_and_their_edges() {
    let graph = RawGraph {
        devices: vec![dev("d1", Some("G1")), dev("d2", Some("G2"))],
        subnets: vec![sub("s1", "10.0.1.0"), sub("s2", "10.0.2.0")],
        links: vec![
            link("d1", "s1", 0),
            link("d1", "s2", 0),
            link("d2", "s1", 0),
        ],
        groups: vec!["G1".to_string(), "G2".to_string()],
    };
    let config = VisibilityConfig {
        is_set: true,
        groups: ["G1".to_string()].into(),
        devices: ["d1".to_string()].into(),
        subnets: ["s1".to_string()].into(),
        ..Default::default()
    };

    let processed = process(&graph, &config).unwrap();

    assert_eq!(names(&processed), vec!["d1", "s1"]);
    assert_eq!(processed.edges.len(), 1);
    assert_eq!(processed.groups.len(), 1);
    assert_eq!(processed.groups[0].id, "G1");
}

#[test]
fn inert_config_keeps_everything() {
    let graph = RawGraph {
        devices: vec![dev("d1", None), dev("d2", None)],
        links: vec![link("d1", "d2", 0)],
        ..Default::default()
    };

    let processed = process(&graph, &VisibilityConfig::default()).unwrap();
    assert_eq!(processed.nodes.len(), 2);
    assert_eq!(processed.edges.len(), 1);
}

// Scenario: a device whose only neighbors are single-homed leaf subnets folds
// them into one synthetic summarized cloud.
#[test]
fn single_homed_leaf_subnets_fold_into_a_summarized_cloud() {
    let graph = RawGraph {
        devices: vec![dev("D", None)],
        subnets: vec![
            sub("s1", "10.0.1.0"),
            sub("s2", "10.0.2.0"),
            sub("s3", "10.0.3.0"),
            sub("s4", "10.0.4.0"),
        ],
        links: vec![
            link("D", "s1", 1_000_000),
            link("D", "s2", 1_000_000),
            link("D", "s3", 1_000_000),
            link("D", "s4", 1_000_000),
        ],
        ..Default::default()
    };

    let processed = process(&graph, &VisibilityConfig::default()).unwrap();

    assert_eq!(names(&processed), vec!["D", "D - Summarized"]);
    let summary = &processed.nodes[1];
    assert!(summary.is_cloud && summary.is_summarized);
    assert_eq!(summary.total_subnets, 4);

    assert_eq!(processed.edges.len(), 1);
    let edge = &processed.edges[0];
    assert!(edge.is_summarized);
    assert_eq!(edge.total_subnets, 4);
    // Aggregates are integer sums of the folded edges' values.
    assert_eq!(edge.width, 12);
    assert_eq!(edge.bandwidth, 4_000_000);
}

#[test]
fn summarization_requires_more_than_one_foldable_edge() {
    let graph = RawGraph {
        devices: vec![dev("D", None)],
        subnets: vec![sub("s1", "10.0.1.0")],
        links: vec![link("D", "s1", 0)],
        ..Default::default()
    };

    let processed = process(&graph, &VisibilityConfig::default()).unwrap();
    assert_eq!(names(&processed), vec!["D", "s1"]);
    assert!(!processed.edges[0].is_summarized);
}

#[test]
fn multi_homed_subnets_are_never_folded() {
    let graph = RawGraph {
        devices: vec![dev("D", None), dev("E", None)],
        subnets: vec![
            sub("shared", "10.0.0.0"),
            sub("s1", "10.0.1.0"),
            sub("s2", "10.0.2.0"),
        ],
        links: vec![
            link("D", "shared", 0),
            link("E", "shared", 0),
            link("D", "s1", 0),
            link("D", "s2", 0),
        ],
        ..Default::default()
    };

    let processed = process(&graph, &VisibilityConfig::default()).unwrap();

    let node_names = names(&processed);
    assert!(node_names.contains(&"shared"));
    assert!(node_names.contains(&"D - Summarized"));
    assert!(!node_names.contains(&"s1"));
    assert!(!node_names.contains(&"s2"));
}

#[test]
fn summarization_can_be_disabled_by_config() {
    let graph = RawGraph {
        devices: vec![dev("D", None)],
        subnets: vec![sub("s1", "10.0.1.0"), sub("s2", "10.0.2.0")],
        links: vec![link("D", "s1", 0), link("D", "s2", 0)],
        ..Default::default()
    };
    let config = VisibilityConfig {
        subnet_summarization: false,
        ..Default::default()
    };

    let processed = process(&graph, &config).unwrap();

    assert!(!processed.nodes.iter().any(|n| n.is_summarized));
    assert_eq!(processed.nodes.iter().filter(|n| n.is_cloud).count(), 2);
}

// Scenario: two clouds each bridging the same pair of groups collapse into a
// single accumulated trunk edge.
#[test]
fn clouds_bridging_two_groups_fold_into_one_trunk_edge() {
    let graph = RawGraph {
        devices: vec![dev("a", Some("G1")), dev("b", Some("G2"))],
        subnets: vec![sub("c1", "10.0.1.0"), sub("c2", "10.0.2.0")],
        links: vec![
            link("a", "c1", 1_000_000),
            link("b", "c1", 1_000_000),
            link("a", "c2", 1_000_000),
            link("b", "c2", 1_000_000),
        ],
        groups: vec!["G1".to_string(), "G2".to_string()],
    };

    let processed = process(&graph, &VisibilityConfig::default()).unwrap();

    assert_eq!(names(&processed), vec!["a", "b"]);
    assert_eq!(processed.edges.len(), 1);
    let trunk = &processed.edges[0];
    assert!(trunk.is_trunked);
    assert_eq!(trunk.edge_key.as_deref(), Some("a:b"));
    assert_eq!(trunk.total_subnets, 4);
    // Width accumulates the min of each folded pair's widths.
    assert_eq!(trunk.width, 6);
}

#[test]
fn same_group_clouds_are_not_trunked() {
    let graph = RawGraph {
        devices: vec![dev("a", Some("G1")), dev("b", Some("G1"))],
        subnets: vec![sub("c", "10.0.1.0")],
        links: vec![link("a", "c", 0), link("b", "c", 0)],
        groups: vec!["G1".to_string()],
    };

    let processed = process(&graph, &VisibilityConfig::default()).unwrap();

    assert!(names(&processed).contains(&"c"));
    assert!(!processed.edges.iter().any(|e| e.is_trunked));
}

#[test]
fn clouds_with_one_or_three_connections_are_not_trunked() {
    let graph = RawGraph {
        devices: vec![
            dev("a", Some("G1")),
            dev("b", Some("G2")),
            dev("c", Some("G3")),
        ],
        subnets: vec![sub("lone", "10.0.1.0"), sub("triple", "10.0.2.0")],
        links: vec![
            link("a", "lone", 0),
            link("a", "triple", 0),
            link("b", "triple", 0),
            link("c", "triple", 0),
        ],
        groups: vec!["G1".to_string(), "G2".to_string(), "G3".to_string()],
    };

    let processed = process(&graph, &VisibilityConfig::default()).unwrap();

    let node_names = names(&processed);
    assert!(node_names.contains(&"lone"));
    assert!(node_names.contains(&"triple"));
    assert!(!processed.edges.iter().any(|e| e.is_trunked));
}

#[test]
fn processing_is_idempotent_for_identical_input() {
    let graph = RawGraph {
        devices: vec![dev("a", Some("G1")), dev("b", Some("G2")), dev("D", None)],
        subnets: vec![
            sub("c1", "10.0.1.0"),
            sub("c2", "10.0.2.0"),
            sub("s1", "10.1.1.0"),
            sub("s2", "10.1.2.0"),
        ],
        links: vec![
            link("a", "c1", 1_000_000),
            link("b", "c1", 1_000_000),
            link("a", "c2", 1_000_000),
            link("b", "c2", 1_000_000),
            link("D", "s1", 1_000_000),
            link("D", "s2", 1_000_000),
        ],
        groups: vec!["G1".to_string(), "G2".to_string()],
    };
    let config = VisibilityConfig::default();

    let first = process(&graph, &config).unwrap();
    let second = process(&graph, &config).unwrap();

    assert_eq!(names(&first), names(&second));
    let edge_view = |p: &Processed| {
        p.edges
            .iter()
            .map(|e| (e.source.clone(), e.target.clone(), e.width, e.total_subnets))
            .collect::<Vec<_>>()
    };
    assert_eq!(edge_view(&first), edge_view(&second));
}

#[test]
fn autocomplete_lists_subnets_then_devices() {
    let mut wan = sub("Corporate WAN", "0.0.0.0");
    wan.is_unmanaged = true;
    let graph = RawGraph {
        devices: vec![dev("core-sw", None)],
        subnets: vec![sub("s1", "10.0.1.0"), wan],
        ..Default::default()
    };

    let processed = topology::normalize(&graph).unwrap();

    // Managed clouds are searched by CIDR, WAN clouds by name.
    assert_eq!(processed.autocomplete, vec!["10.0.1.0", "Corporate WAN", "core-sw"]);
}

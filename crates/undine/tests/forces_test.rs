use rustc_hash::FxHashMap;
use selkie::Force;
use undine::forces::{Cluster, RectCollide, SubnetPull};
use undine::{Group, Node};

fn device(name: &str, group: Option<&str>, x: f64, y: f64) -> Node {
    let mut node = Node::device(name, name);
    node.group = group.map(str::to_string);
    node.x = x;
    node.y = y;
    node
}

fn cloud(name: &str, group: Option<&str>, x: f64, y: f64) -> Node {
    let mut node = Node::cloud(name, "10.0.0.0");
    node.group = group.map(str::to_string);
    node.x = x;
    node.y = y;
    node
}

fn boxed_group(id: &str, x: f64, y: f64, width: f64, height: f64) -> Group {
    let mut group = Group::new(id);
    group.x = x;
    group.y = y;
    group.width = width;
    group.height = height;
    group
}

// The subnet-pull slider at zero must not perturb the simulation at all.
#[test]
fn subnet_pull_at_weight_zero_is_a_pure_noop() {
    let mut force = SubnetPull::new();
    force.set_weight(0);
    let mut nodes = vec![
        cloud("c1", None, 500.0, 500.0),
        cloud("c2", None, -300.0, 100.0),
        device("d1", None, 50.0, 50.0),
    ];

    force.apply(&mut nodes, 1.0);

    for node in &nodes {
        assert_eq!(node.vx, 0.0);
        assert_eq!(node.vy, 0.0);
    }
}

#[test]
fn subnet_pull_moves_only_ungrouped_clouds() {
    let mut force = SubnetPull::new();
    force.set_weight(100);
    let mut nodes = vec![
        cloud("wan", None, 500.0, 0.0),
        cloud("grouped", Some("G"), 500.0, 0.0),
        device("dev", None, 500.0, 0.0),
    ];

    force.apply(&mut nodes, 1.0);

    // Pulled toward the center, so the velocity points back along -x.
    assert!(nodes[0].vx < 0.0);
    assert_eq!(nodes[1].vx, 0.0);
    assert_eq!(nodes[2].vx, 0.0);
}

#[test]
fn subnet_pull_strength_scales_with_the_weight() {
    let run = |weight: u32| {
        let mut force = SubnetPull::new();
        force.set_weight(weight);
        let mut nodes = vec![cloud("wan", None, 400.0, 0.0)];
        force.apply(&mut nodes, 1.0);
        nodes[0].vx.abs()
    };

    assert!(run(100) > run(10));
}

#[test]
fn cluster_pulls_members_toward_their_group_center() {
    let mut force = Cluster::new();
    let mut centers = FxHashMap::default();
    centers.insert("G".to_string(), (100.0, 200.0));
    force.configure(centers, true);
    let mut nodes = vec![device("a", Some("G"), 0.0, 0.0), device("b", None, 0.0, 0.0)];

    force.apply(&mut nodes, 1.0);

    assert!(nodes[0].vx > 0.0);
    assert!(nodes[0].vy > 0.0);
    // Ungrouped nodes are untouched.
    assert_eq!(nodes[1].vx, 0.0);
}

#[test]
fn cluster_is_inert_when_disabled_or_before_bounds_exist() {
    let mut force = Cluster::new();
    let mut centers = FxHashMap::default();
    centers.insert("G".to_string(), (100.0, 200.0));
    force.configure(centers, false);
    let mut nodes = vec![device("a", Some("G"), 0.0, 0.0)];
    force.apply(&mut nodes, 1.0);
    assert_eq!(nodes[0].vx, 0.0);

    // Zero centers mean bounds were never computed; skip rather than yank
    // everything to the origin.
    let mut zeroed = FxHashMap::default();
    zeroed.insert("G".to_string(), (0.0, 0.0));
    force.configure(zeroed, true);
    force.apply(&mut nodes, 1.0);
    assert_eq!(nodes[0].vx, 0.0);
}

#[test]
fn rect_collide_pushes_overlapping_groups_apart() {
    let mut groups = vec![
        boxed_group("G1", 0.0, 0.0, 200.0, 100.0),
        boxed_group("G2", 150.0, 10.0, 200.0, 100.0),
    ];
    let mut nodes = vec![
        device("a", Some("G1"), 100.0, 50.0),
        device("b", Some("G2"), 250.0, 60.0),
    ];

    RectCollide::new().apply(&mut groups, &mut nodes, None);

    // Members of the two groups move apart along the separation axis.
    assert!(nodes[0].x < 100.0, "left member at {}", nodes[0].x);
    assert!(nodes[1].x > 250.0, "right member at {}", nodes[1].x);
}

#[test]
fn rect_collide_leaves_fixed_groups_in_place() {
    let mut groups = vec![
        boxed_group("G1", 0.0, 0.0, 200.0, 100.0),
        boxed_group("G2", 150.0, 10.0, 200.0, 100.0),
    ];
    let mut anchored = device("a", Some("G1"), 100.0, 50.0);
    anchored.fx = Some(100.0);
    anchored.fy = Some(50.0);
    let mut nodes = vec![anchored, device("b", Some("G2"), 250.0, 60.0)];

    RectCollide::new().apply(&mut groups, &mut nodes, None);

    assert_eq!(nodes[0].x, 100.0);
    assert!(nodes[1].x > 250.0);
}

#[test]
fn rect_collide_corrects_a_lone_cloud_through_its_velocity() {
    let mut groups = vec![boxed_group("G1", 0.0, 0.0, 200.0, 100.0)];
    let mut nodes = vec![
        device("a", Some("G1"), 100.0, 50.0),
        cloud("wan", None, 220.0, 50.0),
    ];

    RectCollide::new().apply(&mut groups, &mut nodes, None);

    // The group side shifts its member positions; the cloud side only
    // accumulates velocity.
    assert!(nodes[0].x != 100.0);
    assert_eq!(nodes[1].x, 220.0);
    assert!(nodes[1].vx != 0.0);
}

#[test]
fn rect_collide_ignores_well_separated_groups() {
    let mut groups = vec![
        boxed_group("G1", 0.0, 0.0, 100.0, 100.0),
        boxed_group("G2", 1000.0, 1000.0, 100.0, 100.0),
    ];
    let mut nodes = vec![
        device("a", Some("G1"), 50.0, 50.0),
        device("b", Some("G2"), 1050.0, 1050.0),
    ];

    RectCollide::new().apply(&mut groups, &mut nodes, None);

    assert_eq!(nodes[0].x, 50.0);
    assert_eq!(nodes[1].x, 1050.0);
}

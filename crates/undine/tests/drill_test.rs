use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use undine::{DiagramContext, GraphSource, MemoryStore, NullSink, RawGraph, Settings};
use undine_core::model::{GroupRef, RawDevice, RawLink, RawSubnet};

fn dev(name: &str, group: &str) -> RawDevice {
    RawDevice {
        name: name.to_string(),
        group: Some(GroupRef::Path(group.to_string())),
        status: Default::default(),
        dev_num: None,
    }
}

fn sub(name: &str, subnet: &str) -> RawSubnet {
    RawSubnet {
        name: name.to_string(),
        subnet: subnet.to_string(),
        mask: None,
        group: None,
        status: Default::default(),
        is_unmanaged: false,
    }
}

fn link(source: &str, target: &str) -> RawLink {
    RawLink {
        source: source.to_string(),
        target: target.to_string(),
        bandwidth: 1_000_000,
        ip_address: None,
        status: Default::default(),
        is_static_wan: false,
        trunk: false,
    }
}

/// One diagram exercising both synthetic folds: `D` summarizes two leaf
/// subnets, `a`/`b` trunk through two bridging clouds.
struct BothFoldsSource;

impl GraphSource for BothFoldsSource {
    fn diagram(&self, _id: &str) -> LocalBoxFuture<'static, Result<RawGraph, String>> {
        let graph = RawGraph {
            devices: vec![dev("D", "Campus"), dev("a", "G1"), dev("b", "G2")],
            subnets: vec![
                sub("s1", "10.1.1.0"),
                sub("s2", "10.1.2.0"),
                sub("c1", "10.2.1.0"),
                sub("c2", "10.2.2.0"),
            ],
            links: vec![
                link("D", "s1"),
                link("D", "s2"),
                link("a", "c1"),
                link("b", "c1"),
                link("a", "c2"),
                link("b", "c2"),
            ],
            groups: vec!["Campus".to_string(), "G1".to_string(), "G2".to_string()],
        };
        Box::pin(async move { Ok(graph) })
    }

    fn device(&self, _name: &str) -> LocalBoxFuture<'static, Result<RawGraph, String>> {
        self.diagram("")
    }

    fn subnet(&self, _id: &str) -> LocalBoxFuture<'static, Result<RawGraph, String>> {
        self.diagram("")
    }
}

fn started_context() -> DiagramContext {
    let mut ctx = DiagramContext::new(
        "net",
        Settings::default(),
        Box::new(MemoryStore::new()),
        Box::new(NullSink),
    );
    block_on(ctx.start(&BothFoldsSource)).unwrap();
    ctx
}

#[test]
fn the_root_layer_shows_both_synthetic_folds() {
    let ctx = started_context();
    let layer = ctx.current_layer().unwrap();

    assert!(layer.nodes.iter().any(|n| n.name == "D - Summarized"));
    assert!(layer.edges.iter().any(|e| e.is_trunked && e.total_subnets == 4));
    // The folded records are gone from the simplified view.
    assert!(!layer.nodes.iter().any(|n| n.name == "s1" || n.name == "c1"));
}

#[test]
fn drilling_into_a_summarized_cloud_reexpands_the_folded_subnets() {
    let mut ctx = started_context();

    let seq = ctx.drill_summarized("D").unwrap();

    let layer = ctx.current_layer().unwrap();
    assert_eq!(layer.seq, seq);
    assert_eq!(layer.id, "summarized-D");
    let mut names: Vec<&str> = layer.nodes.iter().map(|n| n.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["D", "s1", "s2"]);
    assert_eq!(layer.edges.len(), 2);
    assert!(layer.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));

    ctx.remove_layer(seq).unwrap();
    assert_eq!(ctx.current_layer().unwrap().id, "main");
}

#[test]
fn drilling_into_a_trunk_shows_the_bridged_devices_in_bands() {
    let mut ctx = started_context();

    let seq = ctx.drill_trunk("a", "b").unwrap();

    let layer = ctx.current_layer().unwrap();
    assert_eq!(layer.seq, seq);
    assert_eq!(layer.id, "subnets-a:b");

    let band = |name: &str| {
        layer
            .nodes
            .iter()
            .find(|n| n.name == name)
            .map(|n| n.display_group)
    };
    assert_eq!(band("a"), Some(1));
    assert_eq!(band("b"), Some(2));
    assert_eq!(band("c1"), Some(0));
    assert_eq!(band("c2"), Some(0));
    // Two spokes per folded cloud.
    assert_eq!(layer.edges.len(), 4);
}

#[test]
fn drilling_into_an_unknown_device_is_an_error() {
    let mut ctx = started_context();
    assert!(ctx.drill_summarized("ghost").is_err());
    assert!(ctx.drill_trunk("ghost", "b").is_err());
}

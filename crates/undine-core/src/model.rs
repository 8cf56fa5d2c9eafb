//! The topology data model.
//!
//! Raw `Raw*` types mirror the ingest JSON; [`Node`], [`Edge`] and [`Group`]
//! are the working records the processor produces and the layout engine
//! mutates. Devices and subnets share one node type distinguished by
//! `is_cloud`, which is how the upstream data flows as well.

use selkie::Particle;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Group identity: the full backslash-separated name path
/// (e.g. `Campus\Building A`).
pub type GroupId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[serde(alias = "ok")]
    Healthy,
    #[serde(alias = "warning")]
    Suppressed,
    #[serde(alias = "issues")]
    Degraded,
    #[serde(alias = "offline")]
    CommFailure,
    Down,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Status {
    /// Severity color used by renderers; `None` means "use the default".
    pub fn fill_color(self) -> Option<&'static str> {
        match self {
            Status::Healthy => Some("green"),
            Status::Suppressed => Some("yellow"),
            Status::Degraded => Some("red"),
            Status::CommFailure => Some("grey"),
            Status::Down => Some("black"),
            Status::Unknown => None,
        }
    }

    pub fn is_alarming(self) -> bool {
        matches!(self, Status::Degraded | Status::CommFailure | Status::Down)
    }
}

/// A device's group reference arrives either as an index into the group name
/// list (the live API) or as a name path (exports, fixtures).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GroupRef {
    Index(i64),
    Path(String),
}

fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberOrString;

    impl de::Visitor<'_> for NumberOrString {
        type Value = u64;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a non-negative number or numeric string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            Ok(v.max(0) as u64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
            Ok(v.max(0.0) as u64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            v.trim().parse().map_err(de::Error::custom)
        }
    }

    deserializer.deserialize_any(NumberOrString)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDevice {
    pub name: String,
    #[serde(default)]
    pub group: Option<GroupRef>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, alias = "DevNum")]
    pub dev_num: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubnet {
    pub name: String,
    pub subnet: String,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub group: Option<GroupRef>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub is_unmanaged: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLink {
    pub source: String,
    pub target: String,
    #[serde(default, deserialize_with = "flexible_u64")]
    pub bandwidth: u64,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub is_static_wan: bool,
    #[serde(default)]
    pub trunk: bool,
}

/// The graph JSON as fetched. Group entries are name paths; nesting is
/// expressed with backslashes (`Parent\Child`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub devices: Vec<RawDevice>,
    #[serde(default)]
    pub subnets: Vec<RawSubnet>,
    #[serde(default)]
    pub links: Vec<RawLink>,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// A positioned diagram node: a managed device or a subnet cloud.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub name: String,
    pub id: String,
    /// `None` means ungrouped.
    pub group: Option<GroupId>,
    pub status: Status,
    pub is_cloud: bool,
    pub is_unmanaged: bool,
    pub subnet: Option<String>,
    pub mask: Option<String>,
    pub is_summarized: bool,
    /// For summarized clouds: how many single-homed leaf subnets were folded.
    pub total_subnets: u32,
    /// Band assignment in the trunk drill-down sub-layer (0 subnet, 1/2 the
    /// two endpoint devices).
    pub display_group: u8,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    /// Position stash swapped in and out by the grouping toggle.
    #[serde(skip)]
    pub px: Option<f64>,
    #[serde(skip)]
    pub py: Option<f64>,
    /// Drag anchors.
    #[serde(skip)]
    pub sx: f64,
    #[serde(skip)]
    pub sy: f64,
}

impl Node {
    fn blank(name: String, id: String) -> Self {
        Self {
            name,
            id,
            group: None,
            status: Status::Unknown,
            is_cloud: false,
            is_unmanaged: false,
            subnet: None,
            mask: None,
            is_summarized: false,
            total_subnets: 0,
            display_group: 0,
            x: f64::NAN,
            y: f64::NAN,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
            px: None,
            py: None,
            sx: 0.0,
            sy: 0.0,
        }
    }

    pub fn device(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::blank(name.into(), id.into())
    }

    pub fn cloud(name: impl Into<String>, subnet: impl Into<String>) -> Self {
        let name = name.into();
        let mut node = Self::blank(name.clone(), name);
        node.is_cloud = true;
        node.subnet = Some(subnet.into());
        node
    }
}

impl Particle for Node {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
    fn set_x(&mut self, x: f64) {
        self.x = x;
    }
    fn set_y(&mut self, y: f64) {
        self.y = y;
    }
    fn vx(&self) -> f64 {
        self.vx
    }
    fn vy(&self) -> f64 {
        self.vy
    }
    fn set_vx(&mut self, vx: f64) {
        self.vx = vx;
    }
    fn set_vy(&mut self, vy: f64) {
        self.vy = vy;
    }
    fn fx(&self) -> Option<f64> {
        self.fx
    }
    fn fy(&self) -> Option<f64> {
        self.fy
    }
}

/// A diagram link. Endpoints are node names; synthetic edges (summarized,
/// trunk) reference the synthetic node or the two bridged devices.
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub bandwidth: u64,
    pub status: Status,
    /// Render width derived from the bandwidth tier (or 5 for static WAN
    /// links); summarized/trunk edges carry aggregated widths.
    pub width: u32,
    pub ip_address: Option<String>,
    pub is_static_wan: bool,
    pub is_summarized: bool,
    pub is_trunked: bool,
    pub trunk: bool,
    pub total_subnets: u32,
    /// Unordered device-pair key for trunk edges (`a:b` with `a < b`).
    pub edge_key: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            bandwidth: 0,
            status: Status::Unknown,
            width: 0,
            ip_address: None,
            is_static_wan: false,
            is_summarized: false,
            is_trunked: false,
            trunk: false,
            total_subnets: 0,
            edge_key: None,
        }
    }
}

/// Raw (unpadded) bounding box of a group's member positions.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// A hierarchical group record. Geometry is derived from member positions by
/// the grouping model every tick; `x`/`y`/`vx`/`vy` double as the particle
/// state of the group-level simulation.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: GroupId,
    /// Leaf segment of the name path.
    pub name: String,
    pub parent: Option<GroupId>,
    pub has_child_group: bool,
    pub title_width: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Cluster target the node simulation pulls members toward.
    pub cx: f64,
    pub cy: f64,
    pub bounds: Option<Bounds>,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    /// Locked groups are skipped by the bounds recomputation (set while the
    /// focused group constrains member drags).
    pub locked: bool,
    pub node_count: usize,
    #[serde(skip)]
    pub sx: f64,
    #[serde(skip)]
    pub sy: f64,
}

impl Group {
    pub fn new(id: impl Into<GroupId>) -> Self {
        let id = id.into();
        let name = id.rsplit('\\').next().unwrap_or_default().to_string();
        Self {
            id,
            name,
            parent: None,
            has_child_group: false,
            title_width: 0.0,
            x: f64::NAN,
            y: f64::NAN,
            width: 0.0,
            height: 0.0,
            cx: 0.0,
            cy: 0.0,
            bounds: None,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
            locked: false,
            node_count: 0,
            sx: 0.0,
            sy: 0.0,
        }
    }
}

impl Particle for Group {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
    fn set_x(&mut self, x: f64) {
        self.x = x;
    }
    fn set_y(&mut self, y: f64) {
        self.y = y;
    }
    fn vx(&self) -> f64 {
        self.vx
    }
    fn vy(&self) -> f64 {
        self.vy
    }
    fn set_vx(&mut self, vx: f64) {
        self.vx = vx;
    }
    fn set_vy(&mut self, vy: f64) {
        self.vy = vy;
    }
    fn fx(&self) -> Option<f64> {
        self.fx
    }
    fn fy(&self) -> Option<f64> {
        self.fy
    }
}

//! Small shared helpers: bandwidth tiering, subnet classification, label
//! width estimation and edge keying.

use crate::model::Edge;

/// Render width tier for a link bandwidth in bits/s.
pub fn link_width(bandwidth: u64) -> u32 {
    const TIERS: [(u64, u32); 7] = [
        (10_000_000, 3),
        (100_000_000, 4),
        (1_000_000_000, 5),
        (10_000_000_000, 6),
        (25_000_000_000, 7),
        (50_000_000_000, 8),
        (100_000_000_000, 9),
    ];
    TIERS
        .iter()
        .find(|(limit, _)| bandwidth <= *limit)
        .map(|(_, width)| *width)
        .unwrap_or(10)
}

/// Human-readable bandwidth label (`100gig`, `10meg`, else `<n>bits`).
pub fn down_scale_bandwidth(value: u64) -> String {
    const TIERS: [(u64, &str); 9] = [
        (100_000_000_000, "100gig"),
        (50_000_000_000, "50gig"),
        (40_000_000_000, "40gig"),
        (25_000_000_000, "25gig"),
        (20_000_000_000, "20gig"),
        (10_000_000_000, "10gig"),
        (1_000_000_000, "1gig"),
        (100_000_000, "100meg"),
        (10_000_000, "10meg"),
    ];
    TIERS
        .iter()
        .find(|(limit, _)| value >= *limit)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| format!("{value}bits"))
}

/// Whether a dotted-quad subnet lies in public address space. RFC1918 and
/// link-local prefixes are private; unparsable octets count as public.
pub fn is_public_subnet(subnet: &str) -> bool {
    let mut octets = subnet.split('.');
    let first = octets.next().unwrap_or_default();
    let second = octets.next().unwrap_or_default();
    match first {
        "10" => false,
        "169" => second != "254",
        "172" => !second
            .parse::<u32>()
            .map(|n| (16..=31).contains(&n))
            .unwrap_or(false),
        "192" => second != "168",
        _ => true,
    }
}

/// True when at most one link terminates at the named cloud.
pub fn only_has_one_device(edges: &[Edge], cloud_name: &str) -> bool {
    edges.iter().filter(|e| e.target == cloud_name).count() <= 1
}

/// Deterministic stand-in for DOM text measurement: fixed per-character
/// advance for the 36px group title font, plus label padding.
pub fn title_width(text: &str) -> f64 {
    text.chars().count() as f64 * 20.0 + 40.0
}

/// Unordered pair key for trunk edges: `a:b` with the lower name first.
pub fn edge_key(a: &str, b: &str) -> String {
    if a < b {
        format!("{a}:{b}")
    } else {
        format!("{b}:{a}")
    }
}

/// Parent path of a group name path; `None` for root groups.
pub fn parent_path(path: &str) -> Option<String> {
    path.rsplit_once('\\').map(|(parent, _)| parent.to_string())
}

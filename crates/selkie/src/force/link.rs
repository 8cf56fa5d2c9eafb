//! Link attraction (`d3-force` `link.js`): a spring per link, biased toward
//! the lower-degree endpoint so hubs stay put.

use crate::random::{Lcg, jiggle};
use crate::{Force, Particle};
use rustc_hash::FxHashMap;
use std::any::Any;

/// One spring. Endpoints are resolved against the particle set by the
/// force's id accessor at `initialize` time.
#[derive(Debug, Clone)]
pub struct Link {
    pub source: String,
    pub target: String,
    /// Per-link strength; `None` selects the upstream default
    /// `1 / min(degree(source), degree(target))`.
    pub strength: Option<f64>,
    pub distance: f64,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            strength: None,
            distance: 30.0,
        }
    }

    pub fn strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }
}

pub struct LinkForce<N> {
    links: Vec<Link>,
    id: Box<dyn Fn(&N) -> String>,
    iterations: usize,
    resolved: Vec<(usize, usize)>,
    distances: Vec<f64>,
    strengths: Vec<f64>,
    bias: Vec<f64>,
    rng: Lcg,
}

impl<N: Particle> LinkForce<N> {
    pub fn new(links: Vec<Link>, id: impl Fn(&N) -> String + 'static) -> Self {
        Self {
            links,
            id: Box::new(id),
            iterations: 1,
            resolved: Vec::new(),
            distances: Vec::new(),
            strengths: Vec::new(),
            bias: Vec::new(),
            rng: Lcg::new(),
        }
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }
}

impl<N: Particle> Force<N> for LinkForce<N> {
    fn initialize(&mut self, nodes: &[N]) {
        let index: FxHashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| ((self.id)(n), i))
            .collect();

        // Links with endpoints outside the particle set are dropped rather
        // than panicking; callers validate their graphs upstream.
        self.resolved.clear();
        self.distances.clear();
        let mut kept = Vec::new();
        for link in &self.links {
            if let (Some(&s), Some(&t)) = (index.get(&link.source), index.get(&link.target)) {
                self.resolved.push((s, t));
                self.distances.push(link.distance);
                kept.push(link.strength);
            }
        }

        let mut count = vec![0usize; nodes.len()];
        for &(s, t) in &self.resolved {
            count[s] += 1;
            count[t] += 1;
        }

        self.bias.clear();
        self.strengths.clear();
        for (i, &(s, t)) in self.resolved.iter().enumerate() {
            self.bias.push(count[s] as f64 / (count[s] + count[t]) as f64);
            let default = 1.0 / count[s].min(count[t]).max(1) as f64;
            self.strengths.push(kept[i].unwrap_or(default));
        }
    }

    fn apply(&mut self, nodes: &mut [N], alpha: f64) {
        for _ in 0..self.iterations {
            for (i, &(s, t)) in self.resolved.iter().enumerate() {
                let mut x = nodes[t].x() + nodes[t].vx() - nodes[s].x() - nodes[s].vx();
                let mut y = nodes[t].y() + nodes[t].vy() - nodes[s].y() - nodes[s].vy();
                if x == 0.0 {
                    x = jiggle(&mut self.rng);
                }
                if y == 0.0 {
                    y = jiggle(&mut self.rng);
                }
                let mut l = (x * x + y * y).sqrt();
                l = (l - self.distances[i]) / l * alpha * self.strengths[i];
                x *= l;
                y *= l;
                let b = self.bias[i];
                nodes[t].set_vx(nodes[t].vx() - x * b);
                nodes[t].set_vy(nodes[t].vy() - y * b);
                nodes[s].set_vx(nodes[s].vx() + x * (1.0 - b));
                nodes[s].set_vy(nodes[s].vy() + y * (1.0 - b));
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

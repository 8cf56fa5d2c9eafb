//! Circle collision (`d3-force` `collide.js`): quadtree broad phase over
//! velocity-projected centers, mass split by radius squared.

use crate::quadtree::Quadtree;
use crate::random::{Lcg, jiggle};
use crate::{Force, Particle};
use std::any::Any;

pub struct Collide {
    radius: f64,
    strength: f64,
    iterations: usize,
    rng: Lcg,
}

impl Collide {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            strength: 1.0,
            iterations: 1,
            rng: Lcg::new(),
        }
    }

    pub fn strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }
}

impl<N: Particle> Force<N> for Collide {
    fn apply(&mut self, nodes: &mut [N], _alpha: f64) {
        let radius = self.radius;
        let strength = self.strength;
        let sizes: Vec<[f64; 2]> = vec![[radius, radius]; nodes.len()];

        for _ in 0..self.iterations {
            let projected: Vec<(f64, f64)> = nodes
                .iter()
                .map(|n| (n.x() + n.vx(), n.y() + n.vy()))
                .collect();
            let mut tree = Quadtree::build(&projected);
            tree.accumulate_extents(&sizes);

            for i in 0..nodes.len() {
                let ri = radius;
                let ri2 = ri * ri;
                let xi = nodes[i].x() + nodes[i].vx();
                let yi = nodes[i].y() + nodes[i].vy();
                let rng = &mut self.rng;

                tree.visit(|tree, ci, x0, y0, x1, y1| {
                    let cell = tree.cell(ci);
                    if cell.is_leaf() {
                        for &j in &cell.points {
                            if j <= i {
                                continue;
                            }
                            let rj = radius;
                            let r = ri + rj;
                            let mut x = xi - nodes[j].x() - nodes[j].vx();
                            let mut y = yi - nodes[j].y() - nodes[j].vy();
                            let mut l = x * x + y * y;
                            if l < r * r {
                                if x == 0.0 {
                                    x = jiggle(rng);
                                    l += x * x;
                                }
                                if y == 0.0 {
                                    y = jiggle(rng);
                                    l += y * y;
                                }
                                l = l.sqrt();
                                let d = (r - l) / l * strength;
                                x *= d;
                                y *= d;
                                let rj2 = rj * rj;
                                let m = rj2 / (ri2 + rj2);
                                nodes[i].set_vx(nodes[i].vx() + x * m);
                                nodes[i].set_vy(nodes[i].vy() + y * m);
                                nodes[j].set_vx(nodes[j].vx() - x * (1.0 - m));
                                nodes[j].set_vy(nodes[j].vy() - y * (1.0 - m));
                            }
                        }
                        return true;
                    }
                    let reach = ri + cell.size[0];
                    x0 > xi + reach || x1 < xi - reach || y0 > yi + reach || y1 < yi - reach
                });
            }
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//! Many-body repulsion (`d3-force` `manyBody.js`): Barnes-Hut approximation
//! over a charge-accumulated quadtree.

use crate::quadtree::Quadtree;
use crate::random::{Lcg, jiggle};
use crate::{Force, Particle};
use std::any::Any;

pub struct ManyBody {
    strength: f64,
    theta2: f64,
    distance_min2: f64,
    distance_max2: f64,
    rng: Lcg,
}

impl ManyBody {
    pub fn new() -> Self {
        Self {
            strength: -30.0,
            theta2: 0.81,
            distance_min2: 1.0,
            distance_max2: f64::INFINITY,
            rng: Lcg::new(),
        }
    }

    pub fn strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn distance_max(mut self, distance: f64) -> Self {
        self.distance_max2 = distance * distance;
        self
    }
}

impl Default for ManyBody {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Particle> Force<N> for ManyBody {
    fn apply(&mut self, nodes: &mut [N], alpha: f64) {
        let points: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x(), n.y())).collect();
        let mut tree = Quadtree::build(&points);
        tree.accumulate_charges(self.strength);

        for i in 0..nodes.len() {
            let xi = nodes[i].x();
            let yi = nodes[i].y();
            let mut dvx = 0.0;
            let mut dvy = 0.0;
            let rng = &mut self.rng;
            let (theta2, distance_min2, distance_max2, strength) = (
                self.theta2,
                self.distance_min2,
                self.distance_max2,
                self.strength,
            );

            tree.visit(|tree, ci, x0, _y0, x1, _y1| {
                let cell = tree.cell(ci);
                if !cell.is_leaf() {
                    let mut x = cell.cx - xi;
                    let mut y = cell.cy - yi;
                    let w = x1 - x0;
                    let mut l = x * x + y * y;

                    // The cell is far enough away: apply its aggregate charge.
                    if w * w / theta2 < l {
                        if l < distance_max2 {
                            if x == 0.0 {
                                x = jiggle(rng);
                                l += x * x;
                            }
                            if y == 0.0 {
                                y = jiggle(rng);
                                l += y * y;
                            }
                            if l < distance_min2 {
                                l = (distance_min2 * l).sqrt();
                            }
                            dvx += x * cell.value * alpha / l;
                            dvy += y * cell.value * alpha / l;
                        }
                        return true;
                    }
                    return false;
                }

                let mut x = cell.x - xi;
                let mut y = cell.y - yi;
                let mut l = x * x + y * y;
                if l >= distance_max2 {
                    return true;
                }
                let has_other = cell.points.iter().any(|&p| p != i);
                if has_other {
                    if x == 0.0 {
                        x = jiggle(rng);
                        l += x * x;
                    }
                    if y == 0.0 {
                        y = jiggle(rng);
                        l += y * y;
                    }
                    if l < distance_min2 {
                        l = (distance_min2 * l).sqrt();
                    }
                    for &p in &cell.points {
                        if p != i {
                            let w = strength * alpha / l;
                            dvx += x * w;
                            dvy += y * w;
                        }
                    }
                }
                true
            });

            nodes[i].set_vx(nodes[i].vx() + dvx);
            nodes[i].set_vy(nodes[i].vy() + dvy);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

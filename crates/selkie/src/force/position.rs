//! Positioning forces (`d3-force` `x.js` / `y.js`): a weak per-axis pull
//! toward a target coordinate.

use crate::{Force, Particle};
use std::any::Any;

type Accessor<N> = Box<dyn Fn(&N, usize) -> f64>;

pub struct PositionX<N> {
    x: Accessor<N>,
    strength: Accessor<N>,
}

impl<N: Particle> PositionX<N> {
    pub fn new() -> Self {
        Self {
            x: Box::new(|_, _| 0.0),
            strength: Box::new(|_, _| 0.1),
        }
    }

    pub fn x(mut self, value: f64) -> Self {
        self.x = Box::new(move |_, _| value);
        self
    }

    pub fn x_fn(mut self, f: impl Fn(&N, usize) -> f64 + 'static) -> Self {
        self.x = Box::new(f);
        self
    }

    pub fn strength(mut self, value: f64) -> Self {
        self.strength = Box::new(move |_, _| value);
        self
    }

    pub fn strength_fn(mut self, f: impl Fn(&N, usize) -> f64 + 'static) -> Self {
        self.strength = Box::new(f);
        self
    }
}

impl<N: Particle> Default for PositionX<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Particle> Force<N> for PositionX<N> {
    fn apply(&mut self, nodes: &mut [N], alpha: f64) {
        for (i, node) in nodes.iter_mut().enumerate() {
            let target = (self.x)(&*node, i);
            let strength = (self.strength)(&*node, i);
            node.set_vx(node.vx() + (target - node.x()) * strength * alpha);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub struct PositionY<N> {
    y: Accessor<N>,
    strength: Accessor<N>,
}

impl<N: Particle> PositionY<N> {
    pub fn new() -> Self {
        Self {
            y: Box::new(|_, _| 0.0),
            strength: Box::new(|_, _| 0.1),
        }
    }

    pub fn y(mut self, value: f64) -> Self {
        self.y = Box::new(move |_, _| value);
        self
    }

    pub fn y_fn(mut self, f: impl Fn(&N, usize) -> f64 + 'static) -> Self {
        self.y = Box::new(f);
        self
    }

    pub fn strength(mut self, value: f64) -> Self {
        self.strength = Box::new(move |_, _| value);
        self
    }

    pub fn strength_fn(mut self, f: impl Fn(&N, usize) -> f64 + 'static) -> Self {
        self.strength = Box::new(f);
        self
    }
}

impl<N: Particle> Default for PositionY<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Particle> Force<N> for PositionY<N> {
    fn apply(&mut self, nodes: &mut [N], alpha: f64) {
        for (i, node) in nodes.iter_mut().enumerate() {
            let target = (self.y)(&*node, i);
            let strength = (self.strength)(&*node, i);
            node.set_vy(node.vy() + (target - node.y()) * strength * alpha);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

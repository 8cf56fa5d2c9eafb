//! The simulation core: alpha schedule, force passes and velocity
//! integration, matching `d3-force`'s `simulation.js` tick for tick.

use crate::{Force, Particle};

const INITIAL_RADIUS: f64 = 10.0;

pub struct Simulation<N: Particle> {
    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    velocity_decay: f64,
    forces: Vec<(String, Box<dyn Force<N>>)>,
    stopped: bool,
}

impl<N: Particle> Simulation<N> {
    pub fn new() -> Self {
        let alpha_min: f64 = 0.001;
        Self {
            alpha: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.6,
            forces: Vec::new(),
            stopped: false,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha_min(&mut self, alpha_min: f64) {
        self.alpha_min = alpha_min;
    }

    pub fn set_alpha_decay(&mut self, alpha_decay: f64) {
        self.alpha_decay = alpha_decay;
    }

    /// Upstream API semantics: `velocity_decay(0.4)` keeps 60% of the
    /// velocity each tick.
    pub fn set_velocity_decay(&mut self, decay: f64) {
        self.velocity_decay = 1.0 - decay;
    }

    /// Installs (or replaces) the named force slot, preserving slot order.
    pub fn set_force(&mut self, name: impl Into<String>, force: impl Force<N>) {
        let name = name.into();
        let boxed: Box<dyn Force<N>> = Box::new(force);
        if let Some(slot) = self.forces.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = boxed;
        } else {
            self.forces.push((name, boxed));
        }
    }

    pub fn remove_force(&mut self, name: &str) {
        self.forces.retain(|(n, _)| n != name);
    }

    /// Typed access to a previously installed force, for runtime retuning.
    pub fn force_mut<F: Force<N>>(&mut self, name: &str) -> Option<&mut F> {
        self.forces
            .iter_mut()
            .find(|(n, _)| n == name)
            .and_then(|(_, f)| f.as_any_mut().downcast_mut::<F>())
    }

    /// Re-runs every force's `initialize` against the current particle set.
    /// Call after `set_force` or whenever the set changes.
    pub fn initialize_forces(&mut self, nodes: &[N]) {
        for (_, force) in &mut self.forces {
            force.initialize(nodes);
        }
    }

    /// Places particles with NaN coordinates on the upstream phyllotaxis
    /// spiral and zeroes NaN velocities.
    pub fn seed_positions(nodes: &mut [N]) {
        let initial_angle = std::f64::consts::PI * (3.0 - 5.0f64.sqrt());
        for (i, node) in nodes.iter_mut().enumerate() {
            if let Some(fx) = node.fx() {
                node.set_x(fx);
            }
            if let Some(fy) = node.fy() {
                node.set_y(fy);
            }
            if node.x().is_nan() || node.y().is_nan() {
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * initial_angle;
                node.set_x(radius * angle.cos());
                node.set_y(radius * angle.sin());
            }
            if node.vx().is_nan() || node.vy().is_nan() {
                node.set_vx(0.0);
                node.set_vy(0.0);
            }
        }
    }

    /// One logical step: alpha ramp, force passes, then integration with
    /// pinned particles snapped to their pin and their velocity cleared.
    pub fn tick(&mut self, nodes: &mut [N]) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        for (_, force) in &mut self.forces {
            force.apply(nodes, self.alpha);
        }

        for node in nodes.iter_mut() {
            match node.fx() {
                Some(fx) => {
                    node.set_x(fx);
                    node.set_vx(0.0);
                }
                None => {
                    node.set_vx(node.vx() * self.velocity_decay);
                    node.set_x(node.x() + node.vx());
                }
            }
            match node.fy() {
                Some(fy) => {
                    node.set_y(fy);
                    node.set_vy(0.0);
                }
                None => {
                    node.set_vy(node.vy() * self.velocity_decay);
                    node.set_y(node.y() + node.vy());
                }
            }
        }
    }

    /// Ticks until the alpha schedule settles or `max_ticks` is reached;
    /// returns the number of ticks run.
    pub fn run(&mut self, nodes: &mut [N], max_ticks: usize) -> usize {
        let mut ticks = 0;
        while !self.settled() && ticks < max_ticks {
            self.tick(nodes);
            ticks += 1;
        }
        ticks
    }

    pub fn settled(&self) -> bool {
        self.alpha < self.alpha_min
    }

    /// The interaction idiom: raise the alpha floor and resume, so the layout
    /// stays lively while the user drags. A settled simulation gets its alpha
    /// lifted to the target so ticking actually resumes.
    pub fn reheat(&mut self, target: f64) {
        self.alpha_target = target;
        if self.alpha < target {
            self.alpha = target;
        }
        self.stopped = false;
    }

    /// Lets the alpha schedule decay back to rest.
    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn restart(&mut self) {
        self.stopped = false;
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }
}

impl<N: Particle> Default for Simulation<N> {
    fn default() -> Self {
        Self::new()
    }
}

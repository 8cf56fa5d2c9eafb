#![forbid(unsafe_code)]

//! `selkie` is a deterministic, headless force-simulation library.
//!
//! Baseline: `d3-force` (v3). The simulation loop, alpha schedule, velocity
//! integration with `fx`/`fy` pinning, Barnes-Hut approximation and the
//! standard forces follow the upstream semantics closely, with two deliberate
//! departures:
//!
//! - there is no internal timer; callers drive [`Simulation::tick`] from their
//!   own scheduler, so a "frame" is a logical step rather than wall time;
//! - coincident-point jiggle uses the same LCG upstream uses, so repeated runs
//!   over identical input produce identical layouts.
//!
//! Simulated bodies implement [`Particle`]; the simulation never owns them.
//! Forces are plain structs implementing [`Force`] and are held in named
//! slots so callers can retune them at runtime (the upstream
//! `simulation.force("x", ...)` idiom).

use std::any::Any;

pub mod force;
pub mod quadtree;
pub mod random;
pub mod simulation;

pub use force::collide::Collide;
pub use force::link::{Link, LinkForce};
pub use force::many_body::ManyBody;
pub use force::position::{PositionX, PositionY};
pub use quadtree::Quadtree;
pub use random::{Lcg, jiggle};
pub use simulation::Simulation;

/// A simulated body. `x`/`y` are the integrated position, `vx`/`vy` the
/// velocity accumulated by forces within one tick, and `fx`/`fy` optional
/// pins that override integration entirely.
pub trait Particle: 'static {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn set_x(&mut self, x: f64);
    fn set_y(&mut self, y: f64);
    fn vx(&self) -> f64;
    fn vy(&self) -> f64;
    fn set_vx(&mut self, vx: f64);
    fn set_vy(&mut self, vy: f64);
    fn fx(&self) -> Option<f64>;
    fn fy(&self) -> Option<f64>;
}

/// One force pass over the particle set.
///
/// `initialize` is re-run whenever the particle set changes;
/// `apply` is invoked once per tick with the current alpha.
pub trait Force<N: Particle>: Any {
    fn initialize(&mut self, _nodes: &[N]) {}
    fn apply(&mut self, nodes: &mut [N], alpha: f64);
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

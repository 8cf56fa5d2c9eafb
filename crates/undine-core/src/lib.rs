#![forbid(unsafe_code)]

//! `undine-core` is the headless data core of the Undine network-topology
//! diagram engine: the device/subnet/link model, the topology simplification
//! pipeline (link dedup, group inference, visibility filtering, subnet and
//! trunk summarization) and the hierarchical group constraint model consumed
//! by the layout engine.
//!
//! Everything in this crate is pure and deterministic: identical input in
//! identical order produces identical output, which is what the snapshot
//! tests rely on.

pub mod config;
pub mod error;
pub mod grouping;
pub mod model;
pub mod topology;
pub mod util;

pub use config::{FloatMode, VisibilityConfig};
pub use error::{Error, Result};
pub use model::{Edge, Group, GroupId, Node, RawGraph, Status};
pub use topology::{Processed, process};

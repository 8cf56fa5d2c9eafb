#![forbid(unsafe_code)]

//! `undine` is a headless, interactive network-topology diagram engine.
//!
//! It layers four cooperating pieces over [`undine_core`]'s simplification
//! pipeline and [`selkie`]'s force primitives:
//!
//! - [`DiagramContext`]: one explicit controller owning settings, config,
//!   persistence handles and the layer stack (no module globals);
//! - [`engine::LayoutEngine`]: the coupled node/group simulations with the
//!   cluster, subnet-pull and rectangle-collision forces;
//! - the navigation stack in [`layers`]: validated layer lifecycle, async
//!   push with rollback, drill-down with stale-layer protection;
//! - persistence in [`layout`]/[`store`]: debounced layout, transform,
//!   config and opened-group documents keyed per diagram id.
//!
//! Execution is single-threaded and cooperative: the host drives
//! [`DiagramContext::tick`] (one logical frame) and
//! [`DiagramContext::advance`] (the logical clock for debounced saves);
//! suspension happens only at fetch `await` points.

pub mod context;
pub mod drill;
pub mod engine;
pub mod error;
pub mod forces;
pub mod layers;
pub mod layout;
pub mod sink;
pub mod store;
pub mod viewport;

pub use context::{DiagramContext, Settings};
pub use error::{Error, Result};
pub use layers::{GraphSource, Layer, LayerState, PushOptions};
pub use sink::{NullSink, RecordingSink, RenderSink, SinkEvent};
pub use store::{MemoryStore, Store};
pub use viewport::Transform;

pub use undine_core::{
    Edge, FloatMode, Group, GroupId, Node, RawGraph, Status, VisibilityConfig,
};

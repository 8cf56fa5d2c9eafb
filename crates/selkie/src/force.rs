//! The standard forces, one module per upstream source file.

pub mod collide;
pub mod link;
pub mod many_body;
pub mod position;

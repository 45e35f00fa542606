//! Raywave
//!
//! A wavefront Monte Carlo path tracer: primary rays are generated into a
//! buffer, traced in bulk by an external intersector, shaded in data-parallel
//! passes that perform next-event estimation and multiple importance
//! sampling, and compacted into the next bounce's buffer until all paths
//! terminate.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

pub mod core;
pub mod lights;
pub mod nodes;
pub mod renderer;

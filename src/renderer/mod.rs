//! Wavefront renderer.

mod accel;
mod camera;
mod context;
mod driver;
mod film;
mod ray;
mod scene;
mod tonemap;

// Re-export.
pub use accel::*;
pub use camera::*;
pub use context::*;
pub use driver::*;
pub use film::*;
pub use ray::*;
pub use scene::*;
pub use tonemap::*;

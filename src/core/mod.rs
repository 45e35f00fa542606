//! Core math, sampling and scattering primitives.

pub mod color;
pub mod geometry;
pub mod microfacet;
pub mod noise;
pub mod pbrt;
pub mod reflection;
pub mod rng;
pub mod sampling;
pub mod texture;

//! Math type re-exports from glam
//!
//! This module provides the core mathematical types used throughout
//! the physics engine, re-exported from the glam library. All vector
//! and quaternion algebra (dot, cross, Hamilton product, conjugate,
//! rotation) comes from glam; degenerate-length normalization goes
//! through `Vec3::normalize_or_zero` so a zero vector can never
//! propagate NaN into the simulation.

pub use glam::{Quat, Vec3, Vec4};

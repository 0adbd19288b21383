//! Fractal Dynamics
//!
//! An implicit-surface rigid-body physics engine. Bodies are defined by
//! signed distance fields (SDFs) instead of meshes: fractal generators such
//! as the power-8 Mandelbulb, the Sierpinski tetrahedron, and quaternion
//! Julia sets. Contact between moving bodies is found by sphere marching
//! along the relative displacement and resolved with impulse-based dynamics
//! (restitution, Coulomb friction, penetration correction).
//!
//! The engine is purely CPU-side and single-threaded: one [`world::World`]
//! owns the bodies, `step(dt)` advances them, and an external raymarching
//! renderer reads back GPU-ready body snapshots once per frame.
//!
//! # Modules
//!
//! - [`types`] - Math type re-exports from glam
//! - [`sdf`] - Signed distance field generators (sphere + fractals)
//! - [`body`] - Rigid body state and integration
//! - [`collision`] - Sphere-marched continuous collision detection
//! - [`contact`] - Impulse-based contact resolution
//! - [`world`] - Per-step orchestration (gravity, integrate, detect, resolve)
//! - [`scene`] - JSON scene descriptions for initial body setup
//!
//! # Example
//!
//! ```ignore
//! use fractal_dynamics::scene::SceneConfig;
//!
//! // Two fractal bodies on a collision course (the default scene).
//! let mut world = SceneConfig::default().build();
//!
//! loop {
//!     world.step(1.0 / 60.0);
//!     let snapshots = world.gpu_bodies();
//!     // upload `snapshots` to the renderer's body SSBO...
//! }
//! ```

pub mod body;
pub mod collision;
pub mod contact;
pub mod scene;
pub mod sdf;
pub mod types;
pub mod world;

pub use body::{GpuBody, RigidBody};
pub use collision::{Contact, MarchConfig, SweepHit};
pub use contact::ContactParams;
pub use scene::SceneConfig;
pub use sdf::DistanceField;
pub use world::{SimConfig, World};

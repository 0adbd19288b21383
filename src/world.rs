//! Per-Step Simulation Orchestration
//!
//! One [`World`] owns the bodies and sequences each tick:
//! gravity -> integrate -> detect -> resolve -> publish. Every operation is
//! pure numeric computation with bounded loops, so a step always runs to
//! completion; there are no recoverable error states. Degenerate scene
//! input (zero mass, NaN velocity) is a contract violation by the caller.
//!
//! Single-threaded by design: resolver updates read-then-write body fields
//! without atomicity, so mutation of a body must never be concurrent. Call
//! `step` once per render frame, or drive it from a fixed-timestep loop
//! feeding snapshots to a separate render thread.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::body::{GpuBody, RigidBody};
use crate::collision::{Contact, MarchConfig, SweepHit, static_pair_contact, sweep_sphere};
use crate::contact::{ContactParams, resolve};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Global simulation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Gravitational constant `G` for the pairwise inverse-square coupling
    pub gravity_constant: f32,
    /// Softening added to squared distances so coincident centers cannot
    /// produce an infinite force
    pub softening: f32,
    /// Relative displacement (per step, meters) below which a pair is
    /// handled by the symmetric static narrow phase instead of the sweep
    pub resting_threshold: f32,
    /// Contact material parameters
    pub contact: ContactParams,
    /// Collision marching parameters
    pub march: MarchConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity_constant: 1.0,
            softening: 1e-6,
            resting_threshold: 1e-4,
            contact: ContactParams::default(),
            march: MarchConfig::default(),
        }
    }
}

// ============================================================================
// WORLD
// ============================================================================

/// The simulation scene: a set of rigid bodies plus configuration.
///
/// Bodies are created at scene setup and persist for the lifetime of the
/// world; the renderer reads them back via [`World::gpu_bodies`] once per
/// frame.
#[derive(Debug, Clone, Default)]
pub struct World {
    /// All simulated bodies, mutated in place each step
    pub bodies: Vec<RigidBody>,
    /// Simulation parameters
    pub config: SimConfig,
}

impl World {
    /// Creates an empty world with the given configuration.
    pub fn new(config: SimConfig) -> Self {
        Self {
            bodies: Vec::new(),
            config,
        }
    }

    /// Creates a world from pre-built bodies.
    pub fn with_bodies(config: SimConfig, bodies: Vec<RigidBody>) -> Self {
        Self { bodies, config }
    }

    /// Adds a body and returns its index.
    pub fn push(&mut self, body: RigidBody) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Sequence per tick: accumulate gravity, integrate each body with
    /// continuous collision detection against every other body (at most one
    /// discrete collision event per body per step), handle near-static
    /// overlaps, then integrate orientations.
    pub fn step(&mut self, dt: f32) {
        self.apply_gravity(dt);
        self.advance_with_collisions(dt);
        self.resolve_resting_pairs(dt);
        for body in &mut self.bodies {
            body.integrate_orientation(dt);
        }
    }

    /// Renderer-facing snapshots of every body (the publish step).
    pub fn gpu_bodies(&self) -> Vec<GpuBody> {
        self.bodies.iter().map(RigidBody::gpu).collect()
    }

    /// Pairwise inverse-square gravity, applied as equal and opposite
    /// velocity increments along the center line.
    fn apply_gravity(&mut self, dt: f32) {
        let g = self.config.gravity_constant;
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let diff = self.bodies[j].position - self.bodies[i].position;
                let d2 = diff.length_squared() + self.config.softening;
                let force = g * self.bodies[i].mass * self.bodies[j].mass / d2;
                let dir = diff.normalize_or_zero();

                let fi = dir * (force / self.bodies[i].mass) * dt;
                let fj = dir * (force / self.bodies[j].mass) * dt;
                self.bodies[i].velocity += fi;
                self.bodies[j].velocity -= fj;
            }
        }
    }

    /// Integrates linear motion with swept collision detection.
    ///
    /// For each body in index order: sweep its bounding sphere along
    /// `velocity * dt` against every other body and take the earliest hit.
    /// On a hit, snap to the impact parameter, resolve the impulse, and
    /// integrate the remainder of the step with the post-impulse velocity.
    fn advance_with_collisions(&mut self, dt: f32) {
        for i in 0..self.bodies.len() {
            let start = self.bodies[i].position;
            let displacement = self.bodies[i].velocity * dt;

            let hit = self.earliest_sweep(i, start, displacement);
            match hit {
                None => self.bodies[i].position += displacement,
                Some((j, hit)) => {
                    let len = displacement.length();
                    // Impact parameter is a distance along the displacement;
                    // convert to the time actually consumed
                    let t_time = (hit.t / len) * dt;

                    self.bodies[i].position = start + displacement / len * hit.t;

                    let contact = Contact {
                        point: hit.point,
                        normal: hit.normal,
                        penetration: 0.0,
                    };
                    let (a, b) = pair_mut(&mut self.bodies, i, j);
                    resolve(a, b, &contact, &self.config.contact);

                    // Finish the step with the post-impulse velocity
                    let remaining = (dt - t_time).max(0.0);
                    let v = self.bodies[i].velocity;
                    self.bodies[i].position += v * remaining;
                }
            }
        }
    }

    /// Earliest sweep hit of body `i` against every other body.
    fn earliest_sweep(
        &self,
        i: usize,
        start: Vec3,
        displacement: Vec3,
    ) -> Option<(usize, SweepHit)> {
        let mut first: Option<(usize, SweepHit)> = None;
        for (j, target) in self.bodies.iter().enumerate() {
            if j == i {
                continue;
            }
            if let Some(hit) =
                sweep_sphere(start, displacement, self.bodies[i].radius, target, &self.config.march)
            {
                if first.is_none_or(|(_, best)| hit.t < best.t) {
                    first = Some((j, hit));
                }
            }
        }
        first
    }

    /// Symmetric narrow phase for pairs the sweep cannot see.
    ///
    /// When the relative motion this step is below the resting threshold,
    /// the swept detector degenerates; fall back to the meet-in-the-middle
    /// contact so slowly sinking pairs still get an impulse and positional
    /// correction.
    fn resolve_resting_pairs(&mut self, dt: f32) {
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let rel_motion =
                    (self.bodies[i].velocity - self.bodies[j].velocity).length() * dt;
                if rel_motion > self.config.resting_threshold {
                    continue;
                }
                if let Some(contact) =
                    static_pair_contact(&self.bodies[i], &self.bodies[j], &self.config.march)
                {
                    let (a, b) = pair_mut(&mut self.bodies, i, j);
                    resolve(a, b, &contact, &self.config.contact);
                }
            }
        }
    }
}

/// Splits two distinct mutable body references out of the slice.
fn pair_mut(bodies: &mut [RigidBody], i: usize, j: usize) -> (&mut RigidBody, &mut RigidBody) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = bodies.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

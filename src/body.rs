//! Rigid Body State and Integration
//!
//! A body is a bounding sphere carrying an SDF shape: the local field is
//! implicitly scaled so its surface sits at `radius` world units from the
//! center. Linear state integrates with semi-implicit Euler; orientation
//! integrates the quaternion rate `dq/dt = 0.5 * (0, w) * q` first-order
//! and renormalizes every step to bound drift.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

use crate::sdf::DistanceField;

/// Floor applied to radius, mass, and inertia at construction time.
///
/// Mid-run violations of the positivity invariants are a scene-setup
/// contract breach and are not defended against.
const MIN_PHYSICAL: f32 = 1e-3;

/// Solid-sphere rotational inertia `2/5 * m * r^2` (scalar approximation).
pub fn sphere_inertia(mass: f32, radius: f32) -> f32 {
    0.4 * mass * radius * radius
}

/// A rigid body whose shape is an implicit surface.
///
/// Invariants: `orientation` stays unit length (renormalized after every
/// integration), and `radius`, `mass`, `inertia` are strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct RigidBody {
    /// World-space center (meters)
    pub position: Vec3,
    /// World-space linear velocity (meters/second)
    pub velocity: Vec3,
    /// World-space angular velocity (radians/second per axis)
    pub angular_velocity: Vec3,
    /// Rotation of the local SDF frame (unit quaternion)
    pub orientation: Quat,
    /// Bounding-sphere radius (meters); the local field is scaled to it
    pub radius: f32,
    /// Mass (kilograms)
    pub mass: f32,
    /// Scalar rotational inertia (spherical approximation)
    pub inertia: f32,
    /// Which SDF generator defines this body's surface
    pub shape: DistanceField,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            radius: 1.0,
            mass: 1.0,
            inertia: sphere_inertia(1.0, 1.0),
            shape: DistanceField::default(),
        }
    }
}

impl RigidBody {
    /// Creates a body at rest with solid-sphere inertia.
    ///
    /// Radius and mass are clamped to a small positive floor so the
    /// positivity invariants hold from construction.
    pub fn new(position: Vec3, radius: f32, mass: f32, shape: DistanceField) -> Self {
        let radius = radius.max(MIN_PHYSICAL);
        let mass = mass.max(MIN_PHYSICAL);
        Self {
            position,
            radius,
            mass,
            inertia: sphere_inertia(mass, radius),
            shape,
            ..Self::default()
        }
    }

    /// Builder method: sets the initial linear velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder method: sets the initial angular velocity.
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Builder method: sets the initial orientation (renormalized).
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    /// Builder method: overrides the scalar inertia (clamped positive).
    pub fn with_inertia(mut self, inertia: f32) -> Self {
        self.inertia = inertia.max(MIN_PHYSICAL);
        self
    }

    /// Signed distance from a world-space point to this body's surface.
    ///
    /// Transforms into the local radius-normalized frame (inverse rotation,
    /// divide by radius), evaluates the shape, and scales back to world
    /// units.
    pub fn signed_distance(&self, world_point: Vec3) -> f32 {
        let local = self.orientation.conjugate() * (world_point - self.position) / self.radius;
        self.shape.evaluate(local) * self.radius
    }

    /// Velocity of the material point at a world-space position, including
    /// the angular contribution through the lever arm.
    pub fn velocity_at(&self, point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(point - self.position)
    }

    /// Advances the center by `velocity * dt`.
    pub fn integrate_linear(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Advances the orientation by the quaternion rate
    /// `dq/dt = 0.5 * (0, w) * q`, then renormalizes.
    ///
    /// First-order: drifts under large `dt` or fast spin, which the
    /// renormalization keeps bounded. Zero angular velocity preserves the
    /// quaternion exactly.
    pub fn integrate_orientation(&mut self, dt: f32) {
        let w = self.angular_velocity;
        if w == Vec3::ZERO {
            return;
        }
        let rate = Quat::from_xyzw(w.x, w.y, w.z, 0.0) * self.orientation;
        self.orientation = (self.orientation + rate * (0.5 * dt)).normalize();
    }

    /// Total kinetic energy `1/2 m |v|^2 + 1/2 I |w|^2`.
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
            + 0.5 * self.inertia * self.angular_velocity.length_squared()
    }

    /// Renderer-facing snapshot of this body.
    pub fn gpu(&self) -> GpuBody {
        GpuBody {
            position_radius: [
                self.position.x,
                self.position.y,
                self.position.z,
                self.radius,
            ],
            orientation: self.orientation.to_array(),
            shape: [self.shape.shape_id(), self.shape.iterations(), 0, 0],
        }
    }
}

// ============================================================================
// GPU SNAPSHOT
// ============================================================================

/// Per-body data published to the external raymarcher each frame.
///
/// std430-compatible layout shared with the render shader's body SSBO.
/// The renderer needs only position, orientation, radius, and the shape
/// selector; velocities and masses stay physics-internal.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuBody {
    /// xyz = world center, w = bounding radius
    pub position_radius: [f32; 4],
    /// Orientation quaternion (x, y, z, w)
    pub orientation: [f32; 4],
    /// x = shape id, y = field iteration count, zw reserved
    pub shape: [u32; 4],
}

static_assertions::assert_eq_size!(GpuBody, [u8; 48]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_physical_parameters() {
        let b = RigidBody::new(Vec3::ZERO, 0.0, -5.0, DistanceField::sphere());
        assert!(b.radius > 0.0);
        assert!(b.mass > 0.0);
        assert!(b.inertia > 0.0);
    }

    #[test]
    fn test_signed_distance_scaled_sphere() {
        let b = RigidBody::new(Vec3::new(1.0, 0.0, 0.0), 2.0, 1.0, DistanceField::sphere());
        // Point 5m from center, surface at 2m: distance 3m
        let d = b.signed_distance(Vec3::new(6.0, 0.0, 0.0));
        assert!((d - 3.0).abs() < 1e-5, "Expected 3.0, got {}", d);
        // Center is one radius inside
        let inside = b.signed_distance(b.position);
        assert!((inside + 2.0).abs() < 1e-5, "Expected -2.0, got {}", inside);
    }

    #[test]
    fn test_signed_distance_respects_orientation() {
        // An oriented sphere is still a sphere; distances must not change
        // under rotation of the local frame.
        let plain = RigidBody::new(Vec3::ZERO, 1.5, 1.0, DistanceField::sphere());
        let rotated = plain.with_orientation(Quat::from_rotation_z(1.1));
        let p = Vec3::new(0.3, -2.0, 1.0);
        assert!((plain.signed_distance(p) - rotated.signed_distance(p)).abs() < 1e-5);
    }

    #[test]
    fn test_orientation_norm_preserved_without_spin() {
        let mut b = RigidBody::default();
        let before = b.orientation;
        for _ in 0..100 {
            b.integrate_orientation(0.016);
        }
        assert_eq!(b.orientation, before);
        assert!((b.orientation.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orientation_stays_unit_under_spin() {
        let mut b = RigidBody::default().with_angular_velocity(Vec3::new(3.0, -2.0, 5.0));
        for _ in 0..500 {
            b.integrate_orientation(0.016);
            assert!(
                (b.orientation.length() - 1.0).abs() < 1e-4,
                "Quaternion drifted off unit length: {}",
                b.orientation.length()
            );
        }
    }

    #[test]
    fn test_orientation_integration_matches_axis_angle() {
        // Small-step integration about a fixed axis should track the
        // closed-form rotation.
        let axis = Vec3::Y;
        let speed = 1.0; // rad/s
        let mut b = RigidBody::default().with_angular_velocity(axis * speed);

        let dt = 1e-3;
        let steps = 1000; // one second => one radian about Y
        for _ in 0..steps {
            b.integrate_orientation(dt);
        }

        let expected = Quat::from_axis_angle(axis, 1.0);
        let dot = b.orientation.dot(expected).abs();
        assert!(dot > 0.9999, "Expected ~1 rad about Y, dot = {}", dot);
    }

    #[test]
    fn test_velocity_at_lever_arm() {
        let b = RigidBody::default()
            .with_velocity(Vec3::new(1.0, 0.0, 0.0))
            .with_angular_velocity(Vec3::new(0.0, 0.0, 2.0));
        // Point one meter along +X: w x r = (0,0,2) x (1,0,0) = (0,2,0)
        let v = b.velocity_at(Vec3::new(1.0, 0.0, 0.0));
        assert!((v - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_gpu_snapshot_contents() {
        let b = RigidBody::new(
            Vec3::new(1.0, 2.0, 3.0),
            1.5,
            4.0,
            DistanceField::mandelbulb(),
        );
        let g = b.gpu();
        assert_eq!(g.position_radius, [1.0, 2.0, 3.0, 1.5]);
        assert_eq!(g.orientation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(g.shape[0], DistanceField::mandelbulb().shape_id());
        assert_eq!(g.shape[1], crate::sdf::MANDELBULB_ITERATIONS);
    }

    #[test]
    fn test_gpu_snapshot_is_pod() {
        let g = RigidBody::default().gpu();
        let bytes: &[u8] = bytemuck::bytes_of(&g);
        assert_eq!(bytes.len(), 48);
    }
}

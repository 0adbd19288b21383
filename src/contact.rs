//! Impulse-Based Contact Resolution
//!
//! Applies a restitution impulse along the contact normal, a Coulomb-
//! clamped friction impulse along the tangent, and a positional correction
//! against discrete-step sinking. Angular effects couple through the
//! lever-arm cross products with the scalar-inertia approximation.
//!
//! Sign convention: the manifold normal points from body A to body B, the
//! impulse pushes the bodies apart (A subtracts, B adds), and separating
//! contacts (`vn >= 0`) are left strictly untouched - no negative-impulse
//! "sucking" contacts.

use serde::{Deserialize, Serialize};

use crate::body::RigidBody;
use crate::collision::Contact;

/// Tangential speeds below this are treated as no sliding.
const MIN_TANGENT_SPEED_SQ: f32 = 1e-12;

/// Material and stabilization parameters for contact resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactParams {
    /// Restitution coefficient `e`: 1 = perfectly elastic, 0 = inelastic
    pub restitution: f32,
    /// Coulomb friction coefficient (tangential impulse clamp)
    pub friction: f32,
    /// Fraction of the penetration each body is pushed back along the
    /// normal. A stabilization hack, not exact physics: discrete steps let
    /// bodies sink, and this bleeds the overlap off.
    pub correction_factor: f32,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            restitution: 1.0,
            friction: 0.5,
            correction_factor: 0.5,
        }
    }
}

impl ContactParams {
    /// Perfectly elastic, frictionless parameters.
    pub fn elastic() -> Self {
        Self {
            restitution: 1.0,
            friction: 0.0,
            correction_factor: 0.5,
        }
    }
}

/// Resolves a contact between bodies A and B.
///
/// Returns `true` when an impulse was applied; a separating pair is left
/// untouched and returns `false`.
pub fn resolve(
    a: &mut RigidBody,
    b: &mut RigidBody,
    contact: &Contact,
    params: &ContactParams,
) -> bool {
    let n = contact.normal;
    let ra = contact.point - a.position;
    let rb = contact.point - b.position;

    // Contact-point velocities including rotation
    let rel = b.velocity_at(contact.point) - a.velocity_at(contact.point);
    let vn = rel.dot(n);
    if vn >= 0.0 {
        return false;
    }

    // Effective inverse mass along the normal, with rotational coupling
    // through the lever arms (scalar-inertia approximation)
    let k = 1.0 / a.mass
        + 1.0 / b.mass
        + ra.cross(n).length_squared() / a.inertia
        + rb.cross(n).length_squared() / b.inertia;

    let j = -(1.0 + params.restitution) * vn / k;
    let jn = n * j;

    a.velocity -= jn / a.mass;
    b.velocity += jn / b.mass;
    a.angular_velocity -= ra.cross(jn) / a.inertia;
    b.angular_velocity += rb.cross(jn) / b.inertia;

    apply_friction(a, b, contact, j, params);

    // Positional correction: push the bodies apart along the normal to
    // counter discrete-step sinking
    if contact.penetration > 0.0 {
        let correction = n * (contact.penetration * params.correction_factor);
        a.position -= correction;
        b.position += correction;
    }

    true
}

/// Coulomb friction against the post-impulse tangential relative velocity.
fn apply_friction(
    a: &mut RigidBody,
    b: &mut RigidBody,
    contact: &Contact,
    normal_impulse: f32,
    params: &ContactParams,
) {
    if params.friction <= 0.0 {
        return;
    }

    let n = contact.normal;
    let ra = contact.point - a.position;
    let rb = contact.point - b.position;

    let rel = b.velocity_at(contact.point) - a.velocity_at(contact.point);
    let tangent_vel = rel - n * rel.dot(n);
    if tangent_vel.length_squared() < MIN_TANGENT_SPEED_SQ {
        return;
    }

    let tangent = tangent_vel.normalize();
    // Effective mass along the tangent; using the normal-based one would
    // overshoot whenever the lever arms couple differently into the two
    // directions and could inject energy
    let kt = 1.0 / a.mass
        + 1.0 / b.mass
        + ra.cross(tangent).length_squared() / a.inertia
        + rb.cross(tangent).length_squared() / b.inertia;
    let max_friction = normal_impulse * params.friction;
    let jt = (-rel.dot(tangent) / kt).clamp(-max_friction, max_friction);
    let jtv = tangent * jt;

    a.velocity -= jtv / a.mass;
    b.velocity += jtv / b.mass;
    a.angular_velocity -= ra.cross(jtv) / a.inertia;
    b.angular_velocity += rb.cross(jtv) / b.inertia;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdf::DistanceField;
    use glam::Vec3;

    fn body(x: f32, vx: f32) -> RigidBody {
        RigidBody::new(Vec3::new(x, 0.0, 0.0), 1.0, 1.0, DistanceField::sphere())
            .with_velocity(Vec3::new(vx, 0.0, 0.0))
    }

    fn head_on_contact() -> Contact {
        Contact {
            point: Vec3::ZERO,
            normal: Vec3::X,
            penetration: 0.0,
        }
    }

    #[test]
    fn test_elastic_head_on_swaps_velocities() {
        // Equal masses, e = 1, contact on the center line: exchange
        let mut a = body(-1.0, 1.0);
        let mut b = body(1.0, -1.0);

        let applied = resolve(&mut a, &mut b, &head_on_contact(), &ContactParams::elastic());

        assert!(applied);
        assert!((a.velocity - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((b.velocity - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_separating_contact_is_noop() {
        let mut a = body(-1.0, -1.0);
        let mut b = body(1.0, 1.0);
        let (va, vb) = (a.velocity, b.velocity);
        let (pa, pb) = (a.position, b.position);

        let applied = resolve(&mut a, &mut b, &head_on_contact(), &ContactParams::default());

        assert!(!applied);
        assert_eq!(a.velocity, va);
        assert_eq!(b.velocity, vb);
        assert_eq!(a.position, pa);
        assert_eq!(b.position, pb);
    }

    #[test]
    fn test_relative_normal_velocity_sign_flips() {
        let mut a = body(-1.0, 2.0);
        let mut b = body(1.0, 0.0);
        let contact = head_on_contact();

        let vn_before = (b.velocity - a.velocity).dot(contact.normal);
        resolve(&mut a, &mut b, &contact, &ContactParams::elastic());
        let vn_after = (b.velocity - a.velocity).dot(contact.normal);

        assert!(vn_before < 0.0);
        assert!(
            (vn_after + vn_before).abs() < 1e-5,
            "e = 1 must reverse the normal relative velocity: {} -> {}",
            vn_before,
            vn_after
        );
    }

    #[test]
    fn test_inelastic_contact_dissipates_energy() {
        let params = ContactParams {
            restitution: 0.5,
            friction: 0.0,
            correction_factor: 0.0,
        };
        let mut a = body(-1.0, 1.5);
        let mut b = body(1.0, -0.5);

        let before = a.kinetic_energy() + b.kinetic_energy();
        resolve(&mut a, &mut b, &head_on_contact(), &params);
        let after = a.kinetic_energy() + b.kinetic_energy();

        assert!(
            after <= before + 1e-5,
            "e < 1 must not add energy: {} -> {}",
            before,
            after
        );
        assert!(after < before, "e = 0.5 must actually dissipate");
    }

    #[test]
    fn test_momentum_conserved() {
        let mut a = body(-1.0, 3.0);
        let mut b = RigidBody::new(Vec3::new(1.0, 0.0, 0.0), 1.0, 4.0, DistanceField::sphere())
            .with_velocity(Vec3::new(-1.0, 0.0, 0.0));

        let before = a.velocity * a.mass + b.velocity * b.mass;
        resolve(&mut a, &mut b, &head_on_contact(), &ContactParams::default());
        let after = a.velocity * a.mass + b.velocity * b.mass;

        assert!((after - before).length() < 1e-4);
    }

    #[test]
    fn test_offset_contact_spins_bodies() {
        // Contact point off the center line converts linear motion to spin.
        let mut a = body(-1.0, 1.0);
        let mut b = body(1.0, -1.0);
        let contact = Contact {
            point: Vec3::new(0.0, 0.5, 0.0),
            normal: Vec3::X,
            penetration: 0.0,
        };

        resolve(&mut a, &mut b, &contact, &ContactParams::elastic());

        assert!(a.angular_velocity.length() > 0.0);
        assert!(b.angular_velocity.length() > 0.0);
    }

    #[test]
    fn test_friction_damps_tangential_slide() {
        let params = ContactParams {
            restitution: 1.0,
            friction: 0.5,
            correction_factor: 0.0,
        };
        // Approaching along X with a sideways slide on A
        let mut a = body(-1.0, 1.0).with_velocity(Vec3::new(1.0, 1.0, 0.0));
        let mut b = body(1.0, -1.0);
        let contact = head_on_contact();

        let tangential_before = (b.velocity - a.velocity).y.abs();
        resolve(&mut a, &mut b, &contact, &params);
        let tangential_after = (b.velocity_at(contact.point) - a.velocity_at(contact.point))
            .y
            .abs();

        assert!(
            tangential_after < tangential_before,
            "Friction must reduce tangential slip: {} -> {}",
            tangential_before,
            tangential_after
        );
    }

    #[test]
    fn test_positional_correction_splits_penetration() {
        let mut a = body(-0.75, 1.0);
        let mut b = body(0.75, -1.0);
        let contact = Contact {
            point: Vec3::ZERO,
            normal: Vec3::X,
            penetration: 0.5,
        };

        resolve(&mut a, &mut b, &contact, &ContactParams::elastic());

        // Half the penetration each, pushed apart along the normal
        assert!((a.position.x - (-1.0)).abs() < 1e-5, "A at {}", a.position.x);
        assert!((b.position.x - 1.0).abs() < 1e-5, "B at {}", b.position.x);
    }
}

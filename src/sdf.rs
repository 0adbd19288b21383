//! Signed Distance Field Generators
//!
//! Each generator is a pure function `R3 -> R` approximating (and lower
//! bounding) the distance from a point to an implicit surface. Fields are
//! evaluated in a body's local, radius-normalized frame: the surface sits
//! near `|p| = 1` locally and is scaled back to world units by the body's
//! bounding radius.
//!
//! Iteration counts are fixed and small so every evaluation has bounded,
//! predictable cost - the collision detector may call a field up to ~150
//! times per query.
//!
//! # Example
//!
//! ```ignore
//! use fractal_dynamics::sdf::DistanceField;
//! use glam::Vec3;
//!
//! let bulb = DistanceField::mandelbulb();
//! let d = bulb.evaluate(Vec3::new(1.5, 0.0, 0.0));
//! assert!(d > 0.0); // outside the fractal
//! ```

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Power of the Mandelbulb triplex map (the classic bulb uses 8).
pub const MANDELBULB_POWER: f32 = 8.0;

/// Escape-time iterations for the Mandelbulb estimator.
pub const MANDELBULB_ITERATIONS: u32 = 12;

/// Orbit radius beyond which the Mandelbulb iteration has escaped.
pub const MANDELBULB_ESCAPE_RADIUS: f32 = 2.0;

/// Fold iterations for the Sierpinski tetrahedron estimator.
pub const SIERPINSKI_ITERATIONS: u32 = 10;

/// Contraction scale of the Sierpinski fold.
pub const SIERPINSKI_SCALE: f32 = 2.0;

/// Iterations for the quaternion Julia estimator.
pub const JULIA_ITERATIONS: u32 = 11;

/// Default Julia constant (w component is the quaternion scalar part).
pub const JULIA_DEFAULT_C: Vec4 = Vec4::new(-0.2, 0.6, 0.2, -0.2);

/// Squared orbit magnitude beyond which the Julia iteration has escaped.
const JULIA_ESCAPE_SQ: f32 = 4.0;

/// Radius clamp that keeps `acos`/`ln` finite at a fractal's center.
const MIN_ORBIT_RADIUS: f32 = 1e-9;

// ============================================================================
// DISTANCE FIELD
// ============================================================================

/// A pluggable signed distance field.
///
/// One variant per generator; each is stateless and referentially
/// transparent, so the detector and integrator stay shape-agnostic.
/// Negative inside, positive outside, zero on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DistanceField {
    /// Unit sphere `|p| - 1`. Analytic reference shape.
    Sphere,

    /// Power-N Mandelbulb escape-time estimator.
    Mandelbulb {
        /// Exponent of the triplex power map
        power: f32,
        /// Fixed iteration budget
        iterations: u32,
    },

    /// Sierpinski tetrahedron fold estimator.
    Sierpinski {
        /// Fixed fold count
        iterations: u32,
    },

    /// Quaternion Julia set estimator (`z <- z^2 + c`).
    Julia {
        /// Julia constant; xyz is the vector part, w the scalar part
        c: Vec4,
        /// Fixed iteration budget
        iterations: u32,
    },
}

impl DistanceField {
    /// Creates the unit sphere field.
    pub fn sphere() -> Self {
        Self::Sphere
    }

    /// Creates a power-8 Mandelbulb with the default iteration budget.
    pub fn mandelbulb() -> Self {
        Self::Mandelbulb {
            power: MANDELBULB_POWER,
            iterations: MANDELBULB_ITERATIONS,
        }
    }

    /// Creates a Sierpinski tetrahedron with the default fold count.
    pub fn sierpinski() -> Self {
        Self::Sierpinski {
            iterations: SIERPINSKI_ITERATIONS,
        }
    }

    /// Creates a quaternion Julia set with the default constant.
    pub fn julia() -> Self {
        Self::Julia {
            c: JULIA_DEFAULT_C,
            iterations: JULIA_ITERATIONS,
        }
    }

    /// Evaluates the field at a point in the local, radius-normalized frame.
    ///
    /// Deterministic, side-effect-free, and bounded by the variant's fixed
    /// iteration count.
    pub fn evaluate(&self, p: Vec3) -> f32 {
        match *self {
            Self::Sphere => p.length() - 1.0,
            Self::Mandelbulb { power, iterations } => mandelbulb_de(p, power, iterations),
            Self::Sierpinski { iterations } => sierpinski_de(p, iterations),
            Self::Julia { c, iterations } => julia_de(p, c, iterations),
        }
    }

    /// Numeric shape selector for the renderer-facing body snapshot.
    pub fn shape_id(&self) -> u32 {
        match self {
            Self::Sphere => 0,
            Self::Mandelbulb { .. } => 1,
            Self::Sierpinski { .. } => 2,
            Self::Julia { .. } => 3,
        }
    }

    /// Iteration budget of this field (0 for analytic shapes).
    pub fn iterations(&self) -> u32 {
        match *self {
            Self::Sphere => 0,
            Self::Mandelbulb { iterations, .. } => iterations,
            Self::Sierpinski { iterations } => iterations,
            Self::Julia { iterations, .. } => iterations,
        }
    }
}

impl Default for DistanceField {
    fn default() -> Self {
        Self::mandelbulb()
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

/// Power-N Mandelbulb distance estimate via the iterated triplex power map.
///
/// Tracks the orbit radius `r` and running derivative `dr`; the estimate
/// after escape is `0.5 * ln(r) * r / dr`.
fn mandelbulb_de(p: Vec3, power: f32, iterations: u32) -> f32 {
    let mut z = p;
    let mut dr = 1.0_f32;
    let mut r = z.length().max(MIN_ORBIT_RADIUS);

    for _ in 0..iterations {
        r = z.length().max(MIN_ORBIT_RADIUS);
        if r > MANDELBULB_ESCAPE_RADIUS {
            break;
        }

        // Spherical coordinates of the orbit point
        let theta = (z.z / r).clamp(-1.0, 1.0).acos();
        let phi = z.y.atan2(z.x);

        dr = r.powf(power - 1.0) * power * dr + 1.0;

        // z <- z^power + p in spherical form
        let zr = r.powf(power);
        let theta = theta * power;
        let phi = phi * power;
        z = zr
            * Vec3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            )
            + p;
    }

    0.5 * r.ln() * r / dr
}

/// Sierpinski tetrahedron distance estimate via plane folds and a
/// scale-2 affine contraction toward the (1,1,1) vertex.
fn sierpinski_de(p: Vec3, iterations: u32) -> f32 {
    let mut z = p;
    let offset = Vec3::ONE * (SIERPINSKI_SCALE - 1.0);

    for _ in 0..iterations {
        if z.x + z.y < 0.0 {
            z = Vec3::new(-z.y, -z.x, z.z);
        }
        if z.x + z.z < 0.0 {
            z = Vec3::new(-z.z, z.y, -z.x);
        }
        if z.y + z.z < 0.0 {
            z = Vec3::new(z.x, -z.z, -z.y);
        }
        z = z * SIERPINSKI_SCALE - offset;
    }

    z.length() * SIERPINSKI_SCALE.powi(-(iterations as i32))
}

/// Quaternion Julia distance estimate.
///
/// Iterates `z <- z^2 + c` over quaternions while tracking the squared
/// derivative magnitude; the estimate is `0.25 * |z| * ln|z|^2 / |dz|`.
fn julia_de(p: Vec3, c: Vec4, iterations: u32) -> f32 {
    // Quaternion stored as xyz = vector part, w = scalar part
    let mut z = Vec4::new(p.x, p.y, p.z, 0.0);
    let mut md2 = 1.0_f32;
    let mut mz2 = z.dot(z);

    for _ in 0..iterations {
        if mz2 > JULIA_ESCAPE_SQ || mz2 < MIN_ORBIT_RADIUS {
            break;
        }
        // |dz|^2 <- |2 z dz|^2
        md2 *= 4.0 * mz2;
        z = quat_sq(z) + c;
        mz2 = z.dot(z);
    }

    let mz2 = mz2.max(MIN_ORBIT_RADIUS);
    let md2 = md2.max(MIN_ORBIT_RADIUS);
    0.25 * (mz2 / md2).sqrt() * mz2.ln()
}

/// Quaternion square: `(s, v)^2 = (s^2 - |v|^2, 2sv)`.
fn quat_sq(q: Vec4) -> Vec4 {
    let s = q.w;
    let v = q.truncate();
    let sv = v * (2.0 * s);
    Vec4::new(sv.x, sv.y, sv.z, s * s - v.length_squared())
}

// ============================================================================
// GRADIENTS
// ============================================================================

/// Central finite-difference gradient of an arbitrary scalar field.
///
/// This is the only way to get a surface normal for an implicit surface
/// without an analytic gradient. The result is unnormalized; callers must
/// normalize and reject near-zero (ill-conditioned) gradients themselves.
pub fn gradient<F: Fn(Vec3) -> f32>(field: F, p: Vec3, eps: f32) -> Vec3 {
    let ex = Vec3::new(eps, 0.0, 0.0);
    let ey = Vec3::new(0.0, eps, 0.0);
    let ez = Vec3::new(0.0, 0.0, eps);
    Vec3::new(
        field(p + ex) - field(p - ex),
        field(p + ey) - field(p - ey),
        field(p + ez) - field(p - ez),
    )
}

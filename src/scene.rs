//! Scene Descriptions
//!
//! JSON-serializable initial conditions for a simulation: body kinematic
//! state, shape selection, and global parameters. The default scene
//! reproduces the reference setup - two unit-mass fractal bodies on a
//! gently crossing collision course.
//!
//! # Example
//!
//! ```ignore
//! use fractal_dynamics::scene::SceneConfig;
//!
//! let json = SceneConfig::default().to_json().unwrap();
//! let world = SceneConfig::from_json(&json).unwrap().build();
//! assert_eq!(world.bodies.len(), 2);
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::{RigidBody, sphere_inertia};
use crate::sdf::DistanceField;
use crate::world::{SimConfig, World};

/// Initial state of one body in a scene file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    /// World-space center
    pub position: Vec3,
    /// Initial linear velocity
    #[serde(default)]
    pub velocity: Vec3,
    /// Initial angular velocity
    #[serde(default)]
    pub angular_velocity: Vec3,
    /// Initial orientation (identity when omitted)
    #[serde(default = "default_orientation")]
    pub orientation: Quat,
    /// Bounding-sphere radius
    pub radius: f32,
    /// Mass
    pub mass: f32,
    /// Scalar inertia; solid-sphere inertia is derived when omitted
    #[serde(default)]
    pub inertia: Option<f32>,
    /// Which distance field defines the surface
    pub shape: DistanceField,
}

fn default_orientation() -> Quat {
    Quat::IDENTITY
}

impl BodyConfig {
    /// Builds the runtime body for this description.
    pub fn build(&self) -> RigidBody {
        let inertia = self
            .inertia
            .unwrap_or_else(|| sphere_inertia(self.mass, self.radius));
        RigidBody::new(self.position, self.radius, self.mass, self.shape)
            .with_velocity(self.velocity)
            .with_angular_velocity(self.angular_velocity)
            .with_orientation(self.orientation)
            .with_inertia(inertia)
    }
}

/// A complete scene: simulation parameters plus initial bodies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Global simulation parameters
    #[serde(default)]
    pub sim: SimConfig,
    /// Initial body states
    pub bodies: Vec<BodyConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            bodies: vec![
                BodyConfig {
                    position: Vec3::new(-1.0, 0.0, 3.0),
                    velocity: Vec3::new(0.5, 0.2, 0.0),
                    angular_velocity: Vec3::ZERO,
                    orientation: Quat::IDENTITY,
                    radius: 1.0,
                    mass: 1.0,
                    inertia: None,
                    shape: DistanceField::mandelbulb(),
                },
                BodyConfig {
                    position: Vec3::new(1.0, 0.0, 3.0),
                    velocity: Vec3::new(-0.5, -0.2, 0.0),
                    angular_velocity: Vec3::ZERO,
                    orientation: Quat::IDENTITY,
                    radius: 1.0,
                    mass: 1.0,
                    inertia: None,
                    shape: DistanceField::julia(),
                },
            ],
        }
    }
}

impl SceneConfig {
    /// Parses a scene from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serializes this scene to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Builds the runtime world for this scene.
    pub fn build(&self) -> World {
        World::with_bodies(self.sim, self.bodies.iter().map(BodyConfig::build).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene_builds_two_bodies() {
        let world = SceneConfig::default().build();
        assert_eq!(world.bodies.len(), 2);
        // Opposing velocities, as in the reference setup
        assert_eq!(world.bodies[0].velocity, Vec3::new(0.5, 0.2, 0.0));
        assert_eq!(world.bodies[1].velocity, Vec3::new(-0.5, -0.2, 0.0));
    }

    #[test]
    fn test_derived_sphere_inertia() {
        let cfg = BodyConfig {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            radius: 2.0,
            mass: 5.0,
            inertia: None,
            shape: DistanceField::sphere(),
        };
        let body = cfg.build();
        assert!((body.inertia - 0.4 * 5.0 * 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_json_round_trip() {
        let scene = SceneConfig::default();
        let json = scene.to_json().expect("serialize");
        let parsed = SceneConfig::from_json(&json).expect("parse");
        assert_eq!(parsed, scene);
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "bodies": [
                {
                    "position": [0.0, 0.0, 0.0],
                    "radius": 1.0,
                    "mass": 1.0,
                    "shape": "Sphere"
                }
            ]
        }"#;
        let scene = SceneConfig::from_json(json).expect("minimal scene should parse");
        let body = scene.bodies[0].build();
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.orientation, Quat::IDENTITY);
        assert_eq!(scene.sim, SimConfig::default());
    }
}

//! Bodies sliding on an inclined plane with Coulomb friction.
//!
//! Coordinates are measured in the plane: `x` runs across the slope and `y`
//! runs up it, so gravity pulls along `-y` with `g sin(angle)` and presses
//! into the plane with `g cos(angle)`. Dry friction of magnitude `mu * N`
//! opposes the sliding direction. Its direction is undefined at zero speed,
//! so below [`VELOCITY_EPSILON`] the friction term is exactly zero.

use nalgebra::{Point2, Point3, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive};
use crate::ode::{Model, OdeFunction, OdeSolver, Simulation};
use crate::{SimError, SimResult};

/// Speeds below this are treated as not sliding.
pub const VELOCITY_EPSILON: f64 = 1e-6;

/// Coulomb friction acceleration `-mu * normal * v / |v|`, or zero when the
/// speed is below [`VELOCITY_EPSILON`].
pub fn friction_acceleration(velocity: Vector2<f64>, mu: f64, normal: f64) -> Vector2<f64> {
    let speed = velocity.norm();
    if speed < VELOCITY_EPSILON {
        Vector2::zeros()
    } else {
        velocity * (-mu * normal / speed)
    }
}

/// Maps in-plane coordinates to world space for a plane tilted about the
/// x axis through the origin.
pub fn plane_to_world(angle: f64, point: Point2<f64>) -> Point3<f64> {
    let (sin, cos) = angle.sin_cos();
    Point3::new(point.x, point.y * cos, point.y * sin)
}

/// A point mass on the rough plane. State layout: `[x, x_dot, y, y_dot]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoughPlaneParticle {
    pub gravity: f64,
    /// Inclination of the plane in radians.
    pub angle: f64,
    /// Coefficient of kinetic friction.
    pub mu: f64,
}

impl Default for RoughPlaneParticle {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            angle: 0.25 * std::f64::consts::PI,
            mu: 0.2,
        }
    }
}

impl RoughPlaneParticle {
    pub fn initial_state(position: Point2<f64>, velocity: Vector2<f64>) -> [f64; 4] {
        [position.x, velocity.x, position.y, velocity.y]
    }

    /// Acceleration along the slope, independent of velocity.
    pub fn external_acceleration(&self) -> Vector2<f64> {
        Vector2::new(0.0, -self.gravity * self.angle.sin())
    }

    /// Friction acceleration for a particle moving with `velocity`.
    pub fn friction(&self, velocity: Vector2<f64>) -> Vector2<f64> {
        friction_acceleration(velocity, self.mu, self.gravity * self.angle.cos())
    }
}

impl OdeFunction for RoughPlaneParticle {
    fn evaluate(&self, _t: f64, s: &[f64], ds: &mut [f64]) {
        let acceleration = self.external_acceleration() + self.friction(Vector2::new(s[1], s[3]));
        ds[0] = s[1];
        ds[1] = acceleration.x;
        ds[2] = s[3];
        ds[3] = acceleration.y;
    }
}

impl Model for RoughPlaneParticle {
    const DIMENSION: usize = 4;

    fn validate(&self) -> SimResult<()> {
        require_non_negative("gravity", self.gravity)?;
        require_non_negative("mu", self.mu)?;
        Ok(())
    }
}

impl<S: OdeSolver> Simulation<RoughPlaneParticle, S> {
    pub fn x(&self) -> f64 {
        self.state()[0]
    }

    pub fn y(&self) -> f64 {
        self.state()[2]
    }

    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x(), self.y())
    }

    pub fn velocity(&self) -> Vector2<f64> {
        Vector2::new(self.state()[1], self.state()[3])
    }

    pub fn world_position(&self) -> Point3<f64> {
        plane_to_world(self.model().angle, self.position())
    }
}

/// Two point masses joined by a massless rod, sliding on the rough plane.
///
/// State layout: `[x, x_dot, y, y_dot, theta, theta_dot]` where `(x, y)` is
/// the centre of mass and `theta` the angle of the rod (from mass 1 to
/// mass 2) against the x axis. Each end carries its own share of the normal
/// load and feels its own friction, so the rod's spin and drift are coupled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoughPlaneRod {
    pub gravity: f64,
    pub angle: f64,
    pub mu: f64,
    pub mass1: f64,
    pub mass2: f64,
    pub length: f64,
}

impl Default for RoughPlaneRod {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            angle: 0.125 * std::f64::consts::PI,
            mu: 0.1,
            mass1: 1.0,
            mass2: 2.0,
            length: 1.0,
        }
    }
}

impl RoughPlaneRod {
    pub fn initial_state(
        center: Point2<f64>,
        velocity: Vector2<f64>,
        theta: f64,
        theta_dot: f64,
    ) -> [f64; 6] {
        [center.x, velocity.x, center.y, velocity.y, theta, theta_dot]
    }

    /// Offsets of mass 1 and mass 2 from the centre of mass.
    pub fn arms(&self, theta: f64) -> (Vector2<f64>, Vector2<f64>) {
        let total = self.mass1 + self.mass2;
        let axis = Vector2::new(theta.cos(), theta.sin()) * self.length;
        (-axis * (self.mass2 / total), axis * (self.mass1 / total))
    }

    /// Moment of inertia about the centre of mass.
    pub fn inertia(&self) -> f64 {
        self.mass1 * self.mass2 / (self.mass1 + self.mass2) * self.length * self.length
    }

    /// Linear and angular acceleration for the given velocities and angle.
    pub fn acceleration(
        &self,
        velocity: Vector2<f64>,
        theta: f64,
        theta_dot: f64,
    ) -> (Vector2<f64>, f64) {
        let normal = self.gravity * self.angle.cos();
        let (arm1, arm2) = self.arms(theta);

        let mut force = Vector2::zeros();
        let mut torque = 0.0;
        for (arm, mass) in [(arm1, self.mass1), (arm2, self.mass2)] {
            let end_velocity = velocity + Vector2::new(-arm.y, arm.x) * theta_dot;
            let friction = friction_acceleration(end_velocity, self.mu, normal) * mass;
            force += friction;
            torque += arm.perp(&friction);
        }

        let total = self.mass1 + self.mass2;
        let linear = Vector2::new(0.0, -self.gravity * self.angle.sin()) + force / total;
        (linear, torque / self.inertia())
    }
}

impl OdeFunction for RoughPlaneRod {
    fn evaluate(&self, _t: f64, s: &[f64], ds: &mut [f64]) {
        let (linear, angular) = self.acceleration(Vector2::new(s[1], s[3]), s[4], s[5]);
        ds[0] = s[1];
        ds[1] = linear.x;
        ds[2] = s[3];
        ds[3] = linear.y;
        ds[4] = s[5];
        ds[5] = angular;
    }
}

impl Model for RoughPlaneRod {
    const DIMENSION: usize = 6;

    fn validate(&self) -> SimResult<()> {
        require_non_negative("gravity", self.gravity)?;
        require_non_negative("mu", self.mu)?;
        require_positive("mass1", self.mass1)?;
        require_positive("mass2", self.mass2)?;
        require_positive("length", self.length)?;
        Ok(())
    }
}

impl<S: OdeSolver> Simulation<RoughPlaneRod, S> {
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.state()[0], self.state()[2])
    }

    pub fn velocity(&self) -> Vector2<f64> {
        Vector2::new(self.state()[1], self.state()[3])
    }

    pub fn theta(&self) -> f64 {
        self.state()[4]
    }

    pub fn theta_dot(&self) -> f64 {
        self.state()[5]
    }

    /// In-plane positions of mass 1 and mass 2.
    pub fn endpoints(&self) -> (Point2<f64>, Point2<f64>) {
        let (arm1, arm2) = self.model().arms(self.theta());
        (self.center() + arm1, self.center() + arm2)
    }
}

/// A uniform rectangular board lying flat on the rough plane.
///
/// The state layout matches [`RoughPlaneRod`], with `theta` the angle of the
/// board's width axis against the x axis. Friction acts over the whole
/// contact area, so it is summed over a `samples` x `samples` grid of equal
/// patches, each with its own sliding velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoughPlaneFlatBoard {
    pub gravity: f64,
    pub angle: f64,
    pub mu: f64,
    pub mass: f64,
    pub width: f64,
    pub height: f64,
    /// Patches per side used to sum the friction.
    pub samples: usize,
}

impl Default for RoughPlaneFlatBoard {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            angle: 0.125 * std::f64::consts::PI,
            mu: 0.1,
            mass: 1.0,
            width: 2.0,
            height: 1.0,
            samples: 8,
        }
    }
}

impl RoughPlaneFlatBoard {
    pub fn initial_state(
        center: Point2<f64>,
        velocity: Vector2<f64>,
        theta: f64,
        theta_dot: f64,
    ) -> [f64; 6] {
        RoughPlaneRod::initial_state(center, velocity, theta, theta_dot)
    }

    pub fn inertia(&self) -> f64 {
        self.mass * (self.width * self.width + self.height * self.height) / 12.0
    }

    /// Offsets of the patch centres from the board's centre.
    pub fn patches(&self, theta: f64) -> impl Iterator<Item = Vector2<f64>> {
        let (sin, cos) = theta.sin_cos();
        let (width, height, samples) = (self.width, self.height, self.samples);
        let n = samples as f64;
        (0..samples).flat_map(move |i| {
            (0..samples).map(move |j| {
                let u = ((i as f64 + 0.5) / n - 0.5) * width;
                let v = ((j as f64 + 0.5) / n - 0.5) * height;
                Vector2::new(u * cos - v * sin, u * sin + v * cos)
            })
        })
    }

    /// Four corners in counter-clockwise order, relative to the centre.
    pub fn corners(&self, theta: f64) -> [Vector2<f64>; 4] {
        let (sin, cos) = theta.sin_cos();
        let (hw, hh) = (0.5 * self.width, 0.5 * self.height);
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
            .map(|(u, v)| Vector2::new(u * cos - v * sin, u * sin + v * cos))
    }

    /// Linear and angular acceleration for the given velocities and angle.
    pub fn acceleration(
        &self,
        velocity: Vector2<f64>,
        theta: f64,
        theta_dot: f64,
    ) -> (Vector2<f64>, f64) {
        let normal = self.gravity * self.angle.cos();
        let patch_mass = self.mass / (self.samples * self.samples) as f64;

        let mut force = Vector2::zeros();
        let mut torque = 0.0;
        for arm in self.patches(theta) {
            let patch_velocity = velocity + Vector2::new(-arm.y, arm.x) * theta_dot;
            let friction = friction_acceleration(patch_velocity, self.mu, normal) * patch_mass;
            force += friction;
            torque += arm.perp(&friction);
        }

        let linear = Vector2::new(0.0, -self.gravity * self.angle.sin()) + force / self.mass;
        (linear, torque / self.inertia())
    }
}

impl OdeFunction for RoughPlaneFlatBoard {
    fn evaluate(&self, _t: f64, s: &[f64], ds: &mut [f64]) {
        let (linear, angular) = self.acceleration(Vector2::new(s[1], s[3]), s[4], s[5]);
        ds[0] = s[1];
        ds[1] = linear.x;
        ds[2] = s[3];
        ds[3] = linear.y;
        ds[4] = s[5];
        ds[5] = angular;
    }
}

impl Model for RoughPlaneFlatBoard {
    const DIMENSION: usize = 6;

    fn validate(&self) -> SimResult<()> {
        require_non_negative("gravity", self.gravity)?;
        require_non_negative("mu", self.mu)?;
        require_positive("mass", self.mass)?;
        require_positive("width", self.width)?;
        require_positive("height", self.height)?;
        if self.samples == 0 {
            return Err(SimError::InvalidParameter {
                name: "samples",
                value: 0.0,
            });
        }
        Ok(())
    }
}

impl<S: OdeSolver> Simulation<RoughPlaneFlatBoard, S> {
    pub fn center(&self) -> Point2<f64> {
        Point2::new(self.state()[0], self.state()[2])
    }

    pub fn velocity(&self) -> Vector2<f64> {
        Vector2::new(self.state()[1], self.state()[3])
    }

    pub fn theta(&self) -> f64 {
        self.state()[4]
    }

    pub fn theta_dot(&self) -> f64 {
        self.state()[5]
    }

    /// In-plane corners of the board.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let center = self.center();
        self.model().corners(self.theta()).map(|arm| center + arm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn friction_vanishes_at_rest() {
        let friction = friction_acceleration(Vector2::zeros(), 0.5, 9.81);
        assert_eq!(friction, Vector2::zeros());
        assert!(friction.iter().all(|c| c.is_finite()));

        let tiny = friction_acceleration(Vector2::new(1e-9, -1e-9), 0.5, 9.81);
        assert_eq!(tiny, Vector2::zeros());
    }

    #[test]
    fn friction_opposes_motion_with_coulomb_magnitude() {
        let friction = friction_acceleration(Vector2::new(3.0, 4.0), 0.5, 10.0);
        assert_relative_eq!(friction, Vector2::new(-3.0, -4.0));
    }

    #[test]
    fn particle_at_rest_feels_only_gravity() {
        let particle = RoughPlaneParticle::default();
        let mut ds = [0.0; 4];
        particle.evaluate(0.0, &[1.0, 0.0, 2.0, 0.0], &mut ds);

        let external = particle.external_acceleration();
        assert_eq!(ds, [0.0, external.x, 0.0, external.y]);
    }

    #[test]
    fn particle_sliding_downhill_matches_constant_acceleration() {
        let particle = RoughPlaneParticle {
            gravity: 10.0,
            angle: PI / 6.0,
            mu: 0.1,
        };
        let initial = RoughPlaneParticle::initial_state(Point2::origin(), Vector2::new(0.0, -1.0));
        let mut sim = Simulation::new(particle, 0.0, 0.01, &initial).unwrap();
        sim.advance(100).unwrap();

        // Straight down the slope both forces are constant.
        let a = -10.0 * (PI / 6.0).sin() + 0.1 * 10.0 * (PI / 6.0).cos();
        let t = sim.time();
        assert_relative_eq!(sim.y(), -t + 0.5 * a * t * t, epsilon = 1e-9);
        assert_relative_eq!(sim.velocity().y, -1.0 + a * t, epsilon = 1e-9);
        assert_relative_eq!(sim.x(), 0.0);
    }

    #[test]
    fn flat_plane_particle_stops() {
        let particle = RoughPlaneParticle {
            gravity: 10.0,
            angle: 0.0,
            mu: 0.5,
        };
        let initial = RoughPlaneParticle::initial_state(Point2::origin(), Vector2::new(1.0, 0.0));
        let mut sim = Simulation::new(particle, 0.0, 0.001, &initial).unwrap();

        // Decelerating at 5, it stops after 0.2 and settles near zero speed.
        sim.advance(400).unwrap();
        assert!(sim.velocity().norm() < 0.01);
        assert_relative_eq!(sim.x(), 0.1, epsilon = 1e-3);
    }

    #[test]
    fn world_position_lies_on_tilted_plane() {
        let p = plane_to_world(PI / 2.0, Point2::new(1.0, 2.0));
        assert_relative_eq!(p, Point3::new(1.0, 0.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn rod_inertia_and_arms() {
        let rod = RoughPlaneRod {
            mass1: 1.0,
            mass2: 3.0,
            length: 2.0,
            ..RoughPlaneRod::default()
        };
        let (arm1, arm2) = rod.arms(0.0);
        assert_relative_eq!(arm1, Vector2::new(-1.5, 0.0));
        assert_relative_eq!(arm2, Vector2::new(0.5, 0.0));
        assert_relative_eq!(rod.inertia(), 1.0 * 2.25 + 3.0 * 0.25);
    }

    #[test]
    fn rod_at_rest_feels_only_gravity() {
        let rod = RoughPlaneRod::default();
        let (linear, angular) = rod.acceleration(Vector2::zeros(), 0.3, 0.0);

        assert_eq!(linear, Vector2::new(0.0, -rod.gravity * rod.angle.sin()));
        assert_eq!(angular, 0.0);
    }

    #[test]
    fn spinning_symmetric_rod_is_braked() {
        let rod = RoughPlaneRod {
            gravity: 10.0,
            angle: 0.0,
            mu: 0.2,
            mass1: 1.0,
            mass2: 1.0,
            length: 2.0,
        };
        let (linear, angular) = rod.acceleration(Vector2::zeros(), 0.7, 3.0);

        // Equal and opposite end frictions: no net force, torque -mu m g L.
        assert_relative_eq!(linear, Vector2::zeros(), epsilon = 1e-12);
        assert_relative_eq!(angular, -2.0 * 0.2 * 10.0 / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn sliding_rod_spin_is_braked() {
        let rod = RoughPlaneRod::default();
        // Rod across the slope, sliding along its own axis while turning.
        let initial =
            RoughPlaneRod::initial_state(Point2::origin(), Vector2::new(1.0, 0.0), 0.0, 1.0);
        let mut sim = Simulation::new(rod, 0.0, 0.01, &initial).unwrap();
        sim.advance(20).unwrap();

        assert!(sim.theta_dot() < 1.0);
        assert!(sim.theta() > 0.0);
        let (p1, p2) = sim.endpoints();
        assert_relative_eq!((p2 - p1).norm(), rod.length, epsilon = 1e-12);
    }

    #[test]
    fn board_patches_cover_the_board_evenly() {
        let board = RoughPlaneFlatBoard {
            samples: 4,
            ..RoughPlaneFlatBoard::default()
        };
        let patches: Vec<_> = board.patches(0.4).collect();
        assert_eq!(patches.len(), 16);

        let centroid = patches.iter().sum::<Vector2<f64>>() / 16.0;
        assert_relative_eq!(centroid, Vector2::zeros(), epsilon = 1e-12);
        let half_diagonal = 0.5 * (board.width.powi(2) + board.height.powi(2)).sqrt();
        assert!(patches.iter().all(|p| p.norm() < half_diagonal));
        for corner in board.corners(0.4) {
            assert_relative_eq!(corner.norm(), half_diagonal, epsilon = 1e-12);
        }
    }

    #[test]
    fn translating_board_slides_like_a_particle() {
        let board = RoughPlaneFlatBoard::default();
        let particle = RoughPlaneParticle {
            gravity: board.gravity,
            angle: board.angle,
            mu: board.mu,
        };
        let velocity = Vector2::new(0.5, -1.0);
        let (linear, angular) = board.acceleration(velocity, 0.3, 0.0);

        let expected = particle.external_acceleration() + particle.friction(velocity);
        assert_relative_eq!(linear, expected, epsilon = 1e-12);
        assert_relative_eq!(angular, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn spinning_square_board_matches_area_integral() {
        let board = RoughPlaneFlatBoard {
            gravity: 10.0,
            angle: 0.0,
            mu: 0.2,
            mass: 1.0,
            width: 1.0,
            height: 1.0,
            samples: 64,
        };
        let (linear, angular) = board.acceleration(Vector2::zeros(), 0.0, 2.0);

        // Mean distance from the centre of a unit square.
        let mean_arm = (2f64.sqrt() + (1.0 + 2f64.sqrt()).ln()) / 6.0;
        let expected = -0.2 * 10.0 * mean_arm / board.inertia();
        assert_relative_eq!(linear, Vector2::zeros(), epsilon = 1e-12);
        assert_relative_eq!(angular, expected, max_relative = 1e-3);
    }

    #[test]
    fn board_keeps_its_shape_while_sliding() {
        let board = RoughPlaneFlatBoard::default();
        let initial =
            RoughPlaneFlatBoard::initial_state(Point2::origin(), Vector2::new(1.0, 0.0), 0.0, 1.5);
        let mut sim = Simulation::new(board, 0.0, 0.01, &initial).unwrap();
        sim.advance(30).unwrap();

        assert!(sim.theta_dot() < 1.5);
        assert!(sim.velocity().y < 0.0);
        let [a, b, c, _] = sim.corners();
        assert_relative_eq!((b - a).norm(), board.width, epsilon = 1e-12);
        assert_relative_eq!((c - b).norm(), board.height, epsilon = 1e-12);
    }

    #[test]
    fn board_without_samples_is_rejected() {
        let board = RoughPlaneFlatBoard {
            samples: 0,
            ..RoughPlaneFlatBoard::default()
        };
        let initial =
            RoughPlaneFlatBoard::initial_state(Point2::origin(), Vector2::zeros(), 0.0, 0.0);
        assert_eq!(
            Simulation::new(board, 0.0, 0.01, &initial).err(),
            Some(SimError::InvalidParameter {
                name: "samples",
                value: 0.0
            })
        );
    }
}

//! Planar two-body orbit in polar form.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::require_positive;
use crate::ode::{Model, OdeFunction, OdeSolver, Simulation};
use crate::SimResult;

/// Orbit of a body around a fixed attracting centre.
///
/// State layout: `[r, r_dot, theta]`. Angular momentum per unit mass `h` is
/// conserved, so `theta' = h / r^2` and `r'' = h^2 / r^3 - mu / r^2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeplerPolar {
    /// Gravitational parameter `G * M`.
    pub mu: f64,
    /// Angular momentum per unit mass.
    pub angular_momentum: f64,
}

impl Default for KeplerPolar {
    fn default() -> Self {
        Self {
            mu: 1.0,
            angular_momentum: 1.0,
        }
    }
}

impl KeplerPolar {
    /// Parameters for a body at radius `r` moving with tangential speed
    /// `v_theta`.
    pub fn from_tangential_speed(mu: f64, r: f64, v_theta: f64) -> Self {
        Self {
            mu,
            angular_momentum: r * v_theta,
        }
    }

    pub fn initial_state(r: f64, r_dot: f64, theta: f64) -> [f64; 3] {
        [r, r_dot, theta]
    }
}

impl OdeFunction for KeplerPolar {
    fn evaluate(&self, _t: f64, s: &[f64], ds: &mut [f64]) {
        let r = s[0];
        let h = self.angular_momentum;
        let r2 = r * r;
        ds[0] = s[1];
        ds[1] = h * h / (r2 * r) - self.mu / r2;
        ds[2] = h / r2;
    }
}

impl Model for KeplerPolar {
    const DIMENSION: usize = 3;

    fn validate(&self) -> SimResult<()> {
        require_positive("mu", self.mu)?;
        require_positive("angular_momentum", self.angular_momentum)?;
        Ok(())
    }
}

impl<S: OdeSolver> Simulation<KeplerPolar, S> {
    pub fn radius(&self) -> f64 {
        self.state()[0]
    }

    pub fn radial_speed(&self) -> f64 {
        self.state()[1]
    }

    pub fn theta(&self) -> f64 {
        self.state()[2]
    }

    /// Cartesian position relative to the attracting centre.
    pub fn position(&self) -> Point2<f64> {
        let (sin, cos) = self.theta().sin_cos();
        Point2::new(self.radius() * cos, self.radius() * sin)
    }
}

/// Closed-form conic `r(theta) = p / (1 + e cos(theta - omega))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerOrbit {
    mu: f64,
    semi_latus_rectum: f64,
    eccentricity: f64,
    periapsis: f64,
}

impl KeplerOrbit {
    /// Fits the conic through the initial radius and radial speed.
    pub fn new(model: &KeplerPolar, r: f64, r_dot: f64, theta: f64) -> Self {
        let h = model.angular_momentum;
        let p = h * h / model.mu;
        // e cos(theta - omega) and e sin(theta - omega)
        let along = p / r - 1.0;
        let across = r_dot * p / h;
        Self {
            mu: model.mu,
            semi_latus_rectum: p,
            eccentricity: along.hypot(across),
            periapsis: theta - across.atan2(along),
        }
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_latus_rectum
    }

    /// Angle of closest approach.
    pub fn periapsis(&self) -> f64 {
        self.periapsis
    }

    /// Radius at polar angle `theta`.
    pub fn radius_at(&self, theta: f64) -> f64 {
        self.semi_latus_rectum / (1.0 + self.eccentricity * (theta - self.periapsis).cos())
    }

    /// Orbital period, or `None` for open (parabolic or hyperbolic) orbits.
    pub fn period(&self) -> Option<f64> {
        if self.eccentricity >= 1.0 {
            return None;
        }
        let semi_major = self.semi_latus_rectum / (1.0 - self.eccentricity * self.eccentricity);
        Some(std::f64::consts::TAU * (semi_major.powi(3) / self.mu).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    #[test]
    fn circular_orbit_keeps_radius() {
        // v = sqrt(mu / r) gives a circle.
        let model = KeplerPolar::from_tangential_speed(4.0, 2.0, 2.0f64.sqrt());
        let orbit = KeplerOrbit::new(&model, 2.0, 0.0, 0.0);
        assert_relative_eq!(orbit.eccentricity(), 0.0, epsilon = 1e-12);

        let initial = KeplerPolar::initial_state(2.0, 0.0, 0.0);
        let mut sim = Simulation::new(model, 0.0, 0.01, &initial).unwrap();
        sim.advance(500).unwrap();
        assert_relative_eq!(sim.radius(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn numeric_radius_follows_conic() {
        let model = KeplerPolar::from_tangential_speed(1.0, 1.0, 1.2);
        let orbit = KeplerOrbit::new(&model, 1.0, 0.1, 0.3);
        let initial = KeplerPolar::initial_state(1.0, 0.1, 0.3);
        let mut sim = Simulation::new(model, 0.0, 0.001, &initial).unwrap();

        for _ in 0..10 {
            sim.advance(300).unwrap();
            assert_relative_eq!(sim.radius(), orbit.radius_at(sim.theta()), max_relative = 1e-8);
        }
    }

    #[test]
    fn orbit_closes_after_one_period() {
        let model = KeplerPolar::from_tangential_speed(1.0, 1.0, 1.2);
        let orbit = KeplerOrbit::new(&model, 1.0, 0.0, 0.0);
        let period = orbit.period().unwrap();

        // Starting at periapsis, a = p / (1 - e^2) with p = 1.44, e = 0.44.
        assert_relative_eq!(orbit.eccentricity(), 0.44, epsilon = 1e-12);
        assert_relative_eq!(orbit.periapsis(), 0.0, epsilon = 1e-12);

        let steps = 20_000;
        let mut sim = Simulation::new(model, 0.0, period / steps as f64, &[1.0, 0.0, 0.0]).unwrap();
        sim.advance(steps).unwrap();

        assert_relative_eq!(sim.theta(), TAU, epsilon = 1e-6);
        assert_relative_eq!(sim.radius(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(sim.position(), Point2::new(1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn escape_speed_has_no_period() {
        let model = KeplerPolar::from_tangential_speed(1.0, 1.0, 2.0);
        let orbit = KeplerOrbit::new(&model, 1.0, 0.0, 0.0);
        assert!(orbit.eccentricity() > 1.0);
        assert_eq!(orbit.period(), None);
    }

    #[test]
    fn zero_angular_momentum_is_rejected() {
        let model = KeplerPolar {
            mu: 1.0,
            angular_momentum: 0.0,
        };
        assert!(Simulation::new(model, 0.0, 0.01, &[1.0, 0.0, 0.0]).is_err());
    }
}

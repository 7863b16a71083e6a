//! Single pendulum with optional viscous friction, plus the closed-form
//! solution of its small-angle form.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive};
use crate::ode::{Model, OdeFunction, OdeSolver, Simulation};
use crate::SimResult;

/// Pendulum parameters. State layout: `[theta, theta_dot]`, with `theta`
/// measured from straight down.
///
/// `theta'' = -(g / L) * sin(theta) - viscosity * theta'`, or with
/// `linearized` set, `sin(theta)` replaced by `theta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplePendulum {
    pub gravity: f64,
    pub length: f64,
    pub viscosity: f64,
    pub linearized: bool,
}

impl Default for SimplePendulum {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            length: 1.0,
            viscosity: 0.0,
            linearized: false,
        }
    }
}

impl SimplePendulum {
    /// Sets the viscous friction coefficient.
    #[must_use]
    pub fn with_viscosity(mut self, viscosity: f64) -> Self {
        self.viscosity = viscosity;
        self
    }

    /// Uses the small-angle form of the equation of motion.
    #[must_use]
    pub fn linearized(mut self) -> Self {
        self.linearized = true;
        self
    }

    /// `g / L`, the squared natural frequency of small oscillations.
    #[inline]
    pub fn stiffness(&self) -> f64 {
        self.gravity / self.length
    }

    /// Builds the state vector.
    pub fn initial_state(theta: f64, theta_dot: f64) -> [f64; 2] {
        [theta, theta_dot]
    }
}

impl OdeFunction for SimplePendulum {
    fn evaluate(&self, _t: f64, s: &[f64], ds: &mut [f64]) {
        let restoring = if self.linearized { s[0] } else { s[0].sin() };
        ds[0] = s[1];
        ds[1] = -self.stiffness() * restoring - self.viscosity * s[1];
    }
}

impl Model for SimplePendulum {
    const DIMENSION: usize = 2;

    fn validate(&self) -> SimResult<()> {
        require_non_negative("gravity", self.gravity)?;
        require_positive("length", self.length)?;
        require_non_negative("viscosity", self.viscosity)?;
        Ok(())
    }
}

impl<S: OdeSolver> Simulation<SimplePendulum, S> {
    pub fn theta(&self) -> f64 {
        self.state()[0]
    }

    pub fn theta_dot(&self) -> f64 {
        self.state()[1]
    }

    /// Bob position relative to the pivot, y pointing up.
    pub fn bob_position(&self) -> Point2<f64> {
        let length = self.model().length;
        Point2::new(length * self.theta().sin(), -length * self.theta().cos())
    }

    /// Mechanical energy per unit mass, zero at rest hanging down.
    pub fn energy(&self) -> f64 {
        let m = self.model();
        let kinetic = 0.5 * (m.length * self.theta_dot()).powi(2);
        kinetic + m.gravity * m.length * (1.0 - self.theta().cos())
    }
}

/// Damping regime of `theta'' + c theta' + k theta = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Damping {
    /// Decaying oscillation at angular frequency `omega`.
    Under { omega: f64 },
    /// Fastest non-oscillating return.
    Critical,
    /// Sum of two decaying exponentials with rates `r1 > r2`.
    Over { r1: f64, r2: f64 },
}

/// Closed-form motion of the small-angle viscous pendulum.
///
/// The coefficients are fixed when the solution is created from the initial
/// conditions; [`ViscousPendulumSolution::theta`] is then a pure function of
/// time, independent of any numerical integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViscousPendulumSolution {
    start: f64,
    half_viscosity: f64,
    damping: Damping,
    a: f64,
    b: f64,
}

impl ViscousPendulumSolution {
    /// Relative tolerance under which the discriminant counts as zero.
    const CRITICAL_TOLERANCE: f64 = 1e-12;

    /// Solves for the motion starting at time `start`.
    pub fn new(pendulum: &SimplePendulum, start: f64, theta: f64, theta_dot: f64) -> Self {
        let c = pendulum.viscosity;
        let k = pendulum.stiffness();
        let half = 0.5 * c;
        let discriminant = half * half - k;
        let scale = (half * half).max(k).max(f64::MIN_POSITIVE);

        let (damping, a, b) = if discriminant.abs() <= Self::CRITICAL_TOLERANCE * scale {
            (Damping::Critical, theta, theta_dot + half * theta)
        } else if discriminant < 0.0 {
            let omega = (-discriminant).sqrt();
            (Damping::Under { omega }, theta, (theta_dot + half * theta) / omega)
        } else {
            let root = discriminant.sqrt();
            let (r1, r2) = (-half + root, -half - root);
            let a = (theta_dot - r2 * theta) / (r1 - r2);
            (Damping::Over { r1, r2 }, a, theta - a)
        };

        Self {
            start,
            half_viscosity: half,
            damping,
            a,
            b,
        }
    }

    pub fn damping(&self) -> Damping {
        self.damping
    }

    /// Angle at absolute time `t`.
    pub fn theta(&self, t: f64) -> f64 {
        let t = t - self.start;
        match self.damping {
            Damping::Under { omega } => {
                let phase = omega * t;
                (-self.half_viscosity * t).exp() * (self.a * phase.cos() + self.b * phase.sin())
            }
            Damping::Critical => (-self.half_viscosity * t).exp() * (self.a + self.b * t),
            Damping::Over { r1, r2 } => self.a * (r1 * t).exp() + self.b * (r2 * t).exp(),
        }
    }
}

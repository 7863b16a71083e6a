//! Two pendulums hung end to end.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{require_non_negative, require_positive};
use crate::ode::{Model, OdeFunction, OdeSolver, Simulation};
use crate::SimResult;

/// Double pendulum parameters.
///
/// State layout: `[theta1, theta1_dot, theta2, theta2_dot]`, both angles
/// measured from straight down. The default values are the ones of the
/// classic sample scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoublePendulum {
    pub gravity: f64,
    pub mass1: f64,
    pub mass2: f64,
    pub length1: f64,
    pub length2: f64,
}

impl Default for DoublePendulum {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            mass1: 10.0,
            mass2: 20.0,
            length1: 100.0,
            length2: 100.0,
        }
    }
}

impl DoublePendulum {
    /// Builds the state vector.
    pub fn initial_state(theta1: f64, theta1_dot: f64, theta2: f64, theta2_dot: f64) -> [f64; 4] {
        [theta1, theta1_dot, theta2, theta2_dot]
    }

    /// Angular accelerations `(theta1'', theta2'')` for the given state.
    pub fn angular_acceleration(&self, s: &[f64]) -> (f64, f64) {
        let Self {
            gravity: g,
            mass1: m1,
            mass2: m2,
            length1: l1,
            length2: l2,
        } = *self;
        let (theta1, omega1, theta2, omega2) = (s[0], s[1], s[2], s[3]);

        let delta = theta1 - theta2;
        let (sin_d, cos_d) = delta.sin_cos();
        let total = m1 + m2;
        let denominator = 2.0 * m1 + m2 - m2 * (2.0 * delta).cos();

        let alpha1 = (-g * (2.0 * m1 + m2) * theta1.sin()
            - m2 * g * (theta1 - 2.0 * theta2).sin()
            - 2.0 * sin_d * m2 * (omega2 * omega2 * l2 + omega1 * omega1 * l1 * cos_d))
            / (l1 * denominator);
        let alpha2 = 2.0
            * sin_d
            * (omega1 * omega1 * l1 * total
                + g * total * theta1.cos()
                + omega2 * omega2 * l2 * m2 * cos_d)
            / (l2 * denominator);

        (alpha1, alpha2)
    }
}

impl OdeFunction for DoublePendulum {
    fn evaluate(&self, _t: f64, s: &[f64], ds: &mut [f64]) {
        let (alpha1, alpha2) = self.angular_acceleration(s);
        ds[0] = s[1];
        ds[1] = alpha1;
        ds[2] = s[3];
        ds[3] = alpha2;
    }
}

impl Model for DoublePendulum {
    const DIMENSION: usize = 4;

    fn validate(&self) -> SimResult<()> {
        require_non_negative("gravity", self.gravity)?;
        require_positive("mass1", self.mass1)?;
        require_positive("mass2", self.mass2)?;
        require_positive("length1", self.length1)?;
        require_positive("length2", self.length2)?;
        Ok(())
    }
}

impl<S: OdeSolver> Simulation<DoublePendulum, S> {
    pub fn theta1(&self) -> f64 {
        self.state()[0]
    }

    pub fn theta1_dot(&self) -> f64 {
        self.state()[1]
    }

    pub fn theta2(&self) -> f64 {
        self.state()[2]
    }

    pub fn theta2_dot(&self) -> f64 {
        self.state()[3]
    }

    /// Positions of the two bobs relative to the pivot, y pointing up.
    pub fn positions(&self) -> (Point2<f64>, Point2<f64>) {
        let m = self.model();
        let first = Point2::new(m.length1 * self.theta1().sin(), -m.length1 * self.theta1().cos());
        let theta2 = self.theta2();
        let second = first + Vector2::new(m.length2 * theta2.sin(), -m.length2 * theta2.cos());
        (first, second)
    }

    /// Total mechanical energy, potential measured from the pivot.
    pub fn energy(&self) -> f64 {
        let m = self.model();
        let (w1, w2) = (self.theta1_dot(), self.theta2_dot());
        let (p1, p2) = self.positions();
        let kinetic = 0.5 * m.mass1 * (m.length1 * w1).powi(2)
            + 0.5
                * m.mass2
                * ((m.length1 * w1).powi(2)
                    + (m.length2 * w2).powi(2)
                    + 2.0
                        * m.length1
                        * m.length2
                        * w1
                        * w2
                        * (self.theta1() - self.theta2()).cos());
        kinetic + m.gravity * (m.mass1 * p1.y + m.mass2 * p2.y)
    }
}

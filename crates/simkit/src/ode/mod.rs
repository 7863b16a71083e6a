//! Fixed-step ODE integration.
//!
//! A physical scenario is a [`Model`]: a pure derivative function over a
//! state vector of fixed dimension. A [`Simulation`] owns one model, its
//! state and time, and advances them one step per [`Simulation::update`]
//! with an [`OdeSolver`] (fourth-order Runge-Kutta unless chosen otherwise).
//!
//! ```
//! use simkit::ode::{Simulation, Model, OdeFunction};
//!
//! struct Decay;
//!
//! impl OdeFunction for Decay {
//!     fn evaluate(&self, _t: f64, x: &[f64], dx: &mut [f64]) {
//!         dx[0] = -x[0];
//!     }
//! }
//!
//! impl Model for Decay {
//!     const DIMENSION: usize = 1;
//! }
//!
//! let mut sim = Simulation::new(Decay, 0.0, 0.001, &[1.0])?;
//! sim.update()?;
//! assert!((sim.state()[0] - (-0.001f64).exp()).abs() < 1e-10);
//! # Ok::<(), simkit::SimError>(())
//! ```

mod solver;

use tracing::{debug, trace, warn};

use crate::error::{first_non_finite, require_time_step};
use crate::{SimError, SimResult};

pub use solver::{Euler, Midpoint, OdeSolver, RungeKutta4};

/// Right-hand side of `x' = f(t, x)`.
///
/// Implementations write the derivative of `state` at time `t` into
/// `derivative`, which has the same length as `state`. Closures of the shape
/// `Fn(f64, &[f64], &mut [f64])` implement this trait.
pub trait OdeFunction {
    fn evaluate(&self, t: f64, state: &[f64], derivative: &mut [f64]);
}

impl<F> OdeFunction for F
where
    F: Fn(f64, &[f64], &mut [f64]),
{
    #[inline]
    fn evaluate(&self, t: f64, state: &[f64], derivative: &mut [f64]) {
        self(t, state, derivative);
    }
}

/// A physical scenario with a fixed-size state vector.
pub trait Model: OdeFunction {
    /// Number of components in the state vector.
    const DIMENSION: usize;

    /// Checks the physical parameters before a simulation is built.
    fn validate(&self) -> SimResult<()> {
        Ok(())
    }
}

/// A model, its current state and the fixed-step clock that advances it.
#[derive(Debug, Clone)]
pub struct Simulation<M, S = RungeKutta4> {
    model: M,
    solver: S,
    state: Vec<f64>,
    next: Vec<f64>,
    time: f64,
    dt: f64,
    steps: u64,
}

impl<M: Model> Simulation<M, RungeKutta4> {
    /// Creates a simulation advanced by fourth-order Runge-Kutta.
    ///
    /// Fails if `dt` is not positive and finite, if `initial` does not have
    /// [`Model::DIMENSION`] components, or if the model rejects its
    /// parameters.
    pub fn new(model: M, time: f64, dt: f64, initial: &[f64]) -> SimResult<Self> {
        Self::with_solver(model, time, dt, initial)
    }
}

impl<M: Model, S: OdeSolver> Simulation<M, S> {
    /// Creates a simulation advanced by the solver `S`.
    pub fn with_solver(model: M, time: f64, dt: f64, initial: &[f64]) -> SimResult<Self> {
        let dt = require_time_step(dt)?;
        check_state::<M>(initial)?;
        model.validate()?;

        debug!(dimension = M::DIMENSION, time, dt, "ode simulation initialized");
        Ok(Self {
            model,
            solver: S::new(M::DIMENSION),
            state: initial.to_vec(),
            next: initial.to_vec(),
            time,
            dt,
            steps: 0,
        })
    }

    /// Replaces the model and state, as when a scenario is restarted with
    /// new parameters. The time step is kept.
    pub fn restart(&mut self, model: M, time: f64, initial: &[f64]) -> SimResult<()> {
        check_state::<M>(initial)?;
        model.validate()?;

        self.model = model;
        self.state.copy_from_slice(initial);
        self.time = time;
        self.steps = 0;
        debug!(time, "ode simulation restarted");
        Ok(())
    }

    /// Advances the state by one time step.
    ///
    /// If the step produces a non-finite component the state and time are
    /// left as they were and [`SimError::NonFiniteState`] is returned.
    pub fn update(&mut self) -> SimResult<()> {
        self.next.copy_from_slice(&self.state);
        self.solver.step(&self.model, self.time, self.dt, &mut self.next);

        if let Some(index) = first_non_finite(&self.next) {
            warn!(index, time = self.time, "ode step produced a non-finite state");
            return Err(SimError::NonFiniteState {
                index,
                time: self.time,
            });
        }

        std::mem::swap(&mut self.state, &mut self.next);
        self.time += self.dt;
        self.steps += 1;
        trace!(time = self.time, step = self.steps, "ode step");
        Ok(())
    }

    /// Runs `count` updates, stopping at the first error.
    pub fn advance(&mut self, count: usize) -> SimResult<()> {
        for _ in 0..count {
            self.update()?;
        }
        Ok(())
    }

    /// Returns the model.
    #[inline]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns the current state vector.
    #[inline]
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// Returns the current simulation time.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns the fixed time step.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of updates since creation or the last restart.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

fn check_state<M: Model>(initial: &[f64]) -> SimResult<()> {
    if initial.len() != M::DIMENSION {
        return Err(SimError::DimensionMismatch {
            expected: M::DIMENSION,
            actual: initial.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Decay {
        rate: f64,
    }

    impl OdeFunction for Decay {
        fn evaluate(&self, _t: f64, x: &[f64], dx: &mut [f64]) {
            dx[0] = -self.rate * x[0];
        }
    }

    impl Model for Decay {
        const DIMENSION: usize = 1;

        fn validate(&self) -> SimResult<()> {
            crate::error::require_positive("rate", self.rate).map(|_| ())
        }
    }

    /// `x' = 1 / x`, which blows up when started at zero.
    struct Reciprocal;

    impl OdeFunction for Reciprocal {
        fn evaluate(&self, _t: f64, x: &[f64], dx: &mut [f64]) {
            dx[0] = 1.0 / x[0];
        }
    }

    impl Model for Reciprocal {
        const DIMENSION: usize = 1;
    }

    #[test]
    fn update_advances_time_and_state() {
        let mut sim = Simulation::new(Decay { rate: 1.0 }, 2.0, 0.5, &[1.0]).unwrap();
        sim.advance(4).unwrap();

        assert_eq!(sim.steps(), 4);
        assert!((sim.time() - 4.0).abs() < 1e-12);
        assert!((sim.state()[0] - (-2.0f64).exp()).abs() < 1e-3);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert_eq!(
            Simulation::new(Decay { rate: 1.0 }, 0.0, 0.0, &[1.0]).err(),
            Some(SimError::InvalidTimeStep(0.0))
        );
        assert_eq!(
            Simulation::new(Decay { rate: 1.0 }, 0.0, 0.1, &[1.0, 2.0]).err(),
            Some(SimError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        );
        assert!(matches!(
            Simulation::new(Decay { rate: -1.0 }, 0.0, 0.1, &[1.0]),
            Err(SimError::InvalidParameter { name: "rate", .. })
        ));
    }

    #[test]
    fn non_finite_step_keeps_previous_state() {
        let mut sim = Simulation::new(Reciprocal, 0.0, 0.1, &[0.0]).unwrap();

        let err = sim.update().unwrap_err();

        assert_eq!(err, SimError::NonFiniteState { index: 0, time: 0.0 });
        assert_eq!(sim.state(), &[0.0]);
        assert_eq!(sim.time(), 0.0);
        assert_eq!(sim.steps(), 0);
    }

    #[test]
    fn restart_replaces_model_and_state() {
        let mut sim = Simulation::new(Decay { rate: 1.0 }, 0.0, 0.1, &[1.0]).unwrap();
        sim.advance(3).unwrap();

        sim.restart(Decay { rate: 2.0 }, 10.0, &[5.0]).unwrap();

        assert_eq!(sim.state(), &[5.0]);
        assert_eq!(sim.time(), 10.0);
        assert_eq!(sim.steps(), 0);
        assert_eq!(sim.model().rate, 2.0);
        assert!(sim.restart(Decay { rate: 0.0 }, 0.0, &[1.0]).is_err());
    }

    #[test]
    fn other_solvers_plug_in() {
        let mut euler: Simulation<Decay, Euler> =
            Simulation::with_solver(Decay { rate: 1.0 }, 0.0, 0.1, &[1.0]).unwrap();
        let mut midpoint: Simulation<Decay, Midpoint> =
            Simulation::with_solver(Decay { rate: 1.0 }, 0.0, 0.1, &[1.0]).unwrap();
        euler.update().unwrap();
        midpoint.update().unwrap();

        assert!((euler.state()[0] - 0.9).abs() < 1e-12);
        assert!((midpoint.state()[0] - 0.905).abs() < 1e-12);
    }
}

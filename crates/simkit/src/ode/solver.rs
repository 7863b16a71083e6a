//! Fixed-step explicit solvers.

use super::OdeFunction;

/// A fixed-step explicit ODE solver.
///
/// Solvers own their scratch buffers, sized once for a state dimension, so a
/// step never allocates.
pub trait OdeSolver {
    /// Creates a solver for states of `dimension` components.
    fn new(dimension: usize) -> Self
    where
        Self: Sized;

    /// Number of state components the solver was sized for.
    fn dimension(&self) -> usize;

    /// Advances `state` in place from time `t` to `t + dt`.
    ///
    /// # Panics
    /// Panics if `state.len()` differs from [`OdeSolver::dimension`].
    fn step<F>(&mut self, f: &F, t: f64, dt: f64, state: &mut [f64])
    where
        F: OdeFunction + ?Sized;
}

/// Forward Euler: one evaluation per step, first order.
#[derive(Debug, Clone)]
pub struct Euler {
    slope: Vec<f64>,
}

impl OdeSolver for Euler {
    fn new(dimension: usize) -> Self {
        Self {
            slope: vec![0.0; dimension],
        }
    }

    fn dimension(&self) -> usize {
        self.slope.len()
    }

    fn step<F>(&mut self, f: &F, t: f64, dt: f64, state: &mut [f64])
    where
        F: OdeFunction + ?Sized,
    {
        assert_eq!(state.len(), self.slope.len(), "state dimension mismatch");
        f.evaluate(t, state, &mut self.slope);
        for (x, k) in state.iter_mut().zip(&self.slope) {
            *x += dt * k;
        }
    }
}

/// Explicit midpoint: two evaluations per step, second order.
#[derive(Debug, Clone)]
pub struct Midpoint {
    k1: Vec<f64>,
    k2: Vec<f64>,
    scratch: Vec<f64>,
}

impl OdeSolver for Midpoint {
    fn new(dimension: usize) -> Self {
        Self {
            k1: vec![0.0; dimension],
            k2: vec![0.0; dimension],
            scratch: vec![0.0; dimension],
        }
    }

    fn dimension(&self) -> usize {
        self.k1.len()
    }

    fn step<F>(&mut self, f: &F, t: f64, dt: f64, state: &mut [f64])
    where
        F: OdeFunction + ?Sized,
    {
        assert_eq!(state.len(), self.k1.len(), "state dimension mismatch");
        let half = 0.5 * dt;

        f.evaluate(t, state, &mut self.k1);
        offset(&mut self.scratch, state, half, &self.k1);
        f.evaluate(t + half, &self.scratch, &mut self.k2);

        for (x, k) in state.iter_mut().zip(&self.k2) {
            *x += dt * k;
        }
    }
}

/// Classic fourth-order Runge-Kutta.
///
/// Evaluates the derivative at `t`, twice at `t + dt/2` and at `t + dt`,
/// and combines the slopes with weights `1, 2, 2, 1` over 6.
#[derive(Debug, Clone)]
pub struct RungeKutta4 {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    scratch: Vec<f64>,
}

impl OdeSolver for RungeKutta4 {
    fn new(dimension: usize) -> Self {
        Self {
            k1: vec![0.0; dimension],
            k2: vec![0.0; dimension],
            k3: vec![0.0; dimension],
            k4: vec![0.0; dimension],
            scratch: vec![0.0; dimension],
        }
    }

    fn dimension(&self) -> usize {
        self.k1.len()
    }

    fn step<F>(&mut self, f: &F, t: f64, dt: f64, state: &mut [f64])
    where
        F: OdeFunction + ?Sized,
    {
        assert_eq!(state.len(), self.k1.len(), "state dimension mismatch");
        let half = 0.5 * dt;

        f.evaluate(t, state, &mut self.k1);

        offset(&mut self.scratch, state, half, &self.k1);
        f.evaluate(t + half, &self.scratch, &mut self.k2);

        offset(&mut self.scratch, state, half, &self.k2);
        f.evaluate(t + half, &self.scratch, &mut self.k3);

        offset(&mut self.scratch, state, dt, &self.k3);
        f.evaluate(t + dt, &self.scratch, &mut self.k4);

        let sixth = dt / 6.0;
        for i in 0..state.len() {
            state[i] += sixth * (self.k1[i] + 2.0 * (self.k2[i] + self.k3[i]) + self.k4[i]);
        }
    }
}

/// `out = base + h * slope`
#[inline]
fn offset(out: &mut [f64], base: &[f64], h: f64, slope: &[f64]) {
    for ((o, b), k) in out.iter_mut().zip(base).zip(slope) {
        *o = b + h * k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decay(_t: f64, x: &[f64], dx: &mut [f64]) {
        dx[0] = -x[0];
    }

    /// Integrates `x' = -x` from 1 over `[0, 1]` and returns the final error.
    fn decay_error<S: OdeSolver>(steps: usize) -> f64 {
        let dt = 1.0 / steps as f64;
        let mut solver = S::new(1);
        let mut x = [1.0];
        for i in 0..steps {
            solver.step(&decay, i as f64 * dt, dt, &mut x);
        }
        (x[0] - (-1.0f64).exp()).abs()
    }

    #[test]
    fn rk4_single_step_matches_exponential() {
        let dt = 0.001;
        let mut solver = RungeKutta4::new(1);
        let mut x = [1.0];

        solver.step(&decay, 0.0, dt, &mut x);

        assert!((x[0] - (-dt).exp()).abs() < 1e-10);
    }

    #[test]
    fn rk4_weights_on_polynomial() {
        // x' = t^3 is integrated exactly by Simpson's rule.
        let cubic = |t: f64, _x: &[f64], dx: &mut [f64]| dx[0] = t * t * t;
        let mut solver = RungeKutta4::new(1);
        let mut x = [0.0];

        solver.step(&cubic, 1.0, 1.0, &mut x);

        // (2^4 - 1^4) / 4
        assert!((x[0] - 3.75).abs() < 1e-12);
    }

    #[test]
    fn convergence_orders() {
        let euler = decay_error::<Euler>(100) / decay_error::<Euler>(200);
        let midpoint = decay_error::<Midpoint>(100) / decay_error::<Midpoint>(200);
        let rk4 = decay_error::<RungeKutta4>(20) / decay_error::<RungeKutta4>(40);

        // Halving the step divides the error by 2^order.
        assert!((euler - 2.0).abs() < 0.1, "euler ratio {euler}");
        assert!((midpoint - 4.0).abs() < 0.2, "midpoint ratio {midpoint}");
        assert!((rk4 - 16.0).abs() < 1.0, "rk4 ratio {rk4}");
    }

    #[test]
    fn harmonic_oscillator_stays_on_circle() {
        let oscillator = |_t: f64, s: &[f64], ds: &mut [f64]| {
            ds[0] = s[1];
            ds[1] = -s[0];
        };
        let mut solver = RungeKutta4::new(2);
        let mut s = [1.0, 0.0];
        let dt = 0.01;
        for i in 0..628 {
            solver.step(&oscillator, i as f64 * dt, dt, &mut s);
        }
        let radius = (s[0] * s[0] + s[1] * s[1]).sqrt();
        assert!((radius - 1.0).abs() < 1e-8);
        assert!((s[0] - 6.28f64.cos()).abs() < 1e-8);
    }

    #[test]
    #[should_panic(expected = "state dimension mismatch")]
    fn wrong_dimension_panics() {
        let mut solver = Euler::new(2);
        solver.step(&decay, 0.0, 0.1, &mut [1.0]);
    }
}

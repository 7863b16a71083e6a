//! Particles joined by linear springs.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{first_non_finite, require_non_negative, require_time_step};
use crate::ode::{OdeFunction, OdeSolver, RungeKutta4};
use crate::{SimError, SimResult};

/// State components per particle: position then velocity.
const STRIDE: usize = 6;

/// Springs shorter than this exert no force.
const MIN_SPRING_LENGTH: f64 = 1e-12;

/// How a [`SpringNetwork`] advances its particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Classic fourth-order Runge-Kutta over the whole network.
    #[default]
    RungeKutta4,
    /// Velocity first, then position with the new velocity.
    SemiImplicitEuler,
}

/// A linear spring between particles `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub a: usize,
    pub b: usize,
    pub rest_length: f64,
    pub stiffness: f64,
}

impl Spring {
    /// Index of the particle at the other end from `i`.
    #[inline]
    pub fn other(&self, i: usize) -> usize {
        if i == self.a { self.b } else { self.a }
    }

    /// Force exerted on particle `i`, pulling it toward the other end when
    /// stretched and pushing it away when compressed.
    pub fn force_on(&self, i: usize, particles: Particles<'_>) -> Vector3<f64> {
        let d = particles.position(self.other(i)) - particles.position(i);
        let length = d.norm();
        if length < MIN_SPRING_LENGTH {
            return Vector3::zeros();
        }
        d * (self.stiffness * (length - self.rest_length) / length)
    }

    pub fn potential_energy(&self, particles: Particles<'_>) -> f64 {
        let length = (particles.position(self.b) - particles.position(self.a)).norm();
        let stretch = length - self.rest_length;
        0.5 * self.stiffness * stretch * stretch
    }
}

/// Read-only view of the particle positions and velocities at one
/// evaluation point of a step.
#[derive(Debug, Clone, Copy)]
pub struct Particles<'a> {
    state: &'a [f64],
}

impl<'a> Particles<'a> {
    pub(crate) fn new(state: &'a [f64]) -> Self {
        debug_assert_eq!(state.len() % STRIDE, 0);
        Self { state }
    }

    pub fn len(&self) -> usize {
        self.state.len() / STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// # Panics
    /// Panics if `i` is out of range.
    #[inline]
    pub fn position(&self, i: usize) -> Point3<f64> {
        let s = &self.state[i * STRIDE..i * STRIDE + 3];
        Point3::new(s[0], s[1], s[2])
    }

    /// # Panics
    /// Panics if `i` is out of range.
    #[inline]
    pub fn velocity(&self, i: usize) -> Vector3<f64> {
        let s = &self.state[i * STRIDE + 3..i * STRIDE + STRIDE];
        Vector3::new(s[0], s[1], s[2])
    }
}

/// Acceleration applied to each particle on top of the spring forces.
///
/// Closures `Fn(usize, f64, Particles<'_>) -> Vector3<f64>` implement this
/// trait.
pub trait ExternalForce {
    /// Acceleration of particle `index` at `time`.
    fn acceleration(&self, index: usize, time: f64, particles: Particles<'_>) -> Vector3<f64>;
}

impl<F> ExternalForce for F
where
    F: Fn(usize, f64, Particles<'_>) -> Vector3<f64>,
{
    #[inline]
    fn acceleration(&self, index: usize, time: f64, particles: Particles<'_>) -> Vector3<f64> {
        self(index, time, particles)
    }
}

/// The same acceleration everywhere, such as plain gravity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UniformAcceleration(pub Vector3<f64>);

impl ExternalForce for UniformAcceleration {
    #[inline]
    fn acceleration(&self, _index: usize, _time: f64, _particles: Particles<'_>) -> Vector3<f64> {
        self.0
    }
}

/// General mass-spring system.
///
/// Particle state is stored flat so the whole network is one ODE state; all
/// particles advance from the same start-of-step snapshot. A particle with
/// infinite mass is pinned: it receives a zero derivative and never moves.
#[derive(Debug, Clone)]
pub struct SpringNetwork {
    state: Vec<f64>,
    next: Vec<f64>,
    slope: Vec<f64>,
    masses: Vec<f64>,
    inverse_masses: Vec<f64>,
    springs: Vec<Spring>,
    incident: Vec<Vec<usize>>,
    time_step: f64,
    integrator: Integrator,
    solver: RungeKutta4,
}

impl SpringNetwork {
    /// Creates `count` unit-mass particles at rest at the origin.
    pub fn new(count: usize, time_step: f64) -> SimResult<Self> {
        let time_step = require_time_step(time_step)?;
        let dimension = count * STRIDE;
        debug!(particles = count, time_step, "spring network created");
        Ok(Self {
            state: vec![0.0; dimension],
            next: vec![0.0; dimension],
            slope: vec![0.0; dimension],
            masses: vec![1.0; count],
            inverse_masses: vec![1.0; count],
            springs: Vec::new(),
            incident: vec![Vec::new(); count],
            time_step,
            integrator: Integrator::default(),
            solver: RungeKutta4::new(dimension),
        })
    }

    /// Selects the integration scheme.
    #[must_use]
    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    /// Appends a particle at rest and returns its index.
    pub fn add_particle(&mut self, position: Point3<f64>, mass: f64) -> SimResult<usize> {
        let inverse = inverse_mass(mass)?;
        let index = self.masses.len();
        self.state.extend_from_slice(&[position.x, position.y, position.z, 0.0, 0.0, 0.0]);
        self.masses.push(mass);
        self.inverse_masses.push(inverse);
        self.incident.push(Vec::new());
        self.resize_scratch();
        Ok(index)
    }

    /// Connects particles `a` and `b` and returns the spring index.
    pub fn add_spring(
        &mut self,
        a: usize,
        b: usize,
        rest_length: f64,
        stiffness: f64,
    ) -> SimResult<usize> {
        self.check_index(a)?;
        self.check_index(b)?;
        let rest_length = require_non_negative("rest_length", rest_length)?;
        let stiffness = require_non_negative("stiffness", stiffness)?;

        let index = self.springs.len();
        self.springs.push(Spring {
            a,
            b,
            rest_length,
            stiffness,
        });
        self.incident[a].push(index);
        if b != a {
            self.incident[b].push(index);
        }
        Ok(index)
    }

    /// Changes the rest length and stiffness of an existing spring.
    pub fn set_spring(&mut self, index: usize, rest_length: f64, stiffness: f64) -> SimResult<()> {
        let len = self.springs.len();
        let rest_length = require_non_negative("rest_length", rest_length)?;
        let stiffness = require_non_negative("stiffness", stiffness)?;
        let spring = self.springs.get_mut(index).ok_or(SimError::IndexOutOfBounds { index, len })?;
        spring.rest_length = rest_length;
        spring.stiffness = stiffness;
        Ok(())
    }

    /// Sets every spring's stiffness and takes its current length as the rest
    /// length, so the present configuration is unstressed.
    pub fn relax_springs(&mut self, stiffness: f64) -> SimResult<()> {
        let stiffness = require_non_negative("stiffness", stiffness)?;
        let particles = Particles::new(&self.state);
        for spring in &mut self.springs {
            let d = particles.position(spring.b) - particles.position(spring.a);
            spring.rest_length = d.norm();
            spring.stiffness = stiffness;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn integrator(&self) -> Integrator {
        self.integrator
    }

    pub fn particles(&self) -> Particles<'_> {
        Particles::new(&self.state)
    }

    /// # Panics
    /// Panics if `i` is out of range.
    pub fn position(&self, i: usize) -> Point3<f64> {
        self.particles().position(i)
    }

    /// # Panics
    /// Panics if `i` is out of range.
    pub fn velocity(&self, i: usize) -> Vector3<f64> {
        self.particles().velocity(i)
    }

    pub fn set_position(&mut self, i: usize, position: Point3<f64>) -> SimResult<()> {
        self.check_index(i)?;
        self.state[i * STRIDE..i * STRIDE + 3].copy_from_slice(position.coords.as_slice());
        Ok(())
    }

    pub fn set_velocity(&mut self, i: usize, velocity: Vector3<f64>) -> SimResult<()> {
        self.check_index(i)?;
        self.state[i * STRIDE + 3..i * STRIDE + STRIDE].copy_from_slice(velocity.as_slice());
        Ok(())
    }

    /// # Panics
    /// Panics if `i` is out of range.
    pub fn mass(&self, i: usize) -> f64 {
        self.masses[i]
    }

    /// Sets the mass of particle `i`. `f64::INFINITY` pins it in place; zero,
    /// negative and NaN masses are rejected.
    pub fn set_mass(&mut self, i: usize, mass: f64) -> SimResult<()> {
        self.check_index(i)?;
        self.inverse_masses[i] = inverse_mass(mass)?;
        self.masses[i] = mass;
        Ok(())
    }

    /// Fixes particle `i` in place.
    pub fn pin(&mut self, i: usize) -> SimResult<()> {
        self.set_mass(i, f64::INFINITY)
    }

    pub fn is_pinned(&self, i: usize) -> bool {
        self.inverse_masses.get(i).is_some_and(|&w| w == 0.0)
    }

    /// Total spring force on particle `i`.
    pub fn spring_force_on(&self, i: usize) -> SimResult<Vector3<f64>> {
        self.check_index(i)?;
        Ok(net_spring_force(&self.springs, &self.incident[i], i, self.particles()))
    }

    /// Kinetic energy of the free particles.
    pub fn kinetic_energy(&self) -> f64 {
        let particles = self.particles();
        (0..self.len())
            .filter(|&i| !self.is_pinned(i))
            .map(|i| 0.5 * self.masses[i] * particles.velocity(i).norm_squared())
            .sum()
    }

    /// Elastic energy stored in the springs.
    pub fn potential_energy(&self) -> f64 {
        let particles = self.particles();
        self.springs.iter().map(|s| s.potential_energy(particles)).sum()
    }

    /// Advances every particle from `time` to `time + time_step`.
    ///
    /// If any position or velocity becomes non-finite the network is left
    /// unchanged and [`SimError::NonFiniteState`] names the first offending
    /// particle.
    pub fn update<E>(&mut self, time: f64, force: &E) -> SimResult<()>
    where
        E: ExternalForce + ?Sized,
    {
        let dynamics = Dynamics {
            springs: &self.springs,
            incident: &self.incident,
            inverse_masses: &self.inverse_masses,
            force,
        };
        let dt = self.time_step;
        self.next.copy_from_slice(&self.state);

        match self.integrator {
            Integrator::RungeKutta4 => self.solver.step(&dynamics, time, dt, &mut self.next),
            Integrator::SemiImplicitEuler => {
                dynamics.evaluate(time, &self.state, &mut self.slope);
                let particles = self
                    .next
                    .chunks_exact_mut(STRIDE)
                    .zip(self.slope.chunks_exact(STRIDE));
                for ((x, k), &w) in particles.zip(&self.inverse_masses) {
                    if w == 0.0 {
                        continue;
                    }
                    for c in 0..3 {
                        x[3 + c] += dt * k[3 + c];
                        x[c] += dt * x[3 + c];
                    }
                }
            }
        }

        if let Some(component) = first_non_finite(&self.next) {
            let index = component / STRIDE;
            warn!(particle = index, time, "spring network step produced a non-finite state");
            return Err(SimError::NonFiniteState { index, time });
        }

        std::mem::swap(&mut self.state, &mut self.next);
        trace!(time, particles = self.len(), "spring network step");
        Ok(())
    }

    fn check_index(&self, index: usize) -> SimResult<()> {
        let len = self.len();
        if index < len {
            Ok(())
        } else {
            Err(SimError::IndexOutOfBounds { index, len })
        }
    }

    fn resize_scratch(&mut self) {
        let dimension = self.state.len();
        self.next.resize(dimension, 0.0);
        self.slope.resize(dimension, 0.0);
        self.solver = RungeKutta4::new(dimension);
    }
}

fn inverse_mass(mass: f64) -> SimResult<f64> {
    if mass.is_nan() || mass <= 0.0 {
        return Err(SimError::InvalidMass(mass));
    }
    Ok(mass.recip())
}

fn net_spring_force(
    springs: &[Spring],
    incident: &[usize],
    i: usize,
    particles: Particles<'_>,
) -> Vector3<f64> {
    incident.iter().map(|&s| springs[s].force_on(i, particles)).sum()
}

/// The network's equations of motion over the flat state.
struct Dynamics<'a, E: ?Sized> {
    springs: &'a [Spring],
    incident: &'a [Vec<usize>],
    inverse_masses: &'a [f64],
    force: &'a E,
}

impl<E: ExternalForce + ?Sized> OdeFunction for Dynamics<'_, E> {
    fn evaluate(&self, t: f64, state: &[f64], derivative: &mut [f64]) {
        let particles = Particles::new(state);
        let rows = derivative.chunks_exact_mut(STRIDE).zip(self.inverse_masses);
        for (i, (out, &w)) in rows.enumerate() {
            if w == 0.0 {
                out.fill(0.0);
                continue;
            }
            let spring = net_spring_force(self.springs, &self.incident[i], i, particles);
            let acceleration = spring * w + self.force.acceleration(i, t, particles);
            out[..3].copy_from_slice(particles.velocity(i).as_slice());
            out[3..].copy_from_slice(acceleration.as_slice());
        }
    }
}

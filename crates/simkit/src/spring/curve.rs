//! Chain of particles joined end to end by springs.

use nalgebra::{Point3, Vector3};
use tracing::debug;

use super::{ExternalForce, Integrator, SpringNetwork};
use crate::{SimError, SimResult};

/// A chain of particles, each joined to the next by a spring. Hung from one
/// pinned end it behaves like a rope.
#[derive(Debug, Clone)]
pub struct MassSpringCurve {
    network: SpringNetwork,
}

impl MassSpringCurve {
    /// Builds `count` unit masses at the origin joined by slack springs.
    pub fn new(count: usize, time_step: f64) -> SimResult<Self> {
        if count < 2 {
            return Err(SimError::CurveTooShort(count));
        }
        let mut network = SpringNetwork::new(count, time_step)?;
        for i in 0..count - 1 {
            network.add_spring(i, i + 1, 0.0, 0.0)?;
        }
        debug!(particles = count, "mass-spring curve created");
        Ok(Self { network })
    }

    /// Places the particles evenly on the segment `start..end` and relaxes
    /// the springs there with the given stiffness.
    pub fn from_segment(
        count: usize,
        start: Point3<f64>,
        end: Point3<f64>,
        stiffness: f64,
        time_step: f64,
    ) -> SimResult<Self> {
        let mut curve = Self::new(count, time_step)?;
        let last = (count - 1) as f64;
        for i in 0..count {
            curve.set_position(i, start + (end - start) * (i as f64 / last))?;
        }
        curve.install_springs(stiffness)?;
        Ok(curve)
    }

    #[must_use]
    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.network = self.network.with_integrator(integrator);
        self
    }

    pub fn len(&self) -> usize {
        self.network.len()
    }

    pub fn is_empty(&self) -> bool {
        self.network.is_empty()
    }

    /// # Panics
    /// Panics if `i` is out of range.
    pub fn position(&self, i: usize) -> Point3<f64> {
        self.network.position(i)
    }

    /// # Panics
    /// Panics if `i` is out of range.
    pub fn velocity(&self, i: usize) -> Vector3<f64> {
        self.network.velocity(i)
    }

    pub fn set_position(&mut self, i: usize, position: Point3<f64>) -> SimResult<()> {
        self.network.set_position(i, position)
    }

    pub fn set_velocity(&mut self, i: usize, velocity: Vector3<f64>) -> SimResult<()> {
        self.network.set_velocity(i, velocity)
    }

    pub fn set_mass(&mut self, i: usize, mass: f64) -> SimResult<()> {
        self.network.set_mass(i, mass)
    }

    pub fn pin(&mut self, i: usize) -> SimResult<()> {
        self.network.pin(i)
    }

    /// Sets the spring between particles `i` and `i + 1`.
    pub fn set_spring(&mut self, i: usize, rest_length: f64, stiffness: f64) -> SimResult<()> {
        self.network.set_spring(i, rest_length, stiffness)
    }

    pub fn install_springs(&mut self, stiffness: f64) -> SimResult<()> {
        self.network.relax_springs(stiffness)
    }

    pub fn update<E>(&mut self, time: f64, force: &E) -> SimResult<()>
    where
        E: ExternalForce + ?Sized,
    {
        self.network.update(time, force)
    }

    pub fn network(&self) -> &SpringNetwork {
        &self.network
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spring::{Particles, UniformAcceleration};
    use approx::assert_relative_eq;

    #[test]
    fn needs_two_particles() {
        assert_eq!(MassSpringCurve::new(1, 0.01).err(), Some(SimError::CurveTooShort(1)));
        assert_eq!(MassSpringCurve::new(2, 0.01).unwrap().network().springs().len(), 1);
    }

    #[test]
    fn segment_is_evenly_spaced_and_unstressed() {
        let end = Point3::new(2.0, 0.0, 0.0);
        let curve = MassSpringCurve::from_segment(5, Point3::origin(), end, 30.0, 0.01).unwrap();
        assert_relative_eq!(curve.position(2), Point3::new(1.0, 0.0, 0.0));
        for spring in curve.network().springs() {
            assert_relative_eq!(spring.rest_length, 0.5);
            assert_eq!(spring.stiffness, 30.0);
        }
        assert_relative_eq!(curve.network().potential_energy(), 0.0);
    }

    #[test]
    fn rope_swings_down_from_pinned_end() {
        let end = Point3::new(1.0, 0.0, 0.0);
        let mut curve =
            MassSpringCurve::from_segment(6, Point3::origin(), end, 5000.0, 0.002).unwrap();
        curve.pin(0).unwrap();
        let gravity = UniformAcceleration(Vector3::new(0.0, -9.81, 0.0));

        for n in 0..200 {
            curve.update(n as f64 * 0.002, &gravity).unwrap();
        }

        assert_eq!(curve.position(0), Point3::origin());
        let tip = curve.position(5);
        assert!(tip.y < -0.5, "tip at {tip}");
        // Stiff springs keep the rope close to its rest length.
        assert!(tip.coords.norm() < 1.2);
    }

    #[test]
    fn time_dependent_force_receives_update_time() {
        let mut curve = MassSpringCurve::new(2, 0.1).unwrap();
        let pulse = |_: usize, t: f64, _: Particles<'_>| {
            if t < 1.0 { Vector3::zeros() } else { Vector3::new(1.0, 0.0, 0.0) }
        };

        curve.update(0.0, &pulse).unwrap();
        assert_eq!(curve.velocity(0), Vector3::zeros());
        curve.update(5.0, &pulse).unwrap();
        assert_relative_eq!(curve.velocity(1), Vector3::new(0.1, 0.0, 0.0), epsilon = 1e-12);
    }
}

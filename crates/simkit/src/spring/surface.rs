//! Rectangular mass-spring grid, the base of the cloth.

use nalgebra::{Point3, Vector3};
use tracing::debug;

use super::{ExternalForce, Integrator, SpringNetwork};
use crate::{SimError, SimResult};

/// A rectangular grid of particles with springs between horizontal and
/// vertical neighbours.
///
/// Particle `(row, col)` is stored at index `row * cols + col`. The
/// network holds all horizontal springs first, row by row, then all vertical
/// ones.
#[derive(Debug, Clone)]
pub struct MassSpringSurface {
    rows: usize,
    cols: usize,
    network: SpringNetwork,
}

impl MassSpringSurface {
    /// Builds an unstressed `rows` x `cols` grid of unit masses at the origin.
    ///
    /// Positions, masses and spring constants are expected to be set before
    /// the first update; [`MassSpringSurface::install_springs`] measures rest
    /// lengths from the positions in place at the time of the call.
    pub fn new(rows: usize, cols: usize, time_step: f64) -> SimResult<Self> {
        if rows < 2 || cols < 2 {
            return Err(SimError::GridTooSmall { rows, cols });
        }
        let mut network = SpringNetwork::new(rows * cols, time_step)?;
        for row in 0..rows {
            for col in 0..cols - 1 {
                let here = row * cols + col;
                network.add_spring(here, here + 1, 0.0, 0.0)?;
            }
        }
        for row in 0..rows - 1 {
            for col in 0..cols {
                let here = row * cols + col;
                network.add_spring(here, here + cols, 0.0, 0.0)?;
            }
        }
        debug!(
            rows,
            cols,
            springs = network.springs().len(),
            "mass-spring surface created"
        );
        Ok(Self { rows, cols, network })
    }

    #[must_use]
    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.network = self.network.with_integrator(integrator);
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Flat particle index of `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> SimResult<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(SimError::IndexOutOfBounds {
                index: row * self.cols + col,
                len: self.rows * self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// # Panics
    /// Panics if `(row, col)` lies outside the grid.
    pub fn position(&self, row: usize, col: usize) -> Point3<f64> {
        assert!(row < self.rows && col < self.cols, "grid position out of bounds");
        self.network.position(row * self.cols + col)
    }

    /// # Panics
    /// Panics if `(row, col)` lies outside the grid.
    pub fn velocity(&self, row: usize, col: usize) -> Vector3<f64> {
        assert!(row < self.rows && col < self.cols, "grid position out of bounds");
        self.network.velocity(row * self.cols + col)
    }

    pub fn set_position(
        &mut self,
        row: usize,
        col: usize,
        position: Point3<f64>,
    ) -> SimResult<()> {
        let i = self.index(row, col)?;
        self.network.set_position(i, position)
    }

    pub fn set_velocity(
        &mut self,
        row: usize,
        col: usize,
        velocity: Vector3<f64>,
    ) -> SimResult<()> {
        let i = self.index(row, col)?;
        self.network.set_velocity(i, velocity)
    }

    /// `f64::INFINITY` pins the particle.
    pub fn set_mass(&mut self, row: usize, col: usize, mass: f64) -> SimResult<()> {
        let i = self.index(row, col)?;
        self.network.set_mass(i, mass)
    }

    pub fn pin(&mut self, row: usize, col: usize) -> SimResult<()> {
        let i = self.index(row, col)?;
        self.network.pin(i)
    }

    /// Network index of the spring joining `(row, col)` to `(row, col + 1)`.
    pub fn horizontal_spring(&self, row: usize, col: usize) -> SimResult<usize> {
        let per_row = self.cols - 1;
        if row >= self.rows || col >= per_row {
            return Err(SimError::IndexOutOfBounds {
                index: row * per_row + col,
                len: self.rows * per_row,
            });
        }
        Ok(row * per_row + col)
    }

    /// Network index of the spring joining `(row, col)` to `(row + 1, col)`.
    pub fn vertical_spring(&self, row: usize, col: usize) -> SimResult<usize> {
        if row + 1 >= self.rows || col >= self.cols {
            return Err(SimError::IndexOutOfBounds {
                index: row * self.cols + col,
                len: (self.rows - 1) * self.cols,
            });
        }
        Ok(self.rows * (self.cols - 1) + row * self.cols + col)
    }

    /// Sets the spring between `(row, col)` and `(row, col + 1)`.
    pub fn set_horizontal_spring(
        &mut self,
        row: usize,
        col: usize,
        rest_length: f64,
        stiffness: f64,
    ) -> SimResult<()> {
        let k = self.horizontal_spring(row, col)?;
        self.network.set_spring(k, rest_length, stiffness)
    }

    /// Sets the spring between `(row, col)` and `(row + 1, col)`.
    pub fn set_vertical_spring(
        &mut self,
        row: usize,
        col: usize,
        rest_length: f64,
        stiffness: f64,
    ) -> SimResult<()> {
        let k = self.vertical_spring(row, col)?;
        self.network.set_spring(k, rest_length, stiffness)
    }

    /// Gives every spring `stiffness` and its current length as rest length.
    pub fn install_springs(&mut self, stiffness: f64) -> SimResult<()> {
        self.network.relax_springs(stiffness)
    }

    /// Advances the grid from `time` by one time step.
    pub fn update<E>(&mut self, time: f64, force: &E) -> SimResult<()>
    where
        E: ExternalForce + ?Sized,
    {
        self.network.update(time, force)
    }

    pub fn network(&self) -> &SpringNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut SpringNetwork {
        &mut self.network
    }
}

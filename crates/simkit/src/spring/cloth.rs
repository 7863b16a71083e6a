//! Wind-blown cloth: a pinned mass-spring surface under gravity, wind,
//! viscous drag and a per-particle flutter.

use std::f64::consts::TAU;

use nalgebra::{Point3, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ExternalForce, Integrator, MassSpringSurface, Particles};
use crate::error::{require_non_negative, require_positive};
use crate::SimResult;

/// External acceleration acting on every cloth particle:
///
/// `gravity + wind - viscosity * v + amplitude[i] * sin(2 t + phase[i]) * dir`
///
/// where `dir` is the unit vector along `gravity x wind`, or zero when the
/// two are parallel. Amplitudes and phases are drawn once per particle from
/// a seeded generator, so the same seed always produces the same flutter.
#[derive(Debug, Clone, PartialEq)]
pub struct ClothForce {
    gravity: Vector3<f64>,
    wind: Vector3<f64>,
    viscosity: f64,
    direction: Vector3<f64>,
    amplitudes: Vec<f64>,
    phases: Vec<f64>,
}

impl ClothForce {
    pub fn new(
        count: usize,
        gravity: Vector3<f64>,
        wind: Vector3<f64>,
        viscosity: f64,
        max_amplitude: f64,
        seed: u64,
    ) -> SimResult<Self> {
        let viscosity = require_non_negative("viscosity", viscosity)?;
        let max_amplitude = require_non_negative("max_amplitude", max_amplitude)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (amplitudes, phases): (Vec<f64>, Vec<f64>) = (0..count)
            .map(|_| (rng.gen_range(0.0..=max_amplitude), rng.gen_range(0.0..TAU)))
            .unzip();

        Ok(Self {
            gravity,
            wind,
            viscosity,
            direction: gravity
                .cross(&wind)
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros),
            amplitudes,
            phases,
        })
    }

    /// Unit flutter direction, zero if gravity and wind are parallel.
    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn phases(&self) -> &[f64] {
        &self.phases
    }
}

impl ExternalForce for ClothForce {
    fn acceleration(&self, index: usize, time: f64, particles: Particles<'_>) -> Vector3<f64> {
        let flutter = self.amplitudes[index] * (2.0 * time + self.phases[index]).sin();
        let drag = particles.velocity(index) * self.viscosity;
        self.gravity + self.wind - drag + self.direction * flutter
    }
}

/// Settings for [`Cloth`]. The defaults reproduce the classic flag scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothConfig {
    pub rows: usize,
    pub cols: usize,
    pub time_step: f64,
    pub gravity: Vector3<f64>,
    pub wind: Vector3<f64>,
    pub viscosity: f64,
    pub max_amplitude: f64,
    pub stiffness: f64,
    pub mass: f64,
    pub seed: u64,
    pub integrator: Integrator,
}

impl Default for ClothConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 16,
            time_step: 0.01,
            gravity: Vector3::new(0.0, 0.0, -1.0),
            wind: Vector3::new(0.5, 0.0, 0.0),
            viscosity: 10.0,
            max_amplitude: 2.0,
            stiffness: 10.0,
            mass: 1.0,
            seed: 0,
            integrator: Integrator::default(),
        }
    }
}

impl ClothConfig {
    #[must_use]
    pub fn with_grid(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_wind(mut self, wind: Vector3<f64>) -> Self {
        self.wind = wind;
        self
    }

    #[must_use]
    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }
}

/// A cloth hung by its top row over the unit square of the xz plane.
#[derive(Debug, Clone)]
pub struct Cloth {
    surface: MassSpringSurface,
    force: ClothForce,
    time: f64,
}

impl Cloth {
    pub fn new(config: &ClothConfig) -> SimResult<Self> {
        let mass = require_positive("mass", config.mass)?;
        let mut surface = MassSpringSurface::new(config.rows, config.cols, config.time_step)?
            .with_integrator(config.integrator);

        let (last_row, last_col) = ((config.rows - 1) as f64, (config.cols - 1) as f64);
        for row in 0..config.rows {
            for col in 0..config.cols {
                let position = Point3::new(col as f64 / last_col, 0.0, 1.0 - row as f64 / last_row);
                surface.set_position(row, col, position)?;
                surface.set_mass(row, col, mass)?;
            }
        }
        for col in 0..config.cols {
            surface.pin(0, col)?;
        }
        surface.install_springs(config.stiffness)?;

        let force = ClothForce::new(
            config.rows * config.cols,
            config.gravity,
            config.wind,
            config.viscosity,
            config.max_amplitude,
            config.seed,
        )?;

        debug!(rows = config.rows, cols = config.cols, seed = config.seed, "cloth created");
        Ok(Self {
            surface,
            force,
            time: 0.0,
        })
    }

    /// Advances the cloth by one time step.
    pub fn update(&mut self) -> SimResult<()> {
        self.surface.update(self.time, &self.force)?;
        self.time += self.surface.network().time_step();
        Ok(())
    }

    /// # Panics
    /// Panics if `(row, col)` lies outside the grid.
    pub fn position(&self, row: usize, col: usize) -> Point3<f64> {
        self.surface.position(row, col)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn surface(&self) -> &MassSpringSurface {
        &self.surface
    }

    pub fn force(&self) -> &ClothForce {
        &self.force
    }
}

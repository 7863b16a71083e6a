//! Small simulation kernels for graphics and physics samples.
//!
//! - [`bsp`]: hand-built binary space partitions that order their geometry
//!   back-to-front or front-to-back for a viewpoint.
//! - [`spring`]: mass-spring networks, grids and chains, and a wind-blown
//!   cloth built from them.
//! - [`ode`]: fixed-step Runge-Kutta integration of generalized coordinates.
//! - [`scenarios`]: pendulums, sliding bodies on a rough incline and a
//!   Kepler orbit, with closed-form references where they exist.

pub mod bsp;
mod error;
pub mod ode;
mod plane;
pub mod scenarios;
pub mod spring;

pub use error::{SimError, SimResult};
pub use plane::{Plane3D, PlaneSide, PLANE_EPSILON};

//! Physical scenarios driven by [`Simulation`](crate::ode::Simulation).
//!
//! Each scenario is a parameter struct implementing [`Model`](crate::ode::Model)
//! together with accessors on `Simulation<Scenario>` that read the state
//! vector back as physical quantities. The parameter structs double as
//! configuration and load from JSON with missing fields defaulted.

mod double_pendulum;
mod kepler;
mod pendulum;
mod rough_plane;

pub use double_pendulum::DoublePendulum;
pub use kepler::{KeplerOrbit, KeplerPolar};
pub use pendulum::{Damping, SimplePendulum, ViscousPendulumSolution};
pub use rough_plane::{
    friction_acceleration, plane_to_world, RoughPlaneFlatBoard, RoughPlaneParticle, RoughPlaneRod,
    VELOCITY_EPSILON,
};

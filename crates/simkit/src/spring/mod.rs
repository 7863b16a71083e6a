//! Mass-spring systems.
//!
//! [`SpringNetwork`] is the general form: point masses joined by linear
//! springs and pushed by a pluggable [`ExternalForce`]. [`MassSpringSurface`]
//! and [`MassSpringCurve`] lay the network out as a grid or a chain, and
//! [`Cloth`] combines a pinned grid with wind and gravity.
//!
//! ```
//! use nalgebra::{Point3, Vector3};
//! use simkit::spring::{MassSpringCurve, UniformAcceleration};
//!
//! let end = Point3::new(1.0, 0.0, 0.0);
//! let mut rope = MassSpringCurve::from_segment(4, Point3::origin(), end, 100.0, 0.01)?;
//! rope.pin(0)?;
//! rope.update(0.0, &UniformAcceleration(Vector3::new(0.0, -9.81, 0.0)))?;
//! assert_eq!(rope.position(0), Point3::origin());
//! assert!(rope.position(3).y < 0.0);
//! # Ok::<(), simkit::SimError>(())
//! ```

mod cloth;
mod curve;
mod network;
mod surface;

pub use cloth::{Cloth, ClothConfig, ClothForce};
pub use curve::MassSpringCurve;
pub use network::{ExternalForce, Integrator, Particles, Spring, SpringNetwork, UniformAcceleration};
pub use surface::MassSpringSurface;

//! Binary Space Partitioning for draw ordering.
//!
//! The partition is a hand-authored binary tree of separating planes. Each
//! node can carry geometry that lies on its plane, and each side of a node is
//! either split further or holds a convex *cell* of geometry. Given a
//! viewpoint, the tree yields its geometry:
//!
//! - back-to-front, for compositing transparent objects with the painter's
//!   algorithm
//! - front-to-back, for opaque objects drawn against a depth buffer
//!
//! Both orders are produced by the same recursion and are exact mirrors of
//! each other.
//!
//! # Example
//!
//! ```
//! use nalgebra::{Point2, Point3};
//! use simkit::bsp::{BspNode, BspTree, CollectingVisitor};
//!
//! let wall = BspNode::from_edge(Point2::new(0.0, -1.0), Point2::new(0.0, 1.0))?
//!     .with_positive(vec!["torus"])
//!     .with_negative(vec!["sphere"]);
//! let tree = BspTree::new(wall);
//!
//! let mut visitor = CollectingVisitor::new();
//! tree.traverse_back_to_front(Point3::new(3.0, 0.0, 0.0), &mut visitor);
//! assert_eq!(visitor.into_items(), vec!["sphere", "torus"]);
//! # Ok::<(), simkit::SimError>(())
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: The container holding the root node
//! - [`BspNode`]: A separating plane, coplanar geometry and two children
//! - [`BspChild`]: Either a nested node or a cell of geometry
//! - [`BspVisitor`]: Visitor trait for custom traversal behavior

mod node;
mod tree;
mod visitor;

pub use node::{BspChild, BspNode};
pub use tree::{BspTree, DrawOrder};
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor};

//! BSP tree node implementation.

use nalgebra::{Point2, Vector3};

use crate::{Plane3D, SimResult};

/// What hangs off one side of a [`BspNode`].
///
/// A side is either split further by another node, or it is a convex cell
/// holding the geometry that lives in that region.
#[derive(Debug, Clone, PartialEq)]
pub enum BspChild<G> {
    /// A further split of this half-space.
    Node(Box<BspNode<G>>),
    /// Geometry occupying the half-space, drawn as one group.
    Cell(Vec<G>),
}

impl<G> BspChild<G> {
    /// Wraps a node as a child.
    pub fn node(node: BspNode<G>) -> Self {
        Self::Node(Box::new(node))
    }

    /// Creates a cell child from a set of geometry items.
    pub fn cell(items: impl IntoIterator<Item = G>) -> Self {
        Self::Cell(items.into_iter().collect())
    }

    /// Returns the nested node, if this child is one.
    pub fn as_node(&self) -> Option<&BspNode<G>> {
        match self {
            Self::Node(node) => Some(node),
            Self::Cell(_) => None,
        }
    }

    /// Returns the items of this child if it is a cell.
    pub fn as_cell(&self) -> Option<&[G]> {
        match self {
            Self::Node(_) => None,
            Self::Cell(items) => Some(items),
        }
    }

    /// Number of geometry items in this subtree.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Node(node) => node.item_count(),
            Self::Cell(items) => items.len(),
        }
    }

    /// Node depth of this subtree (cells add no depth).
    pub fn depth(&self) -> usize {
        match self {
            Self::Node(node) => node.depth(),
            Self::Cell(_) => 0,
        }
    }
}

impl<G> From<BspNode<G>> for BspChild<G> {
    fn from(node: BspNode<G>) -> Self {
        Self::node(node)
    }
}

impl<G> From<Vec<G>> for BspChild<G> {
    fn from(items: Vec<G>) -> Self {
        Self::Cell(items)
    }
}

/// A node in the BSP tree.
///
/// Each node partitions space with a separating plane. Geometry lying on the
/// plane is attached to the node itself; everything else lives in the
/// positive or negative child. The parent owns both children and its
/// coplanar list outright.
#[derive(Debug, Clone, PartialEq)]
pub struct BspNode<G> {
    /// The separating plane for this node.
    plane: Plane3D,

    /// Geometry lying on the plane.
    coplanar: Vec<G>,

    /// Subtree on the side the plane normal points to.
    positive: Option<BspChild<G>>,

    /// Subtree on the side opposite to the plane normal.
    negative: Option<BspChild<G>>,
}

impl<G> BspNode<G> {
    /// Creates a new BSP node with the given separating plane.
    ///
    /// The node starts with no coplanar geometry and no children.
    pub fn new(plane: Plane3D) -> Self {
        Self {
            plane,
            coplanar: Vec::new(),
            positive: None,
            negative: None,
        }
    }

    /// Creates a node from a raw normal and offset.
    ///
    /// Fails with [`crate::SimError::DegenerateNormal`] for a zero normal.
    pub fn try_new(normal: Vector3<f32>, offset: f32) -> SimResult<Self> {
        Ok(Self::new(Plane3D::try_new(normal, offset)?))
    }

    /// Creates a node whose plane is the vertical plane through a 2D edge.
    ///
    /// See [`Plane3D::from_edge`] for the orientation convention.
    pub fn from_edge(v0: Point2<f32>, v1: Point2<f32>) -> SimResult<Self> {
        Ok(Self::new(Plane3D::from_edge(v0, v1)?))
    }

    /// Returns a reference to the separating plane.
    #[inline]
    pub fn plane(&self) -> &Plane3D {
        &self.plane
    }

    /// Returns the geometry attached on the plane.
    #[inline]
    pub fn coplanar(&self) -> &[G] {
        &self.coplanar
    }

    /// Returns the positive child, if any.
    #[inline]
    pub fn positive(&self) -> Option<&BspChild<G>> {
        self.positive.as_ref()
    }

    /// Returns the negative child, if any.
    #[inline]
    pub fn negative(&self) -> Option<&BspChild<G>> {
        self.negative.as_ref()
    }

    /// Returns a mutable reference to the positive child.
    #[inline]
    pub fn positive_mut(&mut self) -> Option<&mut BspChild<G>> {
        self.positive.as_mut()
    }

    /// Returns a mutable reference to the negative child.
    #[inline]
    pub fn negative_mut(&mut self) -> Option<&mut BspChild<G>> {
        self.negative.as_mut()
    }

    /// Attaches a child on the positive side, returning the one it replaced.
    pub fn attach_positive(&mut self, child: impl Into<BspChild<G>>) -> Option<BspChild<G>> {
        self.positive.replace(child.into())
    }

    /// Attaches a child on the negative side, returning the one it replaced.
    pub fn attach_negative(&mut self, child: impl Into<BspChild<G>>) -> Option<BspChild<G>> {
        self.negative.replace(child.into())
    }

    /// Adds geometry lying exactly on the separating plane.
    #[inline]
    pub fn attach_coplanar(&mut self, item: G) {
        self.coplanar.push(item);
    }

    /// Builder form of [`BspNode::attach_positive`].
    pub fn with_positive(mut self, child: impl Into<BspChild<G>>) -> Self {
        self.attach_positive(child);
        self
    }

    /// Builder form of [`BspNode::attach_negative`].
    pub fn with_negative(mut self, child: impl Into<BspChild<G>>) -> Self {
        self.attach_negative(child);
        self
    }

    /// Builder form of [`BspNode::attach_coplanar`].
    pub fn with_coplanar(mut self, item: G) -> Self {
        self.attach_coplanar(item);
        self
    }

    /// Detaches and returns the positive child.
    #[inline]
    pub fn take_positive(&mut self) -> Option<BspChild<G>> {
        self.positive.take()
    }

    /// Detaches and returns the negative child.
    #[inline]
    pub fn take_negative(&mut self) -> Option<BspChild<G>> {
        self.negative.take()
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.positive.is_none() && self.negative.is_none()
    }

    /// Returns the total number of geometry items in this subtree.
    pub fn item_count(&self) -> usize {
        self.coplanar.len()
            + self.positive.as_ref().map_or(0, BspChild::item_count)
            + self.negative.as_ref().map_or(0, BspChild::item_count)
    }

    /// Returns the node depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let positive = self.positive.as_ref().map_or(0, BspChild::depth);
        let negative = self.negative.as_ref().map_or(0, BspChild::depth);
        1 + positive.max(negative)
    }
}

//! BSP tree container and ordered traversal.

use nalgebra::Point3;
use tracing::debug;

use crate::PlaneSide;

use super::node::{BspChild, BspNode};
use super::visitor::{BspVisitor, CollectingVisitor};

/// Order in which a traversal hands geometry to the visitor.
///
/// Back-to-front suits painter's-algorithm compositing of transparent
/// geometry; front-to-back suits opaque geometry with a depth buffer. The
/// two are exact mirrors of each other at every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawOrder {
    /// Farthest groups first.
    #[default]
    BackToFront,
    /// Nearest groups first.
    FrontToBack,
}

/// A Binary Space Partitioning tree over caller-supplied geometry.
///
/// The partition is authored by hand: build the nodes with
/// [`BspNode::attach_positive`], [`BspNode::attach_negative`] and
/// [`BspNode::attach_coplanar`], then wrap the root.
///
/// ```
/// use nalgebra::{Point3, Vector3};
/// use simkit::bsp::{BspNode, BspTree, DrawOrder};
/// use simkit::Plane3D;
///
/// let root = BspNode::new(Plane3D::new(Vector3::z(), 0.0))
///     .with_negative(vec!["floor"])
///     .with_coplanar("glass")
///     .with_positive(vec!["lamp"]);
/// let tree = BspTree::new(root);
///
/// let order = tree.visible_order(Point3::new(0.0, 0.0, 5.0), DrawOrder::BackToFront);
/// assert_eq!(order, vec!["floor", "glass", "lamp"]);
/// ```
///
/// # Eye on a separating plane
///
/// A viewpoint within [`crate::PLANE_EPSILON`] of a node's plane is treated
/// as lying on the positive side of that node.
#[derive(Debug, Clone, PartialEq)]
pub struct BspTree<G> {
    root: Option<BspNode<G>>,
}

impl<G> Default for BspTree<G> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<G> From<BspNode<G>> for BspTree<G> {
    fn from(root: BspNode<G>) -> Self {
        Self::new(root)
    }
}

impl<G> BspTree<G> {
    /// Creates a tree from a fully built root node.
    pub fn new(root: BspNode<G>) -> Self {
        debug!(
            depth = root.depth(),
            items = root.item_count(),
            "bsp tree built"
        );
        Self { root: Some(root) }
    }

    /// Creates an empty BSP tree.
    pub fn empty() -> Self {
        Self { root: None }
    }

    /// Returns `true` if the tree has no root node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a reference to the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<&BspNode<G>> {
        self.root.as_ref()
    }

    /// Returns a mutable reference to the root node, if any.
    #[inline]
    pub fn root_mut(&mut self) -> Option<&mut BspNode<G>> {
        self.root.as_mut()
    }

    /// Returns the total number of geometry items in the tree.
    pub fn item_count(&self) -> usize {
        self.root.as_ref().map_or(0, BspNode::item_count)
    }

    /// Returns the maximum node depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BspNode::depth)
    }

    /// Traverses the tree relative to `eye`, handing each non-empty group of
    /// geometry to `visitor` in the requested order.
    ///
    /// Missing children are skipped.
    pub fn traverse<V: BspVisitor<G>>(&self, eye: Point3<f32>, order: DrawOrder, visitor: &mut V) {
        if let Some(ref root) = self.root {
            traverse_node(root, eye, order, visitor);
        }
    }

    /// Traverses the tree back-to-front relative to the given viewpoint.
    pub fn traverse_back_to_front<V: BspVisitor<G>>(&self, eye: Point3<f32>, visitor: &mut V) {
        self.traverse(eye, DrawOrder::BackToFront, visitor);
    }

    /// Traverses the tree front-to-back relative to the given viewpoint.
    pub fn traverse_front_to_back<V: BspVisitor<G>>(&self, eye: Point3<f32>, visitor: &mut V) {
        self.traverse(eye, DrawOrder::FrontToBack, visitor);
    }

    /// Returns the geometry of the cell containing `point`.
    ///
    /// Descends by the side of each plane the point is on (on-plane counts
    /// as positive). Returns an empty slice if the point falls on a side
    /// with no child, or on a side whose child is an empty node.
    pub fn cell_at(&self, point: Point3<f32>) -> &[G] {
        let mut node = match self.root {
            Some(ref root) => root,
            None => return &[],
        };
        loop {
            let child = match node.plane().classify_point(point) {
                PlaneSide::Positive | PlaneSide::OnPlane => node.positive(),
                PlaneSide::Negative => node.negative(),
            };
            match child {
                Some(BspChild::Node(next)) => node = next,
                Some(BspChild::Cell(items)) => return items,
                None => return &[],
            }
        }
    }
}

impl<G> BspNode<G> {
    /// Traverses the subtree rooted at this node, as [`BspTree::traverse`]
    /// does for a whole tree.
    pub fn traverse<V: BspVisitor<G>>(&self, eye: Point3<f32>, order: DrawOrder, visitor: &mut V) {
        traverse_node(self, eye, order, visitor);
    }
}

impl<G: Clone> BspTree<G> {
    /// Returns all geometry in draw order relative to `eye`.
    pub fn visible_order(&self, eye: Point3<f32>, order: DrawOrder) -> Vec<G> {
        let mut visitor = CollectingVisitor::new();
        self.traverse(eye, order, &mut visitor);
        visitor.into_items()
    }
}

/// Traverses a node subtree in the requested order.
fn traverse_node<G, V: BspVisitor<G>>(
    node: &BspNode<G>,
    eye: Point3<f32>,
    order: DrawOrder,
    visitor: &mut V,
) {
    let eye_positive = match node.plane().classify_point(eye) {
        PlaneSide::Positive | PlaneSide::OnPlane => true,
        PlaneSide::Negative => false,
    };

    // The side containing the eye is the near side.
    let (near, far) = if eye_positive {
        (node.positive(), node.negative())
    } else {
        (node.negative(), node.positive())
    };
    let (first, last) = match order {
        DrawOrder::BackToFront => (far, near),
        DrawOrder::FrontToBack => (near, far),
    };

    if let Some(child) = first {
        traverse_child(child, eye, order, visitor);
    }
    if !node.coplanar().is_empty() {
        visitor.visit(node.coplanar());
    }
    if let Some(child) = last {
        traverse_child(child, eye, order, visitor);
    }
}

fn traverse_child<G, V: BspVisitor<G>>(
    child: &BspChild<G>,
    eye: Point3<f32>,
    order: DrawOrder,
    visitor: &mut V,
) {
    match child {
        BspChild::Node(node) => traverse_node(node, eye, order, visitor),
        BspChild::Cell(items) => {
            if !items.is_empty() {
                visitor.visit(items);
            }
        }
    }
}

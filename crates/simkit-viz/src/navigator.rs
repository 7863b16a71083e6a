//! Interactive walk through the nodes of a BSP tree.

use macroquad::prelude::*;
use nalgebra::Point3;
use simkit::bsp::{BspChild, BspNode, BspTree, DrawOrder};

use crate::scene::{RenderVisitor, SceneObject};

/// Which child was taken at each step from the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Positive,
    Negative,
}

/// Walks down the node children of a tree. Cells are leaves and cannot be
/// entered; the current node's whole subtree is what gets drawn.
#[derive(Debug, Default)]
pub struct TreeNavigator {
    path: Vec<Side>,
}

impl TreeNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[Side] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Steps into the child node on `side`. Returns false if that side holds
    /// a cell or nothing.
    pub fn descend<G>(&mut self, tree: &BspTree<G>, side: Side) -> bool {
        let can_descend = self
            .current_node(tree)
            .and_then(|node| child(node, side))
            .and_then(BspChild::as_node)
            .is_some();
        if can_descend {
            self.path.push(side);
        }
        can_descend
    }

    pub fn ascend(&mut self) -> bool {
        self.path.pop().is_some()
    }

    pub fn reset(&mut self) {
        self.path.clear();
    }

    /// `+` and `-` descend, `P` goes to the parent, `R` to the root.
    /// Returns true if the position changed.
    pub fn update<G>(&mut self, tree: &BspTree<G>) -> bool {
        let mut changed = false;
        if is_key_pressed(KeyCode::Equal) || is_key_pressed(KeyCode::KpAdd) {
            changed |= self.descend(tree, Side::Positive);
        }
        if is_key_pressed(KeyCode::Minus) || is_key_pressed(KeyCode::KpSubtract) {
            changed |= self.descend(tree, Side::Negative);
        }
        if is_key_pressed(KeyCode::P) {
            changed |= self.ascend();
        }
        if is_key_pressed(KeyCode::R) && !self.path.is_empty() {
            self.reset();
            changed = true;
        }
        changed
    }

    pub fn current_node<'a, G>(&self, tree: &'a BspTree<G>) -> Option<&'a BspNode<G>> {
        let mut node = tree.root()?;
        for &side in &self.path {
            node = child(node, side)?.as_node()?;
        }
        Some(node)
    }

    /// Draws the current subtree in the given order and returns the object
    /// names in the order they were drawn.
    pub fn render(
        &self,
        tree: &BspTree<SceneObject>,
        eye: Point3<f32>,
        order: DrawOrder,
    ) -> Vec<&'static str> {
        let mut visitor = RenderVisitor::default();
        if let Some(node) = self.current_node(tree) {
            node.traverse(eye, order, &mut visitor);
        }
        visitor.drawn
    }

    pub fn draw_ui<G>(&self, tree: &BspTree<G>, y_offset: f32) {
        let Some(node) = self.current_node(tree) else {
            draw_text("Empty tree", 10.0, y_offset, 18.0, WHITE);
            return;
        };

        let path = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|side| match side {
                    Side::Positive => "+",
                    Side::Negative => "-",
                })
                .collect::<Vec<_>>()
                .join(" ")
        };
        let describe = |side| match child(node, side) {
            Some(BspChild::Node(_)) => "node",
            Some(BspChild::Cell(_)) => "cell",
            None => "none",
        };

        draw_text(&format!("Subtree: {} items", node.item_count()), 10.0, y_offset, 18.0, WHITE);
        draw_text(
            &format!("Path: {} (depth {})", path, self.path.len()),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        draw_text(
            &format!("[+] {} | [-] {}", describe(Side::Positive), describe(Side::Negative)),
            10.0,
            y_offset + 40.0,
            18.0,
            GREEN,
        );
        draw_text("[P]arent | [R]oot", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}

fn child<G>(node: &BspNode<G>, side: Side) -> Option<&BspChild<G>> {
    match side {
        Side::Positive => node.positive(),
        Side::Negative => node.negative(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::room;

    #[test]
    fn descends_into_nodes_but_not_cells() {
        let tree = room().unwrap();
        let mut nav = TreeNavigator::new();

        assert!(nav.descend(&tree, Side::Negative));
        assert_eq!(nav.current_node(&tree).map(BspNode::item_count), Some(3));
        assert!(!nav.descend(&tree, Side::Positive));
        assert_eq!(nav.path(), &[Side::Negative]);

        assert!(nav.ascend());
        assert!(!nav.ascend());
        assert_eq!(nav.depth(), 0);
    }
}

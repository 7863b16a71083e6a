//! Visitor pattern for BSP tree traversal.
//!
//! Visitors receive geometry in draw order without coupling traversal logic
//! to a particular renderer.

/// Visitor for processing geometry during BSP tree traversal.
///
/// Implement this trait to define custom behavior when traversing the tree.
/// Common uses include:
/// - Rendering (painter's algorithm)
/// - Collecting geometry in sorted order
pub trait BspVisitor<G> {
    /// Called once per non-empty group, in traversal order.
    ///
    /// A group is either the coplanar geometry of one node or the contents
    /// of one cell.
    fn visit(&mut self, items: &[G]);
}

/// A simple visitor that collects all visited items.
#[derive(Debug)]
pub struct CollectingVisitor<G> {
    collected: Vec<G>,
}

impl<G> Default for CollectingVisitor<G> {
    fn default() -> Self {
        Self {
            collected: Vec::new(),
        }
    }
}

impl<G> CollectingVisitor<G> {
    /// Creates a new empty collecting visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected items.
    pub fn into_items(self) -> Vec<G> {
        self.collected
    }

    /// Returns a reference to the collected items.
    pub fn items(&self) -> &[G] {
        &self.collected
    }
}

impl<G: Clone> BspVisitor<G> for CollectingVisitor<G> {
    fn visit(&mut self, items: &[G]) {
        self.collected.extend(items.iter().cloned());
    }
}

/// A visitor that calls a closure for each group.
pub struct FnVisitor<F> {
    func: F,
}

impl<F> FnVisitor<F> {
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<G, F> BspVisitor<G> for FnVisitor<F>
where
    F: FnMut(&[G]),
{
    fn visit(&mut self, items: &[G]) {
        (self.func)(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_visitor_empty() {
        let visitor: CollectingVisitor<u8> = CollectingVisitor::new();
        assert!(visitor.items().is_empty());
    }

    #[test]
    fn collecting_visitor_keeps_group_order() {
        let mut visitor: CollectingVisitor<&str> = CollectingVisitor::new();

        visitor.visit(&["wall"]);
        visitor.visit(&["torus", "sphere"]);

        assert_eq!(visitor.into_items(), vec!["wall", "torus", "sphere"]);
    }

    #[test]
    fn fn_visitor_calls_closure() {
        let mut groups = 0;
        let mut items = 0;
        {
            let mut visitor = FnVisitor::new(|group: &[u32]| {
                groups += 1;
                items += group.len();
            });
            let first: &[u32] = &[1, 2];
            let second: &[u32] = &[3];
            visitor.visit(first);
            visitor.visit(second);
        }
        assert_eq!((groups, items), (2, 3));
    }
}

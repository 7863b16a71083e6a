//! Objects placed in the cells of a hand-built BSP room.

use macroquad::prelude::*;
use nalgebra::{Point2, Point3, Vector3};
use simkit::bsp::{BspNode, BspTree, BspVisitor};
use simkit::SimResult;

use crate::to_render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Cube,
    Sphere,
    Torus,
    Tetrahedron,
    /// Vertical wall along a 2D edge, from the floor to `WALL_HEIGHT`.
    Wall { from: [i8; 2], to: [i8; 2] },
}

const WALL_HEIGHT: f32 = 1.5;

/// A drawable object in kernel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: &'static str,
    pub shape: Shape,
    pub center: Point3<f32>,
    pub size: f32,
    pub color: Color,
}

impl SceneObject {
    pub fn new(
        name: &'static str,
        shape: Shape,
        center: Point3<f32>,
        size: f32,
        color: Color,
    ) -> Self {
        Self {
            name,
            shape,
            center,
            size,
            color,
        }
    }

    pub fn draw(&self) {
        let c = to_render(self.center);
        match self.shape {
            Shape::Cube => {
                draw_cube(c, Vec3::splat(self.size), None, self.color);
                draw_cube_wires(c, Vec3::splat(self.size), DARKGRAY);
            }
            Shape::Sphere => draw_sphere(c, self.size * 0.5, None, self.color),
            Shape::Torus => {
                let (ring, tube) = (self.size * 0.4, self.size * 0.12);
                for k in 0..24 {
                    let a = k as f32 / 24.0 * std::f32::consts::TAU;
                    let p = self.center + Vector3::new(ring * a.cos(), ring * a.sin(), 0.0);
                    draw_sphere(to_render(p), tube, None, self.color);
                }
            }
            Shape::Tetrahedron => {
                let h = self.size * 0.5;
                let corners = [
                    Point3::new(h, h, h),
                    Point3::new(h, -h, -h),
                    Point3::new(-h, h, -h),
                    Point3::new(-h, -h, h),
                ]
                .map(|p| to_render(self.center + p.coords));
                for i in 0..4 {
                    for j in i + 1..4 {
                        draw_line_3d(corners[i], corners[j], self.color);
                    }
                }
            }
            Shape::Wall { from, to } => {
                let (a, b) = (corner(from), corner(to));
                let top = |p: Point3<f32>| Point3::new(p.x, p.y, WALL_HEIGHT);
                for (p, q) in [(a, b), (top(a), top(b)), (a, top(a)), (b, top(b))] {
                    draw_line_3d(to_render(p), to_render(q), self.color);
                }
            }
        }
    }
}

fn corner(v: [i8; 2]) -> Point3<f32> {
    Point3::new(f32::from(v[0]), f32::from(v[1]), 0.0)
}

fn wall(name: &'static str, from: [i8; 2], to: [i8; 2], color: Color) -> SceneObject {
    let center = Point3::from((corner(from).coords + corner(to).coords) * 0.5);
    SceneObject::new(name, Shape::Wall { from, to }, center, 0.0, color)
}

fn edge_node(from: [i8; 2], to: [i8; 2]) -> SimResult<BspNode<SceneObject>> {
    let p = |v: [i8; 2]| Point2::new(f32::from(v[0]), f32::from(v[1]));
    BspNode::from_edge(p(from), p(to))
}

/// Two crossing walls split the floor into four cells, each holding one
/// object. The walls are coplanar geometry of their nodes; the x wall cuts
/// the y wall in two, one half per side.
pub fn room() -> SimResult<BspTree<SceneObject>> {
    let translucent = |c: Color| Color::new(c.r, c.g, c.b, 0.6);
    let x_wall = wall("x-wall", [-2, 0], [2, 0], LIGHTGRAY);

    let lower = edge_node([0, -2], [0, 2])?
        .with_coplanar(wall("south y-wall", [0, -2], [0, 0], GRAY))
        .with_positive(vec![SceneObject::new(
            "cube",
            Shape::Cube,
            Point3::new(1.0, -1.0, 0.5),
            0.8,
            translucent(ORANGE),
        )])
        .with_negative(vec![SceneObject::new(
            "torus",
            Shape::Torus,
            Point3::new(-1.0, -1.0, 0.5),
            1.0,
            translucent(PURPLE),
        )]);
    let upper = edge_node([0, -2], [0, 2])?
        .with_coplanar(wall("north y-wall", [0, 0], [0, 2], GRAY))
        .with_positive(vec![SceneObject::new(
            "sphere",
            Shape::Sphere,
            Point3::new(1.0, 1.0, 0.5),
            0.8,
            translucent(SKYBLUE),
        )])
        .with_negative(vec![SceneObject::new(
            "tetrahedron",
            Shape::Tetrahedron,
            Point3::new(-1.0, 1.0, 0.5),
            0.8,
            YELLOW,
        )]);

    // Edge (-2, 0) -> (2, 0) has its positive side toward -y.
    let root = edge_node([-2, 0], [2, 0])?
        .with_coplanar(x_wall)
        .with_positive(lower)
        .with_negative(upper);
    Ok(BspTree::new(root))
}

/// Draws every object it is handed and remembers the order.
#[derive(Debug, Default)]
pub struct RenderVisitor {
    pub drawn: Vec<&'static str>,
}

impl BspVisitor<SceneObject> for RenderVisitor {
    fn visit(&mut self, items: &[SceneObject]) {
        for object in items {
            object.draw();
            self.drawn.push(object.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simkit::bsp::{BspChild, DrawOrder};

    #[test]
    fn room_orders_cells_around_the_eye() {
        let tree = room().unwrap();
        assert_eq!(tree.item_count(), 7);

        let names: Vec<_> = tree
            .visible_order(Point3::new(3.0, -3.0, 1.0), DrawOrder::BackToFront)
            .iter()
            .map(|o| o.name)
            .collect();
        let expected = [
            "tetrahedron",
            "north y-wall",
            "sphere",
            "x-wall",
            "torus",
            "south y-wall",
            "cube",
        ];
        assert_eq!(names, expected);
    }

    #[test]
    fn split_wall_halves_stay_on_their_side() {
        let tree = room().unwrap();
        let root = tree.root().unwrap();
        let x_plane = root.plane();

        for (child, sign) in [(root.positive(), 1.0), (root.negative(), -1.0)] {
            let node = child.and_then(BspChild::as_node).unwrap();
            let [half] = node.coplanar() else {
                panic!("expected one wall half per node");
            };
            let Shape::Wall { from, to } = half.shape else {
                panic!("expected a wall");
            };
            // One end touches the x wall, the other lies in the child's half-space.
            let ends = [corner(from), corner(to)].map(|p| sign * x_plane.signed_distance(p));
            assert!(ends.iter().all(|&d| d >= 0.0), "{} crosses the x wall", half.name);
            assert!(ends.iter().any(|&d| d > 0.0));
        }
    }

    #[test]
    fn cells_hold_their_objects() {
        let tree = room().unwrap();
        let cell = tree.cell_at(Point3::new(-1.0, 1.0, 0.0));
        assert_eq!(cell.len(), 1);
        assert_eq!(cell[0].name, "tetrahedron");
    }
}

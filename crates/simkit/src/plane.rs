//! Separating planes for the BSP partition.

use nalgebra::{Point2, Point3, Vector3};

use crate::{SimError, SimResult};

/// Half-thickness of a plane: closer points classify as [`PlaneSide::OnPlane`].
pub const PLANE_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Signed distance above the tolerance; the normal points this way.
    Positive,
    Negative,
    OnPlane,
}

/// Oriented plane `normal · p = offset` with a unit normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f32>,
    offset: f32,
}

impl Plane3D {
    /// Normalizes `normal` and scales `offset` by the same factor.
    ///
    /// # Panics
    /// On a zero normal. [`Plane3D::try_new`] reports it instead.
    pub fn new(normal: Vector3<f32>, offset: f32) -> Self {
        match Self::try_new(normal, offset) {
            Ok(plane) => plane,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible form of [`Plane3D::new`]. A non-finite offset is reported as
    /// an invalid `offset` parameter.
    pub fn try_new(normal: Vector3<f32>, offset: f32) -> SimResult<Self> {
        let norm = normal.norm();
        if !(norm > f32::EPSILON) {
            return Err(SimError::DegenerateNormal);
        }
        if !offset.is_finite() {
            return Err(SimError::InvalidParameter {
                name: "offset",
                value: f64::from(offset),
            });
        }
        Ok(Self {
            normal: normal / norm,
            offset: offset / norm,
        })
    }

    /// Plane through `point` facing along `normal`.
    ///
    /// # Panics
    /// On a zero normal.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self::new(normal, normal.dot(&point.coords))
    }

    /// Plane through three points, facing along `(b - a) x (c - a)`.
    ///
    /// # Panics
    /// If the points are collinear.
    pub fn from_three_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let normal = (b - a).cross(&(c - a));
        Self::from_point_and_normal(a, normal)
    }

    /// Creates the vertical plane through a 2D edge drawn in the xy plane.
    ///
    /// With `d = v1 - v0` the normal is `(d.y, -d.x, 0)`, so the positive
    /// side is on the right when walking from `v0` to `v1`. This is how
    /// floor-plan style partitions are authored.
    pub fn from_edge(v0: Point2<f32>, v1: Point2<f32>) -> SimResult<Self> {
        let d = v1 - v0;
        let normal = Vector3::new(d.y, -d.x, 0.0);
        let norm = normal.norm();
        if !(norm > f32::EPSILON) {
            return Err(SimError::DegenerateNormal);
        }
        let unit_normal = normal / norm;
        Ok(Self {
            normal: unit_normal,
            offset: unit_normal.x * v0.x + unit_normal.y * v0.y,
        })
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Distance of the plane from the origin along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Positive on the side the normal points to.
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Side of `point` with the [`PLANE_EPSILON`] tolerance.
    #[inline]
    pub fn classify_point(&self, point: Point3<f32>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    pub fn classify_point_with_epsilon(&self, point: Point3<f32>, epsilon: f32) -> PlaneSide {
        match self.signed_distance(point) {
            d if d > epsilon => PlaneSide::Positive,
            d if d < -epsilon => PlaneSide::Negative,
            _ => PlaneSide::OnPlane,
        }
    }

    /// Same plane, opposite orientation.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Closest point of the plane to `point`.
    #[inline]
    pub fn project_point(&self, point: Point3<f32>) -> Point3<f32> {
        point - self.normal * self.signed_distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_normalizes_normal_and_offset() {
        let plane = Plane3D::new(Vector3::new(0.0, 2.0, 0.0), 4.0);
        assert_relative_eq!(plane.normal(), Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(plane.offset(), 2.0);
        assert_relative_eq!(plane.signed_distance(Point3::new(5.0, 3.0, -1.0)), 1.0);
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert_eq!(
            Plane3D::try_new(Vector3::zeros(), 1.0),
            Err(SimError::DegenerateNormal)
        );
    }

    #[test]
    fn infinite_offset_is_an_invalid_parameter() {
        assert_eq!(
            Plane3D::try_new(Vector3::z(), f32::INFINITY),
            Err(SimError::InvalidParameter {
                name: "offset",
                value: f64::INFINITY
            })
        );
        assert!(matches!(
            Plane3D::try_new(Vector3::z(), f32::NAN),
            Err(SimError::InvalidParameter { name: "offset", .. })
        ));
    }

    #[test]
    #[should_panic(expected = "plane normal cannot be zero")]
    fn zero_normal_panics_in_new() {
        let _ = Plane3D::new(Vector3::zeros(), 0.0);
    }

    #[test]
    fn classify_with_tolerance() {
        let plane = Plane3D::new(Vector3::z(), 0.0);
        assert_eq!(plane.classify_point(Point3::new(0.0, 0.0, 1.0)), PlaneSide::Positive);
        assert_eq!(plane.classify_point(Point3::new(0.0, 0.0, -1.0)), PlaneSide::Negative);
        assert_eq!(plane.classify_point(Point3::new(3.0, 4.0, 1e-7)), PlaneSide::OnPlane);
        assert_eq!(
            plane.classify_point_with_epsilon(Point3::new(0.0, 0.0, 0.05), 0.1),
            PlaneSide::OnPlane
        );
    }

    #[test]
    fn edge_plane_positive_side_is_right_of_edge() {
        // Walking +x, the right-hand side is -y.
        let plane = Plane3D::from_edge(Point2::new(0.0, 1.0), Point2::new(2.0, 1.0)).unwrap();
        assert_relative_eq!(plane.normal(), Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(plane.classify_point(Point3::new(1.0, 0.0, 5.0)), PlaneSide::Positive);
        assert_eq!(plane.classify_point(Point3::new(1.0, 2.0, -5.0)), PlaneSide::Negative);
        assert_eq!(plane.classify_point(Point3::new(7.0, 1.0, 3.0)), PlaneSide::OnPlane);
    }

    #[test]
    fn edge_plane_rejects_repeated_point() {
        let p = Point2::new(1.0, 1.0);
        assert_eq!(Plane3D::from_edge(p, p), Err(SimError::DegenerateNormal));
    }

    #[test]
    fn flipped_and_projected() {
        let plane = Plane3D::from_three_points(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let p = Point3::new(2.0, 3.0, 4.0);
        assert_relative_eq!(plane.signed_distance(p), 4.0);
        assert_relative_eq!(plane.flipped().signed_distance(p), -4.0);
        assert_relative_eq!(plane.project_point(p), Point3::new(2.0, 3.0, 0.0));
    }
}

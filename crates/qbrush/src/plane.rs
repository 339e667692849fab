//! Half-space planes and the line/plane intersections built on them.

use nalgebra::{Point3, Vector3};

use crate::error::ParseError;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is outside the half-space (positive side of the normal)
    Outside,
    /// Point is inside the half-space (negative side of the normal)
    Inside,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// A bounding plane of a brush, stored as a point on the plane and an
/// outward unit normal.
///
/// The half-space it represents is every `p` with `(p - point)·normal <= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    point: Point3<f64>,
    normal: Vector3<f64>,
}

impl Plane {
    /// Creates a plane from a point on it and a normal vector.
    /// The normal is normalized; returns `None` if its length is below `epsilon`.
    pub fn from_point_and_normal(
        point: Point3<f64>,
        normal: Vector3<f64>,
        epsilon: f64,
    ) -> Option<Self> {
        let norm = normal.norm();
        if !norm.is_finite() || norm <= epsilon {
            return None;
        }
        Some(Self {
            point,
            normal: normal / norm,
        })
    }

    /// Creates a plane from the three points of a MAP face record.
    ///
    /// The normal is `(v1 - v2) × (v3 - v2)` and the stored point is `v1`, which
    /// makes the normal point out of the brush for records written by the usual
    /// editors.
    pub fn from_three_points(
        v1: Point3<f64>,
        v2: Point3<f64>,
        v3: Point3<f64>,
        epsilon: f64,
    ) -> Result<Self, ParseError> {
        let normal = (v1 - v2).cross(&(v3 - v2));
        Self::from_point_and_normal(v1, normal, epsilon).ok_or(ParseError::DegeneratePlane {
            magnitude: normal.norm(),
        })
    }

    /// Returns the reference point of the plane.
    #[inline]
    pub fn point(&self) -> Point3<f64> {
        self.point
    }

    /// Returns the outward unit normal.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns `normal · point`, the signed distance of the plane from the origin.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.normal.dot(&self.point.coords)
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is outside the half-space
    /// - Negative: point is inside
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.point).dot(&self.normal)
    }

    /// Returns `true` if the point is inside the half-space or within `epsilon`
    /// outside of it.
    #[inline]
    pub fn contains(&self, point: &Point3<f64>, epsilon: f64) -> bool {
        self.signed_distance(point) <= epsilon
    }

    /// Classifies which side of the plane a point lies on.
    pub fn classify_point(&self, point: &Point3<f64>, epsilon: f64) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::Outside
        } else if dist < -epsilon {
            PlaneSide::Inside
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Intersects two planes.
    ///
    /// Returns `None` if the planes are parallel, i.e. `|n1 × n2| < epsilon`.
    pub fn intersect_plane(&self, other: &Plane, epsilon: f64) -> Option<Line> {
        let direction = self.normal.cross(&other.normal);
        let len_sq = direction.norm_squared();
        if len_sq.sqrt() < epsilon {
            return None;
        }

        // The point on both planes closest to the origin:
        // (d1 (n2 × dir) + d2 (dir × n1)) / |dir|²
        let d1 = self.offset();
        let d2 = other.offset();
        let coords = (other.normal.cross(&direction) * d1 + direction.cross(&self.normal) * d2)
            / len_sq;

        Some(Line {
            origin: Point3::from(coords),
            direction: direction / len_sq.sqrt(),
        })
    }
}

/// An infinite line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    origin: Point3<f64>,
    direction: Vector3<f64>,
}

impl Line {
    /// Returns a point on the line.
    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Returns the unit direction of the line.
    #[inline]
    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    /// Computes where the line crosses a plane.
    ///
    /// Returns `None` if the line is parallel to the plane, i.e.
    /// `|direction · normal| < epsilon`.
    pub fn intersect_plane(&self, plane: &Plane, epsilon: f64) -> Option<Point3<f64>> {
        let denom = self.direction.dot(&plane.normal);
        if denom.abs() < epsilon {
            return None;
        }

        let t = (plane.point - self.origin).dot(&plane.normal) / denom;
        Some(self.origin + self.direction * t)
    }
}

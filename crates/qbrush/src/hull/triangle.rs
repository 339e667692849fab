//! Triangles of the hull under construction.

use nalgebra::{Point3, Vector3};

/// A triangle of the hull, referencing points by index.
///
/// The winding order determines the outward normal via the right-hand rule:
/// normal = (b - a) × (c - a)
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HullTriangle {
    vertices: [usize; 3],
    /// Unit normal, zero for degenerate triangles.
    normal: Vector3<f64>,
    offset: f64,
    /// Twice the area.
    area2: f64,
    /// Points strictly in front of this triangle, not yet on the hull.
    pub(crate) outside: Vec<usize>,
}

impl HullTriangle {
    /// Creates a triangle from three point indices.
    pub(crate) fn new(a: usize, b: usize, c: usize, points: &[Point3<f64>]) -> Self {
        let (pa, pb, pc) = (points[a], points[b], points[c]);
        let n = (pb - pa).cross(&(pc - pa));
        let area2 = n.norm();
        let normal = if area2 > f64::EPSILON {
            n / area2
        } else {
            Vector3::zeros()
        };
        Self {
            vertices: [a, b, c],
            normal,
            offset: normal.dot(&pa.coords),
            area2,
            outside: Vec::new(),
        }
    }

    /// Creates a triangle whose normal points away from `interior`.
    pub(crate) fn facing_away(
        a: usize,
        b: usize,
        c: usize,
        interior: &Point3<f64>,
        points: &[Point3<f64>],
    ) -> Self {
        let triangle = Self::new(a, b, c, points);
        if triangle.signed_distance(interior) > 0.0 {
            Self::new(a, c, b, points)
        } else {
            triangle
        }
    }

    /// Returns the three point indices in winding order.
    #[inline]
    pub(crate) fn vertices(&self) -> &[usize; 3] {
        &self.vertices
    }

    /// Returns the unit normal (zero if degenerate).
    #[inline]
    pub(crate) fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns twice the triangle's area.
    #[inline]
    pub(crate) fn area2(&self) -> f64 {
        self.area2
    }

    /// Returns the three directed edges in winding order.
    pub(crate) fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    /// Computes the signed distance from a point to the triangle's plane.
    #[inline]
    pub(crate) fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Returns the outside point farthest from the plane.
    pub(crate) fn farthest_outside(&self, points: &[Point3<f64>]) -> Option<usize> {
        self.outside.iter().copied().max_by(|&a, &b| {
            self.signed_distance(&points[a])
                .total_cmp(&self.signed_distance(&points[b]))
        })
    }
}

//! Triangulated 3D convex hull by quickhull.
//!
//! 1. Find extreme points and build an initial tetrahedron from 4 non-coplanar points
//! 2. Assign remaining points to a triangle they are in front of
//! 3. For each triangle with outside points:
//!    a. Take the farthest point as the new apex
//!    b. Flood the triangles visible from the apex, collecting the horizon
//!    c. Replace the visible region with a fan from the horizon to the apex
//!    d. Reassign the orphaned outside points to the new triangles
//! 4. Repeat until no triangle has outside points
//!
//! Every new triangle reuses a horizon edge in the direction its removed
//! neighbor had it, so the triangle set stays consistently wound throughout.

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::HullError;

use super::triangle::HullTriangle;

/// Computes the hull of `points` as outward-wound triangles.
///
/// Points within `epsilon` of the hull surface are not added as vertices.
pub(crate) fn quickhull(
    points: &[Point3<f64>],
    epsilon: f64,
) -> Result<Vec<HullTriangle>, HullError> {
    let simplex = initial_simplex(points, epsilon)?;
    let interior = Point3::from(
        simplex
            .iter()
            .map(|&i| points[i].coords)
            .sum::<nalgebra::Vector3<f64>>()
            / 4.0,
    );

    let [p0, p1, p2, p3] = simplex;
    let mut faces = vec![
        HullTriangle::facing_away(p0, p1, p2, &interior, points),
        HullTriangle::facing_away(p0, p2, p3, &interior, points),
        HullTriangle::facing_away(p0, p3, p1, &interior, points),
        HullTriangle::facing_away(p1, p3, p2, &interior, points),
    ];

    let remaining = (0..points.len()).filter(|i| !simplex.contains(i));
    assign_outside(&mut faces, remaining, points, epsilon);

    while let Some(seed) = faces.iter().position(|f| !f.outside.is_empty()) {
        let Some(apex) = faces[seed].farthest_outside(points) else {
            break;
        };
        let apex_point = points[apex];

        let (visible, horizon) = visible_region(&faces, seed, &apex_point, epsilon);
        trace!(
            apex,
            visible = visible.iter().filter(|v| **v).count(),
            horizon = horizon.len(),
            "adding hull apex"
        );

        let mut orphans = Vec::new();
        let mut kept = Vec::with_capacity(faces.len() + horizon.len());
        for (face, is_visible) in faces.into_iter().zip(&visible) {
            if *is_visible {
                orphans.extend(face.outside.into_iter().filter(|&p| p != apex));
            } else {
                kept.push(face);
            }
        }

        let first_new = kept.len();
        kept.extend(
            horizon
                .into_iter()
                .map(|(a, b)| HullTriangle::new(a, b, apex, points)),
        );
        faces = kept;
        assign_outside(&mut faces[first_new..], orphans, points, epsilon);
    }

    Ok(faces)
}

/// Gives each point to the first triangle it lies in front of. Points behind
/// every triangle are inside the hull and dropped.
fn assign_outside(
    faces: &mut [HullTriangle],
    candidates: impl IntoIterator<Item = usize>,
    points: &[Point3<f64>],
    epsilon: f64,
) {
    for index in candidates {
        if let Some(face) = faces
            .iter_mut()
            .find(|f| f.signed_distance(&points[index]) > epsilon)
        {
            face.outside.push(index);
        }
    }
}

/// Floods outward from `seed` over triangles the apex is in front of.
///
/// Returns a visibility mask and the horizon: edges of visible triangles whose
/// neighbor across the edge is not visible, in the visible triangle's winding.
fn visible_region(
    faces: &[HullTriangle],
    seed: usize,
    apex: &Point3<f64>,
    epsilon: f64,
) -> (Vec<bool>, Vec<(usize, usize)>) {
    let mut owner: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    for (i, face) in faces.iter().enumerate() {
        for edge in face.edges() {
            owner.insert(edge, i);
        }
    }

    let mut visible = vec![false; faces.len()];
    let mut horizon = Vec::new();
    let mut stack = vec![seed];
    visible[seed] = true;

    while let Some(current) = stack.pop() {
        for (a, b) in faces[current].edges() {
            match owner.get(&(b, a)) {
                Some(&neighbor) if faces[neighbor].signed_distance(apex) > epsilon => {
                    if !visible[neighbor] {
                        visible[neighbor] = true;
                        stack.push(neighbor);
                    }
                }
                _ => horizon.push((a, b)),
            }
        }
    }

    (visible, horizon)
}

/// Picks four affinely independent points, or reports that the set is flat.
fn initial_simplex(points: &[Point3<f64>], epsilon: f64) -> Result<[usize; 4], HullError> {
    if points.len() < 4 {
        return Err(HullError::InsufficientPoints(points.len()));
    }

    // Extreme points on each axis
    let mut extremes = [0usize; 6];
    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p[axis] < points[extremes[axis * 2]][axis] {
                extremes[axis * 2] = i;
            }
            if p[axis] > points[extremes[axis * 2 + 1]][axis] {
                extremes[axis * 2 + 1] = i;
            }
        }
    }

    // Two points with maximum distance
    let mut best = (extremes[0], extremes[1], 0.0);
    for (k, &a) in extremes.iter().enumerate() {
        for &b in &extremes[k + 1..] {
            let dist = (points[a] - points[b]).norm();
            if dist > best.2 {
                best = (a, b, dist);
            }
        }
    }
    let (p0, p1, span) = best;
    if span <= epsilon {
        return Err(HullError::Flat);
    }

    // Third point farthest from the line p0-p1
    let dir = (points[p1] - points[p0]) / span;
    let (p2, line_dist) = farthest_by(points, |p| {
        let v = p - points[p0];
        (v - dir * v.dot(&dir)).norm()
    });
    if line_dist <= epsilon {
        return Err(HullError::Flat);
    }

    // Fourth point farthest from the plane p0-p1-p2
    let normal = (points[p1] - points[p0])
        .cross(&(points[p2] - points[p0]))
        .normalize();
    let (p3, plane_dist) = farthest_by(points, |p| normal.dot(&(p - points[p0])).abs());
    if plane_dist <= epsilon {
        return Err(HullError::Flat);
    }

    Ok([p0, p1, p2, p3])
}

fn farthest_by(points: &[Point3<f64>], distance: impl Fn(&Point3<f64>) -> f64) -> (usize, f64) {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, distance(p)))
        .fold((0, f64::NEG_INFINITY), |best, cur| {
            if cur.1 > best.1 { cur } else { best }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn cube_points(size: f64) -> Vec<Point3<f64>> {
        let mut points = Vec::new();
        for &x in &[0.0, size] {
            for &y in &[0.0, size] {
                for &z in &[0.0, size] {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        points
    }

    fn assert_closed(faces: &[HullTriangle]) {
        let mut count: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        for face in faces {
            for edge in face.edges() {
                *count.entry(edge).or_default() += 1;
            }
        }
        for (&(a, b), &n) in &count {
            assert_eq!(n, 1, "edge {a}-{b} used {n} times");
            assert_eq!(count.get(&(b, a)), Some(&1), "edge {a}-{b} has no twin");
        }
    }

    #[test]
    fn tetrahedron() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let faces = quickhull(&points, 1e-9).unwrap();
        assert_eq!(faces.len(), 4);
        assert_closed(&faces);
    }

    #[test]
    fn cube_triangulates_into_twelve() {
        let points = cube_points(2.0);
        let faces = quickhull(&points, 1e-9).unwrap();
        assert_eq!(faces.len(), 12);
        assert_closed(&faces);

        let center = Point3::new(1.0, 1.0, 1.0);
        for face in &faces {
            assert!(face.signed_distance(&center) < 0.0);
        }
    }

    #[test]
    fn interior_points_are_dropped() {
        let mut points = cube_points(2.0);
        points.push(Point3::new(1.0, 1.0, 1.0));
        points.push(Point3::new(0.5, 1.5, 0.25));

        let faces = quickhull(&points, 1e-9).unwrap();
        let used: Vec<usize> = faces.iter().flat_map(|f| *f.vertices()).collect();
        assert!(!used.contains(&8));
        assert!(!used.contains(&9));
    }

    #[test]
    fn octahedron() {
        let points: Vec<Point3<f64>> = [
            Vector3::x(),
            -Vector3::x(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::z(),
            -Vector3::z(),
        ]
        .into_iter()
        .map(Point3::from)
        .collect();

        let faces = quickhull(&points, 1e-9).unwrap();
        assert_eq!(faces.len(), 8);
        assert_closed(&faces);
    }

    #[test]
    fn coplanar_points_are_flat() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.5, 0.3, 0.0),
        ];
        assert_eq!(quickhull(&points, 1e-9).unwrap_err(), HullError::Flat);
    }

    #[test]
    fn collinear_points_are_flat() {
        let points: Vec<Point3<f64>> = (0..5).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        assert_eq!(quickhull(&points, 1e-9).unwrap_err(), HullError::Flat);
    }
}

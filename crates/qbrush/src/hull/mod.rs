//! Convex hull construction with merged polygon faces.
//!
//! The builder turns the valid corners of a brush into a [`Polyhedron`]:
//!
//! - coincident points are merged,
//! - quickhull produces an outward-wound triangle mesh,
//! - edge-adjacent coplanar triangles are merged into polygon faces,
//! - vertices that only lie on hull edges are dropped from the face loops,
//! - unused vertices are compacted away, keeping input order,
//! - the result is audited for closure.

mod merge;
mod quickhull;
mod triangle;

use nalgebra::Point3;
use tracing::debug;

use crate::config::HULL_EPSILON;
use crate::error::HullError;
use crate::polyhedron::Polyhedron;
use crate::spatial_hash::SpatialHash;

/// Builds the hull with the default tolerance.
pub fn build(points: &[Point3<f64>]) -> Result<Polyhedron, HullError> {
    HullBuilder::default().build(points)
}

/// Builds closed convex polyhedra from point sets.
#[derive(Debug, Clone, PartialEq)]
pub struct HullBuilder {
    epsilon: f64,
}

impl Default for HullBuilder {
    fn default() -> Self {
        Self::new(HULL_EPSILON)
    }
}

impl HullBuilder {
    /// Creates a builder.
    ///
    /// `epsilon` is used for point deduplication, visibility during quickhull,
    /// and the coplanarity test when merging faces.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Computes the convex hull of `points`.
    pub fn build(&self, points: &[Point3<f64>]) -> Result<Polyhedron, HullError> {
        let unique = self.dedup(points);
        if unique.len() < 4 {
            return Err(HullError::InsufficientPoints(unique.len()));
        }

        let triangles = quickhull::quickhull(&unique, self.epsilon)?;
        let mut faces = merge::merge_coplanar(&triangles, &unique, self.epsilon)?;
        merge::drop_weak_vertices(&mut faces)?;

        let polyhedron = orient_outward(compact(&unique, faces));

        let audit = polyhedron.audit(self.epsilon);
        if !(audit.all_edges_two_faced && audit.no_dangling_vertices && audit.euler_valid) {
            return Err(HullError::NonManifold(audit.errors.join("; ")));
        }

        debug!(
            points = points.len(),
            unique = unique.len(),
            triangles = triangles.len(),
            vertices = polyhedron.vertex_count(),
            faces = polyhedron.face_count(),
            "built convex hull"
        );

        Ok(polyhedron)
    }

    fn dedup(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        let mut hash = SpatialHash::new(self.epsilon);
        let mut unique = Vec::with_capacity(points.len());
        for &p in points {
            if hash.find_or_insert(p, unique.len()).is_none() {
                unique.push(p);
            }
        }
        unique
    }
}

/// Drops vertices no face references and renumbers the rest, in input order.
fn compact(points: &[Point3<f64>], mut faces: Vec<Vec<usize>>) -> Polyhedron {
    let mut used = vec![false; points.len()];
    for &v in faces.iter().flatten() {
        used[v] = true;
    }

    let mut remap = vec![usize::MAX; points.len()];
    let mut vertices = Vec::new();
    for (old, &p) in points.iter().enumerate() {
        if used[old] {
            remap[old] = vertices.len();
            vertices.push(p);
        }
    }

    for face in &mut faces {
        for v in face.iter_mut() {
            *v = remap[*v];
        }
    }

    Polyhedron::new(vertices, faces)
}

/// Reverses any face whose normal points toward the centroid.
fn orient_outward(polyhedron: Polyhedron) -> Polyhedron {
    let centroid = polyhedron.centroid();
    let faces = (0..polyhedron.face_count())
        .map(|f| {
            let outward = polyhedron.face_centroid(f) - centroid;
            let mut face = polyhedron.faces()[f].clone();
            if polyhedron.face_normal(f).dot(&outward) < 0.0 {
                face.reverse();
            }
            face
        })
        .collect();
    Polyhedron::new(polyhedron.vertices().to_vec(), faces)
}

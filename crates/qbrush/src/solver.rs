//! Vertex enumeration for half-space brushes.
//!
//! Every corner of a convex brush is the meeting point of (at least) three of
//! its planes. The solver intersects every unordered plane triple, keeps the
//! points that are inside all half-spaces, and merges points that coincide.
//!
//! # Complexity
//!
//! Triple enumeration is `O(n³)` intersections and each candidate is tested
//! against all `n` planes, so solving is `O(n⁴)` for `n` planes. Brushes have
//! a handful to a few dozen faces, where this is cheap; it does not scale to
//! general half-space intersection problems.

use nalgebra::Point3;
use tracing::{debug, trace};

use crate::config::{PLANE_EPSILON, VERTEX_EPSILON};
use crate::error::SolveError;
use crate::plane::Plane;
use crate::spatial_hash::SpatialHash;

/// The minimum number of vertices that can enclose a volume.
pub const MIN_SOLID_VERTICES: usize = 4;

/// A point where three planes meet.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateVertex {
    pub position: Point3<f64>,
    /// Indices of the three planes, in ascending order.
    pub planes: [usize; 3],
}

/// A candidate that lies inside every half-space, after merging.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidVertex {
    pub position: Point3<f64>,
    /// Sorted indices of every plane through this corner.
    pub planes: Vec<usize>,
}

/// Computes the point shared by three planes.
///
/// Intersects the first two planes into a line, then the line with the third
/// plane. Returns `None` if either step is parallel within `epsilon`.
pub fn intersect_three(a: &Plane, b: &Plane, c: &Plane, epsilon: f64) -> Option<Point3<f64>> {
    a.intersect_plane(b, epsilon)?.intersect_plane(c, epsilon)
}

/// Solves with the default parallel tolerance.
pub fn solve(planes: &[Plane], epsilon: f64) -> Result<Vec<ValidVertex>, SolveError> {
    VertexSolver::new(epsilon, PLANE_EPSILON).solve(planes)
}

/// Finds the corners of the solid bounded by a set of planes.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexSolver {
    vertex_epsilon: f64,
    parallel_epsilon: f64,
}

impl Default for VertexSolver {
    fn default() -> Self {
        Self::new(VERTEX_EPSILON, PLANE_EPSILON)
    }
}

impl VertexSolver {
    /// Creates a solver.
    ///
    /// `vertex_epsilon` is the inside-test and merge distance; `parallel_epsilon`
    /// decides when two planes, or a line and a plane, are parallel.
    pub fn new(vertex_epsilon: f64, parallel_epsilon: f64) -> Self {
        Self {
            vertex_epsilon,
            parallel_epsilon,
        }
    }

    /// Intersects every unordered triple of planes exactly once.
    pub fn candidates(&self, planes: &[Plane]) -> Vec<CandidateVertex> {
        let n = planes.len();
        let mut result = Vec::new();

        for i in 0..n {
            for j in i + 1..n {
                // The line is shared by every k, so skip parallel pairs early.
                let Some(line) = planes[i].intersect_plane(&planes[j], self.parallel_epsilon)
                else {
                    continue;
                };
                for k in j + 1..n {
                    if let Some(position) = line.intersect_plane(&planes[k], self.parallel_epsilon)
                    {
                        result.push(CandidateVertex {
                            position,
                            planes: [i, j, k],
                        });
                    }
                }
            }
        }

        result
    }

    /// Returns `true` if the point is inside every half-space within tolerance.
    pub fn is_valid(&self, point: &Point3<f64>, planes: &[Plane]) -> bool {
        planes
            .iter()
            .all(|plane| plane.contains(point, self.vertex_epsilon))
    }

    /// Computes the merged set of valid corners.
    ///
    /// Fails with [`SolveError::Degenerate`] if fewer than four remain, which
    /// covers brushes with fewer than four planes and unbounded plane sets.
    pub fn solve(&self, planes: &[Plane]) -> Result<Vec<ValidVertex>, SolveError> {
        if planes.len() < MIN_SOLID_VERTICES {
            return Err(SolveError::Degenerate {
                planes: planes.len(),
                candidates: 0,
                valid: 0,
            });
        }

        let candidates = self.candidates(planes);
        let mut hash = SpatialHash::new(self.vertex_epsilon);
        let mut valid: Vec<ValidVertex> = Vec::new();

        for candidate in &candidates {
            if !self.is_valid(&candidate.position, planes) {
                trace!(planes = ?candidate.planes, "candidate outside brush");
                continue;
            }

            match hash.find_or_insert(candidate.position, valid.len()) {
                Some(existing) => {
                    let merged = &mut valid[existing].planes;
                    for plane in candidate.planes {
                        if let Err(at) = merged.binary_search(&plane) {
                            merged.insert(at, plane);
                        }
                    }
                }
                None => valid.push(ValidVertex {
                    position: candidate.position,
                    planes: candidate.planes.to_vec(),
                }),
            }
        }

        debug!(
            planes = planes.len(),
            candidates = candidates.len(),
            valid = valid.len(),
            "solved brush vertices"
        );

        if valid.len() < MIN_SOLID_VERTICES {
            return Err(SolveError::Degenerate {
                planes: planes.len(),
                candidates: candidates.len(),
                valid: valid.len(),
            });
        }

        Ok(valid)
    }
}

//! Boundary representation of a reconstructed brush.

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::plane::{Plane, PlaneSide};

/// A closed convex polyhedron: a vertex buffer and polygon faces indexing it.
///
/// Faces are wound counter-clockwise when viewed from outside, so the
/// right-hand normal of every face points away from the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyhedron {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Vec<usize>>,
}

impl Polyhedron {
    /// Creates a polyhedron from its parts.
    ///
    /// # Panics (debug builds only)
    /// Panics if a face has fewer than 3 vertices or indexes out of bounds.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        debug_assert!(
            faces.iter().all(|face| face.len() >= 3),
            "Faces must have at least 3 vertices"
        );
        debug_assert!(
            faces.iter().flatten().all(|&i| i < vertices.len()),
            "Face index out of bounds"
        );
        Self { vertices, faces }
    }

    /// Returns the vertex buffer.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Returns the faces as index lists into [`vertices`](Self::vertices).
    #[inline]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the positions of one face's vertices, in winding order.
    pub fn face_points(&self, face: usize) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.faces[face].iter().map(|&i| self.vertices[i])
    }

    /// Computes the (unnormalized) normal of a face with Newell's method.
    ///
    /// Unlike a cross product of the first three vertices, this stays well
    /// defined when consecutive vertices are nearly collinear.
    pub fn face_normal(&self, face: usize) -> Vector3<f64> {
        let indices = &self.faces[face];
        let mut normal = Vector3::zeros();
        for (k, &i) in indices.iter().enumerate() {
            let a = self.vertices[i];
            let b = self.vertices[indices[(k + 1) % indices.len()]];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal
    }

    /// Computes the unit normal of a face.
    ///
    /// Returns `None` if the face has zero area.
    pub fn face_unit_normal(&self, face: usize) -> Option<Vector3<f64>> {
        let n = self.face_normal(face);
        let len = n.norm();
        if len > f64::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    /// Computes the centroid of a face's vertices.
    pub fn face_centroid(&self, face: usize) -> Point3<f64> {
        let sum: Vector3<f64> = self.face_points(face).map(|p| p.coords).sum();
        Point3::from(sum / self.faces[face].len() as f64)
    }

    /// Re-derives the plane a face lies on from its vertices.
    pub fn face_plane(&self, face: usize) -> Option<Plane> {
        Plane::from_point_and_normal(self.face_centroid(face), self.face_normal(face), 0.0)
    }

    /// Computes the centroid of the vertex set.
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum: Vector3<f64> = self.vertices.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Returns every undirected edge once, as `(min, max)` index pairs.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .directed_edges()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    fn directed_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.faces.iter().flat_map(|face| {
            face.iter()
                .enumerate()
                .map(move |(k, &a)| (a, face[(k + 1) % face.len()]))
        })
    }

    /// Scales every vertex about the origin.
    pub fn scale(&mut self, factor: f64) {
        for vertex in &mut self.vertices {
            vertex.coords *= factor;
        }
    }

    /// Returns the axis-aligned bounds, or `None` for an empty polyhedron.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().copied())
    }

    /// Splits every face into a triangle fan.
    pub fn triangulate(&self) -> Vec<[usize; 3]> {
        let mut triangles = Vec::with_capacity(self.faces.iter().map(|f| f.len() - 2).sum());
        for face in &self.faces {
            for k in 1..face.len() - 1 {
                triangles.push([face[0], face[k], face[k + 1]]);
            }
        }
        triangles
    }

    /// Checks the closed-manifold invariants.
    ///
    /// `epsilon` is the distance tolerance for face planarity.
    pub fn audit(&self, epsilon: f64) -> TopologyAudit {
        let mut errors = Vec::new();

        let mut directed: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        for edge in self.directed_edges() {
            *directed.entry(edge).or_default() += 1;
        }
        let all_edges_two_faced = directed.iter().all(|(&(a, b), &count)| {
            let ok = count == 1 && directed.get(&(b, a)) == Some(&1);
            if !ok {
                errors.push(format!("edge {a}-{b} is not shared by exactly two faces"));
            }
            ok
        });

        let mut incidence = vec![0usize; self.vertices.len()];
        for face in &self.faces {
            for &i in face {
                incidence[i] += 1;
            }
        }
        let no_dangling_vertices = incidence.iter().enumerate().all(|(i, &count)| {
            let ok = count >= 3;
            if !ok {
                errors.push(format!("vertex {i} is used by {count} faces"));
            }
            ok
        });

        let faces_planar = (0..self.faces.len()).all(|face| {
            let ok = self.face_plane(face).is_some_and(|plane| {
                self.face_points(face)
                    .all(|p| plane.classify_point(&p, epsilon) == PlaneSide::OnPlane)
            });
            if !ok {
                errors.push(format!("face {face} is not planar"));
            }
            ok
        });

        let centroid = self.centroid();
        let normals_outward = (0..self.faces.len()).all(|face| {
            let ok = self.face_normal(face).dot(&(self.face_centroid(face) - centroid)) > 0.0;
            if !ok {
                errors.push(format!("face {face} is wound inward"));
            }
            ok
        });

        let vertex_count = self.vertices.len();
        let edge_count = self.edges().len();
        let face_count = self.faces.len();
        let euler_valid =
            vertex_count as i64 - edge_count as i64 + face_count as i64 == 2;

        TopologyAudit {
            vertex_count,
            edge_count,
            face_count,
            euler_valid,
            all_edges_two_faced,
            no_dangling_vertices,
            faces_planar,
            normals_outward,
            errors,
        }
    }
}

/// Result of [`Polyhedron::audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyAudit {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub face_count: usize,
    /// `V - E + F == 2`
    pub euler_valid: bool,
    /// Every directed edge has exactly one opposite twin.
    pub all_edges_two_faced: bool,
    /// Every vertex touches at least three faces.
    pub no_dangling_vertices: bool,
    pub faces_planar: bool,
    pub normals_outward: bool,
    pub errors: Vec<String>,
}

impl TopologyAudit {
    /// Returns `true` if the polyhedron is a closed, outward-wound manifold.
    pub fn is_valid(&self) -> bool {
        self.euler_valid
            && self.all_edges_two_faced
            && self.no_dangling_vertices
            && self.faces_planar
            && self.normals_outward
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Computes the bounds of a point set, or `None` if it is empty.
    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in points {
            bounds.include(&p);
        }
        Some(bounds)
    }

    /// Grows the box to contain a point.
    pub fn include(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Returns the smallest box containing both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns the center of the box.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the edge lengths of the box.
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

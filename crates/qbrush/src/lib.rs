//! Convex brush reconstruction for Quake-family MAP files.
//!
//! A brush is stored as the set of planes bounding it. This crate turns those
//! planes back into closed convex polyhedra: [`parser`] reads the face
//! records, [`solver`] finds the corners, [`hull`] builds the faces, and
//! [`BrushAssembler`] runs the pipeline per brush, entity, or whole map.

pub mod assembler;
pub mod config;
pub mod error;
pub mod hull;
pub mod map;
pub mod parser;
mod plane;
mod polyhedron;
mod spatial_hash;
pub mod solver;

pub use assembler::{AssembledBrush, BrushAssembler, EntityBrushes, EntityGeometry};
pub use config::{BrushConfig, DEFAULT_SCALE, HULL_EPSILON, PLANE_EPSILON, VERTEX_EPSILON};
pub use error::{BrushFailure, FailureReason, HullError, MapError, ParseError, SolveError};
pub use hull::HullBuilder;
pub use map::{parse_map, BrushRecord, MapEntity};
pub use parser::{parse_brush, parse_face, parse_plane, FaceRecord};
pub use plane::{Line, Plane, PlaneSide};
pub use polyhedron::{Aabb, Polyhedron, TopologyAudit};
pub use solver::{CandidateVertex, ValidVertex, VertexSolver};
pub use spatial_hash::SpatialHash;

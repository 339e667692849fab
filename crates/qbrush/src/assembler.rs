//! Brush reconstruction pipeline: text → planes → vertices → polyhedron.

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::config::BrushConfig;
use crate::error::{BrushFailure, FailureReason, MapError};
use crate::hull::HullBuilder;
use crate::map::{parse_map, BrushRecord, MapEntity};
use crate::parser::{parse_brush, FaceRecord};
use crate::plane::PlaneSide;
use crate::polyhedron::{Aabb, Polyhedron};
use crate::solver::VertexSolver;

/// A reconstructed brush with the tags handed on to material lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledBrush {
    pub entity_index: usize,
    pub brush_index: usize,
    /// The scaled polyhedron.
    pub polyhedron: Polyhedron,
    /// Texture of the brush's first face record.
    pub texture: String,
    /// Texture of the face record each polyhedron face came from.
    pub face_textures: Vec<String>,
    /// Index of the face record each polyhedron face came from.
    pub face_planes: Vec<Option<usize>>,
}

impl AssembledBrush {
    /// Splits into the mesh and its brush-level texture tag.
    pub fn into_parts(self) -> (Polyhedron, String) {
        (self.polyhedron, self.texture)
    }
}

impl From<AssembledBrush> for (Polyhedron, String) {
    fn from(brush: AssembledBrush) -> Self {
        brush.into_parts()
    }
}

/// The outcome of assembling every brush of one entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityBrushes {
    /// Successfully reconstructed brushes, in file order.
    pub brushes: Vec<AssembledBrush>,
    /// Brushes that failed, in file order.
    pub failures: Vec<BrushFailure>,
}

impl EntityBrushes {
    /// Returns the bounds of all reconstructed brushes.
    pub fn bounds(&self) -> Option<Aabb> {
        self.brushes
            .iter()
            .filter_map(|b| b.polyhedron.bounds())
            .reduce(|a, b| a.union(&b))
    }

    /// Consumes the result, keeping `(polyhedron, texture)` pairs.
    pub fn into_meshes(self) -> Vec<(Polyhedron, String)> {
        self.brushes.into_iter().map(Into::into).collect()
    }
}

/// Geometry of one map entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityGeometry {
    pub entity_index: usize,
    pub classname: String,
    pub brushes: Vec<AssembledBrush>,
    pub failures: Vec<BrushFailure>,
    /// Bounds of the scaled brushes; `None` for point entities.
    pub bounds: Option<Aabb>,
    pub center: Option<Point3<f64>>,
}

/// Runs the reconstruction pipeline with one set of tolerances.
#[derive(Debug, Clone, Default)]
pub struct BrushAssembler {
    config: BrushConfig,
}

impl BrushAssembler {
    pub fn new(config: BrushConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BrushConfig {
        &self.config
    }

    /// Reconstructs a single brush block.
    ///
    /// Failures are logged and returned; they never affect other brushes.
    #[instrument(skip(self, text))]
    pub fn assemble(
        &self,
        text: &str,
        brush_index: usize,
        entity_index: usize,
    ) -> Result<AssembledBrush, BrushFailure> {
        self.reconstruct(text, brush_index, entity_index)
            .map_err(|reason| {
                warn!(entity_index, brush_index, %reason, "brush reconstruction failed");
                BrushFailure {
                    entity_index,
                    brush_index,
                    reason,
                    raw: text.to_owned(),
                }
            })
    }

    fn reconstruct(
        &self,
        text: &str,
        brush_index: usize,
        entity_index: usize,
    ) -> Result<AssembledBrush, FailureReason> {
        let faces = parse_brush(text, self.config.plane_epsilon)?;
        let planes: Vec<_> = faces.iter().map(|f| f.plane).collect();

        let vertices = VertexSolver::new(self.config.vertex_epsilon, self.config.plane_epsilon)
            .solve(&planes)?;
        let points: Vec<Point3<f64>> = vertices.iter().map(|v| v.position).collect();

        let mut polyhedron = HullBuilder::new(self.config.hull_epsilon).build(&points)?;

        let face_planes = self.match_faces(&polyhedron, &faces);
        let face_textures = face_planes
            .iter()
            .map(|m| m.map(|i| faces[i].texture.clone()).unwrap_or_default())
            .collect();

        polyhedron.scale(self.config.scale);

        debug!(
            planes = planes.len(),
            vertices = polyhedron.vertex_count(),
            faces = polyhedron.face_count(),
            "assembled brush"
        );

        Ok(AssembledBrush {
            entity_index,
            brush_index,
            polyhedron,
            texture: faces
                .first()
                .map(|f| f.texture.clone())
                .unwrap_or_default(),
            face_textures,
            face_planes,
        })
    }

    /// Finds, for every polyhedron face, the lowest-indexed face record whose
    /// plane faces the same way and passes through all the face's vertices.
    fn match_faces(&self, polyhedron: &Polyhedron, faces: &[FaceRecord]) -> Vec<Option<usize>> {
        (0..polyhedron.face_count())
            .map(|f| {
                let normal = polyhedron.face_normal(f);
                faces.iter().position(|record| {
                    record.plane.normal().dot(&normal) > 0.0
                        && polyhedron.face_points(f).all(|p| {
                            record.plane.classify_point(&p, self.config.vertex_epsilon)
                                == PlaneSide::OnPlane
                        })
                })
            })
            .collect()
    }

    /// Reconstructs every brush of an entity, keeping file order.
    #[instrument(skip(self, records), fields(brushes = records.len()))]
    pub fn assemble_entity(&self, entity_index: usize, records: &[BrushRecord]) -> EntityBrushes {
        let run = |record: &BrushRecord| self.assemble(&record.text, record.index, entity_index);
        let results: Vec<_> = if self.config.parallel {
            records.par_iter().map(run).collect()
        } else {
            records.iter().map(run).collect()
        };

        let mut out = EntityBrushes::default();
        for result in results {
            match result {
                Ok(brush) => out.brushes.push(brush),
                Err(failure) => out.failures.push(failure),
            }
        }
        out
    }

    /// Tokenizes a map and reconstructs every entity's brushes.
    ///
    /// Entities without brushes are reported with empty geometry.
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub fn assemble_map(&self, text: &str) -> Result<Vec<EntityGeometry>, MapError> {
        let entities = parse_map(text)?;
        let geometry: Vec<EntityGeometry> =
            entities.iter().map(|e| self.assemble_map_entity(e)).collect();

        info!(
            entities = geometry.len(),
            brushes = geometry.iter().map(|e| e.brushes.len()).sum::<usize>(),
            failures = geometry.iter().map(|e| e.failures.len()).sum::<usize>(),
            "assembled map"
        );

        Ok(geometry)
    }

    fn assemble_map_entity(&self, entity: &MapEntity) -> EntityGeometry {
        let result = self.assemble_entity(entity.index, &entity.brushes);
        let bounds = result.bounds();
        EntityGeometry {
            entity_index: entity.index,
            classname: entity.classname().to_owned(),
            brushes: result.brushes,
            failures: result.failures,
            bounds,
            center: bounds.map(|b| b.center()),
        }
    }
}

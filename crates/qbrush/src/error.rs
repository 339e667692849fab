//! Error types for brush reconstruction.
//!
//! Every failure is local to one brush. [`BrushFailure`] carries enough
//! context (entity, brush, raw text) for the caller to report malformed
//! source data and move on.

use thiserror::Error;

/// A face record could not be turned into a plane.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("malformed coordinates: {0}")]
    MalformedCoordinates(String),

    #[error("degenerate plane: defining points are collinear (|n| = {magnitude:e})")]
    DegeneratePlane { magnitude: f64 },

    /// A face inside a brush block failed; `line` is the zero-based face line.
    #[error("face {line}: {source}")]
    Face {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}

/// The planes of a brush do not bound a finite solid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("degenerate brush: {valid} valid vertices from {candidates} candidates over {planes} planes")]
    Degenerate {
        planes: usize,
        candidates: usize,
        valid: usize,
    },
}

/// The valid vertex set could not be turned into a closed convex mesh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HullError {
    #[error("convex hull needs at least 4 distinct points, got {0}")]
    InsufficientPoints(usize),

    #[error("points span no volume (all coplanar or collinear)")]
    Flat,

    #[error("hull is not a closed manifold: {0}")]
    NonManifold(String),
}

/// Why a brush failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FailureReason {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error(transparent)]
    Hull(#[from] HullError),
}

/// A brush that could not be reconstructed, with its location in the map.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("entity {entity_index}, brush {brush_index}: {reason}")]
pub struct BrushFailure {
    pub entity_index: usize,
    pub brush_index: usize,
    #[source]
    pub reason: FailureReason,
    /// The brush block as it appeared in the source.
    pub raw: String,
}

/// Structural errors in MAP text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("line {line}: unexpected '{{' (nesting deeper than entity/brush)")]
    UnexpectedBrace { line: usize },

    #[error("line {line}: '}}' without a matching '{{'")]
    UnbalancedClose { line: usize },

    #[error("line {line}: block opened here is never closed")]
    Unterminated { line: usize },

    #[error("line {line}: content outside of any entity")]
    UnexpectedContent { line: usize },

    #[error("line {line}: malformed property")]
    MalformedProperty { line: usize },
}

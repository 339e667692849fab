//! Tolerances and unit conventions for brush reconstruction.

/// Default uniform scale: 32 map units per meter.
pub const DEFAULT_SCALE: f64 = 0.03125;

/// Default tolerance for the inside test and for merging coincident vertices,
/// in map units. Chosen against the format's one-unit grid.
pub const VERTEX_EPSILON: f64 = 0.1;

/// Default tolerance below which a plane normal (or a normal cross product)
/// is considered degenerate.
pub const PLANE_EPSILON: f64 = 1e-8;

/// Default tolerance used by the hull builder for visibility and coplanar
/// face merging.
pub const HULL_EPSILON: f64 = 1e-4;

/// Settings for turning brush text into polyhedra.
///
/// All tolerances are expressed in map units, before scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushConfig {
    /// Uniform scale applied to output vertices after hull construction.
    pub scale: f64,
    /// Inside-test and vertex merge tolerance.
    pub vertex_epsilon: f64,
    /// Degenerate plane and parallel-plane tolerance.
    pub plane_epsilon: f64,
    /// Hull visibility and coplanarity tolerance.
    pub hull_epsilon: f64,
    /// Reconstruct brushes of an entity on the rayon thread pool.
    pub parallel: bool,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            vertex_epsilon: VERTEX_EPSILON,
            plane_epsilon: PLANE_EPSILON,
            hull_epsilon: HULL_EPSILON,
            parallel: true,
        }
    }
}

impl BrushConfig {
    /// Creates a configuration with the default tolerances and scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the vertex validity / merge tolerance.
    pub fn with_vertex_epsilon(mut self, epsilon: f64) -> Self {
        self.vertex_epsilon = epsilon;
        self
    }

    /// Sets the degenerate plane tolerance.
    pub fn with_plane_epsilon(mut self, epsilon: f64) -> Self {
        self.plane_epsilon = epsilon;
        self
    }

    /// Sets the hull tolerance.
    pub fn with_hull_epsilon(mut self, epsilon: f64) -> Self {
        self.hull_epsilon = epsilon;
        self
    }

    /// Enables or disables parallel brush reconstruction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = BrushConfig::default();
        assert_eq!(config.scale, DEFAULT_SCALE);
        assert_eq!(config.vertex_epsilon, VERTEX_EPSILON);
        assert_eq!(config.plane_epsilon, PLANE_EPSILON);
        assert_eq!(config.hull_epsilon, HULL_EPSILON);
        assert!(config.parallel);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = BrushConfig::new()
            .with_scale(1.0)
            .with_vertex_epsilon(0.5)
            .with_plane_epsilon(1e-6)
            .with_hull_epsilon(1e-3)
            .with_parallel(false);

        assert_eq!(config.scale, 1.0);
        assert_eq!(config.vertex_epsilon, 0.5);
        assert_eq!(config.plane_epsilon, 1e-6);
        assert_eq!(config.hull_epsilon, 1e-3);
        assert!(!config.parallel);
    }
}

//! Grid-based spatial hash for merging coincident vertices.
//!
//! Space is divided into cubic cells twice the merge tolerance wide, so any
//! point within tolerance of a query lies in the query's cell or one of its
//! 26 neighbors.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

type Cell = (i64, i64, i64);

/// Narrowest cell width. A zero tolerance still gets finite cell coordinates.
const MIN_CELL_SIZE: f64 = 2e-9;

/// Maps points to the index of the first stored point within tolerance.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cells: FxHashMap<Cell, Vec<(Point3<f64>, usize)>>,
    cell_size: f64,
    tolerance: f64,
}

impl SpatialHash {
    /// Creates an empty hash. Points closer than `tolerance` are coincident.
    pub fn new(tolerance: f64) -> Self {
        Self {
            cells: FxHashMap::default(),
            cell_size: (tolerance * 2.0).max(MIN_CELL_SIZE),
            tolerance,
        }
    }

    #[inline]
    fn cell_coords(&self, p: &Point3<f64>) -> Cell {
        let discretize = |v: f64| (v / self.cell_size).floor() as i64;
        (discretize(p.x), discretize(p.y), discretize(p.z))
    }

    /// Returns the id of a stored point within tolerance of `point`, if any.
    pub fn find(&self, point: &Point3<f64>) -> Option<usize> {
        let (cx, cy, cz) = self.cell_coords(point);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = (
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    );
                    if let Some(entries) = self.cells.get(&cell)
                        && let Some((_, id)) = entries
                            .iter()
                            .find(|(p, _)| (p - point).norm() <= self.tolerance)
                    {
                        return Some(*id);
                    }
                }
            }
        }

        None
    }

    /// Stores a point under `id` without checking for duplicates.
    pub fn insert(&mut self, point: Point3<f64>, id: usize) {
        self.cells
            .entry(self.cell_coords(&point))
            .or_default()
            .push((point, id));
    }

    /// Returns the id of the coincident stored point, or stores `point` under
    /// `id` and returns `None`.
    pub fn find_or_insert(&mut self, point: Point3<f64>, id: usize) -> Option<usize> {
        match self.find(&point) {
            Some(existing) => Some(existing),
            None => {
                self.insert(point, id);
                None
            }
        }
    }
}

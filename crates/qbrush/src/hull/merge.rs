//! Coplanar triangle merging and face loop cleanup.

use nalgebra::Point3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::HullError;
use crate::plane::{Plane, PlaneSide};

use super::triangle::HullTriangle;

/// Groups edge-adjacent coplanar triangles and returns one boundary loop per
/// group.
///
/// Groups grow from the largest remaining triangle. A neighbor joins when it
/// faces the same way and all its vertices are within `epsilon` of the seed's
/// plane, so thin slivers inherit the plane of the face they belong to.
pub(crate) fn merge_coplanar(
    triangles: &[HullTriangle],
    points: &[Point3<f64>],
    epsilon: f64,
) -> Result<Vec<Vec<usize>>, HullError> {
    let mut owner: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    for (i, tri) in triangles.iter().enumerate() {
        for edge in tri.edges() {
            owner.insert(edge, i);
        }
    }

    let mut order: Vec<usize> = (0..triangles.len()).collect();
    order.sort_by(|&a, &b| triangles[b].area2().total_cmp(&triangles[a].area2()));

    let mut group_of = vec![usize::MAX; triangles.len()];
    let mut loops = Vec::new();

    for seed in order {
        if group_of[seed] != usize::MAX {
            continue;
        }
        let group = loops.len();
        let seed_normal = triangles[seed].normal();
        let Some(seed_plane) =
            Plane::from_point_and_normal(points[triangles[seed].vertices()[0]], seed_normal, 0.5)
        else {
            return Err(HullError::NonManifold(format!(
                "degenerate hull triangle {seed}"
            )));
        };

        let mut members = vec![seed];
        let mut stack = vec![seed];
        group_of[seed] = group;

        while let Some(current) = stack.pop() {
            for (a, b) in triangles[current].edges() {
                let Some(&neighbor) = owner.get(&(b, a)) else {
                    continue;
                };
                if group_of[neighbor] != usize::MAX {
                    continue;
                }
                let candidate = &triangles[neighbor];
                let coplanar = candidate.normal().dot(&seed_normal) > 0.0
                    && candidate.vertices().iter().all(|&v| {
                        seed_plane.classify_point(&points[v], epsilon) == PlaneSide::OnPlane
                    });
                if coplanar {
                    group_of[neighbor] = group;
                    members.push(neighbor);
                    stack.push(neighbor);
                }
            }
        }

        loops.push(boundary_loop(triangles, &members)?);
    }

    Ok(loops)
}

/// Walks the outer boundary of a group of triangles, keeping their winding.
fn boundary_loop(triangles: &[HullTriangle], members: &[usize]) -> Result<Vec<usize>, HullError> {
    let edges: FxHashSet<(usize, usize)> = members
        .iter()
        .flat_map(|&t| triangles[t].edges())
        .collect();

    let mut next: FxHashMap<usize, usize> = FxHashMap::default();
    for &(a, b) in &edges {
        if edges.contains(&(b, a)) {
            continue;
        }
        if next.insert(a, b).is_some() {
            return Err(HullError::NonManifold(format!(
                "face boundary touches itself at vertex {a}"
            )));
        }
    }

    let Some(&start) = next.keys().min() else {
        return Err(HullError::NonManifold("face has no boundary".into()));
    };

    let mut boundary = vec![start];
    let mut current = start;
    loop {
        let Some(&following) = next.get(&current) else {
            return Err(HullError::NonManifold(format!(
                "face boundary is open at vertex {current}"
            )));
        };
        if following == start {
            break;
        }
        if boundary.len() > next.len() {
            return Err(HullError::NonManifold("face boundary does not close".into()));
        }
        boundary.push(following);
        current = following;
    }

    if boundary.len() != next.len() {
        return Err(HullError::NonManifold(
            "face has more than one boundary loop".into(),
        ));
    }

    Ok(boundary)
}

/// Removes vertices that touch fewer than three faces.
///
/// Such vertices sit in the middle of a hull edge (both faces along the edge
/// list them) and are not corners of the solid. Dropping them from both loops
/// keeps the two faces agreeing on the shortened edge.
pub(crate) fn drop_weak_vertices(faces: &mut [Vec<usize>]) -> Result<(), HullError> {
    loop {
        let mut incidence: FxHashMap<usize, usize> = FxHashMap::default();
        for face in faces.iter() {
            for &v in face {
                *incidence.entry(v).or_default() += 1;
            }
        }

        let weak: FxHashSet<usize> = incidence
            .into_iter()
            .filter(|&(_, count)| count < 3)
            .map(|(v, _)| v)
            .collect();
        if weak.is_empty() {
            return Ok(());
        }

        for face in faces.iter_mut() {
            face.retain(|v| !weak.contains(v));
            if face.len() < 3 {
                return Err(HullError::NonManifold(
                    "face collapsed after removing edge vertices".into(),
                ));
            }
        }
    }
}

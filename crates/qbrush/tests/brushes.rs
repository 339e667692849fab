use approx::assert_relative_eq;
use nalgebra::Point3;
use qbrush::{
    BrushAssembler, BrushConfig, FailureReason, HullBuilder, Polyhedron, SolveError, VertexSolver,
    parse_brush,
};

const SWAMP_BOX: &str = "\
( 128 -32 0 ) ( 96 -16 0 ) ( 224 112 0 ) wswamp2_1 0 0 0 1.000000 1.000000
( 96 -16 -320 ) ( 128 -32 -320 ) ( 224 64 -320 ) wswamp2_1 0 0 0 1.000000 1.000000
( 224 112 -320 ) ( 224 112 0 ) ( 96 -16 0 ) wswamp2_1 0 0 0 1.000000 1.000000
( 128 -32 -320 ) ( 128 -32 0 ) ( 224 64 0 ) wswamp2_1 12 0 0 0.750000 1.000000
( 224 64 -320 ) ( 224 64 0 ) ( 224 112 0 ) wswamp2_1 0 0 0 1.000000 1.000000
( 96 -16 -320 ) ( 96 -16 0 ) ( 128 -32 0 ) wswamp2_1 0 0 0 1.000000 1.000000";

// A box with three corners and two edges chamfered off.
const CHAMFERED: &str = "\
( 208 -224 256 ) ( 208 -224 -0 ) ( -0 -224 -0 ) __TB_empty -0 -0 -0 1 1
( 208 -96 -0 ) ( 208 -224 -0 ) ( 208 -224 256 ) __TB_empty -0 -0 -0 1 1
( -0 -224 256 ) ( -0 -96 256 ) ( 208 -96 256 ) __TB_empty -0 -0 -0 1 1
( -0 -224 -0 ) ( -0 -96 -0 ) ( -0 -96 256 ) __TB_empty -0 -0 -0 1 1
( -0 -96 256 ) ( -0 -96 -0 ) ( 208 -96 -0 ) __TB_empty -0 -0 -0 1 1
( 208 -96 -0 ) ( -0 -96 -0 ) ( -0 -224 -0 ) __TB_empty -0 -0 -0 1 1
( 208 -224 192 ) ( 144 -224 256 ) ( 144 -96 256 ) __TB_empty -0 -0 -0 1 1
( 64 -224 256 ) ( -0 -224 192 ) ( -0 -96 192 ) __TB_empty -0 -0 -0 1 1
( 144 -192 256 ) ( 304 -224 224 ) ( 176 -224 224 ) __TB_empty -0 -0 -0 1 1
( 208 -224 96 ) ( 336 -176 -0 ) ( 208 -176 -0 ) __TB_empty -0 -0 -0 1 1
( 208 -224 192 ) ( 208 -176 -0 ) ( 128 -224 96 ) __TB_empty -0 -0 -0 1 1
( 208 -128 -0 ) ( 208 -96 128 ) ( 160 -96 -0 ) __TB_empty -0 0 -0 1 1";

/// Writes a face record for the triangle `a b c`, counter-clockwise seen from
/// outside the brush.
fn face_record(a: [i32; 3], b: [i32; 3], c: [i32; 3], texture: &str) -> String {
    format!(
        "( {} {} {} ) ( {} {} {} ) ( {} {} {} ) {texture} 0 0 0 1 1",
        b[0], b[1], b[2], a[0], a[1], a[2], c[0], c[1], c[2]
    )
}

fn unscaled() -> BrushAssembler {
    BrushAssembler::new(BrushConfig::new().with_scale(1.0))
}

fn assert_closed(polyhedron: &Polyhedron) {
    let audit = polyhedron.audit(1e-6);
    assert!(audit.is_valid(), "{:?}", audit.errors);
}

#[test]
fn axial_box_becomes_hexahedron() {
    let brush = unscaled().assemble(SWAMP_BOX, 0, 0).unwrap();
    let polyhedron = &brush.polyhedron;

    assert_eq!(polyhedron.vertex_count(), 8);
    assert_eq!(polyhedron.face_count(), 6);
    assert!(polyhedron.faces().iter().all(|f| f.len() == 4));
    assert_closed(polyhedron);
    assert_eq!(brush.texture, "wswamp2_1");

    let corners = [(96.0, -16.0), (128.0, -32.0), (224.0, 64.0), (224.0, 112.0)];
    for &(x, y) in &corners {
        for z in [-320.0, 0.0] {
            let expected = Point3::new(x, y, z);
            assert!(
                polyhedron
                    .vertices()
                    .iter()
                    .any(|v| (v - expected).norm() < 1e-9),
                "missing corner {expected:?}"
            );
        }
    }
}

#[test]
fn parallel_planes_are_degenerate() {
    let text = (0..6)
        .map(|i| {
            let z = i * 16;
            if i % 2 == 0 {
                face_record([0, 0, z], [64, 0, z], [64, 64, z], "top")
            } else {
                face_record([0, 0, z], [64, 64, z], [64, 0, z], "bottom")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let failure = unscaled().assemble(&text, 2, 1).unwrap_err();
    assert_eq!(
        failure.reason,
        FailureReason::Solve(SolveError::Degenerate {
            planes: 6,
            candidates: 0,
            valid: 0
        })
    );
}

#[test]
fn duplicate_planes_do_not_duplicate_vertices() {
    // The top face again, defined by different points on the same plane.
    let text = format!(
        "{SWAMP_BOX}\n{}",
        "( 224 112 0 ) ( 224 64 0 ) ( 96 -16 0 ) wswamp2_1 0 0 0 1 1"
    );
    let planes: Vec<_> = parse_brush(&text, 1e-8)
        .unwrap()
        .into_iter()
        .map(|f| f.plane)
        .collect();

    let vertices = VertexSolver::default().solve(&planes).unwrap();
    assert_eq!(vertices.len(), 8);
    for (i, a) in vertices.iter().enumerate() {
        for b in &vertices[i + 1..] {
            assert!((a.position - b.position).norm() > 0.1);
        }
    }
    for top in vertices.iter().filter(|v| v.position.z > -1.0) {
        assert!(top.planes.contains(&0) && top.planes.contains(&6));
    }

    let brush = unscaled().assemble(&text, 0, 0).unwrap();
    assert_eq!(brush.polyhedron.vertex_count(), 8);
    assert_eq!(brush.polyhedron.face_count(), 6);

    // The lower index wins the face.
    let top_face = (0..6)
        .find(|&f| brush.polyhedron.face_unit_normal(f).unwrap().z > 0.5)
        .unwrap();
    assert_eq!(brush.face_planes[top_face], Some(0));
}

#[test]
fn near_duplicate_planes_merge_into_one_face() {
    // The top face sunk by 0.05, then tilted about its south-west edge so it
    // rises about 0.08 by the far corner.
    let text = format!(
        "{SWAMP_BOX}\n{}\n{}",
        "( 128 -32 -0.05 ) ( 96 -16 -0.05 ) ( 224 112 -0.05 ) shifted 0 0 0 1 1",
        "( 128 -32 0 ) ( 96 -16 0 ) ( 1096 1984 1 ) tilted 0 0 0 1 1"
    );

    let brush = unscaled().assemble(&text, 0, 0).unwrap();
    assert_eq!(brush.polyhedron.vertex_count(), 8);
    assert_eq!(brush.polyhedron.face_count(), 6);
    assert_closed(&brush.polyhedron);

    for v in brush.polyhedron.vertices() {
        assert!(v.z.abs() < 1e-9 || (v.z + 320.0).abs() < 1e-9, "{v:?}");
    }

    let top_face = (0..6)
        .find(|&f| brush.polyhedron.face_unit_normal(f).unwrap().z > 0.5)
        .unwrap();
    assert_eq!(brush.face_planes[top_face], Some(0));
    assert_eq!(brush.face_textures[top_face], "wswamp2_1");
}

#[test]
fn tetrahedron_is_smallest_solid() {
    let o = [0, 0, 0];
    let x = [64, 0, 0];
    let y = [0, 64, 0];
    let z = [0, 0, 64];
    let text = [
        face_record(o, y, x, "floor"),
        face_record(o, z, y, "wall_x"),
        face_record(o, x, z, "wall_y"),
        face_record(x, y, z, "slope"),
    ]
    .join("\n");

    let brush = unscaled().assemble(&text, 0, 0).unwrap();
    assert_eq!(brush.polyhedron.vertex_count(), 4);
    assert_eq!(brush.polyhedron.face_count(), 4);
    assert!(brush.polyhedron.faces().iter().all(|f| f.len() == 3));
    assert_closed(&brush.polyhedron);
    assert_eq!(brush.texture, "floor");

    let mut textures = brush.face_textures.clone();
    textures.sort();
    assert_eq!(textures, vec!["floor", "slope", "wall_x", "wall_y"]);
}

#[test]
fn chamfered_brush_is_closed() {
    let brush = unscaled().assemble(CHAMFERED, 0, 0).unwrap();
    let audit = brush.polyhedron.audit(1e-6);

    assert!(audit.is_valid(), "{:?}", audit.errors);
    assert_eq!(audit.vertex_count, 18);
    assert_eq!(audit.face_count, 12);
    assert_eq!(audit.edge_count, 28);
    assert!(brush.face_planes.iter().all(Option::is_some));
}

#[test]
fn hull_of_solved_vertices_matches_assembler() {
    let planes: Vec<_> = parse_brush(CHAMFERED, 1e-8)
        .unwrap()
        .into_iter()
        .map(|f| f.plane)
        .collect();
    let points: Vec<_> = VertexSolver::default()
        .solve(&planes)
        .unwrap()
        .into_iter()
        .map(|v| v.position)
        .collect();

    let hull = HullBuilder::default().build(&points).unwrap();
    let brush = unscaled().assemble(CHAMFERED, 0, 0).unwrap();
    assert_eq!(hull, brush.polyhedron);
}

#[test]
fn scale_is_applied_after_hull() {
    let brush = BrushAssembler::default().assemble(SWAMP_BOX, 0, 0).unwrap();
    let bounds = brush.polyhedron.bounds().unwrap();
    assert_relative_eq!(bounds.min, Point3::new(3.0, -1.0, -10.0));
    assert_relative_eq!(bounds.max, Point3::new(7.0, 3.5, 0.0));
}

#[test]
fn map_with_mixed_brushes() {
    let map = format!(
        "// Game: Quake\n\
         {{\n\
         \"classname\" \"worldspawn\"\n\
         \"message\" \"Pretend Dead Friend\"\n\
         {{\n{SWAMP_BOX}\n}}\n\
         {{\n( 0 0 0 ) ( 1 1 1 ) ( 2 2 2 ) broken 0 0 0 1 1\n}}\n\
         {{\n{CHAMFERED}\n}}\n\
         }}\n\
         {{\n\"classname\" \"info_player_start\"\n\"origin\" \"0 0 24\"\n}}\n"
    );

    let entities = unscaled().assemble_map(&map).unwrap();
    assert_eq!(entities.len(), 2);

    let world = &entities[0];
    assert_eq!(world.classname, "worldspawn");
    let ok: Vec<usize> = world.brushes.iter().map(|b| b.brush_index).collect();
    assert_eq!(ok, vec![0, 2]);
    assert_eq!(world.failures.len(), 1);
    assert_eq!(world.failures[0].brush_index, 1);
    assert!(world.failures[0].raw.contains("broken"));

    let bounds = world.bounds.unwrap();
    assert_relative_eq!(bounds.min, Point3::new(0.0, -224.0, -320.0));
    assert_relative_eq!(bounds.max, Point3::new(224.0, 112.0, 256.0));

    assert_eq!(entities[1].classname, "info_player_start");
    assert!(entities[1].bounds.is_none());
}

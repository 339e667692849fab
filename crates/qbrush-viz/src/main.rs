use macroquad::prelude::*;
use qbrush::{Aabb, BrushAssembler, EntityGeometry};
use qbrush_viz::{OrbitCamera, SAMPLE_MAP, draw_brush};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn scene_bounds(entities: &[EntityGeometry]) -> Option<Aabb> {
    entities
        .iter()
        .filter_map(|e| e.bounds)
        .reduce(|a, b| a.union(&b))
}

#[macroquad::main("qbrush viewer")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let entities = match BrushAssembler::default().assemble_map(SAMPLE_MAP) {
        Ok(entities) => entities,
        Err(err) => {
            error!(%err, "sample map is malformed");
            return;
        }
    };

    let brush_count: usize = entities.iter().map(|e| e.brushes.len()).sum();
    let failure_count: usize = entities.iter().map(|e| e.failures.len()).sum();
    for entity in &entities {
        info!(
            entity = entity.entity_index,
            classname = %entity.classname,
            brushes = entity.brushes.len(),
            center = ?entity.center,
            "entity"
        );
    }

    let mut camera = OrbitCamera::around(scene_bounds(&entities).as_ref());
    let target = camera.target();
    let mut wireframe = true;

    loop {
        camera.update();
        if is_key_pressed(KeyCode::Tab) {
            wireframe = !wireframe;
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());

        for entity in &entities {
            for brush in &entity.brushes {
                draw_brush(brush, wireframe);
            }
        }

        draw_line_3d(target, target + vec3(1.0, 0.0, 0.0), RED);
        draw_line_3d(target, target + vec3(0.0, 1.0, 0.0), BLUE);
        draw_line_3d(target, target + vec3(0.0, 0.0, -1.0), GREEN);

        set_default_camera();

        draw_text(
            &format!(
                "{} entities, {} brushes, {} failed",
                entities.len(),
                brush_count,
                failure_count
            ),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            "Drag mouse to rotate, scroll to zoom, Tab toggles edges",
            10.0,
            45.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 65.0, 16.0, DARKGRAY);

        next_frame().await
    }
}

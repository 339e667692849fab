//! Rendering helpers for reconstructed brushes.

use std::hash::{Hash, Hasher};

use macroquad::models::{Mesh, Vertex, draw_mesh};
use macroquad::prelude::*;
use nalgebra::{Point3, Vector3};
use qbrush::{Aabb, AssembledBrush, Polyhedron};

/// A small map compiled into the viewer.
pub const SAMPLE_MAP: &str = include_str!("../assets/sample.map");

/// Converts a map-space point (Z up) to render space (Y up).
pub fn to_render(p: &Point3<f64>) -> Vec3 {
    vec3(p.x as f32, p.z as f32, -p.y as f32)
}

fn normal_to_render(n: &Vector3<f64>) -> Vec3 {
    vec3(n.x as f32, n.z as f32, -n.y as f32)
}

/// Generates a deterministic color from a texture name.
/// Faces sharing a texture share a color across frames and runs.
pub fn texture_color(texture: &str) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    texture.hash(&mut hasher);
    let hash = hasher.finish();

    // Extract RGB from hash bytes
    let r = ((hash >> 16) & 0xFF) as u8;
    let g = ((hash >> 8) & 0xFF) as u8;
    let b = (hash & 0xFF) as u8;

    // Keep colors away from black
    Color::from_rgba(r.max(60), g.max(60), b.max(60), 255)
}

/// Dims a color by how far its face turns away from the light.
fn shade(color: Color, normal: Vec3) -> Color {
    let light = vec3(0.3, 0.9, 0.4).normalize();
    let k = 0.45 + 0.55 * normal.dot(light).max(0.0);
    Color::new(color.r * k, color.g * k, color.b * k, color.a)
}

/// Draws one face of a polyhedron as a triangle fan.
pub fn draw_face(polyhedron: &Polyhedron, face: usize, color: Color) {
    let indices = &polyhedron.faces()[face];
    if indices.len() < 3 {
        return;
    }

    let normal = polyhedron
        .face_unit_normal(face)
        .map(|n| normal_to_render(&n))
        .unwrap_or(Vec3::Y);
    let color = shade(color, normal);

    let vertices: Vec<Vertex> = polyhedron
        .face_points(face)
        .map(|p| Vertex::new2(to_render(&p), vec2(0.0, 0.0), color))
        .collect();

    let mut fan: Vec<u16> = Vec::with_capacity((indices.len() - 2) * 3);
    for i in 1..indices.len() - 1 {
        fan.push(0);
        fan.push(i as u16);
        fan.push((i + 1) as u16);
    }

    draw_mesh(&Mesh {
        vertices,
        indices: fan,
        texture: None,
    });
}

/// Draws every edge of a polyhedron once.
pub fn draw_edges(polyhedron: &Polyhedron, color: Color) {
    let vertices = polyhedron.vertices();
    for (a, b) in polyhedron.edges() {
        draw_line_3d(to_render(&vertices[a]), to_render(&vertices[b]), color);
    }
}

/// Draws a brush with each face colored by its texture.
pub fn draw_brush(brush: &AssembledBrush, wireframe: bool) {
    for face in 0..brush.polyhedron.face_count() {
        let texture = brush
            .face_textures
            .get(face)
            .map_or(brush.texture.as_str(), String::as_str);
        draw_face(&brush.polyhedron, face, texture_color(texture));
    }
    if wireframe {
        draw_edges(&brush.polyhedron, Color::from_rgba(10, 10, 10, 255));
    }
}

const MAX_PITCH: f32 = 1.5;
const KEY_STEP: f32 = 0.02;

/// Orbit camera framed on the reconstructed scene.
///
/// Zoom steps and distance limits are proportional to the scene radius, so
/// the same controls work for a single brush and for a whole map.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    target: Vec3,
    radius: f32,
    distance: f32,
    yaw: f32,
    pitch: f32,
}

impl OrbitCamera {
    /// Frames a sphere of `radius` around `target` from a three-quarter view.
    pub fn framing(target: Vec3, radius: f32) -> Self {
        let radius = radius.max(0.5);
        Self {
            target,
            radius,
            distance: radius * 2.5,
            yaw: 0.6,
            pitch: 0.5,
        }
    }

    /// Frames map-space bounds, or a small area around the origin if the
    /// scene is empty.
    pub fn around(bounds: Option<&Aabb>) -> Self {
        match bounds {
            Some(bounds) => Self::framing(
                to_render(&bounds.center()),
                bounds.size().norm() as f32 * 0.5,
            ),
            None => Self::framing(Vec3::ZERO, 5.0),
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Applies one frame of mouse drag, wheel and arrow key input.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.orbit(-delta.x * 2.0, -delta.y * 2.0);
        }

        let key = |code| if is_key_down(code) { KEY_STEP } else { 0.0 };
        self.orbit(
            key(KeyCode::Left) - key(KeyCode::Right),
            key(KeyCode::Up) - key(KeyCode::Down),
        );

        self.zoom(mouse_wheel().1);
    }

    /// Turns around the target. Pitch stops short of the poles.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Moves toward the target by `steps` wheel notches.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance - steps * self.radius * 0.1)
            .clamp(self.radius * 0.5, self.radius * 8.0);
    }

    pub fn position(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target + self.distance * vec3(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: Vec3::Y,
            target: self.target,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_z_becomes_render_y() {
        let p = to_render(&Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p, vec3(1.0, 3.0, -2.0));
    }

    #[test]
    fn texture_colors_are_stable() {
        assert_eq!(texture_color("wswamp2_1"), texture_color("wswamp2_1"));
        let c = texture_color("sky4");
        assert!(c.r >= 60.0 / 255.0 && c.g >= 60.0 / 255.0 && c.b >= 60.0 / 255.0);
    }

    #[test]
    fn sample_map_reconstructs_cleanly() {
        let entities = qbrush::BrushAssembler::default()
            .assemble_map(SAMPLE_MAP)
            .unwrap();
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].brushes.len(), 3);
        assert_eq!(entities[1].classname, "func_detail");
        assert_eq!(entities[1].brushes.len(), 1);
        assert!(entities.iter().all(|e| e.failures.is_empty()));
    }

    #[test]
    fn camera_orbits_target() {
        let mut camera = OrbitCamera::framing(vec3(1.0, 2.0, 3.0), 4.0);
        camera.orbit(-0.6, -0.5);
        assert_eq!(camera.position(), vec3(1.0, 2.0, 13.0));
    }

    #[test]
    fn camera_frames_map_bounds() {
        let bounds = Aabb::from_points([Point3::origin(), Point3::new(2.0, 4.0, 6.0)]);
        let camera = OrbitCamera::around(bounds.as_ref());
        assert_eq!(camera.target(), vec3(1.0, 3.0, -2.0));

        let empty = OrbitCamera::around(None);
        assert_eq!(empty.target(), Vec3::ZERO);
        assert_eq!(empty.distance(), 12.5);
    }

    #[test]
    fn zoom_and_pitch_are_clamped() {
        let mut camera = OrbitCamera::framing(Vec3::ZERO, 4.0);
        camera.zoom(1000.0);
        assert_eq!(camera.distance(), 2.0);
        camera.zoom(-1000.0);
        assert_eq!(camera.distance(), 32.0);

        camera.orbit(0.0, 10.0);
        let up = camera.position();
        camera.orbit(0.0, 10.0);
        assert_eq!(camera.position(), up);
        assert!(up.y > 0.0);
    }
}

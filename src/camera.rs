//! Camera follow and clamping.

use macroquad::prelude::*;

/// Top-left corner of a viewport centred on the entity's midpoint.
pub fn compute_camera_position(
    entity_x: f64,
    entity_y: f64,
    entity_width: f64,
    entity_height: f64,
    viewport_width: f64,
    viewport_height: f64,
    zoom: f64,
) -> (f64, f64) {
    let cam_x = entity_x - viewport_width / (2.0 * zoom) + entity_width / 2.0;
    let cam_y = entity_y - viewport_height / (2.0 * zoom) + entity_height / 2.0;
    (cam_x, cam_y)
}

/// Keeps the viewport inside the map. The returned flag is set when the X
/// axis had to be clamped, i.e. the camera cannot follow horizontally.
pub fn clamp_camera(
    cam_x: f64,
    cam_y: f64,
    map_width: f64,
    map_height: f64,
    viewport_width: f64,
    viewport_height: f64,
    zoom: f64,
) -> (f64, f64, bool) {
    let max_x = (map_width - viewport_width / zoom).max(0.0);
    let max_y = (map_height - viewport_height / zoom).max(0.0);

    let x = cam_x.clamp(0.0, max_x);
    let y = cam_y.clamp(0.0, max_y);
    (x, y, x != cam_x)
}

/// Last clamped camera position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub locked: bool,
}

impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn follow(
        &mut self,
        entity_x: f64,
        entity_y: f64,
        entity_width: f64,
        entity_height: f64,
        map_width: f64,
        map_height: f64,
        viewport: (f64, f64),
        zoom: f64,
    ) {
        let (vw, vh) = viewport;
        let (cx, cy) =
            compute_camera_position(entity_x, entity_y, entity_width, entity_height, vw, vh, zoom);
        (self.x, self.y, self.locked) = clamp_camera(cx, cy, map_width, map_height, vw, vh, zoom);
    }

    pub fn offset(&self) -> Vec2 {
        vec2(self.x as f32, self.y as f32)
    }
}

mod canvas;
pub mod headless;
mod layer_cache;
mod macroquad_canvas;

pub use canvas::Canvas;
pub use headless::{DrawCall, HeadlessCanvas, HeadlessImage};
pub use layer_cache::{LayerCache, MAP_MAX_RENDER_SLOTS};
pub use macroquad_canvas::{MacroquadCanvas, MqImage, MAX_SURFACE_SIZE};

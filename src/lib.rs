//! Runtime of a small side-scrolling platformer built on Macroquad: Tiled
//! JSON levels with cached layer compositing, a gravity-driven player, a
//! following camera and parallax backgrounds.

mod aabb;
mod background;
mod camera;
mod config;
mod entity;
mod error;
mod game;
mod ir_map;
mod loader {
    pub mod json_loader;
}
mod map;
pub mod render;
mod spatial;

pub use aabb::Aabb;
pub use background::{parallax_velocities, Background, BACKGROUND_LAYERS};
pub use camera::{clamp_camera, compute_camera_position, Camera};
pub use config::{Config, VideoConfig};
pub use entity::{Animator, Entity, EntityConfig, EntityFlags, RespawnPolicy, SpriteAnimation};
pub use error::{Error, LoadError, RenderError};
pub use game::{
    frame_delay, Game, GameEvent, InputState, LoopControl, EXIT_FAILURE, EXIT_SUCCESS,
    FLOOR_TYPE, MAX_ZOOM, MIN_ZOOM, PLAYER_HEIGHT, PLAYER_SPAWN, PLAYER_WIDTH,
};
pub use ir_map::{IrLayer, IrMap, IrTileMetadata, IrTileset, MAX_GID};
pub use loader::json_loader::{decode_map_file_to_ir, parse_tiled_color};
pub use map::{MapLayer, TileMap, TilesetInfo};
pub use render::{Canvas, MAP_MAX_RENDER_SLOTS};
pub use spatial::{
    world_to_cell, CellCoord, PointMapping, TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK,
};

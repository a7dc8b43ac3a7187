// src/ir_map.rs
use macroquad::prelude::*;

/// Highest gid a level may reference. Keeps the gid lookup table small.
pub const MAX_GID: u32 = 1 << 20;

/// Canonical, format-agnostic map.
#[derive(Debug)]
pub struct IrMap {
    /// Grid size in tiles
    pub width: u32,
    pub height: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub background_color: Option<Color>,
    pub tilesets: Vec<IrTileset>, // must be sorted by first_gid
    pub layers: Vec<IrLayer>,     // draw order: array order
}

#[derive(Debug)]
pub enum IrTileset {
    /// One image atlas with a regular grid.
    Atlas {
        first_gid: u32,
        image: Option<String>,
        tile_w: u32,
        tile_h: u32,
        tilecount: u32,
        columns: u32,
        spacing: u32, // 0 if not used
        margin: u32,  // 0 if not used
        tiles: Vec<IrTileMetadata>,
    },
}

impl IrTileset {
    pub fn first_gid(&self) -> u32 {
        match self {
            IrTileset::Atlas { first_gid, .. } => *first_gid,
        }
    }

    /// One past the last gid, or `None` if the range overflows `u32`.
    pub fn end_gid(&self) -> Option<u32> {
        match self {
            IrTileset::Atlas {
                first_gid,
                tilecount,
                ..
            } => first_gid.checked_add(*tilecount),
        }
    }

    pub fn last_gid(&self) -> u32 {
        self.end_gid().unwrap_or(u32::MAX).saturating_sub(1)
    }
}

/// Per-tile data declared in a tileset (only tiles that declare something
/// are listed).
#[derive(Debug)]
pub struct IrTileMetadata {
    pub id: u32,
    /// Tiled "type" (or "class" in newer editors), e.g. `Floor`
    pub class_name: Option<String>,
}

#[derive(Debug)]
pub struct IrLayer {
    pub name: String,
    pub visible: bool,
    pub data: Vec<u32>, // raw GIDs (including flip flags ok)
}

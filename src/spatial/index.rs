use macroquad::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

pub const FLIP_H: u32 = 0x8000_0000; // bit 31
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits (bit 28 is free)

impl TileId {
    /// The gid with the flip flags masked off.
    #[inline]
    pub fn clean(self) -> u32 {
        self.0 & GID_MASK
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

/// How a world pixel coordinate is turned into a grid cell for type probes.
///
/// `Legacy` divides the horizontal axis by `tile_width + 1`, which shifts the
/// probe left by one column every `tile_width` columns. Existing levels were
/// tuned against it, so it stays the default until levels are re-tested with
/// `Exact`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointMapping {
    #[default]
    Legacy,
    Exact,
}

impl PointMapping {
    fn divisors(self, tile_w: u32, tile_h: u32) -> (f64, f64) {
        match self {
            PointMapping::Legacy => ((tile_w + 1) as f64, tile_h as f64),
            PointMapping::Exact => (tile_w as f64, tile_h as f64),
        }
    }
}

/// Maps a world pixel to a cell of a `grid_w` x `grid_h` grid, or `None` when
/// the point falls outside it.
pub fn world_to_cell(
    x: f64,
    y: f64,
    tile_w: u32,
    tile_h: u32,
    grid_w: u32,
    grid_h: u32,
    mapping: PointMapping,
) -> Option<CellCoord> {
    if tile_w == 0 || tile_h == 0 || !x.is_finite() || !y.is_finite() {
        return None;
    }
    let (dx, dy) = mapping.divisors(tile_w, tile_h);
    let cx = (x / dx).floor();
    let cy = (y / dy).floor();

    if cx < 0.0 || cy < 0.0 || cx >= grid_w as f64 || cy >= grid_h as f64 {
        return None;
    }
    Some(CellCoord {
        x: cx as u32,
        y: cy as u32,
    })
}

/// Source rectangle of a local tile index inside an atlas image.
pub fn atlas_source_rect(
    local: u32,
    columns: u32,
    tile_w: u32,
    tile_h: u32,
    spacing: u32,
    margin: u32,
) -> Rect {
    let cols = columns.max(1);
    let col = local % cols;
    let row = local / cols;
    let sx = margin + col * (tile_w + spacing);
    let sy = margin + row * (tile_h + spacing);
    Rect::new(sx as f32, sy as f32, tile_w as f32, tile_h as f32)
}

use crate::error::{Error, RenderError};
use crate::ir_map::*;
use crate::loader::json_loader::decode_map_file_to_ir;
use crate::render::{Canvas, LayerCache};
use crate::spatial::{atlas_source_rect, world_to_cell, PointMapping, TileId};
use macroquad::prelude::*;
use std::collections::HashMap;
use std::path::Path;

pub struct TilesetInfo {
    pub first_gid: u32,
    pub tilecount: u32,
    pub cols: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub spacing: u32,
    pub margin: u32,
    /// local tile id -> declared type
    types: HashMap<u32, String>,
}

pub struct MapLayer {
    pub name: String,
    pub visible: bool,
    pub cells: Vec<TileId>,
}

/// A loaded level: tile grid, named layers, tile types, the tileset image and
/// the per-slot cache of composited layer images.
pub struct TileMap<I> {
    /// Grid size in tiles
    pub width: u32,
    pub height: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub background_color: Option<Color>,
    /// World position of the map's top-left corner
    pub world_pos: Vec2,
    layers: Vec<MapLayer>,
    tilesets: Vec<TilesetInfo>,
    gid_lut: Vec<u16>,
    tileset_image: I,
    cache: LayerCache<I>,
    point_mapping: PointMapping,
}

impl<I> TileMap<I> {
    /// Loads a Tiled JSON map and the tileset image all tiles are cut from.
    pub fn load<C>(
        canvas: &mut C,
        map_path: impl AsRef<Path>,
        tileset_image: impl AsRef<Path>,
    ) -> Result<Self, Error>
    where
        C: Canvas<Image = I>,
    {
        let (ir, _) = decode_map_file_to_ir(map_path.as_ref())?;
        let image = canvas.load_image(tileset_image.as_ref())?;
        let map = Self::from_ir(ir, image);
        tracing::info!(
            map = %map_path.as_ref().display(),
            width = map.width,
            height = map.height,
            layers = map.layers.len(),
            "loaded map"
        );
        Ok(map)
    }

    pub fn from_ir(ir: IrMap, tileset_image: I) -> Self {
        let max_gid = ir
            .tilesets
            .iter()
            .map(IrTileset::last_gid)
            .max()
            .unwrap_or(0)
            .min(MAX_GID);
        let mut gid_lut = vec![u16::MAX; (max_gid + 1) as usize];
        let mut tilesets = Vec::with_capacity(ir.tilesets.len());

        for (i, t) in ir.tilesets.into_iter().enumerate() {
            match t {
                IrTileset::Atlas {
                    first_gid,
                    tile_w,
                    tile_h,
                    tilecount,
                    columns,
                    spacing,
                    margin,
                    tiles,
                    ..
                } => {
                    let end = first_gid.saturating_add(tilecount).min(max_gid + 1);
                    for gid in first_gid.max(1)..end {
                        gid_lut[gid as usize] = i as u16;
                    }
                    let types = tiles
                        .into_iter()
                        .filter_map(|tile| tile.class_name.map(|c| (tile.id, c)))
                        .collect();
                    tilesets.push(TilesetInfo {
                        first_gid,
                        tilecount,
                        cols: columns,
                        tile_w,
                        tile_h,
                        spacing,
                        margin,
                        types,
                    });
                }
            }
        }

        let layers = ir
            .layers
            .into_iter()
            .map(|l| MapLayer {
                name: l.name,
                visible: l.visible,
                cells: l.data.into_iter().map(TileId).collect(),
            })
            .collect();

        Self {
            width: ir.width,
            height: ir.height,
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
            background_color: ir.background_color,
            world_pos: Vec2::ZERO,
            layers,
            tilesets,
            gid_lut,
            tileset_image,
            cache: LayerCache::new(),
            point_mapping: PointMapping::default(),
        }
    }

    pub fn with_point_mapping(mut self, mapping: PointMapping) -> Self {
        self.point_mapping = mapping;
        self
    }

    #[inline]
    pub fn pixel_width(&self) -> u32 {
        self.width * self.tile_w
    }

    #[inline]
    pub fn pixel_height(&self) -> u32 {
        self.height * self.tile_h
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    #[inline]
    pub fn ts_for_gid(&self, gid: TileId) -> Option<(&TilesetInfo, u32)> {
        let clean = gid.clean() as usize;
        if clean == 0 || clean >= self.gid_lut.len() {
            return None;
        }
        let idx = self.gid_lut[clean];
        if idx == u16::MAX {
            return None;
        }
        let ts = &self.tilesets[idx as usize];
        Some((ts, gid.clean() - ts.first_gid))
    }

    /// Declared type of the tile a cell references, flip bits ignored.
    pub fn tile_type(&self, gid: TileId) -> Option<&str> {
        let (ts, local) = self.ts_for_gid(gid)?;
        ts.types.get(&local).map(String::as_str)
    }

    /// True if any layer (top to bottom, hidden layers included) has a tile
    /// of type `type_name` in the cell under world pixel `(x, y)`.
    pub fn is_point_of_type(&self, x: f64, y: f64, type_name: &str) -> bool {
        let Some(cell) = world_to_cell(
            x,
            y,
            self.tile_w,
            self.tile_h,
            self.width,
            self.height,
            self.point_mapping,
        ) else {
            return false;
        };
        let idx = (cell.y * self.width + cell.x) as usize;

        self.layers.iter().any(|layer| {
            layer
                .cells
                .get(idx)
                .is_some_and(|id| self.tile_type(*id) == Some(type_name))
        })
    }

    pub fn is_slot_rendered(&self, slot: usize) -> bool {
        self.cache.is_rendered(slot)
    }

    /// Number of expensive composite passes performed so far.
    pub fn composite_passes(&self) -> usize {
        self.cache.composite_passes()
    }

    /// Draws render slot `slot` relative to `camera`. On first use the slot
    /// is composited from every visible layer whose name contains
    /// `name_pattern`, optionally over the map's background color.
    pub fn render_layer<C>(
        &mut self,
        canvas: &mut C,
        slot: usize,
        name_pattern: &str,
        draw_background: bool,
        camera: Vec2,
    ) -> Result<(), Error>
    where
        C: Canvas<Image = I>,
    {
        if self.cache.get(slot)?.is_none() {
            let image = self.composite(canvas, name_pattern, draw_background)?;
            self.cache.store(slot, image)?;
            tracing::debug!(slot, name_pattern, "composited map layer");
        }

        let dest = Rect::new(
            self.world_pos.x - camera.x,
            self.world_pos.y - camera.y,
            self.pixel_width() as f32,
            self.pixel_height() as f32,
        );
        if let Some(image) = self.cache.get(slot)? {
            canvas.blit(image, None, dest, false)?;
        }
        Ok(())
    }

    fn composite<C>(
        &self,
        canvas: &mut C,
        name_pattern: &str,
        draw_background: bool,
    ) -> Result<I, Error>
    where
        C: Canvas<Image = I>,
    {
        let target = canvas.create_image(self.pixel_width(), self.pixel_height())?;
        canvas.set_target(Some(&target))?;
        let drawn = self.rasterize(canvas, name_pattern, draw_background);
        // Always hand the screen back, even when a blit failed.
        canvas.set_target(None)?;
        drawn?;
        Ok(target)
    }

    fn rasterize<C>(
        &self,
        canvas: &mut C,
        name_pattern: &str,
        draw_background: bool,
    ) -> Result<(), RenderError>
    where
        C: Canvas<Image = I>,
    {
        let fill = match self.background_color {
            Some(color) if draw_background => color,
            _ => BLANK,
        };
        canvas.fill(fill)?;

        let width = self.width.max(1) as usize;
        for layer in self
            .layers
            .iter()
            .filter(|l| l.visible && l.name.contains(name_pattern))
        {
            for (idx, id) in layer.cells.iter().enumerate() {
                let Some((ts, local)) = self.ts_for_gid(*id) else {
                    continue;
                };
                let src =
                    atlas_source_rect(local, ts.cols, ts.tile_w, ts.tile_h, ts.spacing, ts.margin);
                let col = (idx % width) as u32;
                let row = (idx / width) as u32;
                let dest = Rect::new(
                    (col * ts.tile_w) as f32,
                    (row * ts.tile_h) as f32,
                    ts.tile_w as f32,
                    ts.tile_h as f32,
                );
                // flip bits are masked off; tiles are drawn as stored in the atlas
                canvas.blit(&self.tileset_image, Some(src), dest, false)?;
            }
        }
        Ok(())
    }

    /// Releases map data, cached layer images and the tileset image.
    pub fn unload(self) {
        tracing::debug!(cached = self.cache.composite_passes(), "unloading map");
    }
}

// src/loader/json_loader.rs
use crate::error::LoadError;
use crate::ir_map::*;
use crate::spatial::GID_MASK;
use macroquad::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    inline: JsonTileset,
}

#[derive(Deserialize)]
struct JsonMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    infinite: bool,
    #[serde(default)]
    backgroundcolor: Option<String>,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
}

#[derive(Deserialize, Default)]
struct JsonTileset {
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    tiles: Vec<JsonTile>,
}

#[derive(Deserialize)]
struct JsonTile {
    id: u32,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    class: Option<String>,
}

/// Parses `#RRGGBB` or `#AARRGGBB` as written by Tiled.
pub fn parse_tiled_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    let v = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        6 => Some(Color::from_rgba(
            ((v >> 16) & 0xFF) as u8,
            ((v >> 8) & 0xFF) as u8,
            (v & 0xFF) as u8,
            255,
        )),
        8 => Some(Color::from_rgba(
            ((v >> 16) & 0xFF) as u8,
            ((v >> 8) & 0xFF) as u8,
            (v & 0xFF) as u8,
            ((v >> 24) & 0xFF) as u8,
        )),
        _ => None,
    }
}

fn tileset_to_ir(first_gid: u32, ts: JsonTileset) -> IrTileset {
    IrTileset::Atlas {
        first_gid,
        image: ts.image,
        tile_w: ts.tilewidth,
        tile_h: ts.tileheight,
        tilecount: ts.tilecount,
        columns: ts.columns,
        spacing: ts.spacing,
        margin: ts.margin,
        tiles: ts
            .tiles
            .into_iter()
            .map(|tile| IrTileMetadata {
                id: tile.id,
                // Tiled 1.9 renamed "type" to "class"
                class_name: tile
                    .class
                    .filter(|c| !c.is_empty())
                    .or(tile.kind.filter(|k| !k.is_empty())),
            })
            .collect(),
    }
}

fn check_gid_range(path: &Path, tileset: &IrTileset) -> Result<(), LoadError> {
    let IrTileset::Atlas {
        first_gid,
        tilecount,
        ..
    } = tileset;
    let problem = match tileset.end_gid() {
        _ if *first_gid == 0 => "firstgid must be at least 1",
        _ if *tilecount == 0 => "tileset has no tiles",
        Some(end) if end <= MAX_GID + 1 => return Ok(()),
        _ => "gid range is too large",
    };
    Err(LoadError::InvalidMap(format!(
        "{}: tileset at firstgid {} with {} tiles: {}",
        path.display(),
        first_gid,
        tilecount,
        problem
    )))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, LoadError> {
    let txt = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn decode_map_file_to_ir(path: &Path) -> Result<(IrMap, PathBuf), LoadError> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(LoadError::UnsupportedFormat(path.display().to_string()));
    }

    let j: JsonMap = read_json(path)?;

    let map_dir = path
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    if j.infinite {
        return Err(LoadError::InvalidMap(format!(
            "{}: infinite maps are not supported",
            path.display()
        )));
    }
    if j.width == 0 || j.height == 0 || j.tilewidth == 0 || j.tileheight == 0 {
        return Err(LoadError::InvalidMap(format!(
            "{}: map and tile dimensions must be non-zero",
            path.display()
        )));
    }

    // Build IR tilesets
    let mut ir_tilesets = Vec::with_capacity(j.tilesets.len());
    for ts in j.tilesets {
        let def = match ts.source {
            Some(source) => {
                if !source.ends_with(".json") {
                    return Err(LoadError::UnsupportedFormat(source));
                }
                read_json::<JsonTileset>(&map_dir.join(&source))?
            }
            None => ts.inline,
        };
        let tileset = tileset_to_ir(ts.firstgid, def);
        check_gid_range(path, &tileset)?;
        ir_tilesets.push(tileset);
    }

    // Sort by first_gid to make LUT building trivial
    ir_tilesets.sort_by_key(IrTileset::first_gid);

    let max_gid = ir_tilesets.iter().map(IrTileset::last_gid).max().unwrap_or(0);

    // Build IR layers
    let expected = (j.width as usize) * (j.height as usize);
    let mut ir_layers = Vec::with_capacity(j.layers.len());
    for l in j.layers {
        if l.kind.as_deref().unwrap_or("tilelayer") != "tilelayer" {
            continue;
        }
        if let Some(enc) = l.encoding.as_deref().filter(|e| *e != "csv") {
            return Err(LoadError::InvalidMap(format!(
                "layer '{}' uses unsupported encoding '{}'",
                l.name, enc
            )));
        }
        if l.data.len() != expected {
            return Err(LoadError::InvalidLayerSize {
                layer: l.name,
                expected,
                actual: l.data.len(),
            });
        }
        for &raw_gid in &l.data {
            let gid = raw_gid & GID_MASK;
            if gid != 0 && gid > max_gid {
                return Err(LoadError::InvalidTileGid {
                    layer: l.name.clone(),
                    gid,
                    max_gid,
                });
            }
        }
        ir_layers.push(IrLayer {
            name: l.name,
            visible: l.visible,
            data: l.data,
        });
    }

    Ok((
        IrMap {
            width: j.width,
            height: j.height,
            tile_w: j.tilewidth,
            tile_h: j.tileheight,
            background_color: j.backgroundcolor.as_deref().and_then(parse_tiled_color),
            tilesets: ir_tilesets,
            layers: ir_layers,
        },
        map_dir,
    ))
}

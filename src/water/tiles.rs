// src/water/tiles.rs
// Scene/tile descriptors, `_Water` mask discovery, and the mask loading seam
// Discovery only looks up companion files; decoding happens in the compositor
// RELEVANT FILES: src/water/compositor.rs, src/water/populate.rs, tests/test_water_compositor.rs

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{WaterError, WaterResult};

/// Extensions tried for a companion water mask, in order.
pub const MASK_EXTENSIONS: [&str; 3] = ["png", "webp", "jpg"];
pub const MASK_SUFFIX: &str = "_Water";

/// Tile placement in scene pixel space (Y down). Rotation is about the tile center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub rotation_deg: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileElevation {
    pub floor_index: usize,
}

/// A scene tile as handed over by the scene composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneTile {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub rotation_deg: f32,
    pub texture_path: String,
    #[serde(default)]
    pub elevation: Option<TileElevation>,
}

impl SceneTile {
    pub fn rect(&self) -> TileRect {
        TileRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation_deg: self.rotation_deg,
        }
    }

    /// Tiles without elevation data live on the ground floor.
    pub fn floor_index(&self) -> usize {
        self.elevation.map(|e| e.floor_index).unwrap_or(0)
    }
}

/// Scene rectangle in scene pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SceneRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

impl Default for SceneRect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

/// Scene rect plus the world height used to flip world Y into scene Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneGeometry {
    pub rect: SceneRect,
    pub world_height: f32,
}

impl SceneGeometry {
    /// Scene covering the whole world with no padding.
    pub fn unpadded(width: f32, height: f32) -> Self {
        Self {
            rect: SceneRect::new(0.0, 0.0, width, height),
            world_height: height,
        }
    }
}

impl Default for SceneGeometry {
    fn default() -> Self {
        Self::unpadded(1.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    pub geometry: SceneGeometry,
    #[serde(default)]
    pub tiles: Vec<SceneTile>,
}

/// A tile with a discovered water mask. Immutable after discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterTile {
    pub tile_id: String,
    pub base_path: String,
    pub floor_index: usize,
    pub mask_path: String,
    pub rect: TileRect,
}

/// Existence check and decode for mask files.
pub trait MaskLoader: Send + Sync {
    fn exists(&self, path: &str) -> bool;
    fn load(&self, path: &str) -> WaterResult<RgbaImage>;
}

/// Loads masks from the local filesystem, optionally relative to a root directory.
#[derive(Debug, Clone, Default)]
pub struct FsMaskLoader {
    root: Option<PathBuf>,
}

impl FsMaskLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }
}

impl MaskLoader for FsMaskLoader {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn load(&self, path: &str) -> WaterResult<RgbaImage> {
        let full = self.resolve(path);
        let img = image::open(&full)
            .map_err(|e| WaterError::load(format!("{}: {}", full.display(), e)))?;
        Ok(img.to_rgba8())
    }
}

/// Texture path with its extension removed. Directory dots are left alone.
pub fn strip_extension(path: &str) -> &str {
    let file_start = path.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    }
}

/// First existing `<base>_Water.<ext>` candidate for a tile texture.
pub fn find_mask_path(texture_path: &str, loader: &dyn MaskLoader) -> Option<String> {
    let base = strip_extension(texture_path);
    MASK_EXTENSIONS
        .iter()
        .map(|ext| format!("{base}{MASK_SUFFIX}.{ext}"))
        .find(|candidate| loader.exists(candidate))
}

/// Probe every tile for a companion mask; tiles without one are skipped.
pub fn discover_water_tiles(tiles: &[SceneTile], loader: &dyn MaskLoader) -> Vec<WaterTile> {
    tiles
        .iter()
        .filter(|t| !t.texture_path.is_empty())
        .filter_map(|tile| {
            let mask_path = find_mask_path(&tile.texture_path, loader)?;
            Some(WaterTile {
                tile_id: tile.id.clone(),
                base_path: strip_extension(&tile.texture_path).to_string(),
                floor_index: tile.floor_index(),
                mask_path,
                rect: tile.rect(),
            })
        })
        .collect()
}

/// Group discovered tiles by floor, preserving scene order within a floor.
pub fn group_by_floor(tiles: &[WaterTile]) -> BTreeMap<usize, Vec<WaterTile>> {
    let mut floors: BTreeMap<usize, Vec<WaterTile>> = BTreeMap::new();
    for tile in tiles {
        floors.entry(tile.floor_index).or_default().push(tile.clone());
    }
    floors
}

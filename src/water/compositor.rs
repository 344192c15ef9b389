// src/water/compositor.rs
// Per-floor compositing of tile-local water masks into one scene-space canvas
// Loads decode in parallel on the blocking pool; painting follows tile order
// RELEVANT FILES: src/water/tiles.rs, src/water/populate.rs, tests/test_water_compositor.rs

use glam::Vec2;
use image::RgbaImage;
use log::warn;
use std::sync::Arc;
use tokio::task::JoinSet;

use super::surface::{MAX_SURFACE_RESOLUTION, MIN_SURFACE_RESOLUTION};
use super::tiles::{MaskLoader, SceneRect, TileRect, WaterTile};
use crate::error::{WaterError, WaterResult};

/// Canvas plus load statistics for one floor.
#[derive(Debug, Clone)]
pub struct FloorComposite {
    /// `None` when every mask failed to load.
    pub canvas: Option<RgbaImage>,
    pub tiles_loaded: usize,
    pub tiles_failed: usize,
}

/// Canvas dimensions for a scene: longest side equals the build resolution.
pub fn canvas_size(scene: &SceneRect, build_resolution: u32) -> (u32, u32) {
    let res = build_resolution.clamp(MIN_SURFACE_RESOLUTION, MAX_SURFACE_RESOLUTION) as f32;
    let longest = scene.width.max(scene.height);
    let scale = res / longest;
    let w = ((scene.width * scale).round() as u32).clamp(1, MAX_SURFACE_RESOLUTION);
    let h = ((scene.height * scale).round() as u32).clamp(1, MAX_SURFACE_RESOLUTION);
    (w, h)
}

/// Composite every mask of a floor into a scene canvas.
///
/// Returns `Ok(None)` when every load failed. Identical inputs produce
/// byte-identical canvases.
pub async fn composite_floor(
    entries: &[WaterTile],
    scene: SceneRect,
    build_resolution: u32,
    loader: Arc<dyn MaskLoader>,
) -> WaterResult<Option<RgbaImage>> {
    Ok(composite_floor_counted(entries, scene, build_resolution, loader)
        .await?
        .canvas)
}

/// [`composite_floor`] that also reports how many tiles loaded.
pub async fn composite_floor_counted(
    entries: &[WaterTile],
    scene: SceneRect,
    build_resolution: u32,
    loader: Arc<dyn MaskLoader>,
) -> WaterResult<FloorComposite> {
    if !scene.is_valid() {
        return Err(WaterError::build(format!(
            "scene rect must have positive size, got {}x{}",
            scene.width, scene.height
        )));
    }

    let masks = load_masks(entries, loader).await;
    let tiles_loaded = masks.iter().filter(|m| m.is_some()).count();
    let tiles_failed = entries.len() - tiles_loaded;
    if tiles_loaded == 0 {
        return Ok(FloorComposite {
            canvas: None,
            tiles_loaded,
            tiles_failed,
        });
    }

    let (w, h) = canvas_size(&scene, build_resolution);
    let mut canvas = RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 0, 255]));
    let scale = Vec2::new(w as f32 / scene.width, h as f32 / scene.height);

    for (entry, mask) in entries.iter().zip(masks.iter()) {
        if let Some(mask) = mask {
            paint_tile(&mut canvas, mask, &entry.rect, &scene, scale);
        }
    }

    Ok(FloorComposite {
        canvas: Some(canvas),
        tiles_loaded,
        tiles_failed,
    })
}

async fn load_masks(entries: &[WaterTile], loader: Arc<dyn MaskLoader>) -> Vec<Option<RgbaImage>> {
    let mut set = JoinSet::new();
    for (idx, entry) in entries.iter().enumerate() {
        let loader = Arc::clone(&loader);
        let path = entry.mask_path.clone();
        set.spawn_blocking(move || (idx, loader.load(&path)));
    }

    let mut out: Vec<Option<RgbaImage>> = vec![None; entries.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, Ok(img))) if img.width() > 0 && img.height() > 0 => out[idx] = Some(img),
            Ok((idx, Ok(_))) => {
                warn!("water: mask {} is empty; skipping tile", entries[idx].mask_path);
            }
            Ok((idx, Err(e))) => {
                warn!(
                    "water: failed to load mask for tile {}: {}; skipping",
                    entries[idx].tile_id, e
                );
            }
            Err(e) => warn!("water: mask load task aborted: {}", e),
        }
    }
    out
}

/// Paint one mask source-over into the canvas at its rotated tile rect.
fn paint_tile(canvas: &mut RgbaImage, mask: &RgbaImage, rect: &TileRect, scene: &SceneRect, scale: Vec2) {
    let size = Vec2::new(rect.width, rect.height) * scale;
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    let origin = Vec2::new(rect.x - scene.x, rect.y - scene.y) * scale;
    let center = origin + size * 0.5;

    let theta = rect.rotation_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    let rotate = |v: Vec2| Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos);
    let unrotate = |v: Vec2| Vec2::new(v.x * cos + v.y * sin, -v.x * sin + v.y * cos);

    let half = size * 0.5;
    let corners = [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ]
    .map(|c| center + rotate(c));
    let min = corners.iter().fold(Vec2::splat(f32::MAX), |a, c| a.min(*c));
    let max = corners.iter().fold(Vec2::splat(f32::MIN), |a, c| a.max(*c));

    let (cw, ch) = canvas.dimensions();
    let x0 = min.x.floor().max(0.0) as u32;
    let y0 = min.y.floor().max(0.0) as u32;
    let x1 = (max.x.ceil().max(0.0) as u32).min(cw);
    let y1 = (max.y.ceil().max(0.0) as u32).min(ch);

    let (mw, mh) = (mask.width() as f32, mask.height() as f32);
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let local = unrotate(p - center) + half;
            let uv = local / size;
            if uv.x < 0.0 || uv.y < 0.0 || uv.x >= 1.0 || uv.y >= 1.0 {
                continue;
            }
            let src = sample_bilinear(mask, uv.x * mw - 0.5, uv.y * mh - 0.5);
            let a = src[3] / 255.0;
            if a <= 0.0 {
                continue;
            }
            let dst = canvas.get_pixel_mut(x, y);
            for c in 0..3 {
                let v = src[c] * a + dst.0[c] as f32 * (1.0 - a);
                dst.0[c] = v.round().clamp(0.0, 255.0) as u8;
            }
            let out_a = a * 255.0 + dst.0[3] as f32 * (1.0 - a);
            dst.0[3] = out_a.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Clamp-to-edge bilinear fetch returning un-normalized channels.
fn sample_bilinear(img: &RgbaImage, fx: f32, fy: f32) -> [f32; 4] {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let fetch = |x: i64, y: i64| img.get_pixel(x.clamp(0, w - 1) as u32, y.clamp(0, h - 1) as u32).0;
    let (xi, yi) = (x0 as i64, y0 as i64);
    let p00 = fetch(xi, yi);
    let p10 = fetch(xi + 1, yi);
    let p01 = fetch(xi, yi + 1);
    let p11 = fetch(xi + 1, yi + 1);
    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
        let bottom = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
        out[c] = top * (1.0 - ty) + bottom * ty;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_keeps_scene_aspect() {
        let scene = SceneRect::new(0.0, 0.0, 4000.0, 2000.0);
        assert_eq!(canvas_size(&scene, 1024), (1024, 512));
        assert_eq!(canvas_size(&scene, 100_000), (2048, 1024));
        assert_eq!(canvas_size(&scene, 1), (16, 8));
    }

    #[test]
    fn quarter_turn_swaps_footprint() {
        let scene = SceneRect::new(0.0, 0.0, 100.0, 100.0);
        let mut canvas = RgbaImage::from_pixel(100, 100, image::Rgba([0, 0, 0, 255]));
        let mask = RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 255]));
        let rect = TileRect {
            x: 30.0,
            y: 45.0,
            width: 40.0,
            height: 10.0,
            rotation_deg: 90.0,
        };
        paint_tile(&mut canvas, &mask, &rect, &scene, Vec2::ONE);
        // Rotated footprint is 10 wide, 40 tall around (50, 50)
        assert_eq!(canvas.get_pixel(50, 32).0[0], 255);
        assert_eq!(canvas.get_pixel(50, 67).0[0], 255);
        assert_eq!(canvas.get_pixel(35, 50).0[0], 0);
        assert_eq!(canvas.get_pixel(64, 50).0[0], 0);
    }

    #[test]
    fn transparent_mask_leaves_canvas_untouched() {
        let scene = SceneRect::new(0.0, 0.0, 10.0, 10.0);
        let mut canvas = RgbaImage::from_pixel(10, 10, image::Rgba([0, 0, 0, 255]));
        let mask = RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 0]));
        let rect = TileRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            rotation_deg: 0.0,
        };
        paint_tile(&mut canvas, &mask, &rect, &scene, Vec2::ONE);
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }
}

// src/water/populate.rs
// Scene -> per-floor SurfaceData build with generation tickets for late completions
// CPU-only so it can run off the render thread; WaterPass uploads the results
// RELEVANT FILES: src/water/compositor.rs, src/water/surface.rs, src/water/pass.rs

use image::RgbaImage;
use log::{info, warn};
use std::sync::Arc;

use super::compositor::composite_floor_counted;
use super::surface::{SurfaceBuildOptions, SurfaceData, SurfaceModel};
use super::tiles::{discover_water_tiles, group_by_floor, MaskLoader, SceneDescriptor};
use crate::error::{WaterError, WaterResult};

/// Identifies one populate request. A ticket older than the pass's current
/// generation is discarded on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateTicket {
    pub(crate) generation: u64,
}

impl PopulateTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Built water data for one floor.
#[derive(Debug, Clone)]
pub struct FloorSurface {
    pub floor_index: usize,
    /// Composited scene-space mask before binarization.
    pub raw_mask: RgbaImage,
    pub surface: SurfaceData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub floors_built: usize,
    pub floors_skipped: usize,
    pub tiles_loaded: usize,
    pub tiles_failed: usize,
}

/// Discover water tiles, composite each floor and build its surface.
///
/// Floors whose masks all fail to load, whose surface build fails, or which
/// contain no water are skipped and counted. Only an unusable scene rect is
/// an error.
pub async fn build_floor_surfaces(
    scene: &SceneDescriptor,
    options: &SurfaceBuildOptions,
    loader: Arc<dyn MaskLoader>,
) -> WaterResult<(Vec<FloorSurface>, PopulateReport)> {
    let rect = scene.geometry.rect;
    if !rect.is_valid() {
        return Err(WaterError::build(format!(
            "water: scene rect must have positive size, got {}x{}",
            rect.width, rect.height
        )));
    }

    let options = options.clamped();
    let water_tiles = discover_water_tiles(&scene.tiles, loader.as_ref());
    let mut report = PopulateReport::default();
    let mut floors = Vec::new();

    for (floor_index, entries) in group_by_floor(&water_tiles) {
        let composite =
            composite_floor_counted(&entries, rect, options.resolution, loader.clone()).await?;
        report.tiles_loaded += composite.tiles_loaded;
        report.tiles_failed += composite.tiles_failed;

        let Some(raw_mask) = composite.canvas else {
            warn!("water: floor {floor_index} skipped, no mask of {} loaded", entries.len());
            report.floors_skipped += 1;
            continue;
        };

        match SurfaceModel::build(&raw_mask, &options) {
            Ok(surface) if surface.has_water => {
                floors.push(FloorSurface {
                    floor_index,
                    raw_mask,
                    surface,
                });
                report.floors_built += 1;
            }
            Ok(_) => {
                info!("water: floor {floor_index} mask has no water pixels");
                report.floors_skipped += 1;
            }
            Err(e) => {
                warn!("water: floor {floor_index} surface build failed: {e}");
                report.floors_skipped += 1;
            }
        }
    }

    info!(
        "water: populate built {} floor(s), skipped {}, tiles {} loaded / {} failed",
        report.floors_built, report.floors_skipped, report.tiles_loaded, report.tiles_failed
    );
    Ok((floors, report))
}

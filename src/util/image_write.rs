//! PNG encoding utilities for writing tightly packed RGBA buffers.
//!
//! Used by the bake tool to dump SurfaceData and channel previews.

use anyhow::{ensure, Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageEncoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Number of channels in RGBA8 format.
const RGBA8_CHANNELS: usize = 4;

/// Write PNG with default compression and adaptive filtering.
///
/// Surface data compresses well; baked files are kept small.
pub fn write_png_rgba8(path: &Path, data: &[u8], width: u32, height: u32) -> Result<()> {
    let expected = compute_expected_buffer_size(width, height)?;

    ensure!(
        data.len() == expected,
        "PNG writer requires tight RGBA8 buffer: expected {} bytes, got {}",
        expected,
        data.len()
    );

    let file = File::create(path)
        .with_context(|| format!("failed to create output PNG at {}", path.display()))?;

    let encoder = PngEncoder::new_with_quality(
        BufWriter::new(file),
        CompressionType::Default,
        FilterType::Adaptive,
    );
    encoder
        .write_image(data, width, height, ColorType::Rgba8)
        .context("failed to encode RGBA8 PNG")?;

    Ok(())
}

/// Compute expected buffer size with overflow checking.
fn compute_expected_buffer_size(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(RGBA8_CHANNELS))
        .ok_or_else(|| anyhow::anyhow!("image dimensions overflow when computing buffer size"))
}

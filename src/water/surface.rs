// src/water/surface.rs
// Binary water mask -> SurfaceData texture (signed distance, shore exposure, flow)
// Runs once per floor on the CPU during populate; output is uploaded as RGBA8
// RELEVANT FILES: src/water/distance.rs, src/water/populate.rs, src/shaders/water.frag, src/cli/bake.rs

use glam::Vec2;
use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::distance::distance_to;
use crate::error::{WaterError, WaterResult};

/// Longest side accepted for a SurfaceData texture.
pub const MAX_SURFACE_RESOLUTION: u32 = 2048;
pub const MIN_SURFACE_RESOLUTION: u32 = 16;

/// Mask channel used for binarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskChannel {
    /// Channel with the highest variance among R, G, B, A
    #[default]
    Auto,
    Red,
    Green,
    Blue,
    Alpha,
    Luma,
}

impl FromStr for MaskChannel {
    type Err = WaterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(MaskChannel::Auto),
            "red" | "r" => Ok(MaskChannel::Red),
            "green" | "g" => Ok(MaskChannel::Green),
            "blue" | "b" => Ok(MaskChannel::Blue),
            "alpha" | "a" => Ok(MaskChannel::Alpha),
            "luma" | "luminance" => Ok(MaskChannel::Luma),
            other => Err(WaterError::config(format!("unknown mask channel '{other}'"))),
        }
    }
}

/// Options for [`SurfaceModel::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceBuildOptions {
    pub resolution: u32,
    pub threshold: f32,
    pub channel: MaskChannel,
    pub invert: bool,
    pub blur_radius: u32,
    pub blur_passes: u32,
    pub expand_px: f32,
    pub sdf_range_px: f32,
    pub exposure_width_px: f32,
}

impl Default for SurfaceBuildOptions {
    fn default() -> Self {
        Self {
            resolution: 1024,
            threshold: 0.5,
            channel: MaskChannel::Auto,
            invert: false,
            blur_radius: 0,
            blur_passes: 0,
            expand_px: 0.0,
            sdf_range_px: 32.0,
            exposure_width_px: 24.0,
        }
    }
}

impl SurfaceBuildOptions {
    /// Copy with every field inside its working range.
    pub fn clamped(&self) -> Self {
        let sdf_range_px = self.sdf_range_px.clamp(1.0, 512.0);
        Self {
            resolution: self
                .resolution
                .clamp(MIN_SURFACE_RESOLUTION, MAX_SURFACE_RESOLUTION),
            threshold: self.threshold.clamp(0.0, 1.0),
            channel: self.channel,
            invert: self.invert,
            blur_radius: self.blur_radius.min(64),
            blur_passes: self.blur_passes.min(8),
            expand_px: self.expand_px.clamp(-256.0, 256.0),
            sdf_range_px,
            exposure_width_px: self.exposure_width_px.clamp(0.0, sdf_range_px),
        }
    }
}

/// Four-channel surface texture for one floor.
///
/// R = signed distance remapped to [0,1] (0.5 on the shore, below 0.5 inside),
/// G = shore exposure, B/A = unit flow vector encoded as `(f+1)/2`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub has_water: bool,
    pub sdf_range_px: f32,
}

impl SurfaceData {
    fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y.min(self.height - 1) * self.width + x.min(self.width - 1)) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn sdf01(&self, x: u32, y: u32) -> f32 {
        self.texel(x, y)[0] as f32 / 255.0
    }

    pub fn exposure01(&self, x: u32, y: u32) -> f32 {
        self.texel(x, y)[1] as f32 / 255.0
    }

    /// Decoded flow vector; near-zero encodings snap to zero.
    pub fn flow(&self, x: u32, y: u32) -> Vec2 {
        let t = self.texel(x, y);
        let f = Vec2::new(decode_signed(t[2]), decode_signed(t[3]));
        if f.length() < 0.02 {
            Vec2::ZERO
        } else {
            f
        }
    }

    /// Signed distance in pixels reconstructed from R (negative inside).
    pub fn signed_distance_px(&self, x: u32, y: u32) -> f32 {
        (self.sdf01(x, y) - 0.5) * 2.0 * self.sdf_range_px
    }

    pub fn is_inside(&self, x: u32, y: u32) -> bool {
        self.sdf01(x, y) < 0.5
    }

    pub fn to_image(&self) -> WaterResult<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| WaterError::build("surface buffer does not match its dimensions"))
    }

    /// Grayscale preview of one channel (0 = R .. 3 = A).
    pub fn channel_preview(&self, channel: usize) -> RgbaImage {
        let c = channel.min(3);
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let v = self.texel(x, y)[c];
            image::Rgba([v, v, v, 255])
        })
    }
}

fn decode_signed(b: u8) -> f32 {
    b as f32 / 255.0 * 2.0 - 1.0
}

fn encode_unit(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    if e1 <= e0 {
        return if x >= e1 { 1.0 } else { 0.0 };
    }
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Builds [`SurfaceData`] from composited water masks.
pub struct SurfaceModel;

impl SurfaceModel {
    pub fn build(mask: &RgbaImage, options: &SurfaceBuildOptions) -> WaterResult<SurfaceData> {
        if mask.width() == 0 || mask.height() == 0 {
            return Err(WaterError::build("mask has zero size"));
        }
        let opts = options.clamped();

        let fitted = fit_to_resolution(mask, opts.resolution);
        let (w, h) = (fitted.width() as usize, fitted.height() as usize);

        let mut inside = binarize(&fitted, opts.channel, opts.threshold, opts.invert);
        if opts.blur_radius > 0 && opts.blur_passes > 0 {
            inside = blur_rebinarize(&inside, w, h, opts.blur_radius as usize, opts.blur_passes);
        }
        if opts.expand_px != 0.0 {
            inside = expand(&inside, w, h, opts.expand_px);
        }

        let has_water = inside.iter().any(|&v| v);
        let sd = signed_distance(&inside, w, h, opts.sdf_range_px);
        let pixels = encode_surface(&sd, w, h, opts.sdf_range_px, opts.exposure_width_px);

        Ok(SurfaceData {
            width: w as u32,
            height: h as u32,
            pixels,
            has_water,
            sdf_range_px: opts.sdf_range_px,
        })
    }
}

/// Resize so the longest side equals `resolution`, preserving aspect.
pub(crate) fn fit_to_resolution(mask: &RgbaImage, resolution: u32) -> RgbaImage {
    let (w, h) = mask.dimensions();
    let longest = w.max(h);
    if longest == resolution {
        return mask.clone();
    }
    let scale = resolution as f64 / longest as f64;
    let nw = ((w as f64 * scale).round() as u32).max(1);
    let nh = ((h as f64 * scale).round() as u32).max(1);
    imageops::resize(mask, nw, nh, imageops::FilterType::Triangle)
}

/// Channel with the highest variance among R, G, B, A (first wins ties).
pub(crate) fn auto_channel(img: &RgbaImage) -> MaskChannel {
    let n = (img.width() as f64) * (img.height() as f64);
    let mut sum = [0.0f64; 4];
    let mut sum_sq = [0.0f64; 4];
    for px in img.pixels() {
        for c in 0..4 {
            let v = px.0[c] as f64;
            sum[c] += v;
            sum_sq[c] += v * v;
        }
    }
    let mut best = 0usize;
    let mut best_var = -1.0f64;
    for c in 0..4 {
        let mean = sum[c] / n;
        let var = sum_sq[c] / n - mean * mean;
        if var > best_var + 1e-9 {
            best_var = var;
            best = c;
        }
    }
    match best {
        0 => MaskChannel::Red,
        1 => MaskChannel::Green,
        2 => MaskChannel::Blue,
        _ => MaskChannel::Alpha,
    }
}

pub(crate) fn binarize(
    img: &RgbaImage,
    channel: MaskChannel,
    threshold: f32,
    invert: bool,
) -> Vec<bool> {
    let channel = match channel {
        MaskChannel::Auto => auto_channel(img),
        other => other,
    };
    img.pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            let v = match channel {
                MaskChannel::Red | MaskChannel::Auto => r as f32,
                MaskChannel::Green => g as f32,
                MaskChannel::Blue => b as f32,
                MaskChannel::Alpha => a as f32,
                MaskChannel::Luma => 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32,
            } / 255.0;
            (v > threshold) != invert
        })
        .collect()
}

fn blur_rebinarize(mask: &[bool], w: usize, h: usize, radius: usize, passes: u32) -> Vec<bool> {
    let mut field: Vec<f32> = mask.iter().map(|&v| if v { 1.0 } else { 0.0 }).collect();
    let mut tmp = vec![0.0f32; field.len()];
    for _ in 0..passes {
        box_blur_h(&field, &mut tmp, w, h, radius);
        box_blur_v(&tmp, &mut field, w, h, radius);
    }
    field.into_iter().map(|v| v >= 0.5).collect()
}

fn box_blur_h(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: usize) {
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let lo = x.saturating_sub(r);
            let hi = (x + r).min(w - 1);
            let sum: f32 = row[lo..=hi].iter().sum();
            dst[y * w + x] = sum / (hi - lo + 1) as f32;
        }
    }
}

fn box_blur_v(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: usize) {
    for x in 0..w {
        for y in 0..h {
            let lo = y.saturating_sub(r);
            let hi = (y + r).min(h - 1);
            let sum: f32 = (lo..=hi).map(|yy| src[yy * w + x]).sum();
            dst[y * w + x] = sum / (hi - lo + 1) as f32;
        }
    }
}

/// Dilate (positive) or erode (negative) by a Euclidean radius.
pub(crate) fn expand(mask: &[bool], w: usize, h: usize, px: f32) -> Vec<bool> {
    if px > 0.0 {
        let d = distance_to(mask, w, h);
        d.into_iter().map(|v| v <= px).collect()
    } else {
        let outside: Vec<bool> = mask.iter().map(|&v| !v).collect();
        let d = distance_to(&outside, w, h);
        mask.iter()
            .zip(d)
            .map(|(&m, v)| m && v > -px)
            .collect()
    }
}

/// Signed distance in pixels, boundary half a pixel from cell centers,
/// negative inside and clamped to ±range.
pub(crate) fn signed_distance(inside: &[bool], w: usize, h: usize, range: f32) -> Vec<f32> {
    let outside: Vec<bool> = inside.iter().map(|&v| !v).collect();
    let d_out = distance_to(inside, w, h);
    let d_in = distance_to(&outside, w, h);
    inside
        .iter()
        .enumerate()
        .map(|(i, &is_in)| {
            let sd = if is_in { -(d_in[i] - 0.5) } else { d_out[i] - 0.5 };
            if sd.is_finite() {
                sd.clamp(-range, range)
            } else if is_in {
                -range
            } else {
                range
            }
        })
        .collect()
}

fn encode_surface(sd: &[f32], w: usize, h: usize, range: f32, exposure_width: f32) -> Vec<u8> {
    let mut out = vec![0u8; w * h * 4];
    let at = |x: isize, y: isize| -> f32 {
        let cx = x.clamp(0, w as isize - 1) as usize;
        let cy = y.clamp(0, h as isize - 1) as usize;
        sd[cy * w + cx]
    };

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let d = sd[i];
            let inside_dist = (-d).max(0.0);
            let exposure = if d < 0.0 {
                smoothstep(0.0, exposure_width, inside_dist)
            } else {
                0.0
            };

            // Saturated distance means no shore within range: flow is zero
            let mut flow = Vec2::ZERO;
            if d.abs() < range {
                let (xi, yi) = (x as isize, y as isize);
                let g = Vec2::new(
                    at(xi + 1, yi) - at(xi - 1, yi),
                    at(xi, yi + 1) - at(xi, yi - 1),
                );
                if g.length() > 1e-6 {
                    flow = g.normalize();
                }
            }

            let o = i * 4;
            out[o] = encode_unit(0.5 + 0.5 * d / range);
            out[o + 1] = encode_unit(exposure);
            out[o + 2] = encode_unit((flow.x + 1.0) * 0.5);
            out[o + 3] = encode_unit((flow.y + 1.0) * 0.5);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc_mask(size: u32, radius: f32) -> RgbaImage {
        let c = size as f32 / 2.0;
        RgbaImage::from_fn(size, size, |x, y| {
            let d = ((x as f32 + 0.5 - c).powi(2) + (y as f32 + 0.5 - c).powi(2)).sqrt();
            let v = if d < radius { 255 } else { 0 };
            image::Rgba([v, v, v, 255])
        })
    }

    #[test]
    fn auto_channel_prefers_alpha_for_cutout_masks() {
        let img = RgbaImage::from_fn(8, 8, |x, _| {
            image::Rgba([255, 255, 255, if x < 4 { 0 } else { 255 }])
        });
        assert_eq!(auto_channel(&img), MaskChannel::Alpha);
    }

    #[test]
    fn invert_flips_polarity() {
        let img = disc_mask(32, 8.0);
        let a = binarize(&img, MaskChannel::Red, 0.5, false);
        let b = binarize(&img, MaskChannel::Red, 0.5, true);
        assert!(a.iter().zip(b.iter()).all(|(x, y)| x != y));
    }

    #[test]
    fn expand_grows_and_shrinks() {
        let img = disc_mask(64, 12.0);
        let m = binarize(&img, MaskChannel::Red, 0.5, false);
        let base = m.iter().filter(|&&v| v).count();
        let grown = expand(&m, 64, 64, 3.0).iter().filter(|&&v| v).count();
        let shrunk = expand(&m, 64, 64, -3.0).iter().filter(|&&v| v).count();
        assert!(grown > base);
        assert!(shrunk < base);
    }

    #[test]
    fn zero_sized_mask_is_a_build_error() {
        let img = RgbaImage::new(0, 0);
        let err = SurfaceModel::build(&img, &SurfaceBuildOptions::default()).unwrap_err();
        assert_eq!(err.category(), "Build");
    }

    #[test]
    fn exposure_is_clamped_to_range() {
        let opts = SurfaceBuildOptions {
            sdf_range_px: 8.0,
            exposure_width_px: 40.0,
            resolution: 9000,
            ..Default::default()
        }
        .clamped();
        assert_eq!(opts.exposure_width_px, 8.0);
        assert_eq!(opts.resolution, MAX_SURFACE_RESOLUTION);
    }

    #[test]
    fn channel_names_parse() {
        assert_eq!("Luma".parse::<MaskChannel>().unwrap(), MaskChannel::Luma);
        assert_eq!("a".parse::<MaskChannel>().unwrap(), MaskChannel::Alpha);
        assert!("purple".parse::<MaskChannel>().is_err());
    }
}

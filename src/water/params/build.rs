use crate::water::surface::{MaskChannel, SurfaceBuildOptions};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SdfParams {
    pub build_resolution: u32,
    pub mask_threshold: f32,
    pub mask_channel: MaskChannel,
    pub mask_invert: bool,
    pub mask_blur_radius: u32,
    pub mask_blur_passes: u32,
    pub mask_expand_px: f32,
    pub sdf_range_px: f32,
    pub exposure_width_px: f32,
}

impl Default for SdfParams {
    fn default() -> Self {
        let base = SurfaceBuildOptions::default();
        Self {
            build_resolution: base.resolution,
            mask_threshold: base.threshold,
            mask_channel: base.channel,
            mask_invert: base.invert,
            mask_blur_radius: base.blur_radius,
            mask_blur_passes: base.blur_passes,
            mask_expand_px: base.expand_px,
            sdf_range_px: base.sdf_range_px,
            exposure_width_px: base.exposure_width_px,
        }
    }
}

impl SdfParams {
    pub fn surface_options(&self) -> SurfaceBuildOptions {
        SurfaceBuildOptions {
            resolution: self.build_resolution,
            threshold: self.mask_threshold,
            channel: self.mask_channel,
            invert: self.mask_invert,
            blur_radius: self.mask_blur_radius,
            blur_passes: self.mask_blur_passes,
            expand_px: self.mask_expand_px,
            sdf_range_px: self.sdf_range_px,
            exposure_width_px: self.exposure_width_px,
        }
        .clamped()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OcclusionParams {
    /// Depth fallback; only consulted when no occluder mask is bound.
    pub depth_occlusion_enabled: bool,
}

impl Default for OcclusionParams {
    fn default() -> Self {
        Self {
            depth_occlusion_enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugParams {
    /// 0 off, 1 raw mask, 2 inside, 3 sdf, 4 exposure, 5 flow,
    /// 6 wave height, 7 distortion, 8 occluder
    pub debug_view: u32,
}

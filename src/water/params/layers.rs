use super::common::Rgb;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FoamParams {
    pub foam_enabled: bool,
    pub foam_strength: f32,
    pub foam_color: Rgb,
    pub foam_opacity: f32,
    /// Exposure-space threshold below which shore foam is at full strength.
    pub foam_threshold: f32,
    pub foam_bubbles_scale: f32,
    pub foam_breakup_scale: f32,
    pub foam_speed: f32,

    pub floating_foam_enabled: bool,
    pub floating_foam_strength: f32,
    pub floating_foam_scale: f32,
    pub floating_foam_coverage: f32,
    pub floating_foam_wave_distortion: f32,
    pub floating_foam_rain_distortion: f32,
    pub floating_foam_deep_start: f32,
    pub floating_foam_deep_end: f32,

    pub foam_flecks_enabled: bool,
    pub foam_flecks_intensity: f32,

    pub foam_black_point: f32,
    pub foam_white_point: f32,
    pub foam_gamma: f32,
    pub foam_contrast: f32,
    pub foam_brightness: f32,
    pub foam_darken: f32,
}

impl Default for FoamParams {
    fn default() -> Self {
        Self {
            foam_enabled: true,
            foam_strength: 0.6,
            foam_color: Rgb::new(0.92, 0.95, 0.97),
            foam_opacity: 0.9,
            foam_threshold: 0.24,
            foam_bubbles_scale: 90.0,
            foam_breakup_scale: 24.0,
            foam_speed: 0.15,

            floating_foam_enabled: true,
            floating_foam_strength: 0.35,
            floating_foam_scale: 6.0,
            floating_foam_coverage: 0.22,
            floating_foam_wave_distortion: 0.3,
            floating_foam_rain_distortion: 0.5,
            floating_foam_deep_start: 0.15,
            floating_foam_deep_end: 0.55,

            foam_flecks_enabled: true,
            foam_flecks_intensity: 0.6,

            foam_black_point: 0.0,
            foam_white_point: 1.0,
            foam_gamma: 1.0,
            foam_contrast: 1.0,
            foam_brightness: 0.0,
            foam_darken: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MurkParams {
    pub murk_enabled: bool,
    pub murk_intensity: f32,
    pub murk_color: Rgb,
    pub murk_scale: f32,
    pub murk_speed: f32,
    pub murk_depth_lo: f32,
    pub murk_depth_hi: f32,
    pub murk_grain_scale: f32,
    pub murk_grain_strength: f32,
    pub murk_darkness_response: f32,
}

impl Default for MurkParams {
    fn default() -> Self {
        Self {
            murk_enabled: true,
            murk_intensity: 0.3,
            murk_color: Rgb::new(0.18, 0.22, 0.16),
            murk_scale: 3.0,
            murk_speed: 0.05,
            murk_depth_lo: 0.0,
            murk_depth_hi: 0.6,
            murk_grain_scale: 120.0,
            murk_grain_strength: 0.15,
            murk_darkness_response: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SandParams {
    pub sand_enabled: bool,
    pub sand_intensity: f32,
    pub sand_color: Rgb,
    /// Clamped to [1, 60]; smaller values produce brick artifacts.
    pub sand_chunk_scale: f32,
    pub sand_grain_scale: f32,
    pub sand_speed: f32,
    pub sand_anisotropy: f32,
    pub sand_threshold: f32,
    pub sand_depth_lo: f32,
    pub sand_depth_hi: f32,
}

impl Default for SandParams {
    fn default() -> Self {
        Self {
            sand_enabled: false,
            sand_intensity: 0.5,
            sand_color: Rgb::new(0.76, 0.68, 0.5),
            sand_chunk_scale: 14.0,
            sand_grain_scale: 220.0,
            sand_speed: 0.03,
            sand_anisotropy: 0.5,
            sand_threshold: 0.55,
            sand_depth_lo: 0.0,
            sand_depth_hi: 0.45,
        }
    }
}

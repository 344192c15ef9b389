use super::common::Rgb;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TintParams {
    pub tint_color: Rgb,
    pub tint_strength: f32,
    /// Extra tint in open water (exposure 1) relative to the shore.
    pub deep_tint_boost: f32,
    /// Saturation pull of the refracted color towards its luma.
    pub refracted_desaturate: f32,
}

impl Default for TintParams {
    fn default() -> Self {
        Self {
            tint_color: Rgb::new(0.10, 0.36, 0.44),
            tint_strength: 0.32,
            deep_tint_boost: 0.25,
            refracted_desaturate: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaveParams {
    /// Wave repeats across the longest scene side.
    pub wave_scale: f32,
    pub wave_strength: f32,
    pub wave_speed: f32,
    pub wave_speed_use_wind: bool,
    pub wave_speed_min_factor: f32,
    pub wave_strength_use_wind: bool,
    pub wave_strength_min_factor: f32,
    pub lock_wave_travel_to_wind: bool,
    pub wave_direction_offset_deg: f32,
    pub wave_appearance_rot_deg: f32,
    pub wave_evolution_amount: f32,
    pub wave_evolution_speed: f32,
    pub wave_breathing_amount: f32,
    pub wave_breathing_speed: f32,
    pub wave_lf_scale: f32,
    pub wave_direction_jitter: f32,
    pub wave_indoor_damping: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wave_scale: 26.0,
            wave_strength: 1.0,
            wave_speed: 0.65,
            wave_speed_use_wind: true,
            wave_speed_min_factor: 0.35,
            wave_strength_use_wind: true,
            wave_strength_min_factor: 0.45,
            lock_wave_travel_to_wind: true,
            wave_direction_offset_deg: 0.0,
            wave_appearance_rot_deg: 0.0,
            wave_evolution_amount: 0.35,
            wave_evolution_speed: 0.07,
            wave_breathing_amount: 0.18,
            wave_breathing_speed: 0.23,
            wave_lf_scale: 0.35,
            wave_direction_jitter: 0.25,
            wave_indoor_damping: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WarpParams {
    pub warp_large_strength: f32,
    pub warp_large_scale: f32,
    /// Stretch of the large warp along the wind axis.
    pub warp_large_streak: f32,
    pub warp_medium_strength: f32,
    pub warp_medium_scale: f32,
    pub warp_micro_strength: f32,
    pub warp_micro_scale: f32,
    pub warp_speed: f32,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            warp_large_strength: 0.06,
            warp_large_scale: 0.55,
            warp_large_streak: 2.5,
            warp_medium_strength: 0.035,
            warp_medium_scale: 2.2,
            warp_micro_strength: 0.012,
            warp_micro_scale: 9.0,
            warp_speed: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DistortionParams {
    pub distortion_strength_px: f32,
    pub flow_distortion_strength: f32,
    /// SDF value where displacement reaches full strength (inside the shore).
    pub distortion_edge_inner: f32,
    /// SDF value where displacement fades to zero.
    pub distortion_edge_outer: f32,
    pub distortion_shore_min: f32,
    pub distortion_shore_width: f32,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            distortion_strength_px: 6.0,
            flow_distortion_strength: 0.35,
            distortion_edge_inner: 0.42,
            distortion_edge_outer: 0.5,
            distortion_shore_min: 0.15,
            distortion_shore_width: 0.35,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefractionParams {
    pub refraction_multitap_enabled: bool,
}

impl Default for RefractionParams {
    fn default() -> Self {
        Self {
            refraction_multitap_enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChromaticParams {
    pub chromatic_aberration_enabled: bool,
    pub chromatic_aberration_px: f32,
    pub chromatic_edge_inner: f32,
    pub chromatic_edge_outer: f32,
}

impl Default for ChromaticParams {
    fn default() -> Self {
        Self {
            chromatic_aberration_enabled: true,
            chromatic_aberration_px: 1.25,
            chromatic_edge_inner: 0.4,
            chromatic_edge_outer: 0.5,
        }
    }
}

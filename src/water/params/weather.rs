use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindParams {
    pub use_target_wind_direction: bool,
    pub wind_dir_responsiveness: f32,
    /// Rise rate of the smoothed wind speed; the fall rate is half of it.
    pub wind_speed_responsiveness: f32,
    pub fallback_wind_dir_deg: f32,
    pub fallback_wind_speed01: f32,
    pub advection_speed01: f32,
    pub advection_dir_offset_deg: f32,
}

impl Default for WindParams {
    fn default() -> Self {
        Self {
            use_target_wind_direction: true,
            wind_dir_responsiveness: 2.0,
            wind_speed_responsiveness: 1.5,
            fallback_wind_dir_deg: 30.0,
            fallback_wind_speed01: 0.35,
            advection_speed01: 0.35,
            advection_dir_offset_deg: 0.0,
        }
    }
}

impl WindParams {
    /// Advection speed multiplier; 0.5 maps to 1x.
    pub fn advection_multiplier(&self) -> f32 {
        self.advection_speed01.clamp(0.0, 1.0) * 2.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RainParams {
    pub rain_distortion_enabled: bool,
    pub rain_distortion_use_weather: bool,
    pub rain_precipitation: f32,
    /// Precipitation where storm impacts start taking over from ripples.
    pub rain_split: f32,
    /// Width of the ripple/storm crossfade around `rain_split`.
    pub rain_blend: f32,
    pub rain_distortion_strength_px: f32,
    pub rain_max_combined_strength_px: f32,
    pub rain_indoor_damping: f32,
    pub rain_distortion_normal_strength: f32,

    pub ripple_strength: f32,
    pub ripple_scale: f32,
    pub ripple_speed: f32,
    pub ripple_density: f32,
    pub ripple_width: f32,
    pub ripple_width_scale: f32,
    pub ripple_wobble: f32,
    pub ripple_secondary_enabled: bool,
    pub ripple_secondary_phase_offset: f32,
    pub ripple_secondary_strength: f32,

    pub storm_strength: f32,
    pub storm_scale: f32,
    pub storm_rate: f32,
    pub storm_density: f32,
    pub storm_core_strength: f32,
    pub storm_ring_strength: f32,
    pub storm_ring_width: f32,
    pub storm_curl: f32,
    pub storm_micro_enabled: bool,
    pub storm_micro_strength: f32,
    pub storm_micro_scale: f32,
    pub storm_micro_speed: f32,
}

impl Default for RainParams {
    fn default() -> Self {
        Self {
            rain_distortion_enabled: false,
            rain_distortion_use_weather: true,
            rain_precipitation: 0.0,
            rain_split: 0.55,
            rain_blend: 0.25,
            rain_distortion_strength_px: 4.0,
            rain_max_combined_strength_px: 10.0,
            rain_indoor_damping: 1.0,
            rain_distortion_normal_strength: 0.8,

            ripple_strength: 1.0,
            ripple_scale: 42.0,
            ripple_speed: 1.1,
            ripple_density: 0.35,
            ripple_width: 0.08,
            ripple_width_scale: 1.0,
            ripple_wobble: 0.15,
            ripple_secondary_enabled: true,
            ripple_secondary_phase_offset: 0.45,
            ripple_secondary_strength: 0.5,

            storm_strength: 1.0,
            storm_scale: 14.0,
            storm_rate: 0.7,
            storm_density: 0.5,
            storm_core_strength: 0.8,
            storm_ring_strength: 1.0,
            storm_ring_width: 0.12,
            storm_curl: 0.6,
            storm_micro_enabled: true,
            storm_micro_strength: 0.25,
            storm_micro_scale: 30.0,
            storm_micro_speed: 0.4,
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecularParams {
    pub spec_enabled: bool,
    /// Divided by 50 in the shader.
    pub spec_strength: f32,
    /// 1..24; maps onto roughness between `spec_rough_max` and `spec_rough_min`.
    pub spec_power: f32,
    pub spec_rough_min: f32,
    pub spec_rough_max: f32,
    pub spec_f0: f32,
    pub spec_normal_strength: f32,
    pub spec_normal_scale: f32,
    pub spec_aniso_ratio: f32,
    pub spec_mask_gamma: f32,
    pub spec_shore_bias: f32,
    pub spec_sky_tint: f32,
    pub spec_sun_intensity: f32,
    pub spec_dark_attenuation: f32,
}

impl Default for SpecularParams {
    fn default() -> Self {
        Self {
            spec_enabled: true,
            spec_strength: 30.0,
            spec_power: 12.0,
            spec_rough_min: 0.05,
            spec_rough_max: 0.35,
            spec_f0: 0.02,
            spec_normal_strength: 1.0,
            spec_normal_scale: 1.0,
            spec_aniso_ratio: 1.6,
            spec_mask_gamma: 1.5,
            spec_shore_bias: 0.4,
            spec_sky_tint: 0.5,
            spec_sun_intensity: 1.0,
            spec_dark_attenuation: 0.85,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloudShadowParams {
    pub cloud_shadow_enabled: bool,
    pub cloud_shadow_darken: f32,
    pub cloud_shadow_spec_kill: f32,
    pub cloud_shadow_spec_curve: f32,
    pub cloud_shadow_caustics_kill: f32,
}

impl Default for CloudShadowParams {
    fn default() -> Self {
        Self {
            cloud_shadow_enabled: true,
            cloud_shadow_darken: 0.35,
            cloud_shadow_spec_kill: 0.8,
            cloud_shadow_spec_curve: 1.5,
            cloud_shadow_caustics_kill: 0.9,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CausticsParams {
    pub caustics_enabled: bool,
    pub caustics_intensity: f32,
    pub caustics_scale: f32,
    pub caustics_speed: f32,
    pub caustics_sharpness: f32,
    pub caustics_base_coverage: f32,
    pub caustics_shore_boost: f32,
    pub caustics_tint_mix: f32,
}

impl Default for CausticsParams {
    fn default() -> Self {
        Self {
            caustics_enabled: true,
            caustics_intensity: 0.35,
            caustics_scale: 18.0,
            caustics_speed: 0.35,
            caustics_sharpness: 1.2,
            caustics_base_coverage: 0.25,
            caustics_shore_boost: 0.6,
            caustics_tint_mix: 0.15,
        }
    }
}

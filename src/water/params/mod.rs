//! Water tunables grouped by concern, with preset loading and legacy aliases.
//!
//! Presets come in two shapes: grouped (`{"waves": {"waveSpeed": 1.2}}`) and
//! the flat editor form (`{"waveSpeed": 1.2}`). Both route every key through
//! [`WaterParams::set`], so the same normalized-key matching and legacy
//! handling applies regardless of shape.

pub mod build;
pub mod common;
pub mod layers;
pub mod lighting;
pub mod look;
pub mod weather;

#[cfg(test)]
mod tests;

pub use build::{DebugParams, OcclusionParams, SdfParams};
pub use common::{normalize_key, Rgb};
pub use layers::{FoamParams, MurkParams, SandParams};
pub use lighting::{CausticsParams, CloudShadowParams, SpecularParams};
pub use look::{ChromaticParams, DistortionParams, RefractionParams, TintParams, WarpParams, WaveParams};
pub use weather::{RainParams, WindParams};

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{WaterError, WaterResult};
use crate::water::surface::{MAX_SURFACE_RESOLUTION, MIN_SURFACE_RESOLUTION};

pub const SAND_CHUNK_SCALE_MIN: f32 = 1.0;
pub const SAND_CHUNK_SCALE_MAX: f32 = 60.0;
pub const MAX_DEBUG_VIEW: u32 = 8;

/// Values stored under pre-rename parameter names.
///
/// Resolved by [`WaterParams::resolved`]: the current name wins when it
/// differs from its default, otherwise the legacy value is used.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyAliases {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advection_speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_appearance_offset_deg: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caustics_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foam_amount: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular_strength: Option<f32>,
}

impl LegacyAliases {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<f32>> {
        match key {
            "advectionspeed" => Some(&mut self.advection_speed),
            "waveappearanceoffsetdeg" => Some(&mut self.wave_appearance_offset_deg),
            "causticsstrength" => Some(&mut self.caustics_strength),
            "foamamount" => Some(&mut self.foam_amount),
            "specularstrength" => Some(&mut self.specular_strength),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaterParams {
    pub enabled: bool,
    pub tint: TintParams,
    pub waves: WaveParams,
    pub warp: WarpParams,
    pub distortion: DistortionParams,
    pub refraction: RefractionParams,
    pub chromatic: ChromaticParams,
    pub rain: RainParams,
    pub wind: WindParams,
    pub specular: SpecularParams,
    pub cloud_shadow: CloudShadowParams,
    pub caustics: CausticsParams,
    pub foam: FoamParams,
    pub murk: MurkParams,
    pub sand: SandParams,
    pub sdf: SdfParams,
    pub occlusion: OcclusionParams,
    pub debug: DebugParams,
    #[serde(skip_serializing_if = "LegacyAliases::is_empty")]
    pub legacy: LegacyAliases,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            enabled: true,
            tint: TintParams::default(),
            waves: WaveParams::default(),
            warp: WarpParams::default(),
            distortion: DistortionParams::default(),
            refraction: RefractionParams::default(),
            chromatic: ChromaticParams::default(),
            rain: RainParams::default(),
            wind: WindParams::default(),
            specular: SpecularParams::default(),
            cloud_shadow: CloudShadowParams::default(),
            caustics: CausticsParams::default(),
            foam: FoamParams::default(),
            murk: MurkParams::default(),
            sand: SandParams::default(),
            sdf: SdfParams::default(),
            occlusion: OcclusionParams::default(),
            debug: DebugParams::default(),
            legacy: LegacyAliases::default(),
        }
    }
}

/// Replace the field of `group` whose normalized name is `key`.
fn set_in_group<T>(group: &mut T, key: &str, value: &Value) -> WaterResult<bool>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let mut tree = serde_json::to_value(&*group)?;
    let Some(obj) = tree.as_object_mut() else {
        return Ok(false);
    };
    let Some(field) = obj.keys().find(|k| normalize_key(k) == key).cloned() else {
        return Ok(false);
    };
    obj.insert(field.clone(), value.clone());
    *group = serde_json::from_value(tree)
        .map_err(|e| WaterError::config(format!("{field}: {e}")))?;
    Ok(true)
}

macro_rules! route_groups {
    ($self:ident, $key:ident, $value:ident, [$($group:ident),* $(,)?]) => {
        $(
            if set_in_group(&mut $self.$group, &$key, $value)? {
                return Ok(true);
            }
        )*
    };
}

impl WaterParams {
    pub const GROUPS: [&'static str; 17] = [
        "tint",
        "waves",
        "warp",
        "distortion",
        "refraction",
        "chromatic",
        "rain",
        "wind",
        "specular",
        "cloudShadow",
        "caustics",
        "foam",
        "murk",
        "sand",
        "sdf",
        "occlusion",
        "debug",
    ];

    /// Set one parameter by name. Returns `Ok(false)` for unknown keys.
    ///
    /// Names match case-, `-`/`_`-, and whitespace-insensitively; legacy
    /// names are stored for resolution in [`WaterParams::resolved`].
    pub fn set(&mut self, name: &str, value: &Value) -> WaterResult<bool> {
        let key = normalize_key(name);

        if let Some(slot) = self.legacy.slot(&key) {
            let v = value
                .as_f64()
                .ok_or_else(|| WaterError::config(format!("{name}: expected a number")))?;
            *slot = Some(v as f32);
            return Ok(true);
        }

        match key.as_str() {
            "enabled" | "waterenabled" => {
                self.enabled = serde_json::from_value(value.clone())
                    .map_err(|e| WaterError::config(format!("{name}: {e}")))?;
                return Ok(true);
            }
            _ => {}
        }

        route_groups!(
            self,
            key,
            value,
            [
                tint,
                waves,
                warp,
                distortion,
                refraction,
                chromatic,
                rain,
                wind,
                specular,
                cloud_shadow,
                caustics,
                foam,
                murk,
                sand,
                sdf,
                occlusion,
                debug,
            ]
        );
        Ok(false)
    }

    /// Load a grouped, flat, or mixed preset on top of the defaults.
    pub fn from_json(value: &Value) -> WaterResult<Self> {
        let mut params = Self::default();
        params.apply_json(value)?;
        Ok(params)
    }

    pub fn from_json_str(text: &str) -> WaterResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Apply every key of a preset object; unknown keys are logged and skipped.
    pub fn apply_json(&mut self, value: &Value) -> WaterResult<()> {
        let obj = value
            .as_object()
            .ok_or_else(|| WaterError::config("water preset must be a JSON object"))?;

        for (key, v) in obj {
            let is_group = Self::GROUPS
                .iter()
                .any(|g| normalize_key(g) == normalize_key(key));
            match v.as_object() {
                Some(inner) if is_group || key == "legacy" => {
                    for (inner_key, inner_value) in inner {
                        if !self.set(inner_key, inner_value)? {
                            warn!("water: unknown parameter '{key}.{inner_key}' ignored");
                        }
                    }
                }
                _ => {
                    if !self.set(key, v)? {
                        warn!("water: unknown parameter '{key}' ignored");
                    }
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> WaterResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Normalized copy: legacy aliases applied, colors in 0-1, ranges clamped.
    pub fn resolved(&self) -> Self {
        let mut p = self.clone();
        let defaults = Self::default();

        fn prefer(current: &mut f32, default: f32, legacy: Option<f32>) {
            if let Some(old) = legacy {
                if *current == default {
                    *current = old;
                }
            }
        }
        prefer(
            &mut p.wind.advection_speed01,
            defaults.wind.advection_speed01,
            p.legacy.advection_speed,
        );
        prefer(
            &mut p.waves.wave_appearance_rot_deg,
            defaults.waves.wave_appearance_rot_deg,
            p.legacy.wave_appearance_offset_deg,
        );
        prefer(
            &mut p.caustics.caustics_intensity,
            defaults.caustics.caustics_intensity,
            p.legacy.caustics_strength,
        );
        prefer(
            &mut p.foam.foam_strength,
            defaults.foam.foam_strength,
            p.legacy.foam_amount,
        );
        prefer(
            &mut p.specular.spec_strength,
            defaults.specular.spec_strength,
            p.legacy.specular_strength,
        );
        p.legacy = LegacyAliases::default();

        p.tint.tint_color = p.tint.tint_color.normalized();
        p.foam.foam_color = p.foam.foam_color.normalized();
        p.murk.murk_color = p.murk.murk_color.normalized();
        p.sand.sand_color = p.sand.sand_color.normalized();

        p.sand.sand_chunk_scale = p
            .sand
            .sand_chunk_scale
            .clamp(SAND_CHUNK_SCALE_MIN, SAND_CHUNK_SCALE_MAX);
        p.sdf.build_resolution = p
            .sdf
            .build_resolution
            .clamp(MIN_SURFACE_RESOLUTION, MAX_SURFACE_RESOLUTION);
        p.specular.spec_power = p.specular.spec_power.clamp(1.0, 24.0);
        p.specular.spec_rough_min = p.specular.spec_rough_min.clamp(0.02, 1.0);
        p.specular.spec_rough_max = p.specular.spec_rough_max.clamp(0.02, 1.0);
        p.specular.spec_f0 = p.specular.spec_f0.clamp(0.0, 1.0);
        p.wind.advection_speed01 = p.wind.advection_speed01.clamp(0.0, 1.0);
        p.wind.fallback_wind_speed01 = p.wind.fallback_wind_speed01.clamp(0.0, 1.0);
        p.wind.wind_dir_responsiveness = p.wind.wind_dir_responsiveness.max(0.0);
        p.wind.wind_speed_responsiveness = p.wind.wind_speed_responsiveness.max(0.0);
        p.waves.wave_speed_min_factor = p.waves.wave_speed_min_factor.clamp(0.0, 1.0);
        p.waves.wave_strength_min_factor = p.waves.wave_strength_min_factor.clamp(0.0, 1.0);
        p.waves.wave_scale = p.waves.wave_scale.max(0.01);
        p.rain.rain_precipitation = p.rain.rain_precipitation.clamp(0.0, 1.0);
        p.rain.ripple_density = p.rain.ripple_density.clamp(0.0, 1.0);
        p.rain.storm_density = p.rain.storm_density.clamp(0.0, 1.0);
        p.rain.rain_max_combined_strength_px = p.rain.rain_max_combined_strength_px.max(0.0);
        p.foam.foam_gamma = p.foam.foam_gamma.max(0.01);
        p.foam.floating_foam_coverage = p.foam.floating_foam_coverage.clamp(0.0, 1.0);
        if p.foam.foam_white_point <= p.foam.foam_black_point {
            p.foam.foam_white_point = p.foam.foam_black_point + 1e-3;
        }
        p.distortion.distortion_strength_px = p.distortion.distortion_strength_px.max(0.0);
        p.chromatic.chromatic_aberration_px = p.chromatic.chromatic_aberration_px.max(0.0);
        p.debug.debug_view = p.debug.debug_view.min(MAX_DEBUG_VIEW);
        p
    }
}

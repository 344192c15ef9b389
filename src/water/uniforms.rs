// src/water/uniforms.rs
// std140 mirror of the WaterUniforms block in water.frag and the per-frame packers
// Every member is a vec4 so the Rust and GLSL layouts agree without padding rules
// RELEVANT FILES: src/shaders/water.frag, src/water/pass.rs, src/water/params/mod.rs

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::camera::ViewBounds;
use super::params::{RainParams, WaterParams};
use super::tiles::SceneGeometry;
use super::wind::{WeatherState, WindFrame};

/// Number of vec4 slots in the block.
pub const UNIFORM_VEC4_COUNT: usize = 49;

/// Water uniform block (std140, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct WaterUniforms {
    /// time, windTime, hasWaterData, waterEnabled
    pub frame: [f32; 4],
    /// left, bottom, right, top in world units (Y up)
    pub view_bounds: [f32; 4],
    /// x, y, width, height in scene pixels (Y down)
    pub scene_rect: [f32; 4],
    /// sceneAspect, worldHeight, zoom, debugView
    pub scene_dims: [f32; 4],
    /// 1/w, 1/h, w, h of the input target
    pub texel: [f32; 4],
    /// dir.xy, speed, waveStrength
    pub wind: [f32; 4],
    /// offsetUv.xy, waveSpeed, hasOccluder
    pub advection: [f32; 4],
    /// depthEnabled, groundDistance, activeLevelElevation, hasDepth
    pub occlusion: [f32; 4],
    /// rgb, strength
    pub tint: [f32; 4],
    /// scale, waveDir.xy, appearanceRotRad
    pub wave_a: [f32; 4],
    /// evolutionAmount, evolutionSpeed, breathingAmount, breathingSpeed
    pub wave_b: [f32; 4],
    /// lfScale, directionJitter, indoorDamping, deepTintBoost
    pub wave_c: [f32; 4],
    /// sceneDarkness, refractedDesaturate, hasOutdoors, unused
    pub wave_d: [f32; 4],
    /// largeStrength, largeScale, largeStreak, speed
    pub warp_a: [f32; 4],
    /// mediumStrength, mediumScale, microStrength, microScale
    pub warp_b: [f32; 4],
    /// strengthPx, flowStrength, edgeInner, edgeOuter
    pub distort_a: [f32; 4],
    /// shoreMin, shoreWidth, unused, unused
    pub distort_b: [f32; 4],
    /// caPx, edgeInner, edgeOuter, unused
    pub chroma: [f32; 4],
    /// enabled, precipitation, split, blend
    pub rain_a: [f32; 4],
    /// strengthPx, maxCombinedPx, indoorDamping, normalStrength
    pub rain_b: [f32; 4],
    /// strength, scale, speed, density
    pub ripple_a: [f32; 4],
    /// width, widthScale, wobble, secondaryEnabled
    pub ripple_b: [f32; 4],
    /// secondaryPhaseOffset, secondaryStrength, unused, unused
    pub ripple_c: [f32; 4],
    /// strength, scale, rate, density
    pub storm_a: [f32; 4],
    /// coreStrength, ringStrength, ringWidth, curl
    pub storm_b: [f32; 4],
    /// microEnabled, microStrength, microScale, microSpeed
    pub storm_c: [f32; 4],
    /// enabled, strength, power, f0
    pub spec_a: [f32; 4],
    /// roughMin, roughMax, normalStrength, normalScale
    pub spec_b: [f32; 4],
    /// anisoRatio, maskGamma, shoreBias, skyTint
    pub spec_c: [f32; 4],
    /// sunIntensity, darkAttenuation, skyIntensity01, unused
    pub spec_d: [f32; 4],
    /// sun direction xyz, unused
    pub sun_dir: [f32; 4],
    /// sky rgb, unused
    pub sky_color: [f32; 4],
    /// enabled, hasCloudShadow, darken, specKill
    pub cloud_a: [f32; 4],
    /// specCurve, causticsKill, unused, unused
    pub cloud_b: [f32; 4],
    /// enabled, intensity, scale, speed
    pub caustics_a: [f32; 4],
    /// sharpness, baseCoverage, shoreBoost, tintMix
    pub caustics_b: [f32; 4],
    /// enabled, strength, opacity, threshold
    pub foam_a: [f32; 4],
    /// bubblesScale, breakupScale, speed, flecksIntensity
    pub foam_b: [f32; 4],
    /// rgb, darken
    pub foam_color: [f32; 4],
    /// blackPoint, whitePoint, gamma, contrast
    pub foam_remap_a: [f32; 4],
    /// brightness, unused, unused, unused
    pub foam_remap_b: [f32; 4],
    /// enabled, strength, scale, coverage
    pub float_foam_a: [f32; 4],
    /// waveDistortion, rainDistortion, deepStart, deepEnd
    pub float_foam_b: [f32; 4],
    /// enabled, intensity, scale, speed
    pub murk_a: [f32; 4],
    /// depthLo, depthHi, grainScale, grainStrength
    pub murk_b: [f32; 4],
    /// rgb, darknessResponse
    pub murk_color: [f32; 4],
    /// intensity (0 when disabled), chunkScale, grainScale, speed
    pub sand_a: [f32; 4],
    /// anisotropy, threshold, depthLo, depthHi
    pub sand_b: [f32; 4],
    /// rgb, unused
    pub sand_color: [f32; 4],
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// Precipitation fed to the rain layers.
///
/// Live weather drives it only when coupling is on and the weather reports
/// liquid precipitation; otherwise the parameter value is used.
pub fn effective_rain_precipitation(rain: &RainParams, weather: Option<&WeatherState>) -> f32 {
    match weather {
        Some(w) if rain.rain_distortion_use_weather && w.precipitation_kind().is_liquid() => {
            w.precipitation01.clamp(0.0, 1.0)
        }
        _ => rain.rain_precipitation,
    }
}

/// Sun direction (x east, y north, z up) from azimuth/elevation in degrees.
pub fn sun_direction(azimuth_deg: f32, elevation_deg: f32) -> Vec3 {
    let (sa, ca) = azimuth_deg.to_radians().sin_cos();
    let (se, ce) = elevation_deg.to_radians().sin_cos();
    Vec3::new(ce * sa, ce * ca, se).normalize_or_zero()
}

/// Caches the sun vector; trig only runs when the angles change.
#[derive(Debug, Clone, Default)]
pub struct SunDirectionCache {
    angles: Option<(f32, f32)>,
    dir: Vec3,
    recomputes: u64,
}

impl SunDirectionCache {
    pub fn direction(&mut self, azimuth_deg: f32, elevation_deg: f32) -> Vec3 {
        if self.angles != Some((azimuth_deg, elevation_deg)) {
            self.angles = Some((azimuth_deg, elevation_deg));
            self.dir = sun_direction(azimuth_deg, elevation_deg);
            self.recomputes += 1;
        }
        self.dir
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}

impl Default for WaterUniforms {
    fn default() -> Self {
        let mut u = Self::zeroed();
        u.apply_params(&WaterParams::default(), None);
        u.set_view(
            SceneGeometry::default(),
            ViewBounds {
                min: Vec2::ZERO,
                max: Vec2::ONE,
                zoom: 1.0,
            },
        );
        u.set_texel_size(1, 1);
        u.set_sky(Vec3::ONE, 1.0);
        u.set_sun_direction(sun_direction(135.0, 45.0));
        u
    }
}

impl WaterUniforms {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Static parameter values. Expects `params` already resolved.
    pub fn apply_params(&mut self, params: &WaterParams, weather: Option<&WeatherState>) {
        let p = params;
        self.frame[3] = flag(p.enabled);
        self.scene_dims[3] = p.debug.debug_view as f32;
        self.occlusion[0] = flag(p.occlusion.depth_occlusion_enabled);

        let t = &p.tint;
        self.tint = [t.tint_color.r(), t.tint_color.g(), t.tint_color.b(), t.tint_strength];

        let w = &p.waves;
        self.wave_a[0] = w.wave_scale;
        self.wave_a[3] = w.wave_appearance_rot_deg.to_radians();
        self.wave_b = [
            w.wave_evolution_amount,
            w.wave_evolution_speed,
            w.wave_breathing_amount,
            w.wave_breathing_speed,
        ];
        self.wave_c = [
            w.wave_lf_scale,
            w.wave_direction_jitter,
            w.wave_indoor_damping,
            t.deep_tint_boost,
        ];
        self.wave_d[1] = t.refracted_desaturate;

        let wp = &p.warp;
        self.warp_a = [
            wp.warp_large_strength,
            wp.warp_large_scale,
            wp.warp_large_streak,
            wp.warp_speed,
        ];
        self.warp_b = [
            wp.warp_medium_strength,
            wp.warp_medium_scale,
            wp.warp_micro_strength,
            wp.warp_micro_scale,
        ];

        let d = &p.distortion;
        self.distort_a = [
            d.distortion_strength_px,
            d.flow_distortion_strength,
            d.distortion_edge_inner,
            d.distortion_edge_outer,
        ];
        self.distort_b = [d.distortion_shore_min, d.distortion_shore_width, 0.0, 0.0];

        let c = &p.chromatic;
        self.chroma = [
            c.chromatic_aberration_px,
            c.chromatic_edge_inner,
            c.chromatic_edge_outer,
            0.0,
        ];

        let r = &p.rain;
        self.rain_a = [
            flag(r.rain_distortion_enabled),
            effective_rain_precipitation(r, weather),
            r.rain_split,
            r.rain_blend,
        ];
        self.rain_b = [
            r.rain_distortion_strength_px,
            r.rain_max_combined_strength_px,
            r.rain_indoor_damping,
            r.rain_distortion_normal_strength,
        ];
        self.ripple_a = [r.ripple_strength, r.ripple_scale, r.ripple_speed, r.ripple_density];
        self.ripple_b = [
            r.ripple_width,
            r.ripple_width_scale,
            r.ripple_wobble,
            flag(r.ripple_secondary_enabled),
        ];
        self.ripple_c = [
            r.ripple_secondary_phase_offset,
            r.ripple_secondary_strength,
            0.0,
            0.0,
        ];
        self.storm_a = [r.storm_strength, r.storm_scale, r.storm_rate, r.storm_density];
        self.storm_b = [
            r.storm_core_strength,
            r.storm_ring_strength,
            r.storm_ring_width,
            r.storm_curl,
        ];
        self.storm_c = [
            flag(r.storm_micro_enabled),
            r.storm_micro_strength,
            r.storm_micro_scale,
            r.storm_micro_speed,
        ];

        let s = &p.specular;
        self.spec_a = [flag(s.spec_enabled), s.spec_strength, s.spec_power, s.spec_f0];
        self.spec_b = [
            s.spec_rough_min,
            s.spec_rough_max,
            s.spec_normal_strength,
            s.spec_normal_scale,
        ];
        self.spec_c = [
            s.spec_aniso_ratio,
            s.spec_mask_gamma,
            s.spec_shore_bias,
            s.spec_sky_tint,
        ];
        self.spec_d[0] = s.spec_sun_intensity;
        self.spec_d[1] = s.spec_dark_attenuation;

        let cs = &p.cloud_shadow;
        self.cloud_a[0] = flag(cs.cloud_shadow_enabled);
        self.cloud_a[2] = cs.cloud_shadow_darken;
        self.cloud_a[3] = cs.cloud_shadow_spec_kill;
        self.cloud_b = [
            cs.cloud_shadow_spec_curve,
            cs.cloud_shadow_caustics_kill,
            0.0,
            0.0,
        ];

        let ca = &p.caustics;
        self.caustics_a = [
            flag(ca.caustics_enabled),
            ca.caustics_intensity,
            ca.caustics_scale,
            ca.caustics_speed,
        ];
        self.caustics_b = [
            ca.caustics_sharpness,
            ca.caustics_base_coverage,
            ca.caustics_shore_boost,
            ca.caustics_tint_mix,
        ];

        let f = &p.foam;
        self.foam_a = [
            flag(f.foam_enabled),
            f.foam_strength,
            f.foam_opacity,
            f.foam_threshold,
        ];
        self.foam_b = [
            f.foam_bubbles_scale,
            f.foam_breakup_scale,
            f.foam_speed,
            f.foam_flecks_intensity,
        ];
        self.foam_color = [
            f.foam_color.r(),
            f.foam_color.g(),
            f.foam_color.b(),
            f.foam_darken,
        ];
        self.foam_remap_a = [
            f.foam_black_point,
            f.foam_white_point,
            f.foam_gamma,
            f.foam_contrast,
        ];
        self.foam_remap_b = [f.foam_brightness, 0.0, 0.0, 0.0];
        self.float_foam_a = [
            flag(f.foam_enabled && f.floating_foam_enabled),
            f.floating_foam_strength,
            f.floating_foam_scale,
            f.floating_foam_coverage,
        ];
        self.float_foam_b = [
            f.floating_foam_wave_distortion,
            f.floating_foam_rain_distortion,
            f.floating_foam_deep_start,
            f.floating_foam_deep_end,
        ];

        let m = &p.murk;
        self.murk_a = [flag(m.murk_enabled), m.murk_intensity, m.murk_scale, m.murk_speed];
        self.murk_b = [
            m.murk_depth_lo,
            m.murk_depth_hi,
            m.murk_grain_scale,
            m.murk_grain_strength,
        ];
        self.murk_color = [
            m.murk_color.r(),
            m.murk_color.g(),
            m.murk_color.b(),
            m.murk_darkness_response,
        ];

        let sd = &p.sand;
        self.sand_a = [
            if sd.sand_enabled { sd.sand_intensity } else { 0.0 },
            sd.sand_chunk_scale,
            sd.sand_grain_scale,
            sd.sand_speed,
        ];
        self.sand_b = [
            sd.sand_anisotropy,
            sd.sand_threshold,
            sd.sand_depth_lo,
            sd.sand_depth_hi,
        ];
        self.sand_color = [sd.sand_color.r(), sd.sand_color.g(), sd.sand_color.b(), 0.0];
    }

    pub fn apply_wind(&mut self, frame: &WindFrame) {
        self.frame[1] = frame.wind_time;
        self.wind = [
            frame.wind_dir.x,
            frame.wind_dir.y,
            frame.wind_speed,
            frame.wave_strength,
        ];
        self.advection[0] = frame.offset_uv.x;
        self.advection[1] = frame.offset_uv.y;
        self.advection[2] = frame.wave_speed;
        self.wave_a[1] = frame.wave_dir.x;
        self.wave_a[2] = frame.wave_dir.y;
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.frame[0] = seconds;
    }

    pub fn set_has_water_data(&mut self, has: bool) {
        self.frame[2] = flag(has);
    }

    pub fn has_water_data(&self) -> bool {
        self.frame[2] > 0.5
    }

    pub fn set_view(&mut self, geometry: SceneGeometry, bounds: ViewBounds) {
        let r = geometry.rect;
        self.view_bounds = bounds.to_vec4().to_array();
        self.scene_rect = [r.x, r.y, r.width.max(1e-3), r.height.max(1e-3)];
        self.scene_dims[0] = r.width.max(1e-3) / r.height.max(1e-3);
        self.scene_dims[1] = geometry.world_height;
        self.scene_dims[2] = bounds.zoom;
    }

    pub fn set_texel_size(&mut self, width: u32, height: u32) {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        self.texel = [1.0 / w, 1.0 / h, w, h];
    }

    pub fn set_has_occluder(&mut self, has: bool) {
        self.advection[3] = flag(has);
    }

    /// Depth fallback inputs; `None` clears `hasDepth`.
    pub fn set_depth(&mut self, depth: Option<(f32, f32)>) {
        match depth {
            Some((ground_distance, active_level_elevation)) => {
                self.occlusion[1] = ground_distance;
                self.occlusion[2] = active_level_elevation;
                self.occlusion[3] = 1.0;
            }
            None => self.occlusion[3] = 0.0,
        }
    }

    pub fn set_has_cloud_shadow(&mut self, has: bool) {
        self.cloud_a[1] = flag(has);
    }

    pub fn set_has_outdoors(&mut self, has: bool) {
        self.wave_d[2] = flag(has);
    }

    pub fn set_scene_darkness(&mut self, darkness: f32) {
        self.wave_d[0] = darkness.clamp(0.0, 1.0);
    }

    pub fn set_sun_direction(&mut self, dir: Vec3) {
        self.sun_dir = [dir.x, dir.y, dir.z, 0.0];
    }

    pub fn set_sky(&mut self, color: Vec3, intensity01: f32) {
        self.sky_color = [color.x, color.y, color.z, 0.0];
        self.spec_d[2] = intensity01.clamp(0.0, 1.0);
    }

    pub fn rain_precipitation(&self) -> f32 {
        self.rain_a[1]
    }

    pub fn sand_intensity(&self) -> f32 {
        self.sand_a[0]
    }
}

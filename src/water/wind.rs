// src/water/wind.rs
// Wind direction/speed smoothing plus the wave clock and UV advection integrators
// One instance per WaterPass; ticked once per frame before uniforms are written
// RELEVANT FILES: src/water/pass.rs, src/water/uniforms.rs, tests/test_water_wind.rs

use glam::{DVec2, Vec2};

use super::params::WaterParams;

/// Largest integration step; longer gaps (focus loss, tab switch) are clamped.
pub const MAX_DT: f64 = 0.1;
/// Speed floor for the wave clock so it keeps advancing in a dead calm.
pub const MIN_CLOCK_SPEED: f32 = 0.05;
pub const ADVECTION_BASE_PX_PER_SEC: f32 = 35.0;
pub const ADVECTION_WIND_PX_PER_SEC: f32 = 220.0;
/// The falling edge of the speed filter runs at this fraction of the rising rate.
pub const SPEED_FALL_RATIO: f32 = 0.5;
const DIR_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrecipitationKind {
    #[default]
    None,
    Rain,
    Snow,
    Hail,
    Other(u32),
}

impl PrecipitationKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Rain,
            2 => Self::Snow,
            3 => Self::Hail,
            other => Self::Other(other),
        }
    }

    pub fn is_liquid(self) -> bool {
        matches!(self, Self::Rain)
    }
}

/// Live weather as reported by the weather source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherState {
    pub wind_direction: Vec2,
    pub wind_speed01: f32,
    pub precipitation01: f32,
    pub precip_type: u32,
}

impl WeatherState {
    pub fn calm() -> Self {
        Self {
            wind_direction: Vec2::X,
            wind_speed01: 0.0,
            precipitation01: 0.0,
            precip_type: 0,
        }
    }

    pub fn precipitation_kind(&self) -> PrecipitationKind {
        PrecipitationKind::from_code(self.precip_type)
    }
}

/// Per-frame outputs consumed by the uniform packer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindFrame {
    pub wind_dir: Vec2,
    pub wind_speed: f32,
    pub wind_time: f32,
    pub offset_uv: Vec2,
    pub wave_speed: f32,
    pub wave_strength: f32,
    pub wave_dir: Vec2,
    pub dt: f32,
}

impl Default for WindFrame {
    fn default() -> Self {
        Self {
            wind_dir: Vec2::X,
            wind_speed: 0.0,
            wind_time: 0.0,
            offset_uv: Vec2::ZERO,
            wave_speed: 0.0,
            wave_strength: 0.0,
            wave_dir: Vec2::X,
            dt: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AdvectionTrig {
    deg: f32,
    cos: f64,
    sin: f64,
}

/// Wind and advection integrators.
///
/// The filtered direction is kept unnormalized so a full reversal passes
/// through zero instead of sticking; the reported direction is its unit
/// vector (raw direction when the filter sits at the origin).
#[derive(Debug, Clone)]
pub struct WindState {
    wind_time: f64,
    offset_uv: DVec2,
    filtered_dir: DVec2,
    smoothed_speed: f64,
    last_time: Option<f64>,
    last_raw_dir: DVec2,
    advection_trig: Option<AdvectionTrig>,
    trig_updates: u64,
    last_frame: WindFrame,
}

impl Default for WindState {
    fn default() -> Self {
        Self::new()
    }
}

impl WindState {
    pub fn new() -> Self {
        Self {
            wind_time: 0.0,
            offset_uv: DVec2::ZERO,
            filtered_dir: DVec2::X,
            smoothed_speed: 0.0,
            last_time: None,
            last_raw_dir: DVec2::X,
            advection_trig: None,
            trig_updates: 0,
            last_frame: WindFrame::default(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn wind_time(&self) -> f64 {
        self.wind_time
    }

    pub fn offset_uv(&self) -> DVec2 {
        self.offset_uv
    }

    pub fn smoothed_speed(&self) -> f32 {
        self.smoothed_speed as f32
    }

    pub fn last_frame(&self) -> WindFrame {
        self.last_frame
    }

    /// How many times the advection offset trig has been recomputed.
    pub fn advection_trig_updates(&self) -> u64 {
        self.trig_updates
    }

    /// Unit direction of the filtered wind.
    pub fn smoothed_dir(&self) -> Vec2 {
        self.output_dir().as_vec2()
    }

    fn output_dir(&self) -> DVec2 {
        if self.filtered_dir.length() < DIR_EPSILON {
            self.last_raw_dir
        } else {
            self.filtered_dir.normalize()
        }
    }

    /// Advance to wall-clock `now_secs`.
    ///
    /// Without weather the fallback heading and speed from `params.wind` drive
    /// the integrators. The first tick only seeds the filters (dt = 0).
    pub fn tick(
        &mut self,
        now_secs: f64,
        weather: Option<&WeatherState>,
        params: &WaterParams,
        scene_size: Vec2,
    ) -> WindFrame {
        let wind = &params.wind;
        let waves = &params.waves;

        let first = self.last_time.is_none();
        let dt = match self.last_time {
            Some(last) => (now_secs - last).clamp(0.0, MAX_DT),
            None => 0.0,
        };
        self.last_time = Some(match self.last_time {
            Some(last) => last.max(now_secs),
            None => now_secs,
        });

        let (raw_vec, raw_speed) = match weather {
            Some(w) => (w.wind_direction.as_dvec2(), w.wind_speed01),
            None => {
                let rad = (wind.fallback_wind_dir_deg as f64).to_radians();
                (DVec2::new(rad.cos(), rad.sin()), wind.fallback_wind_speed01)
            }
        };
        let raw_dir = if raw_vec.length() < DIR_EPSILON {
            self.last_raw_dir
        } else {
            raw_vec.normalize()
        };
        self.last_raw_dir = raw_dir;
        let raw_speed = (raw_speed as f64).clamp(0.0, 1.0);

        if first || !wind.use_target_wind_direction {
            self.filtered_dir = raw_dir;
        } else {
            let alpha = 1.0 - (-(wind.wind_dir_responsiveness as f64) * dt).exp();
            self.filtered_dir += (raw_dir - self.filtered_dir) * alpha;
        }

        if first {
            self.smoothed_speed = raw_speed;
        } else {
            let up = wind.wind_speed_responsiveness as f64;
            let rate = if raw_speed > self.smoothed_speed {
                up
            } else {
                up * SPEED_FALL_RATIO as f64
            };
            let alpha = 1.0 - (-rate * dt).exp();
            self.smoothed_speed += (raw_speed - self.smoothed_speed) * alpha;
        }
        let speed = self.smoothed_speed as f32;

        let wave_speed = if waves.wave_speed_use_wind {
            waves.wave_speed * lerp(waves.wave_speed_min_factor, 1.0, speed)
        } else {
            waves.wave_speed
        };
        let wave_strength = if waves.wave_strength_use_wind {
            waves.wave_strength * lerp(waves.wave_strength_min_factor, 1.0, speed)
        } else {
            waves.wave_strength
        };

        let clock_rate = if waves.wave_speed_use_wind {
            speed.max(MIN_CLOCK_SPEED)
        } else {
            1.0
        };
        self.wind_time += dt * clock_rate as f64 * wave_speed as f64;

        let dir = self.output_dir();
        let (cos, sin) = self.advection_trig(wind.advection_dir_offset_deg);
        let adv_dir = DVec2::new(dir.x * cos - dir.y * sin, dir.x * sin + dir.y * cos);
        let px_per_sec = (ADVECTION_BASE_PX_PER_SEC + ADVECTION_WIND_PX_PER_SEC * speed) as f64
            * wind.advection_multiplier() as f64;
        let size = scene_size.max(Vec2::ONE).as_dvec2();
        self.offset_uv += adv_dir * px_per_sec * dt / size;

        let wave_dir = if waves.lock_wave_travel_to_wind {
            dir
        } else {
            let rad = (waves.wave_direction_offset_deg as f64).to_radians();
            DVec2::new(rad.cos(), rad.sin())
        };

        self.last_frame = WindFrame {
            wind_dir: dir.as_vec2(),
            wind_speed: speed,
            wind_time: self.wind_time as f32,
            offset_uv: self.offset_uv.as_vec2(),
            wave_speed,
            wave_strength,
            wave_dir: wave_dir.as_vec2(),
            dt: dt as f32,
        };
        self.last_frame
    }

    fn advection_trig(&mut self, deg: f32) -> (f64, f64) {
        match self.advection_trig {
            Some(t) if t.deg == deg => (t.cos, t.sin),
            _ => {
                let (sin, cos) = (deg as f64).to_radians().sin_cos();
                self.advection_trig = Some(AdvectionTrig { deg, cos, sin });
                self.trig_updates += 1;
                (cos, sin)
            }
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(dir: Vec2, speed: f32) -> WeatherState {
        WeatherState {
            wind_direction: dir,
            wind_speed01: speed,
            precipitation01: 0.0,
            precip_type: 0,
        }
    }

    #[test]
    fn first_tick_has_zero_dt() {
        let mut w = WindState::new();
        let f = w.tick(100.0, None, &WaterParams::default(), Vec2::splat(1000.0));
        assert_eq!(f.dt, 0.0);
        assert_eq!(f.wind_time, 0.0);
        assert_eq!(f.offset_uv, Vec2::ZERO);
    }

    #[test]
    fn dt_spikes_are_clamped() {
        let mut w = WindState::new();
        let p = WaterParams::default();
        w.tick(0.0, None, &p, Vec2::splat(1000.0));
        let f = w.tick(30.0, None, &p, Vec2::splat(1000.0));
        assert!((f.dt - 0.1).abs() < 1e-6);
    }

    #[test]
    fn time_going_backwards_does_not_integrate() {
        let mut w = WindState::new();
        let p = WaterParams::default();
        w.tick(5.0, None, &p, Vec2::splat(1000.0));
        let a = w.tick(5.05, None, &p, Vec2::splat(1000.0));
        let b = w.tick(4.0, None, &p, Vec2::splat(1000.0));
        assert_eq!(b.dt, 0.0);
        assert_eq!(a.wind_time, b.wind_time);
    }

    #[test]
    fn zero_wind_vector_reuses_last_direction() {
        let mut w = WindState::new();
        let p = WaterParams::default();
        w.tick(0.0, Some(&weather(Vec2::Y, 0.5)), &p, Vec2::ONE * 100.0);
        let f = w.tick(0.05, Some(&weather(Vec2::ZERO, 0.5)), &p, Vec2::ONE * 100.0);
        assert!((f.wind_dir - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn advection_trig_recomputes_only_on_change() {
        let mut w = WindState::new();
        let mut p = WaterParams::default();
        for i in 0..10 {
            w.tick(i as f64 * 0.016, None, &p, Vec2::ONE * 512.0);
        }
        assert_eq!(w.advection_trig_updates(), 1);
        p.wind.advection_dir_offset_deg = 15.0;
        w.tick(0.2, None, &p, Vec2::ONE * 512.0);
        w.tick(0.21, None, &p, Vec2::ONE * 512.0);
        assert_eq!(w.advection_trig_updates(), 2);
    }

    #[test]
    fn unlocked_waves_use_fixed_heading() {
        let mut w = WindState::new();
        let mut p = WaterParams::default();
        p.waves.lock_wave_travel_to_wind = false;
        p.waves.wave_direction_offset_deg = 90.0;
        let f = w.tick(0.0, Some(&weather(Vec2::X, 0.3)), &p, Vec2::ONE);
        assert!((f.wave_dir - Vec2::Y).length() < 1e-5);
        assert!((f.wind_dir - Vec2::X).length() < 1e-5);
    }

    #[test]
    fn liquid_precipitation_is_rain_only() {
        assert!(PrecipitationKind::from_code(1).is_liquid());
        assert!(!PrecipitationKind::from_code(2).is_liquid());
        assert_eq!(PrecipitationKind::from_code(9), PrecipitationKind::Other(9));
    }
}

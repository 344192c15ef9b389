// src/water/defines.rs
// Shader feature defines as a bitmask plus the tracker that gates pipeline rebuilds
// All define-controlling parameters are folded into one key evaluated once per frame
// RELEVANT FILES: src/water/pass.rs, src/shaders/water.frag, tests/test_water_shader_validate.rs

use std::fmt;

use super::params::WaterParams;

/// Bitmask of GLSL feature defines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FeatureFlags(u32);

impl FeatureFlags {
    pub const NONE: Self = Self(0);
    pub const FOAM_FLECKS: Self = Self(1 << 0);
    pub const REFRACTION_MULTITAP: Self = Self(1 << 1);
    pub const CHROMATIC_ABERRATION: Self = Self(1 << 2);
    pub const SAND: Self = Self(1 << 3);

    const TABLE: [(Self, &'static str); 4] = [
        (Self::FOAM_FLECKS, "USE_FOAM_FLECKS"),
        (Self::REFRACTION_MULTITAP, "USE_WATER_REFRACTION_MULTITAP"),
        (Self::CHROMATIC_ABERRATION, "USE_WATER_CHROMATIC_ABERRATION"),
        (Self::SAND, "USE_SAND"),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & 0b1111)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, other: Self, on: bool) {
        if on {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }

    /// Flags implied by a parameter set.
    ///
    /// `USE_SAND` is only emitted with the `sand-define` crate feature; the
    /// default build keeps sand out of the define set and gates it with the
    /// sand intensity uniform.
    pub fn from_params(params: &WaterParams) -> Self {
        let mut flags = Self::NONE;
        flags.set(
            Self::FOAM_FLECKS,
            params.foam.foam_enabled && params.foam.foam_flecks_enabled,
        );
        flags.set(
            Self::REFRACTION_MULTITAP,
            params.refraction.refraction_multitap_enabled,
        );
        flags.set(
            Self::CHROMATIC_ABERRATION,
            params.chromatic.chromatic_aberration_enabled,
        );
        flags.set(
            Self::SAND,
            cfg!(feature = "sand-define") && params.sand.sand_enabled,
        );
        flags
    }

    pub fn names(self) -> Vec<&'static str> {
        Self::TABLE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Define map in the shape wgpu's GLSL source expects.
    pub fn define_map(self) -> naga::FastHashMap<String, String> {
        self.names()
            .into_iter()
            .map(|name| (name.to_string(), "1".to_string()))
            .collect()
    }

    /// Every combination of the four defines.
    pub fn all_combinations() -> impl Iterator<Item = Self> {
        (0u32..16).map(Self::from_bits_truncate)
    }
}

impl std::ops::BitOr for FeatureFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for FeatureFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// Remembers the last compiled define key and counts rebuilds.
#[derive(Debug, Default, Clone)]
pub struct DefineTracker {
    current: Option<FeatureFlags>,
    rebuilds: u64,
}

impl DefineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `flags` differs from the compiled key (or nothing is compiled yet).
    pub fn observe(&mut self, flags: FeatureFlags) -> bool {
        if self.current == Some(flags) {
            return false;
        }
        self.current = Some(flags);
        self.rebuilds += 1;
        true
    }

    pub fn current(&self) -> Option<FeatureFlags> {
        self.current
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Forget the compiled key so the next observe rebuilds.
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_enable_three_defines() {
        let flags = FeatureFlags::from_params(&WaterParams::default());
        assert!(flags.contains(FeatureFlags::FOAM_FLECKS));
        assert!(flags.contains(FeatureFlags::REFRACTION_MULTITAP));
        assert!(flags.contains(FeatureFlags::CHROMATIC_ABERRATION));
        assert!(!flags.contains(FeatureFlags::SAND));
    }

    #[cfg(not(feature = "sand-define"))]
    #[test]
    fn sand_never_becomes_a_define_by_default() {
        let mut p = WaterParams::default();
        p.sand.sand_enabled = true;
        assert!(!FeatureFlags::from_params(&p).contains(FeatureFlags::SAND));
    }

    #[test]
    fn non_define_params_never_rebuild() {
        let mut p = WaterParams::default();
        let mut tracker = DefineTracker::new();
        assert!(tracker.observe(FeatureFlags::from_params(&p)));
        for v in [0.1, 0.7, 2.0] {
            p.waves.wave_speed = v;
            p.foam.foam_strength = v;
            p.specular.spec_strength = v * 10.0;
            assert!(!tracker.observe(FeatureFlags::from_params(&p)));
        }
        assert_eq!(tracker.rebuilds(), 1);
    }

    #[test]
    fn define_param_toggle_rebuilds_exactly_once() {
        let mut p = WaterParams::default();
        let mut tracker = DefineTracker::new();
        tracker.observe(FeatureFlags::from_params(&p));
        p.chromatic.chromatic_aberration_enabled = false;
        assert!(tracker.observe(FeatureFlags::from_params(&p)));
        assert!(!tracker.observe(FeatureFlags::from_params(&p)));
        assert_eq!(tracker.rebuilds(), 2);
    }

    #[test]
    fn define_map_lists_active_names() {
        let flags = FeatureFlags::FOAM_FLECKS | FeatureFlags::SAND;
        let map = flags.define_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("USE_SAND").map(String::as_str), Some("1"));
        assert_eq!(flags.to_string(), "USE_FOAM_FLECKS|USE_SAND");
        assert_eq!(FeatureFlags::all_combinations().count(), 16);
    }
}

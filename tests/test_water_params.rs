// tests/test_water_params.rs
// Parameter flow through an inert WaterPass: weather coupling, presets, define selection
// No device needed; an inert pass still packs its uniforms every update

use glam::Vec2;
use serde_json::json;

use mapwater::water::defines::FeatureFlags;
use mapwater::water::params::WaterParams;
use mapwater::water::pass::{PassPhase, TimeInfo, WaterPass};
use mapwater::water::wind::WeatherState;

fn inert_pass(params: WaterParams) -> WaterPass {
    let mut pass = WaterPass::new(params);
    pass.init(None, wgpu::TextureFormat::Rgba8Unorm);
    assert!(pass.is_inert());
    assert_eq!(pass.phase(), PassPhase::Ready);
    pass
}

fn rain(precipitation01: f32, precip_type: u32) -> WeatherState {
    WeatherState {
        wind_direction: Vec2::X,
        wind_speed01: 0.4,
        precipitation01,
        precip_type,
    }
}

#[test]
fn rain_follows_weather_only_for_liquid_precipitation() {
    let mut pass = inert_pass(WaterParams::default());
    pass.set_param("rainDistortionEnabled", &json!(true)).unwrap();
    pass.set_param("rainDistortionUseWeather", &json!(true)).unwrap();
    pass.set_param("rainPrecipitation", &json!(0.25)).unwrap();

    pass.set_weather(Some(rain(0.8, 1)));
    pass.update(&TimeInfo::at(0.0));
    assert!((pass.uniforms().rain_precipitation() - 0.8).abs() < 1e-6);

    pass.set_weather(Some(rain(0.8, 2)));
    pass.update(&TimeInfo::at(0.016));
    assert!((pass.uniforms().rain_precipitation() - 0.25).abs() < 1e-6);

    pass.set_weather(None);
    pass.update(&TimeInfo::at(0.033));
    assert!((pass.uniforms().rain_precipitation() - 0.25).abs() < 1e-6);
}

#[test]
fn weather_coupling_can_be_turned_off() {
    let mut pass = inert_pass(WaterParams::default());
    pass.set_param("rainDistortionUseWeather", &json!(false)).unwrap();
    pass.set_param("rainPrecipitation", &json!(0.1)).unwrap();
    pass.set_weather(Some(rain(0.9, 1)));
    pass.update(&TimeInfo::at(1.0));
    assert!((pass.uniforms().rain_precipitation() - 0.1).abs() < 1e-6);
}

#[test]
fn unknown_and_mistyped_params() {
    let mut pass = inert_pass(WaterParams::default());
    assert!(!pass.set_param("definitelyNotAKnob", &json!(1.0)).unwrap());
    assert!(pass.set_param("waveStrength", &json!("strong")).is_err());
    assert!(pass.set_param("waveStrength", &json!(0.5)).unwrap());
    assert_eq!(pass.params().waves.wave_strength, 0.5);
}

#[test]
fn enabled_flag_reaches_the_uniforms() {
    let mut pass = inert_pass(WaterParams::default());
    pass.update(&TimeInfo::at(0.0));
    assert_eq!(pass.uniforms().frame[3], 1.0);

    pass.set_param("enabled", &json!(false)).unwrap();
    pass.update(&TimeInfo::at(0.016));
    assert_eq!(pass.uniforms().frame[3], 0.0);
}

#[test]
fn sand_intensity_is_zero_while_disabled() {
    let mut pass = inert_pass(WaterParams::default());
    pass.set_param("sandEnabled", &json!(false)).unwrap();
    pass.set_param("sandIntensity", &json!(0.7)).unwrap();
    pass.update(&TimeInfo::at(0.0));
    assert_eq!(pass.uniforms().sand_intensity(), 0.0);

    pass.set_param("sandEnabled", &json!(true)).unwrap();
    pass.update(&TimeInfo::at(0.016));
    assert!((pass.uniforms().sand_intensity() - 0.7).abs() < 1e-6);
}

#[test]
fn flat_preset_drives_the_pass_like_a_grouped_one() {
    let flat = WaterParams::from_json(&json!({
        "tintStrength": 0.5,
        "foamEnabled": true,
        "foamFlecksEnabled": true,
        "refractionMultitapEnabled": true
    }))
    .unwrap();
    let grouped = WaterParams::from_json(&json!({
        "tint": {"tintStrength": 0.5},
        "foam": {"foamEnabled": true, "foamFlecksEnabled": true},
        "refraction": {"refractionMultitapEnabled": true}
    }))
    .unwrap();
    assert_eq!(flat, grouped);

    let mut a = inert_pass(flat);
    let mut b = inert_pass(grouped);
    a.update(&TimeInfo::at(2.0));
    b.update(&TimeInfo::at(2.0));
    assert_eq!(a.uniforms(), b.uniforms());
}

#[test]
fn define_set_follows_feature_toggles() {
    let mut params = WaterParams::default();
    params.foam.foam_enabled = true;
    params.foam.foam_flecks_enabled = true;
    params.chromatic.chromatic_aberration_enabled = true;
    params.refraction.refraction_multitap_enabled = false;
    let flags = FeatureFlags::from_params(&params);
    assert!(flags.contains(FeatureFlags::FOAM_FLECKS));
    assert!(flags.contains(FeatureFlags::CHROMATIC_ABERRATION));
    assert!(!flags.contains(FeatureFlags::REFRACTION_MULTITAP));

    // Flecks need foam.
    params.foam.foam_enabled = false;
    assert!(!FeatureFlags::from_params(&params).contains(FeatureFlags::FOAM_FLECKS));
}

#[test]
fn sun_direction_is_cached_between_frames() {
    let mut pass = inert_pass(WaterParams::default());
    for i in 0..5 {
        pass.update(&TimeInfo::at(i as f64 * 0.016));
    }
    assert_eq!(pass.sun_recomputes(), 1);
    pass.set_sun_angles(90.0, 30.0);
    pass.update(&TimeInfo::at(0.1));
    pass.update(&TimeInfo::at(0.12));
    assert_eq!(pass.sun_recomputes(), 2);
}

#[test]
fn inert_pass_never_builds_a_pipeline() {
    let mut pass = inert_pass(WaterParams::default());
    pass.set_param("chromaticAberrationEnabled", &json!(true)).unwrap();
    pass.update(&TimeInfo::at(0.0));
    assert_eq!(pass.define_rebuilds(), 0);
    assert!(pass.current_defines().is_none());
    assert!(pass.water_data_texture().is_none());
    assert!(!pass.uniforms().has_water_data());
}

#[test]
fn disposed_pass_ignores_further_calls() {
    let mut pass = inert_pass(WaterParams::default());
    pass.update(&TimeInfo::at(0.0));
    pass.dispose();
    assert_eq!(pass.phase(), PassPhase::Disposed);

    let before = *pass.uniforms();
    pass.update(&TimeInfo::at(5.0));
    assert_eq!(*pass.uniforms(), before);
    assert_eq!(pass.on_floor_change(3), None);

    pass.init(None, wgpu::TextureFormat::Rgba8Unorm);
    assert_eq!(pass.phase(), PassPhase::Disposed);
}

#[test]
fn stale_populate_tickets_are_discarded() {
    let mut pass = inert_pass(WaterParams::default());
    let first = pass.begin_populate();
    let second = pass.begin_populate();
    assert!(second.generation() > first.generation());
    assert!(!pass.complete_populate(first, Vec::new()).unwrap());
    // Current ticket, but an inert pass cannot take data.
    assert!(!pass.complete_populate(second, Vec::new()).unwrap());
}

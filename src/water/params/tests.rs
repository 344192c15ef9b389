use super::*;
use serde_json::json;

#[test]
fn default_params_round_trip_through_json() {
    let params = WaterParams::default();
    let json = params.to_json().expect("serialize default params");
    let back = WaterParams::from_json(&json).expect("reload default params");
    assert_eq!(back, params);
}

#[test]
fn keys_match_loosely() {
    let mut p = WaterParams::default();
    assert!(p.set("wave_speed", &json!(1.25)).unwrap());
    assert!(p.set("Foam-Strength", &json!(0.1)).unwrap());
    assert!(p.set(" debugView ", &json!(3)).unwrap());
    assert_eq!(p.waves.wave_speed, 1.25);
    assert_eq!(p.foam.foam_strength, 0.1);
    assert_eq!(p.debug.debug_view, 3);
    assert!(!p.set("noSuchKnob", &json!(1.0)).unwrap());
}

#[test]
fn dark_hex_and_packed_colors_stay_dark() {
    let mut p = WaterParams::default();
    p.set("murkColor", &json!("#010101")).unwrap();
    p.set("foamColor", &json!(0x020202)).unwrap();
    let r = p.resolved();
    for c in r.murk.murk_color.0 {
        assert!((c - 1.0 / 255.0).abs() < 1e-6, "hex channel {c}");
    }
    for c in r.foam.foam_color.0 {
        assert!((c - 2.0 / 255.0).abs() < 1e-6, "packed channel {c}");
    }
}

#[test]
fn wrong_value_type_is_a_config_error() {
    let mut p = WaterParams::default();
    let err = p.set("waveSpeed", &json!("fast")).unwrap_err();
    assert_eq!(err.category(), "Config");
    assert_eq!(p.waves.wave_speed, WaveParams::default().wave_speed);
}

#[test]
fn colors_accept_several_shapes() {
    let mut p = WaterParams::default();
    p.set("foamColor", &json!({"r": 255, "g": 128, "b": 0})).unwrap();
    p.set("murkColor", &json!("#336699")).unwrap();
    p.set("tintColor", &json!([0.2, 0.4, 0.6])).unwrap();
    let r = p.resolved();
    assert!((r.foam.foam_color.r() - 1.0).abs() < 1e-6);
    assert!((r.foam.foam_color.g() - 128.0 / 255.0).abs() < 1e-6);
    assert!((r.murk.murk_color.b() - 0x99 as f32 / 255.0).abs() < 1e-6);
    assert_eq!(r.tint.tint_color, Rgb::new(0.2, 0.4, 0.6));
}

#[test]
fn legacy_alias_used_only_when_current_name_is_default() {
    let p = WaterParams::from_json(&json!({"advectionSpeed": 0.8, "causticsStrength": 0.9}))
        .unwrap()
        .resolved();
    assert_eq!(p.wind.advection_speed01, 0.8);
    assert_eq!(p.caustics.caustics_intensity, 0.9);

    let p = WaterParams::from_json(&json!({
        "advectionSpeed": 0.8,
        "advectionSpeed01": 0.1,
        "waveAppearanceOffsetDeg": 45.0,
        "foamAmount": 0.2,
        "specularStrength": 12.0
    }))
    .unwrap()
    .resolved();
    assert_eq!(p.wind.advection_speed01, 0.1);
    assert_eq!(p.waves.wave_appearance_rot_deg, 45.0);
    assert_eq!(p.foam.foam_strength, 0.2);
    assert_eq!(p.specular.spec_strength, 12.0);
    assert!(p.legacy.is_empty());
}

#[test]
fn grouped_and_flat_presets_agree() {
    let grouped = WaterParams::from_json(&json!({
        "waves": {"waveSpeed": 1.4, "lockWaveTravelToWind": false},
        "sand": {"sandEnabled": true}
    }))
    .unwrap();
    let flat = WaterParams::from_json(&json!({
        "waveSpeed": 1.4,
        "lockWaveTravelToWind": false,
        "sandEnabled": true
    }))
    .unwrap();
    assert_eq!(grouped, flat);
    assert!(grouped.sand.sand_enabled);
}

#[test]
fn unknown_keys_are_skipped() {
    let p = WaterParams::from_json(&json!({"waves": {"bogus": 1}, "alsoBogus": 2})).unwrap();
    assert_eq!(p, WaterParams::default());
}

#[test]
fn out_of_range_values_clamp_silently() {
    let mut p = WaterParams::default();
    p.sand.sand_chunk_scale = 0.1;
    p.sdf.build_resolution = 8192;
    p.debug.debug_view = 42;
    let r = p.resolved();
    assert_eq!(r.sand.sand_chunk_scale, SAND_CHUNK_SCALE_MIN);
    assert_eq!(r.sdf.build_resolution, 2048);
    assert_eq!(r.debug.debug_view, MAX_DEBUG_VIEW);

    p.sand.sand_chunk_scale = 500.0;
    assert_eq!(p.resolved().sand.sand_chunk_scale, SAND_CHUNK_SCALE_MAX);
}

#[test]
fn normalize_key_strips_separators() {
    assert_eq!(normalize_key(" Wave_Speed-Min.Factor "), "wavespeedminfactor");
}

#[test]
fn advection_multiplier_maps_half_to_unity() {
    let mut w = WindParams::default();
    w.advection_speed01 = 0.5;
    assert!((w.advection_multiplier() - 1.0).abs() < 1e-6);
}

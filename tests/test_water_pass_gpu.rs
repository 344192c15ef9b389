// tests/test_water_pass_gpu.rs
// End-to-end WaterPass scenarios on a headless device
// Skips (with a note) when no adapter is available

use image::{Rgba, RgbaImage};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use mapwater::error::{WaterError, WaterResult};
use mapwater::gpu::GpuHandles;
use mapwater::util::readback::read_rgba8;
use mapwater::util::tex_upload::{create_rgba8_texture, GpuTexture};
use mapwater::water::camera::SceneCamera;
use mapwater::water::params::WaterParams;
use mapwater::water::pass::{InputTarget, OutputTarget, TimeInfo, WaterPass};
use mapwater::water::populate::build_floor_surfaces;
use mapwater::water::tiles::{MaskLoader, SceneDescriptor, SceneGeometry, SceneTile};

const SIZE: u32 = 256;
const SCENE_PX: f32 = 1024.0;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

struct MemoryLoader(HashMap<String, RgbaImage>);

impl MaskLoader for MemoryLoader {
    fn exists(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    fn load(&self, path: &str) -> WaterResult<RgbaImage> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| WaterError::load(path))
    }
}

/// One tile covering the scene; its mask is a white square over the middle half.
fn pool_scene() -> (SceneDescriptor, Arc<dyn MaskLoader>) {
    let mask = RgbaImage::from_fn(64, 64, |x, y| {
        let v = if (16..48).contains(&x) && (16..48).contains(&y) { 255 } else { 0 };
        Rgba([v, v, v, 255])
    });
    let mut masks = HashMap::new();
    masks.insert("maps/pool_Water.png".to_string(), mask);

    let scene = SceneDescriptor {
        geometry: SceneGeometry::unpadded(SCENE_PX, SCENE_PX),
        tiles: vec![SceneTile {
            id: "pool".into(),
            x: 0.0,
            y: 0.0,
            width: SCENE_PX,
            height: SCENE_PX,
            rotation_deg: 0.0,
            texture_path: "maps/pool.png".into(),
            elevation: None,
        }],
    };
    (scene, Arc::new(MemoryLoader(masks)))
}

fn colored_input(x: u32, y: u32) -> [u8; 4] {
    [(x % 256) as u8, (y % 256) as u8, ((x * 3 + y * 5) % 256) as u8, 255]
}

fn checker_gray(x: u32, y: u32) -> [u8; 4] {
    let v = if ((x / 4) + (y / 4)) % 2 == 0 { 40 } else { 220 };
    [v, v, v, 255]
}

struct Harness {
    gpu: GpuHandles,
    pass: WaterPass,
    input: GpuTexture,
    output: wgpu::Texture,
    output_view: Arc<wgpu::TextureView>,
    input_bytes: Vec<u8>,
    time: f64,
}

impl Harness {
    async fn new(params: WaterParams, pattern: fn(u32, u32) -> [u8; 4]) -> Option<Self> {
        let Some(gpu) = GpuHandles::request_headless("water-pass-test") else {
            eprintln!("skipping: no GPU adapter available");
            return None;
        };

        let mut input_bytes = Vec::with_capacity((SIZE * SIZE * 4) as usize);
        for y in 0..SIZE {
            for x in 0..SIZE {
                input_bytes.extend_from_slice(&pattern(x, y));
            }
        }
        let input = create_rgba8_texture(&gpu.device, &gpu.queue, "test.input", &input_bytes, SIZE, SIZE)
            .expect("input texture");
        let output = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test.output"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let output_view = Arc::new(output.create_view(&wgpu::TextureViewDescriptor::default()));

        let mut pass = WaterPass::new(params);
        pass.set_param("buildResolution", &json!(SIZE)).unwrap();
        pass.init(Some(gpu.clone()), FORMAT);
        assert!(!pass.is_inert());

        let (scene, loader) = pool_scene();
        let report = pass.populate(&scene, loader).await.expect("populate");
        assert_eq!(report.floors_built, 1);

        Some(Self {
            gpu,
            pass,
            input,
            output,
            output_view,
            input_bytes,
            time: 0.0,
        })
    }

    fn frame(&mut self, occluder: Option<&wgpu::TextureView>) -> Vec<u8> {
        let view = self.output_view.clone();
        self.try_frame(occluder, &view, SIZE).expect("render")
    }

    /// Update and render into `output_view` (square, `output_size` px). Reads back
    /// the harness output on success.
    fn try_frame(
        &mut self,
        occluder: Option<&wgpu::TextureView>,
        output_view: &wgpu::TextureView,
        output_size: u32,
    ) -> WaterResult<Vec<u8>> {
        self.time += 1.0 / 60.0;
        self.pass.update(&TimeInfo::at(self.time));

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("test.frame"),
            });
        let input = InputTarget {
            view: &self.input.view,
            width: SIZE,
            height: SIZE,
        };
        let output = OutputTarget {
            view: output_view,
            width: output_size,
            height: output_size,
        };
        self.pass.render(
            &mut encoder,
            &SceneCamera::top_down(SCENE_PX, SCENE_PX),
            &input,
            &output,
            occluder,
        )?;
        self.gpu.queue.submit(Some(encoder.finish()));
        Ok(read_rgba8(&self.gpu, &self.output).expect("readback"))
    }
}

fn px(buf: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * SIZE + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

/// Output pixels covering the water square (scene 256..768 -> output 64..192).
fn deep_water() -> impl Iterator<Item = (u32, u32)> {
    (80..176).flat_map(|y| (80..176).map(move |x| (x, y)))
}

fn far_from_water() -> impl Iterator<Item = (u32, u32)> {
    (0..SIZE).flat_map(|y| (0..SIZE).map(move |x| (x, y))).filter(|&(x, y)| {
        let dx = if x < 64 { 64 - x } else { x.saturating_sub(192) };
        let dy = if y < 64 { 64 - y } else { y.saturating_sub(192) };
        dx.max(dy) > 24
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn water_changes_inside_and_passes_through_outside() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    let out = h.frame(None);

    let (mut changed, mut total) = (0, 0);
    for (x, y) in deep_water() {
        total += 1;
        if px(&out, x, y) != px(&h.input_bytes, x, y) {
            changed += 1;
        }
    }
    assert!(changed * 2 > total, "only {changed}/{total} water pixels changed");

    for (x, y) in far_from_water() {
        assert_eq!(px(&out, x, y), px(&h.input_bytes, x, y), "pixel ({x},{y}) outside water");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn chromatic_aberration_is_the_only_channel_split() {
    let mut params = WaterParams::default();
    for (key, value) in [
        ("tintStrength", json!(0.0)),
        ("refractedDesaturate", json!(0.0)),
        ("causticsEnabled", json!(false)),
        ("specEnabled", json!(false)),
        ("foamEnabled", json!(false)),
        ("floatingFoamEnabled", json!(false)),
        ("murkEnabled", json!(false)),
        ("sandEnabled", json!(false)),
        ("cloudShadowEnabled", json!(false)),
        ("chromaticAberrationEnabled", json!(false)),
        ("chromaticAberrationPx", json!(3.0)),
    ] {
        assert!(params.set(key, &value).unwrap(), "unknown key {key}");
    }
    let Some(mut h) = Harness::new(params, checker_gray).await else {
        return;
    };

    let out = h.frame(None);
    for (x, y) in deep_water() {
        let [r, g, b, _] = px(&out, x, y);
        assert!(r == g && g == b, "gray broke at ({x},{y}): {r},{g},{b}");
    }

    h.pass
        .set_param("chromaticAberrationEnabled", &json!(true))
        .unwrap();
    let out = h.frame(None);
    let split = deep_water().any(|(x, y)| {
        let [r, _, b, _] = px(&out, x, y);
        r != b
    });
    assert!(split, "chromatic aberration produced no channel split");
}

#[tokio::test(flavor = "multi_thread")]
async fn occluded_half_is_untouched() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    let occluder_bytes: Vec<u8> = (0..SIZE)
        .flat_map(|_| (0..SIZE).flat_map(|x| if x < SIZE / 2 { [0, 0, 0, 255] } else { [0, 0, 0, 0] }))
        .collect();
    let occluder = create_rgba8_texture(
        &h.gpu.device,
        &h.gpu.queue,
        "test.occluder",
        &occluder_bytes,
        SIZE,
        SIZE,
    )
    .unwrap();

    let out = h.frame(Some(&occluder.view));
    for y in 0..SIZE {
        for x in 0..SIZE / 2 {
            assert_eq!(px(&out, x, y), px(&h.input_bytes, x, y), "occluded pixel ({x},{y})");
        }
    }
    let right_changed = deep_water()
        .filter(|&(x, _)| x >= SIZE / 2)
        .any(|(x, y)| px(&out, x, y) != px(&h.input_bytes, x, y));
    assert!(right_changed);

    // Binding through the floor binder behaves the same.
    h.pass.set_floor_occluder(Some(Arc::new(
        occluder.texture.create_view(&wgpu::TextureViewDescriptor::default()),
    )));
    let bound = h.frame(None);
    for y in 0..SIZE {
        for x in 0..SIZE / 2 {
            assert_eq!(px(&bound, x, y), px(&h.input_bytes, x, y));
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn upper_floor_change_keeps_ground_water() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    assert_eq!(h.pass.floor_count(), 1);
    assert_eq!(h.pass.on_floor_change(2), Some(0));
    assert_eq!(h.pass.active_floor(), Some(0));
    h.frame(None);
    assert!(h.pass.uniforms().has_water_data());
    assert!(h.pass.water_data_texture().is_some());
    assert!(h.pass.water_mask_texture().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn populate_is_idempotent() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    let read = |h: &Harness| {
        let tex = h.pass.water_data_texture().expect("water data");
        read_rgba8(&h.gpu, tex).unwrap()
    };
    let first = read(&h);

    let (scene, loader) = pool_scene();
    h.pass.populate(&scene, loader.clone()).await.unwrap();
    let second = read(&h);
    assert_eq!(first, second);

    let options = h.pass.params().resolved().sdf.surface_options();
    let (floors, _) = build_floor_surfaces(&scene, &options, loader).await.unwrap();
    assert_eq!(floors[0].surface.pixels, second);
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_rebuilds_only_when_defines_change() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    h.frame(None);
    let base = h.pass.define_rebuilds();
    assert_eq!(base, 1);

    h.pass.set_param("tintStrength", &json!(0.9)).unwrap();
    h.pass.set_param("waveStrength", &json!(0.2)).unwrap();
    h.frame(None);
    h.frame(None);
    assert_eq!(h.pass.define_rebuilds(), base);

    let was = h.pass.params().chromatic.chromatic_aberration_enabled;
    h.pass
        .set_param("chromaticAberrationEnabled", &json!(!was))
        .unwrap();
    h.frame(None);
    assert_eq!(h.pass.define_rebuilds(), base + 1);
    h.frame(None);
    assert_eq!(h.pass.define_rebuilds(), base + 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn disabled_water_is_a_pass_through() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    h.pass.set_param("enabled", &json!(false)).unwrap();
    let out = h.frame(None);
    assert_eq!(out, h.input_bytes);
}

#[tokio::test(flavor = "multi_thread")]
async fn mismatched_output_size_is_rejected() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    let half = h.gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test.output.half"),
        size: wgpu::Extent3d {
            width: SIZE / 2,
            height: SIZE / 2,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let half_view = half.create_view(&wgpu::TextureViewDescriptor::default());

    let err = h.try_frame(None, &half_view, SIZE / 2).unwrap_err();
    assert_eq!(err.category(), "Render");
    assert!(err.to_string().contains("128x128"), "{err}");

    // The pass is still usable at the matching size.
    h.frame(None);
}

const BROKEN_FRAGMENT: &str = "#version 450\nvoid main() { not glsl at all }\n";

#[tokio::test(flavor = "multi_thread")]
async fn failed_rebuild_keeps_previous_pipeline() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    let good = h.frame(None);
    assert!(h.pass.has_pipeline());

    h.pass.set_fragment_source(Some(BROKEN_FRAGMENT.to_string()));
    let kept = h.frame(None);
    assert!(h.pass.has_pipeline());
    let still_water = deep_water().any(|(x, y)| px(&kept, x, y) != px(&h.input_bytes, x, y));
    assert!(still_water, "previous water pipeline was dropped");
    for (x, y) in far_from_water() {
        assert_eq!(px(&kept, x, y), px(&good, x, y));
    }

    h.pass.set_fragment_source(None);
    h.frame(None);
    assert!(h.pass.has_pipeline());
}

#[tokio::test(flavor = "multi_thread")]
async fn unbuildable_shader_passes_scene_through() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    h.pass.set_fragment_source(Some(BROKEN_FRAGMENT.to_string()));
    let out = h.frame(None);
    assert!(!h.pass.has_pipeline());
    assert_eq!(out, h.input_bytes);
}

#[tokio::test(flavor = "multi_thread")]
async fn debug_views_respect_disabled_water() {
    let Some(mut h) = Harness::new(WaterParams::default(), colored_input).await else {
        return;
    };
    h.pass.set_param("enabled", &json!(false)).unwrap();
    for view in [1, 8] {
        h.pass.set_param("debugView", &json!(view)).unwrap();
        let out = h.frame(None);
        assert_eq!(out, h.input_bytes, "debug view {view} drew with water disabled");
    }

    h.pass.set_param("enabled", &json!(true)).unwrap();
    h.pass.set_param("debugView", &json!(1)).unwrap();
    let out = h.frame(None);
    assert_ne!(out, h.input_bytes);
}

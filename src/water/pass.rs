// src/water/pass.rs
// Fullscreen water pass: GPU material, per-frame uniform sync, floor data and lifecycle
// The fragment program is GLSL compiled through naga; the vertex stage is a WGSL triangle
// RELEVANT FILES: src/shaders/water.frag, src/shaders/water_fullscreen.wgsl, src/water/uniforms.rs

use glam::{Vec2, Vec3};
use log::{debug, info, warn};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use wgpu::util::DeviceExt;

use super::camera::SceneCamera;
use super::defines::{DefineTracker, FeatureFlags};
use super::floors::FloorBinder;
use super::noise::{noise_rgba, NOISE_SIZE};
use super::params::WaterParams;
use super::populate::{build_floor_surfaces, FloorSurface, PopulateReport, PopulateTicket};
use super::tiles::{MaskLoader, SceneDescriptor, SceneGeometry};
use super::uniforms::{SunDirectionCache, WaterUniforms};
use super::wind::{WeatherState, WindState};
use crate::error::{WaterError, WaterResult};
use crate::gpu::GpuHandles;
use crate::util::tex_upload::{create_rgba8_texture, create_solid_texture, GpuTexture};

/// Fragment program source (GLSL 450).
pub const WATER_FRAGMENT_GLSL: &str = include_str!("../shaders/water.frag");
/// Fullscreen triangle vertex stage (WGSL).
pub const WATER_VERTEX_WGSL: &str = include_str!("../shaders/water_fullscreen.wgsl");

const DEFAULT_SUN_AZIMUTH_DEG: f32 = 135.0;
const DEFAULT_SUN_ELEVATION_DEG: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPhase {
    Created,
    Ready,
    Disposed,
}

/// Frame clock handed to [`WaterPass::update`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeInfo {
    /// Seconds since the host clock started; drives the wind integrators.
    pub elapsed_secs: f64,
    pub delta_secs: f64,
}

impl TimeInfo {
    pub fn at(elapsed_secs: f64) -> Self {
        Self {
            elapsed_secs,
            delta_secs: 0.0,
        }
    }
}

/// Lit scene color target; sampled as `tDiffuse`. Must be a filterable float format.
#[derive(Debug, Clone, Copy)]
pub struct InputTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Render target for the composite. Must match the input size texel for texel.
#[derive(Debug, Clone, Copy)]
pub struct OutputTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Depth fallback for occlusion when no occluder mask is bound.
///
/// `view` is an R32Float texture of linear camera distances in screen space;
/// background texels should hold `ground_distance`.
#[derive(Debug, Clone)]
pub struct DepthInput {
    pub view: Arc<wgpu::TextureView>,
    pub ground_distance: f32,
    pub active_level_elevation: f32,
}

/// GPU data for one floor, dropped with the floor map.
#[derive(Debug)]
struct FloorWaterEntry {
    raw_mask: GpuTexture,
    surface: GpuTexture,
    has_water: bool,
}

struct GpuState {
    gpu: GpuHandles,
    target_format: wgpu::TextureFormat,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    vertex_module: wgpu::ShaderModule,
    pipeline: Option<wgpu::RenderPipeline>,
    // copies tDiffuse when no water pipeline could be built
    passthrough: wgpu::RenderPipeline,
    fragment_source: Option<String>,
    noise: GpuTexture,
    black: GpuTexture,
    white: GpuTexture,
    depth_fallback: wgpu::TextureView,
    clamp_sampler: wgpu::Sampler,
    repeat_sampler: wgpu::Sampler,
}

/// Screen-space water composite over an already-lit scene.
///
/// Lifecycle is `Created -> Ready -> Disposed`. Calls outside their phase are
/// logged at debug level and ignored. Initialized without a GPU the pass is
/// inert: it tracks parameters and uniforms but never uploads or draws.
pub struct WaterPass {
    phase: PassPhase,
    params: WaterParams,
    uniforms: WaterUniforms,
    wind: WindState,
    sun: SunDirectionCache,
    sun_angles: (f32, f32),
    sky_color: Vec3,
    sky_intensity01: f32,
    scene_darkness: f32,
    weather: Option<WeatherState>,
    scene: SceneGeometry,
    cloud_shadow: Option<Arc<wgpu::TextureView>>,
    outdoors: Option<Arc<wgpu::TextureView>>,
    depth: Option<DepthInput>,
    floors: FloorBinder<FloorWaterEntry>,
    defines: DefineTracker,
    generation: u64,
    state: Option<GpuState>,
}

impl Default for WaterPass {
    fn default() -> Self {
        Self::new(WaterParams::default())
    }
}

impl WaterPass {
    pub fn new(params: WaterParams) -> Self {
        Self {
            phase: PassPhase::Created,
            params,
            uniforms: WaterUniforms::default(),
            wind: WindState::new(),
            sun: SunDirectionCache::default(),
            sun_angles: (DEFAULT_SUN_AZIMUTH_DEG, DEFAULT_SUN_ELEVATION_DEG),
            sky_color: Vec3::ONE,
            sky_intensity01: 1.0,
            scene_darkness: 0.0,
            weather: None,
            scene: SceneGeometry::default(),
            cloud_shadow: None,
            outdoors: None,
            depth: None,
            floors: FloorBinder::new(),
            defines: DefineTracker::new(),
            generation: 0,
            state: None,
        }
    }

    /// Create GPU resources. Idempotent; without a GPU the pass stays inert.
    pub fn init(&mut self, gpu: Option<GpuHandles>, target_format: wgpu::TextureFormat) {
        match self.phase {
            PassPhase::Ready => {
                debug!("water: init ignored, pass already initialized");
                return;
            }
            PassPhase::Disposed => {
                debug!("water: init ignored, pass disposed");
                return;
            }
            PassPhase::Created => {}
        }

        match gpu {
            Some(gpu) => match GpuState::new(gpu, target_format) {
                Ok(state) => self.state = Some(state),
                Err(e) => warn!("water: GPU setup failed, pass disabled: {e}"),
            },
            None => warn!("water: no GPU device available, water pass disabled"),
        }
        self.phase = PassPhase::Ready;
    }

    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// True when initialized without usable GPU resources.
    pub fn is_inert(&self) -> bool {
        self.state.is_none()
    }

    // ---------------------------------------------------------------------
    // Populate
    // ---------------------------------------------------------------------

    /// Start a populate; any ticket issued earlier becomes stale.
    pub fn begin_populate(&mut self) -> PopulateTicket {
        self.generation += 1;
        PopulateTicket {
            generation: self.generation,
        }
    }

    /// Upload built floors and swap them in.
    ///
    /// Returns `Ok(false)` when the ticket is stale or the pass cannot accept
    /// data (not ready, disposed, inert). Floors that fail to upload are skipped.
    pub fn complete_populate(
        &mut self,
        ticket: PopulateTicket,
        floors: Vec<FloorSurface>,
    ) -> WaterResult<bool> {
        if ticket.generation != self.generation {
            debug!(
                "water: discarding populate {} (current {})",
                ticket.generation, self.generation
            );
            return Ok(false);
        }
        if self.phase != PassPhase::Ready {
            debug!("water: populate completion ignored in phase {:?}", self.phase);
            return Ok(false);
        }
        let Some(state) = self.state.as_ref() else {
            debug!("water: populate completion ignored, pass is inert");
            return Ok(false);
        };

        let mut entries = Vec::with_capacity(floors.len());
        for floor in floors {
            match upload_floor(state, &floor) {
                Ok(entry) => entries.push((floor.floor_index, entry)),
                Err(e) => warn!("water: floor {} upload failed: {e}", floor.floor_index),
            }
        }

        self.floors.replace_all(entries);
        self.sync_active_floor();
        Ok(true)
    }

    /// Rebuild every floor from `scene`.
    pub async fn populate(
        &mut self,
        scene: &SceneDescriptor,
        loader: Arc<dyn MaskLoader>,
    ) -> WaterResult<PopulateReport> {
        if self.phase != PassPhase::Ready {
            debug!("water: populate ignored in phase {:?}", self.phase);
            return Ok(PopulateReport::default());
        }
        if self.is_inert() {
            debug!("water: populate ignored, pass is inert");
            return Ok(PopulateReport::default());
        }

        let ticket = self.begin_populate();
        let options = self.params.resolved().sdf.surface_options();
        self.scene = scene.geometry;
        let (floors, report) = build_floor_surfaces(scene, &options, loader).await?;
        self.complete_populate(ticket, floors)?;
        Ok(report)
    }

    // ---------------------------------------------------------------------
    // Collaborators
    // ---------------------------------------------------------------------

    pub fn set_sky_color(&mut self, r: f32, g: f32, b: f32) {
        self.sky_color = Vec3::new(r, g, b).clamp(Vec3::ZERO, Vec3::ONE);
    }

    pub fn set_sky_intensity01(&mut self, v: f32) {
        self.sky_intensity01 = v.clamp(0.0, 1.0);
    }

    pub fn set_sun_angles(&mut self, azimuth_deg: f32, elevation_deg: f32) {
        self.sun_angles = (azimuth_deg, elevation_deg);
    }

    /// Screen-space cloud shadow (R = lit). `None` binds the white fallback.
    pub fn set_cloud_shadow_texture(&mut self, view: Option<Arc<wgpu::TextureView>>) {
        self.cloud_shadow = view;
        self.uniforms.set_has_cloud_shadow(self.cloud_shadow.is_some());
    }

    /// Scene-UV outdoors mask (R = outdoors). `None` binds the white fallback.
    pub fn set_outdoors_mask(&mut self, view: Option<Arc<wgpu::TextureView>>) {
        self.outdoors = view;
        self.uniforms.set_has_outdoors(self.outdoors.is_some());
    }

    pub fn set_weather(&mut self, weather: Option<WeatherState>) {
        self.weather = weather;
    }

    pub fn set_scene(&mut self, geometry: SceneGeometry) {
        self.scene = geometry;
    }

    pub fn set_depth_input(&mut self, depth: Option<DepthInput>) {
        self.depth = depth;
        self.uniforms.set_depth(
            self.depth
                .as_ref()
                .map(|d| (d.ground_distance, d.active_level_elevation)),
        );
    }

    pub fn set_scene_darkness(&mut self, darkness: f32) {
        self.scene_darkness = darkness.clamp(0.0, 1.0);
    }

    /// Upper-floor occluder held by the floor binder. `None` releases it.
    pub fn set_floor_occluder(&mut self, view: Option<Arc<wgpu::TextureView>>) {
        match view {
            Some(v) => self.floors.bind_occluder(v),
            None => self.floors.release_occluder(),
        }
    }

    pub fn params(&self) -> &WaterParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut WaterParams {
        &mut self.params
    }

    pub fn set_params(&mut self, params: WaterParams) {
        self.params = params;
    }

    /// Single-key edit by parameter name; returns false for unknown keys.
    pub fn set_param(&mut self, name: &str, value: &Value) -> WaterResult<bool> {
        self.params.set(name, value)
    }

    // ---------------------------------------------------------------------
    // Per frame
    // ---------------------------------------------------------------------

    /// Push time-varying uniforms and rebuild the pipeline if the define set changed.
    pub fn update(&mut self, time: &TimeInfo) {
        if self.phase != PassPhase::Ready {
            debug!("water: update ignored in phase {:?}", self.phase);
            return;
        }

        let resolved = self.params.resolved();
        let scene_size = Vec2::new(self.scene.rect.width, self.scene.rect.height);
        let frame = self
            .wind
            .tick(time.elapsed_secs, self.weather.as_ref(), &resolved, scene_size);
        let sun = self.sun.direction(self.sun_angles.0, self.sun_angles.1);

        let u = &mut self.uniforms;
        u.apply_params(&resolved, self.weather.as_ref());
        u.apply_wind(&frame);
        u.set_time(time.elapsed_secs as f32);
        u.set_sun_direction(sun);
        u.set_sky(self.sky_color, self.sky_intensity01);
        u.set_scene_darkness(self.scene_darkness);
        u.set_has_cloud_shadow(self.cloud_shadow.is_some());
        u.set_has_outdoors(self.outdoors.is_some());
        u.set_depth(
            self.depth
                .as_ref()
                .map(|d| (d.ground_distance, d.active_level_elevation)),
        );
        self.sync_active_floor();

        let Some(state) = self.state.as_mut() else {
            return;
        };
        let flags = FeatureFlags::from_params(&resolved);
        if self.defines.observe(flags) {
            info!("water: building pipeline for defines {flags}");
            state.rebuild(flags);
        }
        state
            .gpu
            .queue
            .write_buffer(&state.uniform_buffer, 0, self.uniforms.as_bytes());
    }

    /// Draw the water composite of `input` into `output`.
    ///
    /// `occluder` overrides the occluder bound through the floor binder. The
    /// output is cleared to transparent and fully overwritten. Uniforms are
    /// written through the queue, so one render per submit.
    ///
    /// Input and output must have the same size; the composite reads the scene
    /// with `texelFetch` at the output fragment coordinate.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        camera: &SceneCamera,
        input: &InputTarget<'_>,
        output: &OutputTarget<'_>,
        occluder: Option<&wgpu::TextureView>,
    ) -> WaterResult<()> {
        if (input.width, input.height) != (output.width, output.height) {
            return Err(WaterError::render(format!(
                "water: output {}x{} does not match input {}x{}",
                output.width, output.height, input.width, input.height
            )));
        }
        if self.phase != PassPhase::Ready {
            debug!("water: render ignored in phase {:?}", self.phase);
            return Ok(());
        }
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };

        let bound_occluder = self.floors.occluder().cloned();
        let occluder = occluder.or(bound_occluder.as_deref());

        self.uniforms.set_view(self.scene, camera.view_bounds());
        self.uniforms.set_texel_size(input.width, input.height);
        self.uniforms.set_has_occluder(occluder.is_some());

        // render before the first update, or after the fragment source changed
        if self.defines.current().is_none() {
            let flags = FeatureFlags::from_params(&self.params.resolved());
            self.defines.observe(flags);
            state.rebuild(flags);
        }
        let pipeline = state.pipeline.as_ref().unwrap_or(&state.passthrough);

        let queue = &state.gpu.queue;
        queue.write_buffer(&state.uniform_buffer, 0, self.uniforms.as_bytes());

        let active = self.floors.active();
        let surface_view = active.map_or(&state.white.view, |e| &e.surface.view);
        let mask_view = active.map_or(&state.black.view, |e| &e.raw_mask.view);
        let occluder_view = occluder.unwrap_or(&state.white.view);
        let cloud_view = self.cloud_shadow.as_deref().unwrap_or(&state.white.view);
        let outdoors_view = self.outdoors.as_deref().unwrap_or(&state.white.view);
        let depth_view = self
            .depth
            .as_ref()
            .map_or(&state.depth_fallback, |d| d.view.as_ref());

        let bind_group = state
            .gpu
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("water.bind_group"),
                layout: &state.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: state.uniform_buffer.as_entire_binding(),
                    },
                    texture_entry(1, input.view),
                    texture_entry(2, surface_view),
                    texture_entry(3, mask_view),
                    texture_entry(4, &state.noise.view),
                    texture_entry(5, occluder_view),
                    texture_entry(6, cloud_view),
                    texture_entry(7, outdoors_view),
                    texture_entry(8, depth_view),
                    wgpu::BindGroupEntry {
                        binding: 9,
                        resource: wgpu::BindingResource::Sampler(&state.clamp_sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 10,
                        resource: wgpu::BindingResource::Sampler(&state.repeat_sampler),
                    },
                ],
            });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("water.pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
        Ok(())
    }

    /// Replace the built-in fragment program; `None` restores it.
    ///
    /// The pipeline is rebuilt on the next update or render. If the new source
    /// fails to build, the previous pipeline stays in use.
    pub fn set_fragment_source(&mut self, source: Option<String>) {
        let Some(state) = self.state.as_mut() else {
            debug!("water: fragment source ignored, no gpu state");
            return;
        };
        state.fragment_source = source;
        self.defines.invalidate();
    }

    /// True once a water pipeline is in use; false while passing the scene through.
    pub fn has_pipeline(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.pipeline.is_some())
    }

    /// Activate the highest floor with water at or below `max_floor`.
    pub fn on_floor_change(&mut self, max_floor: usize) -> Option<usize> {
        if self.phase == PassPhase::Disposed {
            debug!("water: floor change ignored, pass disposed");
            return None;
        }
        let active = self.floors.select(max_floor);
        self.sync_active_floor();
        debug!("water: floor change to {max_floor}, active water floor {active:?}");
        active
    }

    pub fn active_floor(&self) -> Option<usize> {
        self.floors.active_index()
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Composited mask of the active floor.
    pub fn water_mask_texture(&self) -> Option<&wgpu::Texture> {
        self.floors.active().map(|e| &e.raw_mask.texture)
    }

    /// SurfaceData texture of the active floor.
    pub fn water_data_texture(&self) -> Option<&wgpu::Texture> {
        self.floors.active().map(|e| &e.surface.texture)
    }

    /// Drop owned GPU resources and floor data; pending populates become stale.
    pub fn dispose(&mut self) {
        if self.phase == PassPhase::Disposed {
            return;
        }
        self.floors.clear();
        self.floors.release_occluder();
        self.cloud_shadow = None;
        self.outdoors = None;
        self.depth = None;
        self.state = None;
        self.generation += 1;
        self.defines.invalidate();
        self.wind.reset();
        self.uniforms.set_has_water_data(false);
        self.phase = PassPhase::Disposed;
        info!("water: pass disposed");
    }

    pub fn uniforms(&self) -> &WaterUniforms {
        &self.uniforms
    }

    pub fn wind(&self) -> &WindState {
        &self.wind
    }

    /// Pipeline builds so far, including the first.
    pub fn define_rebuilds(&self) -> u64 {
        self.defines.rebuilds()
    }

    pub fn current_defines(&self) -> Option<FeatureFlags> {
        self.defines.current()
    }

    pub fn sun_recomputes(&self) -> u64 {
        self.sun.recomputes()
    }

    fn sync_active_floor(&mut self) {
        let has = self.floors.active().map_or(false, |e| e.has_water);
        self.uniforms.set_has_water_data(has);
    }
}

fn texture_entry(binding: u32, view: &wgpu::TextureView) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    }
}

fn upload_floor(state: &GpuState, floor: &FloorSurface) -> WaterResult<FloorWaterEntry> {
    let device = &state.gpu.device;
    let queue = &state.gpu.queue;
    let raw_mask = create_rgba8_texture(
        device,
        queue,
        &format!("water.raw_mask.floor{}", floor.floor_index),
        floor.raw_mask.as_raw(),
        floor.raw_mask.width(),
        floor.raw_mask.height(),
    )?;
    let s = &floor.surface;
    let surface = create_rgba8_texture(
        device,
        queue,
        &format!("water.surface.floor{}", floor.floor_index),
        &s.pixels,
        s.width,
        s.height,
    )?;
    Ok(FloorWaterEntry {
        raw_mask,
        surface,
        has_water: s.has_water,
    })
}

fn filterable_texture(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// Bind group layout matching the bindings declared in water.frag.
pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("water.bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<WaterUniforms>() as u64
                    ),
                },
                count: None,
            },
            filterable_texture(1), // tDiffuse
            filterable_texture(2), // tWaterData
            filterable_texture(3), // tWaterMask
            filterable_texture(4), // tNoise
            filterable_texture(5), // tWaterOccluderAlpha
            filterable_texture(6), // tCloudShadow
            filterable_texture(7), // tOutdoorsMask
            wgpu::BindGroupLayoutEntry {
                binding: 8, // tDepth, texelFetch only
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            sampler_entry(9),
            sampler_entry(10),
        ],
    })
}

fn create_sampler(device: &wgpu::Device, label: &str, mode: wgpu::AddressMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: mode,
        address_mode_v: mode,
        address_mode_w: mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

impl GpuState {
    fn new(gpu: GpuHandles, target_format: wgpu::TextureFormat) -> WaterResult<Self> {
        let device = gpu.device.clone();
        let queue = gpu.queue.clone();

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("water.uniforms"),
            contents: WaterUniforms::default().as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = create_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("water.pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("water.vertex"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(WATER_VERTEX_WGSL)),
        });

        let noise = create_rgba8_texture(
            &device,
            &queue,
            "water.noise",
            noise_rgba(),
            NOISE_SIZE,
            NOISE_SIZE,
        )?;
        let black = create_solid_texture(&device, &queue, "water.fallback.black", [0, 0, 0, 255])?;
        let white = create_solid_texture(
            &device,
            &queue,
            "water.fallback.white",
            [255, 255, 255, 255],
        )?;

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("water.fallback.depth"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            depth_texture.as_image_copy(),
            bytemuck::bytes_of(&0.0f32),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let depth_fallback = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let passthrough = create_passthrough_pipeline(
            &device,
            &pipeline_layout,
            &vertex_module,
            target_format,
        );

        let clamp_sampler =
            create_sampler(&device, "water.sampler.clamp", wgpu::AddressMode::ClampToEdge);
        let repeat_sampler =
            create_sampler(&device, "water.sampler.repeat", wgpu::AddressMode::Repeat);

        Ok(Self {
            gpu,
            target_format,
            uniform_buffer,
            bind_group_layout,
            pipeline_layout,
            vertex_module,
            pipeline: None,
            passthrough,
            fragment_source: None,
            noise,
            black,
            white,
            depth_fallback,
            clamp_sampler,
            repeat_sampler,
        })
    }

    /// Build `flags`; a failure keeps the current pipeline, else falls back to the base define set.
    fn rebuild(&mut self, flags: FeatureFlags) {
        let built = self.build_pipeline(flags);
        let previous = self.pipeline.take();
        self.pipeline = settle_pipeline(built, previous, || {
            if flags == FeatureFlags::NONE {
                return None;
            }
            warn!("water: falling back to base defines");
            self.build_pipeline(FeatureFlags::NONE)
                .map_err(|e| warn!("water: base pipeline build failed: {e}"))
                .ok()
        });
        if self.pipeline.is_none() {
            warn!("water: no pipeline, passing the scene through");
        }
    }

    /// Compile water.frag with `flags` and link it against the fullscreen vertex stage.
    fn build_pipeline(&self, flags: FeatureFlags) -> WaterResult<wgpu::RenderPipeline> {
        let device = &self.gpu.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("water.fragment"),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(
                    self.fragment_source.as_deref().unwrap_or(WATER_FRAGMENT_GLSL),
                ),
                stage: naga::ShaderStage::Fragment,
                defines: flags.define_map(),
            },
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("water.pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.vertex_module,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: "main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        match pollster::block_on(device.pop_error_scope()) {
            Some(err) => Err(WaterError::render(format!(
                "water shader ({flags}) failed validation: {err}"
            ))),
            None => Ok(pipeline),
        }
    }
}

/// Pipeline to use after a build attempt: the new one, else the previous, else `fallback`.
fn settle_pipeline<P>(
    built: WaterResult<P>,
    previous: Option<P>,
    fallback: impl FnOnce() -> Option<P>,
) -> Option<P> {
    match built {
        Ok(p) => Some(p),
        Err(e) => {
            warn!("water: pipeline build failed: {e}");
            previous.or_else(fallback)
        }
    }
}

fn create_passthrough_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    vertex_module: &wgpu::ShaderModule,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("water.passthrough"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: "vs_main",
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: vertex_module,
            entry_point: "fs_passthrough",
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

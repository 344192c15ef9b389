// src/gpu.rs
// Shared device/queue handles for the water pass and headless tools
// Exists so the pass can hold the device without owning the host renderer
// RELEVANT FILES: src/water/pass.rs, src/util/readback.rs, tests/test_water_pass_gpu.rs

use log::warn;
use std::sync::Arc;

use crate::error::{WaterError, WaterResult};

/// Device and queue handles shared with the host renderer.
///
/// The pass never creates its own device in production; the host hands these
/// in at `init`. Headless tools and tests use [`GpuHandles::request_headless`].
#[derive(Clone)]
pub struct GpuHandles {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuHandles {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    /// Request a low-power headless device. Returns `None` when no adapter exists.
    pub fn request_headless(label: &str) -> Option<Self> {
        Self::headless(label)
            .map_err(|e| warn!("{}: {e}", e.category()))
            .ok()
    }

    /// Like [`GpuHandles::request_headless`], keeping the reason a device is unavailable.
    pub fn headless(label: &str) -> WaterResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| WaterError::device("no compatible adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                label: Some(label),
            },
            None,
        ))
        .map_err(|e| WaterError::device(format!("request_device failed: {e}")))?;

        Ok(Self::new(Arc::new(device), Arc::new(queue)))
    }
}

/// Align to WebGPU's required bytes-per-row for copies.
#[inline]
pub fn align_copy_bpr(unpadded: u32) -> u32 {
    let a = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    ((unpadded + a - 1) / a) * a
}

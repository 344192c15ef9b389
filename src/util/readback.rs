// src/util/readback.rs
// Copies an RGBA8 texture back to the CPU as tightly packed rows
// Used by the GPU scenarios to compare composites and uploaded surface data
// RELEVANT FILES: src/util/tex_upload.rs, src/gpu.rs, tests/test_water_pass_gpu.rs

use futures_intrusive::channel::shared::oneshot_channel;

use crate::error::{WaterError, WaterResult};
use crate::gpu::{align_copy_bpr, GpuHandles};

/// Read the whole of mip 0 of an RGBA8 `texture`.
pub fn read_rgba8(gpu: &GpuHandles, texture: &wgpu::Texture) -> WaterResult<Vec<u8>> {
    if !matches!(
        texture.format(),
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb
    ) {
        return Err(WaterError::render(format!(
            "readback expects rgba8, got {:?}",
            texture.format()
        )));
    }
    let extent = texture.size();
    let row = extent.width * 4;
    let stride = align_copy_bpr(row);

    let staging = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("water.readback"),
        size: u64::from(stride) * u64::from(extent.height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("water.readback"),
        });
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::ImageCopyBuffer {
            buffer: &staging,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(stride),
                rows_per_image: Some(extent.height),
            },
        },
        wgpu::Extent3d {
            depth_or_array_layers: 1,
            ..extent
        },
    );
    gpu.queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = oneshot_channel();
    slice.map_async(wgpu::MapMode::Read, move |r| {
        let _ = tx.send(r);
    });
    gpu.device.poll(wgpu::Maintain::Wait);
    match pollster::block_on(rx.receive()) {
        Some(Ok(())) => {}
        Some(Err(e)) => return Err(WaterError::render(format!("readback map failed: {e}"))),
        None => return Err(WaterError::render("readback map never completed")),
    }

    let pixels = unpad_rows(&slice.get_mapped_range(), row, stride);
    staging.unmap();
    Ok(pixels)
}

/// Drop the copy alignment padding at the end of each `stride`-byte row.
fn unpad_rows(padded: &[u8], row: u32, stride: u32) -> Vec<u8> {
    padded
        .chunks(stride as usize)
        .flat_map(|r| &r[..row as usize])
        .copied()
        .collect()
}

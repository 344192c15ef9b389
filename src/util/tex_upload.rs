//! Texture creation and RGBA8 upload with row-pitch alignment
//!
//! WebGPU requires COPY_BYTES_PER_ROW_ALIGNMENT (256 bytes) for buffer copies;
//! uploads are padded the same way so staging paths can share buffers.

use crate::error::{WaterError, WaterResult};
use crate::gpu::align_copy_bpr;
use wgpu::{
    Device, Extent3d, ImageCopyTexture, ImageDataLayout, Origin3d, Queue, Texture, TextureAspect,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor,
};

/// A texture plus its default view.
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: Texture,
    pub view: TextureView,
    pub size: (u32, u32),
}

impl GpuTexture {
    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }
}

/// Create an Rgba8Unorm texture and upload tightly packed pixel data into it.
pub fn create_rgba8_texture(
    device: &Device,
    queue: &Queue,
    label: &str,
    data: &[u8],
    width: u32,
    height: u32,
) -> WaterResult<GpuTexture> {
    if width == 0 || height == 0 {
        return Err(WaterError::upload(format!(
            "{label}: texture size must be positive, got {width}x{height}"
        )));
    }

    let texture = device.create_texture(&TextureDescriptor {
        label: Some(label),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8Unorm,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST | TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    upload_rgba8_texture(queue, &texture, data, width, height)?;
    let view = texture.create_view(&TextureViewDescriptor::default());

    Ok(GpuTexture {
        texture,
        view,
        size: (width, height),
    })
}

/// Upload RGBA8 texture data with automatic row padding if needed
///
/// # Errors
/// Returns an upload error if data size doesn't match width * height * 4
pub fn upload_rgba8_texture(
    queue: &Queue,
    texture: &Texture,
    data: &[u8],
    width: u32,
    height: u32,
) -> WaterResult<()> {
    let row_bytes = width * 4;
    let expected_size = (height * row_bytes) as usize;

    if data.len() != expected_size {
        return Err(WaterError::upload(format!(
            "Data size mismatch: expected {} bytes ({}x{}x4), got {}",
            expected_size,
            width,
            height,
            data.len()
        )));
    }

    let padded_bpr = align_copy_bpr(row_bytes);
    let extent = Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let target = ImageCopyTexture {
        texture,
        mip_level: 0,
        origin: Origin3d::ZERO,
        aspect: TextureAspect::All,
    };

    if padded_bpr == row_bytes {
        queue.write_texture(
            target,
            data,
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(row_bytes),
                rows_per_image: Some(height),
            },
            extent,
        );
    } else {
        let mut padded_data = vec![0u8; (padded_bpr * height) as usize];
        for y in 0..height {
            let src_offset = (y * row_bytes) as usize;
            let dst_offset = (y * padded_bpr) as usize;
            padded_data[dst_offset..dst_offset + row_bytes as usize]
                .copy_from_slice(&data[src_offset..src_offset + row_bytes as usize]);
        }

        queue.write_texture(
            target,
            &padded_data,
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_bpr),
                rows_per_image: Some(height),
            },
            extent,
        );
    }

    Ok(())
}

/// 1x1 solid-color texture used in place of optional inputs.
pub fn create_solid_texture(
    device: &Device,
    queue: &Queue,
    label: &str,
    rgba: [u8; 4],
) -> WaterResult<GpuTexture> {
    create_rgba8_texture(device, queue, label, &rgba, 1, 1)
}

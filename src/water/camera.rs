// src/water/camera.rs
// Camera -> world-space view bounds and zoom for the screen-to-scene UV mapping
// Orthographic reads its frustum directly; perspective casts the NDC corners onto the ground plane
// RELEVANT FILES: src/water/pass.rs, src/water/uniforms.rs, src/shaders/water.frag

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Visible world rectangle (Y up) plus the pixels-per-world-unit zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub min: Vec2,
    pub max: Vec2,
    pub zoom: f32,
}

impl ViewBounds {
    /// `(left, bottom, right, top)` as packed into the uniform block.
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::new(self.min.x, self.min.y, self.max.x, self.max.y)
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Camera handed over by the scene composer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneCamera {
    Orthographic {
        position: Vec2,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        zoom: f32,
    },
    Perspective {
        view_proj: Mat4,
        /// World Z of the map plane.
        ground_z: f32,
        viewport_height_px: f32,
    },
}

impl SceneCamera {
    /// Orthographic camera showing exactly `width` x `height` world units at zoom 1.
    pub fn top_down(width: f32, height: f32) -> Self {
        SceneCamera::Orthographic {
            position: Vec2::new(width * 0.5, height * 0.5),
            left: -width * 0.5,
            right: width * 0.5,
            top: height * 0.5,
            bottom: -height * 0.5,
            zoom: 1.0,
        }
    }

    pub fn view_bounds(&self) -> ViewBounds {
        match *self {
            SceneCamera::Orthographic {
                position,
                left,
                right,
                top,
                bottom,
                zoom,
            } => {
                let z = if zoom > 0.0 { zoom } else { 1.0 };
                ViewBounds {
                    min: Vec2::new(position.x + left / z, position.y + bottom / z),
                    max: Vec2::new(position.x + right / z, position.y + top / z),
                    zoom: z,
                }
            }
            SceneCamera::Perspective {
                view_proj,
                ground_z,
                viewport_height_px,
            } => perspective_bounds(view_proj, ground_z, viewport_height_px),
        }
    }
}

fn perspective_bounds(view_proj: Mat4, ground_z: f32, viewport_height_px: f32) -> ViewBounds {
    let inv = view_proj.inverse();
    let corners = [
        Vec2::new(-1.0, -1.0),
        Vec2::new(1.0, -1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(-1.0, 1.0),
    ];

    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for ndc in corners {
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let dir = far - near;
        // Rays parallel to or pointing away from the ground use the far point
        let hit = if dir.z.abs() > 1e-6 {
            let t = (ground_z - near.z) / dir.z;
            if t >= 0.0 {
                near + dir * t
            } else {
                far
            }
        } else {
            far
        };
        min = min.min(hit.truncate());
        max = max.max(hit.truncate());
    }

    let visible_h = (max.y - min.y).max(1e-6);
    ViewBounds {
        min,
        max,
        zoom: (viewport_height_px / visible_h).max(1e-6),
    }
}

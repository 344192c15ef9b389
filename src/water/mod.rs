// src/water/mod.rs
// Water post-processing: mask discovery, surface build, wind state and the fullscreen pass
// RELEVANT FILES: src/water/pass.rs, src/shaders/water.frag

pub mod camera;
pub mod compositor;
pub mod defines;
pub mod distance;
pub mod floors;
pub mod noise;
pub mod params;
pub mod pass;
pub mod populate;
pub mod surface;
pub mod tiles;
pub mod uniforms;
pub mod wind;

// src/util/mod.rs
// Utility module namespace for GPU transfer and image encoding helpers
// Exists to keep texture upload/readback and PNG output out of the water modules
// RELEVANT FILES: src/util/tex_upload.rs, src/util/readback.rs, src/util/image_write.rs, src/gpu.rs

pub mod image_write;
pub mod readback;
pub mod tex_upload;

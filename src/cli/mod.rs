// src/cli/mod.rs
// Command-line front ends shipped with the crate

pub mod bake;
pub mod bake_args;

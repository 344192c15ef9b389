// src/cli/bake.rs
// Offline SurfaceData baking: one mask image, or every floor of a scene descriptor
// Writes the RGBA surface as PNG plus optional per-channel previews

use anyhow::{Context, Result};
use log::info;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::bake_args::{BakeArgs, BakeInput};
use crate::util::image_write::write_png_rgba8;
use crate::water::populate::build_floor_surfaces;
use crate::water::surface::{SurfaceData, SurfaceModel};
use crate::water::tiles::{FsMaskLoader, MaskLoader, SceneDescriptor};

const PREVIEW_SUFFIXES: [&str; 4] = ["sdf", "exposure", "flow_x", "flow_y"];

/// Entry point for the `water_bake` binary.
pub fn run_bake_cli() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let all_args: Vec<String> = env::args().skip(1).collect();
    if all_args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", super::bake_args::USAGE);
        return Ok(());
    }
    let args = match BakeArgs::parse(&all_args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("[water_bake] {e}");
            std::process::exit(2);
        }
    };
    let written = run_bake(&args)?;
    info!("water_bake: wrote {} file(s)", written.len());
    Ok(())
}

/// Bake according to parsed arguments; returns the written files.
pub fn run_bake(args: &BakeArgs) -> Result<Vec<PathBuf>> {
    match &args.input {
        BakeInput::Mask(mask) => bake_mask(mask, &args.output, args),
        BakeInput::Scene(scene) => bake_scene(scene, &args.output, args),
    }
}

fn bake_mask(mask: &Path, output: &Path, args: &BakeArgs) -> Result<Vec<PathBuf>> {
    let image = image::open(mask)
        .with_context(|| format!("failed to open mask {}", mask.display()))?
        .to_rgba8();
    let surface = SurfaceModel::build(&image, &args.options)
        .with_context(|| format!("failed to build surface from {}", mask.display()))?;
    info!(
        "water_bake: {} -> {}x{}, water: {}",
        mask.display(),
        surface.width,
        surface.height,
        surface.has_water
    );
    write_surface(&surface, output, args.preview)
}

fn bake_scene(scene_path: &Path, out_dir: &Path, args: &BakeArgs) -> Result<Vec<PathBuf>> {
    let text = std::fs::read_to_string(scene_path)
        .with_context(|| format!("failed to read scene {}", scene_path.display()))?;
    let scene: SceneDescriptor = serde_json::from_str(&text)
        .with_context(|| format!("invalid scene descriptor {}", scene_path.display()))?;

    let loader: Arc<dyn MaskLoader> = match &args.root {
        Some(root) => Arc::new(FsMaskLoader::with_root(root)),
        None => Arc::new(FsMaskLoader::new()),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    let (floors, report) = runtime.block_on(build_floor_surfaces(&scene, &args.options, loader))?;
    info!(
        "water_bake: {} floor(s) built, {} skipped, {} tile(s) failed",
        report.floors_built, report.floors_skipped, report.tiles_failed
    );

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let mut written = Vec::new();
    for floor in &floors {
        let path = out_dir.join(format!("floor{}_water_data.png", floor.floor_index));
        written.extend(write_surface(&floor.surface, &path, args.preview)?);
        let mask_path = out_dir.join(format!("floor{}_water_mask.png", floor.floor_index));
        write_png_rgba8(
            &mask_path,
            floor.raw_mask.as_raw(),
            floor.raw_mask.width(),
            floor.raw_mask.height(),
        )?;
        written.push(mask_path);
    }
    Ok(written)
}

fn write_surface(surface: &SurfaceData, output: &Path, preview: bool) -> Result<Vec<PathBuf>> {
    write_png_rgba8(output, &surface.pixels, surface.width, surface.height)?;
    let mut written = vec![output.to_path_buf()];
    if preview {
        for (channel, suffix) in PREVIEW_SUFFIXES.iter().enumerate() {
            let path = preview_path(output, suffix);
            let img = surface.channel_preview(channel);
            write_png_rgba8(&path, img.as_raw(), img.width(), img.height())?;
            written.push(path);
        }
    }
    Ok(written)
}

/// `out.png` + `sdf` -> `out_sdf.png`
pub fn preview_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "surface".to_string());
    output.with_file_name(format!("{stem}_{suffix}.png"))
}

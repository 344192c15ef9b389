// src/cli/bake_args.rs
// water_bake argument types and parsing helpers
// Flags map one-to-one onto SurfaceBuildOptions; a preset can seed them first

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::water::params::WaterParams;
use crate::water::surface::{MaskChannel, SurfaceBuildOptions};

pub const USAGE: &str = "\
usage: water_bake <mask.png> <out.png> [options]
       water_bake --scene <scene.json> <out-dir> [options]

options:
  --resolution N   longest side of the surface texture (16..2048)
  --range PX       signed distance clamp in pixels
  --exposure PX    shore exposure width in pixels
  --channel C      auto | red | green | blue | alpha | luma
  --threshold T    binarization threshold (0..1)
  --invert         treat dark pixels as water
  --expand PX      grow (or shrink, if negative) the mask
  --blur R         box blur radius before binarization
  --preset FILE    load SDF settings from a water preset (JSON)
  --root DIR       directory that scene texture paths are relative to
  --preview        also write per-channel preview PNGs";

/// Error type for bake CLI parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeCliError {
    message: String,
}

impl BakeCliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for BakeCliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BakeCliError {}

#[derive(Debug, Clone, PartialEq)]
pub enum BakeInput {
    /// Single mask image, already in scene space.
    Mask(PathBuf),
    /// Scene descriptor JSON; every floor with water is baked.
    Scene(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BakeArgs {
    pub input: BakeInput,
    /// Output PNG for a mask, output directory for a scene.
    pub output: PathBuf,
    pub options: SurfaceBuildOptions,
    pub root: Option<PathBuf>,
    pub preview: bool,
}

/// Parse a float argument value.
pub fn parse_f32(args: &[String], idx: usize, flag: &str) -> Result<f32, BakeCliError> {
    let raw = args
        .get(idx + 1)
        .ok_or_else(|| BakeCliError::new(format!("missing value for {flag}")))?;
    raw.parse::<f32>()
        .map_err(|_| BakeCliError::new(format!("invalid float value '{raw}' for {flag}")))
}

/// Parse an unsigned integer argument value.
pub fn parse_u32(args: &[String], idx: usize, flag: &str) -> Result<u32, BakeCliError> {
    let raw = args
        .get(idx + 1)
        .ok_or_else(|| BakeCliError::new(format!("missing value for {flag}")))?;
    raw.parse::<u32>()
        .map_err(|_| BakeCliError::new(format!("invalid integer value '{raw}' for {flag}")))
}

fn parse_string<'a>(args: &'a [String], idx: usize, flag: &str) -> Result<&'a str, BakeCliError> {
    args.get(idx + 1)
        .map(String::as_str)
        .ok_or_else(|| BakeCliError::new(format!("missing value for {flag}")))
}

fn preset_options(path: &str) -> Result<SurfaceBuildOptions, BakeCliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| BakeCliError::new(format!("cannot read preset '{path}': {e}")))?;
    let params = WaterParams::from_json_str(&text)
        .map_err(|e| BakeCliError::new(format!("invalid preset '{path}': {e}")))?;
    Ok(params.resolved().sdf.surface_options())
}

impl BakeArgs {
    /// Parse arguments (without argv[0]).
    ///
    /// `--preset` is applied before any other flag regardless of position so
    /// explicit flags always win.
    pub fn parse(args: &[String]) -> Result<Self, BakeCliError> {
        let mut options = match args.iter().position(|a| a == "--preset") {
            Some(i) => preset_options(parse_string(args, i, "--preset")?)?,
            None => SurfaceBuildOptions::default(),
        };

        let mut positional = Vec::new();
        let mut scene = None;
        let mut root = None;
        let mut preview = false;

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--resolution" => {
                    options.resolution = parse_u32(args, i, flag)?;
                    i += 1;
                }
                "--range" => {
                    options.sdf_range_px = parse_f32(args, i, flag)?;
                    i += 1;
                }
                "--exposure" => {
                    options.exposure_width_px = parse_f32(args, i, flag)?;
                    i += 1;
                }
                "--threshold" => {
                    options.threshold = parse_f32(args, i, flag)?;
                    i += 1;
                }
                "--expand" => {
                    options.expand_px = parse_f32(args, i, flag)?;
                    i += 1;
                }
                "--blur" => {
                    options.blur_radius = parse_u32(args, i, flag)?;
                    options.blur_passes = options.blur_passes.max(1);
                    i += 1;
                }
                "--channel" => {
                    let raw = parse_string(args, i, flag)?;
                    options.channel = MaskChannel::from_str(raw)
                        .map_err(|e| BakeCliError::new(e.to_string()))?;
                    i += 1;
                }
                "--scene" => {
                    scene = Some(PathBuf::from(parse_string(args, i, flag)?));
                    i += 1;
                }
                "--root" => {
                    root = Some(PathBuf::from(parse_string(args, i, flag)?));
                    i += 1;
                }
                "--preset" => i += 1,
                "--invert" => options.invert = true,
                "--preview" => preview = true,
                other if other.starts_with("--") => {
                    return Err(BakeCliError::new(format!("unknown flag '{other}'")));
                }
                other => positional.push(PathBuf::from(other)),
            }
            i += 1;
        }

        let (input, output) = match (scene, positional.as_slice()) {
            (Some(scene), [out]) => (BakeInput::Scene(scene), out.clone()),
            (None, [mask, out]) => (BakeInput::Mask(mask.clone()), out.clone()),
            _ => return Err(BakeCliError::new(USAGE)),
        };

        Ok(Self {
            input,
            output,
            options: options.clamped(),
            root,
            preview,
        })
    }
}

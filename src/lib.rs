//! Screen-space water post-processing for tabletop map scenes.
//! Rust: wgpu 0.19 with the naga GLSL frontend for the fragment program.
//!
//! The pipeline turns per-tile binary water masks into a per-floor surface
//! texture (signed distance, shore exposure, flow) and composites animated
//! water over an already-lit scene color target in a single fullscreen pass.

pub mod cli;
pub mod error;
pub mod gpu;
pub mod util;
pub mod water;

pub use error::{WaterError, WaterResult};
pub use gpu::GpuHandles;
pub use water::camera::{SceneCamera, ViewBounds};
pub use water::compositor::composite_floor;
pub use water::defines::{DefineTracker, FeatureFlags};
pub use water::floors::FloorBinder;
pub use water::params::WaterParams;
pub use water::pass::{DepthInput, InputTarget, OutputTarget, PassPhase, TimeInfo, WaterPass};
pub use water::populate::{build_floor_surfaces, FloorSurface, PopulateReport, PopulateTicket};
pub use water::surface::{MaskChannel, SurfaceBuildOptions, SurfaceData, SurfaceModel};
pub use water::tiles::{
    discover_water_tiles, FsMaskLoader, MaskLoader, SceneDescriptor, SceneGeometry, SceneRect,
    SceneTile, TileElevation, TileRect, WaterTile,
};
pub use water::wind::{PrecipitationKind, WeatherState, WindFrame, WindState};

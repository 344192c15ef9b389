//! Central error handling for the water pipeline
//!
//! Provides a unified WaterError enum with consistent categorization. Nothing in
//! the pipeline is fatal to callers: boundary calls return `WaterResult` and the
//! pass logs and swallows the failure ("no water this floor").

/// Centralized error type for all water pipeline operations
#[derive(thiserror::Error, Debug)]
pub enum WaterError {
    #[error("Device error: {0}")]
    Device(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Build error: {0}")]
    Build(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WaterError {
    /// Short category tag used as a log prefix
    pub fn category(&self) -> &'static str {
        match self {
            WaterError::Device(_) => "Device",
            WaterError::Upload(_) => "Upload",
            WaterError::Render(_) => "Render",
            WaterError::Load(_) => "Load",
            WaterError::Build(_) => "Build",
            WaterError::Config(_) => "Config",
            WaterError::Io(_) => "IO",
            WaterError::Image(_) => "Image",
            WaterError::Json(_) => "JSON",
        }
    }

    pub fn device<T: ToString>(msg: T) -> Self {
        WaterError::Device(msg.to_string())
    }

    pub fn upload<T: ToString>(msg: T) -> Self {
        WaterError::Upload(msg.to_string())
    }

    pub fn render<T: ToString>(msg: T) -> Self {
        WaterError::Render(msg.to_string())
    }

    pub fn load<T: ToString>(msg: T) -> Self {
        WaterError::Load(msg.to_string())
    }

    pub fn build<T: ToString>(msg: T) -> Self {
        WaterError::Build(msg.to_string())
    }

    pub fn config<T: ToString>(msg: T) -> Self {
        WaterError::Config(msg.to_string())
    }
}

/// Result type alias for water pipeline operations
pub type WaterResult<T> = Result<T, WaterError>;

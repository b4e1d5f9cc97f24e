//! Configuration management
//!
//! Handles loading, validation, and merging of engine configuration from
//! TOML files and CLI arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::geometry::Size;
use crate::input::DeviceClass;
use crate::palette::Palette;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Raster surface allocation
    #[serde(default)]
    pub surface: SurfaceConfig,
    /// Drawing palette
    #[serde(default)]
    pub palette: Palette,
    /// Speculative rendering per device class
    #[serde(default)]
    pub prediction: PredictionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Raster surface allocation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Logical width in pixels
    pub width: f64,
    /// Logical height in pixels
    pub height: f64,
    /// Device pixels per logical pixel
    pub scale: f64,
}

impl SurfaceConfig {
    /// Logical size of the surface
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            scale: 2.0,
        }
    }
}

/// Which device classes get speculative (predicted) samples rendered
///
/// Prediction pays off for stylus input where latency is most visible;
/// finger painting tolerates it poorly because retractions are wider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Render predicted samples for stylus contacts
    pub stylus: bool,
    /// Render predicted samples for non-stylus contacts
    pub touch: bool,
}

impl PredictionConfig {
    /// Whether speculation is enabled for the given device class
    pub fn enabled_for(&self, device: DeviceClass) -> bool {
        match device {
            DeviceClass::Stylus => self.stylus,
            DeviceClass::Touch => self.touch,
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            stylus: true,
            touch: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace|debug|info|warn|error)
    pub level: String,
    /// Write logs to this file in addition to stdout
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        let config: EngineConfig =
            toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.surface.size().is_degenerate() {
            anyhow::bail!(
                "Invalid surface size: {}x{}",
                self.surface.width,
                self.surface.height
            );
        }
        if self.surface.scale <= 0.0 {
            anyhow::bail!("Invalid surface scale: {}", self.surface.scale);
        }

        if self.palette.stylus_width <= 0.0 || self.palette.touch_width <= 0.0 {
            anyhow::bail!(
                "Invalid palette widths: stylus {}, touch {}",
                self.palette.stylus_width,
                self.palette.touch_width
            );
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!("Invalid log level: {}", other),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, size: Option<(f64, f64)>, scale: Option<f64>) -> Self {
        if let Some((width, height)) = size {
            self.surface.width = width;
            self.surface.height = height;
        }
        if let Some(scale) = scale {
            self.surface.scale = scale;
        }
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            palette: Palette::default(),
            prediction: PredictionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

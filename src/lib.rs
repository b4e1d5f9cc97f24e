//! # ink-canvas
//!
//! Deferred-precision ink capture engine with incremental raster
//! compositing.
//!
//! The engine turns a continuous stream of pointer/stylus samples into
//! smooth strokes baked onto a persistent off-screen raster, while keeping
//! redraw areas minimal and handling input whose properties (location,
//! pressure, tilt) arrive provisionally and are revised later.
//!
//! # Architecture
//!
//! ```text
//! ink-canvas
//!   ├─> CanvasEngine (per-contact stroke registries, orchestration)
//!   ├─> Stroke (live tail + committed prefix + reconciliation index)
//!   ├─> Sample (one observation, classification flags, update tracking)
//!   ├─> RasterSurface (progressive bake target, snapshot cache)
//!   └─> Region (invalidation rectangle accumulator)
//! ```
//!
//! # Data Flow
//!
//! **Ink path:** input batch → engine → stroke ingest → stable-prefix
//! commit → raster bake → invalidation region back to the host
//!
//! **Update path:** property update → engine → correlation-key lookup →
//! sample reconciliation → possibly another commit
//!
//! **Speculation path:** predicted batch rendered at reduced opacity →
//! retracted wholesale when the next real batch arrives
//!
//! The engine is single-threaded and synchronous; multi-threaded hosts
//! serialize delivery through [`engine::EventQueue`].

#![warn(missing_docs)]
#![warn(clippy::all)]

// =============================================================================
// Modules
// =============================================================================

/// Engine configuration
pub mod config;

/// Top-level coordinator, statistics, and event delivery
pub mod engine;

/// Engine error types
pub mod error;

/// Invalidation rectangle math
pub mod geometry;

/// Input boundary types and the sample model
pub mod input;

/// Drawing palette (color, widths, tool)
pub mod palette;

/// Stroke aggregation and progressive commit
pub mod stroke;

/// Raster surface and drawing backends
pub mod surface;

// =============================================================================
// Re-exports (primary API surface)
// =============================================================================

pub use config::EngineConfig;
pub use engine::{CanvasEngine, CanvasEvent, EngineStats, EventQueue};
pub use error::{CanvasError, Result};
pub use geometry::{Point, Region, Size};
pub use input::{
    ContactId, CorrelationKey, DeviceClass, InputObservation, Sample, SampleFlag, SampleProperty,
};
pub use palette::{Color, Palette, Tool};
pub use stroke::Stroke;
pub use surface::{
    BlendMode, DrawBackend, RasterImage, RasterSurface, SoftwareBackend, StrokeVertex,
};

//! Canvas Engine
//!
//! Top-level coordinator turning input batches into baked raster content
//! and minimal invalidation regions.
//!
//! # Architecture
//!
//! ```text
//! input batch ──> CanvasEngine ──> Stroke (per contact)
//!                     │               ├─ retract speculation
//!                     │               ├─ ingest coalesced + predicted
//!                     │               └─ commit stable prefix
//!                     │                        │
//!                     └───────────────> RasterSurface (bake polyline)
//!                                              │
//!                     host <── union of invalidation regions
//! ```
//!
//! Strokes move through three registries over their lifetime: `active`
//! (contact producing samples) → `pending` (contact ended, property updates
//! still outstanding) → `finished` (fully committed; retained only so the
//! raster can be rebuilt wholesale after a resize or clear).
//!
//! All entry points are synchronous and run to completion; the engine is
//! single-threaded by design. Hosts delivering events from several threads
//! serialize them through [`events::EventQueue`] first.

pub mod events;
pub mod stats;

pub use events::{CanvasEvent, EventQueue};
pub use stats::EngineStats;

use std::collections::HashMap;

use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::geometry::{Point, Region, Size};
use crate::input::{ContactId, InputObservation, SampleFlag};
use crate::palette::Palette;
use crate::stroke::Stroke;
use crate::surface::{DrawBackend, RasterImage, RasterSurface, SoftwareBackend};

/// Coordinates strokes, reconciliation, and the raster surface
pub struct CanvasEngine<B: DrawBackend> {
    surface: RasterSurface<B>,
    /// Contacts currently producing samples
    active: HashMap<ContactId, Stroke>,
    /// Contacts that ended while property updates were still outstanding
    pending: HashMap<ContactId, Stroke>,
    /// Fully committed strokes, retained for wholesale rebuilds
    finished: Vec<Stroke>,
    /// When set, the next render first replays everything into the surface
    raster_dirty: bool,
    palette: Palette,
    config: EngineConfig,
    stats: EngineStats,
}

impl CanvasEngine<SoftwareBackend> {
    /// Engine over a fresh CPU raster sized from the configuration
    pub fn software(config: EngineConfig) -> Result<Self> {
        let surface = RasterSurface::software(config.surface.size(), config.surface.scale)?;
        Ok(Self::new(surface, config))
    }
}

impl<B: DrawBackend> CanvasEngine<B> {
    /// Engine over an existing surface
    pub fn new(surface: RasterSurface<B>, config: EngineConfig) -> Self {
        info!(
            width = config.surface.width,
            height = config.surface.height,
            scale = config.surface.scale,
            "canvas engine created"
        );

        Self {
            surface,
            active: HashMap::new(),
            pending: HashMap::new(),
            finished: Vec::new(),
            raster_dirty: false,
            palette: config.palette.clone(),
            config,
            stats: EngineStats::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Entry points
    // -------------------------------------------------------------------------

    /// Process one input dispatch for a contact: a coalesced batch of real
    /// observations plus an optional speculative batch.
    ///
    /// Any previously rendered speculation for the contact is retracted
    /// first (a prediction is stale the instant real data arrives). The
    /// predicted batch is only ingested when speculation is enabled for the
    /// contact's device class. Newly stable samples are committed and baked.
    ///
    /// Returns the union of every region touched, for the host's
    /// invalidate-rect call.
    pub fn on_input_batch(
        &mut self,
        contact: ContactId,
        observations: &[InputObservation],
        predicted: &[InputObservation],
    ) -> Region {
        if observations.is_empty() && predicted.is_empty() {
            return Region::EMPTY;
        }
        self.ensure_raster_valid();

        if !self.active.contains_key(&contact) {
            debug!(?contact, "starting stroke");
            self.stats.strokes_started += 1;
            self.active
                .insert(contact, Stroke::new(self.palette.clone()));
        }
        let stroke = self
            .active
            .get_mut(&contact)
            .expect("stroke inserted above");

        let retracted = stroke
            .live_samples()
            .iter()
            .filter(|s| s.is_predicted())
            .count();
        let mut region = stroke.remove_speculative();
        self.stats.predicted_retracted += retracted as u64;

        region = region.union(stroke.ingest_batch(observations, SampleFlag::Coalesced.into()));
        self.stats.samples_ingested += observations.len() as u64;

        if !predicted.is_empty() {
            let device = predicted[0].device;
            if self.config.prediction.enabled_for(device) {
                region =
                    region.union(stroke.ingest_batch(predicted, SampleFlag::Predicted.into()));
                self.stats.predicted_ingested += predicted.len() as u64;
            } else {
                trace!(?contact, ?device, "speculation disabled for device class");
            }
        }

        Self::commit_and_draw(&mut self.surface, &mut self.stats, stroke, false);

        self.stats.batches_processed += 1;
        region
    }

    /// Finalize a contact's stroke.
    ///
    /// A cancelled stroke is first marked fully transparent so the returned
    /// region retracts its visible ink. The stroke then receives a forced
    /// commit and moves to `finished`, or to `pending` when property updates
    /// are still outstanding. An unknown contact is a no-op — it may belong
    /// to an unrelated gesture.
    pub fn on_contact_end(&mut self, contact: ContactId, cancelled: bool) -> Region {
        if !self.active.contains_key(&contact) {
            trace!(?contact, "contact end for unknown contact ignored");
            return Region::EMPTY;
        }
        // Rebuild before detaching the stroke so its committed prefix is
        // part of the replay.
        self.ensure_raster_valid();
        let mut stroke = self.active.remove(&contact).expect("checked above");

        let retracted = stroke
            .live_samples()
            .iter()
            .filter(|s| s.is_predicted())
            .count();
        let mut region = stroke.remove_speculative();
        self.stats.predicted_retracted += retracted as u64;

        if cancelled {
            region = region.union(stroke.cancel());
            self.stats.strokes_cancelled += 1;
        }

        Self::commit_and_draw(&mut self.surface, &mut self.stats, &mut stroke, true);

        if stroke.is_complete() {
            debug!(?contact, samples = stroke.len(), cancelled, "stroke finished");
            self.stats.strokes_finished += 1;
            self.finished.push(stroke);
        } else {
            debug!(?contact, "stroke awaiting reconciliation");
            self.pending.insert(contact, stroke);
        }

        region
    }

    /// Deliver an asynchronous authoritative property update.
    ///
    /// Routed to the contact's stroke in `active` or `pending`; unknown
    /// contacts and unmatched correlation keys are silent no-ops (the update
    /// may simply have arrived after its sample resolved). A pending stroke
    /// that becomes complete is finalized on the spot.
    pub fn on_property_update(
        &mut self,
        contact: ContactId,
        observation: &InputObservation,
    ) -> Region {
        self.ensure_raster_valid();

        if let Some(stroke) = self.active.get_mut(&contact) {
            let (changed, region) = stroke.apply_reconciliation(observation);
            Self::note_reconciliation(&mut self.stats, changed);
            if changed {
                Self::commit_and_draw(&mut self.surface, &mut self.stats, stroke, false);
            }
            return region;
        }

        let Some(mut stroke) = self.pending.remove(&contact) else {
            self.stats.reconciliations_ignored += 1;
            trace!(?contact, "property update for unknown contact ignored");
            return Region::EMPTY;
        };

        let (changed, region) = stroke.apply_reconciliation(observation);
        Self::note_reconciliation(&mut self.stats, changed);

        if stroke.is_complete() {
            Self::commit_and_draw(&mut self.surface, &mut self.stats, &mut stroke, true);
            debug!(?contact, "pending stroke reconciled and finished");
            self.stats.strokes_finished += 1;
            self.finished.push(stroke);
        } else {
            if changed {
                Self::commit_and_draw(&mut self.surface, &mut self.stats, &mut stroke, false);
            }
            self.pending.insert(contact, stroke);
        }

        region
    }

    /// Resize the raster surface.
    ///
    /// The surface content is carried over anchored top-left by the backend,
    /// but the engine marks the raster dirty regardless: the next render
    /// replays every finished stroke (and the committed prefixes of in-flight
    /// ones) so resolution changes re-rasterize cleanly. Returns the full
    /// new bounds as the region to repaint.
    pub fn resize(&mut self, size: Size, scale: f64) -> Result<Region> {
        self.surface.resize(size, scale)?;
        self.raster_dirty = true;
        info!(
            width = size.width,
            height = size.height,
            scale,
            "canvas resized"
        );
        Ok(Region::from_origin_size(Point::new(0.0, 0.0), size))
    }

    /// Drop every stroke and reset the surface to blank
    pub fn clear(&mut self) -> Region {
        self.active.clear();
        self.pending.clear();
        self.finished.clear();
        self.surface.clear(None);
        self.raster_dirty = false;
        info!("canvas cleared");
        Region::from_origin_size(Point::new(0.0, 0.0), self.surface.size())
    }

    // -------------------------------------------------------------------------
    // Raster access
    // -------------------------------------------------------------------------

    /// Current raster image, cached until the next mutation
    pub fn snapshot(&mut self) -> &RasterImage {
        self.ensure_raster_valid();
        self.surface.snapshot()
    }

    /// Rebuild the raster wholesale from retained strokes.
    ///
    /// Runs automatically before the next draw after a resize; exposed for
    /// hosts that want to control when the (potentially expensive) replay
    /// happens.
    pub fn rebuild_raster(&mut self) {
        info!(
            finished = self.finished.len(),
            active = self.active.len(),
            pending = self.pending.len(),
            "rebuilding raster"
        );

        self.surface.clear(None);

        for stroke in &self.finished {
            debug_assert!(stroke.live_samples().is_empty());
            self.surface.draw(stroke.committed_samples(), stroke.palette());
        }
        // In-flight strokes replay only what was already baked; their live
        // tails remain the host's overlay to draw.
        for stroke in self.active.values().chain(self.pending.values()) {
            self.surface.draw(stroke.committed_samples(), stroke.palette());
        }

        self.raster_dirty = false;
        self.stats.full_rebuilds += 1;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Stroke currently open for `contact`, if any (live-tail overlay source)
    pub fn active_stroke(&self, contact: ContactId) -> Option<&Stroke> {
        self.active.get(&contact)
    }

    /// Stroke awaiting reconciliation for `contact`, if any
    pub fn pending_stroke(&self, contact: ContactId) -> Option<&Stroke> {
        self.pending.get(&contact)
    }

    /// Finished strokes retained for rebuilds
    pub fn finished_strokes(&self) -> &[Stroke] {
        &self.finished
    }

    /// Number of contacts currently drawing
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of ended contacts still awaiting property updates
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether the next render must rebuild the raster wholesale
    pub fn is_raster_dirty(&self) -> bool {
        self.raster_dirty
    }

    /// Palette used for newly created strokes
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Change the palette for strokes created from now on; strokes already
    /// in flight keep the palette they were created with
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Processing counters
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// The raster surface (read-only)
    pub fn surface(&self) -> &RasterSurface<B> {
        &self.surface
    }

    // -------------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------------

    fn ensure_raster_valid(&mut self) {
        if self.raster_dirty {
            self.rebuild_raster();
        }
    }

    /// Commit stable samples and bake them, seeding the polyline with the
    /// last previously committed sample so consecutive commits join without
    /// a missing segment.
    fn commit_and_draw(
        surface: &mut RasterSurface<B>,
        stats: &mut EngineStats,
        stroke: &mut Stroke,
        force_all: bool,
    ) {
        let committed_before = stroke.committed_samples().len();
        let moved = stroke.commit_stable(force_all).len();
        if moved == 0 {
            return;
        }

        let seed = committed_before.saturating_sub(1);
        surface.draw(&stroke.committed_samples()[seed..], stroke.palette());
        stats.samples_committed += moved as u64;
    }

    fn note_reconciliation(stats: &mut EngineStats, changed: bool) {
        if changed {
            stats.reconciliations_applied += 1;
        } else {
            stats.reconciliations_ignored += 1;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

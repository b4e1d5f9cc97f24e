//! Stroke Samples
//!
//! A [`Sample`] is one recorded input observation contributing to a stroke,
//! carrying a classification bit-set and the bookkeeping needed to reconcile
//! provisional property values against later authoritative updates.

use enumflags2::{bitflags, BitFlags};
use tracing::trace;

use crate::geometry::{Point, Region};
use crate::input::observation::{
    CorrelationKey, DeviceClass, InputObservation, PropertySet, SampleProperty,
};
use crate::palette::Palette;

/// Minimum drawing magnitude; keeps zero-pressure samples from producing
/// degenerate zero-width strokes
pub const MIN_MAGNITUDE: f64 = 0.025;

// =============================================================================
// Classification flags
// =============================================================================

/// Sample classification flags
///
/// An independent bit-set, not mutually exclusive: a sample can be both
/// `Coalesced` and `NeedsUpdate`, or `Predicted` and `Cancelled`. The empty
/// set is the Standard classification (a plain real-time sample).
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFlag {
    /// Historical backfill delivered together with a real-time sample
    Coalesced = 1 << 0,
    /// Speculative extrapolated sample; retracted before the next real batch
    Predicted = 1 << 1,
    /// Still awaiting at least one authoritative property update
    NeedsUpdate = 1 << 2,
    /// Was provisional, now fully resolved
    Updated = 1 << 3,
    /// Belongs to a cancelled stroke; renders fully transparent
    Cancelled = 1 << 4,
    /// Originates from a non-stylus contact (different width/style downstream)
    NonStylus = 1 << 5,
}

/// Set of classification flags
pub type SampleFlags = BitFlags<SampleFlag>;

// =============================================================================
// Sample
// =============================================================================

/// One recorded input observation within a stroke
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    sequence: u64,
    location: Point,
    pressure: f64,
    altitude_angle: f64,
    azimuth_angle: f64,
    timestamp: f64,
    device: DeviceClass,
    correlation_key: Option<CorrelationKey>,
    awaiting_update: PropertySet,
    ever_estimated: PropertySet,
    flags: SampleFlags,
}

impl Sample {
    /// Capture an observation as a sample with the given sequence number and
    /// base classification.
    ///
    /// A non-stylus contact reporting zero pressure is normalized to full
    /// pressure (such devices have no pressure sensor; their strokes would
    /// otherwise collapse to the minimum width). Non-stylus contacts are
    /// tagged [`SampleFlag::NonStylus`], and any observation with promised
    /// updates is tagged [`SampleFlag::NeedsUpdate`].
    pub fn capture(observation: &InputObservation, sequence: u64, flags: SampleFlags) -> Self {
        let mut flags = flags;
        if !observation.device.is_stylus() {
            flags |= SampleFlag::NonStylus;
        }
        if !observation.awaiting_update.is_empty() {
            flags |= SampleFlag::NeedsUpdate;
        }

        let pressure = if observation.device.is_stylus() || observation.pressure > 0.0 {
            observation.pressure
        } else {
            1.0
        };

        Self {
            sequence,
            location: observation.location,
            pressure,
            altitude_angle: observation.altitude_angle,
            azimuth_angle: observation.azimuth_angle,
            timestamp: observation.timestamp,
            device: observation.device,
            correlation_key: observation.correlation_key,
            awaiting_update: observation.awaiting_update,
            ever_estimated: observation.estimated | observation.awaiting_update,
            flags,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Sequence number within the owning stroke
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Sub-pixel location
    #[inline]
    pub fn location(&self) -> Point {
        self.location
    }

    /// Normalized pressure
    #[inline]
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Stylus altitude angle in radians
    #[inline]
    pub fn altitude_angle(&self) -> f64 {
        self.altitude_angle
    }

    /// Stylus azimuth angle in radians
    #[inline]
    pub fn azimuth_angle(&self) -> f64 {
        self.azimuth_angle
    }

    /// Capture timestamp in seconds
    #[inline]
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Originating device class
    #[inline]
    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Update correlation key, if the device promised deferred precision
    #[inline]
    pub fn correlation_key(&self) -> Option<CorrelationKey> {
        self.correlation_key
    }

    /// Properties still awaiting an authoritative update
    #[inline]
    pub fn awaiting_update(&self) -> PropertySet {
        self.awaiting_update
    }

    /// Properties that were ever provisional (retained after resolution)
    #[inline]
    pub fn ever_estimated(&self) -> PropertySet {
        self.ever_estimated
    }

    /// Classification flags
    #[inline]
    pub fn flags(&self) -> SampleFlags {
        self.flags
    }

    /// Whether no property updates are outstanding
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.awaiting_update.is_empty()
    }

    /// Whether this sample is speculative
    #[inline]
    pub fn is_predicted(&self) -> bool {
        self.flags.contains(SampleFlag::Predicted)
    }

    /// Whether this sample belongs to a cancelled stroke
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flags.contains(SampleFlag::Cancelled)
    }

    /// Whether this sample blocks a non-forced commit
    ///
    /// Both outstanding updates and speculation block: committing either
    /// would bake unstable data into the immutable raster.
    #[inline]
    pub fn blocks_commit(&self) -> bool {
        self.flags
            .intersects(SampleFlag::NeedsUpdate | SampleFlag::Predicted)
    }

    // -------------------------------------------------------------------------
    // Drawing derivation
    // -------------------------------------------------------------------------

    /// Drawing magnitude: pressure clamped to [`MIN_MAGNITUDE`]
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.pressure.max(MIN_MAGNITUDE)
    }

    /// Line width this sample draws with under the given palette
    #[inline]
    pub fn draw_width(&self, palette: &Palette) -> f64 {
        palette.base_width(self.flags.contains(SampleFlag::NonStylus)) * self.magnitude()
    }

    /// Rendering opacity: a pure function of the classification
    ///
    /// Cancelled samples vanish, predicted samples render at half strength
    /// so speculation is visually distinct until confirmed or retracted.
    pub fn opacity(&self) -> f64 {
        if self.flags.contains(SampleFlag::Cancelled) {
            0.0
        } else if self.flags.contains(SampleFlag::Predicted) {
            0.5
        } else {
            1.0
        }
    }

    /// Minimal repaint region for this sample alone: its location outset by
    /// the drawing width
    pub fn draw_region(&self, palette: &Palette) -> Region {
        Region::from_point(self.location).outset(self.draw_width(palette))
    }

    /// Minimal repaint region for the segment connecting this sample to
    /// `previous`: both locations, outset by the wider of the two widths
    pub fn draw_region_with(&self, previous: &Sample, palette: &Palette) -> Region {
        let width = self.draw_width(palette).max(previous.draw_width(palette));
        Region::from_points(self.location, previous.location).outset(width)
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Fold an authoritative update into this sample.
    ///
    /// For every property still awaiting an update that `observation` no
    /// longer marks as awaiting, the authoritative value is copied and the
    /// property leaves the awaiting set. When the set drains, the
    /// classification flips `NeedsUpdate` to `Updated`.
    ///
    /// Returns whether anything changed. A correlation-key mismatch or an
    /// already-resolved sample is a no-op, which makes reconciliation
    /// idempotent: replaying the same update is harmless.
    pub fn apply_update(&mut self, observation: &InputObservation) -> bool {
        match (self.correlation_key, observation.correlation_key) {
            (Some(own), Some(incoming)) if own == incoming => {}
            _ => return false,
        }

        if self.awaiting_update.is_empty() {
            return false;
        }

        let mut changed = false;
        for property in self.awaiting_update {
            if !observation.awaiting_update.contains(property) {
                self.copy_property(property, observation);
                self.awaiting_update.remove(property);
                changed = true;
            }
        }

        if changed && self.awaiting_update.is_empty() {
            self.flags.remove(SampleFlag::NeedsUpdate);
            self.flags.insert(SampleFlag::Updated);
            trace!(sequence = self.sequence, "sample fully resolved");
        }

        changed
    }

    /// Mark this sample as belonging to a cancelled stroke
    pub(crate) fn mark_cancelled(&mut self) {
        self.flags.insert(SampleFlag::Cancelled);
    }

    fn copy_property(&mut self, property: SampleProperty, observation: &InputObservation) {
        match property {
            SampleProperty::Location => self.location = observation.location,
            SampleProperty::Pressure => self.pressure = observation.pressure,
            SampleProperty::Altitude => self.altitude_angle = observation.altitude_angle,
            SampleProperty::Azimuth => self.azimuth_angle = observation.azimuth_angle,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

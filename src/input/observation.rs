//! Input Observation Boundary Types
//!
//! One [`InputObservation`] is a single raw report from the input device
//! layer: position, physical properties, and the deferred-precision metadata
//! describing which of those values are provisional and how the eventual
//! authoritative update will find its way back ([`CorrelationKey`]).

use enumflags2::{bitflags, BitFlags};

use crate::geometry::Point;

// =============================================================================
// Identities
// =============================================================================

/// Stable identity of one continuous contact (touch/stylus down..up)
///
/// Opaque to the engine; the host derives it from whatever its input system
/// uses to track a contact across events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactId(pub u64);

/// Opaque identifier correlating a provisional observation with the later
/// authoritative update for the same physical sample
///
/// Absent on devices that never defer precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationKey(pub u64);

// =============================================================================
// Device class / property flags
// =============================================================================

/// The class of input device a contact originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Active stylus: real pressure and tilt, deferred-precision capable
    Stylus,
    /// Finger or other non-stylus contact
    Touch,
}

impl DeviceClass {
    /// Whether this is a stylus-class device
    #[inline]
    pub fn is_stylus(&self) -> bool {
        matches!(self, DeviceClass::Stylus)
    }
}

/// A physical sample property that can arrive provisionally
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleProperty {
    /// Contact position
    Location = 1 << 0,
    /// Normalized contact pressure
    Pressure = 1 << 1,
    /// Stylus altitude angle
    Altitude = 1 << 2,
    /// Stylus azimuth angle
    Azimuth = 1 << 3,
}

/// Set of sample properties
pub type PropertySet = BitFlags<SampleProperty>;

// =============================================================================
// InputObservation
// =============================================================================

/// One raw input observation as delivered by the device layer
#[derive(Debug, Clone, PartialEq)]
pub struct InputObservation {
    /// Sub-pixel contact position in logical coordinates
    pub location: Point,
    /// Normalized pressure magnitude (0 for devices without pressure)
    pub pressure: f64,
    /// Stylus altitude angle in radians
    pub altitude_angle: f64,
    /// Stylus azimuth angle in radians
    pub azimuth_angle: f64,
    /// Capture time in seconds, monotonic per device clock
    pub timestamp: f64,
    /// Originating device class
    pub device: DeviceClass,
    /// Properties whose current values are provisional estimates
    pub estimated: PropertySet,
    /// Properties for which an authoritative update is still promised
    ///
    /// Always a subset of the properties that were ever estimated; the
    /// device layer clears bits here as updates are delivered.
    pub awaiting_update: PropertySet,
    /// Update correlation key; `None` for contacts without deferred precision
    pub correlation_key: Option<CorrelationKey>,
}

impl InputObservation {
    /// Fully-final stylus observation (nothing provisional)
    pub fn stylus(location: Point, pressure: f64) -> Self {
        Self {
            location,
            pressure,
            altitude_angle: std::f64::consts::FRAC_PI_2,
            azimuth_angle: 0.0,
            timestamp: 0.0,
            device: DeviceClass::Stylus,
            estimated: PropertySet::empty(),
            awaiting_update: PropertySet::empty(),
            correlation_key: None,
        }
    }

    /// Fully-final non-stylus observation
    pub fn touch(location: Point) -> Self {
        Self {
            location,
            pressure: 0.0,
            altitude_angle: std::f64::consts::FRAC_PI_2,
            azimuth_angle: 0.0,
            timestamp: 0.0,
            device: DeviceClass::Touch,
            estimated: PropertySet::empty(),
            awaiting_update: PropertySet::empty(),
            correlation_key: None,
        }
    }

    /// Mark `properties` as provisional, expecting updates under `key`
    pub fn with_estimates(mut self, properties: PropertySet, key: CorrelationKey) -> Self {
        self.estimated |= properties;
        self.awaiting_update |= properties;
        self.correlation_key = Some(key);
        self
    }

    /// Set the capture timestamp
    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

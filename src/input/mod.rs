//! Input Boundary and Sample Model
//!
//! Types crossing the boundary between the host's input system and the
//! engine, and the [`Sample`] record strokes are built from.
//!
//! # Deferred precision
//!
//! Some devices deliver observations whose properties (location, pressure,
//! tilt) are provisional estimates, refined by authoritative updates that
//! arrive later and are matched back through an opaque [`CorrelationKey`].
//! An observation declares which properties are provisional
//! ([`InputObservation::estimated`]) and which still have an update in
//! flight ([`InputObservation::awaiting_update`]); the captured [`Sample`]
//! tracks both until reconciliation drains the awaiting set.

pub mod observation;
pub mod sample;

pub use observation::{
    ContactId, CorrelationKey, DeviceClass, InputObservation, PropertySet, SampleProperty,
};
pub use sample::{Sample, SampleFlag, SampleFlags, MIN_MAGNITUDE};

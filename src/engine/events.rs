//! Event Delivery
//!
//! The engine itself is single-threaded: every entry point runs to
//! completion with no internal locking, and correctness rests on strict
//! per-contact ordering. Hosts whose device layer delivers events from
//! several threads funnel them through an [`EventQueue`] — a single-consumer
//! channel whose drain loop applies events in arrival order, which is
//! exactly the serialization the engine's contract requires.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::trace;

use crate::error::{CanvasError, Result};
use crate::geometry::{Region, Size};
use crate::input::{ContactId, InputObservation};
use crate::surface::DrawBackend;

use super::CanvasEngine;

/// One engine entry-point invocation, queued for ordered delivery
#[derive(Debug, Clone)]
pub enum CanvasEvent {
    /// A dispatch of real observations plus an optional speculative batch
    InputBatch {
        /// Originating contact
        contact: ContactId,
        /// Coalesced batch in arrival order
        observations: Vec<InputObservation>,
        /// Speculative batch, possibly empty
        predicted: Vec<InputObservation>,
    },
    /// The contact lifted or was cancelled
    ContactEnd {
        /// Originating contact
        contact: ContactId,
        /// Whether the stroke is retracted rather than finished
        cancelled: bool,
    },
    /// Asynchronous authoritative property update
    PropertyUpdate {
        /// Originating contact
        contact: ContactId,
        /// Observation carrying the authoritative values
        observation: InputObservation,
    },
    /// The host view changed size
    Resize {
        /// New logical size
        size: Size,
        /// New device scale
        scale: f64,
    },
    /// Drop all strokes and blank the canvas
    Clear,
}

/// Single-consumer queue serializing event delivery to an engine
pub struct EventQueue {
    sender: Sender<CanvasEvent>,
    receiver: Receiver<CanvasEvent>,
}

impl EventQueue {
    /// Create an unbounded queue
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// A cloneable handle for producer threads
    pub fn sender(&self) -> Sender<CanvasEvent> {
        self.sender.clone()
    }

    /// Apply every queued event to `engine` in arrival order.
    ///
    /// Non-blocking: returns once the queue is momentarily empty. The
    /// returned region is the union of every applied event's invalidation
    /// region — one invalidate-rect call per drain, as the redraw contract
    /// expects.
    pub fn drain<B: DrawBackend>(&self, engine: &mut CanvasEngine<B>) -> Result<Region> {
        let mut region = Region::EMPTY;
        let mut applied = 0usize;

        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(CanvasError::ChannelDisconnected),
            };

            region = region.union(Self::apply(engine, event)?);
            applied += 1;
        }

        if applied > 0 {
            trace!(applied, "drained event queue");
        }
        Ok(region)
    }

    fn apply<B: DrawBackend>(engine: &mut CanvasEngine<B>, event: CanvasEvent) -> Result<Region> {
        Ok(match event {
            CanvasEvent::InputBatch {
                contact,
                observations,
                predicted,
            } => engine.on_input_batch(contact, &observations, &predicted),
            CanvasEvent::ContactEnd { contact, cancelled } => {
                engine.on_contact_end(contact, cancelled)
            }
            CanvasEvent::PropertyUpdate {
                contact,
                observation,
            } => engine.on_property_update(contact, &observation),
            CanvasEvent::Resize { size, scale } => engine.resize(size, scale)?,
            CanvasEvent::Clear => engine.clear(),
        })
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

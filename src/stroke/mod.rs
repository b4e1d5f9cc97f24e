//! Stroke Aggregation and Progressive Commit
//!
//! A [`Stroke`] owns every sample captured for one continuous contact, split
//! into three parts:
//!
//! ```text
//! committed (immutable, baked into raster) | live (mutable tail) | pending index
//!   [s0, s1, s2, ... ]                       [sk, ..., sn]         key -> sequence
//! ```
//!
//! - the **live tail** receives new samples and is where provisional values
//!   get reconciled and speculation gets retracted;
//! - the **committed prefix** is append-only; once a sample moves there it
//!   is never mutated (only replayed wholesale, e.g. after a resize);
//! - the **pending index** maps correlation keys to live samples still
//!   awaiting authoritative property updates.
//!
//! A stroke is *Open* while its contact produces samples, *awaiting
//! reconciliation* after contact end while the pending index is non-empty,
//! and *finished* once everything is resolved and committed. The engine's
//! registries track which of those states a stroke is in; the stroke itself
//! only exposes [`Stroke::is_complete`].

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::geometry::Region;
use crate::input::{CorrelationKey, InputObservation, Sample, SampleFlag, SampleFlags};
use crate::palette::Palette;

/// Full ordered capture of samples for one continuous contact
#[derive(Debug, Clone)]
pub struct Stroke {
    /// Mutable tail, arrival order, not yet guaranteed stable
    live: Vec<Sample>,
    /// Append-only prefix already baked into the raster
    committed: Vec<Sample>,
    /// Correlation key -> sequence number of a live sample awaiting updates
    pending: HashMap<CorrelationKey, u64>,
    /// Palette captured at stroke creation; the stroke renders consistently
    /// even if the engine's palette changes mid-session
    palette: Palette,
}

impl Stroke {
    /// Create an empty stroke drawing with `palette`
    pub fn new(palette: Palette) -> Self {
        Self {
            live: Vec::new(),
            committed: Vec::new(),
            pending: HashMap::new(),
            palette,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Samples of the mutable tail, oldest first
    #[inline]
    pub fn live_samples(&self) -> &[Sample] {
        &self.live
    }

    /// Samples already baked into the raster, oldest first
    #[inline]
    pub fn committed_samples(&self) -> &[Sample] {
        &self.committed
    }

    /// Every retained sample in sequence order (committed, then live)
    pub fn samples_in_order(&self) -> impl Iterator<Item = &Sample> {
        self.committed.iter().chain(self.live.iter())
    }

    /// Total number of retained samples
    #[inline]
    pub fn len(&self) -> usize {
        self.committed.len() + self.live.len()
    }

    /// Whether the stroke holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.committed.is_empty()
    }

    /// Whether no sample is still awaiting a property update
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Palette this stroke draws with
    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    // -------------------------------------------------------------------------
    // Ingestion
    // -------------------------------------------------------------------------

    /// Capture one observation as a new live sample.
    ///
    /// The sample receives the next sequence number. If the observation
    /// still has updates in flight it is registered in the pending index
    /// under its correlation key (an observation promising updates without a
    /// key cannot ever be reconciled and is left unregistered).
    ///
    /// Returns the repaint region of the connecting segment to the previous
    /// retained sample, or the point region for a stroke's first sample.
    pub fn ingest(&mut self, observation: &InputObservation, flags: SampleFlags) -> Region {
        let sequence = (self.live.len() + self.committed.len()) as u64;
        let sample = Sample::capture(observation, sequence, flags);

        if !sample.is_resolved() {
            if let Some(key) = sample.correlation_key() {
                self.pending.insert(key, sequence);
                trace!(?key, sequence, "sample awaiting property updates");
            }
        }

        let region = match self.live.last().or_else(|| self.committed.last()) {
            Some(previous) => sample.draw_region_with(previous, &self.palette),
            None => sample.draw_region(&self.palette),
        };

        self.live.push(sample);
        region
    }

    /// Capture a batch of observations in arrival order.
    ///
    /// When the batch is coalesced, every observation is tagged `Coalesced`
    /// except the last: the final entry represents the real-time state and
    /// stays Standard, the earlier ones are historical backfill.
    pub fn ingest_batch(&mut self, observations: &[InputObservation], flags: SampleFlags) -> Region {
        let mut region = Region::EMPTY;
        let last = observations.len().saturating_sub(1);

        for (index, observation) in observations.iter().enumerate() {
            let mut sample_flags = flags;
            if index == last && sample_flags.contains(SampleFlag::Coalesced) {
                sample_flags.remove(SampleFlag::Coalesced);
            }
            region = region.union(self.ingest(observation, sample_flags));
        }

        region
    }

    // -------------------------------------------------------------------------
    // Speculation
    // -------------------------------------------------------------------------

    /// Retract every predicted sample from the live tail.
    ///
    /// Predictions are stale the instant real data arrives, so this runs
    /// before each real batch is ingested. Returns the union of each removed
    /// sample's segment region with its immediate predecessor, which is
    /// exactly the area the host must repaint to erase the retracted tail.
    /// Remaining samples keep their order and sequence numbers.
    pub fn remove_speculative(&mut self) -> Region {
        if !self.live.iter().any(Sample::is_predicted) {
            return Region::EMPTY;
        }

        let mut region = Region::EMPTY;
        let mut previous = self.committed.last();
        for sample in &self.live {
            if sample.is_predicted() {
                region = region.union(match previous {
                    Some(prev) => sample.draw_region_with(prev, &self.palette),
                    None => sample.draw_region(&self.palette),
                });
            }
            previous = Some(sample);
        }

        for sample in self.live.iter().filter(|s| s.is_predicted()) {
            if let Some(key) = sample.correlation_key() {
                if self.pending.get(&key) == Some(&sample.sequence()) {
                    self.pending.remove(&key);
                }
            }
        }

        let before = self.live.len();
        self.live.retain(|s| !s.is_predicted());
        debug!(removed = before - self.live.len(), "retracted speculative samples");

        region
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    /// Fold an authoritative property update into the sample it was promised
    /// for.
    ///
    /// An observation whose correlation key matches no pending sample is a
    /// no-op — the update arrived after the sample resolved or was
    /// discarded, which is expected, not an error. Otherwise the affected
    /// sample's neighborhood region is computed before and after the update
    /// so a location revision repaints both the old and new segments.
    pub fn apply_reconciliation(&mut self, observation: &InputObservation) -> (bool, Region) {
        let Some(key) = observation.correlation_key else {
            return (false, Region::EMPTY);
        };
        let Some(&sequence) = self.pending.get(&key) else {
            return (false, Region::EMPTY);
        };

        // Pending samples are never committed, so the lookup stays in the
        // live tail. Live samples are sequence-sorted by construction.
        let Ok(index) = self.live.binary_search_by_key(&sequence, Sample::sequence) else {
            debug_assert!(false, "pending index points at a missing sample");
            self.pending.remove(&key);
            return (false, Region::EMPTY);
        };

        let before = self.neighborhood_region(index);
        if !self.live[index].apply_update(observation) {
            return (false, Region::EMPTY);
        }
        let after = self.neighborhood_region(index);

        if self.live[index].is_resolved() {
            self.pending.remove(&key);
            trace!(?key, sequence, remaining = self.pending.len(), "reconciliation resolved");
        }

        (true, before.union(after))
    }

    /// Repaint region around the live sample at `index`: its segments to
    /// both neighbors (the last committed sample counts as the predecessor
    /// of the first live one).
    fn neighborhood_region(&self, index: usize) -> Region {
        let sample = &self.live[index];

        let previous = if index > 0 {
            Some(&self.live[index - 1])
        } else {
            self.committed.last()
        };

        let mut region = match previous {
            Some(prev) => sample.draw_region_with(prev, &self.palette),
            None => sample.draw_region(&self.palette),
        };

        if let Some(next) = self.live.get(index + 1) {
            region = region.union(next.draw_region_with(sample, &self.palette));
        }

        region
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    /// Move stable samples from the front of the live tail into the
    /// committed prefix; returns exactly the samples moved.
    ///
    /// Non-forced: a sample is eligible only if it carries neither
    /// `NeedsUpdate` nor `Predicted`, and at least two samples must remain
    /// live behind it — a newly arriving sample needs its predecessor for
    /// the connecting segment, and the last committed point seeds the next
    /// live segment. A pass that would move fewer than two samples moves
    /// none (no degenerate single-point emissions).
    ///
    /// Forced (stroke ending): moves everything, stopping only before a
    /// sample still registered for reconciliation — committing one would
    /// strand its pending entry on an immutable sample.
    pub fn commit_stable(&mut self, force_all: bool) -> &[Sample] {
        let already_committed = self.committed.len();

        let eligible = if force_all {
            self.live
                .iter()
                .take_while(|s| !self.awaits_reconciliation(s))
                .count()
        } else {
            let cap = self.live.len().saturating_sub(2);
            let stable = self
                .live
                .iter()
                .take(cap)
                .take_while(|s| !s.blocks_commit())
                .count();
            if stable < 2 {
                0
            } else {
                stable
            }
        };

        if eligible > 0 {
            self.committed.extend(self.live.drain(..eligible));
            debug!(
                moved = eligible,
                committed = self.committed.len(),
                live = self.live.len(),
                force_all,
                "committed stable samples"
            );
        }

        &self.committed[already_committed..]
    }

    fn awaits_reconciliation(&self, sample: &Sample) -> bool {
        sample
            .correlation_key()
            .is_some_and(|key| self.pending.get(&key) == Some(&sample.sequence()))
    }

    // -------------------------------------------------------------------------
    // Cancellation
    // -------------------------------------------------------------------------

    /// Mark every retained sample as cancelled and return the union of their
    /// point regions.
    ///
    /// Cancelled samples render fully transparent, so a forced commit after
    /// this deposits nothing, and a later full rebuild drops the stroke
    /// entirely. The returned region is what the host must repaint to
    /// retract the visible ink.
    pub fn cancel(&mut self) -> Region {
        let mut region = Region::EMPTY;
        let palette = self.palette.clone();

        for sample in self.committed.iter_mut().chain(self.live.iter_mut()) {
            sample.mark_cancelled();
            region = region.union(sample.draw_region(&palette));
        }

        debug!(samples = self.len(), "stroke cancelled");
        region
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::input::SampleProperty;

    fn obs(x: f64, y: f64) -> InputObservation {
        InputObservation::stylus(Point::new(x, y), 0.5)
    }

    fn provisional_obs(x: f64, y: f64, key: u64) -> InputObservation {
        obs(x, y).with_estimates(SampleProperty::Pressure.into(), CorrelationKey(key))
    }

    fn resolving_obs(key: u64, pressure: f64) -> InputObservation {
        let mut update = InputObservation::stylus(Point::new(0.0, 0.0), pressure);
        update.correlation_key = Some(CorrelationKey(key));
        update
    }

    fn stroke() -> Stroke {
        Stroke::new(Palette::default())
    }

    fn sequences(samples: &[Sample]) -> Vec<u64> {
        samples.iter().map(Sample::sequence).collect()
    }

    // -------------------------------------------------------------------------
    // Ingestion
    // -------------------------------------------------------------------------

    #[test]
    fn test_ingest_assigns_monotonic_sequence() {
        let mut stroke = stroke();
        for i in 0..5 {
            stroke.ingest(&obs(i as f64, 0.0), SampleFlags::empty());
        }
        assert_eq!(sequences(stroke.live_samples()), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_first_sample_returns_point_region() {
        let mut stroke = stroke();
        let region = stroke.ingest(&obs(100.0, 100.0), SampleFlags::empty());
        assert!(!region.is_empty());
        assert!(region.contains(Point::new(100.0, 100.0)));
    }

    #[test]
    fn test_segment_region_spans_both_samples() {
        let mut stroke = stroke();
        stroke.ingest(&obs(0.0, 0.0), SampleFlags::empty());
        let region = stroke.ingest(&obs(50.0, 0.0), SampleFlags::empty());
        assert!(region.contains(Point::new(0.0, 0.0)));
        assert!(region.contains(Point::new(50.0, 0.0)));
    }

    #[test]
    fn test_coalesced_batch_reclassifies_last_as_standard() {
        let mut stroke = stroke();
        stroke.ingest_batch(
            &[obs(0.0, 0.0), obs(1.0, 0.0), obs(2.0, 0.0)],
            SampleFlag::Coalesced.into(),
        );

        let live = stroke.live_samples();
        assert!(live[0].flags().contains(SampleFlag::Coalesced));
        assert!(live[1].flags().contains(SampleFlag::Coalesced));
        assert!(!live[2].flags().contains(SampleFlag::Coalesced)); // Standard
        assert!(stroke.is_complete());
    }

    #[test]
    fn test_provisional_ingest_registers_pending() {
        let mut stroke = stroke();
        stroke.ingest(&provisional_obs(0.0, 0.0, 41), SampleFlags::empty());
        assert!(!stroke.is_complete());
    }

    // -------------------------------------------------------------------------
    // Speculation
    // -------------------------------------------------------------------------

    #[test]
    fn test_remove_speculative_purges_predicted_only() {
        let mut stroke = stroke();
        stroke.ingest_batch(&[obs(0.0, 0.0), obs(1.0, 0.0)], SampleFlag::Coalesced.into());
        stroke.ingest_batch(
            &[obs(2.0, 0.0), obs(3.0, 0.0)],
            SampleFlag::Predicted.into(),
        );
        assert_eq!(stroke.live_samples().len(), 4);

        let region = stroke.remove_speculative();
        assert!(!region.is_empty());
        // Covers the retracted tail plus the predecessor real sample.
        assert!(region.contains(Point::new(1.0, 0.0)));
        assert!(region.contains(Point::new(3.0, 0.0)));

        assert_eq!(stroke.live_samples().len(), 2);
        assert!(stroke.live_samples().iter().all(|s| !s.is_predicted()));
    }

    #[test]
    fn test_remove_speculative_twice_is_empty() {
        let mut stroke = stroke();
        stroke.ingest(&obs(0.0, 0.0), SampleFlags::empty());
        stroke.ingest(&obs(1.0, 0.0), SampleFlag::Predicted.into());

        assert!(!stroke.remove_speculative().is_empty());
        assert!(stroke.remove_speculative().is_empty());
    }

    #[test]
    fn test_remove_speculative_purges_pending_entries() {
        let mut stroke = stroke();
        stroke.ingest(&provisional_obs(0.0, 0.0, 77), SampleFlag::Predicted.into());
        assert!(!stroke.is_complete());

        stroke.remove_speculative();
        assert!(stroke.is_complete());
    }

    #[test]
    fn test_sequence_after_retraction_stays_ordered() {
        let mut stroke = stroke();
        stroke.ingest(&obs(0.0, 0.0), SampleFlags::empty());
        stroke.ingest(&obs(1.0, 0.0), SampleFlag::Predicted.into());
        stroke.ingest(&obs(2.0, 0.0), SampleFlag::Predicted.into());
        stroke.remove_speculative();
        stroke.ingest(&obs(3.0, 0.0), SampleFlags::empty());

        let seqs = sequences(stroke.live_samples());
        assert_eq!(seqs.len(), 2);
        assert!(seqs.windows(2).all(|w| w[0] < w[1]));
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    #[test]
    fn test_reconciliation_completes_stroke() {
        let mut stroke = stroke();
        stroke.ingest(&provisional_obs(0.0, 0.0, 1), SampleFlags::empty());
        assert!(!stroke.is_complete());

        let (changed, region) = stroke.apply_reconciliation(&resolving_obs(1, 0.9));
        assert!(changed);
        assert!(!region.is_empty());
        assert!(stroke.is_complete());
        assert_eq!(stroke.live_samples()[0].pressure(), 0.9);
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let mut stroke = stroke();
        stroke.ingest(&provisional_obs(0.0, 0.0, 1), SampleFlags::empty());

        let update = resolving_obs(1, 0.9);
        let (changed, _) = stroke.apply_reconciliation(&update);
        assert!(changed);

        let (changed, region) = stroke.apply_reconciliation(&update);
        assert!(!changed);
        assert!(region.is_empty());
    }

    #[test]
    fn test_reconciliation_unknown_key_is_noop() {
        let mut stroke = stroke();
        stroke.ingest(&provisional_obs(0.0, 0.0, 1), SampleFlags::empty());

        let (changed, region) = stroke.apply_reconciliation(&resolving_obs(99, 0.9));
        assert!(!changed);
        assert!(region.is_empty());
        assert!(!stroke.is_complete());
    }

    #[test]
    fn test_reconciliation_region_covers_both_neighbors() {
        let mut stroke = stroke();
        stroke.ingest(&obs(0.0, 0.0), SampleFlags::empty());
        stroke.ingest(&provisional_obs(10.0, 0.0, 5), SampleFlags::empty());
        stroke.ingest(&obs(20.0, 0.0), SampleFlags::empty());

        let (changed, region) = stroke.apply_reconciliation(&resolving_obs(5, 1.0));
        assert!(changed);
        assert!(region.contains(Point::new(0.0, 0.0)));
        assert!(region.contains(Point::new(20.0, 0.0)));
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    #[test]
    fn test_commit_holds_back_last_two() {
        let mut stroke = stroke();
        for i in 0..5 {
            stroke.ingest(&obs(i as f64, 0.0), SampleFlags::empty());
        }

        let moved = sequences(stroke.commit_stable(false));
        assert_eq!(moved, vec![0, 1, 2]);
        assert_eq!(sequences(stroke.live_samples()), vec![3, 4]);
        assert_eq!(sequences(stroke.committed_samples()), vec![0, 1, 2]);
    }

    #[test]
    fn test_commit_nothing_when_fewer_than_two_eligible() {
        let mut stroke = stroke();
        for i in 0..3 {
            stroke.ingest(&obs(i as f64, 0.0), SampleFlags::empty());
        }
        // Only one sample would be eligible: commits nothing.
        assert!(stroke.commit_stable(false).is_empty());
        assert_eq!(stroke.live_samples().len(), 3);
    }

    #[test]
    fn test_commit_on_tiny_stroke_is_noop() {
        let mut stroke = stroke();
        stroke.ingest(&obs(0.0, 0.0), SampleFlags::empty());
        assert!(stroke.commit_stable(false).is_empty());
    }

    #[test]
    fn test_commit_blocked_by_needs_update_and_predicted() {
        let mut stroke = stroke();
        stroke.ingest(&obs(0.0, 0.0), SampleFlags::empty());
        stroke.ingest(&obs(1.0, 0.0), SampleFlags::empty());
        stroke.ingest(&provisional_obs(2.0, 0.0, 1), SampleFlags::empty());
        for i in 3..8 {
            stroke.ingest(&obs(i as f64, 0.0), SampleFlags::empty());
        }

        // Unresolved sample at index 2 stops the pass after two samples.
        let moved = sequences(stroke.commit_stable(false));
        assert_eq!(moved, vec![0, 1]);

        // Predicted blocks the same way.
        let mut stroke = stroke_with_predicted_mid();
        let moved = sequences(stroke.commit_stable(false));
        assert_eq!(moved, vec![0, 1]);
    }

    fn stroke_with_predicted_mid() -> Stroke {
        let mut stroke = stroke();
        stroke.ingest(&obs(0.0, 0.0), SampleFlags::empty());
        stroke.ingest(&obs(1.0, 0.0), SampleFlags::empty());
        stroke.ingest(&obs(2.0, 0.0), SampleFlag::Predicted.into());
        for i in 3..8 {
            stroke.ingest(&obs(i as f64, 0.0), SampleFlags::empty());
        }
        stroke
    }

    #[test]
    fn test_forced_commit_moves_everything_when_complete() {
        let mut stroke = stroke();
        stroke.ingest_batch(
            &[obs(0.0, 0.0), obs(1.0, 0.0), obs(2.0, 0.0)],
            SampleFlag::Coalesced.into(),
        );

        let moved = sequences(stroke.commit_stable(true));
        assert_eq!(moved, vec![0, 1, 2]);
        assert!(stroke.live_samples().is_empty());
    }

    #[test]
    fn test_forced_commit_stops_before_unresolved() {
        let mut stroke = stroke();
        stroke.ingest(&obs(0.0, 0.0), SampleFlags::empty());
        stroke.ingest(&provisional_obs(1.0, 0.0, 3), SampleFlags::empty());
        stroke.ingest(&obs(2.0, 0.0), SampleFlags::empty());

        let moved = sequences(stroke.commit_stable(true));
        assert_eq!(moved, vec![0]);
        assert_eq!(stroke.live_samples().len(), 2);

        // Resolving unblocks the remainder.
        stroke.apply_reconciliation(&resolving_obs(3, 0.8));
        let moved = sequences(stroke.commit_stable(true));
        assert_eq!(moved, vec![1, 2]);
        assert!(stroke.live_samples().is_empty());
    }

    #[test]
    fn test_committed_is_append_only_across_passes() {
        let mut stroke = stroke();
        for i in 0..6 {
            stroke.ingest(&obs(i as f64, 0.0), SampleFlags::empty());
        }
        stroke.commit_stable(false);
        let first = sequences(stroke.committed_samples());

        for i in 6..10 {
            stroke.ingest(&obs(i as f64, 0.0), SampleFlags::empty());
        }
        stroke.commit_stable(false);
        let second = sequences(stroke.committed_samples());

        assert_eq!(&second[..first.len()], &first[..]);
    }

    // -------------------------------------------------------------------------
    // Cancellation
    // -------------------------------------------------------------------------

    #[test]
    fn test_cancel_marks_all_and_returns_union() {
        let mut stroke = stroke();
        let points = [(0.0, 0.0), (10.0, 0.0), (20.0, 5.0), (30.0, 5.0)];
        for (x, y) in points {
            stroke.ingest(&obs(x, y), SampleFlags::empty());
        }

        let region = stroke.cancel();
        for (x, y) in points {
            assert!(region.contains(Point::new(x, y)));
        }
        assert!(stroke
            .samples_in_order()
            .all(|s| s.flags().contains(SampleFlag::Cancelled)));
    }

    // -------------------------------------------------------------------------
    // Ordering invariant (property test)
    // -------------------------------------------------------------------------

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Batch(u8),
            Predicted(u8),
            Retract,
            Commit,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (1u8..5).prop_map(Op::Batch),
                (1u8..4).prop_map(Op::Predicted),
                Just(Op::Retract),
                Just(Op::Commit),
            ]
        }

        proptest! {
            #[test]
            fn retained_samples_stay_ordered_and_unique(ops in proptest::collection::vec(op_strategy(), 1..40)) {
                let mut stroke = stroke();
                let mut x = 0.0;

                for op in ops {
                    match op {
                        Op::Batch(n) => {
                            let batch: Vec<_> = (0..n).map(|_| { x += 1.0; obs(x, 0.0) }).collect();
                            stroke.remove_speculative();
                            stroke.ingest_batch(&batch, SampleFlag::Coalesced.into());
                        }
                        Op::Predicted(n) => {
                            let batch: Vec<_> = (0..n).map(|_| { x += 1.0; obs(x, 0.0) }).collect();
                            stroke.ingest_batch(&batch, SampleFlag::Predicted.into());
                        }
                        Op::Retract => { stroke.remove_speculative(); }
                        Op::Commit => { stroke.commit_stable(false); }
                    }

                    // Committed then live, in strictly increasing sequence order.
                    let seqs: Vec<u64> = stroke.samples_in_order().map(Sample::sequence).collect();
                    prop_assert!(seqs.windows(2).all(|w| w[0] < w[1]));
                }
            }

            #[test]
            fn nonforced_commit_never_drains_below_two(count in 2usize..30) {
                let mut stroke = stroke();
                for i in 0..count {
                    stroke.ingest(&obs(i as f64, 0.0), SampleFlags::empty());
                }
                let moved = stroke.commit_stable(false).len();
                prop_assert!(moved <= count.saturating_sub(2));
                prop_assert!(stroke.live_samples().len() >= 2.min(count));
            }
        }
    }
}

//! # Cross-recording trajectory stitching
//!
//! Joins the chronologically ordered per-recording tables of one group into a
//! single [`TrajectoryTable`] with **globally unique trajectory ids** and a
//! **continuous time axis**.
//!
//! ## Fold model
//! -----------------
//! The two running offsets of the stitch (the group time base and the next free
//! trajectory id) live in an explicit accumulator, [`StitchState`], threaded
//! value-by-value through the sequence of recordings:
//!
//! ```text
//! (state, recording) -> (state', adjusted_table)
//! ```
//!
//! [`stitch_step`] is that pure step function; [`stitch_group`] runs the fold in
//! ascending `start_time` order and merges the adjusted tables. Per recording:
//!
//! 1. every `t` is shifted by the recording's start offset from the group's
//!    first recording, making time continuous across the group instead of
//!    restarting at zero per file;
//! 2. every local id is shifted by the accumulated id offset, so ids never
//!    collide with any earlier recording of the group;
//! 3. the accumulator advances past the largest id just produced.
//!
//! ## Known limitation
//! -----------------
//! Stitching never merges a trajectory that is split across a file boundary,
//! nor one that spans two initially co-located entities of which only one was
//! detected at first. Such fragments keep separate, disjoint ids. See
//! [`back_stitch_candidates`] for the unsupported probe around the second case.
use hifitime::Epoch;
use itertools::Itertools;

use crate::constants::{TrajectoryId, BACK_STITCH_RADIUS};
use crate::recordings::RecordingDescriptor;
use crate::trajectories::TrajectoryTable;

/// Accumulator of the stitch fold: the group's time base and the next free id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StitchState {
    /// Start time of the group's first recording; all `t` become seconds since this.
    pub time_base: Epoch,
    /// The id offset applied to the next recording's local ids.
    pub next_id: TrajectoryId,
}

impl StitchState {
    /// Initial accumulator, anchored at the group's first recording.
    pub fn new(time_base: Epoch) -> Self {
        StitchState {
            time_base,
            next_id: 0,
        }
    }
}

/// Re-base one recording's table into group time and group ids.
///
/// Pure fold step: consumes the accumulator and the recording's local table,
/// returns the advanced accumulator and the adjusted table. The input table's
/// per-trajectory time ordering is preserved (a uniform shift cannot reorder).
///
/// Arguments
/// -----------------
/// * `state` – accumulator from the previous step (or [`StitchState::new`]).
/// * `descriptor` – metadata of the recording being folded in.
/// * `table` – that recording's table, keyed by local ids.
///
/// Return
/// ----------
/// * `(state', adjusted_table)` where `state'.next_id` is one past the largest
///   id present in `adjusted_table` (unchanged for an empty table).
pub fn stitch_step(
    state: StitchState,
    descriptor: &RecordingDescriptor,
    table: TrajectoryTable,
) -> (StitchState, TrajectoryTable) {
    let elapsed = (descriptor.start_time - state.time_base).to_seconds();

    let mut adjusted = TrajectoryTable::default();
    let mut max_id: Option<TrajectoryId> = None;
    for (local_id, mut samples) in table {
        let id = local_id + state.next_id;
        for sample in &mut samples {
            sample.t += elapsed;
        }
        max_id = Some(max_id.map_or(id, |m| m.max(id)));
        adjusted.insert(id, samples);
    }

    let next = StitchState {
        time_base: state.time_base,
        next_id: max_id.map_or(state.next_id, |m| m + 1),
    };
    (next, adjusted)
}

/// Stitch all recordings of one group into a single table.
///
/// Recordings are folded in ascending `start_time` order (re-sorted here, so
/// callers that did not go through [`crate::recordings::Group::new`] still get
/// the chronological fold).
///
/// Return
/// ----------
/// * One [`TrajectoryTable`] with globally unique ids and a single continuous
///   time axis; empty if `recordings` is empty.
pub fn stitch_group(
    mut recordings: Vec<(RecordingDescriptor, TrajectoryTable)>,
) -> TrajectoryTable {
    recordings.sort_by(|a, b| a.0.start_time.cmp(&b.0.start_time));

    let Some(first_start) = recordings.first().map(|(desc, _)| desc.start_time) else {
        return TrajectoryTable::default();
    };

    let mut state = StitchState::new(first_start);
    let mut group_table = TrajectoryTable::default();
    for (descriptor, table) in recordings {
        let (next, adjusted) = stitch_step(state, &descriptor, table);
        state = next;
        group_table.extend(adjusted);
    }
    group_table
}

/// Probe for trajectories that may continue an earlier, co-located track.
///
/// **Unsupported operation.** Back-stitching (merging a trajectory that should
/// have started earlier under another entity's id) is intentionally not
/// implemented: only entities with a confident full trajectory are trusted.
/// This probe only reports candidate `(orphan, reference)` id pairs and never
/// merges anything.
///
/// A trajectory is an orphan candidate when its first sample sits exactly at
/// the `(0, 0)` sentinel. For each orphan, its first detected sample is matched
/// against every other trajectory holding a sample at that same timestamp
/// within [`BACK_STITCH_RADIUS`].
///
/// Precondition
/// -----------------
/// * Must run on a **stitched, unfiltered** table: the probe relies on the
///   sentinel zeros that filtering removes.
///
/// Return
/// ----------
/// * Candidate `(orphan_id, reference_id)` pairs, sorted for determinism.
pub fn back_stitch_candidates(table: &TrajectoryTable) -> Vec<(TrajectoryId, TrajectoryId)> {
    let mut pairings = Vec::new();

    for (&orphan, samples) in table {
        let starts_at_sentinel = samples
            .first()
            .is_some_and(|s| s.pos.x == 0.0 && s.pos.y == 0.0);
        if !starts_at_sentinel {
            continue;
        }
        let Some(first_detected) = samples.iter().find(|s| s.pos.x != 0.0 && s.pos.y != 0.0)
        else {
            continue;
        };

        for (&reference, other) in table {
            if reference == orphan {
                continue;
            }
            let at_same_time = other.iter().find(|s| s.t == first_detected.t);
            if let Some(reference_sample) = at_same_time {
                if (first_detected.pos - reference_sample.pos).norm() < BACK_STITCH_RADIUS {
                    pairings.push((orphan, reference));
                }
            }
        }
    }

    pairings.into_iter().sorted().collect()
}

#[cfg(test)]
mod stitcher_test {
    use super::*;
    use crate::trajectories::Sample;
    use camino::Utf8PathBuf;
    use hifitime::TimeScale;

    fn descriptor(start_time: Epoch) -> RecordingDescriptor {
        RecordingDescriptor {
            path: Utf8PathBuf::from("synthetic-traj.csv"),
            camera_name: "synthetic".to_string(),
            start_time,
            scaling_factor: 1.0,
        }
    }

    fn single_sample_table(id: u32, t: f64) -> TrajectoryTable {
        let mut table = TrajectoryTable::default();
        table.insert(id, [Sample::new(t, 1.0, 1.0)].into_iter().collect());
        table
    }

    #[test]
    fn test_second_recording_is_time_and_id_shifted() {
        let t0 = Epoch::from_gregorian(2016, 5, 12, 21, 0, 0, 0, TimeScale::UTC);
        let t1 = Epoch::from_gregorian(2016, 5, 12, 22, 0, 0, 0, TimeScale::UTC);

        let stitched = stitch_group(vec![
            (descriptor(t0), single_sample_table(0, 0.5)),
            (descriptor(t1), single_sample_table(0, 0.25)),
        ]);

        assert_eq!(stitched.len(), 2);
        assert_eq!(stitched[&0][0].t, 0.5);
        // One hour between starts: 3600 seconds added to the second file's t.
        assert_eq!(stitched[&1][0].t, 3600.0 + 0.25);
        assert!(stitched.keys().max().unwrap() > stitched.keys().min().unwrap());
    }

    #[test]
    fn test_ids_never_collide_across_recordings() {
        let t0 = Epoch::from_gregorian(2016, 5, 12, 21, 0, 0, 0, TimeScale::UTC);
        let t1 = Epoch::from_gregorian(2016, 5, 12, 21, 30, 0, 0, TimeScale::UTC);
        let t2 = Epoch::from_gregorian(2016, 5, 12, 22, 0, 0, 0, TimeScale::UTC);

        let mut first = TrajectoryTable::default();
        first.insert(0, [Sample::new(0.0, 1.0, 1.0)].into_iter().collect());
        first.insert(3, [Sample::new(0.0, 2.0, 2.0)].into_iter().collect());

        let stitched = stitch_group(vec![
            (descriptor(t0), first),
            (descriptor(t1), single_sample_table(0, 0.0)),
            (descriptor(t2), single_sample_table(1, 0.0)),
        ]);

        // 0 and 3 from the first file, 4 from the second, 6 from the third.
        let mut ids: Vec<u32> = stitched.keys().copied().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 3, 4, 6]);
    }

    #[test]
    fn test_recordings_are_folded_in_chronological_order() {
        let early = Epoch::from_gregorian(2016, 5, 12, 21, 0, 0, 0, TimeScale::UTC);
        let late = Epoch::from_gregorian(2016, 5, 12, 23, 0, 0, 0, TimeScale::UTC);

        // Passed out of order; the fold must still anchor on the earlier start.
        let stitched = stitch_group(vec![
            (descriptor(late), single_sample_table(0, 0.0)),
            (descriptor(early), single_sample_table(0, 0.0)),
        ]);

        let mut times: Vec<f64> = stitched.values().map(|s| s[0].t).collect();
        times.sort_by(f64::total_cmp);
        assert_eq!(times, vec![0.0, 7200.0]);
    }

    #[test]
    fn test_empty_group_stitches_to_empty_table() {
        assert!(stitch_group(Vec::new()).is_empty());
    }

    #[test]
    fn test_back_stitch_candidates_reports_close_reference_only() {
        let mut table = TrajectoryTable::default();
        // Orphan: sentinel start, first detected at t=1.0, (10, 10).
        table.insert(
            7,
            [Sample::new(0.0, 0.0, 0.0), Sample::new(1.0, 10.0, 10.0)]
                .into_iter()
                .collect(),
        );
        // Close reference at the orphan's first detected timestamp.
        table.insert(
            2,
            [Sample::new(0.0, 11.0, 10.0), Sample::new(1.0, 12.0, 10.0)]
                .into_iter()
                .collect(),
        );
        // Too far away to be a candidate.
        table.insert(
            3,
            [Sample::new(1.0, 100.0, 100.0)].into_iter().collect(),
        );

        assert_eq!(back_stitch_candidates(&table), vec![(7, 2)]);
    }

    #[test]
    fn test_back_stitch_ignores_trajectories_with_detected_start() {
        let mut table = TrajectoryTable::default();
        table.insert(
            0,
            [Sample::new(0.0, 5.0, 5.0), Sample::new(1.0, 6.0, 6.0)]
                .into_iter()
                .collect(),
        );
        assert!(back_stitch_candidates(&table).is_empty());
    }
}

//! # Trajectories: ingestion, stitching, cleaning, and kinematics
//!
//! High-level facilities to **ingest**, **stitch**, **clean**, and **annotate**
//! motion-tracking samples grouped by trajectory. The central type is
//! [`TrajectoryTable`], a fast hash map that buckets time-ordered samples per
//! [`TrajectoryId`].
//!
//! Modules
//! -----------------
//! * [`record_reader`](crate::trajectories::record_reader) – Wide-to-long decoding
//!   of one recording's CSV log into a keyed table with per-file local ids.
//! * [`stitcher`](crate::trajectories::stitcher) – Chronological fold joining the
//!   per-recording tables of a group into one table with globally unique ids and a
//!   continuous time axis.
//! * [`filter`](crate::trajectories::filter) – Sentinel-sample removal, minimum
//!   length gating, and edge trimming.
//! * [`kinematics`](crate::trajectories::kinematics) – Heading, speed, and
//!   rotation rate per sample, computed within trajectory partitions only.
//! * [`pairing`](crate::trajectories::pairing) – Timestamp-aligned Euclidean
//!   separation between two co-tracked entities.
//! * *(crate-private, feature `progress`)* `progress_bar` – Iteration timing for
//!   the batch progress UI.
//!
//! Data Model
//! -----------------
//! * **Key:** [`TrajectoryId`] (one continuous track of one entity).
//! * **Value:** [`Samples`](crate::constants::Samples) = `SmallVec<Sample>`,
//!   time-ordered per trajectory with no duplicate `t`.
//! * **Table:** [`TrajectoryTable`] = `HashMap<TrajectoryId, Samples, ahash::RandomState>`
//!   for fast hashing on large groups.
//!
//! Keying samples by trajectory makes the partition boundaries structural: the
//! kinematics pass differences neighbors inside one bucket and can never reach
//! across into another trajectory.
//!
//! Units
//! -----------------
//! * Positions are in tracker pixel coordinates; a coordinate of exactly `0` is
//!   the tracker's "no detection" sentinel until the filter removes it.
//! * Times are **seconds** since the first recording of the group (after
//!   stitching; before stitching, seconds since the recording's own start).
//!
//! See also
//! ------------
//! * [`crate::batch`] – Runs the full pipeline over a catalog of groups.
use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use nalgebra::Vector2;

use crate::constants::{KinematicSamples, Radian, Samples, Seconds, TrajectoryId};

pub mod filter;
pub mod kinematics;
pub mod pairing;
pub mod record_reader;
pub mod stitcher;

#[cfg(feature = "progress")]
pub(crate) mod progress_bar;

/// One position observation of one tracked entity at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds since the time base of the recording (or group, after stitching).
    pub t: Seconds,
    /// Tracker position; `0` in either axis means "not detected".
    pub pos: Vector2<f64>,
}

impl Sample {
    pub fn new(t: Seconds, x: f64, y: f64) -> Self {
        Sample {
            t,
            pos: Vector2::new(x, y),
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.pos.y
    }
}

/// A [`Sample`] annotated with per-step kinematics.
///
/// The derived fields are `None` where no value is defined: all three on the
/// first sample of a trajectory, and `rotation` additionally on the second,
/// whose rotation basis angle does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicSample {
    pub t: Seconds,
    pub pos: Vector2<f64>,
    /// Heading of the step ending at this sample, in `(-π, π]`.
    pub angle: Option<Radian>,
    /// Step displacement over step duration.
    pub speed: Option<f64>,
    /// Shortest-turn heading change rate, in radians per second.
    pub rotation: Option<f64>,
}

/// A full set of trajectories for one recording or one stitched group.
///
/// The key is the [`TrajectoryId`]; the value is the time-ordered list of
/// [`Sample`]s of that trajectory. Uses [`ahash`](https://docs.rs/ahash) for
/// fast hashing.
pub type TrajectoryTable = HashMap<TrajectoryId, Samples, RandomState>;

/// The annotated counterpart of [`TrajectoryTable`], produced by the kinematics pass.
pub type KinematicTable = HashMap<TrajectoryId, KinematicSamples, RandomState>;

/// Separation between the two co-tracked entities at one shared timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDistance {
    pub t: Seconds,
    pub d: f64,
}

/// Pairwise separation per shared timestamp, ordered by ascending `t`.
pub type PairDistanceTable = Vec<PairDistance>;

/// Summary statistics for per-trajectory sample counts.
///
/// Percentiles use the *nearest-rank* method: the index is `round(q × (N-1))`
/// for quantile `q ∈ [0,1]`, clamped to the valid range, which keeps results
/// stable for small sets.
///
/// Display
/// -----------------
/// * `format!("{}", stats)` – compact single-line summary.
/// * `format!("{:#}", stats)` – pretty multi-line table.
#[derive(Debug, Clone, Copy)]
pub struct SampleCountStats {
    pub min: usize,
    pub p25: usize,
    pub median: usize,
    pub p95: usize,
    pub max: usize,
}

impl fmt::Display for SampleCountStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Sample count per trajectory")?;
            writeln!(f, "---------------------------")?;
            writeln!(f, "min    : {}", self.min)?;
            writeln!(f, "p25    : {}", self.p25)?;
            writeln!(f, "median : {}", self.median)?;
            writeln!(f, "p95    : {}", self.p95)?;
            write!(f, "max    : {}", self.max)
        } else {
            write!(
                f,
                "min={}, p25={}, median={}, p95={}, max={}",
                self.min, self.p25, self.median, self.p95, self.max
            )
        }
    }
}

/// Set-level metrics shared by the raw and annotated table types.
pub trait TableStats {
    /// Total number of samples across all trajectories.
    fn total_samples(&self) -> usize;

    /// Number of distinct trajectories in the table.
    fn trajectory_count(&self) -> usize;

    /// Distribution statistics of samples per trajectory, `None` for an empty table.
    fn sample_count_stats(&self) -> Option<SampleCountStats>;
}

fn stats_from_counts(mut counts: Vec<usize>) -> Option<SampleCountStats> {
    if counts.is_empty() {
        return None;
    }
    counts.sort_unstable();

    #[inline]
    fn q_index(n: usize, q: f64) -> usize {
        let pos = q * (n as f64 - 1.0);
        let idx = pos.round() as isize;
        idx.clamp(0, (n as isize) - 1) as usize
    }

    let n = counts.len();
    Some(SampleCountStats {
        min: counts[0],
        p25: counts[q_index(n, 0.25)],
        median: counts[q_index(n, 0.50)],
        p95: counts[q_index(n, 0.95)],
        max: counts[n - 1],
    })
}

impl TableStats for TrajectoryTable {
    #[inline]
    fn total_samples(&self) -> usize {
        self.values().map(|samples: &Samples| samples.len()).sum()
    }

    #[inline]
    fn trajectory_count(&self) -> usize {
        self.len()
    }

    fn sample_count_stats(&self) -> Option<SampleCountStats> {
        stats_from_counts(self.values().map(|s| s.len()).collect())
    }
}

impl TableStats for KinematicTable {
    #[inline]
    fn total_samples(&self) -> usize {
        self.values()
            .map(|samples: &KinematicSamples| samples.len())
            .sum()
    }

    #[inline]
    fn trajectory_count(&self) -> usize {
        self.len()
    }

    fn sample_count_stats(&self) -> Option<SampleCountStats> {
        stats_from_counts(self.values().map(|s| s.len()).collect())
    }
}

#[cfg(test)]
mod table_stats_test {
    use super::*;

    #[test]
    fn test_sample_count_stats() {
        let mut table = TrajectoryTable::default();
        table.insert(0, (0..4).map(|i| Sample::new(i as f64, 1.0, 1.0)).collect());
        table.insert(1, (0..8).map(|i| Sample::new(i as f64, 1.0, 1.0)).collect());
        table.insert(2, (0..2).map(|i| Sample::new(i as f64, 1.0, 1.0)).collect());

        let stats = table.sample_count_stats().unwrap();
        assert_eq!(stats.min, 2);
        assert_eq!(stats.median, 4);
        assert_eq!(stats.max, 8);
        assert_eq!(table.total_samples(), 14);
        assert_eq!(table.trajectory_count(), 3);
    }

    #[test]
    fn test_empty_table_has_no_stats() {
        let table = TrajectoryTable::default();
        assert!(table.sample_count_stats().is_none());
    }
}

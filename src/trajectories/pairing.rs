//! # Pairwise separation
//!
//! Computes the Euclidean distance between two co-tracked entities at every
//! timestamp where **both** were detected. Applies only to groups whose
//! condition expects exactly two entities.
//!
//! ## Pairing rule
//! -----------------
//! All samples of the filtered table are re-keyed by timestamp. A timestamp
//! qualifies iff exactly two samples share it (one from each live trajectory;
//! within one trajectory `t` is unique, so two samples at one instant always
//! come from distinct trajectories). Timestamps occupied by a single sample
//! (the partner was filtered out or not yet tracked) are skipped.
//!
//! ## Failure modes
//! -----------------
//! * [`WaggleError::NoPairedTimestamps`] – no timestamp qualifies; the
//!   downstream separation statistic would be meaningless.
//! * [`WaggleError::AmbiguousPairing`] – more than two samples share one
//!   timestamp. Pairing an arbitrary two of them would silently corrupt the
//!   statistic, so the precondition violation is surfaced instead.
use std::collections::BTreeMap;

use ordered_float::NotNan;
use smallvec::SmallVec;

use crate::trajectories::{PairDistance, PairDistanceTable, TrajectoryTable};
use crate::waggle_errors::WaggleError;

/// Separation distance between the two tracked entities at each shared timestamp.
///
/// Arguments
/// -----------------
/// * `table` – filtered table of a two-entity group.
///
/// Return
/// ----------
/// * A [`PairDistanceTable`] ordered by ascending `t`, or one of the pairing
///   failures described in the module docs.
pub fn pair_separation(table: &TrajectoryTable) -> Result<PairDistanceTable, WaggleError> {
    let mut by_time: BTreeMap<NotNan<f64>, SmallVec<[nalgebra::Vector2<f64>; 2]>> =
        BTreeMap::new();
    for samples in table.values() {
        for sample in samples {
            let t = NotNan::new(sample.t)?;
            by_time.entry(t).or_default().push(sample.pos);
        }
    }

    let mut distances = PairDistanceTable::new();
    for (t, positions) in by_time {
        match positions.as_slice() {
            [_] => {}
            [a, b] => distances.push(PairDistance {
                t: t.into_inner(),
                d: (a - b).norm(),
            }),
            _ => return Err(WaggleError::AmbiguousPairing(t.into_inner())),
        }
    }

    if distances.is_empty() {
        return Err(WaggleError::NoPairedTimestamps);
    }
    Ok(distances)
}

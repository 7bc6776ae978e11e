//! # Trajectory cleaning
//!
//! Removes nonsensical samples from a stitched [`TrajectoryTable`], drops
//! trajectories that are too short to be meaningful, and trims the edges of the
//! survivors (the tracker is least reliable around acquisition and loss).
//!
//! ## Order of operations
//! -----------------
//! 1. drop every sample with `x <= 0` or `y <= 0` (the "no detection" sentinel);
//! 2. drop every trajectory with fewer than `min_length` surviving samples;
//! 3. trim `trim_start_frames` head and `trim_end_frames` tail samples from
//!    each survivor, by time order.
//!
//! Sentinel removal runs **before** the length gate, so a trajectory is judged
//! on its valid samples only. Because the parameters guarantee
//! `trim_start_frames + trim_end_frames < min_length`, every retained
//! trajectory keeps at least one sample; emptied trajectories can therefore
//! never appear in the output.
use crate::config::PipelineParams;
use crate::constants::Samples;
use crate::trajectories::TrajectoryTable;
use crate::waggle_errors::WaggleError;

/// Cleaning pass over a stitched table.
pub trait TrajectoryFilter {
    /// Remove sentinel samples, short trajectories, and trajectory edges.
    ///
    /// Arguments
    /// -----------------
    /// * `params` – validated pipeline parameters; re-validated here so a
    ///   hand-built inconsistent configuration fails before touching data.
    ///
    /// Return
    /// ----------
    /// * The filtered table. Every retained trajectory holds at least
    ///   `min_length - trim_start_frames - trim_end_frames >= 1` samples.
    /// * `Err(WaggleError::InvalidParameter)` if the parameters are inconsistent.
    fn filter_trajectories(self, params: &PipelineParams) -> Result<TrajectoryTable, WaggleError>;
}

impl TrajectoryFilter for TrajectoryTable {
    fn filter_trajectories(self, params: &PipelineParams) -> Result<TrajectoryTable, WaggleError> {
        params.validate()?;

        let mut filtered = TrajectoryTable::default();
        for (id, samples) in self {
            let valid: Samples = samples
                .into_iter()
                .filter(|s| s.pos.x > 0.0 && s.pos.y > 0.0)
                .collect();
            if valid.len() < params.min_length {
                continue;
            }

            let end = valid.len() - params.trim_end_frames;
            let trimmed: Samples = valid[params.trim_start_frames..end].iter().copied().collect();
            filtered.insert(id, trimmed);
        }
        Ok(filtered)
    }
}

#[cfg(test)]
mod filter_test {
    use super::*;
    use crate::trajectories::Sample;

    fn params(min_length: usize, trim_start: usize, trim_end: usize) -> PipelineParams {
        PipelineParams::builder()
            .min_length(min_length)
            .trim_start_frames(trim_start)
            .trim_end_frames(trim_end)
            .build()
            .unwrap()
    }

    fn trajectory(points: &[(f64, f64, f64)]) -> Samples {
        points
            .iter()
            .map(|&(t, x, y)| Sample::new(t, x, y))
            .collect()
    }

    #[test]
    fn test_sentinel_removed_before_length_gate() {
        // Five samples, one at the sentinel: the length gate sees four and
        // keeps the trajectory under min_length = 3.
        let mut table = TrajectoryTable::default();
        table.insert(
            0,
            trajectory(&[
                (0.0, 1.0, 1.0),
                (1.0, 0.0, 0.0),
                (2.0, 2.0, 2.0),
                (3.0, 3.0, 3.0),
                (4.0, 4.0, 4.0),
            ]),
        );

        let filtered = table.filter_trajectories(&params(3, 0, 0)).unwrap();
        assert_eq!(filtered[&0].len(), 4);
        assert!(filtered[&0].iter().all(|s| s.pos.x > 0.0 && s.pos.y > 0.0));
    }

    #[test]
    fn test_short_trajectories_are_absent_from_output() {
        let mut table = TrajectoryTable::default();
        table.insert(0, trajectory(&[(0.0, 1.0, 1.0), (1.0, 2.0, 2.0)]));
        table.insert(1, trajectory(&[(0.0, 1.0, 1.0), (1.0, 2.0, 2.0), (2.0, 3.0, 3.0)]));

        let filtered = table.filter_trajectories(&params(3, 0, 0)).unwrap();
        assert!(!filtered.contains_key(&0));
        assert_eq!(filtered[&1].len(), 3);
    }

    #[test]
    fn test_edges_are_trimmed_in_time_order() {
        let mut table = TrajectoryTable::default();
        table.insert(
            0,
            trajectory(&[
                (0.0, 1.0, 1.0),
                (1.0, 2.0, 2.0),
                (2.0, 3.0, 3.0),
                (3.0, 4.0, 4.0),
                (4.0, 5.0, 5.0),
            ]),
        );

        let filtered = table.filter_trajectories(&params(4, 1, 2)).unwrap();
        let times: Vec<f64> = filtered[&0].iter().map(|s| s.t).collect();
        assert_eq!(times, vec![1.0, 2.0]);
    }

    #[test]
    fn test_negative_coordinates_count_as_invalid() {
        let mut table = TrajectoryTable::default();
        table.insert(
            0,
            trajectory(&[(0.0, -1.0, 5.0), (1.0, 5.0, 5.0), (2.0, 6.0, 6.0)]),
        );

        let filtered = table.filter_trajectories(&params(2, 0, 0)).unwrap();
        assert_eq!(filtered[&0].len(), 2);
    }

    #[test]
    fn test_inconsistent_parameters_fail_before_processing() {
        let bad = PipelineParams {
            min_length: 3,
            trim_start_frames: 2,
            trim_end_frames: 2,
            ..PipelineParams::default()
        };
        let table = TrajectoryTable::default();
        assert!(matches!(
            table.filter_trajectories(&bad),
            Err(WaggleError::InvalidParameter(_))
        ));
    }
}

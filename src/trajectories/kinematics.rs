//! # Per-step kinematics
//!
//! Derives heading, speed, and rotation rate for every sample of a filtered
//! [`TrajectoryTable`], producing a new [`KinematicTable`]. The input is left
//! untouched; callers decide whether to keep or drop it.
//!
//! ## Definitions
//! -----------------
//! For consecutive samples `i-1`, `i` **within one trajectory**:
//!
//! * `angle_i = atan2(dy, dx)` in `(-π, π]`,
//! * `speed_i = ‖Δpos‖ / dt`,
//! * `rotation_i = wrap(angle_i - angle_{i-1}) / dt`, with [`wrap_angle`]
//!   mapping the difference into `(-π, π]` (shortest-turn convention).
//!
//! The partition is structural: differencing walks one trajectory's bucket and
//! can never reach a neighboring trajectory.
//!
//! ## Undefined values
//! -----------------
//! The first sample of every trajectory has no predecessor, so all three
//! derived fields are `None`. The **second** sample has a defined angle and
//! speed but its rotation basis `angle_{i-1}` does not exist, so its rotation
//! is `None` as well; rotation exists from the third sample onward.
use crate::constants::{KinematicSamples, Radian, DPI};
use crate::trajectories::{KinematicSample, KinematicTable, TrajectoryTable};

/// Map an angle into `(-π, π]`, choosing the shortest turn.
#[inline]
pub fn wrap_angle(theta: Radian) -> Radian {
    let r = theta.rem_euclid(DPI);
    if r > std::f64::consts::PI {
        r - DPI
    } else {
        r
    }
}

/// Kinematic annotation of a filtered table.
pub trait Kinematics {
    /// Compute per-step heading, speed, and rotation rate for every trajectory.
    ///
    /// Return
    /// ----------
    /// * A new [`KinematicTable`] with the same keys and sample times as the
    ///   input; derived fields are `None` where undefined (see module docs).
    fn with_kinematics(&self) -> KinematicTable;
}

impl Kinematics for TrajectoryTable {
    fn with_kinematics(&self) -> KinematicTable {
        let mut annotated = KinematicTable::default();

        for (&id, samples) in self {
            let mut out = KinematicSamples::with_capacity(samples.len());
            let mut prev_angle: Option<Radian> = None;

            for (i, sample) in samples.iter().enumerate() {
                let (angle, speed, rotation) = if i == 0 {
                    (None, None, None)
                } else {
                    let prev = &samples[i - 1];
                    let dt = sample.t - prev.t;
                    let step = sample.pos - prev.pos;
                    let angle = step.y.atan2(step.x);
                    let speed = step.norm() / dt;
                    let rotation = prev_angle.map(|basis| wrap_angle(angle - basis) / dt);
                    (Some(angle), Some(speed), rotation)
                };

                out.push(KinematicSample {
                    t: sample.t,
                    pos: sample.pos,
                    angle,
                    speed,
                    rotation,
                });
                prev_angle = angle;
            }

            annotated.insert(id, out);
        }

        annotated
    }
}

/// Proportion of time the tracked entities spend moving.
///
/// Counts annotated samples whose speed exceeds `threshold` against the total
/// sample count (samples with undefined speed count in the denominator only,
/// matching a per-timestep notion of "time spent").
///
/// Return
/// ----------
/// * A fraction in `[0, 1]`; `0.0` for an empty table.
pub fn fraction_moving(table: &KinematicTable, threshold: f64) -> f64 {
    let total: usize = table.values().map(|s| s.len()).sum();
    if total == 0 {
        return 0.0;
    }
    let moving: usize = table
        .values()
        .flat_map(|samples| samples.iter())
        .filter(|s| s.speed.is_some_and(|v| v > threshold))
        .count();
    moving as f64 / total as f64
}

#[cfg(test)]
mod kinematics_test {
    use super::*;
    use crate::constants::Samples;
    use crate::trajectories::Sample;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn trajectory(points: &[(f64, f64, f64)]) -> Samples {
        points
            .iter()
            .map(|&(t, x, y)| Sample::new(t, x, y))
            .collect()
    }

    #[test]
    fn test_right_angle_turn() {
        let mut table = TrajectoryTable::default();
        table.insert(
            0,
            trajectory(&[(0.0, 0.0, 0.0), (1.0, 1.0, 0.0), (2.0, 1.0, 1.0)]),
        );

        let annotated = table.with_kinematics();
        let samples = &annotated[&0];

        // First sample: nothing to difference against.
        assert_eq!(samples[0].angle, None);
        assert_eq!(samples[0].speed, None);
        assert_eq!(samples[0].rotation, None);

        // Second sample: heading and speed defined, rotation basis missing.
        assert_eq!(samples[1].angle, Some(0.0));
        assert_eq!(samples[1].speed, Some(1.0));
        assert_eq!(samples[1].rotation, None);

        // Third sample: quarter turn to the left over one second.
        assert_eq!(samples[2].angle, Some(FRAC_PI_2));
        assert_eq!(samples[2].speed, Some(1.0));
        assert_eq!(samples[2].rotation, Some(FRAC_PI_2));
    }

    #[test]
    fn test_rotation_takes_the_shortest_turn() {
        // Headings: π - 0.1, then -π + 0.1: a +0.2 rad turn through the
        // branch cut, not a -2π + 0.2 sweep.
        let a1: f64 = PI - 0.1;
        let a2: f64 = -PI + 0.1;
        let mut table = TrajectoryTable::default();
        table.insert(
            0,
            trajectory(&[
                (0.0, 0.0, 0.0),
                (1.0, a1.cos(), a1.sin()),
                (2.0, a1.cos() + a2.cos(), a1.sin() + a2.sin()),
            ]),
        );

        let annotated = table.with_kinematics();
        let rotation = annotated[&0][2].rotation.unwrap();
        assert!((rotation - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_speed_accounts_for_time_step() {
        let mut table = TrajectoryTable::default();
        table.insert(0, trajectory(&[(0.0, 0.0, 0.0), (0.5, 2.0, 0.0)]));

        let annotated = table.with_kinematics();
        assert_eq!(annotated[&0][1].speed, Some(4.0));
    }

    #[test]
    fn test_trajectory_boundaries_are_respected() {
        // Two trajectories; the first sample of each must stay unannotated even
        // though another trajectory ends right before it in time.
        let mut table = TrajectoryTable::default();
        table.insert(0, trajectory(&[(0.0, 1.0, 1.0), (1.0, 2.0, 2.0)]));
        table.insert(1, trajectory(&[(2.0, 50.0, 50.0), (3.0, 51.0, 51.0)]));

        let annotated = table.with_kinematics();
        assert_eq!(annotated[&1][0].angle, None);
        assert_eq!(annotated[&1][0].speed, None);
        assert_eq!(annotated[&1][0].rotation, None);
        assert!(annotated[&1][1].speed.is_some());
    }

    #[test]
    fn test_wrap_angle_range() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert_eq!(wrap_angle(PI), PI);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(-0.25) + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_fraction_moving() {
        let mut table = TrajectoryTable::default();
        // Speeds: None, 10, 0.
        table.insert(
            0,
            trajectory(&[(0.0, 1.0, 1.0), (1.0, 11.0, 1.0), (2.0, 11.0, 1.0)]),
        );

        let annotated = table.with_kinematics();
        assert_eq!(fraction_moving(&annotated, 1.0), 1.0 / 3.0);
        assert_eq!(fraction_moving(&KinematicTable::default(), 1.0), 0.0);
    }
}

//! # Batch orchestration over a recording catalog
//!
//! Runs the full post-processing pipeline (read → stitch → filter → pair →
//! kinematics → persist) over **every group** of a [`Catalog`], collecting
//! per-group outcomes into a [`BatchSummary`].
//!
//! ## Execution model
//! -----------------
//! Groups are processed strictly sequentially, in the catalog's sorted
//! `(condition, date)` order. Within a group, recordings are combined in
//! ascending `start_time` order. Every intermediate table is owned by the
//! group's iteration and dropped before the next group begins, so peak memory
//! stays bounded to one group regardless of catalog size; the orchestrator is
//! built to run unattended over a large, growing corpus.
//!
//! ## Error semantics
//! -----------------
//! * Inconsistent parameters abort the batch **before** any group runs.
//! * A failure inside one group (unreadable file, malformed recording, sink
//!   I/O) is recorded in the summary and does **not** abort the other groups.
//! * A pair-separation failure ([`WaggleError::NoPairedTimestamps`],
//!   [`WaggleError::AmbiguousPairing`]) skips only that group's distance
//!   output; the trajectory output still proceeds.
//! * The sink writes one file per table per group, so a failed group cannot
//!   corrupt output already persisted for another group.
//!
//! ## Progress UI (feature `progress`)
//! -----------------
//! With the `progress` feature, `run_batch` renders a live bar (via
//! `indicatif`) with smoothed per-group timing.
//!
//! ## See also
//! ------------
//! * [`TableSink`] – Persistence interface implemented by [`CsvSink`](csv_sink::CsvSink).
//! * [`crate::trajectories`] – The per-group pipeline stages.
use std::fmt;

use crate::config::PipelineParams;
use crate::recordings::{Catalog, Group, GroupKey};
use crate::trajectories::filter::TrajectoryFilter;
use crate::trajectories::kinematics::Kinematics;
use crate::trajectories::pairing::pair_separation;
use crate::trajectories::record_reader::read_record_file;
use crate::trajectories::stitcher::stitch_group;
use crate::trajectories::{KinematicTable, TableStats};
use crate::waggle_errors::WaggleError;

#[cfg(feature = "progress")]
use crate::trajectories::progress_bar::{fmt_dur, IterTimer};
#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "progress")]
use std::time::Duration;

pub mod csv_sink;

/// Persistence interface for the batch outputs.
///
/// The orchestrator hands each group's tables to this trait and never touches
/// the filesystem layout itself; downstream tooling supplies the destination
/// keying. One call persists one whole table, so partially written groups can
/// only arise from a sink-internal failure, which is surfaced as that group's
/// error.
pub trait TableSink {
    /// Persist a group's annotated trajectory table.
    fn write_trajectories(
        &mut self,
        key: &GroupKey,
        table: &KinematicTable,
    ) -> Result<(), WaggleError>;

    /// Persist a group's pair-separation table.
    fn write_pair_distances(
        &mut self,
        key: &GroupKey,
        distances: &crate::trajectories::PairDistanceTable,
    ) -> Result<(), WaggleError>;
}

/// Outcome of one batch run.
///
/// Display
/// -----------------
/// * `format!("{}", summary)` – compact single-line counts.
/// * `format!("{:#}", summary)` – multi-line report listing every failed group
///   and skipped pair step with its reason.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Groups whose trajectory output was persisted.
    pub succeeded: Vec<GroupKey>,
    /// Two-entity groups whose pair-distance step failed; their trajectory
    /// output still succeeded.
    pub pair_skipped: Vec<(GroupKey, WaggleError)>,
    /// Groups that produced no output, with the error that stopped them.
    pub failed: Vec<(GroupKey, WaggleError)>,
    /// Files skipped at catalog-build time (metadata parse failures). The
    /// batch itself never populates this; callers attach the skip list from
    /// [`crate::recordings::parse_descriptors`] so one report covers the run.
    pub skipped_files: Vec<(camino::Utf8PathBuf, WaggleError)>,
}

impl BatchSummary {
    /// True when every group succeeded, no pair step was skipped, and no file
    /// was dropped at catalog build.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.pair_skipped.is_empty() && self.skipped_files.is_empty()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Batch summary")?;
            writeln!(f, "-------------")?;
            writeln!(f, "succeeded : {}", self.succeeded.len())?;
            writeln!(f, "failed    : {}", self.failed.len())?;
            writeln!(f, "pair steps skipped : {}", self.pair_skipped.len())?;
            write!(f, "files skipped : {}", self.skipped_files.len())?;
            for (path, err) in &self.skipped_files {
                write!(f, "\n  SKIPPED {path}: {err}")?;
            }
            for (key, err) in &self.pair_skipped {
                write!(f, "\n  {key}: {err}")?;
            }
            for (key, err) in &self.failed {
                write!(f, "\n  FAILED {key}: {err}")?;
            }
            Ok(())
        } else {
            write!(
                f,
                "{} succeeded, {} failed, {} pair steps skipped, {} files skipped",
                self.succeeded.len(),
                self.failed.len(),
                self.pair_skipped.len(),
                self.skipped_files.len()
            )
        }
    }
}

/// Run the full pipeline over every group of the catalog.
///
/// Arguments
/// -----------------
/// * `catalog` – groups to process, each carrying its ordered recordings and
///   expected entity count.
/// * `params` – validated pipeline parameters (validated again here; an
///   inconsistent configuration fails before any group is touched).
/// * `sink` – persistence collaborator receiving one trajectory table per
///   group and one distance table per qualifying group.
///
/// Return
/// ----------
/// * `Ok(BatchSummary)` – per-group outcomes; group failures are inside the
///   summary, not in the `Result`.
/// * `Err(WaggleError::InvalidParameter)` – configuration rejected up front.
#[cfg(not(feature = "progress"))]
pub fn run_batch(
    catalog: &Catalog,
    params: &PipelineParams,
    sink: &mut dyn TableSink,
) -> Result<BatchSummary, WaggleError> {
    params.validate()?;

    let mut summary = BatchSummary::default();
    for (key, group) in catalog {
        log::info!("processing {key} ({} recordings)", group.recordings.len());
        match process_group(key, group, params, sink) {
            Ok(pair_outcome) => {
                if let Some(reason) = pair_outcome {
                    log::warn!("{key}: pair-distance step skipped: {reason}");
                    summary.pair_skipped.push((key.clone(), reason));
                }
                summary.succeeded.push(key.clone());
            }
            Err(err) => {
                log::warn!("{key}: group failed: {err}");
                summary.failed.push((key.clone(), err));
            }
        }
    }

    log::info!("batch done: {summary}");
    Ok(summary)
}

#[cfg(feature = "progress")]
pub fn run_batch(
    catalog: &Catalog,
    params: &PipelineParams,
    sink: &mut dyn TableSink,
) -> Result<BatchSummary, WaggleError> {
    params.validate()?;

    let pb = ProgressBar::new((catalog.len() as u64).max(1));
    pb.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise} | {msg}",
        )
        .expect("indicatif template"),
    );
    pb.enable_steady_tick(Duration::from_millis(200));

    let mut summary = BatchSummary::default();
    let mut it_timer = IterTimer::new(0.2);

    for (key, group) in catalog {
        let last = it_timer.tick();
        let avg = it_timer.avg();
        pb.set_message(format!(
            "{key} | last: {}, avg: {}",
            fmt_dur(last),
            fmt_dur(avg)
        ));

        match process_group(key, group, params, sink) {
            Ok(pair_outcome) => {
                if let Some(reason) = pair_outcome {
                    log::warn!("{key}: pair-distance step skipped: {reason}");
                    summary.pair_skipped.push((key.clone(), reason));
                }
                summary.succeeded.push(key.clone());
            }
            Err(err) => {
                log::warn!("{key}: group failed: {err}");
                summary.failed.push((key.clone(), err));
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    log::info!("batch done: {summary}");
    Ok(summary)
}

/// Process one group end to end.
///
/// Every table built here is owned by this call and dropped on return, which
/// is what bounds the batch's peak memory to a single group.
///
/// Return
/// ----------
/// * `Ok(None)` – group fully persisted.
/// * `Ok(Some(err))` – trajectory output persisted, pair-distance step skipped
///   for the given reason.
/// * `Err(_)` – the group produced no output.
fn process_group(
    key: &GroupKey,
    group: &Group,
    params: &PipelineParams,
    sink: &mut dyn TableSink,
) -> Result<Option<WaggleError>, WaggleError> {
    let mut parsed = Vec::with_capacity(group.recordings.len());
    for recording in &group.recordings {
        let table = read_record_file(&recording.path, group.expected_entities)?;
        parsed.push((recording.clone(), table));
    }

    let stitched = stitch_group(parsed);
    let filtered = stitched.filter_trajectories(params)?;
    if let Some(stats) = filtered.sample_count_stats() {
        log::debug!(
            "{key}: {} trajectories after filtering ({stats})",
            filtered.trajectory_count()
        );
    }

    let mut pair_outcome = None;
    if group.expected_entities == 2 {
        match pair_separation(&filtered) {
            Ok(distances) => sink.write_pair_distances(key, &distances)?,
            Err(err @ (WaggleError::NoPairedTimestamps | WaggleError::AmbiguousPairing(_))) => {
                pair_outcome = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    let annotated = filtered.with_kinematics();
    drop(filtered);
    sink.write_trajectories(key, &annotated)?;

    Ok(pair_outcome)
}

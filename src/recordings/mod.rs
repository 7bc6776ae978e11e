//! # Recording metadata and group catalog types
//!
//! This module defines the **consumed interfaces** between the pipeline and the
//! catalog-building collaborator: the per-file [`RecordingDescriptor`], the
//! `(condition, date)` [`GroupKey`], the per-group recording list [`Group`], and
//! the full [`Catalog`].
//!
//! ## Overview
//! -----------------
//! Raw tracker logs follow the filename convention
//!
//! ```text
//! <camera_name>-<YYYY-MM-DD-HH-MM-SS>-…-<scaling_factor>-traj.csv
//! ```
//!
//! [`RecordingDescriptor::from_path`] extracts the camera name (substring before
//! the first hyphen), the start time (fixed-width timestamp immediately after it)
//! and the scaling factor (second-to-last hyphen-delimited token). Malformed
//! names fail with [`WaggleError::MetadataParse`]; that failure is scoped to the
//! file, so a catalog builder is expected to skip the file and report it rather
//! than abort.
//!
//! ## Logical dates
//! -----------------
//! Overnight sessions keep filming past midnight. [`logical_date`] assigns a
//! recording started between midnight and `time_offset_hours` to the **previous**
//! calendar date, so that one night of filming lands in one group.
//!
//! ## Ordering
//! -----------------
//! * Recordings within a [`Group`] are sorted by `start_time` on construction;
//!   stitching depends on that order.
//! * [`Catalog`] is a `BTreeMap`, so groups are visited in sorted
//!   `(condition, date)` order. The batch contract only requires that every
//!   group is visited exactly once; the sorted order makes runs reproducible.
//!
//! ## See also
//! ------------
//! * [`crate::trajectories::stitcher`] – Consumes the ordered recordings of a group.
//! * [`crate::batch`] – Drives the pipeline over a whole catalog.
use std::collections::BTreeMap;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::{Duration, Epoch, TimeScale};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EntityCounts;
use crate::waggle_errors::WaggleError;
use crate::Condition;

/// Filename shape of a raw trajectory log.
///
/// Camera name, fixed-width timestamp, optional middle tokens, scaling factor,
/// `traj.csv` suffix.
static TRAJ_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<camera>[^-]+)-(?P<ts>\d{4}-\d{2}-\d{2}-\d{2}-\d{2}-\d{2})(?:-.*)?-(?P<scale>[^-]+)-traj\.csv$",
    )
    .expect("trajectory filename regex")
});

/// Calendar date a group of recordings logically belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for LogicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Compute the logical date of a recording.
///
/// A recording started between midnight and `time_offset_hours` belongs to the
/// previous logical date, so overnight sessions group with the evening they
/// started on.
///
/// Arguments
/// -----------------
/// * `start_time` – absolute start time of the recording.
/// * `time_offset_hours` – the day boundary, e.g. `9` places 02:00 recordings
///   on the previous date.
///
/// Return
/// ----------
/// * The [`LogicalDate`] the recording belongs to.
pub fn logical_date(start_time: Epoch, time_offset_hours: u32) -> LogicalDate {
    let shifted = start_time - Duration::from_hours(f64::from(time_offset_hours));
    let (year, month, day, ..) = shifted.to_gregorian_utc();
    LogicalDate { year, month, day }
}

/// Metadata of one raw recording file, extracted from its filename.
///
/// Produced by the external catalog collaborator (usually via
/// [`RecordingDescriptor::from_path`]) and consumed read-only by the stitcher.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingDescriptor {
    pub path: Utf8PathBuf,
    pub camera_name: String,
    pub start_time: Epoch,
    pub scaling_factor: f64,
}

impl RecordingDescriptor {
    /// Extract recording metadata from a trajectory file path.
    ///
    /// Arguments
    /// -----------------
    /// * `path` – path of the raw trajectory file; only the file name is
    ///   inspected.
    ///
    /// Return
    /// ----------
    /// * A populated [`RecordingDescriptor`], or
    ///   [`WaggleError::MetadataParse`] if the name does not match the
    ///   `<camera>-<YYYY-MM-DD-HH-MM-SS>-…-<scaling>-traj.csv` convention.
    pub fn from_path(path: &Utf8Path) -> Result<Self, WaggleError> {
        let name = path
            .file_name()
            .ok_or_else(|| WaggleError::MetadataParse(path.as_str().to_string()))?;
        let caps = TRAJ_FILENAME
            .captures(name)
            .ok_or_else(|| WaggleError::MetadataParse(name.to_string()))?;

        let start_time = parse_timestamp(&caps["ts"])
            .ok_or_else(|| WaggleError::MetadataParse(name.to_string()))?;
        let scaling_factor: f64 = caps["scale"]
            .parse()
            .map_err(|_| WaggleError::MetadataParse(name.to_string()))?;

        Ok(RecordingDescriptor {
            path: path.to_path_buf(),
            camera_name: caps["camera"].to_string(),
            start_time,
            scaling_factor,
        })
    }
}

/// Parse the fixed-width `YYYY-MM-DD-HH-MM-SS` filename timestamp into an [`Epoch`].
fn parse_timestamp(ts: &str) -> Option<Epoch> {
    let mut fields = ts.split('-');
    let year: i32 = fields.next()?.parse().ok()?;
    let month: u8 = fields.next()?.parse().ok()?;
    let day: u8 = fields.next()?.parse().ok()?;
    let hour: u8 = fields.next()?.parse().ok()?;
    let minute: u8 = fields.next()?.parse().ok()?;
    let second: u8 = fields.next()?.parse().ok()?;
    Some(Epoch::from_gregorian(
        year,
        month,
        day,
        hour,
        minute,
        second,
        0,
        TimeScale::UTC,
    ))
}

/// Key of one unit of batch work.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub condition: Condition,
    pub date: LogicalDate,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition {}, {}", self.condition, self.date)
    }
}

/// All recordings logically belonging together, plus the entity count the
/// tracker was configured with for this condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub recordings: Vec<RecordingDescriptor>,
    pub expected_entities: usize,
}

impl Group {
    /// Build a group, sorting its recordings by ascending `start_time`.
    ///
    /// The stitcher relies on this order; constructing groups through this
    /// function keeps the invariant in one place.
    pub fn new(mut recordings: Vec<RecordingDescriptor>, expected_entities: usize) -> Self {
        recordings.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Group {
            recordings,
            expected_entities,
        }
    }
}

/// The full batch input: every group keyed by `(condition, date)`.
///
/// A `BTreeMap` so batch runs visit groups in a stable, sorted order.
pub type Catalog = BTreeMap<GroupKey, Group>;

/// Parse recording metadata for many paths, skipping malformed names.
///
/// A file whose name does not follow the trajectory convention is skipped and
/// reported, never fatal for the rest of the catalog build. Skipped files are
/// also logged, and callers typically attach them to the batch summary
/// ([`crate::batch::BatchSummary::skipped_files`]).
///
/// Return
/// ----------
/// * `(descriptors, skipped)` – parsed descriptors plus every skipped path
///   with the error that disqualified it.
pub fn parse_descriptors(
    paths: &[Utf8PathBuf],
) -> (Vec<RecordingDescriptor>, Vec<(Utf8PathBuf, WaggleError)>) {
    let mut descriptors = Vec::new();
    let mut skipped = Vec::new();
    for path in paths {
        match RecordingDescriptor::from_path(path) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(err) => {
                log::warn!("skipping {path}: {err}");
                skipped.push((path.clone(), err));
            }
        }
    }
    (descriptors, skipped)
}

/// Assemble condition-labeled recordings into a [`Catalog`].
///
/// The condition labels come from the external lookup collaborator; this
/// function only does the in-scope part of the catalog build: computing each
/// recording's logical date, grouping by `(condition, date)`, ordering the
/// recordings of each group, and attaching the expected entity count.
///
/// Arguments
/// -----------------
/// * `labeled` – `(condition, descriptor)` pairs.
/// * `counts` – expected entity count per condition.
/// * `time_offset_hours` – logical day boundary, see [`logical_date`].
///
/// Return
/// ----------
/// * The assembled catalog, or [`WaggleError::InvalidParameter`] if a labeled
///   condition has no entry in `counts` (a configuration gap, caught before
///   any processing).
pub fn build_catalog(
    labeled: Vec<(Condition, RecordingDescriptor)>,
    counts: &EntityCounts,
    time_offset_hours: u32,
) -> Result<Catalog, WaggleError> {
    let mut grouped: BTreeMap<GroupKey, Vec<RecordingDescriptor>> = BTreeMap::new();
    for (condition, descriptor) in labeled {
        let date = logical_date(descriptor.start_time, time_offset_hours);
        grouped
            .entry(GroupKey { condition, date })
            .or_default()
            .push(descriptor);
    }

    let mut catalog = Catalog::new();
    for (key, recordings) in grouped {
        let expected = *counts.get(&key.condition).ok_or_else(|| {
            WaggleError::InvalidParameter(format!(
                "no expected entity count for condition {}",
                key.condition
            ))
        })?;
        catalog.insert(key, Group::new(recordings, expected));
    }
    Ok(catalog)
}

//! # Wide-format recording reader
//!
//! Decodes one recording's tracker log into a [`TrajectoryTable`] keyed by the
//! file's **local** trajectory ids.
//!
//! ## File layout
//! -----------------
//! Headerless CSV, one row per timestamp, columns grouped as
//!
//! ```text
//! t, id_1, x_1, y_1, id_2, x_2, y_2, …, id_n, x_n, y_n
//! ```
//!
//! where `n` is the entity count the tracker was configured with for the
//! recording's condition. Each entity slot contributes one `(t, id, x, y)`
//! sample per row; samples are bucketed by id and sorted by time within each
//! bucket. This is a pure shape transform: sentinel zero positions are kept and
//! no derived fields are computed here.
//!
//! ## Error semantics
//! -----------------
//! A row whose field count is not `1 + 3n`, or any field that does not parse as
//! a float, fails the whole recording with
//! [`WaggleError::MalformedRecording`] / [`WaggleError::InvalidNumber`]. The
//! caller (the batch orchestrator) treats that as fatal for the recording's
//! group and moves on to the next group.
//!
//! ## See also
//! ------------
//! * [`crate::trajectories::stitcher`] – Re-bases the local ids and times
//!   produced here into group-global ones.
use std::io::Read;

use camino::Utf8Path;

use crate::constants::TrajectoryId;
use crate::trajectories::{Sample, TrajectoryTable};
use crate::waggle_errors::WaggleError;

/// Read one recording's log into a table keyed by the file's local trajectory ids.
///
/// Arguments
/// -----------------
/// * `path` – path of the raw trajectory CSV.
/// * `expected_entities` – number of simultaneously tracked entities `n`; the
///   file must have exactly `1 + 3n` columns on every row.
///
/// Return
/// ----------
/// * A [`TrajectoryTable`] with per-trajectory samples sorted by `t`, or a
///   recording-scoped error.
pub fn read_record_file(
    path: &Utf8Path,
    expected_entities: usize,
) -> Result<TrajectoryTable, WaggleError> {
    let file = std::fs::File::open(path)?;
    read_record(file, path.as_str(), expected_entities)
}

/// Decode a wide-format log from any reader. Crate-visible for tests.
pub(crate) fn read_record(
    input: impl Read,
    label: &str,
    expected_entities: usize,
) -> Result<TrajectoryTable, WaggleError> {
    let expected_columns = 1 + 3 * expected_entities;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut table = TrajectoryTable::default();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != expected_columns {
            return Err(WaggleError::MalformedRecording {
                path: label.to_string(),
                row,
                expected: expected_columns,
                found: record.len(),
            });
        }

        let t = parse_field(&record, 0, label, row)?;
        for entity in 0..expected_entities {
            let base = 1 + 3 * entity;
            let id = parse_field(&record, base, label, row)? as TrajectoryId;
            let x = parse_field(&record, base + 1, label, row)?;
            let y = parse_field(&record, base + 2, label, row)?;
            table.entry(id).or_default().push(Sample::new(t, x, y));
        }
    }

    for samples in table.values_mut() {
        samples.sort_by(|a, b| a.t.total_cmp(&b.t));
    }

    Ok(table)
}

fn parse_field(
    record: &csv::StringRecord,
    column: usize,
    label: &str,
    row: usize,
) -> Result<f64, WaggleError> {
    let raw = record.get(column).unwrap_or("").trim();
    raw.parse().map_err(|_| WaggleError::InvalidNumber {
        path: label.to_string(),
        row,
        column,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod record_reader_test {
    use super::*;

    #[test]
    fn test_two_entity_file_splits_into_buckets() {
        let csv = "\
0.0,0,10.0,20.0,1,30.0,40.0
0.04,0,10.5,20.5,1,30.5,40.5
0.08,2,11.0,21.0,1,31.0,41.0
";
        let table = read_record(csv.as_bytes(), "synthetic", 2).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table[&0].len(), 2);
        assert_eq!(table[&1].len(), 3);
        assert_eq!(table[&2].len(), 1);
        assert_eq!(table[&1][2], Sample::new(0.08, 31.0, 41.0));
    }

    #[test]
    fn test_samples_are_time_sorted_per_trajectory() {
        // Rows out of order; buckets must still come out sorted by t.
        let csv = "\
0.08,0,2.0,2.0
0.0,0,1.0,1.0
0.04,0,1.5,1.5
";
        let table = read_record(csv.as_bytes(), "synthetic", 1).unwrap();
        let times: Vec<f64> = table[&0].iter().map(|s| s.t).collect();
        assert_eq!(times, vec![0.0, 0.04, 0.08]);
    }

    #[test]
    fn test_column_count_mismatch_is_malformed() {
        let csv = "0.0,0,10.0,20.0\n";
        let result = read_record(csv.as_bytes(), "synthetic", 2);

        assert_eq!(
            result.unwrap_err(),
            WaggleError::MalformedRecording {
                path: "synthetic".to_string(),
                row: 0,
                expected: 7,
                found: 4,
            }
        );
    }

    #[test]
    fn test_unparsable_field_is_reported_with_position() {
        let csv = "0.0,0,ten,20.0\n";
        let result = read_record(csv.as_bytes(), "synthetic", 1);

        assert_eq!(
            result.unwrap_err(),
            WaggleError::InvalidNumber {
                path: "synthetic".to_string(),
                row: 0,
                column: 2,
                value: "ten".to_string(),
            }
        );
    }

    #[test]
    fn test_sentinel_zeros_are_kept() {
        let csv = "0.0,0,0.0,0.0\n0.04,0,5.0,5.0\n";
        let table = read_record(csv.as_bytes(), "synthetic", 1).unwrap();
        assert_eq!(table[&0][0], Sample::new(0.0, 0.0, 0.0));
    }
}

//! # CSV persistence sink
//!
//! Writes one trajectory CSV per group and one distance CSV per qualifying
//! group, under a fixed layout keyed by condition and date:
//!
//! ```text
//! <root>/cond<condition>/trajectory/<YYYY-MM-DD>.csv
//! <root>/cond<condition>/distance/<YYYY-MM-DD>.csv
//! ```
//!
//! ## Downstream compatibility
//! -----------------
//! * Trajectory columns, in order: `traj, t, x, y, angle, speed, rotation`.
//! * Distance columns: `t, d`.
//! * Undefined kinematic values are **empty fields**.
//! * Rows are ordered by `(traj, t)` (distances by `t`), so re-running the
//!   pipeline on unchanged input produces byte-identical files.
use camino::{Utf8Path, Utf8PathBuf};

use crate::batch::TableSink;
use crate::recordings::GroupKey;
use crate::trajectories::{KinematicTable, PairDistanceTable};
use crate::waggle_errors::WaggleError;

/// [`TableSink`] writing CSV files under a root directory.
#[derive(Debug, Clone)]
pub struct CsvSink {
    root: Utf8PathBuf,
}

impl CsvSink {
    pub fn new(root: impl AsRef<Utf8Path>) -> Self {
        CsvSink {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn table_path(&self, key: &GroupKey, kind: &str) -> Result<Utf8PathBuf, WaggleError> {
        let dir = self
            .root
            .join(format!("cond{}", key.condition))
            .join(kind);
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join(format!("{}.csv", key.date)))
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

impl TableSink for CsvSink {
    fn write_trajectories(
        &mut self,
        key: &GroupKey,
        table: &KinematicTable,
    ) -> Result<(), WaggleError> {
        let path = self.table_path(key, "trajectory")?;
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["traj", "t", "x", "y", "angle", "speed", "rotation"])?;

        let mut ids: Vec<_> = table.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            for s in &table[&id] {
                writer.write_record([
                    id.to_string(),
                    s.t.to_string(),
                    s.pos.x.to_string(),
                    s.pos.y.to_string(),
                    fmt_opt(s.angle),
                    fmt_opt(s.speed),
                    fmt_opt(s.rotation),
                ])?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    fn write_pair_distances(
        &mut self,
        key: &GroupKey,
        distances: &PairDistanceTable,
    ) -> Result<(), WaggleError> {
        let path = self.table_path(key, "distance")?;
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["t", "d"])?;
        for pair in distances {
            writer.write_record([pair.t.to_string(), pair.d.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

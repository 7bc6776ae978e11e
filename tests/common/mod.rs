use camino::{Utf8Path, Utf8PathBuf};
use waggle::{Group, GroupKey, LogicalDate, RecordingDescriptor};

/// Write a raw wide-format recording under `dir` and return its path.
///
/// `name` must follow the `<camera>-<YYYY-MM-DD-HH-MM-SS>-<scale>-traj.csv`
/// convention so the descriptor can be parsed back from it.
pub fn write_recording(dir: &Utf8Path, name: &str, content: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn descriptor(path: &Utf8Path) -> RecordingDescriptor {
    RecordingDescriptor::from_path(path).unwrap()
}

pub fn group_key(condition: &str) -> GroupKey {
    GroupKey {
        condition: condition.to_string(),
        date: LogicalDate {
            year: 2016,
            month: 5,
            day: 12,
        },
    }
}

pub fn group_of(paths: &[Utf8PathBuf], expected_entities: usize) -> Group {
    Group::new(
        paths.iter().map(|p| descriptor(p)).collect(),
        expected_entities,
    )
}

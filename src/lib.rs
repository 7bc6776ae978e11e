pub mod batch;
pub mod config;
pub mod constants;
pub mod recordings;
pub mod trajectories;
pub mod waggle_errors;

pub use batch::csv_sink::CsvSink;
pub use batch::{run_batch, BatchSummary, TableSink};
pub use config::{EntityCounts, PipelineParams, PipelineParamsBuilder};
pub use constants::{Condition, Radian, Samples, Seconds, TrajectoryId};
pub use recordings::{Catalog, Group, GroupKey, LogicalDate, RecordingDescriptor};
pub use trajectories::{
    KinematicSample, KinematicTable, PairDistance, PairDistanceTable, Sample, TableStats,
    TrajectoryTable,
};
pub use waggle_errors::WaggleError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaggleError {
    #[error("Unrecognized trajectory filename: {0}")]
    MetadataParse(String),

    #[error("Malformed recording {path}: row {row} has {found} columns, expected {expected}")]
    MalformedRecording {
        path: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Malformed recording {path}: row {row}, column {column}: invalid number {value:?}")]
    InvalidNumber {
        path: String,
        row: usize,
        column: usize,
        value: String,
    },

    #[error("Invalid pipeline parameter: {0}")]
    InvalidParameter(String),

    #[error("No timestamp is shared by exactly two trajectories")]
    NoPairedTimestamps,

    #[error("More than two samples share timestamp {0}; cannot pair unambiguously")]
    AmbiguousPairing(f64),

    #[error("NaN timestamp encountered while pairing samples: {0}")]
    NanTimestamp(#[from] ordered_float::FloatIsNan),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PartialEq for WaggleError {
    fn eq(&self, other: &Self) -> bool {
        use WaggleError::*;
        match (self, other) {
            (MetadataParse(a), MetadataParse(b)) => a == b,
            (
                MalformedRecording {
                    path: pa,
                    row: ra,
                    expected: ea,
                    found: fa,
                },
                MalformedRecording {
                    path: pb,
                    row: rb,
                    expected: eb,
                    found: fb,
                },
            ) => pa == pb && ra == rb && ea == eb && fa == fb,
            (
                InvalidNumber {
                    path: pa,
                    row: ra,
                    column: ca,
                    value: va,
                },
                InvalidNumber {
                    path: pb,
                    row: rb,
                    column: cb,
                    value: vb,
                },
            ) => pa == pb && ra == rb && ca == cb && va == vb,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (AmbiguousPairing(a), AmbiguousPairing(b)) => a == b,

            // Not comparable payloads: equal if same variant
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (NanTimestamp(_), NanTimestamp(_)) => true,

            // Unit variants
            (NoPairedTimestamps, NoPairedTimestamps) => true,

            _ => false,
        }
    }
}

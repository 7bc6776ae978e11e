//! # Pipeline parameters
//!
//! This module defines [`PipelineParams`], the configuration surface of the
//! post-processing pipeline, and its builder, which validates the parameters
//! **before any data is touched**.
//!
//! ## Overview
//! -----------------
//! The parameters cover:
//! * the logical day boundary used when grouping overnight recordings
//!   (`time_offset_hours`),
//! * the cleaning pass (`min_length`, `trim_start_frames`, `trim_end_frames`).
//!
//! The per-condition expected entity count is a separate mapping
//! ([`EntityCounts`]), supplied by the catalog-building collaborator.
//!
//! ## Validation
//! -----------------
//! Trimming removes `trim_start_frames + trim_end_frames` samples from every
//! retained trajectory, so that sum must stay **strictly below** `min_length`;
//! otherwise a trajectory could pass the length gate and still come out empty.
//! [`PipelineParamsBuilder::build`] rejects such configurations with
//! [`WaggleError::InvalidParameter`] at startup, and
//! [`PipelineParams::validate`] re-checks the invariant at the filtering seam.
//!
//! ## Example
//! -----------------
//! ```rust
//! use waggle::config::PipelineParams;
//!
//! let params = PipelineParams::builder()
//!     .min_length(5)
//!     .trim_start_frames(1)
//!     .trim_end_frames(2)
//!     .build()
//!     .unwrap();
//! assert_eq!(params.min_length, 5);
//! ```
use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::constants::Condition;
use crate::waggle_errors::WaggleError;

/// Expected number of simultaneously tracked entities per experimental condition.
///
/// Built by the external catalog collaborator (e.g. from a conditions file) and
/// consulted by the orchestrator to decide whether the pair-separation step applies.
pub type EntityCounts = HashMap<Condition, usize, RandomState>;

/// Configuration of the trajectory post-processing pipeline.
///
/// Fields
/// -----------------
/// * `time_offset_hours` – logical day boundary for overnight recordings: a
///   recording started between midnight and this offset belongs to the previous
///   logical date.
/// * `min_length` – minimum number of valid samples a trajectory must keep after
///   sentinel removal to survive filtering. Must be at least 1.
/// * `trim_start_frames` – samples dropped from the head of each retained trajectory.
/// * `trim_end_frames` – samples dropped from the tail of each retained trajectory.
///
/// Invariant: `trim_start_frames + trim_end_frames < min_length`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub time_offset_hours: u32,
    pub min_length: usize,
    pub trim_start_frames: usize,
    pub trim_end_frames: usize,
}

impl Default for PipelineParams {
    fn default() -> Self {
        PipelineParams {
            time_offset_hours: 9,
            min_length: 2,
            trim_start_frames: 0,
            trim_end_frames: 0,
        }
    }
}

impl PipelineParams {
    /// Construct a new [`PipelineParams`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`PipelineParamsBuilder`] to configure custom parameters.
    pub fn builder() -> PipelineParamsBuilder {
        PipelineParamsBuilder::new()
    }

    /// Check the configuration invariants.
    ///
    /// Return
    /// ----------
    /// * `Ok(())` if the parameters are consistent.
    /// * `Err(WaggleError::InvalidParameter)` if `min_length` is zero or the
    ///   trim sum reaches `min_length`.
    pub fn validate(&self) -> Result<(), WaggleError> {
        if self.min_length < 1 {
            return Err(WaggleError::InvalidParameter(
                "min_length must be at least 1".into(),
            ));
        }
        if self.trim_start_frames + self.trim_end_frames >= self.min_length {
            return Err(WaggleError::InvalidParameter(format!(
                "trim_start_frames + trim_end_frames ({}) must be < min_length ({})",
                self.trim_start_frames + self.trim_end_frames,
                self.min_length
            )));
        }
        Ok(())
    }
}

/// Fluent builder for [`PipelineParams`].
#[derive(Debug, Clone, Default)]
pub struct PipelineParamsBuilder {
    params: PipelineParams,
}

impl PipelineParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: PipelineParams::default(),
        }
    }

    pub fn time_offset_hours(mut self, v: u32) -> Self {
        self.params.time_offset_hours = v;
        self
    }

    pub fn min_length(mut self, v: usize) -> Self {
        self.params.min_length = v;
        self
    }

    pub fn trim_start_frames(mut self, v: usize) -> Self {
        self.params.trim_start_frames = v;
        self
    }

    pub fn trim_end_frames(mut self, v: usize) -> Self {
        self.params.trim_end_frames = v;
        self
    }

    /// Finalize the builder and produce a [`PipelineParams`] instance.
    ///
    /// Return
    /// ----------
    /// * `Ok(PipelineParams)` if the configured values are consistent.
    /// * `Err(WaggleError::InvalidParameter)` otherwise, before any processing begins.
    pub fn build(self) -> Result<PipelineParams, WaggleError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

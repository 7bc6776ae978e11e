//! # Constants and type definitions for waggle
//!
//! This module centralizes the **numeric constants**, **unit aliases**, and **common type
//! definitions** used throughout the `waggle` library. It also defines the container types
//! for storing samples and trajectories.
//!
//! ## Overview
//!
//! - Angular constants used by the kinematics pass
//! - Core type aliases used across the crate
//! - Identifiers for tracked trajectories and experimental conditions
//! - Container types for storing time-ordered samples
//!
//! These definitions are used by all main modules, including ingestion, stitching,
//! filtering, kinematics, and the batch orchestrator.

use crate::trajectories::{KinematicSample, Sample};
use smallvec::SmallVec;

// -------------------------------------------------------------------------------------------------
// Numeric constants
// -------------------------------------------------------------------------------------------------

/// 2π, used when wrapping heading differences
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Search radius (in tracker coordinates) for back-stitch candidate pairing
pub const BACK_STITCH_RADIUS: f64 = 5.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Time in seconds since the start of a recording group
pub type Seconds = f64;

/// Angle in radians
pub type Radian = f64;

/// Identifier of one continuous track, unique within a group after stitching
pub type TrajectoryId = u32;

/// Experimental condition label, mapped externally to an expected entity count
pub type Condition = String;

// -------------------------------------------------------------------------------------------------
// Data containers
// -------------------------------------------------------------------------------------------------

/// A small, inline-optimized container for the samples of a single trajectory.
pub type Samples = SmallVec<[Sample; 8]>;

/// The annotated counterpart of [`Samples`], produced by the kinematics pass.
pub type KinematicSamples = SmallVec<[KinematicSample; 8]>;

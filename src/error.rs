//! Error taxonomy for the rearrangement/trajectory/packing pipeline.
//!
//! The core never panics on caller-supplied data; every fallible operation
//! returns a `DmdError` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DmdError {
    #[error("presentation primitive failed to initialize: {0}")]
    PresentationInitFailed(String),

    #[error("planner exceeded max_plan_steps={max} without converging")]
    PlanOverflow { max: usize },

    #[error("num_tweezers={num_tweezers} does not match occupancy one-count={actual}")]
    OccupancyMismatch { num_tweezers: usize, actual: usize },

    #[error("out of memory: failed to reserve {requested} elements")]
    OutOfMemory { requested: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DmdError>;

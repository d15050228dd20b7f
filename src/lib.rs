//! Rearrangement planner, trajectory pipeline, and frame packer for a
//! DMD-driven optical tweezer array.
//!
//! Pipeline, leaves first: [`lattice`] (lattice → device affine transform),
//! [`planner`] (COM-anchored greedy rearrangement), [`smoother`] (piecewise-
//! linear temporal upsampling), [`packer`] (24-subframe bit-plane packing),
//! [`remap`] (DMD diamond-tiling coordinate remap). [`driver`] composes all
//! five behind the single [`presentation::PresentationSink`] trait boundary
//! the core exposes to the outside world.

pub mod config;
pub mod driver;
pub mod error;
pub mod lattice;
pub mod logging;
pub mod packer;
pub mod planner;
pub mod presentation;
pub mod remap;
pub mod smoother;

pub use config::{Config, LatticeBasis, PartialConfig, Point};
pub use driver::{DriverConfig, DriverLoop, StepTelemetry};
pub use error::{DmdError, Result};
pub use lattice::LatticeTransform;
pub use packer::{FramePacker, Rgb, RgbFrame};
pub use planner::{Occupancy, Site};
pub use presentation::{BufferSink, NullSink, PresentationSink};

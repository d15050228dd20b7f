//! Session configuration (§3, §9: grouped, named-field, immutable per session).
//!
//! Mirrors `core-config`'s split between a serde-deserialized file shape and
//! the effective value callers use: [`PartialConfig`] is what a TOML file (or
//! a partially-specified caller) provides, [`Config`] is what the rest of the
//! pipeline consumes after defaults are applied.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{DmdError, Result};

/// A 2D point in device-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Two real basis vectors plus a device-space center, anchoring lattice space
/// to device-pixel space (§3 LatticeBasis). Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeBasis {
    pub v1: Point,
    pub v2: Point,
    pub center: Point,
}

impl Default for LatticeBasis {
    fn default() -> Self {
        LatticeBasis {
            v1: Point::new(17.3, 10.0),
            v2: Point::new(17.3, -10.0),
            center: Point::new(1140.0 / 2.0, 912.0 / 2.0),
        }
    }
}

/// Full immutable session configuration (§3 Config).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub lattice_basis: LatticeBasis,
    pub smoothing_factor: u32,
    pub tweezer_radius: i32,
    pub max_plan_steps: usize,
    pub dmd_remap_origin_row: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 1140,
            height: 912,
            lattice_basis: LatticeBasis::default(),
            smoothing_factor: 3,
            tweezer_radius: 5,
            max_plan_steps: 64,
            dmd_remap_origin_row: 607,
        }
    }
}

impl Config {
    /// Apply a partially-specified override on top of the defaults.
    pub fn from_partial(partial: PartialConfig) -> Result<Self> {
        let mut cfg = Config::default();
        if let Some(w) = partial.width {
            cfg.width = w;
        }
        if let Some(h) = partial.height {
            cfg.height = h;
        }
        if let Some(n) = partial.smoothing_factor {
            if n < 1 {
                return Err(DmdError::InvalidConfig(
                    "smoothing_factor must be >= 1".into(),
                ));
            }
            cfg.smoothing_factor = n;
        }
        if let Some(rho) = partial.tweezer_radius {
            cfg.tweezer_radius = rho;
        }
        if let Some(max) = partial.max_plan_steps {
            cfg.max_plan_steps = max;
        }
        if let Some(origin) = partial.dmd_remap_origin_row {
            cfg.dmd_remap_origin_row = origin;
        }
        if let Some(basis) = partial.lattice_basis {
            cfg.lattice_basis = basis;
        }
        Ok(cfg)
    }
}

/// Serde-deserializable lattice basis, one field per scalar (TOML has no
/// native 2-vector type worth inventing here).
#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct PartialLatticeBasis {
    pub v1x: Option<f64>,
    pub v1y: Option<f64>,
    pub v2x: Option<f64>,
    pub v2y: Option<f64>,
    pub cx: Option<f64>,
    pub cy: Option<f64>,
}

/// Everything in [`Config`], optional, as loaded from a TOML file or built up
/// programmatically before defaults are applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct PartialConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub lattice_basis: Option<LatticeBasis>,
    pub smoothing_factor: Option<u32>,
    pub tweezer_radius: Option<i32>,
    pub max_plan_steps: Option<usize>,
    pub dmd_remap_origin_row: Option<i32>,
}

/// Raw TOML shape: flat basis scalars, merged into a `LatticeBasis` on load.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    basis: PartialLatticeBasis,
    #[serde(default)]
    smoothing_factor: Option<u32>,
    #[serde(default)]
    tweezer_radius: Option<i32>,
    #[serde(default)]
    max_plan_steps: Option<usize>,
    #[serde(default)]
    dmd_remap_origin_row: Option<i32>,
}

/// Parse a TOML config file into a [`PartialConfig`]. Unknown fields are
/// ignored (forward-compatible, same tolerance `core-config` extends to
/// `oxidized.toml`).
pub fn load_from(path: &Path) -> Result<PartialConfig> {
    let raw = fs::read_to_string(path)
        .map_err(|e| DmdError::InvalidConfig(format!("reading {}: {e}", path.display())))?;
    let file: ConfigFile = toml::from_str(&raw)
        .map_err(|e| DmdError::InvalidConfig(format!("parsing {}: {e}", path.display())))?;

    let default_basis = LatticeBasis::default();
    let basis = LatticeBasis {
        v1: Point::new(
            file.basis.v1x.unwrap_or(default_basis.v1.x),
            file.basis.v1y.unwrap_or(default_basis.v1.y),
        ),
        v2: Point::new(
            file.basis.v2x.unwrap_or(default_basis.v2.x),
            file.basis.v2y.unwrap_or(default_basis.v2.y),
        ),
        center: Point::new(
            file.basis.cx.unwrap_or(default_basis.center.x),
            file.basis.cy.unwrap_or(default_basis.center.y),
        ),
    };

    info!(target: "config.load", path = %path.display(), "loaded config overrides");

    Ok(PartialConfig {
        width: file.width,
        height: file.height,
        lattice_basis: Some(basis),
        smoothing_factor: file.smoothing_factor,
        tweezer_radius: file.tweezer_radius,
        max_plan_steps: file.max_plan_steps,
        dmd_remap_origin_row: file.dmd_remap_origin_row,
    })
}

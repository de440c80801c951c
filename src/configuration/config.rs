//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – simulated volume, parallelism, run length
//! - [`ParametersConfig`] – physical constants and tree tuning, all optional
//! - [`GalaxyConfig`]     – one generated galaxy (the scene is a list of them)
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! Lengths are in light-years and masses in solar masses; the scenario
//! builder converts to SI.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   half_extent: 1000.0     # light-years, half side of the simulated cube
//!   parallel: true          # compute forces on the rayon pool
//!   steps: 500              # steps for the headless runner
//!   dt: 0.016               # frame time handed to each step
//!
//! parameters:               # every key is optional
//!   G: 6.67e-11
//!   softening: 3.0e4        # meters
//!   theta: 0.5
//!   time_scale: 9.4e13
//!   coincidence_eps: 1.0e-11
//!   max_depth: 48
//!
//! seed: 42                  # optional, fixed seed makes scenes reproducible
//!
//! galaxies:
//!   - body_count: 3000
//!     extents: [1000.0, 1000.0, 250.0]
//!     center: [0.0, 0.0, 0.0]      # optional
//!     velocity: [0.0, 0.0, 0.0]    # optional bulk drift, m/s
//!     mass_min: 0.08               # optional
//!     mass_max: 150.0              # optional
//!     central_mass: 1.0e6          # optional
//!     black_hole: true             # optional
//! ```

use serde::Deserialize;

/// Simulated volume and how the runner drives it
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub half_extent: f64, // root cube half side, light-years
    #[serde(default)]
    pub parallel: bool, // `true` - per-body force queries run on rayon
    pub steps: u64,     // steps taken by the headless runner
    pub dt: f64,        // frame time per step, scaled by `time_scale`
}

/// Physical constants and Barnes–Hut tuning. Missing keys take defaults.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ParametersConfig {
    #[serde(rename = "G")]
    pub g: Option<f64>, // gravitational constant
    pub softening: Option<f64>, // softening length, meters
    pub theta: Option<f64>,     // opening threshold
    pub time_scale: Option<f64>, // frame time -> simulated seconds
    pub coincidence_eps: Option<f64>, // per-axis "same position" tolerance, meters
    pub max_depth: Option<usize>, // octree depth cap
}

/// One ellipsoidal galaxy with orbital velocities about its centre
#[derive(Deserialize, Debug, Clone)]
pub struct GalaxyConfig {
    pub body_count: usize,
    pub extents: Vec<f64>,          // ellipsoid semi-axes, light-years
    pub center: Option<Vec<f64>>,   // light-years, defaults to the origin
    pub velocity: Option<Vec<f64>>, // bulk drift, m/s
    pub mass_min: Option<f64>,      // solar masses
    pub mass_max: Option<f64>,      // solar masses
    pub central_mass: Option<f64>,  // solar masses, drives orbital speeds
    pub black_hole: Option<bool>,   // add the central mass as a body
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    pub seed: Option<u64>,
    pub galaxies: Vec<GalaxyConfig>,
}

//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds every tunable constant of the engine:
//! - gravitational constant and softening length (`g`, `softening`)
//! - Barnes–Hut opening threshold (`theta`)
//! - frame-time to simulated-seconds multiplier (`time_scale`)
//! - coincidence tolerance and octree depth cap (`coincidence_eps`, `max_depth`)

use anyhow::{ensure, Result};

use crate::configuration::config::ParametersConfig;

pub const GRAVITATIONAL_CONSTANT: f64 = 6.67e-11;
pub const DEFAULT_SOFTENING: f64 = 3.0e4;
pub const DEFAULT_THETA: f64 = 0.5;
pub const DEFAULT_TIME_SCALE: f64 = 9.4e13;
pub const DEFAULT_COINCIDENCE_EPS: f64 = 1.0e-11;
pub const DEFAULT_MAX_DEPTH: usize = 48;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub g: f64,               // gravitational constant
    pub softening: f64,       // softening length, same units as position
    pub theta: f64,           // approximate a node when side / distance < theta
    pub time_scale: f64,      // multiplier applied to the dt handed to `step`
    pub coincidence_eps: f64, // per-axis tolerance for "same position"
    pub max_depth: usize,     // deepest octree level before insertion merges
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            g: GRAVITATIONAL_CONSTANT,
            softening: DEFAULT_SOFTENING,
            theta: DEFAULT_THETA,
            time_scale: DEFAULT_TIME_SCALE,
            coincidence_eps: DEFAULT_COINCIDENCE_EPS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.g > 0.0, "G must be positive, got {}", self.g);
        ensure!(self.softening >= 0.0, "softening must be non-negative, got {}", self.softening);
        ensure!(self.theta > 0.0, "theta must be positive, got {}", self.theta);
        ensure!(self.time_scale > 0.0, "time_scale must be positive, got {}", self.time_scale);
        ensure!(
            self.coincidence_eps >= 0.0,
            "coincidence_eps must be non-negative, got {}",
            self.coincidence_eps
        );
        ensure!(self.max_depth >= 1, "max_depth must be at least 1");
        Ok(())
    }
}

impl TryFrom<&ParametersConfig> for Parameters {
    type Error = anyhow::Error;

    /// Overlay the configured values on the defaults.
    fn try_from(cfg: &ParametersConfig) -> Result<Self> {
        let defaults = Parameters::default();
        let params = Parameters {
            g: cfg.g.unwrap_or(defaults.g),
            softening: cfg.softening.unwrap_or(defaults.softening),
            theta: cfg.theta.unwrap_or(defaults.theta),
            time_scale: cfg.time_scale.unwrap_or(defaults.time_scale),
            coincidence_eps: cfg.coincidence_eps.unwrap_or(defaults.coincidence_eps),
            max_depth: cfg.max_depth.unwrap_or(defaults.max_depth),
        };
        params.validate()?;
        Ok(params)
    }
}

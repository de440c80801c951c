//! High-level runtime engine settings
//!
//! Fixes the simulated volume (a cube centred at the origin) and whether
//! the force phase fans out over rayon's thread pool.

use anyhow::{ensure, Result};

use crate::simulation::states::NVec3;

#[derive(Debug, Clone)]
pub struct Engine {
    pub half_extent: f64, // root cube half side, meters
    pub parallel: bool,   // false = sequential force phase, true = rayon
}

impl Engine {
    pub fn new(half_extent: f64, parallel: bool) -> Result<Self> {
        ensure!(
            half_extent.is_finite() && half_extent > 0.0,
            "simulation half extent must be positive, got {half_extent}"
        );
        Ok(Self { half_extent, parallel })
    }

    pub fn center(&self) -> NVec3 {
        NVec3::zeros()
    }
}

//! Build fully-initialized simulation scenarios from configuration
//!
//! Scene generation is a one-shot setup step. Each galaxy is an ellipsoidal
//! cloud of stars with circular-orbit velocities about its centre, masses
//! drawn uniformly from a range, and optionally the central mass itself as a
//! body to anchor the orbits.
//!
//! `Scenario::build_scenario` takes a `ScenarioConfig` (YAML-facing) and
//! produces the runtime bundle: a ready `Universe` plus the run length.

use std::f64::consts::TAU;

use anyhow::{ensure, Context, Result};
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

use crate::configuration::config::{GalaxyConfig, ScenarioConfig};
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3};
use crate::simulation::universe::Universe;

pub const LIGHT_YEAR: f64 = 9.4e15; // meters
pub const SOLAR_MASS: f64 = 2.0e30; // kilograms

pub const DEFAULT_MASS_MIN: f64 = 0.08; // solar masses
pub const DEFAULT_MASS_MAX: f64 = 150.0;
pub const DEFAULT_CENTRAL_MASS: f64 = 1.0e6;

/// Runtime description of one galaxy, SI units.
#[derive(Debug, Clone)]
pub struct GalaxySpec {
    pub body_count: usize,
    pub extents: NVec3,    // ellipsoid semi-axes
    pub center: NVec3,     // galaxy centre
    pub velocity: NVec3,   // bulk drift added to every body
    pub mass_min: f64,
    pub mass_max: f64,
    pub central_mass: f64, // mass the orbits are seeded around
    pub black_hole: bool,  // add the central mass as a body
}

impl GalaxySpec {
    /// A galaxy at rest at the origin with the default mass range and a
    /// central black hole.
    pub fn new(body_count: usize, extents: NVec3) -> Self {
        Self {
            body_count,
            extents,
            center: NVec3::zeros(),
            velocity: NVec3::zeros(),
            mass_min: DEFAULT_MASS_MIN * SOLAR_MASS,
            mass_max: DEFAULT_MASS_MAX * SOLAR_MASS,
            central_mass: DEFAULT_CENTRAL_MASS * SOLAR_MASS,
            black_hole: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.extents.iter().all(|e| e.is_finite() && *e >= 0.0),
            "galaxy extents must be finite and non-negative, got {:?}",
            self.extents
        );
        ensure!(
            self.mass_min > 0.0 && self.mass_min <= self.mass_max && self.mass_max.is_finite(),
            "galaxy mass range must satisfy 0 < min <= max, got [{}, {}]",
            self.mass_min,
            self.mass_max
        );
        ensure!(
            self.central_mass.is_finite() && self.central_mass > 0.0,
            "galaxy central mass must be positive, got {}",
            self.central_mass
        );
        Ok(())
    }

    /// Sample the galaxy's bodies. The central body, if any, comes last.
    pub fn generate<R: Rng>(&self, g: f64, rng: &mut R) -> Result<Vec<Body>> {
        self.validate()?;

        let mut bodies = Vec::with_capacity(self.body_count + usize::from(self.black_hole));
        for _ in 0..self.body_count {
            let offset = random_point_ellipsoid(&self.extents, rng);
            let velocity = self.velocity + orbital_velocity(&offset, g, self.central_mass);
            let mass = rng.random_range(self.mass_min..=self.mass_max);

            bodies.push(Body::new(self.center + offset, velocity, mass)?);
        }

        if self.black_hole {
            bodies.push(Body::new(self.center, self.velocity, self.central_mass)?);
        }

        Ok(bodies)
    }
}

impl TryFrom<&GalaxyConfig> for GalaxySpec {
    type Error = anyhow::Error;

    fn try_from(cfg: &GalaxyConfig) -> Result<Self> {
        let center = match &cfg.center {
            Some(c) => vec3(c, "center")? * LIGHT_YEAR,
            None => NVec3::zeros(),
        };
        let velocity = match &cfg.velocity {
            Some(v) => vec3(v, "velocity")?,
            None => NVec3::zeros(),
        };

        let spec = GalaxySpec {
            body_count: cfg.body_count,
            extents: vec3(&cfg.extents, "extents")? * LIGHT_YEAR,
            center,
            velocity,
            mass_min: cfg.mass_min.unwrap_or(DEFAULT_MASS_MIN) * SOLAR_MASS,
            mass_max: cfg.mass_max.unwrap_or(DEFAULT_MASS_MAX) * SOLAR_MASS,
            central_mass: cfg.central_mass.unwrap_or(DEFAULT_CENTRAL_MASS) * SOLAR_MASS,
            black_hole: cfg.black_hole.unwrap_or(true),
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Single galaxy at the origin with default masses; `extents` in meters.
pub fn initialize<R: Rng>(body_count: usize, extents: NVec3, params: &Parameters, rng: &mut R) -> Result<Vec<Body>> {
    GalaxySpec::new(body_count, extents).generate(params.g, rng)
}

/// Random point inside an ellipsoid with semi-axes `extents`.
///
/// A uniform direction on the unit sphere, stretched per axis by an
/// independent uniform factor, so density rises towards the centre.
pub fn random_point_ellipsoid<R: Rng>(extents: &NVec3, rng: &mut R) -> NVec3 {
    let theta = rng.random::<f64>() * TAU;
    let phi = (2.0 * rng.random::<f64>() - 1.0).acos();

    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let sx: f64 = rng.random();
    let sy: f64 = rng.random();
    let sz: f64 = rng.random();

    NVec3::new(
        sx * extents.x * sin_phi * cos_theta,
        sy * extents.y * sin_phi * sin_theta,
        sz * extents.z * cos_phi,
    )
}

/// Circular-orbit velocity about a central mass at the origin of `offset`,
/// counter-clockwise around +z. Points on the z axis get no velocity.
pub fn orbital_velocity(offset: &NVec3, g: f64, central_mass: f64) -> NVec3 {
    match NVec3::z().cross(offset).try_normalize(0.0) {
        Some(direction) => direction * (g * central_mass / offset.norm()).sqrt(),
        None => NVec3::zeros(),
    }
}

fn vec3(values: &[f64], what: &str) -> Result<NVec3> {
    ensure!(
        values.len() == 3,
        "{what} needs exactly 3 components, got {}",
        values.len()
    );
    Ok(NVec3::new(values[0], values[1], values[2]))
}

/// Runtime bundle built from a [`ScenarioConfig`].
pub struct Scenario {
    pub universe: Universe,
    pub steps: u64, // steps for the headless runner
    pub dt: f64,    // frame time per step
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let params = Parameters::try_from(&cfg.parameters).context("invalid parameters")?;
        let engine = Engine::new(cfg.engine.half_extent * LIGHT_YEAR, cfg.engine.parallel)?;
        ensure!(
            cfg.engine.dt.is_finite() && cfg.engine.dt > 0.0,
            "engine dt must be positive, got {}",
            cfg.engine.dt
        );

        let mut rng = match cfg.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };

        let mut bodies = Vec::new();
        for (i, galaxy) in cfg.galaxies.iter().enumerate() {
            let spec = GalaxySpec::try_from(galaxy).with_context(|| format!("galaxy #{i}"))?;
            bodies.extend(spec.generate(params.g, &mut rng)?);
        }

        Ok(Self {
            universe: Universe::new(bodies, params, engine),
            steps: cfg.engine.steps,
            dt: cfg.engine.dt,
        })
    }
}

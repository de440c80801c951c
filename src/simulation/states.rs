//! Core state types for the N-body simulation.
//!
//! Defines the point-mass `Body` and the `NVec3` vector alias. Positions
//! span astronomical scales (~1e19 m), so everything is `f64`.

use anyhow::{ensure, Result};
use nalgebra::Vector3;

use crate::simulation::params::Parameters;

pub type NVec3 = Vector3<f64>;

/// A point mass.
///
/// Equality is exact field equality (position, velocity, force, mass). The
/// octree relies on it to skip a body's own leaf while walking the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: NVec3, // meters
    pub velocity: NVec3, // meters / second
    pub force: NVec3,    // accumulated force for the current step, newtons
    mass: f64,           // kilograms, always > 0
}

impl Body {
    /// Create a body with zero accumulated force.
    ///
    /// Rejects non-positive or non-finite mass and non-finite state, so a bad
    /// body never reaches the integrator as a division by zero.
    pub fn new(position: NVec3, velocity: NVec3, mass: f64) -> Result<Self> {
        ensure!(
            mass.is_finite() && mass > 0.0,
            "body mass must be positive and finite, got {mass}"
        );
        ensure!(
            position.iter().all(|c| c.is_finite()),
            "body position must be finite, got {position:?}"
        );
        ensure!(
            velocity.iter().all(|c| c.is_finite()),
            "body velocity must be finite, got {velocity:?}"
        );

        Ok(Self {
            position,
            velocity,
            force: NVec3::zeros(),
            mass,
        })
    }

    /// A body with zero velocity.
    pub fn at_rest(position: NVec3, mass: f64) -> Result<Self> {
        Self::new(position, NVec3::zeros(), mass)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (self.position - other.position).norm()
    }

    /// Squared distance, for comparisons that don't need the root.
    pub fn distance_to2(&self, other: &Body) -> f64 {
        (self.position - other.position).norm_squared()
    }

    /// Softened Newtonian attraction of `source` on `self`.
    ///
    /// `F = G m_self m_source / (d^2 + eps^2)` directed from `self` towards
    /// `source`. Zero separation yields no force; coincident bodies are
    /// resolved by merging, never by dividing here.
    pub fn gravity_from(&self, source: &Body, params: &Parameters) -> NVec3 {
        let delta = source.position - self.position;
        let distance = delta.norm();
        if distance == 0.0 {
            return NVec3::zeros();
        }

        let soft2 = params.softening * params.softening;
        let magnitude = params.g * self.mass * source.mass / (distance * distance + soft2);

        delta * (magnitude / distance)
    }

    /// Accumulate the attraction of `source` into `self.force`.
    pub fn apply_gravity_from(&mut self, source: &Body, params: &Parameters) {
        self.force += self.gravity_from(source, params);
    }

    pub fn reset_force(&mut self) {
        self.force = NVec3::zeros();
    }

    /// Semi-implicit Euler: kick the velocity with the accumulated force,
    /// then drift the position with the new velocity.
    pub fn integrate(&mut self, dt: f64) {
        self.velocity += self.force * (dt / self.mass);
        self.position += self.velocity * dt;
    }

    /// Perfectly inelastic merge.
    ///
    /// The result sits at the mass-weighted centroid and carries the summed
    /// mass. Velocity and force are reset to zero, so momentum is discarded:
    /// this is a numerical simplification, not a collision model. The same
    /// operation builds the octree's aggregate pseudo-bodies.
    pub fn merge_with(&self, other: &Body) -> Body {
        let mass = self.mass + other.mass;
        let position = (self.position * self.mass + other.position * other.mass) / mass;

        Body {
            position,
            velocity: NVec3::zeros(),
            force: NVec3::zeros(),
            mass,
        }
    }

    /// True when every axis differs by less than `eps`.
    pub fn is_coincident_with(&self, other: &Body, eps: f64) -> bool {
        (self.position - other.position)
            .iter()
            .all(|d| d.abs() < eps)
    }
}

//! Per-step simulation driver
//!
//! Each `step` rebuilds an octree from nothing, evaluates the Barnes–Hut
//! force on every body against that frozen tree, merges bodies that turned
//! out to be coincident, and integrates everything with semi-implicit Euler.
//! The tree never outlives the step that built it.

use log::{debug, warn};

use crate::simulation::barnes_hut::{ForceOutcome, Octree};
use crate::simulation::engine::Engine;
use crate::simulation::forces::query_tree;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3};

/// A merge to apply: the two body indices and the body replacing them.
type Merge = (usize, usize, Body);

#[derive(Debug, Clone)]
pub struct Universe {
    bodies: Vec<Body>,
    params: Parameters,
    engine: Engine,
    t: f64,     // simulated seconds
    steps: u64, // completed steps
}

impl Universe {
    pub fn new(bodies: Vec<Body>, params: Parameters, engine: Engine) -> Self {
        Self {
            bodies,
            params,
            engine,
            t: 0.0,
            steps: 0,
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(Body::mass).sum()
    }

    pub fn momentum(&self) -> NVec3 {
        self.bodies
            .iter()
            .fold(NVec3::zeros(), |p, b| p + b.velocity * b.mass())
    }

    /// Advance every body by `dt * time_scale` simulated seconds.
    ///
    /// 1. Reset forces and build the tree. Pairs the tree cannot separate
    ///    are merged and the tree is rebuilt until insertion is clean.
    /// 2. Query the tree once per body (in parallel when enabled).
    /// 3. Merge pairs the walk found coincident.
    /// 4. Integrate.
    pub fn step(&mut self, dt: f64) {
        let scaled_dt = dt * self.params.time_scale;

        for body in &mut self.bodies {
            body.reset_force();
        }

        let mut insert_merges = 0;
        let results = loop {
            let tree = Octree::build(
                &self.bodies,
                self.engine.center(),
                self.engine.half_extent,
                &self.params,
            );

            if tree.collisions().is_empty() {
                if tree.escaped() > 0 {
                    warn!(
                        "{} bodies outside the simulated volume do not attract others",
                        tree.escaped()
                    );
                }
                debug!(
                    "step {}: {} bodies, {} nodes",
                    self.steps,
                    self.bodies.len(),
                    tree.node_count()
                );
                break query_tree(&tree, &self.bodies, self.engine.parallel);
            }

            let merges: Vec<Merge> = tree
                .collisions()
                .iter()
                .map(|c| {
                    let merged = self.bodies[c.resident].merge_with(&self.bodies[c.incoming]);
                    (c.resident, c.incoming, merged)
                })
                .collect();
            drop(tree);

            insert_merges += self.absorb(merges);
        };

        let mut merges = Vec::new();
        for (idx, (body, (force, outcome))) in self.bodies.iter_mut().zip(results).enumerate() {
            body.force = force;
            if let ForceOutcome::Merged { partner, merged } = outcome {
                merges.push((idx, partner, merged));
            }
        }
        let walk_merges = self.absorb(merges);

        if insert_merges + walk_merges > 0 {
            debug!(
                "step {}: merged {} pairs during insertion, {} during force walk",
                self.steps, insert_merges, walk_merges
            );
        }

        for body in &mut self.bodies {
            body.integrate(scaled_dt);
        }

        self.t += scaled_dt;
        self.steps += 1;
    }

    /// Replace each pair by its merged body, kept at the lower index.
    ///
    /// A body takes part in at most one merge per call; later pairs touching
    /// it are skipped and picked up by a subsequent rebuild or step.
    fn absorb(&mut self, merges: Vec<Merge>) -> usize {
        let n = self.bodies.len();
        let mut touched = vec![false; n];
        let mut removed = vec![false; n];
        let mut count = 0;

        for (a, b, merged) in merges {
            if a == b || touched[a] || touched[b] {
                continue;
            }
            let (keep, gone) = (a.min(b), a.max(b));
            self.bodies[keep] = merged;
            touched[keep] = true;
            touched[gone] = true;
            removed[gone] = true;
            count += 1;
        }

        if count > 0 {
            let mut idx = 0;
            self.bodies.retain(|_| {
                let keep = !removed[idx];
                idx += 1;
                keep
            });
        }

        count
    }
}

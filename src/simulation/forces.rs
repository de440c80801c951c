//! Force evaluation over a whole body collection
//!
//! - [`query_tree`]: one Barnes–Hut walk per body against a frozen octree,
//!   sequential or fanned out over rayon
//! - [`direct_forces`]: the exact O(N^2) pairwise sum, kept as the reference
//!   the tree is validated and benchmarked against

use rayon::prelude::*;

use crate::simulation::barnes_hut::{ForceOutcome, Octree};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3};

/// Net tree force on every body, index-aligned with `bodies`.
///
/// `bodies` must be the slice the tree was built over. The tree is read-only
/// here and each query only writes its own probe, so the parallel path needs
/// no locking.
pub fn query_tree(tree: &Octree<'_>, bodies: &[Body], parallel: bool) -> Vec<(NVec3, ForceOutcome)> {
    let query = |body: &Body| {
        // the probe must equal its own leaf, so keep the stored force
        let mut probe = *body;
        let outcome = tree.accumulate_force_on(&mut probe);
        (probe.force - body.force, outcome)
    };

    if parallel {
        bodies.par_iter().map(query).collect()
    } else {
        bodies.iter().map(query).collect()
    }
}

/// Barnes–Hut forces with a fresh tree over `bodies`, ignoring merges.
pub fn barnes_hut_forces(bodies: &[Body], half_extent: f64, params: &Parameters, parallel: bool) -> Vec<NVec3> {
    let tree = Octree::build(bodies, NVec3::zeros(), half_extent, params);
    query_tree(&tree, bodies, parallel)
        .into_iter()
        .map(|(force, _)| force)
        .collect()
}

/// Exact softened gravity, summed over each unordered pair once.
pub fn direct_forces(bodies: &[Body], params: &Parameters) -> Vec<NVec3> {
    let n = bodies.len();
    let mut out = vec![NVec3::zeros(); n];

    for i in 0..n {
        let bi = &bodies[i];
        for j in (i + 1)..n {
            let bj = &bodies[j];

            // equal and opposite
            let f = bi.gravity_from(bj, params);
            out[i] += f;
            out[j] -= f;
        }
    }

    out
}

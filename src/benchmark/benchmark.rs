use std::time::Instant;

use crate::simulation::engine::Engine;
use crate::simulation::forces::{barnes_hut_forces, direct_forces};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3};
use crate::simulation::universe::Universe;

/// Half extent that encloses every body from `make_bodies`
const BENCH_HALF_EXTENT: f64 = 8.0;

/// Time direct summation against the tree, sequential and parallel.
pub fn bench_forces() {
    // Different system sizes to test
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let params = make_params();

    for n in ns {
        let bodies = make_bodies(n);

        // Warm up
        direct_forces(&bodies, &params);
        barnes_hut_forces(&bodies, BENCH_HALF_EXTENT, &params, false);

        let t0 = Instant::now();
        let exact = direct_forces(&bodies, &params);
        let dt_direct = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        let approx = barnes_hut_forces(&bodies, BENCH_HALF_EXTENT, &params, false);
        let dt_bh = t1.elapsed().as_secs_f64();

        let t2 = Instant::now();
        barnes_hut_forces(&bodies, BENCH_HALF_EXTENT, &params, true);
        let dt_par = t2.elapsed().as_secs_f64();

        let worst = worst_relative_error(&exact, &approx);

        println!(
            "N = {n:5}, direct = {dt_direct:8.6} s, BH = {dt_bh:8.6} s, BH par = {dt_par:8.6} s, max rel err = {worst:.2e}"
        );
    }
}

/// Time full `Universe::step`s for a range of n.
/// Prints CSV so the output can go straight into a spreadsheet.
pub fn bench_step() {
    println!("N,seq_ms,par_ms");

    for n in (400..=12800).step_by(400) {
        let steps = if n <= 3200 { 5 } else { 2 };

        let ms_seq = time_steps(n, steps, false);
        let ms_par = time_steps(n, steps, true);

        println!("{},{:.6},{:.6}", n, ms_seq, ms_par);
    }
}

fn time_steps(n: usize, steps: usize, parallel: bool) -> f64 {
    let engine = Engine {
        half_extent: BENCH_HALF_EXTENT,
        parallel,
    };
    let mut universe = Universe::new(make_bodies(n), make_params(), engine);

    let t0 = Instant::now();
    for _ in 0..steps {
        universe.step(0.001);
    }
    t0.elapsed().as_secs_f64() * 1000.0 / steps as f64
}

/// Deterministic bodies in a 10-unit cube, no rng needed
fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .filter_map(|i| {
            let i_f = i as f64;
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::at_rest(x, 1.0).ok()
        })
        .collect()
}

fn make_params() -> Parameters {
    Parameters {
        g: 0.1,
        softening: 0.01,
        time_scale: 1.0,
        ..Parameters::default()
    }
}

fn worst_relative_error(exact: &[NVec3], approx: &[NVec3]) -> f64 {
    exact
        .iter()
        .zip(approx)
        .filter(|(e, _)| e.norm() > 0.0)
        .map(|(e, a)| (e - a).norm() / e.norm())
        .fold(0.0, f64::max)
}

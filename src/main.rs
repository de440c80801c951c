use bhgalaxy::{ScenarioConfig, Scenario, LIGHT_YEAR};
use bhgalaxy::{bench_forces, bench_step};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "galaxy.yaml")]
    file_name: String,

    /// Override the number of steps from the scenario
    #[arg(long)]
    steps: Option<u64>,

    /// Run the direct vs. tree benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_forces();
        bench_step();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let Scenario { mut universe, steps, dt } = Scenario::build_scenario(scenario_cfg)?;
    let steps = args.steps.unwrap_or(steps);

    info!(
        "running {} for {} steps: {} bodies, total mass {:.4e} kg",
        args.file_name,
        steps,
        universe.bodies().len(),
        universe.total_mass()
    );

    let report_every = (steps / 10).max(1);
    let started = Instant::now();

    for step in 1..=steps {
        universe.step(dt);

        if step % report_every == 0 || step == steps {
            info!(
                "step {step}/{steps}: {} bodies, t = {:.3e} s, |p| = {:.4e} kg m/s, {:.2?} elapsed",
                universe.bodies().len(),
                universe.time(),
                universe.momentum().norm(),
                started.elapsed()
            );
        }
    }

    let extent = universe
        .bodies()
        .iter()
        .map(|b| b.position.norm())
        .fold(0.0, f64::max);
    info!(
        "done: {} bodies, total mass {:.4e} kg, outermost body at {:.1} ly",
        universe.bodies().len(),
        universe.total_mass(),
        extent / LIGHT_YEAR
    );

    Ok(())
}

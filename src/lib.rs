pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, NVec3};
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::barnes_hut::{Octree, OctreeNode, Octant, Occupant, Insertion, Collision, ForceOutcome, NodeSummary};
pub use simulation::forces::{query_tree, barnes_hut_forces, direct_forces};
pub use simulation::universe::Universe;
pub use simulation::scenario::{initialize, GalaxySpec, Scenario, LIGHT_YEAR, SOLAR_MASS};

pub use configuration::config::{EngineConfig, ParametersConfig, GalaxyConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_forces, bench_step};

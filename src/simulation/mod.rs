pub mod states;
pub mod params;
pub mod engine;
pub mod barnes_hut;
pub mod forces;
pub mod universe;
pub mod scenario;

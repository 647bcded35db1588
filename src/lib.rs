pub mod demographics;
pub mod engine;
pub mod generator;
pub mod menu;
pub mod population;
pub mod query;
pub mod rng;
pub mod scenario;
pub mod synthesizer;

pub use demographics::DemographicTables;
pub use engine::{build_tree, Engine, EngineBuilder, EngineSettings, FamilyTree};
pub use population::{Person, PersonId, Population};
pub use scenario::{Scenario, ScenarioLoader};

pub mod config;
pub mod engine;
pub mod risk;
pub mod scenario;
pub mod types;
pub mod world;

pub use config::{ConfigError, NavConfig};
pub use engine::{NavigationEngine, PropagateOptions, SweepReport};
pub use risk::{Posture, RiskPolicy};
pub use scenario::{Scenario, ScenarioError, ScenarioMap, ScenarioWorld};
pub use types::*;
pub use world::*;

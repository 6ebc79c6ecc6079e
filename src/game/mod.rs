// Gameplay layer
//
// Everything the simulation core decides lives here:
// - Player and enemy controllers with their state machines
// - The combat protocol and contact interpretation shared by both
// - Hazards, spawners and the simulation loop that owns them all

pub mod combat;
pub mod config;
pub mod contact;
pub mod enemy;
pub mod hazards;
pub mod input;
pub mod player;
pub mod simulation;
pub mod spawner;
pub mod state;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use combat::{Collaborators, DamageEvent, DamageKind, DamageOutcome};
pub use config::SimulationConfig;
pub use enemy::{Enemy, EnemyId, EnemyState};
pub use input::{Action, ActionInput, Direction, InputFrame};
pub use player::{Player, PlayerState};
pub use simulation::Simulation;
pub use spawner::{EnemySpawner, SpawnerId};

// Simulation setup and lookup errors

use crate::engine::physics::BodyHandle;
use crate::game::enemy::EnemyId;
use crate::game::spawner::SpawnerId;

/// Errors surfaced by the simulation's setup and lookup calls
///
/// Per-tick combat never fails; it reports ignored actions through its
/// return values instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("Player already spawned")]
    PlayerAlreadySpawned,

    #[error("No player in the simulation")]
    NoPlayer,

    #[error("Unknown enemy: {0}")]
    UnknownEnemy(EnemyId),

    #[error("Unknown spawner: {0}")]
    UnknownSpawner(SpawnerId),

    #[error("Body missing from the physics world: {0:?}")]
    MissingBody(BodyHandle),
}

// Enemy spawner: one live enemy per spawner, replaced after a delay

use glam::Vec2;
use log::info;

use crate::engine::physics::Substrate;

use super::config::{EnemyConfig, SpawnerConfig};
use super::enemy::{EnemyId, EnemyManager};

/// Index of a spawner within the simulation
pub type SpawnerId = usize;

#[derive(Debug, Clone)]
pub struct EnemySpawner {
    pub id: SpawnerId,
    position: Vec2,
    config: SpawnerConfig,
    /// The enemy this spawner currently has in the world
    current: Option<EnemyId>,
    /// Countdown to the next spawn after a death
    respawn_in: Option<f32>,
}

impl EnemySpawner {
    pub fn new(id: SpawnerId, position: Vec2, config: SpawnerConfig) -> Self {
        Self {
            id,
            position,
            config,
            current: None,
            respawn_in: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn current(&self) -> Option<EnemyId> {
        self.current
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn_in.is_some()
    }

    /// Create a fresh enemy at the spawn point and attach it to this spawner
    pub fn spawn<S: Substrate + ?Sized>(
        &mut self,
        enemies: &mut EnemyManager,
        substrate: &mut S,
        enemy_config: &EnemyConfig,
    ) -> EnemyId {
        let id = enemies.spawn(substrate, self.position, enemy_config.clone(), Some(self.id));
        self.current = Some(id);
        self.respawn_in = None;
        id
    }

    /// The attached enemy died; schedule its replacement
    pub fn on_enemy_died(&mut self) {
        info!(
            "Spawner {} lost its enemy, respawning in {}s",
            self.id, self.config.respawn_delay
        );
        self.current = None;
        self.respawn_in = Some(self.config.respawn_delay);
    }

    /// Count down a pending respawn. Returns true once it is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.respawn_in.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining > 0.0 {
            return false;
        }
        self.respawn_in = None;
        true
    }
}

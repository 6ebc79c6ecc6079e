// Explicit simulation loop
//
// Owns the substrate and every entity, and runs one fixed tick in a fixed
// order:
//   1. player step, then enemy steps in spawn order
//   2. substrate step
//   3. contact dispatch (player first, then enemies); combat resolves here
//   4. repeating contact damage
//   5. hazards
//   6. spawner countdowns
//   7. dead enemies are removed and their spawners notified

use glam::Vec2;
use log::{debug, info, warn};

use crate::core::random::SeededRandom;
use crate::engine::physics::{BodyDesc, BodyHandle, BodyRole, Substrate};
use crate::error::SimError;

use super::combat::{Collaborators, DamageEvent, DamageKind, DamageOutcome};
use super::config::SimulationConfig;
use super::enemy::{Enemy, EnemyId, EnemyManager};
use super::hazards::{Hazard, PressurePad, Spikes, WeaponPickup};
use super::input::InputFrame;
use super::player::Player;
use super::spawner::{EnemySpawner, SpawnerId};

pub struct Simulation<S: Substrate> {
    substrate: S,
    config: SimulationConfig,
    collab: Collaborators,
    rng: SeededRandom,

    player: Option<Player>,
    enemies: EnemyManager,
    spawners: Vec<EnemySpawner>,
    hazards: Vec<Hazard>,
    platforms: Vec<BodyHandle>,

    input: InputFrame,
    tick_count: u64,
}

impl<S: Substrate> Simulation<S> {
    pub fn new(substrate: S, config: SimulationConfig) -> Self {
        let rng = SeededRandom::new(config.seed);
        Self {
            substrate,
            config,
            collab: Collaborators::none(),
            rng,
            player: None,
            enemies: EnemyManager::new(),
            spawners: Vec::new(),
            hazards: Vec::new(),
            platforms: Vec::new(),
            input: InputFrame::default(),
            tick_count: 0,
        }
    }

    /// Attach the notification collaborators
    pub fn with_collaborators(mut self, collab: Collaborators) -> Self {
        self.collab = collab;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    pub fn substrate_mut(&mut self) -> &mut S {
        &mut self.substrate
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    pub fn enemies(&self) -> &EnemyManager {
        &self.enemies
    }

    pub fn enemy(&self, id: EnemyId) -> Result<&Enemy, SimError> {
        self.enemies.get(id).ok_or(SimError::UnknownEnemy(id))
    }

    /// The live enemy owning `body`, for projectile pools that only know what they hit
    pub fn enemy_by_body(&self, body: BodyHandle) -> Option<EnemyId> {
        self.enemies.by_body(body)
    }

    pub fn spawner(&self, id: SpawnerId) -> Result<&EnemySpawner, SimError> {
        self.spawners.get(id).ok_or(SimError::UnknownSpawner(id))
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn platforms(&self) -> &[BodyHandle] {
        &self.platforms
    }

    pub fn player_position(&self) -> Result<Vec2, SimError> {
        let player = self.player.as_ref().ok_or(SimError::NoPlayer)?;
        self.substrate
            .position(player.body())
            .ok_or(SimError::MissingBody(player.body()))
    }

    /// Create the one and only player
    pub fn spawn_player(&mut self, position: Vec2) -> Result<BodyHandle, SimError> {
        if self.player.is_some() {
            return Err(SimError::PlayerAlreadySpawned);
        }
        let player = Player::spawn(&mut self.substrate, position, self.config.player.clone());
        let body = player.body();
        info!("Player spawned at {:?}", position);
        self.player = Some(player);
        Ok(body)
    }

    /// Static level geometry
    pub fn add_platform(&mut self, position: Vec2, size: Vec2) -> BodyHandle {
        let body = self
            .substrate
            .create_body(&BodyDesc::new(BodyRole::Platform, position, size));
        self.platforms.push(body);
        body
    }

    /// Place a spawner; its first enemy appears immediately
    pub fn add_spawner(&mut self, position: Vec2) -> SpawnerId {
        let id = self.spawners.len();
        let mut spawner = EnemySpawner::new(id, position, self.config.spawner.clone());
        spawner.spawn(&mut self.enemies, &mut self.substrate, &self.config.enemy);
        self.spawners.push(spawner);
        id
    }

    /// An enemy with no spawner behind it
    pub fn spawn_enemy(&mut self, position: Vec2) -> EnemyId {
        self.enemies
            .spawn(&mut self.substrate, position, self.config.enemy.clone(), None)
    }

    pub fn add_spikes(&mut self, position: Vec2, size: Vec2) -> BodyHandle {
        let spikes = Spikes::spawn(&mut self.substrate, position, size, self.config.spikes.clone());
        let body = spikes.body();
        self.hazards.push(Hazard::Spikes(spikes));
        body
    }

    pub fn add_pressure_pad(&mut self, position: Vec2, size: Vec2) -> BodyHandle {
        let pad = PressurePad::spawn(
            &mut self.substrate,
            position,
            size,
            self.config.pressure_pad.clone(),
        );
        let body = pad.body();
        self.hazards.push(Hazard::PressurePad(pad));
        body
    }

    pub fn add_weapon_pickup(&mut self, position: Vec2, size: Vec2) -> BodyHandle {
        let pickup = WeaponPickup::spawn(&mut self.substrate, position, size);
        let body = pickup.body();
        self.hazards.push(Hazard::WeaponPickup(pickup));
        body
    }

    /// Per-frame input phase; the frame is held for every tick until the next call
    pub fn set_input(&mut self, frame: InputFrame) {
        self.input = frame;
        if let Some(player) = self.player.as_mut() {
            player.handle_frame_input(frame, &self.substrate, &mut self.collab);
        }
    }

    pub fn input(&self) -> InputFrame {
        self.input
    }

    /// Run one fixed tick
    pub fn tick(&mut self, dt: f32) {
        self.tick_count += 1;

        // Entity steps
        if let Some(player) = self.player.as_mut() {
            player.step(dt, &mut self.substrate, &mut self.collab);
        }
        let player_position = self
            .player
            .as_ref()
            .and_then(|p| self.substrate.position(p.body()));
        for enemy in self.enemies.all_mut() {
            enemy.step(dt, player_position, &mut self.substrate, &mut self.rng);
        }

        self.substrate.step(dt);

        // Contact dispatch
        if let Some(player) = self.player.as_mut() {
            player.handle_contacts(&self.substrate, &mut self.collab);
        }
        for enemy in self.enemies.all_mut() {
            enemy.handle_contacts(&self.substrate, self.player.as_mut(), &mut self.collab);
        }

        if let Some(player) = self.player.as_mut() {
            for enemy in self.enemies.all_mut() {
                enemy.tick_contact_damage(dt, player, &self.substrate, &mut self.collab);
            }

            for hazard in &mut self.hazards {
                hazard.handle_contacts(&mut self.substrate, player, &mut self.collab);
                hazard.tick(dt, player, &mut self.collab);
            }
            self.hazards.retain(|h| !h.is_spent());
        }

        for spawner in &mut self.spawners {
            if spawner.tick(dt) {
                spawner.spawn(&mut self.enemies, &mut self.substrate, &self.config.enemy);
            }
        }

        self.reap_dead();
    }

    /// A pooled projectile hit an enemy
    pub fn projectile_hit(
        &mut self,
        enemy: EnemyId,
        damage: f32,
    ) -> Result<DamageOutcome, SimError> {
        let target = self
            .enemies
            .get_mut(enemy)
            .ok_or(SimError::UnknownEnemy(enemy))?;
        let event = DamageEvent::new(damage, DamageKind::Generic);
        let outcome = target.inflict_damage(event, &mut self.collab);
        debug!("Projectile hit enemy {}: {:?}", enemy, outcome);
        self.reap_dead();
        Ok(outcome)
    }

    /// Remove dead enemies from the world and tell their spawners
    fn reap_dead(&mut self) {
        for enemy in self.enemies.take_dead() {
            let body = enemy.body();
            let position = self.substrate.position(body);
            self.substrate.remove_body(body);

            if let (Some(fx), Some(position)) = (self.collab.fx(), position) {
                fx.death_fall(position);
            }

            if let Some(id) = enemy.spawner() {
                match self.spawners.get_mut(id) {
                    Some(spawner) => spawner.on_enemy_died(),
                    None => warn!("Enemy {} refers to unknown spawner {}", enemy.id, id),
                }
            }
        }
    }
}

// Enemy controller and the ordered enemy roster

use glam::Vec2;
use log::{debug, info, warn};

use crate::core::math::sign;
use crate::core::random::SeededRandom;
use crate::engine::physics::{BodyDesc, BodyHandle, BodyRole, Substrate};

use super::combat::{knockback_toward, quest, Collaborators, DamageEvent, DamageKind, DamageOutcome};
use super::config::EnemyConfig;
use super::contact::{classify, opposes, ContactAxis, ContactEvent, ContactPhase, ContactTracker};
use super::player::Player;
use super::spawner::SpawnerId;
use super::state::StateMachine;

/// Unique identifier for an enemy incarnation
pub type EnemyId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyState {
    #[default]
    Idle,
    /// Patrolling at move speed
    Walking,
    /// Rushing the player until it passes them
    Charging,
    ChargingCooldown,
    /// Frozen after non-lethal damage
    Stunned,
}

/// Which side the enemy was blocked on during the last contact phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallSide {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct ContactDamage {
    remaining: f32,
    armed_this_tick: bool,
}

#[derive(Debug)]
pub struct Enemy {
    pub id: EnemyId,
    body: BodyHandle,
    config: EnemyConfig,
    fsm: StateMachine<EnemyState>,

    /// Horizontal patrol/charge velocity, integrated by hand
    velocity: Vec2,
    health: f32,
    /// Side of the player when the current charge started
    charge_side: f32,
    wall: WallSide,
    spawner: Option<SpawnerId>,
    dead: bool,

    /// Countdown to the next contact hit while touching the player from the side
    contact_damage: Option<ContactDamage>,
    contacts: ContactTracker,
}

impl Enemy {
    /// Create an enemy body at `position` and wrap it
    pub fn spawn<S: Substrate + ?Sized>(
        id: EnemyId,
        substrate: &mut S,
        position: Vec2,
        config: EnemyConfig,
    ) -> Self {
        let body = substrate.create_body(&BodyDesc::new(
            BodyRole::Enemy,
            position,
            Vec2::splat(config.size),
        ));
        Self::new(id, body, config)
    }

    pub fn new(id: EnemyId, body: BodyHandle, config: EnemyConfig) -> Self {
        Self {
            id,
            body,
            health: config.max_health,
            config,
            fsm: StateMachine::new(EnemyState::Idle),
            velocity: Vec2::ZERO,
            charge_side: 1.0,
            wall: WallSide::None,
            spawner: None,
            dead: false,
            contact_damage: None,
            contacts: ContactTracker::new(),
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn state(&self) -> EnemyState {
        self.fsm.state()
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn wall(&self) -> WallSide {
        self.wall
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_stunned(&self) -> bool {
        self.fsm.is(EnemyState::Stunned)
    }

    /// Whether a side contact with the player is currently dealing damage
    pub fn is_damaging_player(&self) -> bool {
        self.contact_damage.is_some()
    }

    pub fn spawner(&self) -> Option<SpawnerId> {
        self.spawner
    }

    /// Attach the spawner to notify on death
    pub fn set_spawner(&mut self, spawner: SpawnerId) {
        self.spawner = Some(spawner);
    }

    /// Run one AI step. `player` is the player's current position, if any.
    pub fn step<S: Substrate + ?Sized>(
        &mut self,
        dt: f32,
        player: Option<Vec2>,
        substrate: &mut S,
        rng: &mut SeededRandom,
    ) {
        if self.dead {
            return;
        }

        self.fsm.tick(dt);

        match self.fsm.state() {
            EnemyState::Idle => self.idle(substrate, player, rng),
            EnemyState::Walking => {
                if let Some(position) = self.apply_velocity(dt, substrate) {
                    if !self.try_charge(position, player)
                        && self.fsm.state_time() >= self.config.move_duration
                    {
                        self.fsm.transition(EnemyState::Idle);
                    }
                }
            }
            EnemyState::Charging => {
                if let Some(position) = self.apply_velocity(dt, substrate) {
                    let crossed = player
                        .map(|p| sign(p.x - position.x) != self.charge_side)
                        .unwrap_or(true);
                    if crossed {
                        debug!("Enemy {} overshot, cooling down", self.id);
                        self.velocity.x = 0.0;
                        self.fsm.transition(EnemyState::ChargingCooldown);
                    }
                }
            }
            EnemyState::ChargingCooldown => {
                self.velocity = Vec2::ZERO;
                if self.fsm.state_time() >= self.config.charge_cooldown {
                    self.fsm.transition(EnemyState::Idle);
                }
            }
            EnemyState::Stunned => {
                self.velocity = Vec2::ZERO;
                if self.fsm.state_time() >= self.config.stun_duration {
                    debug!("Enemy {} recovered", self.id);
                    self.fsm.transition(EnemyState::Idle);
                }
            }
        }

        self.wall = WallSide::None;
    }

    fn idle<S: Substrate + ?Sized>(
        &mut self,
        substrate: &S,
        player: Option<Vec2>,
        rng: &mut SeededRandom,
    ) {
        self.velocity = Vec2::ZERO;

        let Some(position) = substrate.position(self.body) else {
            warn!("Enemy {} has no body", self.id);
            return;
        };
        if self.try_charge(position, player) {
            return;
        }

        if self.fsm.state_time() >= self.config.hold_duration {
            let direction = match self.wall {
                WallSide::None => {
                    if rng.next_bool(0.5) {
                        1.0
                    } else {
                        -1.0
                    }
                }
                // Walk away from whatever blocked us
                WallSide::Left => 1.0,
                WallSide::Right => -1.0,
            };
            self.velocity.x = self.config.move_speed * direction;
            self.fsm.transition(EnemyState::Walking);
        }
    }

    /// Commit to a charge if the player is within vertical range
    fn try_charge(&mut self, position: Vec2, player: Option<Vec2>) -> bool {
        let Some(target) = player else {
            return false;
        };
        if (target.y - position.y).abs() > self.config.charge_trigger_range {
            return false;
        }

        self.charge_side = sign(target.x - position.x);
        self.velocity = Vec2::new(self.config.charge_speed * self.charge_side, 0.0);
        debug!("Enemy {} charging toward {}", self.id, self.charge_side);
        self.fsm.force_transition(EnemyState::Charging);
        true
    }

    /// Manual Euler step; returns the new position
    fn apply_velocity<S: Substrate + ?Sized>(&self, dt: f32, substrate: &mut S) -> Option<Vec2> {
        let position = substrate.position(self.body)? + self.velocity * dt;
        substrate.set_position(self.body, position);
        Some(position)
    }

    /// Apply a hit
    pub fn inflict_damage(
        &mut self,
        damage: DamageEvent,
        collab: &mut Collaborators,
    ) -> DamageOutcome {
        if self.dead || self.is_stunned() {
            return DamageOutcome::Ignored;
        }

        self.health = (self.health - damage.amount).max(0.0);
        if let Some(fx) = collab.fx() {
            fx.hit_flash(self.body, 0.2);
        }

        if self.health <= 0.0 {
            self.die(damage.kind, collab);
            return DamageOutcome::Killed;
        }

        debug!(
            "Enemy {} took {} ({:?}), {} left",
            self.id, damage.amount, damage.kind, self.health
        );
        self.velocity = Vec2::ZERO;
        self.fsm.force_transition(EnemyState::Stunned);
        if let Some(fx) = collab.fx() {
            fx.squash_stretch(self.body, Vec2::new(1.5, 0.5), 0.1);
        }
        DamageOutcome::Stunned
    }

    fn die(&mut self, kind: DamageKind, collab: &mut Collaborators) {
        info!("Enemy {} killed ({:?})", self.id, kind);
        self.dead = true;
        self.velocity = Vec2::ZERO;
        self.contact_damage = None;
        collab.complete_quest(kind.kill_quest());
    }

    /// Read this tick's contacts. Player contacts resolve combat immediately.
    pub fn handle_contacts<S: Substrate + ?Sized>(
        &mut self,
        substrate: &S,
        mut player: Option<&mut Player>,
        collab: &mut Collaborators,
    ) {
        let contacts = substrate.contacts(self.body);
        let events = self.contacts.update(&contacts);

        for event in events {
            if self.dead {
                return;
            }
            match player.as_deref_mut() {
                Some(player) if player.body() == event.other => {
                    self.on_player_contact(&event, player, substrate, collab);
                }
                _ => self.on_contact(&event),
            }
        }
    }

    fn on_player_contact<S: Substrate + ?Sized>(
        &mut self,
        event: &ContactEvent,
        player: &mut Player,
        substrate: &S,
        collab: &mut Collaborators,
    ) {
        match event.phase {
            ContactPhase::Enter => {
                let Some(normal) = event.normals.first() else {
                    return;
                };
                if normal.y < -self.config.stomp_threshold {
                    let (amount, kind) = if player.is_ground_pounding() {
                        (self.config.ground_pound_damage, DamageKind::GroundPound)
                    } else {
                        (self.config.stomp_damage, DamageKind::Stomp)
                    };
                    debug!("Enemy {} landed on ({:?})", self.id, kind);
                    self.inflict_damage(DamageEvent::new(amount, kind), collab);
                    player.bounce(Vec2::new(player.velocity().x, self.config.player_bounce_force));
                } else {
                    // First hit lands right away, then every interval while touching
                    self.contact_damage = Some(ContactDamage {
                        remaining: self.config.contact_damage_interval,
                        armed_this_tick: true,
                    });
                    self.hit_player(player, substrate, collab);
                }
            }
            ContactPhase::Stay => {}
            ContactPhase::Exit => self.contact_damage = None,
        }
    }

    fn on_contact(&mut self, event: &ContactEvent) {
        if event.trigger || event.phase == ContactPhase::Exit {
            return;
        }

        for normal in &event.normals {
            if classify(*normal) != ContactAxis::Wall {
                continue;
            }
            // Normal points away from the wall: negative x means the wall is on our right
            self.wall = if normal.x < 0.0 {
                WallSide::Right
            } else {
                WallSide::Left
            };
            if opposes(normal.x, self.velocity.x) {
                debug!("Enemy {} blocked ({:?})", self.id, self.wall);
                self.velocity.x = 0.0;
                self.fsm.force_transition(EnemyState::Idle);
            }
        }
    }

    /// Advance the repeating side-contact damage
    pub fn tick_contact_damage<S: Substrate + ?Sized>(
        &mut self,
        dt: f32,
        player: &mut Player,
        substrate: &S,
        collab: &mut Collaborators,
    ) {
        if self.dead {
            return;
        }
        let Some(timer) = self.contact_damage.as_mut() else {
            return;
        };

        // The tick of the first hit doesn't count toward the next one
        if std::mem::take(&mut timer.armed_this_tick) {
            return;
        }

        timer.remaining -= dt;
        if timer.remaining > 0.0 {
            return;
        }
        timer.remaining = (timer.remaining + self.config.contact_damage_interval).max(0.0);
        self.hit_player(player, substrate, collab);
    }

    fn hit_player<S: Substrate + ?Sized>(
        &self,
        player: &mut Player,
        substrate: &S,
        collab: &mut Collaborators,
    ) {
        let (Some(own), Some(target)) = (
            substrate.position(self.body),
            substrate.position(player.body()),
        ) else {
            return;
        };

        let side = if target.x > own.x { 1.0 } else { -1.0 };
        let knockback = knockback_toward(self.config.knockback, side);
        // An invincible player just shrugs this off
        if player.take_damage(knockback, collab) {
            debug!("Enemy {} hit the player", self.id);
            collab.complete_quest(quest::HIT_BY_ENEMY);
        }
    }
}

/// Manages all enemies in spawn order
#[derive(Debug, Default)]
pub struct EnemyManager {
    enemies: Vec<Enemy>,
    next_id: EnemyId,
}

impl EnemyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a new enemy
    pub fn spawn<S: Substrate + ?Sized>(
        &mut self,
        substrate: &mut S,
        position: Vec2,
        config: EnemyConfig,
        spawner: Option<SpawnerId>,
    ) -> EnemyId {
        let id = self.next_id;
        self.next_id += 1;

        let mut enemy = Enemy::spawn(id, substrate, position, config);
        if let Some(spawner) = spawner {
            enemy.set_spawner(spawner);
        }
        info!("Enemy {} spawned at {:?}", id, position);
        self.enemies.push(enemy);

        id
    }

    /// Get an enemy by ID
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Get a mutable enemy by ID
    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Find the enemy owning a body
    pub fn by_body(&self, body: BodyHandle) -> Option<EnemyId> {
        self.enemies.iter().find(|e| e.body == body).map(|e| e.id)
    }

    pub fn all(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn all_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    /// Remove and return every dead enemy, in spawn order
    pub fn take_dead(&mut self) -> Vec<Enemy> {
        let (dead, alive): (Vec<_>, Vec<_>) = self.enemies.drain(..).partition(|e| e.dead);
        self.enemies = alive;
        dead
    }

    pub fn count(&self) -> usize {
        self.enemies.len()
    }
}

// Gameplay tunables
//
// Velocities are world units per second. The air friction values are
// multipliers applied once per fixed tick.

use glam::Vec2;

/// Player movement, combat and walk-step tuning
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    // Dimensions
    /// Edge length of the player's square collider
    pub size: f32,

    // Airborne movement
    /// Horizontal acceleration while airborne with input
    pub move_accel: f32,
    /// Vertical acceleration (negative = down)
    pub gravity: f32,
    /// Per-tick multiplier on vertical velocity while airborne
    pub air_fall_friction: f32,
    /// Per-tick multiplier on horizontal velocity while airborne
    pub air_move_friction: f32,
    /// Per-tick multiplier on residual velocity during recoil on the ground
    pub ground_friction: f32,
    /// Sprite spin while steering in the air (degrees per second)
    pub air_spin_speed: f32,

    // Jumping
    pub jump_velocity: f32,
    /// Ascent is held at least this long
    pub jump_min_time: f32,
    /// Ascent is held at most this long while jump stays pressed
    pub jump_max_time: f32,

    // Walk step
    /// Seconds per step regardless of distance
    pub step_duration: f32,
    /// Shorter obstruction-free distances than this count as blocked
    pub min_step_distance: f32,

    // Ground pound
    pub ground_pound_windup: f32,
    /// Constant downward speed while pounding
    pub ground_pound_speed: f32,

    // Combat
    pub invincibility_duration: f32,
    /// Horizontal kick applied to the shooter when firing
    pub recoil_force: f32,
    pub recoil_duration: f32,
}

/// The player's standard tuning
pub const PLAYER_CONFIG: PlayerConfig = PlayerConfig {
    size: 0.5,

    move_accel: 60.0,
    gravity: -30.0,
    air_fall_friction: 0.975,
    air_move_friction: 0.85,
    ground_friction: 0.85,
    air_spin_speed: 360.0,

    jump_velocity: 10.0,
    jump_min_time: 0.06,
    jump_max_time: 0.20,

    step_duration: 0.2,
    min_step_distance: 0.05,

    ground_pound_windup: 0.3,
    ground_pound_speed: 25.0,

    invincibility_duration: 1.0,
    recoil_force: 3.0,
    recoil_duration: 0.15,
};

impl Default for PlayerConfig {
    fn default() -> Self {
        PLAYER_CONFIG
    }
}

impl PlayerConfig {
    /// Nominal walk-step distance (one full quarter roll)
    pub fn step_distance(&self) -> f32 {
        self.size
    }
}

/// Enemy patrol, charge and combat tuning
#[derive(Debug, Clone)]
pub struct EnemyConfig {
    pub size: f32,

    // Movement
    pub move_speed: f32,
    pub charge_speed: f32,
    pub move_duration: f32,
    pub hold_duration: f32,
    pub charge_cooldown: f32,
    /// Vertical distance to the player under which the enemy charges
    pub charge_trigger_range: f32,
    pub stun_duration: f32,

    // Combat
    pub max_health: f32,
    /// Knockback dealt on side contact; x is mirrored toward the player's side
    pub knockback: Vec2,
    /// Vertical speed given to the player after a stomp
    pub player_bounce_force: f32,
    pub stomp_damage: f32,
    pub ground_pound_damage: f32,
    /// Seconds between repeated contact hits
    pub contact_damage_interval: f32,
    /// A contact normal with y below minus this counts as a stomp
    pub stomp_threshold: f32,
}

pub const ENEMY_CONFIG: EnemyConfig = EnemyConfig {
    size: 0.5,

    move_speed: 3.0,
    charge_speed: 12.0,
    move_duration: 3.0,
    hold_duration: 0.5,
    charge_cooldown: 2.0,
    charge_trigger_range: 1.0,
    stun_duration: 2.0,

    max_health: 3.0,
    knockback: Vec2::new(6.0, 12.0),
    player_bounce_force: 12.0,
    stomp_damage: 1.0,
    ground_pound_damage: 3.0,
    contact_damage_interval: 0.1,
    stomp_threshold: 0.5,
};

impl Default for EnemyConfig {
    fn default() -> Self {
        ENEMY_CONFIG
    }
}

#[derive(Debug, Clone)]
pub struct SpikesConfig {
    pub knockback: Vec2,
}

impl Default for SpikesConfig {
    fn default() -> Self {
        Self {
            knockback: Vec2::new(6.0, 12.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PressurePadConfig {
    pub bounce_force: f32,
    /// Squash animation length; the bounce lands halfway through
    pub animation_duration: f32,
    /// Delay after the bounce before the pad can fire again
    pub rearm_delay: f32,
}

impl Default for PressurePadConfig {
    fn default() -> Self {
        Self {
            bounce_force: 20.0,
            animation_duration: 0.2,
            rearm_delay: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpawnerConfig {
    pub respawn_delay: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self { respawn_delay: 3.0 }
    }
}

/// Everything the simulation needs to build entities
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub spikes: SpikesConfig,
    pub pressure_pad: PressurePadConfig,
    pub spawner: SpawnerConfig,
    /// Seed for the enemies' patrol direction rolls
    pub seed: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            spikes: SpikesConfig::default(),
            pressure_pad: PressurePadConfig::default(),
            spawner: SpawnerConfig::default(),
            seed: 0x5eed,
        }
    }
}

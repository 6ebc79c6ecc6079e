// Combat protocol shared by the player, enemies and hazards
//
// Damage is resolved synchronously: whoever detects the hit calls straight into
// the victim (`Player::take_damage`, `Player::bounce`, `Enemy::inflict_damage`)
// and reacts to the returned result. Everything the core merely *announces*
// (quest progress, camera shake, hit flashes, projectile spawns) goes through
// the optional collaborators below and is never read back.

use glam::Vec2;

use crate::engine::physics::BodyHandle;

/// Progress ids reported to the quest collaborator
pub mod quest {
    pub const TOUCH_SPIKES: &str = "touch_spikes";
    pub const HIT_BY_ENEMY: &str = "hit_by_enemy";
    pub const USE_PRESSURE_PAD: &str = "use_pressure_pad";
    pub const SHOOT_ENEMY: &str = "shoot_enemy";
    pub const STOMP_ENEMY: &str = "stomp_enemy";
    pub const GROUND_POUND_ENEMY: &str = "ground_pound_enemy";
}

/// How a hit was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageKind {
    /// Projectiles and anything without a special reaction
    Generic,
    /// Landed on from above
    Stomp,
    /// Landed on from above during a ground pound
    GroundPound,
}

impl DamageKind {
    /// Progress id reported when a hit of this kind kills an enemy
    pub fn kill_quest(self) -> &'static str {
        match self {
            DamageKind::Generic => quest::SHOOT_ENEMY,
            DamageKind::Stomp => quest::STOMP_ENEMY,
            DamageKind::GroundPound => quest::GROUND_POUND_ENEMY,
        }
    }
}

/// A single hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub amount: f32,
    pub kind: DamageKind,
}

impl DamageEvent {
    pub fn new(amount: f32, kind: DamageKind) -> Self {
        Self { amount, kind }
    }
}

/// What a hit did to an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Victim was stunned (or already dead); nothing changed
    Ignored,
    /// Victim survived and is now stunned
    Stunned,
    /// Victim's health reached zero
    Killed,
}

/// Mirror a configured knockback so it pushes toward `side` (-1 or 1)
pub fn knockback_toward(base: Vec2, side: f32) -> Vec2 {
    Vec2::new(side * base.x, base.y)
}

/// Quest/progress bookkeeping
pub trait ProgressSink {
    fn complete_quest(&mut self, id: &str);
    fn add_progress(&mut self, id: &str, amount: u32);
}

/// Camera and sprite effects; every call is fire-and-forget
pub trait Cosmetics {
    fn camera_shake(&mut self, _duration: f32, _magnitude: f32) {}
    fn camera_punch(&mut self, _direction: Vec2, _duration: f32) {}
    fn hit_flash(&mut self, _target: BodyHandle, _duration: f32) {}
    fn squash_stretch(&mut self, _target: BodyHandle, _scale: Vec2, _duration: f32) {}
    fn death_fall(&mut self, _position: Vec2) {}
}

/// External projectile pool
pub trait ProjectileLauncher {
    fn spawn_projectile(&mut self, origin: Vec2, facing_right: bool);
}

/// Optional collaborators injected into the simulation
///
/// A missing collaborator simply swallows the notification.
#[derive(Default)]
pub struct Collaborators {
    progress: Option<Box<dyn ProgressSink>>,
    cosmetics: Option<Box<dyn Cosmetics>>,
    projectiles: Option<Box<dyn ProjectileLauncher>>,
}

impl Collaborators {
    /// No collaborators at all
    pub fn none() -> Self {
        Self::default()
    }

    /// Log every notification (used by the headless runner)
    pub fn logging() -> Self {
        Self::none()
            .with_progress(LogSink)
            .with_cosmetics(LogSink)
            .with_projectiles(LogSink)
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn with_cosmetics(mut self, cosmetics: impl Cosmetics + 'static) -> Self {
        self.cosmetics = Some(Box::new(cosmetics));
        self
    }

    pub fn with_projectiles(mut self, projectiles: impl ProjectileLauncher + 'static) -> Self {
        self.projectiles = Some(Box::new(projectiles));
        self
    }

    pub fn complete_quest(&mut self, id: &str) {
        if let Some(progress) = self.progress.as_mut() {
            progress.complete_quest(id);
        }
    }

    pub fn add_progress(&mut self, id: &str, amount: u32) {
        if let Some(progress) = self.progress.as_mut() {
            progress.add_progress(id, amount);
        }
    }

    /// Cosmetics sink, if one is attached
    pub fn fx(&mut self) -> Option<&mut (dyn Cosmetics + 'static)> {
        self.cosmetics.as_deref_mut()
    }

    /// Returns false when no launcher is attached
    pub fn spawn_projectile(&mut self, origin: Vec2, facing_right: bool) -> bool {
        match self.projectiles.as_mut() {
            Some(launcher) => {
                launcher.spawn_projectile(origin, facing_right);
                true
            }
            None => false,
        }
    }
}

/// Collaborator that only writes to the log
pub struct LogSink;

impl ProgressSink for LogSink {
    fn complete_quest(&mut self, id: &str) {
        log::info!("Quest completed: {}", id);
    }

    fn add_progress(&mut self, id: &str, amount: u32) {
        log::info!("Quest progress: {} +{}", id, amount);
    }
}

impl Cosmetics for LogSink {
    fn camera_shake(&mut self, duration: f32, magnitude: f32) {
        log::trace!("Camera shake {}s x{}", duration, magnitude);
    }

    fn death_fall(&mut self, position: Vec2) {
        log::debug!("Enemy death fall at {:?}", position);
    }
}

impl ProjectileLauncher for LogSink {
    fn spawn_projectile(&mut self, origin: Vec2, facing_right: bool) {
        log::debug!(
            "Projectile fired from {:?} toward {}",
            origin,
            if facing_right { "right" } else { "left" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::{Note, Recorder};

    #[test]
    fn test_kill_quest_per_kind() {
        assert_eq!(DamageKind::Generic.kill_quest(), "shoot_enemy");
        assert_eq!(DamageKind::Stomp.kill_quest(), "stomp_enemy");
        assert_eq!(DamageKind::GroundPound.kill_quest(), "ground_pound_enemy");
    }

    #[test]
    fn test_knockback_toward_mirrors_x_only() {
        let base = Vec2::new(6.0, 12.0);
        assert_eq!(knockback_toward(base, -1.0), Vec2::new(-6.0, 12.0));
        assert_eq!(knockback_toward(base, 1.0), base);
    }

    #[test]
    fn test_missing_collaborators_are_skipped() {
        let mut collab = Collaborators::none();
        collab.complete_quest(quest::TOUCH_SPIKES);
        collab.add_progress(quest::USE_PRESSURE_PAD, 1);
        assert!(collab.fx().is_none());
        assert!(!collab.spawn_projectile(Vec2::ZERO, true));
    }

    #[test]
    fn test_notifications_reach_attached_collaborators() {
        let recorder = Recorder::new();
        let mut collab = recorder.collaborators();

        collab.complete_quest(quest::HIT_BY_ENEMY);
        collab.add_progress(quest::USE_PRESSURE_PAD, 2);
        assert!(collab.spawn_projectile(Vec2::new(1.0, 2.0), false));

        assert_eq!(
            recorder.notes(),
            vec![
                Note::Completed(quest::HIT_BY_ENEMY.to_string()),
                Note::Progress(quest::USE_PRESSURE_PAD.to_string(), 2),
                Note::Projectile(Vec2::new(1.0, 2.0), false),
            ]
        );
    }
}

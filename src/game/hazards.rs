// Static trigger volumes the player can run into
//
// Each hazard owns a sensor body and reacts to the player's overlap starting.
// Delayed effects (the pressure pad's bounce and re-arm) are countdowns
// advanced by `tick`.

use glam::Vec2;
use log::debug;

use crate::engine::physics::{BodyDesc, BodyHandle, BodyRole, Substrate};

use super::combat::{quest, Collaborators};
use super::config::{PressurePadConfig, SpikesConfig};
use super::contact::{ContactPhase, ContactTracker};
use super::player::Player;

fn create_trigger<S: Substrate + ?Sized>(
    substrate: &mut S,
    position: Vec2,
    size: Vec2,
) -> BodyHandle {
    substrate.create_body(&BodyDesc::new(BodyRole::Trigger, position, size))
}

/// Whether the player started overlapping `body` this tick
fn player_entered<S: Substrate + ?Sized>(
    tracker: &mut ContactTracker,
    body: BodyHandle,
    substrate: &S,
    player: BodyHandle,
) -> bool {
    tracker
        .update(&substrate.contacts(body))
        .iter()
        .any(|e| e.other == player && e.phase == ContactPhase::Enter)
}

/// Damages and knocks back the player on touch
#[derive(Debug)]
pub struct Spikes {
    body: BodyHandle,
    config: SpikesConfig,
    contacts: ContactTracker,
}

impl Spikes {
    pub fn spawn<S: Substrate + ?Sized>(
        substrate: &mut S,
        position: Vec2,
        size: Vec2,
        config: SpikesConfig,
    ) -> Self {
        Self {
            body: create_trigger(substrate, position, size),
            config,
            contacts: ContactTracker::new(),
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Knockback for a player moving at `player_velocity_x` at `player_x`
    ///
    /// A moving player is thrown back against its motion; a still one is
    /// pushed away from the spike's center.
    pub fn knockback_for(&self, player_velocity_x: f32, player_x: f32, spike_x: f32) -> Vec2 {
        let side = if player_velocity_x.abs() > 0.01 {
            -player_velocity_x.signum()
        } else if player_x > spike_x {
            1.0
        } else {
            -1.0
        };
        Vec2::new(side * self.config.knockback.x, self.config.knockback.y)
    }

    pub fn handle_contacts<S: Substrate + ?Sized>(
        &mut self,
        substrate: &S,
        player: &mut Player,
        collab: &mut Collaborators,
    ) {
        if !player_entered(&mut self.contacts, self.body, substrate, player.body()) {
            return;
        }

        let own = substrate.position(self.body);
        let (Some(own), Some(target)) = (own, substrate.position(player.body())) else {
            return;
        };

        let knockback = self.knockback_for(player.velocity().x, target.x, own.x);
        if player.take_damage(knockback, collab) {
            debug!("Player hit spikes, knockback {:?}", knockback);
            collab.complete_quest(quest::TOUCH_SPIKES);
        }
        if let Some(fx) = collab.fx() {
            fx.hit_flash(self.body, 0.5);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadPhase {
    /// Waiting for the player
    Armed,
    /// Pressed down; bounce fires when the countdown ends
    Pressing(f32),
    /// Disabled until the countdown ends
    Rearming(f32),
}

/// Launches the player straight up after a short squash
#[derive(Debug)]
pub struct PressurePad {
    body: BodyHandle,
    config: PressurePadConfig,
    phase: PadPhase,
    contacts: ContactTracker,
}

impl PressurePad {
    pub fn spawn<S: Substrate + ?Sized>(
        substrate: &mut S,
        position: Vec2,
        size: Vec2,
        config: PressurePadConfig,
    ) -> Self {
        Self {
            body: create_trigger(substrate, position, size),
            config,
            phase: PadPhase::Armed,
            contacts: ContactTracker::new(),
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn phase(&self) -> PadPhase {
        self.phase
    }

    pub fn handle_contacts<S: Substrate + ?Sized>(
        &mut self,
        substrate: &S,
        player: &mut Player,
        collab: &mut Collaborators,
    ) {
        let entered = player_entered(&mut self.contacts, self.body, substrate, player.body());
        if !entered || self.phase != PadPhase::Armed {
            return;
        }

        let half = self.config.animation_duration / 2.0;
        debug!("Pressure pad pressed");
        self.phase = PadPhase::Pressing(half);
        if let Some(fx) = collab.fx() {
            fx.squash_stretch(self.body, Vec2::new(1.0, 0.5), half);
            fx.squash_stretch(player.body(), Vec2::new(1.5, 0.5), half);
        }
    }

    pub fn tick(&mut self, dt: f32, player: &mut Player, collab: &mut Collaborators) {
        match self.phase {
            PadPhase::Armed => {}
            PadPhase::Pressing(remaining) => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = PadPhase::Pressing(remaining);
                    return;
                }
                player.bounce(Vec2::new(0.0, self.config.bounce_force));
                collab.add_progress(quest::USE_PRESSURE_PAD, 1);
                if let Some(fx) = collab.fx() {
                    fx.squash_stretch(self.body, Vec2::ONE, self.config.animation_duration / 2.0);
                    fx.squash_stretch(
                        player.body(),
                        Vec2::new(0.7, 1.3),
                        self.config.animation_duration,
                    );
                }
                self.phase = PadPhase::Rearming(self.config.rearm_delay);
            }
            PadPhase::Rearming(remaining) => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = PadPhase::Rearming(remaining);
                } else {
                    self.phase = PadPhase::Armed;
                    // Re-enabling reports anyone still standing on the pad as a new overlap
                    self.contacts.clear();
                }
            }
        }
    }
}

/// Grants the ranged attack on first touch, then disappears
#[derive(Debug)]
pub struct WeaponPickup {
    body: BodyHandle,
    collected: bool,
    contacts: ContactTracker,
}

impl WeaponPickup {
    pub fn spawn<S: Substrate + ?Sized>(substrate: &mut S, position: Vec2, size: Vec2) -> Self {
        Self {
            body: create_trigger(substrate, position, size),
            collected: false,
            contacts: ContactTracker::new(),
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Removes its own body once collected
    pub fn handle_contacts<S: Substrate + ?Sized>(
        &mut self,
        substrate: &mut S,
        player: &mut Player,
        collab: &mut Collaborators,
    ) {
        if self.collected {
            return;
        }
        if !player_entered(&mut self.contacts, self.body, substrate, player.body()) {
            return;
        }

        self.collected = true;
        player.give_weapon();
        if let Some(fx) = collab.fx() {
            fx.squash_stretch(self.body, Vec2::ZERO, 0.5);
        }
        substrate.remove_body(self.body);
    }
}

/// Any static hazard, kept in placement order
#[derive(Debug)]
pub enum Hazard {
    Spikes(Spikes),
    PressurePad(PressurePad),
    WeaponPickup(WeaponPickup),
}

impl Hazard {
    pub fn body(&self) -> BodyHandle {
        match self {
            Hazard::Spikes(h) => h.body(),
            Hazard::PressurePad(h) => h.body(),
            Hazard::WeaponPickup(h) => h.body(),
        }
    }

    /// Whether the hazard is gone for good
    pub fn is_spent(&self) -> bool {
        matches!(self, Hazard::WeaponPickup(p) if p.is_collected())
    }

    pub fn handle_contacts<S: Substrate + ?Sized>(
        &mut self,
        substrate: &mut S,
        player: &mut Player,
        collab: &mut Collaborators,
    ) {
        match self {
            Hazard::Spikes(h) => h.handle_contacts(substrate, player, collab),
            Hazard::PressurePad(h) => h.handle_contacts(substrate, player, collab),
            Hazard::WeaponPickup(h) => h.handle_contacts(substrate, player, collab),
        }
    }

    pub fn tick(&mut self, dt: f32, player: &mut Player, collab: &mut Collaborators) {
        if let Hazard::PressurePad(pad) = self {
            pad.tick(dt, player, collab);
        }
    }
}

// Player controller
//
// One state-machine step per fixed tick. Airborne and idle phases hand a
// velocity to the substrate; walk steps and the ground-pound windup lock the
// body kinematically and write its position directly. Contact handling runs
// after the substrate step. Contacts are ignored while a step rolls, so a step
// that finishes or is cut short rebuilds the ground set with a downward sweep.

use glam::Vec2;
use log::debug;

use crate::core::math::{ease_in_quad, lerp, quantize_right_angle, rotate_about};
use crate::engine::physics::{first_solid_hit, BodyDesc, BodyHandle, BodyRole, BoxCast, Substrate};

use super::combat::Collaborators;
use super::config::PlayerConfig;
use super::contact::{
    classify, opposes, ContactAxis, ContactEvent, ContactPhase, ContactTracker, GroundSet,
};
use super::input::{Direction, InputFrame};
use super::state::StateMachine;

/// Thickness of the box swept down to find footing
const GROUND_SWEEP_HEIGHT: f32 = 0.05;
/// Gap under the player still counted as touching
const TOUCH_SLOP: f32 = 0.01;

/// Player controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerState {
    /// Standing still on ground
    #[default]
    Idle,
    /// In the air, moving downward (also the hurt state)
    Falling,
    /// In the air, moving upward
    Jumping,
    /// Rolling one discrete step at a time
    Walking,
    /// Frozen in the air while the pound winds up
    GroundPoundPrepare,
    /// Plummeting at the fixed pound speed
    GroundPoundFall,
}

impl PlayerState {
    /// States in which a ground pound may start
    pub fn is_airborne(&self) -> bool {
        matches!(self, Self::Falling | Self::Jumping)
    }

    pub fn is_ground_pound(&self) -> bool {
        matches!(self, Self::GroundPoundPrepare | Self::GroundPoundFall)
    }
}

/// An in-flight walk step
#[derive(Debug, Clone, Copy)]
struct WalkStep {
    start: Vec2,
    start_rotation: f32,
    /// Obstruction-free distance, at most the nominal step distance
    distance: f32,
    /// Rotation magnitude in degrees (90 for a full step)
    angle: f32,
    right: bool,
    elapsed: f32,
}

impl WalkStep {
    fn target(&self) -> Vec2 {
        let dx = if self.right {
            self.distance
        } else {
            -self.distance
        };
        Vec2::new(self.start.x + dx, self.start.y)
    }

    /// Signed rotation reached at normalized time `t` (clockwise when rolling right)
    fn rotation_at(&self, t: f32) -> f32 {
        let target = if self.right { -self.angle } else { self.angle };
        lerp(0.0, target, ease_in_quad(t))
    }
}

/// The player avatar
#[derive(Debug)]
pub struct Player {
    body: BodyHandle,
    config: PlayerConfig,
    fsm: StateMachine<PlayerState>,

    /// Controller-owned velocity (units per second)
    velocity: Vec2,
    /// True while the controller writes the body position itself
    kinematic: bool,

    ground: GroundSet,
    contacts: ContactTracker,
    input: InputFrame,

    facing_right: bool,
    has_weapon: bool,
    invincible_for: f32,
    /// Remaining recoil after firing; blocks new walk steps
    recoil_for: f32,
    step: Option<WalkStep>,
    /// Sprite rotation in degrees
    rotation: f32,
    /// Whether the current jump came from input and gets the ascent hold
    jump_hold: bool,
    /// Keeps `is_ground_pounding` true for the tick a pound lands
    pound_landed: bool,
}

impl Player {
    /// Create the player's body and controller
    pub fn spawn<S: Substrate + ?Sized>(
        substrate: &mut S,
        position: Vec2,
        config: PlayerConfig,
    ) -> Self {
        let body = substrate.create_body(&BodyDesc::new(
            BodyRole::Player,
            position,
            Vec2::splat(config.size),
        ));
        Self::new(body, config)
    }

    /// Wrap an existing body
    pub fn new(body: BodyHandle, config: PlayerConfig) -> Self {
        Self {
            body,
            config,
            fsm: StateMachine::new(PlayerState::Idle),
            velocity: Vec2::ZERO,
            kinematic: false,
            ground: GroundSet::new(),
            contacts: ContactTracker::new(),
            input: InputFrame::default(),
            facing_right: true,
            has_weapon: false,
            invincible_for: 0.0,
            recoil_for: 0.0,
            step: None,
            rotation: 0.0,
            jump_hold: false,
            pound_landed: false,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> PlayerState {
        self.fsm.state()
    }

    pub fn state_time(&self) -> f32 {
        self.fsm.state_time()
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_for > 0.0
    }

    pub fn has_weapon(&self) -> bool {
        self.has_weapon
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn is_stepping(&self) -> bool {
        self.step.is_some()
    }

    pub fn is_recoiling(&self) -> bool {
        self.recoil_for > 0.0
    }

    pub fn ground(&self) -> &GroundSet {
        &self.ground
    }

    pub fn input(&self) -> InputFrame {
        self.input
    }

    /// Grounded iff a live body remains in the ground set
    pub fn is_grounded<S: Substrate + ?Sized>(&mut self, substrate: &S) -> bool {
        self.ground.is_grounded(substrate)
    }

    /// True while pounding, and on the tick a pound lands
    pub fn is_ground_pounding(&self) -> bool {
        self.fsm.is(PlayerState::GroundPoundFall) || self.pound_landed
    }

    /// Unlock the ranged attack (idempotent)
    pub fn give_weapon(&mut self) {
        if !self.has_weapon {
            debug!("Player picked up a weapon");
        }
        self.has_weapon = true;
    }

    /// Per-frame input phase: store the held frame and fire if asked
    pub fn handle_frame_input<S: Substrate + ?Sized>(
        &mut self,
        frame: InputFrame,
        substrate: &S,
        collab: &mut Collaborators,
    ) {
        self.input = frame;
        if frame.attack_pressed && self.has_weapon {
            self.fire(substrate, collab);
        }
    }

    fn fire<S: Substrate + ?Sized>(&mut self, substrate: &S, collab: &mut Collaborators) {
        let Some(origin) = substrate.position(self.body) else {
            log::warn!("Player body {:?} missing, cannot fire", self.body);
            return;
        };

        collab.spawn_projectile(origin, self.facing_right);

        let kick = if self.facing_right {
            -self.config.recoil_force
        } else {
            self.config.recoil_force
        };

        match self.fsm.state() {
            PlayerState::Idle | PlayerState::Walking => {
                // Recoil knocks the player out of any step in progress
                if self.step.take().is_some() {
                    self.ground.clear();
                    let reach = self.touch_reach();
                    if let Some(support) = self.sweep_ground(origin, reach, substrate) {
                        self.ground.insert(support);
                    }
                }
                self.kinematic = false;
                self.velocity = Vec2::new(kick, 0.0);

                if self.ground.is_grounded(substrate) {
                    self.recoil_for = self.config.recoil_duration;
                    self.fsm.transition(PlayerState::Idle);
                } else {
                    // Cut off mid-arc with nothing underneath
                    self.fsm.force_transition(PlayerState::Falling);
                }
            }
            PlayerState::Falling | PlayerState::Jumping => {
                self.velocity.x += kick;
            }
            PlayerState::GroundPoundPrepare | PlayerState::GroundPoundFall => {}
        }
    }

    /// Apply a hit. Returns false (and changes nothing) while invincible.
    pub fn take_damage(&mut self, knockback: Vec2, collab: &mut Collaborators) -> bool {
        if self.is_invincible() {
            return false;
        }

        debug!("Player hit, knockback {:?}", knockback);
        self.velocity = knockback;
        self.cancel_motion();
        self.fsm.force_transition(PlayerState::Falling);
        self.invincible_for = self.config.invincibility_duration;

        if let Some(fx) = collab.fx() {
            fx.hit_flash(self.body, 0.5);
        }
        true
    }

    /// Launch the player regardless of invincibility (stomps, pressure pads)
    pub fn bounce(&mut self, force: Vec2) {
        debug!("Player bounced with {:?}", force);
        self.velocity = force;
        self.cancel_motion();
        self.fsm.force_transition(PlayerState::Jumping);
    }

    /// Drop every in-progress movement mode
    fn cancel_motion(&mut self) {
        // Contacts were ignored mid-step, so that footing is stale
        if self.step.take().is_some() {
            self.ground.clear();
        }
        self.kinematic = false;
        self.recoil_for = 0.0;
        self.jump_hold = false;
    }

    /// Run one state-machine step
    pub fn step<S: Substrate + ?Sized>(
        &mut self,
        dt: f32,
        substrate: &mut S,
        collab: &mut Collaborators,
    ) {
        // Interrupts from the last contact phase may have released the lock
        self.sync_mode(substrate);

        self.fsm.tick(dt);
        self.invincible_for = (self.invincible_for - dt).max(0.0);
        let pound_landed = self.pound_landed;

        if self.input.ground_pound_pressed && self.fsm.state().is_airborne() {
            self.begin_ground_pound();
        }

        match self.fsm.state() {
            PlayerState::Idle => self.idle(dt, substrate),
            PlayerState::Falling => self.airborne(dt, false),
            PlayerState::Jumping => self.airborne(dt, true),
            PlayerState::Walking => self.walking(dt, substrate, collab),
            PlayerState::GroundPoundPrepare => self.ground_pound_prepare(dt),
            PlayerState::GroundPoundFall => {
                self.kinematic = false;
                self.velocity = Vec2::new(0.0, -self.config.ground_pound_speed);
            }
        }

        match self.input.direction {
            Direction::Right => self.facing_right = true,
            Direction::Left => self.facing_right = false,
            Direction::None => {}
        }

        if pound_landed {
            self.pound_landed = false;
        }

        self.sync_mode(substrate);
        if !self.kinematic {
            substrate.set_velocity(self.body, self.velocity);
        }
    }

    fn sync_mode<S: Substrate + ?Sized>(&mut self, substrate: &mut S) {
        if substrate.is_kinematic(self.body) != self.kinematic {
            substrate.set_kinematic(self.body, self.kinematic);
        }
    }

    fn start_jump(&mut self) {
        self.step = None;
        self.kinematic = false;
        self.velocity.x = 0.0;
        self.jump_hold = true;
        self.fsm.force_transition(PlayerState::Jumping);
    }

    fn idle<S: Substrate + ?Sized>(&mut self, dt: f32, substrate: &S) {
        self.kinematic = false;

        if self.recoil_for > 0.0 {
            self.recoil_for = (self.recoil_for - dt).max(0.0);
            self.velocity.x *= self.config.ground_friction;
            self.velocity.y = 0.0;

            if !self.ground.is_grounded(substrate) {
                self.fsm.transition(PlayerState::Falling);
            } else if self.input.wants_jump() {
                self.start_jump();
            }
            // No new walk step until the recoil settles
            return;
        }

        self.velocity = Vec2::ZERO;

        if !self.ground.is_grounded(substrate) {
            self.fsm.transition(PlayerState::Falling);
            return;
        }

        if self.input.wants_jump() {
            self.start_jump();
            return;
        }

        if self.input.direction.is_some() {
            self.fsm.transition(PlayerState::Walking);
        }
    }

    fn airborne(&mut self, dt: f32, jumping: bool) {
        self.kinematic = false;
        let c = &self.config;

        if jumping {
            let t = self.fsm.state_time();
            let held = self.input.jump_held && t < c.jump_max_time;
            if self.jump_hold && (t < c.jump_min_time || held) {
                self.velocity.y = c.jump_velocity;
            }
        }

        self.velocity.y += c.gravity * dt;
        self.velocity.y *= c.air_fall_friction;

        let axis = self.input.direction.axis();
        self.velocity.x += axis * c.move_accel * dt;
        self.rotation -= axis * c.air_spin_speed * dt;
        self.velocity.x *= c.air_move_friction;

        if jumping && self.velocity.y <= 0.0 {
            self.fsm.transition(PlayerState::Falling);
        }
    }

    fn begin_ground_pound(&mut self) {
        debug!("Ground pound windup");
        self.step = None;
        self.velocity = Vec2::ZERO;
        self.kinematic = true;
        self.jump_hold = false;
        self.fsm.force_transition(PlayerState::GroundPoundPrepare);
    }

    fn ground_pound_prepare(&mut self, dt: f32) {
        self.velocity = Vec2::ZERO;
        // One full spin over the windup
        self.rotation -= 360.0 * dt / self.config.ground_pound_windup.max(f32::EPSILON);

        if self.fsm.state_time() >= self.config.ground_pound_windup {
            self.rotation = 0.0;
            self.kinematic = false;
            self.velocity = Vec2::new(0.0, -self.config.ground_pound_speed);
            self.fsm.transition(PlayerState::GroundPoundFall);
        }
    }

    fn walking<S: Substrate + ?Sized>(
        &mut self,
        dt: f32,
        substrate: &mut S,
        collab: &mut Collaborators,
    ) {
        // A jump preempts whatever the step was doing
        if self.input.wants_jump() {
            self.start_jump();
            return;
        }

        if self.step.is_some() {
            if !self.advance_step(dt, substrate, collab) {
                return;
            }
            if self.fsm.is(PlayerState::Falling) {
                return;
            }
        }

        if !self.ground.is_grounded(substrate) {
            self.kinematic = false;
            self.fsm.transition(PlayerState::Falling);
            return;
        }

        if self.input.direction.is_some() {
            // A blocked step leaves the player standing in Walking
            self.begin_step(self.input.direction, substrate);
        } else {
            self.velocity.x = 0.0;
            self.fsm.transition(PlayerState::Idle);
        }
    }

    /// Measure the free distance and lock the body for a step. Does nothing if blocked.
    fn begin_step<S: Substrate + ?Sized>(&mut self, direction: Direction, substrate: &S) {
        let Some(position) = substrate.position(self.body) else {
            return;
        };

        let right = direction == Direction::Right;
        let max_distance = self.config.step_distance();
        let hits = substrate.cast_box(&BoxCast {
            origin: position,
            size: Vec2::splat(self.config.size) * 0.95,
            direction: if right { Vec2::X } else { Vec2::NEG_X },
            max_distance,
            exclude: Some(self.body),
        });

        let distance = first_solid_hit(&hits)
            .map(|hit| hit.distance.min(max_distance))
            .unwrap_or(max_distance);

        if !distance.is_finite()
            || max_distance <= 0.0
            || distance < self.config.min_step_distance
        {
            return;
        }

        self.step = Some(WalkStep {
            start: position,
            start_rotation: self.rotation,
            distance,
            angle: 90.0 * distance / max_distance,
            right,
            elapsed: 0.0,
        });
        self.kinematic = true;
        self.velocity = Vec2::ZERO;
    }

    /// Move along the step's arc. Returns true on the tick the step completes.
    fn advance_step<S: Substrate + ?Sized>(
        &mut self,
        dt: f32,
        substrate: &mut S,
        collab: &mut Collaborators,
    ) -> bool {
        let Some(mut step) = self.step else {
            return false;
        };

        step.elapsed += dt;
        let t = (step.elapsed / self.config.step_duration).min(1.0);

        if t < 1.0 {
            let half = self.config.size * 0.5;
            let pivot = step.start + Vec2::new(if step.right { half } else { -half }, -half);
            let angle = step.rotation_at(t);
            substrate.set_position(self.body, rotate_about(step.start, pivot, angle));
            self.rotation = step.start_rotation + angle;
            self.step = Some(step);
            return false;
        }

        // Snap to the exact target regardless of the easing curve
        let target = step.target();
        substrate.set_position(self.body, target);
        self.rotation =
            quantize_right_angle(step.start_rotation + step.rotation_at(1.0)).rem_euclid(360.0);
        self.step = None;
        self.kinematic = false;
        self.velocity = Vec2::ZERO;

        if let Some(fx) = collab.fx() {
            fx.camera_shake(0.1, 0.15);
        }

        // Contacts were ignored mid-step, so the footing is rebuilt from a sweep
        self.ground.clear();
        match self.sweep_ground(target, self.config.size * 0.6, substrate) {
            Some(support) => self.ground.insert(support),
            None => self.fsm.transition(PlayerState::Falling),
        }
        true
    }

    /// Sweep a thin box down from `position` and return the first solid body within reach
    fn sweep_ground<S: Substrate + ?Sized>(
        &self,
        position: Vec2,
        max_distance: f32,
        substrate: &S,
    ) -> Option<BodyHandle> {
        let hits = substrate.cast_box(&BoxCast {
            origin: position,
            size: Vec2::new(self.config.size * 0.9, GROUND_SWEEP_HEIGHT),
            direction: Vec2::NEG_Y,
            max_distance,
            exclude: Some(self.body),
        });
        first_solid_hit(&hits).map(|hit| hit.body)
    }

    /// Sweep distance at which the player's underside is still touching
    fn touch_reach(&self) -> f32 {
        (self.config.size - GROUND_SWEEP_HEIGHT) * 0.5 + TOUCH_SLOP
    }

    /// Read this tick's contacts and update grounding
    pub fn handle_contacts<S: Substrate + ?Sized>(
        &mut self,
        substrate: &S,
        collab: &mut Collaborators,
    ) {
        let contacts = substrate.contacts(self.body);
        let events = self.contacts.update(&contacts);
        for event in events {
            self.on_contact(&event, collab);
        }
    }

    /// Interpret one contact event
    pub fn on_contact(&mut self, event: &ContactEvent, collab: &mut Collaborators) {
        // The step owns the body until it completes
        if self.step.is_some() || event.trigger {
            return;
        }

        if event.phase == ContactPhase::Exit {
            self.ground.remove(event.other);
            return;
        }

        self.ground.remove(event.other);

        for normal in &event.normals {
            match classify(*normal) {
                ContactAxis::Ground => {
                    self.ground.insert(event.other);
                    if matches!(
                        self.fsm.state(),
                        PlayerState::Falling | PlayerState::GroundPoundFall
                    ) {
                        self.land(collab);
                    }
                }
                ContactAxis::Ceiling => {
                    if !self.fsm.state().is_ground_pound() {
                        self.velocity.y = 0.0;
                        self.fsm.transition(PlayerState::Falling);
                    }
                }
                ContactAxis::Wall => {
                    if opposes(normal.x, self.velocity.x) {
                        self.velocity.x = 0.0;
                    }
                }
            }
        }
    }

    fn land(&mut self, collab: &mut Collaborators) {
        let pounding = self.fsm.is(PlayerState::GroundPoundFall);
        self.rotation = 0.0;
        self.velocity.y = 0.0;

        if pounding {
            self.pound_landed = true;
            self.velocity = Vec2::ZERO;
        }

        if let Some(fx) = collab.fx() {
            if pounding {
                fx.camera_punch(Vec2::NEG_Y, 0.2);
                fx.camera_shake(0.3, 0.8);
            } else {
                fx.camera_shake(0.2, 0.5);
            }
        }

        let next = if self.input.direction.is_some() {
            PlayerState::Walking
        } else {
            PlayerState::Idle
        };
        debug!("Player landed -> {:?}", next);
        self.fsm.transition(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::scripted::ScriptedWorld;
    use crate::game::testing::{Note, Recorder};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        world: ScriptedWorld,
        player: Player,
        floor: BodyHandle,
        recorder: Recorder,
        collab: Collaborators,
    }

    impl Rig {
        /// Player resting on a wide floor whose top is y = 0
        fn new() -> Self {
            let mut world = ScriptedWorld::new();
            let floor = world.add(BodyRole::Platform, Vec2::new(0.0, -0.25), Vec2::new(20.0, 0.5));
            let player = Player::spawn(&mut world, Vec2::new(0.0, 0.25), PlayerConfig::default());
            world.touch(player.body(), floor, Vec2::Y);
            let recorder = Recorder::new();
            let collab = recorder.collaborators();
            let mut rig = Self {
                world,
                player,
                floor,
                recorder,
                collab,
            };
            rig.contacts();
            rig
        }

        fn input(&mut self, frame: InputFrame) {
            self.player
                .handle_frame_input(frame, &self.world, &mut self.collab);
        }

        fn contacts(&mut self) {
            self.player.handle_contacts(&self.world, &mut self.collab);
        }

        /// Controller step, substrate step, contact phase
        fn tick(&mut self) {
            self.player.step(DT, &mut self.world, &mut self.collab);
            self.world.step(DT);
            self.contacts();
        }

        fn position(&self) -> Vec2 {
            self.world.position(self.player.body()).unwrap()
        }

        fn lift_off(&mut self) {
            self.world.separate(self.player.body(), self.floor);
        }
    }

    #[test]
    fn test_starts_idle_and_grounded() {
        let mut rig = Rig::new();
        assert_eq!(rig.player.state(), PlayerState::Idle);
        assert!(rig.player.ground().contains(rig.floor));
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Idle);
        assert_eq!(rig.player.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_idle_without_ground_falls() {
        let mut rig = Rig::new();
        rig.lift_off();
        rig.contacts();
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Falling);
    }

    #[test]
    fn test_take_damage_then_invincible() {
        let mut rig = Rig::new();
        let knockback = Vec2::new(-6.0, 12.0);

        assert!(rig.player.take_damage(knockback, &mut rig.collab));
        assert_eq!(rig.player.velocity(), knockback);
        assert_eq!(rig.player.state(), PlayerState::Falling);
        assert!(rig.player.is_invincible());
        assert!(!rig.player.is_kinematic());

        let before = (rig.player.velocity(), rig.player.state());
        assert!(!rig.player.take_damage(Vec2::new(100.0, 100.0), &mut rig.collab));
        assert_eq!((rig.player.velocity(), rig.player.state()), before);

        assert!(rig
            .recorder
            .has(&Note::HitFlash(rig.player.body(), 0.5)));
    }

    #[test]
    fn test_invincibility_expires() {
        let mut rig = Rig::new();
        assert!(rig.player.take_damage(Vec2::new(1.0, 1.0), &mut rig.collab));

        let ticks = (rig.player.config().invincibility_duration / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            rig.tick();
        }
        assert!(!rig.player.is_invincible());
        assert!(rig.player.take_damage(Vec2::new(2.0, 3.0), &mut rig.collab));
        assert_eq!(rig.player.velocity(), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_landing_resolves_to_idle() {
        let mut rig = Rig::new();
        rig.lift_off();
        rig.contacts();
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Falling);
        assert!(rig.player.ground().is_empty());

        rig.world.touch(rig.player.body(), rig.floor, Vec2::Y);
        rig.contacts();
        assert!(rig.player.ground().contains(rig.floor));
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Idle);
        assert!(rig.recorder.has(&Note::Shake(0.2, 0.5)));
    }

    #[test]
    fn test_landing_with_direction_resolves_to_walking() {
        let mut rig = Rig::new();
        rig.lift_off();
        rig.contacts();
        rig.tick();

        rig.input(InputFrame::holding(Direction::Left));
        rig.world.touch(rig.player.body(), rig.floor, Vec2::Y);
        rig.contacts();
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Walking);
    }

    #[test]
    fn test_full_step_lands_exactly_one_size_over() {
        let mut rig = Rig::new();
        let start = rig.position();

        rig.input(InputFrame::holding(Direction::Right));
        rig.tick(); // Idle -> Walking
        rig.tick(); // step begins
        assert!(rig.player.is_stepping());
        assert!(rig.player.is_kinematic());

        // Commit-once: releasing the key does not stop the step
        rig.input(InputFrame::default());
        let mut ticks = 0;
        while rig.player.is_stepping() && ticks < 30 {
            rig.tick();
            ticks += 1;
        }

        assert!(!rig.player.is_stepping());
        let end = rig.position();
        assert_eq!(end, Vec2::new(start.x + 0.5, start.y));
        assert_eq!(rig.player.rotation() % 90.0, 0.0);
        assert_relative_eq!(rig.player.rotation(), 270.0);
        assert!(!rig.player.is_kinematic());
        assert!(rig.player.ground().contains(rig.floor));
        assert!(rig.recorder.has(&Note::Shake(0.1, 0.15)));

        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Idle);
    }

    #[test]
    fn test_mid_step_position_follows_arc() {
        let mut rig = Rig::new();
        let start = rig.position();
        rig.input(InputFrame::holding(Direction::Right));
        rig.tick();
        rig.tick();
        rig.tick();

        let mid = rig.position();
        assert!(mid.x > start.x);
        // Rolling over the corner lifts the center above its resting height
        assert!(mid.y >= start.y);
        assert!(rig.player.rotation() < 0.0 && rig.player.rotation() > -90.0);
    }

    #[test]
    fn test_partial_step_against_wall() {
        let mut rig = Rig::new();
        // Sweep box is 0.475 wide, so a wall face at x = 0.4375 leaves 0.2 of room
        let wall = rig
            .world
            .add(BodyRole::Platform, Vec2::new(0.6875, 0.25), Vec2::splat(0.5));
        let start = rig.position();

        rig.input(InputFrame::holding(Direction::Right));
        rig.tick();
        rig.tick();
        rig.input(InputFrame::default());
        for _ in 0..30 {
            if !rig.player.is_stepping() {
                break;
            }
            rig.tick();
        }

        let end = rig.position();
        assert_relative_eq!(end.x - start.x, 0.2, epsilon = 1e-5);
        assert_eq!(end.y, start.y);
        assert_eq!(rig.player.rotation() % 90.0, 0.0);
        assert!(rig.world.is_alive(wall));
    }

    #[test]
    fn test_blocked_step_does_nothing() {
        let mut rig = Rig::new();
        // Wall face right against the sweep box
        rig.world
            .add(BodyRole::Platform, Vec2::new(0.4875, 0.25), Vec2::splat(0.5));
        let start = rig.position();

        rig.input(InputFrame::holding(Direction::Right));
        for _ in 0..5 {
            rig.tick();
        }

        assert_eq!(rig.player.state(), PlayerState::Walking);
        assert!(!rig.player.is_stepping());
        assert!(!rig.player.is_kinematic());
        assert_eq!(rig.position(), start);
        assert!(rig.player.rotation().is_finite());
    }

    #[test]
    fn test_step_off_ledge_falls() {
        let mut world = ScriptedWorld::new();
        // Narrow ledge: the player rolls right off its edge
        let ledge = world.add(BodyRole::Platform, Vec2::new(0.0, -0.25), Vec2::new(0.5, 0.5));
        let mut player = Player::spawn(&mut world, Vec2::new(0.0, 0.25), PlayerConfig::default());
        let mut collab = Collaborators::none();
        world.touch(player.body(), ledge, Vec2::Y);
        player.handle_contacts(&world, &mut collab);

        player.handle_frame_input(InputFrame::holding(Direction::Right), &world, &mut collab);
        for _ in 0..20 {
            player.step(DT, &mut world, &mut collab);
            if player.is_stepping() {
                world.separate(player.body(), ledge);
            }
            world.step(DT);
            player.handle_contacts(&world, &mut collab);
            if player.state() == PlayerState::Falling {
                break;
            }
        }

        assert_eq!(player.state(), PlayerState::Falling);
        assert!(player.ground().is_empty());
    }

    #[test]
    fn test_damage_interrupts_step() {
        let mut rig = Rig::new();
        rig.input(InputFrame::holding(Direction::Right));
        rig.tick();
        rig.tick();
        rig.tick();
        assert!(rig.player.is_stepping());

        assert!(rig.player.take_damage(Vec2::new(-6.0, 12.0), &mut rig.collab));
        assert!(!rig.player.is_stepping());
        assert!(!rig.player.is_kinematic());
        // Footing from before the step no longer counts
        assert!(rig.player.ground().is_empty());

        rig.lift_off();
        rig.tick();
        assert!(!rig.world.is_kinematic(rig.player.body()));
        assert_eq!(rig.player.state(), PlayerState::Falling);
        assert!(rig.player.ground().is_empty());

        rig.world.touch(rig.player.body(), rig.floor, Vec2::Y);
        rig.tick();
        // Still holding right
        assert_eq!(rig.player.state(), PlayerState::Walking);
        assert!(rig.player.ground().contains(rig.floor));
    }

    #[test]
    fn test_jump_preempts_step() {
        let mut rig = Rig::new();
        rig.input(InputFrame::holding(Direction::Right));
        rig.tick();
        rig.tick();
        assert!(rig.player.is_stepping());

        rig.input(InputFrame {
            direction: Direction::Right,
            jump_pressed: true,
            jump_held: true,
            ..InputFrame::default()
        });
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Jumping);
        assert!(!rig.player.is_stepping());
        assert!(!rig.world.is_kinematic(rig.player.body()));
    }

    fn ticks_until_falling(hold: bool) -> usize {
        let mut rig = Rig::new();
        rig.input(InputFrame {
            jump_pressed: true,
            jump_held: true,
            ..InputFrame::default()
        });
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Jumping);
        rig.lift_off();
        rig.input(InputFrame {
            jump_held: hold,
            ..InputFrame::default()
        });

        let mut ticks = 0;
        while rig.player.state() == PlayerState::Jumping && ticks < 300 {
            rig.tick();
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn test_held_jump_ascends_longer() {
        let tap = ticks_until_falling(false);
        let held = ticks_until_falling(true);
        assert!(tap > 0);
        assert!(held > tap);
    }

    #[test]
    fn test_jump_holds_ascent_speed() {
        let mut rig = Rig::new();
        rig.input(InputFrame {
            jump_pressed: true,
            jump_held: true,
            ..InputFrame::default()
        });
        rig.tick(); // Idle -> Jumping
        rig.lift_off();
        rig.tick();

        let c = PlayerConfig::default();
        let expected = (c.jump_velocity + c.gravity * DT) * c.air_fall_friction;
        assert_relative_eq!(rig.player.velocity().y, expected, epsilon = 1e-4);
        assert!(rig.position().y > 0.25);
    }

    #[test]
    fn test_air_steering_accelerates_and_spins() {
        let mut rig = Rig::new();
        rig.lift_off();
        rig.contacts();
        rig.input(InputFrame::holding(Direction::Right));
        rig.tick();
        rig.tick();

        assert_eq!(rig.player.state(), PlayerState::Falling);
        assert!(rig.player.velocity().x > 0.0);
        assert!(rig.player.rotation() < 0.0);
        assert!(rig.player.facing_right());
    }

    #[test]
    fn test_ceiling_stops_ascent() {
        let mut rig = Rig::new();
        rig.input(InputFrame {
            jump_pressed: true,
            jump_held: true,
            ..InputFrame::default()
        });
        rig.tick();
        rig.lift_off();
        rig.tick();
        assert!(rig.player.velocity().y > 0.0);

        let ceiling = rig
            .world
            .add(BodyRole::Platform, Vec2::new(0.0, 2.0), Vec2::new(4.0, 0.5));
        rig.world.touch(rig.player.body(), ceiling, Vec2::NEG_Y);
        rig.contacts();
        assert_eq!(rig.player.velocity().y, 0.0);
        assert_eq!(rig.player.state(), PlayerState::Falling);
    }

    #[test]
    fn test_wall_only_stops_motion_into_it() {
        let mut rig = Rig::new();
        rig.lift_off();
        rig.contacts();
        rig.player.take_damage(Vec2::new(5.0, 0.0), &mut rig.collab);

        // Wall on the left (normal +x) while moving right: keep going
        let left_wall = rig
            .world
            .add(BodyRole::Platform, Vec2::new(-1.0, 0.25), Vec2::splat(0.5));
        rig.world.touch(rig.player.body(), left_wall, Vec2::X);
        rig.contacts();
        assert_eq!(rig.player.velocity().x, 5.0);

        // Wall on the right (normal -x) while moving right: stop
        let right_wall = rig
            .world
            .add(BodyRole::Platform, Vec2::new(1.0, 0.25), Vec2::splat(0.5));
        rig.world.touch(rig.player.body(), right_wall, Vec2::NEG_X);
        rig.contacts();
        assert_eq!(rig.player.velocity().x, 0.0);
        assert!(rig.player.ground().is_empty());
    }

    #[test]
    fn test_ground_pound_sequence() {
        let mut rig = Rig::new();
        rig.lift_off();
        rig.contacts();
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Falling);

        rig.input(InputFrame {
            ground_pound_pressed: true,
            ..InputFrame::default()
        });
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::GroundPoundPrepare);
        assert_eq!(rig.player.velocity(), Vec2::ZERO);
        assert!(rig.world.is_kinematic(rig.player.body()));
        assert!(!rig.player.is_ground_pounding());

        rig.input(InputFrame::default());
        let windup_ticks = (rig.player.config().ground_pound_windup / DT).ceil() as usize + 1;
        for _ in 0..windup_ticks {
            rig.tick();
        }
        assert_eq!(rig.player.state(), PlayerState::GroundPoundFall);
        assert!(!rig.world.is_kinematic(rig.player.body()));
        assert_eq!(
            rig.player.velocity(),
            Vec2::new(0.0, -rig.player.config().ground_pound_speed)
        );
        assert!(rig.player.is_ground_pounding());
    }

    #[test]
    fn test_ground_pound_not_allowed_on_ground() {
        let mut rig = Rig::new();
        rig.input(InputFrame {
            ground_pound_pressed: true,
            ..InputFrame::default()
        });
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Idle);
    }

    #[test]
    fn test_ground_pound_flag_lasts_through_landing_tick() {
        let mut rig = Rig::new();
        rig.lift_off();
        rig.contacts();
        rig.tick();
        rig.input(InputFrame {
            ground_pound_pressed: true,
            ..InputFrame::default()
        });
        rig.tick();
        rig.input(InputFrame::default());
        while rig.player.state() != PlayerState::GroundPoundFall {
            rig.tick();
        }

        rig.world.touch(rig.player.body(), rig.floor, Vec2::Y);
        rig.contacts();
        assert_eq!(rig.player.state(), PlayerState::Idle);
        // Same tick: anything resolving damage still sees the pound
        assert!(rig.player.is_ground_pounding());
        assert!(rig.recorder.has(&Note::Punch(Vec2::NEG_Y)));

        rig.tick();
        assert!(!rig.player.is_ground_pounding());
    }

    #[test]
    fn test_bounce_ignores_invincibility_and_ascent_hold() {
        let mut rig = Rig::new();
        rig.player.take_damage(Vec2::new(1.0, 1.0), &mut rig.collab);
        assert!(rig.player.is_invincible());

        rig.player.bounce(Vec2::new(0.5, 12.0));
        assert_eq!(rig.player.state(), PlayerState::Jumping);
        assert_eq!(rig.player.velocity(), Vec2::new(0.5, 12.0));

        rig.lift_off();
        rig.input(InputFrame {
            jump_held: true,
            ..InputFrame::default()
        });
        rig.tick();
        // Gravity applies right away instead of clamping to the jump speed
        assert!(rig.player.velocity().y < 12.0);
        assert!(rig.player.velocity().y > rig.player.config().jump_velocity);
    }

    #[test]
    fn test_attack_needs_weapon() {
        let mut rig = Rig::new();
        rig.input(InputFrame {
            attack_pressed: true,
            ..InputFrame::default()
        });
        assert!(rig.recorder.notes().iter().all(|n| !matches!(n, Note::Projectile(..))));
        assert!(!rig.player.is_recoiling());
    }

    #[test]
    fn test_firing_recoils_and_blocks_steps() {
        let mut rig = Rig::new();
        rig.player.give_weapon();
        rig.player.give_weapon();
        assert!(rig.player.has_weapon());

        let origin = rig.position();
        rig.input(InputFrame {
            attack_pressed: true,
            direction: Direction::Right,
            ..InputFrame::default()
        });
        assert!(rig.recorder.has(&Note::Projectile(origin, true)));
        assert!(rig.player.is_recoiling());
        assert!(rig.player.velocity().x < 0.0);

        rig.input(InputFrame::holding(Direction::Right));
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Idle);
        assert!(!rig.player.is_stepping());
        // Ground friction bleeds off the kick
        assert!(rig.player.velocity().x > -rig.player.config().recoil_force);
        assert!(rig.player.velocity().x < 0.0);

        let recoil_ticks = (rig.player.config().recoil_duration / DT).ceil() as usize + 1;
        for _ in 0..recoil_ticks {
            rig.tick();
        }
        assert!(!rig.player.is_recoiling());
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Walking);
    }

    #[test]
    fn test_firing_interrupts_step() {
        let mut rig = Rig::new();
        rig.player.give_weapon();
        rig.input(InputFrame::holding(Direction::Left));
        rig.tick();
        rig.tick();
        assert!(rig.player.is_stepping());

        rig.input(InputFrame {
            attack_pressed: true,
            direction: Direction::Left,
            ..InputFrame::default()
        });
        assert!(!rig.player.is_stepping());
        assert!(!rig.player.is_kinematic());
        assert_eq!(rig.player.state(), PlayerState::Idle);
        // Facing left, so the kick goes right
        assert!(rig.player.velocity().x > 0.0);
        // Cut off before the body left the floor
        assert!(rig.player.ground().contains(rig.floor));

        rig.tick();
        assert!(!rig.world.is_kinematic(rig.player.body()));
        assert_eq!(rig.player.state(), PlayerState::Idle);
        assert!(rig.player.is_recoiling());
    }

    #[test]
    fn test_firing_mid_arc_falls_then_lands() {
        let mut rig = Rig::new();
        rig.player.give_weapon();
        rig.input(InputFrame::holding(Direction::Right));
        for _ in 0..30 {
            if rig.position().y > 0.3 {
                break;
            }
            rig.tick();
        }
        assert!(rig.player.is_stepping());
        assert!(rig.position().y > 0.3);

        // The arc has lifted the body clear of the floor
        rig.lift_off();
        rig.input(InputFrame {
            attack_pressed: true,
            ..InputFrame::default()
        });
        assert!(!rig.player.is_stepping());
        assert!(!rig.player.is_kinematic());
        assert!(!rig.player.is_recoiling());
        assert_eq!(rig.player.state(), PlayerState::Falling);
        assert!(rig.player.ground().is_empty());
        assert!(rig.player.velocity().x < 0.0);

        let height = rig.position().y;
        rig.tick();
        assert!(!rig.world.is_kinematic(rig.player.body()));
        assert_eq!(rig.player.state(), PlayerState::Falling);
        assert!(rig.position().y < height);

        rig.world.touch(rig.player.body(), rig.floor, Vec2::Y);
        rig.tick();
        assert_eq!(rig.player.state(), PlayerState::Idle);
        assert!(rig.player.ground().contains(rig.floor));
        assert!(rig.recorder.has(&Note::Shake(0.2, 0.5)));
    }
}

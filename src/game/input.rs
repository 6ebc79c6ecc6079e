// Per-frame input sampling
//
// Key events are folded into an `ActionInput` as they arrive; once per render
// frame the simulation takes an `InputFrame` snapshot and holds it for every
// fixed tick that frame produces.

use std::collections::HashSet;

/// Player actions the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Attack,
    GroundPound,
}

/// Horizontal intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Left,
    Right,
}

impl Direction {
    /// Resolve held keys; left wins when both are down
    pub fn from_held(left: bool, right: bool) -> Self {
        if left {
            Direction::Left
        } else if right {
            Direction::Right
        } else {
            Direction::None
        }
    }

    /// -1, 0 or 1
    pub fn axis(self) -> f32 {
        match self {
            Direction::None => 0.0,
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn is_some(self) -> bool {
        self != Direction::None
    }
}

/// Snapshot of one frame of input, held across that frame's ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub direction: Direction,
    /// Jump went down this frame
    pub jump_pressed: bool,
    /// Jump is down
    pub jump_held: bool,
    pub attack_pressed: bool,
    pub ground_pound_pressed: bool,
}

impl InputFrame {
    pub fn holding(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// Either edge or level jump input
    pub fn wants_jump(&self) -> bool {
        self.jump_pressed || self.jump_held
    }
}

/// Press/release tracking for the player's actions
#[derive(Debug, Default)]
pub struct ActionInput {
    /// Actions that are currently pressed
    pressed: HashSet<Action>,

    /// Actions that went down since the last snapshot
    just_pressed: HashSet<Action>,
}

impl ActionInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action press
    pub fn press(&mut self, action: Action) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Register an action release
    pub fn release(&mut self, action: Action) {
        self.pressed.remove(&action);
    }

    /// Check if an action is currently pressed
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action went down since the last snapshot
    pub fn just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Take this frame's snapshot and start a new frame
    pub fn sample(&mut self) -> InputFrame {
        let frame = InputFrame {
            direction: Direction::from_held(
                self.is_pressed(Action::MoveLeft),
                self.is_pressed(Action::MoveRight),
            ),
            jump_pressed: self.just_pressed(Action::Jump),
            jump_held: self.is_pressed(Action::Jump),
            attack_pressed: self.just_pressed(Action::Attack),
            ground_pound_pressed: self.just_pressed(Action::GroundPound),
        };
        self.just_pressed.clear();
        frame
    }

    /// Reset all input state
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
    }
}

// Timed state machine shared by the player and enemy controllers

use std::fmt::Debug;

/// Tracks the current state, the previous one and the seconds spent in the current one
///
/// Transition rules live in the controllers; this only keeps the bookkeeping
/// consistent (the timer is reset on every transition).
#[derive(Debug, Clone)]
pub struct StateMachine<S> {
    current_state: S,
    previous_state: S,
    state_time: f32,
}

impl<S: Copy + PartialEq + Debug> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current_state: initial,
            previous_state: initial,
            state_time: 0.0,
        }
    }

    /// Get the current state
    pub fn state(&self) -> S {
        self.current_state
    }

    /// Get the previous state
    pub fn previous_state(&self) -> S {
        self.previous_state
    }

    /// Get time spent in current state
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    pub fn is(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Transition to a new state; a no-op if already there
    pub fn transition(&mut self, new_state: S) {
        if self.current_state != new_state {
            self.force_transition(new_state);
        }
    }

    /// Force transition even to the same state (resets state time)
    pub fn force_transition(&mut self, new_state: S) {
        log::trace!("{:?} -> {:?}", self.current_state, new_state);
        self.previous_state = self.current_state;
        self.current_state = new_state;
        self.state_time = 0.0;
    }

    /// Advance the state timer (called once per tick)
    pub fn tick(&mut self, dt: f32) {
        self.state_time += dt;
    }
}

// Fixed-step clock for the simulation
//
// Callers feed it the length of each rendered frame; it answers with how many
// fixed ticks to run. Leftover time carries over to the next frame.

use std::time::{Duration, Instant};

/// Seconds per simulation tick (60 Hz)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const TICK: Duration = Duration::from_micros(16_667);

/// A slow frame never runs more than this many ticks
const MAX_TICKS_PER_FRAME: u32 = 5;

pub struct GameLoop {
    /// Frame time not yet consumed by a tick
    backlog: Duration,
    last_frame: Instant,
    paused: bool,
    frames: u64,
    ticks: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            backlog: Duration::ZERO,
            last_frame: Instant::now(),
            paused: false,
            frames: 0,
            ticks: 0,
        }
    }

    /// Measure the wall-clock frame since the last call and return the ticks it owes
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed)
    }

    /// Account for a frame of the given length and return the ticks it owes
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frames += 1;
        if self.paused {
            return 0;
        }

        self.backlog += frame_time;
        let owed = (self.backlog.as_nanos() / TICK.as_nanos()) as u32;
        let ticks = owed.min(MAX_TICKS_PER_FRAME);

        if owed > MAX_TICKS_PER_FRAME {
            log::warn!(
                "Simulation fell behind by {} ticks, dropping the backlog",
                owed - MAX_TICKS_PER_FRAME
            );
            self.backlog = Duration::ZERO;
        } else {
            self.backlog -= TICK * ticks;
        }

        self.ticks += u64::from(ticks);
        ticks
    }

    pub fn fixed_timestep(&self) -> f32 {
        FIXED_TIMESTEP
    }

    /// How far into the next tick the backlog reaches, in [0, 1)
    pub fn alpha(&self) -> f32 {
        self.backlog.as_secs_f32() / TICK.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Ticks handed out so far
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    /// Resume without replaying the time spent paused
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.backlog = Duration::ZERO;
            self.last_frame = Instant::now();
            log::info!("Simulation resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

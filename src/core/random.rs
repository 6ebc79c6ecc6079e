// Deterministic seeded random numbers (xorshift32)
//
// The simulation must replay identically from the same seed, so nothing in the
// crate touches a thread-local or time-seeded generator.

/// Deterministic random number generator using xorshift32
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    /// Create a generator; a seed of 0 is treated as 1 to avoid the degenerate sequence
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Raw next value
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Coin flip with the given probability of `true`
    pub fn next_bool(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(1)
    }
}

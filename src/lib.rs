// Simulation core of a 2D action-platformer
//
// Deterministic per-tick state machines for a player and an enemy archetype,
// layered on a rapier2d-backed physics substrate.

pub mod core;
pub mod engine;
pub mod error;
pub mod game;

pub use error::SimError;

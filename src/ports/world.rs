//! World port - the simulation the agent lives in.
//!
//! The world owns the creature's body and surroundings. The agent only sees
//! the sensory snapshot and the reward for each step.

use crate::{sensing::SensorySnapshot, types::Action};

/// What happened when the world executed one action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Reward for the transition
    pub reward: f64,
    /// Whether the creature is still alive
    pub alive: bool,
    /// Running score of the episode
    pub score: f64,
}

/// A simulation that consumes actions and produces sensory snapshots.
pub trait World {
    /// Sensory snapshot at the creature's current position.
    fn sense(&self) -> SensorySnapshot;

    /// Advance the simulation by one tick using `action`.
    fn step(&mut self, action: Action) -> StepOutcome;

    /// Number of actions the world understands.
    fn action_count(&self) -> usize;
}

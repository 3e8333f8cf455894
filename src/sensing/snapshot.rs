//! The bundle of sensory grids a world hands to the agent each step.

use serde::{Deserialize, Serialize};

use super::grid::Grid;

/// Read-only sensory input centred on the creature.
///
/// Presence grids (danger, food) flag a cell by holding the sentinel value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorySnapshot {
    /// Food scent intensity
    pub food_scent: Grid,
    /// Signed elevation
    pub elevation: Grid,
    /// Danger presence
    pub danger: Grid,
    /// Food presence, when the world provides it
    pub food_presence: Option<Grid>,
}

impl SensorySnapshot {
    pub fn new(food_scent: Grid, elevation: Grid, danger: Grid) -> Self {
        Self {
            food_scent,
            elevation,
            danger,
            food_presence: None,
        }
    }

    pub fn with_food_presence(mut self, food_presence: Grid) -> Self {
        self.food_presence = Some(food_presence);
        self
    }
}

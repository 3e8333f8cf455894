//! Meadow sandbox
//!
//! A bounded grid with food patches, hazards and rolling hills. The creature
//! smells food through a Gaussian scent field, feels the local relief and
//! sees hazards in a 5x5 window around itself.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{StepOutcome, World},
    sensing::{Grid, PRESENCE_SENTINEL, SensorySnapshot},
    types::Action,
};

/// Grid coordinate as (row, col).
pub type Cell = (usize, usize);

/// Row/column offsets of the eight moves, clockwise from north.
const MOVES: [(isize, isize); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Parameters of generated meadows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeadowConfig {
    pub rows: usize,
    pub cols: usize,
    pub food_count: usize,
    pub hazard_count: usize,
    pub hill_count: usize,
    /// Spread of each food patch's scent, in cells
    pub scent_radius: f64,
    pub start_energy: f64,
    pub food_energy: f64,
    pub hazard_damage: f64,
    pub start_health: f64,
    /// Energy spent per unit of elevation climbed
    pub climb_cost: f64,
    /// Include the 5x5 food-presence grid in snapshots
    pub food_presence: bool,
}

impl Default for MeadowConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 32,
            food_count: 12,
            hazard_count: 10,
            hill_count: 4,
            scent_radius: 3.0,
            start_energy: 100.0,
            food_energy: 25.0,
            hazard_damage: 20.0,
            start_health: 100.0,
            climb_cost: 0.05,
            food_presence: false,
        }
    }
}

impl MeadowConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfiguration { message });
        if self.rows < 3 || self.cols < 3 {
            return invalid(format!(
                "meadow must be at least 3x3, got {}x{}",
                self.rows, self.cols
            ));
        }
        if self.food_count + self.hazard_count >= self.rows * self.cols {
            return invalid("meadow has no room for the creature".to_string());
        }
        if !(self.scent_radius.is_finite() && self.scent_radius > 0.0) {
            return invalid(format!("scent radius must be positive, got {}", self.scent_radius));
        }
        if self.start_energy <= 0.0 || self.start_health <= 0.0 {
            return invalid("creature must start with positive energy and health".to_string());
        }
        Ok(())
    }
}

/// Gaussian elevation bump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hill {
    pub row: f64,
    pub col: f64,
    pub height: f64,
    pub radius: f64,
}

impl Hill {
    fn elevation_at(&self, row: f64, col: f64) -> f64 {
        let dist_sq = (row - self.row).powi(2) + (col - self.col).powi(2);
        let sigma_sq = self.radius.powi(2).max(f64::EPSILON);
        self.height * (-dist_sq / (2.0 * sigma_sq)).exp()
    }
}

/// One meadow episode
#[derive(Debug, Clone)]
pub struct Meadow {
    config: MeadowConfig,
    rng: StdRng,
    food: BTreeSet<Cell>,
    hazards: BTreeSet<Cell>,
    hills: Vec<Hill>,
    position: Cell,
    energy: f64,
    health: f64,
    score: f64,
}

impl Meadow {
    /// Generate a random meadow; the creature starts in the middle.
    pub fn new(config: &MeadowConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = (config.rows / 2, config.cols / 2);

        let hills = (0..config.hill_count)
            .map(|_| Hill {
                row: rng.random_range(0.0..config.rows as f64),
                col: rng.random_range(0.0..config.cols as f64),
                height: rng.random_range(60.0..240.0),
                radius: rng.random_range(2.0..6.0),
            })
            .collect();

        let mut meadow = Self::from_layout(config, start, Vec::<Cell>::new(), Vec::<Cell>::new(), hills);
        meadow.rng = rng;
        for _ in 0..config.hazard_count {
            if let Some(cell) = meadow.free_cell() {
                meadow.hazards.insert(cell);
            }
        }
        for _ in 0..config.food_count {
            if let Some(cell) = meadow.free_cell() {
                meadow.food.insert(cell);
            }
        }
        meadow
    }

    /// Build a meadow with an explicit layout.
    pub fn from_layout(
        config: &MeadowConfig,
        position: Cell,
        food: impl IntoIterator<Item = Cell>,
        hazards: impl IntoIterator<Item = Cell>,
        hills: Vec<Hill>,
    ) -> Self {
        Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(0),
            food: food.into_iter().collect(),
            hazards: hazards.into_iter().collect(),
            hills,
            position,
            energy: config.start_energy,
            health: config.start_health,
            score: 0.0,
        }
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0.0 && self.health > 0.0
    }

    pub fn food(&self) -> &BTreeSet<Cell> {
        &self.food
    }

    fn free_cell(&mut self) -> Option<Cell> {
        let attempts = self.config.rows * self.config.cols * 4;
        (0..attempts).find_map(|_| {
            let cell = (
                self.rng.random_range(0..self.config.rows),
                self.rng.random_range(0..self.config.cols),
            );
            let taken =
                cell == self.position || self.food.contains(&cell) || self.hazards.contains(&cell);
            (!taken).then_some(cell)
        })
    }

    fn offset(&self, d_row: isize, d_col: isize) -> Option<Cell> {
        let row = self.position.0.checked_add_signed(d_row)?;
        let col = self.position.1.checked_add_signed(d_col)?;
        (row < self.config.rows && col < self.config.cols).then_some((row, col))
    }

    /// Scent in [0, 255] at a cell, summed over food patches.
    fn scent_at(&self, (row, col): Cell) -> f64 {
        let sigma_sq = self.config.scent_radius.powi(2);
        let total: f64 = self
            .food
            .iter()
            .map(|&(f_row, f_col)| {
                let dist_sq =
                    (row as f64 - f_row as f64).powi(2) + (col as f64 - f_col as f64).powi(2);
                (-dist_sq / (2.0 * sigma_sq)).exp()
            })
            .sum();
        (255.0 * total).clamp(0.0, 255.0)
    }

    fn elevation_at(&self, (row, col): Cell) -> f64 {
        self.hills
            .iter()
            .map(|hill| hill.elevation_at(row as f64, col as f64))
            .sum()
    }

    /// Square window of side `size` centred on the creature.
    ///
    /// Cells outside the meadow get `outside`.
    fn window(&self, size: usize, outside: f64, cell_value: impl Fn(Cell) -> f64) -> Grid {
        let reach = (size / 2) as isize;
        let mut grid = Grid::filled(size, size, outside);
        for (r, d_row) in (-reach..=reach).enumerate() {
            for (c, d_col) in (-reach..=reach).enumerate() {
                if let Some(cell) = self.offset(d_row, d_col) {
                    grid.set(r, c, cell_value(cell));
                }
            }
        }
        grid
    }

    fn marks(&self, cells: &BTreeSet<Cell>, outside: f64) -> Grid {
        self.window(5, outside, |cell| {
            if cells.contains(&cell) {
                PRESENCE_SENTINEL
            } else {
                0.0
            }
        })
    }
}

impl World for Meadow {
    fn sense(&self) -> SensorySnapshot {
        let here = self.elevation_at(self.position);
        let snapshot = SensorySnapshot::new(
            self.window(3, 0.0, |cell| self.scent_at(cell)),
            // the edge reads as a cliff
            self.window(5, here + 250.0, |cell| self.elevation_at(cell)),
            self.marks(&self.hazards, PRESENCE_SENTINEL),
        );
        if self.config.food_presence {
            snapshot.with_food_presence(self.marks(&self.food, 0.0))
        } else {
            snapshot
        }
    }

    fn step(&mut self, action: Action) -> StepOutcome {
        let mut delta_energy = 0.0;
        let mut delta_damage = 0.0;

        if self.is_alive() {
            let (d_row, d_col) = MOVES[action.index() % MOVES.len()];
            if let Some(target) = self.offset(d_row, d_col) {
                let climb = self.elevation_at(target) - self.elevation_at(self.position);
                delta_energy -= self.config.climb_cost * climb.max(0.0);
                self.position = target;
            }

            if self.food.remove(&self.position) {
                delta_energy += self.config.food_energy;
                self.score += self.config.food_energy;
                if let Some(cell) = self.free_cell() {
                    self.food.insert(cell);
                }
            }
            if self.hazards.contains(&self.position) {
                delta_damage -= self.config.hazard_damage;
            }

            self.energy += delta_energy - 1.0;
            self.health += delta_damage;
        }

        StepOutcome {
            reward: delta_energy + delta_damage - 1.0,
            alive: self.is_alive(),
            score: self.score,
        }
    }

    fn action_count(&self) -> usize {
        MOVES.len()
    }
}

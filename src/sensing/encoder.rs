//! Sensory encoder: raw grids to a compact, hashable discrete state.
//!
//! Each channel is handled independently:
//!
//! 1. The raw grid is reduced to a small summary grid by averaging (or
//!    sentinel-testing) fixed sub-regions.
//! 2. Every summary cell is digitized against the channel's sorted
//!    breakpoints. The bucket index is the number of breakpoints less than or
//!    equal to the value, so a value exactly on a breakpoint lands in the
//!    upper bucket. Indices range over `[0, len]`.
//! 3. Bucket indices are folded row-major into one integer with a mixed-radix
//!    sum, optionally skipping the exact centre cell.
//!
//! The channel codes, in a fixed order, form the [`DiscreteState`].

use serde::{Deserialize, Serialize};

use super::{
    grid::{Grid, Region},
    snapshot::SensorySnapshot,
};
use crate::{Error, Result, types::DiscreteState};

/// Value that marks a cell as "present" in danger and food-presence grids.
pub const PRESENCE_SENTINEL: f64 = 255.0;

/// Evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// A validated, sorted, non-empty list of digitization breakpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Breakpoints(Vec<f64>);

impl Breakpoints {
    /// Validate breakpoints for the named channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBreakpoints`] if the list is empty, holds a
    /// non-finite value, or is not sorted ascending.
    pub fn new(channel: &str, points: Vec<f64>) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidBreakpoints {
            channel: channel.to_string(),
            reason,
        };
        if points.is_empty() {
            return Err(invalid("breakpoint list is empty".to_string()));
        }
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(invalid(format!("breakpoint {bad} is not finite")));
        }
        if let Some(pair) = points.windows(2).find(|pair| pair[0] > pair[1]) {
            return Err(invalid(format!(
                "breakpoints are not sorted ({} > {})",
                pair[0], pair[1]
            )));
        }
        Ok(Self(points))
    }

    /// Bucket index of `value`: the count of breakpoints `<= value`.
    pub fn bucket(&self, value: f64) -> u64 {
        self.0.partition_point(|&point| point <= value) as u64
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Base used when folding bucket indices into a channel code.
///
/// Bucket indices span `len + 1` values. Only [`RadixMode::Buckets`] gives
/// every summary grid a distinct code; the two shorter radices reproduce the
/// layouts of earlier saved tables and may alias neighbouring states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadixMode {
    /// `len(space) + 1`
    #[default]
    Buckets,
    /// `len(space)`
    SpaceLength,
    /// `len(space) - 1`
    SpaceLengthMinusOne,
}

impl RadixMode {
    pub fn radix(self, space_len: usize) -> u64 {
        let len = space_len as u64;
        match self {
            RadixMode::Buckets => len + 1,
            RadixMode::SpaceLength => len,
            RadixMode::SpaceLengthMinusOne => len.saturating_sub(1),
        }
    }
}

/// How a summary cell is computed from its source region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reduction {
    /// Mean of the region.
    Mean,
    /// Mean of the region minus the raw grid's centre cell.
    Relief,
    /// 1.0 if any cell in the region equals the sentinel, else 0.0.
    Presence { sentinel: f64 },
}

/// Layout and digitization rules for one sensory channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpec {
    name: String,
    input_shape: (usize, usize),
    layout: Vec<Vec<Region>>,
    reduction: Reduction,
    space: Breakpoints,
    radix: u64,
    skip_center: bool,
}

impl ChannelSpec {
    /// Build and validate a channel.
    ///
    /// `layout` lists the source region of every summary cell, row by row.
    pub fn new(
        name: &str,
        input_shape: (usize, usize),
        layout: Vec<Vec<Region>>,
        reduction: Reduction,
        space: Breakpoints,
        radix_mode: RadixMode,
        skip_center: bool,
    ) -> Result<Self> {
        let invalid = |message: String| Error::InvalidConfiguration {
            message: format!("channel '{name}': {message}"),
        };

        let width = layout.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(invalid("summary layout is empty".to_string()));
        }
        if layout.iter().any(|row| row.len() != width) {
            return Err(invalid("summary layout is not rectangular".to_string()));
        }
        for region in layout.iter().flatten() {
            if region.is_empty() || !region.fits(input_shape) {
                return Err(invalid(format!(
                    "region {region:?} does not fit a {}x{} grid",
                    input_shape.0, input_shape.1
                )));
            }
        }

        let radix = radix_mode.radix(space.len());
        if radix < 2 {
            return Err(Error::InvalidBreakpoints {
                channel: name.to_string(),
                reason: format!("radix mode {radix_mode:?} yields radix {radix}"),
            });
        }

        let digits = layout.len() * width;
        if radix.checked_pow(digits as u32 + 1).is_none() {
            return Err(invalid(format!(
                "{digits} digits in radix {radix} overflow a 64-bit state code"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            input_shape,
            layout,
            reduction,
            space,
            radix,
            skip_center,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_shape(&self) -> (usize, usize) {
        self.input_shape
    }

    pub fn radix(&self) -> u64 {
        self.radix
    }

    pub fn summary_shape(&self) -> (usize, usize) {
        (self.layout.len(), self.layout[0].len())
    }

    /// Row-major index of the skipped centre cell, if any.
    ///
    /// Only odd-sized summaries have an exact centre.
    fn center_index(&self) -> Option<usize> {
        let (rows, cols) = self.summary_shape();
        (self.skip_center && rows % 2 == 1 && cols % 2 == 1).then_some((rows / 2) * cols + cols / 2)
    }

    /// Reduce a raw grid to the row-major summary grid.
    pub fn summarize(&self, grid: &Grid) -> Result<Vec<f64>> {
        if grid.shape() != self.input_shape {
            return Err(Error::GridShape {
                channel: self.name.clone(),
                expected: self.input_shape,
                got: grid.shape(),
            });
        }
        let center = grid.center().ok_or_else(|| Error::GridShape {
            channel: self.name.clone(),
            expected: self.input_shape,
            got: grid.shape(),
        })?;
        Ok(self
            .layout
            .iter()
            .flatten()
            .map(|region| match self.reduction {
                Reduction::Mean => grid.mean(region),
                Reduction::Relief => grid.mean(region) - center,
                Reduction::Presence { sentinel } => {
                    if grid.contains(region, sentinel) {
                        1.0
                    } else {
                        0.0
                    }
                }
            })
            .collect())
    }

    /// Fold bucket indices of a summary grid into one code.
    pub fn compose(&self, summary: &[f64]) -> u64 {
        let skipped = self.center_index();
        let mut code = 0u64;
        let mut weight = 1u64;
        for (index, &value) in summary.iter().enumerate() {
            if Some(index) == skipped {
                continue;
            }
            code += self.space.bucket(value) * weight;
            weight *= self.radix;
        }
        code
    }

    /// Encode a raw grid into this channel's code.
    pub fn encode(&self, grid: &Grid) -> Result<u64> {
        let summary = self.summarize(grid)?;
        Ok(self.compose(&summary))
    }
}

/// Serializable encoder parameters, persisted with the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Breakpoints for the food-scent channel
    pub scent_space: Vec<f64>,
    /// Breakpoints for the relative-elevation channel
    pub terrain_space: Vec<f64>,
    /// Breakpoints for presence channels (danger, food presence)
    pub presence_space: Vec<f64>,
    /// Value that marks presence in a grid cell
    pub sentinel: f64,
    /// Mixed-radix base selection
    pub radix: RadixMode,
    /// Whether the food-presence channel is part of the state
    pub food_presence: bool,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            scent_space: linspace(0.0, 255.0, 4),
            terrain_space: linspace(-125.0, 125.0, 4),
            presence_space: vec![0.0, 1.0],
            sentinel: PRESENCE_SENTINEL,
            radix: RadixMode::default(),
            food_presence: false,
        }
    }
}

fn quadrants() -> Vec<Vec<Region>> {
    vec![
        vec![Region::span(0..=2, 0..=2), Region::span(0..=2, 2..=4)],
        vec![Region::span(2..=4, 0..=2), Region::span(2..=4, 2..=4)],
    ]
}

fn neighbourhood() -> Vec<Vec<Region>> {
    let bands = [0..=1, 2..=2, 3..=4];
    bands
        .iter()
        .map(|rows| {
            bands
                .iter()
                .map(|cols| Region::span(rows.clone(), cols.clone()))
                .collect()
        })
        .collect()
}

/// Maps a [`SensorySnapshot`] to a [`DiscreteState`].
///
/// Channel order is food scent, danger, terrain, then food presence when
/// enabled. Encoding is a pure function of the snapshot and the settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SensoryEncoder {
    settings: EncoderSettings,
    food_scent: ChannelSpec,
    danger: ChannelSpec,
    terrain: ChannelSpec,
    food_presence: Option<ChannelSpec>,
}

impl SensoryEncoder {
    /// Build the standard channel layouts from settings.
    ///
    /// - food scent: 3x3 grid, four overlapping 2x2 means
    /// - danger: 5x5 grid, four overlapping 3x3 quadrants tested for the sentinel
    /// - terrain: 5x5 grid, 3x3 relief summary, centre skipped
    /// - food presence: same layout as danger
    pub fn new(settings: EncoderSettings) -> Result<Self> {
        let presence = Reduction::Presence {
            sentinel: settings.sentinel,
        };

        let food_scent = ChannelSpec::new(
            "food_scent",
            (3, 3),
            vec![
                vec![Region::span(0..=1, 0..=1), Region::span(0..=1, 1..=2)],
                vec![Region::span(1..=2, 0..=1), Region::span(1..=2, 1..=2)],
            ],
            Reduction::Mean,
            Breakpoints::new("food_scent", settings.scent_space.clone())?,
            settings.radix,
            false,
        )?;
        let danger = ChannelSpec::new(
            "danger",
            (5, 5),
            quadrants(),
            presence,
            Breakpoints::new("danger", settings.presence_space.clone())?,
            settings.radix,
            false,
        )?;
        let terrain = ChannelSpec::new(
            "terrain",
            (5, 5),
            neighbourhood(),
            Reduction::Relief,
            Breakpoints::new("terrain", settings.terrain_space.clone())?,
            settings.radix,
            true,
        )?;
        let food_presence = if settings.food_presence {
            Some(ChannelSpec::new(
                "food_presence",
                (5, 5),
                quadrants(),
                presence,
                Breakpoints::new("food_presence", settings.presence_space.clone())?,
                settings.radix,
                false,
            )?)
        } else {
            None
        };

        Ok(Self {
            settings,
            food_scent,
            danger,
            terrain,
            food_presence,
        })
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Number of components in every encoded state.
    pub fn channel_count(&self) -> usize {
        if self.food_presence.is_some() { 4 } else { 3 }
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelSpec> {
        [&self.food_scent, &self.danger, &self.terrain]
            .into_iter()
            .chain(self.food_presence.as_ref())
    }

    /// Encode a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GridShape`] if a grid has the wrong dimensions and
    /// [`Error::MissingChannel`] if food presence is enabled but absent.
    pub fn encode(&self, snapshot: &SensorySnapshot) -> Result<DiscreteState> {
        let mut components = Vec::with_capacity(self.channel_count());
        components.push(self.food_scent.encode(&snapshot.food_scent)?);
        components.push(self.danger.encode(&snapshot.danger)?);
        components.push(self.terrain.encode(&snapshot.elevation)?);
        if let Some(channel) = &self.food_presence {
            let grid = snapshot
                .food_presence
                .as_ref()
                .ok_or_else(|| Error::MissingChannel {
                    channel: channel.name().to_string(),
                })?;
            components.push(channel.encode(grid)?);
        }
        Ok(DiscreteState::new(components))
    }
}

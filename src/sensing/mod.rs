//! Sensory input and its discretization into table keys.

pub mod encoder;
pub mod grid;
pub mod snapshot;

pub use encoder::{
    Breakpoints, ChannelSpec, EncoderSettings, PRESENCE_SENTINEL, RadixMode, Reduction,
    SensoryEncoder, linspace,
};
pub use grid::{Grid, Region};
pub use snapshot::SensorySnapshot;

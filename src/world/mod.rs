//! Simulated worlds implementing the [`World`](crate::ports::World) port.

pub mod meadow;

pub use meadow::{Cell, Hill, Meadow, MeadowConfig};

//! Ports (trait boundaries) for external collaborators.
//!
//! The learning core owns these traits; storage formats, simulations and
//! training observers implement them.

pub mod observer;
pub mod repository;
pub mod world;

pub use observer::Observer;
pub use repository::AgentRepository;
pub use world::{StepOutcome, World};

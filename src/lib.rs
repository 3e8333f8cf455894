//! Tabular SARSA(λ) agent for a grid-world foraging sandbox
//!
//! This crate provides:
//! - A sensory encoder that turns fixed-shape sensor grids into discrete states
//! - A SARSA(λ) learner with accumulating eligibility traces and ε-greedy control
//! - Rate schedules that decay the learning and exploration rates per episode
//! - Persistence of the learned table in JSON or MessagePack, with atomic writes
//! - A meadow sandbox and an episode pipeline with autosave
//!
//! ```
//! use sarsamouse::{AgentConfig, App, InMemoryRepository};
//!
//! let app = App::for_testing()
//!     .with_repository(InMemoryRepository::new())
//!     .build();
//! let agent = app.create_agent(AgentConfig::default().with_seed(7)).unwrap();
//! assert!(agent.table().is_empty());
//! ```

pub mod adapters;
pub mod app;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod sarsa;
pub mod sensing;
pub mod types;
pub mod world;

pub use adapters::{InMemoryRepository, JsonRepository, MsgPackRepository};
pub use app::{AgentConfig, App};
pub use error::{Error, LoadError, Result};
pub use ports::{AgentRepository, Observer, StepOutcome, World};
pub use sarsa::{AgentParameters, RateSchedule, SarsaAgent, SavedSarsaAgent};
pub use sensing::{EncoderSettings, Grid, SensoryEncoder, SensorySnapshot};
pub use types::{Action, ActionSpace, DiscreteState};

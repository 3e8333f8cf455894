//! Tabular SARSA(λ) learning
//!
//! SARSA is on-policy TD control: the update bootstraps from the value of the
//! action the agent actually takes next, Q(s', a'), rather than the greedy
//! maximum. Eligibility traces spread each TD error back over every recently
//! visited pair, so a delayed reward reaches the decisions that led to it.
//!
//! ## Update
//!
//! | Step | Effect |
//! |------|--------|
//! | visit | e(s,a) ← e(s,a) + 1 |
//! | error | δ = r + γ Q(s',a') - Q(s,a) |
//! | sweep | Q ← Q + α δ e and e ← γ λ e for every live trace |
//! | clamp | e ← 0 once e ≤ cutoff |
//!
//! ## Usage Example
//!
//! ```no_run
//! use sarsamouse::sarsa::{AgentParameters, RateSchedule, SarsaAgent};
//! use sarsamouse::sensing::{EncoderSettings, SensoryEncoder};
//! use sarsamouse::types::DiscreteState;
//!
//! let encoder = SensoryEncoder::new(EncoderSettings::default())?;
//! let mut agent = SarsaAgent::new(
//!     AgentParameters::default(),
//!     encoder,
//!     RateSchedule::default(),
//! )?
//! .with_seed(42);
//!
//! let s = DiscreteState::new(vec![0, 0, 0]);
//! let s_next = DiscreteState::new(vec![1, 0, 0]);
//! let a = agent.select_action(&s)?;
//! let a_next = agent.select_action(&s_next)?;
//! agent.update(&s, a, &s_next, a_next, 1.0);
//! agent.decay(1)?;
//! # Ok::<(), sarsamouse::Error>(())
//! ```

pub mod agent;
pub mod schedule;
pub mod serialization;
pub mod value_table;

pub use agent::{AgentParameters, SarsaAgent};
pub use schedule::RateSchedule;
pub use serialization::{SaveMetadata, SavedSarsaAgent, TableColumns};
pub use value_table::{TableStats, TraceEntry, ValueTable};

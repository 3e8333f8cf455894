//! SARSA(λ) agent
//!
//! Chooses actions ε-greedily from a [`ValueTable`] and learns online from
//! explicit transitions, propagating every TD error through accumulating
//! eligibility traces over the whole table.

use std::path::Path;

use log::{debug, info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::AgentRepository,
    sarsa::{
        schedule::RateSchedule,
        serialization::{SaveMetadata, SavedSarsaAgent},
        value_table::{TableStats, ValueTable},
    },
    sensing::{SensoryEncoder, SensorySnapshot},
    types::{Action, ActionSpace, DiscreteState},
};

/// Scalar parameters of an agent, persisted with its table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentParameters {
    /// Learning rate α
    pub alpha: f64,
    /// Discount factor γ
    pub gamma: f64,
    /// Exploration rate ε
    pub epsilon: f64,
    /// Trace decay λ
    pub lambda: f64,
    /// Traces at or below this are clamped to zero
    pub eligibility_cutoff: f64,
    /// Size of the action alphabet
    pub action_count: usize,
    /// Episodes completed before this process started
    pub episodes: u64,
    /// Learning updates applied so far
    pub update_count: u64,
}

impl Default for AgentParameters {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            gamma: 0.9,
            epsilon: 1.0,
            lambda: 0.7,
            eligibility_cutoff: 1e-4,
            action_count: 8,
            episodes: 0,
            update_count: 0,
        }
    }
}

impl AgentParameters {
    /// Check ranges of all scalar parameters.
    pub fn validate(&self) -> Result<()> {
        let check = |name: &str, value: f64, low: f64, high: f64| {
            if value.is_finite() && value >= low && value <= high {
                Ok(())
            } else {
                Err(Error::InvalidConfiguration {
                    message: format!("{name} must be in [{low}, {high}], got {value}"),
                })
            }
        };
        check("alpha", self.alpha, 0.0, f64::MAX)?;
        check("gamma", self.gamma, 0.0, 1.0)?;
        check("epsilon", self.epsilon, 0.0, 1.0)?;
        check("lambda", self.lambda, 0.0, 1.0)?;
        check("eligibility_cutoff", self.eligibility_cutoff, 0.0, f64::MAX)?;
        ActionSpace::new(self.action_count).map(|_| ())
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Tabular SARSA(λ) agent
///
/// Owns its value table exclusively. All operations are synchronous and must
/// be called in sequence by a single driver.
#[derive(Debug, Clone)]
pub struct SarsaAgent {
    params: AgentParameters,
    actions: ActionSpace,
    encoder: SensoryEncoder,
    table: ValueTable,
    schedule: RateSchedule,
    last_episode: u64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl SarsaAgent {
    /// Create an agent with an empty table.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the parameters or schedule are out of
    /// range, or [`Error::EmptyActionSpace`] if `action_count` is zero.
    pub fn new(
        params: AgentParameters,
        encoder: SensoryEncoder,
        schedule: RateSchedule,
    ) -> Result<Self> {
        params.validate()?;
        schedule.validate()?;
        Self::from_parts(params, encoder, ValueTable::new(), schedule)
    }

    pub(crate) fn from_parts(
        params: AgentParameters,
        encoder: SensoryEncoder,
        table: ValueTable,
        schedule: RateSchedule,
    ) -> Result<Self> {
        Ok(Self {
            actions: ActionSpace::new(params.action_count)?,
            params,
            encoder,
            table,
            schedule,
            last_episode: 0,
            rng: build_rng(None),
            rng_seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_seed(seed);
        self
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    pub fn seed(&self) -> Option<u64> {
        self.rng_seed
    }

    /// Encode a sensory snapshot into a table key.
    pub fn encode(&self, snapshot: &SensorySnapshot) -> Result<DiscreteState> {
        self.encoder.encode(snapshot)
    }

    /// ε-greedy action selection at the current exploration rate
    pub fn select_action(&mut self, state: &DiscreteState) -> Result<Action> {
        if self.rng.random::<f64>() < self.params.epsilon {
            // Explore: uniform over the alphabet
            let index = self.rng.random_range(0..self.actions.len());
            self.actions.action(index)
        } else {
            self.greedy_action(state)
        }
    }

    /// Highest-valued action, ties broken uniformly at random.
    ///
    /// Unseen pairs count as 0.0.
    pub fn greedy_action(&mut self, state: &DiscreteState) -> Result<Action> {
        let values: Vec<(Action, f64)> = self
            .actions
            .iter()
            .map(|action| (action, self.table.value(state, action)))
            .collect();
        let best = values
            .iter()
            .map(|&(_, value)| value)
            .fold(f64::NEG_INFINITY, f64::max);
        let mut ties: Vec<Action> = values
            .iter()
            .filter(|&&(_, value)| value == best)
            .map(|&(action, _)| action)
            .collect();
        if ties.is_empty() {
            // every value is NaN
            ties = values.into_iter().map(|(action, _)| action).collect();
        }
        ties.choose(&mut self.rng)
            .copied()
            .ok_or(Error::EmptyActionSpace)
    }

    /// Encode a snapshot and select an action for it.
    pub fn act(&mut self, snapshot: &SensorySnapshot) -> Result<(DiscreteState, Action)> {
        let state = self.encode(snapshot)?;
        let action = self.select_action(&state)?;
        Ok((state, action))
    }

    /// SARSA(λ) update for one transition
    ///
    /// δ = r + γ Q(s',a') - Q(s,a), with Q(s,a) read before its trace is
    /// bumped. Then for every pair with a live trace:
    /// Q ← Q + α δ e and e ← γ λ e (clamped to 0 at the cutoff).
    ///
    /// No entry is created for (s', a'). Returns δ.
    pub fn update(
        &mut self,
        state: &DiscreteState,
        action: Action,
        next_state: &DiscreteState,
        next_action: Action,
        reward: f64,
    ) -> f64 {
        let current = self.table.visit(state, action);
        let next = self.table.value(next_state, next_action);
        let td_error = reward + self.params.gamma * next - current;

        self.table.sweep(
            td_error,
            self.params.alpha,
            self.params.gamma * self.params.lambda,
            self.params.eligibility_cutoff,
        );
        self.params.update_count += 1;
        td_error
    }

    /// Advance alpha and epsilon after `episode` completed episodes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScheduleExhausted`] when the schedule would drive the
    /// rates to zero or below; the rates are left unchanged in that case.
    pub fn decay(&mut self, episode: u64) -> Result<()> {
        self.last_episode = episode;
        let rate = self.schedule.rate(self.params.episodes, episode)?;
        self.params.alpha = rate;
        self.params.epsilon = rate;
        debug!(
            "episode {} (cumulative {}): alpha = epsilon = {rate:.5}",
            episode,
            self.cumulative_episodes()
        );
        Ok(())
    }

    /// Episodes completed across all runs, including this one.
    pub fn cumulative_episodes(&self) -> u64 {
        self.params.episodes + self.last_episode
    }

    pub fn parameters(&self) -> &AgentParameters {
        &self.params
    }

    pub fn epsilon(&self) -> f64 {
        self.params.epsilon
    }

    pub fn alpha(&self) -> f64 {
        self.params.alpha
    }

    pub fn update_count(&self) -> u64 {
        self.params.update_count
    }

    pub fn action_space(&self) -> ActionSpace {
        self.actions
    }

    pub fn encoder(&self) -> &SensoryEncoder {
        &self.encoder
    }

    pub fn schedule(&self) -> RateSchedule {
        self.schedule
    }

    /// Read-only view of the value table, for diagnostics.
    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn stats(&self) -> TableStats {
        self.table.stats()
    }

    /// Persist the agent through `repository`.
    ///
    /// Failure leaves both the in-memory agent and any previous file intact.
    pub fn save(&self, repository: &dyn AgentRepository, path: &Path) -> Result<()> {
        let record = SavedSarsaAgent::from_agent(self, SaveMetadata::now(self.rng_seed));
        repository.save(&record, path)?;
        info!(
            "saved agent to {} ({} entries, {} episodes)",
            path.display(),
            self.table.len(),
            self.cumulative_episodes()
        );
        Ok(())
    }

    /// Replace this agent with the record at `path`, if it is valid.
    ///
    /// Any read, parse or schema failure is logged and leaves the agent
    /// untouched. Returns whether a record was restored.
    pub fn load_or_keep(&mut self, repository: &dyn AgentRepository, path: &Path) -> bool {
        let restored = repository
            .load(path)
            .and_then(|record| record.to_agent(self.schedule, self.rng_seed));
        match restored {
            Ok(agent) => {
                info!(
                    "loaded agent from {} ({} entries, {} episodes)",
                    path.display(),
                    agent.table.len(),
                    agent.cumulative_episodes()
                );
                *self = agent;
                true
            }
            Err(e) => {
                warn!(
                    "starting from defaults, could not load {} ({} error): {e}",
                    path.display(),
                    e.kind()
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensing::EncoderSettings;

    fn agent_with(params: AgentParameters) -> SarsaAgent {
        let encoder = SensoryEncoder::new(EncoderSettings::default()).unwrap();
        SarsaAgent::new(params, encoder, RateSchedule::default())
            .unwrap()
            .with_seed(7)
    }

    fn state(components: &[u64]) -> DiscreteState {
        DiscreteState::new(components.to_vec())
    }

    #[test]
    fn test_rejects_zero_actions() {
        let encoder = SensoryEncoder::new(EncoderSettings::default()).unwrap();
        let params = AgentParameters {
            action_count: 0,
            ..AgentParameters::default()
        };
        assert!(matches!(
            SarsaAgent::new(params, encoder, RateSchedule::default()),
            Err(Error::EmptyActionSpace)
        ));
    }

    #[test]
    fn test_rejects_out_of_range_gamma() {
        let encoder = SensoryEncoder::new(EncoderSettings::default()).unwrap();
        let params = AgentParameters {
            gamma: 1.5,
            ..AgentParameters::default()
        };
        assert!(SarsaAgent::new(params, encoder, RateSchedule::default()).is_err());
    }

    #[test]
    fn test_single_update_scenario() {
        let mut agent = agent_with(AgentParameters::default());
        let s0 = state(&[0, 0, 0]);
        let s1 = state(&[1, 0, 0]);

        let td_error = agent.update(&s0, Action::new(0), &s1, Action::new(1), 1.0);

        assert_eq!(td_error, 1.0);
        let entry = agent.table().get(&s0, Action::new(0)).unwrap();
        assert_eq!(entry.value, 1.0);
        assert!((entry.eligibility - 0.63).abs() < 1e-12);
        // lookahead pair is read, never stored
        assert!(agent.table().get(&s1, Action::new(1)).is_none());
        assert_eq!(agent.update_count(), 1);
    }

    #[test]
    fn test_trace_propagates_delayed_reward() {
        let mut agent = agent_with(AgentParameters::default());
        let s0 = state(&[0, 0, 0]);
        let s1 = state(&[1, 0, 0]);
        let s2 = state(&[2, 0, 0]);

        agent.update(&s0, Action::new(0), &s1, Action::new(0), 0.0);
        agent.update(&s1, Action::new(0), &s2, Action::new(0), 1.0);

        // s0 earns credit through its decayed trace: 1.0 * 1.0 * 0.63
        let early = agent.table().get(&s0, Action::new(0)).unwrap();
        assert!((early.value - 0.63).abs() < 1e-12);
        assert!((early.eligibility - 0.63 * 0.63).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_prefers_highest_value() {
        let mut agent = agent_with(AgentParameters {
            epsilon: 0.0,
            ..AgentParameters::default()
        });
        let s = state(&[3, 1, 4]);
        agent.update(&s, Action::new(5), &s, Action::new(5), 10.0);
        for _ in 0..20 {
            assert_eq!(agent.select_action(&s).unwrap(), Action::new(5));
        }
    }

    #[test]
    fn test_full_exploration_covers_alphabet() {
        let mut agent = agent_with(AgentParameters::default());
        let s = state(&[0, 0, 0]);
        let mut seen = [false; 8];
        for _ in 0..500 {
            seen[agent.select_action(&s).unwrap().index()] = true;
        }
        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn test_decay_sets_both_rates() {
        let mut agent = agent_with(AgentParameters::default());
        agent.decay(32).unwrap();
        assert!((agent.alpha() - 0.5).abs() < 1e-12);
        assert_eq!(agent.alpha(), agent.epsilon());
        assert_eq!(agent.cumulative_episodes(), 32);
    }

    #[test]
    fn test_exhausted_linear_schedule_keeps_rates() {
        let encoder = SensoryEncoder::new(EncoderSettings::default()).unwrap();
        let mut agent = SarsaAgent::new(
            AgentParameters::default(),
            encoder,
            RateSchedule::Linear { horizon: 2 },
        )
        .unwrap();
        agent.decay(1).unwrap();
        assert!((agent.epsilon() - 0.5).abs() < 1e-12);
        assert!(matches!(
            agent.decay(2),
            Err(Error::ScheduleExhausted { .. })
        ));
        assert!((agent.epsilon() - 0.5).abs() < 1e-12);
    }
}

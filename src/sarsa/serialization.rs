//! Persisted form of a SARSA(λ) agent
//!
//! The value table is stored column-wise: three sequences of equal length
//! holding state keys, action keys and `[value, eligibility]` pairs.

use std::{
    collections::HashSet,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::LoadError,
    sarsa::{
        agent::{AgentParameters, SarsaAgent},
        schedule::RateSchedule,
        value_table::{TraceEntry, ValueTable},
    },
    sensing::{EncoderSettings, SensoryEncoder},
    types::{Action, DiscreteState},
};

/// Bookkeeping written alongside the agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveMetadata {
    /// Seconds since the Unix epoch
    #[serde(default)]
    pub saved_at: Option<u64>,
    /// Seed of the agent's random source, if it was seeded
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SaveMetadata {
    pub fn now(seed: Option<u64>) -> Self {
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|elapsed| elapsed.as_secs());
        Self { saved_at, seed }
    }
}

/// Value table as three parallel columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableColumns {
    pub state_keys: Vec<DiscreteState>,
    pub action_keys: Vec<Action>,
    pub entries: Vec<TraceEntry>,
}

impl TableColumns {
    pub fn from_table(table: &ValueTable) -> Self {
        let mut rows: Vec<_> = table.iter().collect();
        // stable file contents across saves
        rows.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut columns = Self {
            state_keys: Vec::with_capacity(rows.len()),
            action_keys: Vec::with_capacity(rows.len()),
            entries: Vec::with_capacity(rows.len()),
        };
        for (state, action, entry) in rows {
            columns.state_keys.push(state.clone());
            columns.action_keys.push(action);
            columns.entries.push(*entry);
        }
        columns
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Zip the columns back into a table, checking every row.
    fn into_table(
        self,
        action_count: usize,
        channels: usize,
    ) -> std::result::Result<ValueTable, LoadError> {
        if self.state_keys.len() != self.action_keys.len()
            || self.state_keys.len() != self.entries.len()
        {
            return Err(LoadError::schema(format!(
                "table columns differ in length: {} states, {} actions, {} entries",
                self.state_keys.len(),
                self.action_keys.len(),
                self.entries.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.entries.len());
        let mut table = ValueTable::new();
        for ((state, action), entry) in self
            .state_keys
            .into_iter()
            .zip(self.action_keys)
            .zip(self.entries)
        {
            if action.index() >= action_count {
                return Err(LoadError::schema(format!(
                    "action {action} is out of range for {action_count} actions"
                )));
            }
            if state.channels() != channels {
                return Err(LoadError::schema(format!(
                    "state {state} has {} components, expected {channels}",
                    state.channels()
                )));
            }
            if !entry.value.is_finite() || !entry.eligibility.is_finite() {
                return Err(LoadError::schema(format!(
                    "non-finite entry for ({state}, {action})"
                )));
            }
            if entry.eligibility < 0.0 {
                return Err(LoadError::schema(format!(
                    "negative eligibility for ({state}, {action})"
                )));
            }
            if !seen.insert((state.clone(), action)) {
                return Err(LoadError::schema(format!(
                    "duplicate entry for ({state}, {action})"
                )));
            }
            table.upsert(state, action, entry);
        }
        Ok(table)
    }
}

/// Serializable representation of a SARSA(λ) agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSarsaAgent {
    /// Version of the save format
    pub version: u32,
    /// Scalar parameters; `episodes` holds the cumulative episode count
    pub parameters: AgentParameters,
    /// Breakpoints and layout options of the state encoder
    pub encoder: EncoderSettings,
    pub table: TableColumns,
    #[serde(default)]
    pub metadata: SaveMetadata,
}

impl SavedSarsaAgent {
    pub const VERSION: u32 = 1;

    pub fn from_agent(agent: &SarsaAgent, metadata: SaveMetadata) -> Self {
        let mut parameters = agent.parameters().clone();
        parameters.episodes = agent.cumulative_episodes();
        Self {
            version: Self::VERSION,
            parameters,
            encoder: agent.encoder().settings().clone(),
            table: TableColumns::from_table(agent.table()),
            metadata,
        }
    }

    /// Rebuild an agent, validating the whole record first.
    ///
    /// The schedule is not part of the record and is supplied by the caller.
    /// `seed` overrides the seed stored in the metadata.
    pub fn to_agent(
        &self,
        schedule: RateSchedule,
        seed: Option<u64>,
    ) -> std::result::Result<SarsaAgent, LoadError> {
        if self.version != Self::VERSION {
            return Err(LoadError::schema(format!(
                "unsupported save format version {}, expected {}",
                self.version,
                Self::VERSION
            )));
        }
        self.parameters
            .validate()
            .map_err(|e| LoadError::schema(e.to_string()))?;
        let encoder = SensoryEncoder::new(self.encoder.clone())
            .map_err(|e| LoadError::schema(e.to_string()))?;
        let table = self
            .table
            .clone()
            .into_table(self.parameters.action_count, encoder.channel_count())?;

        let agent = SarsaAgent::from_parts(self.parameters.clone(), encoder, table, schedule)
            .map_err(|e| LoadError::schema(e.to_string()))?;
        Ok(match seed.or(self.metadata.seed) {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        })
    }
}

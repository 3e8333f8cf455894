//! Common test utilities for the sarsamouse test suite.
//!
//! This module provides agent and snapshot builders shared across tests.

#![allow(dead_code)]

use sarsamouse::{
    AgentParameters, DiscreteState, EncoderSettings, Grid, RateSchedule, SarsaAgent,
    SensoryEncoder, SensorySnapshot,
};

/// Default parameters with exploration switched off.
pub fn greedy_parameters() -> AgentParameters {
    AgentParameters {
        epsilon: 0.0,
        ..AgentParameters::default()
    }
}

/// Agent with the default encoder and a fixed seed.
pub fn seeded_agent(params: AgentParameters, seed: u64) -> SarsaAgent {
    let encoder = SensoryEncoder::new(EncoderSettings::default()).unwrap();
    SarsaAgent::new(params, encoder, RateSchedule::default())
        .unwrap()
        .with_seed(seed)
}

/// Snapshot with uniform grids of the given values.
pub fn uniform_snapshot(scent: f64, elevation: f64, danger: f64) -> SensorySnapshot {
    SensorySnapshot::new(
        Grid::filled(3, 3, scent),
        Grid::filled(5, 5, elevation),
        Grid::filled(5, 5, danger),
    )
}

/// A distinct three-channel state per index.
pub fn state(index: u64) -> DiscreteState {
    DiscreteState::new(vec![index, 0, 0])
}

/// Pearson chi-squared statistic against a uniform expectation.
pub fn chi_squared_uniform(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    let expected = total as f64 / counts.len() as f64;
    counts
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

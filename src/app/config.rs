//! Configuration types for agent creation.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    sarsa::{AgentParameters, RateSchedule},
    sensing::{EncoderSettings, RadixMode, SensoryEncoder},
};

/// Configuration for creating a SARSA(λ) agent.
///
/// Every field has a default, so a config file only needs to name what it
/// changes.
///
/// # Examples
///
/// ```
/// use sarsamouse::app::AgentConfig;
/// use sarsamouse::sarsa::RateSchedule;
///
/// let config = AgentConfig::new()
///     .with_seed(42)
///     .with_lambda(0.9)
///     .with_schedule(RateSchedule::Linear { horizon: 50_000 });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Initial learning rate
    pub alpha: f64,
    /// Discount factor
    pub gamma: f64,
    /// Initial exploration rate
    pub epsilon: f64,
    /// Trace decay
    pub lambda: f64,
    /// Traces at or below this are clamped to zero
    pub eligibility_cutoff: f64,
    /// Number of discrete actions
    pub action_count: usize,
    /// State encoder layout and breakpoints
    pub encoder: EncoderSettings,
    /// Rate schedule applied after each episode
    pub schedule: RateSchedule,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    /// Create a configuration with the compiled-in defaults.
    ///
    /// - alpha 1.0, gamma 0.9, epsilon 1.0, lambda 0.7, cutoff 1e-4
    /// - 8 actions
    /// - power-law schedule with exponent 0.2
    /// - Seed: None (non-deterministic)
    pub fn new() -> Self {
        let params = AgentParameters::default();
        Self {
            alpha: params.alpha,
            gamma: params.gamma,
            epsilon: params.epsilon,
            lambda: params.lambda,
            eligibility_cutoff: params.eligibility_cutoff,
            action_count: params.action_count,
            encoder: EncoderSettings::default(),
            schedule: RateSchedule::default(),
            seed: None,
        }
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config file {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_eligibility_cutoff(mut self, cutoff: f64) -> Self {
        self.eligibility_cutoff = cutoff;
        self
    }

    pub fn with_action_count(mut self, count: usize) -> Self {
        self.action_count = count;
        self
    }

    pub fn with_encoder(mut self, encoder: EncoderSettings) -> Self {
        self.encoder = encoder;
        self
    }

    /// Select how channel digits are combined.
    pub fn with_radix(mut self, radix: RadixMode) -> Self {
        self.encoder.radix = radix;
        self
    }

    /// Add the optional food-presence channel to the state.
    pub fn with_food_presence(mut self, enabled: bool) -> Self {
        self.encoder.food_presence = enabled;
        self
    }

    pub fn with_schedule(mut self, schedule: RateSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Scalar parameters of a fresh agent.
    pub fn parameters(&self) -> AgentParameters {
        AgentParameters {
            alpha: self.alpha,
            gamma: self.gamma,
            epsilon: self.epsilon,
            lambda: self.lambda,
            eligibility_cutoff: self.eligibility_cutoff,
            action_count: self.action_count,
            episodes: 0,
            update_count: 0,
        }
    }

    /// Check every parameter, the schedule and the encoder layout.
    pub fn validate(&self) -> Result<()> {
        self.parameters().validate()?;
        self.schedule.validate()?;
        SensoryEncoder::new(self.encoder.clone()).map(|_| ())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults_match_agent_parameters() {
        let config = AgentConfig::default();
        assert_eq!(config.parameters(), AgentParameters::default());
        assert_eq!(config.encoder.radix, RadixMode::Buckets);
        assert!(!config.encoder.food_presence);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent.json");
        std::fs::write(
            &path,
            r#"{"lambda": 0.5, "seed": 9, "schedule": {"kind": "linear", "horizon": 100}}"#,
        )
        .unwrap();

        let config = AgentConfig::from_file(&path).unwrap();

        assert_eq!(config.lambda, 0.5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.schedule, RateSchedule::Linear { horizon: 100 });
        assert_eq!(config.gamma, 0.9);
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent.json");
        std::fs::write(&path, r#"{"epsilon": 2.0}"#).unwrap();

        assert!(matches!(
            AgentConfig::from_file(&path),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_breakpoints() {
        let mut settings = EncoderSettings::default();
        settings.terrain_space = vec![];
        assert!(AgentConfig::new().with_encoder(settings).validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = AgentConfig::new()
            .with_alpha(0.5)
            .with_gamma(0.8)
            .with_epsilon(0.1)
            .with_eligibility_cutoff(1e-3)
            .with_action_count(4)
            .with_radix(RadixMode::SpaceLength)
            .with_food_presence(true);
        let params = config.parameters();
        assert_eq!(params.alpha, 0.5);
        assert_eq!(params.gamma, 0.8);
        assert_eq!(params.epsilon, 0.1);
        assert_eq!(params.eligibility_cutoff, 1e-3);
        assert_eq!(params.action_count, 4);
        assert!(config.validate().is_ok());
    }
}

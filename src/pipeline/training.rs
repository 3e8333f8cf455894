//! Episode-driven training pipeline for a SARSA(λ) agent

use std::{path::PathBuf, sync::Arc};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{AgentRepository, Observer, World},
    sarsa::SarsaAgent,
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of episodes to run
    pub episodes: usize,

    /// Save the agent after every episode index divisible by this (0 disables)
    pub autosave_interval: usize,

    /// An episode ends once its score exceeds this
    pub score_cap: f64,

    /// Optional hard limit on steps per episode
    pub max_steps: Option<usize>,

    /// Random seed for the agent
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 20_000,
            autosave_interval: 10,
            score_cap: 5000.0,
            max_steps: None,
            seed: None,
        }
    }
}

/// What happened during one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Zero-based episode index within this run
    pub episode: usize,
    /// Transitions learned from
    pub steps: usize,
    /// Final score reported by the world
    pub score: f64,
    /// Sum of rewards
    pub total_reward: f64,
    /// Whether the creature was alive when the episode ended
    pub survived: bool,
    /// Exploration rate in effect during the episode
    pub epsilon: f64,
    /// Value-table size at the end of the episode
    pub table_entries: usize,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes completed
    pub episodes: usize,

    /// Total transitions learned from
    pub total_steps: usize,

    /// Best episode score
    pub high_score: f64,

    /// Mean episode score
    pub mean_score: f64,

    /// Episodes that ended with the creature dead
    pub deaths: usize,

    /// Whether the rate schedule ran out before all episodes were run
    pub schedule_exhausted: bool,

    /// Exploration rate after the last decay
    pub final_epsilon: f64,

    /// Value-table size at the end of the run
    pub table_entries: usize,
}

impl TrainingResult {
    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Training pipeline for one agent in a sequence of freshly built worlds
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
    checkpoint: Option<(Arc<dyn AgentRepository + Send + Sync>, PathBuf)>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
            checkpoint: None,
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Persist the agent to `path` on autosave and at the end of the run
    pub fn with_checkpoint(
        mut self,
        repository: Arc<dyn AgentRepository + Send + Sync>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.checkpoint = Some((repository, path.into()));
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run all episodes.
    ///
    /// `world_factory` receives the episode index and builds that episode's
    /// world. After each episode the agent's rates are decayed with
    /// `decay(k + 1)`; an exhausted schedule ends training early.
    pub fn run<W, F>(&mut self, agent: &mut SarsaAgent, mut world_factory: F) -> Result<TrainingResult>
    where
        W: World,
        F: FnMut(usize) -> W,
    {
        if let Some(seed) = self.config.seed {
            agent.set_seed(seed);
        }

        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        let mut episodes = 0;
        let mut total_steps = 0;
        let mut high_score = 0.0_f64;
        let mut score_sum = 0.0;
        let mut deaths = 0;
        let mut schedule_exhausted = false;

        for k in 0..self.config.episodes {
            let mut world = world_factory(k);
            let summary = self.run_episode(k, agent, &mut world)?;

            episodes += 1;
            total_steps += summary.steps;
            high_score = high_score.max(summary.score);
            score_sum += summary.score;
            if !summary.survived {
                deaths += 1;
            }
            debug!(
                "episode {k}: {} steps, score {:.1}, reward {:.1}, high score {high_score:.1}",
                summary.steps, summary.score, summary.total_reward
            );

            if self.config.autosave_interval > 0 && k % self.config.autosave_interval == 0 {
                self.save_checkpoint(agent);
            }

            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }

            match agent.decay(k as u64 + 1) {
                Ok(()) => {}
                Err(Error::ScheduleExhausted { episode }) => {
                    info!("rate schedule exhausted after {episode} episodes, stopping");
                    schedule_exhausted = true;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        self.save_checkpoint(agent);

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        Ok(TrainingResult {
            episodes,
            total_steps,
            high_score,
            mean_score: if episodes > 0 {
                score_sum / episodes as f64
            } else {
                0.0
            },
            deaths,
            schedule_exhausted,
            final_epsilon: agent.epsilon(),
            table_entries: agent.table().len(),
        })
    }

    fn run_episode<W: World>(
        &mut self,
        episode: usize,
        agent: &mut SarsaAgent,
        world: &mut W,
    ) -> Result<EpisodeSummary> {
        if world.action_count() != agent.action_space().len() {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "world understands {} actions but the agent has {}",
                    world.action_count(),
                    agent.action_space().len()
                ),
            });
        }

        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let epsilon = agent.epsilon();
        let (mut state, mut action) = agent.act(&world.sense())?;
        let mut steps = 0;
        let mut total_reward = 0.0;

        let (score, survived) = loop {
            let outcome = world.step(action);
            let (next_state, next_action) = agent.act(&world.sense())?;
            agent.update(&state, action, &next_state, next_action, outcome.reward);

            steps += 1;
            total_reward += outcome.reward;
            for observer in &mut self.observers {
                observer.on_step(episode, steps, outcome.reward)?;
            }

            state = next_state;
            action = next_action;

            let out_of_steps = self.config.max_steps.is_some_and(|limit| steps >= limit);
            if !outcome.alive || outcome.score > self.config.score_cap || out_of_steps {
                break (outcome.score, outcome.alive);
            }
        };

        Ok(EpisodeSummary {
            episode,
            steps,
            score,
            total_reward,
            survived,
            epsilon,
            table_entries: agent.table().len(),
        })
    }

    fn save_checkpoint(&self, agent: &SarsaAgent) {
        if let Some((repository, path)) = &self.checkpoint {
            if let Err(e) = agent.save(repository.as_ref(), path) {
                warn!("failed to save agent to {}: {e}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{
        adapters::InMemoryRepository,
        app::{AgentConfig, App},
        ports::StepOutcome,
        sarsa::RateSchedule,
        sensing::{Grid, SensorySnapshot},
        types::Action,
    };

    /// Creature on a line; action 0 steps right, anything else hurts.
    struct Corridor {
        position: usize,
        length: usize,
        score: f64,
    }

    impl Corridor {
        fn new(length: usize) -> Self {
            Self {
                position: 0,
                length,
                score: 0.0,
            }
        }
    }

    impl World for Corridor {
        fn sense(&self) -> SensorySnapshot {
            let scent = 255.0 * self.position as f64 / self.length as f64;
            SensorySnapshot::new(
                Grid::filled(3, 3, scent),
                Grid::filled(5, 5, 0.0),
                Grid::filled(5, 5, 0.0),
            )
        }

        fn step(&mut self, action: Action) -> StepOutcome {
            let reward = if action.index() == 0 {
                self.position += 1;
                self.score += 1.0;
                0.0
            } else {
                -1.0
            };
            StepOutcome {
                reward,
                alive: self.position < self.length,
                score: self.score,
            }
        }

        fn action_count(&self) -> usize {
            2
        }
    }

    fn agent(schedule: RateSchedule) -> SarsaAgent {
        App::new()
            .create_agent(
                AgentConfig::new()
                    .with_action_count(2)
                    .with_schedule(schedule)
                    .with_seed(1),
            )
            .unwrap()
    }

    #[test]
    fn test_training_pipeline() {
        let config = TrainingConfig {
            episodes: 5,
            max_steps: Some(200),
            seed: Some(42),
            ..TrainingConfig::default()
        };
        let mut pipeline = TrainingPipeline::new(config);
        let mut agent = agent(RateSchedule::default());

        let result = pipeline.run(&mut agent, |_| Corridor::new(4)).unwrap();

        assert_eq!(result.episodes, 5);
        assert!(result.total_steps >= 20);
        assert!(!agent.table().is_empty());
        assert_eq!(agent.cumulative_episodes(), 5);
        assert!(agent.epsilon() < 1.0);
    }

    #[test]
    fn test_score_cap_ends_episode() {
        let config = TrainingConfig {
            episodes: 1,
            score_cap: 2.0,
            max_steps: Some(500),
            ..TrainingConfig::default()
        };
        let mut pipeline = TrainingPipeline::new(config);
        let mut agent = agent(RateSchedule::default());

        let result = pipeline.run(&mut agent, |_| Corridor::new(100)).unwrap();

        assert_eq!(result.high_score, 3.0);
        assert_eq!(result.deaths, 0);
    }

    #[test]
    fn test_exhausted_schedule_stops_cleanly() {
        let config = TrainingConfig {
            episodes: 10,
            max_steps: Some(50),
            ..TrainingConfig::default()
        };
        let mut pipeline = TrainingPipeline::new(config);
        let mut agent = agent(RateSchedule::Linear { horizon: 3 });

        let result = pipeline.run(&mut agent, |_| Corridor::new(3)).unwrap();

        assert!(result.schedule_exhausted);
        assert_eq!(result.episodes, 3);
    }

    #[test]
    fn test_checkpoint_saves_agent() {
        let repo = InMemoryRepository::new();
        let config = TrainingConfig {
            episodes: 2,
            max_steps: Some(50),
            ..TrainingConfig::default()
        };
        let mut pipeline =
            TrainingPipeline::new(config).with_checkpoint(Arc::new(repo.clone()), "mouse.json");
        let mut agent = agent(RateSchedule::default());

        pipeline.run(&mut agent, |_| Corridor::new(3)).unwrap();

        let record = repo.load(Path::new("mouse.json")).unwrap();
        assert_eq!(record.parameters.episodes, 2);
    }

    #[test]
    fn test_action_count_mismatch_is_error() {
        let mut pipeline = TrainingPipeline::new(TrainingConfig {
            episodes: 1,
            ..TrainingConfig::default()
        });
        let mut agent = App::new().create_agent(AgentConfig::new()).unwrap();

        assert!(pipeline.run(&mut agent, |_| Corridor::new(3)).is_err());
    }
}

//! Observer port - abstraction for training observation
//!
//! Observers collect data during training without coupling the episode loop
//! to specific output formats.

use crate::{Result, pipeline::EpisodeSummary};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(episode, step, reward)` - For each transition
///    - `on_episode_end(summary)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use sarsamouse::{pipeline::EpisodeSummary, ports::Observer};
///
/// struct DeathCounter {
///     deaths: usize,
/// }
///
/// impl Observer for DeathCounter {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> sarsamouse::Result<()> {
///         if !summary.survived {
///             self.deaths += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode starts.
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after every learning update.
    fn on_step(&mut self, _episode: usize, _step: usize, _reward: f64) -> Result<()> {
        Ok(())
    }

    /// Called when an episode ends, before the rate schedule advances.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}

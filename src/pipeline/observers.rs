//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{Result, pipeline::EpisodeSummary, ports::Observer};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    high_score: f64,
    deaths: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            high_score: 0.0,
            deaths: 0,
        }
    }

    fn message(&self) -> String {
        format!("{:.0} deaths:{}", self.high_score, self.deaths)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (high:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.high_score = self.high_score.max(summary.score);
        if !summary.survived {
            self.deaths += 1;
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks per-episode scores and lengths
pub struct MetricsObserver {
    scores: Vec<f64>,
    steps: Vec<usize>,
    deaths: usize,
    negative_rewards: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self {
            scores: Vec::new(),
            steps: Vec::new(),
            deaths: 0,
            negative_rewards: 0,
        }
    }

    /// Scores of all finished episodes, in order
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Get current survival rate
    pub fn survival_rate(&self) -> f64 {
        if self.scores.is_empty() {
            0.0
        } else {
            1.0 - self.deaths as f64 / self.scores.len() as f64
        }
    }

    /// Mean score over the most recent `window` episodes
    pub fn recent_mean_score(&self, window: usize) -> f64 {
        let start = self.scores.len().saturating_sub(window);
        let recent = &self.scores[start..];
        if recent.is_empty() {
            0.0
        } else {
            recent.iter().sum::<f64>() / recent.len() as f64
        }
    }

    /// Get average episode length
    pub fn avg_episode_length(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.steps.iter().sum::<usize>() as f64 / self.steps.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.scores.len(),
            deaths: self.deaths,
            survival_rate: self.survival_rate(),
            high_score: self.scores.iter().copied().fold(0.0, f64::max),
            mean_score: self.recent_mean_score(self.scores.len()),
            avg_episode_length: self.avg_episode_length(),
            negative_rewards: self.negative_rewards,
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub deaths: usize,
    pub survival_rate: f64,
    pub high_score: f64,
    pub mean_score: f64,
    pub avg_episode_length: f64,
    /// Steps whose reward was below zero
    pub negative_rewards: usize,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, _episode: usize, _step: usize, reward: f64) -> Result<()> {
        if reward < 0.0 {
            self.negative_rewards += 1;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.scores.push(summary.score);
        self.steps.push(summary.steps);
        if !summary.survived {
            self.deaths += 1;
        }
        Ok(())
    }
}

/// JSONL observer - Exports episode summaries to JSON Lines format
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, summary)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::BufRead;

    use tempfile::TempDir;

    use super::*;

    fn summary(episode: usize, score: f64, survived: bool) -> EpisodeSummary {
        EpisodeSummary {
            episode,
            steps: 10 * (episode + 1),
            score,
            total_reward: -5.0,
            survived,
            epsilon: 1.0,
            table_entries: 3,
        }
    }

    #[test]
    fn test_metrics_observer() {
        let mut observer = MetricsObserver::new();

        assert_eq!(observer.survival_rate(), 0.0);

        observer.on_episode_end(&summary(0, 10.0, false)).unwrap();
        observer.on_episode_end(&summary(1, 40.0, true)).unwrap();
        observer.on_episode_end(&summary(2, 25.0, false)).unwrap();

        let metrics = observer.summary();
        assert_eq!(metrics.total_episodes, 3);
        assert_eq!(metrics.deaths, 2);
        assert_eq!(metrics.high_score, 40.0);
        assert!((metrics.survival_rate - 1.0 / 3.0).abs() < 1e-12);
        assert!((metrics.mean_score - 25.0).abs() < 1e-12);
        assert!((metrics.avg_episode_length - 20.0).abs() < 1e-12);
        assert!((observer.recent_mean_score(2) - 32.5).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_counts_negative_rewards() {
        let mut observer = MetricsObserver::new();
        for (step, reward) in [-1.0, 0.0, 3.0, -2.0].into_iter().enumerate() {
            observer.on_step(0, step, reward).unwrap();
        }
        assert_eq!(observer.summary().negative_rewards, 2);
    }

    #[test]
    fn test_jsonl_observer_writes_one_line_per_episode() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("episodes.jsonl");

        let mut observer = JsonlObserver::new(&path).unwrap();
        observer.on_episode_end(&summary(0, 1.0, false)).unwrap();
        observer.on_episode_end(&summary(1, 2.0, true)).unwrap();
        observer.on_training_end().unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<EpisodeSummary> = std::io::BufReader::new(file)
            .lines()
            .map(|line| serde_json::from_str(&line.unwrap()).unwrap())
            .collect();
        assert_eq!(lines, vec![summary(0, 1.0, false), summary(1, 2.0, true)]);
    }
}

//! Training pipeline abstractions
//!
//! This module provides:
//! - An episode driver that runs an agent through a sequence of worlds
//! - Observers recording progress, metrics and episode logs

pub mod observers;
pub mod training;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{EpisodeSummary, TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::Observer;

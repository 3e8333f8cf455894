//! Shared configuration types for CLI commands

use std::sync::Arc;

use clap::ValueEnum;

use crate::{
    adapters::{JsonRepository, MsgPackRepository},
    ports::AgentRepository,
};

/// On-disk encoding of a saved agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StoreFormat {
    /// Indented JSON
    #[default]
    Json,
    /// MessagePack
    Msgpack,
}

impl StoreFormat {
    pub fn repository(self) -> Arc<dyn AgentRepository + Send + Sync> {
        match self {
            StoreFormat::Json => Arc::new(JsonRepository::pretty()),
            StoreFormat::Msgpack => Arc::new(MsgPackRepository::new()),
        }
    }
}

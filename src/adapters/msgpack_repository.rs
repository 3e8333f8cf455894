//! MessagePack implementation of the agent repository.
//!
//! This adapter implements the AgentRepository port using rmp_serde for
//! compact binary serialization.

use std::{fs::File, io::BufReader, path::Path};

use crate::{
    Result,
    adapters::atomic_file::write_atomically,
    error::{Error, LoadError},
    ports::AgentRepository,
    sarsa::SavedSarsaAgent,
};

/// MessagePack-based agent repository.
///
/// Records are written with field names so that they stay readable by newer
/// versions of the record struct.
///
/// # Examples
///
/// ```no_run
/// use sarsamouse::adapters::MsgPackRepository;
/// use sarsamouse::ports::AgentRepository;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let record = repo.load(Path::new("mouse.msgpack"))?;
/// repo.save(&record, Path::new("mouse.backup.msgpack"))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl AgentRepository for MsgPackRepository {
    fn save(&self, record: &SavedSarsaAgent, path: &Path) -> Result<()> {
        write_atomically(path, |writer| {
            rmp_serde::encode::write_named(writer, record).map_err(|e| {
                Error::SerializationContext {
                    operation: "serialize agent to MessagePack".to_string(),
                    message: e.to_string(),
                }
            })
        })
    }

    fn load(&self, path: &Path) -> std::result::Result<SavedSarsaAgent, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        rmp_serde::decode::from_read(BufReader::new(file)).map_err(|e| LoadError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        sarsa::{AgentParameters, RateSchedule, SaveMetadata, SarsaAgent},
        sensing::{EncoderSettings, SensoryEncoder},
        types::{Action, DiscreteState},
    };

    fn record() -> SavedSarsaAgent {
        let encoder = SensoryEncoder::new(EncoderSettings::default()).unwrap();
        let mut agent =
            SarsaAgent::new(AgentParameters::default(), encoder, RateSchedule::default()).unwrap();
        let s0 = DiscreteState::new(vec![0, 0, 1]);
        let s1 = DiscreteState::new(vec![4, 1, 0]);
        agent.update(&s0, Action::new(3), &s1, Action::new(6), -2.0);
        SavedSarsaAgent::from_agent(&agent, SaveMetadata::now(Some(5)))
    }

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("mouse.msgpack");

        let repo = MsgPackRepository::new();
        let saved = record();

        repo.save(&saved, &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.load(Path::new("/tmp/nonexistent_12345.msgpack"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_load_truncated_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mouse.msgpack");
        let repo = MsgPackRepository::new();
        repo.save(&record(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        assert!(matches!(repo.load(&path), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.save(&record(), Path::new("/invalid_dir_12345/file.msgpack"));
        assert!(result.is_err());
    }
}

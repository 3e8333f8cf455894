//! JSON implementation of the agent repository.
//!
//! This is the default store: records are human-readable and diffable.

use std::{fs::File, io::BufReader, path::Path};

use crate::{
    Result,
    adapters::atomic_file::write_atomically,
    error::LoadError,
    ports::AgentRepository,
    sarsa::SavedSarsaAgent,
};

/// Default file name for a persisted agent.
pub const DEFAULT_AGENT_FILE: &str = "mouse.json";

/// JSON-based agent repository.
///
/// # Examples
///
/// ```no_run
/// use sarsamouse::adapters::JsonRepository;
/// use sarsamouse::ports::AgentRepository;
/// use std::path::Path;
///
/// let repo = JsonRepository::new();
/// let record = repo.load(Path::new("mouse.json"))?;
/// println!("{} entries", record.table.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepository {
    pretty: bool,
}

impl JsonRepository {
    /// Create a repository writing compact JSON.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Create a repository writing indented JSON.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl AgentRepository for JsonRepository {
    fn save(&self, record: &SavedSarsaAgent, path: &Path) -> Result<()> {
        write_atomically(path, |writer| {
            if self.pretty {
                serde_json::to_writer_pretty(writer, record)?;
            } else {
                serde_json::to_writer(writer, record)?;
            }
            Ok(())
        })
    }

    fn load(&self, path: &Path) -> std::result::Result<SavedSarsaAgent, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            if e.is_io() {
                LoadError::Io {
                    path: path.display().to_string(),
                    source: e.into(),
                }
            } else {
                LoadError::Parse {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })
    }
}

//! Repository port for agent persistence.
//!
//! This module defines the trait boundary between the learning core and the
//! storage format of saved agents.

use std::path::Path;

use crate::{Result, error::LoadError, sarsa::SavedSarsaAgent};

/// Port for persisting and loading agent records.
///
/// Implementations must replace the target wholesale: a save that fails part
/// way leaves the previously persisted record intact.
///
/// # Examples
///
/// ```no_run
/// use sarsamouse::adapters::JsonRepository;
/// use sarsamouse::ports::AgentRepository;
/// use sarsamouse::sarsa::SavedSarsaAgent;
/// use std::path::Path;
///
/// fn backup<R: AgentRepository>(repo: &R, record: &SavedSarsaAgent) -> sarsamouse::Result<()> {
///     repo.save(record, Path::new("mouse.backup.json"))
/// }
/// ```
pub trait AgentRepository {
    /// Save an agent record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The destination directory cannot be written to
    /// - Serialization fails
    /// - The finished file cannot be moved into place
    fn save(&self, record: &SavedSarsaAgent, path: &Path) -> Result<()>;

    /// Load an agent record.
    ///
    /// # Errors
    ///
    /// Returns a classified [`LoadError`]:
    /// - `Io` if the file does not exist or cannot be read
    /// - `Parse` if the bytes are not a valid record in this format
    fn load(&self, path: &Path) -> std::result::Result<SavedSarsaAgent, LoadError>;
}

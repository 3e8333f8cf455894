//! Dependency injection container for the application.
//!
//! The container owns infrastructure dependencies and provides factory
//! methods for creating agents.

use std::{path::Path, sync::Arc};

use super::config::AgentConfig;
use crate::{
    Result,
    adapters::JsonRepository,
    ports::AgentRepository,
    sarsa::SarsaAgent,
    sensing::SensoryEncoder,
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use sarsamouse::app::{App, AgentConfig};
///
/// let app = App::new();
/// let agent = app.create_agent(AgentConfig::new().with_seed(42))?;
/// # Ok::<(), sarsamouse::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use sarsamouse::app::App;
/// use sarsamouse::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for agent persistence
    agent_repository: Arc<dyn AgentRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses:
    /// - `JsonRepository` for agent persistence
    /// - No default seed (non-deterministic RNG)
    pub fn new() -> Self {
        Self {
            agent_repository: Arc::new(JsonRepository::new()),
            default_seed: None,
        }
    }

    /// Create an app persisting through `repository`.
    pub fn with_repository(repository: Arc<dyn AgentRepository + Send + Sync>) -> Self {
        Self {
            agent_repository: repository,
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the agent repository.
    pub fn agent_repository(&self) -> Arc<dyn AgentRepository + Send + Sync> {
        Arc::clone(&self.agent_repository)
    }

    /// Create a fresh agent with an empty table.
    pub fn create_agent(&self, config: AgentConfig) -> Result<SarsaAgent> {
        config.validate()?;
        let encoder = SensoryEncoder::new(config.encoder.clone())?;
        let agent = SarsaAgent::new(config.parameters(), encoder, config.schedule)?;

        // Apply seed from config or use container default
        Ok(match config.seed.or(self.default_seed) {
            Some(seed) => agent.with_seed(seed),
            None => agent,
        })
    }

    /// Create an agent and restore it from `path` if a valid record is there.
    ///
    /// A missing or invalid record is logged and the fresh agent is returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sarsamouse::app::{App, AgentConfig};
    /// use std::path::Path;
    ///
    /// let app = App::new();
    /// let agent = app.load_or_create(AgentConfig::new(), Path::new("mouse.json"))?;
    /// # Ok::<(), sarsamouse::Error>(())
    /// ```
    pub fn load_or_create(&self, config: AgentConfig, path: &Path) -> Result<SarsaAgent> {
        let mut agent = self.create_agent(config)?;
        agent.load_or_keep(self.agent_repository.as_ref(), path);
        Ok(agent)
    }

    /// Save an agent to persistent storage.
    pub fn save_agent(&self, agent: &SarsaAgent, path: &Path) -> Result<()> {
        agent.save(self.agent_repository.as_ref(), path)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
pub struct AppBuilder {
    agent_repository: Option<Arc<dyn AgentRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self {
            agent_repository: None,
            default_seed: None,
        }
    }

    /// Set a custom agent repository.
    pub fn with_repository<R: AgentRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.agent_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no repository was specified, uses `JsonRepository` by default.
    pub fn build(self) -> App {
        App {
            agent_repository: self
                .agent_repository
                .unwrap_or_else(|| Arc::new(JsonRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

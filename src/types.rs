//! Newtype wrappers for actions and discrete states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An action index in `[0, action_count)`.
///
/// The agent treats actions as an opaque alphabet; what an action means is up
/// to the world that executes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(usize);

impl Action {
    /// Create an action without checking it against an action space.
    pub const fn new(index: usize) -> Self {
        Action(index)
    }

    /// Get the inner index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<Action> for usize {
    fn from(action: Action) -> Self {
        action.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The finite alphabet of actions available to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSpace {
    count: usize,
}

impl ActionSpace {
    /// Create an action space with `count` actions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EmptyActionSpace`] if `count` is zero.
    pub fn new(count: usize) -> Result<Self, crate::Error> {
        if count == 0 {
            return Err(crate::Error::EmptyActionSpace);
        }
        Ok(Self { count })
    }

    /// Number of actions in the alphabet.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false; an action space is never empty once constructed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Validate an index against this space.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAction`] if `index >= len()`.
    pub fn action(&self, index: usize) -> Result<Action, crate::Error> {
        if index < self.count {
            Ok(Action(index))
        } else {
            Err(crate::Error::InvalidAction {
                action: index,
                action_count: self.count,
            })
        }
    }

    pub fn contains(&self, action: Action) -> bool {
        action.0 < self.count
    }

    /// Iterate over every action in index order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + use<> {
        (0..self.count).map(Action)
    }
}

/// A discrete sensory state: one bucket code per sensory channel.
///
/// Components are ordered by channel (food scent, danger, terrain, and food
/// presence when enabled). Equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscreteState(Vec<u64>);

impl DiscreteState {
    pub fn new(components: Vec<u64>) -> Self {
        DiscreteState(components)
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }

    /// Number of channels encoded in this state.
    pub fn channels(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<u64>> for DiscreteState {
    fn from(components: Vec<u64>) -> Self {
        DiscreteState(components)
    }
}

impl fmt::Display for DiscreteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{component}")?;
        }
        write!(f, ")")
    }
}

//! Subcommands of the `sarsamouse` binary

pub mod inspect;
pub mod train;

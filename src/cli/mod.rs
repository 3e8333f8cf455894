//! CLI infrastructure
//!
//! This module provides the command-line interface for training an agent in
//! the meadow sandbox and inspecting saved agents.

pub mod commands;
pub mod config;
pub mod output;

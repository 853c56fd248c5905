//! # otterconnect
//!
//! A Connect Four environment with tabular reinforcement learning agents
//! trained by self-play.
//!
//! ## Modules
//!
//! - [`game`]: board, player, state and the episode-recording environment
//! - [`ai`]: agent traits, random baseline, max and expectation bootstrap agents
//! - [`training`]: self-play driver, evaluation, metrics
//! - [`checkpoint`]: table persistence and versioning
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;

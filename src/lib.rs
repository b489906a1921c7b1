//! Cyber Guardians
//!
//! A narrative cybersecurity awareness quiz. Players work through a chain of
//! themed levels, each a shuffled set of threat scenarios answered under a
//! three-life limit, earning badges as levels are completed.
//!
//! # Game Mechanics
//!
//! - **Levels**: strictly ordered; finishing one unlocks the next
//! - **Scenarios**: one correct response per threat, points for getting it right
//! - **Lives**: three wrong answers end the attempt
//! - **Badges**: derived from how many levels have been completed
//!
//! # Architecture
//!
//! - `data` - Content catalog and player/level records
//! - `game` - Scenario selection, session and progression engines
//! - `persist` - Snapshot save/load with expiry
//! - `config` - TOML configuration
//! - `tui` - Terminal user interface with ratatui

pub mod config;
pub mod data;
pub mod game;
pub mod persist;
pub mod tui;

pub use data::*;
pub use game::Game;

/// Game version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the game
pub type Result<T> = anyhow::Result<T>;

/// Custom error types
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Save file corrupted: {0}")]
    CorruptedSave(String),

    #[error("Level not found: {0}")]
    UnknownLevel(u32),

    #[error("Invalid content catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

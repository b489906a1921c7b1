//! Content and record types for the campaign
//!
//! Defines levels, scenarios, badges, tips, and the player record.

pub mod badges;
pub mod catalog;
pub mod levels;
pub mod scenarios;
pub mod tips;
pub mod user;

pub use badges::*;
pub use catalog::*;
pub use levels::*;
pub use scenarios::*;
pub use tips::*;
pub use user::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playable characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterType {
    #[default]
    Student,
    Intern,
    Cyberbot,
}

impl CharacterType {
    pub const ALL: [CharacterType; 3] = [
        CharacterType::Student,
        CharacterType::Intern,
        CharacterType::Cyberbot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CharacterType::Student => "Alex the Student",
            CharacterType::Intern => "Sam the Intern",
            CharacterType::Cyberbot => "CyberBot",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CharacterType::Student => "A curious student learning cybersecurity",
            CharacterType::Intern => "A tech intern protecting the company",
            CharacterType::Cyberbot => "An AI guardian of digital security",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CharacterType::Student => "🎓",
            CharacterType::Intern => "💼",
            CharacterType::Cyberbot => "🤖",
        }
    }
}

impl std::fmt::Display for CharacterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Backdrop a level is played against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneType {
    Office,
    Lab,
    Terminal,
    Home,
    Cafe,
    ServerRoom,
    ControlCenter,
}

impl std::fmt::Display for SceneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneType::Office => write!(f, "Office"),
            SceneType::Lab => write!(f, "Lab"),
            SceneType::Terminal => write!(f, "Terminal"),
            SceneType::Home => write!(f, "Home"),
            SceneType::Cafe => write!(f, "Cafe"),
            SceneType::ServerRoom => write!(f, "Server Room"),
            SceneType::ControlCenter => write!(f, "Control Center"),
        }
    }
}

/// A unique identifier wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id(pub Uuid);

impl Id {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

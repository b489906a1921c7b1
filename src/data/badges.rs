//! Badge definitions
//!
//! Badges are never awarded as events. A player holds a badge exactly
//! when their completed-level count meets its requirement.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    /// Minimum number of completed levels
    pub requirement: usize,
}

impl Badge {
    fn define(id: &str, name: &str, description: &str, icon: &str, color: &str, requirement: usize) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            requirement,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self.icon.as_str() {
            "Shield" => "🛡",
            "Sword" => "⚔",
            "Crown" => "👑",
            _ => "★",
        }
    }
}

pub fn reference_badges() -> Vec<Badge> {
    vec![
        Badge::define("survivor", "Survivor", "Complete your first 3 levels", "Shield", "#00FF88", 3),
        Badge::define("warrior", "Warrior", "Complete 5 levels with high scores", "Sword", "#00D4FF", 5),
        Badge::define("king", "King", "Master all cybersecurity levels", "Crown", "#8B5FFF", 7),
    ]
}

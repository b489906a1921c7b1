//! Player record and campaign progress

use super::{Badge, CharacterType, Id};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The long-lived player record
///
/// Only the progression engine mutates score, badges and completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub total_score: u32,
    pub badges: Vec<Badge>,
    pub completed_levels: BTreeSet<u32>,
    /// Highest level reached, starting at 1
    pub current_level: u32,
    pub selected_character: CharacterType,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            id: Id::new(),
            name: name.to_string(),
            total_score: 0,
            badges: Vec::new(),
            completed_levels: BTreeSet::new(),
            current_level: 1,
            selected_character: CharacterType::default(),
        }
    }

    pub fn completed_count(&self) -> usize {
        self.completed_levels.len()
    }

    pub fn has_completed(&self, level_id: u32) -> bool {
        self.completed_levels.contains(&level_id)
    }

    /// Record a completed level; returns false if it was already recorded
    pub fn record_completion(&mut self, level_id: u32) -> bool {
        self.completed_levels.insert(level_id)
    }

    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.badges.iter().any(|b| b.id == badge_id)
    }

    /// Share of the campaign completed, 0-100
    pub fn completion_percent(&self, level_count: usize) -> u8 {
        if level_count == 0 {
            return 0;
        }
        ((self.completed_count().min(level_count) * 100) / level_count) as u8
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new("CyberGuardian")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_is_recorded_once() {
        let mut user = User::default();
        assert!(user.record_completion(2));
        assert!(!user.record_completion(2));
        assert_eq!(user.completed_count(), 1);
        assert!(user.has_completed(2));
    }

    #[test]
    fn completion_percent_handles_empty_campaign() {
        let mut user = User::default();
        assert_eq!(user.completion_percent(0), 0);
        user.record_completion(1);
        user.record_completion(2);
        assert_eq!(user.completion_percent(4), 50);
    }
}

//! Campaign progression
//!
//! Applies a successful level run to the long-lived records: level
//! completion and best score, unlocking the next level, total score,
//! and the badge set derived from completed-level count.

use crate::config::ScorePolicy;
use crate::data::{Badge, Level, User};
use crate::{GameError, Result};
use tracing::info;

/// Badges held with `completed` levels done: exactly those whose requirement is met
pub fn earned_badges(badges: &[Badge], completed: usize) -> Vec<Badge> {
    badges
        .iter()
        .filter(|b| b.requirement <= completed)
        .cloned()
        .collect()
}

/// The next badge still to earn, lowest requirement first
pub fn next_badge(badges: &[Badge], completed: usize) -> Option<&Badge> {
    badges
        .iter()
        .filter(|b| b.requirement > completed)
        .min_by(|a, b| a.requirement.cmp(&b.requirement).then_with(|| a.id.cmp(&b.id)))
}

/// Mark a level completed, keeping the higher of old and new best score
pub fn update_level_completion(levels: &mut [Level], level_id: u32, score: u32) -> bool {
    match levels.iter_mut().find(|l| l.id == level_id) {
        Some(level) => {
            level.is_completed = true;
            level.best_score = level.best_score.max(score);
            true
        }
        None => false,
    }
}

/// Unlock the level directly after `completed_level_id`, returning its id
pub fn unlock_next_level(levels: &mut [Level], completed_level_id: u32) -> Option<u32> {
    let next_id = completed_level_id.checked_add(1)?;
    let next = levels.iter_mut().find(|l| l.id == next_id)?;
    next.is_unlocked = true;
    Some(next.id)
}

/// What a completion changed, for the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressionOutcome {
    pub unlocked: Option<u32>,
    /// First badge that was not held before, lowest requirement first
    pub newly_earned: Option<Badge>,
}

#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    badges: Vec<Badge>,
    policy: ScorePolicy,
}

impl ProgressionEngine {
    pub fn new(badges: &[Badge], policy: ScorePolicy) -> Self {
        let mut badges = badges.to_vec();
        badges.sort_by(|a, b| a.requirement.cmp(&b.requirement).then_with(|| a.id.cmp(&b.id)));
        Self { badges, policy }
    }

    pub fn policy(&self) -> ScorePolicy {
        self.policy
    }

    /// Apply a completed run of `level_id` with `score`
    pub fn complete_level(
        &self,
        levels: &mut [Level],
        user: &mut User,
        level_id: u32,
        score: u32,
    ) -> Result<ProgressionOutcome> {
        if !update_level_completion(levels, level_id, score) {
            return Err(GameError::UnknownLevel(level_id).into());
        }
        let unlocked = unlock_next_level(levels, level_id);

        user.record_completion(level_id);

        match self.policy {
            ScorePolicy::Accumulate => user.total_score += score,
            ScorePolicy::BestOnly => {
                let best_total: u32 = levels
                    .iter()
                    .filter(|l| user.has_completed(l.id))
                    .map(|l| l.best_score)
                    .sum();
                user.total_score = user.total_score.max(best_total);
            }
        }

        let max_level = levels.iter().map(|l| l.id).max().unwrap_or(1);
        user.current_level = user.current_level.max(level_id.saturating_add(1)).min(max_level);

        let newly_earned = self.refresh_badges(user);

        info!(
            level = level_id,
            score,
            total = user.total_score,
            completed = user.completed_count(),
            "level completed"
        );
        if let Some(ref badge) = newly_earned {
            info!(badge = %badge.id, "badge earned");
        }

        Ok(ProgressionOutcome {
            unlocked,
            newly_earned,
        })
    }

    /// Recompute the user's badges from their completed count.
    ///
    /// Returns the first badge gained that was not held before.
    pub fn refresh_badges(&self, user: &mut User) -> Option<Badge> {
        let earned = earned_badges(&self.badges, user.completed_count());
        let newly_earned = earned.iter().find(|b| !user.has_badge(&b.id)).cloned();
        user.badges = earned;
        newly_earned
    }

    pub fn next_badge(&self, user: &User) -> Option<&Badge> {
        next_badge(&self.badges, user.completed_count())
    }
}

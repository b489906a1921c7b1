//! The content catalog
//!
//! Immutable campaign content: level definitions, scenario pools,
//! badges and tips. Built once at startup and shared read-only.

use super::*;
use crate::{GameError, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Catalog {
    levels: Vec<Level>,
    pools: BTreeMap<u32, Vec<Scenario>>,
    badges: Vec<Badge>,
    tips: Vec<TipCategory>,
}

impl Catalog {
    pub fn new(
        levels: Vec<Level>,
        pools: BTreeMap<u32, Vec<Scenario>>,
        mut badges: Vec<Badge>,
        tips: Vec<TipCategory>,
    ) -> Self {
        badges.sort_by(|a, b| a.requirement.cmp(&b.requirement).then_with(|| a.id.cmp(&b.id)));
        Self {
            levels,
            pools,
            badges,
            tips,
        }
    }

    /// The reference seven-level campaign
    pub fn standard() -> Self {
        Self::new(
            reference_levels(),
            reference_pools(),
            reference_badges(),
            reference_tips(),
        )
    }

    /// Level definitions without scenario pools attached
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, level_id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == level_id)
    }

    /// Scenario pool for a level; unknown ids have an empty pool
    pub fn scenario_pool(&self, level_id: u32) -> &[Scenario] {
        self.pools.get(&level_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Badges ordered by requirement, lowest first
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn tips(&self) -> &[TipCategory] {
        &self.tips
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn max_level_id(&self) -> u32 {
        self.levels.iter().map(|l| l.id).max().unwrap_or(1)
    }

    /// Level records for a new player: progress reset, pools attached
    pub fn fresh_levels(&self) -> Vec<Level> {
        self.levels
            .iter()
            .map(|level| Level {
                scenarios: self.scenario_pool(level.id).to_vec(),
                is_unlocked: level.id == 1,
                is_completed: false,
                best_score: 0,
                ..level.clone()
            })
            .collect()
    }

    /// Check level ordering and every scenario's option invariants
    pub fn validate(&self) -> Result<()> {
        for (i, level) in self.levels.iter().enumerate() {
            let expected = i as u32 + 1;
            if level.id != expected {
                return Err(GameError::InvalidCatalog(format!(
                    "level at position {} has id {}, expected {}",
                    i, level.id, expected
                ))
                .into());
            }
        }

        for (level_id, pool) in &self.pools {
            if self.level(*level_id).is_none() {
                return Err(GameError::InvalidCatalog(format!(
                    "scenario pool for unknown level {}",
                    level_id
                ))
                .into());
            }
            for scenario in pool {
                scenario.check().map_err(GameError::InvalidCatalog)?;
            }
        }

        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_validates() {
        let catalog = Catalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.level_count(), 7);
        assert_eq!(catalog.max_level_id(), 7);
        assert_eq!(catalog.tips().len(), 4);
    }

    #[test]
    fn unknown_level_has_empty_pool() {
        let catalog = Catalog::standard();
        assert!(catalog.scenario_pool(42).is_empty());
        assert!(catalog.level(42).is_none());
    }

    #[test]
    fn badges_are_sorted_by_requirement() {
        let mut badges = reference_badges();
        badges.reverse();
        let catalog = Catalog::new(reference_levels(), BTreeMap::new(), badges, Vec::new());
        let requirements: Vec<usize> = catalog.badges().iter().map(|b| b.requirement).collect();
        assert_eq!(requirements, vec![3, 5, 7]);
    }

    #[test]
    fn fresh_levels_attach_pools_and_lock_all_but_first() {
        let levels = Catalog::standard().fresh_levels();
        assert_eq!(levels[0].scenarios.len(), 4);
        assert_eq!(levels[0].max_score(), 400);
        assert!(levels[0].is_unlocked);
        assert!(levels[1..].iter().all(|l| !l.is_unlocked));
    }

    #[test]
    fn validate_rejects_gaps_in_level_ids() {
        let mut levels = reference_levels();
        levels.remove(2);
        let catalog = Catalog::new(levels, BTreeMap::new(), Vec::new(), Vec::new());
        assert!(catalog.validate().is_err());
    }
}

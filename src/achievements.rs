use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const SPEED_DEMON_CPS: f64 = 10.0;
pub const CLICK_MASTER_CPS: f64 = 15.0;
pub const PERSISTENT_RUNS: usize = 10;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Achievement {
    SpeedDemon,
    ClickMaster,
    Persistent,
}

impl Achievement {
    pub const ALL: [Achievement; 3] = [
        Achievement::SpeedDemon,
        Achievement::ClickMaster,
        Achievement::Persistent,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::SpeedDemon => "Speed Demon: Achieved 10+ CPS!",
            Achievement::ClickMaster => "Click Master: Achieved 15+ CPS!",
            Achievement::Persistent => "Persistent: Completed 10 tests!",
        }
    }

    fn is_earned(&self, cps: f64, recorded_runs: usize) -> bool {
        match self {
            Achievement::SpeedDemon => cps >= SPEED_DEMON_CPS,
            Achievement::ClickMaster => cps >= CLICK_MASTER_CPS,
            Achievement::Persistent => recorded_runs >= PERSISTENT_RUNS,
        }
    }
}

/// Unlocked achievements. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementSet {
    unlocked: BTreeSet<Achievement>,
}

impl AchievementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.unlocked.iter().copied()
    }

    /// Achievements the given run would newly unlock. Does not modify the set.
    pub fn evaluate(&self, cps: f64, recorded_runs: usize) -> Vec<Achievement> {
        Achievement::ALL
            .into_iter()
            .filter(|a| !self.contains(*a) && a.is_earned(cps, recorded_runs))
            .collect()
    }

    /// Evaluate and add. Returns only the ids that were not already present.
    pub fn unlock_earned(&mut self, cps: f64, recorded_runs: usize) -> Vec<Achievement> {
        let fresh = self.evaluate(cps, recorded_runs);
        self.unlocked.extend(fresh.iter().copied());
        fresh
    }
}

impl FromIterator<Achievement> for AchievementSet {
    fn from_iter<T: IntoIterator<Item = Achievement>>(iter: T) -> Self {
        Self {
            unlocked: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_thresholds_unlocks_nothing() {
        let set = AchievementSet::new();
        assert!(set.evaluate(1.2, 1).is_empty());
        assert!(set.evaluate(9.99, 9).is_empty());
    }

    #[test]
    fn speed_thresholds_are_inclusive() {
        let set = AchievementSet::new();
        assert_eq!(set.evaluate(10.0, 1), vec![Achievement::SpeedDemon]);
        assert_eq!(
            set.evaluate(15.0, 1),
            vec![Achievement::SpeedDemon, Achievement::ClickMaster]
        );
    }

    #[test]
    fn all_three_can_fire_together() {
        let set = AchievementSet::new();
        assert_eq!(set.evaluate(16.0, 10), Achievement::ALL.to_vec());
    }

    #[test]
    fn evaluate_is_pure() {
        let set = AchievementSet::new();
        let _ = set.evaluate(20.0, 10);
        assert!(set.is_empty());
    }

    #[test]
    fn click_master_unlocks_once() {
        let mut set = AchievementSet::new();
        let mut unlocked_click_master = 0;
        for _ in 0..5 {
            unlocked_click_master += set
                .unlock_earned(15.5, 1)
                .into_iter()
                .filter(|a| *a == Achievement::ClickMaster)
                .count();
        }
        assert_eq!(unlocked_click_master, 1);
        assert!(set.contains(Achievement::ClickMaster));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_matches_stored_id() {
        for a in Achievement::ALL {
            let stored = serde_json::to_string(&a).unwrap();
            assert_eq!(stored, format!("\"{}\"", a));
        }
        assert_eq!(Achievement::Persistent.to_string(), "persistent");
    }

    #[test]
    fn set_serializes_as_list_of_ids() {
        let set: AchievementSet = [Achievement::Persistent, Achievement::SpeedDemon]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["speed_demon","persistent"]"#);
    }
}

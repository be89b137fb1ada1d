//! Application context shared by the controller glue and the presentation
//! layer: settings, score ledger, and unlocked achievements, backed by a
//! key/value store.
//!
//! Loading never fails: missing or malformed values fall back to defaults.
//! Every mutation writes the affected keys straight back to the store; a
//! failed write is logged and the in-memory state stays authoritative.

use chrono::Local;
use serde::Deserialize;

use crate::achievements::{Achievement, AchievementSet};
use crate::events::GameEvent;
use crate::ledger::{Ledger, ScoreRecord};
use crate::settings::{IdleClickPolicy, Settings, Theme, Toggle};
use crate::store::KeyValueStore;

/// Store keys. `SCORES` holds a JSON list of `{"cps", "timestamp"}` objects
/// (RFC 3339 timestamps); a plain list of decimals is also accepted on load.
/// `ACHIEVEMENTS` is a JSON list of ids, the rest are plain strings.
pub mod keys {
    pub const SCORES: &str = "scores";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const THEME: &str = "theme";
    pub const SOUND_ENABLED: &str = "sound_enabled";
    pub const SPACEBAR_ENABLED: &str = "spacebar_enabled";
    pub const CLICK_EFFECTS_ENABLED: &str = "click_effects_enabled";
    pub const ACHIEVEMENTS_ENABLED: &str = "achievements_enabled";
}

fn toggle_key(toggle: Toggle) -> &'static str {
    match toggle {
        Toggle::Sound => keys::SOUND_ENABLED,
        Toggle::Spacebar => keys::SPACEBAR_ENABLED,
        Toggle::ClickEffects => keys::CLICK_EFFECTS_ENABLED,
        Toggle::Achievements => keys::ACHIEVEMENTS_ENABLED,
    }
}

/// Scores were once stored as bare numbers; accept both shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredScore {
    Record(ScoreRecord),
    Plain(f64),
}

pub struct AppContext {
    settings: Settings,
    ledger: Ledger,
    achievements: AchievementSet,
    store: Box<dyn KeyValueStore>,
}

impl AppContext {
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let mut settings = Settings::default();
        for toggle in Toggle::ALL {
            if let Some(value) = read(store.as_ref(), toggle_key(toggle)) {
                settings.set(toggle, parse_flag(&value, settings.get(toggle)));
            }
        }
        if let Some(value) = read(store.as_ref(), keys::THEME) {
            match Theme::parse(&value) {
                Some(theme) => settings.theme = theme,
                None => tracing::warn!(%value, "unknown theme in store, using default"),
            }
        }

        let ledger = read(store.as_ref(), keys::SCORES)
            .map(|raw| parse_scores(&raw))
            .unwrap_or_default();
        let achievements = read(store.as_ref(), keys::ACHIEVEMENTS)
            .map(|raw| parse_achievements(&raw))
            .unwrap_or_default();

        tracing::info!(
            scores = ledger.len(),
            achievements = achievements.len(),
            theme = %settings.theme,
            "context loaded"
        );

        Self {
            settings,
            ledger,
            achievements,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn achievements(&self) -> &AchievementSet {
        &self.achievements
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
        self.write(keys::THEME, &theme.to_string());
    }

    pub fn set_toggle(&mut self, toggle: Toggle, value: bool) {
        self.settings.set(toggle, value);
        self.write(toggle_key(toggle), if value { "true" } else { "false" });
    }

    /// Flip a boolean setting and return its new value.
    pub fn toggle(&mut self, toggle: Toggle) -> bool {
        let value = !self.settings.get(toggle);
        self.set_toggle(toggle, value);
        value
    }

    pub fn set_idle_click_policy(&mut self, policy: IdleClickPolicy) {
        self.settings.idle_click_policy = policy;
    }

    /// Record a finished run and unlock whatever it earned. Achievements are
    /// evaluated and stored regardless of whether they will be displayed.
    pub fn record_session(&mut self, cps: f64) -> Vec<GameEvent> {
        self.ledger.record_result(cps);
        self.flush_scores();

        let fresh = self.achievements.unlock_earned(cps, self.ledger.len());
        if !fresh.is_empty() {
            tracing::info!(?fresh, "achievements unlocked");
            self.flush_achievements();
        }

        fresh
            .into_iter()
            .map(|id| GameEvent::AchievementUnlocked { id })
            .collect()
    }

    /// Feed controller events through the context. Each `SessionEnded` is
    /// recorded before anything that follows it; the returned list is the
    /// input with any unlock events inserted right after their session end.
    pub fn apply(&mut self, events: Vec<GameEvent>) -> Vec<GameEvent> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            let unlocked = match &event {
                GameEvent::SessionEnded { cps, .. } => self.record_session(*cps),
                _ => vec![],
            };
            out.push(event);
            out.extend(unlocked);
        }
        out
    }

    fn flush_scores(&mut self) {
        let records = self.ledger.records().collect::<Vec<&ScoreRecord>>();
        match serde_json::to_string(&records) {
            Ok(json) => self.write(keys::SCORES, &json),
            Err(err) => tracing::warn!(error = %err, "could not serialize scores"),
        }
    }

    fn flush_achievements(&mut self) {
        match serde_json::to_string(&self.achievements) {
            Ok(json) => self.write(keys::ACHIEVEMENTS, &json),
            Err(err) => tracing::warn!(error = %err, "could not serialize achievements"),
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            tracing::warn!(key, error = %err, "store write failed");
        }
    }
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, error = %err, "store read failed, treating as absent");
            None
        }
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim() {
        "true" => true,
        "false" => false,
        _ => default,
    }
}

fn parse_scores(raw: &str) -> Ledger {
    match serde_json::from_str::<Vec<StoredScore>>(raw) {
        Ok(stored) => {
            let now = Local::now();
            Ledger::from_records(stored.into_iter().map(|s| match s {
                StoredScore::Record(record) => ScoreRecord::new(record.cps, record.timestamp),
                StoredScore::Plain(cps) => ScoreRecord::new(cps, now),
            }))
        }
        Err(err) => {
            tracing::warn!(error = %err, "malformed scores in store, starting empty");
            Ledger::default()
        }
    }
}

fn parse_achievements(raw: &str) -> AchievementSet {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(ids) => ids
            .iter()
            .filter_map(|id| {
                let found = Achievement::ALL.into_iter().find(|a| a.to_string() == *id);
                if found.is_none() {
                    tracing::warn!(%id, "unknown achievement id in store");
                }
                found
            })
            .collect(),
        Err(err) => {
            tracing::warn!(error = %err, "malformed achievements in store, starting empty");
            AchievementSet::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use assert_matches::assert_matches;

    fn store_with(pairs: &[(&str, &str)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (k, v) in pairs {
            store.set(k, v).unwrap();
        }
        store
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn empty_store_loads_defaults() {
        let ctx = AppContext::load(Box::new(MemoryStore::new()));
        assert_eq!(ctx.settings(), &Settings::default());
        assert!(ctx.ledger().is_empty());
        assert!(ctx.achievements().is_empty());
    }

    #[test]
    fn malformed_values_load_as_absent() {
        let store = store_with(&[
            (keys::SCORES, "not json"),
            (keys::ACHIEVEMENTS, "{\"oops\":1}"),
            (keys::THEME, "sepia"),
            (keys::SPACEBAR_ENABLED, "maybe"),
        ]);
        let ctx = AppContext::load(Box::new(store));
        assert!(ctx.ledger().is_empty());
        assert!(ctx.achievements().is_empty());
        assert_eq!(ctx.settings().theme, Theme::Dark);
        assert!(ctx.settings().spacebar_enabled);
    }

    #[test]
    fn failing_store_is_not_fatal() {
        let mut ctx = AppContext::load(Box::new(FailingStore));
        assert!(ctx.ledger().is_empty());
        let events = ctx.record_session(12.0);
        assert_eq!(ctx.ledger().len(), 1);
        assert_matches!(
            events.as_slice(),
            [GameEvent::AchievementUnlocked {
                id: Achievement::SpeedDemon
            }]
        );
    }

    #[test]
    fn stored_negative_score_is_clamped() {
        let store = store_with(&[(
            keys::SCORES,
            r#"[{"cps":-3.0,"timestamp":"2026-10-17T12:00:00+00:00"},{"cps":4.5,"timestamp":"2026-10-17T12:01:00+00:00"}]"#,
        )]);
        let ctx = AppContext::load(Box::new(store));
        assert_eq!(ctx.ledger().scores().collect::<Vec<f64>>(), vec![0.0, 4.5]);
        assert_eq!(ctx.ledger().best_score(), Some(4.5));
    }

    #[test]
    fn loads_plain_decimal_scores() {
        let store = store_with(&[(keys::SCORES, "[1.5, 2.25, 9.0]")]);
        let ctx = AppContext::load(Box::new(store));
        assert_eq!(ctx.ledger().scores().collect::<Vec<f64>>(), vec![1.5, 2.25, 9.0]);
    }

    #[test]
    fn loads_settings_and_achievements() {
        let store = store_with(&[
            (keys::SOUND_ENABLED, "true"),
            (keys::CLICK_EFFECTS_ENABLED, "false"),
            (keys::THEME, "ocean"),
            (keys::ACHIEVEMENTS, r#"["speed_demon","bogus"]"#),
        ]);
        let ctx = AppContext::load(Box::new(store));
        assert!(ctx.settings().sound_enabled);
        assert!(!ctx.settings().click_effects_enabled);
        assert_eq!(ctx.settings().theme, Theme::Ocean);
        assert!(ctx.achievements().contains(Achievement::SpeedDemon));
        assert_eq!(ctx.achievements().len(), 1);
    }

    #[test]
    fn slow_run_unlocks_nothing() {
        let mut ctx = AppContext::load(Box::new(MemoryStore::new()));
        assert!(ctx.record_session(1.2).is_empty());
        assert_eq!(ctx.ledger().best_score(), Some(1.2));
    }

    #[test]
    fn tenth_run_unlocks_persistent_once() {
        let mut ctx = AppContext::load(Box::new(MemoryStore::new()));
        let mut persistent = Vec::new();
        for run in 1..=15 {
            let events = ctx.record_session(2.0);
            if events.contains(&GameEvent::AchievementUnlocked {
                id: Achievement::Persistent,
            }) {
                persistent.push(run);
            }
        }
        assert_eq!(persistent, vec![10]);
    }

    #[test]
    fn achievements_recorded_even_when_display_disabled() {
        let mut ctx = AppContext::load(Box::new(MemoryStore::new()));
        ctx.set_toggle(Toggle::Achievements, false);
        let events = ctx.record_session(16.0);
        assert_eq!(events.len(), 2);
        assert!(ctx.achievements().contains(Achievement::ClickMaster));
    }

    #[test]
    fn apply_inserts_unlocks_after_session_end() {
        let mut ctx = AppContext::load(Box::new(MemoryStore::new()));
        let events = ctx.apply(vec![
            GameEvent::TickUpdated {
                remaining_secs: 0,
                total_secs: 5,
            },
            GameEvent::SessionEnded {
                clicks: 50,
                cps: 10.0,
            },
        ]);
        assert_matches!(
            events.as_slice(),
            [
                GameEvent::TickUpdated { .. },
                GameEvent::SessionEnded { clicks: 50, .. },
                GameEvent::AchievementUnlocked {
                    id: Achievement::SpeedDemon
                }
            ]
        );
        assert_eq!(ctx.ledger().len(), 1);
    }

    #[test]
    fn apply_without_session_end_records_nothing() {
        let mut ctx = AppContext::load(Box::new(MemoryStore::new()));
        ctx.apply(vec![GameEvent::ClickRegistered { count: 1 }]);
        assert!(ctx.ledger().is_empty());
    }

    #[test]
    fn toggle_flips_and_returns_new_value() {
        let mut ctx = AppContext::load(Box::new(MemoryStore::new()));
        assert!(ctx.toggle(Toggle::Sound));
        assert!(!ctx.toggle(Toggle::Sound));
    }
}

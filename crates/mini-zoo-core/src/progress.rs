//! Persisted player progress
//!
//! Unlock lists only ever grow. Levels and animals are stored by id/name in
//! the order they were unlocked.

use crate::catalog::{Catalog, Level};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Audio preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub music: bool,
    pub effects: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music: true,
            effects: true,
        }
    }
}

/// What a completion newly unlocked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockDelta {
    pub level: Option<String>,
    pub animal: Option<String>,
}

impl UnlockDelta {
    pub fn is_empty(&self) -> bool {
        self.level.is_none() && self.animal.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    unlocked_levels: Vec<String>,
    unlocked_animals: Vec<String>,
    #[serde(default)]
    completed_levels: Vec<String>,
    #[serde(default)]
    settings: Settings,
}

impl GameProgress {
    /// Fresh progress with only `first_level` open
    pub fn initial(first_level: &str) -> Self {
        Self {
            unlocked_levels: vec![first_level.to_string()],
            ..Default::default()
        }
    }

    pub fn for_catalog(catalog: &Catalog) -> Self {
        match catalog.first_level() {
            Some(level) => Self::initial(&level.id),
            None => Self::default(),
        }
    }

    pub fn unlocked_levels(&self) -> &[String] {
        &self.unlocked_levels
    }

    pub fn unlocked_animals(&self) -> &[String] {
        &self.unlocked_animals
    }

    pub fn completed_levels(&self) -> &[String] {
        &self.completed_levels
    }

    pub fn is_level_unlocked(&self, id: &str) -> bool {
        self.unlocked_levels.iter().any(|l| l == id)
    }

    pub fn is_animal_unlocked(&self, name: &str) -> bool {
        self.unlocked_animals.iter().any(|a| a == name)
    }

    pub fn is_level_completed(&self, id: &str) -> bool {
        self.completed_levels.iter().any(|l| l == id)
    }

    /// Append if absent; returns whether anything changed
    pub fn unlock_level(&mut self, id: &str) -> bool {
        push_unique(&mut self.unlocked_levels, id)
    }

    pub fn unlock_animal(&mut self, name: &str) -> bool {
        push_unique(&mut self.unlocked_animals, name)
    }

    pub fn mark_completed(&mut self, id: &str) -> bool {
        push_unique(&mut self.completed_levels, id)
    }

    /// Apply the rewards for finishing `level`
    pub fn record_completion(&mut self, level: &Level, successor: Option<&Level>) -> UnlockDelta {
        let mut delta = UnlockDelta::default();

        if let Some(next) = successor {
            if self.unlock_level(&next.id) {
                delta.level = Some(next.id.clone());
            }
        }
        if self.unlock_animal(&level.animal_name) {
            delta.animal = Some(level.animal_name.clone());
        }
        self.mark_completed(&level.id);

        if !delta.is_empty() {
            info!(
                level = %level.id,
                unlocked_level = ?delta.level,
                unlocked_animal = ?delta.animal,
                "new unlocks"
            );
        }
        delta
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Repair a loaded payload: drop duplicates and make sure the first
    /// level is always playable
    pub fn normalize(&mut self, catalog: &Catalog) {
        dedup_in_order(&mut self.unlocked_levels);
        dedup_in_order(&mut self.unlocked_animals);
        dedup_in_order(&mut self.completed_levels);

        if let Some(first) = catalog.first_level() {
            if !self.is_level_unlocked(&first.id) {
                self.unlocked_levels.insert(0, first.id.clone());
            }
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn dedup_in_order(list: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::with_capacity(list.len());
    list.retain(|v| {
        if seen.contains(v) {
            false
        } else {
            seen.push(v.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_progress() {
        let progress = GameProgress::for_catalog(&Catalog::standard());
        assert_eq!(progress.unlocked_levels(), ["farm-1"]);
        assert!(progress.unlocked_animals().is_empty());
        assert!(progress.completed_levels().is_empty());
        assert_eq!(progress.settings(), Settings { music: true, effects: true });
    }

    #[test]
    fn test_completion_unlocks_successor_and_animal() {
        let catalog = Catalog::standard();
        let mut progress = GameProgress::for_catalog(&catalog);
        let level = catalog.level("farm-1").unwrap();

        let delta = progress.record_completion(level, catalog.successor("farm-1"));
        assert_eq!(delta.level.as_deref(), Some("farm-2"));
        assert_eq!(delta.animal.as_deref(), Some("Cow"));
        assert_eq!(progress.unlocked_levels(), ["farm-1", "farm-2"]);
        assert_eq!(progress.unlocked_animals(), ["Cow"]);
        assert!(progress.is_level_completed("farm-1"));
    }

    #[test]
    fn test_replay_is_idempotent() {
        let catalog = Catalog::standard();
        let mut progress = GameProgress::for_catalog(&catalog);
        let level = catalog.level("farm-1").unwrap();

        progress.record_completion(level, catalog.successor("farm-1"));
        let snapshot = progress.clone();
        let delta = progress.record_completion(level, catalog.successor("farm-1"));

        assert!(delta.is_empty());
        assert_eq!(progress, snapshot);
    }

    #[test]
    fn test_last_level_unlocks_only_animal() {
        let catalog = Catalog::standard();
        let mut progress = GameProgress::for_catalog(&catalog);
        let last = catalog.level("jungle-4").unwrap();

        let delta = progress.record_completion(last, catalog.successor("jungle-4"));
        assert!(delta.level.is_none());
        assert_eq!(delta.animal.as_deref(), Some("Parrot"));
        assert_eq!(progress.unlocked_levels(), ["farm-1"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let progress = GameProgress::initial("farm-1");
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["unlockedLevels"], serde_json::json!(["farm-1"]));
        assert_eq!(json["unlockedAnimals"], serde_json::json!([]));
        assert_eq!(json["completedLevels"], serde_json::json!([]));
        assert_eq!(json["settings"]["music"], serde_json::json!(true));
        assert!(json.get("screen").is_none());
    }

    #[test]
    fn test_older_payload_without_completed_levels() {
        let json = r#"{"unlockedLevels":["farm-1","farm-2"],"unlockedAnimals":["Cow"],"settings":{"music":false,"effects":true}}"#;
        let progress: GameProgress = serde_json::from_str(json).unwrap();
        assert!(progress.completed_levels().is_empty());
        assert!(!progress.settings().music);
    }

    #[test]
    fn test_normalize_repairs_payload() {
        let json = r#"{"unlockedLevels":["farm-2","farm-2"],"unlockedAnimals":["Cow","Cow"]}"#;
        let mut progress: GameProgress = serde_json::from_str(json).unwrap();
        progress.normalize(&Catalog::standard());
        assert_eq!(progress.unlocked_levels(), ["farm-1", "farm-2"]);
        assert_eq!(progress.unlocked_animals(), ["Cow"]);
    }
}

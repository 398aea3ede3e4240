use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use eartune_profile::{ParametricEq, ParametricEqBand};

/// A resolved (or user-imported) EQ profile, as handed to the playback
/// layer. This is the consumer-facing exchange shape; it serializes to JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEqProfile {
    /// Stable identifier (`source/form dir/label` for resolved profiles,
    /// `custom-N` for imports)
    pub id: String,
    /// Display name
    pub name: String,
    /// Variant-stripped device model
    pub device_model: String,
    /// Measurement source, empty for custom profiles
    pub source: String,
    /// Rig display name (`Unknown` when unresolved)
    pub rig: String,
    /// Flat gain offset in dB
    pub preamp_db: f64,
    /// EQ bands in application order
    pub bands: Vec<ParametricEqBand>,
    pub is_custom: bool,
    pub is_active: bool,
}

impl SavedEqProfile {
    /// The parametric EQ this profile describes, ready for the engine.
    pub fn to_parametric(&self) -> ParametricEq {
        let mut eq = ParametricEq::new(self.preamp_db, self.bands.clone());
        eq.metadata.insert("device".to_string(), self.name.clone());
        eq.metadata.insert("source".to_string(), self.source.clone());
        eq.metadata.insert("rig".to_string(), self.rig.clone());
        eq
    }
}

/// Error type for profile store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no profile with id {0}")]
    NotFound(String),
}

/// In-memory profile store.
///
/// At most one profile is active at a time; activating one deactivates the
/// previous, and deleting the active one clears the active pointer. How the
/// host application persists profiles is its own business; this store only
/// maintains the invariants.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: HashMap<String, SavedEqProfile>,
    active: Option<String>,
    next_custom: u64,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile. An incoming `is_active` flag is honored
    /// by routing through [`ProfileStore::set_active`].
    pub fn save(&mut self, mut profile: SavedEqProfile) {
        let id = profile.id.clone();
        let wants_active = profile.is_active;
        profile.is_active = false;
        self.profiles.insert(id.clone(), profile);
        if wants_active {
            // the id was just inserted, activation cannot fail
            let _ = self.set_active(&id);
        }
    }

    /// Import a user-supplied EQ as a custom profile, returning its id.
    pub fn import_custom(&mut self, name: &str, eq: &ParametricEq) -> String {
        self.next_custom += 1;
        let id = format!("custom-{}", self.next_custom);
        self.profiles.insert(
            id.clone(),
            SavedEqProfile {
                id: id.clone(),
                name: name.to_string(),
                device_model: name.to_string(),
                source: String::new(),
                rig: "Unknown".to_string(),
                preamp_db: eq.preamp_db,
                bands: eq.bands.clone(),
                is_custom: true,
                is_active: false,
            },
        );
        id
    }

    pub fn get(&self, id: &str) -> Option<&SavedEqProfile> {
        self.profiles.get(id)
    }

    /// Mark `id` active, deactivating any previous profile.
    pub fn set_active(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.profiles.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        if let Some(previous) = self.active.take() {
            if let Some(profile) = self.profiles.get_mut(&previous) {
                profile.is_active = false;
            }
        }

        if let Some(profile) = self.profiles.get_mut(id) {
            profile.is_active = true;
        }
        self.active = Some(id.to_string());
        Ok(())
    }

    /// Deactivate whatever profile is active.
    pub fn clear_active(&mut self) {
        if let Some(previous) = self.active.take() {
            if let Some(profile) = self.profiles.get_mut(&previous) {
                profile.is_active = false;
            }
        }
    }

    pub fn active(&self) -> Option<&SavedEqProfile> {
        self.active.as_deref().and_then(|id| self.profiles.get(id))
    }

    /// Remove a profile. Deleting the active profile clears the active
    /// pointer.
    pub fn delete(&mut self, id: &str) -> Result<SavedEqProfile, StoreError> {
        let profile = self
            .profiles
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        Ok(profile)
    }

    /// All profiles, sorted by display name.
    pub fn list(&self) -> Vec<&SavedEqProfile> {
        let mut profiles: Vec<&SavedEqProfile> = self.profiles.values().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eartune_profile::PeqFilterType;

    fn profile(id: &str, name: &str) -> SavedEqProfile {
        SavedEqProfile {
            id: id.to_string(),
            name: name.to_string(),
            device_model: name.to_string(),
            source: "oratory1990".to_string(),
            rig: "GRAS 43AG-7".to_string(),
            preamp_db: -3.0,
            bands: vec![ParametricEqBand {
                filter_type: PeqFilterType::Peak,
                frequency_hz: 1000.0,
                gain_db: 3.0,
                q: 1.0,
            }],
            is_custom: false,
            is_active: false,
        }
    }

    #[test]
    fn test_single_active_profile() {
        let mut store = ProfileStore::new();
        store.save(profile("a", "A"));
        store.save(profile("b", "B"));

        store.set_active("a").unwrap();
        store.set_active("b").unwrap();

        assert_eq!(store.active().unwrap().id, "b");
        assert!(!store.get("a").unwrap().is_active);
        assert!(store.get("b").unwrap().is_active);
    }

    #[test]
    fn test_delete_active_clears_pointer() {
        let mut store = ProfileStore::new();
        store.save(profile("a", "A"));
        store.set_active("a").unwrap();

        store.delete("a").unwrap();
        assert!(store.active().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_active_unknown_id() {
        let mut store = ProfileStore::new();
        assert!(matches!(
            store.set_active("nope"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_import_custom_ids_are_distinct() {
        let mut store = ProfileStore::new();
        let eq = ParametricEq::new(
            0.0,
            vec![ParametricEqBand {
                filter_type: PeqFilterType::Peak,
                frequency_hz: 100.0,
                gain_db: 2.0,
                q: 1.0,
            }],
        );
        let a = store.import_custom("Mine", &eq);
        let b = store.import_custom("Mine again", &eq);
        assert_ne!(a, b);
        assert!(store.get(&a).unwrap().is_custom);
    }

    #[test]
    fn test_save_honors_active_flag() {
        let mut store = ProfileStore::new();
        let mut p = profile("a", "A");
        p.is_active = true;
        store.save(p);
        assert_eq!(store.active().unwrap().id, "a");
    }

    #[test]
    fn test_list_sorted_by_name() {
        let mut store = ProfileStore::new();
        store.save(profile("2", "Zeta"));
        store.save(profile("1", "Alpha"));
        let names: Vec<&str> = store.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_json_round_trip() {
        let p = profile("a", "A");
        let json = serde_json::to_string(&p).unwrap();
        let back: SavedEqProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}

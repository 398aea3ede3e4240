//! eartune - resolve and apply device equalization profiles
//!
//! Copyright (C) 2025 Pierre Aubert pierre(at)spinorama(dot)org
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <https://www.gnu.org/licenses/>.
//!
//! From a matched entry (or a stored id) to a profile in the engine.

use std::path::{Path, PathBuf};

use eartune_db::{DbError, Entry, SearchIndex, normalize_label};
use eartune_dsp::EqControl;
use eartune_env::{FIXED_BAND_EQ_SUFFIX, GRAPHIC_EQ_SUFFIX, PARAMETRIC_EQ_SUFFIX};
use eartune_profile::{FixedBandEq, GraphicEq, ParametricEq, ProfileError};

use crate::store::{ProfileStore, SavedEqProfile, StoreError};

/// Error type for profile resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("no measurement entry labelled {0}")]
    NoMatch(String),

    #[error("label {label} matches {count} entries; resolve one entry explicitly")]
    AmbiguousLabel { label: String, count: usize },
}

/// Owns the search index and turns matched entries into saved profiles.
#[derive(Debug)]
pub struct Resolver {
    root: PathBuf,
    index: SearchIndex,
}

impl Resolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            index: SearchIndex::new(&root),
            root,
        }
    }

    /// Build the measurement index. Blocking filesystem I/O; run it off any
    /// latency-sensitive thread.
    pub fn build_index(&mut self) -> Result<usize, DbError> {
        self.index.build()
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The stable id a resolved entry gets in the profile store.
    pub fn profile_id(entry: &Entry) -> String {
        format!("{}/{}/{}", entry.source, entry.form_dir, entry.label)
    }

    fn eq_path(&self, entry: &Entry, suffix: &str) -> PathBuf {
        eartune_env::eq_file_path(&self.root, &entry.source, &entry.form_dir, &entry.label, suffix)
    }

    /// Parse the entry's on-disk parametric EQ description into a profile.
    pub fn resolve_entry(&self, entry: &Entry) -> Result<SavedEqProfile, ResolveError> {
        let eq = ParametricEq::from_file(&self.eq_path(entry, PARAMETRIC_EQ_SUFFIX))?;

        Ok(SavedEqProfile {
            id: Self::profile_id(entry),
            name: entry.label.clone(),
            device_model: normalize_label(&entry.label),
            source: entry.source.clone(),
            rig: entry.rig.to_string(),
            preamp_db: eq.preamp_db,
            bands: eq.bands,
            is_custom: false,
            is_active: false,
        })
    }

    /// The graphic EQ description sitting next to the parametric one, for
    /// consumers that only take frequency/gain pairs.
    pub fn resolve_graphic(&self, entry: &Entry) -> Result<GraphicEq, ProfileError> {
        GraphicEq::from_file(&self.eq_path(entry, GRAPHIC_EQ_SUFFIX))
    }

    /// The entry's ten-band fixed EQ description.
    pub fn resolve_fixed_band(&self, entry: &Entry) -> Result<FixedBandEq, ProfileError> {
        FixedBandEq::from_file(&self.eq_path(entry, FIXED_BAND_EQ_SUFFIX))
    }

    /// Resolve a device label when it identifies exactly one entry.
    ///
    /// A label measured by several sources or on several rigs is ambiguous;
    /// the caller picks an entry (e.g. from a variant listing) and resolves
    /// it explicitly rather than having one chosen silently.
    pub fn resolve_label(&self, label: &str) -> Result<SavedEqProfile, ResolveError> {
        let entries = self.index.entries_for_label(label);
        match entries.len() {
            0 => Err(ResolveError::NoMatch(label.to_string())),
            1 => self.resolve_entry(entries[0]),
            count => Err(ResolveError::AmbiguousLabel {
                label: label.to_string(),
                count,
            }),
        }
    }
}

/// Drive the engine from the profile-selection boundary.
///
/// `None` means "no equalization": the active pointer is cleared and the
/// engine reaches the Disabled state. `Some(id)` activates the stored
/// profile and rebuilds the engine chain from a copy of it.
pub fn select_profile(
    store: &mut ProfileStore,
    control: &EqControl,
    id: Option<&str>,
) -> Result<(), StoreError> {
    match id {
        None => {
            store.clear_active();
            control.disable();
            Ok(())
        }
        Some(id) => {
            store.set_active(id)?;
            if let Some(profile) = store.get(id) {
                control.apply_profile(&profile.to_parametric());
            }
            Ok(())
        }
    }
}

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
//! Name-index synthesis for sources that ship no side-file, plus the
//! explicit per-source cache that memoizes whichever index a source ends up
//! with.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::name_index::NameIndex;
use crate::types::{Form, NameItem, Rig};

/// Sources known to measure on a single rig regardless of directory layout.
///
/// The table serves two purposes: it selects the fixed-rig crawl strategy,
/// and it is the last step of rig resolution for entries that neither parse
/// a rig from their directory token nor appear in a name index.
const FIXED_RIG_SOURCES: &[(&str, &str)] = &[
    ("Innerfidelity", "HMS II.3"),
    ("Headphone.com Legacy", "HMS II.3"),
    ("Rtings", "HMS II.3"),
    ("oratory1990", "GRAS 43AG-7"),
];

/// The rig a source uses exclusively, if it is one of the single-rig sources.
pub fn fixed_rig_for(source: &str) -> Option<&'static str> {
    FIXED_RIG_SOURCES
        .iter()
        .find(|(name, _)| *name == source)
        .map(|(_, rig)| *rig)
}

/// How to derive a name index from a source's measurement directory.
///
/// Each source encodes its own convention; rather than a hierarchy of
/// crawler types, the convention is data selected by source name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlerStrategy {
    /// `{form}/{rig}/{device}` directories carry all the metadata.
    Layout,
    /// `{form}/{device}` directories; every device measured on one rig.
    FixedRig(&'static str),
}

/// Select the crawl strategy for a source.
pub fn strategy_for(source: &str) -> CrawlerStrategy {
    match fixed_rig_for(source) {
        Some(rig) => CrawlerStrategy::FixedRig(rig),
        None => CrawlerStrategy::Layout,
    }
}

impl CrawlerStrategy {
    /// Walk `dir` and synthesize a name index.
    ///
    /// A missing or unreadable directory degrades to an empty index with a
    /// logged warning; absent data for one source must not block others.
    pub fn crawl(&self, dir: &Path) -> NameIndex {
        let mut index = NameIndex::new();

        for (form_name, form_path) in subdirs(dir) {
            let form = Form::from_keyword(&form_name);
            match self {
                CrawlerStrategy::Layout => {
                    for (rig_name, rig_path) in subdirs(&form_path) {
                        let rig = Rig::from_label(&rig_name);
                        for (device, _) in subdirs(&rig_path) {
                            index.add(NameItem {
                                name: device,
                                form,
                                rig: rig.clone(),
                            });
                        }
                    }
                }
                CrawlerStrategy::FixedRig(rig) => {
                    for (device, _) in subdirs(&form_path) {
                        index.add(NameItem {
                            name: device,
                            form,
                            rig: Rig::Named((*rig).to_string()),
                        });
                    }
                }
            }
        }

        index
    }
}

/// Immediate subdirectories of `path` as (name, path) pairs.
///
/// Read failures are logged and yield an empty list.
pub(crate) fn subdirs(path: &Path) -> Vec<(String, PathBuf)> {
    let reader = match std::fs::read_dir(path) {
        Ok(reader) => reader,
        Err(e) => {
            log::warn!("cannot read directory {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut dirs: Vec<(String, PathBuf)> = reader
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if !path.is_dir() {
                return None;
            }
            Some((entry.file_name().to_string_lossy().into_owned(), path))
        })
        .collect();

    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    dirs
}

/// Per-source name-index cache.
///
/// Owned by the search index for its process lifetime and passed by handle;
/// the first request for a source loads its side-file (or crawls) and
/// memoizes the result until [`IndexCache::clear`].
#[derive(Debug)]
pub struct IndexCache {
    root: PathBuf,
    per_source: HashMap<String, NameIndex>,
}

impl IndexCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            per_source: HashMap::new(),
        }
    }

    /// The name index for `source`, loading and memoizing it on first use.
    pub fn get(&mut self, source: &str) -> &NameIndex {
        if !self.per_source.contains_key(source) {
            let index = load_source_index(&self.root, source);
            log::info!("loaded name index for {}: {} items", source, index.len());
            self.per_source.insert(source.to_string(), index);
        }
        &self.per_source[source]
    }

    /// Drop every memoized index; the next `get` reloads from disk.
    pub fn clear(&mut self) {
        self.per_source.clear();
    }
}

/// Side-file if present, crawler otherwise, empty index as the last resort.
fn load_source_index(root: &Path, source: &str) -> NameIndex {
    let side_file = eartune_env::name_index_path(root, source);
    if side_file.is_file() {
        match NameIndex::from_tsv(&side_file) {
            Ok(index) => return index,
            Err(e) => log::warn!("unusable side-file {}: {}", side_file.display(), e),
        }
    }

    strategy_for(source).crawl(&eartune_env::measurements_dir(root, source))
}

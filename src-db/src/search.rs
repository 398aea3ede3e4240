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
//! The flat measurement index and its search operations. Building walks the
//! results tree once and resolves each entry's rig through a three-step
//! fallback; the searches rank case-insensitively with fixed score buckets.

use std::collections::BTreeMap;
use std::path::PathBuf;

use eartune_env::PARAMETRIC_EQ_SUFFIX;

use crate::crawler::{IndexCache, fixed_rig_for, subdirs};
use crate::error::DbError;
use crate::path_parse::parse_rig_and_form;
use crate::types::{Entry, Rig};

// Score buckets. The relative spacing is load-bearing only in so far as it
// orders the buckets; the exact values are kept from the original ranking.
const BRAND_SCORE_EXACT: u32 = 1000;
const BRAND_SCORE_PREFIX: u32 = 500;
const BRAND_SCORE_SUBSTRING: u32 = 100;

const MODEL_SCORE_EXACT: u32 = 2000;
const MODEL_SCORE_PREFIX: u32 = 1500;
const MODEL_SCORE_BRAND_PREFIX: u32 = 1000;
const MODEL_SCORE_OTHER: u32 = 100;

const TEXT_SCORE_EXACT: u32 = 1000;
const TEXT_SCORE_PREFIX: u32 = 500;
const TEXT_SCORE_OTHER: u32 = 100;

/// Measurement variants of one physical device, grouped under the
/// variant-stripped label.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGroup {
    pub name: String,
    pub variants: Vec<Entry>,
}

/// The searchable index over the measurement database.
///
/// Built once per process from the `results` tree; the entry list and the
/// per-source name-index cache are owned here exclusively and only read
/// afterwards. Building does blocking filesystem I/O and must be kept off
/// any latency-sensitive thread.
#[derive(Debug)]
pub struct SearchIndex {
    root: PathBuf,
    entries: Vec<Entry>,
    cache: IndexCache,
    indexed: bool,
}

impl SearchIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cache: IndexCache::new(&root),
            root,
            entries: Vec::new(),
            indexed: false,
        }
    }

    /// Whether `build` has completed. Queries on an unbuilt index return
    /// empty results with a warning instead of failing; callers needing a
    /// hard guarantee check this flag.
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The per-source name-index cache, exposed for explicit invalidation.
    pub fn cache_mut(&mut self) -> &mut IndexCache {
        &mut self.cache
    }

    /// Walk the results tree and build the entry list.
    ///
    /// Every `{source}/{rig and form}/{device}` directory containing the
    /// expected parametric EQ description becomes one entry. Unreadable
    /// sources degrade to warnings; only a missing results tree is a hard
    /// failure. The new entry list becomes visible only once complete, so a
    /// failed build leaves the index empty rather than half-populated.
    ///
    /// Exclusive access (`&mut self`) is the build-in-progress guard:
    /// callers sharing the index behind a lock cannot overlap two builds.
    pub fn build(&mut self) -> Result<usize, DbError> {
        self.entries.clear();
        self.indexed = false;

        let results = eartune_env::results_dir(&self.root);
        if !results.is_dir() {
            return Err(DbError::MissingResults(results));
        }

        let mut entries = Vec::new();

        for (source, source_path) in subdirs(&results) {
            for (token, token_path) in subdirs(&source_path) {
                let (parsed_rig, form) = parse_rig_and_form(&token);
                for (device, device_path) in subdirs(&token_path) {
                    let eq_file = device_path.join(format!("{} {}", device, PARAMETRIC_EQ_SUFFIX));
                    if !eq_file.is_file() {
                        log::debug!("no parametric EQ for {}, skipped", device_path.display());
                        continue;
                    }

                    let rig = self.resolve_rig(parsed_rig.clone(), &source, &device);
                    entries.push(Entry {
                        label: device,
                        form,
                        rig,
                        source: source.clone(),
                        form_dir: token.clone(),
                    });
                }
            }
        }

        self.entries = entries;
        self.indexed = true;
        log::info!("indexed {} measurement entries", self.entries.len());
        Ok(self.entries.len())
    }

    /// Three-step rig resolution, first success wins:
    /// 1. the rig parsed from the directory token;
    /// 2. the source's name index, loaded lazily through the cache;
    /// 3. the fixed single-rig source table, else unknown.
    fn resolve_rig(&mut self, parsed: Rig, source: &str, device: &str) -> Rig {
        if !parsed.is_unknown() {
            return parsed;
        }

        for item in self.cache.get(source).find(device) {
            if let Rig::Named(name) = &item.rig {
                return Rig::Named(name.clone());
            }
        }

        match fixed_rig_for(source) {
            Some(rig) => Rig::Named(rig.to_string()),
            None => Rig::Unknown,
        }
    }

    /// Brands matching `query`, ranked exact > prefix > substring, ties
    /// alphabetical, truncated to `max_results`.
    ///
    /// A brand is the first whitespace/hyphen/paren-delimited token of a
    /// device label, deduplicated case-insensitively.
    pub fn search_brands(&self, query: &str, max_results: usize) -> Vec<String> {
        if !self.warn_unindexed("brand search") {
            return Vec::new();
        }
        let q = query.trim().to_lowercase();

        let mut brands: BTreeMap<String, String> = BTreeMap::new();
        for entry in &self.entries {
            if let Some(brand) = brand_of(&entry.label) {
                brands
                    .entry(brand.to_lowercase())
                    .or_insert_with(|| brand.to_string());
            }
        }

        let mut scored: Vec<(u32, String)> = brands
            .into_iter()
            .filter(|(lower, _)| lower.contains(&q))
            .map(|(lower, brand)| {
                let score = if lower == q {
                    BRAND_SCORE_EXACT
                } else if lower.starts_with(&q) {
                    BRAND_SCORE_PREFIX
                } else {
                    BRAND_SCORE_SUBSTRING
                };
                (score, brand)
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.truncate(max_results);
        scored.into_iter().map(|(_, brand)| brand).collect()
    }

    /// Models of `brand`, optionally narrowed by a model substring, ranked
    /// exact "brand model" > its prefix > label-starts-with-brand > other,
    /// ties by label.
    ///
    /// The model filter and the exact/prefix buckets compare against the
    /// variant-stripped label, so `"WH-1000XM4 (ANC ON)"` still ranks as an
    /// exact match for `WH-1000XM4`.
    pub fn search_models(
        &self,
        brand: &str,
        model: Option<&str>,
        max_results: usize,
    ) -> Vec<Entry> {
        if !self.warn_unindexed("model search") {
            return Vec::new();
        }
        let b = brand.trim().to_lowercase();
        let m = model.map(|m| normalize_label(m).to_lowercase());
        let target = m.as_ref().map(|m| format!("{} {}", b, m));

        let mut scored: Vec<(u32, &Entry)> = Vec::new();
        for entry in &self.entries {
            let label = entry.label.to_lowercase();
            let starts_with_brand = label.starts_with(&b);
            if !starts_with_brand && !contains_word(&label, &b) {
                continue;
            }

            let normalized = normalize_label(&label);
            if let Some(m) = &m {
                if !normalized.contains(m.as_str()) {
                    continue;
                }
            }

            let score = match &target {
                Some(target) if normalized == *target => MODEL_SCORE_EXACT,
                Some(target) if normalized.starts_with(target.as_str()) => MODEL_SCORE_PREFIX,
                _ if starts_with_brand => MODEL_SCORE_BRAND_PREFIX,
                _ => MODEL_SCORE_OTHER,
            };
            scored.push((score, entry));
        }

        rank_entries(scored, max_results)
    }

    /// Free-text search across label, source and rig, ranked exact label >
    /// label prefix > other, ties by label.
    pub fn search(&self, query: &str, max_results: usize) -> Vec<Entry> {
        if !self.warn_unindexed("search") {
            return Vec::new();
        }
        let q = query.trim().to_lowercase();

        let mut scored: Vec<(u32, &Entry)> = Vec::new();
        for entry in &self.entries {
            let label = entry.label.to_lowercase();
            let matches = label.contains(&q)
                || entry.source.to_lowercase().contains(&q)
                || entry.rig.to_string().to_lowercase().contains(&q);
            if !matches {
                continue;
            }

            let score = if label == q {
                TEXT_SCORE_EXACT
            } else if label.starts_with(&q) {
                TEXT_SCORE_PREFIX
            } else {
                TEXT_SCORE_OTHER
            };
            scored.push((score, entry));
        }

        rank_entries(scored, max_results)
    }

    /// Entries whose label matches exactly, case-insensitively.
    pub fn entries_for_label(&self, label: &str) -> Vec<&Entry> {
        let l = label.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.label.to_lowercase() == l)
            .collect()
    }

    /// Group entries by variant-stripped label so measurement variants of
    /// one physical device present as one logical model.
    pub fn group_by_model(&self) -> Vec<ModelGroup> {
        if !self.warn_unindexed("grouping") {
            return Vec::new();
        }

        let mut groups: BTreeMap<String, Vec<Entry>> = BTreeMap::new();
        for entry in &self.entries {
            groups
                .entry(normalize_label(&entry.label))
                .or_default()
                .push(entry.clone());
        }

        groups
            .into_iter()
            .map(|(name, variants)| ModelGroup { name, variants })
            .collect()
    }

    fn warn_unindexed(&self, what: &str) -> bool {
        if !self.indexed {
            log::warn!("{} before the measurement index is built", what);
        }
        self.indexed
    }

    #[cfg(test)]
    pub(crate) fn from_entries(entries: Vec<Entry>) -> Self {
        Self {
            root: PathBuf::new(),
            cache: IndexCache::new(""),
            entries,
            indexed: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn unindexed() -> Self {
        Self {
            root: PathBuf::new(),
            cache: IndexCache::new(""),
            entries: Vec::new(),
            indexed: false,
        }
    }
}

/// Strip parenthesized variant annotations (e.g. `"(ANC ON)"`) and collapse
/// the remaining whitespace.
pub fn normalize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut depth = 0usize;
    for c in label.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First whitespace/hyphen/paren-delimited token of a label.
fn brand_of(label: &str) -> Option<&str> {
    label
        .split(|c: char| c.is_whitespace() || c == '-' || c == '(' || c == ')')
        .find(|s| !s.is_empty())
}

/// Whether `label` contains `word` as a whole delimiter-separated word.
fn contains_word(label: &str, word: &str) -> bool {
    label
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

fn rank_entries(mut scored: Vec<(u32, &Entry)>, max_results: usize) -> Vec<Entry> {
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.label.cmp(&b.1.label)));
    scored.truncate(max_results);
    scored.into_iter().map(|(_, e)| e.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Form;
    use std::fs;
    use std::path::Path;

    fn entry(label: &str, source: &str, rig: &str) -> Entry {
        Entry {
            label: label.to_string(),
            form: Form::OverEar,
            rig: Rig::from_label(rig),
            source: source.to_string(),
            form_dir: "over-ear".to_string(),
        }
    }

    fn sample_index() -> SearchIndex {
        SearchIndex::from_entries(vec![
            entry("Sony WH-1000XM4", "oratory1990", "GRAS 43AG-7"),
            entry("Sony WH-1000XM4 (ANC ON)", "crinacle", "711"),
            entry("Sonarworks Custom", "crinacle", "711"),
            entry("Bose QC45", "oratory1990", "GRAS 43AG-7"),
        ])
    }

    #[test]
    fn test_brand_ranking_prefix_ties_alphabetical() {
        let index = sample_index();
        let brands = index.search_brands("son", 10);
        assert_eq!(brands, vec!["Sonarworks".to_string(), "Sony".to_string()]);
    }

    #[test]
    fn test_brand_exact_beats_prefix() {
        let index = SearchIndex::from_entries(vec![
            entry("Sony WH-1000XM4", "oratory1990", "GRAS 43AG-7"),
            entry("Sonyx Prototype", "crinacle", "711"),
        ]);
        let brands = index.search_brands("sony", 10);
        assert_eq!(brands, vec!["Sony".to_string(), "Sonyx".to_string()]);
    }

    #[test]
    fn test_brand_truncation() {
        let index = sample_index();
        assert_eq!(index.search_brands("son", 1).len(), 1);
    }

    #[test]
    fn test_model_search_exact_includes_variants() {
        let index = sample_index();
        let models = index.search_models("Sony", Some("WH-1000XM4"), 10);
        assert_eq!(models.len(), 2);
        // both normalize to the exact target; ties break by label
        assert_eq!(models[0].label, "Sony WH-1000XM4");
        assert_eq!(models[1].label, "Sony WH-1000XM4 (ANC ON)");
    }

    #[test]
    fn test_model_search_without_filter() {
        let index = sample_index();
        let models = index.search_models("Sony", None, 10);
        assert_eq!(models.len(), 2);
        assert!(models.iter().all(|e| e.label.starts_with("Sony")));
    }

    #[test]
    fn test_free_text_search_exact_first() {
        let index = sample_index();
        let hits = index.search("sony wh-1000xm4", 10);
        assert_eq!(hits[0].label, "Sony WH-1000XM4");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_free_text_search_matches_rig_and_source() {
        let index = sample_index();
        assert_eq!(index.search("711", 10).len(), 2);
        assert_eq!(index.search("oratory", 10).len(), 2);
    }

    #[test]
    fn test_grouping_merges_variants() {
        let index = sample_index();
        let groups = index.group_by_model();
        let sony = groups
            .iter()
            .find(|g| g.name == "Sony WH-1000XM4")
            .unwrap();
        assert_eq!(sony.variants.len(), 2);
    }

    #[test]
    fn test_queries_before_build_are_empty() {
        let index = SearchIndex::unindexed();
        assert!(!index.is_indexed());
        assert!(index.search_brands("son", 10).is_empty());
        assert!(index.search_models("Sony", None, 10).is_empty());
        assert!(index.search("sony", 10).is_empty());
        assert!(index.group_by_model().is_empty());
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(
            normalize_label("Sony WH-1000XM4 (ANC ON) (sample 2)"),
            "Sony WH-1000XM4"
        );
        assert_eq!(normalize_label("Plain Label"), "Plain Label");
    }

    // --- build + rig resolution over a real directory tree ---

    fn touch_eq_file(root: &Path, source: &str, token: &str, device: &str) {
        let dir = root.join("results").join(source).join(token).join(device);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{} ParametricEQ.txt", device)),
            "Preamp: -1.0 dB\nFilter 1: ON PK Fc 100 Hz Gain 1.00 dB Q 1.00\n",
        )
        .unwrap();
    }

    #[test]
    fn test_build_and_rig_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        // step 1: rig parsed from the directory token
        touch_eq_file(root, "crinacle", "Bruel & Kjaer 5128 in-ear", "DeviceA");
        // step 2: token has no rig, the side-file knows it
        touch_eq_file(root, "crinacle", "in-ear", "DeviceB");
        fs::create_dir_all(root.join("measurements/crinacle")).unwrap();
        fs::write(
            root.join("measurements/crinacle/name_index.tsv"),
            "url\tsource_name\tname\tform\trig\nhttp://x\tDeviceB\tDeviceB\tin-ear\tHMS II.3\n",
        )
        .unwrap();
        // step 3: no parsed rig, no index entry, fixed source override
        touch_eq_file(root, "Innerfidelity", "over-ear", "DeviceC");
        // no step applies
        touch_eq_file(root, "NoSuchSource", "over-ear", "DeviceD");
        // device directory without the EQ description is skipped
        fs::create_dir_all(root.join("results/crinacle/in-ear/DeviceE")).unwrap();

        let mut index = SearchIndex::new(root);
        let count = index.build().unwrap();
        assert_eq!(count, 4);
        assert!(index.is_indexed());

        let rig_of = |label: &str| index.entries_for_label(label)[0].rig.clone();
        assert_eq!(rig_of("DeviceA"), Rig::Named("Bruel & Kjaer 5128".to_string()));
        assert_eq!(rig_of("DeviceB"), Rig::Named("HMS II.3".to_string()));
        assert_eq!(rig_of("DeviceC"), Rig::Named("HMS II.3".to_string()));
        assert_eq!(rig_of("DeviceD"), Rig::Unknown);

        let b = &index.entries_for_label("DeviceB")[0];
        assert_eq!(b.form, Form::InEar);
        assert_eq!(b.form_dir, "in-ear");
    }

    #[test]
    fn test_build_missing_results_is_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = SearchIndex::new(dir.path());
        assert!(matches!(index.build(), Err(DbError::MissingResults(_))));
        assert!(!index.is_indexed());
        assert!(index.entries().is_empty());
    }
}

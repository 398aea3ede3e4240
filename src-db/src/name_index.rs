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

use std::collections::HashMap;
use std::path::Path;

use crate::error::DbError;
use crate::types::{Form, NameItem, Rig};

/// Multi-key lookup from measured device name to rig/form metadata.
///
/// A name maps to a list, not a scalar: duplicate names with different
/// forms or rigs legitimately coexist (the same model measured twice).
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    items: HashMap<String, Vec<NameItem>>,
    count: usize,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one item. Duplicates are allowed.
    pub fn add(&mut self, item: NameItem) {
        self.items.entry(item.name.clone()).or_default().push(item);
        self.count += 1;
    }

    /// All items recorded under `name`; empty if the name is absent.
    pub fn find(&self, name: &str) -> &[NameItem] {
        self.items.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find exactly one item for `name`, filtering progressively by the
    /// supplied criteria.
    ///
    /// # Errors
    ///
    /// [`DbError::NotFound`] if the filtered set is empty and
    /// [`DbError::Ambiguous`] if more than one candidate remains; the index
    /// never guesses among ties.
    pub fn find_one(
        &self,
        name: &str,
        form: Option<Form>,
        rig: Option<&str>,
    ) -> Result<&NameItem, DbError> {
        let mut candidates: Vec<&NameItem> = self.find(name).iter().collect();

        if let Some(form) = form {
            candidates.retain(|item| item.form == form);
        }
        if let Some(rig) = rig {
            candidates.retain(|item| {
                item.rig
                    .name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(rig))
            });
        }

        match candidates.len() {
            0 => Err(DbError::NotFound(name.to_string())),
            1 => Ok(candidates[0]),
            n => Err(DbError::Ambiguous {
                name: name.to_string(),
                candidates: n,
            }),
        }
    }

    /// Union with another index by re-adding all of its items.
    pub fn merge(&mut self, other: NameIndex) {
        for (_, items) in other.items {
            for item in items {
                self.add(item);
            }
        }
    }

    /// Total number of items (not distinct names).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Load a tab-separated side-file with columns
    /// `url, source_name, name, form, rig`.
    ///
    /// The header row is skipped, as are blank lines and `#` comments. Rows
    /// whose rig is the literal `ignore` are excluded. Malformed rows are
    /// logged and skipped, never fatal.
    pub fn from_tsv(path: &Path) -> Result<NameIndex, DbError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .comment(Some(b'#'))
            .from_path(path)
            .map_err(|source| DbError::SideFile {
                path: path.to_path_buf(),
                source,
            })?;

        let mut index = NameIndex::new();

        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("malformed row in {}: {}", path.display(), e);
                    continue;
                }
            };

            let name = record.get(2).unwrap_or("").trim();
            if name.is_empty() {
                if !record.iter().all(|f| f.trim().is_empty()) {
                    log::warn!("row without a name in {}: {:?}", path.display(), record);
                }
                continue;
            }

            let rig_field = record.get(4).unwrap_or("").trim();
            if rig_field == "ignore" {
                continue;
            }

            index.add(NameItem {
                name: name.to_string(),
                form: Form::from_keyword(record.get(3).unwrap_or("")),
                rig: Rig::from_label(rig_field),
            });
        }

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn item(name: &str, form: Form, rig: &str) -> NameItem {
        NameItem {
            name: name.to_string(),
            form,
            rig: Rig::from_label(rig),
        }
    }

    #[test]
    fn test_find_absent_is_empty() {
        let index = NameIndex::new();
        assert!(index.find("DT 990").is_empty());
    }

    #[test]
    fn test_find_one_single_match() {
        let mut index = NameIndex::new();
        index.add(item("DT 990", Form::OverEar, "HMS II.3"));

        let found = index.find_one("DT 990", None, None).unwrap();
        assert_eq!(found.rig, Rig::Named("HMS II.3".to_string()));
    }

    #[test]
    fn test_find_one_ambiguous_without_criteria() {
        let mut index = NameIndex::new();
        index.add(item("DT 990", Form::OverEar, "HMS II.3"));
        index.add(item("DT 990", Form::OverEar, "5128"));

        let err = index.find_one("DT 990", None, None).unwrap_err();
        assert!(matches!(err, DbError::Ambiguous { candidates: 2, .. }));
    }

    #[test]
    fn test_find_one_disambiguated_by_rig() {
        let mut index = NameIndex::new();
        index.add(item("DT 990", Form::OverEar, "HMS II.3"));
        index.add(item("DT 990", Form::OverEar, "5128"));

        let found = index.find_one("DT 990", None, Some("5128")).unwrap();
        assert_eq!(found.rig, Rig::Named("5128".to_string()));
    }

    #[test]
    fn test_find_one_filtered_to_nothing() {
        let mut index = NameIndex::new();
        index.add(item("DT 990", Form::OverEar, "HMS II.3"));

        let err = index.find_one("DT 990", Some(Form::InEar), None).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_merge_keeps_duplicates() {
        let mut a = NameIndex::new();
        a.add(item("DT 990", Form::OverEar, "HMS II.3"));
        let mut b = NameIndex::new();
        b.add(item("DT 990", Form::OverEar, "HMS II.3"));

        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.find("DT 990").len(), 2);
    }

    #[test]
    fn test_from_tsv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "url\tsource_name\tname\tform\trig\n\
             http://x\tSony WH-1000XM4\tWH-1000XM4\tover-ear\tHMS II.3\n\
             \n\
             http://x\tIgnored\tIgnored\tover-ear\tignore\n\
             not-enough-columns\n\
             http://x\tEtymotic ER4\tER4\tin-ear\tunknown\n"
        )
        .unwrap();

        let index = NameIndex::from_tsv(file.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.find("WH-1000XM4")[0].rig,
            Rig::Named("HMS II.3".to_string())
        );
        assert_eq!(index.find("ER4")[0].form, Form::InEar);
        assert!(index.find("ER4")[0].rig.is_unknown());
        assert!(index.find("Ignored").is_empty());
    }
}

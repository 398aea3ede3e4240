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
//! Indexing and local search over the bundled measurement database: the
//! per-source name indexes and crawlers, the rig/form directory-token
//! parser, and the flat searchable entry list with its ranking rules.

mod crawler;
mod error;
mod name_index;
mod path_parse;
mod search;
mod types;

pub use crawler::{CrawlerStrategy, IndexCache, fixed_rig_for, strategy_for};
pub use error::DbError;
pub use name_index::NameIndex;
pub use path_parse::parse_rig_and_form;
pub use search::{ModelGroup, SearchIndex, normalize_label};
pub use types::{Entry, Form, NameItem, Rig};

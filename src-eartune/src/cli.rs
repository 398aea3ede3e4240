//! eartune - resolve and apply device equalization profiles
//! Common command-line interface definitions
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

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the eartune binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Measurement database root. Defaults to the EARTUNE_DIR environment
    /// variable.
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// List brands matching the query.
    #[arg(long)]
    pub brands: Option<String>,

    /// List models of a brand.
    #[arg(long)]
    pub models: Option<String>,

    /// Narrow --models with a model name filter.
    #[arg(long)]
    pub model: Option<String>,

    /// Free-text search across device labels, sources and rigs.
    #[arg(long)]
    pub search: Option<String>,

    /// Resolve a device label and print its parametric EQ for every
    /// measurement variant.
    #[arg(long)]
    pub show: Option<String>,

    /// Group all entries by model and print variant counts.
    #[arg(long, default_value_t = false)]
    pub groups: bool,

    /// Maximum number of results per query.
    #[arg(long, default_value_t = 20)]
    pub max_results: usize,

    /// The sample rate for the IIR filters.
    #[arg(short, long, default_value_t = 48000.0, value_parser = parse_strictly_positive_f64)]
    pub sample_rate: f64,
}

/// Value parser rejecting zero and negative sample rates.
pub fn parse_strictly_positive_f64(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(format!("`{s}` is not strictly positive"))
    }
}

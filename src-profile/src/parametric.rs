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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ProfileError;

/// Filter types appearing in parametric EQ descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeqFilterType {
    /// Peaking (bell) filter
    Peak,
    /// Low-shelf filter
    Lowshelf,
    /// High-shelf filter
    Highshelf,
    /// Low-pass filter with explicit Q
    LowpassQ,
    /// High-pass filter with explicit Q
    HighpassQ,
}

impl PeqFilterType {
    /// Returns the short code used in the text format (e.g., "PK").
    pub fn short_name(&self) -> &'static str {
        match self {
            PeqFilterType::Peak => "PK",
            PeqFilterType::Lowshelf => "LSC",
            PeqFilterType::Highshelf => "HSC",
            PeqFilterType::LowpassQ => "LPQ",
            PeqFilterType::HighpassQ => "HPQ",
        }
    }

    /// Parses a short code from the text format.
    ///
    /// "LS"/"HS" are accepted as aliases for the shelf codes; some sources
    /// emit them without the slope suffix.
    pub fn from_short_name(code: &str) -> Option<PeqFilterType> {
        match code {
            "PK" => Some(PeqFilterType::Peak),
            "LSC" | "LS" => Some(PeqFilterType::Lowshelf),
            "HSC" | "HS" => Some(PeqFilterType::Highshelf),
            "LPQ" => Some(PeqFilterType::LowpassQ),
            "HPQ" => Some(PeqFilterType::HighpassQ),
            _ => None,
        }
    }
}

/// One band of a parametric EQ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametricEqBand {
    /// The type of filter
    pub filter_type: PeqFilterType,
    /// Center frequency in Hz
    pub frequency_hz: f64,
    /// Gain in dB
    pub gain_db: f64,
    /// Q factor (quality factor)
    pub q: f64,
}

/// A parametric EQ: a preamp plus an ordered list of bands.
///
/// Band order is preserved exactly as read from the source text; consumers
/// that cascade filters rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParametricEq {
    /// Flat gain offset in dB applied before all bands
    pub preamp_db: f64,
    /// EQ bands in source order
    pub bands: Vec<ParametricEqBand>,
    /// Free-form annotations (device label, source, rig, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ParametricEq {
    /// Create a parametric EQ with no metadata.
    pub fn new(preamp_db: f64, bands: Vec<ParametricEqBand>) -> Self {
        Self {
            preamp_db,
            bands,
            metadata: HashMap::new(),
        }
    }

    /// Parse the text form of a parametric EQ.
    ///
    /// Expected shape:
    ///
    /// ```text
    /// Preamp: -6.4 dB
    /// Filter 1: ON PK Fc 105 Hz Gain -4.6 dB Q 2.00
    /// ```
    ///
    /// Blank lines and `#` comments are skipped. Malformed filter lines and
    /// filters marked OFF are skipped with a warning; they never abort the
    /// parse.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Empty`] if no band could be parsed at all.
    pub fn from_text(text: &str) -> Result<Self, ProfileError> {
        let mut preamp_db = 0.0;
        let mut bands = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("Preamp:") {
                match rest.split_whitespace().next().map(str::parse::<f64>) {
                    Some(Ok(v)) => preamp_db = v,
                    _ => log::warn!("unparseable preamp line skipped: {line}"),
                }
            } else if line.starts_with("Filter") {
                match parse_filter_line(line) {
                    Some(band) => bands.push(band),
                    None => log::warn!("unparseable filter line skipped: {line}"),
                }
            }
        }

        if bands.is_empty() {
            return Err(ProfileError::Empty("parametric EQ text".to_string()));
        }

        Ok(Self::new(preamp_db, bands))
    }

    /// Read and parse a parametric EQ description file.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(&text)
    }

    /// Serialize to the text form parsed by [`ParametricEq::from_text`].
    pub fn to_text(&self) -> String {
        let mut res = Vec::new();
        res.push(format!("Preamp: {:.1} dB", self.preamp_db));

        for (i, band) in self.bands.iter().enumerate() {
            match band.filter_type {
                PeqFilterType::LowpassQ | PeqFilterType::HighpassQ => {
                    res.push(format!(
                        "Filter {}: ON {} Fc {:.0} Hz Q {:.2}",
                        i + 1,
                        band.filter_type.short_name(),
                        band.frequency_hz,
                        band.q
                    ));
                }
                _ => {
                    res.push(format!(
                        "Filter {}: ON {} Fc {:.0} Hz Gain {:.2} dB Q {:.2}",
                        i + 1,
                        band.filter_type.short_name(),
                        band.frequency_hz,
                        band.gain_db,
                        band.q
                    ));
                }
            }
        }

        res.push(String::new());
        res.join("\n")
    }

    /// Reduce the EQ to at most `n` bands, keeping the bands with the
    /// largest absolute gain.
    ///
    /// The ranking is by gain magnitude, not frequency; the retained bands
    /// keep their source order.
    pub fn limit_to_bands(&self, n: usize) -> ParametricEq {
        if self.bands.len() <= n {
            return self.clone();
        }

        let mut order: Vec<usize> = (0..self.bands.len()).collect();
        order.sort_by(|&a, &b| {
            self.bands[b]
                .gain_db
                .abs()
                .partial_cmp(&self.bands[a].gain_db.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut keep: Vec<usize> = order.into_iter().take(n).collect();
        keep.sort_unstable();

        ParametricEq {
            preamp_db: self.preamp_db,
            bands: keep.iter().map(|&i| self.bands[i]).collect(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Parse one `Filter N: ON <type> Fc <f> Hz Gain <g> dB Q <q>` line.
///
/// Values are located by their keyword, so padding and field order
/// variations between sources do not matter. Returns None for lines that
/// are disabled (OFF) or missing a required value.
pub(crate) fn parse_filter_line(line: &str) -> Option<ParametricEqBand> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if !tokens.contains(&"ON") {
        return None;
    }

    let filter_type = tokens
        .iter()
        .find_map(|t| PeqFilterType::from_short_name(t))?;

    let value_after = |key: &str| -> Option<f64> {
        let pos = tokens.iter().position(|t| *t == key)?;
        tokens.get(pos + 1)?.parse::<f64>().ok()
    };

    let frequency_hz = value_after("Fc")?;

    let gain_db = match filter_type {
        PeqFilterType::LowpassQ | PeqFilterType::HighpassQ => 0.0,
        _ => value_after("Gain")?,
    };

    // Shelves and pass filters without an explicit Q get Butterworth Q.
    let q = match value_after("Q") {
        Some(q) => q,
        None if filter_type == PeqFilterType::Peak => return None,
        None => std::f64::consts::FRAC_1_SQRT_2,
    };

    Some(ParametricEqBand {
        filter_type,
        frequency_hz,
        gain_db,
        q,
    })
}

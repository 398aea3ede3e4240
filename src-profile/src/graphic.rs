use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ProfileError;
use crate::fixed::{FIXED_BAND_FREQUENCIES, FixedBandEq};

/// One frequency/gain pair of a graphic EQ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphicEqBand {
    /// Frequency in Hz
    pub frequency_hz: f64,
    /// Gain in dB
    pub gain_db: f64,
}

/// A graphic EQ: fixed-Q frequency/gain pairs, kept sorted by frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicEq {
    bands: Vec<GraphicEqBand>,
    /// Free-form annotations (device label, source, rig, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl GraphicEq {
    /// Create a graphic EQ; bands are sorted by frequency.
    pub fn new(mut bands: Vec<GraphicEqBand>) -> Self {
        bands.sort_by(|a, b| {
            a.frequency_hz
                .partial_cmp(&b.frequency_hz)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self {
            bands,
            metadata: HashMap::new(),
        }
    }

    /// Bands in ascending frequency order.
    pub fn bands(&self) -> &[GraphicEqBand] {
        &self.bands
    }

    /// Parse the text form of a graphic EQ.
    ///
    /// Expected shape (one line, pairs separated by semicolons):
    ///
    /// ```text
    /// GraphicEQ: 20 -7.2; 21 -7.1; 22 -7.0
    /// ```
    ///
    /// Malformed pairs are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Empty`] if no pair could be parsed.
    pub fn from_text(text: &str) -> Result<Self, ProfileError> {
        let mut bands = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            let Some(rest) = line.strip_prefix("GraphicEQ:") else {
                continue;
            };

            for pair in rest.split(';') {
                let pair = pair.trim();
                if pair.is_empty() {
                    continue;
                }
                let mut it = pair.split_whitespace();
                match (
                    it.next().map(str::parse::<f64>),
                    it.next().map(str::parse::<f64>),
                ) {
                    (Some(Ok(frequency_hz)), Some(Ok(gain_db))) => bands.push(GraphicEqBand {
                        frequency_hz,
                        gain_db,
                    }),
                    _ => log::warn!("unparseable graphic EQ pair skipped: {pair}"),
                }
            }
        }

        if bands.is_empty() {
            return Err(ProfileError::Empty("graphic EQ text".to_string()));
        }

        Ok(Self::new(bands))
    }

    /// Read and parse a graphic EQ description file.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(&text)
    }

    /// Serialize to the text form parsed by [`GraphicEq::from_text`].
    pub fn to_text(&self) -> String {
        let pairs: Vec<String> = self
            .bands
            .iter()
            .map(|b| format!("{} {:.1}", format_frequency(b.frequency_hz), b.gain_db))
            .collect();
        format!("GraphicEQ: {}\n", pairs.join("; "))
    }

    /// Gain at `frequency_hz`, linearly interpolated between the two
    /// surrounding bands.
    ///
    /// Outside the stored range the edge value is returned; extrapolation is
    /// clamped, not extended. An empty EQ is flat (0 dB).
    pub fn interpolate_gain(&self, frequency_hz: f64) -> f64 {
        let n = self.bands.len();
        if n == 0 {
            return 0.0;
        }

        if frequency_hz <= self.bands[0].frequency_hz {
            return self.bands[0].gain_db;
        }
        if frequency_hz >= self.bands[n - 1].frequency_hz {
            return self.bands[n - 1].gain_db;
        }

        // Find the two bands that bracket the target frequency
        let mut j = 0;
        while j < n - 1 && self.bands[j + 1].frequency_hz < frequency_hz {
            j += 1;
        }

        let left = self.bands[j];
        let right = self.bands[j + 1];
        let t = (frequency_hz - left.frequency_hz) / (right.frequency_hz - left.frequency_hz);
        left.gain_db + t * (right.gain_db - left.gain_db)
    }

    /// Resample onto an arbitrary target frequency set.
    pub fn adapt_to(&self, frequencies: &[f64]) -> GraphicEq {
        let bands = frequencies
            .iter()
            .map(|&frequency_hz| GraphicEqBand {
                frequency_hz,
                gain_db: self.interpolate_gain(frequency_hz),
            })
            .collect();
        GraphicEq {
            bands,
            metadata: self.metadata.clone(),
        }
    }

    /// Convert to a fixed-band EQ by resampling onto the ten standard
    /// frequencies. The preamp compensates the largest boost so the result
    /// does not clip.
    pub fn to_fixed_band(&self) -> FixedBandEq {
        let adapted = self.adapt_to(&FIXED_BAND_FREQUENCIES);
        let max_boost = adapted
            .bands
            .iter()
            .fold(0.0f64, |acc, b| acc.max(b.gain_db));
        let mut fixed = FixedBandEq::new(-max_boost, adapted.bands);
        fixed.metadata = self.metadata.clone();
        fixed
    }
}

/// Frequencies are written without a decimal point when integral, matching
/// the source files.
fn format_frequency(f: f64) -> String {
    if f.fract() == 0.0 {
        format!("{:.0}", f)
    } else {
        format!("{:.1}", f)
    }
}

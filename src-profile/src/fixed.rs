use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ProfileError;
use crate::graphic::GraphicEqBand;
use crate::parametric::{ParametricEq, ParametricEqBand, PeqFilterType, parse_filter_line};

/// The ten standard center frequencies of a fixed-band EQ, in Hz.
pub const FIXED_BAND_FREQUENCIES: [f64; 10] = [
    31.0, 62.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// Q factor shared by every fixed band (and by graphic-EQ-derived filters).
pub const FIXED_BAND_Q: f64 = std::f64::consts::SQRT_2;

/// A fixed-band EQ: ten gains at the standard frequencies, fixed Q.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedBandEq {
    /// Flat gain offset in dB applied before all bands
    pub preamp_db: f64,
    bands: Vec<GraphicEqBand>,
    /// Free-form annotations (device label, source, rig, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl FixedBandEq {
    pub fn new(preamp_db: f64, bands: Vec<GraphicEqBand>) -> Self {
        Self {
            preamp_db,
            bands,
            metadata: HashMap::new(),
        }
    }

    /// Build from ten gains at the standard frequencies.
    pub fn from_gains(preamp_db: f64, gains: &[f64; 10]) -> Self {
        let bands = FIXED_BAND_FREQUENCIES
            .iter()
            .zip(gains.iter())
            .map(|(&frequency_hz, &gain_db)| GraphicEqBand {
                frequency_hz,
                gain_db,
            })
            .collect();
        Self::new(preamp_db, bands)
    }

    pub fn bands(&self) -> &[GraphicEqBand] {
        &self.bands
    }

    /// Parse the text form of a fixed-band EQ.
    ///
    /// The format is the parametric one restricted to peaking filters at the
    /// standard frequencies:
    ///
    /// ```text
    /// Preamp: -5.8 dB
    /// Filter 1: ON PK Fc 31 Hz Gain 5.8 dB Q 1.41
    /// ```
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
                    Some(band) => bands.push(GraphicEqBand {
                        frequency_hz: band.frequency_hz,
                        gain_db: band.gain_db,
                    }),
                    None => log::warn!("unparseable filter line skipped: {line}"),
                }
            }
        }

        if bands.is_empty() {
            return Err(ProfileError::Empty("fixed-band EQ text".to_string()));
        }

        Ok(Self::new(preamp_db, bands))
    }

    /// Read and parse a fixed-band EQ description file.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(&text)
    }

    /// Serialize to the text form parsed by [`FixedBandEq::from_text`].
    pub fn to_text(&self) -> String {
        let mut res = Vec::new();
        res.push(format!("Preamp: {:.1} dB", self.preamp_db));
        for (i, band) in self.bands.iter().enumerate() {
            res.push(format!(
                "Filter {}: ON PK Fc {:.0} Hz Gain {:.2} dB Q {:.2}",
                i + 1,
                band.frequency_hz,
                band.gain_db,
                FIXED_BAND_Q
            ));
        }
        res.push(String::new());
        res.join("\n")
    }

    /// View as a parametric EQ: one peaking band per fixed band, Q = sqrt 2.
    pub fn to_parametric(&self) -> ParametricEq {
        let bands = self
            .bands
            .iter()
            .map(|b| ParametricEqBand {
                filter_type: PeqFilterType::Peak,
                frequency_hz: b.frequency_hz,
                gain_db: b.gain_db,
                q: FIXED_BAND_Q,
            })
            .collect();
        let mut peq = ParametricEq::new(self.preamp_db, bands);
        peq.metadata = self.metadata.clone();
        peq
    }
}

use ndarray::Array1;

use eartune_profile::{GraphicEq, GraphicEqBand, ParametricEq};

use crate::biquad::{Biquad, FilterError};

/// Create a standard logarithmic frequency grid
pub fn log_frequency_grid(n_points: usize, f_min: f64, f_max: f64) -> Array1<f64> {
    Array1::logspace(10.0, f_min.log10(), f_max.log10(), n_points)
}

/// Combined response in dB of a filter chain on a frequency grid.
///
/// Filters cascade, so responses add in dB.
pub fn chain_log_response(freqs: &Array1<f64>, chain: &[Biquad]) -> Array1<f64> {
    let mut response = Array1::zeros(freqs.len());
    for filter in chain {
        response += &filter.log_result_grid(freqs);
    }
    response
}

/// Response in dB of a parametric profile's bands on a frequency grid.
///
/// The preamp is not included; it is a flat offset.
pub fn profile_response_db(
    freqs: &Array1<f64>,
    profile: &ParametricEq,
    sample_rate: f64,
) -> Result<Array1<f64>, FilterError> {
    let chain: Vec<Biquad> = profile
        .bands
        .iter()
        .map(|band| Biquad::from_band(band, sample_rate))
        .collect::<Result<_, _>>()?;
    Ok(chain_log_response(freqs, &chain))
}

/// Preamp in dB that compensates the profile's largest boost, so the
/// equalized signal cannot clip. Never positive.
pub fn suggested_preamp_db(profile: &ParametricEq, sample_rate: f64) -> Result<f64, FilterError> {
    // 20 Hz to 20 kHz with 200 points, like the response plots
    let freqs = log_frequency_grid(200, 20.0, 20000.0);
    let response = profile_response_db(&freqs, profile, sample_rate)?;

    let overall = response
        .iter()
        .cloned()
        .fold(0.0f64, |acc, x| acc.max(x.max(0.0)));
    Ok(-overall)
}

/// Sample a parametric profile's response onto a graphic EQ.
pub fn parametric_to_graphic(
    profile: &ParametricEq,
    frequencies: &[f64],
    sample_rate: f64,
) -> Result<GraphicEq, FilterError> {
    let freqs = Array1::from(frequencies.to_vec());
    let response = profile_response_db(&freqs, profile, sample_rate)?;

    let bands = frequencies
        .iter()
        .zip(response.iter())
        .map(|(&frequency_hz, &gain_db)| GraphicEqBand {
            frequency_hz,
            gain_db,
        })
        .collect();

    let mut graphic = GraphicEq::new(bands);
    graphic.metadata = profile.metadata.clone();
    Ok(graphic)
}

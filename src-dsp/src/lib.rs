//! Biquad filters and the real-time equalizer engine.
//!
//! [`Biquad`] is the single-filter primitive: audio-EQ-cookbook peaking,
//! shelf and pass coefficients with independent history per stereo channel.
//! [`Equalizer`] cascades one biquad per profile band over interleaved
//! stereo buffers and swaps chains glitch-free through immutable snapshots.

mod biquad;
mod engine;
mod response;

pub use biquad::{Biquad, BiquadFilterType, FilterError};
pub use engine::{AudioProcessor, EqControl, Equalizer, MAX_BANDS};
pub use response::{
    chain_log_response, log_frequency_grid, parametric_to_graphic, profile_response_db,
    suggested_preamp_db,
};

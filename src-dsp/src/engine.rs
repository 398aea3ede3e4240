// ============================================================================
// Equalizer Engine
// ============================================================================
//
// Owns the ordered chain of biquad filters built from the active profile and
// applies it, plus the profile preamp, to interleaved stereo buffers.
//
// Reconfiguration never mutates the chain in place: the control plane builds
// a complete immutable snapshot off the render thread and publishes it
// through a shared slot; the render side installs it at the next buffer
// boundary. The render path therefore never observes a partially rebuilt
// chain, and it never panics: a degenerate band is skipped, a poisoned slot
// leaves the previous chain running.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use eartune_profile::ParametricEq;

use crate::biquad::Biquad;

/// Upper bound on the chain length. Profiles with more bands are reduced by
/// gain-magnitude ranking before any filter is built.
pub const MAX_BANDS: usize = 10;

/// Interface consumed by the playback engine's render graph.
///
/// Buffers are interleaved stereo PCM at a fixed sample rate, transformed in
/// place; the output has the shape of the input.
pub trait AudioProcessor {
    /// (Re)configure for a sample rate. Resets all filter history.
    fn initialize(&mut self, sample_rate: f64);
    /// Transform one interleaved stereo buffer in place.
    fn process(&mut self, buffer: &mut [f32]);
    /// Drop accumulated filter history without touching coefficients.
    fn reset(&mut self);
}

/// A fully built chain ready to install: fresh filters, preamp, and the
/// profile it was built from (retained for sample-rate rebuilds).
#[derive(Debug, Clone)]
struct ChainSnapshot {
    filters: Vec<Biquad>,
    preamp_gain: f64,
    profile: Option<ParametricEq>,
}

impl ChainSnapshot {
    fn disabled() -> Self {
        Self {
            filters: Vec::new(),
            preamp_gain: 1.0,
            profile: None,
        }
    }

    fn from_profile(profile: &ParametricEq, sample_rate: f64) -> Self {
        let limited = profile.limit_to_bands(MAX_BANDS);

        let mut filters = Vec::with_capacity(limited.bands.len());
        for band in &limited.bands {
            match Biquad::from_band(band, sample_rate) {
                Ok(filter) => filters.push(filter),
                Err(e) => log::warn!("skipping degenerate EQ band: {}", e),
            }
        }

        Self {
            filters,
            preamp_gain: 10.0_f64.powf(limited.preamp_db / 20.0),
            profile: Some(limited),
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    pending: Mutex<Option<ChainSnapshot>>,
    generation: AtomicU64,
    flush: AtomicBool,
    sample_rate_bits: AtomicU64,
}

impl Shared {
    fn sample_rate(&self) -> f64 {
        f64::from_bits(self.sample_rate_bits.load(Ordering::Acquire))
    }

    fn publish(&self, snapshot: ChainSnapshot) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(snapshot);
            self.generation.fetch_add(1, Ordering::Release);
        }
    }
}

/// Control-plane handle to a running [`Equalizer`].
///
/// Snapshot construction (coefficient math included) happens on the calling
/// thread; the render thread only swaps the finished chain in.
#[derive(Debug, Clone)]
pub struct EqControl {
    shared: Arc<Shared>,
}

impl EqControl {
    /// Replace the chain with one built from `profile`.
    pub fn apply_profile(&self, profile: &ParametricEq) {
        let snapshot = ChainSnapshot::from_profile(profile, self.shared.sample_rate());
        self.shared.publish(snapshot);
    }

    /// Clear the chain to an identity pass-through.
    pub fn disable(&self) {
        self.shared.publish(ChainSnapshot::disabled());
    }

    /// Ask the engine to reset filter history at the next buffer boundary,
    /// e.g. after a discontinuous seek.
    pub fn flush(&self) {
        self.shared.flush.store(true, Ordering::Release);
    }
}

/// The multi-band equalizer engine.
///
/// Owned by the render path. State machine: Disabled (no chain) and Active
/// (chain built from a profile); `apply_profile` moves to Active, `disable`
/// back to Disabled, and both complete before the next buffer is processed.
#[derive(Debug)]
pub struct Equalizer {
    sample_rate: f64,
    filters: Vec<Biquad>,
    preamp_gain: f64,
    profile: Option<ParametricEq>,
    installed_generation: u64,
    shared: Arc<Shared>,
}

impl Equalizer {
    /// Create a disabled equalizer for `sample_rate`.
    pub fn new(sample_rate: f64) -> Self {
        let shared = Arc::new(Shared::default());
        shared
            .sample_rate_bits
            .store(sample_rate.to_bits(), Ordering::Release);
        Self {
            sample_rate,
            filters: Vec::new(),
            preamp_gain: 1.0,
            profile: None,
            installed_generation: 0,
            shared,
        }
    }

    /// A cloneable control handle for reconfiguration from another thread.
    pub fn controller(&self) -> EqControl {
        EqControl {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Atomically replace the chain with one built from `profile`.
    pub fn apply_profile(&mut self, profile: &ParametricEq) {
        self.install(ChainSnapshot::from_profile(profile, self.sample_rate));
        self.installed_generation = self.shared.generation.load(Ordering::Acquire);
    }

    /// Clear the chain to an identity pass-through.
    pub fn disable(&mut self) {
        self.install(ChainSnapshot::disabled());
        self.installed_generation = self.shared.generation.load(Ordering::Acquire);
    }

    /// Reset all filter history, keeping coefficients.
    pub fn flush(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }

    /// Whether a profile is currently applied.
    pub fn is_active(&self) -> bool {
        self.profile.is_some()
    }

    /// Number of filters in the active chain.
    pub fn band_count(&self) -> usize {
        self.filters.len()
    }

    /// Run the chain over one interleaved stereo buffer, in place.
    ///
    /// Filters run in series in profile band order, per frame, per channel.
    /// A trailing incomplete frame is left untouched.
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        self.sync_shared();

        if self.filters.is_empty() && self.preamp_gain == 1.0 {
            return;
        }

        for frame in buffer.chunks_exact_mut(2) {
            let mut left = frame[0] as f64 * self.preamp_gain;
            let mut right = frame[1] as f64 * self.preamp_gain;

            for filter in &mut self.filters {
                let (l, r) = filter.process_stereo(left, right);
                left = l;
                right = r;
            }

            frame[0] = left as f32;
            frame[1] = right as f32;
        }
    }

    /// Pick up control-plane requests at a buffer boundary.
    fn sync_shared(&mut self) {
        let generation = self.shared.generation.load(Ordering::Acquire);
        if generation != self.installed_generation {
            let snapshot = self
                .shared
                .pending
                .lock()
                .ok()
                .and_then(|mut pending| pending.take());
            if let Some(snapshot) = snapshot {
                self.install(snapshot);
            }
            self.installed_generation = generation;
        }

        if self.shared.flush.swap(false, Ordering::AcqRel) {
            self.flush();
        }
    }

    /// Install a complete snapshot. Filters arrive with zeroed history, so
    /// nothing from the previous chain can ring into the new one.
    fn install(&mut self, snapshot: ChainSnapshot) {
        self.filters = snapshot.filters;
        self.preamp_gain = snapshot.preamp_gain;
        self.profile = snapshot.profile;
    }
}

impl AudioProcessor for Equalizer {
    fn initialize(&mut self, sample_rate: f64) {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.shared
                .sample_rate_bits
                .store(sample_rate.to_bits(), Ordering::Release);
            // Rebuild the same profile at the new rate; band order is
            // preserved because the snapshot is rebuilt from the same bands.
            if let Some(profile) = self.profile.take() {
                self.install(ChainSnapshot::from_profile(&profile, sample_rate));
            }
        }
        self.flush();
    }

    fn process(&mut self, buffer: &mut [f32]) {
        self.process_buffer(buffer);
    }

    fn reset(&mut self) {
        self.flush();
    }
}

//! eartune - resolve and apply device equalization profiles
//!
//! This crate ties the specialized crates together: a device label or a
//! stored profile id goes into the resolver, comes back as a
//! [`SavedEqProfile`], and lands in the equalizer engine's filter chain.
//!
//! - `eartune_env`: database location and layout
//! - `eartune_profile`: parametric/graphic/fixed-band EQ model
//! - `eartune_db`: measurement indexing and local search
//! - `eartune_dsp`: biquad filters and the real-time engine

// Re-export the specialized crates
pub use eartune_db as db;
pub use eartune_dsp as dsp;
pub use eartune_env as env;
pub use eartune_profile as profile;

/// Common CLI argument definitions
pub mod cli;
/// Entry-to-profile resolution pipeline
pub mod resolver;
/// Saved profile model and in-memory store
pub mod store;

pub use resolver::{ResolveError, Resolver, select_profile};
pub use store::{ProfileStore, SavedEqProfile, StoreError};

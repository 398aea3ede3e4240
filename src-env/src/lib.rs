//! Environment utilities and measurement-database layout constants for eartune
//!
//! The measurement database is a read-only directory tree bundled with the
//! application. This crate knows where that tree lives (`EARTUNE_DIR`) and how
//! it is laid out; every other crate goes through these helpers instead of
//! hardcoding path fragments.

pub mod constants;
pub mod env_utils;

pub use constants::*;
pub use env_utils::{EnvError, get_eartune_dir};

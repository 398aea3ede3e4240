//! Names of the fixed pieces of the measurement-database layout.
//!
//! The database tree looks like:
//!
//! ```text
//! {root}/results/{source}/{rig and form}/{device}/{device} ParametricEQ.txt
//! {root}/measurements/{source}/name_index.tsv
//! ```

use std::path::{Path, PathBuf};

/// Environment variable pointing at the measurement-database root directory.
pub const EARTUNE_DIR: &str = "EARTUNE_DIR";

/// Subdirectory of the root holding per-source EQ results.
pub const RESULTS_DIR: &str = "results";

/// Subdirectory of the root holding per-source measurement metadata.
pub const MEASUREMENTS_DIR: &str = "measurements";

/// Tab-separated side-file mapping measured device names to rig and form.
pub const NAME_INDEX_FILE: &str = "name_index.tsv";

/// Suffix of the parametric EQ description inside a device directory.
pub const PARAMETRIC_EQ_SUFFIX: &str = "ParametricEQ.txt";

/// Suffix of the graphic EQ description inside a device directory.
pub const GRAPHIC_EQ_SUFFIX: &str = "GraphicEQ.txt";

/// Suffix of the fixed-band EQ description inside a device directory.
pub const FIXED_BAND_EQ_SUFFIX: &str = "FixedBandEQ.txt";

/// Path of the results tree under `root`.
pub fn results_dir(root: &Path) -> PathBuf {
    root.join(RESULTS_DIR)
}

/// Path of the measurements tree for one source under `root`.
pub fn measurements_dir(root: &Path, source: &str) -> PathBuf {
    root.join(MEASUREMENTS_DIR).join(source)
}

/// Path of a source's name index side-file under `root`.
pub fn name_index_path(root: &Path, source: &str) -> PathBuf {
    measurements_dir(root, source).join(NAME_INDEX_FILE)
}

/// Path of a device's EQ description file under `root`.
///
/// The file is named after the device itself, e.g.
/// `Sony WH-1000XM4/Sony WH-1000XM4 ParametricEQ.txt`.
pub fn eq_file_path(
    root: &Path,
    source: &str,
    form_dir: &str,
    device: &str,
    suffix: &str,
) -> PathBuf {
    results_dir(root)
        .join(source)
        .join(form_dir)
        .join(device)
        .join(format!("{} {}", device, suffix))
}

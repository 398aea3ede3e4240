//! Environment variable utilities for eartune
//!
//! This module provides utilities for handling environment variables,
//! particularly the EARTUNE_DIR variable that points to the bundled
//! measurement-database root.

use crate::constants::EARTUNE_DIR;
use std::env;
use std::path::PathBuf;

/// Error type for environment variable issues
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "EARTUNE_DIR environment variable is not set. Please set it to the measurement database root directory (e.g., export EARTUNE_DIR=/path/to/database)"
    )]
    EartuneDirNotSet,

    #[error("EARTUNE_DIR points to a non-existent directory: {0}")]
    EartuneDirNotFound(PathBuf),
}

/// Get the EARTUNE_DIR environment variable and validate it exists
///
/// # Returns
///
/// Returns the path to the measurement database root directory.
///
/// # Errors
///
/// Returns an error if:
/// - EARTUNE_DIR is not set
/// - EARTUNE_DIR points to a non-existent directory
pub fn get_eartune_dir() -> Result<PathBuf, EnvError> {
    let dir = env::var(EARTUNE_DIR).map_err(|_| EnvError::EartuneDirNotSet)?;

    let path = PathBuf::from(dir);

    if !path.exists() {
        return Err(EnvError::EartuneDirNotFound(path));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eartune_dir_not_set() {
        let original = env::var(EARTUNE_DIR).ok();
        unsafe { env::remove_var(EARTUNE_DIR) };

        let result = get_eartune_dir();
        assert!(matches!(result, Err(EnvError::EartuneDirNotSet)));

        if let Some(value) = original {
            unsafe { env::set_var(EARTUNE_DIR, value) };
        }
    }

    #[test]
    fn test_eartune_dir_nonexistent() {
        let original = env::var(EARTUNE_DIR).ok();
        unsafe { env::set_var(EARTUNE_DIR, "/this/path/should/not/exist") };

        let result = get_eartune_dir();
        assert!(matches!(result, Err(EnvError::EartuneDirNotFound(_))));

        if let Some(value) = original {
            unsafe { env::set_var(EARTUNE_DIR, value) };
        } else {
            unsafe { env::remove_var(EARTUNE_DIR) };
        }
    }
}

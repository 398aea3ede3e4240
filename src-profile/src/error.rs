use std::path::PathBuf;

/// Error type for profile parsing and loading
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to read EQ description {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable EQ bands in {0}")]
    Empty(String),
}

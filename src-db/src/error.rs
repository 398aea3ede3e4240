use std::path::PathBuf;

/// Error type for database indexing and lookup
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("no entry named {0}")]
    NotFound(String),

    #[error("name {name} is ambiguous: {candidates} candidates match the given criteria")]
    Ambiguous { name: String, candidates: usize },

    #[error("results directory not found: {0}")]
    MissingResults(PathBuf),

    #[error("failed to read side-file {path}: {source}")]
    SideFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

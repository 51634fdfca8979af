use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no metadata for entity {entity}")]
    UnknownEntity { entity: String },

    #[error("{entity}: record without {attribute}")]
    MissingId { entity: String, attribute: String },

    #[error("{entity}: request rejected: {message}")]
    Rejected { entity: String, message: String },
}

pub type Result<T> = std::result::Result<T, SyncError>;

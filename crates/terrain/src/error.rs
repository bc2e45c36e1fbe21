use std::path::PathBuf;

use terrain_decode::{ChunkKind, DecodeError};
use thiserror::Error;

/// Result type for scene, container and editor-file operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while converting a scene.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("malformed scene description: {0}")]
    Scene(#[from] roxmltree::Error),

    #[error("missing metadata: {0}")]
    MissingMetadata(&'static str),

    #[error("{kind} data of node {node} has {actual} samples, {expected} required")]
    NodeDataTooShort {
        kind: ChunkKind,
        node: usize,
        expected: usize,
        actual: usize,
    },

    #[error("corrupt editor payload: {0}")]
    CorruptPayload(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

//! Error types for the voxel editor

use thiserror::Error;

/// Main error type for the editor
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid color: {0}")]
    Color(String),

    #[error("Invalid voxel key: {0}")]
    InvalidKey(String),

    #[error("Replay script error: {0}")]
    Script(String),
}

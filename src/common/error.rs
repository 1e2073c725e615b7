//! Boundary errors.
//!
//! Nothing inside the frame loop returns these: they surface only where
//! configuration or persisted data enters the game.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("volume {0} is outside the range [0, 1]")]
    VolumeOutOfRange(f32),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("profile data is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

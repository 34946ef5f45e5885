//! # Application Errors
//!
//! Top-level error for the CLI entrypoint, wrapping the layer errors.

use crate::client::FetchError;
use crate::config::ConfigError;
use charadex_core::CharadexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CharadexError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// Whether this is an exact-name or id lookup with no match.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Core(CharadexError::CharacterNotFound(_)))
    }
}

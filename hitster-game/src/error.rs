//! Error types for hitster-game

use hitster_dates::DatesError;
use thiserror::Error;

/// Why a catalog or playback call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorKind {
    /// Token missing, expired or lacking scope
    Unauthorized,
    NotFound,
    RateLimited,
    /// Connection-level failure
    Transport,
    /// Response did not have the expected shape
    InvalidResponse,
}

impl std::fmt::Display for CatalogErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CatalogErrorKind::Unauthorized => "unauthorized",
            CatalogErrorKind::NotFound => "not found",
            CatalogErrorKind::RateLimited => "rate limited",
            CatalogErrorKind::Transport => "transport",
            CatalogErrorKind::InvalidResponse => "invalid response",
        };
        f.write_str(name)
    }
}

/// Failure reported by the catalog/playback collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct CatalogError {
    pub kind: CatalogErrorKind,
    pub message: String,
}

impl CatalogError {
    pub fn new(kind: CatalogErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Game session error
#[derive(Debug, Error)]
pub enum GameError {
    /// Catalog or playback call failed
    #[error("Catalog error ({kind}): {message}")]
    Catalog {
        kind: CatalogErrorKind,
        message: String,
    },

    #[error("Dates error: {0}")]
    Dates(#[from] DatesError),

    /// Snapshot could not be persisted
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<CatalogError> for GameError {
    fn from(e: CatalogError) -> Self {
        GameError::Catalog {
            kind: e.kind,
            message: e.message,
        }
    }
}

impl From<hitster_common::Error> for GameError {
    fn from(e: hitster_common::Error) -> Self {
        GameError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

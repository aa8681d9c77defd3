//! Error types for the paint session.

use maskpaint_config::ConfigError;
use painting::{ColorError, ObjError};

use crate::export::ExportError;

/// Errors returned by [`crate::PaintSession`] operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    #[error("Model '{0}' is locked")]
    LockedModel(String),

    #[error("Failed to export view: {0}")]
    Export(#[from] ExportError),
}

/// Why a model asset could not be turned into geometry. Reported by the
/// asset loader; the scene recovers with the fallback sphere.
#[derive(Debug, thiserror::Error)]
pub enum AssetLoadError {
    #[error("Model asset not found: {0}")]
    NotFound(String),

    #[error("Invalid OBJ: {0}")]
    Parse(#[from] ObjError),

    #[error("{0}")]
    Other(String),
}

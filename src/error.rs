//! Object-scoped failures of the tableau core.
//!
//! Every variant describes a problem with exactly one manifest slot or one
//! configuration entry. None of them is fatal to the frame loop: the caller
//! logs the error and keeps going with whatever is already in the scene.

/// Error type for loading, normalising and placing scene objects.
#[derive(Debug, thiserror::Error)]
pub enum TableauError {
    /// The mesh has no usable extent (empty, flat on every axis or not finite).
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// The loader could not deliver the resource at `path`.
    #[error("Failed to load asset {path}: {source}")]
    AssetLoad {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The manifest and placement table disagree.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// A slot received a second completion within the same load epoch.
    #[error("Slot {slot} was already resolved in this epoch")]
    DuplicateCompletion { slot: usize },
}

impl TableauError {
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TableauError>;

/// Error taxonomy for the rendering pipeline
use thiserror::Error;

/// Errors raised while building or drawing a frame.
///
/// None of these are fatal: the render path recovers from each of them
/// locally and logs a diagnostic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisualizerError {
    /// A point handed to the projection had a missing or non-finite coordinate,
    /// or landed at/behind the eye.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Shaft parameters cannot produce a frame (non-positive dimension, zero segments).
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A mesh row is empty or shorter than its neighbour.
    #[error("missing mesh data in row {row}: expected {expected} points, found {found}")]
    MissingMeshData {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl VisualizerError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading a [`crate::config::VisualizerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

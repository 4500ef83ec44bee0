//! Error types for sorter construction and configuration.

use thiserror::Error;

/// Errors raised while configuring the spatial sorter.
///
/// Nothing in the per-call reorder path returns one of these: a sorter that
/// was constructed successfully cannot fail at update time.
#[derive(Error, Debug)]
pub enum SortError {
    /// Bin width below the supported minimum.
    #[error("bin width {bin_width} is much too small (minimum {min})")]
    BinWidthTooSmall {
        /// The rejected bin width.
        bin_width: f32,
        /// The smallest accepted bin width.
        min: f32,
    },

    /// Any other invalid configuration value.
    #[error("invalid sorter configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for `SorterConfig`.
    #[error("failed to parse config JSON: {source}")]
    ConfigParse {
        /// Underlying parse error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SortError>;

//! Configuration parsing and validation for the spatial sorter

use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{Result, SortError};

/// Smallest bin width the sorter accepts.
pub const MIN_BIN_WIDTH: f32 = 0.01;

/// Cell traversal used for two-dimensional systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Traversal2D {
    /// Row-major enumeration of the cells (historical default).
    Raster,
    /// True 2D Hilbert curve.
    Hilbert,
}

/// Spatial sorter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SorterConfig {
    /// Target bin width; shrunk as needed to reach a power-of-two grid
    #[serde(default = "default_bin_width")]
    pub bin_width: f32,
    /// Fixed grid resolution, overriding the bin-width derivation
    #[serde(default)]
    pub grid: Option<u32>,
    /// Grid resolution above which a memory caution is logged in 2D
    #[serde(default = "default_large_grid_warning_2d")]
    pub large_grid_warning_2d: u32,
    /// Grid resolution above which a memory caution is logged in 3D
    #[serde(default = "default_large_grid_warning_3d")]
    pub large_grid_warning_3d: u32,
    /// Cell visitation order for 2D systems
    #[serde(default = "default_traversal_2d")]
    pub traversal_2d: Traversal2D,
    /// Classify particles on the rayon thread pool
    #[serde(default)]
    pub parallel_binning: bool,
}

// Default values
fn default_bin_width() -> f32 {
    1.0
}

fn default_large_grid_warning_2d() -> u32 {
    1000
}

fn default_large_grid_warning_3d() -> u32 {
    100
}

fn default_traversal_2d() -> Traversal2D {
    Traversal2D::Raster
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            bin_width: default_bin_width(),
            grid: None,
            large_grid_warning_2d: default_large_grid_warning_2d(),
            large_grid_warning_3d: default_large_grid_warning_3d(),
            traversal_2d: default_traversal_2d(),
            parallel_binning: false,
        }
    }
}

impl SorterConfig {
    /// Configuration with the given bin width and defaults everywhere else.
    pub fn with_bin_width(bin_width: f32) -> Self {
        Self {
            bin_width,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SortError::ConfigRead {
            path: path.to_string(),
            source,
        })?;

        let config: SorterConfig = serde_json::from_str(&contents)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_bin_width(self.bin_width)?;

        if let Some(grid) = self.grid {
            if grid == 0 {
                return Err(SortError::InvalidConfig {
                    message: "grid must be at least 1".to_string(),
                });
            }
        }

        if self.large_grid_warning_2d == 0 || self.large_grid_warning_3d == 0 {
            return Err(SortError::InvalidConfig {
                message: "large grid warning thresholds must be positive".to_string(),
            });
        }

        Ok(())
    }
}

/// Reject bin widths below [`MIN_BIN_WIDTH`] (NaN included).
pub(crate) fn validate_bin_width(bin_width: f32) -> Result<()> {
    if !(bin_width >= MIN_BIN_WIDTH) {
        return Err(SortError::BinWidthTooSmall {
            bin_width,
            min: MIN_BIN_WIDTH,
        });
    }
    Ok(())
}

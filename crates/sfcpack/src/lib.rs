//! Space-filling-curve particle sorter
//!
//! Periodically reorders a struct-of-arrays particle set so that particles
//! close in space are close in memory. The particle ordering follows a
//! Hilbert curve over a power-of-two grid laid across the simulation box;
//! stable particle identities (tags) survive every reorder through the
//! reverse `rtag` map.
//!
//! # Modules
//! - [`particle`] -- Struct-of-arrays particle storage with tag/rtag bookkeeping.
//! - [`box_dim`] -- Simulation box extents and dimensionality.
//! - [`config`] -- Sorter configuration (JSON, serde defaults, validation).
//! - [`grid`] -- Power-of-two sorting grid derived from the box and bin width.
//! - [`traversal`] -- Hilbert (3D) and raster/Hilbert (2D) cell traversal orders.
//! - [`binner`] -- Particle-to-cell bucketing and sort-order concatenation.
//! - [`permute`] -- Gather-and-copy-back permutation of every particle field.
//! - [`updater`] -- The sorting pass driver with its traversal cache.
//! - [`notify`] -- Reorder-completed signal for index-caching consumers.
//! - [`neighbor`] -- Uniform-grid neighbor search that rebuilds after reorders.

#![warn(missing_docs)]

pub mod binner;
pub mod box_dim;
pub mod config;
pub mod error;
pub mod grid;
pub mod neighbor;
pub mod notify;
pub mod particle;
pub mod permute;
pub mod traversal;
pub mod updater;

pub use box_dim::{BoxDim, Dimensionality};
pub use config::{SorterConfig, Traversal2D, MIN_BIN_WIDTH};
pub use error::SortError;
pub use grid::SortGrid;
pub use neighbor::NeighborGrid;
pub use notify::{SortNotifier, SortSubscription};
pub use particle::{ParticleData, ParticleInit};
pub use updater::{SfcPackUpdater, SortStats};

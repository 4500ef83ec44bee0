//! Sorting pass driver.
//!
//! One call to [`SfcPackUpdater::update`] runs the whole pipeline:
//!
//! ```text
//! box + bin width ──> SortGrid ──(Mmax or dims changed?)──> traversal order
//!                        │                                      │
//! positions ───────> Binner ──> buckets ──(walk in order)──> sort_order
//!                                                               │
//! every particle field <── ArrayPermuter <──────────────────────┘
//!        │
//!        └──> rtag rebuilt, reorder signal emitted
//! ```
//!
//! The traversal order is the only state that survives between calls. It is
//! regenerated when the grid resolution or the dimensionality changes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::binner::Binner;
use crate::box_dim::{BoxDim, Dimensionality};
use crate::config::{validate_bin_width, SorterConfig};
use crate::error::Result;
use crate::grid::SortGrid;
use crate::particle::ParticleData;
use crate::permute::ArrayPermuter;
use crate::traversal;

/// Summary of one sorting pass.
#[derive(Debug, Clone, Copy)]
pub struct SortStats {
    /// Grid cells per active axis.
    pub mmax: u32,
    /// Total number of grid cells.
    pub num_cells: usize,
    /// Whether the traversal order had to be regenerated.
    pub regenerated: bool,
    /// Wall time of the pass.
    pub elapsed: Duration,
}

/// Traversal order cached for one grid geometry.
#[derive(Debug)]
struct TraversalCache {
    mmax: u32,
    dims: Dimensionality,
    order: Arc<[u32]>,
}

impl TraversalCache {
    /// The cached order is reusable only for the same resolution and dimensionality.
    fn matches(&self, grid: &SortGrid) -> bool {
        self.mmax == grid.mmax && self.dims == grid.dims
    }
}

/// Reorders particles along a space-filling curve for memory locality.
///
/// The updater does not decide when to run; call [`update`](Self::update)
/// from whatever schedule the simulation uses. It needs exclusive access to
/// the particle data for the duration of the call.
#[derive(Debug)]
pub struct SfcPackUpdater {
    config: SorterConfig,
    cache: Option<TraversalCache>,
    binner: Binner,
    sort_order: Vec<u32>,
    permuter: ArrayPermuter,
}

impl SfcPackUpdater {
    /// Create an updater from a validated configuration.
    pub fn new(config: SorterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: None,
            binner: Binner::new(),
            sort_order: Vec::new(),
            permuter: ArrayPermuter::new(),
        })
    }

    /// Create an updater with the given bin width and default settings.
    pub fn with_bin_width(bin_width: f32) -> Result<Self> {
        Self::new(SorterConfig::with_bin_width(bin_width))
    }

    /// Active configuration.
    pub fn config(&self) -> &SorterConfig {
        &self.config
    }

    /// Current target bin width.
    pub fn bin_width(&self) -> f32 {
        self.config.bin_width
    }

    /// Change the target bin width.
    ///
    /// The grid is re-derived on the next pass; the cached traversal order is
    /// kept if the resulting resolution does not change.
    pub fn set_bin_width(&mut self, bin_width: f32) -> Result<()> {
        validate_bin_width(bin_width)?;
        self.config.bin_width = bin_width;
        Ok(())
    }

    /// Grid that a pass over `box_dim` would use.
    pub fn grid_for(&self, box_dim: &BoxDim, dims: Dimensionality) -> SortGrid {
        match self.config.grid {
            Some(resolution) => SortGrid::with_resolution(box_dim, resolution, dims),
            None => SortGrid::from_bin_width(box_dim, self.config.bin_width, dims),
        }
    }

    /// Cached traversal order, if a pass has run.
    pub fn traversal_order(&self) -> Option<Arc<[u32]>> {
        self.cache.as_ref().map(|c| Arc::clone(&c.order))
    }

    /// Sort order from the most recent computation.
    ///
    /// This is the order applied by the last [`update`](Self::update), unless
    /// [`compute_sort_order`](Self::compute_sort_order) ran afterwards, in
    /// which case it was computed but not applied.
    pub fn sort_order(&self) -> &[u32] {
        &self.sort_order
    }

    /// Regenerate the traversal order if `grid` differs from the cached geometry.
    ///
    /// Returns `true` if the order was regenerated.
    fn refresh_traversal(&mut self, grid: &SortGrid) -> bool {
        if self.cache.as_ref().is_some_and(|c| c.matches(grid)) {
            return false;
        }

        let threshold = match grid.dims {
            Dimensionality::Two => self.config.large_grid_warning_2d,
            Dimensionality::Three => self.config.large_grid_warning_3d,
        };
        if grid.exceeds(threshold) {
            tracing::warn!(
                "sorter is about to allocate a very large grid ({} cells per axis, {} total) and may run out of memory; \
                 increase the bin width or disable the sorter",
                grid.mmax,
                grid.num_cells()
            );
        }

        let order = traversal::traversal_order(grid.mmax, grid.dims, self.config.traversal_2d);
        debug_assert_eq!(order.len(), grid.num_cells());
        tracing::info!(
            "Generated {:?} traversal order: Mmax={}, {} cells",
            grid.dims,
            grid.mmax,
            order.len()
        );

        self.binner.resize(grid);
        self.cache = Some(TraversalCache {
            mmax: grid.mmax,
            dims: grid.dims,
            order: order.into(),
        });
        true
    }

    /// Compute the sort order for the current positions without moving anything.
    ///
    /// The result replaces [`sort_order`](Self::sort_order); no particle
    /// field is touched and no reorder signal is emitted.
    pub fn compute_sort_order(
        &mut self,
        pdata: &ParticleData,
        box_dim: &BoxDim,
        dims: Dimensionality,
    ) -> (SortGrid, bool) {
        let grid = self.grid_for(box_dim, dims);
        let regenerated = self.refresh_traversal(&grid);

        self.binner.bin(
            &grid,
            box_dim,
            &pdata.x,
            &pdata.y,
            &pdata.z,
            self.config.parallel_binning,
        );

        if let Some(cache) = self.cache.as_ref() {
            self.binner.fill_sort_order(&cache.order, &mut self.sort_order);
        }
        debug_assert_eq!(self.sort_order.len(), pdata.len());
        (grid, regenerated)
    }

    /// Run one sorting pass over `pdata`.
    ///
    /// On return every particle field has been permuted, `rtag` is consistent
    /// and the reorder signal has been emitted.
    ///
    /// # Panics
    /// If the box is degenerate on an active axis.
    pub fn update(
        &mut self,
        timestep: u64,
        pdata: &mut ParticleData,
        box_dim: &BoxDim,
        dims: Dimensionality,
    ) -> SortStats {
        let _span = tracing::info_span!("sfc_pack", timestep).entered();
        let start = Instant::now();

        let (grid, regenerated) = self.compute_sort_order(pdata, box_dim, dims);
        self.permuter.apply(&self.sort_order, pdata);
        debug_assert!(pdata.rtag_consistent());

        pdata.notify_particle_sort();

        let stats = SortStats {
            mmax: grid.mmax,
            num_cells: grid.num_cells(),
            regenerated,
            elapsed: start.elapsed(),
        };
        tracing::debug!(
            "Sorted {} particles on {} cells in {:.3} ms",
            pdata.len(),
            stats.num_cells,
            stats.elapsed.as_secs_f64() * 1e3
        );
        stats
    }
}

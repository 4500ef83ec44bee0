//! Particle binning and sort-order production.
//!
//! Every particle is dropped into the bucket of the grid cell containing it,
//! in ascending index order. Walking the buckets in traversal order and
//! concatenating their contents yields the sort order.

use rayon::prelude::*;

use crate::box_dim::{BoxDim, Dimensionality};
use crate::grid::SortGrid;

/// Per-cell particle buckets, reused across sorting passes.
#[derive(Debug, Default)]
pub struct Binner {
    buckets: Vec<Vec<u32>>,
    /// Cell id of each particle from the last pass.
    cell_ids: Vec<u32>,
}

impl Binner {
    /// Create a binner with no buckets allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure there is exactly one bucket per cell of `grid`.
    ///
    /// Existing buckets keep their capacity.
    pub fn resize(&mut self, grid: &SortGrid) {
        self.buckets.resize_with(grid.num_cells(), Vec::new);
    }

    /// Number of buckets currently allocated.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Particle indices in cell `cell`, in ascending order.
    pub fn bucket(&self, cell: u32) -> &[u32] {
        &self.buckets[cell as usize]
    }

    /// Cell id assigned to each particle by the last [`bin`](Self::bin).
    pub fn cell_ids(&self) -> &[u32] {
        &self.cell_ids
    }

    /// Classify every particle into its grid cell.
    ///
    /// With `parallel` the per-particle classification runs on the rayon
    /// pool; buckets are always filled sequentially in ascending particle
    /// index, so the result does not depend on thread scheduling.
    ///
    /// The three slices must all have the same length (one entry per particle).
    pub fn bin(
        &mut self,
        grid: &SortGrid,
        box_dim: &BoxDim,
        x: &[f32],
        y: &[f32],
        z: &[f32],
        parallel: bool,
    ) {
        let n = x.len();
        debug_assert_eq!(n, y.len());
        debug_assert_eq!(n, z.len());
        assert_eq!(
            self.buckets.len(),
            grid.num_cells(),
            "binner must be resized to the grid before binning"
        );

        // --- 1. Compute cell id for each particle ---
        let cell_of = |i: usize| classify(grid, box_dim, x[i], y[i], z[i]);
        if parallel {
            (0..n).into_par_iter().map(cell_of).collect_into_vec(&mut self.cell_ids);
        } else {
            self.cell_ids.clear();
            self.cell_ids.extend((0..n).map(cell_of));
        }

        // --- 2. Refill buckets in ascending particle order ---
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for (i, &cell) in self.cell_ids.iter().enumerate() {
            self.buckets[cell as usize].push(i as u32);
        }
    }

    /// Concatenate bucket contents in `traversal` order into `sort_order`.
    ///
    /// `sort_order[i]` becomes the pre-sort index of the particle that moves to
    /// position `i`. No sorting happens inside a bucket.
    pub fn fill_sort_order(&self, traversal: &[u32], sort_order: &mut Vec<u32>) {
        debug_assert_eq!(traversal.len(), self.buckets.len());
        sort_order.clear();
        for &cell in traversal {
            sort_order.extend_from_slice(&self.buckets[cell as usize]);
        }
        debug_assert_eq!(sort_order.len(), self.cell_ids.len());
    }
}

/// Linear cell id of the particle at `(px, py, pz)`.
#[inline]
pub fn classify(grid: &SortGrid, box_dim: &BoxDim, px: f32, py: f32, pz: f32) -> u32 {
    let ib = grid.axis_coord(px, box_dim.lo[0], 0);
    let jb = grid.axis_coord(py, box_dim.lo[1], 1);
    let kb = match grid.dims {
        Dimensionality::Two => 0,
        Dimensionality::Three => grid.axis_coord(pz, box_dim.lo[2], 2),
    };
    grid.cell_id([ib, jb, kb])
}

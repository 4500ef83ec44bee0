//! Power-of-two sorting grid derived from the box and a target bin width.
//!
//! The traversal curves only work on square/cubic grids whose side is a power
//! of two, so the finest per-axis resolution is rounded up to the next power
//! of two and used on every active axis. Bins are then uniform in index space
//! and generally rectangular in real space.

use crate::box_dim::{BoxDim, Dimensionality};

/// Grid geometry used by one sorting pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortGrid {
    /// Cells per active axis (always a power of two).
    pub mmax: u32,
    /// Dimensionality the grid was derived for.
    pub dims: Dimensionality,
    /// Bin size per axis. Zero on an inactive axis.
    pub bin_size: [f32; 3],
    /// Reciprocal bin size per axis. Zero on an inactive axis.
    pub inv_bin_size: [f32; 3],
}

impl SortGrid {
    /// Derive the grid from a target bin width.
    ///
    /// `M_axis = floor(extent / bin_width)` (at least 1) on each active axis;
    /// the largest is rounded up to a power of two.
    ///
    /// # Panics
    /// If the box is degenerate on an active axis.
    pub fn from_bin_width(box_dim: &BoxDim, bin_width: f32, dims: Dimensionality) -> Self {
        box_dim.assert_valid(dims);

        let mut m = 1u32;
        for axis in 0..dims.count() {
            // float -> int casts saturate, so huge ratios clamp instead of wrapping
            let m_axis = ((box_dim.extent(axis) / bin_width) as u32).max(1);
            m = m.max(m_axis);
        }
        Self::with_resolution(box_dim, m, dims)
    }

    /// Build the grid for a fixed resolution, rounded up to a power of two.
    ///
    /// # Panics
    /// If the box is degenerate on an active axis, or if `mmax^d` cell ids
    /// do not fit in a `u32` (above 1024 per axis in 3D, 32768 in 2D).
    /// Memory for buckets and traversal order runs out well before that.
    pub fn with_resolution(box_dim: &BoxDim, resolution: u32, dims: Dimensionality) -> Self {
        box_dim.assert_valid(dims);

        let mmax = resolution
            .max(1)
            .checked_next_power_of_two()
            .unwrap_or(1 << 31);
        // Cell ids and traversal orders are u32
        assert!(
            (mmax as u64).pow(dims.count() as u32) <= u64::from(u32::MAX),
            "grid of {mmax} cells per axis exceeds the u32 cell id range in {:?}",
            dims
        );
        let mut bin_size = [0.0_f32; 3];
        let mut inv_bin_size = [0.0_f32; 3];
        for axis in 0..dims.count() {
            bin_size[axis] = box_dim.extent(axis) / mmax as f32;
            inv_bin_size[axis] = 1.0 / bin_size[axis];
        }

        Self {
            mmax,
            dims,
            bin_size,
            inv_bin_size,
        }
    }

    /// Total number of cells, `mmax^d`.
    pub fn num_cells(&self) -> usize {
        (self.mmax as usize).pow(self.dims.count() as u32)
    }

    /// Linear id of the cell at `coords` (inactive axes ignored).
    ///
    /// The first axis is the slowest varying: `i*M^2 + j*M + k` in 3D and
    /// `i*M + j` in 2D.
    #[inline]
    pub fn cell_id(&self, coords: [u32; 3]) -> u32 {
        let m = self.mmax;
        match self.dims {
            Dimensionality::Two => coords[0] * m + coords[1],
            Dimensionality::Three => (coords[0] * m + coords[1]) * m + coords[2],
        }
    }

    /// Inverse of [`cell_id`](Self::cell_id).
    pub fn cell_coords(&self, id: u32) -> [u32; 3] {
        let m = self.mmax;
        match self.dims {
            Dimensionality::Two => [id / m, id % m, 0],
            Dimensionality::Three => [id / (m * m), (id / m) % m, id % m],
        }
    }

    /// Cell coordinate of a position along `axis`.
    ///
    /// A position exactly on the upper box face lands on `mmax` and is
    /// wrapped to 0, matching the periodic image it represents.
    #[inline]
    pub fn axis_coord(&self, pos: f32, lo: f32, axis: usize) -> u32 {
        let mut c = ((pos - lo) * self.inv_bin_size[axis]) as u32;
        if c == self.mmax {
            c = 0;
        }
        debug_assert!(
            c < self.mmax,
            "position {pos} outside the box on axis {axis} (cell {c} of {})",
            self.mmax
        );
        c.min(self.mmax - 1)
    }

    /// `true` if the grid is larger than the given per-axis threshold.
    pub fn exceeds(&self, threshold: u32) -> bool {
        self.mmax > threshold
    }
}

//! Uniform-grid spatial hash for neighbor search.
//!
//! The grid stores particle indices, so every reorder of the particle arrays
//! invalidates it. It subscribes to the particle set's sort signal and
//! rebuilds lazily the next time it is used after a reorder.

use crate::notify::SortSubscription;
use crate::particle::ParticleData;

/// Uniform-grid spatial hash for O(1) neighbor cell lookup.
///
/// Cell size should equal the interaction radius so that the 27 (3x3x3)
/// adjacent cells contain all potential neighbors.
pub struct NeighborGrid {
    cell_size: f32,
    grid_min: [f32; 3],
    grid_dims: [u32; 3],
    /// Cell index for each particle (parallel to particle arrays).
    cell_indices: Vec<u32>,
    /// Particle indices sorted by cell index.
    sorted_indices: Vec<u32>,
    /// Start offset in `sorted_indices` for each cell.
    cell_offsets: Vec<u32>,
    /// Number of particles in each cell.
    cell_counts: Vec<u32>,
    /// Reorder signal from the particle set, if attached.
    subscription: Option<SortSubscription>,
    built: bool,
    rebuilds: u64,
}

impl NeighborGrid {
    /// Create a new neighbor grid covering `[domain_min, domain_max]`.
    pub fn new(cell_size: f32, domain_min: [f32; 3], domain_max: [f32; 3]) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");
        let dims = [
            ((domain_max[0] - domain_min[0]) / cell_size).ceil().max(1.0) as u32,
            ((domain_max[1] - domain_min[1]) / cell_size).ceil().max(1.0) as u32,
            ((domain_max[2] - domain_min[2]) / cell_size).ceil().max(1.0) as u32,
        ];
        let total_cells = (dims[0] as usize) * (dims[1] as usize) * (dims[2] as usize);
        Self {
            cell_size,
            grid_min: domain_min,
            grid_dims: dims,
            cell_indices: Vec::new(),
            sorted_indices: Vec::new(),
            cell_offsets: vec![0; total_cells],
            cell_counts: vec![0; total_cells],
            subscription: None,
            built: false,
            rebuilds: 0,
        }
    }

    /// Follow reorders of `pdata`; the grid is rebuilt on next use after each one.
    pub fn attach(&mut self, pdata: &ParticleData) {
        self.subscription = Some(pdata.subscribe_sort());
        self.built = false;
    }

    /// Total number of cells in the grid.
    fn total_cells(&self) -> usize {
        (self.grid_dims[0] as usize)
            * (self.grid_dims[1] as usize)
            * (self.grid_dims[2] as usize)
    }

    /// `true` if the stored indices no longer describe the particle arrays.
    pub fn is_stale(&self) -> bool {
        !self.built || self.subscription.as_ref().is_some_and(|s| s.is_stale())
    }

    /// Number of full rebuilds performed so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Map a world-space position to a cell (cx, cy, cz), clamped to grid bounds.
    #[inline]
    fn pos_to_cell(&self, px: f32, py: f32, pz: f32) -> (u32, u32, u32) {
        let clamp = |p: f32, axis: usize| {
            ((p - self.grid_min[axis]) / self.cell_size)
                .floor()
                .max(0.0)
                .min((self.grid_dims[axis] - 1) as f32) as u32
        };
        (clamp(px, 0), clamp(py, 1), clamp(pz, 2))
    }

    /// Flat cell index from (cx, cy, cz).
    #[inline]
    fn cell_hash(&self, cx: u32, cy: u32, cz: u32) -> u32 {
        cx + cy * self.grid_dims[0] + cz * self.grid_dims[0] * self.grid_dims[1]
    }

    /// Rebuild only if the grid is stale.
    ///
    /// Returns `true` if a rebuild happened.
    pub fn ensure_current(&mut self, x: &[f32], y: &[f32], z: &[f32]) -> bool {
        if !self.is_stale() {
            return false;
        }
        self.update(x, y, z);
        true
    }

    /// Rebuild the grid from current particle positions.
    ///
    /// The three slices must all have the same length (one entry per particle).
    pub fn update(&mut self, x: &[f32], y: &[f32], z: &[f32]) {
        let n = x.len();
        debug_assert_eq!(n, y.len());
        debug_assert_eq!(n, z.len());

        let total_cells = self.total_cells();

        // --- 1. Compute cell index for each particle ---
        self.cell_indices.resize(n, 0);
        for i in 0..n {
            let (cx, cy, cz) = self.pos_to_cell(x[i], y[i], z[i]);
            self.cell_indices[i] = self.cell_hash(cx, cy, cz);
        }

        // --- 2. Count particles per cell ---
        self.cell_counts.clear();
        self.cell_counts.resize(total_cells, 0);
        for &ci in &self.cell_indices {
            self.cell_counts[ci as usize] += 1;
        }

        // --- 3. Prefix-sum to get cell offsets ---
        self.cell_offsets.clear();
        self.cell_offsets.resize(total_cells, 0);
        let mut running = 0u32;
        for c in 0..total_cells {
            self.cell_offsets[c] = running;
            running += self.cell_counts[c];
        }

        // --- 4. Scatter particle indices into sorted order ---
        self.sorted_indices.resize(n, 0);
        let mut write_heads: Vec<u32> = self.cell_offsets.clone();
        for i in 0..n {
            let ci = self.cell_indices[i] as usize;
            let pos = write_heads[ci] as usize;
            self.sorted_indices[pos] = i as u32;
            write_heads[ci] += 1;
        }

        if let Some(sub) = self.subscription.as_mut() {
            sub.acknowledge();
        }
        self.built = true;
        self.rebuilds += 1;
    }

    /// Iterate over all neighbors of `particle_idx` within `radius`.
    ///
    /// Checks the 27 (3x3x3) adjacent cells around the particle's cell.
    ///
    /// # Panics
    /// In debug builds, if the grid is stale.
    pub fn for_each_neighbor<F>(
        &self,
        particle_idx: usize,
        x: &[f32],
        y: &[f32],
        z: &[f32],
        radius: f32,
        mut f: F,
    ) where
        F: FnMut(usize),
    {
        debug_assert!(!self.is_stale(), "neighbor grid used after a particle reorder");
        let px = x[particle_idx];
        let py = y[particle_idx];
        let pz = z[particle_idx];
        let (cx, cy, cz) = self.pos_to_cell(px, py, pz);
        let radius_sq = radius * radius;

        for dz in -1i32..=1 {
            let nz = cz as i32 + dz;
            if nz < 0 || nz >= self.grid_dims[2] as i32 {
                continue;
            }
            for dy in -1i32..=1 {
                let ny = cy as i32 + dy;
                if ny < 0 || ny >= self.grid_dims[1] as i32 {
                    continue;
                }
                for dx in -1i32..=1 {
                    let nx = cx as i32 + dx;
                    if nx < 0 || nx >= self.grid_dims[0] as i32 {
                        continue;
                    }
                    let cell = self.cell_hash(nx as u32, ny as u32, nz as u32) as usize;
                    let start = self.cell_offsets[cell] as usize;
                    let count = self.cell_counts[cell] as usize;

                    for s in start..start + count {
                        let j = self.sorted_indices[s] as usize;
                        if j == particle_idx {
                            continue;
                        }
                        let ddx = px - x[j];
                        let ddy = py - y[j];
                        let ddz = pz - z[j];
                        if ddx * ddx + ddy * ddy + ddz * ddz <= radius_sq {
                            f(j);
                        }
                    }
                }
            }
        }
    }
}

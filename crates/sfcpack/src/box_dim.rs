//! Simulation box extents and system dimensionality.

/// Number of spatially active axes in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    /// x and y are active; z is ignored for binning.
    Two,
    /// x, y and z are active.
    Three,
}

impl Dimensionality {
    /// Number of active axes (2 or 3).
    pub fn count(self) -> usize {
        match self {
            Dimensionality::Two => 2,
            Dimensionality::Three => 3,
        }
    }
}

/// Axis-aligned simulation box `[lo, hi)` on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDim {
    /// Lower corner [x, y, z]
    pub lo: [f32; 3],
    /// Upper corner [x, y, z]
    pub hi: [f32; 3],
}

impl BoxDim {
    /// Box spanning `lo` to `hi`.
    pub fn new(lo: [f32; 3], hi: [f32; 3]) -> Self {
        Self { lo, hi }
    }

    /// Box with the given side lengths, centered on the origin.
    pub fn from_lengths(lx: f32, ly: f32, lz: f32) -> Self {
        Self {
            lo: [-0.5 * lx, -0.5 * ly, -0.5 * lz],
            hi: [0.5 * lx, 0.5 * ly, 0.5 * lz],
        }
    }

    /// Length of the box along `axis`.
    #[inline]
    pub fn extent(&self, axis: usize) -> f32 {
        self.hi[axis] - self.lo[axis]
    }

    /// Panic unless `hi > lo` on every active axis.
    ///
    /// A degenerate box is a caller contract violation, not a recoverable error.
    pub fn assert_valid(&self, dims: Dimensionality) {
        for axis in 0..dims.count() {
            assert!(
                self.hi[axis] > self.lo[axis],
                "box must satisfy hi > lo on axis {axis} (lo = {}, hi = {})",
                self.lo[axis],
                self.hi[axis]
            );
        }
    }
}

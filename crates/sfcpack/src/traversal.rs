//! Cell traversal orders for the sorting grid.
//!
//! A traversal order lists every cell id of an `M^d` grid exactly once. Cells
//! that are adjacent in the list should be adjacent in space, so that
//! particles concatenated bucket by bucket end up spatially coherent in memory.
//!
//! - 3D: Hilbert curve built by recursive octree subdivision. Each level
//!   visits its eight octants in an order that is itself permuted on the way
//!   down, which keeps the seams between sub-cubes face-adjacent.
//! - 2D: row-major raster by default, or a true Hilbert curve on request.
//!
//! Cell ids use the same layout as [`SortGrid::cell_id`](crate::grid::SortGrid::cell_id):
//! `i*M^2 + j*M + k` in 3D and `i*M + j` in 2D.

use crate::box_dim::Dimensionality;
use crate::config::Traversal2D;

// ---------------------------------------------------------------------------
// 3D Hilbert curve
// ---------------------------------------------------------------------------

/// Octant offset along x for each octant id.
const ISTEP: [u32; 8] = [0, 0, 0, 0, 1, 1, 1, 1];
/// Octant offset along y for each octant id.
const JSTEP: [u32; 8] = [0, 0, 1, 1, 1, 1, 0, 0];
/// Octant offset along z for each octant id.
const KSTEP: [u32; 8] = [0, 1, 1, 0, 0, 1, 1, 0];

/// Gather tables for the eight child-order rules.
///
/// Rule `r` maps an order `o` to `[o[t[0]], o[t[1]], ..]` with `t = RULES[r]`.
/// Rules 1/2, 3/4 and 5/6 are identical; the curve is mirror symmetric
/// about its midpoint.
const RULES: [[usize; 8]; 8] = [
    [0, 3, 4, 7, 6, 5, 2, 1],
    [0, 7, 6, 1, 2, 5, 4, 3],
    [0, 7, 6, 1, 2, 5, 4, 3],
    [2, 3, 0, 1, 6, 7, 4, 5],
    [2, 3, 0, 1, 6, 7, 4, 5],
    [4, 3, 2, 5, 6, 1, 0, 7],
    [4, 3, 2, 5, 6, 1, 0, 7],
    [6, 5, 2, 1, 0, 3, 4, 7],
];

/// Octant order at the root of the recursion.
pub const IDENTITY_ORDER: [u32; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Apply child-order rule `rule` (0..8) to `order`.
///
/// The rule is chosen by the *position* of an octant in the parent's
/// visitation order, not by the octant id.
///
/// # Panics
/// If `rule >= 8`.
pub fn permute_rule(rule: usize, order: [u32; 8]) -> [u32; 8] {
    let table = &RULES[rule];
    std::array::from_fn(|m| order[table[m]])
}

/// Hilbert traversal of an `mmax^3` grid.
///
/// # Panics
/// If `mmax` is not a power of two.
pub fn hilbert_order_3d(mmax: u32) -> Vec<u32> {
    assert!(mmax.is_power_of_two(), "grid size {mmax} is not a power of two");
    let mut out = Vec::with_capacity((mmax as usize).pow(3));
    hilbert_recurse_3d([0, 0, 0], mmax, mmax, IDENTITY_ORDER, &mut out);
    out
}

fn hilbert_recurse_3d(origin: [u32; 3], w: u32, mmax: u32, order: [u32; 8], out: &mut Vec<u32>) {
    let [i, j, k] = origin;
    if w == 1 {
        out.push((i * mmax + j) * mmax + k);
        return;
    }

    let half = w / 2;
    for (m, &octant) in order.iter().enumerate() {
        let o = octant as usize;
        let child = [
            i + half * ISTEP[o],
            j + half * JSTEP[o],
            k + half * KSTEP[o],
        ];
        hilbert_recurse_3d(child, half, mmax, permute_rule(m, order), out);
    }
}

// ---------------------------------------------------------------------------
// 2D orders
// ---------------------------------------------------------------------------

/// Row-major enumeration `0..mmax^2`.
///
/// Not a space-filling curve: consecutive rows jump back across the grid.
pub fn raster_order_2d(mmax: u32) -> Vec<u32> {
    (0..mmax * mmax).collect()
}

/// Distance along the 2D Hilbert curve of side `n` for cell `(x, y)`.
fn hilbert_index_2d(mut x: u32, mut y: u32, n: u32) -> u32 {
    let mut d = 0;
    let mut s = n / 2;
    while s > 0 {
        let rx = u32::from(x & s > 0);
        let ry = u32::from(y & s > 0);
        d += s * s * ((3 * rx) ^ ry);

        // Mask out the bits for this quadrant, then rotate/flip into it
        x &= s - 1;
        y &= s - 1;
        if ry == 0 {
            if rx == 1 {
                x = s - 1 - x;
                y = s - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        s /= 2;
    }
    d
}

/// Hilbert traversal of an `mmax^2` grid.
///
/// # Panics
/// If `mmax` is not a power of two.
pub fn hilbert_order_2d(mmax: u32) -> Vec<u32> {
    assert!(mmax.is_power_of_two(), "grid size {mmax} is not a power of two");
    let mut out = vec![0u32; (mmax * mmax) as usize];
    for i in 0..mmax {
        for j in 0..mmax {
            out[hilbert_index_2d(i, j, mmax) as usize] = i * mmax + j;
        }
    }
    out
}

/// Traversal order for a grid of side `mmax` in the given dimensionality.
pub fn traversal_order(mmax: u32, dims: Dimensionality, mode_2d: Traversal2D) -> Vec<u32> {
    match (dims, mode_2d) {
        (Dimensionality::Three, _) => hilbert_order_3d(mmax),
        (Dimensionality::Two, Traversal2D::Raster) => raster_order_2d(mmax),
        (Dimensionality::Two, Traversal2D::Hilbert) => hilbert_order_2d(mmax),
    }
}

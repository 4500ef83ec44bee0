//! Apply a sort order to every particle field.
//!
//! Each field is gathered into a scratch buffer through the sort order and
//! copied back, so no field ever reads a partially permuted array. One
//! scratch buffer per element type is kept between calls.

use crate::particle::ParticleData;

/// Gather-and-copy-back permutation of the particle arrays.
#[derive(Debug, Default)]
pub struct ArrayPermuter {
    scratch_f32: Vec<f32>,
    scratch_i32: Vec<i32>,
    scratch_u32: Vec<u32>,
}

/// `field[i] = old_field[sort_order[i]]` for every `i`.
fn gather<T: Copy>(field: &mut [T], sort_order: &[u32], scratch: &mut Vec<T>) {
    scratch.clear();
    scratch.extend(sort_order.iter().map(|&src| field[src as usize]));
    field.copy_from_slice(scratch);
}

impl ArrayPermuter {
    /// Create a permuter with empty scratch buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Permute every field of `pdata` by `sort_order` and rebuild `rtag`.
    ///
    /// `sort_order` must be a permutation of `0..pdata.len()`.
    ///
    /// # Panics
    /// If `sort_order.len() != pdata.len()`.
    pub fn apply(&mut self, sort_order: &[u32], pdata: &mut ParticleData) {
        let n = pdata.len();
        assert_eq!(sort_order.len(), n, "sort order length must match particle count");

        for field in [
            &mut pdata.x,
            &mut pdata.y,
            &mut pdata.z,
            &mut pdata.vx,
            &mut pdata.vy,
            &mut pdata.vz,
            &mut pdata.ax,
            &mut pdata.ay,
            &mut pdata.az,
            &mut pdata.charge,
            &mut pdata.mass,
            &mut pdata.diameter,
        ] {
            gather(field, sort_order, &mut self.scratch_f32);
        }

        for field in [&mut pdata.ix, &mut pdata.iy, &mut pdata.iz] {
            gather(field, sort_order, &mut self.scratch_i32);
        }

        for field in [&mut pdata.type_id, &mut pdata.tag] {
            gather(field, sort_order, &mut self.scratch_u32);
        }

        // Full rebuild: any number of particles may have moved
        for (i, &tag) in pdata.tag.iter().enumerate() {
            pdata.rtag[tag as usize] = i as u32;
        }
    }
}

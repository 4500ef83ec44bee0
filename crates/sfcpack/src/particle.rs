//! Particle data structures using struct-of-arrays layout.
//!
//! Every field is a separate `Vec` indexed by the particle's current array
//! position. Positions in these arrays change whenever the sorter runs; the
//! `tag` of a particle never does, and `rtag` maps a tag back to its current
//! index.

use crate::notify::{SortNotifier, SortSubscription};

/// Initial state of a particle appended with [`ParticleData::push_particle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInit {
    /// Position [x, y, z]
    pub position: [f32; 3],
    /// Velocity [vx, vy, vz]
    pub velocity: [f32; 3],
    /// Charge
    pub charge: f32,
    /// Mass
    pub mass: f32,
    /// Diameter
    pub diameter: f32,
    /// Periodic image counters [ix, iy, iz]
    pub image: [i32; 3],
    /// Particle type id
    pub type_id: u32,
}

impl Default for ParticleInit {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            velocity: [0.0; 3],
            charge: 0.0,
            mass: 1.0,
            diameter: 1.0,
            image: [0; 3],
            type_id: 0,
        }
    }
}

impl ParticleInit {
    /// Default particle placed at `position`.
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Struct-of-arrays particle storage.
///
/// All arrays are parallel: index `i` across every array refers to the same particle.
#[derive(Debug)]
pub struct ParticleData {
    // ---- Positions ----
    /// X positions
    pub x: Vec<f32>,
    /// Y positions
    pub y: Vec<f32>,
    /// Z positions
    pub z: Vec<f32>,

    // ---- Velocities ----
    /// X velocities
    pub vx: Vec<f32>,
    /// Y velocities
    pub vy: Vec<f32>,
    /// Z velocities
    pub vz: Vec<f32>,

    // ---- Accelerations ----
    /// X accelerations
    pub ax: Vec<f32>,
    /// Y accelerations
    pub ay: Vec<f32>,
    /// Z accelerations
    pub az: Vec<f32>,

    // ---- Scalar fields ----
    /// Charge
    pub charge: Vec<f32>,
    /// Mass
    pub mass: Vec<f32>,
    /// Diameter
    pub diameter: Vec<f32>,

    // ---- Periodic images ----
    /// Image counter along x
    pub ix: Vec<i32>,
    /// Image counter along y
    pub iy: Vec<i32>,
    /// Image counter along z
    pub iz: Vec<i32>,

    // ---- Identity ----
    /// Particle type id
    pub type_id: Vec<u32>,
    /// Stable particle identity
    pub tag: Vec<u32>,
    /// Reverse map: `rtag[tag]` is the current index of that particle
    pub rtag: Vec<u32>,

    notifier: SortNotifier,
}

impl ParticleData {
    /// Create an empty particle collection with no particles allocated.
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            vx: Vec::new(),
            vy: Vec::new(),
            vz: Vec::new(),
            ax: Vec::new(),
            ay: Vec::new(),
            az: Vec::new(),
            charge: Vec::new(),
            mass: Vec::new(),
            diameter: Vec::new(),
            ix: Vec::new(),
            iy: Vec::new(),
            iz: Vec::new(),
            type_id: Vec::new(),
            tag: Vec::new(),
            rtag: Vec::new(),
            notifier: SortNotifier::new(),
        }
    }

    /// Return the number of particles currently stored.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Return `true` if there are no particles.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Append a particle and return the tag assigned to it.
    ///
    /// Acceleration is initialized to zero.
    pub fn push_particle(&mut self, init: ParticleInit) -> u32 {
        let index = self.len() as u32;
        let tag = self.rtag.len() as u32;

        self.x.push(init.position[0]);
        self.y.push(init.position[1]);
        self.z.push(init.position[2]);
        self.vx.push(init.velocity[0]);
        self.vy.push(init.velocity[1]);
        self.vz.push(init.velocity[2]);
        self.ax.push(0.0);
        self.ay.push(0.0);
        self.az.push(0.0);
        self.charge.push(init.charge);
        self.mass.push(init.mass);
        self.diameter.push(init.diameter);
        self.ix.push(init.image[0]);
        self.iy.push(init.image[1]);
        self.iz.push(init.image[2]);
        self.type_id.push(init.type_id);
        self.tag.push(tag);
        self.rtag.push(index);
        tag
    }

    /// Current index of the particle with the given tag.
    pub fn index_of(&self, tag: u32) -> usize {
        self.rtag[tag as usize] as usize
    }

    /// Check `rtag[tag[i]] == i` for every particle.
    pub fn rtag_consistent(&self) -> bool {
        self.tag
            .iter()
            .enumerate()
            .all(|(i, &t)| self.rtag.get(t as usize).map(|&r| r as usize) == Some(i))
    }

    /// Register a consumer of the reorder-completed signal.
    pub fn subscribe_sort(&self) -> SortSubscription {
        self.notifier.subscribe()
    }

    /// Number of reorders signalled on this particle set.
    pub fn sort_epoch(&self) -> u64 {
        self.notifier.epoch()
    }

    /// Signal that particle indices have been permuted.
    pub fn notify_particle_sort(&self) {
        self.notifier.notify();
    }
}

impl Default for ParticleData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_particle_data() {
        let pd = ParticleData::new();
        assert_eq!(pd.len(), 0);
        assert!(pd.is_empty());
        assert!(pd.rtag_consistent());
    }

    #[test]
    fn push_and_len() {
        let mut pd = ParticleData::new();
        let tag = pd.push_particle(ParticleInit {
            position: [1.0, 2.0, 3.0],
            velocity: [0.5, 0.0, -0.5],
            charge: -1.0,
            mass: 2.0,
            diameter: 0.5,
            image: [1, 0, -1],
            type_id: 3,
        });
        assert_eq!(tag, 0);
        assert_eq!(pd.len(), 1);
        assert!(!pd.is_empty());
        assert_eq!(pd.x[0], 1.0);
        assert_eq!(pd.y[0], 2.0);
        assert_eq!(pd.z[0], 3.0);
        assert_eq!(pd.vx[0], 0.5);
        assert_eq!(pd.vz[0], -0.5);
        assert_eq!(pd.charge[0], -1.0);
        assert_eq!(pd.mass[0], 2.0);
        assert_eq!(pd.diameter[0], 0.5);
        assert_eq!(pd.ix[0], 1);
        assert_eq!(pd.iz[0], -1);
        assert_eq!(pd.type_id[0], 3);
        // Acceleration should be zero
        assert_eq!(pd.ax[0], 0.0);
        assert_eq!(pd.ay[0], 0.0);
        assert_eq!(pd.az[0], 0.0);
    }

    #[test]
    fn tags_are_sequential_and_rtag_tracks_them() {
        let mut pd = ParticleData::new();
        for i in 0..5 {
            let tag = pd.push_particle(ParticleInit::at([i as f32, 0.0, 0.0]));
            assert_eq!(tag, i);
        }
        assert_eq!(pd.rtag, vec![0, 1, 2, 3, 4]);
        assert!(pd.rtag_consistent());
        assert_eq!(pd.index_of(3), 3);
    }

    #[test]
    fn broken_rtag_is_detected() {
        let mut pd = ParticleData::new();
        pd.push_particle(ParticleInit::default());
        pd.push_particle(ParticleInit::default());
        pd.rtag.swap(0, 1);
        assert!(!pd.rtag_consistent());
    }

    #[test]
    fn sort_signal_reaches_subscribers() {
        let pd = ParticleData::new();
        let sub = pd.subscribe_sort();
        pd.notify_particle_sort();
        assert!(sub.is_stale());
        assert_eq!(pd.sort_epoch(), 1);
    }
}

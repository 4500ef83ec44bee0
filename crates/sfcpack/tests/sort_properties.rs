//! Randomized checks of the sorting pass invariants.
//!
//! For a spread of particle counts, box shapes, bin widths and both
//! dimensionalities: the sort order is a permutation, every field moves
//! exactly through it, rtag stays consistent, and repeated runs agree.

use sfcpack::{BoxDim, Dimensionality, ParticleData, ParticleInit, SfcPackUpdater, SorterConfig};

/// Copy of every particle field, taken before a sort.
struct Snapshot {
    x: Vec<f32>,
    vy: Vec<f32>,
    az: Vec<f32>,
    charge: Vec<f32>,
    mass: Vec<f32>,
    diameter: Vec<f32>,
    ix: Vec<i32>,
    iz: Vec<i32>,
    type_id: Vec<u32>,
    tag: Vec<u32>,
}

impl Snapshot {
    fn of(pd: &ParticleData) -> Self {
        Self {
            x: pd.x.clone(),
            vy: pd.vy.clone(),
            az: pd.az.clone(),
            charge: pd.charge.clone(),
            mass: pd.mass.clone(),
            diameter: pd.diameter.clone(),
            ix: pd.ix.clone(),
            iz: pd.iz.clone(),
            type_id: pd.type_id.clone(),
            tag: pd.tag.clone(),
        }
    }
}

fn random_particles(n: usize, box_dim: &BoxDim, seed: u64) -> ParticleData {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut pd = ParticleData::new();
    for i in 0..n {
        let mut position = [0.0_f32; 3];
        for (axis, p) in position.iter_mut().enumerate() {
            *p = box_dim.lo[axis] + rng.f32() * box_dim.extent(axis);
        }
        pd.push_particle(ParticleInit {
            position,
            velocity: [rng.f32(), rng.f32() - 0.5, rng.f32()],
            charge: rng.f32() - 0.5,
            mass: 1.0 + rng.f32(),
            diameter: 0.5 + rng.f32(),
            image: [rng.i32(-3..3), rng.i32(-3..3), rng.i32(-3..3)],
            type_id: rng.u32(0..4),
        });
        pd.az[i] = rng.f32() * 10.0;
    }
    pd
}

fn is_permutation(order: &[u32], n: usize) -> bool {
    let mut seen = vec![false; n];
    order.len() == n
        && order.iter().all(|&s| {
            let s = s as usize;
            s < n && !std::mem::replace(&mut seen[s], true)
        })
}

fn cases() -> Vec<(usize, BoxDim, f32, Dimensionality)> {
    vec![
        (0, BoxDim::new([0.0; 3], [5.0; 3]), 1.0, Dimensionality::Three),
        (1, BoxDim::new([0.0; 3], [5.0; 3]), 1.0, Dimensionality::Three),
        (257, BoxDim::from_lengths(10.0, 10.0, 10.0), 1.0, Dimensionality::Three),
        (1000, BoxDim::from_lengths(12.0, 3.0, 7.5), 0.8, Dimensionality::Three),
        (2000, BoxDim::new([-4.0, 1.0, -1.0], [4.0, 33.0, 2.0]), 2.0, Dimensionality::Three),
        (500, BoxDim::from_lengths(20.0, 20.0, 1.0), 2.0, Dimensionality::Two),
        (1500, BoxDim::from_lengths(50.0, 6.0, 0.0), 1.5, Dimensionality::Two),
        (300, BoxDim::from_lengths(1.0, 1.0, 1.0), 3.0, Dimensionality::Three),
    ]
}

#[test]
fn sort_order_is_a_permutation() {
    for (seed, (n, box_dim, bin_width, dims)) in cases().into_iter().enumerate() {
        let mut pd = random_particles(n, &box_dim, seed as u64);
        let mut updater = SfcPackUpdater::with_bin_width(bin_width).unwrap();
        let stats = updater.update(0, &mut pd, &box_dim, dims);

        assert!(stats.mmax.is_power_of_two());
        assert_eq!(stats.num_cells, (stats.mmax as usize).pow(dims.count() as u32));
        assert!(
            is_permutation(updater.sort_order(), n),
            "case {seed}: sort order is not a permutation of 0..{n}"
        );
    }
}

#[test]
fn every_field_moves_through_sort_order() {
    for (seed, (n, box_dim, bin_width, dims)) in cases().into_iter().enumerate() {
        let mut pd = random_particles(n, &box_dim, 100 + seed as u64);
        let before = Snapshot::of(&pd);
        let mut updater = SfcPackUpdater::with_bin_width(bin_width).unwrap();
        updater.update(0, &mut pd, &box_dim, dims);

        let order = updater.sort_order();
        for (i, &src) in order.iter().enumerate() {
            let s = src as usize;
            assert_eq!(pd.x[i].to_bits(), before.x[s].to_bits());
            assert_eq!(pd.vy[i].to_bits(), before.vy[s].to_bits());
            assert_eq!(pd.az[i].to_bits(), before.az[s].to_bits());
            assert_eq!(pd.charge[i].to_bits(), before.charge[s].to_bits());
            assert_eq!(pd.mass[i].to_bits(), before.mass[s].to_bits());
            assert_eq!(pd.diameter[i].to_bits(), before.diameter[s].to_bits());
            assert_eq!(pd.ix[i], before.ix[s]);
            assert_eq!(pd.iz[i], before.iz[s]);
            assert_eq!(pd.type_id[i], before.type_id[s]);
            assert_eq!(pd.tag[i], before.tag[s]);
        }
        assert!(pd.rtag_consistent(), "case {seed}: rtag out of sync");
    }
}

#[test]
fn rtag_survives_repeated_sorts_with_motion() {
    let box_dim = BoxDim::new([0.0; 3], [16.0; 3]);
    let mut pd = random_particles(3000, &box_dim, 42);
    let mut updater = SfcPackUpdater::with_bin_width(1.0).unwrap();
    let mut rng = fastrand::Rng::with_seed(43);

    // Follow one particle by tag through several sorts
    let tracked = 1234;
    let start_x = pd.x[pd.index_of(tracked)];

    for step in 0..5 {
        updater.update(step, &mut pd, &box_dim, Dimensionality::Three);
        assert!(pd.rtag_consistent());
        assert_eq!(pd.x[pd.index_of(tracked)], start_x);

        // shuffle everyone except the tracked particle within the box
        for i in 0..pd.len() {
            if pd.tag[i] != tracked {
                pd.y[i] = rng.f32() * 16.0;
            }
        }
    }
}

#[test]
fn identical_input_gives_identical_order() {
    let box_dim = BoxDim::from_lengths(9.0, 7.0, 13.0);
    let mut a = random_particles(4000, &box_dim, 9);
    let mut b = random_particles(4000, &box_dim, 9);

    let mut serial = SfcPackUpdater::with_bin_width(0.5).unwrap();
    let parallel_config = SorterConfig {
        parallel_binning: true,
        ..SorterConfig::with_bin_width(0.5)
    };
    let mut parallel = SfcPackUpdater::new(parallel_config).unwrap();

    serial.update(0, &mut a, &box_dim, Dimensionality::Three);
    parallel.update(0, &mut b, &box_dim, Dimensionality::Three);
    assert_eq!(serial.sort_order(), parallel.sort_order());
    assert_eq!(a.tag, b.tag);
}

#[test]
fn second_sort_of_unmoved_particles_is_identity() {
    let box_dim = BoxDim::new([0.0; 3], [8.0; 3]);
    let mut pd = random_particles(800, &box_dim, 5);
    let mut updater = SfcPackUpdater::with_bin_width(1.0).unwrap();

    updater.update(0, &mut pd, &box_dim, Dimensionality::Three);
    let tags_after_first = pd.tag.clone();
    updater.update(1, &mut pd, &box_dim, Dimensionality::Three);

    assert!(updater.sort_order().iter().enumerate().all(|(i, &s)| s as usize == i));
    assert_eq!(pd.tag, tags_after_first);
}

//! Concrete grid scenarios with hand-checkable answers.

use sfcpack::traversal::hilbert_order_3d;
use sfcpack::{
    BoxDim, Dimensionality, NeighborGrid, ParticleData, ParticleInit, SfcPackUpdater, SortGrid,
};

fn cell_center(coords: [u32; 3]) -> [f32; 3] {
    [
        coords[0] as f32 + 0.5,
        coords[1] as f32 + 0.5,
        coords[2] as f32 + 0.5,
    ]
}

#[test]
fn four_particles_follow_curve_position() {
    let box_dim = BoxDim::new([0.0; 3], [8.0; 3]);
    let grid = SortGrid::from_bin_width(&box_dim, 1.0, Dimensionality::Three);
    assert_eq!(grid.mmax, 8);
    assert_eq!(grid.num_cells(), 512);

    let order = hilbert_order_3d(8);
    assert_eq!(order.len(), 512);

    // rank[cell] = position of the cell along the curve
    let mut rank = vec![0usize; 512];
    for (pos, &cell) in order.iter().enumerate() {
        rank[cell as usize] = pos;
    }

    let cells = [[7, 7, 7], [0, 0, 0], [3, 5, 1], [6, 0, 2]];
    let mut pd = ParticleData::new();
    for &c in &cells {
        pd.push_particle(ParticleInit::at(cell_center(c)));
    }

    let mut updater = SfcPackUpdater::with_bin_width(1.0).unwrap();
    updater.update(0, &mut pd, &box_dim, Dimensionality::Three);

    let mut expected: Vec<u32> = (0..4).collect();
    expected.sort_by_key(|&i| rank[grid.cell_id(cells[i as usize]) as usize]);
    assert_eq!(updater.sort_order(), &expected[..]);

    // ranks of the particles in their new positions strictly increase
    let ranks: Vec<usize> = (0..4)
        .map(|i| {
            let id = sfcpack::binner::classify(&grid, &box_dim, pd.x[i], pd.y[i], pd.z[i]);
            rank[id as usize]
        })
        .collect();
    assert!(ranks.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn upper_face_particle_sorts_with_origin_cell() {
    let box_dim = BoxDim::new([0.0; 3], [8.0; 3]);
    let mut pd = ParticleData::new();
    pd.push_particle(ParticleInit::at([7.5, 7.5, 7.5]));
    let on_face = pd.push_particle(ParticleInit::at([8.0, 0.5, 0.5]));

    let mut updater = SfcPackUpdater::with_bin_width(1.0).unwrap();
    updater.update(0, &mut pd, &box_dim, Dimensionality::Three);

    // cell (0,0,0) is first on the curve, so the wrapped particle moves to the front
    assert_eq!(pd.index_of(on_face), 0);
    assert_eq!(pd.x[0], 8.0);
}

#[test]
fn flat_2d_box_uses_raster_order() {
    let box_dim = BoxDim::new([0.0; 3], [20.0, 20.0, 1.0]);
    let mut pd = ParticleData::new();
    // row-major order: cell (i, j) -> i * 16 + j, bins are 1.25 wide
    let a = pd.push_particle(ParticleInit::at([19.0, 0.1, 0.0])); // (15, 0) -> 240
    let b = pd.push_particle(ParticleInit::at([0.1, 19.0, 0.0])); // (0, 15) -> 15
    let c = pd.push_particle(ParticleInit::at([1.3, 0.1, 0.0])); // (1, 0) -> 16

    let mut updater = SfcPackUpdater::with_bin_width(2.0).unwrap();
    let stats = updater.update(0, &mut pd, &box_dim, Dimensionality::Two);
    assert_eq!(stats.mmax, 16);
    assert_eq!(stats.num_cells, 256);

    assert_eq!(pd.tag, vec![b, c, a]);
}

#[test]
fn neighbor_grid_rebuilds_after_sort() {
    let box_dim = BoxDim::new([0.0; 3], [4.0; 3]);
    let mut pd = ParticleData::new();
    pd.push_particle(ParticleInit::at([3.5, 3.5, 3.5]));
    pd.push_particle(ParticleInit::at([0.2, 0.2, 0.2]));
    pd.push_particle(ParticleInit::at([0.4, 0.2, 0.2]));

    let mut neighbors = NeighborGrid::new(1.0, box_dim.lo, box_dim.hi);
    neighbors.attach(&pd);
    neighbors.ensure_current(&pd.x, &pd.y, &pd.z);

    let mut updater = SfcPackUpdater::with_bin_width(1.0).unwrap();
    updater.update(0, &mut pd, &box_dim, Dimensionality::Three);
    assert!(neighbors.is_stale());
    assert!(neighbors.ensure_current(&pd.x, &pd.y, &pd.z));

    // tag 1 and tag 2 are still each other's only neighbor at their new indices
    let i = pd.index_of(1);
    let mut found = Vec::new();
    neighbors.for_each_neighbor(i, &pd.x, &pd.y, &pd.z, 0.5, |j| found.push(j));
    assert_eq!(found, vec![pd.index_of(2)]);
}

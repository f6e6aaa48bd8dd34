use crate::grid::{coord_to_index, Grid3D};
use crate::math::*;

/// A per-voxel average of a particle scalar over the unit cube.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelVolume {
    values: Grid3D<T>,
    counts: Grid3D<usize>,
}

impl VoxelVolume {
    /// Number of voxels along each axis.
    pub fn size(&self) -> usize {
        self.values.size()
    }

    pub fn values(&self) -> &Grid3D<T> {
        &self.values
    }

    /// The averaged values in storage order (axis 0 slowest).
    pub fn as_slice(&self) -> &[T] {
        self.values.as_slice()
    }

    /// The number of particles that fell into each voxel.
    pub fn counts(&self) -> &Grid3D<usize> {
        &self.counts
    }

    /// The number of voxels with at least one particle.
    pub fn occupied(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// The voxel containing `x` in a grid with `g` voxels per side over the unit cube. Positions
/// outside the cube land in the nearest boundary voxel.
pub fn voxel_coord(x: &TV, g: usize) -> UV {
    let max = (g - 1) as T;
    x.map(|c| (c * g as T).floor().max(0.).min(max) as usize)
}

/// Averages `values[p]` over all particles `p` whose `positions[p]` falls in each voxel of a grid
/// with `g` voxels per side. Voxels without particles are zero.
///
/// This is a two pass reduction: sums and counts are accumulated first, then divided. The
/// accumulation runs in particle order, so the result is bit-for-bit reproducible.
pub fn voxelize(positions: &[TV], values: &[T], g: usize) -> VoxelVolume {
    assert_eq!(
        positions.len(),
        values.len(),
        "every particle needs exactly one value"
    );
    assert!(g > 0, "voxel grid must have at least one voxel per side");

    let num_voxels = g * g * g;
    let mut sum = vec![0.; num_voxels];
    let mut count = vec![0usize; num_voxels];

    for (x, &v) in positions.iter().zip(values) {
        let i = coord_to_index(g, voxel_coord(x, g));
        sum[i] += v;
        count[i] += 1;
    }

    let averaged: Vec<T> = sum
        .iter()
        .zip(&count)
        .map(|(&s, &c)| if c > 0 { s / c as T } else { 0. })
        .collect();

    VoxelVolume {
        values: Grid3D::from_vec(g, averaged).expect("voxel buffer has g³ cells"),
        counts: Grid3D::from_vec(g, count).expect("voxel buffer has g³ cells"),
    }
}

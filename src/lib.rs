//! Particle-based elastic solid stress solver.
//!
//! A lattice of material points falls under gravity onto the `z = 0` floor, after which the
//! small-strain field is estimated from particle displacements, converted to a von Mises stress
//! and averaged onto a regular voxel grid.

pub mod collisions;
pub mod grid;
pub mod output;
pub mod solid;
pub mod statistics;
pub mod util;
pub mod voxel;

extern crate nalgebra as na;

pub use crate::grid::Grid3D;
pub use crate::solid::{
    ParameterError, ParameterRecord, SimulationReport, SolidParameters, SolidSimulation,
};
pub use crate::voxel::VoxelVolume;

pub mod math {
    pub const DIM: usize = 3;

    pub type T = f64;
    pub type TV = na::SVector<T, DIM>;
    pub type UV = na::SVector<usize, DIM>;

    pub type Mat = na::SMatrix<T, DIM, DIM>;

    /// Gravitational acceleration, in the simulation's unit system.
    pub const GRAVITY: T = -9.81;

    pub fn gravity() -> TV {
        TV::new(0., 0., GRAVITY)
    }
}

/// Runs the whole pipeline for `params` and returns the voxelized von Mises stress.
pub fn run(params: &SolidParameters) -> VoxelVolume {
    run_with_history(params).volume
}

/// Same as [`run`], but also hands back the per-particle stress and the step diagnostics.
pub fn run_with_history(params: &SolidParameters) -> SimulationReport {
    let mut simulation = SolidSimulation::new(params.clone());
    let history = simulation.simulate();
    simulation.report(history)
}

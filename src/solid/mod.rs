mod limiter;
mod models;
mod parameters;
mod particles;
mod strain;

pub use limiter::VelocityLimiter;
pub use models::{deviator, modulus_field, von_mises, IsotropicParameters, LAYER_INTERFACE_Z};
pub use parameters::{
    ParameterError, ParameterRecord, SolidParameters, CFL_FRACTION, DEFAULT_VOXEL_GRID_SIZE,
    MIN_LIMITER_DT,
};
pub use particles::SolidParticles;
pub use strain::{axis_derivative, displacement_gradient, small_strain, strain_field};

#[cfg(test)]
pub(crate) use parameters::test_record;

use crate::collisions::{clamp_to_domain, FloorContact};
use crate::grid::Grid3D;
use crate::math::*;
use crate::statistics::StepStatistics;
use crate::voxel::{voxelize, VoxelVolume};
use rayon::prelude::*;
use tracing::{debug, info};

/// Contains all of the state for the elastic solid simulation.
pub struct SolidSimulation {
    pub particles: SolidParticles,
    pub params: SolidParameters,
    /// Young's modulus of every lattice cell. Computed once from the reference positions.
    modulus: Grid3D<T>,
    limiter: VelocityLimiter,
    floor: FloorContact,
    steps_taken: usize,
    dissipated: T,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub volume: VoxelVolume,
    /// Von Mises stress of every particle, in particle order.
    pub von_mises: Vec<T>,
    pub history: Vec<StepStatistics>,
}

impl SolidSimulation {
    /// Creates a new simulation with the particles at rest on the lattice.
    pub fn new(params: SolidParameters) -> Self {
        let n = params.grid_n;
        let particles = SolidParticles::lattice(n);
        let modulus = modulus_field(&particles.reference_grid(n), params.e_a, params.e_b);

        info!(
            grid_n = n,
            particles = particles.len(),
            steps = params.steps(),
            max_speed = params.max_speed(),
            "Initialized solid lattice"
        );

        SolidSimulation {
            particles,
            modulus,
            limiter: VelocityLimiter::new(params.max_speed()),
            floor: FloorContact {
                damping_factor: params.damping_factor(),
            },
            params,
            steps_taken: 0,
            dissipated: 0.,
        }
    }

    pub fn modulus(&self) -> &Grid3D<T> {
        &self.modulus
    }

    pub fn time(&self) -> T {
        self.steps_taken as T * self.params.dt
    }

    /// Advances the particles by a single explicit step.
    pub fn step(&mut self) -> StepStatistics {
        let dt = self.params.dt;
        let gravity = gravity();
        let particles = &mut self.particles;

        particles
            .velocity
            .par_iter_mut()
            .for_each(|v| *v += gravity * dt);
        self.limiter.apply(&mut particles.velocity);

        particles
            .position
            .par_iter_mut()
            .zip(particles.velocity.par_iter())
            .for_each(|(x, v)| *x += v * dt);

        let contact = self.floor.resolve(
            &mut particles.position,
            &mut particles.velocity,
            self.params.particle_mass(),
        );
        self.limiter.apply(&mut particles.velocity);
        clamp_to_domain(&mut particles.position);

        self.steps_taken += 1;
        self.dissipated += contact.dissipated;

        let stats = StepStatistics::measure(
            self.steps_taken,
            self.time(),
            &self.particles,
            self.params.particle_mass(),
            contact.contacts,
            self.dissipated,
        );
        debug!(
            step = stats.step,
            kinetic = stats.kinetic_energy,
            contacts = stats.contacts,
            "Finished step"
        );
        stats
    }

    /// Runs all `round(duration_s / dt)` steps and returns the per-step diagnostics.
    #[tracing::instrument(skip(self), fields(steps = self.params.steps()))]
    pub fn simulate(&mut self) -> Vec<StepStatistics> {
        (0..self.params.steps()).map(|_| self.step()).collect()
    }

    /// The small-strain tensor of every lattice cell, from the current displacement.
    pub fn strain_field(&self) -> Grid3D<Mat> {
        let n = self.params.grid_n;
        strain_field(&self.particles.displacement(n), self.params.dx())
    }

    /// The Cauchy stress of every lattice cell.
    pub fn stress_field(&self) -> Grid3D<Mat> {
        let strain = self.strain_field();
        Grid3D::par_from_fn(strain.size(), |c| {
            IsotropicParameters::new(self.modulus[c], self.params.nu).cauchy_stress(&strain[c])
        })
    }

    /// The von Mises stress of every lattice cell.
    #[tracing::instrument(skip(self))]
    pub fn von_mises_field(&self) -> Grid3D<T> {
        let strain = self.strain_field();
        Grid3D::par_from_fn(strain.size(), |c| {
            let iso = IsotropicParameters::new(self.modulus[c], self.params.nu);
            von_mises(&iso.cauchy_stress(&strain[c]), &strain[c])
        })
    }

    /// The von Mises stress averaged onto the output voxel grid.
    pub fn stress_volume(&self) -> VoxelVolume {
        self.report(Vec::new()).volume
    }

    pub fn report(&self, history: Vec<StepStatistics>) -> SimulationReport {
        let von_mises = self.von_mises_field().into_vec();
        let volume = voxelize(
            &self.particles.position,
            &von_mises,
            self.params.voxel_grid_size,
        );

        info!(
            peak_von_mises = von_mises.iter().cloned().fold(0., T::max),
            occupied_voxels = volume.occupied(),
            "Voxelized stress"
        );

        SimulationReport {
            volume,
            von_mises,
            history,
        }
    }
}

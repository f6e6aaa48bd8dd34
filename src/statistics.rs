use crate::math::*;
use crate::solid::SolidParticles;
use serde::{Deserialize, Serialize};

/// Diagnostics recorded after every step. None of these feed back into the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStatistics {
    pub step: usize,
    pub time: T,
    pub kinetic_energy: T,
    /// Gravitational potential energy, relative to the floor.
    pub potential_energy: T,
    pub total_energy: T,
    pub max_speed: T,
    /// The number of particles that were below the floor during this step.
    pub contacts: usize,
    /// Cumulative kinetic energy removed by floor contact so far.
    pub dissipated: T,
}

impl StepStatistics {
    pub fn measure(
        step: usize,
        time: T,
        particles: &SolidParticles,
        mass: T,
        contacts: usize,
        dissipated: T,
    ) -> Self {
        let kinetic_energy = particles.kinetic_energy(mass);
        let potential_energy = particles.potential_energy(mass);
        StepStatistics {
            step,
            time,
            kinetic_energy,
            potential_energy,
            total_energy: kinetic_energy + potential_energy,
            max_speed: particles
                .velocity
                .iter()
                .map(|v| v.norm())
                .fold(0., T::max),
            contacts,
            dissipated,
        }
    }
}

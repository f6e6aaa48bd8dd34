use crate::grid::Grid3D;
use crate::math::*;
use crate::util::cell_centers;
use itertools::iproduct;

/// Contains all of the particle data. The three arrays always have the same length, and the
/// particle order is the lattice order, so particle `p` sits in lattice cell
/// `grid::index_to_coord(n, p)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidParticles {
    pub position: Vec<TV>,
    /// The undeformed position of every particle. Never modified after construction.
    reference_position: Vec<TV>,
    pub velocity: Vec<TV>,
}

impl SolidParticles {
    /// Creates `n³` particles at rest at the cell centers of an `n`-cell lattice over the unit
    /// cube, ordered with axis 0 varying slowest.
    pub fn lattice(n: usize) -> Self {
        let centers = cell_centers(n);
        let position: Vec<TV> = iproduct!(centers.clone(), centers.clone(), centers)
            .map(|(x, y, z)| TV::new(x, y, z))
            .collect();

        SolidParticles {
            reference_position: position.clone(),
            velocity: vec![TV::zeros(); position.len()],
            position,
        }
    }

    /// Particles at explicit positions, at rest. The reference positions are a copy of
    /// `position`.
    pub fn from_positions(position: Vec<TV>) -> Self {
        SolidParticles {
            reference_position: position.clone(),
            velocity: vec![TV::zeros(); position.len()],
            position,
        }
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn reference_position(&self) -> &[TV] {
        &self.reference_position
    }

    /// Current minus reference position, laid out on the `n`-cell lattice.
    ///
    /// Panics if the particle count is not `n³`.
    pub fn displacement(&self, n: usize) -> Grid3D<TV> {
        let displacement: Vec<TV> = self
            .position
            .iter()
            .zip(&self.reference_position)
            .map(|(x, x0)| x - x0)
            .collect();
        Grid3D::from_vec(n, displacement).unwrap_or_else(|| {
            panic!(
                "{} particles do not form a lattice with {} cells per side",
                self.len(),
                n
            )
        })
    }

    /// Reference positions laid out on the `n`-cell lattice.
    pub fn reference_grid(&self, n: usize) -> Grid3D<TV> {
        Grid3D::from_fn(n, |c| self.reference_position[crate::grid::coord_to_index(n, c)])
    }

    pub fn total_momentum(&self, mass: T) -> TV {
        self.velocity.iter().map(|v| mass * v).sum()
    }

    pub fn kinetic_energy(&self, mass: T) -> T {
        0.5 * mass * self.velocity.iter().map(|v| v.norm_squared()).sum::<T>()
    }

    /// Gravitational potential energy relative to the floor.
    pub fn potential_energy(&self, mass: T) -> T {
        -GRAVITY * mass * self.position.iter().map(|x| x.z).sum::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::index_to_coord;

    #[test]
    fn lattice_is_cell_centered_and_ordered() {
        let n = 3;
        let particles = SolidParticles::lattice(n);
        assert_eq!(particles.len(), n * n * n);
        assert_eq!(particles.position[0], TV::from_element(0.5 / 3.));
        assert_eq!(particles.position[1], TV::new(0.5 / 3., 0.5 / 3., 1.5 / 3.));

        for (p, x) in particles.position.iter().enumerate() {
            let c = index_to_coord(n, p);
            let expected = c.map(|i| (i as T + 0.5) / n as T);
            assert_eq!(*x, expected);
        }

        assert_eq!(particles.position, particles.reference_position());
        assert!(particles.velocity.iter().all(|v| *v == TV::zeros()));
    }

    #[test]
    fn displacement_is_relative_to_reference() {
        let mut particles = SolidParticles::lattice(2);
        particles.position[5] += TV::new(0., 0., -0.25);
        let displacement = particles.displacement(2);
        assert_eq!(displacement[index_to_coord(2, 5)], TV::new(0., 0., -0.25));
        assert_eq!(displacement[UV::new(0, 0, 0)], TV::zeros());
        assert_eq!(
            particles.reference_grid(2)[index_to_coord(2, 5)],
            particles.reference_position()[5]
        );
    }

    #[test]
    fn energies() {
        let mut particles = SolidParticles::from_positions(vec![TV::new(0., 0., 2.)]);
        particles.velocity[0] = TV::new(3., 0., 4.);
        assert_eq!(particles.kinetic_energy(2.), 25.);
        assert_eq!(particles.total_momentum(2.), TV::new(6., 0., 8.));
        assert!((particles.potential_energy(1.) - 2. * 9.81).abs() < 1e-12);
    }
}

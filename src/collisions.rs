use crate::math::*;
use crate::util::{unit_domain, RangeExt};
use rayon::prelude::*;

/// One-sided contact with the `z = 0` floor plane.
///
/// Nothing happens until a particle is found below the plane. At that point its height is
/// projected back onto the plane, its normal velocity is reflected, and the whole velocity is
/// scaled by `damping_factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorContact {
    pub damping_factor: T,
}

/// What happened at the floor during a single resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactReport {
    /// The number of particles found below the floor.
    pub contacts: usize,
    /// Kinetic energy removed by the damping.
    pub dissipated: T,
}

impl FloorContact {
    /// `contact_damping` is the exponential damping rate. Negative values are treated as zero.
    pub fn new(contact_damping: T) -> Self {
        FloorContact {
            damping_factor: (-contact_damping.max(0.)).exp(),
        }
    }

    pub fn signed_distance(&self, x: &TV) -> T {
        x.z
    }

    /// Resolves a single particle. Returns `true` if it was in contact.
    pub fn resolve_particle(&self, x: &mut TV, v: &mut TV) -> bool {
        if self.signed_distance(x) >= 0. {
            return false;
        }
        let f = self.damping_factor;
        x.z = 0.;
        v.x *= f;
        v.y *= f;
        v.z = -v.z * f;
        true
    }

    /// Resolves every particle. `mass` is only used for the dissipated energy in the report.
    pub fn resolve(&self, position: &mut [TV], velocity: &mut [TV], mass: T) -> ContactReport {
        // Collected in particle order so the report does not depend on the thread count.
        let dissipated: Vec<Option<T>> = position
            .par_iter_mut()
            .zip(velocity.par_iter_mut())
            .map(|(x, v)| {
                let before = v.norm_squared();
                if self.resolve_particle(x, v) {
                    Some(0.5 * mass * (before - v.norm_squared()))
                } else {
                    None
                }
            })
            .collect();

        dissipated
            .into_iter()
            .flatten()
            .fold(ContactReport::default(), |report, e| ContactReport {
                contacts: report.contacts + 1,
                dissipated: report.dissipated + e,
            })
    }
}

/// Clamps every coordinate of every particle into the unit cube.
pub fn clamp_to_domain(position: &mut [TV]) {
    let domain = unit_domain();
    position
        .par_iter_mut()
        .for_each(|x| *x = domain.clamp_point(x));
}

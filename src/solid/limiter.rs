use crate::math::*;
use rayon::prelude::*;

/// Caps particle speeds so that no particle travels more than a fixed fraction of a lattice cell
/// per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityLimiter {
    pub max_speed: T,
}

impl VelocityLimiter {
    pub fn new(max_speed: T) -> Self {
        VelocityLimiter { max_speed }
    }

    /// Rescales `v` onto the cap, keeping its direction. Slower velocities are returned as is.
    pub fn limit(&self, v: TV) -> TV {
        if !(self.max_speed > 0.) {
            return v;
        }
        let speed = v.norm();
        if speed > self.max_speed {
            v * (self.max_speed / speed)
        } else {
            v
        }
    }

    pub fn apply(&self, velocity: &mut [TV]) {
        velocity.par_iter_mut().for_each(|v| *v = self.limit(*v));
    }
}

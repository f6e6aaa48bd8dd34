use crate::grid::Grid3D;
use crate::math::*;
use serde::{Deserialize, Serialize};

/// Height below which the sample is made of material A.
pub const LAYER_INTERFACE_Z: T = 0.5;

/// Young's modulus and Poisson ratio, along with the Lamé parameters derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsotropicParameters {
    pub youngs_modulus: T,
    pub poissons_ratio: T,
    pub mu: T,
    pub lambda: T,
}

impl IsotropicParameters {
    /// `poissons_ratio` must lie in `(-1, 0.5)`, otherwise the Lamé parameters are infinite.
    pub fn new(youngs_modulus: T, poissons_ratio: T) -> Self {
        let mut base = Self {
            youngs_modulus,
            poissons_ratio,
            mu: 0.,
            lambda: 0.,
        };
        base.recalculate_lame_parameters();
        base
    }

    pub fn recalculate_lame_parameters(&mut self) {
        self.mu = self.youngs_modulus / (2. * (1. + self.poissons_ratio));
        self.lambda = self.youngs_modulus * self.poissons_ratio
            / ((1. + self.poissons_ratio) * (1. - 2. * self.poissons_ratio));
    }

    /// Isotropic linear elasticity, `σ = λ tr(ε) I + 2μ ε`.
    pub fn cauchy_stress(&self, strain: &Mat) -> Mat {
        self.lambda * strain.trace() * Mat::identity() + 2. * self.mu * strain
    }
}

/// The stress with the mean normal *strain* removed from the diagonal.
///
/// Note that this shifts by `tr(ε) / 3`, not `tr(σ) / 3`, so the result is only traceless when
/// `3λ + 2μ = 1`.
pub fn deviator(stress: &Mat, strain: &Mat) -> Mat {
    stress - (strain.trace() / 3.) * Mat::identity()
}

/// `sqrt(3/2 s:s)` for the deviator `s`. Always non-negative.
pub fn von_mises(stress: &Mat, strain: &Mat) -> T {
    let s = deviator(stress, strain);
    (1.5 * s.component_mul(&s).sum()).sqrt()
}

/// Two-layer material sample: Young's modulus `e_a` below `z = 0.5` and `e_b` above, evaluated
/// at the reference (undeformed) position of every lattice cell.
pub fn modulus_field(reference: &Grid3D<TV>, e_a: T, e_b: T) -> Grid3D<T> {
    reference.map(|x| if x.z < LAYER_INTERFACE_Z { e_a } else { e_b })
}

use crate::collisions::FloorContact;
use crate::grid::checked_cell_count;
use crate::math::*;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::Error;

/// Default side length of the output voxel volume.
pub const DEFAULT_VOXEL_GRID_SIZE: usize = 64;

/// Lower bound on the time step used when computing the velocity cap.
pub const MIN_LIMITER_DT: T = 1e-6;

/// Fraction of a lattice cell a particle may travel in a single step.
pub const CFL_FRACTION: T = 0.25;

/// The raw parameter record, as written in a JSON parameter file. Nothing here is validated, see
/// [`SolidParameters::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub grid_n: i64,
    pub duration_s: T,
    pub dt: T,
    pub rho: T,
    #[serde(rename = "E_A")]
    pub e_a: T,
    #[serde(rename = "E_B")]
    pub e_b: T,
    pub nu: T,
    #[serde(default)]
    pub contact_damping: T,
    #[serde(default = "default_voxel_grid_size")]
    pub voxel_grid_size: usize,
}

fn default_voxel_grid_size() -> usize {
    DEFAULT_VOXEL_GRID_SIZE
}

/// Reasons a [`ParameterRecord`] is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("grid_n must be positive and small enough for grid_n³ cells to fit in memory, got {0}")]
    GridSize(i64),
    #[error("dt must be positive and finite, got {0}")]
    TimeStep(T),
    #[error("duration_s must be non-negative and finite, got {0}")]
    Duration(T),
    #[error("elastic modulus {name} must be positive and finite, got {value}")]
    Modulus { name: &'static str, value: T },
    #[error("Poisson ratio must lie strictly between -1 and 0.5, got {0}")]
    PoissonRatio(T),
    #[error("voxel_grid_size must be positive and small enough for its cube to fit in memory, got {0}")]
    VoxelGridSize(usize),
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: T },
}

/// Validated, immutable simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolidParameters {
    /// The number of lattice cells along each axis. There are `grid_n³` particles.
    pub grid_n: usize,
    /// Total simulated time.
    pub duration_s: T,
    /// The size of the time step.
    pub dt: T,
    /// Density of the solid. Only used for the energy diagnostics.
    pub rho: T,
    /// Young's modulus of the lower layer (`z < 0.5`).
    pub e_a: T,
    /// Young's modulus of the upper layer.
    pub e_b: T,
    /// Poisson ratio shared by both layers.
    pub nu: T,
    /// Exponential velocity damping applied when a particle hits the floor.
    pub contact_damping: T,
    /// Side length of the output voxel volume. Independent of `grid_n`.
    pub voxel_grid_size: usize,
}

impl SolidParameters {
    /// Validates `record`. Nothing is allocated for a run until this succeeds.
    pub fn new(record: ParameterRecord) -> Result<Self, ParameterError> {
        let grid_n = match usize::try_from(record.grid_n) {
            Ok(n) if n > 0 && checked_cell_count(n).is_some() => n,
            _ => return Err(ParameterError::GridSize(record.grid_n)),
        };
        if !(record.dt > 0. && record.dt.is_finite()) {
            return Err(ParameterError::TimeStep(record.dt));
        }
        if !(record.duration_s >= 0. && record.duration_s.is_finite()) {
            return Err(ParameterError::Duration(record.duration_s));
        }
        for &(name, value) in &[("E_A", record.e_a), ("E_B", record.e_b)] {
            if !(value > 0. && value.is_finite()) {
                return Err(ParameterError::Modulus { name, value });
            }
        }
        // Both endpoints zero out a Lamé denominator.
        if !(record.nu > -1. && record.nu < 0.5) {
            return Err(ParameterError::PoissonRatio(record.nu));
        }
        if record.voxel_grid_size == 0 || checked_cell_count(record.voxel_grid_size).is_none() {
            return Err(ParameterError::VoxelGridSize(record.voxel_grid_size));
        }
        for &(name, value) in &[
            ("rho", record.rho),
            ("contact_damping", record.contact_damping),
        ] {
            if !value.is_finite() {
                return Err(ParameterError::NonFinite { name, value });
            }
        }

        Ok(SolidParameters {
            grid_n,
            duration_s: record.duration_s,
            dt: record.dt,
            rho: record.rho,
            e_a: record.e_a,
            e_b: record.e_b,
            nu: record.nu,
            contact_damping: record.contact_damping,
            voxel_grid_size: record.voxel_grid_size,
        })
    }

    /// Parses and validates a JSON parameter record.
    pub fn from_json(json: &[u8]) -> eyre::Result<Self> {
        let record: ParameterRecord = serde_json::from_slice(json)?;
        Ok(Self::new(record)?)
    }

    /// The record these parameters were built from, for provenance.
    pub fn to_record(&self) -> ParameterRecord {
        ParameterRecord {
            grid_n: self.grid_n as i64,
            duration_s: self.duration_s,
            dt: self.dt,
            rho: self.rho,
            e_a: self.e_a,
            e_b: self.e_b,
            nu: self.nu,
            contact_damping: self.contact_damping,
            voxel_grid_size: self.voxel_grid_size,
        }
    }

    /// Lattice spacing.
    pub fn dx(&self) -> T {
        1. / self.grid_n as T
    }

    /// The number of explicit steps, `duration_s / dt` rounded to the nearest integer with ties
    /// going to the even neighbour, so `0.25 / 0.1 == 2.5` gives 2 steps.
    pub fn steps(&self) -> usize {
        (self.duration_s / self.dt).round_ties_even() as usize
    }

    /// The largest speed a particle may have after the velocity limiter.
    pub fn max_speed(&self) -> T {
        CFL_FRACTION * self.dx() / self.dt.max(MIN_LIMITER_DT)
    }

    /// The factor applied to velocities on floor contact. Negative damping is treated as zero.
    pub fn damping_factor(&self) -> T {
        FloorContact::new(self.contact_damping).damping_factor
    }

    /// Mass carried by each particle, `rho * dx³`.
    pub fn particle_mass(&self) -> T {
        self.rho * self.dx().powi(3)
    }
}

#[cfg(test)]
pub(crate) fn test_record() -> ParameterRecord {
    ParameterRecord {
        grid_n: 4,
        duration_s: 0.,
        dt: 0.01,
        rho: 1.,
        e_a: 1.,
        e_b: 1.,
        nu: 0.3,
        contact_damping: 0.,
        voxel_grid_size: DEFAULT_VOXEL_GRID_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_record() {
        let params = SolidParameters::new(test_record()).unwrap();
        assert_eq!(params.grid_n, 4);
        assert_eq!(params.steps(), 0);
        assert_eq!(params.to_record(), test_record());
    }

    fn with(modify: impl FnOnce(&mut ParameterRecord)) -> ParameterRecord {
        let mut record = test_record();
        modify(&mut record);
        record
    }

    #[test]
    fn rejects_invalid_records() {
        let cases = vec![
            (with(|r| r.grid_n = 0), ParameterError::GridSize(0)),
            (with(|r| r.grid_n = -3), ParameterError::GridSize(-3)),
            (with(|r| r.dt = 0.), ParameterError::TimeStep(0.)),
            (with(|r| r.dt = -0.1), ParameterError::TimeStep(-0.1)),
            (with(|r| r.duration_s = -1.), ParameterError::Duration(-1.)),
            (
                with(|r| r.e_a = 0.),
                ParameterError::Modulus {
                    name: "E_A",
                    value: 0.,
                },
            ),
            (
                with(|r| r.e_b = -2.),
                ParameterError::Modulus {
                    name: "E_B",
                    value: -2.,
                },
            ),
            (with(|r| r.nu = 0.5), ParameterError::PoissonRatio(0.5)),
            (with(|r| r.nu = -1.), ParameterError::PoissonRatio(-1.)),
            (with(|r| r.nu = 0.7), ParameterError::PoissonRatio(0.7)),
            (with(|r| r.voxel_grid_size = 0), ParameterError::VoxelGridSize(0)),
            (
                with(|r| r.grid_n = i64::MAX),
                ParameterError::GridSize(i64::MAX),
            ),
            (
                with(|r| r.grid_n = 1 << 22),
                ParameterError::GridSize(1 << 22),
            ),
            (
                with(|r| r.voxel_grid_size = usize::MAX),
                ParameterError::VoxelGridSize(usize::MAX),
            ),
        ];

        for (record, expected) in cases {
            assert_eq!(SolidParameters::new(record), Err(expected));
        }
    }

    #[test]
    fn rejects_nan() {
        assert!(matches!(
            SolidParameters::new(with(|r| r.dt = T::NAN)),
            Err(ParameterError::TimeStep(_))
        ));

        assert!(matches!(
            SolidParameters::new(with(|r| r.nu = T::NAN)),
            Err(ParameterError::PoissonRatio(_))
        ));

        assert!(matches!(
            SolidParameters::new(with(|r| r.rho = T::INFINITY)),
            Err(ParameterError::NonFinite { name: "rho", .. })
        ));
    }

    #[test]
    fn parses_json_with_defaults() {
        let json = br#"{"grid_n": 8, "duration_s": 0.5, "dt": 0.01, "rho": 1000.0,
                        "E_A": 1e5, "E_B": 2e5, "nu": 0.25}"#;
        let params = SolidParameters::from_json(json).unwrap();
        assert_eq!(params.contact_damping, 0.);
        assert_eq!(params.voxel_grid_size, DEFAULT_VOXEL_GRID_SIZE);
        assert_eq!(params.steps(), 50);
        assert_eq!(params.e_b, 2e5);
    }

    #[test]
    fn json_validation_errors_surface() {
        let json = br#"{"grid_n": 8, "duration_s": 0.5, "dt": 0.01, "rho": 1.0,
                        "E_A": 1.0, "E_B": 1.0, "nu": 0.5}"#;
        let err = SolidParameters::from_json(json).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ParameterError>(),
            Some(&ParameterError::PoissonRatio(0.5))
        );
    }

    #[test]
    fn half_step_ties_round_to_even() {
        let steps = |duration_s: T, dt: T| {
            SolidParameters::new(with(|r| {
                r.duration_s = duration_s;
                r.dt = dt;
            }))
            .unwrap()
            .steps()
        };
        assert_eq!(0.25 / 0.1, 2.5);
        assert_eq!(steps(0.25, 0.1), 2);
        assert_eq!(steps(0.75, 0.5), 2);
        assert_eq!(steps(1.25, 0.5), 2);
        assert_eq!(steps(0.26, 0.1), 3);
    }

    #[test]
    fn derived_quantities() {
        let params = SolidParameters::new(with(|r| r.contact_damping = -3.)).unwrap();
        assert_eq!(params.dx(), 0.25);
        assert_eq!(params.damping_factor(), 1.);
        assert!((params.max_speed() - 0.25 * 0.25 / 0.01).abs() < 1e-12);
        assert_eq!(params.particle_mass(), 0.25f64.powi(3));
    }
}

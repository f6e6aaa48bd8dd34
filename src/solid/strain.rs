use crate::grid::Grid3D;
use crate::math::*;

/// Derivative of `field` along `axis` at `coord`, with lattice spacing `dx`.
///
/// Uses central differences in the interior and first order one-sided differences on the two
/// boundary layers. A lattice with a single cell along the axis has no neighbours, and its
/// derivative is zero.
pub fn axis_derivative(field: &Grid3D<TV>, coord: UV, axis: usize, dx: T) -> TV {
    let n = field.size();
    if n < 2 {
        return TV::zeros();
    }

    let i = coord[axis];
    let mut lo = coord;
    let mut hi = coord;
    let span = if i == 0 {
        hi[axis] = 1;
        dx
    } else if i == n - 1 {
        lo[axis] = n - 2;
        dx
    } else {
        lo[axis] = i - 1;
        hi[axis] = i + 1;
        2. * dx
    };

    (field[hi] - field[lo]) / span
}

/// The displacement gradient `∂u_i/∂x_j` at `coord`, with row `i` and column `j`.
pub fn displacement_gradient(displacement: &Grid3D<TV>, coord: UV, dx: T) -> Mat {
    let mut grad = Mat::zeros();
    for axis in 0..DIM {
        grad.set_column(axis, &axis_derivative(displacement, coord, axis, dx));
    }
    grad
}

/// Symmetric part of the displacement gradient.
pub fn small_strain(grad: &Mat) -> Mat {
    0.5 * (grad + grad.transpose())
}

/// The small-strain tensor at every lattice cell.
#[tracing::instrument(skip(displacement))]
pub fn strain_field(displacement: &Grid3D<TV>, dx: T) -> Grid3D<Mat> {
    Grid3D::par_from_fn(displacement.size(), |c| {
        small_strain(&displacement_gradient(displacement, c, dx))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mat_close(a: &Mat, b: &Mat) {
        assert!((a - b).abs().max() < 1e-10, "{} != {}", a, b);
    }

    fn lattice_positions(n: usize) -> Grid3D<TV> {
        Grid3D::from_fn(n, |c| c.map(|i| (i as T + 0.5) / n as T))
    }

    #[test]
    fn linear_field_is_differentiated_exactly() {
        // u = A x has gradient A everywhere, including on the boundary.
        let n = 5;
        let a = Mat::new(0.01, 0.02, 0., -0.03, 0., 0.01, 0.005, 0., -0.02);
        let displacement = lattice_positions(n).map(|x| a * x);

        let strain = strain_field(&displacement, 1. / n as T);
        let expected = small_strain(&a);
        for c in strain.cells() {
            assert_mat_close(&displacement_gradient(&displacement, c, 1. / n as T), &a);
            assert_mat_close(&strain[c], &expected);
        }
    }

    #[test]
    fn central_and_one_sided_differences() {
        // u_z = x_z², sampled at the cell centers of a 4 cell lattice.
        let n = 4;
        let dx = 1. / n as T;
        let displacement = lattice_positions(n).map(|x| TV::new(0., 0., x.z * x.z));
        let z = |k: usize| (k as T + 0.5) * dx;

        let interior = axis_derivative(&displacement, UV::new(0, 0, 1), 2, dx);
        assert!((interior.z - 2. * z(1)).abs() < 1e-12);

        let first = axis_derivative(&displacement, UV::new(0, 0, 0), 2, dx);
        assert!((first.z - (z(1) * z(1) - z(0) * z(0)) / dx).abs() < 1e-12);

        let last = axis_derivative(&displacement, UV::new(0, 0, 3), 2, dx);
        assert!((last.z - (z(3) * z(3) - z(2) * z(2)) / dx).abs() < 1e-12);
    }

    #[test]
    fn rigid_translation_has_no_strain() {
        let displacement = Grid3D::filled(3, TV::new(0.1, -0.2, 0.3));
        let strain = strain_field(&displacement, 1. / 3.);
        assert!(strain.iter().all(|e| *e == Mat::zeros()));
    }

    #[test]
    fn infinitesimal_rotation_has_no_strain() {
        let n = 4;
        let w = Mat::new(0., -0.01, 0.02, 0.01, 0., -0.03, -0.02, 0.03, 0.);
        let displacement = lattice_positions(n).map(|x| w * x);
        let strain = strain_field(&displacement, 1. / n as T);
        for e in strain.iter() {
            assert_mat_close(e, &Mat::zeros());
        }
    }

    #[test]
    fn single_cell_lattice_has_zero_gradient() {
        let displacement = Grid3D::filled(1, TV::new(0., 0., -0.5));
        let strain = strain_field(&displacement, 1.);
        assert_eq!(strain.as_slice(), &[Mat::zeros()]);
    }
}

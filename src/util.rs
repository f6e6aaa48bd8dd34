use crate::math::*;
use std::ops::Range;

/// The simulation domain, the closed unit cube `[0, 1]³`.
pub fn unit_domain() -> Range<TV> {
    TV::zeros()..TV::from_element(1.)
}

/// `n` cell-centered samples of `[0, 1]`, i.e. `(i + 0.5) / n`.
pub fn cell_centers(n: usize) -> impl Iterator<Item = T> + Clone {
    (0..n).map(move |i| (i as T + 0.5) / n as T)
}

pub trait RangeExt {
    /// Note that this treats the range as closed, so `self.end` is contained.
    fn contains_point(&self, x: &TV) -> bool;

    /// Clamps each component of `x` into the range.
    fn clamp_point(&self, x: &TV) -> TV;
}

impl RangeExt for Range<TV> {
    fn contains_point(&self, x: &TV) -> bool {
        (0..DIM).all(|i| self.start[i] <= x[i] && x[i] <= self.end[i])
    }

    fn clamp_point(&self, x: &TV) -> TV {
        TV::from_fn(|i, _| x[i].max(self.start[i]).min(self.end[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_centers_are_symmetric() {
        let c = cell_centers(4).collect::<Vec<_>>();
        assert_eq!(c, vec![0.125, 0.375, 0.625, 0.875]);
        assert_eq!(cell_centers(1).collect::<Vec<_>>(), vec![0.5]);
    }

    #[test]
    fn clamp_point_stays_in_domain() {
        let domain = unit_domain();
        let p = domain.clamp_point(&TV::new(-0.5, 0.25, 3.));
        assert_eq!(p, TV::new(0., 0.25, 1.));
        assert!(domain.contains_point(&p));
        assert!(!domain.contains_point(&TV::new(0.5, 0.5, 1.0001)));
    }
}

use ndarray::ArrayView1;

use crate::Float;

/// A metric over feature vectors.
///
/// `rdistance` is a cheaper surrogate that preserves ordering (for L2 it is
/// the squared distance). Nearest-neighbour searches only need the ordering,
/// so they should call `rdistance`.
pub trait Distance<F: Float> {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F;

    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.distance(a, b)
    }
}

/// Manhattan distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L1Dist;

/// Euclidean distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L2Dist;

/// Chebyshev (L-infinity) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LInfDist;

impl<F: Float> Distance<F> for L1Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs()).sum()
    }
}

impl<F: Float> Distance<F> for L2Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.rdistance(a, b).sqrt()
    }

    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }
}

impl<F: Float> Distance<F> for LInfDist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .fold(F::zero(), |acc, d| if d > acc { d } else { acc })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_l2_distance_pythagorean() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_abs_diff_eq!(L2Dist.distance(a.view(), b.view()), 5.0);
        assert_abs_diff_eq!(L2Dist.rdistance(a.view(), b.view()), 25.0);
    }

    #[test]
    fn test_l1_and_linf_distance() {
        let a = array![1.0, -2.0, 3.0];
        let b = array![4.0, 2.0, 3.0];
        assert_abs_diff_eq!(L1Dist.distance(a.view(), b.view()), 7.0);
        assert_abs_diff_eq!(LInfDist.distance(a.view(), b.view()), 4.0);
    }

    #[test]
    fn test_nan_propagates_through_l2() {
        let a = array![f64::NAN, 0.0];
        let b = array![1.0, 1.0];
        assert!(L2Dist.rdistance(a.view(), b.view()).is_nan());
    }
}

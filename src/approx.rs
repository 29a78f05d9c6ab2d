//! Utilities to approximate equality of floating point values and tensors.

use crate::tensors::Tensor;

/// The max epsilon accepted on `f64`s.
pub const F64_MAX_ERROR: f64 = 1e-3;

/// The expected minimum epsilon accepted on `f64`s.
pub const F64_AVG_ERROR: f64 = 1e-6;

/// The best expected epsilon accepted on `f64`s.
pub const F64_MIN_ERROR: f64 = 1e-12;

/// The approximated equality enumerated, from closest to farthest.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApproxEquality {
    /// Within [`F64_MIN_ERROR`].
    Precise = 0,

    /// Within [`F64_AVG_ERROR`].
    Partial = 1,

    /// Within [`F64_MAX_ERROR`].
    Relative = 2,

    /// No relative equality.
    Scarce = 3,
}

impl ApproxEquality {
    fn of(dif: f64) -> Self {
        if dif < F64_MIN_ERROR {
            Self::Precise
        } else if dif < F64_AVG_ERROR {
            Self::Partial
        } else if dif < F64_MAX_ERROR {
            Self::Relative
        } else {
            // NaN lands here too
            Self::Scarce
        }
    }
}

/// Rates how close two values are.
pub trait RelativeEq<Rhs: ?Sized = Self> {
    /// Enumerates the equality of `self` and `rhs`.
    fn approx_eq(&self, rhs: &Rhs) -> ApproxEquality;
}

impl RelativeEq for f64 {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        ApproxEquality::of((self - rhs).abs())
    }
}

impl RelativeEq for [f64] {
    /// The worst rating over all element pairs; different lengths are `Scarce`.
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        if self.len() != rhs.len() {
            return ApproxEquality::Scarce;
        }
        self.iter()
            .zip(rhs)
            .map(|(a, b)| a.approx_eq(b))
            .max()
            .unwrap_or(ApproxEquality::Precise)
    }
}

impl RelativeEq for Tensor<f64> {
    /// Different shapes are `Scarce`; otherwise compares the data.
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        if self.shape != rhs.shape {
            return ApproxEquality::Scarce;
        }
        self.data[..].approx_eq(&rhs.data[..])
    }
}

/// `true` if `a` and `b` are at least `Partial`ly equal.
pub fn approx_eq<A: RelativeEq<B> + ?Sized, B: ?Sized>(a: &A, b: &B) -> bool {
    a.approx_eq(b) <= ApproxEquality::Partial
}

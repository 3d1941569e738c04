// reduce.rs — classification buffer → π estimate.
//
// Pure arithmetic: the same buffer and N always give the same Estimate.
// The device-side half (waiting for the copy, mapping, unmapping) lives in
// gpu/readback.rs and hands the mapped slice to `reduce`.
//
// Summation runs in f64. Accumulating millions of 1.0s in f32 stalls at 2^24,
// exactly the scale the point buffer allows.

use std::fmt;

use crate::classify::count_inside;
use crate::error::{Error, Result};
use crate::points::PointSet;

/// A single Monte Carlo estimate of π.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// `4 * inside / total`.
    pub pi: f64,
    /// Points classified inside the unit circle.
    pub inside: u64,
    /// Points sampled (N).
    pub total: u64,
}

impl Estimate {
    /// Build an estimate from raw counts. `total` must be non-zero.
    pub fn from_counts(inside: u64, total: u64) -> Self {
        Estimate {
            pi: 4.0 * inside as f64 / total as f64,
            inside,
            total,
        }
    }

    /// Absolute distance from `std::f64::consts::PI`.
    pub fn abs_error(&self) -> f64 {
        (self.pi - std::f64::consts::PI).abs()
    }

    /// Fraction of points inside the circle (≈ π/4).
    pub fn ratio(&self) -> f64 {
        self.inside as f64 / self.total as f64
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "π ≈ {:.6} ({}/{} inside)", self.pi, self.inside, self.total)
    }
}

/// Reduce a 0/1 classification buffer of `n` points into an estimate.
///
/// Only the first `n` values are meaningful, so `values.len()` must equal
/// `n` exactly; anything else means the buffer and the point set disagree.
pub fn reduce(values: &[f32], n: usize) -> Result<Estimate> {
    if n == 0 {
        return Err(Error::InvalidPointCount {
            requested: 0,
            max: crate::points::MAX_POINTS,
        });
    }
    if values.len() != n {
        return Err(Error::LengthMismatch {
            expected: n,
            actual: values.len(),
        });
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    let inside = sum.round() as u64;
    Ok(Estimate {
        pi: 4.0 * sum / n as f64,
        inside,
        total: n as u64,
    })
}

/// Full CPU pass: classify every point of `set` and reduce.
pub fn reference_estimate(set: &PointSet) -> Estimate {
    Estimate::from_counts(count_inside(set), set.len() as u64)
}

// points.rs — random point generation and the length-prefixed point buffer.
//
// Layout of a PointSet (all f32, little-endian as uploaded):
//
//   [ N | x0 y0 | x1 y1 | ... | x(N-1) y(N-1) ]
//     ^ count header, stored as f32 so the whole buffer is one element type
//
// The kernel reads the header to bound its invocations, so the header must be
// exact. An f32 represents every integer up to 2^24 exactly; beyond that
// neighbouring counts collapse onto the same float, so 2^24 is the hard cap.
//
// Coordinates come from `Rng::gen::<f32>()` (rand's Standard distribution),
// which builds the float from 24 random mantissa bits scaled by 2^-24: every
// value lies in [0, 1) and 1.0 is unreachable.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};

/// Largest point count whose `f32` header is exact.
pub const MAX_POINTS: usize = 1 << 24;

/// Number of header elements preceding the coordinate pairs.
pub const HEADER_LEN: usize = 1;

/// N points in the unit square, packed behind an `f32` count header.
///
/// Immutable once built. The flat layout is exactly what the classification
/// kernel binds at slot 0, so uploading is a single byte copy.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    data: Vec<f32>,
}

impl PointSet {
    /// Generate `n` uniform points using thread-local OS-seeded randomness.
    pub fn generate(n: usize) -> Result<Self> {
        Self::generate_with(n, &mut rand::thread_rng())
    }

    /// Generate `n` uniform points from a ChaCha8 stream seeded with `seed`.
    /// The same `(n, seed)` always yields the same buffer.
    pub fn generate_seeded(n: usize, seed: u64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::generate_with(n, &mut rng)
    }

    /// Generate `n` uniform points from a caller-supplied generator.
    pub fn generate_with<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Self> {
        let mut data = allocate(n)?;
        data.push(n as f32);
        for _ in 0..n {
            let x: f32 = rng.gen();
            let y: f32 = rng.gen();
            data.push(x);
            data.push(y);
        }
        Ok(PointSet { data })
    }

    /// Build a set from explicit coordinates. Values are taken as-is, which
    /// makes this the entry point for fixed boundary inputs like `(1.0, 1.0)`.
    pub fn from_points(points: &[(f32, f32)]) -> Result<Self> {
        let mut data = allocate(points.len())?;
        data.push(points.len() as f32);
        for &(x, y) in points {
            data.push(x);
            data.push(y);
        }
        Ok(PointSet { data })
    }

    /// Number of points (N).
    pub fn len(&self) -> usize {
        (self.data.len() - HEADER_LEN) / 2
    }

    /// Always false: construction rejects N == 0.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `f32` count header as stored in the buffer.
    pub fn header(&self) -> f32 {
        self.data[0]
    }

    /// Point `i`, or `None` past the end.
    pub fn point(&self, i: usize) -> Option<(f32, f32)> {
        let base = i.checked_mul(2)?.checked_add(HEADER_LEN)?;
        match self.data.get(base..base.checked_add(2)?) {
            Some(&[x, y]) => Some((x, y)),
            _ => None,
        }
    }

    /// Iterate over `(x, y)` pairs in index order.
    pub fn points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.data[HEADER_LEN..]
            .chunks_exact(2)
            .map(|p| (p[0], p[1]))
    }

    /// The whole flat buffer, header included (2N + 1 elements).
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The flat buffer reinterpreted as bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Size of the flat buffer in bytes.
    pub fn byte_len(&self) -> u64 {
        (self.data.len() * std::mem::size_of::<f32>()) as u64
    }
}

/// Validate `n` and reserve the exact 2N + 1 element buffer.
fn allocate(n: usize) -> Result<Vec<f32>> {
    if n == 0 || n > MAX_POINTS {
        return Err(Error::InvalidPointCount {
            requested: n,
            max: MAX_POINTS,
        });
    }
    let elements = 2 * n + HEADER_LEN;
    let mut data = Vec::new();
    data.try_reserve_exact(elements).map_err(|e| Error::AllocationFailure {
        bytes: (elements * std::mem::size_of::<f32>()) as u64,
        reason: e.to_string(),
    })?;
    Ok(data)
}

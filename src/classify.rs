// classify.rs — CPU reference for the unit-circle classification kernel.
//
// This is the authoritative definition of the per-point rule. The WGSL kernel
// in shaders/classify.wgsl evaluates the same expression in f32.
//
// Rule: inside iff x*x + y*y <= 1.0, in f32, boundary inclusive.
// Points exactly on the arc such as (1, 0) or (0.6, 0.8) count as inside.
//
// CONTRACTION
// ───────────
// WGSL gives shader compilers licence to fuse `x * x + y * y` into one
// multiply-add, and there is no per-expression way to forbid it. A fused sum
// skips one rounding step, so a point within an ulp of the arc can land on
// the other side: fused, (0.6, 0.8) sums to 1.0000001 and is outside.
// The GPU therefore agrees with `classify` everywhere except on points for
// which `contraction_sensitive` is true; the GPU tests allow exactly those.

use crate::points::PointSet;

/// Classification value written for a point inside the circle.
pub const INSIDE: f32 = 1.0;
/// Classification value written for a point outside the circle.
pub const OUTSIDE: f32 = 0.0;

/// Classify a single point: `1.0` if `x*x + y*y <= 1.0`, else `0.0`.
#[inline]
pub fn classify(x: f32, y: f32) -> f32 {
    if x * x + y * y <= 1.0 {
        INSIDE
    } else {
        OUTSIDE
    }
}

/// True if evaluating the rule with either product fused into a
/// multiply-add gives a different answer than [`classify`].
///
/// These are the only points on which a GPU result may differ from the CPU
/// reference.
pub fn contraction_sensitive(x: f32, y: f32) -> bool {
    let unfused = x * x + y * y <= 1.0;
    (x.mul_add(x, y * y) <= 1.0) != unfused || (y.mul_add(y, x * x) <= 1.0) != unfused
}

/// Classify every point of `set`, index-aligned with its pairs.
pub fn classify_all(set: &PointSet) -> Vec<f32> {
    set.points().map(|(x, y)| classify(x, y)).collect()
}

/// Number of points classified as inside, computed directly on the CPU.
pub fn count_inside(set: &PointSet) -> u64 {
    set.points()
        .filter(|&(x, y)| classify(x, y) == INSIDE)
        .count() as u64
}

// tests/test_reduce.rs — Integration tests for reduction and convergence.

use gpu_pi::classify::classify_all;
use gpu_pi::reduce::{reduce, reference_estimate, Estimate};
use gpu_pi::{Error, PointSet};
use proptest::prelude::*;

// ===== Reduction =====

#[test]
fn reduce_matches_reference_estimate() {
    let set = PointSet::generate_seeded(10_000, 5).unwrap();
    let via_buffer = reduce(&classify_all(&set), set.len()).unwrap();
    let direct = reference_estimate(&set);
    assert_eq!(via_buffer, direct);
}

#[test]
fn reduce_is_idempotent() {
    let set = PointSet::generate_seeded(10_000, 9).unwrap();
    let buffer = classify_all(&set);
    let first = reduce(&buffer, set.len()).unwrap();
    for _ in 0..3 {
        assert_eq!(reduce(&buffer, set.len()).unwrap(), first);
    }
}

#[test]
fn reduce_rejects_short_buffer() {
    let err = reduce(&[1.0; 256], 257).unwrap_err();
    assert!(matches!(
        err,
        Error::LengthMismatch {
            expected: 257,
            actual: 256
        }
    ));
}

#[test]
fn estimate_formula() {
    let est = Estimate::from_counts(785_398, 1_000_000);
    assert!((est.pi - 3.141592).abs() < 1e-9);
    assert!(est.abs_error() < 1e-5);
}

#[test]
fn boundary_points_reduce_exactly() {
    let set = PointSet::from_points(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.6, 0.8)]).unwrap();
    let est = reduce(&classify_all(&set), 4).unwrap();
    assert_eq!(est.inside, 3);
    assert_eq!(est.pi, 3.0);
}

// ===== Statistical convergence =====

#[test]
fn converges_to_pi_over_independent_seeds() {
    // σ(estimate) ≈ sqrt(π(4 − π) / N) ≈ 0.0016 at N = 1M, so ±0.02 is a
    // >10σ band per trial.
    const N: usize = 1_000_000;
    let mut estimates = Vec::new();
    for seed in [1u64, 22, 333, 4444, 55555] {
        let est = reference_estimate(&PointSet::generate_seeded(N, seed).unwrap());
        assert!(
            (est.pi - 3.14159).abs() < 0.02,
            "seed {seed}: estimate {} outside ±0.02 of π",
            est.pi
        );
        estimates.push(est.pi);
    }
    // Independent seeds should not all land on the same value.
    assert!(estimates.windows(2).any(|w| w[0] != w[1]));
}

// ===== Properties =====

proptest! {
    #[test]
    fn estimate_bounds_hold(n in 1usize..3000, seed in any::<u64>()) {
        let set = PointSet::generate_seeded(n, seed).unwrap();
        let est = reduce(&classify_all(&set), n).unwrap();
        prop_assert!(est.inside <= n as u64);
        prop_assert!((0.0..=4.0).contains(&est.pi));
        prop_assert_eq!(est.total, n as u64);
    }

    #[test]
    fn reduce_is_pure(bits in prop::collection::vec(any::<bool>(), 1..512)) {
        let values: Vec<f32> = bits.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
        let a = reduce(&values, values.len()).unwrap();
        let b = reduce(&values, values.len()).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.inside, bits.iter().filter(|&&b| b).count() as u64);
    }
}

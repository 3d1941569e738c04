// tests/test_classify.rs — Integration tests for the unit-circle rule.
//
// Fixed inputs first: the rule must hold exactly on the arc, not only on
// random points that almost never land there.

use gpu_pi::classify::{
    classify, classify_all, contraction_sensitive, count_inside, INSIDE, OUTSIDE,
};
use gpu_pi::PointSet;
use proptest::prelude::*;

// ===== Boundary and edge inputs =====

#[test]
fn origin_is_inside() {
    assert_eq!(classify(0.0, 0.0), INSIDE);
}

#[test]
fn unit_axis_point_is_on_the_arc_and_inside() {
    assert_eq!(classify(1.0, 0.0), INSIDE);
    assert_eq!(classify(0.0, 1.0), INSIDE);
}

#[test]
fn far_corner_is_outside() {
    assert_eq!(classify(1.0, 1.0), OUTSIDE);
}

#[test]
fn pythagorean_point_is_on_the_arc_and_inside() {
    // 0.36 + 0.64 rounds to exactly 1.0 in f32.
    assert_eq!(0.6f32 * 0.6 + 0.8f32 * 0.8, 1.0);
    assert_eq!(classify(0.6, 0.8), INSIDE);
}

#[test]
fn fused_multiply_add_flips_the_pythagorean_point() {
    // With x*x kept exact inside an FMA the sum rounds up past 1.0.
    assert_eq!(0.6f32.mul_add(0.6, 0.8f32 * 0.8), 1.000_000_1);
    assert!(0.6f32.mul_add(0.6, 0.8f32 * 0.8) > 1.0);
    assert_eq!(classify(0.6, 0.8), INSIDE);
    assert!(contraction_sensitive(0.6, 0.8));
}

#[test]
fn just_past_the_arc_is_outside() {
    // 0.49 + 0.64 = 1.13
    assert_eq!(classify(0.7, 0.8), OUTSIDE);
}

#[test]
fn classify_all_is_index_aligned() {
    let set = PointSet::from_points(&[
        (0.0, 0.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (0.6, 0.8),
        (0.7, 0.8),
    ])
    .unwrap();
    assert_eq!(classify_all(&set), vec![1.0, 1.0, 0.0, 1.0, 0.0]);
    assert_eq!(count_inside(&set), 3);
}

#[test]
fn tail_past_a_full_workgroup() {
    // 257 points: one full 256-wide group plus a single-point tail.
    let mut pts = vec![(0.1, 0.1); 256];
    pts.push((0.9, 0.9));
    let set = PointSet::from_points(&pts).unwrap();
    let out = classify_all(&set);
    assert_eq!(out.len(), 257);
    assert!(out[..256].iter().all(|&v| v == INSIDE));
    assert_eq!(out[256], OUTSIDE);
}

// ===== Properties =====

proptest! {
    #[test]
    fn classification_matches_rule(x in 0.0f32..1.0, y in 0.0f32..1.0) {
        let expected = if x * x + y * y <= 1.0 { 1.0 } else { 0.0 };
        prop_assert_eq!(classify(x, y), expected);
    }

    #[test]
    fn classification_is_zero_or_one(x in -2.0f32..2.0, y in -2.0f32..2.0) {
        let v = classify(x, y);
        prop_assert!(v == INSIDE || v == OUTSIDE);
    }

    #[test]
    fn only_points_near_the_arc_are_contraction_sensitive(x in 0.0f32..1.0, y in 0.0f32..1.0) {
        let sum = x * x + y * y;
        if (sum - 1.0).abs() > 1e-6 {
            prop_assert!(!contraction_sensitive(x, y));
        }
    }

    #[test]
    fn classification_is_deterministic(x in 0.0f32..1.0, y in 0.0f32..1.0) {
        prop_assert_eq!(classify(x, y), classify(x, y));
        prop_assert_eq!(classify(x, y), classify(y, x));
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the geometry helpers.

use core::f64::consts::{PI, TAU};

use kurbo::Point;
use proptest::prelude::*;
use understory_focus::math::{distance, modulo, normalize_angle};

/// Angular distance between two angles, ignoring whole turns.
fn angular_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % TAU;
    d.min(TAU - d)
}

proptest! {
    #[test]
    fn modulo_is_in_range(x in any::<isize>(), m in 1..=isize::MAX) {
        let r = modulo(x, m);
        prop_assert!((0..m).contains(&r), "modulo({x}, {m}) = {r}");
    }

    #[test]
    fn modulo_agrees_with_congruence(x in -10_000_isize..10_000, m in 1_isize..500) {
        let r = modulo(x, m);
        prop_assert_eq!((x - r) % m, 0);
    }

    #[test]
    fn normalize_angle_is_in_range(a in -1.0e6_f64..1.0e6) {
        let n = normalize_angle(a);
        prop_assert!(n > -PI && n <= PI, "normalize_angle({a}) = {n}");
    }

    #[test]
    fn normalize_angle_ignores_whole_turns(a in -100.0_f64..100.0, k in -10_i32..10) {
        let shifted = a + TAU * f64::from(k);
        let gap = angular_gap(normalize_angle(a), normalize_angle(shifted));
        prop_assert!(gap < 1e-9, "a = {a}, k = {k}, gap = {gap}");
    }

    #[test]
    fn normalize_angle_is_identity_in_range(a in -3.0_f64..3.0) {
        prop_assert_eq!(normalize_angle(a), a);
    }

    #[test]
    fn distance_is_symmetric(
        ax in -1.0e4_f64..1.0e4,
        ay in -1.0e4_f64..1.0e4,
        bx in -1.0e4_f64..1.0e4,
        by in -1.0e4_f64..1.0e4,
    ) {
        let a = Point::new(ax, ay);
        let b = Point::new(bx, by);
        prop_assert_eq!(distance(a, b), distance(b, a));
        prop_assert!(distance(a, b) >= 0.0);
        prop_assert_eq!(distance(a, a), 0.0);
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small numeric helpers used by the directional policy.

use core::f64::consts::{PI, TAU};

use kurbo::Point;

/// Fold an angle (in radians) into the half-open range `(-π, π]`.
///
/// The result is equivalent to repeatedly adding or subtracting `2π` until the
/// angle is in range, but uses a single remainder so it terminates for any
/// finite input. Non-finite input is returned unchanged.
///
/// ```
/// use core::f64::consts::PI;
/// use understory_focus::math::normalize_angle;
///
/// assert_eq!(normalize_angle(0.5), 0.5);
/// assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-12);
/// assert_eq!(normalize_angle(-PI), PI);
/// ```
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let folded = angle % TAU;
    if folded > PI {
        folded - TAU
    } else if folded <= -PI {
        folded + TAU
    } else {
        folded
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Mathematical modulo: the result is always in `[0, m)` for `m > 0`.
///
/// Unlike `%`, negative `x` wraps around from the top:
///
/// ```
/// use understory_focus::math::modulo;
///
/// assert_eq!(modulo(-1, 5), 4);
/// assert_eq!(modulo(7, 5), 2);
/// assert_eq!(-1 % 5, -1);
/// ```
///
/// A non-positive modulus has no meaningful result and yields `0`.
#[inline]
pub fn modulo(x: isize, m: isize) -> isize {
    if m <= 0 { 0 } else { x.rem_euclid(m) }
}

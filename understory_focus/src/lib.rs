// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Focus: focus navigation primitives.
//!
//! This crate models focus navigation as a combination of:
//! - **Navigation intents** ([`Navigation`]): a signed step through the focus order
//!   ([`Navigation::Rotate`]) or a direction vector ([`Navigation::Direction`]).
//! - A **spatial view of candidates** ([`FocusEntry`] / [`FocusSpace`]) that describes where
//!   eligible focusable nodes live in a shared 2D coordinate space, in structural order.
//! - Pluggable **policies** ([`FocusPolicy`]) that select the next focused node given an
//!   optional origin, a navigation intent, and a read-only view of the candidates.
//! - Small **geometry helpers** in [`math`] (angle folding, distance, true modulo).
//!
//! ## Minimal example
//!
//! Three buttons: the origin, one to its right and one below it.
//!
//! ```rust
//! use kurbo::Rect;
//! use understory_focus::{ConePolicy, FocusEntry, FocusPolicy, FocusSpace, Navigation};
//!
//! let entries = vec![
//!     FocusEntry { id: 1_u32, rect: Rect::new(0.0, 0.0, 10.0, 10.0) },
//!     FocusEntry { id: 2_u32, rect: Rect::new(10.0, 0.0, 20.0, 10.0) },
//!     FocusEntry { id: 3_u32, rect: Rect::new(0.0, 10.0, 10.0, 20.0) },
//! ];
//! let space = FocusSpace { nodes: &entries };
//! let policy = ConePolicy::default();
//!
//! // Right from the first button lands on the second…
//! assert_eq!(policy.next(Some(&entries[0]), Navigation::RIGHT, &space), Some(2));
//! // …and right again wraps back around to the first.
//! assert_eq!(policy.next(Some(&entries[1]), Navigation::RIGHT, &space), Some(1));
//! // Tab order simply steps through the sequence.
//! assert_eq!(policy.next(Some(&entries[2]), Navigation::NEXT, &space), Some(1));
//! ```
//!
//! ## Directional selection
//!
//! [`ConePolicy`] keeps the candidates whose centers lie inside a narrow cone around the
//! requested direction (measured from the origin's center), ranks them by signed distance
//! and picks the one that follows the origin. Candidates roughly behind the origin get a
//! negative distance, so repeated presses of the same key cycle through a row or column
//! and wrap around instead of getting stuck at the edge.
//!
//! The cone test compares `min(diff, π - diff)` against the half angle, which also admits
//! candidates in the band directly opposite the requested direction. Those candidates rank
//! first (negative distance) and are what the wrap lands on.
//!
//! The core types are generic over the node identifier `K`, so callers can use any small,
//! copyable handle. Geometry is expressed in terms of [`kurbo::Rect`]; a [`FocusSpace`]
//! should use one coordinate space for all of its entries.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math;
//!   typically used when integrating into embedded or `no_std` environments.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::f64::consts::{FRAC_PI_2, PI};

use kurbo::{Point, Rect, Vec2};

pub mod math;

pub use math::{distance, modulo, normalize_angle};

/// A focus navigation intent.
///
/// Hosts typically map key presses to these values (see the handler tables in
/// `understory_keynav`). Concrete policies interpret them according to their own rules.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Navigation {
    /// Move through the focus order by a signed number of positions (for example,
    /// `1` for Tab and `-1` for Shift+Tab).
    Rotate(i32),
    /// Move towards the given direction vector.
    ///
    /// Only the angle of the vector matters; it does not need to be normalized.
    /// Screen coordinates are assumed, so `y` grows downwards.
    Direction(Vec2),
}

impl Navigation {
    /// Next element in the focus order.
    pub const NEXT: Self = Self::Rotate(1);
    /// Previous element in the focus order.
    pub const PREV: Self = Self::Rotate(-1);
    /// Towards negative `x`.
    pub const LEFT: Self = Self::direction(-1.0, 0.0);
    /// Towards positive `x`.
    pub const RIGHT: Self = Self::direction(1.0, 0.0);
    /// Towards negative `y`.
    pub const UP: Self = Self::direction(0.0, -1.0);
    /// Towards positive `y`.
    pub const DOWN: Self = Self::direction(0.0, 1.0);

    /// Directional navigation from a `(dx, dy)` pair.
    pub const fn direction(dx: f64, dy: f64) -> Self {
        Self::Direction(Vec2::new(dx, dy))
    }
}

/// A single focusable candidate within a [`FocusSpace`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FocusEntry<K> {
    /// Identifier for this focusable node.
    pub id: K,
    /// Bounds in the coordinate space of the surrounding [`FocusSpace`].
    pub rect: Rect,
}

impl<K> FocusEntry<K> {
    /// Center of the entry's bounds; directional policies measure from here.
    pub fn center(&self) -> Point {
        self.rect.center()
    }
}

/// A read-only view of eligible focus candidates.
///
/// Entries are listed in structural (document) order, not spatial order; that order is
/// the traversal universe for sequential navigation and the tie-break order for
/// directional navigation. Hosts should rebuild the space for every request, since the
/// visual tree may change between key presses.
#[derive(Clone, Debug)]
pub struct FocusSpace<'a, K> {
    /// Eligible candidates in structural order.
    pub nodes: &'a [FocusEntry<K>],
}

impl<K> FocusSpace<'_, K>
where
    K: Copy + Eq,
{
    /// Index of `id` within the space, if present.
    pub fn position(&self, id: K) -> Option<usize> {
        self.nodes.iter().position(|e| e.id == id)
    }

    /// First candidate in structural order.
    pub fn first(&self) -> Option<K> {
        self.nodes.first().map(|e| e.id)
    }
}

/// Trait for focus traversal policies.
///
/// A policy receives the current origin (if something relevant is focused), a navigation
/// intent, and a read-only view of focusable candidates, and returns the node that should
/// receive focus. `None` means focus should stay where it is.
///
/// The origin carries its own bounds because it does not have to be part of the space:
/// a focused node may have become hidden or disabled since it received focus.
pub trait FocusPolicy<K>
where
    K: Copy + Eq,
{
    /// Compute the next focus target.
    fn next(
        &self,
        origin: Option<&FocusEntry<K>>,
        navigation: Navigation,
        space: &FocusSpace<'_, K>,
    ) -> Option<K>;
}

/// Default half angle of the directional cone: `π/16` (11.25°).
pub const CONE_HALF_ANGLE: f64 = PI / 16.0;

/// Angular cone policy.
///
/// - Without an origin, both kinds of navigation select the first candidate.
/// - [`Navigation::Rotate`] steps through the space, wrapping at both ends.
/// - [`Navigation::Direction`] runs the cone selection described in the crate docs.
#[derive(Copy, Clone, Debug)]
pub struct ConePolicy {
    /// Half angle (radians) of the cone a candidate's center must fall into.
    pub cone_half_angle: f64,
}

impl Default for ConePolicy {
    fn default() -> Self {
        Self {
            cone_half_angle: CONE_HALF_ANGLE,
        }
    }
}

impl<K> FocusPolicy<K> for ConePolicy
where
    K: Copy + Eq,
{
    fn next(
        &self,
        origin: Option<&FocusEntry<K>>,
        navigation: Navigation,
        space: &FocusSpace<'_, K>,
    ) -> Option<K> {
        let Some(origin) = origin else {
            return space.first();
        };
        match navigation {
            Navigation::Rotate(step) => next_sequential(origin.id, step, space),
            Navigation::Direction(direction) => {
                next_directional(origin, direction, self.cone_half_angle, space)
            }
        }
    }
}

fn next_sequential<K>(origin: K, step: i32, space: &FocusSpace<'_, K>) -> Option<K>
where
    K: Copy + Eq,
{
    let nodes = space.nodes;
    if nodes.is_empty() {
        return None;
    }
    let len = isize::try_from(nodes.len()).unwrap_or(isize::MAX);
    // An origin that is not eligible sits just before the first candidate.
    let current = space
        .position(origin)
        .and_then(|i| isize::try_from(i).ok())
        .unwrap_or(-1);
    let step = isize::try_from(step).unwrap_or(0);
    let index = modulo(current.saturating_add(step), len);
    Some(nodes[index.unsigned_abs()].id)
}

fn next_directional<K>(
    origin: &FocusEntry<K>,
    direction: Vec2,
    cone_half_angle: f64,
    space: &FocusSpace<'_, K>,
) -> Option<K>
where
    K: Copy + Eq,
{
    let nodes = space.nodes;
    if nodes.iter().all(|e| e.id == origin.id) {
        return None;
    }

    let direction_angle = normalize_angle(direction.atan2());
    let oc = origin.center();
    let angle_diff = |entry: &FocusEntry<K>| {
        let angle_to = normalize_angle((entry.center() - oc).atan2());
        normalize_angle(angle_to - direction_angle).abs()
    };

    // The origin always stays in the sequence so we can find what follows it.
    let mut sequence: Vec<(K, f64)> = nodes
        .iter()
        .filter(|e| {
            if e.id == origin.id {
                return true;
            }
            let diff = angle_diff(e);
            diff.min(PI - diff) < cone_half_angle
        })
        .map(|e| {
            let dist = distance(e.center(), oc);
            let score = if angle_diff(e) > FRAC_PI_2 {
                -dist
            } else {
                dist
            };
            (e.id, score)
        })
        .collect();

    // Stable, and `partial_cmp` keeps -0.0 and 0.0 equal.
    sequence.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let target = match sequence.iter().position(|&(id, _)| id == origin.id) {
        Some(pos) if pos + 1 < sequence.len() => sequence[pos + 1].0,
        _ => sequence.first()?.0,
    };
    (target != origin.id).then_some(target)
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities the navigator consumes from the host environment.
//!
//! A host is whatever owns the visual tree and the input system: a GUI toolkit, a web
//! view, or the [`headless`](crate::headless) harness used in tests. Adapters implement
//! two small traits:
//!
//! - [`FocusHost`]: focus-order queries, geometry, eligibility, and focus control.
//! - [`KeySource`]: synchronous key-press notifications with explicit unsubscription.
//!
//! Both are expected to be cheap handles onto shared host state (the navigator keeps them
//! for its whole lifetime), so methods that only observe take `&self`.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::Rect;

/// Focus-related queries and commands on the host's visual tree.
pub trait FocusHost {
    /// Handle for a node that may receive focus.
    type Element: Copy + Eq + Debug;
    /// Root of the subtree a navigator governs.
    type Scope;

    /// All nodes under `scope` that declare a focus-order priority, in structural order.
    ///
    /// The scope node itself is not included.
    fn focus_order_participants(&self, scope: &Self::Scope) -> Vec<Self::Element>;

    /// Whether `element` declares a focus-order priority.
    fn has_focus_order(&self, element: Self::Element) -> bool;

    /// Whether `element` is currently rendered (it and all of its ancestors have a box).
    fn is_rendered(&self, element: Self::Element) -> bool;

    /// Whether `element` is disabled.
    fn is_disabled(&self, element: Self::Element) -> bool;

    /// Bounding rectangle of `element` in the coordinate space shared by all elements.
    fn bounding_rect(&self, element: Self::Element) -> Rect;

    /// The element currently holding focus, if any.
    fn active_element(&self) -> Option<Self::Element>;

    /// Ask the host to move focus to `element`.
    ///
    /// Hosts may run focus-change side effects synchronously from here.
    fn focus(&mut self, element: Self::Element);
}

/// Callback invoked with the key identifier of every key press.
pub type KeyListener = Box<dyn FnMut(&str)>;

/// Source of key-press notifications.
pub trait KeySource {
    /// Token returned by [`subscribe`](Self::subscribe) and consumed by
    /// [`unsubscribe`](Self::unsubscribe).
    type Subscription;

    /// Register `listener`; it is called synchronously for every key press until the
    /// returned subscription is passed to [`unsubscribe`](Self::unsubscribe).
    fn subscribe(&self, listener: KeyListener) -> Self::Subscription;

    /// Remove the listener registered under `subscription`.
    fn unsubscribe(&self, subscription: Self::Subscription);
}

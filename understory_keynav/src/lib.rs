// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Keynav: directional keyboard focus navigation.
//!
//! A [`Navigator`] listens for key presses, maps them through a [`HandlerTable`] to
//! [`Navigation`](understory_focus::Navigation) intents, and moves focus among the
//! eligible elements of a scope using an [`understory_focus`] policy.
//!
//! ## Host capabilities
//!
//! The navigator never touches a real visual tree. It consumes two traits from the
//! [`host`] module:
//!
//! - [`FocusHost`]: focus-order participants under a scope, bounding rectangles,
//!   rendered/disabled state, the active element, and focus requests.
//! - [`KeySource`]: synchronous key-press notifications with a subscription token.
//!
//! An element is *eligible* when it is a focus-order participant under the scope, is
//! rendered, and is not disabled. Eligibility is recomputed for every request.
//!
//! ## Key handlers
//!
//! Handler tables map lower-cased key identifiers to navigation intents. Two tables are
//! built in: [`ARROW_KEY_HANDLERS`] and [`WASD_HANDLERS`]. Later registrations replace
//! earlier ones for the same key:
//!
//! ```
//! use understory_focus::Navigation;
//! use understory_keynav::headless::{HeadlessHost, KeyBus};
//! use understory_keynav::{ARROW_KEY_HANDLERS, Navigator, WASD_HANDLERS};
//!
//! let host = HeadlessHost::new();
//! let mut navigator = Navigator::new(host.clone(), host.root(), KeyBus::new());
//! navigator.handle_keys(ARROW_KEY_HANDLERS);
//! navigator.handle_keys(WASD_HANDLERS);
//! // Tab-like rotation on `e`/`q`.
//! navigator.handle_keys(&[("e", Navigation::NEXT), ("q", Navigation::PREV)]);
//! navigator.setup();
//! # navigator.destroy();
//! ```
//!
//! See [`headless`] for a complete, runnable setup.
//!
//! ## Logging
//!
//! Lifecycle and handler changes are reported through [`tracing`] at `debug` level, key
//! dispatch and focus moves at `trace`, and dropped re-entrant calls at `warn`.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod handlers;
pub mod headless;
pub mod host;
mod navigator;

pub use handlers::{ARROW_KEY_HANDLERS, HandlerTable, WASD_HANDLERS, normalize_key};
pub use host::{FocusHost, KeyListener, KeySource};
pub use navigator::Navigator;

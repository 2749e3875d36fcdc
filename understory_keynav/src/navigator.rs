// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The keyboard focus navigator.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use kurbo::Vec2;
use understory_focus::{ConePolicy, FocusEntry, FocusPolicy, FocusSpace, Navigation, modulo};

use crate::handlers::{self, HandlerTable};
use crate::host::{FocusHost, KeyListener, KeySource};

/// Moves focus among the eligible elements of a scope in response to key presses.
///
/// The navigator owns:
/// - the navigable scope, fixed at construction;
/// - a [`HandlerTable`] mapping keys to [`Navigation`] intents, extended with
///   [`handle_keys`](Self::handle_keys);
/// - at most one key subscription, created by [`setup`](Self::setup) and released by
///   [`destroy`](Self::destroy).
///
/// Eligible elements are re-queried from the host on every request; nothing about the
/// visual tree is cached between key presses.
///
/// All operations are synchronous and silent: empty scopes, missing focus and unknown
/// keys leave focus unchanged rather than reporting an error. Calling back into the
/// navigator while one of its operations is running (for example from a focus-change
/// side effect) is dropped and logged.
///
/// Dropping a navigator does not unsubscribe it; call [`destroy`](Self::destroy). A
/// listener that outlives its navigator ignores all keys.
pub struct Navigator<H, S, P = ConePolicy>
where
    H: FocusHost,
    S: KeySource,
{
    state: Rc<RefCell<State<H, P>>>,
    keys: S,
    subscription: Option<S::Subscription>,
}

struct State<H: FocusHost, P> {
    host: H,
    scope: H::Scope,
    handlers: HandlerTable,
    policy: P,
}

impl<H, S, P> fmt::Debug for Navigator<H, S, P>
where
    H: FocusHost,
    S: KeySource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.state.try_borrow().map(|s| s.handlers.len()).ok();
        f.debug_struct("Navigator")
            .field("handlers", &handlers)
            .field("set_up", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}

impl<H, S> Navigator<H, S>
where
    H: FocusHost,
    S: KeySource,
{
    /// Arrow keys mapped to the four cardinal directions.
    pub const ARROW_KEY_HANDLERS: &'static [(&'static str, Navigation)] =
        handlers::ARROW_KEY_HANDLERS;
    /// `W`/`A`/`S`/`D` mapped to the four cardinal directions.
    pub const WASD_HANDLERS: &'static [(&'static str, Navigation)] = handlers::WASD_HANDLERS;

    /// Create a navigator over `scope` using the default [`ConePolicy`].
    ///
    /// The handler table starts empty; register keys with
    /// [`handle_keys`](Self::handle_keys).
    pub fn new(host: H, scope: H::Scope, keys: S) -> Self {
        Self::with_policy(host, scope, keys, ConePolicy::default())
    }
}

impl<H, S, P> Navigator<H, S, P>
where
    H: FocusHost,
    S: KeySource,
    P: FocusPolicy<H::Element>,
{
    /// Create a navigator over `scope` with a custom policy.
    pub fn with_policy(host: H, scope: H::Scope, keys: S, policy: P) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                host,
                scope,
                handlers: HandlerTable::new(),
                policy,
            })),
            keys,
            subscription: None,
        }
    }

    /// Whether a key subscription is currently held.
    pub fn is_set_up(&self) -> bool {
        self.subscription.is_some()
    }

    /// Merge `table` into the handler table; entries for keys already present are replaced.
    pub fn handle_keys(&self, table: &[(&str, Navigation)]) {
        self.with_state(|state| {
            state.handlers.merge(table);
            tracing::debug!(
                added = table.len(),
                total = state.handlers.len(),
                "merged key handlers"
            );
        });
    }

    /// Handle a key press as if delivered by the key source.
    ///
    /// Returns whether a handler was registered for the key.
    pub fn key_down(&self, key: &str) -> bool {
        key_down(&self.state, key)
    }

    /// Elements of the scope that can currently receive focus, in structural order.
    pub fn eligible_elements(&self) -> Vec<H::Element> {
        self.with_state(|state| state.eligible_elements())
            .unwrap_or_default()
    }

    /// Index of the focused element among the eligible elements.
    pub fn focus_index(&self) -> Option<usize> {
        self.with_state(|state| state.focus_index()).flatten()
    }

    /// Focus the eligible element at `index`, wrapping in both directions.
    ///
    /// Does nothing when no element is eligible.
    pub fn set_focus_index(&self, index: isize) {
        self.with_state(|state| state.set_focus_index(index));
    }

    /// Move focus through the eligible elements by `step` positions.
    pub fn rotate_focus(&self, step: i32) {
        self.navigate(Navigation::Rotate(step));
    }

    /// Move focus towards `(dx, dy)`.
    pub fn rotate_focus_xy(&self, dx: f64, dy: f64) {
        self.rotate_focus_by(Vec2::new(dx, dy));
    }

    /// Move focus towards `direction`.
    pub fn rotate_focus_by(&self, direction: Vec2) {
        self.navigate(Navigation::Direction(direction));
    }

    /// Carry out a navigation intent.
    pub fn navigate(&self, navigation: Navigation) {
        self.with_state(|state| state.navigate(navigation));
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State<H, P>) -> R) -> Option<R> {
        with_state(&self.state, f)
    }
}

impl<H, S, P> Navigator<H, S, P>
where
    H: FocusHost + 'static,
    H::Scope: 'static,
    S: KeySource,
    P: FocusPolicy<H::Element> + 'static,
{
    /// Start receiving key presses from the key source.
    ///
    /// Calling this again before [`destroy`](Self::destroy) keeps the existing
    /// subscription and returns `false`.
    pub fn setup(&mut self) -> bool {
        if self.subscription.is_some() {
            tracing::debug!("navigator already set up; keeping existing subscription");
            return false;
        }
        let state = Rc::downgrade(&self.state);
        let listener: KeyListener = Box::new(move |key: &str| {
            if let Some(state) = state.upgrade() {
                key_down(&state, key);
            }
        });
        self.subscription = Some(self.keys.subscribe(listener));
        tracing::debug!("navigator set up");
        true
    }

    /// Stop receiving key presses. Safe to call at any time, any number of times.
    pub fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.keys.unsubscribe(subscription);
            tracing::debug!("navigator destroyed");
        }
    }
}

fn with_state<H, P, R>(
    state: &RefCell<State<H, P>>,
    f: impl FnOnce(&mut State<H, P>) -> R,
) -> Option<R>
where
    H: FocusHost,
{
    match state.try_borrow_mut() {
        Ok(mut state) => Some(f(&mut state)),
        Err(_) => {
            tracing::warn!("navigator re-entered while busy; ignoring call");
            None
        }
    }
}

fn key_down<H, P>(state: &RefCell<State<H, P>>, key: &str) -> bool
where
    H: FocusHost,
    P: FocusPolicy<H::Element>,
{
    with_state(state, |state| {
        let Some(navigation) = state.handlers.get(key) else {
            tracing::trace!(key, "no handler for key");
            return false;
        };
        tracing::trace!(key, ?navigation, "dispatching key");
        state.navigate(navigation);
        true
    })
    .unwrap_or(false)
}

impl<H, P> State<H, P>
where
    H: FocusHost,
    P: FocusPolicy<H::Element>,
{
    fn eligible_elements(&self) -> Vec<H::Element> {
        let mut elements = self.host.focus_order_participants(&self.scope);
        elements.retain(|&e| self.host.is_rendered(e) && !self.host.is_disabled(e));
        elements
    }

    /// The focused element, if it takes part in the focus order.
    fn current_focus(&self) -> Option<H::Element> {
        self.host
            .active_element()
            .filter(|&e| self.host.has_focus_order(e))
    }

    fn entry(&self, id: H::Element) -> FocusEntry<H::Element> {
        FocusEntry {
            id,
            rect: self.host.bounding_rect(id),
        }
    }

    fn focus_index(&self) -> Option<usize> {
        let focused = self.host.active_element()?;
        self.eligible_elements().iter().position(|&e| e == focused)
    }

    fn set_focus_index(&mut self, index: isize) {
        let elements = self.eligible_elements();
        if elements.is_empty() {
            return;
        }
        let len = isize::try_from(elements.len()).unwrap_or(isize::MAX);
        self.select(elements[modulo(index, len).unsigned_abs()]);
    }

    fn navigate(&mut self, navigation: Navigation) {
        let entries: Vec<_> = self
            .eligible_elements()
            .into_iter()
            .map(|e| self.entry(e))
            .collect();
        let origin = self.current_focus().map(|e| self.entry(e));
        let space = FocusSpace { nodes: &entries };

        match self.policy.next(origin.as_ref(), navigation, &space) {
            Some(target) => self.select(target),
            None => tracing::trace!(
                ?navigation,
                candidates = entries.len(),
                "no focus target"
            ),
        }
    }

    fn select(&mut self, target: H::Element) {
        if self.host.active_element() == Some(target) {
            return;
        }
        tracing::trace!(?target, "moving focus");
        self.host.focus(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{ElementFlags, ElementId, HeadlessHost, KeyBus};
    use alloc::vec;
    use kurbo::Rect;

    type TestNavigator = Navigator<HeadlessHost, KeyBus>;

    struct Fixture {
        host: HeadlessHost,
        keys: KeyBus,
        navigator: TestNavigator,
    }

    impl Fixture {
        fn new() -> Self {
            let host = HeadlessHost::new();
            let keys = KeyBus::new();
            let navigator = Navigator::new(host.clone(), host.root(), keys.clone());
            Self {
                host,
                keys,
                navigator,
            }
        }

        fn button(&self, x: f64, y: f64) -> ElementId {
            self.host.insert(
                self.host.root(),
                Rect::new(x, y, x + 10.0, y + 10.0),
                ElementFlags::FOCUS_ORDER,
            )
        }
    }

    #[test]
    fn right_selects_east_neighbor() {
        let f = Fixture::new();
        let origin = f.button(0.0, 0.0);
        let east = f.button(10.0, 0.0);
        let _south = f.button(0.0, 10.0);
        f.host.set_active(Some(origin));

        f.navigator.rotate_focus_xy(1.0, 0.0);
        assert_eq!(f.host.active(), Some(east));
    }

    #[test]
    fn right_from_east_edge_wraps_to_origin() {
        let f = Fixture::new();
        let origin = f.button(0.0, 0.0);
        let east = f.button(10.0, 0.0);
        let _south = f.button(0.0, 10.0);
        f.host.set_active(Some(east));

        f.navigator.rotate_focus_xy(1.0, 0.0);
        assert_eq!(f.host.active(), Some(origin));
    }

    #[test]
    fn empty_scope_is_a_no_op() {
        let f = Fixture::new();
        f.navigator.handle_keys(TestNavigator::ARROW_KEY_HANDLERS);

        f.navigator.rotate_focus_xy(0.0, 1.0);
        f.navigator.rotate_focus(1);
        f.navigator.rotate_focus(-1);
        f.navigator.set_focus_index(3);
        assert!(f.navigator.key_down("ArrowUp"));

        assert_eq!(f.host.active(), None);
        assert!(f.host.focus_log().is_empty());
        assert_eq!(f.navigator.focus_index(), None);
    }

    #[test]
    fn single_focused_element_stays_put() {
        let f = Fixture::new();
        let only = f.button(0.0, 0.0);
        f.host.set_active(Some(only));

        for (dx, dy) in [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
            f.navigator.rotate_focus_xy(dx, dy);
        }
        f.navigator.rotate_focus(1);

        assert_eq!(f.host.active(), Some(only));
        assert!(f.host.focus_log().is_empty());
    }

    #[test]
    fn without_focus_selects_first_eligible() {
        let f = Fixture::new();
        let first = f.button(50.0, 50.0);
        let _second = f.button(0.0, 0.0);

        f.navigator.rotate_focus_xy(-1.0, 0.0);
        assert_eq!(f.host.active(), Some(first));

        f.host.set_active(None);
        f.navigator.rotate_focus(-1);
        assert_eq!(f.host.active(), Some(first));
    }

    #[test]
    fn focus_outside_focus_order_selects_first_eligible() {
        let f = Fixture::new();
        let plain = f
            .host
            .insert(f.host.root(), Rect::new(0.0, 0.0, 10.0, 10.0), ElementFlags::empty());
        let first = f.button(100.0, 0.0);
        let _second = f.button(200.0, 0.0);
        f.host.set_active(Some(plain));

        f.navigator.rotate_focus(1);
        assert_eq!(f.host.active(), Some(first));
    }

    #[test]
    fn rotate_wraps_with_true_modulo() {
        let f = Fixture::new();
        let a = f.button(0.0, 0.0);
        let b = f.button(20.0, 0.0);
        let c = f.button(40.0, 0.0);
        f.host.set_active(Some(a));

        f.navigator.rotate_focus(-1);
        assert_eq!(f.host.active(), Some(c));
        f.navigator.rotate_focus(1);
        assert_eq!(f.host.active(), Some(a));
        f.navigator.rotate_focus(4);
        assert_eq!(f.host.active(), Some(b));
        assert_eq!(f.navigator.focus_index(), Some(1));
    }

    #[test]
    fn focus_index_setter_wraps() {
        let f = Fixture::new();
        let a = f.button(0.0, 0.0);
        let _b = f.button(20.0, 0.0);
        let c = f.button(40.0, 0.0);

        f.navigator.set_focus_index(-1);
        assert_eq!(f.host.active(), Some(c));
        f.navigator.set_focus_index(6);
        assert_eq!(f.host.active(), Some(a));
    }

    #[test]
    fn hidden_and_disabled_elements_are_skipped() {
        let f = Fixture::new();
        let a = f.button(0.0, 0.0);
        let disabled = f.button(20.0, 0.0);
        let panel = f
            .host
            .insert(f.host.root(), Rect::new(40.0, 0.0, 80.0, 10.0), ElementFlags::HIDDEN);
        let _hidden = f.host.insert(
            panel,
            Rect::new(40.0, 0.0, 50.0, 10.0),
            ElementFlags::FOCUS_ORDER,
        );
        let d = f.button(60.0, 0.0);
        f.host
            .set_flags(disabled, ElementFlags::FOCUS_ORDER | ElementFlags::DISABLED);

        assert_eq!(f.navigator.eligible_elements(), vec![a, d]);

        f.host.set_active(Some(a));
        f.navigator.rotate_focus_xy(1.0, 0.0);
        assert_eq!(f.host.active(), Some(d));
    }

    #[test]
    fn eligibility_is_recomputed_per_request() {
        let f = Fixture::new();
        let a = f.button(0.0, 0.0);
        let b = f.button(20.0, 0.0);
        let c = f.button(40.0, 0.0);
        f.host.set_active(Some(a));

        f.navigator.rotate_focus_xy(1.0, 0.0);
        assert_eq!(f.host.active(), Some(b));

        f.host.set_active(Some(a));
        f.host.set_flags(b, ElementFlags::FOCUS_ORDER | ElementFlags::HIDDEN);
        f.navigator.rotate_focus_xy(1.0, 0.0);
        assert_eq!(f.host.active(), Some(c));

        // Layout changes are picked up too.
        f.host.set_active(Some(a));
        f.host.set_rect(c, Rect::new(0.0, 40.0, 10.0, 50.0));
        f.navigator.rotate_focus_xy(0.0, 1.0);
        assert_eq!(f.host.active(), Some(c));
    }

    #[test]
    fn navigation_is_limited_to_scope() {
        let host = HeadlessHost::new();
        let keys = KeyBus::new();
        let root = host.root();
        let toolbar = host.insert(root, Rect::new(0.0, 0.0, 100.0, 10.0), ElementFlags::empty());
        let a = host.insert(toolbar, Rect::new(0.0, 0.0, 10.0, 10.0), ElementFlags::FOCUS_ORDER);
        let b = host.insert(toolbar, Rect::new(20.0, 0.0, 30.0, 10.0), ElementFlags::FOCUS_ORDER);
        let _outside = host.insert(root, Rect::new(15.0, 0.0, 18.0, 10.0), ElementFlags::FOCUS_ORDER);
        let navigator = Navigator::new(host.clone(), toolbar, keys);

        host.set_active(Some(a));
        navigator.rotate_focus_xy(1.0, 0.0);
        assert_eq!(host.active(), Some(b));
        assert_eq!(navigator.eligible_elements(), vec![a, b]);
    }

    #[test]
    fn later_handlers_override_earlier_ones() {
        let mut f = Fixture::new();
        let a = f.button(0.0, 0.0);
        let b = f.button(20.0, 0.0);
        let c = f.button(40.0, 0.0);
        f.host.set_active(Some(a));

        f.navigator.handle_keys(&[("a", Navigation::NEXT)]);
        f.navigator.handle_keys(&[("a", Navigation::PREV)]);
        f.navigator.setup();

        f.keys.press("a");
        assert_eq!(f.host.active(), Some(c));
        assert_ne!(f.host.active(), Some(b));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut f = Fixture::new();
        let a = f.button(0.0, 0.0);
        let _b = f.button(20.0, 0.0);
        f.host.set_active(Some(a));
        f.navigator.handle_keys(TestNavigator::ARROW_KEY_HANDLERS);
        f.navigator.setup();

        f.keys.press("Enter");
        f.keys.press("d");
        assert!(!f.navigator.key_down("q"));

        assert_eq!(f.host.active(), Some(a));
        assert!(f.host.focus_log().is_empty());
    }

    #[test]
    fn keys_are_matched_case_insensitively() {
        let mut f = Fixture::new();
        let a = f.button(0.0, 0.0);
        let b = f.button(0.0, 20.0);
        f.host.set_active(Some(a));
        f.navigator.handle_keys(TestNavigator::WASD_HANDLERS);
        f.navigator.setup();

        f.keys.press("S");
        assert_eq!(f.host.active(), Some(b));
        f.keys.press("w");
        assert_eq!(f.host.active(), Some(a));
    }

    #[test]
    fn lifecycle_holds_one_subscription() {
        let mut f = Fixture::new();
        assert!(!f.navigator.is_set_up());

        // Destroy before setup is harmless.
        f.navigator.destroy();
        assert_eq!(f.keys.listener_count(), 0);

        assert!(f.navigator.setup());
        assert!(!f.navigator.setup());
        assert_eq!(f.keys.listener_count(), 1);
        assert!(f.navigator.is_set_up());

        f.navigator.destroy();
        f.navigator.destroy();
        assert_eq!(f.keys.listener_count(), 0);
        assert!(!f.navigator.is_set_up());

        // It can be set up again afterwards.
        assert!(f.navigator.setup());
        assert_eq!(f.keys.listener_count(), 1);
    }

    #[test]
    fn destroyed_navigator_stops_reacting() {
        let mut f = Fixture::new();
        let a = f.button(0.0, 0.0);
        let b = f.button(20.0, 0.0);
        f.host.set_active(Some(a));
        f.navigator.handle_keys(TestNavigator::ARROW_KEY_HANDLERS);
        f.navigator.setup();

        f.keys.press("ArrowRight");
        assert_eq!(f.host.active(), Some(b));

        f.navigator.destroy();
        f.keys.press("ArrowRight");
        assert_eq!(f.host.active(), Some(b));
    }

    #[test]
    fn listener_outliving_navigator_is_inert() {
        let f = Fixture::new();
        let Fixture {
            host,
            keys,
            mut navigator,
        } = f;
        let a = host.insert(host.root(), Rect::new(0.0, 0.0, 10.0, 10.0), ElementFlags::FOCUS_ORDER);
        navigator.handle_keys(TestNavigator::ARROW_KEY_HANDLERS);
        navigator.setup();
        drop(navigator);

        assert_eq!(keys.listener_count(), 1);
        keys.press("ArrowDown");
        assert_eq!(host.active(), None);
        assert_ne!(host.active(), Some(a));
    }

    #[test]
    fn re_entrant_key_press_is_dropped() {
        let mut f = Fixture::new();
        let a = f.button(0.0, 0.0);
        let b = f.button(20.0, 0.0);
        let _c = f.button(40.0, 0.0);
        f.navigator.handle_keys(TestNavigator::ARROW_KEY_HANDLERS);
        f.navigator.setup();

        // Every focus change synchronously injects another key press.
        let keys = f.keys.clone();
        f.host
            .set_focus_hook(Some(Box::new(move |_| keys.press("ArrowRight"))));
        f.host.set_active(Some(a));

        assert!(f.navigator.key_down("ArrowRight"));
        assert_eq!(f.host.focus_log(), vec![b]);
        assert_eq!(f.host.active(), Some(b));
    }

    #[test]
    fn custom_policy_is_used() {
        struct LastPolicy;

        impl FocusPolicy<ElementId> for LastPolicy {
            fn next(
                &self,
                _origin: Option<&FocusEntry<ElementId>>,
                _navigation: Navigation,
                space: &FocusSpace<'_, ElementId>,
            ) -> Option<ElementId> {
                space.nodes.last().map(|e| e.id)
            }
        }

        let host = HeadlessHost::new();
        let root = host.root();
        let _a = host.insert(root, Rect::new(0.0, 0.0, 10.0, 10.0), ElementFlags::FOCUS_ORDER);
        let b = host.insert(root, Rect::new(20.0, 0.0, 30.0, 10.0), ElementFlags::FOCUS_ORDER);
        let navigator = Navigator::with_policy(host.clone(), root, KeyBus::new(), LastPolicy);

        navigator.rotate_focus_xy(0.0, -1.0);
        assert_eq!(host.active(), Some(b));
    }
}
